use serde::Serialize;

/// Fixed page size of the list endpoint.
pub const PAGE_SIZE: i64 = 20;

const LIST_COLUMNS: &str = "c.cve_id, c.published_date, c.last_modified_date, \
c.vulnerability_status, c.updated_at AS cve_updated_at, a.updated_at AS analysis_updated_at, \
a.risk_level, a.analysis_summary, a.affected_products";

const JOINED_TABLES: &str = "cve_data c LEFT JOIN analysis_data a ON c.cve_id = a.cve_id";

/// Secondary ordering appended to every sort so that row order stays stable
/// across page boundaries when the primary key has duplicate values.
const TIE_BREAK: &str = "c.last_modified_date DESC";

/// Sortable columns. Caller-supplied sort keys are resolved against this
/// allow-list; only these column names ever reach the SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortKey {
    PublishedDate,
    LastModifiedDate,
    AnalysisUpdatedAt,
}

impl SortKey {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "published_date" => Some(Self::PublishedDate),
            "last_modified_date" => Some(Self::LastModifiedDate),
            "analysis_updated_at" => Some(Self::AnalysisUpdatedAt),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::PublishedDate => "c.published_date",
            Self::LastModifiedDate => "c.last_modified_date",
            Self::AnalysisUpdatedAt => "a.updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("asc") {
            Self::Asc
        } else {
            Self::Desc
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A validated, normalized list request.
///
/// Produces the paged data query and the total-count query from the same
/// predicate, so the two can never disagree about which rows are in the
/// filtered population. User-controlled values (filter pattern, limit,
/// offset) are always bound positionally, never spliced into the SQL text.
#[derive(Debug, Clone)]
pub struct ListQuery {
    page: i64,
    filter: Option<String>,
    sort_key: Option<SortKey>,
    sort_order: SortOrder,
}

impl ListQuery {
    pub fn new(
        page: Option<i64>,
        cve_id: Option<&str>,
        sort_by: Option<&str>,
        sort_order: Option<&str>,
    ) -> Self {
        let page = page.unwrap_or(1).max(1);
        let filter = cve_id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        let sort_key = sort_by.and_then(SortKey::parse);
        let sort_order = sort_order.map(SortOrder::parse).unwrap_or_default();

        Self {
            page,
            filter,
            sort_key,
            sort_order,
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn offset(&self) -> i64 {
        // saturate so an absurd page number degrades to an empty page
        // instead of overflowing
        self.page.saturating_sub(1).saturating_mul(PAGE_SIZE)
    }

    /// The `ILIKE` pattern for the `$1` placeholder, if a filter was given.
    pub fn filter_pattern(&self) -> Option<String> {
        self.filter.as_ref().map(|f| format!("%{f}%"))
    }

    /// Single source of the filter predicate, shared by `data_sql` and
    /// `count_sql`.
    fn predicate_sql(&self) -> Option<&'static str> {
        self.filter.as_ref().map(|_| "WHERE c.cve_id ILIKE $1")
    }

    fn order_by_sql(&self) -> String {
        let direction = self.sort_order.keyword();
        match self.sort_key {
            None => format!("ORDER BY {TIE_BREAK}"),
            // Unanalyzed CVEs have no analysis timestamp; group them after
            // all analyzed rows no matter the direction, then sort within
            // each group.
            Some(key @ SortKey::AnalysisUpdatedAt) => format!(
                "ORDER BY CASE WHEN {column} IS NULL THEN 1 ELSE 0 END, \
                 {column} {direction}, {TIE_BREAK}",
                column = key.column(),
            ),
            Some(key) => format!("ORDER BY {} {direction}, {TIE_BREAK}", key.column()),
        }
    }

    /// The paged data query. Placeholders: `$1` filter pattern (when
    /// filtered), then limit and offset.
    pub fn data_sql(&self) -> String {
        let mut sql = format!("SELECT {LIST_COLUMNS} FROM {JOINED_TABLES}");
        let mut next_placeholder = 1;

        if let Some(predicate) = self.predicate_sql() {
            sql.push(' ');
            sql.push_str(predicate);
            next_placeholder = 2;
        }

        sql.push(' ');
        sql.push_str(&self.order_by_sql());
        sql.push_str(&format!(
            " LIMIT ${next_placeholder} OFFSET ${}",
            next_placeholder + 1
        ));
        sql
    }

    /// The total-count query over the same predicate. The join is omitted:
    /// `analysis_data` holds at most one row per CVE, so the left join never
    /// changes the row count.
    pub fn count_sql(&self) -> String {
        let mut sql = String::from("SELECT COUNT(*) AS total FROM cve_data c");
        if let Some(predicate) = self.predicate_sql() {
            sql.push(' ');
            sql.push_str(predicate);
        }
        sql
    }
}

/// Pagination metadata describing the full filtered population.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_count: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    pub fn new(page: i64, total_count: i64) -> Self {
        let total_pages = (total_count + PAGE_SIZE - 1) / PAGE_SIZE;
        Self {
            current_page: page,
            total_pages,
            total_count,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn default_query_orders_by_last_modified_desc() {
        let query = ListQuery::new(None, None, None, None);

        assert_eq!(
            query.data_sql(),
            "SELECT c.cve_id, c.published_date, c.last_modified_date, \
             c.vulnerability_status, c.updated_at AS cve_updated_at, \
             a.updated_at AS analysis_updated_at, a.risk_level, a.analysis_summary, \
             a.affected_products FROM cve_data c LEFT JOIN analysis_data a \
             ON c.cve_id = a.cve_id ORDER BY c.last_modified_date DESC \
             LIMIT $1 OFFSET $2"
        );
        assert_eq!(query.count_sql(), "SELECT COUNT(*) AS total FROM cve_data c");
        assert!(query.filter_pattern().is_none());
    }

    #[test]
    fn filter_shifts_limit_and_offset_placeholders() {
        let query = ListQuery::new(Some(2), Some("2021"), None, None);

        let sql = query.data_sql();
        assert!(sql.contains("WHERE c.cve_id ILIKE $1"));
        assert!(sql.ends_with("LIMIT $2 OFFSET $3"));
        assert_eq!(query.filter_pattern().as_deref(), Some("%2021%"));
        assert_eq!(query.offset(), 20);
    }

    #[test]
    fn filter_predicate_is_identical_in_data_and_count_queries() {
        let query = ListQuery::new(None, Some("2021"), None, None);

        let predicate = "WHERE c.cve_id ILIKE $1";
        assert!(query.data_sql().contains(predicate));
        assert!(query.count_sql().ends_with(predicate));
    }

    #[test]
    fn blank_filter_is_treated_as_absent() {
        let query = ListQuery::new(None, Some("   "), None, None);

        assert!(query.filter_pattern().is_none());
        assert!(!query.data_sql().contains("WHERE"));
        assert!(!query.count_sql().contains("WHERE"));
    }

    #[test_case(None, 1 ; "missing page")]
    #[test_case(Some(0), 1 ; "zero page")]
    #[test_case(Some(-5), 1 ; "negative page")]
    #[test_case(Some(3), 3 ; "page three")]
    fn page_is_floored_at_one(raw: Option<i64>, expected: i64) {
        let query = ListQuery::new(raw, None, None, None);
        assert_eq!(query.page(), expected);
        assert_eq!(query.offset(), (expected - 1) * PAGE_SIZE);
    }

    #[test]
    fn extreme_page_saturates_the_offset() {
        let query = ListQuery::new(Some(i64::MAX), None, None, None);

        assert_eq!(query.page(), i64::MAX);
        assert_eq!(query.offset(), i64::MAX);

        // far past the end is still a well-formed, empty page
        let pagination = Pagination::new(query.page(), 45);
        assert_eq!(pagination.total_pages, 3);
        assert!(!pagination.has_next_page);
        assert!(pagination.has_prev_page);
    }

    #[test]
    fn allowed_sort_keys_get_direction_and_tie_break() {
        let query = ListQuery::new(None, None, Some("published_date"), Some("asc"));
        assert!(query
            .data_sql()
            .contains("ORDER BY c.published_date ASC, c.last_modified_date DESC"));

        let query = ListQuery::new(None, None, Some("last_modified_date"), Some("DESC"));
        assert!(query
            .data_sql()
            .contains("ORDER BY c.last_modified_date DESC, c.last_modified_date DESC"));
    }

    #[test]
    fn unknown_sort_key_falls_back_to_default_ordering() {
        let query = ListQuery::new(None, None, Some("description"), Some("ASC"));
        assert!(query
            .data_sql()
            .contains("ORDER BY c.last_modified_date DESC LIMIT"));

        // column-name injection attempts are just unknown keys
        let query = ListQuery::new(None, None, Some("1; DROP TABLE cve_data"), None);
        assert!(query
            .data_sql()
            .contains("ORDER BY c.last_modified_date DESC LIMIT"));
    }

    #[test_case("ASC" ; "ascending")]
    #[test_case("desc" ; "descending")]
    fn analysis_sort_groups_nulls_last_in_both_directions(direction: &str) {
        let query = ListQuery::new(None, None, Some("analysis_updated_at"), Some(direction));

        let sql = query.data_sql();
        let null_group = "CASE WHEN a.updated_at IS NULL THEN 1 ELSE 0 END";
        let order = format!(
            "ORDER BY {null_group}, a.updated_at {}, c.last_modified_date DESC",
            direction.to_ascii_uppercase()
        );
        assert!(sql.contains(&order), "unexpected ordering in: {sql}");
    }

    #[test]
    fn invalid_sort_order_defaults_to_desc() {
        let query = ListQuery::new(None, None, Some("published_date"), Some("sideways"));
        assert!(query.data_sql().contains("ORDER BY c.published_date DESC"));
    }

    #[test_case(1, 0, 0, false, false ; "empty population")]
    #[test_case(1, 1, 1, false, false ; "single row")]
    #[test_case(1, 19, 1, false, false ; "one partial page")]
    #[test_case(1, 20, 1, false, false ; "one exact page")]
    #[test_case(1, 21, 2, true, false ; "spill onto second page")]
    #[test_case(2, 39, 2, false, true ; "last partial page")]
    #[test_case(1, 40, 2, true, false ; "two exact pages")]
    #[test_case(3, 45, 3, false, true ; "third of three pages")]
    fn pagination_metadata(
        page: i64,
        total_count: i64,
        total_pages: i64,
        has_next: bool,
        has_prev: bool,
    ) {
        let pagination = Pagination::new(page, total_count);

        assert_eq!(pagination.current_page, page);
        assert_eq!(pagination.total_pages, total_pages);
        assert_eq!(pagination.total_count, total_count);
        assert_eq!(pagination.has_next_page, has_next);
        assert_eq!(pagination.has_prev_page, has_prev);
    }

    #[test]
    fn page_beyond_the_end_keeps_consistent_metadata() {
        // 45 rows, page 3 starts at offset 40 and holds the last 5 rows;
        // page 4 is past the end but still well-formed.
        let query = ListQuery::new(Some(3), None, None, None);
        assert_eq!(query.offset(), 40);

        let pagination = Pagination::new(4, 45);
        assert_eq!(pagination.total_pages, 3);
        assert!(!pagination.has_next_page);
        assert!(pagination.has_prev_page);
    }

    #[test]
    fn pagination_serializes_with_camel_case_keys() {
        let json = serde_json::to_value(Pagination::new(2, 45)).unwrap();

        assert_eq!(json["currentPage"], 2);
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["totalCount"], 45);
        assert_eq!(json["hasNextPage"], true);
        assert_eq!(json["hasPrevPage"], true);
    }
}
