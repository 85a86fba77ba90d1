use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Array, BigInt, Int4, Nullable, Text, Timestamptz};
use serde::Serialize;

/// A row of the `cve_data` table, as imported from the vendor feed.
#[derive(Queryable, Debug, Clone)]
pub struct CveRecord {
    pub cve_id: String,
    pub published_date: DateTime<Utc>,
    pub last_modified_date: DateTime<Utc>,
    pub vulnerability_status: String,
    pub description: String,
    pub cvss_v3_vector: Option<String>,
    pub cvss_v3_base_score: Option<f64>,
    pub cvss_v3_base_severity: Option<String>,
    pub cvss_v4_vector: Option<String>,
    pub cvss_v4_base_score: Option<f64>,
    pub cvss_v4_base_severity: Option<String>,
    pub affected_products: Vec<String>,
    pub reference_links: Vec<String>,
    pub cwe_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A row of the `analysis_data` table. At most one exists per CVE; the
/// analysis pipeline owns these rows and fills them in at its own pace.
#[derive(Queryable, Debug, Clone)]
pub struct AnalysisRecord {
    pub cve_id: String,
    pub analysis_summary: Option<String>,
    pub recommendation: Option<String>,
    pub risk_level: Option<i32>,
    pub vulnerability_type: Option<String>,
    pub affected_systems: Option<String>,
    pub affected_products: Option<Vec<String>>,
    pub technical_details: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The merged detail view of a CVE and its optional analysis.
///
/// Both tables carry an `affected_products` column and the two are maintained
/// independently, so the projection keeps both under distinct names instead
/// of letting one shadow the other. Analysis timestamps keep their plain
/// `created_at`/`updated_at` names in the response body.
#[derive(Debug, Clone, Serialize)]
pub struct CveDetail {
    pub cve_id: String,
    pub analysis_summary: Option<String>,
    pub recommendation: Option<String>,
    pub risk_level: Option<i32>,
    pub vulnerability_type: Option<String>,
    pub affected_systems: Option<String>,
    pub analysis_affected_products: Option<Vec<String>>,
    pub technical_details: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub published_date: DateTime<Utc>,
    pub last_modified_date: DateTime<Utc>,
    pub vulnerability_status: String,
    pub description: String,
    pub cvss_v3_vector: Option<String>,
    pub cvss_v3_base_score: Option<f64>,
    pub cvss_v3_base_severity: Option<String>,
    pub cvss_v4_vector: Option<String>,
    pub cvss_v4_base_score: Option<f64>,
    pub cvss_v4_base_severity: Option<String>,
    pub cve_affected_products: Vec<String>,
    pub reference_links: Vec<String>,
    pub cwe_ids: Vec<String>,
}

impl CveDetail {
    /// Project a joined row into the merged view. A CVE without analysis is
    /// still a complete record; every analysis-origin field is simply null.
    pub fn project(cve: CveRecord, analysis: Option<AnalysisRecord>) -> Self {
        let mut detail = Self {
            cve_id: cve.cve_id,
            analysis_summary: None,
            recommendation: None,
            risk_level: None,
            vulnerability_type: None,
            affected_systems: None,
            analysis_affected_products: None,
            technical_details: None,
            created_at: None,
            updated_at: None,
            published_date: cve.published_date,
            last_modified_date: cve.last_modified_date,
            vulnerability_status: cve.vulnerability_status,
            description: cve.description,
            cvss_v3_vector: cve.cvss_v3_vector,
            cvss_v3_base_score: cve.cvss_v3_base_score,
            cvss_v3_base_severity: cve.cvss_v3_base_severity,
            cvss_v4_vector: cve.cvss_v4_vector,
            cvss_v4_base_score: cve.cvss_v4_base_score,
            cvss_v4_base_severity: cve.cvss_v4_base_severity,
            cve_affected_products: cve.affected_products,
            reference_links: cve.reference_links,
            cwe_ids: cve.cwe_ids,
        };

        if let Some(analysis) = analysis {
            detail.analysis_summary = analysis.analysis_summary;
            detail.recommendation = analysis.recommendation;
            detail.risk_level = analysis.risk_level;
            detail.vulnerability_type = analysis.vulnerability_type;
            detail.affected_systems = analysis.affected_systems;
            detail.analysis_affected_products = analysis.affected_products;
            detail.technical_details = analysis.technical_details;
            detail.created_at = Some(analysis.created_at);
            detail.updated_at = Some(analysis.updated_at);
        }

        detail
    }
}

/// One row of the paged list query. Loaded by column name since the list
/// query is raw SQL with a dynamic ORDER BY clause.
#[derive(QueryableByName, Debug, Clone, Serialize)]
pub struct CveSummary {
    #[diesel(sql_type = Text)]
    pub cve_id: String,
    #[diesel(sql_type = Timestamptz)]
    pub published_date: DateTime<Utc>,
    #[diesel(sql_type = Timestamptz)]
    pub last_modified_date: DateTime<Utc>,
    #[diesel(sql_type = Text)]
    pub vulnerability_status: String,
    #[diesel(sql_type = Nullable<Timestamptz>)]
    pub cve_updated_at: Option<DateTime<Utc>>,
    #[diesel(sql_type = Nullable<Timestamptz>)]
    pub analysis_updated_at: Option<DateTime<Utc>>,
    #[diesel(sql_type = Nullable<Int4>)]
    pub risk_level: Option<i32>,
    #[diesel(sql_type = Nullable<Text>)]
    pub analysis_summary: Option<String>,
    #[diesel(sql_type = Nullable<Array<Text>>)]
    pub affected_products: Option<Vec<String>>,
}

#[derive(QueryableByName, Debug)]
pub(crate) struct CountRow {
    #[diesel(sql_type = BigInt)]
    pub total: i64,
}
