use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use diesel::sql_query;
use diesel::sql_types::{BigInt, Text};
use diesel_migrations::{FileBasedMigrations, MigrationHarness};

pub mod models;
pub mod query;
pub mod schema;

use models::{AnalysisRecord, CountRow, CveDetail, CveRecord, CveSummary};
use query::{ListQuery, PAGE_SIZE};

#[derive(thiserror::Error, Debug)]
#[error("Database error.")]
pub struct DatabaseError {
    #[from]
    source: PoolError,
}

pub struct PostgresRepository {
    pool: Pool<ConnectionManager<PgConnection>>,
    migrations: FileBasedMigrations,
}

impl PostgresRepository {
    pub fn new(database_url: &str, migrations_dir: &str) -> Result<Self> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = Pool::new(manager).map_err(DatabaseError::from)?;
        let migrations = FileBasedMigrations::from_path(migrations_dir)
            .map_err(|e| anyhow!("invalid migrations directory: {e}"))?;
        Ok(Self { pool, migrations })
    }

    pub fn any_pending_migrations(&self) -> Result<bool> {
        let mut conn = self.pool.get().map_err(DatabaseError::from)?;
        conn.has_pending_migration(self.migrations.clone())
            .map_err(|e| anyhow!("failed checking pending migrations: {e}"))
    }

    pub fn run_pending_migrations(&self) -> Result<()> {
        let mut conn = self.pool.get().map_err(DatabaseError::from)?;
        let versions = conn
            .run_pending_migrations(self.migrations.clone())
            .map_err(|e| anyhow!("failed running pending migrations: {e}"))?;
        for version in versions {
            log::info!("applied migration {}", version);
        }
        Ok(())
    }

    /// Fetch the merged detail view for one CVE, or `None` if the catalog
    /// has no such identifier. An absent analysis row is not an error.
    pub fn get_cve(&self, cve_id: &str) -> Result<Option<CveDetail>> {
        use schema::{analysis_data, cve_data};

        let mut conn = self.pool.get().map_err(DatabaseError::from)?;

        let row = cve_data::table
            .left_join(analysis_data::table)
            .filter(cve_data::cve_id.eq(cve_id))
            .first::<(CveRecord, Option<AnalysisRecord>)>(&mut conn)
            .optional()
            .context("error fetching cve")?;

        Ok(row.map(|(cve, analysis)| CveDetail::project(cve, analysis)))
    }

    /// Fetch one page of the filtered list plus the total count of the
    /// filtered population. Both queries come from the same [`ListQuery`]
    /// and therefore share one predicate.
    pub fn list_cves(&self, query: &ListQuery) -> Result<(Vec<CveSummary>, i64)> {
        log::debug!("listing cves: {:?} ...", query);

        let mut conn = self.pool.get().map_err(DatabaseError::from)?;

        let start = Instant::now();
        let mut data = sql_query(query.data_sql()).into_boxed::<Pg>();
        if let Some(pattern) = query.filter_pattern() {
            data = data.bind::<Text, _>(pattern);
        }
        let rows = data
            .bind::<BigInt, _>(PAGE_SIZE)
            .bind::<BigInt, _>(query.offset())
            .load::<CveSummary>(&mut conn)
            .context("error loading cve page")?;
        log::debug!(
            "fetched {} rows in {} ms",
            rows.len(),
            start.elapsed().as_millis()
        );

        let mut count = sql_query(query.count_sql()).into_boxed::<Pg>();
        if let Some(pattern) = query.filter_pattern() {
            count = count.bind::<Text, _>(pattern);
        }
        let total = count
            .get_result::<CountRow>(&mut conn)
            .context("error counting cves")?
            .total;

        Ok((rows, total))
    }
}
