//! Persistence capability used by the screening pipeline.
//!
//! `AppState` holds an `Arc<dyn MatchStore>`; production uses `PgMatchStore`.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::models::cv_match::{CvMatchRow, NewCvMatch};
use crate::models::job::JobRow;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("A match record for '{file_name}' already exists on job {job_id}")]
    Conflict { job_id: String, file_name: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn get_job(&self, job_id: &str) -> Result<Option<JobRow>, StoreError>;

    /// Inserts a record. Fails with `StoreError::Conflict` if (job_id, file_name) exists.
    async fn create_match_record(&self, record: &NewCvMatch) -> Result<CvMatchRow, StoreError>;

    /// Inserts a record, replacing any existing one for (job_id, file_name).
    async fn replace_match_record(&self, record: &NewCvMatch) -> Result<CvMatchRow, StoreError>;

    /// All records for a job, highest score first.
    async fn list_match_records(&self, job_id: &str) -> Result<Vec<CvMatchRow>, StoreError>;
}

pub struct PgMatchStore {
    pool: PgPool,
}

impl PgMatchStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const RETURNING: &str =
    "RETURNING id, job_id, file_name, extracted_skills, match_score, match_status, extracted_text, uploaded_at";

#[async_trait]
impl MatchStore for PgMatchStore {
    async fn get_job(&self, job_id: &str) -> Result<Option<JobRow>, StoreError> {
        let job = sqlx::query_as::<_, JobRow>(
            "SELECT id, title, requirements, status, created_at FROM jobs WHERE id = $1",
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(job)
    }

    async fn create_match_record(&self, record: &NewCvMatch) -> Result<CvMatchRow, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO cv_matches
                (job_id, file_name, extracted_skills, match_score, match_status, extracted_text)
            VALUES ($1, $2, $3, $4, $5, $6)
            {RETURNING}
            "#
        );
        bind_record(sqlx::query_as::<_, CvMatchRow>(&sql), record)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| conflict_or_database(e, record))
    }

    async fn replace_match_record(&self, record: &NewCvMatch) -> Result<CvMatchRow, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM cv_matches WHERE job_id = $1 AND file_name = $2")
            .bind(&record.job_id)
            .bind(&record.file_name)
            .execute(&mut *tx)
            .await?;

        let sql = format!(
            r#"
            INSERT INTO cv_matches
                (job_id, file_name, extracted_skills, match_score, match_status, extracted_text)
            VALUES ($1, $2, $3, $4, $5, $6)
            {RETURNING}
            "#
        );
        // A concurrent writer can insert between our DELETE and INSERT.
        let row = bind_record(sqlx::query_as::<_, CvMatchRow>(&sql), record)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| conflict_or_database(e, record))?;

        tx.commit().await?;
        Ok(row)
    }

    async fn list_match_records(&self, job_id: &str) -> Result<Vec<CvMatchRow>, StoreError> {
        let rows = sqlx::query_as::<_, CvMatchRow>(
            r#"
            SELECT id, job_id, file_name, extracted_skills, match_score, match_status,
                   extracted_text, uploaded_at
            FROM cv_matches
            WHERE job_id = $1
            ORDER BY match_score DESC, id ASC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

fn conflict_or_database(e: sqlx::Error, record: &NewCvMatch) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return StoreError::Conflict {
                job_id: record.job_id.clone(),
                file_name: record.file_name.clone(),
            };
        }
    }
    StoreError::Database(e)
}

fn bind_record<'q>(
    query: sqlx::query::QueryAs<'q, sqlx::Postgres, CvMatchRow, sqlx::postgres::PgArguments>,
    record: &'q NewCvMatch,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, CvMatchRow, sqlx::postgres::PgArguments> {
    query
        .bind(&record.job_id)
        .bind(&record.file_name)
        .bind(&record.extracted_skills)
        .bind(i32::from(record.match_score))
        .bind(record.match_status.as_str())
        .bind(&record.extracted_text)
}
