//! PostgreSQL status store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};

use filevet_core::models::{RequestStatus, StatusKind};
use filevet_core::AppError;

use crate::traits::StatusStore;

/// Row shape for `request_status`.
///
/// `created_at` is nullable in the schema only: rows written before the
/// column existed carry NULL and are reclaimed by the retention sweep. The
/// domain model itself never holds a missing creation time.
#[derive(sqlx::FromRow)]
struct StatusRow {
    file_id: String,
    file_name: String,
    status: String,
    result: Option<serde_json::Value>,
    created_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl StatusRow {
    fn into_status(self) -> Result<RequestStatus, AppError> {
        let status: StatusKind = self
            .status
            .parse()
            .map_err(|e| AppError::Internal(format!("Corrupt status row: {}", e)))?;
        let result = self.result.map(serde_json::from_value).transpose()?;
        Ok(RequestStatus {
            file_id: self.file_id,
            file_name: self.file_name,
            status,
            result,
            // Legacy NULL rows surface with their update time as a floor;
            // the sweeper removes them via find_missing_created.
            created_at: self.created_at.unwrap_or(self.updated_at),
            updated_at: self.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct PgStatusStore {
    pool: PgPool,
}

impl PgStatusStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the embedded migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl StatusStore for PgStatusStore {
    async fn find_by_id(&self, file_id: &str) -> Result<Option<RequestStatus>, AppError> {
        let row: Option<StatusRow> = sqlx::query_as::<Postgres, StatusRow>(
            r#"
            SELECT file_id, file_name, status, result, created_at, updated_at
            FROM request_status
            WHERE file_id = $1
            "#,
        )
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(StatusRow::into_status).transpose()
    }

    async fn save(&self, status: &RequestStatus) -> Result<(), AppError> {
        let result = status
            .result
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;

        // COALESCE keeps the stored creation time even when two writers race
        // for the same file id; everything else is last write wins.
        sqlx::query(
            r#"
            INSERT INTO request_status (file_id, file_name, status, result, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (file_id) DO UPDATE SET
                file_name = EXCLUDED.file_name,
                status = EXCLUDED.status,
                result = EXCLUDED.result,
                created_at = COALESCE(request_status.created_at, EXCLUDED.created_at),
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&status.file_id)
        .bind(&status.file_name)
        .bind(status.status.to_string())
        .bind(result)
        .bind(status.created_at)
        .bind(status.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_by_id(&self, file_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM request_status WHERE file_id = $1")
            .bind(file_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_by_status_updated_before(
        &self,
        status: StatusKind,
        threshold: DateTime<Utc>,
    ) -> Result<Vec<RequestStatus>, AppError> {
        let rows: Vec<StatusRow> = sqlx::query_as::<Postgres, StatusRow>(
            r#"
            SELECT file_id, file_name, status, result, created_at, updated_at
            FROM request_status
            WHERE status = $1 AND updated_at < $2
            ORDER BY updated_at
            "#,
        )
        .bind(status.to_string())
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(StatusRow::into_status).collect()
    }

    async fn find_missing_created(&self) -> Result<Vec<String>, AppError> {
        let ids: Vec<(String,)> =
            sqlx::query_as("SELECT file_id FROM request_status WHERE created_at IS NULL")
                .fetch_all(&self.pool)
                .await?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }
}
