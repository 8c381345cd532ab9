use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;

use super::sweep_models::{ExpiredRequest, NewAlert, RequestKind, RequestStatus};
use super::sweep_store::SweepStore;

/// Talks to the platform's Postgres directly.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn expire_statement(kind: RequestKind) -> String {
    format!(
        "UPDATE {} SET status = $1, auto_expired = true, cancel_reason = $2
         WHERE status = $3 AND created_at < $4
         RETURNING id, client_id, lawyer_id",
        kind.table()
    )
}

#[async_trait]
impl SweepStore for PgStore {
    async fn expire_pending(
        &self,
        kind: RequestKind,
        cutoff: DateTime<Utc>,
        reason: &str,
    ) -> Result<Vec<ExpiredRequest>> {
        let rows = sqlx::query_as::<_, ExpiredRequest>(&expire_statement(kind))
            .bind(kind.terminal_status().as_str())
            .bind(reason)
            .bind(RequestStatus::Pending.as_str())
            .bind(cutoff)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn find_lawyer_user_id(&self, lawyer_id: Uuid) -> Result<Option<Uuid>> {
        let user_id = sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM lawyers WHERE id = $1")
            .bind(lawyer_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user_id)
    }

    async fn insert_alert(&self, alert: &NewAlert) -> Result<()> {
        sqlx::query(
            "INSERT INTO activity_alerts (user_id, type, title, message, related_id)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(alert.user_id)
        .bind(alert.alert_type.as_str())
        .bind(&alert.title)
        .bind(&alert.message)
        .bind(alert.related_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
