use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;

use super::sweep_models::{ExpiredRequest, NewAlert, RequestKind};

/// Everything the expiration sweep needs from the data platform.
///
/// `expire_pending` must be a single atomic conditional update: the
/// `status = pending AND created_at < cutoff` check and the write happen in
/// one statement, and only the rows that statement changed are returned.
/// Overlapping sweeps then never transition (or alert on) a row twice.
#[async_trait]
pub trait SweepStore: Send + Sync {
    async fn expire_pending(
        &self,
        kind: RequestKind,
        cutoff: DateTime<Utc>,
        reason: &str,
    ) -> Result<Vec<ExpiredRequest>>;

    /// Resolves a lawyer row to the user that owns it. `Ok(None)` when no
    /// lawyer row matches.
    async fn find_lawyer_user_id(&self, lawyer_id: Uuid) -> Result<Option<Uuid>>;

    async fn insert_alert(&self, alert: &NewAlert) -> Result<()>;
}
