//! In-process `SweepStore` used by the sweep and HTTP tests.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{AppError, Result};

use super::sweep_models::{ExpiredRequest, NewAlert, RequestKind, RequestStatus};
use super::sweep_store::SweepStore;

#[derive(Debug, Clone)]
pub struct StoredRequest {
    pub kind: RequestKind,
    pub id: Uuid,
    pub client_id: Uuid,
    pub lawyer_id: Uuid,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub auto_expired: bool,
    pub cancel_reason: Option<String>,
}

#[derive(Default)]
struct Tables {
    requests: Vec<StoredRequest>,
    lawyers: HashMap<Uuid, Uuid>,
    alerts: Vec<NewAlert>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failing_updates: Mutex<HashSet<&'static str>>,
    failing_lookups: Mutex<bool>,
    failing_alerts_for: Mutex<HashSet<Uuid>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_lawyer(&self, lawyer_id: Uuid, user_id: Uuid) {
        self.tables.lock().await.lawyers.insert(lawyer_id, user_id);
    }

    pub async fn add_request(
        &self,
        kind: RequestKind,
        status: RequestStatus,
        created_at: DateTime<Utc>,
        lawyer_id: Uuid,
    ) -> StoredRequest {
        let request = StoredRequest {
            kind,
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            lawyer_id,
            status,
            created_at,
            auto_expired: false,
            cancel_reason: None,
        };
        self.tables.lock().await.requests.push(request.clone());
        request
    }

    pub async fn request(&self, id: Uuid) -> Option<StoredRequest> {
        self.tables
            .lock()
            .await
            .requests
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    pub async fn alerts(&self) -> Vec<NewAlert> {
        self.tables.lock().await.alerts.clone()
    }

    pub async fn fail_updates_on(&self, kind: RequestKind) {
        self.failing_updates.lock().await.insert(kind.table());
    }

    pub async fn fail_lookups(&self) {
        *self.failing_lookups.lock().await = true;
    }

    pub async fn fail_alerts_for(&self, user_id: Uuid) {
        self.failing_alerts_for.lock().await.insert(user_id);
    }
}

#[async_trait]
impl SweepStore for MemoryStore {
    async fn expire_pending(
        &self,
        kind: RequestKind,
        cutoff: DateTime<Utc>,
        reason: &str,
    ) -> Result<Vec<ExpiredRequest>> {
        if self.failing_updates.lock().await.contains(kind.table()) {
            return Err(AppError::Store {
                status: 500,
                body: format!("update on {} rejected", kind.table()),
            });
        }

        // Predicate and write happen under one lock, like a single UPDATE.
        let mut tables = self.tables.lock().await;
        let expired: Vec<ExpiredRequest> = tables
            .requests
            .iter_mut()
            .filter(|r| {
                r.kind == kind && r.status == RequestStatus::Pending && r.created_at < cutoff
            })
            .map(|r| {
                r.status = kind.terminal_status();
                r.auto_expired = true;
                r.cancel_reason = Some(reason.to_string());
                ExpiredRequest {
                    id: r.id,
                    client_id: r.client_id,
                    lawyer_id: r.lawyer_id,
                }
            })
            .collect();

        Ok(expired)
    }

    async fn find_lawyer_user_id(&self, lawyer_id: Uuid) -> Result<Option<Uuid>> {
        if *self.failing_lookups.lock().await {
            return Err(AppError::Store {
                status: 503,
                body: "lookup unavailable".to_string(),
            });
        }
        Ok(self.tables.lock().await.lawyers.get(&lawyer_id).copied())
    }

    async fn insert_alert(&self, alert: &NewAlert) -> Result<()> {
        if self.failing_alerts_for.lock().await.contains(&alert.user_id) {
            return Err(AppError::Store {
                status: 409,
                body: "alert rejected".to_string(),
            });
        }
        self.tables.lock().await.alerts.push(alert.clone());
        Ok(())
    }
}
