//! PostgREST client for the hosted data platform.
//!
//! Every call carries the service credential in both the `apikey` and
//! `Authorization` headers, which bypasses row-level policies.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::{AppError, Result};

use super::sweep_models::{ExpiredRequest, NewAlert, RequestKind, RequestStatus};
use super::sweep_store::SweepStore;

/// HTTP request timeout for a single data platform call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const EXPIRED_COLUMNS: &str = "id,client_id,lawyer_id";

#[derive(Clone)]
pub struct RestStore {
    client: reqwest::Client,
    rest_url: String,
    service_key: String,
}

#[derive(Deserialize)]
struct LawyerOwner {
    user_id: Option<Uuid>,
}

impl RestStore {
    pub fn new(base_url: &str, service_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            rest_url: format!("{}/rest/v1", base_url.trim_end_matches('/')),
            service_key: service_key.to_string(),
        })
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.rest_url, table))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }
}

/// Filter for the conditional update, in PostgREST operator syntax.
fn expire_filter(cutoff: DateTime<Utc>) -> Vec<(&'static str, String)> {
    vec![
        ("status", format!("eq.{}", RequestStatus::Pending)),
        (
            "created_at",
            format!("lt.{}", cutoff.to_rfc3339_opts(SecondsFormat::Millis, true)),
        ),
        ("select", EXPIRED_COLUMNS.to_string()),
    ]
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(AppError::Store {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl SweepStore for RestStore {
    async fn expire_pending(
        &self,
        kind: RequestKind,
        cutoff: DateTime<Utc>,
        reason: &str,
    ) -> Result<Vec<ExpiredRequest>> {
        // A filtered PATCH is one UPDATE statement on the server side.
        let response = self
            .request(Method::PATCH, kind.table())
            .query(&expire_filter(cutoff))
            .header("Prefer", "return=representation")
            .json(&json!({
                "status": kind.terminal_status(),
                "auto_expired": true,
                "cancel_reason": reason,
            }))
            .send()
            .await?;

        let rows = ensure_success(response)
            .await?
            .json::<Vec<ExpiredRequest>>()
            .await?;

        Ok(rows)
    }

    async fn find_lawyer_user_id(&self, lawyer_id: Uuid) -> Result<Option<Uuid>> {
        let response = self
            .request(Method::GET, "lawyers")
            .query(&[
                ("id", format!("eq.{}", lawyer_id)),
                ("select", "user_id".to_string()),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;

        let owners = ensure_success(response)
            .await?
            .json::<Vec<LawyerOwner>>()
            .await?;

        Ok(owners.into_iter().next().and_then(|owner| owner.user_id))
    }

    async fn insert_alert(&self, alert: &NewAlert) -> Result<()> {
        let response = self
            .request(Method::POST, "activity_alerts")
            .header("Prefer", "return=minimal")
            .json(alert)
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }
}
