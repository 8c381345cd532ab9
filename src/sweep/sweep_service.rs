use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

use crate::error::{AppError, Result};

use super::sweep_models::{ExpiredRequest, NewAlert, RequestKind, SweepSummary};
use super::sweep_store::SweepStore;

pub const DEFAULT_EXPIRATION_MINUTES: i64 = 60;
pub const DEFAULT_ALERT_CONCURRENCY: usize = 8;

/// Alert write outcomes for a batch of expired rows.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct AlertTally {
    created: usize,
    failed: usize,
}

impl AlertTally {
    fn merge(self, other: AlertTally) -> AlertTally {
        AlertTally {
            created: self.created + other.created,
            failed: self.failed + other.failed,
        }
    }
}

/// Moves stale pending requests to their terminal status and alerts both
/// parties of each one.
#[derive(Clone)]
pub struct ExpirationSweeper {
    store: Arc<dyn SweepStore>,
    expiration_window: Duration,
    alert_concurrency: usize,
}

impl ExpirationSweeper {
    pub fn new(
        store: Arc<dyn SweepStore>,
        expiration_window: Duration,
        alert_concurrency: usize,
    ) -> Self {
        Self {
            store,
            expiration_window,
            alert_concurrency: alert_concurrency.max(1),
        }
    }

    /// Runs one sweep over consultations, then assistance requests.
    ///
    /// A failed conditional update aborts the sweep with that error. Rows
    /// already transitioned (and alerted) earlier in the sweep stay as they
    /// are. Alert writes are best-effort and only show up in the counts.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<SweepSummary> {
        let cutoff = now
            .checked_sub_signed(self.expiration_window)
            .ok_or_else(|| {
                AppError::Config(format!(
                    "expiration window of {} minutes puts the cutoff out of range",
                    self.expiration_window.num_minutes()
                ))
            })?;
        info!(%cutoff, "Starting expiration sweep");

        let (expired_consultations, consultation_alerts) =
            self.sweep_kind(RequestKind::Consultation, cutoff).await?;
        let (expired_assistance, assistance_alerts) =
            self.sweep_kind(RequestKind::Assistance, cutoff).await?;

        let alerts = consultation_alerts.merge(assistance_alerts);
        let summary = SweepSummary {
            expired_consultations,
            expired_assistance,
            alerts_created: alerts.created,
            alerts_failed: alerts.failed,
            completed_at: Utc::now(),
        };

        info!(
            expired_consultations,
            expired_assistance,
            alerts_created = alerts.created,
            alerts_failed = alerts.failed,
            "Expiration sweep finished"
        );
        Ok(summary)
    }

    async fn sweep_kind(
        &self,
        kind: RequestKind,
        cutoff: DateTime<Utc>,
    ) -> Result<(usize, AlertTally)> {
        let expired = self
            .store
            .expire_pending(kind, cutoff, RequestKind::CANCEL_REASON)
            .await
            .map_err(|e| {
                error!(table = kind.table(), error = %e, "Failed to expire pending requests");
                e
            })?;

        let count = expired.len();
        info!(table = kind.table(), count, "Expired pending requests");

        // Each task owns its row and a handle to the sweeper.
        let alerts = stream::iter(expired)
            .map(|request| {
                let this = self.clone();
                async move { this.notify_parties(kind, request).await }
            })
            .buffer_unordered(self.alert_concurrency)
            .fold(AlertTally::default(), |acc, tally| async move { acc.merge(tally) })
            .await;

        Ok((count, alerts))
    }

    async fn notify_parties(&self, kind: RequestKind, request: ExpiredRequest) -> AlertTally {
        let mut tally = AlertTally::default();
        self.write_alert(NewAlert::for_client(kind, &request), &mut tally)
            .await;

        match self.store.find_lawyer_user_id(request.lawyer_id).await {
            Ok(Some(lawyer_user_id)) => {
                self.write_alert(NewAlert::for_lawyer(kind, &request, lawyer_user_id), &mut tally)
                    .await;
            }
            Ok(None) => {
                debug!(request_id = %request.id, lawyer_id = %request.lawyer_id, "No lawyer owner, skipping lawyer alert");
            }
            Err(e) => {
                warn!(request_id = %request.id, lawyer_id = %request.lawyer_id, error = %e, "Lawyer lookup failed, skipping lawyer alert");
            }
        }

        tally
    }

    async fn write_alert(&self, alert: NewAlert, tally: &mut AlertTally) {
        match self.store.insert_alert(&alert).await {
            Ok(()) => tally.created += 1,
            Err(e) => {
                warn!(
                    user_id = %alert.user_id,
                    related_id = %alert.related_id,
                    alert_type = %alert.alert_type,
                    error = %e,
                    "Failed to write activity alert"
                );
                tally.failed += 1;
            }
        }
    }
}
