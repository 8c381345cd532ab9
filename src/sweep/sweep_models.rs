use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle status shared by consultation and assistance requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Active,
    Expired,
    Completed,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Active => "active",
            RequestStatus::Expired => "expired",
            RequestStatus::Completed => "completed",
            RequestStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    ConsultationExpired,
    AssistanceExpired,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::ConsultationExpired => "consultation_expired",
            AlertType::AssistanceExpired => "assistance_expired",
        }
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two request collections the sweep walks, with everything that
/// differs between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Consultation,
    Assistance,
}

impl RequestKind {
    pub const ALL: [RequestKind; 2] = [RequestKind::Consultation, RequestKind::Assistance];

    pub fn table(&self) -> &'static str {
        match self {
            RequestKind::Consultation => "consultation_requests",
            RequestKind::Assistance => "legal_assistance_requests",
        }
    }

    pub fn terminal_status(&self) -> RequestStatus {
        match self {
            RequestKind::Consultation => RequestStatus::Expired,
            RequestKind::Assistance => RequestStatus::Cancelled,
        }
    }

    pub fn alert_type(&self) -> AlertType {
        match self {
            RequestKind::Consultation => AlertType::ConsultationExpired,
            RequestKind::Assistance => AlertType::AssistanceExpired,
        }
    }

    /// Reason stamped on every auto-expired row, whatever its collection.
    pub const CANCEL_REASON: &'static str = "تم الإلغاء تلقائياً لعدم الرد خلال ساعة";

    pub fn alert_title(&self) -> &'static str {
        match self {
            RequestKind::Consultation => "انتهت صلاحية طلب الاستشارة",
            RequestKind::Assistance => "انتهت صلاحية طلب المساعدة القانونية",
        }
    }

    pub fn client_message(&self) -> &'static str {
        match self {
            RequestKind::Consultation => {
                "تم إلغاء طلب الاستشارة تلقائياً لعدم قبوله من المحامي خلال ساعة"
            }
            RequestKind::Assistance => {
                "تم إلغاء طلب المساعدة القانونية تلقائياً لعدم قبوله من المحامي خلال ساعة"
            }
        }
    }

    pub fn lawyer_message(&self) -> &'static str {
        match self {
            RequestKind::Consultation => "انتهت صلاحية طلب استشارة لعدم الرد عليه خلال ساعة",
            RequestKind::Assistance => {
                "انتهت صلاحية طلب مساعدة قانونية لعدم الرد عليه خلال ساعة"
            }
        }
    }
}

/// Columns returned by the conditional update for each transitioned row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ExpiredRequest {
    pub id: Uuid,
    pub client_id: Uuid,
    pub lawyer_id: Uuid,
}

/// An activity alert row as written by the sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAlert {
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub title: String,
    pub message: String,
    pub related_id: Uuid,
}

impl NewAlert {
    pub fn for_client(kind: RequestKind, request: &ExpiredRequest) -> Self {
        Self {
            user_id: request.client_id,
            alert_type: kind.alert_type(),
            title: kind.alert_title().to_string(),
            message: kind.client_message().to_string(),
            related_id: request.id,
        }
    }

    pub fn for_lawyer(kind: RequestKind, request: &ExpiredRequest, lawyer_user_id: Uuid) -> Self {
        Self {
            user_id: lawyer_user_id,
            alert_type: kind.alert_type(),
            title: kind.alert_title().to_string(),
            message: kind.lawyer_message().to_string(),
            related_id: request.id,
        }
    }
}

/// Outcome of one full sweep across both collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepSummary {
    pub expired_consultations: usize,
    pub expired_assistance: usize,
    pub alerts_created: usize,
    pub alerts_failed: usize,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SweepResponse {
    pub success: bool,
    pub expired_consultations: usize,
    pub expired_assistance: usize,
    /// Completion time, RFC 3339 UTC with milliseconds.
    pub timestamp: String,
    pub alerts_created: usize,
    pub alerts_failed: usize,
}

impl From<SweepSummary> for SweepResponse {
    fn from(summary: SweepSummary) -> Self {
        Self {
            success: true,
            expired_consultations: summary.expired_consultations,
            expired_assistance: summary.expired_assistance,
            timestamp: summary
                .completed_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            alerts_created: summary.alerts_created,
            alerts_failed: summary.alerts_failed,
        }
    }
}
