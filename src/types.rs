use serde::{Deserialize, Serialize};
use std::fmt;

/// Body of the task call and claim requests
#[derive(Debug, Serialize)]
pub struct TaskRequest<'a> {
    #[serde(rename = "taskId")]
    pub task_id: &'a str,
}

/// Envelope shared by every PlanX endpoint. Only the fields we inspect are
/// modelled; the rest of the payload is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ApiResponse {
    /// Only a JSON `true` counts. Other types must not break parsing of the
    /// fields claims depend on.
    #[serde(default)]
    pub success: Option<serde_json::Value>,
    /// Claim result code. The API sends it as a string; anything else is not a success.
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.success.as_ref().and_then(|s| s.as_bool()) == Some(true)
    }

    pub fn code_is_ok(&self) -> bool {
        self.code.as_ref().and_then(|c| c.as_str()) == Some("200")
    }

    pub fn message(&self) -> &str {
        self.message
            .as_ref()
            .and_then(|m| m.as_str())
            .unwrap_or_default()
    }

    pub fn is_already_claimed(&self) -> bool {
        self.message().to_lowercase().contains("already claimed")
    }
}

/// Result of a claim attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    Claimed,
    /// The task was claimed earlier. Not an error.
    AlreadyClaimed,
    Failed,
}

impl ClaimOutcome {
    /// Classify a claim response from its HTTP status and raw body.
    pub fn from_response(status: u16, body: &str) -> Self {
        if status != 200 {
            return Self::Failed;
        }
        match serde_json::from_str::<ApiResponse>(body) {
            Ok(resp) if resp.code_is_ok() => Self::Claimed,
            Ok(resp) if resp.is_already_claimed() => Self::AlreadyClaimed,
            _ => Self::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Claimed)
    }
}

impl fmt::Display for ClaimOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Claimed => write!(f, "CLAIMED"),
            Self::AlreadyClaimed => write!(f, "ALREADY_CLAIMED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// Validation and task call share one criterion: HTTP 200 and `success: true`.
pub fn is_successful_response(status: u16, body: &str) -> bool {
    status == 200
        && serde_json::from_str::<ApiResponse>(body)
            .map(|resp| resp.is_success())
            .unwrap_or(false)
}
