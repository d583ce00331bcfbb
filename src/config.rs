//! Runtime configuration.
//!
//! Every value has a default matching the PlanX web wallet, so the binary
//! runs with no setup beyond a `token.txt`. A handful of environment
//! variables can override the defaults.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://mpc-api.planx.io/api/v1/telegram";
pub const DEFAULT_ORIGIN: &str = "https://tg-wallet.planx.io";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
pub const DEFAULT_TOKEN_FILE: &str = "token.txt";
pub const DEFAULT_LOG_FILE: &str = "claim_task.log";

/// Task identifiers attempted for every account, in order.
pub const DEFAULT_TASK_IDS: &[&str] = &[
    "m20250212173934013124700001",
    "m20250212173935571986800022",
    "m20250212173935594680500028",
    "m20250212173935584402900025",
    "m20250212173935604389100031",
    "m20250212173935613755700034",
    "m20250214173952165258600005",
    "m20250213173941632390600015",
    "m20250213173941720460300018",
    "m20250214173952169399300006",
    "m20250213173941728955700021",
    "m20250213173941736560000024",
    "m20250213173941767785900027",
    "m20250212173935456044700010",
    "m20250212173935470203200013",
    "m20250212173935480395100016",
    "m20250212173935519374200019",
];

/// Fixed pauses used by the driver loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delays {
    /// After every call and every claim, whatever the outcome.
    pub between_requests: Duration,
    /// Between the call phase and the claim phase of one account.
    pub before_claim: Duration,
    /// After all accounts have been processed.
    pub between_rounds: Duration,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            between_requests: Duration::from_secs(5),
            before_claim: Duration::from_secs(10),
            between_rounds: Duration::from_secs(3 * 60 * 60),
        }
    }
}

impl Delays {
    /// No pauses at all.
    pub fn none() -> Self {
        Self {
            between_requests: Duration::ZERO,
            before_claim: Duration::ZERO,
            between_rounds: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlanxConfig {
    /// API root, without a trailing slash.
    pub base_url: String,
    /// Web wallet origin, sent as `Origin` and (with a trailing slash) `Referer`.
    pub origin: String,
    pub user_agent: String,
    pub task_ids: Vec<String>,
    pub delays: Delays,
    pub token_file: PathBuf,
    pub log_file: PathBuf,
}

impl Default for PlanxConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            task_ids: DEFAULT_TASK_IDS.iter().map(|id| id.to_string()).collect(),
            delays: Delays::default(),
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl PlanxConfig {
    /// Defaults, overridden by `PLANX_*` environment variables when set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("PLANX_TOKEN_FILE").filter(|v| !v.trim().is_empty()) {
            config.token_file = PathBuf::from(path.trim());
        }
        if let Some(path) = lookup("PLANX_LOG_FILE").filter(|v| !v.trim().is_empty()) {
            config.log_file = PathBuf::from(path.trim());
        }
        if let Some(url) = lookup("PLANX_BASE_URL").filter(|v| !v.trim().is_empty()) {
            config.base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(ids) = lookup("PLANX_TASK_IDS") {
            let ids = parse_task_ids(&ids);
            if !ids.is_empty() {
                config.task_ids = ids;
            }
        }

        config
    }

    pub fn info_url(&self) -> String {
        format!("{}/info", self.base_url)
    }

    pub fn call_url(&self) -> String {
        format!("{}/task/call", self.base_url)
    }

    pub fn claim_url(&self) -> String {
        format!("{}/task/claim", self.base_url)
    }

    pub fn referer(&self) -> String {
        format!("{}/", self.origin.trim_end_matches('/'))
    }
}

fn parse_task_ids(s: &str) -> Vec<String> {
    s.split(',')
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect()
}
