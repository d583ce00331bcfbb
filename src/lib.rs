pub mod client;
pub mod config;
pub mod credential;
pub mod logging;
pub mod runner;
pub mod types;

pub use client::{PlanxClient, TaskApi};
pub use config::{Delays, PlanxConfig};
pub use credential::{Credential, load_credentials, parse_credentials};
pub use runner::{RoundSummary, Runner};
pub use types::{ApiResponse, ClaimOutcome};
