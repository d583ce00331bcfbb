//! The call-then-claim cycle over every account.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use tokio::time::sleep;
use tracing::Instrument;

use crate::client::TaskApi;
use crate::config::Delays;
use crate::credential::{Credential, load_credentials};
use crate::types::ClaimOutcome;

/// Counters for one pass over all credentials
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RoundSummary {
    pub credentials_processed: usize,
    pub credentials_skipped: usize,
    pub calls_attempted: usize,
    pub calls_succeeded: usize,
    pub claims_attempted: usize,
    pub claims_succeeded: usize,
    pub claims_already_done: usize,
    pub claims_failed: usize,
}

impl RoundSummary {
    fn record_claim(&mut self, outcome: ClaimOutcome) {
        self.claims_attempted += 1;
        match outcome {
            ClaimOutcome::Claimed => self.claims_succeeded += 1,
            ClaimOutcome::AlreadyClaimed => self.claims_already_done += 1,
            ClaimOutcome::Failed => self.claims_failed += 1,
        }
    }
}

impl fmt::Display for RoundSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} account(s) processed, {} skipped; calls {}/{}; claims {} new, {} already done, {} failed",
            self.credentials_processed,
            self.credentials_skipped,
            self.calls_succeeded,
            self.calls_attempted,
            self.claims_succeeded,
            self.claims_already_done,
            self.claims_failed,
        )
    }
}

pub struct Runner<A> {
    api: A,
    task_ids: Vec<String>,
    delays: Delays,
}

impl<A: TaskApi> Runner<A> {
    pub fn new(api: A, task_ids: Vec<String>, delays: Delays) -> Self {
        Self {
            api,
            task_ids,
            delays,
        }
    }

    #[cfg(test)]
    fn api(&self) -> &A {
        &self.api
    }

    /// Load credentials from `token_file` and run one round over them.
    ///
    /// Returns `None` without touching the network or sleeping when the file
    /// yields no credentials.
    pub async fn run_from_file(&self, token_file: &Path) -> Option<RoundSummary> {
        let credentials = load_credentials(token_file);
        if credentials.is_empty() {
            tracing::error!(
                "No tokens found. Please update {} and restart.",
                token_file.display()
            );
            return None;
        }
        Some(self.run(&credentials).await)
    }

    /// One round over all credentials, then the long pause. Does not loop.
    pub async fn run(&self, credentials: &[Credential]) -> RoundSummary {
        let summary = self.run_round(credentials).await;
        tracing::info!("Round finished: {}", summary);

        tracing::info!(
            "Waiting {} before next round...",
            describe_duration(self.delays.between_rounds)
        );
        sleep(self.delays.between_rounds).await;
        summary
    }

    /// Validate, call and claim for each credential in order.
    pub async fn run_round(&self, credentials: &[Credential]) -> RoundSummary {
        let mut summary = RoundSummary::default();

        for (index, credential) in credentials.iter().enumerate() {
            let span = tracing::info_span!("account", index, token = credential.preview());
            self.process_credential(credential, &mut summary)
                .instrument(span)
                .await;
        }

        summary
    }

    async fn process_credential(&self, credential: &Credential, summary: &mut RoundSummary) {
        if !self.api.validate(credential).await {
            tracing::error!("Skipping invalid token.");
            summary.credentials_skipped += 1;
            return;
        }
        summary.credentials_processed += 1;

        for task_id in &self.task_ids {
            summary.calls_attempted += 1;
            if self.api.call_task(credential, task_id).await {
                summary.calls_succeeded += 1;
            }
            sleep(self.delays.between_requests).await;
        }

        tracing::info!(
            "Waiting {} second before claiming tasks...",
            self.delays.before_claim.as_secs()
        );
        sleep(self.delays.before_claim).await;

        for task_id in &self.task_ids {
            let outcome = self.api.claim_task(credential, task_id).await;
            summary.record_claim(outcome);
            sleep(self.delays.between_requests).await;
        }
    }
}

/// Largest whole unit that divides `d` exactly, e.g. "3 hours" or "90 seconds".
fn describe_duration(d: Duration) -> String {
    let secs = d.as_secs();
    match secs {
        0 => "0 seconds".to_string(),
        s if s % 3600 == 0 => format!("{} hours", s / 3600),
        s if s % 60 == 0 => format!("{} minutes", s / 60),
        s => format!("{} seconds", s),
    }
}
