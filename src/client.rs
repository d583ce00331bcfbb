use std::future::Future;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, header};

use crate::config::PlanxConfig;
use crate::credential::Credential;
use crate::types::{ClaimOutcome, TaskRequest, is_successful_response};

/// The three PlanX operations the driver needs.
///
/// Implementations never fail: every problem is logged and reported as an
/// unsuccessful outcome.
pub trait TaskApi {
    fn validate(&self, credential: &Credential) -> impl Future<Output = bool>;

    fn call_task(&self, credential: &Credential, task_id: &str) -> impl Future<Output = bool>;

    fn claim_task(
        &self,
        credential: &Credential,
        task_id: &str,
    ) -> impl Future<Output = ClaimOutcome>;
}

pub struct PlanxClient {
    http_client: Client,
    info_url: String,
    call_url: String,
    claim_url: String,
    origin: String,
    referer: String,
    user_agent: String,
}

impl PlanxClient {
    pub fn new(config: &PlanxConfig) -> Result<Self> {
        // No timeout override: requests wait as long as the transport allows
        let http_client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            info_url: config.info_url(),
            call_url: config.call_url(),
            claim_url: config.claim_url(),
            origin: config.origin.clone(),
            referer: config.referer(),
            user_agent: config.user_agent.clone(),
        })
    }

    /// `Authorization` and its `token` duplicate, sent on every request
    fn authorized(&self, request: RequestBuilder, credential: &Credential) -> RequestBuilder {
        request
            .header(header::AUTHORIZATION, credential.as_str())
            .header("token", credential.as_str())
    }

    /// Task requests additionally look like they come from the web wallet
    fn task_request(&self, url: &str, credential: &Credential, task_id: &str) -> RequestBuilder {
        self.authorized(self.http_client.post(url), credential)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::USER_AGENT, &self.user_agent)
            .header(header::ORIGIN, &self.origin)
            .header(header::REFERER, &self.referer)
            .json(&TaskRequest { task_id })
    }

    /// Send a request and return its status code and raw body
    async fn send(request: RequestBuilder) -> Result<(u16, String)> {
        let response = request.send().await.context("Request failed")?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;
        Ok((status, body))
    }
}

impl TaskApi for PlanxClient {
    async fn validate(&self, credential: &Credential) -> bool {
        tracing::info!("Validating token: {}... (truncated)", credential.preview());

        let request = self.authorized(self.http_client.get(&self.info_url), credential);
        match Self::send(request).await {
            Ok((status, body)) if is_successful_response(status, &body) => {
                tracing::info!("Token is valid!");
                true
            }
            Ok((status, body)) => {
                tracing::error!("Token validation failed ({}): {}", status, body);
                false
            }
            Err(e) => {
                tracing::error!("Token validation failed: {:#}", e);
                false
            }
        }
    }

    async fn call_task(&self, credential: &Credential, task_id: &str) -> bool {
        tracing::info!("Calling task: {}", task_id);

        let request = self.task_request(&self.call_url, credential, task_id);
        match Self::send(request).await {
            Ok((status, body)) if is_successful_response(status, &body) => {
                tracing::info!("Task {} successfully called!", task_id);
                true
            }
            Ok((status, body)) => {
                tracing::error!("Failed to call task {} ({}): {}", task_id, status, body);
                false
            }
            Err(e) => {
                tracing::error!("Failed to call task {}: {:#}", task_id, e);
                false
            }
        }
    }

    async fn claim_task(&self, credential: &Credential, task_id: &str) -> ClaimOutcome {
        tracing::info!("Attempting to claim task: {}", task_id);

        let request = self.task_request(&self.claim_url, credential, task_id);
        let (status, body) = match Self::send(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Failed to claim task {}: {:#}", task_id, e);
                return ClaimOutcome::Failed;
            }
        };

        let outcome = ClaimOutcome::from_response(status, &body);
        match outcome {
            ClaimOutcome::Claimed => tracing::info!("Task {} claimed successfully!", task_id),
            ClaimOutcome::AlreadyClaimed => tracing::info!("Task {} already claimed!", task_id),
            ClaimOutcome::Failed => {
                tracing::error!("Failed to claim task {} ({}): {}", task_id, status, body)
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Json, Router,
        http::{HeaderMap, StatusCode},
        routing::{get, post},
    };
    use serde_json::{Value, json};

    use super::*;

    const GOOD: &str = "Bearer good";

    /// Both auth headers must be present and identical
    fn auth(headers: &HeaderMap) -> Option<&str> {
        let authorization = headers.get("authorization")?.to_str().ok()?;
        let token = headers.get("token")?.to_str().ok()?;
        (authorization == token).then_some(authorization)
    }

    fn from_wallet(headers: &HeaderMap) -> bool {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
        header("origin") == Some("https://tg-wallet.planx.io")
            && header("referer") == Some("https://tg-wallet.planx.io/")
            && header("user-agent") == Some("Mozilla/5.0")
    }

    fn task_id(body: &Value) -> &str {
        body.get("taskId").and_then(|v| v.as_str()).unwrap_or_default()
    }

    async fn info(headers: HeaderMap) -> (StatusCode, String) {
        match auth(&headers) {
            Some(GOOD) => (StatusCode::OK, json!({"success": true}).to_string()),
            Some("Bearer disabled") => (StatusCode::OK, json!({"success": false}).to_string()),
            _ => (
                StatusCode::FORBIDDEN,
                json!({"success": false, "message": "forbidden"}).to_string(),
            ),
        }
    }

    async fn call(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, String) {
        if auth(&headers) != Some(GOOD) || !from_wallet(&headers) {
            return (StatusCode::OK, json!({"success": false}).to_string());
        }
        match task_id(&body) {
            "broken" => (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string()),
            _ => (StatusCode::OK, json!({"success": true}).to_string()),
        }
    }

    async fn claim(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, String) {
        if auth(&headers) != Some(GOOD) || !from_wallet(&headers) {
            return (StatusCode::UNAUTHORIZED, String::new());
        }
        let body = match task_id(&body) {
            "fresh" => json!({"code": "200", "message": "success"}),
            "done" => json!({"code": "400", "message": "Task Already Claimed"}),
            "pending" => json!({"code": "400", "message": "Task not completed"}),
            "numeric" => json!({"code": 200}),
            "garbage" => return (StatusCode::OK, "<html></html>".to_string()),
            _ => return (StatusCode::INTERNAL_SERVER_ERROR, String::new()),
        };
        (StatusCode::OK, body.to_string())
    }

    async fn spawn_stub() -> PlanxConfig {
        let app = Router::new()
            .route("/api/v1/telegram/info", get(info))
            .route("/api/v1/telegram/task/call", post(call))
            .route("/api/v1/telegram/task/claim", post(claim));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        PlanxConfig {
            base_url: format!("http://{}/api/v1/telegram", addr),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_validate() {
        let client = PlanxClient::new(&spawn_stub().await).unwrap();

        assert!(client.validate(&Credential::new("good")).await);
        assert!(!client.validate(&Credential::new("disabled")).await);
        assert!(!client.validate(&Credential::new("someone-else")).await);
    }

    #[tokio::test]
    async fn test_call_task() {
        let client = PlanxClient::new(&spawn_stub().await).unwrap();
        let good = Credential::new(GOOD);

        assert!(client.call_task(&good, "m1").await);
        assert!(!client.call_task(&good, "broken").await);
        assert!(!client.call_task(&Credential::new("bad"), "m1").await);
    }

    #[tokio::test]
    async fn test_claim_task() {
        let client = PlanxClient::new(&spawn_stub().await).unwrap();
        let good = Credential::new(GOOD);

        assert_eq!(client.claim_task(&good, "fresh").await, ClaimOutcome::Claimed);
        assert_eq!(
            client.claim_task(&good, "done").await,
            ClaimOutcome::AlreadyClaimed
        );
        assert_eq!(client.claim_task(&good, "pending").await, ClaimOutcome::Failed);
        assert_eq!(client.claim_task(&good, "numeric").await, ClaimOutcome::Failed);
        assert_eq!(client.claim_task(&good, "garbage").await, ClaimOutcome::Failed);
        assert_eq!(client.claim_task(&good, "unknown").await, ClaimOutcome::Failed);
        assert_eq!(
            client.claim_task(&Credential::new("bad"), "fresh").await,
            ClaimOutcome::Failed
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = PlanxConfig {
            base_url: format!("http://{}/api/v1/telegram", addr),
            ..Default::default()
        };
        let client = PlanxClient::new(&config).unwrap();
        let cred = Credential::new(GOOD);

        assert!(!client.validate(&cred).await);
        assert!(!client.call_task(&cred, "m1").await);
        assert_eq!(client.claim_task(&cred, "fresh").await, ClaimOutcome::Failed);
    }
}
