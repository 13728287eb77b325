use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::redirect::Policy;
use std::time::Duration;

use crate::core::constants::{http, messages};
use crate::core::error::Result;
use crate::core::types::ValidationOutcome;

/// Checks that an external URL is reachable
#[async_trait]
pub trait ExternalChecker: Send + Sync {
    async fn check(&self, url: &str) -> ValidationOutcome;
}

/// `ExternalChecker` backed by a reqwest client.
///
/// Sends HEAD first and falls back to GET for servers that reject HEAD.
#[derive(Debug, Clone)]
pub struct HttpChecker {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpChecker {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(Policy::limited(http::MAX_REDIRECTS))
            .user_agent(http::USER_AGENT)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, timeout })
    }

    fn outcome_for_status(status: StatusCode) -> ValidationOutcome {
        let code = status.as_u16();
        if status.is_success() || status.is_redirection() {
            ValidationOutcome::valid(format!("External link valid (HTTP {code})"))
        } else {
            ValidationOutcome::broken(format!("External link returned HTTP {code}"))
        }
    }

    fn outcome_for_error(&self, err: &reqwest::Error) -> ValidationOutcome {
        if err.is_timeout() {
            return ValidationOutcome::broken(format!(
                "External link timed out after {}s",
                self.timeout.as_secs()
            ));
        }
        let description = std::error::Error::source(err)
            .map(|e| e.to_string())
            .unwrap_or_else(|| err.to_string());
        ValidationOutcome::broken(format!(
            "{}: {description}",
            messages::EXTERNAL_CONNECT_FAILED
        ))
    }
}

#[async_trait]
impl ExternalChecker for HttpChecker {
    async fn check(&self, url: &str) -> ValidationOutcome {
        let response = match self.client.head(url).send().await {
            Ok(resp)
                if matches!(
                    resp.status(),
                    StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED
                ) =>
            {
                log::debug!("HEAD rejected by {url}, retrying with GET");
                self.client.get(url).send().await
            }
            other => other,
        };

        match response {
            Ok(resp) => Self::outcome_for_status(resp.status()),
            Err(err) => self.outcome_for_error(&err),
        }
    }
}
