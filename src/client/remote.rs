use anyhow::{Context, Result, bail};
use async_trait::async_trait;

use crate::server::ErrorBody;
use crate::solver::{SolveRequest, SolveResponse, Tutor};

/// Talks to a running `sensei serve` over HTTP.
pub struct HttpTutor {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTutor {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/api/solve", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Tutor for HttpTutor {
    async fn ask(&self, request: &SolveRequest) -> Result<String> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .with_context(|| format!("failed to reach {}", self.endpoint))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => bail!("{}", body.error),
                Err(_) if !text.is_empty() => bail!("server error ({status}): {text}"),
                Err(_) => bail!("server error ({status})"),
            }
        }

        let body: SolveResponse = resp.json().await.context("invalid server response")?;
        Ok(body.result)
    }
}
