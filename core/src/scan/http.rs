use super::{ScanBackend, ScanRequest, StatusResponse, SubmitResponse};
use crate::error::{Result, ScanError};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

/// 通过 HTTP 访问远端扫描服务
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ScanError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ScanBackend for HttpBackend {
    fn name(&self) -> String {
        format!("HttpBackend({})", self.base_url)
    }

    async fn submit(&self, request: &ScanRequest) -> Result<String> {
        let url = self.url(request.path());
        tracing::debug!("POST {}", url);

        let response = self.client.post(&url).json(&request.body()).send().await?;
        let submitted: SubmitResponse = Self::decode(response).await?;
        Ok(submitted.task_id)
    }

    async fn status(&self, task_id: &str) -> Result<StatusResponse> {
        let url = self.url(&format!("/results/{}", task_id));
        tracing::trace!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        Self::decode(response).await
    }
}
