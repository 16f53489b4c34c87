//! Thin reqwest client for the gateway routes.

use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct HealthBody {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ReadyBody {
    pub status: String,
    pub components: ReadyComponents,
}

impl ReadyBody {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[derive(Debug, Deserialize)]
pub struct ReadyComponents {
    pub http: String,
    pub model: String,
    pub model_mode: String,
    pub tokenizer_family: String,
    pub sessions: u64,
}

pub struct TestClient {
    base_url: String,
    client: reqwest::Client,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub async fn health(&self) -> reqwest::Result<HealthBody> {
        self.client
            .get(format!("{}/healthz", self.base_url))
            .send()
            .await?
            .json()
            .await
    }

    pub async fn ready(&self) -> reqwest::Result<ReadyBody> {
        self.client
            .get(format!("{}/ready", self.base_url))
            .send()
            .await?
            .json()
            .await
    }

    pub async fn upload(
        &self,
        content: impl Into<Vec<u8>>,
        top_n: Option<usize>,
    ) -> reqwest::Result<(StatusCode, serde_json::Value)> {
        let form = Form::new().part("file", Part::bytes(content.into()).file_name("document.txt"));
        let mut request = self
            .client
            .post(format!("{}/upload-text", self.base_url))
            .multipart(form);
        if let Some(top_n) = top_n {
            request = request.query(&[("top_n", top_n)]);
        }
        let response = request.send().await?;
        let status = response.status();
        Ok((status, response.json().await?))
    }

    pub async fn explain(
        &self,
        body: serde_json::Value,
    ) -> reqwest::Result<(StatusCode, serde_json::Value)> {
        let response = self
            .client
            .post(format!("{}/explain-chunk", self.base_url))
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        Ok((status, response.json().await?))
    }
}
