use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;

use crate::types::{
    ApiError, AskOutcome, ErrorBody, JobStatus, SessionDetail, SessionEntry, SessionsEnvelope,
    StagedUpload,
};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            // Answer generation can take a while on the server side.
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// Typed client for the document-assistant backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST `/upload` with one multipart `files` part per staged file.
    pub async fn upload(&self, files: &[StagedUpload]) -> Result<(), ApiError> {
        let mut form = Form::new();
        for file in files {
            let bytes = tokio::fs::read(&file.path)
                .await
                .map_err(|err| ApiError::FileRead {
                    name: file.name.clone(),
                    message: err.to_string(),
                })?;
            let mut part = Part::bytes(bytes).file_name(file.name.clone());
            if let Some(ct) = file.content_type.as_deref() {
                part = part.mime_str(ct)?;
            }
            form = form.part("files", part);
        }

        let response = self
            .http
            .post(self.endpoint("/upload"))
            .multipart(form)
            .send()
            .await?;
        self.expect_success(response, "Error uploading files")
            .await?;
        Ok(())
    }

    /// POST `/index-website` with the crawl root and page budget.
    pub async fn index_website(&self, base_url: &str, max_pages: u32) -> Result<(), ApiError> {
        let max_pages = max_pages.to_string();
        let response = self
            .http
            .post(self.endpoint("/index-website"))
            .form(&[("base_url", base_url), ("max_pages", max_pages.as_str())])
            .send()
            .await?;
        self.expect_success(response, "Error while indexing the website")
            .await?;
        Ok(())
    }

    pub async fn status(&self) -> Result<JobStatus, ApiError> {
        let response = self.http.get(self.endpoint("/status")).send().await?;
        self.read_json(response, "/status", "Error fetching status")
            .await
    }

    /// POST `/ask`; `session_id` is omitted from the form when absent.
    pub async fn ask(
        &self,
        question: &str,
        session_id: Option<&str>,
    ) -> Result<AskOutcome, ApiError> {
        let mut params = vec![("question", question.to_string())];
        if let Some(id) = session_id {
            params.push(("session_id", id.to_string()));
        }
        let response = self
            .http
            .post(self.endpoint("/ask"))
            .form(&params)
            .send()
            .await?;
        self.read_json(response, "/ask", "Error processing question")
            .await
    }

    pub async fn sessions(&self) -> Result<Vec<SessionEntry>, ApiError> {
        let response = self.http.get(self.endpoint("/sessions")).send().await?;
        let envelope: SessionsEnvelope = self
            .read_json(response, "/sessions", "Error fetching sessions")
            .await?;
        Ok(envelope.sessions)
    }

    pub async fn session(&self, id: &str) -> Result<SessionDetail, ApiError> {
        let response = self
            .http
            .get(self.endpoint(&format!("/session/{id}")))
            .send()
            .await?;
        self.read_json(response, "/session", "Error fetching session")
            .await
    }

    pub async fn delete_session(&self, id: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .delete(self.endpoint(&format!("/session/{id}")))
            .send()
            .await?;
        self.expect_success(response, "Error deleting session")
            .await?;
        Ok(())
    }

    /// Non-2xx responses become `Backend` errors carrying the body's
    /// `detail` message when it provides one.
    async fn expect_success(
        &self,
        response: reqwest::Response,
        fallback: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = response
            .text()
            .await
            .ok()
            .and_then(|body| serde_json::from_str::<ErrorBody>(&body).ok())
            .map(|body| body.detail)
            .unwrap_or_else(|| fallback.to_string());
        Err(ApiError::Backend {
            status: status.as_u16(),
            detail,
        })
    }

    /// Shape validation happens here, at the transport boundary.
    async fn read_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        endpoint: &'static str,
        fallback: &str,
    ) -> Result<T, ApiError> {
        let response = self.expect_success(response, fallback).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|err| ApiError::Shape {
            endpoint,
            message: err.to_string(),
        })
    }
}
