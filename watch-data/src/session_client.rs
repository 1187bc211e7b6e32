//! HTTP client for the detection service.
//!
//! All requests go to `<api_url>/api/v1` and follow the service contracts:
//!
//!   POST /camera/start {source}     → start capture + inference on a source
//!   POST /camera/stop               → stop capture
//!   GET  /camera/detections         → latest detection list
//!   GET  /camera/snapshot           → latest annotated frame (JPEG)
//!   GET  /models                    → {available, active, main_loaded}
//!   POST /models/switch {model}     → change the active model
//!   POST /compression/upload        → store a video, returns {job_id}
//!   POST /sugar-count/reset         → zero the server-side bag counter

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use std::str::FromStr;
use std::sync::Arc;

use crate::config::WatchConfig;
use crate::error::{Result, WatchError};
use crate::session_api::{ApiFuture, SessionApi};
use crate::types::{Detection, ModelsInfo, UploadReceipt};

#[derive(Debug)]
struct HttpSessionApiInner {
    base_url: String,
    client: reqwest::Client,
    headers: HeaderMap,
}

/// Async HTTP implementation of [`SessionApi`].
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpSessionApi(Arc<HttpSessionApiInner>);

impl HttpSessionApi {
    pub fn from_config(config: &WatchConfig) -> Result<Self> {
        let url = url::Url::parse(&config.api_url)
            .map_err(|e| WatchError::Transport(format!("invalid API URL {}: {}", config.api_url, e)))?;

        let mut base_url = url.to_string();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        let headers = build_headers(&config.tunnel_header, config.token.as_deref())?;

        // No overall timeout: a hung fetch only delays its own loop.
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| WatchError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self(Arc::new(HttpSessionApiInner {
            base_url,
            client,
            headers,
        })))
    }

    pub fn base_url(&self) -> &str {
        &self.0.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.0.base_url, path)
    }

    fn post_json(&self, path: &str, body: serde_json::Value) -> ApiFuture<()> {
        let inner = self.0.clone();
        let url = self.endpoint(path);
        Box::pin(async move {
            log::debug!("POST {}", url);
            let resp = inner
                .client
                .post(&url)
                .headers(inner.headers.clone())
                .json(&body)
                .send()
                .await?;
            check_status(resp).await?;
            Ok(())
        })
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.0
            .client
            .get(self.endpoint(path))
            .headers(self.0.headers.clone())
    }
}

impl SessionApi for HttpSessionApi {
    fn start(&self, source: &str) -> ApiFuture<()> {
        self.post_json("/camera/start", serde_json::json!({ "source": source }))
    }

    fn stop(&self) -> ApiFuture<()> {
        self.post_json("/camera/stop", serde_json::json!({}))
    }

    fn switch_model(&self, model: &str) -> ApiFuture<()> {
        self.post_json("/models/switch", serde_json::json!({ "model": model }))
    }

    fn list_models(&self) -> ApiFuture<ModelsInfo> {
        let request = self.get("/models");
        Box::pin(async move {
            let resp = check_status(request.send().await?).await?;
            Ok(resp.json::<ModelsInfo>().await?)
        })
    }

    fn detections(&self) -> ApiFuture<Vec<Detection>> {
        let request = self.get("/camera/detections");
        Box::pin(async move {
            let resp = check_status(request.send().await?).await?;
            Ok(resp.json::<Vec<Detection>>().await?)
        })
    }

    fn snapshot(&self) -> ApiFuture<Vec<u8>> {
        let request = self.get("/camera/snapshot");
        Box::pin(async move {
            let resp = check_status(request.send().await?).await?;
            Ok(resp.bytes().await?.to_vec())
        })
    }

    fn upload(&self, file_name: &str, bytes: Vec<u8>) -> ApiFuture<UploadReceipt> {
        let inner = self.0.clone();
        let url = self.endpoint("/compression/upload");
        let file_name = file_name.to_string();
        Box::pin(async move {
            log::info!("Uploading {} ({} bytes) to {}", file_name, bytes.len(), url);
            let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
            let resp = inner
                .client
                .post(&url)
                .headers(inner.headers.clone())
                .multipart(form)
                .send()
                .await?;
            let resp = check_status(resp).await?;
            Ok(resp.json::<UploadReceipt>().await?)
        })
    }

    fn reset_bag_count(&self) -> ApiFuture<()> {
        self.post_json("/sugar-count/reset", serde_json::json!({}))
    }
}

fn build_headers(tunnel_header: &(String, String), token: Option<&str>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    let name = HeaderName::from_str(&tunnel_header.0)
        .map_err(|_| WatchError::Transport(format!("invalid header name {:?}", tunnel_header.0)))?;
    let value = HeaderValue::from_str(&tunnel_header.1)
        .map_err(|_| WatchError::Transport(format!("invalid header value for {}", tunnel_header.0)))?;
    headers.insert(name, value);

    if let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) {
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| WatchError::Transport("invalid bearer token".to_string()))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
    }

    Ok(headers)
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    Err(WatchError::RemoteRejected {
        status: status.as_u16(),
        message: error_message(&text),
    })
}

/// Pull the human-readable reason out of a `{"error": ...}` / `{"message": ...}` body.
fn error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| v["error"].as_str().or_else(|| v["message"].as_str()))
        .map(str::to_string)
        .unwrap_or_else(|| "Request failed".to_string())
}
