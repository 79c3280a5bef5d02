use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use weigh_core::sync::{BlobStore, RemoteError};

const CONTENT_URL: &str = "https://content.dropboxapi.com";

/// Dropbox content API client. Blocks on its own runtime so it can sit
/// behind the synchronous `BlobStore` trait.
pub struct DropboxClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    rt: tokio::runtime::Runtime,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error_summary: String,
    #[serde(default)]
    error: serde_json::Value,
}

impl DropboxClient {
    pub fn new(token: String) -> Result<Self> {
        Self::with_base_url(token, CONTENT_URL)
    }

    pub fn with_base_url(token: String, base_url: &str) -> Result<Self> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start async runtime")?;

        let client = {
            let _guard = rt.enter();
            reqwest::Client::builder()
                .user_agent(format!(
                    "weigh-cli/{} (weight tracker)",
                    env!("CARGO_PKG_VERSION")
                ))
                .timeout(std::time::Duration::from_secs(60))
                .connect_timeout(std::time::Duration::from_secs(10))
                .build()
                .context("Failed to build HTTP client")?
        };

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            rt,
        })
    }

    pub async fn download_async(&self, name: &str) -> Result<Vec<u8>, RemoteError> {
        let arg = api_arg(&json!({ "path": remote_path(name) }));
        let resp = self
            .client
            .post(format!("{}/2/files/download", self.base_url))
            .bearer_auth(&self.token)
            .header("Dropbox-API-Arg", arg)
            .send()
            .await
            .map_err(|e| RemoteError::Other(format!("failed to reach Dropbox: {e}")))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| RemoteError::Other(format!("failed to read Dropbox response: {e}")))?;

        if !status.is_success() {
            return Err(classify_error(status, &body));
        }

        debug!(name, bytes = body.len(), "downloaded from Dropbox");
        Ok(body.to_vec())
    }

    pub async fn upload_async(&self, name: &str, bytes: Vec<u8>) -> Result<(), RemoteError> {
        let size = bytes.len();
        let arg = api_arg(&json!({
            "path": remote_path(name),
            "mode": "overwrite",
            "mute": true,
        }));
        let resp = self
            .client
            .post(format!("{}/2/files/upload", self.base_url))
            .bearer_auth(&self.token)
            .header("Dropbox-API-Arg", arg)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(|e| RemoteError::Other(format!("failed to reach Dropbox: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.bytes().await.unwrap_or_default();
            return Err(classify_error(status, &body));
        }

        debug!(name, bytes = size, "uploaded to Dropbox");
        Ok(())
    }
}

impl BlobStore for DropboxClient {
    fn fetch(&self, name: &str) -> Result<Vec<u8>, RemoteError> {
        self.rt.block_on(self.download_async(name))
    }

    fn store(&self, name: &str, bytes: &[u8]) -> Result<(), RemoteError> {
        self.rt.block_on(self.upload_async(name, bytes.to_vec()))
    }
}

fn remote_path(name: &str) -> String {
    format!("/{}", name.trim_start_matches('/'))
}

/// JSON for the `Dropbox-API-Arg` header. Header values must be ASCII, so
/// anything else is written as `\uXXXX` escapes.
fn api_arg(value: &serde_json::Value) -> String {
    let raw = value.to_string();
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    out
}

/// Only a 409 with a `path/not_found` error counts as "nothing there yet".
fn classify_error(status: StatusCode, body: &[u8]) -> RemoteError {
    if status == StatusCode::CONFLICT {
        if let Ok(err) = serde_json::from_slice::<ApiErrorBody>(body) {
            if err.error[".tag"] == "path" && err.error["path"][".tag"] == "not_found" {
                return RemoteError::NotFound;
            }
            return RemoteError::Other(format!("Dropbox API error: {}", err.error_summary));
        }
    }
    let text = String::from_utf8_lossy(body);
    RemoteError::Other(format!("Dropbox returned {status}: {}", text.trim()))
}
