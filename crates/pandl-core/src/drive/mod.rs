//! Drive API client: resource listing, task creation and folder listing.
//!
//! Every call reads the session token from the shared [`CredentialStore`]
//! at send time, so a background recapture takes effect on the very next
//! request without restarting anything.

pub mod types;

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};

use crate::config::PandlConfig;
use crate::credential::CredentialStore;
use crate::error::{PandlError, Result};
use crate::resolver::SelectionManifest;
pub use types::{Folder, ResourceNode};
use types::{FileListResponse, ResourceListResponse, TaskParams, TaskRequest, TaskResponse};

const USER_AGENT: &str = "Mozilla/5.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct DriveClient {
    http: Client,
    host: String,
    space: String,
    cookie: Option<String>,
    syno_token: Option<String>,
    credential: Arc<CredentialStore>,
}

impl DriveClient {
    pub fn new(cfg: &PandlConfig, credential: Arc<CredentialStore>) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| PandlError::Api(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            http,
            host: cfg.api_host.trim_end_matches('/').to_string(),
            space: cfg.space.clone(),
            cookie: cfg.cookie.clone(),
            syno_token: cfg.syno_token.clone(),
            credential,
        })
    }

    pub fn credential(&self) -> Arc<CredentialStore> {
        Arc::clone(&self.credential)
    }

    /// Per-request headers. Values that fail header validation are skipped
    /// rather than failing the call; the token charset is already restricted.
    fn headers(&self, token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(reqwest::header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
        headers.insert(reqwest::header::ACCEPT, HeaderValue::from_static("*/*"));
        if let Ok(value) = HeaderValue::from_str(token) {
            headers.insert("pan-auth", value);
        }
        if let Some(cookie) = &self.cookie {
            if let Ok(value) = HeaderValue::from_str(cookie) {
                headers.insert(reqwest::header::COOKIE, value);
            }
        }
        if let Some(syno) = &self.syno_token {
            if let Ok(value) = HeaderValue::from_str(syno) {
                headers.insert("x-syno-token", value);
            }
        }
        headers
    }

    /// List the resource tree for one magnet URI. Returns the root node.
    pub async fn list_resources(&self, magnet: &str) -> Result<ResourceNode> {
        let url = format!("{}/drive/v1/resource/list", self.host);
        let token = self.credential.get();
        let resp = self
            .http
            .post(&url)
            .query(&[("pan_auth", token.as_str())])
            .headers(self.headers(&token))
            .json(&serde_json::json!({ "page_size": 1000, "urls": magnet }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PandlError::Api(format!(
                "resource/list returned HTTP {status}"
            )));
        }
        let body: ResourceListResponse = resp
            .json()
            .await
            .map_err(|err| PandlError::Api(format!("resource/list body: {err}")))?;
        body.list
            .and_then(|list| list.resources.into_iter().next())
            .ok_or_else(|| PandlError::Api("response missing list.resources".to_string()))
    }

    /// Create a remote download task for one magnet from its manifest.
    pub async fn create_task(
        &self,
        magnet: &str,
        manifest: &SelectionManifest,
        parent_folder_id: &str,
    ) -> Result<()> {
        let url = format!("{}/drive/v1/task", self.host);
        let token = self.credential.get();
        let payload = TaskRequest {
            kind: "user#download-url",
            name: manifest.torrent_name.clone(),
            file_name: manifest.torrent_name.clone(),
            file_size: manifest.selected_total_size.to_string(),
            space: self.space.clone(),
            params: TaskParams {
                target: self.space.clone(),
                url: magnet.to_string(),
                parent_folder_id: parent_folder_id.to_string(),
                total_file_count: manifest.total_file_count.to_string(),
                sub_file_index: manifest.selected_file_indices.join(","),
            },
        };

        let resp = self
            .http
            .post(&url)
            .headers(self.headers(&token))
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PandlError::Api(format!("task returned HTTP {status}")));
        }
        let body: TaskResponse = resp
            .json()
            .await
            .map_err(|err| PandlError::Api(format!("task body: {err}")))?;
        if !body.error.is_null() {
            return Err(PandlError::Api(format!("task rejected: {}", body.error)));
        }
        Ok(())
    }

    /// List non-trashed sub-folders of a folder.
    pub async fn list_folders(&self, parent_id: &str) -> Result<Vec<Folder>> {
        let url = format!("{}/drive/v1/files", self.host);
        let token = self.credential.get();
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("parent_id", parent_id),
                ("limit", "100"),
                ("pan_auth", token.as_str()),
                ("space", self.space.as_str()),
            ])
            .headers(self.headers(&token))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PandlError::Api(format!("files returned HTTP {status}")));
        }
        let body: FileListResponse = resp
            .json()
            .await
            .map_err(|err| PandlError::Api(format!("files body: {err}")))?;
        Ok(body
            .files
            .into_iter()
            .filter(|f| f.kind == "drive#folder" && !f.trashed)
            .map(|f| Folder {
                id: f.id,
                name: f.name,
            })
            .collect())
    }

    /// Minimal authenticated request for the liveness probe; the caller
    /// interprets status vs. transport error.
    pub async fn probe_request(&self) -> std::result::Result<StatusCode, reqwest::Error> {
        let url = format!("{}/drive/v1/files", self.host);
        let token = self.credential.get();
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("parent_id", ""),
                ("limit", "1"),
                ("pan_auth", token.as_str()),
                ("space", self.space.as_str()),
            ])
            .headers(self.headers(&token))
            .send()
            .await?;
        Ok(resp.status())
    }
}
