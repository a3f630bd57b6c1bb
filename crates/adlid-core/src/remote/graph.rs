use super::{auth, RemoteEntry, RemoteTree, UploadSink};
use crate::config::GraphConfig;
use crate::error::Error;
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_RANGE;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::ops::Range;
use std::time::Duration;
use tracing::{debug, info};

const LIST_TIMEOUT: Duration = Duration::from_secs(30);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(180);
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Simple `PUT .../content` uploads are limited to 250 MB by the service.
const MAX_SIMPLE_UPLOAD: usize = 250 * 1024 * 1024;

/// Upload session chunks; must be a multiple of 320 KiB.
const UPLOAD_CHUNK: usize = 5 * 1024 * 1024;

#[derive(Debug, Deserialize)]
struct ChildrenPage {
    #[serde(default)]
    value: Vec<DriveItem>,
    #[serde(rename = "@odata.nextLink")]
    next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveItem {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    folder: Option<serde_json::Value>,
    file: Option<serde_json::Value>,
    parent_reference: Option<ParentReference>,
    web_url: Option<String>,
    size: Option<u64>,
    last_modified_date_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ParentReference {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadedItem {
    web_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadSession {
    upload_url: String,
}

impl From<DriveItem> for RemoteEntry {
    fn from(item: DriveItem) -> Self {
        let is_file = item.file.is_some();
        RemoteEntry {
            is_folder: item.folder.is_some(),
            is_file,
            parent_path: item
                .parent_reference
                .and_then(|p| p.path)
                .unwrap_or_default(),
            remote_id: item.id,
            url: item.web_url,
            size: if is_file { item.size } else { None },
            last_modified: item.last_modified_date_time,
            name: item.name,
        }
    }
}

/// Microsoft Graph client scoped to one user's OneDrive.
pub struct GraphClient {
    http: Client,
    base: String,
    owner_upn: String,
    token: String,
}

impl GraphClient {
    pub fn new(http: Client, access_token: String, config: &GraphConfig) -> Self {
        Self {
            http,
            base: config.graph_base.trim_end_matches('/').to_string(),
            owner_upn: config.owner_upn.clone(),
            token: access_token,
        }
    }

    /// Acquire a token and build a client.
    pub fn connect(config: &GraphConfig) -> Result<Self, Error> {
        if config.owner_upn.is_empty() {
            return Err(Error::Auth("graph.owner_upn must be configured".to_string()));
        }
        let http = Client::builder().build()?;
        let token = auth::acquire_app_token(&http, config)?;
        Ok(Self::new(http, token, config))
    }

    fn children_url(&self, path: &str) -> String {
        format!(
            "{}/users/{}/drive/root:/{}:/children",
            self.base,
            self.owner_upn,
            encode_path(path)
        )
    }

    fn get_page(&self, url: &str) -> Result<ChildrenPage, Error> {
        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .timeout(LIST_TIMEOUT)
            .send()?;
        Ok(check_status(resp)?.json()?)
    }
}

impl RemoteTree for GraphClient {
    fn list_children(&self, path: &str) -> Result<Vec<RemoteEntry>, Error> {
        let mut entries = Vec::new();
        let mut next = Some(self.children_url(path));
        while let Some(url) = next {
            let page = self.get_page(&url)?;
            entries.extend(page.value.into_iter().map(RemoteEntry::from));
            next = page.next_link;
        }
        debug!("Listed {} children under '{}'", entries.len(), path);
        Ok(entries)
    }

    fn download(&self, remote_id: &str) -> Result<Vec<u8>, Error> {
        let url = format!(
            "{}/users/{}/drive/items/{}/content",
            self.base, self.owner_upn, remote_id
        );
        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()?;
        Ok(check_status(resp)?.bytes()?.to_vec())
    }
}

impl GraphClient {
    fn item_url(&self, target: &str, action: &str) -> String {
        format!(
            "{}/users/{}/drive/root:/{}:/{}",
            self.base,
            self.owner_upn,
            encode_path(target),
            action
        )
    }

    fn upload_small(&self, target: &str, content: &[u8]) -> Result<Option<String>, Error> {
        let resp = self
            .http
            .put(self.item_url(target, "content"))
            .bearer_auth(&self.token)
            .timeout(UPLOAD_TIMEOUT)
            .body(content.to_vec())
            .send()?;
        let uploaded: UploadedItem = check_status(resp)?.json()?;
        Ok(uploaded.web_url)
    }

    /// Creates an upload session and PUTs `content` in ranged chunks. The
    /// session URL is pre-authenticated, so chunks carry no bearer token.
    fn upload_large(
        &self,
        target: &str,
        file_name: &str,
        content: &[u8],
    ) -> Result<Option<String>, Error> {
        let body = json!({
            "item": {
                "@microsoft.graph.conflictBehavior": "replace",
                "name": file_name,
            }
        });
        let resp = self
            .http
            .post(self.item_url(target, "createUploadSession"))
            .bearer_auth(&self.token)
            .timeout(LIST_TIMEOUT)
            .json(&body)
            .send()?;
        let session: UploadSession = check_status(resp)?.json()?;

        let total = content.len();
        let mut web_url = None;
        for span in chunk_spans(total, UPLOAD_CHUNK) {
            debug!("Uploading {} of {} bytes", span.end, total);
            let resp = self
                .http
                .put(&session.upload_url)
                .header(CONTENT_RANGE, content_range(&span, total))
                .timeout(UPLOAD_TIMEOUT)
                .body(content[span].to_vec())
                .send()?;
            let resp = check_status(resp)?;
            if resp.status() != StatusCode::ACCEPTED {
                web_url = resp.json::<UploadedItem>()?.web_url;
            }
        }
        Ok(web_url)
    }
}

impl UploadSink for GraphClient {
    fn upload(&self, folder_path: &str, file_name: &str, content: &[u8]) -> Result<String, Error> {
        let target = super::join_remote_path(folder_path, file_name);
        let web_url = if content.len() <= MAX_SIMPLE_UPLOAD {
            self.upload_small(&target, content)?
        } else {
            info!(
                "{} is {} bytes; using an upload session",
                file_name,
                content.len()
            );
            self.upload_large(&target, file_name, content)?
        };
        Ok(web_url.unwrap_or(target))
    }
}

/// Consecutive byte ranges of at most `chunk` bytes covering `0..total`.
fn chunk_spans(total: usize, chunk: usize) -> Vec<Range<usize>> {
    (0..total)
        .step_by(chunk.max(1))
        .map(|start| start..(start + chunk).min(total))
        .collect()
}

/// `Content-Range` value for one chunk, e.g. `bytes 0-99/250`.
fn content_range(span: &Range<usize>, total: usize) -> String {
    format!("bytes {}-{}/{}", span.start, span.end - 1, total)
}

/// Turns a non-success response into [`Error::Remote`] carrying the body.
fn check_status(resp: Response) -> Result<Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let detail = resp.text().unwrap_or_default();
    Err(Error::Remote {
        status: status.as_u16(),
        detail,
    })
}

/// Percent-encodes a drive path, keeping `/` and RFC 3986 unreserved characters.
fn encode_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
