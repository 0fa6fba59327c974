//! GitHub repository-contents backend.
//!
//! Uses the REST "contents" endpoints as a versioned key-value store:
//! - `GET    /repos/{owner}/{repo}/contents/{path}`  list a directory or read a file
//! - `PUT    /repos/{owner}/{repo}/contents/{path}`  create or update a file
//! - `DELETE /repos/{owner}/{repo}/contents/{path}`  delete a file
//!
//! File content travels base64-encoded; the blob `sha` is the version token.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::{ContentStore, StoreError, StoredFile};

/// Default API endpoint
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("topicbase/", env!("CARGO_PKG_VERSION"));
const ACCEPT: &str = "application/vnd.github.v3+json";

/// Connection settings for the GitHub backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    pub owner: String,
    pub repo: String,

    /// Branch to read from and commit to (repository default when unset)
    #[serde(default)]
    pub branch: Option<String>,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Bearer token; never read from the config file
    #[serde(skip)]
    pub token: Option<String>,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

/// Entry of a directory listing
#[derive(Debug, Deserialize)]
struct DirEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

/// File payload from a contents read
#[derive(Debug, Deserialize)]
struct FileContent {
    sha: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

/// Response to a create/update
#[derive(Debug, Deserialize)]
struct WriteResponse {
    content: WrittenFile,
}

#[derive(Debug, Deserialize)]
struct WrittenFile {
    sha: String,
}

#[derive(Debug, Serialize)]
struct PutRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct DeleteRequest<'a> {
    message: &'a str,
    sha: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

/// GitHub contents API client
pub struct GithubStore {
    config: GithubConfig,
    client: reqwest::Client,
}

impl GithubStore {
    /// Create a new store
    pub fn new(config: GithubConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| StoreError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Build the contents URL for a logical path
    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.owner,
            self.config.repo,
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method.clone(), self.contents_url(path))
            .header("Accept", ACCEPT);

        if let Some(token) = &self.config.token {
            builder = builder.bearer_auth(token);
        }
        if method == Method::GET {
            if let Some(branch) = &self.config.branch {
                builder = builder.query(&[("ref", branch)]);
            }
        }
        builder
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, StoreError> {
        builder
            .send()
            .await
            .map_err(|e| StoreError::Transport(format!("GitHub API request failed: {}", e)))
    }

    /// GET a path, mapping 404 to `None`
    async fn fetch(&self, path: &str) -> Result<Option<Response>, StoreError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        check_status(response, path).await.map(Some)
    }
}

/// Map error statuses onto store errors
async fn check_status(response: Response, path: &str) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    Err(match status {
        StatusCode::NOT_FOUND => StoreError::NotFound(path.to_string()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            StoreError::Auth(format!("GitHub API error ({}): {}", status, text))
        }
        StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => StoreError::Conflict {
            path: path.to_string(),
        },
        _ => StoreError::Transport(format!("GitHub API error ({}): {}", status, text)),
    })
}

async fn decode_json<T: serde::de::DeserializeOwned>(
    response: Response,
    path: &str,
) -> Result<T, StoreError> {
    response
        .json()
        .await
        .map_err(|e| StoreError::Decode(format!("{}: {}", path, e)))
}

/// Decode base64 content as returned by the API (line-wrapped)
fn decode_content(encoded: &str, path: &str) -> Result<String, StoreError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64
        .decode(compact)
        .map_err(|e| StoreError::Decode(format!("{}: {}", path, e)))?;
    String::from_utf8(bytes).map_err(|e| StoreError::Decode(format!("{}: {}", path, e)))
}

#[async_trait]
impl ContentStore for GithubStore {
    fn name(&self) -> &str {
        "github"
    }

    async fn list(&self, dir: &str) -> Result<Option<Vec<String>>, StoreError> {
        let Some(response) = self.fetch(dir).await? else {
            return Ok(None);
        };

        let entries: Vec<DirEntry> = decode_json(response, dir).await?;
        Ok(Some(
            entries
                .into_iter()
                .filter(|e| e.kind == "file")
                .map(|e| e.name)
                .collect(),
        ))
    }

    async fn get(&self, path: &str) -> Result<Option<StoredFile>, StoreError> {
        let Some(response) = self.fetch(path).await? else {
            return Ok(None);
        };

        let file: FileContent = decode_json(response, path).await?;
        if let Some(encoding) = file.encoding.as_deref() {
            if encoding != "base64" {
                return Err(StoreError::Decode(format!(
                    "{}: unsupported encoding '{}'",
                    path, encoding
                )));
            }
        }

        Ok(Some(StoredFile {
            path: path.to_string(),
            content: decode_content(&file.content, path)?,
            version: file.sha,
        }))
    }

    async fn put(
        &self,
        path: &str,
        content: &str,
        version: Option<&str>,
        message: &str,
    ) -> Result<String, StoreError> {
        let body = PutRequest {
            message,
            content: BASE64.encode(content.as_bytes()),
            sha: version,
            branch: self.config.branch.as_deref(),
        };

        let response = self.send(self.request(Method::PUT, path).json(&body)).await?;
        let response = check_status(response, path).await?;
        let written: WriteResponse = decode_json(response, path).await?;

        Ok(written.content.sha)
    }

    async fn delete(&self, path: &str, version: &str, message: &str) -> Result<(), StoreError> {
        let body = DeleteRequest {
            message,
            sha: version,
            branch: self.config.branch.as_deref(),
        };

        let response = self
            .send(self.request(Method::DELETE, path).json(&body))
            .await?;
        check_status(response, path).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GithubConfig {
        GithubConfig {
            owner: "owner".to_string(),
            repo: "portal".to_string(),
            branch: None,
            api_base: "https://api.github.com/".to_string(),
            token: Some("TOKEN".to_string()),
        }
    }

    #[test]
    fn test_contents_url() {
        let store = GithubStore::new(config()).unwrap();
        assert_eq!(
            store.contents_url("content/fires/topic-1.md"),
            "https://api.github.com/repos/owner/portal/contents/content/fires/topic-1.md"
        );
        assert_eq!(
            store.contents_url("/content/fires"),
            "https://api.github.com/repos/owner/portal/contents/content/fires"
        );
    }

    #[test]
    fn test_decode_wrapped_content() {
        let encoded = BASE64.encode("---\ntitle: \"Пожар\"\n---\n\nТекст");
        let (head, tail) = encoded.split_at(10);
        let wrapped = format!("{}\n{}\n", head, tail);

        assert_eq!(
            decode_content(&wrapped, "x").unwrap(),
            "---\ntitle: \"Пожар\"\n---\n\nТекст"
        );
        assert!(matches!(
            decode_content("!!!", "x"),
            Err(StoreError::Decode(_))
        ));
    }

    #[test]
    fn test_token_not_deserialized() {
        let config: GithubConfig =
            serde_yaml::from_str("owner: o\nrepo: r\ntoken: leaked\n").unwrap();
        assert!(config.token.is_none());
        assert_eq!(config.api_base, DEFAULT_API_BASE);
    }
}
