use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use aqua_types::ContentHash;

use crate::error::FetchError;

/// What to fetch: the expected content hash and, for remote content, where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentReference {
    pub hash: ContentHash,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedContent {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

/// Boundary for resolving file content the verifier does not hold.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, reference: &ContentReference) -> Result<FetchedContent, FetchError>;
}

/// Serves content from memory, keyed by hash. Counts fetches.
#[derive(Default)]
pub struct StaticContentFetcher {
    entries: RwLock<HashMap<ContentHash, FetchedContent>>,
    fetches: AtomicUsize,
}

impl StaticContentFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `bytes` under their hash and return it.
    pub fn insert(&self, bytes: impl Into<Bytes>, content_type: Option<&str>) -> ContentHash {
        let bytes = bytes.into();
        let hash = ContentHash::digest(&bytes);
        let content = FetchedContent {
            bytes,
            content_type: content_type.map(str::to_string),
        };
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(hash, content);
        }
        hash
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentFetcher for StaticContentFetcher {
    async fn fetch(&self, reference: &ContentReference) -> Result<FetchedContent, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let entries = self
            .entries
            .read()
            .map_err(|_| FetchError::Transport("content store lock poisoned".to_string()))?;
        entries
            .get(&reference.hash)
            .cloned()
            .ok_or_else(|| FetchError::ContentUnavailable {
                hash: reference.hash,
                reason: "not stored".to_string(),
            })
    }
}

/// Fetches remote content over HTTP(S).
#[derive(Clone)]
pub struct HttpContentFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpContentFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl ContentFetcher for HttpContentFetcher {
    async fn fetch(&self, reference: &ContentReference) -> Result<FetchedContent, FetchError> {
        let url = reference
            .url
            .as_deref()
            .ok_or_else(|| FetchError::ContentUnavailable {
                hash: reference.hash,
                reason: "no url".to_string(),
            })?;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    hash: reference.hash,
                    after_ms: self.timeout.as_millis() as u64,
                }
            } else {
                FetchError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::ContentUnavailable {
                hash: reference.hash,
                reason: format!("HTTP {status} from {url}"),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(FetchedContent {
            bytes,
            content_type,
        })
    }
}
