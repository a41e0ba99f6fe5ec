use bytes::Bytes;

use crate::hash::ContentHash;
use crate::tree::AquaTree;

/// Where a file's bytes live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileContent {
    Bytes(Bytes),
    Text(String),
    /// Fetched lazily, cached by content hash.
    Remote { url: String },
}

/// Raw content backing a revision, under a logical file name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileObject {
    pub file_name: String,
    pub content: FileContent,
    pub path: Option<String>,
}

impl FileObject {
    pub fn from_bytes(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content: FileContent::Bytes(bytes.into()),
            path: None,
        }
    }

    pub fn from_text(file_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content: FileContent::Text(text.into()),
            path: None,
        }
    }

    pub fn remote(file_name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content: FileContent::Remote { url: url.into() },
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Bytes held in memory, if any.
    pub fn inline_bytes(&self) -> Option<Bytes> {
        match &self.content {
            FileContent::Bytes(bytes) => Some(bytes.clone()),
            FileContent::Text(text) => Some(Bytes::from(text.clone().into_bytes())),
            FileContent::Remote { .. } => None,
        }
    }

    pub fn remote_url(&self) -> Option<&str> {
        match &self.content {
            FileContent::Remote { url } => Some(url),
            _ => None,
        }
    }

    /// True when the inline content is empty. Remote content is never empty here.
    pub fn is_empty(&self) -> bool {
        match &self.content {
            FileContent::Bytes(bytes) => bytes.is_empty(),
            FileContent::Text(text) => text.is_empty(),
            FileContent::Remote { url } => url.is_empty(),
        }
    }

    /// Hash of the inline content. `None` for remote content.
    pub fn content_hash(&self) -> Option<ContentHash> {
        self.inline_bytes().map(|bytes| ContentHash::digest(&bytes))
    }

    /// Parse the content as an embedded AquaTree, for trees shipped as files.
    pub fn as_aqua_tree(&self) -> Option<AquaTree> {
        let bytes = self.inline_bytes()?;
        serde_json::from_slice(&bytes).ok()
    }
}
