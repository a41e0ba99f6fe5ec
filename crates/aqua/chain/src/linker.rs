use tracing::info;

use aqua_types::{AquaTree, ContentHash, FileObject, LinkPayload, Revision, RevisionPayload, TreeError};

use crate::config::ChainConfig;
use crate::error::ChainError;

/// A tree plus the file it documents and, optionally, a pinned revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AquaTreeWrapper {
    pub aqua_tree: AquaTree,
    pub file_object: Option<FileObject>,
    /// Revision to link to. Defaults to the head.
    pub revision: Option<ContentHash>,
}

impl AquaTreeWrapper {
    pub fn new(aqua_tree: AquaTree) -> Self {
        Self {
            aqua_tree,
            file_object: None,
            revision: None,
        }
    }

    pub fn with_file_object(mut self, file_object: FileObject) -> Self {
        self.file_object = Some(file_object);
        self
    }

    pub fn with_revision(mut self, revision: ContentHash) -> Self {
        self.revision = Some(revision);
        self
    }

    /// Name the wrapped tree is known by: the file object's name, else the
    /// genesis entry in `file_index`.
    pub fn document_name(&self) -> Result<String, TreeError> {
        match &self.file_object {
            Some(file) => Ok(file.file_name.clone()),
            None => self.aqua_tree.document_name().map(str::to_string),
        }
    }
}

/// Appends link revisions that point one tree at another.
#[derive(Debug, Clone, Default)]
pub struct TreeLinker {
    config: ChainConfig,
}

impl TreeLinker {
    pub fn new(config: ChainConfig) -> Self {
        Self { config }
    }

    /// Append a link revision onto `host`'s head that points at `target`.
    ///
    /// The result carries `target`'s `file_index` and names the linked revision,
    /// so the link resolves from the host tree alone. Neither input is modified.
    pub fn link_aqua_tree(
        &self,
        host: &AquaTreeWrapper,
        target: &AquaTreeWrapper,
    ) -> Result<AquaTree, ChainError> {
        let host_tree = &host.aqua_tree;
        let target_tree = &target.aqua_tree;

        let host_head = host_tree.head().map_err(ChainError::NoHead)?;
        if let Some(pinned) = host.revision {
            if pinned != host_head {
                return Err(TreeError::NotHead {
                    expected: Some(host_head),
                    found: Some(pinned),
                }
                .into());
            }
        }

        let target_hash = match target.revision {
            Some(pinned) if target_tree.contains(&pinned) => pinned,
            Some(pinned) => return Err(TreeError::RevisionNotFound(pinned).into()),
            None => target_tree.head().map_err(ChainError::NoHead)?,
        };

        let host_genesis = host_tree.genesis_hash()?;
        let target_genesis = target_tree.genesis_hash()?;
        if host_genesis == target_genesis {
            return Err(ChainError::CyclicLink(format!(
                "host and target share genesis {host_genesis}"
            )));
        }
        if target_tree.contains(&host_head) {
            return Err(ChainError::CyclicLink(format!(
                "target already contains host head {host_head}"
            )));
        }

        let target_name = target.document_name()?;
        let payload = LinkPayload {
            link_type: self.config.link_type.clone(),
            link_verification_hashes: vec![target_hash],
            link_file_hashes: target_file_hash(target, &target_genesis).into_iter().collect(),
        };
        let revision = Revision::new(Some(host_head), RevisionPayload::Link(payload))
            .with_version(self.config.protocol_version.clone());
        let (mut linked, link_hash) = host_tree.with_appended(revision)?;

        for (hash, name) in &target_tree.file_index {
            linked.file_index.entry(*hash).or_insert_with(|| name.clone());
        }
        linked.file_index.insert(target_hash, target_name.clone());

        info!(
            link = %link_hash.short(),
            target = %target_hash.short(),
            name = %target_name,
            "linked tree"
        );
        Ok(linked)
    }
}

/// Content hash of the linked document: the file object when it has inline
/// content, else whatever the target genesis records.
fn target_file_hash(target: &AquaTreeWrapper, genesis: &ContentHash) -> Option<ContentHash> {
    if let Some(hash) = target.file_object.as_ref().and_then(FileObject::content_hash) {
        return Some(hash);
    }
    let revision = target.aqua_tree.get(genesis)?;
    match &revision.payload {
        RevisionPayload::File(file) => Some(file.file_hash),
        RevisionPayload::Form(form) => Some(form.file_hash),
        _ => None,
    }
}
