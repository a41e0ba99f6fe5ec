//! Link resolution.
//!
//! A link revision names its target by verification hash. The target is
//! resolved from the host tree first (its `file_index` or its own revisions).
//! Failing that, it is a deep link and the supplied candidate trees are searched
//! in the order they were given; the first tree containing the target wins.

use tracing::debug;

use aqua_types::{AquaTree, ContentHash, FileObject};

use crate::error::ResolveError;

/// Where a link's target was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkResolution {
    /// Named by the host tree itself.
    Direct {
        target: ContentHash,
        file_name: String,
    },
    /// Found in `candidates[candidate_index]`.
    Deep {
        target: ContentHash,
        candidate_index: usize,
        file_name: String,
    },
}

impl LinkResolution {
    pub fn target(&self) -> &ContentHash {
        match self {
            LinkResolution::Direct { target, .. } | LinkResolution::Deep { target, .. } => target,
        }
    }

    pub fn file_name(&self) -> &str {
        match self {
            LinkResolution::Direct { file_name, .. } | LinkResolution::Deep { file_name, .. } => {
                file_name
            }
        }
    }

    pub fn is_deep(&self) -> bool {
        matches!(self, LinkResolution::Deep { .. })
    }
}

/// A resolved link plus the file object backing it, when one was supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedFile<'f> {
    pub resolution: LinkResolution,
    pub file_object: Option<&'f FileObject>,
}

/// Resolves link targets against a host tree and ordered candidate trees.
#[derive(Debug, Clone, Copy)]
pub struct DeepLinkResolver<'a> {
    candidates: &'a [AquaTree],
}

impl<'a> DeepLinkResolver<'a> {
    pub fn new(candidates: &'a [AquaTree]) -> Self {
        Self { candidates }
    }

    /// True when the link's target is neither named nor held by `tree`.
    pub fn is_deep_link(tree: &AquaTree, link_hash: &ContentHash) -> bool {
        tree.get(link_hash)
            .and_then(|rev| rev.as_link())
            .and_then(|link| link.target())
            .map_or(false, |target| {
                !tree.file_index.contains_key(target) && !tree.contains(target)
            })
    }

    pub fn resolve(
        &self,
        tree: &AquaTree,
        link_hash: &ContentHash,
    ) -> Result<LinkResolution, ResolveError> {
        let revision = tree
            .get(link_hash)
            .ok_or(ResolveError::RevisionNotFound(*link_hash))?;
        let link = revision
            .as_link()
            .ok_or(ResolveError::NotALink(*link_hash))?;
        let target = *link.target().ok_or_else(|| ResolveError::InvalidLink {
            revision: *link_hash,
            reason: "no link_verification_hashes".to_string(),
        })?;
        if target == *link_hash {
            return Err(ResolveError::InvalidLink {
                revision: *link_hash,
                reason: "link targets itself".to_string(),
            });
        }

        if let Some(name) = tree.file_index.get(&target) {
            return Ok(LinkResolution::Direct {
                target,
                file_name: name.clone(),
            });
        }
        if tree.contains(&target) {
            let file_name = tree
                .document_name()
                .map_err(|e| ResolveError::InvalidLink {
                    revision: *link_hash,
                    reason: e.to_string(),
                })?
                .to_string();
            return Ok(LinkResolution::Direct { target, file_name });
        }

        for (index, candidate) in self.candidates.iter().enumerate() {
            if !candidate.contains(&target) && !candidate.file_index.contains_key(&target) {
                continue;
            }
            let name = candidate
                .file_index
                .get(&target)
                .cloned()
                .or_else(|| candidate.document_name().ok().map(str::to_string));
            if let Some(file_name) = name {
                debug!(
                    link = %link_hash.short(),
                    target = %target.short(),
                    candidate = index,
                    "resolved deep link"
                );
                return Ok(LinkResolution::Deep {
                    target,
                    candidate_index: index,
                    file_name,
                });
            }
        }

        Err(ResolveError::UnresolvedDeepLink {
            revision: *link_hash,
            target,
        })
    }

    /// Resolve a link and pick out the supplied file object it refers to,
    /// matching first by content hash against `link_file_hashes`, then by name.
    pub fn resolve_linked_file<'f>(
        &self,
        tree: &AquaTree,
        link_hash: &ContentHash,
        files: &'f [FileObject],
    ) -> Result<LinkedFile<'f>, ResolveError> {
        let resolution = self.resolve(tree, link_hash)?;
        let file_hashes = tree
            .get(link_hash)
            .and_then(|rev| rev.as_link())
            .map(|link| link.link_file_hashes.as_slice())
            .unwrap_or_default();

        let by_hash = files.iter().find(|file| {
            file.content_hash()
                .map_or(false, |hash| file_hashes.contains(&hash))
        });
        let file_object =
            by_hash.or_else(|| files.iter().find(|file| file.file_name == resolution.file_name()));

        Ok(LinkedFile {
            resolution,
            file_object,
        })
    }
}
