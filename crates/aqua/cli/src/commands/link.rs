//! Linking trees and resolving links

use std::path::{Path, PathBuf};

use serde::Serialize;

use aqua_chain::{AquaTreeWrapper, DeepLinkResolver, LinkResolution, TreeLinker};
use aqua_types::{AquaTree, ContentHash};

use crate::error::{CliError, CliResult};
use crate::output::{print_single, print_success, OutputFormat};
use crate::store::{read_tree, write_tree};

/// Link `target` onto the head of `host`, rewriting the host tree file.
pub fn link(linker: &TreeLinker, host_path: &Path, target_path: &Path) -> CliResult<()> {
    let host = AquaTreeWrapper::new(read_tree(host_path)?);
    let target = AquaTreeWrapper::new(read_tree(target_path)?);
    let linked = linker.link_aqua_tree(&host, &target)?;
    write_tree(host_path, &linked)?;
    print_success(&format!(
        "Linked {} into {}",
        target.document_name()?,
        host_path.display()
    ));
    println!("  Head: {}", linked.head()?);
    Ok(())
}

#[derive(Serialize)]
struct ResolutionView {
    link: ContentHash,
    target: ContentHash,
    file_name: String,
    deep: bool,
    candidate: Option<String>,
}

pub fn resolve_link(
    tree_path: &Path,
    link: &str,
    candidate_paths: &[PathBuf],
    format: OutputFormat,
) -> CliResult<()> {
    let tree = read_tree(tree_path)?;
    let link_hash: ContentHash = link
        .parse()
        .map_err(|e| CliError::InvalidArgument(format!("link hash {link:?}: {e}")))?;
    let candidates = candidate_paths
        .iter()
        .map(|p| read_tree(p))
        .collect::<CliResult<Vec<AquaTree>>>()?;

    let resolution = DeepLinkResolver::new(&candidates).resolve(&tree, &link_hash)?;
    let candidate = match &resolution {
        LinkResolution::Deep {
            candidate_index, ..
        } => candidate_paths
            .get(*candidate_index)
            .map(|p| p.display().to_string()),
        LinkResolution::Direct { .. } => None,
    };
    let view = ResolutionView {
        link: link_hash,
        target: *resolution.target(),
        file_name: resolution.file_name().to_string(),
        deep: resolution.is_deep(),
        candidate,
    };
    print_single(&view, format)
}
