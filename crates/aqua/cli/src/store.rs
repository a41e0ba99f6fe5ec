//! Tree and file I/O

use std::path::{Path, PathBuf};

use aqua_types::{AquaTree, FileObject};

use crate::error::{CliError, CliResult};

/// Conventional location of the tree documenting `file`.
pub fn tree_path_for(file: &Path) -> PathBuf {
    let mut name = file.as_os_str().to_owned();
    name.push(".aqua.json");
    PathBuf::from(name)
}

pub fn read_tree(path: &Path) -> CliResult<AquaTree> {
    let contents = std::fs::read_to_string(path)?;
    Ok(AquaTree::from_json_str(&contents)?)
}

pub fn write_tree(path: &Path, tree: &AquaTree) -> CliResult<()> {
    std::fs::write(path, tree.to_json_pretty()?)?;
    Ok(())
}

/// Read a file from disk. UTF-8 content is kept as text so it travels inline
/// with the tree.
pub fn read_file_object(path: &Path) -> CliResult<FileObject> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CliError::InvalidArgument(format!("not a file path: {}", path.display())))?
        .to_string();
    let bytes = std::fs::read(path)?;
    let object = match String::from_utf8(bytes) {
        Ok(text) => FileObject::from_text(file_name, text),
        Err(e) => FileObject::from_bytes(file_name, e.into_bytes()),
    };
    Ok(object.with_path(path.display().to_string()))
}

/// Parse `key=value`.
pub fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))?;
    if key.is_empty() {
        return Err(format!("empty key in {raw:?}"));
    }
    Ok((key.to_string(), value.to_string()))
}
