//! Commands that create or extend a tree

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use aqua_chain::{Ed25519Wallet, RevisionBuilder};
use aqua_types::AquaTree;

use crate::error::{CliError, CliResult};
use crate::output::print_success;
use crate::store::{read_file_object, read_tree, tree_path_for, write_tree};

/// Start a tree from a file on disk.
pub fn create(
    builder: &RevisionBuilder,
    file: &Path,
    name: Option<String>,
    out: Option<PathBuf>,
) -> CliResult<()> {
    let mut object = read_file_object(file)?;
    if let Some(name) = name {
        object.file_name = name;
    }
    let tree = builder.create_genesis_revision(&object)?;
    let out = out.unwrap_or_else(|| tree_path_for(file));
    write_tree(&out, &tree)?;
    report(&tree, &format!("Created {}", out.display()))
}

/// Start a tree from `key=value` fields.
pub fn form(
    builder: &RevisionBuilder,
    name: &str,
    fields: Vec<(String, String)>,
    out: &Path,
) -> CliResult<()> {
    let tree = builder.create_genesis_form(name, into_map(fields)?)?;
    write_tree(out, &tree)?;
    report(&tree, &format!("Created {}", out.display()))
}

pub fn append_form(
    builder: &RevisionBuilder,
    tree_path: &Path,
    fields: Vec<(String, String)>,
) -> CliResult<()> {
    let tree = read_tree(tree_path)?;
    let next = builder.create_form_revision(&tree, into_map(fields)?)?;
    write_tree(tree_path, &next)?;
    report(&next, "Appended form revision")
}

pub fn append_file(builder: &RevisionBuilder, tree_path: &Path, file: &Path) -> CliResult<()> {
    let tree = read_tree(tree_path)?;
    let next = builder.create_file_revision(&tree, &read_file_object(file)?)?;
    write_tree(tree_path, &next)?;
    report(&next, "Appended file revision")
}

pub fn sign(builder: &RevisionBuilder, tree_path: &Path, key_hex: &str) -> CliResult<()> {
    let wallet = Ed25519Wallet::from_secret_hex(key_hex).map_err(CliError::InvalidArgument)?;
    let tree = read_tree(tree_path)?;
    let next = builder.sign_revision(&tree, &wallet)?;
    write_tree(tree_path, &next)?;
    report(&next, "Appended signature revision")
}

pub fn delete_head(builder: &RevisionBuilder, tree_path: &Path) -> CliResult<()> {
    let tree = read_tree(tree_path)?;
    let next = builder.delete_head(&tree)?;
    write_tree(tree_path, &next)?;
    report(&next, "Removed head revision")
}

fn into_map(fields: Vec<(String, String)>) -> CliResult<BTreeMap<String, String>> {
    if fields.is_empty() {
        return Err(CliError::InvalidArgument(
            "at least one key=value field is required".into(),
        ));
    }
    Ok(fields.into_iter().collect())
}

fn report(tree: &AquaTree, message: &str) -> CliResult<()> {
    print_success(message);
    println!("  Head: {}", tree.head()?);
    println!("  Revisions: {}", tree.len());
    Ok(())
}
