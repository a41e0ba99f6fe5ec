//! Ordering and verification

use std::path::{Path, PathBuf};
use std::sync::Arc;

use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;

use aqua_types::{AquaTree, FileObject};
use aqua_verify::{
    ChainVerifier, HttpContentFetcher, RevisionStatus, TreeStatus, TreeVerification,
    VerificationContext, VerifierConfig,
};

use crate::error::{CliError, CliResult};
use crate::output::{print_failure, print_output, print_single, print_success, OutputFormat};
use crate::store::{read_file_object, read_tree};

#[derive(Serialize, Tabled)]
struct RevisionRow {
    #[tabled(rename = "#")]
    index: usize,
    hash: String,
    #[tabled(rename = "type")]
    revision_type: String,
    timestamp: String,
    previous: String,
    name: String,
}

/// Print revisions in canonical order, genesis first.
pub fn order(tree_path: &Path, format: OutputFormat) -> CliResult<()> {
    let tree = read_tree(tree_path)?;
    let rows = tree
        .ordered_revisions()?
        .into_iter()
        .enumerate()
        .map(|(index, (hash, revision))| RevisionRow {
            index,
            hash: hash.to_prefixed_hex(),
            revision_type: revision.revision_type().to_string(),
            timestamp: revision.local_timestamp.to_string(),
            previous: revision
                .previous_verification_hash
                .map(|p| p.short())
                .unwrap_or_default(),
            name: tree.file_index.get(&hash).cloned().unwrap_or_default(),
        })
        .collect();
    print_output(rows, format)
}

#[derive(Serialize, Tabled)]
struct ResultRow {
    hash: String,
    #[tabled(rename = "type")]
    revision_type: String,
    status: String,
    checks: String,
}

/// Local files, remote locations and candidate trees to verify against.
#[derive(Debug, Default)]
pub struct VerifyInputs {
    pub files: Vec<PathBuf>,
    /// `(file name, url)` pairs for content served remotely.
    pub remotes: Vec<(String, String)>,
    pub candidates: Vec<PathBuf>,
}

impl VerifyInputs {
    fn context(&self) -> CliResult<VerificationContext> {
        let mut files = self
            .files
            .iter()
            .map(|p| read_file_object(p))
            .collect::<CliResult<Vec<FileObject>>>()?;
        files.extend(
            self.remotes
                .iter()
                .map(|(name, url)| FileObject::remote(name.clone(), url.clone())),
        );
        let candidates = self
            .candidates
            .iter()
            .map(|p| read_tree(p))
            .collect::<CliResult<Vec<AquaTree>>>()?;
        Ok(VerificationContext {
            files,
            linked_trees: Vec::new(),
            candidates,
        })
    }
}

/// Verify a tree file, fetching remote content over HTTP.
pub async fn verify_report(
    config: &VerifierConfig,
    tree_path: &Path,
    inputs: &VerifyInputs,
) -> CliResult<TreeVerification> {
    let tree = read_tree(tree_path)?;
    let context = inputs.context()?;
    let fetcher = HttpContentFetcher::new(config.fetch_timeout())
        .map_err(|e| CliError::Config(e.to_string()))?;
    let verifier = ChainVerifier::new(config.clone()).with_fetcher(Arc::new(fetcher));
    Ok(verifier.verify_tree(&tree, &context).await?)
}

pub async fn verify(
    config: &VerifierConfig,
    tree_path: &Path,
    inputs: &VerifyInputs,
    format: OutputFormat,
) -> CliResult<()> {
    let report = verify_report(config, tree_path, inputs).await?;

    match format {
        OutputFormat::Table => {
            let rows = report
                .results
                .iter()
                .map(|r| ResultRow {
                    hash: r.hash.short(),
                    revision_type: r
                        .revision_type
                        .map(|t| t.to_string())
                        .unwrap_or_default(),
                    status: colored_status(r.status),
                    checks: r
                        .logs
                        .iter()
                        .map(|l| format!("{}: {}", l.check, l.message))
                        .collect::<Vec<_>>()
                        .join("\n"),
                })
                .collect();
            print_output(rows, format)?;
        }
        OutputFormat::Json | OutputFormat::Yaml => print_single(&report, format)?,
    }

    match report.status {
        TreeStatus::Valid => {
            print_success("Tree is valid");
            Ok(())
        }
        TreeStatus::Pending => {
            println!("{} Some checks could not be decided", "?".yellow());
            Ok(())
        }
        TreeStatus::Invalid => {
            let failed = report.failed().count();
            print_failure(&format!("{failed} revision(s) failed verification"));
            Err(CliError::VerificationFailed(format!(
                "{} is invalid",
                tree_path.display()
            )))
        }
    }
}

fn colored_status(status: RevisionStatus) -> String {
    match status {
        RevisionStatus::Passed => status.to_string().green().to_string(),
        RevisionStatus::Failed => status.to_string().red().to_string(),
        RevisionStatus::Indeterminate => status.to_string().yellow().to_string(),
    }
}
