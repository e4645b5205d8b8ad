use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum KeggError {
    #[error("invalid pathway map id: {0}")]
    InvalidMapId(String),

    #[error("invalid organism code: {0}")]
    InvalidOrganismCode(String),

    #[error("KEGG request failed: {0}")]
    Http(String),

    #[error("KEGG returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("htext export incomplete (no \"#Last updated\" marker): {0}")]
    IncompleteHtext(String),

    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("entry {entry} not found in archive {archive}")]
    ArchiveEntryNotFound { entry: String, archive: String },

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("organism not found: {0}")]
    #[diagnostic(help("run `kegg-pathway update` to refresh the local organism table"))]
    OrganismNotFound(String),

    #[error("invalid scrub pattern: {0}")]
    InvalidPattern(String),

    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),
}
