use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tempfile::Builder;

use crate::error::KeggError;

pub const ORGANISM_TABLE: &str = "KEGG_organism.tsv";
pub const KEG_ARCHIVE: &str = "Pathway_keg.tar";

/// Local data directory holding the organism table and the keg archive.
#[derive(Debug, Clone)]
pub struct Store {
    data_root: Utf8PathBuf,
}

impl Store {
    pub fn new(data_root: Utf8PathBuf) -> Self {
        Self { data_root }
    }

    pub fn data_root(&self) -> &Utf8Path {
        &self.data_root
    }

    pub fn organism_table_path(&self) -> Utf8PathBuf {
        self.data_root.join(ORGANISM_TABLE)
    }

    pub fn organism_metadata_path(&self) -> Utf8PathBuf {
        self.organism_table_path().with_extension("json")
    }

    pub fn keg_archive_path(&self) -> Utf8PathBuf {
        self.data_root.join(KEG_ARCHIVE)
    }

    pub fn ensure_data_root(&self) -> Result<(), KeggError> {
        ensure_dir(&self.data_root)
    }

    pub fn write_metadata(path: &Utf8Path, metadata: &Metadata) -> Result<(), KeggError> {
        let content = serde_json::to_vec_pretty(metadata)
            .map_err(|err| KeggError::Filesystem(err.to_string()))?;
        Self::write_bytes_atomic(path, &content)
    }

    pub fn read_metadata(path: &Utf8Path) -> Result<Metadata, KeggError> {
        let content = fs::read_to_string(path.as_std_path())
            .map_err(|err| KeggError::Filesystem(format!("read {path}: {err}")))?;
        serde_json::from_str(&content).map_err(|err| KeggError::Filesystem(err.to_string()))
    }

    pub fn write_bytes_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), KeggError> {
        let parent = path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or(Utf8Path::new("."));
        ensure_dir(parent)?;
        let mut temp = Builder::new()
            .prefix(".kegg-pathway")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| KeggError::Filesystem(format!("temp file in {parent}: {err}")))?;
        temp.write_all(content)
            .map_err(|err| KeggError::Filesystem(format!("write {path}: {err}")))?;
        temp.persist(path.as_std_path())
            .map_err(|err| KeggError::Filesystem(format!("persist {path}: {err}")))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub source: String,
    pub downloaded_at: String,
    pub entries: usize,
}

pub fn ensure_dir(path: &Utf8Path) -> Result<(), KeggError> {
    if path.as_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(path.as_std_path())
        .map_err(|err| KeggError::Filesystem(format!("create {path}: {err}")))
}
