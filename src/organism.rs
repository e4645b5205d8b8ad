use std::fs;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::client::KeggClient;
use crate::error::KeggError;
use crate::store::{Metadata, Store};

pub const ORGANISM_HEADER: &str = "Entry\tCode\tSpecies\tLineage";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganismRecord {
    pub entry: String,
    pub code: String,
    pub species: String,
    pub lineage: String,
}

impl OrganismRecord {
    fn parse(line: &str) -> Option<Self> {
        let mut fields = line.split('\t');
        Some(Self {
            entry: fields.next()?.to_string(),
            code: fields.next()?.to_string(),
            species: fields.next()?.to_string(),
            lineage: fields.next().unwrap_or_default().to_string(),
        })
    }

    /// Scientific name without the trailing ` (common name)`.
    pub fn scientific_name(&self) -> &str {
        self.species
            .split_once(" (")
            .map_or(self.species.as_str(), |(name, _)| name)
    }
}

/// `Homo+sapiens`, `homo  SAPIENS` and `Homo sapiens` all compare equal.
pub fn normalize_query(query: &str) -> String {
    query
        .replace('+', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// First row whose code or scientific name matches `query`.
pub fn find_organism(table: &str, query: &str) -> Option<OrganismRecord> {
    let query = normalize_query(query);
    table
        .lines()
        .skip(1)
        .filter_map(OrganismRecord::parse)
        .find(|record| {
            record.code.eq_ignore_ascii_case(&query)
                || record.scientific_name().to_lowercase() == query
        })
}

pub fn lookup(store: &Store, query: &str) -> Result<OrganismRecord, KeggError> {
    let path = store.organism_table_path();
    if !path.as_std_path().exists() {
        return Err(KeggError::MissingInput(path.into_std_path_buf()));
    }
    let table = fs::read_to_string(path.as_std_path())
        .map_err(|err| KeggError::Filesystem(format!("read {path}: {err}")))?;
    find_organism(&table, query).ok_or_else(|| KeggError::OrganismNotFound(query.to_string()))
}

/// Replaces the local organism table with a fresh copy from KEGG.
pub fn update_table<C: KeggClient>(client: &C, store: &Store) -> Result<Metadata, KeggError> {
    let path = store.organism_table_path();
    info!(path = %path, "updating organism table");

    let body = client.fetch_organism_list()?;
    let mut content = String::with_capacity(body.len() + ORGANISM_HEADER.len() + 1);
    content.push_str(ORGANISM_HEADER);
    content.push('\n');
    content.push_str(&body);

    store.ensure_data_root()?;
    Store::write_bytes_atomic(&path, content.as_bytes())?;

    let metadata = Metadata {
        source: "kegg".to_string(),
        downloaded_at: Utc::now().to_rfc3339(),
        entries: body.lines().filter(|line| !line.trim().is_empty()).count(),
    };
    Store::write_metadata(&store.organism_metadata_path(), &metadata)?;
    info!(entries = metadata.entries, "organism table updated");
    Ok(metadata)
}
