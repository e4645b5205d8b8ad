use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::{info, warn};

use crate::client::KeggClient;
use crate::domain::{MapId, OrganismCode};
use crate::engine::FetchEngine;
use crate::error::KeggError;
use crate::fs_util::extract_tar_entry;
use crate::htext::{download_keg, download_kegs};
use crate::keg;
use crate::organism::{self, OrganismRecord};
use crate::pathway::PathwayFetcher;
use crate::store::{Metadata, Store, ensure_dir};

#[derive(Debug, Clone, Serialize)]
pub struct SpeciesResult {
    pub organism: OrganismRecord,
    pub keg_path: String,
    pub tsv_path: String,
    pub tsv_rows: usize,
    pub html_dir: String,
    pub maps: usize,
}

#[derive(Clone)]
pub struct App<C: KeggClient> {
    store: Store,
    client: C,
    engine: FetchEngine,
}

impl<C: KeggClient> App<C> {
    pub fn new(store: Store, client: C, engine: FetchEngine) -> Self {
        Self {
            store,
            client,
            engine,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn update(&self) -> Result<Metadata, KeggError> {
        organism::update_table(&self.client, &self.store)
    }

    pub fn lookup(&self, query: &str) -> Result<OrganismRecord, KeggError> {
        organism::lookup(&self.store, query)
    }

    /// Downloads the keg export of every organism into `outdir`.
    pub fn get(&self, codes: Vec<OrganismCode>, outdir: &Utf8Path) -> Result<(), KeggError> {
        ensure_dir(outdir)?;
        download_kegs(&self.client, self.engine, codes, outdir)
    }

    /// Pulls `<code>00001.keg.gz` out of the local keg archive.
    pub fn get_local(
        &self,
        code: &OrganismCode,
        outdir: &Utf8Path,
    ) -> Result<Utf8PathBuf, KeggError> {
        let archive = self.store.keg_archive_path();
        let entry = format!("{}.gz", code.htext_name());
        extract_tar_entry(&archive, &entry, outdir)
    }

    /// Downloads every pathway map referenced by a keg file. Returns the
    /// number of distinct maps dispatched.
    pub fn html(&self, keg: &str, outdir: &Utf8Path, overwrite: bool) -> Result<usize, KeggError> {
        let ids = keg::extract_map_ids(keg)?;
        info!(outdir = %outdir, "save html files");
        let count = ids.len();
        self.maps(ids, outdir, overwrite)?;
        Ok(count)
    }

    pub fn maps(
        &self,
        ids: Vec<MapId>,
        outdir: &Utf8Path,
        overwrite: bool,
    ) -> Result<(), KeggError> {
        ensure_dir(outdir)?;
        let fetcher = PathwayFetcher::new(&self.client, self.engine)?;
        fetcher.fetch_all(ids, outdir, overwrite)
    }

    pub fn tsv(&self, source: &str, destination: Option<&Utf8Path>) -> Result<usize, KeggError> {
        keg::convert_file(source, destination)
    }

    /// Match, download, flatten and render one species into `workdir`.
    /// Existing pages are overwritten.
    pub fn species(&self, query: &str, workdir: &Utf8Path) -> Result<SpeciesResult, KeggError> {
        let organism = self.lookup(query)?;
        let code: OrganismCode = organism.code.parse()?;
        info!(code = %code, "querying {}", code.htext_name());

        ensure_dir(workdir)?;
        let keg_path = download_keg(&self.client, &code, workdir)?;
        let tsv_path = workdir.join(format!("{}.tsv", code.htext_name()));
        let tsv_rows = self.tsv(keg_path.as_str(), Some(&tsv_path))?;

        let html_dir = workdir.join(format!("{code}00001"));
        let maps = self.html(keg_path.as_str(), &html_dir, true)?;

        Ok(SpeciesResult {
            organism,
            keg_path: keg_path.to_string(),
            tsv_path: tsv_path.to_string(),
            tsv_rows,
            html_dir: html_dir.to_string(),
            maps,
        })
    }
}

/// Map ids from a whitespace-separated list file. Tokens that are not map
/// ids are logged and dropped.
pub fn read_map_list(path: &Utf8Path) -> Result<Vec<MapId>, KeggError> {
    let text = fs::read_to_string(path.as_std_path()).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => KeggError::MissingInput(path.as_std_path().to_path_buf()),
        _ => KeggError::Filesystem(format!("read {path}: {err}")),
    })?;
    Ok(parse_map_tokens(text.split_whitespace()))
}

pub fn parse_map_tokens<'a, I>(tokens: I) -> Vec<MapId>
where
    I: IntoIterator<Item = &'a str>,
{
    tokens
        .into_iter()
        .filter_map(|token| match token.parse::<MapId>() {
            Ok(id) => Some(id),
            Err(err) => {
                warn!("{err}");
                None
            }
        })
        .collect()
}
