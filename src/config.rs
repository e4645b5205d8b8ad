use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use camino::Utf8PathBuf;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::error::KeggError;

pub const DEFAULT_CONFIG_FILE: &str = "kegg-pathway.json";
pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub concurrency: Option<usize>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub data_dir: Option<String>,
    #[serde(default)]
    pub endpoints: Option<EndpointsEntry>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct EndpointsEntry {
    #[serde(default)]
    pub pathway_page: Option<String>,
    #[serde(default)]
    pub pathway_image: Option<String>,
    #[serde(default)]
    pub htext: Option<String>,
    #[serde(default)]
    pub organism_list: Option<String>,
}

/// URL templates. `{id}` is the full map id, `{code}` its prefix and
/// `{name}` the htext export name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub pathway_page: String,
    pub pathway_image: String,
    pub htext: String,
    pub organism_list: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            pathway_page: "https://www.kegg.jp/kegg-bin/show_pathway?{id}".to_string(),
            pathway_image: "https://www.kegg.jp/kegg/pathway/{code}/{id}.png".to_string(),
            htext: "https://www.kegg.jp/kegg-bin/download_htext?htext={name}&format=htext&filedir="
                .to_string(),
            organism_list: "https://rest.kegg.jp/list/organism".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub concurrency: usize,
    pub timeout: Duration,
    pub data_dir: Utf8PathBuf,
    pub endpoints: Endpoints,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Reads `path`, or `kegg-pathway.json` in the working directory when it
    /// exists. Without either, the defaults apply.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, KeggError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Self::resolve_config(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| KeggError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| KeggError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, KeggError> {
        let concurrency = config
            .concurrency
            .unwrap_or(DEFAULT_CONCURRENCY)
            .max(1);
        let timeout = Duration::from_secs(config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));

        let data_dir = match config.data_dir {
            Some(dir) => Utf8PathBuf::from(dir),
            None => default_data_dir()?,
        };

        let defaults = Endpoints::default();
        let endpoints = match config.endpoints {
            Some(entry) => Endpoints {
                pathway_page: entry.pathway_page.unwrap_or(defaults.pathway_page),
                pathway_image: entry.pathway_image.unwrap_or(defaults.pathway_image),
                htext: entry.htext.unwrap_or(defaults.htext),
                organism_list: entry.organism_list.unwrap_or(defaults.organism_list),
            },
            None => defaults,
        };

        Ok(ResolvedConfig {
            concurrency,
            timeout,
            data_dir,
            endpoints,
        })
    }
}

fn default_data_dir() -> Result<Utf8PathBuf, KeggError> {
    BaseDirs::new()
        .and_then(|dirs| Utf8PathBuf::from_path_buf(dirs.data_dir().join("kegg-pathway")).ok())
        .ok_or_else(|| KeggError::Filesystem("unable to resolve data directory".to_string()))
}
