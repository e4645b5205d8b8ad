//! KEGG pathway retrieval and keg htext flattening.

pub mod app;
pub mod client;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod fs_util;
pub mod htext;
pub mod keg;
pub mod organism;
pub mod output;
pub mod pathway;
pub mod scrub;
pub mod store;
