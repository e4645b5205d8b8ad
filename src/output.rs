use std::io::{self, Write};

use serde::Serialize;

use crate::app::SpeciesResult;
use crate::organism::OrganismRecord;
use crate::store::Metadata;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Text,
    Json,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_organism(record: &OrganismRecord) -> io::Result<()> {
        Self::print_json(record)
    }

    pub fn print_species(result: &SpeciesResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_update(metadata: &Metadata) -> io::Result<()> {
        Self::print_json(metadata)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

pub struct TextOutput;

impl TextOutput {
    pub fn print_organism(record: &OrganismRecord) -> io::Result<()> {
        let mut stdout = io::stdout();
        stdout.write_all(format_organism(record).as_bytes())
    }
}

pub fn format_organism(record: &OrganismRecord) -> String {
    format!(
        "Entry: {}\nCode: {}\nSpecies: {}\nLineage: {}\n",
        record.entry, record.code, record.species, record.lineage
    )
}
