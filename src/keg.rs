//! Flattening of KEGG BRITE htext ("keg") hierarchies into TSV.
//!
//! Lines are tagged by their first character: `A` and `B` open the top and
//! second level groups, `C` opens a pathway group and `D` is a gene entry.
//! Each `D` line becomes one row carrying the `C`/`B`/`A` context that was
//! active when its `C` line was read.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};

use camino::Utf8Path;
use flate2::read::MultiGzDecoder;
use regex::Regex;
use tracing::info;

use crate::domain::MapId;
use crate::error::KeggError;

pub const TSV_HEADER: &str = "gene_id\tgene_information\tC_id\tC_name\tKO_id\tKO_information\tEC_ids\tB_id\tB_name\tA_id\tA_name";

/// Source name that selects standard input.
pub const STDIN_SOURCE: &str = "-";

const EC_OPEN: &str = " [EC:";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    pub id: String,
    pub name: String,
}

impl Group {
    fn parse(rest: &str) -> Self {
        let (id, name) = split_first_space(rest);
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

/// Context stamped onto every gene row that follows a `C` line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathwayContext {
    pub c: Group,
    pub b: Group,
    pub a: Group,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatRecord {
    pub gene_id: String,
    pub gene_information: String,
    pub ko_id: String,
    pub ko_information: String,
    pub ec_ids: String,
    pub context: PathwayContext,
}

impl FlatRecord {
    pub fn to_tsv_line(&self) -> String {
        [
            self.gene_id.as_str(),
            self.gene_information.as_str(),
            self.context.c.id.as_str(),
            self.context.c.name.as_str(),
            self.ko_id.as_str(),
            self.ko_information.as_str(),
            self.ec_ids.as_str(),
            self.context.b.id.as_str(),
            self.context.b.name.as_str(),
            self.context.a.id.as_str(),
            self.context.a.name.as_str(),
        ]
        .join("\t")
    }
}

/// Line-by-line state machine. Malformed lines are dropped without error.
#[derive(Debug, Default)]
pub struct KegConverter {
    a: Group,
    b: Group,
    current: PathwayContext,
}

impl KegConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_line(&mut self, line: &str) -> Option<FlatRecord> {
        if line.len() < 2 {
            return None;
        }
        let mut chars = line.chars();
        let marker = chars.next()?;
        let rest = strip_padding(chars.as_str());

        match marker {
            'A' => {
                self.a = Group::parse(rest);
                None
            }
            'B' => {
                self.b = Group::parse(rest);
                None
            }
            'C' => {
                self.current = self.pathway_context(rest);
                None
            }
            'D' => self.gene_record(rest),
            _ => None,
        }
    }

    fn pathway_context(&self, rest: &str) -> PathwayContext {
        let mut c = Group::parse(rest);
        let xref = c.name.split_once(" [").map(|(name, xref)| {
            let xref = xref.strip_suffix(']').unwrap_or(xref);
            (name.to_string(), xref.to_string())
        });
        if let Some((name, xref)) = xref {
            if !xref.is_empty() {
                c.id = xref;
            }
            c.name = name;
        }
        PathwayContext {
            c,
            b: self.b.clone(),
            a: self.a.clone(),
        }
    }

    fn gene_record(&self, rest: &str) -> Option<FlatRecord> {
        let (gene_id, gene_information, ko_id, ko_information) = split_leaf(rest)?;

        let (ko_information, ec_ids) = match ko_information.split_once(EC_OPEN) {
            Some((info, ec)) => (info, ec.replacen(']', "", 1)),
            None => (ko_information, String::new()),
        };

        Some(FlatRecord {
            gene_id: gene_id.to_string(),
            gene_information: gene_information.to_string(),
            ko_id: ko_id.to_string(),
            ko_information: ko_information.to_string(),
            ec_ids,
            context: self.current.clone(),
        })
    }
}

/// Writes the header and one row per gene line. Returns the row count.
pub fn convert<R: BufRead, W: Write>(mut reader: R, writer: &mut W) -> Result<usize, KeggError> {
    writeln!(writer, "{TSV_HEADER}").map_err(|err| KeggError::Filesystem(err.to_string()))?;

    let mut converter = KegConverter::new();
    let mut rows = 0usize;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|err| KeggError::Filesystem(err.to_string()))?;
        if read == 0 {
            break;
        }
        let line = String::from_utf8_lossy(trim_line_end(&buf));
        if let Some(record) = converter.process_line(&line) {
            writeln!(writer, "{}", record.to_tsv_line())
                .map_err(|err| KeggError::Filesystem(err.to_string()))?;
            rows += 1;
        }
    }
    writer
        .flush()
        .map_err(|err| KeggError::Filesystem(err.to_string()))?;
    Ok(rows)
}

/// Opens a keg source: `-` is stdin, a `.gz` suffix means gzip.
pub fn open_source(name: &str) -> Result<Box<dyn BufRead>, KeggError> {
    if name == STDIN_SOURCE {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(name).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => KeggError::MissingInput(name.into()),
        _ => KeggError::Filesystem(format!("open {name}: {err}")),
    })?;
    if name.ends_with(".gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Converts `source` into `destination`, or stdout when no destination is
/// given. Parent directories of the destination are created.
pub fn convert_file(source: &str, destination: Option<&Utf8Path>) -> Result<usize, KeggError> {
    let reader = open_source(source)?;
    match destination {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) {
                fs::create_dir_all(parent.as_std_path())
                    .map_err(|err| KeggError::Filesystem(format!("create {parent}: {err}")))?;
            }
            let file = File::create(path.as_std_path())
                .map_err(|err| KeggError::Filesystem(format!("create {path}: {err}")))?;
            let rows = convert(reader, &mut BufWriter::new(file))?;
            info!(source, destination = %path, rows, "saved tsv");
            Ok(rows)
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            convert(reader, &mut handle)
        }
    }
}

/// Every `PATH:<map id>` cross reference in a keg source, first occurrence
/// order, without duplicates.
pub fn extract_map_ids(source: &str) -> Result<Vec<MapId>, KeggError> {
    let mut text = String::new();
    open_source(source)?
        .read_to_string(&mut text)
        .map_err(|err| KeggError::Filesystem(format!("read {source}: {err}")))?;
    scan_map_ids(&text)
}

pub fn scan_map_ids(text: &str) -> Result<Vec<MapId>, KeggError> {
    let re = Regex::new(r"PATH:([a-z]+[0-9]+)")
        .map_err(|err| KeggError::InvalidPattern(err.to_string()))?;
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for capture in re.captures_iter(text) {
        let Some(token) = capture.get(1).map(|m| m.as_str()) else {
            continue;
        };
        if !seen.insert(token.to_string()) {
            continue;
        }
        if let Ok(id) = token.parse::<MapId>() {
            ids.push(id);
        }
    }
    Ok(ids)
}

fn strip_padding(rest: &str) -> &str {
    rest.trim_start_matches(|ch: char| ch == ':' || ch == ' ')
}

fn split_first_space(text: &str) -> (&str, &str) {
    text.split_once(' ').unwrap_or((text, ""))
}

/// Splits a leaf into gene id, gene info, KO id and KO info. KEGG separates
/// the gene and KO halves with a tab; without one the line is read as
/// `gene info ko rest...` and needs at least the first three tokens.
fn split_leaf(rest: &str) -> Option<(&str, &str, &str, &str)> {
    if let Some((gene, ko)) = rest.split_once('\t') {
        let (gene_id, gene_information) = split_first_space(gene);
        let (ko_id, ko_information) = split_first_space(ko);
        return Some((gene_id, gene_information, ko_id, ko_information));
    }

    let mut fields = rest.splitn(4, ' ');
    let gene_id = fields.next().filter(|field| !field.is_empty())?;
    let gene_information = fields.next().filter(|field| !field.is_empty())?;
    let ko_id = fields.next().filter(|field| !field.is_empty())?;
    Some((gene_id, gene_information, ko_id, fields.next().unwrap_or("")))
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
