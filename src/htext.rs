use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::{error, info};

use crate::client::KeggClient;
use crate::domain::OrganismCode;
use crate::engine::FetchEngine;
use crate::error::KeggError;
use crate::store::Store;

/// Signature KEGG puts on the last line of a complete htext export.
pub const LAST_UPDATED_MARKER: &str = "#Last updated:";

/// A complete export ends with `#Last updated: ...` followed by a final
/// newline, so the marker sits on the second-to-last `\n`-separated piece.
pub fn is_complete_export(body: &str) -> bool {
    let lines: Vec<&str> = body.split('\n').collect();
    lines.len() >= 2 && lines[lines.len() - 2].starts_with(LAST_UPDATED_MARKER)
}

/// Downloads `<code>00001.keg` and stores it gzip-compressed in `outdir`.
/// Nothing is written unless the export is complete and fully compressed.
pub fn download_keg<C: KeggClient>(
    client: &C,
    code: &OrganismCode,
    outdir: &Utf8Path,
) -> Result<Utf8PathBuf, KeggError> {
    let name = code.htext_name();
    let body = client.fetch_htext(&name)?;
    if !is_complete_export(&body) {
        return Err(KeggError::IncompleteHtext(name));
    }

    let path = outdir.join(format!("{name}.gz"));
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(body.as_bytes())
        .map_err(|err| KeggError::Filesystem(format!("compress {name}: {err}")))?;
    let compressed = encoder
        .finish()
        .map_err(|err| KeggError::Filesystem(format!("compress {name}: {err}")))?;
    Store::write_bytes_atomic(&path, &compressed)?;

    info!(path = %path, "saved keg");
    Ok(path)
}

/// Concurrent [`download_keg`] for several organisms; failures are logged.
pub fn download_kegs<C: KeggClient>(
    client: &C,
    engine: FetchEngine,
    codes: Vec<OrganismCode>,
    outdir: &Utf8Path,
) -> Result<(), KeggError> {
    let names: Vec<&str> = codes.iter().map(OrganismCode::as_str).collect();
    info!(codes = %names.join(" "), "requesting organism keg files");

    engine.run(codes, |code: OrganismCode| {
        if let Err(err) = download_keg(client, &code, outdir) {
            error!(code = %code, "failed to get {}: {err}", code.htext_name());
        }
    })
}
