use std::fs;
use std::io::{self, BufReader};

use camino::{Utf8Path, Utf8PathBuf};
use tar::Archive;

use crate::error::KeggError;

/// Copies the single file `entry_name` out of a tar archive into
/// `target_dir`, keeping only its file name.
pub fn extract_tar_entry(
    archive_path: &Utf8Path,
    entry_name: &str,
    target_dir: &Utf8Path,
) -> Result<Utf8PathBuf, KeggError> {
    let file = fs::File::open(archive_path.as_std_path())
        .map_err(|err| KeggError::Archive(format!("open {archive_path}: {err}")))?;
    let mut archive = Archive::new(BufReader::new(file));
    let entries = archive
        .entries()
        .map_err(|err| KeggError::Archive(err.to_string()))?;

    for entry in entries {
        let mut entry = entry.map_err(|err| KeggError::Archive(err.to_string()))?;
        let path = entry
            .path()
            .map_err(|err| KeggError::Archive(err.to_string()))?
            .into_owned();
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if file_name != entry_name || !entry.header().entry_type().is_file() {
            continue;
        }

        fs::create_dir_all(target_dir.as_std_path())
            .map_err(|err| KeggError::Filesystem(format!("create {target_dir}: {err}")))?;
        let target = target_dir.join(file_name);
        let mut outfile = fs::File::create(target.as_std_path())
            .map_err(|err| KeggError::Filesystem(format!("create {target}: {err}")))?;
        io::copy(&mut entry, &mut outfile)
            .map_err(|err| KeggError::Filesystem(format!("write {target}: {err}")))?;
        return Ok(target);
    }

    Err(KeggError::ArchiveEntryNotFound {
        entry: entry_name.to_string(),
        archive: archive_path.to_string(),
    })
}
