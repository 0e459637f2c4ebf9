//! ZIP encoding of a stored website.
//!
//! Layout:
//!
//! ```text
//! README.md
//! index.html
//! assets/<filename>   # one per asset whose file still exists
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Cursor, Seek, Write};

use rustc_hash::FxHashSet;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::asset::Asset;
use crate::core::SiteResult;
use crate::debug;

fn zip_err(e: zip::result::ZipError) -> io::Error {
    io::Error::other(e.to_string())
}

fn options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(9))
}

/// Write generated files (name order) then asset files (list order).
///
/// Assets whose file is gone are skipped, as is a second entry with an
/// already used name.
pub fn write_archive<W: Write + Seek>(
    writer: W,
    files: &BTreeMap<String, String>,
    assets: &[Asset],
) -> SiteResult<W> {
    let mut zip = zip::ZipWriter::new(writer);
    let options = options();
    let mut written: FxHashSet<String> = FxHashSet::default();

    for (name, content) in files {
        zip.start_file(name.as_str(), options).map_err(zip_err)?;
        zip.write_all(content.as_bytes())?;
        written.insert(name.clone());
    }

    for asset in assets {
        let Some(path) = asset.existing_file() else {
            debug!("archive"; "asset {} missing on disk, skipped", asset.filename);
            continue;
        };
        let name = asset.packaged_path();
        if !written.insert(name.clone()) {
            debug!("archive"; "duplicate entry {}, skipped", name);
            continue;
        }
        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                debug!("archive"; "cannot open {}: {}", path.display(), e);
                continue;
            }
        };
        zip.start_file(name.as_str(), options).map_err(zip_err)?;
        io::copy(&mut file, &mut zip)?;
    }

    Ok(zip.finish().map_err(zip_err)?)
}

/// Encode the archive into memory.
pub fn archive_bytes(files: &BTreeMap<String, String>, assets: &[Asset]) -> SiteResult<Vec<u8>> {
    let cursor = write_archive(Cursor::new(Vec::new()), files, assets)?;
    Ok(cursor.into_inner())
}
