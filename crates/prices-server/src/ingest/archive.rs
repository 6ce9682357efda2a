//! Zip archive handling for price files
//!
//! Uploads are read fully into memory and unpacked from that buffer; there is
//! no streaming path. The export side writes the matching single-entry
//! archive.

use std::io::{Cursor, Read, Write};

use tracing::debug;
use zip::{result::ZipError, write::SimpleFileOptions, ZipArchive, ZipWriter};

use super::error::ImportError;

/// Default suffix identifying the data file inside an upload
pub const DEFAULT_ENTRY_SUFFIX: &str = "data.csv";

/// One decompressed archive entry
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub name: String,
    pub contents: Vec<u8>,
}

/// Find the first file entry whose name ends with `suffix` and decompress it
///
/// Entries are scanned in central-directory order, so `exports/data.csv`
/// matches a `data.csv` suffix. Directory entries are skipped.
///
/// # Errors
///
/// - [`ImportError::ArchiveFormat`] if `data` is not a zip archive or the
///   matched entry cannot be decompressed
/// - [`ImportError::EntryNotFound`] if no entry matches
pub fn unpack(data: &[u8], suffix: &str) -> Result<ArchiveEntry, ImportError> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;

    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        if file.is_dir() || !file.name().ends_with(suffix) {
            continue;
        }

        // Sizes in the headers are whatever the uploader wrote; grow as data arrives
        let name = file.name().to_string();
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(ZipError::Io)?;

        debug!(entry = %name, compressed = data.len(), size = contents.len(), "Unpacked archive entry");
        return Ok(ArchiveEntry { name, contents });
    }

    Err(ImportError::EntryNotFound(suffix.to_string()))
}

/// Build an archive holding a single entry
pub fn pack(entry_name: &str, contents: &[u8]) -> Result<Vec<u8>, ZipError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer.start_file(entry_name, SimpleFileOptions::default())?;
    writer.write_all(contents)?;
    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}
