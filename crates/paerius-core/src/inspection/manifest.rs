//! Listing of an archive's contents.

use crate::compression::Compression;
use crate::phar::PharArchive;
use crate::phar::PharEntry;
use crate::phar::format::DATETIME_KEY;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Everything the manifest of an archive declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveManifest {
    /// Archive location.
    pub path: PathBuf,

    /// Alias the archive maps itself under.
    pub alias: String,

    /// Manifest API version, dotted.
    pub api_version: String,

    /// Codec declared in the global flags.
    pub compression: Compression,

    /// Build timestamp from the metadata, if present.
    pub created_at: Option<String>,

    /// All archive-level metadata.
    pub metadata: BTreeMap<String, String>,

    /// Stored files.
    pub entries: Vec<ArchiveEntry>,

    /// Number of stored files.
    pub total_entries: usize,

    /// Total uncompressed size of stored files.
    pub total_size: u64,

    /// Total stored size of file data.
    pub stored_size: u64,

    /// Size of the archive file.
    pub archive_size: u64,

    /// Signature trailer, if present.
    pub signature: Option<SignatureInfo>,
}

/// A stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// `/`-separated path inside the archive.
    pub name: String,

    /// Uncompressed size.
    pub size: u64,

    /// Stored size.
    pub compressed_size: u64,

    /// Modification time, seconds since the Unix epoch.
    pub mtime: u32,

    /// CRC32 of the uncompressed content.
    pub crc32: u32,

    /// Unix permission bits.
    pub permissions: u32,

    /// Codec the file is stored with.
    pub compression: Compression,
}

/// Algorithm and digest of a signature trailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureInfo {
    /// Algorithm name.
    pub algorithm: String,

    /// Hex-encoded stored digest.
    pub digest: String,
}

impl ArchiveManifest {
    pub(crate) fn from_archive(path: PathBuf, archive: &PharArchive) -> Self {
        let entries: Vec<ArchiveEntry> = archive.entries().iter().map(ArchiveEntry::from).collect();
        let [major, minor] = archive.api_version().to_be_bytes();

        Self {
            path,
            alias: archive.alias().to_string(),
            api_version: format!("{}.{}.{}", major >> 4, major & 0x0f, minor >> 4),
            compression: archive.compression(),
            created_at: archive.metadata().get(DATETIME_KEY).cloned(),
            metadata: archive.metadata().clone(),
            total_entries: entries.len(),
            total_size: entries.iter().map(|e| e.size).sum(),
            stored_size: entries.iter().map(|e| e.compressed_size).sum(),
            archive_size: archive.size(),
            signature: archive.signature().map(|sig| SignatureInfo {
                algorithm: sig.algorithm_name().to_string(),
                digest: hex::encode(&sig.digest),
            }),
            entries,
        }
    }
}

impl From<&PharEntry> for ArchiveEntry {
    fn from(entry: &PharEntry) -> Self {
        Self {
            name: entry.name.clone(),
            size: u64::from(entry.size),
            compressed_size: u64::from(entry.compressed_size),
            mtime: entry.mtime,
            crc32: entry.crc32,
            permissions: entry.permissions(),
            compression: entry.compression(),
        }
    }
}
