//! Phar archive parsing.

use crate::PackError;
use crate::Result;
use crate::compression::Compression;
use crate::phar::format::FILE_RECORD_LEN;
use crate::phar::format::FLAG_BZ2;
use crate::phar::format::FLAG_GZ;
use crate::phar::format::FLAG_SIGNED;
use crate::phar::format::MANIFEST_HEADER_LEN;
use crate::phar::format::PERMISSION_MASK;
use crate::phar::format::SIGNATURE_MAGIC;
use crate::phar::format::TRAILER_LEN;
use crate::phar::metadata;
use std::collections::BTreeMap;
use std::ops::Range;

const HALT_MARKER: &[u8] = b"__HALT_COMPILER();";

/// Signature trailer of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PharSignature {
    /// Algorithm identifier.
    pub algorithm: u32,
    /// Stored digest.
    pub digest: Vec<u8>,
}

impl PharSignature {
    /// Human-readable algorithm name.
    #[must_use]
    pub const fn algorithm_name(&self) -> &'static str {
        match self.algorithm {
            0x0001 => "MD5",
            0x0002 => "SHA-1",
            0x0003 => "SHA-256",
            0x0004 => "SHA-512",
            _ => "unknown",
        }
    }
}

/// One file record from the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PharEntry {
    /// `/`-separated path inside the archive.
    pub name: String,
    /// Uncompressed size.
    pub size: u32,
    /// Modification time, seconds since the Unix epoch.
    pub mtime: u32,
    /// Stored size.
    pub compressed_size: u32,
    /// CRC32 of the uncompressed content.
    pub crc32: u32,
    /// Raw flag word.
    pub flags: u32,
    data: Range<usize>,
}

impl PharEntry {
    /// Codec the entry is stored with.
    #[must_use]
    pub const fn compression(&self) -> Compression {
        compression_from_flags(self.flags)
    }

    /// Unix permission bits.
    #[must_use]
    pub const fn permissions(&self) -> u32 {
        self.flags & PERMISSION_MASK
    }
}

/// A parsed archive, holding its raw bytes.
#[derive(Debug, Clone)]
pub struct PharArchive {
    bytes: Vec<u8>,
    stub_len: usize,
    alias: String,
    api_version: u16,
    global_flags: u32,
    metadata: BTreeMap<String, String>,
    entries: Vec<PharEntry>,
    signature: Option<PharSignature>,
    signed_len: usize,
}

impl PharArchive {
    /// Parses a complete archive.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::InvalidArchive`] if the stub terminator, the
    /// manifest or the signature trailer is missing or inconsistent.
    ///
    /// # Examples
    ///
    /// ```
    /// use paerius_core::Compression;
    /// use paerius_core::phar::PharArchive;
    /// use paerius_core::phar::PharWriter;
    ///
    /// let mut writer = PharWriter::new("app.phar", Compression::None);
    /// writer.add_file("autoload.php", b"<?php", 0, 0o644)?;
    /// let mut bytes = Vec::new();
    /// writer.write_to(&mut bytes)?;
    ///
    /// let archive = PharArchive::parse(bytes)?;
    /// assert_eq!(archive.alias(), "app.phar");
    /// assert_eq!(archive.read(&archive.entries()[0])?, b"<?php");
    /// # Ok::<(), paerius_core::PackError>(())
    /// ```
    pub fn parse(bytes: Vec<u8>) -> Result<Self> {
        let stub_len = find_stub_end(&bytes)?;

        let mut cur = Cursor::new(&bytes, stub_len);
        let manifest_len = cur.u32("manifest length")? as usize;
        let manifest_end = cur
            .pos
            .checked_add(manifest_len)
            .filter(|&end| end <= bytes.len())
            .ok_or_else(|| invalid("manifest runs past end of file"))?;
        if manifest_len < MANIFEST_HEADER_LEN {
            return Err(invalid("manifest is too short"));
        }

        let count = cur.u32("file count")? as usize;
        let api = cur.take(2, "API version")?;
        let api_version = u16::from_be_bytes([api[0], api[1]]);
        let global_flags = cur.u32("global flags")?;
        let alias = cur.string("alias")?;
        let meta_len = cur.u32("metadata length")? as usize;
        let metadata = metadata::unserialize(cur.take(meta_len, "metadata")?)?;

        let remaining = manifest_end.saturating_sub(cur.pos);
        if count > remaining / FILE_RECORD_LEN {
            return Err(invalid("file count exceeds manifest size"));
        }

        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            let name = cur.string("file name")?;
            let size = cur.u32("file size")?;
            let mtime = cur.u32("file mtime")?;
            let compressed_size = cur.u32("stored size")?;
            let crc32 = cur.u32("file crc")?;
            let flags = cur.u32("file flags")?;
            let file_meta_len = cur.u32("file metadata length")? as usize;
            cur.take(file_meta_len, "file metadata")?;
            records.push((name, size, mtime, compressed_size, crc32, flags));
        }
        if cur.pos > manifest_end {
            return Err(invalid("file records run past manifest"));
        }

        let (signature, signed_len) = if global_flags & FLAG_SIGNED == 0 {
            (None, bytes.len())
        } else {
            let (sig, signed_len) = parse_trailer(&bytes)?;
            (Some(sig), signed_len)
        };

        let mut offset = manifest_end;
        let mut entries = Vec::with_capacity(records.len());
        for (name, size, mtime, compressed_size, crc32, flags) in records {
            let end = offset
                .checked_add(compressed_size as usize)
                .filter(|&end| end <= signed_len)
                .ok_or_else(|| invalid(format!("data of {name} runs past end of archive")))?;
            entries.push(PharEntry {
                name,
                size,
                mtime,
                compressed_size,
                crc32,
                flags,
                data: offset..end,
            });
            offset = end;
        }

        Ok(Self {
            bytes,
            stub_len,
            alias,
            api_version,
            global_flags,
            metadata,
            entries,
            signature,
            signed_len,
        })
    }

    /// Bootstrap stub, terminator included.
    #[must_use]
    pub fn stub(&self) -> &[u8] {
        &self.bytes[..self.stub_len]
    }

    /// Alias the archive maps itself under.
    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Manifest API version, e.g. `0x1100` for 1.1.0.
    #[must_use]
    pub const fn api_version(&self) -> u16 {
        self.api_version
    }

    /// Codec declared in the global flags.
    #[must_use]
    pub const fn compression(&self) -> Compression {
        compression_from_flags(self.global_flags)
    }

    /// Archive-level metadata.
    #[must_use]
    pub const fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// File records in stored order.
    #[must_use]
    pub fn entries(&self) -> &[PharEntry] {
        &self.entries
    }

    /// Signature trailer, if the archive is signed.
    #[must_use]
    pub const fn signature(&self) -> Option<&PharSignature> {
        self.signature.as_ref()
    }

    /// Bytes covered by the signature.
    #[must_use]
    pub fn signed_bytes(&self) -> &[u8] {
        &self.bytes[..self.signed_len]
    }

    /// Total archive size.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Stored bytes of `entry`.
    #[must_use]
    pub fn raw(&self, entry: &PharEntry) -> &[u8] {
        self.bytes.get(entry.data.clone()).unwrap_or_default()
    }

    /// Decompressed content of `entry`.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::Io`] if the stored stream cannot be decoded.
    pub fn read(&self, entry: &PharEntry) -> Result<Vec<u8>> {
        Ok(entry
            .compression()
            .decompress(self.raw(entry), entry.size as usize)?)
    }
}

const fn compression_from_flags(flags: u32) -> Compression {
    if flags & FLAG_BZ2 != 0 {
        Compression::Bzip2
    } else if flags & FLAG_GZ != 0 {
        Compression::Gzip
    } else {
        Compression::None
    }
}

/// Returns the offset just past the stub terminator.
///
/// `__HALT_COMPILER();` may be followed by ` ?>` and a line break.
fn find_stub_end(bytes: &[u8]) -> Result<usize> {
    let start = bytes
        .windows(HALT_MARKER.len())
        .position(|w| w == HALT_MARKER)
        .ok_or_else(|| invalid("stub has no __HALT_COMPILER(); marker"))?;

    let mut end = start + HALT_MARKER.len();
    let rest = &bytes[end..];
    if rest.starts_with(b" ?>\r\n") {
        end += 5;
    } else if rest.starts_with(b" ?>\n") {
        end += 4;
    } else if rest.starts_with(b" ?>") {
        end += 3;
    }
    Ok(end)
}

fn parse_trailer(bytes: &[u8]) -> Result<(PharSignature, usize)> {
    let len = bytes.len();
    if len < TRAILER_LEN || &bytes[len - 4..] != SIGNATURE_MAGIC {
        return Err(invalid("signed archive lacks GBMB trailer"));
    }
    let algorithm = read_u32(&bytes[len - 8..len - 4]);
    let digest_len = match algorithm {
        0x0001 => 16,
        0x0002 => 20,
        0x0003 => 32,
        0x0004 => 64,
        other => return Err(invalid(format!("unknown signature algorithm {other:#06x}"))),
    };
    let signed_len = (len - TRAILER_LEN)
        .checked_sub(digest_len)
        .ok_or_else(|| invalid("signature trailer is truncated"))?;

    Ok((
        PharSignature {
            algorithm,
            digest: bytes[signed_len..len - TRAILER_LEN].to_vec(),
        },
        signed_len,
    ))
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    const fn new(bytes: &'a [u8], pos: usize) -> Self {
        Self { bytes, pos }
    }

    fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| invalid(format!("truncated {what}")))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u32(&mut self, what: &str) -> Result<u32> {
        self.take(4, what).map(read_u32)
    }

    fn string(&mut self, what: &str) -> Result<String> {
        let len = self.u32(what)? as usize;
        let raw = self.take(len, what)?;
        String::from_utf8(raw.to_vec()).map_err(|_| invalid(format!("{what} is not UTF-8")))
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(buf)
}

fn invalid(reason: impl Into<String>) -> PackError {
    PackError::InvalidArchive(reason.into())
}
