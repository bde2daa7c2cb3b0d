//! Phar archive writer.

use crate::PackError;
use crate::Result;
use crate::compression::Compression;
use crate::phar::format::API_VERSION;
use crate::phar::format::FLAG_BZ2;
use crate::phar::format::FLAG_GZ;
use crate::phar::format::FLAG_SIGNED;
use crate::phar::format::PERMISSION_MASK;
use crate::phar::format::SIGNATURE_MAGIC;
use crate::phar::format::SIGNATURE_SHA256;
use crate::phar::metadata;
use crate::phar::stub::stub_for;
use sha2::Digest;
use sha2::Sha256;
use std::collections::BTreeMap;
use std::io::Write;
use tracing::debug;

/// A file staged for writing, already compressed.
#[derive(Debug, Clone)]
struct StagedFile {
    name: String,
    size: u32,
    mtime: u32,
    crc32: u32,
    permissions: u32,
    data: Vec<u8>,
}

/// Sizes of a file after staging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagedSizes {
    /// Uncompressed size.
    pub size: u64,
    /// Stored size after compression.
    pub compressed_size: u64,
}

/// Result of writing an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArchive {
    /// Total bytes written, trailer included.
    pub archive_size: u64,
    /// SHA-256 digest over everything before the trailer.
    pub signature: [u8; 32],
}

/// Assembles a signed Phar archive.
///
/// Files are compressed as they are added. Nothing is written until
/// [`PharWriter::write_to`], because the manifest preceding the file data
/// records every stored size.
///
/// # Examples
///
/// ```
/// use paerius_core::Compression;
/// use paerius_core::phar::PharWriter;
///
/// let mut writer = PharWriter::new("app.phar", Compression::None)
///     .with_metadata("datetime", "2026-10-19T08:30:00+00:00");
/// writer.add_file("autoload.php", b"<?php", 0, 0o644)?;
///
/// let mut out = Vec::new();
/// let written = writer.write_to(&mut out)?;
/// assert_eq!(written.archive_size, out.len() as u64);
/// assert!(out.ends_with(b"GBMB"));
/// # Ok::<(), paerius_core::PackError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PharWriter {
    alias: String,
    compression: Compression,
    level: Option<u8>,
    metadata: BTreeMap<String, String>,
    files: Vec<StagedFile>,
}

impl PharWriter {
    /// Creates a writer for an archive mapped under `alias`.
    #[must_use]
    pub fn new(alias: impl Into<String>, compression: Compression) -> Self {
        Self {
            alias: alias.into(),
            compression,
            level: None,
            metadata: BTreeMap::new(),
            files: Vec::new(),
        }
    }

    /// Sets the compression level (1-9).
    #[must_use]
    pub const fn with_level(mut self, level: Option<u8>) -> Self {
        self.level = level;
        self
    }

    /// Adds an archive-level metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Number of staged files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if no file has been staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Compresses and stages a file under the `/`-separated `name`.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::InvalidState`] if the file does not fit the
    /// format's 32-bit size fields, or [`PackError::Io`] if compression
    /// fails.
    pub fn add_file(
        &mut self,
        name: &str,
        data: &[u8],
        mtime: u32,
        permissions: u32,
    ) -> Result<StagedSizes> {
        let size = fit_u32(data.len(), name)?;

        let mut crc = flate2::Crc::new();
        crc.update(data);

        let stored = self.compression.compress(data, self.level)?;
        fit_u32(stored.len(), name)?;

        debug!(
            name,
            size,
            stored = stored.len(),
            compression = %self.compression,
            "staged file"
        );

        let sizes = StagedSizes {
            size: u64::from(size),
            compressed_size: stored.len() as u64,
        };
        self.files.push(StagedFile {
            name: name.to_string(),
            size,
            mtime,
            crc32: crc.sum(),
            permissions: permissions & PERMISSION_MASK,
            data: stored,
        });
        Ok(sizes)
    }

    /// Writes stub, manifest, file data and signature trailer to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::InvalidState`] if the manifest exceeds the
    /// format's 32-bit length field, or [`PackError::Io`] on write failure.
    pub fn write_to<W: Write>(&self, out: W) -> Result<WrittenArchive> {
        let mut out = SigningWriter::new(out);

        out.write_all(&stub_for(&self.alias))?;

        let (manifest, padded) = self.manifest()?;
        out.write_all(&manifest)?;
        if padded {
            out.write_all(b" ")?;
        }

        for file in &self.files {
            out.write_all(&file.data)?;
        }

        out.finish()
    }

    /// Encodes the manifest, length prefix included.
    ///
    /// The second value is `true` when a padding byte must follow: the
    /// runtime misreads a manifest whose length starts with a line break.
    fn manifest(&self) -> Result<(Vec<u8>, bool)> {
        let codec_flag = codec_flag(self.compression);
        let meta = if self.metadata.is_empty() {
            String::new()
        } else {
            metadata::serialize(&self.metadata)
        };

        let mut body = Vec::new();
        put_u32(&mut body, fit_u32(self.files.len(), "file count")?);
        body.extend_from_slice(&API_VERSION);
        put_u32(&mut body, FLAG_SIGNED | codec_flag);
        put_bytes(&mut body, self.alias.as_bytes(), "alias")?;
        put_bytes(&mut body, meta.as_bytes(), "metadata")?;

        for file in &self.files {
            put_bytes(&mut body, file.name.as_bytes(), &file.name)?;
            put_u32(&mut body, file.size);
            put_u32(&mut body, file.mtime);
            put_u32(&mut body, fit_u32(file.data.len(), &file.name)?);
            put_u32(&mut body, file.crc32);
            put_u32(&mut body, file.permissions | codec_flag);
            put_u32(&mut body, 0);
        }

        let mut len = fit_u32(body.len(), "manifest")?;
        let padded = matches!(len.to_le_bytes()[0], b'\r' | b'\n');
        if padded {
            len += 1;
        }

        let mut manifest = Vec::with_capacity(body.len() + 4);
        put_u32(&mut manifest, len);
        manifest.extend_from_slice(&body);
        Ok((manifest, padded))
    }
}

/// Per-file and global flag bit for a codec.
#[must_use]
pub const fn codec_flag(compression: Compression) -> u32 {
    match compression {
        Compression::None => 0,
        Compression::Gzip => FLAG_GZ,
        Compression::Bzip2 => FLAG_BZ2,
    }
}

/// Hashes everything written through it and appends the signature trailer.
struct SigningWriter<W> {
    inner: W,
    hasher: Sha256,
    written: u64,
}

impl<W: Write> SigningWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
            written: 0,
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        self.inner.write_all(buf)?;
        self.hasher.update(buf);
        self.written += buf.len() as u64;
        Ok(())
    }

    fn finish(mut self) -> Result<WrittenArchive> {
        let signature: [u8; 32] = self.hasher.finalize().into();

        self.inner.write_all(&signature)?;
        self.inner.write_all(&SIGNATURE_SHA256.to_le_bytes())?;
        self.inner.write_all(SIGNATURE_MAGIC)?;
        self.inner.flush()?;

        Ok(WrittenArchive {
            archive_size: self.written + signature.len() as u64 + 8,
            signature,
        })
    }
}

fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn put_bytes(buf: &mut Vec<u8>, bytes: &[u8], what: &str) -> Result<()> {
    put_u32(buf, fit_u32(bytes.len(), what)?);
    buf.extend_from_slice(bytes);
    Ok(())
}

fn fit_u32(len: usize, what: &str) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        PackError::invalid_state(format!(
            "{what} is {len} bytes, beyond the archive format's 4 GiB limit"
        ))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::phar::format::HALT_COMPILER;

    fn read_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
    }

    #[test]
    fn test_layout_uncompressed() {
        let mut writer = PharWriter::new("x.phar", Compression::None);
        writer.add_file("a.php", b"hello", 7, 0o100_644).unwrap();

        let mut out = Vec::new();
        let written = writer.write_to(&mut out).unwrap();

        let stub = stub_for("x.phar");
        assert!(out.starts_with(&stub));
        assert!(stub.ends_with(HALT_COMPILER));

        let at = stub.len();
        let manifest_len = read_u32(&out, at) as usize;
        assert_eq!(read_u32(&out, at + 4), 1);
        assert_eq!(&out[at + 8..at + 10], &API_VERSION);
        assert_eq!(read_u32(&out, at + 10), FLAG_SIGNED);
        assert_eq!(read_u32(&out, at + 14), 6);
        assert_eq!(&out[at + 18..at + 24], b"x.phar");
        assert_eq!(read_u32(&out, at + 24), 0);

        // Record: name, size, mtime, stored size, crc, flags, metadata length.
        let rec = at + 28;
        assert_eq!(read_u32(&out, rec), 5);
        assert_eq!(&out[rec + 4..rec + 9], b"a.php");
        assert_eq!(read_u32(&out, rec + 9), 5);
        assert_eq!(read_u32(&out, rec + 13), 7);
        assert_eq!(read_u32(&out, rec + 17), 5);
        assert_eq!(read_u32(&out, rec + 25), 0o644);
        assert_eq!(read_u32(&out, rec + 29), 0);

        let data_start = at + 4 + manifest_len;
        assert_eq!(&out[data_start..data_start + 5], b"hello");

        let trailer = out.len() - 40;
        assert_eq!(&out[trailer..trailer + 32], &written.signature);
        assert_eq!(read_u32(&out, trailer + 32), SIGNATURE_SHA256);
        assert_eq!(&out[out.len() - 4..], SIGNATURE_MAGIC);
        assert_eq!(written.archive_size, out.len() as u64);
    }

    #[test]
    fn test_signature_covers_preceding_bytes() {
        let mut writer = PharWriter::new("x.phar", Compression::None);
        writer.add_file("a.php", b"<?php", 0, 0o644).unwrap();

        let mut out = Vec::new();
        let written = writer.write_to(&mut out).unwrap();

        let digest: [u8; 32] = Sha256::digest(&out[..out.len() - 40]).into();
        assert_eq!(digest, written.signature);
    }

    #[test]
    fn test_crc_is_of_uncompressed_data() {
        let data = b"<?php return [];".repeat(20);
        let mut writer = PharWriter::new("x.phar", Compression::Gzip);
        let sizes = writer.add_file("config.php", &data, 0, 0o644).unwrap();
        assert_eq!(sizes.size, data.len() as u64);
        assert!(sizes.compressed_size < sizes.size);

        let mut crc = flate2::Crc::new();
        crc.update(&data);
        assert_eq!(writer.files[0].crc32, crc.sum());
    }

    #[test]
    fn test_compression_flags() {
        let mut writer = PharWriter::new("x.phar", Compression::Gzip);
        writer.add_file("a.php", b"abc", 0, 0o755).unwrap();
        let (manifest, _) = writer.manifest().unwrap();

        assert_eq!(read_u32(&manifest, 10), FLAG_SIGNED | FLAG_GZ);
        let flags_at = manifest.len() - 8;
        assert_eq!(read_u32(&manifest, flags_at), 0o755 | FLAG_GZ);
    }

    #[test]
    fn test_line_break_length_is_padded() {
        // Grow the alias until the low length byte lands on '\n'.
        let base_len = PharWriter::new("", Compression::None)
            .manifest()
            .unwrap()
            .0
            .len()
            - 4;
        let alias = "a".repeat(usize::from(b'\n') + 256 - base_len);
        let writer = PharWriter::new(alias, Compression::None);

        let (manifest, padded) = writer.manifest().unwrap();
        assert!(padded);
        assert_eq!(manifest[0], b'\n' + 1);

        let mut out = Vec::new();
        writer.write_to(&mut out).unwrap();
        let stub_len = stub_for(&writer.alias).len();
        let manifest_end = stub_len + manifest.len();
        assert_eq!(out[manifest_end], b' ');
    }

    #[test]
    fn test_metadata_is_serialized() {
        let writer =
            PharWriter::new("x.phar", Compression::None).with_metadata("datetime", "then");
        let (manifest, _) = writer.manifest().unwrap();
        let text = String::from_utf8_lossy(&manifest);
        assert!(text.contains(r#"a:1:{s:8:"datetime";s:4:"then";}"#));
    }
}
