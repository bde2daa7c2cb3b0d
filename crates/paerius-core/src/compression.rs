//! Per-file compression selection and codec plumbing.
//!
//! Every file stored in the archive is compressed with the same codec.
//! Which codecs exist is decided at compile time through the `bzip2` and
//! `gzip` cargo features; automatic selection prefers bzip2, then gzip,
//! then stores files as-is.
//!
//! # Level Mapping
//!
//! User levels follow a consistent 1-9 scale:
//!
//! - **1-3**: Fast compression
//! - **6**: Default compression
//! - **7-9**: Best compression

use crate::PackError;
use crate::Result;
use std::fmt;
use std::io;
use std::io::Read;
use std::io::Write;

/// Compression applied to stored files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Files are stored uncompressed.
    None,

    /// Raw deflate streams, flagged as gzip in the archive manifest.
    Gzip,

    /// Bzip2 streams.
    Bzip2,
}

impl Compression {
    /// Interprets an explicit override token.
    ///
    /// Tokens starting with `bz` select bzip2 and tokens starting with `gz`
    /// select gzip, ignoring case. Anything else means no compression.
    ///
    /// # Examples
    ///
    /// ```
    /// use paerius_core::Compression;
    ///
    /// assert_eq!(Compression::from_override("BZIP2"), Compression::Bzip2);
    /// assert_eq!(Compression::from_override("gzip"), Compression::Gzip);
    /// assert_eq!(Compression::from_override("none"), Compression::None);
    /// assert_eq!(Compression::from_override("zstd"), Compression::None);
    /// ```
    #[must_use]
    pub fn from_override(token: &str) -> Self {
        let has_prefix = |prefix: &str| {
            token
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        };

        if has_prefix("bz") {
            Self::Bzip2
        } else if has_prefix("gz") {
            Self::Gzip
        } else {
            Self::None
        }
    }

    /// Picks the best codec compiled into this build.
    #[must_use]
    pub const fn detect() -> Self {
        if Self::Bzip2.is_available() {
            Self::Bzip2
        } else if Self::Gzip.is_available() {
            Self::Gzip
        } else {
            Self::None
        }
    }

    /// Returns `true` if this codec is compiled into this build.
    #[must_use]
    pub const fn is_available(self) -> bool {
        match self {
            Self::None => true,
            Self::Gzip => cfg!(feature = "gzip"),
            Self::Bzip2 => cfg!(feature = "bzip2"),
        }
    }

    /// Resolves an optional override into the codec to use.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::UnsupportedOperation`] if the override names a
    /// codec that is not compiled into this build.
    pub fn resolve(force: Option<&str>) -> Result<Self> {
        let Some(token) = force else {
            return Ok(Self::detect());
        };

        let requested = Self::from_override(token);
        if requested.is_available() {
            Ok(requested)
        } else {
            Err(PackError::UnsupportedOperation {
                operation: format!("{requested} compression is not available in this build"),
            })
        }
    }

    /// Short lowercase name of the codec.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
        }
    }

    /// Compresses a whole file's content.
    ///
    /// # Errors
    ///
    /// Returns an error if the encoder fails or the codec is not compiled in.
    pub fn compress(self, data: &[u8], level: Option<u8>) -> io::Result<Vec<u8>> {
        match self {
            Self::None => Ok(data.to_vec()),
            Self::Gzip => {
                let mut encoder = flate2::write::DeflateEncoder::new(
                    Vec::with_capacity(data.len() / 2),
                    compression_level_to_flate2(level),
                );
                encoder.write_all(data)?;
                encoder.finish()
            }
            Self::Bzip2 => compress_bzip2(data, level),
        }
    }

    /// Decompresses a stored file's content.
    ///
    /// `size_hint` is the expected uncompressed size.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is corrupt or the codec is not
    /// compiled in.
    pub fn decompress(self, data: &[u8], size_hint: usize) -> io::Result<Vec<u8>> {
        match self {
            Self::None => Ok(data.to_vec()),
            Self::Gzip => {
                let mut out = Vec::with_capacity(size_hint);
                flate2::read::DeflateDecoder::new(data).read_to_end(&mut out)?;
                Ok(out)
            }
            Self::Bzip2 => decompress_bzip2(data, size_hint),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Converts user compression level (1-9) to flate2 compression level.
///
/// # Examples
///
/// ```
/// use paerius_core::compression::compression_level_to_flate2;
///
/// assert_eq!(compression_level_to_flate2(None), flate2::Compression::default());
/// assert_eq!(compression_level_to_flate2(Some(9)), flate2::Compression::best());
/// ```
#[must_use]
pub fn compression_level_to_flate2(level: Option<u8>) -> flate2::Compression {
    match level {
        None | Some(6) => flate2::Compression::default(),
        Some(1..=3) => flate2::Compression::fast(),
        Some(7..=9) => flate2::Compression::best(),
        Some(n) => flate2::Compression::new(u32::from(n)),
    }
}

/// Converts user compression level (1-9) to bzip2 compression level.
#[cfg(feature = "bzip2")]
#[must_use]
pub fn compression_level_to_bzip2(level: Option<u8>) -> bzip2::Compression {
    match level {
        None | Some(6) => bzip2::Compression::default(),
        Some(1) => bzip2::Compression::fast(),
        Some(7..=9) => bzip2::Compression::best(),
        Some(n) => bzip2::Compression::new(u32::from(n.clamp(1, 9))),
    }
}

#[cfg(feature = "bzip2")]
fn compress_bzip2(data: &[u8], level: Option<u8>) -> io::Result<Vec<u8>> {
    let mut encoder = bzip2::write::BzEncoder::new(
        Vec::with_capacity(data.len() / 2),
        compression_level_to_bzip2(level),
    );
    encoder.write_all(data)?;
    encoder.finish()
}

#[cfg(not(feature = "bzip2"))]
fn compress_bzip2(_data: &[u8], _level: Option<u8>) -> io::Result<Vec<u8>> {
    Err(bzip2_unavailable())
}

#[cfg(feature = "bzip2")]
fn decompress_bzip2(data: &[u8], size_hint: usize) -> io::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(size_hint);
    bzip2::read::BzDecoder::new(data).read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(not(feature = "bzip2"))]
fn decompress_bzip2(_data: &[u8], _size_hint: usize) -> io::Result<Vec<u8>> {
    Err(bzip2_unavailable())
}

#[cfg(not(feature = "bzip2"))]
fn bzip2_unavailable() -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        "bzip2 support is not compiled in",
    )
}
