//! Constants of the Phar container layout.
//!
//! All integers in the manifest and signature trailer are little-endian.

/// Terminator the Phar runtime looks for at the end of the stub.
pub const HALT_COMPILER: &[u8] = b"__HALT_COMPILER(); ?>\r\n";

/// Manifest API version 1.1.0 without directory entries.
pub const API_VERSION: [u8; 2] = [0x11, 0x00];

/// Global flag: the archive carries a signature trailer.
pub const FLAG_SIGNED: u32 = 0x0001_0000;

/// Flag: file data is a raw deflate stream.
pub const FLAG_GZ: u32 = 0x0000_1000;

/// Flag: file data is a bzip2 stream.
pub const FLAG_BZ2: u32 = 0x0000_2000;

/// Mask of per-file permission bits.
pub const PERMISSION_MASK: u32 = 0o777;

/// Signature algorithm identifier for SHA-256.
pub const SIGNATURE_SHA256: u32 = 0x0003;

/// Length of a SHA-256 digest.
pub const SHA256_LEN: usize = 32;

/// Magic closing every signed archive.
pub const SIGNATURE_MAGIC: &[u8; 4] = b"GBMB";

/// Size of the signature trailer after the digest: algorithm id and magic.
pub const TRAILER_LEN: usize = 8;

/// Fixed bytes of a manifest header after the length field, excluding the
/// alias and metadata payloads.
pub const MANIFEST_HEADER_LEN: usize = 4 + 2 + 4 + 4 + 4;

/// Fixed bytes of a file record, excluding the name.
pub const FILE_RECORD_LEN: usize = 4 + 4 + 4 + 4 + 4 + 4 + 4;

/// Metadata key holding the build timestamp.
pub const DATETIME_KEY: &str = "datetime";
