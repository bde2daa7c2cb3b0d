//! Archive metadata in PHP `serialize()` form.
//!
//! Only arrays of string keys to string values are produced or accepted,
//! which is all the archive-level metadata ever holds.

use crate::PackError;
use crate::Result;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Serializes a string map as a PHP array.
///
/// Lengths are byte counts, as PHP expects.
///
/// # Examples
///
/// ```
/// use paerius_core::phar::metadata::serialize;
/// use std::collections::BTreeMap;
///
/// let map = BTreeMap::from([("datetime".to_string(), "now".to_string())]);
/// assert_eq!(serialize(&map), r#"a:1:{s:8:"datetime";s:3:"now";}"#);
/// ```
#[must_use]
pub fn serialize(map: &BTreeMap<String, String>) -> String {
    let mut out = format!("a:{}:{{", map.len());
    for (key, value) in map {
        write_string(&mut out, key);
        write_string(&mut out, value);
    }
    out.push('}');
    out
}

fn write_string(out: &mut String, s: &str) {
    // Writing to a String cannot fail.
    let _ = write!(out, "s:{}:\"{}\";", s.len(), s);
}

/// Parses a PHP-serialized array of strings.
///
/// An empty input yields an empty map.
///
/// # Errors
///
/// Returns [`PackError::InvalidArchive`] if the input is not a serialized
/// array of string pairs.
pub fn unserialize(bytes: &[u8]) -> Result<BTreeMap<String, String>> {
    if bytes.is_empty() {
        return Ok(BTreeMap::new());
    }

    let mut parser = Parser { bytes, pos: 0 };
    parser.expect(b"a:")?;
    let count = parser.number(b':')?;
    parser.expect(b"{")?;

    let mut map = BTreeMap::new();
    for _ in 0..count {
        let key = parser.string()?;
        let value = parser.string()?;
        map.insert(key, value);
    }
    parser.expect(b"}")?;

    if parser.pos != bytes.len() {
        return Err(malformed("trailing bytes"));
    }
    Ok(map)
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn expect(&mut self, token: &[u8]) -> Result<()> {
        if self.bytes[self.pos..].starts_with(token) {
            self.pos += token.len();
            Ok(())
        } else {
            Err(malformed(&format!(
                "expected `{}` at offset {}",
                String::from_utf8_lossy(token),
                self.pos
            )))
        }
    }

    fn number(&mut self, terminator: u8) -> Result<usize> {
        let rest = &self.bytes[self.pos..];
        let end = rest
            .iter()
            .position(|&b| b == terminator)
            .ok_or_else(|| malformed("unterminated length"))?;
        let value = std::str::from_utf8(&rest[..end])
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| malformed("invalid length"))?;
        self.pos += end + 1;
        Ok(value)
    }

    fn string(&mut self) -> Result<String> {
        self.expect(b"s:")?;
        let len = self.number(b':')?;
        self.expect(b"\"")?;
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| malformed("string runs past end"))?;
        let value = std::str::from_utf8(&self.bytes[self.pos..end])
            .map_err(|_| malformed("string is not UTF-8"))?
            .to_string();
        self.pos = end;
        self.expect(b"\";")?;
        Ok(value)
    }
}

fn malformed(detail: &str) -> PackError {
    PackError::InvalidArchive(format!("malformed metadata: {detail}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_datetime() {
        let map = BTreeMap::from([(
            "datetime".to_string(),
            "2026-10-19T08:30:00+00:00".to_string(),
        )]);
        assert_eq!(
            serialize(&map),
            r#"a:1:{s:8:"datetime";s:25:"2026-10-19T08:30:00+00:00";}"#
        );
    }

    #[test]
    fn test_serialize_counts_bytes() {
        let map = BTreeMap::from([("k".to_string(), "é".to_string())]);
        assert_eq!(serialize(&map), r#"a:1:{s:1:"k";s:2:"é";}"#);
    }

    #[test]
    fn test_unserialize_reads_serialized() {
        let parsed =
            unserialize(br#"a:2:{s:1:"a";s:3:"x;y";s:8:"datetime";s:4:"when";}"#).unwrap();
        assert_eq!(parsed.get("a").map(String::as_str), Some("x;y"));
        assert_eq!(parsed.get("datetime").map(String::as_str), Some("when"));
    }

    #[test]
    fn test_unserialize_empty() {
        assert!(unserialize(b"").unwrap().is_empty());
        assert!(unserialize(b"a:0:{}").unwrap().is_empty());
    }

    #[test]
    fn test_unserialize_rejects_garbage() {
        for input in [
            &b"i:5;"[..],
            b"a:1:{s:99:\"short\";s:1:\"x\";}",
            b"a:1:{s:1:\"k\";s:1:\"v\";",
            b"a:x:{}",
            b"a:0:{}extra",
        ] {
            assert!(
                matches!(unserialize(input), Err(PackError::InvalidArchive(_))),
                "{}",
                String::from_utf8_lossy(input)
            );
        }
    }
}
