//! Bootstrap stub generation.

use crate::phar::format::HALT_COMPILER;

/// Builds the stub that maps the archive under `alias` and hands control to
/// the bundled autoloader.
///
/// # Examples
///
/// ```
/// use paerius_core::phar::stub_for;
///
/// let stub = stub_for("vendor.phar");
/// let text = String::from_utf8(stub).unwrap();
/// assert!(text.contains("phar://vendor.phar/autoload.php"));
/// assert!(text.ends_with("__HALT_COMPILER(); ?>\r\n"));
/// ```
#[must_use]
pub fn stub_for(alias: &str) -> Vec<u8> {
    let mut stub = format!(
        "<?php\n\\Phar::mapPhar();\nreturn require 'phar://{}/autoload.php';\n",
        escape_single_quoted(alias)
    )
    .into_bytes();
    stub.extend_from_slice(HALT_COMPILER);
    stub
}

fn escape_single_quoted(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}
