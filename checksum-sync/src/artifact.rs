//! Artifact naming and content formatting.
//!
//! For an input with base name `N` and algorithm `A` the artifact lives at
//! `<output_dir>/N.<ext(A)>`. Inputs from different directories that share a
//! base name map to the same artifact; the later write wins.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use checksum_core::Algorithm;

/// Base name of `input`, lossily converted for use inside artifact content.
pub fn base_name(input: &Path) -> String {
    input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.to_string_lossy().into_owned())
}

/// `<output_dir>/<base name of input>.<ext>`
pub fn artifact_path(output_dir: &Path, input: &Path, algorithm: Algorithm) -> PathBuf {
    let mut name: OsString = input
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| input.as_os_str().to_os_string());
    name.push(".");
    name.push(algorithm.extension());
    output_dir.join(name)
}

/// Bytes written to the artifact: the bare digest, or `"<digest>  <name>"`.
///
/// No trailing newline; `sha256sum -c` and friends accept an unterminated
/// last line.
pub fn artifact_content(digest: &str, input: &Path, append_name: bool) -> Vec<u8> {
    if append_name {
        format!("{digest}  {}", base_name(input)).into_bytes()
    } else {
        digest.as_bytes().to_vec()
    }
}

/// The algorithm whose extension `file_name` ends with, if any.
pub fn managed_algorithm(file_name: &str) -> Option<Algorithm> {
    let (_, ext) = file_name.rsplit_once('.')?;
    Algorithm::from_extension(ext)
}

/// True when `path`'s file name ends in one of the managed extensions.
pub fn is_managed(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(managed_algorithm)
        .is_some()
}
