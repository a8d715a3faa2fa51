//! Streaming digest computation.
//!
//! Input is read through a fixed 64 KiB buffer, so arbitrarily large files
//! are hashed without being held in memory. Output is lowercase hex.

use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::Path;

use md5::Md5;
use sha2::{Digest, Sha256, Sha384, Sha512};

use checksum_core::Algorithm;

use crate::error::{io_err, SyncError};

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Digest everything `reader` yields with `algorithm`.
///
/// Fails with the underlying I/O error if the stream cannot be read to the end.
pub fn digest_reader<R: Read>(reader: R, algorithm: Algorithm) -> io::Result<String> {
    match algorithm {
        Algorithm::Md5 => stream::<Md5, R>(reader),
        Algorithm::Sha256 => stream::<Sha256, R>(reader),
        Algorithm::Sha384 => stream::<Sha384, R>(reader),
        Algorithm::Sha512 => stream::<Sha512, R>(reader),
    }
}

/// Digest the file at `path`.
///
/// Opening failures are reported as [`SyncError::Io`]; failures while reading
/// as [`SyncError::Hash`].
pub fn digest_file(path: &Path, algorithm: Algorithm) -> Result<String, SyncError> {
    let file = File::open(path).map_err(|e| io_err(path, e))?;
    digest_reader(file, algorithm).map_err(|source| SyncError::Hash {
        path: path.to_path_buf(),
        source,
    })
}

fn stream<D: Digest, R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = D::new();
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buf[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(hex::encode(hasher.finalize()))
}
