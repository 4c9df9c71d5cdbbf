//! SHA-256 digests of local source artifacts.
//!
//! Produces the lowercase hex form a descriptor's `sha256` stanza expects, so
//! a placeholder checksum can be replaced with the real one.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::types::FormulaError;
use crate::validation::{ValidationError, check_checksum};

/// Read buffer size for streaming digests.
const CHUNK_SIZE: usize = 64 * 1024;

/// Digest of a file, streamed in fixed-size chunks.
pub fn sha256_file(path: &Path) -> Result<String, FormulaError> {
    let mut reader = BufReader::with_capacity(CHUNK_SIZE, File::open(path)?);
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Compare a file's digest against an expected descriptor checksum.
///
/// Returns the actual digest when it matches. A malformed `expected` value is
/// reported as [`ValidationError::InvalidChecksum`] before the file is read.
pub fn verify_file(path: &Path, expected: &str) -> Result<Verification, FormulaError> {
    if let Err(reason) = check_checksum(expected) {
        return Err(FormulaError::Invalid(vec![ValidationError::InvalidChecksum {
            value: expected.to_owned(),
            reason,
        }]));
    }
    let actual = sha256_file(path)?;
    Ok(if actual == expected {
        Verification::Match(actual)
    } else {
        Verification::Mismatch {
            expected: expected.to_owned(),
            actual,
        }
    })
}

/// Outcome of [`verify_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Match(String),
    Mismatch { expected: String, actual: String },
}
