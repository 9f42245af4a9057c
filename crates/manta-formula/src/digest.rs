//! SHA-256 digests of release artifacts.
//!
//! Homebrew verifies the downloaded archive against the formula's `sha256`,
//! so the digest is lowercase hex over the exact archive bytes.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::types::FormulaError;

/// Computes the SHA-256 hex digest of everything `reader` yields.
pub fn sha256_reader<R: Read>(mut reader: R) -> Result<String, FormulaError> {
    let mut h = Sha256::new();
    io::copy(&mut reader, &mut h)?;
    Ok(format!("{:x}", h.finalize()))
}

/// Computes the SHA-256 hex digest of a file, streaming its contents.
pub fn sha256_file(path: &Path) -> Result<String, FormulaError> {
    let file = File::open(path)?;
    sha256_reader(BufReader::new(file))
}
