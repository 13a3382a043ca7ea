//! Hash-mediated join.
//!
//! Both sides are reduced to `hex(H(seed + composite_key))`, each key cell
//! normalized by the function's TRIM mode first, and rows match when their
//! digests are equal. The projected values are the plaintext lookup values.

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512, Sha512_224, Sha512_256};
use std::fmt;
use std::str::FromStr;

use super::{composite_key, project};
use crate::cache::LookupIndex;
use crate::error::AlgorithmError;
use crate::models::{OutputTable, Row, Table};
use crate::transform::dsl::{HashLookupSpec, TrimMode};

/// Digest algorithms accepted by `ALGO=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha512_224,
    Sha512_256,
}

impl DigestAlgorithm {
    pub const ALL: [DigestAlgorithm; 8] = [
        DigestAlgorithm::Md5,
        DigestAlgorithm::Sha1,
        DigestAlgorithm::Sha224,
        DigestAlgorithm::Sha256,
        DigestAlgorithm::Sha384,
        DigestAlgorithm::Sha512,
        DigestAlgorithm::Sha512_224,
        DigestAlgorithm::Sha512_256,
    ];

    /// Canonical name, e.g. `SHA-256`.
    pub fn name(&self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "MD5",
            DigestAlgorithm::Sha1 => "SHA-1",
            DigestAlgorithm::Sha224 => "SHA-224",
            DigestAlgorithm::Sha256 => "SHA-256",
            DigestAlgorithm::Sha384 => "SHA-384",
            DigestAlgorithm::Sha512 => "SHA-512",
            DigestAlgorithm::Sha512_224 => "SHA-512/224",
            DigestAlgorithm::Sha512_256 => "SHA-512/256",
        }
    }

    /// Lowercase hex digest of `text`.
    pub fn digest_hex(&self, text: &str) -> String {
        let bytes = text.as_bytes();
        match self {
            DigestAlgorithm::Md5 => hex::encode(Md5::digest(bytes)),
            DigestAlgorithm::Sha1 => hex::encode(Sha1::digest(bytes)),
            DigestAlgorithm::Sha224 => hex::encode(Sha224::digest(bytes)),
            DigestAlgorithm::Sha256 => hex::encode(Sha256::digest(bytes)),
            DigestAlgorithm::Sha384 => hex::encode(Sha384::digest(bytes)),
            DigestAlgorithm::Sha512 => hex::encode(Sha512::digest(bytes)),
            DigestAlgorithm::Sha512_224 => hex::encode(Sha512_224::digest(bytes)),
            DigestAlgorithm::Sha512_256 => hex::encode(Sha512_256::digest(bytes)),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = AlgorithmError;

    /// Case-insensitive; the dash is optional (`sha1`, `SHA-512/256`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase().replace('-', "");
        Self::ALL
            .into_iter()
            .find(|a| a.name().replace('-', "") == wanted)
            .ok_or_else(|| AlgorithmError(s.trim().to_string()))
    }
}

/// A hash join ready to run: algorithm resolved, seed and TRIM mode fixed.
#[derive(Debug, Clone)]
pub struct HashJoin<'a> {
    spec: &'a HashLookupSpec,
    algorithm: DigestAlgorithm,
}

impl<'a> HashJoin<'a> {
    /// Resolve the function's algorithm; fails before any row is touched.
    pub fn new(spec: &'a HashLookupSpec) -> Result<Self, AlgorithmError> {
        Ok(Self {
            spec,
            algorithm: spec.algorithm.parse()?,
        })
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    fn trim(&self) -> TrimMode {
        self.spec.trim_characters
    }

    /// Digest of one row's key, seed first.
    pub fn digest_key(&self, row: &Row, columns: &[Option<String>]) -> String {
        let mut text = self.spec.seed.clone().unwrap_or_default();
        text.push_str(&composite_key(row, columns, self.trim()));
        self.algorithm.digest_hex(&text)
    }

    /// Join `source` against `lookup`.
    ///
    /// With `CACHE` the lookup rows are indexed by their normalized key, which
    /// resolves to the same row as comparing digests; without it every lookup
    /// row is digested again for each source row.
    pub fn run(&self, source: &Table, lookup: &Table) -> OutputTable {
        let source_keys = source.resolve_columns(&self.spec.source_search_columns);
        let lookup_keys = lookup.resolve_columns(&self.spec.lookup_search_columns);
        let values = lookup.resolve_columns(&self.spec.lookup_value_columns);

        let index = self.spec.cache_enabled.then(|| {
            LookupIndex::build(
                lookup
                    .rows
                    .iter()
                    .map(|row| composite_key(row, &lookup_keys, self.trim())),
            )
        });

        project(
            source,
            lookup,
            &source_keys,
            &values,
            self.spec.output_columns(),
            |row| match &index {
                Some(index) => index.get(&composite_key(row, &source_keys, self.trim())),
                None => {
                    let digest = self.digest_key(row, &source_keys);
                    lookup
                        .rows
                        .iter()
                        .position(|candidate| self.digest_key(candidate, &lookup_keys) == digest)
                }
            },
        )
    }
}
