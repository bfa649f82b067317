//! Multi-algorithm hashing for archive index streams.
//!
//! Index files are checksummed with several digest families at once; the
//! [`HashingWriter`] computes all of them in a single pass while the file
//! is being written, so materializing an index yields its checksums for
//! free.

use crate::{ArchiveError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::io::Write;

/// Digest families the archive defaults to when producing hashed output.
pub const DEFAULT_HASHES: &[HashAlgorithm] = &[HashAlgorithm::Sha256, HashAlgorithm::Sha512];

/// Supported hash algorithms for archive index files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    /// MD5 hash algorithm (legacy `Files` field).
    Md5,
    /// SHA-1 hash algorithm.
    Sha1,
    /// SHA-256 hash algorithm.
    Sha256,
    /// SHA-512 hash algorithm.
    Sha512,
}

impl HashAlgorithm {
    /// Get the label used in Release files.
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "MD5Sum",
            HashAlgorithm::Sha1 => "SHA1",
            HashAlgorithm::Sha256 => "SHA256",
            HashAlgorithm::Sha512 => "SHA512",
        }
    }

    /// Get the lowercase configuration name.
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    /// Look up an algorithm by its configuration name.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha512" => Ok(HashAlgorithm::Sha512),
            _ => Err(ArchiveError::UnsupportedAlgorithm(name.to_string())),
        }
    }

    /// Get all supported hash algorithms.
    pub fn all() -> &'static [HashAlgorithm] {
        &[
            HashAlgorithm::Md5,
            HashAlgorithm::Sha1,
            HashAlgorithm::Sha256,
            HashAlgorithm::Sha512,
        ]
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Finalized digests keyed by algorithm, as lowercase hex.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestSet {
    digests: HashMap<HashAlgorithm, String>,
}

impl DigestSet {
    /// Create an empty digest set.
    pub fn new() -> Self {
        Self {
            digests: HashMap::new(),
        }
    }

    /// Add a digest to the set.
    pub fn insert(&mut self, algorithm: HashAlgorithm, digest: String) {
        self.digests.insert(algorithm, digest);
    }

    /// Get a digest by algorithm.
    pub fn get(&self, algorithm: &HashAlgorithm) -> Option<&str> {
        self.digests.get(algorithm).map(|s| s.as_str())
    }

    /// Iterate over all digests.
    pub fn iter(&self) -> impl Iterator<Item = (&HashAlgorithm, &str)> {
        self.digests.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// The number of digests in the set.
    pub fn len(&self) -> usize {
        self.digests.len()
    }

    /// Whether the set holds no digests.
    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }
}

/// A single-pass accumulator over a configurable set of digest algorithms.
pub struct MultiHasher {
    md5: Option<md5::Context>,
    sha1: Option<sha1::Sha1>,
    sha256: Option<sha2::Sha256>,
    sha512: Option<sha2::Sha512>,
    size: u64,
}

impl MultiHasher {
    /// Create a new multi-hasher with the specified algorithms.
    pub fn new(algorithms: &[HashAlgorithm]) -> Self {
        use sha2::Digest as _;

        let mut hasher = Self {
            md5: None,
            sha1: None,
            sha256: None,
            sha512: None,
            size: 0,
        };

        for &algorithm in algorithms {
            match algorithm {
                HashAlgorithm::Md5 => hasher.md5 = Some(md5::Context::new()),
                HashAlgorithm::Sha1 => hasher.sha1 = Some(sha1::Sha1::new()),
                HashAlgorithm::Sha256 => hasher.sha256 = Some(sha2::Sha256::new()),
                HashAlgorithm::Sha512 => hasher.sha512 = Some(sha2::Sha512::new()),
            }
        }

        hasher
    }

    /// Feed data to every configured accumulator.
    pub fn update(&mut self, data: &[u8]) {
        use sha2::Digest as _;

        self.size += data.len() as u64;

        if let Some(ref mut hasher) = self.md5 {
            hasher.consume(data);
        }
        if let Some(ref mut hasher) = self.sha1 {
            hasher.update(data);
        }
        if let Some(ref mut hasher) = self.sha256 {
            hasher.update(data);
        }
        if let Some(ref mut hasher) = self.sha512 {
            hasher.update(data);
        }
    }

    /// Finalize the accumulators, yielding the byte count and digests.
    pub fn finalize(self) -> (u64, DigestSet) {
        use sha2::Digest as _;

        let mut digests = DigestSet::new();

        if let Some(hasher) = self.md5 {
            digests.insert(HashAlgorithm::Md5, format!("{:x}", hasher.compute()));
        }
        if let Some(hasher) = self.sha1 {
            digests.insert(HashAlgorithm::Sha1, hex::encode(hasher.finalize()));
        }
        if let Some(hasher) = self.sha256 {
            digests.insert(HashAlgorithm::Sha256, hex::encode(hasher.finalize()));
        }
        if let Some(hasher) = self.sha512 {
            digests.insert(HashAlgorithm::Sha512, hex::encode(hasher.finalize()));
        }

        (self.size, digests)
    }

    /// The number of bytes consumed so far.
    pub fn size(&self) -> u64 {
        self.size
    }
}

impl fmt::Debug for MultiHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiHasher")
            .field("size", &self.size)
            .finish()
    }
}

impl Write for MultiHasher {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// A writer that forwards every byte to an underlying sink while feeding
/// a set of digest accumulators in the same pass.
///
/// Nothing is buffered or re-read: the digests reflect exactly the bytes
/// that reached the sink when [`HashingWriter::finish`] is called.
#[derive(Debug)]
pub struct HashingWriter<W> {
    sink: W,
    hasher: MultiHasher,
}

impl<W: Write> HashingWriter<W> {
    /// Create a hashing writer over `sink` for the given algorithms.
    pub fn new(algorithms: &[HashAlgorithm], sink: W) -> Self {
        Self {
            sink,
            hasher: MultiHasher::new(algorithms),
        }
    }

    /// Create a hashing writer from configuration names.
    ///
    /// Every name is validated against the supported set before any byte
    /// is written; an unknown name fails the construction outright.
    pub fn from_names<S: AsRef<str>>(names: &[S], sink: W) -> Result<Self> {
        let algorithms = names
            .iter()
            .map(|name| HashAlgorithm::from_name(name.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(&algorithms, sink))
    }

    /// Flush the sink and finalize, returning it with the byte count and
    /// the digests of everything written.
    pub fn finish(mut self) -> Result<(W, u64, DigestSet)> {
        self.sink.flush()?;
        let (size, digests) = self.hasher.finalize();
        Ok((self.sink, size, digests))
    }

    /// Access the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.sink
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.sink.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.sink.flush()
    }
}

/// Hash a byte slice with the specified algorithms.
pub fn hash_data(data: &[u8], algorithms: &[HashAlgorithm]) -> (u64, DigestSet) {
    let mut hasher = MultiHasher::new(algorithms);
    hasher.update(data);
    hasher.finalize()
}
