//! Compound field codecs shared by the index record types.
//!
//! Covers the two small grammars embedded inside stanza fields: the
//! versioned source reference (`name` or `name (version)`) and the
//! multi-line per-file checksum lists (`<digest> <size> <path>` per line).

use crate::{ArchiveError, Result};
use debversion::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A package name with an optional version constraint, as found in the
/// `Source` field of a binary package stanza.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Source package name.
    pub name: String,
    /// Version, when the reference carries one.
    pub version: Option<Version>,
}

impl SourceRef {
    /// Create a reference without a version constraint.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    /// Create a reference with an explicit version.
    pub fn versioned<S: Into<String>>(name: S, version: Version) -> Self {
        Self {
            name: name.into(),
            version: Some(version),
        }
    }
}

impl FromStr for SourceRef {
    type Err = ArchiveError;

    fn from_str(text: &str) -> Result<Self> {
        let hunks: Vec<&str> = text.split(' ').collect();
        match hunks.as_slice() {
            [name] if !name.is_empty() => Ok(SourceRef::new(*name)),
            [name, versioned] => {
                if name.is_empty() {
                    return Err(ArchiveError::malformed_field(text));
                }
                let inner = versioned
                    .strip_prefix('(')
                    .and_then(|v| v.strip_suffix(')'))
                    .ok_or_else(|| ArchiveError::malformed_field(text))?;
                let version: Version = inner
                    .parse()
                    .map_err(|e| ArchiveError::InvalidVersion(format!("{}", e)))?;
                Ok(SourceRef::versioned(*name, version))
            }
            _ => Err(ArchiveError::malformed_field(text)),
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{} ({})", self.name, version),
            None => write!(f, "{}", self.name),
        }
    }
}

/// One line of a per-file checksum list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Hex digest of the file.
    pub digest: String,
    /// File size in bytes.
    pub size: u64,
    /// Path relative to the source package directory.
    pub path: String,
}

impl FileEntry {
    /// Create a new file entry.
    pub fn new<S: Into<String>>(digest: S, size: u64, path: S) -> Self {
        Self {
            digest: digest.into(),
            size,
            path: path.into(),
        }
    }

    /// Parse a file entry from a checksum line.
    ///
    /// The line must decompose into exactly three whitespace-separated
    /// fields; paths containing spaces are outside this field's grammar.
    pub fn from_checksum_line(line: &str) -> Result<Self> {
        let parts: Vec<&str> = line.trim().split_whitespace().collect();
        if parts.len() != 3 {
            return Err(ArchiveError::malformed_field(line));
        }

        let size = parts[1]
            .parse::<u64>()
            .map_err(|_| ArchiveError::invalid_field("size", parts[1]))?;

        Ok(Self {
            digest: parts[0].to_string(),
            size,
            path: parts[2].to_string(),
        })
    }

    /// Convert to the checksum line wire format.
    pub fn to_checksum_line(&self) -> String {
        format!(" {} {} {}", self.digest, self.size, self.path)
    }
}

/// Parse a multi-line checksum field into its file entries.
///
/// Lines are trimmed of surrounding whitespace/CR/LF and blank lines are
/// dropped; the first line that fails to decompose aborts the whole field.
pub fn parse_file_list(content: &str) -> Result<Vec<FileEntry>> {
    let mut entries = Vec::new();

    for line in content.lines() {
        let line = line.trim_matches([' ', '\t', '\r', '\n']);
        if line.is_empty() {
            continue;
        }
        entries.push(FileEntry::from_checksum_line(line)?);
    }

    Ok(entries)
}

/// Convert file entries back into a multi-line field value.
pub fn format_file_list(entries: &[FileEntry]) -> String {
    let mut result = String::new();
    for entry in entries {
        result.push('\n');
        result.push_str(&entry.to_checksum_line());
    }
    result
}
