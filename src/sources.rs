//! Source package stanzas, as found in `Sources` indices.
//!
//! The `dists/$DIST/$COMP/source/Sources` indices consist of one stanza
//! per source package, in the `.dsc` format with a mandatory `Directory`
//! field and optional `Priority`/`Section`.

use crate::control::Paragraph;
use crate::fields::{format_file_list, parse_file_list, FileEntry};
use crate::stream::FromParagraph;
use crate::{ArchiveError, Result};
use debversion::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A source package entry in a `Sources` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Source package name.
    pub package: String,
    /// Directory holding the source files, relative to the archive root.
    pub directory: String,
    /// Package priority.
    pub priority: Option<String>,
    /// Package section.
    pub section: Option<String>,
    /// Source format (e.g. `3.0 (quilt)`).
    pub format: Option<String>,
    /// Binary package names produced by this source.
    pub binaries: Vec<String>,
    /// Architectures the source builds for.
    pub architectures: Vec<String>,
    /// Package version.
    pub version: Option<Version>,
    /// Origin.
    pub origin: Option<String>,
    /// Maintainer.
    pub maintainer: Option<String>,
    /// Uploaders.
    pub uploaders: Option<String>,
    /// Package homepage.
    pub homepage: Option<String>,
    /// Standards version.
    pub standards_version: Option<String>,
    /// Raw `Package-List` lines.
    pub package_list: Vec<String>,
    /// Per-file SHA1 checksums.
    pub checksums_sha1: Vec<FileEntry>,
    /// Per-file SHA256 checksums.
    pub checksums_sha256: Vec<FileEntry>,
    /// Per-file MD5 checksums (the legacy unlabeled `Files` field).
    ///
    /// The three checksum lists are assumed to describe the same set of
    /// relative paths at different digest strengths; the decoder does not
    /// enforce this.
    pub files: Vec<FileEntry>,
    /// Fields not covered by the standard set, in stanza order.
    pub extra: Paragraph,
}

impl Source {
    /// Create a new source package with the mandatory fields.
    pub fn new<S: Into<String>>(package: S, directory: S) -> Self {
        Self {
            package: package.into(),
            directory: directory.into(),
            priority: None,
            section: None,
            format: None,
            binaries: Vec::new(),
            architectures: Vec::new(),
            version: None,
            origin: None,
            maintainer: None,
            uploaders: None,
            homepage: None,
            standards_version: None,
            package_list: Vec::new(),
            checksums_sha1: Vec::new(),
            checksums_sha256: Vec::new(),
            files: Vec::new(),
            extra: Paragraph::new(),
        }
    }

    /// The raw `Build-Depends` expression, if the stanza carried one.
    ///
    /// Dependency expressions are opaque at this layer.
    pub fn build_depends(&self) -> Option<&str> {
        self.extra.get("Build-Depends")
    }

    /// Convert the source package to a control stanza.
    pub fn to_paragraph(&self) -> String {
        let mut paragraph = String::new();

        paragraph.push_str(&format!("Package: {}\n", self.package));
        if let Some(ref format) = self.format {
            paragraph.push_str(&format!("Format: {}\n", format));
        }
        if !self.binaries.is_empty() {
            paragraph.push_str(&format!("Binary: {}\n", self.binaries.join(", ")));
        }
        if !self.architectures.is_empty() {
            paragraph.push_str(&format!("Architecture: {}\n", self.architectures.join(" ")));
        }
        if let Some(ref version) = self.version {
            paragraph.push_str(&format!("Version: {}\n", version));
        }
        if let Some(ref origin) = self.origin {
            paragraph.push_str(&format!("Origin: {}\n", origin));
        }
        if let Some(ref maintainer) = self.maintainer {
            paragraph.push_str(&format!("Maintainer: {}\n", maintainer));
        }
        if let Some(ref uploaders) = self.uploaders {
            paragraph.push_str(&format!("Uploaders: {}\n", uploaders));
        }
        if let Some(ref homepage) = self.homepage {
            paragraph.push_str(&format!("Homepage: {}\n", homepage));
        }
        if let Some(ref standards_version) = self.standards_version {
            paragraph.push_str(&format!("Standards-Version: {}\n", standards_version));
        }
        if let Some(ref priority) = self.priority {
            paragraph.push_str(&format!("Priority: {}\n", priority));
        }
        if let Some(ref section) = self.section {
            paragraph.push_str(&format!("Section: {}\n", section));
        }
        paragraph.push_str(&format!("Directory: {}\n", self.directory));

        if !self.package_list.is_empty() {
            paragraph.push_str("Package-List:");
            for line in &self.package_list {
                paragraph.push_str(&format!("\n {}", line));
            }
            paragraph.push('\n');
        }
        if !self.checksums_sha1.is_empty() {
            paragraph.push_str(&format!(
                "Checksums-Sha1:{}\n",
                format_file_list(&self.checksums_sha1)
            ));
        }
        if !self.checksums_sha256.is_empty() {
            paragraph.push_str(&format!(
                "Checksums-Sha256:{}\n",
                format_file_list(&self.checksums_sha256)
            ));
        }
        if !self.files.is_empty() {
            paragraph.push_str(&format!("Files:{}\n", format_file_list(&self.files)));
        }

        for (key, value) in self.extra.iter() {
            paragraph.push_str(&format!("{}: {}\n", key, value));
        }

        paragraph
    }
}

impl FromParagraph for Source {
    fn from_paragraph(mut paragraph: Paragraph) -> Result<Self> {
        let package = paragraph
            .remove("Package")
            .ok_or_else(|| ArchiveError::missing_field("Package"))?;
        let directory = paragraph
            .remove("Directory")
            .ok_or_else(|| ArchiveError::missing_field("Directory"))?;

        let binaries = paragraph
            .remove("Binary")
            .map(|s| {
                s.split(',')
                    .map(|b| b.trim().to_string())
                    .filter(|b| !b.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        let architectures = paragraph
            .remove("Architecture")
            .map(|s| s.split_whitespace().map(|a| a.to_string()).collect())
            .unwrap_or_default();
        let version = paragraph
            .remove("Version")
            .map(|s| {
                s.parse::<Version>()
                    .map_err(|e| ArchiveError::InvalidVersion(format!("{}", e)))
            })
            .transpose()?;
        let package_list = paragraph
            .remove("Package-List")
            .map(|s| {
                s.lines()
                    .map(|l| l.trim_matches([' ', '\t', '\r', '\n']).to_string())
                    .filter(|l| !l.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let checksums_sha1 =
            parse_file_list(&paragraph.remove("Checksums-Sha1").unwrap_or_default())?;
        let checksums_sha256 =
            parse_file_list(&paragraph.remove("Checksums-Sha256").unwrap_or_default())?;
        let files = parse_file_list(&paragraph.remove("Files").unwrap_or_default())?;

        Ok(Self {
            package,
            directory,
            priority: paragraph.remove("Priority"),
            section: paragraph.remove("Section"),
            format: paragraph.remove("Format"),
            binaries,
            architectures,
            version,
            origin: paragraph.remove("Origin"),
            maintainer: paragraph.remove("Maintainer"),
            uploaders: paragraph.remove("Uploaders"),
            homepage: paragraph.remove("Homepage"),
            standards_version: paragraph.remove("Standards-Version"),
            package_list,
            checksums_sha1,
            checksums_sha256,
            files,
            extra: paragraph,
        })
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_paragraph())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_creation() {
        let source = Source::new("hello", "pool/main/h/hello");
        assert_eq!(source.package, "hello");
        assert_eq!(source.directory, "pool/main/h/hello");
        assert!(source.files.is_empty());
    }

    #[test]
    fn test_source_missing_directory() {
        let paragraph = Paragraph::parse("Package: hello\nVersion: 1.0\n").unwrap();
        assert!(matches!(
            Source::from_paragraph(paragraph),
            Err(ArchiveError::MissingField(field)) if field == "Directory"
        ));
    }

    #[test]
    fn test_source_paragraph_roundtrip() {
        let mut source = Source::new("hello", "pool/main/h/hello");
        source.format = Some("3.0 (quilt)".to_string());
        source.binaries = vec!["hello".to_string(), "hello-doc".to_string()];
        source.architectures = vec!["any".to_string(), "all".to_string()];
        source.version = Some("2.10-2".parse().unwrap());
        source.maintainer = Some("Test Maintainer <test@example.com>".to_string());
        source.standards_version = Some("4.5.0".to_string());
        source.package_list = vec!["hello deb devel optional arch=any".to_string()];
        source
            .files
            .push(FileEntry::new("abc123", 1024, "hello_2.10-2.dsc"));
        source
            .checksums_sha256
            .push(FileEntry::new("def456", 1024, "hello_2.10-2.dsc"));

        let text = source.to_paragraph();
        let parsed = Source::from_paragraph(Paragraph::parse(&text).unwrap()).unwrap();
        assert_eq!(parsed, source);
    }

    #[test]
    fn test_source_binary_comma_split() {
        let paragraph = Paragraph::parse(
            "Package: hello\nDirectory: pool/main/h/hello\nBinary: hello, hello-doc,libhello0\n",
        )
        .unwrap();
        let source = Source::from_paragraph(paragraph).unwrap();
        assert_eq!(source.binaries, vec!["hello", "hello-doc", "libhello0"]);
    }

    #[test]
    fn test_source_build_depends_accessor() {
        let paragraph = Paragraph::parse(
            "Package: hello\nDirectory: pool/main/h/hello\nBuild-Depends: debhelper (>= 10)\n",
        )
        .unwrap();
        let source = Source::from_paragraph(paragraph).unwrap();
        assert_eq!(source.build_depends(), Some("debhelper (>= 10)"));
    }

    #[test]
    fn test_source_bad_checksum_line_is_fatal() {
        let paragraph = Paragraph::parse(
            "Package: hello\nDirectory: pool/main/h/hello\nFiles:\n abc 10 hello.dsc\n garbage\n",
        )
        .unwrap();
        assert!(Source::from_paragraph(paragraph).is_err());
    }
}
