//! Binary package stanzas, as found in `Packages` indices.

use crate::control::Paragraph;
use crate::fields::SourceRef;
use crate::stream::FromParagraph;
use crate::{ArchiveError, Result};
use debversion::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A binary package entry in a `Packages` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    /// Package name.
    pub package: String,
    /// Package version.
    pub version: Version,
    /// Architecture the package is built for.
    pub architecture: String,
    /// Source package this binary was built from, when it differs from
    /// the package name.
    pub source: Option<SourceRef>,
    /// Maintainer.
    pub maintainer: Option<String>,
    /// Installed size in kilobytes.
    pub installed_size: Option<u64>,
    /// Package dependencies (opaque dependency expression).
    pub depends: Option<String>,
    /// Package pre-dependencies.
    pub pre_depends: Option<String>,
    /// Package recommendations.
    pub recommends: Option<String>,
    /// Package suggestions.
    pub suggests: Option<String>,
    /// Package conflicts.
    pub conflicts: Option<String>,
    /// Package breaks.
    pub breaks: Option<String>,
    /// Package replaces.
    pub replaces: Option<String>,
    /// Package provides.
    pub provides: Option<String>,
    /// Package section.
    pub section: Option<String>,
    /// Package priority.
    pub priority: Option<String>,
    /// Package homepage.
    pub homepage: Option<String>,
    /// Package description, folded form.
    pub description: Option<String>,
    /// Path of the `.deb` relative to the archive root.
    pub filename: Option<String>,
    /// Size of the `.deb` in bytes.
    pub size: Option<u64>,
    /// MD5 digest of the `.deb`.
    pub md5sum: Option<String>,
    /// SHA1 digest of the `.deb`.
    pub sha1: Option<String>,
    /// SHA256 digest of the `.deb`.
    pub sha256: Option<String>,
    /// SHA512 digest of the `.deb`.
    pub sha512: Option<String>,
    /// Fields not covered by the standard set, in stanza order.
    pub extra: Paragraph,
}

impl Package {
    /// Create a new package with the mandatory fields.
    pub fn new<S: Into<String>>(package: S, version: Version, architecture: S) -> Self {
        Self {
            package: package.into(),
            version,
            architecture: architecture.into(),
            source: None,
            maintainer: None,
            installed_size: None,
            depends: None,
            pre_depends: None,
            recommends: None,
            suggests: None,
            conflicts: None,
            breaks: None,
            replaces: None,
            provides: None,
            section: None,
            priority: None,
            homepage: None,
            description: None,
            filename: None,
            size: None,
            md5sum: None,
            sha1: None,
            sha256: None,
            sha512: None,
            extra: Paragraph::new(),
        }
    }

    /// Convert the package to a control stanza.
    pub fn to_paragraph(&self) -> String {
        let mut paragraph = String::new();

        paragraph.push_str(&format!("Package: {}\n", self.package));
        if let Some(ref source) = self.source {
            paragraph.push_str(&format!("Source: {}\n", source));
        }
        paragraph.push_str(&format!("Version: {}\n", self.version));
        paragraph.push_str(&format!("Architecture: {}\n", self.architecture));

        if let Some(ref maintainer) = self.maintainer {
            paragraph.push_str(&format!("Maintainer: {}\n", maintainer));
        }
        if let Some(installed_size) = self.installed_size {
            paragraph.push_str(&format!("Installed-Size: {}\n", installed_size));
        }
        if let Some(ref depends) = self.depends {
            paragraph.push_str(&format!("Depends: {}\n", depends));
        }
        if let Some(ref pre_depends) = self.pre_depends {
            paragraph.push_str(&format!("Pre-Depends: {}\n", pre_depends));
        }
        if let Some(ref recommends) = self.recommends {
            paragraph.push_str(&format!("Recommends: {}\n", recommends));
        }
        if let Some(ref suggests) = self.suggests {
            paragraph.push_str(&format!("Suggests: {}\n", suggests));
        }
        if let Some(ref conflicts) = self.conflicts {
            paragraph.push_str(&format!("Conflicts: {}\n", conflicts));
        }
        if let Some(ref breaks) = self.breaks {
            paragraph.push_str(&format!("Breaks: {}\n", breaks));
        }
        if let Some(ref replaces) = self.replaces {
            paragraph.push_str(&format!("Replaces: {}\n", replaces));
        }
        if let Some(ref provides) = self.provides {
            paragraph.push_str(&format!("Provides: {}\n", provides));
        }
        if let Some(ref section) = self.section {
            paragraph.push_str(&format!("Section: {}\n", section));
        }
        if let Some(ref priority) = self.priority {
            paragraph.push_str(&format!("Priority: {}\n", priority));
        }
        if let Some(ref homepage) = self.homepage {
            paragraph.push_str(&format!("Homepage: {}\n", homepage));
        }
        if let Some(ref description) = self.description {
            paragraph.push_str(&format!("Description: {}\n", description));
        }
        if let Some(ref filename) = self.filename {
            paragraph.push_str(&format!("Filename: {}\n", filename));
        }
        if let Some(size) = self.size {
            paragraph.push_str(&format!("Size: {}\n", size));
        }
        if let Some(ref md5sum) = self.md5sum {
            paragraph.push_str(&format!("MD5sum: {}\n", md5sum));
        }
        if let Some(ref sha1) = self.sha1 {
            paragraph.push_str(&format!("SHA1: {}\n", sha1));
        }
        if let Some(ref sha256) = self.sha256 {
            paragraph.push_str(&format!("SHA256: {}\n", sha256));
        }
        if let Some(ref sha512) = self.sha512 {
            paragraph.push_str(&format!("SHA512: {}\n", sha512));
        }

        for (key, value) in self.extra.iter() {
            paragraph.push_str(&format!("{}: {}\n", key, value));
        }

        paragraph
    }
}

impl FromParagraph for Package {
    fn from_paragraph(mut paragraph: Paragraph) -> Result<Self> {
        let package = paragraph
            .remove("Package")
            .ok_or_else(|| ArchiveError::missing_field("Package"))?;
        let version_str = paragraph
            .remove("Version")
            .ok_or_else(|| ArchiveError::missing_field("Version"))?;
        let version = version_str
            .parse()
            .map_err(|e| ArchiveError::InvalidVersion(format!("{}", e)))?;
        let architecture = paragraph
            .remove("Architecture")
            .ok_or_else(|| ArchiveError::missing_field("Architecture"))?;

        let source = paragraph
            .remove("Source")
            .map(|s| s.parse::<SourceRef>())
            .transpose()?;

        let installed_size = paragraph
            .remove("Installed-Size")
            .map(|s| {
                s.parse::<u64>()
                    .map_err(|_| ArchiveError::invalid_field("Installed-Size".to_string(), s))
            })
            .transpose()?;
        let size = paragraph
            .remove("Size")
            .map(|s| {
                s.parse::<u64>()
                    .map_err(|_| ArchiveError::invalid_field("Size".to_string(), s))
            })
            .transpose()?;

        Ok(Self {
            package,
            version,
            architecture,
            source,
            maintainer: paragraph.remove("Maintainer"),
            installed_size,
            depends: paragraph.remove("Depends"),
            pre_depends: paragraph.remove("Pre-Depends"),
            recommends: paragraph.remove("Recommends"),
            suggests: paragraph.remove("Suggests"),
            conflicts: paragraph.remove("Conflicts"),
            breaks: paragraph.remove("Breaks"),
            replaces: paragraph.remove("Replaces"),
            provides: paragraph.remove("Provides"),
            section: paragraph.remove("Section"),
            priority: paragraph.remove("Priority"),
            homepage: paragraph.remove("Homepage"),
            description: paragraph.remove("Description"),
            filename: paragraph.remove("Filename"),
            size,
            md5sum: paragraph.remove("MD5sum"),
            sha1: paragraph.remove("SHA1"),
            sha256: paragraph.remove("SHA256"),
            sha512: paragraph.remove("SHA512"),
            extra: paragraph,
        })
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_paragraph())
    }
}
