//! The in-memory model of a package archive and its suites.
//!
//! An [`Archive`] is a repository root on disk; loading a [`Suite`] decodes
//! the release metadata from `dists/<suite>/InRelease` and yields an empty
//! per-component package index that is populated incrementally while
//! publishing, then re-serialized one architecture at a time.

use crate::control::{Paragraph, ParagraphReader};
use crate::hash::{HashAlgorithm, HashingWriter, DEFAULT_HASHES};
use crate::stream::FromParagraph;
use crate::{ArchiveError, Package, Result};
use log::debug;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

/// A package archive rooted at a directory following the
/// `dists/<suite>/...` layout.
#[derive(Debug, Clone)]
pub struct Archive {
    root: PathBuf,
}

impl Archive {
    /// Create an archive handle for the given root directory.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// The archive root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load a suite by decoding `dists/<name>/InRelease`.
    ///
    /// The file's signature is not validated here; the caller must
    /// establish the release's authenticity separately. Open and decode
    /// failures are propagated verbatim.
    pub fn suite(&self, name: &str) -> Result<Suite> {
        let in_release = self.root.join("dists").join(name).join("InRelease");
        debug!("loading suite {:?} from {}", name, in_release.display());

        let file = File::open(&in_release)?;
        let mut reader = ParagraphReader::new(BufReader::new(file));
        let paragraph = reader
            .next_paragraph()?
            .ok_or_else(|| ArchiveError::decode(format!("no release stanza in {}", in_release.display())))?;

        Suite::from_paragraph(paragraph)
    }

    /// Conventional path of a component's `Sources` index within a suite.
    pub fn sources_path(&self, suite: &str, component: &str) -> PathBuf {
        self.root
            .join("dists")
            .join(suite)
            .join(component)
            .join("source")
            .join("Sources")
    }

    /// Conventional path of a component's `Packages` index for one
    /// architecture within a suite.
    pub fn packages_path(&self, suite: &str, component: &str, arch: &str) -> PathBuf {
        self.root
            .join("dists")
            .join(suite)
            .join(component)
            .join(format!("binary-{}", arch))
            .join("Packages")
    }
}

/// One release of the archive: its metadata, the digest families to
/// compute when materializing indices, and the per-component package
/// index.
#[derive(Debug, Clone, Default)]
pub struct Suite {
    /// Description of the release.
    pub description: Option<String>,
    /// Origin of the release.
    pub origin: Option<String>,
    /// Label of the release.
    pub label: Option<String>,
    /// Release version.
    pub version: Option<String>,
    /// Suite name (e.g. `stable`).
    pub suite: Option<String>,
    /// Release codename.
    pub codename: Option<String>,
    /// Digest families to compute when producing hashed output.
    pub hashes: Vec<HashAlgorithm>,
    /// Release stanza fields beyond the standard set, in stanza order.
    pub fields: Paragraph,
    binaries: HashMap<String, Binaries>,
}

impl Suite {
    /// The components currently present in the index.
    ///
    /// Order is not significant.
    pub fn components(&self) -> Vec<&str> {
        self.binaries.keys().map(|k| k.as_str()).collect()
    }

    /// Append a package to a component's index, creating the component
    /// on first insertion.
    ///
    /// Within one architecture, insertion order is preserved and carries
    /// through to re-serialization.
    pub fn add_package_to(&mut self, component: &str, package: Package) {
        self.binaries
            .entry(component.to_string())
            .or_default()
            .add(package);
    }

    /// The per-architecture index for a component, if it has one.
    pub fn binaries(&self, component: &str) -> Option<&Binaries> {
        self.binaries.get(component)
    }

    /// The packages for `(component, arch)`, in insertion order.
    ///
    /// Absence is a valid, queryable state: an untouched combination
    /// yields an empty slice, not an error.
    pub fn get(&self, component: &str, arch: &str) -> &[Package] {
        self.binaries
            .get(component)
            .map(|b| b.get(arch))
            .unwrap_or(&[])
    }

    /// Whether any package has been inserted for `(component, arch)`.
    pub fn has(&self, component: &str, arch: &str) -> bool {
        self.binaries.get(component).is_some_and(|b| b.has(arch))
    }

    /// The architectures populated for a component.
    pub fn arches(&self, component: &str) -> Vec<&str> {
        self.binaries
            .get(component)
            .map(|b| b.arches())
            .unwrap_or_default()
    }

    /// Re-serialize every package for `(component, arch)` into `out`.
    ///
    /// Fails with [`ArchiveError::NoSuchArch`] when no package was ever
    /// inserted for the combination. A mid-stream write failure aborts;
    /// stanzas already written are not rolled back.
    pub fn write_arch_to<W: Write>(&self, component: &str, arch: &str, out: &mut W) -> Result<()> {
        match self.binaries.get(component) {
            Some(binaries) => binaries.write_arch_to(arch, out),
            None => Err(ArchiveError::NoSuchArch(arch.to_string())),
        }
    }

    /// Build a [`HashingWriter`] over `sink` using the suite's configured
    /// digest families.
    pub fn hashing_writer<W: Write>(&self, sink: W) -> HashingWriter<W> {
        HashingWriter::new(&self.hashes, sink)
    }
}

impl FromParagraph for Suite {
    fn from_paragraph(mut paragraph: Paragraph) -> Result<Self> {
        Ok(Self {
            description: paragraph.remove("Description"),
            origin: paragraph.remove("Origin"),
            label: paragraph.remove("Label"),
            version: paragraph.remove("Version"),
            suite: paragraph.remove("Suite"),
            codename: paragraph.remove("Codename"),
            hashes: DEFAULT_HASHES.to_vec(),
            fields: paragraph,
            binaries: HashMap::new(),
        })
    }
}

/// The per-architecture package index of one component.
///
/// Buckets are created on insertion and never on read, so "registered
/// with zero packages" is unrepresentable: absence and emptiness are the
/// same state.
#[derive(Debug, Clone, Default)]
pub struct Binaries {
    arches: HashMap<String, Vec<Package>>,
}

impl Binaries {
    /// Append a package to its architecture's bucket, creating the
    /// bucket on first insertion.
    pub fn add(&mut self, package: Package) {
        self.arches
            .entry(package.architecture.clone())
            .or_default()
            .push(package);
    }

    /// The packages for an architecture, in insertion order; empty when
    /// the architecture has no bucket.
    pub fn get(&self, arch: &str) -> &[Package] {
        self.arches.get(arch).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether the architecture has a bucket.
    pub fn has(&self, arch: &str) -> bool {
        self.arches.contains_key(arch)
    }

    /// The architectures currently populated.
    ///
    /// Keys are the architecture identifiers exactly as inserted; nothing
    /// is re-parsed or dropped.
    pub fn arches(&self) -> Vec<&str> {
        self.arches.keys().map(|k| k.as_str()).collect()
    }

    /// Re-serialize the architecture's packages into `out`, one stanza
    /// plus separating blank line each, in insertion order.
    pub fn write_arch_to<W: Write>(&self, arch: &str, out: &mut W) -> Result<()> {
        let packages = self
            .arches
            .get(arch)
            .ok_or_else(|| ArchiveError::NoSuchArch(arch.to_string()))?;

        debug!("writing {} package stanzas for {}", packages.len(), arch);
        for package in packages {
            out.write_all(package.to_paragraph().as_bytes())?;
            out.write_all(b"\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use debversion::Version;

    fn package(name: &str, arch: &str) -> Package {
        let version: Version = "1.0-1".parse().unwrap();
        Package::new(name, version, arch)
    }

    fn suite() -> Suite {
        Suite::from_paragraph(Paragraph::new()).unwrap()
    }

    #[test]
    fn test_suite_from_paragraph() {
        let paragraph = Paragraph::parse(
            "Origin: Debian\nLabel: Debian\nSuite: stable\nCodename: trixie\nVersion: 13.1\nDescription: Debian 13.1\nDate: Sat, 09 Aug 2025 10:24:35 UTC\n",
        )
        .unwrap();
        let suite = Suite::from_paragraph(paragraph).unwrap();

        assert_eq!(suite.origin.as_deref(), Some("Debian"));
        assert_eq!(suite.suite.as_deref(), Some("stable"));
        assert_eq!(suite.codename.as_deref(), Some("trixie"));
        assert_eq!(suite.hashes, DEFAULT_HASHES);
        assert!(suite.components().is_empty());
        // Unclaimed release fields stay accessible.
        assert_eq!(suite.fields.get("Date"), Some("Sat, 09 Aug 2025 10:24:35 UTC"));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut suite = suite();
        suite.add_package_to("main", package("p1", "amd64"));
        suite.add_package_to("main", package("p2", "amd64"));
        suite.add_package_to("main", package("p3", "amd64"));
        suite.add_package_to("main", package("p4", "i386"));

        let names: Vec<&str> = suite
            .get("main", "amd64")
            .iter()
            .map(|p| p.package.as_str())
            .collect();
        assert_eq!(names, vec!["p1", "p2", "p3"]);

        let other: Vec<&str> = suite
            .get("main", "i386")
            .iter()
            .map(|p| p.package.as_str())
            .collect();
        assert_eq!(other, vec!["p4"]);

        let binaries = suite.binaries("main").unwrap();
        assert!(binaries.has("amd64"));
        assert_eq!(binaries.get("i386").len(), 1);
    }

    #[test]
    fn test_components_created_on_insert() {
        let mut suite = suite();
        assert!(suite.components().is_empty());

        suite.add_package_to("main", package("p1", "amd64"));
        suite.add_package_to("contrib", package("p2", "amd64"));
        suite.add_package_to("main", package("p3", "amd64"));

        let mut components = suite.components();
        components.sort_unstable();
        assert_eq!(components, vec!["contrib", "main"]);
    }

    #[test]
    fn test_absence_is_not_failure_for_queries() {
        let suite = suite();
        assert!(suite.get("main", "amd64").is_empty());
        assert!(!suite.has("main", "amd64"));
        assert!(suite.arches("main").is_empty());
        assert!(suite.binaries("main").is_none());

        let mut out = Vec::new();
        assert!(matches!(
            suite.write_arch_to("main", "amd64", &mut out),
            Err(ArchiveError::NoSuchArch(arch)) if arch == "amd64"
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_arches_reports_inserted_keys() {
        let mut suite = suite();
        suite.add_package_to("main", package("p1", "amd64"));
        suite.add_package_to("main", package("p2", "riscv64"));
        suite.add_package_to("main", package("p3", "not-a-real-arch"));

        let mut arches = suite.arches("main");
        arches.sort_unstable();
        assert_eq!(arches, vec!["amd64", "not-a-real-arch", "riscv64"]);
    }

    #[test]
    fn test_write_arch_to_emits_stanzas_in_order() {
        let mut suite = suite();
        suite.add_package_to("main", package("zeta", "amd64"));
        suite.add_package_to("main", package("alpha", "amd64"));

        let mut out = Vec::new();
        suite.write_arch_to("main", "amd64", &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let zeta = text.find("Package: zeta").unwrap();
        let alpha = text.find("Package: alpha").unwrap();
        assert!(zeta < alpha);
        assert!(text.contains("\n\n"));
    }

    struct LimitedSink {
        accepted: Vec<u8>,
        writes_left: usize,
    }

    impl Write for LimitedSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.writes_left == 0 {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "sink full"));
            }
            self.writes_left -= 1;
            self.accepted.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_arch_to_midstream_failure_keeps_earlier_output() {
        let mut suite = suite();
        suite.add_package_to("main", package("first", "amd64"));
        suite.add_package_to("main", package("second", "amd64"));

        // Room for the first stanza and its separator, nothing more.
        let mut sink = LimitedSink {
            accepted: Vec::new(),
            writes_left: 2,
        };
        assert!(matches!(
            suite.write_arch_to("main", "amd64", &mut sink),
            Err(ArchiveError::Io(_))
        ));

        // Stanzas written before the failure are not rolled back.
        let written = String::from_utf8(sink.accepted).unwrap();
        assert!(written.contains("Package: first"));
        assert!(!written.contains("Package: second"));
    }

    #[test]
    fn test_hashing_writer_uses_suite_config() {
        let mut suite = suite();
        suite.hashes = vec![HashAlgorithm::Sha256];

        let mut writer = suite.hashing_writer(Vec::new());
        writer.write_all(b"payload").unwrap();
        let (_, _, digests) = writer.finish().unwrap();
        assert_eq!(digests.len(), 1);
        assert!(digests.get(&HashAlgorithm::Sha256).is_some());
    }
}
