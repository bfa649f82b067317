//! # APT Archive Library
//!
//! A Rust library for reading and publishing the index files of an APT
//! package archive. It stream-decodes `Packages` and `Sources` indices
//! into typed records, models a suite's per-component, per-architecture
//! package index in memory, re-serializes one architecture at a time back
//! to the wire format, and computes multiple cryptographic digests of an
//! output stream in a single pass while it is being written.
//!
//! ## Example
//!
//! ```no_run
//! use apt_archive::{Archive, SourcesReader, StanzaReader};
//!
//! # fn main() -> apt_archive::Result<()> {
//! let archive = Archive::new("/srv/mirror/debian");
//! let suite = archive.suite("stable")?;
//!
//! let mut sources: SourcesReader<_> =
//!     StanzaReader::open(archive.sources_path("stable", "main"))?;
//! while let Some(source) = sources.next_record()? {
//!     println!("{} ({})", source.package, source.directory);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Index files are not signature-protected at this layer: their integrity
//! must be established against a verified release manifest before any
//! decoded record is trusted.

pub mod archive;
pub mod compression;
pub mod control;
pub mod error;
pub mod fields;
pub mod hash;
pub mod packages;
pub mod sources;
pub mod stream;

pub use archive::{Archive, Binaries, Suite};
pub use compression::Compression;
pub use control::{Paragraph, ParagraphReader};
pub use error::{ArchiveError, Result};
pub use fields::{FileEntry, SourceRef};
pub use hash::{DigestSet, HashAlgorithm, HashingWriter, MultiHasher, DEFAULT_HASHES};
pub use packages::Package;
pub use sources::Source;
pub use stream::{FromParagraph, PackagesReader, SourcesReader, StanzaReader};
