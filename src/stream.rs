//! Streaming stanza decoding for index files.
//!
//! A [`StanzaReader`] pulls one typed record at a time out of a
//! `Packages` or `Sources` stream, so large indices never have to be
//! resident in memory. The record types form a closed set sharing one
//! decode mechanism: anything implementing [`FromParagraph`] can be
//! streamed, and new stanza kinds are added by implementing the trait,
//! not by duplicating stream handling.

use crate::compression::Compression;
use crate::control::{Paragraph, ParagraphReader};
use crate::Result;
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::marker::PhantomData;
use std::path::Path;

/// A record type decodable from a control stanza.
pub trait FromParagraph: Sized {
    /// Decode one stanza into the record.
    fn from_paragraph(paragraph: Paragraph) -> Result<Self>;
}

/// A pull-based decoder producing one record per stanza.
///
/// The reader owns its decode cursor for its lifetime; callers must not
/// interleave independent reads against the same underlying byte source.
#[derive(Debug)]
pub struct StanzaReader<T, R> {
    paragraphs: ParagraphReader<R>,
    _record: PhantomData<T>,
}

/// A streaming reader over a `Sources` index.
pub type SourcesReader<R> = StanzaReader<crate::Source, R>;

/// A streaming reader over a `Packages` index.
pub type PackagesReader<R> = StanzaReader<crate::Package, R>;

impl<T: FromParagraph> StanzaReader<T, BufReader<Box<dyn Read>>> {
    /// Open an index file read-only, decompressing by file extension.
    ///
    /// Open and decoder-construction failures surface directly.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("opening index stream {}", path.display());
        let file = File::open(path)?;
        let reader = Compression::from_path(path).reader(file);
        Ok(Self::new(BufReader::new(reader)))
    }
}

impl<T: FromParagraph, R: BufRead> StanzaReader<T, R> {
    /// Wrap an already-open byte stream.
    ///
    /// The stream is not signature-protected at this layer: verify its
    /// integrity against a trusted manifest before relying on any record.
    pub fn new(reader: R) -> Self {
        Self {
            paragraphs: ParagraphReader::new(reader),
            _record: PhantomData,
        }
    }

    /// Decode the next record, advancing exactly one stanza.
    ///
    /// Returns `Ok(None)` once the last stanza has been consumed. A
    /// malformed stanza surfaces the decode error; the stream position
    /// after an error is not guaranteed to skip the bad stanza.
    pub fn next_record(&mut self) -> Result<Option<T>> {
        match self.paragraphs.next_paragraph()? {
            Some(paragraph) => T::from_paragraph(paragraph).map(Some),
            None => Ok(None),
        }
    }
}

impl<T: FromParagraph, R: BufRead> Iterator for StanzaReader<T, R> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Package, Source};

    const SOURCES: &str = "\
Package: hello
Directory: pool/main/h/hello
Version: 2.10-2

Package: bye
Directory: pool/main/b/bye
Version: 0.1-1
";

    #[test]
    fn test_streaming_exhaustion() {
        let mut reader: SourcesReader<_> = StanzaReader::new(SOURCES.as_bytes());

        let first = reader.next_record().unwrap().unwrap();
        assert_eq!(first.package, "hello");
        let second = reader.next_record().unwrap().unwrap();
        assert_eq!(second.package, "bye");

        // End of stream is a signal, not an error, and it is sticky.
        assert!(reader.next_record().unwrap().is_none());
        assert!(reader.next_record().unwrap().is_none());
    }

    #[test]
    fn test_iterator_adapter() {
        let reader: SourcesReader<_> = StanzaReader::new(SOURCES.as_bytes());
        let names: Vec<String> = reader
            .collect::<Result<Vec<Source>>>()
            .unwrap()
            .into_iter()
            .map(|s| s.package)
            .collect();
        assert_eq!(names, vec!["hello", "bye"]);
    }

    #[test]
    fn test_malformed_stanza_surfaces_error() {
        let input = "Package: hello\nVersion: 2.10-2\n";
        let mut reader: SourcesReader<_> = StanzaReader::new(input.as_bytes());
        // Valid paragraph, but missing the mandatory Directory field.
        assert!(reader.next_record().is_err());
    }

    #[test]
    fn test_packages_stream() {
        let input = "Package: hello\nVersion: 2.10-2\nArchitecture: amd64\n";
        let mut reader: PackagesReader<_> = StanzaReader::new(input.as_bytes());
        let package: Package = reader.next_record().unwrap().unwrap();
        assert_eq!(package.architecture, "amd64");
        assert!(reader.next_record().unwrap().is_none());
    }
}
