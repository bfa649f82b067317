//! Control-file stanza tokenization.
//!
//! APT index files (`InRelease`, `Packages`, `Sources`) are sequences of
//! RFC-822-like stanzas: blank-line-delimited blocks of `Key: value` fields
//! where a line starting with whitespace continues the previous field.

use crate::{ArchiveError, Result};
use std::io::BufRead;

const CLEARSIGN_HEADER: &str = "-----BEGIN PGP SIGNED MESSAGE-----";
const SIGNATURE_HEADER: &str = "-----BEGIN PGP SIGNATURE-----";

/// One decoded stanza: an ordered list of fields with case-insensitive lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Paragraph {
    fields: Vec<(String, String)>,
}

impl Paragraph {
    /// Create an empty paragraph.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Look up a field value by name, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set a field, replacing any existing field with the same name.
    pub fn set<K: Into<String>, V: Into<String>>(&mut self, name: K, value: V) {
        let name = name.into();
        if let Some(slot) = self
            .fields
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&name))
        {
            slot.1 = value.into();
        } else {
            self.fields.push((name, value.into()));
        }
    }

    /// Remove a field by name and return its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self
            .fields
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))?;
        Some(self.fields.remove(pos).1)
    }

    /// Iterate over the fields in their original order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The number of fields in the paragraph.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the paragraph has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parse a single stanza from its textual form.
    pub fn parse(text: &str) -> Result<Self> {
        let mut paragraph = Paragraph::new();
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            paragraph.push_line(line)?;
        }
        Ok(paragraph)
    }

    /// Feed one raw line into the paragraph under construction.
    fn push_line(&mut self, line: &str) -> Result<()> {
        if line.starts_with(' ') || line.starts_with('\t') {
            let (_, value) = self
                .fields
                .last_mut()
                .ok_or_else(|| ArchiveError::decode(format!("Continuation line without field: {:?}", line)))?;
            value.push('\n');
            value.push_str(line);
            Ok(())
        } else if let Some((name, value)) = line.split_once(':') {
            self.fields
                .push((name.trim().to_string(), value.trim().to_string()));
            Ok(())
        } else {
            Err(ArchiveError::decode(format!("Invalid line format: {:?}", line)))
        }
    }
}

/// A streaming reader that yields one [`Paragraph`] per call.
///
/// Tolerates OpenPGP clearsign armor around the stanzas, as found in
/// `InRelease` files. The armor is skipped, never verified; callers must
/// establish integrity separately before trusting any decoded record.
#[derive(Debug)]
pub struct ParagraphReader<R> {
    reader: R,
}

impl<R: BufRead> ParagraphReader<R> {
    /// Wrap an already-open byte stream.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Read the next stanza, or `Ok(None)` once the stream is exhausted.
    pub fn next_paragraph(&mut self) -> Result<Option<Paragraph>> {
        let mut paragraph = Paragraph::new();
        let mut line = String::new();

        loop {
            line.clear();
            let n = self.reader.read_line(&mut line)?;
            if n == 0 {
                break;
            }
            let trimmed = line.trim_end_matches(['\n', '\r']);

            if trimmed == CLEARSIGN_HEADER {
                self.skip_armor_headers()?;
                continue;
            }
            if trimmed == SIGNATURE_HEADER {
                self.drain()?;
                break;
            }

            if trimmed.trim().is_empty() {
                if paragraph.is_empty() {
                    continue;
                }
                return Ok(Some(paragraph));
            }

            // Dash-escaped line inside a clearsigned document.
            let content = trimmed.strip_prefix("- ").unwrap_or(trimmed);
            paragraph.push_line(content)?;
        }

        if paragraph.is_empty() {
            Ok(None)
        } else {
            Ok(Some(paragraph))
        }
    }

    /// Skip the `Hash:` headers between the clearsign banner and the text.
    fn skip_armor_headers(&mut self) -> Result<()> {
        let mut line = String::new();
        loop {
            line.clear();
            let n = self.reader.read_line(&mut line)?;
            if n == 0 || line.trim().is_empty() {
                return Ok(());
            }
        }
    }

    /// Consume the remainder of the stream (trailing signature block).
    fn drain(&mut self) -> Result<()> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_parse() {
        let paragraph = Paragraph::parse("Package: hello\nVersion: 2.10-2\n").unwrap();
        assert_eq!(paragraph.len(), 2);
        assert_eq!(paragraph.get("Package"), Some("hello"));
        assert_eq!(paragraph.get("package"), Some("hello"));
        assert_eq!(paragraph.get("Version"), Some("2.10-2"));
        assert_eq!(paragraph.get("Missing"), None);
    }

    #[test]
    fn test_paragraph_continuation() {
        let paragraph =
            Paragraph::parse("Description: short\n long line one\n long line two\n").unwrap();
        assert_eq!(
            paragraph.get("Description"),
            Some("short\n long line one\n long line two")
        );
    }

    #[test]
    fn test_paragraph_invalid_line() {
        assert!(Paragraph::parse("no colon here\n").is_err());
    }

    #[test]
    fn test_paragraph_set_remove() {
        let mut paragraph = Paragraph::new();
        paragraph.set("Directory", "pool/main/h/hello");
        assert_eq!(paragraph.get("directory"), Some("pool/main/h/hello"));
        paragraph.set("Directory", "pool/main/h/hi");
        assert_eq!(paragraph.len(), 1);
        assert_eq!(paragraph.remove("DIRECTORY"), Some("pool/main/h/hi".to_string()));
        assert!(paragraph.is_empty());
    }

    #[test]
    fn test_reader_splits_stanzas() {
        let input = "Package: a\nVersion: 1.0\n\nPackage: b\nVersion: 2.0\n";
        let mut reader = ParagraphReader::new(input.as_bytes());

        let first = reader.next_paragraph().unwrap().unwrap();
        assert_eq!(first.get("Package"), Some("a"));
        let second = reader.next_paragraph().unwrap().unwrap();
        assert_eq!(second.get("Package"), Some("b"));
        assert!(reader.next_paragraph().unwrap().is_none());
        assert!(reader.next_paragraph().unwrap().is_none());
    }

    #[test]
    fn test_reader_skips_leading_blank_lines() {
        let input = "\n\nPackage: a\n";
        let mut reader = ParagraphReader::new(input.as_bytes());
        let paragraph = reader.next_paragraph().unwrap().unwrap();
        assert_eq!(paragraph.get("Package"), Some("a"));
        assert!(reader.next_paragraph().unwrap().is_none());
    }

    #[test]
    fn test_reader_clearsigned() {
        let input = "-----BEGIN PGP SIGNED MESSAGE-----\nHash: SHA256\n\nOrigin: Debian\nSuite: stable\n-----BEGIN PGP SIGNATURE-----\nirrelevant\n-----END PGP SIGNATURE-----\n";
        let mut reader = ParagraphReader::new(input.as_bytes());
        let paragraph = reader.next_paragraph().unwrap().unwrap();
        assert_eq!(paragraph.get("Origin"), Some("Debian"));
        assert_eq!(paragraph.get("Suite"), Some("stable"));
        assert!(reader.next_paragraph().unwrap().is_none());
    }
}
