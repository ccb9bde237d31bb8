//! Typed references into a multi-wiki document store.
//!
//! String syntax, with `\` escaping any separator character:
//! - document: `[wiki:]Space[.Nested].Page` (a bare `Page` lives in `Main`)
//! - object property: `<document>^<class>[<number>].<property>`
//! - attachment: `<document>@<file name>`

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const ESCAPE: char = '\\';
const WIKI_SEPARATOR: char = ':';
const SPACE_SEPARATOR: char = '.';
const OBJECT_SEPARATOR: char = '^';
const ATTACHMENT_SEPARATOR: char = '@';
const SPECIAL_CHARS: [char; 5] = [
    ESCAPE,
    WIKI_SEPARATOR,
    SPACE_SEPARATOR,
    OBJECT_SEPARATOR,
    ATTACHMENT_SEPARATOR,
];
const DEFAULT_SPACE: &str = "Main";

/// Result type for reference parsing.
pub type ReferenceResult<T> = Result<T, ReferenceError>;

/// Errors raised while turning a string into a typed reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("empty reference")]
    Empty,

    #[error("missing '{separator}' in reference: {input}")]
    MissingSeparator { separator: char, input: String },

    #[error("empty segment in reference: {0}")]
    EmptySegment(String),

    #[error("invalid object number in reference: {0}")]
    InvalidObjectNumber(String),
}

/// A document, identified by wiki, space path and page name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentReference {
    pub wiki: String,
    pub spaces: Vec<String>,
    pub name: String,
}

/// Classes are documents holding an object schema.
pub type ClassReference = DocumentReference;

impl DocumentReference {
    pub fn new(wiki: impl Into<String>, spaces: &[&str], name: impl Into<String>) -> Self {
        Self {
            wiki: wiki.into(),
            spaces: spaces.iter().map(|s| (*s).to_string()).collect(),
            name: name.into(),
        }
    }

    /// Parses `[wiki:]Space.Page`, using `default_wiki` when no wiki is named.
    pub fn parse(input: &str, default_wiki: &str) -> ReferenceResult<Self> {
        if input.is_empty() {
            return Err(ReferenceError::Empty);
        }

        let (wiki, local) = match split_first(input, WIKI_SEPARATOR) {
            Some((wiki, local)) => (unescape(wiki), local),
            None => (default_wiki.to_string(), input),
        };
        if wiki.is_empty() {
            return Err(ReferenceError::EmptySegment(input.to_string()));
        }

        let mut segments: Vec<String> = split_all(local, SPACE_SEPARATOR)
            .into_iter()
            .map(unescape)
            .collect();
        if segments.iter().any(String::is_empty) {
            return Err(ReferenceError::EmptySegment(input.to_string()));
        }

        let name = segments.pop().ok_or(ReferenceError::Empty)?;
        if segments.is_empty() {
            segments.push(DEFAULT_SPACE.to_string());
        }

        Ok(Self {
            wiki,
            spaces: segments,
            name,
        })
    }

    /// The `Space.Page` part of the reference, escaped, without the wiki.
    pub fn local_name(&self) -> String {
        self.spaces
            .iter()
            .chain(std::iter::once(&self.name))
            .map(|s| escape(s))
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for DocumentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", escape(&self.wiki), self.local_name())
    }
}

/// An object of a given class attached to a document.
///
/// `number: None` designates the first object of the class, whichever
/// number it carries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectReference {
    pub document: DocumentReference,
    pub class: ClassReference,
    pub number: Option<u32>,
}

impl fmt::Display for ObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}^{}", self.document, self.class.local_name())?;
        if let Some(number) = self.number {
            write!(f, "[{number}]")?;
        }
        Ok(())
    }
}

/// A named property of an object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectPropertyReference {
    pub object: ObjectReference,
    pub name: String,
}

impl ObjectPropertyReference {
    /// Parses `<document>^<class>[<number>].<property>`.
    ///
    /// The class lives in the document's wiki unless it names one itself.
    pub fn parse(input: &str, default_wiki: &str) -> ReferenceResult<Self> {
        if input.is_empty() {
            return Err(ReferenceError::Empty);
        }

        let (document_part, rest) =
            split_first(input, OBJECT_SEPARATOR).ok_or_else(|| ReferenceError::MissingSeparator {
                separator: OBJECT_SEPARATOR,
                input: input.to_string(),
            })?;
        let document = DocumentReference::parse(document_part, default_wiki)?;

        let (class_part, property) =
            split_last(rest, SPACE_SEPARATOR).ok_or_else(|| ReferenceError::MissingSeparator {
                separator: SPACE_SEPARATOR,
                input: input.to_string(),
            })?;
        let name = unescape(property);
        if name.is_empty() {
            return Err(ReferenceError::EmptySegment(input.to_string()));
        }

        let (class_part, number) = split_object_number(class_part)?;
        let class = DocumentReference::parse(class_part, &document.wiki)?;

        Ok(Self {
            object: ObjectReference {
                document,
                class,
                number,
            },
            name,
        })
    }

    pub fn document(&self) -> &DocumentReference {
        &self.object.document
    }
}

impl fmt::Display for ObjectPropertyReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.object, escape(&self.name))
    }
}

/// A named binary attachment of a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachmentReference {
    pub document: DocumentReference,
    pub name: String,
}

impl AttachmentReference {
    /// Parses `<document>@<file name>`. The first unescaped `@` separates
    /// the two, so file names may contain further `@` characters.
    pub fn parse(input: &str, default_wiki: &str) -> ReferenceResult<Self> {
        if input.is_empty() {
            return Err(ReferenceError::Empty);
        }

        let (document_part, file_name) = split_first(input, ATTACHMENT_SEPARATOR).ok_or_else(|| {
            ReferenceError::MissingSeparator {
                separator: ATTACHMENT_SEPARATOR,
                input: input.to_string(),
            }
        })?;
        let document = DocumentReference::parse(document_part, default_wiki)?;
        let name = unescape(file_name);
        if name.is_empty() {
            return Err(ReferenceError::EmptySegment(input.to_string()));
        }

        Ok(Self { document, name })
    }
}

impl fmt::Display for AttachmentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.document, escape(&self.name))
    }
}

/// Strips a trailing `[n]` object number from a class reference.
fn split_object_number(input: &str) -> ReferenceResult<(&str, Option<u32>)> {
    if !input.ends_with(']') || input.ends_with("\\]") {
        return Ok((input, None));
    }
    let Some(&open) = unescaped_positions(input, '[').last() else {
        return Ok((input, None));
    };
    let number = input[open + 1..input.len() - 1]
        .parse::<u32>()
        .map_err(|_| ReferenceError::InvalidObjectNumber(input.to_string()))?;
    Ok((&input[..open], Some(number)))
}

/// Byte offsets of every occurrence of `separator` not preceded by an escape.
fn unescaped_positions(input: &str, separator: char) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut escaped = false;
    for (idx, c) in input.char_indices() {
        if escaped {
            escaped = false;
        } else if c == ESCAPE {
            escaped = true;
        } else if c == separator {
            positions.push(idx);
        }
    }
    positions
}

fn split_first(input: &str, separator: char) -> Option<(&str, &str)> {
    unescaped_positions(input, separator)
        .first()
        .map(|&idx| (&input[..idx], &input[idx + separator.len_utf8()..]))
}

fn split_last(input: &str, separator: char) -> Option<(&str, &str)> {
    unescaped_positions(input, separator)
        .last()
        .map(|&idx| (&input[..idx], &input[idx + separator.len_utf8()..]))
}

fn split_all(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for idx in unescaped_positions(input, separator) {
        parts.push(&input[start..idx]);
        start = idx + separator.len_utf8();
    }
    parts.push(&input[start..]);
    parts
}

fn unescape(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars();
    while let Some(c) = chars.next() {
        if c == ESCAPE {
            // A trailing lone escape is kept literally.
            out.push(chars.next().unwrap_or(ESCAPE));
        } else {
            out.push(c);
        }
    }
    out
}

fn escape(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for c in segment.chars() {
        if SPECIAL_CHARS.contains(&c) {
            out.push(ESCAPE);
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_all_honours_escapes() {
        assert_eq!(split_all(r"A\.B.C", '.'), vec![r"A\.B", "C"]);
        assert_eq!(split_all("A", '.'), vec!["A"]);
        assert_eq!(split_all("A..B", '.'), vec!["A", "", "B"]);
    }

    #[test]
    fn unescape_then_escape_restores_specials() {
        let raw = r"logo\@2x\.png";
        let plain = unescape(raw);
        assert_eq!(plain, "logo@2x.png");
        assert_eq!(escape(&plain), raw);
    }

    #[test]
    fn trailing_escape_is_literal() {
        assert_eq!(unescape("abc\\"), "abc\\");
    }

    #[test]
    fn object_number_suffix() {
        assert_eq!(split_object_number("XWiki.Cls[3]").unwrap(), ("XWiki.Cls", Some(3)));
        assert_eq!(split_object_number("XWiki.Cls").unwrap(), ("XWiki.Cls", None));
        assert_eq!(split_object_number(r"XWiki.Cls\[3]").unwrap(), (r"XWiki.Cls\[3]", None));
        assert!(split_object_number("XWiki.Cls[x]").is_err());
    }
}
