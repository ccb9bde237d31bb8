//! `data:` URI decoding (RFC 2397).

use crate::error::{FetchError, FetchResult};
use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

const SCHEME: &str = "data:";
const BASE64_MARKER: &str = "base64";
const DEFAULT_MEDIA_TYPE: &str = "text/plain;charset=US-ASCII";

/// Accepts padded and unpadded payloads alike.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A syntactically complete `data:[mediatype][;base64],<data>` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub media_type: String,
    pub base64: bool,
    data: String,
}

impl DataUri {
    /// Splits a data URI into header and payload. A URI without the `,`
    /// separator is incomplete and rejected.
    pub fn parse(input: &str) -> FetchResult<Self> {
        let rest = input
            .get(..SCHEME.len())
            .filter(|prefix| prefix.eq_ignore_ascii_case(SCHEME))
            .map(|_| &input[SCHEME.len()..])
            .ok_or_else(|| FetchError::MalformedDataUri(format!("not a data URI: {input}")))?;

        let (header, data) = rest
            .split_once(',')
            .ok_or_else(|| FetchError::MalformedDataUri(format!("missing ',' separator: {input}")))?;

        let mut params: Vec<&str> = header.split(';').map(str::trim).collect();
        let base64 = params
            .last()
            .is_some_and(|p| p.eq_ignore_ascii_case(BASE64_MARKER));
        if base64 {
            params.pop();
        }

        let media_type = params.join(";");
        let media_type = if media_type.is_empty() {
            DEFAULT_MEDIA_TYPE.to_string()
        } else {
            media_type
        };

        Ok(Self {
            media_type,
            base64,
            data: data.to_string(),
        })
    }

    /// Decodes the payload into raw bytes.
    pub fn decode(&self) -> FetchResult<Vec<u8>> {
        let raw = urlencoding::decode_binary(self.data.as_bytes()).into_owned();
        if !self.base64 {
            return Ok(raw);
        }
        let compact: Vec<u8> = raw.into_iter().filter(|b| !b.is_ascii_whitespace()).collect();
        LENIENT_BASE64
            .decode(&compact)
            .map_err(|e| FetchError::MalformedDataUri(format!("invalid base64 payload: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_media_type() {
        let uri = DataUri::parse("data:,hello").unwrap();
        assert_eq!(uri.media_type, DEFAULT_MEDIA_TYPE);
        assert!(!uri.base64);
        assert_eq!(uri.decode().unwrap(), b"hello");
    }

    #[test]
    fn media_type_with_parameters() {
        let uri = DataUri::parse("data:text/plain;charset=utf-8;base64,aGk=").unwrap();
        assert_eq!(uri.media_type, "text/plain;charset=utf-8");
        assert!(uri.base64);
        assert_eq!(uri.decode().unwrap(), b"hi");
    }

    #[test]
    fn scheme_is_case_insensitive() {
        assert!(DataUri::parse("DATA:,x").is_ok());
    }
}
