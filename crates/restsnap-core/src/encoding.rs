use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Text encoding used for every blob read/write and for response bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TextEncoding {
    #[default]
    Utf8,
    /// ISO-8859-1: every byte maps to the code point of the same value
    Latin1,
    Ascii,
}

impl TextEncoding {
    pub fn label(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Ascii => "ascii",
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> CoreResult<String> {
        match self {
            TextEncoding::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_string)
                .map_err(|e| CoreError::Decode(format!("invalid utf-8: {}", e))),
            TextEncoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            TextEncoding::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(pos) => Err(CoreError::Decode(format!(
                    "byte 0x{:02x} at position {} is not ascii",
                    bytes[pos], pos
                ))),
                None => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            },
        }
    }

    pub fn encode(&self, text: &str) -> CoreResult<Vec<u8>> {
        match self {
            TextEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
            TextEncoding::Latin1 => self.encode_narrow(text, 0xFF),
            TextEncoding::Ascii => self.encode_narrow(text, 0x7F),
        }
    }

    fn encode_narrow(&self, text: &str, max: u32) -> CoreResult<Vec<u8>> {
        text.chars()
            .map(|c| {
                let code = c as u32;
                if code <= max {
                    Ok(code as u8)
                } else {
                    Err(CoreError::Encode(format!(
                        "character {:?} cannot be encoded as {}",
                        c,
                        self.label()
                    )))
                }
            })
            .collect()
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TextEncoding {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" => Ok(TextEncoding::Latin1),
            "ascii" | "us-ascii" => Ok(TextEncoding::Ascii),
            other => Err(CoreError::Invalid(format!("unsupported encoding: {}", other))),
        }
    }
}

impl TryFrom<String> for TextEncoding {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TextEncoding> for String {
    fn from(value: TextEncoding) -> Self {
        value.label().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_labels() {
        assert_eq!("UTF-8".parse::<TextEncoding>().unwrap(), TextEncoding::Utf8);
        assert_eq!("iso-8859-1".parse::<TextEncoding>().unwrap(), TextEncoding::Latin1);
        assert_eq!("latin_1".parse::<TextEncoding>().unwrap(), TextEncoding::Latin1);
        assert_eq!("us-ascii".parse::<TextEncoding>().unwrap(), TextEncoding::Ascii);
        assert!("koi8-r".parse::<TextEncoding>().is_err());
    }

    #[test]
    fn utf8_rejects_invalid_bytes() {
        let err = TextEncoding::Utf8.decode(&[0x66, 0xff, 0x6f]).unwrap_err();
        assert!(matches!(err, CoreError::Decode(_)));
    }

    #[test]
    fn latin1_maps_every_byte() {
        let text = TextEncoding::Latin1.decode(&[0x63, 0x61, 0x66, 0xe9]).unwrap();
        assert_eq!(text, "café");
        assert_eq!(TextEncoding::Latin1.encode(&text).unwrap(), vec![0x63, 0x61, 0x66, 0xe9]);
        assert!(TextEncoding::Latin1.encode("€").is_err());
    }

    #[test]
    fn ascii_rejects_high_bytes() {
        assert_eq!(TextEncoding::Ascii.decode(b"plain").unwrap(), "plain");
        assert!(TextEncoding::Ascii.decode(&[0x80]).is_err());
        assert!(TextEncoding::Ascii.encode("é").is_err());
    }
}
