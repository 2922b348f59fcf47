//! Common types for the crypto core

use crate::shared::error::CryptoError;
use std::fmt;
use std::str::FromStr;

// Result types for better error handling
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Character sets accepted by the text convenience methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Charset {
    #[default]
    Utf8,
    Iso8859_1,
    UsAscii,
}

impl Charset {
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Iso8859_1 => "ISO-8859-1",
            Charset::UsAscii => "US-ASCII",
        }
    }

    /// Encode text into bytes; characters outside the charset are an error
    pub fn encode(&self, text: &str) -> CryptoResult<Vec<u8>> {
        match self {
            Charset::Utf8 => Ok(text.as_bytes().to_vec()),
            Charset::Iso8859_1 | Charset::UsAscii => {
                let limit = if *self == Charset::UsAscii { 0x7f } else { 0xff };
                text.chars()
                    .map(|c| {
                        let code = c as u32;
                        if code <= limit {
                            Ok(code as u8)
                        } else {
                            Err(CryptoError::codec(format!("Character {:?} is not representable in {}", c, self.name())))
                        }
                    })
                    .collect()
            }
        }
    }

    /// Decode bytes into text
    pub fn decode(&self, bytes: &[u8]) -> CryptoResult<String> {
        match self {
            Charset::Utf8 => Ok(String::from_utf8(bytes.to_vec())?),
            Charset::Iso8859_1 => Ok(bytes.iter().map(|&b| b as char).collect()),
            Charset::UsAscii => {
                if let Some(pos) = bytes.iter().position(|b| !b.is_ascii()) {
                    return Err(CryptoError::codec(format!("Byte 0x{:02x} at {} is not US-ASCII", bytes[pos], pos)));
                }
                Ok(bytes.iter().map(|&b| b as char).collect())
            }
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Charset {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('_', "-").as_str() {
            "UTF-8" | "UTF8" => Ok(Charset::Utf8),
            "ISO-8859-1" | "LATIN1" => Ok(Charset::Iso8859_1),
            "US-ASCII" | "ASCII" => Ok(Charset::UsAscii),
            _ => Err(CryptoError::codec(format!("Unsupported charset: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_roundtrip() {
        let bytes = Charset::Utf8.encode("héllo").unwrap();
        assert_eq!(bytes.len(), 6);
        assert_eq!(Charset::Utf8.decode(&bytes).unwrap(), "héllo");
    }

    #[test]
    fn test_latin1_encoding() {
        let bytes = Charset::Iso8859_1.encode("héllo").unwrap();
        assert_eq!(bytes, vec![b'h', 0xe9, b'l', b'l', b'o']);
        assert_eq!(Charset::Iso8859_1.decode(&bytes).unwrap(), "héllo");
        assert!(Charset::Iso8859_1.encode("€").is_err());
    }

    #[test]
    fn test_ascii_rejects_high_bytes() {
        assert!(Charset::UsAscii.encode("é").is_err());
        assert!(Charset::UsAscii.decode(&[0x41, 0x80]).is_err());
        assert_eq!(Charset::UsAscii.decode(b"abc").unwrap(), "abc");
    }

    #[test]
    fn test_invalid_utf8() {
        let result = Charset::Utf8.decode(&[0xff, 0xfe]);
        assert!(matches!(result, Err(CryptoError::Codec(_))));
    }

    #[test]
    fn test_charset_parsing() {
        assert_eq!("utf-8".parse::<Charset>().unwrap(), Charset::Utf8);
        assert_eq!("ISO_8859_1".parse::<Charset>().unwrap(), Charset::Iso8859_1);
        assert!("GBK".parse::<Charset>().is_err());
    }
}
