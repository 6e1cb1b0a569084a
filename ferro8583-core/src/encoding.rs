/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Character encoders for field content.
//!
//! An [`Encoding`] is a pure byte transform between the in-memory form of a
//! field value and its wire form. The variant set is closed; ISO 8583
//! specifications only ever name these encodings:
//! - [`Encoding::Ascii`]: validating 7-bit ASCII
//! - [`Encoding::Text`]: non-validating pass-through for non-Latin payloads
//! - [`Encoding::Binary`]: raw bytes
//! - [`Encoding::Bcd`]: packed binary-coded decimal digits
//! - [`Encoding::Ebcdic`]: EBCDIC code page 037
//! - [`Encoding::Hex`]: in-memory hex string, raw bytes on the wire
//!
//! `decode` takes a want count in *characters of the encoder's alphabet*
//! (bytes for ASCII/Text/Binary, digits for BCD, hex digits for Hex) and
//! reports how many *input bytes* it consumed.

use crate::ebcdic;
use crate::error::EncodingError;

/// Character encoding for field content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Validating 7-bit ASCII; any byte above 0x7F is rejected.
    Ascii,
    /// Pass-through text; accepts any byte sequence (UTF-8, CJK, …).
    Text,
    /// Raw binary bytes, no transformation.
    Binary,
    /// Packed BCD; two decimal digits per wire byte, odd counts padded
    /// with a leading zero nibble.
    Bcd,
    /// EBCDIC code page 037.
    Ebcdic,
    /// Hexadecimal: the in-memory value is a hex string, the wire form is
    /// the raw bytes it denotes.
    Hex,
}

impl Encoding {
    /// Returns the stable name used in diagnostics.
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ascii => "ASCII",
            Self::Text => "Text",
            Self::Binary => "Binary",
            Self::Bcd => "BCD",
            Self::Ebcdic => "EBCDIC",
            Self::Hex => "Hex",
        }
    }

    /// Encodes in-memory value bytes into their wire form.
    ///
    /// # Errors
    /// Returns [`EncodingError`] when the input contains bytes the encoding
    /// cannot represent (non-ASCII, non-digit, odd-length hex, …).
    pub fn encode(self, data: &[u8]) -> Result<Vec<u8>, EncodingError> {
        match self {
            Self::Ascii => {
                for &byte in data {
                    if byte > 0x7F {
                        return Err(EncodingError::InvalidAsciiChar(byte as char));
                    }
                }
                Ok(data.to_vec())
            }
            Self::Text | Self::Binary => Ok(data.to_vec()),
            Self::Bcd => encode_bcd(data),
            Self::Ebcdic => {
                let mut out = Vec::with_capacity(data.len());
                for &byte in data {
                    let encoded = ebcdic::from_ascii(byte)
                        .ok_or(EncodingError::InvalidAsciiChar(byte as char))?;
                    out.push(encoded);
                }
                Ok(out)
            }
            Self::Hex => Ok(hex::decode(data)?),
        }
    }

    /// Decodes `want` characters of wire data into in-memory value bytes.
    ///
    /// Returns the decoded bytes and the number of *input bytes* consumed.
    ///
    /// # Errors
    /// Returns [`EncodingError::NotEnoughData`] when the input is shorter
    /// than the request, or an invalid-content error for bytes the encoding
    /// cannot decode.
    pub fn decode(self, data: &[u8], want: usize) -> Result<(Vec<u8>, usize), EncodingError> {
        match self {
            Self::Ascii => {
                let raw = take(data, want)?;
                for &byte in raw {
                    if byte > 0x7F {
                        return Err(EncodingError::InvalidAsciiChar(byte as char));
                    }
                }
                Ok((raw.to_vec(), want))
            }
            Self::Text | Self::Binary => {
                let raw = take(data, want)?;
                Ok((raw.to_vec(), want))
            }
            Self::Bcd => decode_bcd(data, want),
            Self::Ebcdic => {
                let raw = take(data, want)?;
                let mut out = Vec::with_capacity(want);
                for &byte in raw {
                    let decoded =
                        ebcdic::to_ascii(byte).ok_or(EncodingError::InvalidEbcdicByte(byte))?;
                    out.push(decoded);
                }
                Ok((out, want))
            }
            Self::Hex => {
                let read = want.div_ceil(2);
                let raw = take(data, read)?;
                Ok((hex::encode_upper(raw).into_bytes(), read))
            }
        }
    }
}

/// Slices the first `want` bytes, reporting a short buffer precisely.
#[inline]
fn take(data: &[u8], want: usize) -> Result<&[u8], EncodingError> {
    if data.len() < want {
        return Err(EncodingError::NotEnoughData {
            expected: want,
            got: data.len(),
        });
    }
    Ok(&data[..want])
}

fn encode_bcd(digits: &[u8]) -> Result<Vec<u8>, EncodingError> {
    for &byte in digits {
        if !byte.is_ascii_digit() {
            return Err(EncodingError::InvalidBcdDigit(byte as char));
        }
    }

    // Odd digit counts take a zero pad nibble on the left.
    let mut out = Vec::with_capacity(digits.len().div_ceil(2));
    let mut nibbles = digits.iter().map(|d| d - b'0');
    if digits.len() % 2 == 1 {
        out.push(nibbles.next().unwrap_or(0));
    }
    while let Some(hi) = nibbles.next() {
        let lo = nibbles.next().unwrap_or(0);
        out.push((hi << 4) | lo);
    }
    Ok(out)
}

fn decode_bcd(data: &[u8], want: usize) -> Result<(Vec<u8>, usize), EncodingError> {
    let read = want.div_ceil(2);
    let raw = take(data, read)?;

    let mut digits = Vec::with_capacity(read * 2);
    for &byte in raw {
        for nibble in [byte >> 4, byte & 0x0F] {
            if nibble > 9 {
                return Err(EncodingError::InvalidBcdNibble(nibble));
            }
            digits.push(b'0' + nibble);
        }
    }
    // Drop the pad nibble for odd digit counts.
    let skip = digits.len() - want;
    Ok((digits.split_off(skip), read))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_round_trip() {
        let encoded = Encoding::Ascii.encode(b"hello").unwrap();
        assert_eq!(encoded, b"hello");

        let (decoded, read) = Encoding::Ascii.decode(b"hello", 5).unwrap();
        assert_eq!(decoded, b"hello");
        assert_eq!(read, 5);
    }

    #[test]
    fn test_ascii_rejects_high_bytes() {
        let err = Encoding::Ascii.encode("héllo".as_bytes()).unwrap_err();
        assert!(matches!(err, EncodingError::InvalidAsciiChar(_)));

        let err = Encoding::Ascii.decode(&[0x80, 0x81], 2).unwrap_err();
        assert!(matches!(err, EncodingError::InvalidAsciiChar(_)));
    }

    #[test]
    fn test_text_passes_non_latin_payloads() {
        let payload = "hello, 世界!".as_bytes();
        assert_eq!(payload.len(), 14);

        let encoded = Encoding::Text.encode(payload).unwrap();
        assert_eq!(encoded, payload);

        let (decoded, read) = Encoding::Text.decode(payload, 14).unwrap();
        assert_eq!(decoded, payload);
        assert_eq!(read, 14);
    }

    #[test]
    fn test_text_short_buffer_message() {
        let err = Encoding::Text.decode(b"hello", 6).unwrap_err();
        assert_eq!(
            err.to_string(),
            "not enough data to decode. expected len 6, got 5"
        );

        let err = Encoding::Text.decode(b"", 6).unwrap_err();
        assert_eq!(
            err.to_string(),
            "not enough data to decode. expected len 6, got 0"
        );
    }

    #[test]
    fn test_binary_pass_through() {
        let data = [0x00, 0xFF, 0x7F, 0x80];
        assert_eq!(Encoding::Binary.encode(&data).unwrap(), data);

        let (decoded, read) = Encoding::Binary.decode(&data, 4).unwrap();
        assert_eq!(decoded, data);
        assert_eq!(read, 4);
    }

    #[test]
    fn test_bcd_even_digits() {
        assert_eq!(Encoding::Bcd.encode(b"1234").unwrap(), vec![0x12, 0x34]);

        let (decoded, read) = Encoding::Bcd.decode(&[0x12, 0x34], 4).unwrap();
        assert_eq!(decoded, b"1234");
        assert_eq!(read, 2);
    }

    #[test]
    fn test_bcd_odd_digits_pad_left() {
        assert_eq!(Encoding::Bcd.encode(b"123").unwrap(), vec![0x01, 0x23]);

        let (decoded, read) = Encoding::Bcd.decode(&[0x01, 0x23], 3).unwrap();
        assert_eq!(decoded, b"123");
        assert_eq!(read, 2);
    }

    #[test]
    fn test_bcd_rejects_non_digits() {
        let err = Encoding::Bcd.encode(b"12a4").unwrap_err();
        assert_eq!(err, EncodingError::InvalidBcdDigit('a'));

        let err = Encoding::Bcd.decode(&[0x1A], 2).unwrap_err();
        assert_eq!(err, EncodingError::InvalidBcdNibble(0x0A));
    }

    #[test]
    fn test_bcd_short_buffer() {
        let err = Encoding::Bcd.decode(&[0x12], 4).unwrap_err();
        assert_eq!(
            err.to_string(),
            "not enough data to decode. expected len 2, got 1"
        );
    }

    #[test]
    fn test_ebcdic_round_trip() {
        let encoded = Encoding::Ebcdic.encode(b"AB12").unwrap();
        assert_eq!(encoded, vec![0xC1, 0xC2, 0xF1, 0xF2]);

        let (decoded, read) = Encoding::Ebcdic.decode(&encoded, 4).unwrap();
        assert_eq!(decoded, b"AB12");
        assert_eq!(read, 4);
    }

    #[test]
    fn test_ebcdic_rejects_unmapped_bytes() {
        let err = Encoding::Ebcdic.decode(&[0x41], 1).unwrap_err();
        assert_eq!(err, EncodingError::InvalidEbcdicByte(0x41));
    }

    #[test]
    fn test_hex_encode() {
        assert_eq!(Encoding::Hex.encode(b"5F2A").unwrap(), vec![0x5F, 0x2A]);
        assert_eq!(Encoding::Hex.encode(b"5f2a").unwrap(), vec![0x5F, 0x2A]);
    }

    #[test]
    fn test_hex_rejects_odd_or_invalid() {
        assert!(Encoding::Hex.encode(b"5F2").is_err());
        assert!(Encoding::Hex.encode(b"5G2A").is_err());
    }

    #[test]
    fn test_hex_decode_counts_hex_digits() {
        let (decoded, read) = Encoding::Hex.decode(&[0x5F, 0x2A], 4).unwrap();
        assert_eq!(decoded, b"5F2A");
        assert_eq!(read, 2);

        let (decoded, read) = Encoding::Hex.decode(&[0x5F], 1).unwrap();
        assert_eq!(decoded, b"5F");
        assert_eq!(read, 1);
    }

    #[test]
    fn test_names() {
        assert_eq!(Encoding::Ascii.name(), "ASCII");
        assert_eq!(Encoding::Ebcdic.name(), "EBCDIC");
        assert_eq!(Encoding::Bcd.name(), "BCD");
    }
}
