/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Length prefixers for variable-length field framing.
//!
//! A [`Prefixer`] describes how a field declares its length on the wire:
//! - [`Prefixer::Fixed`]: no prefix bytes; the length must equal the spec
//!   maximum.
//! - [`Prefixer::Var`]: a fixed-digit decimal length (`L`, `LL`, … `LLLLLL`)
//!   rendered in a digit encoding (ASCII, EBCDIC, or packed BCD).
//! - [`Prefixer::Delimiter`]: no prefix bytes; the field ends at a sentinel
//!   byte, which counts toward the reported length.
//!
//! Prefixer families are exposed as consts mirroring the conventional
//! ISO 8583 vocabulary: [`ascii::LL`], [`ebcdic::LLL`], [`bcd::Fixed`], ….

use crate::ebcdic as cp037;
use crate::error::PrefixError;
use memchr::memchr;
use smallvec::SmallVec;

/// Wire bytes of an encoded length prefix (at most six digits).
pub type LengthPrefix = SmallVec<[u8; 8]>;

/// Character encoding for the decimal digits of a length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitEncoding {
    /// ASCII decimal digits, one wire byte per digit.
    Ascii,
    /// EBCDIC decimal digits, one wire byte per digit.
    Ebcdic,
    /// Packed BCD digits, two digits per wire byte.
    Bcd,
}

impl DigitEncoding {
    /// Returns the stable family name used by [`Prefixer::inspect`].
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ascii => "ASCII",
            Self::Ebcdic => "EBCDIC",
            Self::Bcd => "BCD",
        }
    }

    /// Wire bytes occupied by a prefix of `digits` decimal digits.
    #[inline]
    #[must_use]
    const fn prefix_len(self, digits: usize) -> usize {
        match self {
            Self::Ascii | Self::Ebcdic => digits,
            Self::Bcd => digits.div_ceil(2),
        }
    }

    /// Renders a zero-padded decimal value into prefix wire bytes.
    fn encode_digits(self, value: usize, digits: usize) -> LengthPrefix {
        let mut decimal: SmallVec<[u8; 8]> = SmallVec::new();
        let mut buffer = itoa::Buffer::new();
        let formatted = buffer.format(value).as_bytes();
        decimal.extend(std::iter::repeat(b'0').take(digits - formatted.len()));
        decimal.extend_from_slice(formatted);

        match self {
            Self::Ascii => decimal,
            Self::Ebcdic => decimal
                .iter()
                .map(|&d| 0xF0 | (d - b'0'))
                .collect(),
            Self::Bcd => {
                let mut out = LengthPrefix::new();
                let mut nibbles = decimal.iter().map(|d| d - b'0');
                if decimal.len() % 2 == 1 {
                    out.push(nibbles.next().unwrap_or(0));
                }
                while let Some(hi) = nibbles.next() {
                    let lo = nibbles.next().unwrap_or(0);
                    out.push((hi << 4) | lo);
                }
                out
            }
        }
    }

    /// Parses `digits` decimal digits from the head of `data`.
    fn decode_digits(self, data: &[u8], digits: usize) -> Result<usize, PrefixError> {
        let mut value: usize = 0;
        let mut push = |digit: u8| -> Result<(), PrefixError> {
            if digit > 9 {
                return Err(PrefixError::InvalidLengthDigits);
            }
            value = value * 10 + digit as usize;
            Ok(())
        };

        match self {
            Self::Ascii => {
                for &byte in &data[..digits] {
                    push(byte.wrapping_sub(b'0'))?;
                }
            }
            Self::Ebcdic => {
                for &byte in &data[..digits] {
                    let ascii =
                        cp037::to_ascii(byte).ok_or(PrefixError::InvalidLengthDigits)?;
                    push(ascii.wrapping_sub(b'0'))?;
                }
            }
            Self::Bcd => {
                for &byte in &data[..digits.div_ceil(2)] {
                    push(byte >> 4)?;
                    push(byte & 0x0F)?;
                }
            }
        }
        Ok(value)
    }
}

/// Length framing rule for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefixer {
    /// No prefix; the data length must equal the spec maximum.
    Fixed(DigitEncoding),
    /// Decimal length of the given digit width in the given digit encoding.
    Var(DigitEncoding, usize),
    /// Sentinel-terminated content; the sentinel counts toward the length.
    Delimiter(u8, &'static str),
}

impl Prefixer {
    /// Creates a delimiter prefixer for the given sentinel byte.
    ///
    /// The name completes the prefixer identity for [`Prefixer::inspect`],
    /// e.g. `Prefixer::delimiter(0x5C, "ASCIIBackslash")` inspects as
    /// `"ASCIIBackslashDelimiter"`.
    #[inline]
    #[must_use]
    pub const fn delimiter(sentinel: u8, name: &'static str) -> Self {
        Self::Delimiter(sentinel, name)
    }

    /// Encodes the length prefix for a field of `data_len` content units.
    ///
    /// Fixed and delimiter prefixers contribute no wire bytes; they only
    /// enforce the length constraint.
    ///
    /// # Errors
    /// Returns [`PrefixError`] when `data_len` violates the framing rule.
    pub fn encode_length(
        &self,
        max_len: usize,
        data_len: usize,
    ) -> Result<LengthPrefix, PrefixError> {
        match *self {
            Self::Fixed(_) => {
                if data_len != max_len {
                    return Err(PrefixError::LengthNotFixed { data_len, max_len });
                }
                Ok(LengthPrefix::new())
            }
            Self::Var(enc, digits) => {
                if data_len > max_len {
                    return Err(PrefixError::LengthOverMax { data_len, max_len });
                }
                let needed = decimal_width(data_len);
                if needed > digits {
                    return Err(PrefixError::DigitsOverCapacity { data_len, digits });
                }
                Ok(enc.encode_digits(data_len, digits))
            }
            Self::Delimiter(..) => {
                if data_len > max_len {
                    return Err(PrefixError::LengthOverMax { data_len, max_len });
                }
                Ok(LengthPrefix::new())
            }
        }
    }

    /// Decodes the length prefix at the head of `data`.
    ///
    /// Returns `(data_len, prefix_bytes_consumed)`.
    ///
    /// # Errors
    /// Returns [`PrefixError`] when the prefix is short, malformed, or
    /// declares a length above the maximum.
    pub fn decode_length(
        &self,
        max_len: usize,
        data: &[u8],
    ) -> Result<(usize, usize), PrefixError> {
        match *self {
            Self::Fixed(_) => Ok((max_len, 0)),
            Self::Var(enc, digits) => {
                let prefix_len = enc.prefix_len(digits);
                if data.len() < prefix_len {
                    return Err(PrefixError::NotEnoughPrefixData {
                        got: data.len(),
                        digits,
                    });
                }
                let data_len = enc.decode_digits(data, digits)?;
                if data_len > max_len {
                    return Err(PrefixError::DataLengthOverMax { data_len, max_len });
                }
                Ok((data_len, prefix_len))
            }
            Self::Delimiter(sentinel, _) => {
                let window = data.len().min(max_len);
                match memchr(sentinel, &data[..window]) {
                    Some(pos) => Ok((pos + 1, 0)),
                    None if data.len() > max_len => {
                        Err(PrefixError::DelimiterNotFoundWithin { max_len })
                    }
                    None => Err(PrefixError::DelimiterNotFound),
                }
            }
        }
    }

    /// Returns the stable human name used in diagnostics, e.g. `"ASCII.LL"`.
    #[must_use]
    pub fn inspect(&self) -> String {
        match *self {
            Self::Fixed(enc) => format!("{}.Fixed", enc.name()),
            Self::Var(enc, digits) => format!("{}.{}", enc.name(), "L".repeat(digits)),
            Self::Delimiter(_, name) => format!("{name}Delimiter"),
        }
    }
}

/// Number of decimal digits in `value` (at least one).
#[inline]
const fn decimal_width(value: usize) -> usize {
    let mut width = 1;
    let mut rest = value / 10;
    while rest > 0 {
        width += 1;
        rest /= 10;
    }
    width
}

macro_rules! prefixer_family {
    ($name:ident, $enc:expr) => {
        /// Prefixer family rendering length digits in this encoding.
        pub mod $name {
            use super::{DigitEncoding, Prefixer};

            /// No length prefix; content must fill the spec length exactly.
            pub const FIXED: Prefixer = Prefixer::Fixed($enc);
            /// One-digit length prefix.
            pub const L: Prefixer = Prefixer::Var($enc, 1);
            /// Two-digit length prefix.
            pub const LL: Prefixer = Prefixer::Var($enc, 2);
            /// Three-digit length prefix.
            pub const LLL: Prefixer = Prefixer::Var($enc, 3);
            /// Four-digit length prefix.
            pub const LLLL: Prefixer = Prefixer::Var($enc, 4);
            /// Five-digit length prefix.
            pub const LLLLL: Prefixer = Prefixer::Var($enc, 5);
            /// Six-digit length prefix.
            pub const LLLLLL: Prefixer = Prefixer::Var($enc, 6);
        }
    };
}

prefixer_family!(ascii, DigitEncoding::Ascii);
prefixer_family!(ebcdic, DigitEncoding::Ebcdic);
prefixer_family!(bcd, DigitEncoding::Bcd);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_encode() {
        let prefix = ascii::FIXED.encode_length(4, 4).unwrap();
        assert!(prefix.is_empty());

        let err = ascii::FIXED.encode_length(4, 6).unwrap_err();
        assert_eq!(err.to_string(), "field length: 6 should be fixed: 4");
    }

    #[test]
    fn test_fixed_decode() {
        assert_eq!(ascii::FIXED.decode_length(12, b"whatever").unwrap(), (12, 0));
    }

    #[test]
    fn test_ascii_var_encode() {
        assert_eq!(ascii::LL.encode_length(20, 2).unwrap().as_slice(), b"02");
        assert_eq!(ascii::LLL.encode_length(999, 56).unwrap().as_slice(), b"056");
    }

    #[test]
    fn test_ascii_var_encode_over_max() {
        let err = ascii::LL.encode_length(20, 22).unwrap_err();
        assert_eq!(err.to_string(), "field length: 22 is larger than maximum: 20");
    }

    #[test]
    fn test_ascii_var_encode_over_digit_capacity() {
        let err = ascii::L.encode_length(100, 25).unwrap_err();
        assert_eq!(err.to_string(), "number of digits in length: 25 exceeds: 1");
    }

    #[test]
    fn test_ascii_var_decode() {
        assert_eq!(ascii::LL.decode_length(20, b"12AB").unwrap(), (12, 2));
        assert_eq!(ascii::L.decode_length(4, b"2AB").unwrap(), (2, 1));
    }

    #[test]
    fn test_ascii_var_decode_over_max() {
        let err = ascii::L.decode_length(4, b"7ABCD123").unwrap_err();
        assert_eq!(err.to_string(), "data length: 7 is larger than maximum 4");
    }

    #[test]
    fn test_ascii_var_decode_short_buffer() {
        let err = ascii::LLL.decode_length(100, b"05").unwrap_err();
        assert_eq!(
            err.to_string(),
            "not enough data length: 2 to read: 3 byte digits"
        );
    }

    #[test]
    fn test_ascii_var_decode_non_digit() {
        let err = ascii::LL.decode_length(20, b"1x34").unwrap_err();
        assert_eq!(err, PrefixError::InvalidLengthDigits);
    }

    #[test]
    fn test_ebcdic_var_round_trip() {
        let prefix = ebcdic::LL.encode_length(36, 7).unwrap();
        assert_eq!(prefix.as_slice(), &[0xF0, 0xF7]);

        let mut framed = prefix.to_vec();
        framed.extend_from_slice(&[0u8; 7]);
        assert_eq!(ebcdic::LL.decode_length(36, &framed).unwrap(), (7, 2));
    }

    #[test]
    fn test_bcd_var_round_trip() {
        // Two digits pack into one wire byte.
        let prefix = bcd::LL.encode_length(99, 12).unwrap();
        assert_eq!(prefix.as_slice(), &[0x12]);
        assert_eq!(bcd::LL.decode_length(99, &[0x12, 0xAA]).unwrap(), (12, 1));

        // Three digits pack into two wire bytes with a pad nibble.
        let prefix = bcd::LLL.encode_length(999, 123).unwrap();
        assert_eq!(prefix.as_slice(), &[0x01, 0x23]);
        assert_eq!(bcd::LLL.decode_length(999, &[0x01, 0x23]).unwrap(), (123, 2));
    }

    #[test]
    fn test_var_round_trip_property() {
        let prefixers = [ascii::LL, ascii::LLL, ebcdic::LL, bcd::LLLL];
        for prefixer in prefixers {
            for n in [0usize, 1, 9, 10, 42, 99] {
                let prefix = prefixer.encode_length(99, n).unwrap();
                let mut framed = prefix.to_vec();
                framed.extend(std::iter::repeat(0xF1).take(n));
                let (len, consumed) = prefixer.decode_length(99, &framed).unwrap();
                assert_eq!((len, consumed), (n, prefix.len()), "{}", prefixer.inspect());
            }
        }
    }

    #[test]
    fn test_delimiter_encode() {
        let prefixer = Prefixer::delimiter(0x5C, "ASCIIBackslash");
        assert!(prefixer.encode_length(2, 2).unwrap().is_empty());

        let err = prefixer.encode_length(2, 3).unwrap_err();
        assert_eq!(err.to_string(), "field length: 3 is larger than maximum: 2");
    }

    #[test]
    fn test_delimiter_decode() {
        let prefixer = Prefixer::delimiter(0x5C, "ASCIIBackslash");

        // Sentinel in the last byte.
        assert_eq!(prefixer.decode_length(5, b"Data\\").unwrap(), (5, 0));
        // Sentinel in the middle; length includes the sentinel byte.
        assert_eq!(
            prefixer.decode_length(10, b"Data\\remaining").unwrap(),
            (5, 0)
        );
    }

    #[test]
    fn test_delimiter_not_found() {
        let prefixer = Prefixer::delimiter(0x5C, "ASCIIBackslash");

        let err = prefixer.decode_length(5, b"More data\\").unwrap_err();
        assert_eq!(err.to_string(), "delimiter not found in first 5 bytes");

        let err = prefixer.decode_length(10, b"Total data").unwrap_err();
        assert_eq!(err.to_string(), "delimiter not found");
    }

    #[test]
    fn test_inspect() {
        assert_eq!(ascii::LL.inspect(), "ASCII.LL");
        assert_eq!(ascii::FIXED.inspect(), "ASCII.Fixed");
        assert_eq!(ebcdic::LLL.inspect(), "EBCDIC.LLL");
        assert_eq!(bcd::L.inspect(), "BCD.L");
        assert_eq!(
            Prefixer::delimiter(0x5C, "ASCIIBackslash").inspect(),
            "ASCIIBackslashDelimiter"
        );
    }
}
