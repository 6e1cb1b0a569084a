/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! EBCDIC code page 037 conversion tables.
//!
//! ISO 8583 hosts on IBM mainframes exchange alphanumeric field content in
//! EBCDIC. This module maps the 7-bit ASCII repertoire to code page 037 and
//! back; wire bytes outside the mapped set are rejected rather than
//! substituted so that corrupt fields fail loudly.

/// ASCII (0x00..=0x7F) to EBCDIC code page 037.
const ASCII_TO_EBCDIC: [u8; 128] = [
    0x00, 0x01, 0x02, 0x03, 0x37, 0x2D, 0x2E, 0x2F, // 0x00..=0x07
    0x16, 0x05, 0x25, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F, // 0x08..=0x0F
    0x10, 0x11, 0x12, 0x13, 0x3C, 0x3D, 0x32, 0x26, // 0x10..=0x17
    0x18, 0x19, 0x3F, 0x27, 0x1C, 0x1D, 0x1E, 0x1F, // 0x18..=0x1F
    0x40, 0x5A, 0x7F, 0x7B, 0x5B, 0x6C, 0x50, 0x7D, // ' ' ! " # $ % & '
    0x4D, 0x5D, 0x5C, 0x4E, 0x6B, 0x60, 0x4B, 0x61, // ( ) * + , - . /
    0xF0, 0xF1, 0xF2, 0xF3, 0xF4, 0xF5, 0xF6, 0xF7, // 0..=7
    0xF8, 0xF9, 0x7A, 0x5E, 0x4C, 0x7E, 0x6E, 0x6F, // 8 9 : ; < = > ?
    0x7C, 0xC1, 0xC2, 0xC3, 0xC4, 0xC5, 0xC6, 0xC7, // @ A..=G
    0xC8, 0xC9, 0xD1, 0xD2, 0xD3, 0xD4, 0xD5, 0xD6, // H I J..=O
    0xD7, 0xD8, 0xD9, 0xE2, 0xE3, 0xE4, 0xE5, 0xE6, // P Q R S..=X
    0xE7, 0xE8, 0xE9, 0xBA, 0xE0, 0xBB, 0xB0, 0x6D, // Y Z [ \ ] ^ _
    0x79, 0x81, 0x82, 0x83, 0x84, 0x85, 0x86, 0x87, // ` a..=g
    0x88, 0x89, 0x91, 0x92, 0x93, 0x94, 0x95, 0x96, // h i j..=o
    0x97, 0x98, 0x99, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, // p q r s..=x
    0xA7, 0xA8, 0xA9, 0xC0, 0x4F, 0xD0, 0xA1, 0x07, // y z { | } ~ DEL
];

/// Sentinel marking an EBCDIC byte with no ASCII counterpart.
const UNMAPPED: u8 = 0xFF;

/// EBCDIC code page 037 to ASCII, derived from the forward table.
const EBCDIC_TO_ASCII: [u8; 256] = build_reverse_table();

const fn build_reverse_table() -> [u8; 256] {
    let mut table = [UNMAPPED; 256];
    let mut ascii = 0;
    while ascii < 128 {
        table[ASCII_TO_EBCDIC[ascii] as usize] = ascii as u8;
        ascii += 1;
    }
    table
}

/// Converts a single ASCII byte to its EBCDIC form.
///
/// Returns `None` for bytes above 0x7F.
#[inline]
#[must_use]
pub(crate) const fn from_ascii(byte: u8) -> Option<u8> {
    if byte < 0x80 {
        Some(ASCII_TO_EBCDIC[byte as usize])
    } else {
        None
    }
}

/// Converts a single EBCDIC byte to its ASCII form.
///
/// Returns `None` for bytes outside the mapped code page 037 set.
#[inline]
#[must_use]
pub(crate) const fn to_ascii(byte: u8) -> Option<u8> {
    match EBCDIC_TO_ASCII[byte as usize] {
        UNMAPPED => None,
        ascii => Some(ascii),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits() {
        for (i, d) in (b'0'..=b'9').enumerate() {
            assert_eq!(from_ascii(d), Some(0xF0 + i as u8));
            assert_eq!(to_ascii(0xF0 + i as u8), Some(d));
        }
    }

    #[test]
    fn test_letters() {
        assert_eq!(from_ascii(b'A'), Some(0xC1));
        assert_eq!(from_ascii(b'J'), Some(0xD1));
        assert_eq!(from_ascii(b'S'), Some(0xE2));
        assert_eq!(from_ascii(b'a'), Some(0x81));
        assert_eq!(from_ascii(b'z'), Some(0xA9));
        assert_eq!(to_ascii(0xC1), Some(b'A'));
        assert_eq!(to_ascii(0xA9), Some(b'z'));
    }

    #[test]
    fn test_space_and_punctuation() {
        assert_eq!(from_ascii(b' '), Some(0x40));
        assert_eq!(from_ascii(b'.'), Some(0x4B));
        assert_eq!(from_ascii(b'='), Some(0x7E));
        assert_eq!(to_ascii(0x40), Some(b' '));
    }

    #[test]
    fn test_non_ascii_rejected() {
        assert_eq!(from_ascii(0x80), None);
        assert_eq!(from_ascii(0xFF), None);
    }

    #[test]
    fn test_unmapped_ebcdic_rejected() {
        // 0x41 is a no-break space region byte in cp037, outside the ASCII set.
        assert_eq!(to_ascii(0x41), None);
    }

    #[test]
    fn test_round_trip_all_ascii() {
        for byte in 0u8..=0x7F {
            let ebcdic = from_ascii(byte).unwrap();
            assert_eq!(to_ascii(ebcdic), Some(byte));
        }
    }
}
