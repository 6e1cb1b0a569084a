/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Tag sort orders for composite subfields.
//!
//! A [`Sort`] is a total ordering over subfield tag names. Packing and the
//! JSON projection both iterate subfields in this order, so it is part of
//! the wire contract, not a cosmetic choice.

use std::cmp::Ordering;

/// Total ordering over subfield tag names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    /// Plain lexicographic order.
    Strings,
    /// Numeric order for decimal tag names ("2" before "11"); tags that do
    /// not parse fall back to lexicographic order.
    StringsByInt,
    /// Numeric order for hexadecimal tag names; non-hex tags fall back to
    /// lexicographic order.
    StringsByHex,
}

impl Sort {
    /// Compares two tag names under this order.
    #[must_use]
    pub fn cmp(self, a: &str, b: &str) -> Ordering {
        match self {
            Self::Strings => a.cmp(b),
            Self::StringsByInt => match (a.parse::<u64>(), b.parse::<u64>()) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => a.cmp(b),
            },
            Self::StringsByHex => {
                match (u64::from_str_radix(a, 16), u64::from_str_radix(b, 16)) {
                    (Ok(x), Ok(y)) => x.cmp(&y),
                    _ => a.cmp(b),
                }
            }
        }
    }

    /// Sorts a list of tag names in place under this order.
    pub fn sort(self, tags: &mut [String]) {
        tags.sort_by(|a, b| self.cmp(a, b));
    }
}
