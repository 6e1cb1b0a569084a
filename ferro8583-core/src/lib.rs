/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # Ferro8583 Core
//!
//! Codec primitives and error definitions for the ferro8583 ISO 8583 engine.
//!
//! This crate provides the cross-cutting building blocks the field layer
//! composes:
//! - **Encoders**: byte transforms between in-memory values and wire bytes
//!   (ASCII, Text, Binary, BCD, EBCDIC, Hex)
//! - **Prefixers**: variable-length framing (fixed, `L`…`LLLLLL` decimal
//!   prefixes, delimiter-terminated)
//! - **Padding**: fill policies for fixed-length content
//! - **Sort orders**: deterministic subfield iteration for composites
//! - **Error types**: unified error handling with `thiserror`
//!
//! All primitives are stateless value objects, safe to share freely.

pub mod encoding;
pub mod error;
pub mod padding;
pub mod prefix;
pub mod sort;

mod ebcdic;

pub use encoding::Encoding;
pub use error::{EncodingError, FieldError, PrefixError, Result};
pub use padding::Pad;
pub use prefix::{DigitEncoding, LengthPrefix, Prefixer};
pub use sort::Sort;
