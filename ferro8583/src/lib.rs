/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # Ferro8583
//!
//! An ISO 8583 field codec engine for Rust.
//!
//! Ferro8583 implements the field layer of ISO 8583: typed field values,
//! their bit-exact pack/unpack contracts, and the cross-cutting codec
//! primitives they compose (character encoders, length prefixers, and
//! composite assembly). Message framing (MTI, bitmaps) and network transport
//! belong to an outer driver.
//!
//! ## Features
//!
//! - **Closed codec vocabulary**: encoders, prefixers, paddings, and sort
//!   orders are tagged unions, not open hierarchies
//! - **Shared immutable specs**: one `Arc<Spec>` serves any number of field
//!   instances
//! - **Exact error contract**: framing and content errors carry stable,
//!   test-observable messages
//! - **JSON projection**: canonical JSON with deterministic key order
//!
//! ## Quick Start
//!
//! ```rust
//! use ferro8583::prelude::*;
//!
//! let spec = Spec::composite(
//!     6,
//!     prefix::ascii::FIXED,
//!     TagSpec::positional(Sort::StringsByInt),
//! )
//! .with_subfield(
//!     "1",
//!     Field::string(Spec::primitive(2, Encoding::Ascii, prefix::ascii::FIXED).shared()),
//! )
//! .with_subfield(
//!     "2",
//!     Field::string(Spec::primitive(2, Encoding::Ascii, prefix::ascii::FIXED).shared()),
//! )
//! .with_subfield(
//!     "3",
//!     Field::numeric(Spec::primitive(2, Encoding::Ascii, prefix::ascii::FIXED).shared()),
//! )
//! .shared();
//!
//! let mut field = Field::composite(spec);
//! field.unpack(b"ABCD12").unwrap();
//! assert_eq!(field.marshal_json().unwrap(), r#"{"1":"AB","2":"CD","3":12}"#);
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`]: codec primitives (encoders, prefixers, padding, sort orders)
//!   and error definitions
//! - [`field`]: field specs, primitive and composite field codecs, value
//!   binding, and the JSON projection

pub mod core {
    //! Codec primitives and error definitions.
    pub use ferro8583_core::*;
}

pub mod field {
    //! Field specs, codecs, value binding, and the JSON projection.
    pub use ferro8583_field::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Codec primitives
    pub use ferro8583_core::{
        prefix, DigitEncoding, Encoding, EncodingError, FieldError, Pad, PrefixError, Prefixer,
        Result, Sort,
    };

    // Field layer
    pub use ferro8583_field::{
        BinaryField, CompositeField, Field, HexField, MultipleOccurrencesField, NumericField,
        Spec, StringField, Track2Data, Track2Field, TagSpec, Value,
    };
}
