/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # Ferro8583 Field
//!
//! ISO 8583 field codecs for the ferro8583 engine.
//!
//! This crate provides the field layer built on the `ferro8583-core`
//! primitives:
//! - **Specs**: [`Spec`] / [`TagSpec`], the immutable serialisation
//!   description shared across field instances
//! - **Primitive fields**: [`StringField`], [`NumericField`],
//!   [`BinaryField`], [`HexField`], [`Track2Field`]
//! - **Composite fields**: [`CompositeField`] (position-ordered or TLV) and
//!   [`MultipleOccurrencesField`] (repeating layout)
//! - **Binding**: the neutral [`Value`] tree plus serde record adapters
//! - **JSON projection**: canonical JSON keyed by subfield tag or
//!   occurrence index, in deterministic tag sort order
//!
//! ## Thread Safety
//!
//! Specs are immutable and freely shared. Field instances carry mutable
//! state (values, assigned sets, occurrence lists) and are **not** safe for
//! concurrent use; construct one instance per task or serialise access.

pub mod binary;
pub mod composite;
pub mod field;
pub mod hex;
pub mod multiple_occurrences;
pub mod numeric;
pub mod spec;
pub mod string;
pub mod track2;
pub mod value;

pub use binary::BinaryField;
pub use composite::CompositeField;
pub use field::Field;
pub use hex::HexField;
pub use multiple_occurrences::MultipleOccurrencesField;
pub use numeric::NumericField;
pub use spec::{Spec, TagSpec};
pub use string::StringField;
pub use track2::{Track2Data, Track2Field};
pub use value::Value;
