/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! The field variant set and its common contract.
//!
//! [`Field`] is a closed tagged union over the concrete field types. Every
//! variant exposes the same contract:
//! - `pack` / `unpack`: full wire form including the length prefix
//! - `set_bytes` / `bytes` / `string`: raw (prefix-less) forms for nesting
//!   inside frames whose length is already known
//! - `marshal` / `unmarshal`: neutral [`Value`] binding
//! - `marshal_json` / `unmarshal_json`: the JSON projection
//! - `reset`: clear mutable state for instance reuse
//!
//! A field instance carries mutable state and is not safe for concurrent
//! use; construct one instance per task or serialise access. Specs are
//! immutable and freely shared.

use crate::composite::CompositeField;
use crate::multiple_occurrences::MultipleOccurrencesField;
use crate::spec::Spec;
use crate::value::Value;
use crate::{BinaryField, HexField, NumericField, StringField, Track2Field};
use bytes::BufMut;
use ferro8583_core::error::{FieldError, Result};
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// A single ISO 8583 field codec with its value state.
#[derive(Debug, Clone)]
pub enum Field {
    /// Alphanumeric content.
    String(StringField),
    /// Integral content serialised as decimal digits.
    Numeric(NumericField),
    /// Raw byte content.
    Binary(BinaryField),
    /// Hex-string content packed as raw bytes.
    Hex(HexField),
    /// Track 2 magnetic stripe content.
    Track2(Track2Field),
    /// Ordered or TLV-tagged subfield collection.
    Composite(CompositeField),
    /// Repeating subfield layout, one assigned-set per occurrence.
    MultipleOccurrences(MultipleOccurrencesField),
}

macro_rules! dispatch {
    ($value:expr, $field:ident => $body:expr) => {
        match $value {
            Field::String($field) => $body,
            Field::Numeric($field) => $body,
            Field::Binary($field) => $body,
            Field::Hex($field) => $body,
            Field::Track2($field) => $body,
            Field::Composite($field) => $body,
            Field::MultipleOccurrences($field) => $body,
        }
    };
}

impl Field {
    /// Creates a string field for the spec.
    #[must_use]
    pub fn string(spec: Arc<Spec>) -> Self {
        Self::String(StringField::new(spec))
    }

    /// Creates a numeric field for the spec.
    #[must_use]
    pub fn numeric(spec: Arc<Spec>) -> Self {
        Self::Numeric(NumericField::new(spec))
    }

    /// Creates a binary field for the spec.
    #[must_use]
    pub fn binary(spec: Arc<Spec>) -> Self {
        Self::Binary(BinaryField::new(spec))
    }

    /// Creates a hex field for the spec.
    #[must_use]
    pub fn hex(spec: Arc<Spec>) -> Self {
        Self::Hex(HexField::new(spec))
    }

    /// Creates a track 2 field for the spec.
    #[must_use]
    pub fn track2(spec: Arc<Spec>) -> Self {
        Self::Track2(Track2Field::new(spec))
    }

    /// Creates a composite field for the spec.
    ///
    /// # Panics
    /// Panics when the spec violates the composite invariants.
    #[must_use]
    pub fn composite(spec: Arc<Spec>) -> Self {
        Self::Composite(CompositeField::new(spec))
    }

    /// Creates a multiple-occurrences field for the spec.
    ///
    /// # Panics
    /// Panics when the spec violates the composite invariants.
    #[must_use]
    pub fn multiple_occurrences(spec: Arc<Spec>) -> Self {
        Self::MultipleOccurrences(MultipleOccurrencesField::new(spec))
    }

    /// Returns the configured spec.
    #[must_use]
    pub fn spec(&self) -> &Arc<Spec> {
        dispatch!(self, f => f.spec())
    }

    /// Serialises the field to its full wire form, length prefix included.
    ///
    /// # Errors
    /// Returns [`FieldError`] when the value violates the spec constraints.
    pub fn pack(&self) -> Result<Vec<u8>> {
        dispatch!(self, f => f.pack())
    }

    /// Parses a prefix-framed field from the head of `data`, returning the
    /// number of bytes consumed. Fully resets the field state first.
    ///
    /// # Errors
    /// Returns [`FieldError`] when the buffer is short or malformed.
    pub fn unpack(&mut self, data: &[u8]) -> Result<usize> {
        dispatch!(self, f => f.unpack(data))
    }

    /// Stores raw (prefix-less) content into the field value.
    ///
    /// # Errors
    /// Returns [`FieldError`] when the content cannot be parsed.
    pub fn set_bytes(&mut self, data: &[u8]) -> Result<()> {
        dispatch!(self, f => f.set_bytes(data))
    }

    /// Emits the raw (prefix-less) content of the field value.
    ///
    /// # Errors
    /// Returns [`FieldError`] when the value cannot be serialised.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        dispatch!(self, f => f.bytes())
    }

    /// Emits the field content as text (UTF-8 view of [`Field::bytes`]).
    ///
    /// # Errors
    /// Returns [`FieldError`] when the value cannot be serialised.
    pub fn string(&self) -> Result<String> {
        dispatch!(self, f => f.string())
    }

    /// Binds a neutral [`Value`] into the field.
    ///
    /// # Errors
    /// Returns [`FieldError::ValueMismatch`] when the value shape does not
    /// match the field type.
    pub fn marshal(&mut self, value: &Value) -> Result<()> {
        dispatch!(self, f => f.marshal(value))
    }

    /// Extracts the field state as a neutral [`Value`].
    ///
    /// # Errors
    /// Returns [`FieldError`] when a subfield value cannot be extracted.
    pub fn unmarshal(&self) -> Result<Value> {
        dispatch!(self, f => f.unmarshal())
    }

    /// Serialises the field to its canonical JSON form.
    ///
    /// # Errors
    /// Returns [`FieldError`] when the state cannot be projected.
    pub fn marshal_json(&self) -> Result<String> {
        serde_json::to_string(&self.json_value()?).map_err(FieldError::JsonMarshal)
    }

    /// Populates the field from its canonical JSON form. Fully resets the
    /// field state first.
    ///
    /// # Errors
    /// Returns [`FieldError`] when the JSON shape does not match the field.
    pub fn unmarshal_json(&mut self, data: &[u8]) -> Result<()> {
        let value: serde_json::Value =
            serde_json::from_slice(data).map_err(|_| match self {
                Self::Composite(_) => FieldError::JsonNotMap,
                Self::MultipleOccurrences(_) => FieldError::JsonNotMapList,
                Self::Numeric(_) => FieldError::JsonNotInt,
                _ => FieldError::JsonNotString,
            })?;
        self.set_json_value(&value)
    }

    /// Binds a serde-serialisable record through the JSON projection.
    ///
    /// Record members map to subfields via their serialised names, so
    /// `#[serde(rename = "2")]` binds a member to tag `2`; members without a
    /// mapped tag are skipped with `#[serde(skip)]`.
    ///
    /// # Errors
    /// Returns [`FieldError`] when the record does not fit the projection.
    pub fn marshal_record<T: Serialize>(&mut self, record: &T) -> Result<()> {
        let value = serde_json::to_value(record).map_err(FieldError::BindRecord)?;
        self.set_json_value(&value)
    }

    /// Extracts the field state into a serde-deserialisable record through
    /// the JSON projection.
    ///
    /// # Errors
    /// Returns [`FieldError`] when the projection does not fit the record.
    pub fn unmarshal_record<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.json_value()?).map_err(FieldError::BindRecord)
    }

    /// Clears the mutable field state.
    pub fn reset(&mut self) {
        dispatch!(self, f => f.reset());
    }

    pub(crate) fn json_value(&self) -> Result<serde_json::Value> {
        dispatch!(self, f => f.json_value())
    }

    pub(crate) fn set_json_value(&mut self, value: &serde_json::Value) -> Result<()> {
        dispatch!(self, f => f.set_json_value(value))
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.json_value()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl From<StringField> for Field {
    fn from(field: StringField) -> Self {
        Self::String(field)
    }
}

impl From<NumericField> for Field {
    fn from(field: NumericField) -> Self {
        Self::Numeric(field)
    }
}

impl From<BinaryField> for Field {
    fn from(field: BinaryField) -> Self {
        Self::Binary(field)
    }
}

impl From<HexField> for Field {
    fn from(field: HexField) -> Self {
        Self::Hex(field)
    }
}

impl From<Track2Field> for Field {
    fn from(field: Track2Field) -> Self {
        Self::Track2(field)
    }
}

impl From<CompositeField> for Field {
    fn from(field: CompositeField) -> Self {
        Self::Composite(field)
    }
}

impl From<MultipleOccurrencesField> for Field {
    fn from(field: MultipleOccurrencesField) -> Self {
        Self::MultipleOccurrences(field)
    }
}

/// Packs primitive content: pad to the spec length, encode, and frame.
///
/// The length prefix counts content units before encoding (characters,
/// digits, or raw bytes depending on the encoder), matching the unit the
/// decoder hands back to [`unpack_content`].
pub(crate) fn pack_content(spec: &Spec, data: &[u8]) -> Result<Vec<u8>> {
    let padded = match spec.pad {
        Some(pad) => pad.pad(data, spec.length),
        None => data.to_vec(),
    };
    let encoded = spec
        .encoder()
        .encode(&padded)
        .map_err(FieldError::EncodeContent)?;
    let prefix = spec
        .pref
        .encode_length(spec.length, padded.len())
        .map_err(FieldError::EncodeLength)?;

    let mut out = Vec::with_capacity(prefix.len() + encoded.len());
    out.put_slice(&prefix);
    out.put_slice(&encoded);
    Ok(out)
}

/// Unpacks primitive content: read the prefix, decode, and unpad.
///
/// Returns the raw value bytes and the total bytes consumed.
pub(crate) fn unpack_content(spec: &Spec, data: &[u8]) -> Result<(Vec<u8>, usize)> {
    let (want, prefix_len) = spec
        .pref
        .decode_length(spec.length, data)
        .map_err(FieldError::DecodeLength)?;
    let (raw, read) = spec
        .encoder()
        .decode(&data[prefix_len..], want)
        .map_err(FieldError::DecodeContent)?;
    let raw = match spec.pad {
        Some(pad) => pad.unpad(&raw).to_vec(),
        None => raw,
    };
    Ok((raw, prefix_len + read))
}
