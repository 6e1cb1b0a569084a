/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Binary field.

use crate::field::{pack_content, unpack_content};
use crate::spec::Spec;
use crate::value::Value;
use ferro8583_core::error::{FieldError, Result};
use std::sync::Arc;

/// Field holding raw bytes.
///
/// The spec length counts bytes. The text and JSON projections render the
/// value as an uppercase hex string.
#[derive(Debug, Clone)]
pub struct BinaryField {
    spec: Arc<Spec>,
    value: Option<Vec<u8>>,
}

impl BinaryField {
    /// Creates an unset field for the spec.
    #[must_use]
    pub fn new(spec: Arc<Spec>) -> Self {
        Self { spec, value: None }
    }

    /// Creates a field holding the given value.
    #[must_use]
    pub fn with_value(spec: Arc<Spec>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            spec,
            value: Some(value.into()),
        }
    }

    /// Returns the configured spec.
    #[must_use]
    pub fn spec(&self) -> &Arc<Spec> {
        &self.spec
    }

    /// Returns the current value; empty when unset.
    #[must_use]
    pub fn value(&self) -> &[u8] {
        self.value.as_deref().unwrap_or_default()
    }

    /// Replaces the current value.
    pub fn set_value(&mut self, value: impl Into<Vec<u8>>) {
        self.value = Some(value.into());
    }

    /// Serialises the value to its full wire form, length prefix included.
    ///
    /// # Errors
    /// Returns [`FieldError`] when the value violates the spec constraints.
    pub fn pack(&self) -> Result<Vec<u8>> {
        pack_content(&self.spec, self.value())
    }

    /// Parses a prefix-framed value from the head of `data`.
    ///
    /// # Errors
    /// Returns [`FieldError`] when the buffer is short or malformed.
    pub fn unpack(&mut self, data: &[u8]) -> Result<usize> {
        let (raw, read) = unpack_content(&self.spec, data)?;
        self.set_bytes(&raw)
            .map_err(|e| FieldError::SetBytes(Box::new(e)))?;
        Ok(read)
    }

    /// Stores raw content as the value.
    ///
    /// # Errors
    /// Infallible for binary content; the `Result` keeps the field contract
    /// uniform.
    pub fn set_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.value = Some(data.to_vec());
        Ok(())
    }

    /// Emits the raw value bytes, without padding or prefix.
    ///
    /// # Errors
    /// Infallible for binary content.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        Ok(self.value().to_vec())
    }

    /// Emits the value as an uppercase hex string.
    ///
    /// # Errors
    /// Infallible for binary content.
    pub fn string(&self) -> Result<String> {
        Ok(hex::encode_upper(self.value()))
    }

    /// Binds a neutral value; requires [`Value::Bytes`].
    ///
    /// # Errors
    /// Returns [`FieldError::ValueMismatch`] for any other shape.
    pub fn marshal(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Bytes(b) => {
                self.value = Some(b.clone());
                Ok(())
            }
            _ => Err(FieldError::ValueMismatch("bytes")),
        }
    }

    /// Extracts the value as [`Value::Bytes`].
    ///
    /// # Errors
    /// Infallible for binary content.
    pub fn unmarshal(&self) -> Result<Value> {
        Ok(Value::Bytes(self.value().to_vec()))
    }

    /// Clears the value.
    pub fn reset(&mut self) {
        self.value = None;
    }

    pub(crate) fn json_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::Value::String(hex::encode_upper(self.value())))
    }

    pub(crate) fn set_json_value(&mut self, value: &serde_json::Value) -> Result<()> {
        let text = value.as_str().ok_or(FieldError::JsonNotString)?;
        let raw = hex::decode(text).map_err(FieldError::ParseHex)?;
        self.value = Some(raw);
        Ok(())
    }
}
