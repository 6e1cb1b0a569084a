/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Hex field.

use crate::field::{pack_content, unpack_content};
use crate::spec::Spec;
use crate::value::Value;
use ferro8583_core::error::{FieldError, Result};
use std::sync::Arc;

/// Field holding a hex string packed as raw bytes.
///
/// Under the hood this is a binary field: the in-memory value is an
/// uppercase hex string, the wire form is the raw bytes it denotes, and the
/// spec length counts those raw bytes. Conventionally paired with
/// [`Encoding::Binary`](ferro8583_core::Encoding::Binary).
#[derive(Debug, Clone)]
pub struct HexField {
    spec: Arc<Spec>,
    value: Option<String>,
}

impl HexField {
    /// Creates an unset field for the spec.
    #[must_use]
    pub fn new(spec: Arc<Spec>) -> Self {
        Self { spec, value: None }
    }

    /// Creates a field holding the given hex string.
    #[must_use]
    pub fn with_value(spec: Arc<Spec>, value: impl Into<String>) -> Self {
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

    /// Returns the current hex string; empty when unset.
    #[must_use]
    pub fn value(&self) -> &str {
        self.value.as_deref().unwrap_or_default()
    }

    /// Replaces the current value.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = Some(value.into());
    }

    /// Serialises the value to its full wire form, length prefix included.
    ///
    /// # Errors
    /// Returns [`FieldError::ParseHex`] when the value is not a valid hex
    /// string, or a framing error when it violates the spec constraints.
    pub fn pack(&self) -> Result<Vec<u8>> {
        let raw = hex::decode(self.value()).map_err(FieldError::ParseHex)?;
        pack_content(&self.spec, &raw)
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

    /// Stores raw wire bytes, re-rendered as an uppercase hex string.
    ///
    /// # Errors
    /// Infallible for hex content; the `Result` keeps the field contract
    /// uniform.
    pub fn set_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.value = Some(hex::encode_upper(data));
        Ok(())
    }

    /// Emits the raw bytes the hex string denotes.
    ///
    /// # Errors
    /// Returns [`FieldError::ParseHex`] when the value is not a valid hex
    /// string.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        hex::decode(self.value()).map_err(FieldError::ParseHex)
    }

    /// Emits the hex string itself.
    ///
    /// # Errors
    /// Infallible for hex content.
    pub fn string(&self) -> Result<String> {
        Ok(self.value().to_string())
    }

    /// Binds a neutral value; requires [`Value::String`].
    ///
    /// # Errors
    /// Returns [`FieldError::ValueMismatch`] for any other shape.
    pub fn marshal(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::String(s) => {
                self.value = Some(s.clone());
                Ok(())
            }
            _ => Err(FieldError::ValueMismatch("string")),
        }
    }

    /// Extracts the hex string as [`Value::String`].
    ///
    /// # Errors
    /// Infallible for hex content.
    pub fn unmarshal(&self) -> Result<Value> {
        Ok(Value::String(self.value().to_string()))
    }

    /// Clears the value.
    pub fn reset(&mut self) {
        self.value = None;
    }

    pub(crate) fn json_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::Value::String(self.value().to_string()))
    }

    pub(crate) fn set_json_value(&mut self, value: &serde_json::Value) -> Result<()> {
        let text = value.as_str().ok_or(FieldError::JsonNotString)?;
        self.value = Some(text.to_string());
        Ok(())
    }
}
