/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Alphanumeric field.

use crate::field::{pack_content, unpack_content};
use crate::spec::Spec;
use crate::value::Value;
use ferro8583_core::error::{FieldError, Result};
use std::sync::Arc;

/// Field holding alphanumeric content.
///
/// The spec length counts characters of the content encoding.
#[derive(Debug, Clone)]
pub struct StringField {
    spec: Arc<Spec>,
    value: Option<String>,
}

impl StringField {
    /// Creates an unset field for the spec.
    #[must_use]
    pub fn new(spec: Arc<Spec>) -> Self {
        Self { spec, value: None }
    }

    /// Creates a field holding the given value.
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

    /// Returns the current value; empty when unset.
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
    /// Returns [`FieldError`] when the value violates the spec constraints.
    pub fn pack(&self) -> Result<Vec<u8>> {
        pack_content(&self.spec, self.value().as_bytes())
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
    /// Infallible for string content; the `Result` keeps the field contract
    /// uniform.
    pub fn set_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.value = Some(String::from_utf8_lossy(data).into_owned());
        Ok(())
    }

    /// Emits the raw value bytes, without padding or prefix.
    ///
    /// # Errors
    /// Infallible for string content.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        Ok(self.value().as_bytes().to_vec())
    }

    /// Emits the value as text.
    ///
    /// # Errors
    /// Infallible for string content.
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

    /// Extracts the value as [`Value::String`].
    ///
    /// # Errors
    /// Infallible for string content.
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
