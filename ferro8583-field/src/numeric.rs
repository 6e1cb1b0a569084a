/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Numeric field.

use crate::field::{pack_content, unpack_content};
use crate::spec::Spec;
use crate::value::Value;
use ferro8583_core::error::{FieldError, Result};
use std::sync::Arc;

/// Field holding an integral value serialised as decimal digits.
///
/// The spec length counts digits. Values are conventionally left-padded
/// with `'0'` through the spec padding when the field is fixed-length.
#[derive(Debug, Clone)]
pub struct NumericField {
    spec: Arc<Spec>,
    value: Option<i64>,
}

impl NumericField {
    /// Creates an unset field for the spec.
    #[must_use]
    pub fn new(spec: Arc<Spec>) -> Self {
        Self { spec, value: None }
    }

    /// Creates a field holding the given value.
    #[must_use]
    pub fn with_value(spec: Arc<Spec>, value: i64) -> Self {
        Self {
            spec,
            value: Some(value),
        }
    }

    /// Returns the configured spec.
    #[must_use]
    pub fn spec(&self) -> &Arc<Spec> {
        &self.spec
    }

    /// Returns the current value; zero when unset.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.value.unwrap_or_default()
    }

    /// Replaces the current value.
    pub fn set_value(&mut self, value: i64) {
        self.value = Some(value);
    }

    /// Serialises the value to its full wire form, length prefix included.
    ///
    /// # Errors
    /// Returns [`FieldError`] when the value violates the spec constraints.
    pub fn pack(&self) -> Result<Vec<u8>> {
        let mut buffer = itoa::Buffer::new();
        pack_content(&self.spec, buffer.format(self.value()).as_bytes())
    }

    /// Parses a prefix-framed value from the head of `data`.
    ///
    /// # Errors
    /// Returns [`FieldError`] when the buffer is short, malformed, or the
    /// content is not a decimal integer.
    pub fn unpack(&mut self, data: &[u8]) -> Result<usize> {
        let (raw, read) = unpack_content(&self.spec, data)?;
        self.set_bytes(&raw)
            .map_err(|e| FieldError::SetBytes(Box::new(e)))?;
        Ok(read)
    }

    /// Parses raw digit content into the value. Empty content decodes to
    /// zero (a fully padded field unpads to nothing).
    ///
    /// # Errors
    /// Returns [`FieldError::ParseNumber`] for non-decimal content; the
    /// integer parse failure stays reachable through `source()`.
    pub fn set_bytes(&mut self, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            self.value = Some(0);
            return Ok(());
        }
        let parsed = String::from_utf8_lossy(data)
            .parse::<i64>()
            .map_err(FieldError::ParseNumber)?;
        self.value = Some(parsed);
        Ok(())
    }

    /// Emits the value as decimal digit bytes, without padding or prefix.
    ///
    /// # Errors
    /// Infallible for numeric content.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = itoa::Buffer::new();
        Ok(buffer.format(self.value()).as_bytes().to_vec())
    }

    /// Emits the value as decimal digit text.
    ///
    /// # Errors
    /// Infallible for numeric content.
    pub fn string(&self) -> Result<String> {
        let mut buffer = itoa::Buffer::new();
        Ok(buffer.format(self.value()).to_string())
    }

    /// Binds a neutral value; requires [`Value::Int`].
    ///
    /// # Errors
    /// Returns [`FieldError::ValueMismatch`] for any other shape.
    pub fn marshal(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Int(v) => {
                self.value = Some(*v);
                Ok(())
            }
            _ => Err(FieldError::ValueMismatch("int")),
        }
    }

    /// Extracts the value as [`Value::Int`].
    ///
    /// # Errors
    /// Infallible for numeric content.
    pub fn unmarshal(&self) -> Result<Value> {
        Ok(Value::Int(self.value()))
    }

    /// Clears the value.
    pub fn reset(&mut self) {
        self.value = None;
    }

    pub(crate) fn json_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::Value::from(self.value()))
    }

    pub(crate) fn set_json_value(&mut self, value: &serde_json::Value) -> Result<()> {
        let number = value.as_i64().ok_or(FieldError::JsonNotInt)?;
        self.value = Some(number);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferro8583_core::{prefix, Encoding, Pad};
    use std::error::Error as _;

    fn spec(length: usize) -> Arc<Spec> {
        Spec::primitive(length, Encoding::Ascii, prefix::ascii::FIXED).shared()
    }

    #[test]
    fn test_pack() {
        let field = NumericField::with_value(spec(2), 12);
        assert_eq!(field.pack().unwrap(), b"12");
    }

    #[test]
    fn test_pack_padded() {
        let padded = Spec::primitive(5, Encoding::Ascii, prefix::ascii::FIXED)
            .with_pad(Pad::Left(b'0'))
            .shared();
        let field = NumericField::with_value(padded, 42);
        assert_eq!(field.pack().unwrap(), b"00042");
    }

    #[test]
    fn test_unpack() {
        let mut field = NumericField::new(spec(2));
        let read = field.unpack(b"12rest").unwrap();
        assert_eq!(read, 2);
        assert_eq!(field.value(), 12);
    }

    #[test]
    fn test_unpack_padded_to_nothing_is_zero() {
        let padded = Spec::primitive(4, Encoding::Ascii, prefix::ascii::FIXED)
            .with_pad(Pad::Left(b'0'))
            .shared();
        let mut field = NumericField::new(padded);
        field.unpack(b"0000").unwrap();
        assert_eq!(field.value(), 0);
    }

    #[test]
    fn test_unpack_non_digit_error_chain() {
        let mut field = NumericField::new(spec(2));
        let err = field.unpack(b"AB").unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to set bytes: failed to convert into number"
        );

        // The integer parse failure stays reachable through the chain.
        let mut source = err.source();
        let mut found = false;
        while let Some(cause) = source {
            if cause.is::<std::num::ParseIntError>() {
                found = true;
                break;
            }
            source = cause.source();
        }
        assert!(found);
    }

    #[test]
    fn test_bcd_round_trip() {
        let bcd_spec = Spec::primitive(4, Encoding::Bcd, prefix::bcd::FIXED).shared();
        let field = NumericField::with_value(bcd_spec.clone(), 1234);
        let packed = field.pack().unwrap();
        assert_eq!(packed, vec![0x12, 0x34]);

        let mut field = NumericField::new(bcd_spec);
        let read = field.unpack(&packed).unwrap();
        assert_eq!(read, 2);
        assert_eq!(field.value(), 1234);
    }

    #[test]
    fn test_marshal_mismatch() {
        let mut field = NumericField::new(spec(2));
        let err = field.marshal(&Value::String("12".into())).unwrap_err();
        assert_eq!(err.to_string(), "data does not match required int value");
    }

    #[test]
    fn test_json_round_trip() {
        let field = NumericField::with_value(spec(2), 12);
        assert_eq!(field.json_value().unwrap(), serde_json::json!(12));

        let mut field = NumericField::new(spec(2));
        field.set_json_value(&serde_json::json!(14)).unwrap();
        assert_eq!(field.value(), 14);

        let err = field.set_json_value(&serde_json::json!("14")).unwrap_err();
        assert_eq!(err.to_string(), "failed to JSON unmarshal bytes to int");
    }
}
