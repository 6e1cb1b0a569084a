/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Track 2 magnetic stripe field.
//!
//! Track 2 data carries the primary account number, a separator (`=` or
//! `D`), a YYMM expiration date, a service code, and issuer discretionary
//! data:
//!
//! ```text
//! 4000340000000506=2512111123400001230
//! ```
//!
//! The expiration date and service code positions may each hold a literal
//! `=` meaning "not present".

use crate::field::{pack_content, unpack_content};
use crate::spec::Spec;
use crate::value::Value;
use chrono::{Datelike, NaiveDate};
use ferro8583_core::error::{FieldError, Result};
use std::sync::Arc;

/// Maximum primary account number length in digits.
const PAN_MAX_DIGITS: usize = 19;

/// Parsed track 2 components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track2Data {
    /// Primary account number, 1 to 19 digits.
    pub primary_account_number: String,
    /// Field separator, `'='` or `'D'`.
    pub separator: char,
    /// Expiration date; `None` when the wire carries `=`.
    pub expiration_date: Option<NaiveDate>,
    /// Three-digit service code; empty when the wire carries `=`.
    pub service_code: String,
    /// Issuer discretionary data.
    pub discretionary_data: String,
}

impl Default for Track2Data {
    fn default() -> Self {
        Self {
            primary_account_number: String::new(),
            separator: '=',
            expiration_date: None,
            service_code: String::new(),
            discretionary_data: String::new(),
        }
    }
}

impl Track2Data {
    /// Renders the components back into wire text.
    #[must_use]
    pub fn serialize(&self) -> String {
        let mut out = String::with_capacity(40);
        out.push_str(&self.primary_account_number);
        out.push(self.separator);
        match self.expiration_date {
            Some(date) => {
                out.push_str(&format!("{:02}{:02}", date.year() % 100, date.month()));
            }
            None => out.push('='),
        }
        if self.service_code.is_empty() {
            out.push('=');
        } else {
            out.push_str(&self.service_code);
        }
        out.push_str(&self.discretionary_data);
        out
    }

    /// Parses wire text into components.
    ///
    /// # Errors
    /// Returns [`FieldError::InvalidTrackData`] when the layout does not
    /// match, or [`FieldError::InvalidExpirationDate`] for a bad YYMM value.
    pub fn parse(text: &str) -> Result<Self> {
        let bytes = text.as_bytes();
        let mut pos = 0;

        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos == 0 || pos > PAN_MAX_DIGITS {
            return Err(FieldError::InvalidTrackData);
        }
        let primary_account_number = text[..pos].to_string();

        let separator = match bytes.get(pos) {
            Some(b'=') => '=',
            Some(b'D') => 'D',
            _ => return Err(FieldError::InvalidTrackData),
        };
        pos += 1;

        let expiration_date = if bytes.get(pos) == Some(&b'=') {
            pos += 1;
            None
        } else {
            if bytes.len() < pos + 4 || !bytes[pos..pos + 4].iter().all(u8::is_ascii_digit) {
                return Err(FieldError::InvalidTrackData);
            }
            let year = 2000 + (text[pos..pos + 2].parse::<i32>().unwrap_or_default());
            let month: u32 = text[pos + 2..pos + 4].parse().unwrap_or_default();
            pos += 4;
            Some(
                NaiveDate::from_ymd_opt(year, month, 1)
                    .ok_or(FieldError::InvalidExpirationDate)?,
            )
        };

        let service_code = if bytes.get(pos) == Some(&b'=') {
            pos += 1;
            String::new()
        } else {
            if bytes.len() < pos + 3 || !bytes[pos..pos + 3].iter().all(u8::is_ascii_digit) {
                return Err(FieldError::InvalidTrackData);
            }
            let code = text[pos..pos + 3].to_string();
            pos += 3;
            code
        };

        let discretionary_data = &text[pos..];
        if discretionary_data.is_empty() || discretionary_data.contains('?') {
            return Err(FieldError::InvalidTrackData);
        }

        Ok(Self {
            primary_account_number,
            separator,
            expiration_date,
            service_code,
            discretionary_data: discretionary_data.to_string(),
        })
    }
}

/// Field holding track 2 magnetic stripe data.
///
/// The spec length counts characters of the serialised track.
#[derive(Debug, Clone)]
pub struct Track2Field {
    spec: Arc<Spec>,
    data: Option<Track2Data>,
}

impl Track2Field {
    /// Creates an unset field for the spec.
    #[must_use]
    pub fn new(spec: Arc<Spec>) -> Self {
        Self { spec, data: None }
    }

    /// Creates a field holding the given components.
    #[must_use]
    pub fn with_data(spec: Arc<Spec>, data: Track2Data) -> Self {
        Self {
            spec,
            data: Some(data),
        }
    }

    /// Returns the configured spec.
    #[must_use]
    pub fn spec(&self) -> &Arc<Spec> {
        &self.spec
    }

    /// Returns the parsed components, if set.
    #[must_use]
    pub fn data(&self) -> Option<&Track2Data> {
        self.data.as_ref()
    }

    /// Replaces the components.
    pub fn set_data(&mut self, data: Track2Data) {
        self.data = Some(data);
    }

    fn serialized(&self) -> String {
        self.data
            .as_ref()
            .map(Track2Data::serialize)
            .unwrap_or_default()
    }

    /// Serialises the track to its full wire form, length prefix included.
    ///
    /// # Errors
    /// Returns [`FieldError`] when the track violates the spec constraints.
    pub fn pack(&self) -> Result<Vec<u8>> {
        pack_content(self.spec(), self.serialized().as_bytes())
    }

    /// Parses a prefix-framed track from the head of `data`.
    ///
    /// # Errors
    /// Returns [`FieldError`] when the buffer is short or the track layout
    /// is malformed.
    pub fn unpack(&mut self, data: &[u8]) -> Result<usize> {
        let (raw, read) = unpack_content(self.spec(), data)?;
        self.set_bytes(&raw)
            .map_err(|e| FieldError::SetBytes(Box::new(e)))?;
        Ok(read)
    }

    /// Parses raw track content into components. Empty content clears the
    /// field instead of erroring.
    ///
    /// # Errors
    /// Returns [`FieldError::InvalidTrackData`] for malformed content.
    pub fn set_bytes(&mut self, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            self.data = None;
            return Ok(());
        }
        let text = std::str::from_utf8(data).map_err(|_| FieldError::InvalidTrackData)?;
        self.data = Some(Track2Data::parse(text)?);
        Ok(())
    }

    /// Emits the serialised track bytes, without padding or prefix.
    ///
    /// # Errors
    /// Infallible for track content.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        Ok(self.serialized().into_bytes())
    }

    /// Emits the serialised track text.
    ///
    /// # Errors
    /// Infallible for track content.
    pub fn string(&self) -> Result<String> {
        Ok(self.serialized())
    }

    /// Binds a neutral value; requires [`Value::String`] holding a track.
    ///
    /// # Errors
    /// Returns [`FieldError::ValueMismatch`] for any other shape, or a
    /// track parse error for malformed content.
    pub fn marshal(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::String(s) => self.set_bytes(s.as_bytes()),
            _ => Err(FieldError::ValueMismatch("string")),
        }
    }

    /// Extracts the serialised track as [`Value::String`].
    ///
    /// # Errors
    /// Infallible for track content.
    pub fn unmarshal(&self) -> Result<Value> {
        Ok(Value::String(self.serialized()))
    }

    /// Clears the components.
    pub fn reset(&mut self) {
        self.data = None;
    }

    pub(crate) fn json_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::Value::String(self.serialized()))
    }

    pub(crate) fn set_json_value(&mut self, value: &serde_json::Value) -> Result<()> {
        let text = value.as_str().ok_or(FieldError::JsonNotString)?;
        self.set_bytes(text.as_bytes())
    }
}
