/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Composite field: an ordered or TLV-tagged collection of subfields
//! sharing one outer length prefix.
//!
//! Two wire modes, selected by the spec's [`TagSpec`](crate::TagSpec):
//! - **Position-ordered** (`tag.length == 0`): subfields are concatenated
//!   in tag sort order; each subfield's own prefixer frames its content.
//! - **TLV** (`tag.length > 0`): each subfield is preceded by its tag,
//!   padded to the tag width and rendered through the tag encoder.
//!
//! Packing emits only assigned subfields. Unpacking fully resets the field,
//! then consumes exactly the inner length declared by the outer prefix;
//! any shortfall or residue is a framing error.

use crate::field::Field;
use crate::spec::Spec;
use crate::value::Value;
use bytes::BufMut;
use ferro8583_core::error::{FieldError, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::trace;

/// Field holding named subfields under one outer length prefix.
#[derive(Debug, Clone)]
pub struct CompositeField {
    spec: Arc<Spec>,
    ordered_tags: Vec<String>,
    subfields: HashMap<String, Field>,
    set_subfields: HashSet<String>,
}

impl CompositeField {
    /// Creates a composite with fresh subfield instances from the spec.
    ///
    /// # Panics
    /// Panics when the spec violates the composite invariants (content
    /// encoder present, non-`None` padding, or a tag width without a tag
    /// encoder).
    #[must_use]
    pub fn new(spec: Arc<Spec>) -> Self {
        spec.validate_composite();
        let ordered_tags = spec.ordered_tags();
        let subfields = spec.create_subfields();
        Self {
            spec,
            ordered_tags,
            subfields,
            set_subfields: HashSet::new(),
        }
    }

    /// Returns the configured spec.
    #[must_use]
    pub fn spec(&self) -> &Arc<Spec> {
        &self.spec
    }

    /// Returns the subfield instance under `tag`, if declared.
    #[must_use]
    pub fn subfield(&self, tag: &str) -> Option<&Field> {
        self.subfields.get(tag)
    }

    /// Returns the assigned tags in sort order.
    #[must_use]
    pub fn set_tags(&self) -> Vec<&str> {
        self.ordered_tags
            .iter()
            .filter(|tag| self.set_subfields.contains(*tag))
            .map(String::as_str)
            .collect()
    }

    /// Serialises the assigned subfields to the full wire form, outer
    /// length prefix included.
    ///
    /// # Errors
    /// Returns [`FieldError`] when a subfield fails to pack or the inner
    /// length violates the outer framing rule.
    pub fn pack(&self) -> Result<Vec<u8>> {
        let packed = self.pack_subfields()?;
        let prefix = self
            .spec
            .pref
            .encode_length(self.spec.length, packed.len())
            .map_err(FieldError::EncodeLength)?;

        let mut out = Vec::with_capacity(prefix.len() + packed.len());
        out.put_slice(&prefix);
        out.put_slice(&packed);
        Ok(out)
    }

    /// Parses a prefix-framed composite from the head of `data`, returning
    /// the number of bytes consumed. Fully resets the field state first.
    ///
    /// # Errors
    /// Returns [`FieldError`] when the buffer is shorter than the declared
    /// inner length, a subfield fails, or the subfields consume a different
    /// number of bytes than declared.
    pub fn unpack(&mut self, data: &[u8]) -> Result<usize> {
        let (data_len, prefix_len) = self
            .spec
            .pref
            .decode_length(self.spec.length, data)
            .map_err(FieldError::DecodeLength)?;

        if prefix_len + data_len > data.len() {
            return Err(FieldError::NotEnoughData {
                expected: prefix_len + data_len,
                got: data.len(),
            });
        }

        // The subfield loop is unaware of the outer framing, so bound the
        // slice by the declared inner length.
        let read = self.unpack_subfields(&data[prefix_len..prefix_len + data_len])?;
        if read != data_len {
            return Err(FieldError::DataLengthMismatch { data_len, read });
        }

        trace!(field = self.spec.description, read, "unpacked composite");
        Ok(prefix_len + read)
    }

    /// Runs the subfield loop directly on `data`, without an outer prefix.
    ///
    /// # Errors
    /// Returns [`FieldError`] when a subfield fails to unpack.
    pub fn set_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.unpack_subfields(data)?;
        Ok(())
    }

    /// Emits the packed inner bytes without the outer prefix.
    ///
    /// # Errors
    /// Returns [`FieldError`] when a subfield fails to pack.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        self.pack_subfields()
    }

    /// Emits the packed inner bytes as text.
    ///
    /// # Errors
    /// Returns [`FieldError`] when a subfield fails to pack.
    pub fn string(&self) -> Result<String> {
        Ok(String::from_utf8_lossy(&self.bytes()?).into_owned())
    }

    /// Binds a neutral value; requires [`Value::Map`]. Every bound tag is
    /// marked assigned.
    ///
    /// # Errors
    /// Returns [`FieldError::ValueMismatch`] for any other shape, or a
    /// per-subfield bind error.
    pub fn marshal(&mut self, value: &Value) -> Result<()> {
        let entries = value.as_map().ok_or(FieldError::ValueMismatch("map"))?;
        for (tag, child_value) in entries {
            let Some(field) = self.subfields.get_mut(tag) else {
                return Err(FieldError::MarshalSubfield {
                    tag: tag.clone(),
                    source: Box::new(FieldError::FieldNotDefined),
                });
            };
            field
                .marshal(child_value)
                .map_err(|e| FieldError::MarshalSubfield {
                    tag: tag.clone(),
                    source: Box::new(e),
                })?;
            self.set_subfields.insert(tag.clone());
        }
        Ok(())
    }

    /// Extracts the assigned subfields as [`Value::Map`] in sort order.
    ///
    /// # Errors
    /// Returns a per-subfield extraction error.
    pub fn unmarshal(&self) -> Result<Value> {
        let mut entries = Vec::with_capacity(self.set_subfields.len());
        for tag in &self.ordered_tags {
            if !self.set_subfields.contains(tag) {
                continue;
            }
            let field = self
                .subfields
                .get(tag)
                .ok_or_else(|| FieldError::NoSubfield(tag.clone()))?;
            let value = field
                .unmarshal()
                .map_err(|e| FieldError::UnmarshalSubfield {
                    tag: tag.clone(),
                    source: Box::new(e),
                })?;
            entries.push((tag.clone(), value));
        }
        Ok(Value::Map(entries))
    }

    /// Clears the assigned set and rebuilds the subfield instances.
    pub fn reset(&mut self) {
        self.subfields = self.spec.create_subfields();
        self.set_subfields.clear();
    }

    fn pack_subfields(&self) -> Result<Vec<u8>> {
        let tag_spec = self.spec.tag_spec();
        let mut packed = Vec::new();

        for tag in &self.ordered_tags {
            let field = self
                .subfields
                .get(tag)
                .ok_or_else(|| FieldError::NoSubfield(tag.clone()))?;
            if !self.set_subfields.contains(tag) {
                continue;
            }

            if let Some(tag_enc) = tag_spec.enc {
                let tag_bytes = match tag_spec.pad {
                    Some(pad) => pad.pad(tag.as_bytes(), tag_spec.length),
                    None => tag.as_bytes().to_vec(),
                };
                let encoded = tag_enc
                    .encode(&tag_bytes)
                    .map_err(|e| FieldError::PackSubfield {
                        tag: tag.clone(),
                        source: Box::new(FieldError::EncodeTag(e)),
                    })?;
                packed.put_slice(&encoded);
            }

            let bytes = field.pack().map_err(|e| FieldError::PackSubfield {
                tag: tag.clone(),
                source: Box::new(e),
            })?;
            packed.put_slice(&bytes);
        }

        Ok(packed)
    }

    fn unpack_subfields(&mut self, data: &[u8]) -> Result<usize> {
        self.reset();
        if self.spec.tag_spec().enc.is_some() {
            self.unpack_subfields_by_tag(data)
        } else {
            self.unpack_subfields_in_order(data)
        }
    }

    fn unpack_subfields_in_order(&mut self, data: &[u8]) -> Result<usize> {
        let mut offset = 0;
        let tags = self.ordered_tags.clone();
        for tag in tags {
            let Some(field) = self.subfields.get_mut(&tag) else {
                continue;
            };
            let read = field
                .unpack(&data[offset..])
                .map_err(|e| FieldError::UnpackSubfield {
                    tag: tag.clone(),
                    source: Box::new(e),
                })?;
            if read == 0 {
                return Err(FieldError::NoProgress(tag));
            }
            self.set_subfields.insert(tag);
            offset += read;
            if offset >= data.len() {
                break;
            }
        }
        Ok(offset)
    }

    fn unpack_subfields_by_tag(&mut self, data: &[u8]) -> Result<usize> {
        let tag_spec = *self.spec.tag_spec();
        let tag_enc = tag_spec
            .enc
            .expect("TLV subfield mode requires a tag encoder");

        let mut offset = 0;
        while offset < data.len() {
            let (raw_tag, tag_read) = tag_enc
                .decode(&data[offset..], tag_spec.length)
                .map_err(FieldError::DecodeTag)?;
            offset += tag_read;

            let stripped = match tag_spec.pad {
                Some(pad) => pad.unpad(&raw_tag).to_vec(),
                None => raw_tag,
            };
            let tag = String::from_utf8_lossy(&stripped).into_owned();

            let Some(field) = self.subfields.get_mut(&tag) else {
                return Err(FieldError::UnpackSubfield {
                    tag,
                    source: Box::new(FieldError::FieldNotDefined),
                });
            };
            let read = field
                .unpack(&data[offset..])
                .map_err(|e| FieldError::UnpackSubfield {
                    tag: tag.clone(),
                    source: Box::new(e),
                })?;
            if read == 0 {
                return Err(FieldError::NoProgress(tag));
            }
            self.set_subfields.insert(tag);
            offset += read;
        }
        Ok(offset)
    }

    pub(crate) fn json_value(&self) -> Result<serde_json::Value> {
        let mut map = serde_json::Map::new();
        for tag in &self.ordered_tags {
            if !self.set_subfields.contains(tag) {
                continue;
            }
            let field = self
                .subfields
                .get(tag)
                .ok_or_else(|| FieldError::NoSubfield(tag.clone()))?;
            map.insert(tag.clone(), field.json_value()?);
        }
        Ok(serde_json::Value::Object(map))
    }

    pub(crate) fn set_json_value(&mut self, value: &serde_json::Value) -> Result<()> {
        let object = value.as_object().ok_or(FieldError::JsonNotMap)?;
        self.reset();

        for (tag, child) in object {
            if !self.spec.has_subfield(tag) {
                return Err(FieldError::JsonSubfieldNotDefined { tag: tag.clone() });
            }
            let Some(field) = self.subfields.get_mut(tag) else {
                continue;
            };
            field
                .set_json_value(child)
                .map_err(|e| FieldError::JsonUnmarshalSubfield {
                    tag: tag.clone(),
                    source: Box::new(e),
                })?;
            self.set_subfields.insert(tag.clone());
        }
        Ok(())
    }
}
