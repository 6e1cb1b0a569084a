/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Multiple-occurrences field: a composite whose subfield layout repeats
//! an unbounded number of times within one outer length prefix.
//!
//! Each repetition is an *occurrence* with its own assigned-set. Some ISO
//! 8583 fields use this to carry one record per related entity, for
//! example a currency-exponent field with one occurrence per currency code
//! used in the message.
//!
//! TLV subfield mode cannot repeat (tag order no longer delimits
//! occurrences), so both pack and unpack reject specs with a tag encoder.

use crate::field::Field;
use crate::spec::Spec;
use crate::value::Value;
use bytes::BufMut;
use ferro8583_core::error::{FieldError, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::trace;

/// One repetition of the subfield layout.
#[derive(Debug, Clone)]
struct Occurrence {
    subfields: HashMap<String, Field>,
    set_subfields: HashSet<String>,
}

impl Occurrence {
    fn new(spec: &Spec) -> Self {
        Self {
            subfields: spec.create_subfields(),
            set_subfields: HashSet::new(),
        }
    }
}

/// Field holding a repeating subfield layout under one outer length prefix.
#[derive(Debug, Clone)]
pub struct MultipleOccurrencesField {
    spec: Arc<Spec>,
    ordered_tags: Vec<String>,
    occurrences: Vec<Occurrence>,
}

impl MultipleOccurrencesField {
    /// Creates the field with a single empty occurrence.
    ///
    /// # Panics
    /// Panics when the spec violates the composite invariants.
    #[must_use]
    pub fn new(spec: Arc<Spec>) -> Self {
        spec.validate_composite();
        let ordered_tags = spec.ordered_tags();
        let occurrences = vec![Occurrence::new(&spec)];
        Self {
            spec,
            ordered_tags,
            occurrences,
        }
    }

    /// Returns the configured spec.
    #[must_use]
    pub fn spec(&self) -> &Arc<Spec> {
        &self.spec
    }

    /// Returns the number of occurrences currently held.
    #[must_use]
    pub fn occurrence_count(&self) -> usize {
        self.occurrences.len()
    }

    /// Returns the subfield instance under `tag` in the given occurrence.
    #[must_use]
    pub fn subfield(&self, occurrence: usize, tag: &str) -> Option<&Field> {
        self.occurrences.get(occurrence)?.subfields.get(tag)
    }

    /// Serialises all occurrences to the full wire form, outer length
    /// prefix included.
    ///
    /// # Errors
    /// Returns [`FieldError::TlvPacking`] for TLV specs, or a subfield /
    /// framing error.
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

    /// Parses a prefix-framed field from the head of `data`, allocating
    /// occurrences until the declared inner length is consumed. Fully
    /// resets the field state first.
    ///
    /// For variable-length outer framing, the final pass may stop mid-pass
    /// once the inner length is exhausted; fixed framing requires complete
    /// passes.
    ///
    /// # Errors
    /// Returns [`FieldError::TlvUnpacking`] for TLV specs, or a subfield /
    /// framing error.
    pub fn unpack(&mut self, data: &[u8]) -> Result<usize> {
        let (data_len, prefix_len) = self
            .spec
            .pref
            .decode_length(self.spec.length, data)
            .map_err(FieldError::DecodeLength)?;

        // A consumed prefix marks variable-length outer framing, which
        // permits the last occurrence to end mid-pass.
        let is_variable_length = prefix_len != 0;

        if prefix_len + data_len > data.len() {
            return Err(FieldError::NotEnoughData {
                expected: prefix_len + data_len,
                got: data.len(),
            });
        }

        let read =
            self.unpack_occurrences(&data[prefix_len..prefix_len + data_len], is_variable_length)?;
        if read != data_len {
            return Err(FieldError::DataLengthMismatch { data_len, read });
        }

        trace!(
            field = self.spec.description,
            occurrences = self.occurrences.len(),
            read,
            "unpacked occurrences"
        );
        Ok(prefix_len + read)
    }

    /// Runs the occurrence loop directly on `data`, without an outer
    /// prefix. Every pass must complete.
    ///
    /// # Errors
    /// Returns [`FieldError::TlvUnpacking`] for TLV specs, or a subfield
    /// error.
    pub fn set_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.unpack_occurrences(data, false)?;
        Ok(())
    }

    /// Emits the packed occurrences without the outer prefix.
    ///
    /// # Errors
    /// Returns [`FieldError::TlvPacking`] for TLV specs, or a subfield
    /// error.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        self.pack_subfields()
    }

    /// Emits the packed occurrences as text.
    ///
    /// # Errors
    /// Returns [`FieldError::TlvPacking`] for TLV specs, or a subfield
    /// error.
    pub fn string(&self) -> Result<String> {
        Ok(String::from_utf8_lossy(&self.bytes()?).into_owned())
    }

    /// Binds a neutral value; requires [`Value::List`] with one
    /// [`Value::Map`] per occurrence. Occurrences are allocated as needed.
    ///
    /// # Errors
    /// Returns [`FieldError::ValueMismatch`] for any other shape, or a
    /// per-subfield bind error.
    pub fn marshal(&mut self, value: &Value) -> Result<()> {
        let items = value.as_list().ok_or(FieldError::ValueMismatch("list"))?;

        for (index, item) in items.iter().enumerate() {
            let entries = item.as_map().ok_or(FieldError::ValueMismatch("map"))?;
            if self.occurrences.len() <= index {
                self.occurrences.push(Occurrence::new(&self.spec));
            }
            let occurrence = &mut self.occurrences[index];

            for (tag, child_value) in entries {
                let Some(field) = occurrence.subfields.get_mut(tag) else {
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
                occurrence.set_subfields.insert(tag.clone());
            }
        }
        Ok(())
    }

    /// Extracts the occurrences as [`Value::List`] of maps, each holding
    /// its assigned subfields in sort order.
    ///
    /// # Errors
    /// Returns a per-subfield extraction error.
    pub fn unmarshal(&self) -> Result<Value> {
        let mut items = Vec::with_capacity(self.occurrences.len());
        for occurrence in &self.occurrences {
            let mut entries = Vec::with_capacity(occurrence.set_subfields.len());
            for tag in &self.ordered_tags {
                if !occurrence.set_subfields.contains(tag) {
                    continue;
                }
                let field = occurrence
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
            items.push(Value::Map(entries));
        }
        Ok(Value::List(items))
    }

    /// Drops all occurrences and restores a single empty one.
    pub fn reset(&mut self) {
        self.occurrences = vec![Occurrence::new(&self.spec)];
    }

    fn pack_subfields(&self) -> Result<Vec<u8>> {
        if self.spec.tag_spec().enc.is_some() {
            return Err(FieldError::TlvPacking);
        }

        let mut packed = Vec::new();
        for occurrence in &self.occurrences {
            for tag in &self.ordered_tags {
                let field = occurrence
                    .subfields
                    .get(tag)
                    .ok_or_else(|| FieldError::NoSubfield(tag.clone()))?;
                if !occurrence.set_subfields.contains(tag) {
                    continue;
                }
                let bytes = field.pack().map_err(|e| FieldError::PackSubfield {
                    tag: tag.clone(),
                    source: Box::new(e),
                })?;
                packed.put_slice(&bytes);
            }
        }
        Ok(packed)
    }

    fn unpack_occurrences(&mut self, data: &[u8], is_variable_length: bool) -> Result<usize> {
        if self.spec.tag_spec().enc.is_some() {
            return Err(FieldError::TlvUnpacking);
        }
        self.reset();

        let tags = self.ordered_tags.clone();
        let mut offset = 0;
        let mut index = 0;

        while offset < data.len() {
            let pass_start = offset;
            for tag in &tags {
                let Some(field) = self.occurrences[index].subfields.get_mut(tag) else {
                    continue;
                };
                let read = field
                    .unpack(&data[offset..])
                    .map_err(|e| FieldError::UnpackSubfield {
                        tag: tag.clone(),
                        source: Box::new(e),
                    })?;
                if read == 0 {
                    return Err(FieldError::NoProgress(tag.clone()));
                }
                self.occurrences[index].set_subfields.insert(tag.clone());
                offset += read;

                if is_variable_length && offset >= data.len() {
                    return Ok(offset);
                }
            }

            // A pass that consumed nothing (empty layout) cannot make
            // progress; leave the remainder to the framing check.
            if offset >= data.len() || offset == pass_start {
                break;
            }
            self.occurrences.push(Occurrence::new(&self.spec));
            index += 1;
        }

        Ok(offset)
    }

    pub(crate) fn json_value(&self) -> Result<serde_json::Value> {
        let mut items = Vec::with_capacity(self.occurrences.len());
        for occurrence in &self.occurrences {
            let mut map = serde_json::Map::new();
            for tag in &self.ordered_tags {
                if !occurrence.set_subfields.contains(tag) {
                    continue;
                }
                let field = occurrence
                    .subfields
                    .get(tag)
                    .ok_or_else(|| FieldError::NoSubfield(tag.clone()))?;
                map.insert(tag.clone(), field.json_value()?);
            }
            items.push(serde_json::Value::Object(map));
        }
        Ok(serde_json::Value::Array(items))
    }

    pub(crate) fn set_json_value(&mut self, value: &serde_json::Value) -> Result<()> {
        let items = value.as_array().ok_or(FieldError::JsonNotMapList)?;
        self.reset();

        for (index, item) in items.iter().enumerate() {
            let object = item.as_object().ok_or(FieldError::JsonNotMapList)?;
            if self.occurrences.len() <= index {
                self.occurrences.push(Occurrence::new(&self.spec));
            }

            for (tag, child) in object {
                if !self.spec.has_subfield(tag) {
                    return Err(FieldError::JsonSubfieldNotDefined { tag: tag.clone() });
                }
                let Some(field) = self.occurrences[index].subfields.get_mut(tag) else {
                    continue;
                };
                field
                    .set_json_value(child)
                    .map_err(|e| FieldError::JsonUnmarshalSubfield {
                        tag: tag.clone(),
                        source: Box::new(e),
                    })?;
                self.occurrences[index].set_subfields.insert(tag.clone());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::CompositeField;
    use crate::spec::TagSpec;
    use crate::value;
    use crate::{NumericField, StringField};
    use ferro8583_core::{prefix, Encoding, Pad, Prefixer, Sort};

    fn string_child(pref: Prefixer) -> Field {
        StringField::new(
            Spec::primitive(2, Encoding::Ascii, pref)
                .with_description("String Field")
                .shared(),
        )
        .into()
    }

    fn numeric_child(pref: Prefixer) -> Field {
        NumericField::new(
            Spec::primitive(2, Encoding::Ascii, pref)
                .with_description("Numeric Field")
                .shared(),
        )
        .into()
    }

    fn fixed_len_spec() -> Arc<Spec> {
        Spec::composite(
            12,
            prefix::ascii::FIXED,
            TagSpec::positional(Sort::StringsByInt),
        )
        .with_description("Test Spec")
        .with_subfield("1", string_child(prefix::ascii::FIXED))
        .with_subfield("2", string_child(prefix::ascii::FIXED))
        .with_subfield("3", numeric_child(prefix::ascii::FIXED))
        .shared()
    }

    fn variable_len_spec() -> Arc<Spec> {
        let sub_composite = Spec::composite(
            6,
            prefix::ascii::LL,
            TagSpec::tlv(2, Encoding::Ascii, Sort::StringsByInt).with_pad(Pad::Left(b'0')),
        )
        .with_description("Sub-Composite Field")
        .with_subfield("1", string_child(prefix::ascii::LL))
        .shared();

        Spec::composite(
            36,
            prefix::ascii::LL,
            TagSpec::positional(Sort::StringsByInt),
        )
        .with_description("Test Spec")
        .with_subfield("1", string_child(prefix::ascii::LL))
        .with_subfield("2", string_child(prefix::ascii::LL))
        .with_subfield("3", numeric_child(prefix::ascii::LL))
        .with_subfield("11", CompositeField::new(sub_composite).into())
        .shared()
    }

    fn occurrence(values: [(&str, Value); 3]) -> Value {
        value::map(values)
    }

    #[test]
    fn test_pack_two_occurrences() {
        let mut field = MultipleOccurrencesField::new(fixed_len_spec());
        field
            .marshal(&Value::List(vec![
                occurrence([("1", "AB".into()), ("2", "CD".into()), ("3", 12.into())]),
                occurrence([("1", "CD".into()), ("2", "EF".into()), ("3", 14.into())]),
            ]))
            .unwrap();

        assert_eq!(field.pack().unwrap(), b"ABCD12CDEF14");
    }

    #[test]
    fn test_pack_subfield_failure_is_wrapped() {
        let mut field = MultipleOccurrencesField::new(fixed_len_spec());
        field
            .marshal(&Value::List(vec![occurrence([
                ("1", "ABCD".into()),
                ("2", "CD".into()),
                ("3", 12.into()),
            ])]))
            .unwrap();

        let err = field.pack().unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to pack subfield 1: failed to encode length: field length: 4 should be fixed: 2"
        );
    }

    #[test]
    fn test_pack_outer_overflow() {
        let invalid = Spec::composite(
            4,
            prefix::ascii::FIXED,
            TagSpec::positional(Sort::StringsByInt),
        )
        .with_subfield("1", string_child(prefix::ascii::FIXED))
        .with_subfield("2", string_child(prefix::ascii::FIXED))
        .with_subfield("3", numeric_child(prefix::ascii::FIXED))
        .shared();

        let mut field = MultipleOccurrencesField::new(invalid);
        field
            .marshal(&Value::List(vec![occurrence([
                ("1", "AB".into()),
                ("2", "CD".into()),
                ("3", 12.into()),
            ])]))
            .unwrap();

        let err = field.pack().unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to encode length: field length: 6 should be fixed: 4"
        );
    }

    #[test]
    fn test_pack_rejects_tlv_subfields() {
        let tlv = Spec::composite(
            4,
            prefix::ascii::FIXED,
            TagSpec::tlv(2, Encoding::Ascii, Sort::StringsByInt),
        )
        .with_subfield("1", string_child(prefix::ascii::FIXED))
        .shared();

        let field = MultipleOccurrencesField::new(tlv);
        let err = field.pack().unwrap_err();
        assert_eq!(err.to_string(), "unsupported packing of TLV subfields");
    }

    #[test]
    fn test_unpack_allocates_occurrences() {
        let mut field = MultipleOccurrencesField::new(fixed_len_spec());
        let read = field.unpack(b"ABCD1205GH14").unwrap();
        assert_eq!(read, 12);
        assert_eq!(field.occurrence_count(), 2);

        let value = field.unmarshal().unwrap();
        let occurrences = value.as_list().unwrap();
        assert_eq!(occurrences[0].get("1").and_then(Value::as_str), Some("AB"));
        assert_eq!(occurrences[0].get("2").and_then(Value::as_str), Some("CD"));
        assert_eq!(occurrences[0].get("3").and_then(Value::as_int), Some(12));
        assert_eq!(occurrences[1].get("1").and_then(Value::as_str), Some("05"));
        assert_eq!(occurrences[1].get("2").and_then(Value::as_str), Some("GH"));
        assert_eq!(occurrences[1].get("3").and_then(Value::as_int), Some(14));
    }

    #[test]
    fn test_unpack_subfield_failure_is_wrapped() {
        let mut field = MultipleOccurrencesField::new(fixed_len_spec());
        let err = field.unpack(b"ABCDEF01AB50").unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to unpack subfield 3: failed to set bytes: failed to convert into number"
        );
    }

    #[test]
    fn test_unpack_short_buffer() {
        let mut field = MultipleOccurrencesField::new(fixed_len_spec());
        let err = field.unpack(b"ABCD10").unwrap_err();
        assert_eq!(
            err.to_string(),
            "not enough data to unpack, expected: 12, got: 6"
        );
    }

    #[test]
    fn test_unpack_length_over_max() {
        let spec = Spec::composite(
            4,
            prefix::ascii::L,
            TagSpec::positional(Sort::StringsByInt),
        )
        .with_subfield("1", string_child(prefix::ascii::FIXED))
        .with_subfield("2", string_child(prefix::ascii::FIXED))
        .with_subfield("3", numeric_child(prefix::ascii::FIXED))
        .shared();

        let mut field = MultipleOccurrencesField::new(spec);
        let err = field.unpack(b"7ABCD123").unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to decode length: data length: 7 is larger than maximum 4"
        );
    }

    #[test]
    fn test_unpack_variable_length_may_stop_mid_pass() {
        let spec = Spec::composite(
            4,
            prefix::ascii::L,
            TagSpec::positional(Sort::StringsByInt),
        )
        .with_subfield("1", string_child(prefix::ascii::FIXED))
        .with_subfield("2", string_child(prefix::ascii::FIXED))
        .with_subfield("3", numeric_child(prefix::ascii::FIXED))
        .shared();

        let mut field = MultipleOccurrencesField::new(spec);
        let read = field.unpack(b"2AB").unwrap();
        assert_eq!(read, 3);
        assert_eq!(field.occurrence_count(), 1);
    }

    #[test]
    fn test_unpack_rejects_tlv_subfields() {
        let tlv = Spec::composite(
            4,
            prefix::ascii::FIXED,
            TagSpec::tlv(2, Encoding::Ascii, Sort::StringsByInt),
        )
        .with_subfield("1", string_child(prefix::ascii::FIXED))
        .with_subfield("2", string_child(prefix::ascii::FIXED))
        .with_subfield("3", numeric_child(prefix::ascii::FIXED))
        .shared();

        let mut field = MultipleOccurrencesField::new(tlv);
        let err = field.unpack(b"AB10CD123").unwrap_err();
        assert_eq!(err.to_string(), "unsupported unpacking of TLV subfields");
    }

    #[test]
    fn test_set_bytes_single_occurrence() {
        let mut field = MultipleOccurrencesField::new(fixed_len_spec());
        field.set_bytes(b"ABCD12").unwrap();
        assert_eq!(field.occurrence_count(), 1);

        let value = field.unmarshal().unwrap();
        let occurrences = value.as_list().unwrap();
        assert_eq!(occurrences[0].get("3").and_then(Value::as_int), Some(12));
    }

    #[test]
    fn test_unpack_resets_previous_state() {
        let mut field = MultipleOccurrencesField::new(fixed_len_spec());
        field.unpack(b"ABCD1205GH14").unwrap();
        assert_eq!(field.occurrence_count(), 2);

        field.set_bytes(b"ABCD12").unwrap();
        assert_eq!(field.occurrence_count(), 1);
    }

    #[test]
    fn test_json_marshal() {
        let mut field = MultipleOccurrencesField::new(variable_len_spec());
        field
            .marshal(&Value::List(vec![Value::Map(vec![
                ("1".to_string(), "AB".into()),
                ("2".to_string(), "CD".into()),
                ("3".to_string(), 12.into()),
                (
                    "11".to_string(),
                    Value::Map(vec![("1".to_string(), "YZ".into())]),
                ),
            ])]))
            .unwrap();

        let json = serde_json::to_string(&field.json_value().unwrap()).unwrap();
        assert_eq!(json, r#"[{"1":"AB","2":"CD","3":12,"11":{"1":"YZ"}}]"#);
    }

    #[test]
    fn test_json_unmarshal_packs_expected_bytes() {
        let mut field = MultipleOccurrencesField::new(variable_len_spec());
        field
            .set_json_value(&serde_json::json!([
                {"1": "AB", "2": "CD", "3": 12, "11": {"1": "YZ"}}
            ]))
            .unwrap();

        assert_eq!(field.string().unwrap(), "02AB02CD0212060102YZ");
    }

    #[test]
    fn test_json_round_trip_multiple_occurrences() {
        let mut field = MultipleOccurrencesField::new(variable_len_spec());
        field.set_bytes(b"02AB02CD0212060102YZ02AB02CD0212060102YZ").unwrap();

        let json = serde_json::to_string(&field.json_value().unwrap()).unwrap();
        assert_eq!(
            json,
            r#"[{"1":"AB","2":"CD","3":12,"11":{"1":"YZ"}},{"1":"AB","2":"CD","3":12,"11":{"1":"YZ"}}]"#
        );
    }

    #[test]
    fn test_json_unmarshal_errors() {
        let mut field = MultipleOccurrencesField::new(variable_len_spec());

        let err = field
            .set_json_value(&serde_json::json!({"1": "AB"}))
            .unwrap_err();
        assert_eq!(err.to_string(), "failed to JSON unmarshal bytes to map list");

        let err = field
            .set_json_value(&serde_json::json!([{"99": "AB"}]))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to unmarshal subfield 99: received subfield not defined in spec"
        );

        let err = field
            .set_json_value(&serde_json::json!([{"11": "YZ"}]))
            .unwrap_err();
        assert_eq!(err.to_string(), "failed to unmarshal subfield 11");
    }

    #[test]
    fn test_marshal_shape_mismatch() {
        let mut field = MultipleOccurrencesField::new(fixed_len_spec());
        let err = field.marshal(&Value::String("nope".into())).unwrap_err();
        assert_eq!(err.to_string(), "data does not match required list value");

        let err = field
            .marshal(&Value::List(vec![Value::String("nope".into())]))
            .unwrap_err();
        assert_eq!(err.to_string(), "data does not match required map value");
    }
}
