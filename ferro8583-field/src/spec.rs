/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Field specifications.
//!
//! A [`Spec`] is the immutable description of how one field is serialised:
//! maximum length, content encoder, length prefixer, padding, optional
//! [`TagSpec`], and, for composites, an ordered table of subfield
//! prototypes. Specs are shared read-only (`Arc`) across any number of field
//! instances; field construction deep-clones the prototypes and clears their
//! state.
//!
//! Spec invariants are programmer errors: composite field constructors
//! validate them and panic with a diagnostic rather than returning a
//! runtime error.

use crate::field::Field;
use ferro8583_core::{Encoding, Pad, Prefixer, Sort};
use std::collections::HashMap;
use std::sync::Arc;

/// Subfield tag layout for composite fields.
///
/// `length == 0` means position-ordered subfields (no tag bytes on the
/// wire); `length > 0` means TLV, with each subfield preceded by its tag
/// padded to `length` and rendered through `enc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagSpec {
    /// Wire width of an encoded tag; zero for position-ordered mode.
    pub length: usize,
    /// Tag encoder; required when `length > 0`.
    pub enc: Option<Encoding>,
    /// Tag padding, applied before encoding (conventionally `Pad::Left`).
    pub pad: Option<Pad>,
    /// Iteration order over subfield tags for packing and JSON projection.
    pub sort: Sort,
}

impl TagSpec {
    /// Position-ordered subfields: no tag bytes on the wire.
    #[inline]
    #[must_use]
    pub const fn positional(sort: Sort) -> Self {
        Self {
            length: 0,
            enc: None,
            pad: None,
            sort,
        }
    }

    /// TLV subfields: each preceded by its tag at the given wire width.
    #[inline]
    #[must_use]
    pub const fn tlv(length: usize, enc: Encoding, sort: Sort) -> Self {
        Self {
            length,
            enc: Some(enc),
            pad: None,
            sort,
        }
    }

    /// Sets the tag padding policy.
    #[inline]
    #[must_use]
    pub const fn with_pad(mut self, pad: Pad) -> Self {
        self.pad = Some(pad);
        self
    }
}

/// Immutable serialisation description for one field.
#[derive(Debug, Clone)]
pub struct Spec {
    /// Maximum inner length in content units (see the field type for the
    /// unit: characters, digits, or raw bytes).
    pub length: usize,
    /// Human-readable field description for diagnostics.
    pub description: &'static str,
    /// Content encoder; `None` for composites.
    pub enc: Option<Encoding>,
    /// Length framing rule.
    pub pref: Prefixer,
    /// Content fill policy; composites accept only `None` / `Pad::None`.
    pub pad: Option<Pad>,
    /// Subfield tag layout; required for composites.
    pub tag: Option<TagSpec>,
    /// Ordered subfield prototypes, keyed by tag name; empty for primitives.
    pub subfields: Vec<(String, Field)>,
}

impl Spec {
    /// Creates a primitive field spec.
    #[must_use]
    pub fn primitive(length: usize, enc: Encoding, pref: Prefixer) -> Self {
        Self {
            length,
            description: "",
            enc: Some(enc),
            pref,
            pad: None,
            tag: None,
            subfields: Vec::new(),
        }
    }

    /// Creates a composite field spec. Subfields are added with
    /// [`Spec::with_subfield`].
    #[must_use]
    pub fn composite(length: usize, pref: Prefixer, tag: TagSpec) -> Self {
        Self {
            length,
            description: "",
            enc: None,
            pref,
            pad: None,
            tag: Some(tag),
            subfields: Vec::new(),
        }
    }

    /// Sets the description used in diagnostics.
    #[must_use]
    pub fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the content fill policy.
    #[must_use]
    pub fn with_pad(mut self, pad: Pad) -> Self {
        self.pad = Some(pad);
        self
    }

    /// Adds a subfield prototype under the given tag.
    #[must_use]
    pub fn with_subfield(mut self, tag: &str, field: Field) -> Self {
        self.subfields.push((tag.to_string(), field));
        self
    }

    /// Wraps the spec for sharing across field instances.
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Returns the content encoder, panicking for composite specs.
    #[inline]
    pub(crate) fn encoder(&self) -> Encoding {
        self.enc
            .expect("primitive field spec requires a content encoder")
    }

    /// Returns the tag spec, panicking for primitive specs.
    #[inline]
    pub(crate) fn tag_spec(&self) -> &TagSpec {
        self.tag
            .as_ref()
            .expect("composite spec requires a tag definition with a sort order")
    }

    /// Returns true when the spec declares a subfield under `tag`.
    pub(crate) fn has_subfield(&self, tag: &str) -> bool {
        self.subfields.iter().any(|(t, _)| t == tag)
    }

    /// Returns the subfield tags in `tag.sort` order.
    pub(crate) fn ordered_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.subfields.iter().map(|(t, _)| t.clone()).collect();
        if let Some(tag) = &self.tag {
            tag.sort.sort(&mut tags);
        }
        tags
    }

    /// Builds fresh subfield instances from the prototypes.
    pub(crate) fn create_subfields(&self) -> HashMap<String, Field> {
        self.subfields
            .iter()
            .map(|(tag, prototype)| {
                let mut field = prototype.clone();
                field.reset();
                (tag.clone(), field)
            })
            .collect()
    }

    /// Checks the composite spec invariants, panicking on violation.
    pub(crate) fn validate_composite(&self) {
        assert!(
            self.tag.is_some(),
            "composite spec requires a tag definition with a sort order"
        );
        assert!(
            self.enc.is_none(),
            "composite spec does not accept a content encoder"
        );
        assert!(
            self.pad.is_none() || self.pad.is_some_and(Pad::is_none),
            "composite spec only supports no padding or Pad::None"
        );
        let tag = self.tag_spec();
        assert!(
            tag.length == 0 || tag.enc.is_some(),
            "composite spec requires a tag encoder when the tag length is set"
        );
    }
}
