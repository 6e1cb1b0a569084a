/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Error types for the ferro8583 codec engine.
//!
//! This module provides a unified error hierarchy using `thiserror` for typed,
//! domain-specific errors across all ferro8583 operations:
//! - [`EncodingError`]: character encoder failures
//! - [`PrefixError`]: length-prefix framing failures
//! - [`FieldError`]: field pack/unpack, binding, and JSON projection failures
//!
//! Error display strings are part of the codec contract: callers (and tests)
//! match on them, so they must stay stable. Where a message intentionally
//! hides its low-level cause (number parsing, JSON parsing), the cause is
//! still reachable through [`std::error::Error::source`].

use thiserror::Error;

/// Result type alias using [`FieldError`] as the error type.
pub type Result<T> = std::result::Result<T, FieldError>;

/// Errors produced by character encoders.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EncodingError {
    /// Input byte outside the 7-bit ASCII range.
    #[error("invalid ASCII char: '{0}'")]
    InvalidAsciiChar(char),

    /// Wire byte with no mapping in the EBCDIC code page.
    #[error("invalid EBCDIC byte: {0:#04x}")]
    InvalidEbcdicByte(u8),

    /// Input character that is not a decimal digit.
    #[error("invalid BCD digit: '{0}'")]
    InvalidBcdDigit(char),

    /// Wire nibble above 9 in packed BCD data.
    #[error("invalid BCD nibble: {0:#x}")]
    InvalidBcdNibble(u8),

    /// Input is not a valid hexadecimal string.
    #[error("invalid hex string: {0}")]
    InvalidHexString(#[from] hex::FromHexError),

    /// Fewer input bytes than the decode request requires.
    #[error("not enough data to decode. expected len {expected}, got {got}")]
    NotEnoughData {
        /// Bytes required by the request.
        expected: usize,
        /// Bytes available in the input.
        got: usize,
    },
}

/// Errors produced by length prefixers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrefixError {
    /// Data length exceeds the field maximum (variable-length framing).
    #[error("field length: {data_len} is larger than maximum: {max_len}")]
    LengthOverMax {
        /// Length being encoded.
        data_len: usize,
        /// Maximum allowed by the spec.
        max_len: usize,
    },

    /// Data length differs from the fixed field length.
    #[error("field length: {data_len} should be fixed: {max_len}")]
    LengthNotFixed {
        /// Length being encoded.
        data_len: usize,
        /// Fixed length required by the spec.
        max_len: usize,
    },

    /// Data length needs more decimal digits than the prefixer carries.
    #[error("number of digits in length: {data_len} exceeds: {digits}")]
    DigitsOverCapacity {
        /// Length being encoded.
        data_len: usize,
        /// Digit capacity of the prefixer.
        digits: usize,
    },

    /// Buffer is shorter than the prefix itself.
    #[error("not enough data length: {got} to read: {digits} byte digits")]
    NotEnoughPrefixData {
        /// Bytes available in the input.
        got: usize,
        /// Digits the prefixer needs to read.
        digits: usize,
    },

    /// Decoded length exceeds the field maximum.
    #[error("data length: {data_len} is larger than maximum {max_len}")]
    DataLengthOverMax {
        /// Length declared by the prefix.
        data_len: usize,
        /// Maximum allowed by the spec.
        max_len: usize,
    },

    /// Prefix bytes do not form a decimal length.
    #[error("invalid length prefix digits")]
    InvalidLengthDigits,

    /// Delimiter byte absent from the first `max_len` bytes.
    #[error("delimiter not found in first {max_len} bytes")]
    DelimiterNotFoundWithin {
        /// Scan window that was exhausted.
        max_len: usize,
    },

    /// Delimiter byte absent from the (short) input.
    #[error("delimiter not found")]
    DelimiterNotFound,
}

/// Errors produced by field pack/unpack, value binding, and JSON projection.
#[derive(Debug, Error)]
pub enum FieldError {
    /// Prefixer rejected the outgoing length.
    #[error("failed to encode length: {0}")]
    EncodeLength(#[source] PrefixError),

    /// Prefixer rejected or could not parse the incoming length.
    #[error("failed to decode length: {0}")]
    DecodeLength(#[source] PrefixError),

    /// Encoder rejected the outgoing content.
    #[error("failed to encode content: {0}")]
    EncodeContent(#[source] EncodingError),

    /// Encoder rejected or ran out of incoming content.
    #[error("failed to decode content: {0}")]
    DecodeContent(#[source] EncodingError),

    /// Tag encoder rejected an outgoing subfield tag.
    #[error("failed to encode tag: {0}")]
    EncodeTag(#[source] EncodingError),

    /// Tag encoder rejected incoming tag bytes.
    #[error("failed to decode tag: {0}")]
    DecodeTag(#[source] EncodingError),

    /// Decoded content could not be stored in the field value.
    #[error("failed to set bytes: {0}")]
    SetBytes(#[source] Box<FieldError>),

    /// Numeric field content is not a decimal integer.
    #[error("failed to convert into number")]
    ParseNumber(#[source] std::num::ParseIntError),

    /// Hex field value is not a valid hexadecimal string.
    #[error("failed to convert hex string to bytes")]
    ParseHex(#[source] hex::FromHexError),

    /// Track data does not match the track 2 layout.
    #[error("invalid track data")]
    InvalidTrackData,

    /// Track 2 expiration date is not a valid YYMM value.
    #[error("invalid expiration date")]
    InvalidExpirationDate,

    /// Spec subfield table has no entry for the tag.
    #[error("no subfield for tag {0}")]
    NoSubfield(String),

    /// Wire tag does not name a subfield declared in the spec.
    #[error("field not defined in spec")]
    FieldNotDefined,

    /// A subfield failed to pack; carries the subfield tag.
    #[error("failed to pack subfield {tag}: {source}")]
    PackSubfield {
        /// Tag of the failing subfield.
        tag: String,
        /// Underlying failure.
        #[source]
        source: Box<FieldError>,
    },

    /// A subfield failed to unpack; carries the subfield tag.
    #[error("failed to unpack subfield {tag}: {source}")]
    UnpackSubfield {
        /// Tag of the failing subfield.
        tag: String,
        /// Underlying failure.
        #[source]
        source: Box<FieldError>,
    },

    /// Buffer is shorter than the length declared by the prefix.
    #[error("not enough data to unpack, expected: {expected}, got: {got}")]
    NotEnoughData {
        /// Prefix bytes plus declared inner length.
        expected: usize,
        /// Bytes available in the input.
        got: usize,
    },

    /// Subfields consumed a different number of bytes than declared.
    #[error("data length: {data_len} does not match aggregate data read from decoded subfields: {read}")]
    DataLengthMismatch {
        /// Inner length declared by the prefix.
        data_len: usize,
        /// Bytes actually consumed by subfields.
        read: usize,
    },

    /// A subfield unpack consumed zero bytes while data remained.
    #[error("subfield {0} consumed no bytes during unpack")]
    NoProgress(String),

    /// TLV subfields cannot repeat across occurrences on pack.
    #[error("unsupported packing of TLV subfields")]
    TlvPacking,

    /// TLV subfields cannot repeat across occurrences on unpack.
    #[error("unsupported unpacking of TLV subfields")]
    TlvUnpacking,

    /// Bound value has the wrong shape for the field.
    #[error("data does not match required {0} value")]
    ValueMismatch(&'static str),

    /// Binding a value into a subfield failed; carries the subfield tag.
    #[error("failed to set data from field {tag}: {source}")]
    MarshalSubfield {
        /// Tag of the failing subfield.
        tag: String,
        /// Underlying failure.
        #[source]
        source: Box<FieldError>,
    },

    /// Extracting a value from a subfield failed; carries the subfield tag.
    #[error("failed to get data from field {tag}: {source}")]
    UnmarshalSubfield {
        /// Tag of the failing subfield.
        tag: String,
        /// Underlying failure.
        #[source]
        source: Box<FieldError>,
    },

    /// JSON serialization of the subfield map failed.
    #[error("failed to JSON marshal map to bytes")]
    JsonMarshal(#[source] serde_json::Error),

    /// JSON input is not the object a composite requires.
    #[error("failed to JSON unmarshal bytes to map")]
    JsonNotMap,

    /// JSON input is not the array of objects occurrences require.
    #[error("failed to JSON unmarshal bytes to map list")]
    JsonNotMapList,

    /// JSON input is not the string a string-valued field requires.
    #[error("failed to JSON unmarshal bytes to string")]
    JsonNotString,

    /// JSON input is not the integer a numeric field requires.
    #[error("failed to JSON unmarshal bytes to int")]
    JsonNotInt,

    /// JSON names a subfield the spec does not declare.
    #[error("failed to unmarshal subfield {tag}: received subfield not defined in spec")]
    JsonSubfieldNotDefined {
        /// Undeclared tag from the JSON input.
        tag: String,
    },

    /// A declared subfield rejected its JSON value.
    #[error("failed to unmarshal subfield {tag}")]
    JsonUnmarshalSubfield {
        /// Tag of the failing subfield.
        tag: String,
        /// Underlying failure, kept out of the display string.
        #[source]
        source: Box<FieldError>,
    },

    /// A serde record could not be bridged through the JSON projection.
    #[error("failed to bind record: {0}")]
    BindRecord(#[source] serde_json::Error),
}
