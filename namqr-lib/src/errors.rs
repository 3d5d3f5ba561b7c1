//! Error types for NAMQR codec operations.
//!
//! Every failure is fatal to the current decode or encode call. A malformed
//! or tampered payment code is never repaired, so none of these errors are
//! retryable. Tag and field identifiers are carried through unchanged from
//! the stage that raised them.

use crate::tag::FieldPath;
use std::fmt;

/// Error codes for FFI and mobile integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum NamqrErrorCode {
    /// Payload ended inside a tag
    TruncatedTag = 1000,
    /// Payload ended inside a length prefix
    TruncatedLength = 1001,
    /// Payload ended inside a value
    TruncatedValue = 1002,
    /// Payload is empty
    TruncatedPayload = 1003,
    /// Tag characters are not digits
    InvalidTag = 1100,
    /// Length characters are not digits
    InvalidLengthDigits = 1101,
    /// Non-printable character in payload
    InvalidCharacter = 1102,
    /// Payload exceeds the configured maximum
    PayloadTooLong = 1103,
    /// Template nesting exceeds the configured maximum
    TemplateTooDeep = 2000,
    /// Template value is not valid TLV
    InvalidTemplate = 2001,
    /// No trailing checksum field
    MissingChecksum = 3000,
    /// Checksum does not match payload
    ChecksumMismatch = 3001,
    /// Required field absent
    MissingField = 4000,
    /// Field value has the wrong shape
    InvalidFieldValue = 4001,
    /// Known field occurs twice
    DuplicateTag = 4002,
    /// Business rule broken
    SemanticRuleViolation = 4003,
    /// Value too long to frame
    ValueTooLong = 5000,
    /// Intent rejected by the builder
    InvalidIntent = 5001,
    /// Codec configuration rejected
    InvalidConfig = 9000,
}

/// Business rules that tie several intent fields together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticRule {
    /// A static (reusable) code carries a bound amount.
    StaticWithAmount,
    /// A dynamic (single-use) code has no amount.
    DynamicWithoutAmount,
    /// A merchant account has no merchant name.
    MerchantWithoutName,
    /// A convenience fee is present without its matching indicator.
    FeeWithoutIndicator,
    /// A fee indicator is present without its fee.
    IndicatorWithoutFee,
}

impl fmt::Display for SemanticRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::StaticWithAmount => "static codes must not carry an amount",
            Self::DynamicWithoutAmount => "dynamic codes must carry an amount",
            Self::MerchantWithoutName => "merchant accounts must carry a merchant name",
            Self::FeeWithoutIndicator => "convenience fees need the matching fee indicator",
            Self::IndicatorWithoutFee => "fee indicators need the matching convenience fee",
        };
        f.write_str(text)
    }
}

/// Comprehensive error type for NAMQR operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NamqrError {
    /// Fewer than two characters remained where a tag was expected.
    #[error("payload truncated inside tag at offset {offset}")]
    TruncatedTag {
        /// Character offset of the partial tag
        offset: usize,
    },

    /// The two tag characters are not ASCII digits.
    #[error("invalid tag at offset {offset}: expected two digits")]
    InvalidTag {
        /// Character offset of the tag
        offset: usize,
    },

    /// Fewer than two characters remained where a length was expected.
    #[error("payload truncated inside length at offset {offset}")]
    TruncatedLength {
        /// Character offset of the partial length
        offset: usize,
    },

    /// The two length characters are not ASCII digits.
    #[error("invalid length at offset {offset}: expected two digits")]
    InvalidLengthDigits {
        /// Character offset of the length
        offset: usize,
    },

    /// Fewer characters remained than the length prefix declared.
    #[error("payload truncated at offset {offset}: declared {declared} characters, {available} available")]
    TruncatedValue {
        /// Character offset of the value
        offset: usize,
        /// Declared value length
        declared: usize,
        /// Characters actually left
        available: usize,
    },

    /// The payload is empty.
    #[error("payload is empty")]
    TruncatedPayload,

    /// Template nesting went past the configured depth.
    #[error("template {path} nests deeper than {max_depth} levels")]
    TemplateTooDeep {
        /// Template that would exceed the limit, under its root tag
        path: FieldPath,
        /// Configured limit
        max_depth: usize,
    },

    /// A composite tag's value is not a valid TLV sequence.
    #[error("template {path} is malformed: {source}")]
    InvalidTemplate {
        /// Template whose value failed to parse, under its root tag
        path: FieldPath,
        /// Failure inside the template value
        #[source]
        source: Box<NamqrError>,
    },

    /// No well-formed `6304XXXX` trailer at the end of the payload.
    #[error("checksum field missing")]
    MissingChecksum,

    /// The trailer does not match the computed CRC.
    #[error("checksum mismatch: computed {expected}, payload carries {found}")]
    ChecksumMismatch {
        /// CRC computed over the payload
        expected: String,
        /// CRC carried by the payload
        found: String,
    },

    /// A required field is absent.
    #[error("missing required field {0}")]
    MissingField(FieldPath),

    /// A field value does not fit its declared kind.
    #[error("invalid value for field {path}: {reason}")]
    InvalidFieldValue {
        /// Location of the field
        path: FieldPath,
        /// Reason for invalidity
        reason: String,
    },

    /// A field known to the dictionary occurs more than once.
    #[error("field {0} occurs more than once")]
    DuplicateTag(FieldPath),

    /// Fields are individually valid but break a business rule.
    #[error("semantic rule violated: {0}")]
    SemanticRuleViolation(SemanticRule),

    /// The payload is longer than the configured maximum.
    #[error("payload length {length} exceeds maximum {max}")]
    PayloadTooLong {
        /// Length in characters
        length: usize,
        /// Configured maximum
        max: usize,
    },

    /// The payload contains a non-printable character.
    #[error("non-printable character at offset {offset}")]
    InvalidCharacter {
        /// Character offset
        offset: usize,
    },

    /// A value is too long for a two-digit length prefix.
    #[error("value of field {path} is {length} characters, maximum is 99")]
    ValueTooLong {
        /// Location of the field
        path: FieldPath,
        /// Length in characters
        length: usize,
    },

    /// An intent was rejected while being built.
    #[error("invalid {field}: {reason}")]
    InvalidIntent {
        /// Intent field name
        field: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// The codec configuration is inconsistent.
    #[error("invalid codec configuration: {0}")]
    InvalidConfig(String),
}

impl NamqrError {
    /// Get the error code for FFI/mobile integration.
    pub fn code(&self) -> NamqrErrorCode {
        match self {
            Self::TruncatedTag { .. } => NamqrErrorCode::TruncatedTag,
            Self::InvalidTag { .. } => NamqrErrorCode::InvalidTag,
            Self::TruncatedLength { .. } => NamqrErrorCode::TruncatedLength,
            Self::InvalidLengthDigits { .. } => NamqrErrorCode::InvalidLengthDigits,
            Self::TruncatedValue { .. } => NamqrErrorCode::TruncatedValue,
            Self::TruncatedPayload => NamqrErrorCode::TruncatedPayload,
            Self::TemplateTooDeep { .. } => NamqrErrorCode::TemplateTooDeep,
            Self::InvalidTemplate { .. } => NamqrErrorCode::InvalidTemplate,
            Self::MissingChecksum => NamqrErrorCode::MissingChecksum,
            Self::ChecksumMismatch { .. } => NamqrErrorCode::ChecksumMismatch,
            Self::MissingField(_) => NamqrErrorCode::MissingField,
            Self::InvalidFieldValue { .. } => NamqrErrorCode::InvalidFieldValue,
            Self::DuplicateTag(_) => NamqrErrorCode::DuplicateTag,
            Self::SemanticRuleViolation(_) => NamqrErrorCode::SemanticRuleViolation,
            Self::PayloadTooLong { .. } => NamqrErrorCode::PayloadTooLong,
            Self::InvalidCharacter { .. } => NamqrErrorCode::InvalidCharacter,
            Self::ValueTooLong { .. } => NamqrErrorCode::ValueTooLong,
            Self::InvalidIntent { .. } => NamqrErrorCode::InvalidIntent,
            Self::InvalidConfig(_) => NamqrErrorCode::InvalidConfig,
        }
    }

    /// Get the error message as an owned String (useful for FFI).
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Returns true if the payload ended before a node was complete.
    pub fn is_truncation(&self) -> bool {
        matches!(
            self,
            Self::TruncatedTag { .. }
                | Self::TruncatedLength { .. }
                | Self::TruncatedValue { .. }
                | Self::TruncatedPayload
        )
    }

    /// Returns true if the payload failed its checksum stage.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, Self::MissingChecksum | Self::ChecksumMismatch { .. })
    }

    /// Short text suitable for showing to a person who just scanned a code.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingChecksum | Self::ChecksumMismatch { .. } => {
                "This QR code appears damaged or altered. Ask for a new one."
            }
            Self::PayloadTooLong { .. } => "This QR code holds too much data to be a NAMQR code.",
            Self::SemanticRuleViolation(_)
            | Self::MissingField(_)
            | Self::InvalidFieldValue { .. }
            | Self::DuplicateTag(_) => "This QR code contains invalid payment details.",
            Self::ValueTooLong { .. } | Self::InvalidIntent { .. } => {
                "These payment details cannot be turned into a QR code."
            }
            Self::InvalidConfig(_) => "The payment scanner is misconfigured.",
            _ => "This is not a valid NAMQR payment code.",
        }
    }

    /// Create an invalid field value error.
    pub fn invalid_field(path: impl Into<FieldPath>, reason: impl Into<String>) -> Self {
        Self::InvalidFieldValue {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid intent error.
    pub fn invalid_intent(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidIntent {
            field,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for NamqrError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}
