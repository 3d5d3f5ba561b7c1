//! Prelude module for convenient imports.
//!
//! ```rust
//! use namqr_lib::prelude::*;
//!
//! let codec = NamqrCodec::default();
//! assert!(matches!(codec.decode("000201"), Err(NamqrError::MissingChecksum)));
//! ```

// Codec
pub use crate::codec::{looks_like_namqr, NamqrCodec};
pub use crate::config::CodecConfig;

// Error handling
pub use crate::errors::{NamqrError, NamqrErrorCode, SemanticRule};
pub use crate::Result;

// Payment intent
pub use crate::intent::{
    AccountType, Amount, InitiationMethod, PaymentIntent, PaymentIntentBuilder, TipIndicator,
    UnknownField,
};

// Tags and tables
pub use crate::dictionary::TagDictionary;
pub use crate::tag::{FieldPath, Tag};
