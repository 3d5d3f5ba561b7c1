//! NAMQR payment QR codec.
//!
//! Converts a structured [`PaymentIntent`] to and from the text carried in a
//! NAMQR (Namibian national QR standard) payment code: Tag-Length-Value data
//! with nested templates and a trailing CRC16 checksum.
//!
//! The codec is stateless and performs no I/O. Decoding is strict: a payload
//! either validates completely (structure, checksum, field shapes and
//! business rules) or is rejected with a typed [`NamqrError`].
//!
//! # Features
//!
//! - **Strict decoding**: checksum verified before any field is interpreted
//! - **Deterministic encoding**: canonical tag order, checksum appended
//! - **Injectable tag dictionary**: track NAMQR revisions via JSON config
//! - **Unknown field preservation**: unrecognised tags survive a round trip
//! - **`tracing` feature**: spans and events on decode and encode
//!
//! # Example
//!
//! ```
//! use namqr_lib::{AccountType, InitiationMethod, NamqrCodec, PaymentIntent};
//!
//! let codec = NamqrCodec::default();
//! let intent = PaymentIntent::builder()
//!     .initiation_method(InitiationMethod::Dynamic)
//!     .account_type(AccountType::Merchant)
//!     .identifier("MERCH-001")
//!     .merchant_name("Joe's Shop")
//!     .merchant_city("Windhoek")
//!     .amount("25.00")
//!     .purpose_code("19")
//!     .build()
//!     .unwrap();
//!
//! let payload = codec.encode(&intent).unwrap();
//! let decoded = codec.decode(&payload).unwrap();
//! assert_eq!(decoded.amount().unwrap().as_str(), "25.00");
//! ```

pub mod codec;
pub mod config;
pub mod crc;
pub mod dictionary;
pub mod errors;
pub mod intent;
pub mod mapper;
pub mod prelude;
pub mod tag;
pub mod tlv;

pub use codec::{looks_like_namqr, NamqrCodec};
pub use config::CodecConfig;
pub use dictionary::{FieldKind, FieldSpec, IntentField, TagDictionary};
pub use errors::{NamqrError, NamqrErrorCode, SemanticRule};
pub use intent::{
    AccountType, Amount, InitiationMethod, PaymentIntent, PaymentIntentBuilder, TipIndicator,
    UnknownField,
};
pub use tag::{FieldPath, Tag, TagRange};
pub use tlv::{TemplateLayout, TlvNode, TlvTree, TlvValue};

/// Convenience alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, NamqrError>;
