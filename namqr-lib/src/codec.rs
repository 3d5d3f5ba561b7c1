//! Codec facade: text in, payment intent out, and back.

use crate::config::CodecConfig;
use crate::crc::{append_crc, split_trailer, verify_crc};
use crate::dictionary::TagDictionary;
use crate::intent::PaymentIntent;
use crate::mapper::{from_intent, to_intent};
use crate::tag::Tag;
use crate::tlv::{expand, tokenize, write_tree, TlvNode, TlvTree};
use crate::{NamqrError, Result};

/// NAMQR encoder and decoder.
///
/// The codec holds only its immutable configuration, so one instance can be
/// shared across threads (for example behind an `Arc`) without locking.
///
/// # Example
///
/// ```
/// use namqr_lib::{AccountType, InitiationMethod, NamqrCodec, PaymentIntent};
///
/// let codec = NamqrCodec::default();
/// let intent = PaymentIntent::builder()
///     .initiation_method(InitiationMethod::Dynamic)
///     .account_type(AccountType::BuffrWallet)
///     .identifier("264811234567@buffr")
///     .amount("150.00")
///     .build()
///     .unwrap();
///
/// let payload = codec.encode(&intent).unwrap();
/// assert!(payload.starts_with("000201010212"));
/// assert_eq!(codec.decode(&payload).unwrap(), intent);
/// ```
#[derive(Clone, Debug, Default)]
pub struct NamqrCodec {
    config: CodecConfig,
}

impl NamqrCodec {
    /// Create a codec, validating `config` first.
    pub fn new(config: CodecConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Active tag dictionary.
    pub fn tag_dictionary(&self) -> &TagDictionary {
        &self.config.dictionary
    }

    /// Decode a scanned payload into a payment intent.
    ///
    /// The checksum is verified before any template is expanded or any field
    /// interpreted. Nothing is returned unless the whole payload validates.
    ///
    /// # Errors
    ///
    /// Any [`NamqrError`] raised by screening, tokenizing, checksum
    /// verification, template expansion or semantic mapping, unchanged.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, text), fields(len = text.len())))]
    pub fn decode(&self, text: &str) -> Result<PaymentIntent> {
        self.inspect_inner(text)
            .and_then(|tree| to_intent(&tree, &self.config.dictionary))
            .map_err(|err| {
                #[cfg(feature = "tracing")]
                tracing::debug!(code = err.code() as i32, "rejected payload: {err}");
                err
            })
    }

    /// Encode a payment intent as a NAMQR payload, checksum included.
    ///
    /// # Errors
    ///
    /// - [`NamqrError::ValueTooLong`] if a value, or a template as a whole,
    ///   exceeds 99 characters
    /// - [`NamqrError::PayloadTooLong`] if the payload exceeds the configured maximum
    /// - [`NamqrError::InvalidFieldValue`] if a value under a composite tag
    ///   (for example a payment link at `62.50`) is not valid TLV, or nests
    ///   deeper than the configured limit
    /// - any error of [`from_intent`]
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, intent)))]
    pub fn encode(&self, intent: &PaymentIntent) -> Result<String> {
        let tree = from_intent(intent, &self.config.dictionary)?;
        let body = write_tree(&tree)?;
        self.check_layout(&body)?;
        let payload = append_crc(&body);

        let length = payload.chars().count();
        if length > self.config.max_payload_length {
            #[cfg(feature = "tracing")]
            tracing::warn!(length, max = self.config.max_payload_length, "encoded payload too long");
            return Err(NamqrError::PayloadTooLong {
                length,
                max: self.config.max_payload_length,
            });
        }
        Ok(payload)
    }

    /// Run the structural and checksum stages and return the raw tree.
    ///
    /// Useful for diagnostics: the tree includes every node, known or not,
    /// and the checksum node itself. No semantic rules are applied.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, text), fields(len = text.len())))]
    pub fn inspect(&self, text: &str) -> Result<TlvTree> {
        self.inspect_inner(text)
    }

    fn inspect_inner(&self, text: &str) -> Result<TlvTree> {
        self.screen(text)?;
        let nodes = tokenize(text)?;
        check_trailer(&nodes)?;
        verify_crc(text)?;
        expand(nodes, &self.config.layout, self.config.max_template_depth)
    }

    /// Expand the written body the way decode will, so composite values
    /// that would not parse back are caught before the payload leaves.
    fn check_layout(&self, body: &str) -> Result<()> {
        let nodes = tokenize(body)?;
        expand(nodes, &self.config.layout, self.config.max_template_depth)
            .map(|_| ())
            .map_err(|err| match err {
                NamqrError::InvalidTemplate { path, source } => {
                    NamqrError::invalid_field(path, format!("not a valid template: {source}"))
                }
                NamqrError::TemplateTooDeep { path, max_depth } => {
                    NamqrError::invalid_field(path, format!("nests deeper than {max_depth} levels"))
                }
                other => other,
            })
    }

    fn screen(&self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Err(NamqrError::TruncatedPayload);
        }
        let length = text.chars().count();
        if length > self.config.max_payload_length {
            return Err(NamqrError::PayloadTooLong {
                length,
                max: self.config.max_payload_length,
            });
        }
        if let Some(offset) = text.chars().position(char::is_control) {
            return Err(NamqrError::InvalidCharacter { offset });
        }
        Ok(())
    }
}

/// The checksum node must be the last root node and appear exactly once.
fn check_trailer(nodes: &[TlvNode]) -> Result<()> {
    let last_is_crc = nodes.last().is_some_and(|node| node.tag == Tag::CRC);
    let crc_count = nodes.iter().filter(|node| node.tag == Tag::CRC).count();
    if !last_is_crc || crc_count != 1 {
        return Err(NamqrError::MissingChecksum);
    }
    Ok(())
}

/// Cheap prefilter for scanner callbacks.
///
/// Returns `true` if `text` starts with a payload format indicator and ends
/// with a well-formed checksum field. A `true` result does not mean the
/// payload decodes; use [`NamqrCodec::decode`] for that.
///
/// ```
/// use namqr_lib::looks_like_namqr;
///
/// assert!(looks_like_namqr("0002016304ABCD"));
/// assert!(!looks_like_namqr("https://example.com"));
/// ```
pub fn looks_like_namqr(text: &str) -> bool {
    let data = text.trim();
    data.starts_with("0002") && split_trailer(data).is_some()
}
