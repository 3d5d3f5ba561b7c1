//! End-to-end decode and encode scenarios.

use namqr_lib::crc::{append_crc, crc16, format_crc, verify_crc};
use namqr_lib::prelude::*;
use namqr_lib::tlv::{TemplateLayout, TlvNode, TlvValue};
use namqr_lib::TagRange;

fn tag(value: u8) -> Tag {
    Tag::new(value).unwrap()
}

fn merchant_intent() -> PaymentIntent {
    PaymentIntent::builder()
        .initiation_method(InitiationMethod::Dynamic)
        .account_type(AccountType::Merchant)
        .identifier("MERCH-001")
        .merchant_name("Joe's Shop")
        .merchant_city("Windhoek")
        .currency("516")
        .amount("25.00")
        .purpose_code("19")
        .token_vault_id("TV123456789")
        .build()
        .unwrap()
}

#[test]
fn test_merchant_intent_round_trip() {
    let codec = NamqrCodec::default();
    let intent = merchant_intent();

    let payload = codec.encode(&intent).unwrap();
    assert!(payload.starts_with("000201010212"));
    assert!(payload.contains("540525.00"));
    assert!(payload.contains("5910Joe's Shop"));
    assert!(payload.contains("6511TV123456789"));
    assert!(verify_crc(&payload).is_ok());

    let decoded = codec.decode(&payload).unwrap();
    assert_eq!(decoded, intent);
    assert_eq!(decoded.amount().map(Amount::as_str), Some("25.00"));
    assert_eq!(decoded.merchant_city(), Some("Windhoek"));
    assert_eq!(decoded.token_vault_id(), Some("TV123456789"));
}

#[test]
fn test_missing_checksum() {
    let codec = NamqrCodec::default();
    assert_eq!(codec.decode("000201"), Err(NamqrError::MissingChecksum));
}

#[test]
fn test_checksum_mismatch_then_valid() {
    let codec = NamqrCodec::default();
    let err = codec.decode("0002016304ABCD").unwrap_err();
    assert!(matches!(err, NamqrError::ChecksumMismatch { .. }));
    assert_eq!(err.code(), NamqrErrorCode::ChecksumMismatch);
    assert!(err.is_integrity_failure());

    let fixed = format!("0002016304{}", format_crc(crc16(b"0002016304")));
    assert!(verify_crc(&fixed).is_ok());
    // Structurally and cryptographically sound, but no payment fields.
    assert!(matches!(codec.decode(&fixed), Err(NamqrError::MissingField(_))));
}

#[test]
fn test_crc_check_value() {
    assert_eq!(format_crc(crc16(b"123456789")), "29B1");
}

#[test]
fn test_unknown_fields_round_trip_byte_identical() {
    let codec = NamqrCodec::default();
    let base = codec.encode(&merchant_intent()).unwrap();

    // Splice an unknown root leaf (67) and an unknown template (81) before the checksum.
    let body = &base[..base.len() - 8];
    let tree = codec.inspect(&base).unwrap();
    assert!(tree.find(tag(67)).is_none());

    let mut nodes = namqr_lib::tlv::tokenize(body).unwrap();
    nodes.push(TlvNode::leaf(tag(67), "02"));
    nodes.push(TlvNode::leaf(tag(81), "0004abcd"));
    nodes.sort_by_key(|node| node.tag);
    let payload = append_crc(&namqr_lib::tlv::write_nodes(&nodes).unwrap());

    let decoded = codec.decode(&payload).unwrap();
    assert_eq!(decoded.unknown_fields().len(), 2);
    assert_eq!(decoded.unknown_fields()[0], UnknownField::new(tag(67), "02"));
    assert_eq!(decoded.unknown_fields()[1], UnknownField::new(tag(81), "0004abcd"));

    let reencoded = codec.encode(&decoded).unwrap();
    assert_eq!(reencoded, payload);
    assert_eq!(codec.decode(&reencoded).unwrap(), decoded);
}

#[test]
fn test_nested_payment_link_preserved() {
    let codec = NamqrCodec::default();
    let intent = PaymentIntent::builder()
        .initiation_method(InitiationMethod::Static)
        .account_type(AccountType::BuffrWallet)
        .identifier("264811234567@buffr")
        .additional_data(tag(5), "INV-42")
        .additional_data(tag(50), "0006buffr.0110pay/abc123")
        .build()
        .unwrap();

    let payload = codec.encode(&intent).unwrap();
    let tree = codec.inspect(&payload).unwrap();
    let additional = tree.find(tag(62)).unwrap().children().unwrap();
    let link = additional.iter().find(|node| node.tag == tag(50)).unwrap();
    assert!(matches!(link.value, TlvValue::Template(_)));

    let decoded = codec.decode(&payload).unwrap();
    assert_eq!(
        decoded.additional_data().get(&tag(50)).map(String::as_str),
        Some("0006buffr.0110pay/abc123")
    );
    assert_eq!(decoded, intent);
}

#[test]
fn test_percentage_fee_round_trip() {
    let codec = NamqrCodec::default();
    let intent = merchant_intent()
        .to_builder()
        .tip_indicator(TipIndicator::PercentageFee)
        .convenience_fee_percentage("2.5")
        .postal_code("10005")
        .build()
        .unwrap();

    let payload = codec.encode(&intent).unwrap();
    assert!(payload.contains("550203"));
    assert!(payload.contains("57032.5"));
    assert!(payload.contains("610510005"));

    let decoded = codec.decode(&payload).unwrap();
    assert_eq!(decoded.tip_indicator(), Some(TipIndicator::PercentageFee));
    assert_eq!(decoded.convenience_fee_percentage().map(Amount::as_str), Some("2.5"));
    assert_eq!(decoded, intent);
}

#[test]
fn test_fee_without_indicator_rejected() {
    let codec = NamqrCodec::default();
    let payload = codec.encode(&merchant_intent()).unwrap();
    let body = payload[..payload.len() - 8].replace("5802NA", "56041.505802NA");
    assert_eq!(
        codec.decode(&append_crc(&body)),
        Err(NamqrError::SemanticRuleViolation(SemanticRule::FeeWithoutIndicator))
    );
}

#[test]
fn test_static_code_with_amount_rejected() {
    let codec = NamqrCodec::default();
    let payload = codec.encode(&merchant_intent()).unwrap();
    let body = payload[..payload.len() - 8].replace("010212", "010211");
    let err = codec.decode(&append_crc(&body)).unwrap_err();
    assert_eq!(
        err,
        NamqrError::SemanticRuleViolation(SemanticRule::StaticWithAmount)
    );
    assert_eq!(
        err.user_message(),
        "This QR code contains invalid payment details."
    );
}

#[test]
fn test_value_too_long_on_encode() {
    let codec = NamqrCodec::default();
    let mut dictionary = TagDictionary::namqr_v5();
    // Lift the dictionary limit so only the TLV framing limit applies.
    if let Some(account) = dictionary.groups.get_mut(&tag(26)) {
        if let Some(spec) = account.get_mut(&tag(1)) {
            spec.max_len = None;
        }
    }
    let codec_unbounded = NamqrCodec::new(codec.config().clone().with_dictionary(dictionary)).unwrap();

    let intent = PaymentIntent::builder()
        .initiation_method(InitiationMethod::Static)
        .account_type(AccountType::BuffrWallet)
        .identifier("x".repeat(90))
        .build()
        .unwrap();
    let err = codec_unbounded.encode(&intent).unwrap_err();
    assert_eq!(
        err,
        NamqrError::ValueTooLong {
            path: FieldPath::root(tag(26)),
            length: 114,
        }
    );

    // The default dictionary rejects it earlier, by field.
    assert!(matches!(
        codec.encode(&intent),
        Err(NamqrError::InvalidFieldValue { path, .. }) if path == FieldPath::child(tag(26), tag(1))
    ));
}

#[test]
fn test_payload_too_long_on_encode() {
    let config = CodecConfig::new().with_max_payload_length(64);
    let codec = NamqrCodec::new(config).unwrap();
    let err = codec.encode(&merchant_intent()).unwrap_err();
    assert!(matches!(err, NamqrError::PayloadTooLong { max: 64, .. }));
}

#[test]
fn test_custom_dictionary_from_json() {
    let mut dictionary = TagDictionary::namqr_v5();
    dictionary.service_namespace = "na.com.example.qr".to_string();
    let json = serde_json::json!({
        "max_template_depth": 3,
        "dictionary": dictionary,
    })
    .to_string();

    let codec = NamqrCodec::new(CodecConfig::from_json(&json).unwrap()).unwrap();
    assert_eq!(codec.config().max_template_depth, 3);
    assert_eq!(codec.tag_dictionary().service_namespace, "na.com.example.qr");

    let payload = codec.encode(&merchant_intent()).unwrap();
    assert!(payload.contains("0017na.com.example.qr"));
    assert_eq!(codec.decode(&payload).unwrap(), merchant_intent());

    // The default codec accepts any service namespace on decode.
    assert_eq!(NamqrCodec::default().decode(&payload).unwrap(), merchant_intent());
}

#[test]
fn test_deeper_layout_needs_deeper_limit() {
    let layout = TemplateLayout::namqr_v5()
        .with_nested(tag(80), TemplateLayout::recursive(TagRange::new(10, 10)));
    let shallow = NamqrCodec::new(CodecConfig::new().with_layout(layout.clone())).unwrap();
    let deep = NamqrCodec::new(
        CodecConfig::new()
            .with_layout(layout)
            .with_max_template_depth(4),
    )
    .unwrap();

    let intent = merchant_intent()
        .to_builder()
        .unknown_field(UnknownField::new(
            FieldPath::child(tag(80), tag(10)),
            "101010060002ab",
        ))
        .build()
        .unwrap();
    let payload = deep.encode(&intent).unwrap();

    assert!(matches!(
        shallow.decode(&payload),
        Err(NamqrError::TemplateTooDeep { max_depth: 2, .. })
    ));
    assert_eq!(deep.decode(&payload).unwrap(), intent);
}
