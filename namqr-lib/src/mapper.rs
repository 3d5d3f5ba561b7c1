//! Semantic mapping between TLV trees and payment intents.
//!
//! The mapper is driven entirely by a [`TagDictionary`]; it has no
//! hard-coded tag numbers apart from the checksum tag. Tags the dictionary
//! does not know are carried through as [`UnknownField`]s so that a decoded
//! code can be re-encoded without losing data.

use crate::dictionary::{FieldSpec, IntentField, TagDictionary};
use crate::intent::{
    check_slot, check_wire_text, InitiationMethod, PaymentIntent, TipIndicator, UnknownField,
};
use crate::tag::{FieldPath, Tag};
use crate::tlv::{write_nodes, TlvNode, TlvTree, TlvValue};
use crate::{NamqrError, Result};
use std::collections::{BTreeMap, BTreeSet};

/// Optional slots an intent may carry that need a tag to be encoded.
const OPTIONAL_SLOTS: [IntentField; 9] = [
    IntentField::MerchantCategoryCode,
    IntentField::Amount,
    IntentField::TipIndicator,
    IntentField::ConvenienceFeeFixed,
    IntentField::ConvenienceFeePercentage,
    IntentField::MerchantName,
    IntentField::MerchantCity,
    IntentField::PostalCode,
    IntentField::TokenVaultId,
];

/// Interpret an expanded tree as a payment intent.
///
/// The checksum node is skipped; it must already have been verified.
///
/// # Errors
///
/// - [`NamqrError::DuplicateTag`] when a known tag occurs twice at one level
/// - [`NamqrError::InvalidFieldValue`] when a value does not fit its descriptor
/// - [`NamqrError::MissingField`] when a required tag is absent
/// - [`NamqrError::SemanticRuleViolation`] when a business rule is broken
pub fn to_intent(tree: &TlvTree, dictionary: &TagDictionary) -> Result<PaymentIntent> {
    let mut slots = Slots::default();
    let mut additional_data = BTreeMap::new();
    let mut unknown = Vec::new();
    let mut seen = BTreeSet::new();

    for node in tree.nodes() {
        if node.tag == Tag::CRC {
            continue;
        }
        let path = FieldPath::root(node.tag);
        let Some(spec) = dictionary.field(node.tag) else {
            unknown.push(unknown_field(path, node)?);
            continue;
        };
        if !seen.insert(node.tag) {
            return Err(NamqrError::DuplicateTag(path));
        }

        match spec.field {
            IntentField::Group => {
                let table = dictionary.group(node.tag).ok_or_else(|| {
                    NamqrError::InvalidConfig(format!("group tag {} has no child table", node.tag))
                })?;
                let mut seen_children = BTreeSet::new();
                for child in template_children(node, path)? {
                    let child_path = FieldPath::child(node.tag, child.tag);
                    let Some(child_spec) = table.get(&child.tag) else {
                        unknown.push(unknown_field(child_path, child)?);
                        continue;
                    };
                    if !seen_children.insert(child.tag) {
                        return Err(NamqrError::DuplicateTag(child_path));
                    }
                    let value = leaf_value(child, child_path, child_spec)?;
                    slots.insert(child_spec.field, child_path, value);
                }
                if let Some(missing) = table
                    .iter()
                    .find(|(tag, spec)| spec.required && !seen_children.contains(*tag))
                {
                    return Err(NamqrError::MissingField(FieldPath::child(node.tag, *missing.0)));
                }
            }
            IntentField::AdditionalData => {
                for child in template_children(node, path)? {
                    let child_path = FieldPath::child(node.tag, child.tag);
                    let text = node_text(child)?;
                    check_wire_text(&text)
                        .map_err(|reason| NamqrError::invalid_field(child_path, reason))?;
                    if additional_data.insert(child.tag, text).is_some() {
                        return Err(NamqrError::DuplicateTag(child_path));
                    }
                }
            }
            field => {
                let value = leaf_value(node, path, spec)?;
                slots.insert(field, path, value);
            }
        }
    }

    if let Some((tag, _)) = dictionary
        .fields
        .iter()
        .find(|(tag, spec)| spec.required && !seen.contains(*tag))
    {
        return Err(NamqrError::MissingField(FieldPath::root(*tag)));
    }

    let (namespace_path, namespace) = slots.require(IntentField::AccountNamespace, dictionary)?;
    let account_type = dictionary.account_type_for(namespace).ok_or_else(|| {
        NamqrError::invalid_field(namespace_path, format!("unknown account namespace '{namespace}'"))
    })?;
    let (initiation_path, code) = slots.require(IntentField::InitiationMethod, dictionary)?;
    let initiation_method = InitiationMethod::from_code(code).ok_or_else(|| {
        NamqrError::invalid_field(initiation_path, format!("unknown initiation method '{code}'"))
    })?;
    slots.require(IntentField::ServiceNamespace, dictionary)?;

    let mut builder = PaymentIntent::builder()
        .payload_format_version(slots.require(IntentField::PayloadFormatVersion, dictionary)?.1)
        .initiation_method(initiation_method)
        .account_type(account_type)
        .identifier(slots.require(IntentField::Identifier, dictionary)?.1)
        .country_code(slots.require(IntentField::CountryCode, dictionary)?.1)
        .currency(slots.require(IntentField::Currency, dictionary)?.1)
        .purpose_code(slots.require(IntentField::PurposeCode, dictionary)?.1)
        .unknown_fields(unknown);

    if let Some(value) = slots.get(IntentField::MerchantName) {
        builder = builder.merchant_name(value);
    }
    if let Some(value) = slots.get(IntentField::MerchantCity) {
        builder = builder.merchant_city(value);
    }
    if let Some(value) = slots.get(IntentField::MerchantCategoryCode) {
        builder = builder.merchant_category_code(value);
    }
    if let Some(value) = slots.get(IntentField::Amount) {
        builder = builder.amount(value);
    }
    if let Some(value) = slots.get(IntentField::TokenVaultId) {
        builder = builder.token_vault_id(value);
    }
    if let Some((path, code)) = slots.entry(IntentField::TipIndicator) {
        let indicator = TipIndicator::from_code(code).ok_or_else(|| {
            NamqrError::invalid_field(path, format!("unknown tip or convenience indicator '{code}'"))
        })?;
        builder = builder.tip_indicator(indicator);
    }
    if let Some(value) = slots.get(IntentField::ConvenienceFeeFixed) {
        builder = builder.convenience_fee_fixed(value);
    }
    if let Some(value) = slots.get(IntentField::ConvenienceFeePercentage) {
        builder = builder.convenience_fee_percentage(value);
    }
    if let Some(value) = slots.get(IntentField::PostalCode) {
        builder = builder.postal_code(value);
    }
    for (tag, value) in additional_data {
        builder = builder.additional_data(tag, value);
    }

    builder.build()
}

/// Lay out a payment intent as a TLV tree, without the checksum node.
///
/// Output is deterministic: tags ascend at every level, unknown fields are
/// merged in by tag with their original relative order kept, and empty
/// templates are omitted. Unknown fields whose parent tag is not a
/// dictionary container are wrapped in a template under that parent.
///
/// # Errors
///
/// - [`NamqrError::InvalidFieldValue`] when a value breaks its descriptor
///   (for example a merchant name longer than the dictionary allows)
/// - [`NamqrError::DuplicateTag`] when an unknown field collides with a known tag
/// - [`NamqrError::InvalidIntent`] when the intent carries a value the
///   dictionary has no tag for
pub fn from_intent(intent: &PaymentIntent, dictionary: &TagDictionary) -> Result<TlvTree> {
    let mut root = Vec::new();

    for (tag, spec) in &dictionary.fields {
        let path = FieldPath::root(*tag);
        match spec.field {
            IntentField::Group => {
                let table = dictionary.group(*tag).ok_or_else(|| {
                    NamqrError::InvalidConfig(format!("group tag {tag} has no child table"))
                })?;
                let mut children = Vec::new();
                for (child_tag, child_spec) in table {
                    let child_path = FieldPath::child(*tag, *child_tag);
                    if let Some(value) = slot_value(intent, child_spec.field, dictionary)? {
                        check_emitted(child_path, child_spec, value)?;
                        children.push(TlvNode::leaf(*child_tag, value));
                    }
                }
                merge_unknown(&mut children, intent, *tag, |child| table.contains_key(&child))?;
                if !children.is_empty() {
                    root.push(TlvNode::template(*tag, children));
                }
            }
            IntentField::AdditionalData => {
                let data = intent.additional_data();
                let mut children: Vec<TlvNode> = data
                    .iter()
                    .map(|(child_tag, value)| TlvNode::leaf(*child_tag, value.as_str()))
                    .collect();
                merge_unknown(&mut children, intent, *tag, |child| data.contains_key(&child))?;
                if !children.is_empty() {
                    root.push(TlvNode::template(*tag, children));
                }
            }
            field => {
                if let Some(value) = slot_value(intent, field, dictionary)? {
                    check_emitted(path, spec, value)?;
                    root.push(TlvNode::leaf(*tag, value));
                }
            }
        }
    }

    for field in OPTIONAL_SLOTS {
        if intent.slot(field).is_some() && dictionary.locate(field).is_none() {
            return Err(NamqrError::invalid_intent(field.name(), "has no tag in the dictionary"));
        }
    }
    if !intent.additional_data().is_empty() && dictionary.locate(IntentField::AdditionalData).is_none() {
        return Err(NamqrError::invalid_intent(
            IntentField::AdditionalData.name(),
            "has no tag in the dictionary",
        ));
    }

    let mut synthetic: BTreeMap<Tag, Vec<TlvNode>> = BTreeMap::new();
    for field in intent.unknown_fields() {
        let leaf = TlvNode::leaf(field.path.tag, field.value.as_str());
        match field.path.parent {
            None if dictionary.field(field.path.tag).is_some() => {
                return Err(NamqrError::DuplicateTag(field.path));
            }
            None => root.push(leaf),
            Some(parent) => match dictionary.field(parent) {
                // Already merged into the container above.
                Some(spec) if matches!(spec.field, IntentField::Group | IntentField::AdditionalData) => {}
                Some(_) => return Err(NamqrError::DuplicateTag(FieldPath::root(parent))),
                None => synthetic.entry(parent).or_default().push(leaf),
            },
        }
    }
    for (parent, mut children) in synthetic {
        children.sort_by_key(|node| node.tag);
        root.push(TlvNode::template(parent, children));
    }

    root.sort_by_key(|node| node.tag);
    Ok(TlvTree::new(root))
}

/// Leaf values collected during decode, keyed by intent slot.
#[derive(Default)]
struct Slots<'a> {
    values: BTreeMap<IntentField, (FieldPath, &'a str)>,
}

impl<'a> Slots<'a> {
    fn insert(&mut self, field: IntentField, path: FieldPath, value: &'a str) {
        self.values.insert(field, (path, value));
    }

    fn get(&self, field: IntentField) -> Option<&'a str> {
        self.values.get(&field).map(|(_, value)| *value)
    }

    fn entry(&self, field: IntentField) -> Option<(FieldPath, &'a str)> {
        self.values.get(&field).copied()
    }

    fn require(&self, field: IntentField, dictionary: &TagDictionary) -> Result<(FieldPath, &'a str)> {
        if let Some(entry) = self.values.get(&field) {
            return Ok(*entry);
        }
        match dictionary.locate(field) {
            Some((path, _)) => Err(NamqrError::MissingField(path)),
            None => Err(NamqrError::InvalidConfig(format!("field {field} has no tag"))),
        }
    }
}

fn leaf_value<'a>(node: &'a TlvNode, path: FieldPath, spec: &FieldSpec) -> Result<&'a str> {
    let value = node
        .as_leaf()
        .ok_or_else(|| NamqrError::invalid_field(path, "expected a plain value, found a template"))?;
    spec.check(value)
        .and_then(|()| check_slot(spec.field, value))
        .map_err(|reason| NamqrError::invalid_field(path, reason))?;
    Ok(value)
}

fn template_children(node: &TlvNode, path: FieldPath) -> Result<&[TlvNode]> {
    node.children()
        .ok_or_else(|| NamqrError::invalid_field(path, "expected a template"))
}

fn unknown_field(path: FieldPath, node: &TlvNode) -> Result<UnknownField> {
    let value = node_text(node)?;
    check_wire_text(&value).map_err(|reason| NamqrError::invalid_field(path, reason))?;
    Ok(UnknownField::new(path, value))
}

/// Serialized value of a node: the leaf text, or the TLV text of a template.
fn node_text(node: &TlvNode) -> Result<String> {
    match &node.value {
        TlvValue::Leaf(value) => Ok(value.clone()),
        TlvValue::Template(children) => write_nodes(children),
    }
}

fn slot_value<'a>(
    intent: &'a PaymentIntent,
    field: IntentField,
    dictionary: &'a TagDictionary,
) -> Result<Option<&'a str>> {
    match field {
        IntentField::AccountNamespace => dictionary
            .account_namespaces
            .get(&intent.account_type())
            .map(|namespace| Some(namespace.as_str()))
            .ok_or_else(|| {
                NamqrError::InvalidConfig(format!(
                    "account type {} has no namespace",
                    intent.account_type()
                ))
            }),
        IntentField::ServiceNamespace => Ok(Some(dictionary.service_namespace.as_str())),
        field => Ok(intent.slot(field)),
    }
}

fn check_emitted(path: FieldPath, spec: &FieldSpec, value: &str) -> Result<()> {
    spec.check(value)
        .map_err(|reason| NamqrError::invalid_field(path, reason))
}

/// Append unknown children of `parent` and restore tag order.
fn merge_unknown(
    children: &mut Vec<TlvNode>,
    intent: &PaymentIntent,
    parent: Tag,
    is_known: impl Fn(Tag) -> bool,
) -> Result<()> {
    for field in intent
        .unknown_fields()
        .iter()
        .filter(|field| field.path.parent == Some(parent))
    {
        if is_known(field.path.tag) {
            return Err(NamqrError::DuplicateTag(field.path));
        }
        children.push(TlvNode::leaf(field.path.tag, field.value.as_str()));
    }
    children.sort_by_key(|node| node.tag);
    Ok(())
}
