//! Tag dictionary: which tag carries which payment intent field.
//!
//! The dictionary is plain data. It can be built in code, or loaded from
//! JSON so that deployments can track revisions of the NAMQR tag table
//! without rebuilding. [`TagDictionary::namqr_v5`] is the built-in default.

use crate::intent::AccountType;
use crate::tag::{FieldPath, Tag};
use crate::{NamqrError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Shape a field value must have on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Any printable text.
    Text,
    /// ASCII digits only.
    Numeric,
    /// A positive decimal with at most two fraction digits.
    DecimalAmount,
    /// Two uppercase ASCII letters.
    CountryCode,
    /// A nested TLV sequence.
    Template,
}

/// Intent slot a tag maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentField {
    PayloadFormatVersion,
    InitiationMethod,
    AccountNamespace,
    Identifier,
    MerchantCategoryCode,
    Currency,
    Amount,
    CountryCode,
    MerchantName,
    MerchantCity,
    AdditionalData,
    TokenVaultId,
    ServiceNamespace,
    PurposeCode,
    TipIndicator,
    ConvenienceFeeFixed,
    ConvenienceFeePercentage,
    PostalCode,
    /// A container whose children are listed in [`TagDictionary::groups`].
    Group,
}

impl IntentField {
    /// Slots every dictionary must map to a required tag.
    pub const MANDATORY: [IntentField; 8] = [
        IntentField::PayloadFormatVersion,
        IntentField::InitiationMethod,
        IntentField::AccountNamespace,
        IntentField::Identifier,
        IntentField::Currency,
        IntentField::CountryCode,
        IntentField::ServiceNamespace,
        IntentField::PurposeCode,
    ];

    /// Field name as used in builder errors and JSON.
    pub fn name(self) -> &'static str {
        match self {
            Self::PayloadFormatVersion => "payload_format_version",
            Self::InitiationMethod => "initiation_method",
            Self::AccountNamespace => "account_namespace",
            Self::Identifier => "identifier",
            Self::MerchantCategoryCode => "merchant_category_code",
            Self::Currency => "currency",
            Self::Amount => "amount",
            Self::CountryCode => "country_code",
            Self::MerchantName => "merchant_name",
            Self::MerchantCity => "merchant_city",
            Self::AdditionalData => "additional_data",
            Self::TokenVaultId => "token_vault_id",
            Self::ServiceNamespace => "service_namespace",
            Self::PurposeCode => "purpose_code",
            Self::TipIndicator => "tip_indicator",
            Self::ConvenienceFeeFixed => "convenience_fee_fixed",
            Self::ConvenienceFeePercentage => "convenience_fee_percentage",
            Self::PostalCode => "postal_code",
            Self::Group => "group",
        }
    }

    fn is_container(self) -> bool {
        matches!(self, Self::Group | Self::AdditionalData)
    }
}

impl fmt::Display for IntentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Descriptor for one tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Intent slot the value feeds.
    pub field: IntentField,
    /// Wire shape of the value.
    pub kind: FieldKind,
    /// Whether decoding fails when the tag is absent.
    #[serde(default)]
    pub required: bool,
    /// Minimum value length in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_len: Option<usize>,
    /// Maximum value length in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_len: Option<usize>,
}

impl FieldSpec {
    /// An optional field with no length limits.
    pub fn new(field: IntentField, kind: FieldKind) -> Self {
        Self {
            field,
            kind,
            required: false,
            min_len: None,
            max_len: None,
        }
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Require exactly `len` characters.
    pub fn exact_len(mut self, len: usize) -> Self {
        self.min_len = Some(len);
        self.max_len = Some(len);
        self
    }

    /// Allow at most `len` characters.
    pub fn max_len(mut self, len: usize) -> Self {
        self.max_len = Some(len);
        self
    }

    /// Check a leaf value against this descriptor.
    ///
    /// Returns the reason on failure; callers attach the field path.
    pub fn check(&self, value: &str) -> std::result::Result<(), String> {
        let length = value.chars().count();
        if let Some(min) = self.min_len {
            if length < min {
                return Err(format!("{length} characters, expected at least {min}"));
            }
        }
        if let Some(max) = self.max_len {
            if length > max {
                return Err(format!("{length} characters, expected at most {max}"));
            }
        }

        match self.kind {
            FieldKind::Text => {
                if value.chars().any(char::is_control) {
                    return Err("contains a non-printable character".to_string());
                }
            }
            FieldKind::Numeric => {
                if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
                    return Err("expected digits only".to_string());
                }
            }
            FieldKind::DecimalAmount => {
                crate::intent::Amount::from_str_checked(value)?;
            }
            FieldKind::CountryCode => {
                if value.len() != 2 || !value.bytes().all(|b| b.is_ascii_uppercase()) {
                    return Err("expected two uppercase letters".to_string());
                }
            }
            FieldKind::Template => return Err("expected a template".to_string()),
        }
        Ok(())
    }
}

/// Injectable tag table for the semantic mapper.
///
/// # Example
///
/// ```
/// use namqr_lib::dictionary::{IntentField, TagDictionary};
/// use namqr_lib::Tag;
///
/// let dictionary = TagDictionary::namqr_v5();
/// assert!(dictionary.validate().is_ok());
///
/// let amount = dictionary.field(Tag::new(54).unwrap()).unwrap();
/// assert_eq!(amount.field, IntentField::Amount);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDictionary {
    /// Root-level tags.
    pub fields: BTreeMap<Tag, FieldSpec>,
    /// Child tables of [`IntentField::Group`] tags.
    #[serde(default)]
    pub groups: BTreeMap<Tag, BTreeMap<Tag, FieldSpec>>,
    /// Namespace value identifying each account type.
    pub account_namespaces: BTreeMap<AccountType, String>,
    /// Namespace emitted in the service template.
    pub service_namespace: String,
}

impl Default for TagDictionary {
    fn default() -> Self {
        Self::namqr_v5()
    }
}

impl TagDictionary {
    /// Tag table derived from NAMQR v5.0 as used by the Buffr app.
    pub fn namqr_v5() -> Self {
        use FieldKind::*;
        use IntentField as F;

        // Every literal below is in range.
        let t = |value: u8| Tag::new(value).unwrap_or(Tag::PAYLOAD_FORMAT);

        let fields = BTreeMap::from([
            (t(0), FieldSpec::new(F::PayloadFormatVersion, Numeric).required().exact_len(2)),
            (t(1), FieldSpec::new(F::InitiationMethod, Numeric).required().exact_len(2)),
            (t(26), FieldSpec::new(F::Group, Template).required()),
            (t(52), FieldSpec::new(F::MerchantCategoryCode, Numeric).exact_len(4)),
            (t(53), FieldSpec::new(F::Currency, Numeric).required().exact_len(3)),
            (t(54), FieldSpec::new(F::Amount, DecimalAmount).max_len(13)),
            (t(55), FieldSpec::new(F::TipIndicator, Numeric).exact_len(2)),
            (t(56), FieldSpec::new(F::ConvenienceFeeFixed, DecimalAmount).max_len(13)),
            (t(57), FieldSpec::new(F::ConvenienceFeePercentage, DecimalAmount).max_len(6)),
            (t(58), FieldSpec::new(F::CountryCode, CountryCode).required()),
            (t(59), FieldSpec::new(F::MerchantName, Text).max_len(25)),
            (t(60), FieldSpec::new(F::MerchantCity, Text).max_len(15)),
            (t(61), FieldSpec::new(F::PostalCode, Text).max_len(10)),
            (t(62), FieldSpec::new(F::AdditionalData, Template)),
            (t(65), FieldSpec::new(F::TokenVaultId, Text)),
            (t(80), FieldSpec::new(F::Group, Template).required()),
        ]);

        let account = BTreeMap::from([
            (t(0), FieldSpec::new(F::AccountNamespace, Text).required()),
            (t(1), FieldSpec::new(F::Identifier, Text).required().max_len(50)),
        ]);
        let service = BTreeMap::from([
            (t(0), FieldSpec::new(F::ServiceNamespace, Text).required()),
            (t(2), FieldSpec::new(F::PurposeCode, Numeric).required().exact_len(2)),
        ]);

        Self {
            fields,
            groups: BTreeMap::from([(t(26), account), (t(80), service)]),
            account_namespaces: BTreeMap::from([
                (AccountType::BuffrWallet, "na.com.buffr.IPP".to_string()),
                (AccountType::ExternalWallet, "na.com.operator.IPP".to_string()),
                (AccountType::Merchant, "na.com.buffr.merchant".to_string()),
            ]),
            service_namespace: "na.com.buffr.namqr".to_string(),
        }
    }

    /// Load a dictionary from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let dictionary: Self = serde_json::from_str(json)?;
        dictionary.validate()?;
        Ok(dictionary)
    }

    /// Descriptor of a root tag.
    pub fn field(&self, tag: Tag) -> Option<&FieldSpec> {
        self.fields.get(&tag)
    }

    /// Child table of a group tag.
    pub fn group(&self, tag: Tag) -> Option<&BTreeMap<Tag, FieldSpec>> {
        self.groups.get(&tag)
    }

    /// Tags whose values must be templates.
    pub fn template_tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.fields
            .iter()
            .filter(|(_, spec)| spec.kind == FieldKind::Template)
            .map(|(tag, _)| *tag)
    }

    /// Account type whose namespace is `namespace`.
    pub fn account_type_for(&self, namespace: &str) -> Option<AccountType> {
        self.account_namespaces
            .iter()
            .find(|(_, value)| value.as_str() == namespace)
            .map(|(account_type, _)| *account_type)
    }

    /// Path and descriptor of the tag mapped to `field`, if any.
    pub fn locate(&self, field: IntentField) -> Option<(FieldPath, &FieldSpec)> {
        self.entries().find(|(_, spec)| spec.field == field)
    }

    fn entries(&self) -> impl Iterator<Item = (FieldPath, &FieldSpec)> + '_ {
        let root = self
            .fields
            .iter()
            .map(|(tag, spec)| (FieldPath::root(*tag), spec));
        let children = self.groups.iter().flat_map(|(parent, table)| {
            table
                .iter()
                .map(move |(tag, spec)| (FieldPath::child(*parent, *tag), spec))
        });
        root.chain(children)
    }

    /// Check the table for internal consistency.
    ///
    /// # Errors
    ///
    /// [`NamqrError::InvalidConfig`] when a slot is mapped twice, a mandatory
    /// slot is unmapped or optional, a `Template` kind sits on a non-container
    /// slot, a group has no child table (or a child table has no group), a
    /// group is nested, the checksum tag is mapped, or an account type has no
    /// namespace.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(NamqrError::InvalidConfig(msg));

        if self.fields.contains_key(&Tag::CRC) {
            return invalid(format!("tag {} is reserved for the checksum", Tag::CRC));
        }

        for (tag, spec) in &self.fields {
            let is_template = spec.kind == FieldKind::Template;
            if is_template != spec.field.is_container() {
                return invalid(format!(
                    "tag {tag}: field {} cannot have kind {:?}",
                    spec.field, spec.kind
                ));
            }
            if spec.field == IntentField::Group && !self.groups.contains_key(tag) {
                return invalid(format!("group tag {tag} has no child table"));
            }
        }

        for (parent, table) in &self.groups {
            match self.fields.get(parent) {
                Some(spec) if spec.field == IntentField::Group => {}
                _ => return invalid(format!("child table {parent} has no group tag")),
            }
            if let Some((tag, _)) = table
                .iter()
                .find(|(_, spec)| spec.kind == FieldKind::Template || spec.field.is_container())
            {
                return invalid(format!("tag {parent}.{tag}: groups cannot be nested"));
            }
        }

        let mut seen = BTreeSet::new();
        for (path, spec) in self.entries() {
            if spec.field != IntentField::Group && !seen.insert(spec.field) {
                return invalid(format!("field {} is mapped twice (again at {path})", spec.field));
            }
        }

        for field in IntentField::MANDATORY {
            let Some((path, spec)) = self.locate(field) else {
                return invalid(format!("mandatory field {field} has no tag"));
            };
            if !spec.required {
                return invalid(format!("mandatory field {field} at {path} must be required"));
            }
            if let Some(parent) = path.parent {
                if !self.fields.get(&parent).is_some_and(|group| group.required) {
                    return invalid(format!("mandatory field {field} sits in optional group {parent}"));
                }
            }
        }

        for account_type in AccountType::ALL {
            match self.account_namespaces.get(&account_type) {
                Some(namespace) if !namespace.is_empty() => {}
                _ => return invalid(format!("account type {account_type} has no namespace")),
            }
        }
        let distinct: BTreeSet<&String> = self.account_namespaces.values().collect();
        if distinct.len() != self.account_namespaces.len() {
            return invalid("account namespaces must be distinct".to_string());
        }
        if self.service_namespace.is_empty() {
            return invalid("service namespace must not be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(value: u8) -> Tag {
        Tag::new(value).unwrap()
    }

    #[test]
    fn test_default_dictionary_is_valid() {
        let dictionary = TagDictionary::namqr_v5();
        dictionary.validate().unwrap();
        assert_eq!(dictionary, TagDictionary::default());

        let (path, spec) = dictionary.locate(IntentField::PurposeCode).unwrap();
        assert_eq!(path.to_string(), "80.02");
        assert_eq!(spec.max_len, Some(2));

        let templates: Vec<Tag> = dictionary.template_tags().collect();
        assert_eq!(templates, vec![tag(26), tag(62), tag(80)]);
    }

    #[test]
    fn test_fee_and_postal_tags() {
        let dictionary = TagDictionary::namqr_v5();
        let located: Vec<String> = [
            IntentField::TipIndicator,
            IntentField::ConvenienceFeeFixed,
            IntentField::ConvenienceFeePercentage,
            IntentField::PostalCode,
        ]
        .into_iter()
        .map(|field| dictionary.locate(field).unwrap().0.to_string())
        .collect();
        assert_eq!(located, vec!["55", "56", "57", "61"]);

        let tip = dictionary.field(tag(55)).unwrap();
        assert_eq!(tip.kind, FieldKind::Numeric);
        assert!(tip.check("02").is_ok());
        assert!(tip.check("2").is_err());
        assert!(!tip.required);

        let percentage = dictionary.field(tag(57)).unwrap();
        assert!(percentage.check("12.5").is_ok());
        assert!(percentage.check("abc").is_err());
        assert!(dictionary.field(tag(61)).unwrap().check("10005-1234").is_ok());
        assert!(dictionary.field(tag(61)).unwrap().check("10005-12345").is_err());
    }

    #[test]
    fn test_account_lookup() {
        let dictionary = TagDictionary::namqr_v5();
        assert_eq!(
            dictionary.account_type_for("na.com.buffr.IPP"),
            Some(AccountType::BuffrWallet)
        );
        assert_eq!(dictionary.account_type_for("na.com.unknown"), None);
    }

    #[test]
    fn test_field_spec_check() {
        let currency = FieldSpec::new(IntentField::Currency, FieldKind::Numeric).exact_len(3);
        assert!(currency.check("516").is_ok());
        assert!(currency.check("51").is_err());
        assert!(currency.check("5a6").is_err());

        let country = FieldSpec::new(IntentField::CountryCode, FieldKind::CountryCode);
        assert!(country.check("NA").is_ok());
        assert!(country.check("na").is_err());

        let amount = FieldSpec::new(IntentField::Amount, FieldKind::DecimalAmount);
        assert!(amount.check("25.00").is_ok());
        assert!(amount.check("25.000").is_err());

        let name = FieldSpec::new(IntentField::MerchantName, FieldKind::Text).max_len(5);
        assert!(name.check("Café").is_ok());
        assert!(name.check("Joe's Shop").is_err());
        assert!(name.check("a\nb").is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_slot() {
        let mut dictionary = TagDictionary::namqr_v5();
        dictionary.fields.insert(
            tag(67),
            FieldSpec::new(IntentField::Currency, FieldKind::Numeric),
        );
        assert!(matches!(
            dictionary.validate(),
            Err(NamqrError::InvalidConfig(msg)) if msg.contains("mapped twice")
        ));
    }

    #[test]
    fn test_validate_rejects_optional_mandatory_slot() {
        let mut dictionary = TagDictionary::namqr_v5();
        if let Some(spec) = dictionary.fields.get_mut(&tag(53)) {
            spec.required = false;
        }
        assert!(dictionary.validate().is_err());

        let mut dictionary = TagDictionary::namqr_v5();
        if let Some(spec) = dictionary.fields.get_mut(&tag(80)) {
            spec.required = false;
        }
        assert!(dictionary.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_templates() {
        let mut dictionary = TagDictionary::namqr_v5();
        dictionary.fields.insert(
            tag(59),
            FieldSpec::new(IntentField::MerchantName, FieldKind::Template),
        );
        assert!(dictionary.validate().is_err());

        let mut dictionary = TagDictionary::namqr_v5();
        dictionary.groups.remove(&tag(80));
        assert!(dictionary.validate().is_err());

        let mut dictionary = TagDictionary::namqr_v5();
        if let Some(table) = dictionary.groups.get_mut(&tag(26)) {
            table.insert(tag(5), FieldSpec::new(IntentField::Group, FieldKind::Template));
        }
        assert!(dictionary.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_crc_tag_and_missing_namespace() {
        let mut dictionary = TagDictionary::namqr_v5();
        dictionary.fields.insert(
            Tag::CRC,
            FieldSpec::new(IntentField::TokenVaultId, FieldKind::Text),
        );
        assert!(dictionary.validate().is_err());

        let mut dictionary = TagDictionary::namqr_v5();
        dictionary.account_namespaces.remove(&AccountType::Merchant);
        assert!(dictionary.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let dictionary = TagDictionary::namqr_v5();
        let json = serde_json::to_string_pretty(&dictionary).unwrap();
        assert!(json.contains("\"merchant_name\""));
        assert!(json.contains("\"BuffrWallet\""));

        let loaded = TagDictionary::from_json(&json).unwrap();
        assert_eq!(loaded, dictionary);

        assert!(matches!(
            TagDictionary::from_json("{\"fields\": 5}"),
            Err(NamqrError::InvalidConfig(_))
        ));
    }
}
