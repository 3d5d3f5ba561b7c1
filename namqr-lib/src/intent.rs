//! Payment intent model.
//!
//! A [`PaymentIntent`] is the semantic view of a NAMQR code: who gets paid,
//! how much, in which currency, and whether the code is reusable. Intents
//! are immutable and can only be created through [`PaymentIntentBuilder`],
//! which enforces every per-field rule and the cross-field business rules.

use crate::dictionary::IntentField;
use crate::errors::SemanticRule;
use crate::tag::{FieldPath, Tag};
use crate::{NamqrError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Longest amount string the wire format allows.
pub const MAX_AMOUNT_LEN: usize = 13;

/// Whether a code may be paid more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InitiationMethod {
    /// Reusable code; the payer enters the amount.
    Static,
    /// Single-use code bound to a fixed amount.
    Dynamic,
}

impl InitiationMethod {
    /// Wire value emitted on encode (payee-presented form).
    pub fn code(self) -> &'static str {
        match self {
            Self::Static => "11",
            Self::Dynamic => "12",
        }
    }

    /// Parse a wire value. Payer-presented codes (`13`, `14`) are accepted.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "11" | "13" => Some(Self::Static),
            "12" | "14" => Some(Self::Dynamic),
            _ => None,
        }
    }
}

/// Tip or convenience fee the payer is asked for (tag 55).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TipIndicator {
    /// The payer app prompts for a tip.
    PromptTip,
    /// A fixed convenience fee is added.
    FixedFee,
    /// A percentage convenience fee is added.
    PercentageFee,
}

impl TipIndicator {
    pub fn code(self) -> &'static str {
        match self {
            Self::PromptTip => "01",
            Self::FixedFee => "02",
            Self::PercentageFee => "03",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "01" => Some(Self::PromptTip),
            "02" => Some(Self::FixedFee),
            "03" => Some(Self::PercentageFee),
            _ => None,
        }
    }
}

/// Kind of account receiving the payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AccountType {
    /// A Buffr wallet.
    BuffrWallet,
    /// A wallet held with another operator.
    ExternalWallet,
    /// A merchant account.
    Merchant,
}

impl AccountType {
    /// Every account type.
    pub const ALL: [AccountType; 3] = [Self::BuffrWallet, Self::ExternalWallet, Self::Merchant];
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::BuffrWallet => "BuffrWallet",
            Self::ExternalWallet => "ExternalWallet",
            Self::Merchant => "Merchant",
        };
        f.write_str(text)
    }
}

/// A positive decimal amount, kept as its exact wire text.
///
/// Two amounts are equal only if their text is equal: `"25.00"` and `"25.0"`
/// are different amounts on the wire. Use [`Amount::to_decimal`] for
/// arithmetic; floats are never involved.
///
/// # Examples
///
/// ```rust
/// use namqr_lib::Amount;
///
/// let amount = Amount::from_str_checked("25.00").unwrap();
/// assert_eq!(amount.as_str(), "25.00");
/// assert!(Amount::from_str_checked("25.0").unwrap() != amount);
/// assert!(Amount::from_str_checked("0.00").is_err());
/// assert!(Amount::from_str_checked("1e5").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount {
    text: String,
}

impl Amount {
    /// Validate and wrap an amount string.
    ///
    /// # Errors
    ///
    /// Returns the reason if `s` is not `digits[.d{1,2}]`, is longer than
    /// [`MAX_AMOUNT_LEN`] characters, or is not greater than zero.
    pub fn from_str_checked(s: &str) -> std::result::Result<Self, String> {
        if s.is_empty() {
            return Err("amount is empty".to_string());
        }
        if s.len() > MAX_AMOUNT_LEN {
            return Err(format!("amount longer than {MAX_AMOUNT_LEN} characters"));
        }

        let (whole, fraction) = match s.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (s, None),
        };
        let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !digits(whole) {
            return Err(format!("invalid amount '{s}'"));
        }
        if let Some(fraction) = fraction {
            if !digits(fraction) || fraction.len() > 2 {
                return Err(format!("invalid amount '{s}': at most two decimal places"));
            }
        }

        let value = Decimal::from_str(s).map_err(|e| format!("invalid amount '{s}': {e}"))?;
        if value <= Decimal::ZERO {
            return Err("amount must be greater than zero".to_string());
        }
        Ok(Self {
            text: s.to_string(),
        })
    }

    /// The exact wire text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Numeric value for arithmetic and comparisons.
    pub fn to_decimal(&self) -> Decimal {
        // Validated on construction.
        Decimal::from_str(&self.text).unwrap_or(Decimal::ZERO)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for Amount {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_str_checked(s)
    }
}

impl TryFrom<String> for Amount {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        Self::from_str_checked(&s)
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.text
    }
}

/// A field the tag dictionary does not know, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnknownField {
    /// Where the field was found.
    pub path: FieldPath,
    /// Serialized value (nested TLV text for templates).
    pub value: String,
}

impl UnknownField {
    /// Create an unknown field record.
    pub fn new(path: impl Into<FieldPath>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }
}

/// Structured payment instruction carried by a NAMQR code.
///
/// # Examples
///
/// ```rust
/// use namqr_lib::{AccountType, InitiationMethod, PaymentIntent};
///
/// let intent = PaymentIntent::builder()
///     .initiation_method(InitiationMethod::Static)
///     .account_type(AccountType::BuffrWallet)
///     .identifier("264811234567@buffr")
///     .build()
///     .unwrap();
///
/// assert_eq!(intent.currency(), "516");
/// assert_eq!(intent.country_code(), "NA");
/// assert!(intent.amount().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PaymentIntentBuilder")]
pub struct PaymentIntent {
    payload_format_version: String,
    initiation_method: InitiationMethod,
    account_type: AccountType,
    identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    merchant_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    merchant_city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    merchant_category_code: Option<String>,
    country_code: String,
    currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tip_indicator: Option<TipIndicator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    convenience_fee_fixed: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    convenience_fee_percentage: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    postal_code: Option<String>,
    purpose_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_vault_id: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    additional_data: BTreeMap<Tag, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    unknown_fields: Vec<UnknownField>,
}

impl PaymentIntent {
    /// Start building an intent with NAMQR defaults.
    pub fn builder() -> PaymentIntentBuilder {
        PaymentIntentBuilder::default()
    }

    /// A builder pre-filled with this intent's values.
    pub fn to_builder(&self) -> PaymentIntentBuilder {
        PaymentIntentBuilder {
            payload_format_version: self.payload_format_version.clone(),
            initiation_method: Some(self.initiation_method),
            account_type: Some(self.account_type),
            identifier: Some(self.identifier.clone()),
            merchant_name: self.merchant_name.clone(),
            merchant_city: self.merchant_city.clone(),
            merchant_category_code: self.merchant_category_code.clone(),
            country_code: self.country_code.clone(),
            currency: self.currency.clone(),
            amount: self.amount.as_ref().map(|a| a.as_str().to_string()),
            tip_indicator: self.tip_indicator,
            convenience_fee_fixed: self.convenience_fee_fixed.as_ref().map(|a| a.as_str().to_string()),
            convenience_fee_percentage: self
                .convenience_fee_percentage
                .as_ref()
                .map(|a| a.as_str().to_string()),
            postal_code: self.postal_code.clone(),
            purpose_code: self.purpose_code.clone(),
            token_vault_id: self.token_vault_id.clone(),
            additional_data: self.additional_data.clone(),
            unknown_fields: self.unknown_fields.clone(),
        }
    }

    pub fn payload_format_version(&self) -> &str {
        &self.payload_format_version
    }

    pub fn initiation_method(&self) -> InitiationMethod {
        self.initiation_method
    }

    pub fn account_type(&self) -> AccountType {
        self.account_type
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn merchant_name(&self) -> Option<&str> {
        self.merchant_name.as_deref()
    }

    pub fn merchant_city(&self) -> Option<&str> {
        self.merchant_city.as_deref()
    }

    pub fn merchant_category_code(&self) -> Option<&str> {
        self.merchant_category_code.as_deref()
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// ISO-4217 numeric currency code.
    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn amount(&self) -> Option<&Amount> {
        self.amount.as_ref()
    }

    pub fn tip_indicator(&self) -> Option<TipIndicator> {
        self.tip_indicator
    }

    /// Fixed convenience fee, in the transaction currency.
    pub fn convenience_fee_fixed(&self) -> Option<&Amount> {
        self.convenience_fee_fixed.as_ref()
    }

    /// Convenience fee as a percentage of the amount.
    pub fn convenience_fee_percentage(&self) -> Option<&Amount> {
        self.convenience_fee_percentage.as_ref()
    }

    pub fn postal_code(&self) -> Option<&str> {
        self.postal_code.as_deref()
    }

    pub fn purpose_code(&self) -> &str {
        &self.purpose_code
    }

    pub fn token_vault_id(&self) -> Option<&str> {
        self.token_vault_id.as_deref()
    }

    /// Children of the additional data template, by tag.
    pub fn additional_data(&self) -> &BTreeMap<Tag, String> {
        &self.additional_data
    }

    /// Fields the dictionary did not recognise, in wire order.
    pub fn unknown_fields(&self) -> &[UnknownField] {
        &self.unknown_fields
    }

    /// Value of a leaf slot, as it would appear on the wire.
    ///
    /// Namespace slots and containers have no intent-side value and return
    /// `None`.
    pub(crate) fn slot(&self, field: IntentField) -> Option<&str> {
        match field {
            IntentField::PayloadFormatVersion => Some(&self.payload_format_version),
            IntentField::InitiationMethod => Some(self.initiation_method.code()),
            IntentField::Identifier => Some(&self.identifier),
            IntentField::MerchantCategoryCode => self.merchant_category_code.as_deref(),
            IntentField::Currency => Some(&self.currency),
            IntentField::Amount => self.amount.as_ref().map(Amount::as_str),
            IntentField::CountryCode => Some(&self.country_code),
            IntentField::MerchantName => self.merchant_name.as_deref(),
            IntentField::MerchantCity => self.merchant_city.as_deref(),
            IntentField::TokenVaultId => self.token_vault_id.as_deref(),
            IntentField::PurposeCode => Some(&self.purpose_code),
            IntentField::TipIndicator => self.tip_indicator.map(TipIndicator::code),
            IntentField::ConvenienceFeeFixed => {
                self.convenience_fee_fixed.as_ref().map(Amount::as_str)
            }
            IntentField::ConvenienceFeePercentage => {
                self.convenience_fee_percentage.as_ref().map(Amount::as_str)
            }
            IntentField::PostalCode => self.postal_code.as_deref(),
            IntentField::AccountNamespace
            | IntentField::ServiceNamespace
            | IntentField::AdditionalData
            | IntentField::Group => None,
        }
    }
}

impl TryFrom<PaymentIntentBuilder> for PaymentIntent {
    type Error = NamqrError;

    fn try_from(builder: PaymentIntentBuilder) -> Result<Self> {
        builder.build()
    }
}

/// Validating builder for [`PaymentIntent`].
///
/// Also the JSON input format of the CLI: every field is optional in JSON
/// and falls back to the NAMQR default (`"01"`, `"NA"`, `"516"`, `"00"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentIntentBuilder {
    payload_format_version: String,
    initiation_method: Option<InitiationMethod>,
    account_type: Option<AccountType>,
    identifier: Option<String>,
    merchant_name: Option<String>,
    merchant_city: Option<String>,
    merchant_category_code: Option<String>,
    country_code: String,
    currency: String,
    amount: Option<String>,
    tip_indicator: Option<TipIndicator>,
    convenience_fee_fixed: Option<String>,
    convenience_fee_percentage: Option<String>,
    postal_code: Option<String>,
    purpose_code: String,
    token_vault_id: Option<String>,
    additional_data: BTreeMap<Tag, String>,
    unknown_fields: Vec<UnknownField>,
}

impl Default for PaymentIntentBuilder {
    fn default() -> Self {
        Self {
            payload_format_version: "01".to_string(),
            initiation_method: None,
            account_type: None,
            identifier: None,
            merchant_name: None,
            merchant_city: None,
            merchant_category_code: None,
            country_code: "NA".to_string(),
            currency: "516".to_string(),
            amount: None,
            tip_indicator: None,
            convenience_fee_fixed: None,
            convenience_fee_percentage: None,
            postal_code: None,
            purpose_code: "00".to_string(),
            token_vault_id: None,
            additional_data: BTreeMap::new(),
            unknown_fields: Vec::new(),
        }
    }
}

impl PaymentIntentBuilder {
    pub fn payload_format_version(mut self, version: impl Into<String>) -> Self {
        self.payload_format_version = version.into();
        self
    }

    pub fn initiation_method(mut self, method: InitiationMethod) -> Self {
        self.initiation_method = Some(method);
        self
    }

    pub fn account_type(mut self, account_type: AccountType) -> Self {
        self.account_type = Some(account_type);
        self
    }

    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn merchant_name(mut self, name: impl Into<String>) -> Self {
        self.merchant_name = Some(name.into());
        self
    }

    pub fn merchant_city(mut self, city: impl Into<String>) -> Self {
        self.merchant_city = Some(city.into());
        self
    }

    pub fn merchant_category_code(mut self, mcc: impl Into<String>) -> Self {
        self.merchant_category_code = Some(mcc.into());
        self
    }

    pub fn country_code(mut self, country: impl Into<String>) -> Self {
        self.country_code = country.into();
        self
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Set the amount text, validated on [`build`](Self::build).
    pub fn amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    /// Remove any amount.
    pub fn clear_amount(mut self) -> Self {
        self.amount = None;
        self
    }

    pub fn tip_indicator(mut self, indicator: TipIndicator) -> Self {
        self.tip_indicator = Some(indicator);
        self
    }

    /// Set a fixed convenience fee; needs [`TipIndicator::FixedFee`].
    pub fn convenience_fee_fixed(mut self, fee: impl Into<String>) -> Self {
        self.convenience_fee_fixed = Some(fee.into());
        self
    }

    /// Set a percentage convenience fee; needs [`TipIndicator::PercentageFee`].
    pub fn convenience_fee_percentage(mut self, percentage: impl Into<String>) -> Self {
        self.convenience_fee_percentage = Some(percentage.into());
        self
    }

    pub fn postal_code(mut self, postal_code: impl Into<String>) -> Self {
        self.postal_code = Some(postal_code.into());
        self
    }

    pub fn purpose_code(mut self, purpose: impl Into<String>) -> Self {
        self.purpose_code = purpose.into();
        self
    }

    pub fn token_vault_id(mut self, id: impl Into<String>) -> Self {
        self.token_vault_id = Some(id.into());
        self
    }

    /// Add a child of the additional data template.
    pub fn additional_data(mut self, tag: Tag, value: impl Into<String>) -> Self {
        self.additional_data.insert(tag, value.into());
        self
    }

    /// Append an unknown field to be re-emitted on encode.
    pub fn unknown_field(mut self, field: UnknownField) -> Self {
        self.unknown_fields.push(field);
        self
    }

    /// Replace all unknown fields.
    pub fn unknown_fields(mut self, fields: Vec<UnknownField>) -> Self {
        self.unknown_fields = fields;
        self
    }

    /// Validate and build the intent.
    ///
    /// # Errors
    ///
    /// - [`NamqrError::InvalidIntent`] for a missing or malformed field
    /// - [`NamqrError::SemanticRuleViolation`] when the fields are
    ///   individually valid but break a business rule
    pub fn build(self) -> Result<PaymentIntent> {
        let initiation_method = self
            .initiation_method
            .ok_or_else(|| NamqrError::invalid_intent("initiation_method", "is required"))?;
        let account_type = self
            .account_type
            .ok_or_else(|| NamqrError::invalid_intent("account_type", "is required"))?;
        let identifier = self
            .identifier
            .ok_or_else(|| NamqrError::invalid_intent("identifier", "is required"))?;

        let checks = [
            (IntentField::PayloadFormatVersion, Some(self.payload_format_version.as_str())),
            (IntentField::Identifier, Some(identifier.as_str())),
            (IntentField::MerchantName, self.merchant_name.as_deref()),
            (IntentField::MerchantCity, self.merchant_city.as_deref()),
            (IntentField::MerchantCategoryCode, self.merchant_category_code.as_deref()),
            (IntentField::CountryCode, Some(self.country_code.as_str())),
            (IntentField::Currency, Some(self.currency.as_str())),
            (IntentField::PurposeCode, Some(self.purpose_code.as_str())),
            (IntentField::TokenVaultId, self.token_vault_id.as_deref()),
            (IntentField::ConvenienceFeePercentage, self.convenience_fee_percentage.as_deref()),
            (IntentField::PostalCode, self.postal_code.as_deref()),
        ];
        for (field, value) in checks {
            if let Some(value) = value {
                check_slot(field, value)
                    .map_err(|reason| NamqrError::invalid_intent(field.name(), reason))?;
            }
        }

        let amount = self
            .amount
            .as_deref()
            .map(Amount::from_str_checked)
            .transpose()
            .map_err(|reason| NamqrError::invalid_intent("amount", reason))?;
        let fee = |field: IntentField, value: Option<&str>| {
            value
                .map(Amount::from_str_checked)
                .transpose()
                .map_err(|reason| NamqrError::invalid_intent(field.name(), reason))
        };
        let convenience_fee_fixed =
            fee(IntentField::ConvenienceFeeFixed, self.convenience_fee_fixed.as_deref())?;
        let convenience_fee_percentage = fee(
            IntentField::ConvenienceFeePercentage,
            self.convenience_fee_percentage.as_deref(),
        )?;

        for value in self.additional_data.values() {
            check_wire_text(value)
                .map_err(|reason| NamqrError::invalid_intent("additional_data", reason))?;
        }
        for field in &self.unknown_fields {
            let under_crc = field.path.parent == Some(Tag::CRC);
            if under_crc || field.path == FieldPath::root(Tag::CRC) {
                return Err(NamqrError::invalid_intent(
                    "unknown_fields",
                    "tag 63 is reserved for the checksum",
                ));
            }
            check_wire_text(&field.value)
                .map_err(|reason| NamqrError::invalid_intent("unknown_fields", reason))?;
        }

        check_rules(
            initiation_method,
            account_type,
            amount.as_ref(),
            self.merchant_name.as_deref(),
        )?;
        check_fee_rules(
            self.tip_indicator,
            convenience_fee_fixed.as_ref(),
            convenience_fee_percentage.as_ref(),
        )?;

        Ok(PaymentIntent {
            payload_format_version: self.payload_format_version,
            initiation_method,
            account_type,
            identifier,
            merchant_name: self.merchant_name,
            merchant_city: self.merchant_city,
            merchant_category_code: self.merchant_category_code,
            country_code: self.country_code,
            currency: self.currency,
            amount,
            tip_indicator: self.tip_indicator,
            convenience_fee_fixed,
            convenience_fee_percentage,
            postal_code: self.postal_code,
            purpose_code: self.purpose_code,
            token_vault_id: self.token_vault_id,
            additional_data: self.additional_data,
            unknown_fields: self.unknown_fields,
        })
    }
}

/// Rules a slot value must satisfy regardless of the tag dictionary.
///
/// Shared by the builder and the decoder so that both reject the same
/// values; the caller decides how to report the reason.
pub(crate) fn check_slot(field: IntentField, value: &str) -> std::result::Result<(), String> {
    let digits = |len: usize| -> std::result::Result<(), String> {
        if value.len() == len && value.bytes().all(|b| b.is_ascii_digit()) {
            Ok(())
        } else {
            Err(format!("expected {len} digits, got '{value}'"))
        }
    };

    match field {
        IntentField::PayloadFormatVersion | IntentField::PurposeCode => digits(2),
        IntentField::MerchantCategoryCode => digits(4),
        IntentField::Currency => digits(3),
        IntentField::InitiationMethod => InitiationMethod::from_code(value)
            .map(|_| ())
            .ok_or_else(|| format!("unknown initiation method '{value}'")),
        IntentField::CountryCode => {
            if value.len() == 2 && value.bytes().all(|b| b.is_ascii_uppercase()) {
                Ok(())
            } else {
                Err(format!("expected two uppercase letters, got '{value}'"))
            }
        }
        IntentField::TipIndicator => TipIndicator::from_code(value)
            .map(|_| ())
            .ok_or_else(|| format!("unknown tip or convenience indicator '{value}'")),
        IntentField::Amount | IntentField::ConvenienceFeeFixed => {
            Amount::from_str_checked(value).map(|_| ())
        }
        IntentField::ConvenienceFeePercentage => {
            let percentage = Amount::from_str_checked(value)?;
            if percentage.to_decimal() > Decimal::ONE_HUNDRED {
                return Err(format!("percentage '{value}' is above 100"));
            }
            Ok(())
        }
        IntentField::Identifier
        | IntentField::MerchantName
        | IntentField::MerchantCity
        | IntentField::PostalCode
        | IntentField::TokenVaultId
        | IntentField::AccountNamespace
        | IntentField::ServiceNamespace => {
            if value.is_empty() {
                return Err("must not be empty".to_string());
            }
            check_wire_text(value)
        }
        IntentField::AdditionalData | IntentField::Group => check_wire_text(value),
    }
}

/// Printable and short enough for a two-digit length prefix.
pub(crate) fn check_wire_text(value: &str) -> std::result::Result<(), String> {
    if value.chars().any(char::is_control) {
        return Err("contains a non-printable character".to_string());
    }
    let length = value.chars().count();
    if length > crate::tlv::MAX_VALUE_LEN {
        return Err(format!("{length} characters, maximum is {}", crate::tlv::MAX_VALUE_LEN));
    }
    Ok(())
}

/// Cross-field business rules.
pub(crate) fn check_rules(
    initiation_method: InitiationMethod,
    account_type: AccountType,
    amount: Option<&Amount>,
    merchant_name: Option<&str>,
) -> Result<()> {
    match (initiation_method, amount) {
        (InitiationMethod::Static, Some(_)) => {
            return Err(NamqrError::SemanticRuleViolation(SemanticRule::StaticWithAmount))
        }
        (InitiationMethod::Dynamic, None) => {
            return Err(NamqrError::SemanticRuleViolation(SemanticRule::DynamicWithoutAmount))
        }
        _ => {}
    }
    if account_type == AccountType::Merchant && merchant_name.is_none() {
        return Err(NamqrError::SemanticRuleViolation(SemanticRule::MerchantWithoutName));
    }
    Ok(())
}

/// A fee needs its matching indicator, and a fee indicator needs its fee.
pub(crate) fn check_fee_rules(
    indicator: Option<TipIndicator>,
    fixed: Option<&Amount>,
    percentage: Option<&Amount>,
) -> Result<()> {
    let violation = |rule| Err(NamqrError::SemanticRuleViolation(rule));
    match indicator {
        Some(TipIndicator::FixedFee) if fixed.is_none() => {
            return violation(SemanticRule::IndicatorWithoutFee)
        }
        Some(TipIndicator::PercentageFee) if percentage.is_none() => {
            return violation(SemanticRule::IndicatorWithoutFee)
        }
        _ => {}
    }
    if fixed.is_some() && indicator != Some(TipIndicator::FixedFee) {
        return violation(SemanticRule::FeeWithoutIndicator);
    }
    if percentage.is_some() && indicator != Some(TipIndicator::PercentageFee) {
        return violation(SemanticRule::FeeWithoutIndicator);
    }
    Ok(())
}
