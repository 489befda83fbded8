//! Documents carried inside an envelope.
//!
//! Bills (invoices and orders) are decoded into typed structures so the
//! renderer can lay them out. Any other GOBL document is kept as raw JSON;
//! it is a valid envelope payload, the renderer just has no template for it.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::envelope::error::{EnvelopeError, EnvelopeResult};

/// Key holding a document's schema URL.
pub const SCHEMA_KEY: &str = "$schema";

/// Prefix shared by every GOBL schema.
pub const SCHEMA_BASE: &str = "https://gobl.org/";

pub const INVOICE_SCHEMA: &str = "https://gobl.org/draft-0/bill/invoice";
pub const ORDER_SCHEMA: &str = "https://gobl.org/draft-0/bill/order";

/// The payload of an envelope.
#[derive(Debug, Clone)]
pub enum Document {
    Invoice(Bill),
    Order(Bill),
    /// A GOBL document without a typed model.
    Other {
        schema: String,
        data: Map<String, Value>,
    },
}

impl Document {
    /// Schema URL identifying the document type.
    pub fn schema(&self) -> &str {
        match self {
            Document::Invoice(_) => INVOICE_SCHEMA,
            Document::Order(_) => ORDER_SCHEMA,
            Document::Other { schema, .. } => schema,
        }
    }

    pub(crate) fn validate(&self) -> EnvelopeResult<()> {
        match self {
            Document::Invoice(bill) | Document::Order(bill) => bill.validate(),
            Document::Other { schema, .. } => {
                if schema.starts_with(SCHEMA_BASE) {
                    Ok(())
                } else {
                    Err(EnvelopeError::invalid(
                        "doc.$schema",
                        format!("unknown schema '{}'", schema),
                    ))
                }
            }
        }
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let data = Map::<String, Value>::deserialize(deserializer)?;
        let schema = match data.get(SCHEMA_KEY) {
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(D::Error::custom("doc: $schema must be a string")),
            None => return Err(D::Error::missing_field(SCHEMA_KEY)),
        };

        let bill = |data: Map<String, Value>| {
            Bill::deserialize(Value::Object(data))
                .map_err(|e| D::Error::custom(format!("doc: {}", e)))
        };

        match schema.as_str() {
            INVOICE_SCHEMA => bill(data).map(Document::Invoice),
            ORDER_SCHEMA => bill(data).map(Document::Order),
            _ => Ok(Document::Other { schema, data }),
        }
    }
}

/// Decimal amount, kept as the exact string sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Amount(String);

impl Amount {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.chars().all(|c| matches!(c, '0' | '.' | '-'))
    }
}

impl TryFrom<String> for Amount {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let digits = value.strip_prefix('-').unwrap_or(&value);
        let (int, frac) = match digits.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (digits, None),
        };
        let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if all_digits(int) && frac.map_or(true, all_digits) {
            Ok(Self(value))
        } else {
            Err(format!("invalid amount '{}'", value))
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Calendar date in `YYYY-MM-DD` form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Date(String);

impl Date {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Date {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let valid = match value.split('-').collect::<Vec<_>>().as_slice() {
            [y, m, d] if y.len() == 4 && m.len() == 2 && d.len() == 2 => {
                match (digits(y), digits(m), digits(d)) {
                    (Some(y), Some(m), Some(d)) => {
                        (1..=12).contains(&m) && d >= 1 && d <= days_in_month(y, m)
                    }
                    _ => false,
                }
            }
            _ => false,
        };
        if valid {
            Ok(Self(value))
        } else {
            Err(format!("invalid date '{}'", value))
        }
    }
}

/// Parse a run of ASCII digits; signs and other characters are rejected.
fn digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An invoice or order.
#[derive(Debug, Clone, Deserialize)]
pub struct Bill {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub series: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    pub issue_date: Date,
    #[serde(default)]
    pub op_date: Option<Date>,
    pub currency: String,
    pub supplier: Party,
    #[serde(default)]
    pub customer: Option<Party>,
    #[serde(default)]
    pub lines: Vec<Line>,
    #[serde(default)]
    pub payment: Option<Payment>,
    pub totals: Totals,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl Bill {
    /// Series and code joined the way they are printed.
    pub fn reference(&self) -> Option<String> {
        match (&self.series, &self.code) {
            (Some(series), Some(code)) => Some(format!("{}-{}", series, code)),
            (None, Some(code)) => Some(code.clone()),
            _ => None,
        }
    }

    fn validate(&self) -> EnvelopeResult<()> {
        if self.currency.len() != 3 || !self.currency.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(EnvelopeError::invalid(
                "doc.currency",
                format!("invalid currency code '{}'", self.currency),
            ));
        }
        self.supplier.validate("doc.supplier")?;
        if let Some(customer) = &self.customer {
            customer.validate("doc.customer")?;
        }
        for (pos, line) in self.lines.iter().enumerate() {
            let expected = pos as u32 + 1;
            if line.i != expected {
                return Err(EnvelopeError::invalid(
                    format!("doc.lines[{}].i", pos),
                    format!("expected {}, got {}", expected, line.i),
                ));
            }
            if line.item.name.trim().is_empty() {
                return Err(EnvelopeError::invalid(
                    format!("doc.lines[{}].item.name", pos),
                    "must not be empty",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Party {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub tax_id: Option<TaxId>,
    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub emails: Vec<Email>,
    #[serde(default)]
    pub telephones: Vec<Telephone>,
}

impl Party {
    fn validate(&self, path: &str) -> EnvelopeResult<()> {
        if self.name.trim().is_empty() {
            return Err(EnvelopeError::invalid(format!("{}.name", path), "must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaxId {
    pub country: String,
    #[serde(default)]
    pub code: Option<String>,
}

impl fmt::Display for TaxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{}{}", self.country, code),
            None => f.write_str(&self.country),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub num: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub street_extra: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl Address {
    /// Printable lines, skipping empty parts.
    pub fn lines(&self) -> Vec<String> {
        let mut out = Vec::new();
        let street = [self.street.as_deref(), self.num.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ");
        if !street.is_empty() {
            out.push(street);
        }
        if let Some(extra) = &self.street_extra {
            out.push(extra.clone());
        }
        let city = [self.code.as_deref(), self.locality.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if !city.is_empty() {
            out.push(city);
        }
        let region = [self.region.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ");
        if !region.is_empty() {
            out.push(region);
        }
        out
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Email {
    pub addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Telephone {
    pub num: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Line {
    pub i: u32,
    pub quantity: Amount,
    pub item: Item,
    pub sum: Amount,
    #[serde(default)]
    pub discounts: Vec<LineDiscount>,
    #[serde(default)]
    pub taxes: Vec<TaxCombo>,
    pub total: Amount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Item {
    pub name: String,
    pub price: Amount,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineDiscount {
    #[serde(default)]
    pub percent: Option<String>,
    pub amount: Amount,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaxCombo {
    pub cat: String,
    #[serde(default)]
    pub rate: Option<String>,
    #[serde(default)]
    pub percent: Option<String>,
}

impl fmt::Display for TaxCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.percent {
            Some(percent) => write!(f, "{} {}", self.cat, percent),
            None => f.write_str(&self.cat),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Payment {
    #[serde(default)]
    pub terms: Option<PaymentTerms>,
    #[serde(default)]
    pub instructions: Option<PaymentInstructions>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentTerms {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub due_dates: Vec<DueDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DueDate {
    pub date: Date,
    pub amount: Amount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentInstructions {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub credit_transfer: Vec<CreditTransfer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreditTransfer {
    #[serde(default)]
    pub iban: Option<String>,
    #[serde(default)]
    pub bic: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Totals {
    pub sum: Amount,
    #[serde(default)]
    pub discount: Option<Amount>,
    #[serde(default)]
    pub charge: Option<Amount>,
    pub total: Amount,
    #[serde(default)]
    pub taxes: Option<TaxTotal>,
    #[serde(default)]
    pub tax: Option<Amount>,
    pub total_with_tax: Amount,
    pub payable: Amount,
    #[serde(default)]
    pub advance: Option<Amount>,
    #[serde(default)]
    pub due: Option<Amount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaxTotal {
    #[serde(default)]
    pub categories: Vec<CategoryTotal>,
    pub sum: Amount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryTotal {
    pub code: String,
    #[serde(default)]
    pub rates: Vec<RateTotal>,
    pub amount: Amount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateTotal {
    #[serde(default)]
    pub key: Option<String>,
    pub base: Amount,
    #[serde(default)]
    pub percent: Option<String>,
    pub amount: Amount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Note {
    #[serde(default)]
    pub key: Option<String>,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_parsing() {
        assert!(Amount::try_from("100.00".to_string()).is_ok());
        assert!(Amount::try_from("-3".to_string()).is_ok());
        assert!(Amount::try_from("1.".to_string()).is_err());
        assert!(Amount::try_from("1,5".to_string()).is_err());
        assert!(Amount::try_from("".to_string()).is_err());
        assert!(Amount::try_from("0.00".to_string()).unwrap().is_zero());
    }

    #[test]
    fn test_date_parsing() {
        assert!(Date::try_from("2024-02-29".to_string()).is_ok());
        assert!(Date::try_from("2024-13-01".to_string()).is_err());
        assert!(Date::try_from("24-01-01".to_string()).is_err());
        assert!(Date::try_from("2024/01/01".to_string()).is_err());
        assert!(Date::try_from("+024-+1-+5".to_string()).is_err());
        assert!(Date::try_from("2024-02-31".to_string()).is_err());
        assert!(Date::try_from("2023-02-29".to_string()).is_err());
        assert!(Date::try_from("1900-02-29".to_string()).is_err());
        assert!(Date::try_from("2000-02-29".to_string()).is_ok());
        assert!(Date::try_from("2024-04-31".to_string()).is_err());
        assert!(Date::try_from("2024-12-31".to_string()).is_ok());
    }

    #[test]
    fn test_address_lines() {
        let address = Address {
            num: Some("42".into()),
            street: Some("Calle Mayor".into()),
            street_extra: None,
            locality: Some("Madrid".into()),
            region: None,
            code: Some("28013".into()),
            country: Some("ES".into()),
        };
        assert_eq!(address.lines(), vec!["Calle Mayor, 42", "28013 Madrid", "ES"]);
    }

    #[test]
    fn test_unknown_document_is_kept_raw() {
        let doc: Document = serde_json::from_str(
            r#"{"$schema": "https://gobl.org/draft-0/note/message", "content": "hi"}"#,
        )
        .unwrap();
        assert_eq!(doc.schema(), "https://gobl.org/draft-0/note/message");
        assert!(matches!(doc, Document::Other { ref data, .. } if data.contains_key("content")));
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_foreign_schema_fails_validation() {
        let doc: Document =
            serde_json::from_str(r#"{"$schema": "https://example.com/thing"}"#).unwrap();
        assert!(doc.validate().is_err());
    }

    #[test]
    fn test_document_requires_schema() {
        let err = serde_json::from_str::<Document>(r#"{"code": "1"}"#).unwrap_err();
        assert!(err.to_string().contains("$schema"));
    }
}
