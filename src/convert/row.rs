//! Parsing of individual export rows.
//!
//! Two layouts are understood:
//! - the pretix order export, recognised by its `Kod zamówienia` header;
//!   amounts are gross and split by tax rate into `Brutto dla podatku N %`
//!   columns.
//! - a headerless positional layout
//!   `order_id;buyer_name;description;quantity;unit_net_price;tax_rate`
//!   followed by optional `currency;street;postal_code;city;country;email;order_date`.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use csv::StringRecord;
use rust_decimal::Decimal;

use crate::core::{CalculationBase, VatRate, parse_locale_decimal};

use super::config::ConverterConfig;

pub(crate) const PRETIX_ORDER_CODE: &str = "Kod zamówienia";
const PRETIX_GROSS_PREFIX: &str = "Brutto dla podatku ";

/// One parsed export row. Exists only during conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRow {
    /// 1-based line in the source file.
    pub line: u64,
    pub order_id: String,
    pub order_date: Option<NaiveDate>,
    pub buyer: Buyer,
    pub items: Vec<OrderItem>,
    /// Amount the buyer paid, when the export states it.
    pub paid: Option<Decimal>,
    pub currency: String,
    pub price_basis: CalculationBase,
}

/// Buyer fields as they appear in the export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Buyer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
    /// Name taken from the company column rather than a person.
    pub company: bool,
}

/// A billable item taken from a row.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub vat: VatRate,
}

/// Why a row was left out of the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: u64,
    pub order_id: Option<String>,
    pub reason: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.order_id {
            Some(id) => write!(f, "line {} (order {id}): {}", self.line, self.reason),
            None => write!(f, "line {}: {}", self.line, self.reason),
        }
    }
}

impl std::error::Error for RowError {}

impl RowError {
    pub fn new(line: u64, order_id: Option<&str>, reason: impl Into<String>) -> Self {
        Self {
            line,
            order_id: order_id.filter(|id| !id.is_empty()).map(str::to_string),
            reason: reason.into(),
        }
    }
}

/// Which layout a file uses, decided from its first record.
#[derive(Debug, Clone)]
pub enum CsvLayout {
    Pretix(PretixColumns),
    Simple,
}

impl CsvLayout {
    /// Inspect the first record. Returns the layout and whether that record
    /// is a header to be skipped.
    pub fn detect(first: &StringRecord) -> (Self, bool) {
        let fields: Vec<&str> = first.iter().map(clean_header).collect();
        if fields.contains(&PRETIX_ORDER_CODE) {
            return (Self::Pretix(PretixColumns::from_header(&fields)), true);
        }
        let is_header = fields
            .first()
            .is_some_and(|f| f.eq_ignore_ascii_case("order_id"));
        (Self::Simple, is_header)
    }

    pub fn parse(
        &self,
        record: &StringRecord,
        line: u64,
        config: &ConverterConfig,
    ) -> Result<OrderRow, RowError> {
        match self {
            Self::Pretix(columns) => columns.parse(record, line, config),
            Self::Simple => parse_simple(record, line, config),
        }
    }
}

fn clean_header(field: &str) -> &str {
    field.trim_start_matches('\u{feff}').trim()
}

/// Column positions of a pretix order export.
#[derive(Debug, Clone)]
pub struct PretixColumns {
    index: HashMap<String, usize>,
    /// `(rate, column)` for every `Brutto dla podatku N %` column.
    gross_by_rate: Vec<(String, usize)>,
}

impl PretixColumns {
    fn from_header(fields: &[&str]) -> Self {
        let mut index = HashMap::new();
        let mut gross_by_rate = Vec::new();
        for (i, name) in fields.iter().enumerate() {
            index.entry(name.to_string()).or_insert(i);
            if let Some(rate) = name
                .strip_prefix(PRETIX_GROSS_PREFIX)
                .and_then(|r| r.strip_suffix('%'))
            {
                gross_by_rate.push((rate.trim().to_string(), i));
            }
        }
        Self {
            index,
            gross_by_rate,
        }
    }

    fn get<'r>(&self, record: &'r StringRecord, column: &str) -> &'r str {
        self.index
            .get(column)
            .and_then(|&i| record.get(i))
            .map(str::trim)
            .unwrap_or("")
    }

    fn parse(
        &self,
        record: &StringRecord,
        line: u64,
        config: &ConverterConfig,
    ) -> Result<OrderRow, RowError> {
        let order_id = self.get(record, PRETIX_ORDER_CODE);
        let fail = |reason: String| RowError::new(line, Some(order_id), reason);

        if order_id.is_empty() {
            return Err(fail("missing order code".into()));
        }

        let date = self.get(record, "Data zamówienia");
        if date.is_empty() {
            return Err(fail("missing order date".into()));
        }
        let order_date = parse_date(date).map_err(fail)?;

        let email = self.get(record, "Email");
        let full_name = format!(
            "{} {}",
            self.get(record, "Imię"),
            self.get(record, "Nazwisko")
        );
        let (name, company) = [
            (full_name.trim(), false),
            (self.get(record, "Firma"), true),
            (email, false),
        ]
        .into_iter()
        .find(|(n, _)| !n.is_empty())
        .ok_or_else(|| fail("missing buyer name".into()))?;

        let total = parse_locale_decimal(self.get(record, "Suma zamówienia"))
            .map_err(|e| fail(format!("order total: {e}")))?
            .ok_or_else(|| fail("missing order total".into()))?;

        let quantity = parse_locale_decimal(self.get(record, "Pozycje"))
            .map_err(|e| fail(format!("item count: {e}")))?
            .unwrap_or(Decimal::ONE);
        if quantity <= Decimal::ZERO {
            return Err(fail(format!("item count {quantity} must be positive")));
        }

        let event = match self.get(record, "Nazwa wydarzenia") {
            "" => "Wydarzenie",
            e => e,
        };
        let description = format!("{} {event}", config.product_prefix);

        let mut amounts = Vec::new();
        for (rate, column) in &self.gross_by_rate {
            let raw = record.get(*column).unwrap_or("");
            let amount = parse_locale_decimal(raw)
                .map_err(|e| fail(format!("gross amount at {rate} %: {e}")))?
                .unwrap_or(Decimal::ZERO);
            if amount.is_zero() {
                continue;
            }
            let vat = VatRate::from_code(rate)
                .ok_or_else(|| fail(format!("unsupported tax rate {rate} %")))?;
            amounts.push((vat, amount));
        }
        if amounts.is_empty() {
            // no per-rate breakdown: the whole order is exempt
            amounts.push((VatRate::Exempt, total));
        }

        let items = if let [(vat, amount)] = amounts.as_slice() {
            let (quantity, unit_price) = split_amount(*amount, quantity);
            vec![OrderItem {
                description,
                quantity,
                unit_price,
                vat: *vat,
            }]
        } else {
            amounts
                .into_iter()
                .map(|(vat, amount)| OrderItem {
                    description: format!("{description} ({} %)", vat.percent()),
                    quantity: Decimal::ONE,
                    unit_price: amount,
                    vat,
                })
                .collect()
        };

        let currency = match self.get(record, "Waluta") {
            "" => config.currency.as_str(),
            c => c,
        };

        Ok(OrderRow {
            line,
            order_id: order_id.to_string(),
            order_date: Some(order_date),
            buyer: Buyer {
                name: name.to_string(),
                email: email.to_string(),
                phone: self.get(record, "Numer telefonu").to_string(),
                street: self.get(record, "Adres").to_string(),
                postal_code: self.get(record, "Kod pocztowy").to_string(),
                city: self.get(record, "Miasto").to_string(),
                country: self.get(record, "Kraj").to_string(),
                company,
            },
            items,
            paid: Some(total),
            currency: currency.to_string(),
            price_basis: CalculationBase::Gross,
        })
    }
}

/// Spread an amount over `quantity` units when it divides evenly to the
/// grosz; otherwise bill a single unit for the whole amount.
fn split_amount(amount: Decimal, quantity: Decimal) -> (Decimal, Decimal) {
    if quantity == Decimal::ONE {
        return (Decimal::ONE, amount);
    }
    let unit = amount.checked_div(quantity).map(|u| u.round_dp(2));
    match unit {
        Some(unit) if unit.checked_mul(quantity) == Some(amount) => (quantity, unit),
        _ => (Decimal::ONE, amount),
    }
}

fn parse_simple(
    record: &StringRecord,
    line: u64,
    config: &ConverterConfig,
) -> Result<OrderRow, RowError> {
    let field = |i: usize| record.get(i).map(str::trim).unwrap_or("");
    let order_id = field(0);
    let fail = |reason: String| RowError::new(line, Some(order_id), reason);

    let mut missing = Vec::new();
    for (i, name) in [
        (0, "order id"),
        (1, "buyer name"),
        (4, "amount"),
        (5, "tax rate"),
    ] {
        if field(i).is_empty() {
            missing.push(name);
        }
    }
    if !missing.is_empty() {
        return Err(fail(format!("missing {}", missing.join(", "))));
    }

    let quantity = parse_locale_decimal(field(3))
        .map_err(|e| fail(format!("quantity: {e}")))?
        .unwrap_or(Decimal::ONE);
    if quantity <= Decimal::ZERO {
        return Err(fail(format!("quantity {quantity} must be positive")));
    }

    let unit_price = parse_locale_decimal(field(4))
        .map_err(|e| fail(format!("amount: {e}")))?
        .ok_or_else(|| fail("missing amount".into()))?;

    let vat = VatRate::from_code(field(5))
        .ok_or_else(|| fail(format!("unsupported tax rate '{}'", field(5))))?;

    let description = match field(2) {
        "" => config.product_prefix.as_str(),
        d => d,
    };

    let currency = match field(6) {
        "" => config.currency.as_str(),
        c => c,
    };

    let order_date = match field(12) {
        "" => None,
        d => Some(parse_date(d).map_err(fail)?),
    };

    Ok(OrderRow {
        line,
        order_id: order_id.to_string(),
        order_date,
        buyer: Buyer {
            name: field(1).to_string(),
            email: field(11).to_string(),
            phone: String::new(),
            street: field(7).to_string(),
            postal_code: field(8).to_string(),
            city: field(9).to_string(),
            country: field(10).to_string(),
            company: false,
        },
        items: vec![OrderItem {
            description: description.to_string(),
            quantity,
            unit_price,
            vat,
        }],
        paid: None,
        currency: currency.to_string(),
        price_basis: CalculationBase::Net,
    })
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    // pretix exports either ISO dates or the Polish dd.mm.yyyy form
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d.%m.%Y"))
        .map_err(|_| format!("invalid date '{raw}'"))
}
