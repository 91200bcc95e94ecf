use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::IfirmaError;
use super::types::*;

/// Builder for constructing invoice records.
///
/// ```
/// use pretix_ifirma::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let record = InvoiceRecordBuilder::new(
///     NaiveDate::from_ymd_opt(2025, 3, 23).unwrap(),
///     ContractorBuilder::new("Jan Kowalski").city("Kraków").build(),
/// )
/// .remarks("ABC12")
/// .add_position(PositionBuilder::new("Bilet", dec!(1), dec!(123.45), VatRate::Standard).build())
/// .build()
/// .unwrap();
///
/// assert_eq!(record.positions[0].vat_rate, dec!(0.23));
/// ```
pub struct InvoiceRecordBuilder {
    issue_date: NaiveDate,
    sale_date: Option<NaiveDate>,
    payment_due: Option<NaiveDate>,
    contractor: Contractor,
    positions: Vec<Position>,
    paid: Option<Decimal>,
    calculation_base: CalculationBase,
    bank_account: Option<String>,
    place_of_issue: Option<String>,
    sale_date_format: SaleDateFormat,
    payment_method: PaymentMethod,
    numbering_series: String,
    template: String,
    recipient_signature_kind: RecipientSignature,
    recipient_signature: String,
    issuer_signature: String,
    remarks: String,
    gios_number_visible: bool,
    number: Option<u32>,
}

impl InvoiceRecordBuilder {
    pub fn new(issue_date: NaiveDate, contractor: Contractor) -> Self {
        Self {
            issue_date,
            sale_date: None,
            payment_due: None,
            contractor,
            positions: Vec::new(),
            paid: None,
            calculation_base: CalculationBase::Gross,
            bank_account: None,
            place_of_issue: None,
            sale_date_format: SaleDateFormat::Daily,
            payment_method: PaymentMethod::Transfer,
            numbering_series: "default".to_string(),
            template: String::new(),
            recipient_signature_kind: RecipientSignature::Authorized,
            recipient_signature: "Odbiorca".to_string(),
            issuer_signature: "Wystawca".to_string(),
            remarks: String::new(),
            gios_number_visible: true,
            number: None,
        }
    }

    /// Sale date; defaults to the issue date.
    pub fn sale_date(mut self, date: NaiveDate) -> Self {
        self.sale_date = Some(date);
        self
    }

    pub fn payment_due(mut self, date: NaiveDate) -> Self {
        self.payment_due = Some(date);
        self
    }

    pub fn add_position(mut self, position: Position) -> Self {
        self.positions.push(position);
        self
    }

    /// Amount already paid; defaults to the positions total.
    pub fn paid(mut self, amount: Decimal) -> Self {
        self.paid = Some(amount);
        self
    }

    pub fn calculation_base(mut self, base: CalculationBase) -> Self {
        self.calculation_base = base;
        self
    }

    pub fn bank_account(mut self, account: impl Into<String>) -> Self {
        self.bank_account = Some(account.into());
        self
    }

    /// Place of issue; defaults to the contractor's city.
    pub fn place_of_issue(mut self, place: impl Into<String>) -> Self {
        self.place_of_issue = Some(place.into());
        self
    }

    pub fn sale_date_format(mut self, format: SaleDateFormat) -> Self {
        self.sale_date_format = format;
        self
    }

    pub fn payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = method;
        self
    }

    pub fn numbering_series(mut self, series: impl Into<String>) -> Self {
        self.numbering_series = series.into();
        self
    }

    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn recipient_signature(mut self, kind: RecipientSignature, text: impl Into<String>) -> Self {
        self.recipient_signature_kind = kind;
        self.recipient_signature = text.into();
        self
    }

    pub fn issuer_signature(mut self, text: impl Into<String>) -> Self {
        self.issuer_signature = text.into();
        self
    }

    pub fn remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = remarks.into();
        self
    }

    pub fn gios_number_visible(mut self, visible: bool) -> Self {
        self.gios_number_visible = visible;
        self
    }

    pub fn number(mut self, number: u32) -> Self {
        self.number = Some(number);
        self
    }

    /// Build the record. Fails when the buyer has no name, there are no
    /// positions, or the default paid amount cannot be totalled.
    pub fn build(self) -> Result<InvoiceRecord, IfirmaError> {
        if self.contractor.name.trim().is_empty() {
            return Err(IfirmaError::Builder("buyer name is required".into()));
        }
        if self.positions.is_empty() {
            return Err(IfirmaError::Builder(
                "at least one position is required".into(),
            ));
        }
        if let Some(due) = self.payment_due {
            if due < self.issue_date {
                return Err(IfirmaError::Builder(format!(
                    "payment due date {due} is before issue date {}",
                    self.issue_date
                )));
            }
        }

        let paid = match self.paid {
            Some(paid) => paid,
            None => self
                .positions
                .iter()
                .try_fold(Decimal::ZERO, |total, p| {
                    total.checked_add(p.quantity.checked_mul(p.unit_price)?)
                })
                .ok_or_else(|| IfirmaError::Builder("positions total overflows".into()))?,
        };
        let place_of_issue = self
            .place_of_issue
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| self.contractor.city.clone());

        Ok(InvoiceRecord {
            status: InvoiceStatus::ToConfirm,
            paid,
            calculation_base: self.calculation_base,
            bank_account: self.bank_account,
            issue_date: self.issue_date,
            place_of_issue,
            sale_date: self.sale_date.unwrap_or(self.issue_date),
            sale_date_format: self.sale_date_format,
            payment_due: self.payment_due,
            payment_method: self.payment_method,
            numbering_series: self.numbering_series,
            template: self.template,
            recipient_signature_kind: self.recipient_signature_kind,
            recipient_signature: self.recipient_signature,
            issuer_signature: self.issuer_signature,
            remarks: self.remarks,
            gios_number_visible: self.gios_number_visible,
            number: self.number,
            positions: self.positions,
            contractor: self.contractor,
        })
    }
}

/// Builder for invoice positions.
pub struct PositionBuilder {
    position: Position,
}

impl PositionBuilder {
    pub fn new(name: impl Into<String>, quantity: Decimal, unit_price: Decimal, vat: VatRate) -> Self {
        Self {
            position: Position {
                vat_rate: vat.fraction(),
                quantity,
                unit_price,
                name: name.into(),
                unit: "sztuk".to_string(),
                vat_rate_type: vat.rate_type(),
            },
        }
    }

    /// Unit of measure (default "sztuk").
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.position.unit = unit.into();
        self
    }

    pub fn build(self) -> Position {
        self.position
    }
}

/// Builder for the buyer. Blank address fields fall back to the
/// placeholders iFirma accepts for private persons.
pub struct ContractorBuilder {
    contractor: Contractor,
}

impl ContractorBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            contractor: Contractor {
                name: name.into(),
                email: String::new(),
                phone: String::new(),
                street: "Nieznana".to_string(),
                postal_code: "00-000".to_string(),
                country: "PL".to_string(),
                city: "Nieznane".to_string(),
                natural_person: true,
            },
        }
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.contractor.email = email.into();
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.contractor.phone = phone.into();
        self
    }

    pub fn street(mut self, street: impl Into<String>) -> Self {
        set_non_blank(&mut self.contractor.street, street.into());
        self
    }

    pub fn postal_code(mut self, code: impl Into<String>) -> Self {
        set_non_blank(&mut self.contractor.postal_code, code.into());
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        set_non_blank(&mut self.contractor.country, country.into());
        self
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        set_non_blank(&mut self.contractor.city, city.into());
        self
    }

    pub fn natural_person(mut self, natural: bool) -> Self {
        self.contractor.natural_person = natural;
        self
    }

    pub fn build(self) -> Contractor {
        self.contractor
    }
}

fn set_non_blank(slot: &mut String, value: String) {
    let value = value.trim();
    if !value.is_empty() {
        *slot = value.to_string();
    }
}
