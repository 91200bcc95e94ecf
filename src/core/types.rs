use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// A domestic invoice in the shape expected by the iFirma `fakturakraj`
/// endpoint. Field order follows the API documentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Import status; invoices land as drafts awaiting confirmation.
    #[serde(rename = "Status")]
    pub status: InvoiceStatus,
    /// Amount already paid.
    #[serde(rename = "Zaplacono", with = "rust_decimal::serde::arbitrary_precision")]
    pub paid: Decimal,
    /// Whether position prices are gross or net.
    #[serde(rename = "LiczOd")]
    pub calculation_base: CalculationBase,
    /// Bank account shown on the invoice; `None` uses the account default.
    #[serde(rename = "NumerKontaBankowego")]
    pub bank_account: Option<String>,
    #[serde(rename = "DataWystawienia")]
    pub issue_date: NaiveDate,
    #[serde(rename = "MiejsceWystawienia")]
    pub place_of_issue: String,
    #[serde(rename = "DataSprzedazy")]
    pub sale_date: NaiveDate,
    #[serde(rename = "FormatDatySprzedazy")]
    pub sale_date_format: SaleDateFormat,
    #[serde(rename = "TerminPlatnosci")]
    pub payment_due: Option<NaiveDate>,
    #[serde(rename = "SposobZaplaty")]
    pub payment_method: PaymentMethod,
    /// Name of the numbering series configured in iFirma.
    #[serde(rename = "NazwaSeriiNumeracji")]
    pub numbering_series: String,
    /// Name of the print template; empty selects the account default.
    #[serde(rename = "NazwaSzablonu")]
    pub template: String,
    #[serde(rename = "RodzajPodpisuOdbiorcy")]
    pub recipient_signature_kind: RecipientSignature,
    #[serde(rename = "PodpisOdbiorcy")]
    pub recipient_signature: String,
    #[serde(rename = "PodpisWystawcy")]
    pub issuer_signature: String,
    /// Free-text remarks. Carries the source order code.
    #[serde(rename = "Uwagi")]
    pub remarks: String,
    #[serde(rename = "WidocznyNumerGios")]
    pub gios_number_visible: bool,
    /// Explicit invoice number; `None` lets the series assign one.
    #[serde(rename = "Numer")]
    pub number: Option<u32>,
    #[serde(rename = "Pozycje")]
    pub positions: Vec<Position>,
    #[serde(rename = "Kontrahent")]
    pub contractor: Contractor,
}

impl InvoiceRecord {
    /// Identifier used in logs and upload reports: the order code when
    /// present, otherwise the buyer name.
    pub fn identifier(&self) -> &str {
        if self.remarks.trim().is_empty() {
            &self.contractor.name
        } else {
            &self.remarks
        }
    }
}

/// A single invoice line (`Pozycje[]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// VAT rate as a fraction (0.23 for 23 %).
    #[serde(rename = "StawkaVat", with = "rust_decimal::serde::arbitrary_precision")]
    pub vat_rate: Decimal,
    #[serde(rename = "Ilosc", with = "rust_decimal::serde::arbitrary_precision")]
    pub quantity: Decimal,
    #[serde(
        rename = "CenaJednostkowa",
        with = "rust_decimal::serde::arbitrary_precision"
    )]
    pub unit_price: Decimal,
    #[serde(rename = "NazwaPelna")]
    pub name: String,
    #[serde(rename = "Jednostka")]
    pub unit: String,
    #[serde(rename = "TypStawkiVat")]
    pub vat_rate_type: VatRateType,
}

impl Position {
    /// The accepted rate this position carries, if its rate/type pair is valid.
    pub fn vat(&self) -> Option<VatRate> {
        VatRate::from_api(self.vat_rate, self.vat_rate_type)
    }
}

/// Buyer data (`Kontrahent`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contractor {
    #[serde(rename = "Nazwa")]
    pub name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Telefon")]
    pub phone: String,
    #[serde(rename = "Ulica")]
    pub street: String,
    #[serde(rename = "KodPocztowy")]
    pub postal_code: String,
    /// Country code or name as exported.
    #[serde(rename = "Kraj")]
    pub country: String,
    #[serde(rename = "Miejscowosc")]
    pub city: String,
    /// True for private persons (no NIP).
    #[serde(rename = "OsobaFizyczna")]
    pub natural_person: bool,
}

/// VAT rates accepted by the API for domestic invoices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VatRate {
    /// 23 % standard rate.
    Standard,
    /// 8 % reduced rate.
    Reduced8,
    /// 5 % reduced rate.
    Reduced5,
    /// ZW: exempt. A 0 % rate in the export maps here.
    Exempt,
}

impl VatRate {
    /// Rate as a percentage (23 for 23 %).
    pub fn percent(&self) -> Decimal {
        match self {
            Self::Standard => dec!(23),
            Self::Reduced8 => dec!(8),
            Self::Reduced5 => dec!(5),
            Self::Exempt => dec!(0),
        }
    }

    /// Rate as the fraction sent in `StawkaVat`.
    pub fn fraction(&self) -> Decimal {
        match self {
            Self::Standard => dec!(0.23),
            Self::Reduced8 => dec!(0.08),
            Self::Reduced5 => dec!(0.05),
            Self::Exempt => dec!(0),
        }
    }

    pub fn rate_type(&self) -> VatRateType {
        match self {
            Self::Exempt => VatRateType::Exempt,
            _ => VatRateType::Percent,
        }
    }

    /// Parse a tax code as it appears in exports: `"23"`, `"23%"`,
    /// `"8,00"`, `"0.05"` or `"ZW"`.
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim().trim_end_matches('%').trim();
        if code.eq_ignore_ascii_case("zw") {
            return Some(Self::Exempt);
        }
        let value = super::decimal::parse_locale_decimal(code).ok()??;
        Self::from_percent(value).or_else(|| {
            // "0,23" style fractions
            if value > Decimal::ZERO && value < Decimal::ONE {
                Self::from_percent(value * dec!(100))
            } else {
                None
            }
        })
    }

    /// Map a percentage to an accepted rate.
    pub fn from_percent(percent: Decimal) -> Option<Self> {
        [Self::Standard, Self::Reduced8, Self::Reduced5, Self::Exempt]
            .into_iter()
            .find(|r| r.percent() == percent)
    }

    /// Recover the rate from the `StawkaVat` / `TypStawkiVat` pair.
    pub fn from_api(fraction: Decimal, rate_type: VatRateType) -> Option<Self> {
        match rate_type {
            VatRateType::Exempt if fraction.is_zero() => Some(Self::Exempt),
            VatRateType::Exempt => None,
            VatRateType::Percent => [Self::Standard, Self::Reduced8, Self::Reduced5]
                .into_iter()
                .find(|r| r.fraction() == fraction),
        }
    }
}

/// `TypStawkiVat` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VatRateType {
    /// PRC: percentage rate.
    #[serde(rename = "PRC")]
    Percent,
    /// ZW: exempt.
    #[serde(rename = "ZW")]
    Exempt,
}

/// `Status` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceStatus {
    /// DO_POTWIERDZENIA: draft awaiting confirmation in iFirma.
    #[serde(rename = "DO_POTWIERDZENIA")]
    ToConfirm,
}

/// `LiczOd` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalculationBase {
    /// BRT: prices are gross.
    #[serde(rename = "BRT")]
    Gross,
    /// NET: prices are net.
    #[serde(rename = "NET")]
    Net,
}

/// `FormatDatySprzedazy` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaleDateFormat {
    /// DZN: daily.
    #[serde(rename = "DZN")]
    Daily,
    /// MSC: monthly.
    #[serde(rename = "MSC")]
    Monthly,
}

/// `SposobZaplaty` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// PRZ: bank transfer.
    #[serde(rename = "PRZ")]
    Transfer,
    /// GTK: cash.
    #[serde(rename = "GTK")]
    Cash,
    /// KAR: card.
    #[serde(rename = "KAR")]
    Card,
    /// POB: cash on delivery.
    #[serde(rename = "POB")]
    CashOnDelivery,
    /// KOM: offset.
    #[serde(rename = "KOM")]
    Offset,
}

/// `RodzajPodpisuOdbiorcy` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecipientSignature {
    /// OUP: person authorized to receive.
    #[serde(rename = "OUP")]
    Authorized,
    /// UPO: authorized recipient by name.
    #[serde(rename = "UPO")]
    Named,
    /// BPO: without recipient signature.
    #[serde(rename = "BPO")]
    WithoutRecipient,
    /// BWO: without any signatures.
    #[serde(rename = "BWO")]
    WithoutSignatures,
}
