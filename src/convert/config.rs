use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{PaymentMethod, SaleDateFormat};

/// Settings for turning export rows into invoice records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Issue date for rows that carry no order date. `None` means today.
    pub issue_date: Option<NaiveDate>,
    /// Days between issue date and payment deadline.
    pub payment_days: u32,
    /// iFirma numbering series name.
    pub numbering_series: String,
    /// iFirma print template name; empty selects the default.
    pub template: String,
    /// Unit of measure for every position.
    pub unit: String,
    /// The only currency accepted in the input.
    pub currency: String,
    /// Place of issue; `None` uses the buyer's city.
    pub place_of_issue: Option<String>,
    /// Product name prefix for pretix rows, followed by the event name.
    pub product_prefix: String,
    pub sale_date_format: SaleDateFormat,
    pub payment_method: PaymentMethod,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            issue_date: None,
            payment_days: 7,
            numbering_series: "default".into(),
            template: String::new(),
            unit: "sztuk".into(),
            currency: "PLN".into(),
            place_of_issue: None,
            product_prefix: "Wejście na wydarzenie".into(),
            sale_date_format: SaleDateFormat::Daily,
            payment_method: PaymentMethod::Transfer,
        }
    }
}

/// Builder for [`ConverterConfig`].
///
/// # Example
///
/// ```
/// use pretix_ifirma::convert::ConverterConfigBuilder;
/// use chrono::NaiveDate;
///
/// let config = ConverterConfigBuilder::new()
///     .issue_date(NaiveDate::from_ymd_opt(2025, 3, 23).unwrap())
///     .payment_days(14)
///     .build();
/// assert_eq!(config.payment_days, 14);
/// ```
#[derive(Default)]
pub struct ConverterConfigBuilder {
    config: ConverterConfig,
}

impl ConverterConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed issue date for rows without an order date.
    pub fn issue_date(mut self, date: NaiveDate) -> Self {
        self.config.issue_date = Some(date);
        self
    }

    pub fn payment_days(mut self, days: u32) -> Self {
        self.config.payment_days = days;
        self
    }

    pub fn numbering_series(mut self, series: impl Into<String>) -> Self {
        self.config.numbering_series = series.into();
        self
    }

    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.config.template = template.into();
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.config.unit = unit.into();
        self
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.config.currency = currency.into();
        self
    }

    pub fn place_of_issue(mut self, place: impl Into<String>) -> Self {
        self.config.place_of_issue = Some(place.into());
        self
    }

    pub fn product_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.product_prefix = prefix.into();
        self
    }

    pub fn sale_date_format(mut self, format: SaleDateFormat) -> Self {
        self.config.sale_date_format = format;
        self
    }

    pub fn payment_method(mut self, method: PaymentMethod) -> Self {
        self.config.payment_method = method;
        self
    }

    pub fn build(self) -> ConverterConfig {
        self.config
    }
}
