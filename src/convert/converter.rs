use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{Days, Local, NaiveDate};
use csv::ReaderBuilder;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::core::{
    CalculationBase, ContractorBuilder, IfirmaError, InvoiceRecord, InvoiceRecordBuilder,
    PositionBuilder, write_document,
};

use super::config::ConverterConfig;
use super::group::{OrderGroup, OrderGroups};
use super::row::{CsvLayout, RowError};

/// Outcome of a conversion pass.
#[derive(Debug, Default)]
pub struct ConversionReport {
    /// Invoices produced, one per order identifier.
    pub records: Vec<InvoiceRecord>,
    /// Rows (or whole orders) left out, with the reason.
    pub skipped: Vec<RowError>,
    /// Data rows read, headers excluded.
    pub rows_read: usize,
}

/// Turns export rows into invoice records.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConverterConfig,
}

impl Converter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Convert `input` and write the JSON document to `output`, replacing it.
    ///
    /// # Errors
    ///
    /// Fails only when the input cannot be read or the output cannot be
    /// written. Bad rows are reported in [`ConversionReport::skipped`].
    pub fn convert_file(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<ConversionReport, IfirmaError> {
        let input = input.as_ref();
        let output = output.as_ref();
        let file = File::open(input).map_err(|e| IfirmaError::io(input.display().to_string(), e))?;
        let report = self.convert_reader(file)?;
        write_document(output, &report.records)?;
        info!(
            converted = report.records.len(),
            skipped = report.skipped.len(),
            output = %output.display(),
            "conversion finished"
        );
        Ok(report)
    }

    /// Convert CSV text held in memory.
    pub fn convert_str(&self, input: &str) -> Result<ConversionReport, IfirmaError> {
        self.convert_reader(input.as_bytes())
    }

    /// Read all rows, group them by order and map each group to a record.
    pub fn convert_reader<R: Read>(&self, reader: R) -> Result<ConversionReport, IfirmaError> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut report = ConversionReport::default();
        let mut layout: Option<CsvLayout> = None;
        let mut groups = OrderGroups::new();

        for result in rdr.records() {
            let record = match result {
                Ok(r) => r,
                Err(e) if e.is_io_error() => return Err(IfirmaError::Csv(e.to_string())),
                Err(e) => {
                    let line = e.position().map_or(0, |p| p.line());
                    let err = RowError::new(line, None, e.to_string());
                    warn!(%err, "skipping unreadable row");
                    report.skipped.push(err);
                    continue;
                }
            };
            if record.iter().all(|f| f.trim().is_empty()) {
                continue;
            }
            let line = record.position().map_or(0, |p| p.line());

            if layout.is_none() {
                let (detected, is_header) = CsvLayout::detect(&record);
                debug!(?detected, "detected input layout");
                layout = Some(detected);
                if is_header {
                    continue;
                }
            }
            let Some(current) = &layout else {
                continue;
            };

            report.rows_read += 1;
            let parsed = current
                .parse(&record, line, &self.config)
                .and_then(|row| match (current, groups.get(&row.order_id)) {
                    // pretix lists every order once; a repeat would bill it twice
                    (CsvLayout::Pretix(_), Some(seen)) => Err(RowError::new(
                        row.line,
                        Some(row.order_id.as_str()),
                        format!(
                            "order code already exported on line {}",
                            seen.rows.first().map_or(0, |r| r.line)
                        ),
                    )),
                    _ => Ok(row),
                });
            match parsed {
                Ok(row) => groups.insert(row),
                Err(err) => {
                    warn!(%err, "skipping row");
                    report.skipped.push(err);
                }
            }
        }

        debug!(orders = groups.len(), rows = report.rows_read, "grouped rows");
        if groups.is_empty() {
            warn!("no orders found in input");
        }

        let fallback_date = self
            .config
            .issue_date
            .unwrap_or_else(|| Local::now().date_naive());
        for group in groups {
            match self.map_group(&group, fallback_date) {
                Ok(record) => {
                    debug!(order = %group.order_id, positions = record.positions.len(), "mapped order");
                    report.records.push(record);
                }
                Err(err) => {
                    warn!(%err, "skipping order");
                    report.skipped.push(err);
                }
            }
        }

        Ok(report)
    }

    /// Build one invoice from all rows of an order. The buyer and dates come
    /// from the first row; every row contributes its items as positions.
    pub fn map_group(
        &self,
        group: &OrderGroup,
        fallback_date: NaiveDate,
    ) -> Result<InvoiceRecord, RowError> {
        let first = group
            .rows
            .first()
            .ok_or_else(|| RowError::new(0, Some(group.order_id.as_str()), "order has no rows"))?;
        let fail = |reason: String| RowError::new(first.line, Some(group.order_id.as_str()), reason);

        for row in &group.rows {
            if !row.currency.eq_ignore_ascii_case(&self.config.currency) {
                return Err(fail(format!(
                    "unsupported currency {} (expected {})",
                    row.currency, self.config.currency
                )));
            }
            if row.buyer.name != first.buyer.name {
                warn!(
                    order = %group.order_id,
                    line = row.line,
                    "buyer differs from first row of the order, keeping '{}'",
                    first.buyer.name
                );
            }
        }

        let issue_date = first.order_date.unwrap_or(fallback_date);
        let payment_due = issue_date
            .checked_add_days(Days::new(u64::from(self.config.payment_days)))
            .ok_or_else(|| fail(format!("payment deadline overflows from {issue_date}")))?;

        let buyer = &first.buyer;
        let contractor = ContractorBuilder::new(buyer.name.as_str())
            .email(buyer.email.as_str())
            .phone(buyer.phone.as_str())
            .street(buyer.street.as_str())
            .postal_code(buyer.postal_code.as_str())
            .city(buyer.city.as_str())
            .country(buyer.country.as_str())
            .natural_person(!buyer.company)
            .build();

        let mut builder = InvoiceRecordBuilder::new(issue_date, contractor)
            .sale_date(issue_date)
            .payment_due(payment_due)
            .calculation_base(first.price_basis)
            .sale_date_format(self.config.sale_date_format)
            .payment_method(self.config.payment_method)
            .numbering_series(self.config.numbering_series.as_str())
            .template(self.config.template.as_str())
            .remarks(group.order_id.as_str());
        if let Some(place) = &self.config.place_of_issue {
            builder = builder.place_of_issue(place.as_str());
        }

        let overflow = || fail("amounts too large to total".into());
        let mut gross = Decimal::ZERO;
        for item in group.rows.iter().flat_map(|r| &r.items) {
            let line_total = item
                .quantity
                .checked_mul(item.unit_price)
                .ok_or_else(overflow)?;
            let line_gross = match first.price_basis {
                CalculationBase::Gross => line_total,
                CalculationBase::Net => line_total
                    .checked_mul(Decimal::ONE + item.vat.fraction())
                    .ok_or_else(overflow)?
                    .round_dp(2),
            };
            gross = gross.checked_add(line_gross).ok_or_else(overflow)?;
            builder = builder.add_position(
                PositionBuilder::new(
                    item.description.as_str(),
                    item.quantity,
                    item.unit_price,
                    item.vat,
                )
                .unit(self.config.unit.as_str())
                .build(),
            );
        }

        let stated: Option<Vec<Decimal>> = group.rows.iter().map(|r| r.paid).collect();
        let paid = match stated {
            Some(amounts) => amounts
                .into_iter()
                .try_fold(Decimal::ZERO, Decimal::checked_add)
                .ok_or_else(overflow)?,
            None => gross,
        };
        builder = builder.paid(paid);

        builder.build().map_err(|e| fail(e.to_string()))
    }
}
