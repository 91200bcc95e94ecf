use rust_decimal::Decimal;

use super::error::ValidationError;
use super::types::*;

/// Validate a record before it is sent to the API.
/// Returns all validation errors found (not just the first).
pub fn validate_record(record: &InvoiceRecord) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if record.contractor.name.trim().is_empty() {
        errors.push(ValidationError::new(
            "Kontrahent.Nazwa",
            "buyer name must not be empty",
        ));
    }

    if record.positions.is_empty() {
        errors.push(ValidationError::new(
            "Pozycje",
            "invoice must have at least one position",
        ));
    }

    for (i, position) in record.positions.iter().enumerate() {
        validate_position(position, i, &mut errors);
    }

    if record.paid < Decimal::ZERO {
        errors.push(ValidationError::new(
            "Zaplacono",
            "paid amount must not be negative",
        ));
    }

    if let Some(due) = record.payment_due {
        if due < record.issue_date {
            errors.push(ValidationError::new(
                "TerminPlatnosci",
                format!(
                    "payment due date {due} is before issue date {}",
                    record.issue_date
                ),
            ));
        }
    }

    errors
}

fn validate_position(position: &Position, index: usize, errors: &mut Vec<ValidationError>) {
    let prefix = format!("Pozycje[{index}]");

    if position.name.trim().is_empty() {
        errors.push(ValidationError::new(
            format!("{prefix}.NazwaPelna"),
            "position name must not be empty",
        ));
    }

    if position.quantity <= Decimal::ZERO {
        errors.push(ValidationError::new(
            format!("{prefix}.Ilosc"),
            "quantity must be positive",
        ));
    }

    if position.unit_price < Decimal::ZERO {
        errors.push(ValidationError::new(
            format!("{prefix}.CenaJednostkowa"),
            "unit price must not be negative",
        ));
    }

    if position.vat().is_none() {
        errors.push(ValidationError::new(
            format!("{prefix}.StawkaVat"),
            format!(
                "rate {} with type {:?} is not an accepted VAT rate",
                position.vat_rate, position.vat_rate_type
            ),
        ));
    }
}
