use super::types::RawInput;
use crate::error::{FieldError, ValidationError};

pub const BANK_ACCOUNT_TYPE: &str = "bank_account_type";
pub const EMPLOYMENT_STATUS: &str = "employment_status";

/// Inclusive numeric domain of one input field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub field: &'static str,
    pub min: f64,
    pub max: f64,
}

impl Domain {
    const fn new(field: &'static str, min: f64, max: f64) -> Self {
        Self { field, min, max }
    }

    pub fn check(&self, value: f64) -> Result<(), FieldError> {
        if !value.is_finite() {
            return Err(FieldError::NotFinite { field: self.field });
        }
        if value < self.min || value > self.max {
            return Err(FieldError::OutOfRange {
                field: self.field,
                value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

pub const LOAN_AMOUNT: Domain = Domain::new("loan_amount", 100.0, 1_000_000.0);
pub const TERM_DAYS: Domain = Domain::new("term_days", 10.0, 720.0);
pub const REPAYMENT_CURR_RATIO: Domain = Domain::new("repayment_curr_ratio", 0.0, 2.0);
pub const NUM_PREV_LOANS: Domain = Domain::new("num_prev_loans", 0.0, 50.0);
pub const AVG_REPAY_DELAY_DAYS: Domain = Domain::new("avg_repay_delay_days", -50.0, 365.0);
pub const TOTAL_FIRSTREPAID_LATE: Domain = Domain::new("total_firstrepaid_late", 0.0, 50.0);
pub const AVG_PREV_REPAYMENT_RATIO: Domain = Domain::new("avg_prev_repayment_ratio", 0.0, 2.0);
pub const AVG_DURATION_DAYS: Domain = Domain::new("avg_duration_days", 0.0, 720.0);
pub const AVG_PREV_INTEREST: Domain = Domain::new("avg_prev_interest", 0.0, 100_000.0);
pub const AGE: Domain = Domain::new("age", 18.0, 100.0);

/// Check every numeric field of `input` against its domain.
/// Returns all violations at once (not just the first).
pub fn validate(input: &RawInput) -> Result<(), ValidationError> {
    let checks = [
        (LOAN_AMOUNT, input.loan_amount),
        (TERM_DAYS, input.term_days as f64),
        (REPAYMENT_CURR_RATIO, input.repayment_curr_ratio),
        (NUM_PREV_LOANS, input.num_prev_loans),
        (AVG_REPAY_DELAY_DAYS, input.avg_repay_delay_days),
        (TOTAL_FIRSTREPAID_LATE, input.total_firstrepaid_late),
        (AVG_PREV_REPAYMENT_RATIO, input.avg_prev_repayment_ratio),
        (AVG_DURATION_DAYS, input.avg_duration_days),
        (AVG_PREV_INTEREST, input.avg_prev_interest),
        (AGE, input.age as f64),
    ];

    let errors: Vec<FieldError> = checks
        .iter()
        .filter_map(|(domain, value)| domain.check(*value).err())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(errors))
    }
}
