use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::validation::{self, Domain};
use crate::error::{FieldError, ValidationError};

/// Bank account held by the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum BankAccountType {
    Other,
    Savings,
    Current,
}

impl BankAccountType {
    pub const ALL: [BankAccountType; 3] = [
        BankAccountType::Other,
        BankAccountType::Savings,
        BankAccountType::Current,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BankAccountType::Other => "Other",
            BankAccountType::Savings => "Savings",
            BankAccountType::Current => "Current",
        }
    }
}

/// Employment status of the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum EmploymentStatus {
    Permanent,
    Unknown,
    Unemployed,
    #[serde(rename = "Self-Employed")]
    SelfEmployed,
    Student,
    Retired,
    Contract,
}

impl EmploymentStatus {
    pub const ALL: [EmploymentStatus; 7] = [
        EmploymentStatus::Permanent,
        EmploymentStatus::Unknown,
        EmploymentStatus::Unemployed,
        EmploymentStatus::SelfEmployed,
        EmploymentStatus::Student,
        EmploymentStatus::Retired,
        EmploymentStatus::Contract,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EmploymentStatus::Permanent => "Permanent",
            EmploymentStatus::Unknown => "Unknown",
            EmploymentStatus::Unemployed => "Unemployed",
            EmploymentStatus::SelfEmployed => "Self-Employed",
            EmploymentStatus::Student => "Student",
            EmploymentStatus::Retired => "Retired",
            EmploymentStatus::Contract => "Contract",
        }
    }
}

/// Labels are matched case-insensitively; the canonical spelling is `as_str`.
fn parse_label<T: Copy>(s: &str, all: &[T], label: fn(T) -> &'static str) -> Option<T> {
    let s = s.trim();
    all.iter().copied().find(|v| label(*v).eq_ignore_ascii_case(s))
}

fn expected_labels<T: Copy>(all: &[T], label: fn(T) -> &'static str) -> String {
    all.iter()
        .map(|v| label(*v))
        .collect::<Vec<_>>()
        .join(", ")
}

impl FromStr for BankAccountType {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label(s, &Self::ALL, Self::as_str).ok_or_else(|| FieldError::UnknownVariant {
            field: validation::BANK_ACCOUNT_TYPE,
            value: s.to_string(),
            expected: expected_labels(&Self::ALL, Self::as_str),
        })
    }
}

impl FromStr for EmploymentStatus {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label(s, &Self::ALL, Self::as_str).ok_or_else(|| FieldError::UnknownVariant {
            field: validation::EMPLOYMENT_STATUS,
            value: s.to_string(),
            expected: expected_labels(&Self::ALL, Self::as_str),
        })
    }
}

impl fmt::Display for BankAccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for EmploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes of one loan application, as collected from the applicant.
///
/// Constructing a `RawInput` does not validate it; the pipeline runs
/// [`validate`](super::validate) before deriving any feature.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct RawInput {
    pub loan_amount: f64,
    pub term_days: i64,
    pub repayment_curr_ratio: f64,
    pub num_prev_loans: f64,
    pub avg_repay_delay_days: f64,
    pub total_firstrepaid_late: f64,
    pub avg_prev_repayment_ratio: f64,
    pub avg_duration_days: f64,
    pub avg_prev_interest: f64,
    pub age: i64,
    pub bank_account_type: BankAccountType,
    pub employment_status: EmploymentStatus,
}

impl Default for RawInput {
    /// The values the application form is pre-filled with.
    fn default() -> Self {
        Self {
            loan_amount: 50_000.0,
            term_days: 90,
            repayment_curr_ratio: 1.0,
            num_prev_loans: 3.0,
            avg_repay_delay_days: 10.0,
            total_firstrepaid_late: 2.0,
            avg_prev_repayment_ratio: 1.0,
            avg_duration_days: 180.0,
            avg_prev_interest: 5000.0,
            age: 30,
            bank_account_type: BankAccountType::Other,
            employment_status: EmploymentStatus::Permanent,
        }
    }
}

/// Loosely-typed application record, as read from a YAML or JSON file.
///
/// Every field is optional so that missing values are reported by name
/// instead of failing deserialization. The training column names
/// `loanamount`, `termdays` and `employment_status_clients` are accepted as
/// aliases.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RawInputRecord {
    #[serde(default, alias = "loanamount")]
    pub loan_amount: Option<f64>,
    #[serde(default, alias = "termdays")]
    pub term_days: Option<i64>,
    #[serde(default)]
    pub repayment_curr_ratio: Option<f64>,
    #[serde(default)]
    pub num_prev_loans: Option<f64>,
    #[serde(default)]
    pub avg_repay_delay_days: Option<f64>,
    #[serde(default)]
    pub total_firstrepaid_late: Option<f64>,
    #[serde(default)]
    pub avg_prev_repayment_ratio: Option<f64>,
    #[serde(default)]
    pub avg_duration_days: Option<f64>,
    #[serde(default)]
    pub avg_prev_interest: Option<f64>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub bank_account_type: Option<String>,
    #[serde(default, alias = "employment_status_clients")]
    pub employment_status: Option<String>,
}

impl RawInputRecord {
    /// Convert into a [`RawInput`], checking presence, categorical labels and
    /// numeric domains in one pass so that every bad field is reported.
    pub fn into_raw_input(self) -> Result<RawInput, ValidationError> {
        let mut errors = Vec::new();

        let loan_amount = real(self.loan_amount, &validation::LOAN_AMOUNT, &mut errors);
        let term_days = integer(self.term_days, &validation::TERM_DAYS, &mut errors);
        let repayment_curr_ratio = real(
            self.repayment_curr_ratio,
            &validation::REPAYMENT_CURR_RATIO,
            &mut errors,
        );
        let num_prev_loans = real(self.num_prev_loans, &validation::NUM_PREV_LOANS, &mut errors);
        let avg_repay_delay_days = real(
            self.avg_repay_delay_days,
            &validation::AVG_REPAY_DELAY_DAYS,
            &mut errors,
        );
        let total_firstrepaid_late = real(
            self.total_firstrepaid_late,
            &validation::TOTAL_FIRSTREPAID_LATE,
            &mut errors,
        );
        let avg_prev_repayment_ratio = real(
            self.avg_prev_repayment_ratio,
            &validation::AVG_PREV_REPAYMENT_RATIO,
            &mut errors,
        );
        let avg_duration_days = real(
            self.avg_duration_days,
            &validation::AVG_DURATION_DAYS,
            &mut errors,
        );
        let avg_prev_interest = real(
            self.avg_prev_interest,
            &validation::AVG_PREV_INTEREST,
            &mut errors,
        );
        let age = integer(self.age, &validation::AGE, &mut errors);
        let bank_account_type = category::<BankAccountType>(
            self.bank_account_type,
            validation::BANK_ACCOUNT_TYPE,
            &mut errors,
        );
        let employment_status = category::<EmploymentStatus>(
            self.employment_status,
            validation::EMPLOYMENT_STATUS,
            &mut errors,
        );

        match (
            loan_amount,
            term_days,
            repayment_curr_ratio,
            num_prev_loans,
            avg_repay_delay_days,
            total_firstrepaid_late,
            avg_prev_repayment_ratio,
            avg_duration_days,
            avg_prev_interest,
            age,
            bank_account_type,
            employment_status,
        ) {
            (
                Some(loan_amount),
                Some(term_days),
                Some(repayment_curr_ratio),
                Some(num_prev_loans),
                Some(avg_repay_delay_days),
                Some(total_firstrepaid_late),
                Some(avg_prev_repayment_ratio),
                Some(avg_duration_days),
                Some(avg_prev_interest),
                Some(age),
                Some(bank_account_type),
                Some(employment_status),
            ) if errors.is_empty() => Ok(RawInput {
                loan_amount,
                term_days,
                repayment_curr_ratio,
                num_prev_loans,
                avg_repay_delay_days,
                total_firstrepaid_late,
                avg_prev_repayment_ratio,
                avg_duration_days,
                avg_prev_interest,
                age,
                bank_account_type,
                employment_status,
            }),
            _ => Err(ValidationError::new(errors)),
        }
    }
}

impl From<RawInput> for RawInputRecord {
    fn from(input: RawInput) -> Self {
        Self {
            loan_amount: Some(input.loan_amount),
            term_days: Some(input.term_days),
            repayment_curr_ratio: Some(input.repayment_curr_ratio),
            num_prev_loans: Some(input.num_prev_loans),
            avg_repay_delay_days: Some(input.avg_repay_delay_days),
            total_firstrepaid_late: Some(input.total_firstrepaid_late),
            avg_prev_repayment_ratio: Some(input.avg_prev_repayment_ratio),
            avg_duration_days: Some(input.avg_duration_days),
            avg_prev_interest: Some(input.avg_prev_interest),
            age: Some(input.age),
            bank_account_type: Some(input.bank_account_type.to_string()),
            employment_status: Some(input.employment_status.to_string()),
        }
    }
}

fn real(value: Option<f64>, domain: &Domain, errors: &mut Vec<FieldError>) -> Option<f64> {
    match value {
        None => {
            errors.push(FieldError::Missing { field: domain.field });
            None
        }
        Some(v) => match domain.check(v) {
            Ok(()) => Some(v),
            Err(e) => {
                errors.push(e);
                None
            }
        },
    }
}

fn integer(value: Option<i64>, domain: &Domain, errors: &mut Vec<FieldError>) -> Option<i64> {
    real(value.map(|v| v as f64), domain, errors).and(value)
}

fn category<T: FromStr<Err = FieldError>>(
    value: Option<String>,
    field: &'static str,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    match value {
        None => {
            errors.push(FieldError::Missing { field });
            None
        }
        Some(s) => match s.parse::<T>() {
            Ok(v) => Some(v),
            Err(e) => {
                errors.push(e);
                None
            }
        },
    }
}
