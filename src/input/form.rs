use anyhow::Result;
use std::io::{BufRead, Write};
use std::str::FromStr;

use super::types::{BankAccountType, EmploymentStatus, RawInput};
use super::validation::{self, Domain};
use crate::prompt::Prompter;

/// Ask for every field of a [`RawInput`], re-prompting until each value lies
/// in its domain. Empty answers keep the value from `defaults`.
pub fn collect_interactively<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    defaults: &RawInput,
) -> Result<RawInput> {
    prompter.say("Loan application")?;
    prompter.say("================")?;

    let loan_amount = ask_real(prompter, "Loan amount", &validation::LOAN_AMOUNT, defaults.loan_amount)?;
    let term_days = ask_integer(prompter, "Loan term (days)", &validation::TERM_DAYS, defaults.term_days)?;
    let repayment_curr_ratio = ask_real(
        prompter,
        "Repayment current ratio",
        &validation::REPAYMENT_CURR_RATIO,
        defaults.repayment_curr_ratio,
    )?;
    let num_prev_loans = ask_real(
        prompter,
        "Number of previous loans",
        &validation::NUM_PREV_LOANS,
        defaults.num_prev_loans,
    )?;
    let avg_repay_delay_days = ask_real(
        prompter,
        "Average repay delay (days)",
        &validation::AVG_REPAY_DELAY_DAYS,
        defaults.avg_repay_delay_days,
    )?;
    let total_firstrepaid_late = ask_real(
        prompter,
        "Total first repaid late",
        &validation::TOTAL_FIRSTREPAID_LATE,
        defaults.total_firstrepaid_late,
    )?;
    let avg_prev_repayment_ratio = ask_real(
        prompter,
        "Avg previous repayment ratio",
        &validation::AVG_PREV_REPAYMENT_RATIO,
        defaults.avg_prev_repayment_ratio,
    )?;
    let avg_duration_days = ask_real(
        prompter,
        "Avg duration of previous loans (days)",
        &validation::AVG_DURATION_DAYS,
        defaults.avg_duration_days,
    )?;
    let avg_prev_interest = ask_real(
        prompter,
        "Avg previous interest",
        &validation::AVG_PREV_INTEREST,
        defaults.avg_prev_interest,
    )?;
    let age = ask_integer(prompter, "Client age", &validation::AGE, defaults.age)?;
    let bank_account_type = ask_choice(
        prompter,
        "Bank account type",
        &BankAccountType::ALL,
        BankAccountType::as_str,
        defaults.bank_account_type,
    )?;
    let employment_status = ask_choice(
        prompter,
        "Employment status",
        &EmploymentStatus::ALL,
        EmploymentStatus::as_str,
        defaults.employment_status,
    )?;

    Ok(RawInput {
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
    })
}

fn ask_real<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    label: &str,
    domain: &Domain,
    default: f64,
) -> Result<f64> {
    let message = format!("{} ({} to {})", label, domain.min, domain.max);
    prompter.prompt_until(&message, &default.to_string(), |s| {
        let value: f64 = s.parse().map_err(|_| "must be a number".to_string())?;
        domain.check(value).map_err(|e| e.to_string())?;
        Ok(value)
    })
}

fn ask_integer<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    label: &str,
    domain: &Domain,
    default: i64,
) -> Result<i64> {
    let message = format!("{} ({} to {})", label, domain.min, domain.max);
    prompter.prompt_until(&message, &default.to_string(), |s| {
        let value: i64 = s.parse().map_err(|_| "must be a whole number".to_string())?;
        domain.check(value as f64).map_err(|e| e.to_string())?;
        Ok(value)
    })
}

fn ask_choice<T, R, W>(
    prompter: &mut Prompter<R, W>,
    label: &str,
    all: &[T],
    name: fn(T) -> &'static str,
    default: T,
) -> Result<T>
where
    T: Copy + FromStr<Err = crate::error::FieldError>,
    R: BufRead,
    W: Write,
{
    let options = all.iter().map(|v| name(*v)).collect::<Vec<_>>().join(", ");
    let message = format!("{} ({})", label, options);
    prompter.prompt_until(&message, name(default), |s| {
        s.parse::<T>().map_err(|e| e.to_string())
    })
}
