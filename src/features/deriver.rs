use tracing::debug;

use super::vector::{FeatureValue, FeatureVector};
use crate::error::ValidationError;
use crate::input::{validate, RawInput};

/// Added to ratio denominators so a zero count never divides by zero.
pub const EPSILON: f64 = 1e-6;

/// Validate `input` and derive the classifier's feature vector from it.
pub fn derive_features(input: &RawInput) -> Result<FeatureVector, ValidationError> {
    validate(input)?;
    Ok(derive_validated(input))
}

fn derive_validated(input: &RawInput) -> FeatureVector {
    let late_payment_rate = input.total_firstrepaid_late / (input.num_prev_loans + EPSILON);
    let repayment_efficiency =
        input.repayment_curr_ratio / (input.avg_prev_repayment_ratio + EPSILON);

    // Training applied sqrt to these columns; the inputs are squared to match.
    let sq_loanamount = input.loan_amount.powi(2);
    let sq_termdays = (input.term_days as f64).powi(2);
    let sq_avg_prev_interest = input.avg_prev_interest.powi(2);
    let sq_repayment_efficiency = repayment_efficiency.powi(2);
    let sq_late_payment_rate = late_payment_rate.powi(2);

    let values = [
        FeatureValue::Numeric(input.repayment_curr_ratio),
        FeatureValue::Numeric(input.num_prev_loans),
        FeatureValue::Numeric(input.avg_repay_delay_days),
        FeatureValue::Numeric(input.total_firstrepaid_late),
        FeatureValue::Numeric(input.avg_prev_repayment_ratio),
        FeatureValue::Numeric(input.avg_duration_days),
        FeatureValue::Numeric(input.age as f64),
        FeatureValue::Numeric(sq_late_payment_rate),
        FeatureValue::Numeric(sq_termdays),
        FeatureValue::Numeric(sq_loanamount),
        FeatureValue::Numeric(sq_avg_prev_interest),
        FeatureValue::Numeric(sq_repayment_efficiency),
        FeatureValue::Categorical(input.bank_account_type.as_str()),
        FeatureValue::Categorical(input.employment_status.as_str()),
    ];

    debug!(
        late_payment_rate,
        repayment_efficiency, sq_loanamount, sq_termdays, "Derived features"
    );

    FeatureVector::new(values, late_payment_rate, repayment_efficiency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Feature;
    use crate::input::{BankAccountType, EmploymentStatus};
    use proptest::prelude::*;

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_reference_application() {
        let fv = derive_features(&RawInput::default()).unwrap();

        assert!(approx(fv.late_payment_rate(), 0.6667, 1e-4));
        assert!(approx(fv.repayment_efficiency(), 1.0, 1e-5));
        assert_eq!(fv.numeric(Feature::SqLoanAmount), Some(2_500_000_000.0));
        assert_eq!(fv.numeric(Feature::SqTermDays), Some(8100.0));
        assert_eq!(fv.numeric(Feature::SqAvgPrevInterest), Some(25_000_000.0));
        assert!(approx(fv.numeric(Feature::SqRepaymentEfficiency).unwrap(), 1.0, 1e-5));
        assert!(approx(fv.numeric(Feature::SqLatePaymentRate).unwrap(), 0.4444, 1e-4));
        assert_eq!(fv.category(Feature::BankAccountType), Some("Other"));
        assert_eq!(fv.category(Feature::EmploymentStatus), Some("Permanent"));
    }

    #[test]
    fn test_raw_columns_pass_through_in_order() {
        let fv = derive_features(&RawInput::default()).unwrap();
        let leading: Vec<f64> = fv
            .values()
            .iter()
            .take(7)
            .map(|v| v.as_numeric().unwrap())
            .collect();
        assert_eq!(leading, vec![1.0, 3.0, 10.0, 2.0, 1.0, 180.0, 30.0]);
    }

    #[test]
    fn test_fourteen_features_with_kinds() {
        let fv = derive_features(&RawInput::default()).unwrap();
        let names: Vec<_> = fv.iter().map(|(f, _)| f.name()).collect();
        assert_eq!(
            names,
            vec![
                "repayment_curr_ratio",
                "num_prev_loans",
                "avg_repay_delay_days",
                "total_firstrepaid_late",
                "avg_prev_repayment_ratio",
                "avg_duration_days",
                "age",
                "sq_late_payment_rate",
                "sq_termdays",
                "sq_loanamount",
                "sq_avg_prev_interest",
                "sq_repayment_efficiency",
                "bank_account_type",
                "employment_status",
            ]
        );
        for (feature, value) in fv.iter() {
            assert_eq!(feature.is_categorical(), value.as_category().is_some());
        }
    }

    #[test]
    fn test_zero_denominators_stay_finite() {
        let input = RawInput {
            num_prev_loans: 0.0,
            total_firstrepaid_late: 50.0,
            avg_prev_repayment_ratio: 0.0,
            repayment_curr_ratio: 2.0,
            ..RawInput::default()
        };
        let fv = derive_features(&input).unwrap();

        assert!(fv.late_payment_rate().is_finite());
        assert!(fv.repayment_efficiency().is_finite());
        assert!(approx(fv.late_payment_rate(), 50.0 / EPSILON, 1.0));
        assert!(fv.numeric(Feature::SqLatePaymentRate).unwrap().is_finite());
        assert!(fv.numeric(Feature::SqRepaymentEfficiency).unwrap().is_finite());
    }

    #[test]
    fn test_squares_not_roots() {
        let input = RawInput {
            loan_amount: 400.0,
            term_days: 16,
            ..RawInput::default()
        };
        let fv = derive_features(&input).unwrap();
        assert_eq!(fv.numeric(Feature::SqLoanAmount), Some(160_000.0));
        assert_eq!(fv.numeric(Feature::SqTermDays), Some(256.0));
    }

    #[test]
    fn test_invalid_input_is_rejected_before_derivation() {
        let input = RawInput {
            loan_amount: 99.99,
            ..RawInput::default()
        };
        let err = derive_features(&input).unwrap_err();
        assert_eq!(err.fields(), vec!["loan_amount"]);
    }

    #[test]
    fn test_categoricals_use_canonical_labels() {
        let input = RawInput {
            bank_account_type: BankAccountType::Current,
            employment_status: EmploymentStatus::SelfEmployed,
            ..RawInput::default()
        };
        let fv = derive_features(&input).unwrap();
        assert_eq!(fv.category(Feature::BankAccountType), Some("Current"));
        assert_eq!(fv.category(Feature::EmploymentStatus), Some("Self-Employed"));
    }

    proptest! {
        #[test]
        fn prop_sq_loanamount_monotonic(a in 100.0f64..1_000_000.0, b in 100.0f64..1_000_000.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let fv_lo = derive_features(&RawInput { loan_amount: lo, ..RawInput::default() }).unwrap();
            let fv_hi = derive_features(&RawInput { loan_amount: hi, ..RawInput::default() }).unwrap();
            prop_assert!(
                fv_lo.numeric(Feature::SqLoanAmount).unwrap()
                    <= fv_hi.numeric(Feature::SqLoanAmount).unwrap()
            );
        }

        #[test]
        fn prop_derivation_is_deterministic(
            loans in 0.0f64..50.0,
            late in 0.0f64..50.0,
            ratio in 0.0f64..2.0,
            prev_ratio in 0.0f64..2.0,
        ) {
            let input = RawInput {
                num_prev_loans: loans,
                total_firstrepaid_late: late,
                repayment_curr_ratio: ratio,
                avg_prev_repayment_ratio: prev_ratio,
                ..RawInput::default()
            };
            let first = derive_features(&input).unwrap();
            let second = derive_features(&input).unwrap();
            prop_assert_eq!(first, second);
            prop_assert!(derive_features(&input).unwrap().late_payment_rate().is_finite());
        }
    }
}
