use serde::ser::{Serialize, SerializeMap, Serializer};

/// Number of columns the classifier consumes.
pub const FEATURE_COUNT: usize = 14;

/// One column of the classifier's input, in positional order.
///
/// The model was trained on columns named `sqrt_*` that actually hold the
/// **square** of the underlying value. [`Feature::name`] describes what the
/// column contains; [`Feature::column`] keeps the training-time name, which is
/// what model artifacts list and what downstream consumers may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    RepaymentCurrRatio,
    NumPrevLoans,
    AvgRepayDelayDays,
    TotalFirstrepaidLate,
    AvgPrevRepaymentRatio,
    AvgDurationDays,
    Age,
    SqLatePaymentRate,
    SqTermDays,
    SqLoanAmount,
    SqAvgPrevInterest,
    SqRepaymentEfficiency,
    BankAccountType,
    EmploymentStatus,
}

impl Feature {
    /// Every feature, in the order the classifier expects.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::RepaymentCurrRatio,
        Feature::NumPrevLoans,
        Feature::AvgRepayDelayDays,
        Feature::TotalFirstrepaidLate,
        Feature::AvgPrevRepaymentRatio,
        Feature::AvgDurationDays,
        Feature::Age,
        Feature::SqLatePaymentRate,
        Feature::SqTermDays,
        Feature::SqLoanAmount,
        Feature::SqAvgPrevInterest,
        Feature::SqRepaymentEfficiency,
        Feature::BankAccountType,
        Feature::EmploymentStatus,
    ];

    /// Position of this feature in the vector.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Feature::RepaymentCurrRatio => "repayment_curr_ratio",
            Feature::NumPrevLoans => "num_prev_loans",
            Feature::AvgRepayDelayDays => "avg_repay_delay_days",
            Feature::TotalFirstrepaidLate => "total_firstrepaid_late",
            Feature::AvgPrevRepaymentRatio => "avg_prev_repayment_ratio",
            Feature::AvgDurationDays => "avg_duration_days",
            Feature::Age => "age",
            Feature::SqLatePaymentRate => "sq_late_payment_rate",
            Feature::SqTermDays => "sq_termdays",
            Feature::SqLoanAmount => "sq_loanamount",
            Feature::SqAvgPrevInterest => "sq_avg_prev_interest",
            Feature::SqRepaymentEfficiency => "sq_repayment_efficiency",
            Feature::BankAccountType => "bank_account_type",
            Feature::EmploymentStatus => "employment_status",
        }
    }

    /// Column name the model was trained with.
    pub fn column(self) -> &'static str {
        match self {
            Feature::SqLatePaymentRate => "sqrt_late_payment_rate",
            Feature::SqTermDays => "sqrt_termdays",
            Feature::SqLoanAmount => "sqrt_loanamount",
            Feature::SqAvgPrevInterest => "sqrt_avg_prev_interest",
            Feature::SqRepaymentEfficiency => "sqrt_repayment_efficiency",
            Feature::EmploymentStatus => "employment_status_clients",
            other => other.name(),
        }
    }

    pub fn is_categorical(self) -> bool {
        matches!(self, Feature::BankAccountType | Feature::EmploymentStatus)
    }

    pub fn from_column(column: &str) -> Option<Feature> {
        Feature::ALL.iter().copied().find(|f| f.column() == column)
    }
}

/// Value held by one feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue {
    Numeric(f64),
    Categorical(&'static str),
}

impl FeatureValue {
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            FeatureValue::Numeric(v) => Some(*v),
            FeatureValue::Categorical(_) => None,
        }
    }

    pub fn as_category(&self) -> Option<&'static str> {
        match self {
            FeatureValue::Categorical(c) => Some(c),
            FeatureValue::Numeric(_) => None,
        }
    }
}

impl std::fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureValue::Numeric(v) => write!(f, "{}", v),
            FeatureValue::Categorical(c) => f.write_str(c),
        }
    }
}

impl Serialize for FeatureValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FeatureValue::Numeric(v) => serializer.serialize_f64(*v),
            FeatureValue::Categorical(c) => serializer.serialize_str(c),
        }
    }
}

/// Ordered classifier input derived from one [`RawInput`](crate::input::RawInput).
///
/// Besides the 14 columns it keeps the two unsquared intermediates
/// (`late_payment_rate`, `repayment_efficiency`) for inspection; they are not
/// part of what the classifier sees.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [FeatureValue; FEATURE_COUNT],
    late_payment_rate: f64,
    repayment_efficiency: f64,
}

impl FeatureVector {
    pub(crate) fn new(
        values: [FeatureValue; FEATURE_COUNT],
        late_payment_rate: f64,
        repayment_efficiency: f64,
    ) -> Self {
        Self {
            values,
            late_payment_rate,
            repayment_efficiency,
        }
    }

    pub fn get(&self, feature: Feature) -> FeatureValue {
        self.values[feature.index()]
    }

    pub fn numeric(&self, feature: Feature) -> Option<f64> {
        self.get(feature).as_numeric()
    }

    pub fn category(&self, feature: Feature) -> Option<&'static str> {
        self.get(feature).as_category()
    }

    pub fn values(&self) -> &[FeatureValue; FEATURE_COUNT] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, FeatureValue)> + '_ {
        Feature::ALL.iter().copied().zip(self.values.iter().copied())
    }

    pub fn late_payment_rate(&self) -> f64 {
        self.late_payment_rate
    }

    pub fn repayment_efficiency(&self) -> f64 {
        self.repayment_efficiency
    }
}

/// Serializes as an ordered map keyed by training column name.
impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for (feature, value) in self.iter() {
            map.serialize_entry(feature.column(), &value)?;
        }
        map.end()
    }
}
