use owo_colors::OwoColorize;
use std::io::IsTerminal;

use crate::error::ValidationError;
use crate::features::FeatureVector;
use crate::scoring::{Label, PredictionResult};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Probability with two decimals, e.g. "0.83"
pub fn format_probability(probability: f64) -> String {
    format!("{:.2}", probability)
}

fn verdict(label: Label) -> &'static str {
    match label {
        Label::Good => "Safe Loan: This client is likely to repay (Good Loan)",
        Label::Bad => "Risky Loan: This client is likely to default (Bad Loan)",
    }
}

/// Format a prediction as three lines: score, probability, verdict
pub fn format_result(result: &PredictionResult, use_colors: bool) -> String {
    let score_line = format!("Credit Score: {}", result.credit_score);
    let probability_line = format!(
        "Probability of Good Loan: {}",
        format_probability(result.probability_good)
    );
    let verdict_line = verdict(result.label);

    if use_colors {
        let verdict_line = match result.label {
            Label::Good => verdict_line.green().bold().to_string(),
            Label::Bad => verdict_line.red().bold().to_string(),
        };
        format!("{}\n{}\n{}", score_line.bold(), probability_line, verdict_line)
    } else {
        format!("{}\n{}\n{}", score_line, probability_line, verdict_line)
    }
}

/// Format a feature vector as an aligned table:
/// position, descriptive name, training column, value
pub fn format_features(features: &FeatureVector, use_colors: bool) -> String {
    let name_width = features
        .iter()
        .map(|(f, _)| f.name().len())
        .max()
        .unwrap_or(0);
    let column_width = features
        .iter()
        .map(|(f, _)| f.column().len())
        .max()
        .unwrap_or(0);

    let mut lines: Vec<String> = features
        .iter()
        .map(|(feature, value)| {
            let index = format!("{:>2}", feature.index());
            let name = format!("{:<width$}", feature.name(), width = name_width);
            let column = format!("{:<width$}", feature.column(), width = column_width);
            if use_colors {
                format!("{}  {}  {}  {}", index.dimmed(), name.bold(), column.cyan(), value)
            } else {
                format!("{}  {}  {}  {}", index, name, column, value)
            }
        })
        .collect();

    lines.push(String::new());
    lines.push(format!("late_payment_rate = {}", features.late_payment_rate()));
    lines.push(format!("repayment_efficiency = {}", features.repayment_efficiency()));
    lines.join("\n")
}

/// One line per offending field, ready for stderr
pub fn format_validation_error(error: &ValidationError, use_colors: bool) -> String {
    let header = "Invalid application:";
    let mut lines = vec![if use_colors {
        header.red().bold().to_string()
    } else {
        header.to_string()
    }];
    lines.extend(error.errors.iter().map(|e| format!("  - {}", e)));
    lines.join("\n")
}
