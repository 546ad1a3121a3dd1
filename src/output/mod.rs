pub mod formatter;

pub use formatter::{
    format_features, format_probability, format_result, format_validation_error,
    should_use_colors,
};
