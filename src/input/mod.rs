pub mod form;
pub mod types;
pub mod validation;

pub use form::collect_interactively;
pub use types::{BankAccountType, EmploymentStatus, RawInput, RawInputRecord};
pub use validation::{validate, Domain};
