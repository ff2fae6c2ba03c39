//! Form rules: state machine, validation, category codes and derived values

pub mod category;
pub mod derived;
pub mod form_state;
pub mod validation;

pub use category::category_code;
pub use form_state::{FormState, Stage};
pub use validation::{evaluate, validate_required_fields, ValidationOutcome};
