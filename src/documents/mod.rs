//! Generated documents: the request summary PDF and the confirmation email

pub mod confirmation;
pub mod pdf;
pub mod summary;

pub use summary::{build_summary, Block, SummaryDocument};
