//! Column matching and cell validation.
//!
//! - [`matcher`] - bind fieldset fields to file columns, structural failures
//! - [`fieldset`] - per-cell rules over every data row
//! - [`data_type`] - data type coercion rules
//! - [`baseline`] - schema-independent table checks

pub mod baseline;
pub mod data_type;
pub mod fieldset;
pub mod matcher;

pub use baseline::baseline_failures;
pub use data_type::data_types_description;
pub use fieldset::validate_fieldset;
pub use matcher::{match_fields, MatchResult};
