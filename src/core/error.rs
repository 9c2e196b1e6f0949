use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComparisonError {
    #[error("term must be between 1 and {max} years, got {years}", max = super::engine::MAX_TERM_YEARS)]
    InvalidTerm { years: u32 },

    #[error("{field} must be a finite, non-negative percentage, got {value}")]
    InvalidRate { field: &'static str, value: f64 },

    #[error("{field} must be a finite amount greater than zero, got {value}")]
    InvalidPrincipal { field: &'static str, value: f64 },
}
