mod engine;
mod error;
mod types;

pub use engine::{MAX_TERM_YEARS, compare, fair_market_rent, monthly_buyout};
pub use error::ComparisonError;
pub use types::{
    Advantage, BetterOption, ComparisonInput, ComparisonResult, ConventionalPeriod,
    ConventionalSummary, HalalPeriod, HalalSummary, HouseSummary, MonthlyRecord, YearlyRecord,
};
