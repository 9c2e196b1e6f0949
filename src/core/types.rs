use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonInput {
    pub home_price: f64,
    /// Percent of the home price paid up front, in [0, 100).
    pub down_payment_percent: f64,
    pub term_years: u32,
    /// Annual conventional interest rate in percent.
    pub interest_rate: f64,
    /// Fixed monthly reduction of the financier's share.
    pub monthly_buyout: f64,
    /// Annual rent in percent of the financier's remaining share.
    pub annual_rental_rate: f64,
    pub annual_home_growth: f64,
    pub annual_rent_growth: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum BetterOption {
    Halal,
    Conventional,
    Equal,
}

impl BetterOption {
    pub fn label(self) -> &'static str {
        match self {
            BetterOption::Halal => "Halal",
            BetterOption::Conventional => "Conventional",
            BetterOption::Equal => "Equal",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConventionalPeriod {
    pub total_payment: f64,
    pub beginning_balance: f64,
    pub ending_balance: f64,
    pub interest_paid: f64,
    pub principal_paid: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HalalPeriod {
    pub total_payment: f64,
    pub rent_component: f64,
    pub buyout_component: f64,
    pub beginning_balance: f64,
    pub ending_balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRecord {
    pub month: u32,
    pub conventional: ConventionalPeriod,
    pub halal: HalalPeriod,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyRecord {
    pub year: u32,
    pub conventional: ConventionalPeriod,
    pub halal: HalalPeriod,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConventionalSummary {
    pub average_monthly_payment: f64,
    pub total_payments: f64,
    pub total_cost: f64,
    pub bank_profit: f64,
    pub net_gain: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HalalSummary {
    pub average_monthly_payment: f64,
    /// Average monthly rent over the whole term.
    pub rent_component: f64,
    pub total_payments: f64,
    pub total_cost: f64,
    pub bank_profit: f64,
    pub net_gain: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseSummary {
    pub initial_value: f64,
    pub projected_value: f64,
    pub appreciation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Advantage {
    pub net_wealth_position: f64,
    pub overall_advantage: String,
    pub advantage_amount: f64,
    pub better_option: BetterOption,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub loan_amount: f64,
    pub down_payment: f64,
    pub months: u32,
    pub conventional: ConventionalSummary,
    pub halal: HalalSummary,
    pub house: HouseSummary,
    pub advantage: Advantage,
    pub monthly_breakdown: Vec<MonthlyRecord>,
    pub yearly_breakdown: Vec<YearlyRecord>,
}
