use tracing::debug;

use super::error::ComparisonError;
use super::types::{
    Advantage, BetterOption, ComparisonInput, ComparisonResult, ConventionalPeriod,
    ConventionalSummary, HalalPeriod, HalalSummary, HouseSummary, MonthlyRecord, YearlyRecord,
};

const MONTHS_PER_YEAR: u32 = 12;

/// Longest term a single comparison will schedule.
pub const MAX_TERM_YEARS: u32 = 100;

/// Values derived once per comparison, after validation.
#[derive(Debug, Clone, Copy)]
struct Terms {
    months: u32,
    loan_amount: f64,
    down_payment: f64,
    monthly_interest_rate: f64,
    monthly_rental_rate: f64,
    rent_growth_factor: f64,
    home_growth_factor: f64,
}

/// Running totals for the 12-period block currently being filled.
#[derive(Debug, Clone, Copy)]
struct YearTotals {
    conventional: ConventionalPeriod,
    halal: HalalPeriod,
}

impl YearTotals {
    fn opening(conventional_balance: f64, halal_balance: f64) -> Self {
        Self {
            conventional: ConventionalPeriod {
                beginning_balance: conventional_balance,
                ending_balance: conventional_balance,
                ..ConventionalPeriod::default()
            },
            halal: HalalPeriod {
                beginning_balance: halal_balance,
                ending_balance: halal_balance,
                ..HalalPeriod::default()
            },
        }
    }

    fn push(&mut self, record: &MonthlyRecord) {
        let c = &mut self.conventional;
        c.total_payment += record.conventional.total_payment;
        c.interest_paid += record.conventional.interest_paid;
        c.principal_paid += record.conventional.principal_paid;
        c.ending_balance = record.conventional.ending_balance;

        let h = &mut self.halal;
        h.total_payment += record.halal.total_payment;
        h.rent_component += record.halal.rent_component;
        h.buyout_component += record.halal.buyout_component;
        h.ending_balance = record.halal.ending_balance;
    }

    fn close(self, year: u32) -> YearlyRecord {
        YearlyRecord {
            year,
            conventional: self.conventional,
            halal: self.halal,
        }
    }
}

/// Monthly market rent for a home, rounded to whole currency units.
pub fn fair_market_rent(home_value: f64, annual_rental_rate: f64) -> f64 {
    (home_value * annual_rental_rate / 12.0 / 100.0).round()
}

/// Fixed monthly buyout that retires `principal` over `years`, rounded to whole units.
pub fn monthly_buyout(principal: f64, years: u32) -> Result<f64, ComparisonError> {
    let months = term_months(years)?;
    require_positive_amount("principal", principal)?;
    Ok((principal / months as f64).round())
}

pub fn compare(input: &ComparisonInput) -> Result<ComparisonResult, ComparisonError> {
    let terms = validate(input)?;
    let months = terms.months;
    let monthly_payment = level_payment(terms.loan_amount, terms.monthly_interest_rate, months);

    let mut monthly_breakdown = Vec::with_capacity(months as usize);
    let mut yearly_breakdown = Vec::with_capacity(input.term_years as usize);

    let mut balance = terms.loan_amount;
    let mut halal_balance = terms.loan_amount;
    let mut total_rent_paid = 0.0;
    let mut year = YearTotals::opening(balance, halal_balance);

    for period in 0..months {
        let current_year = period / MONTHS_PER_YEAR;
        let is_final = period + 1 == months;
        let rent_rate =
            terms.monthly_rental_rate * terms.rent_growth_factor.powi(current_year as i32);

        let conventional = conventional_period(
            balance,
            monthly_payment,
            terms.monthly_interest_rate,
            is_final,
        );
        let halal = halal_period(halal_balance, input.monthly_buyout, rent_rate, is_final);
        balance = conventional.ending_balance;
        halal_balance = halal.ending_balance;
        total_rent_paid += halal.rent_component;

        let record = MonthlyRecord {
            month: period + 1,
            conventional,
            halal,
        };
        year.push(&record);
        monthly_breakdown.push(record);

        if (period + 1) % MONTHS_PER_YEAR == 0 || is_final {
            yearly_breakdown.push(year.close(current_year + 1));
            year = YearTotals::opening(balance, halal_balance);
        }
    }

    let months_f = months as f64;
    let conventional_total_payments = monthly_payment * months_f;
    let halal_total_payments = total_rent_paid + terms.loan_amount;

    let projected_value = input.home_price * terms.home_growth_factor.powi(input.term_years as i32);
    let house = HouseSummary {
        initial_value: input.home_price,
        projected_value,
        appreciation: projected_value - input.home_price,
    };

    let conventional = ConventionalSummary {
        average_monthly_payment: monthly_payment,
        total_payments: conventional_total_payments,
        total_cost: conventional_total_payments + terms.down_payment,
        bank_profit: conventional_total_payments - terms.loan_amount,
        net_gain: projected_value - conventional_total_payments - terms.down_payment,
    };
    let halal = HalalSummary {
        average_monthly_payment: total_rent_paid / months_f + input.monthly_buyout,
        rent_component: total_rent_paid / months_f,
        total_payments: halal_total_payments,
        total_cost: halal_total_payments + terms.down_payment,
        bank_profit: total_rent_paid,
        net_gain: projected_value - halal_total_payments - terms.down_payment,
    };
    let advantage = advantage(halal.net_gain - conventional.net_gain, input.term_years);

    debug!(
        months,
        loan_amount = terms.loan_amount,
        monthly_payment,
        total_rent_paid,
        better_option = advantage.better_option.label(),
        "comparison complete"
    );

    Ok(ComparisonResult {
        loan_amount: terms.loan_amount,
        down_payment: terms.down_payment,
        months,
        conventional,
        halal,
        house,
        advantage,
        monthly_breakdown,
        yearly_breakdown,
    })
}

fn validate(input: &ComparisonInput) -> Result<Terms, ComparisonError> {
    let months = term_months(input.term_years)?;

    for (field, value) in [
        ("down_payment_percent", input.down_payment_percent),
        ("interest_rate", input.interest_rate),
        ("annual_rental_rate", input.annual_rental_rate),
        ("annual_home_growth", input.annual_home_growth),
        ("annual_rent_growth", input.annual_rent_growth),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(ComparisonError::InvalidRate { field, value });
        }
    }

    require_positive_amount("home_price", input.home_price)?;
    require_positive_amount("monthly_buyout", input.monthly_buyout)?;
    let loan_amount = input.home_price * (1.0 - input.down_payment_percent / 100.0);
    require_positive_amount("loan_amount", loan_amount)?;

    Ok(Terms {
        months,
        loan_amount,
        down_payment: input.home_price - loan_amount,
        monthly_interest_rate: input.interest_rate / 100.0 / 12.0,
        monthly_rental_rate: input.annual_rental_rate / 100.0 / 12.0,
        rent_growth_factor: 1.0 + input.annual_rent_growth / 100.0,
        home_growth_factor: 1.0 + input.annual_home_growth / 100.0,
    })
}

fn term_months(years: u32) -> Result<u32, ComparisonError> {
    if !(1..=MAX_TERM_YEARS).contains(&years) {
        return Err(ComparisonError::InvalidTerm { years });
    }
    Ok(years * MONTHS_PER_YEAR)
}

fn require_positive_amount(field: &'static str, value: f64) -> Result<(), ComparisonError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ComparisonError::InvalidPrincipal { field, value })
    }
}

fn level_payment(loan_amount: f64, monthly_rate: f64, months: u32) -> f64 {
    let n = months as f64;
    if monthly_rate == 0.0 {
        return loan_amount / n;
    }
    // 1 - (1 + r)^-n, evaluated without forming 1 + r so tiny rates keep their digits.
    let discount = -(-n * monthly_rate.ln_1p()).exp_m1();
    if !discount.is_finite() || discount <= 0.0 {
        return loan_amount / n;
    }
    loan_amount * monthly_rate / discount
}

fn conventional_period(
    beginning: f64,
    payment: f64,
    monthly_rate: f64,
    is_final: bool,
) -> ConventionalPeriod {
    let interest = beginning * monthly_rate;
    // The last period retires whatever drift left behind.
    let principal = if is_final {
        beginning
    } else {
        (payment - interest).clamp(0.0, beginning)
    };
    ConventionalPeriod {
        total_payment: interest + principal,
        beginning_balance: beginning,
        ending_balance: beginning - principal,
        interest_paid: interest,
        principal_paid: principal,
    }
}

fn halal_period(beginning: f64, buyout: f64, rent_rate: f64, is_final: bool) -> HalalPeriod {
    let rent = beginning * rent_rate;
    let buyout = if is_final {
        beginning
    } else {
        buyout.min(beginning)
    };
    HalalPeriod {
        total_payment: rent + buyout,
        rent_component: rent,
        buyout_component: buyout,
        beginning_balance: beginning,
        ending_balance: beginning - buyout,
    }
}

fn advantage(net_wealth_position: f64, term_years: u32) -> Advantage {
    let better_option = if net_wealth_position > 0.0 {
        BetterOption::Halal
    } else if net_wealth_position < 0.0 {
        BetterOption::Conventional
    } else {
        BetterOption::Equal
    };
    let advantage_amount = net_wealth_position.abs();
    let overall_advantage = match better_option {
        BetterOption::Equal => {
            format!("Both options lead to an equal outcome over {term_years} years")
        }
        winner => format!(
            "{} financing leaves you {} better off over {term_years} years",
            winner.label(),
            advantage_amount.round()
        ),
    };

    Advantage {
        net_wealth_position,
        overall_advantage,
        advantage_amount,
        better_option,
    }
}
