//! The five weighted components of the Collection Risk Score.
//!
//! Each component is `raw points x weight`, and the constants below already
//! carry that product. Missing inputs are `None` and stay `None` wherever the
//! formula is arithmetic; the categorical components score unknown values as
//! zero instead.

use crate::types::{DelayedPayment, FinancialStatus, IncomeLevel};

/// Weight of payment history.
pub const PAYMENT_HISTORY_WEIGHT: f64 = 0.30;
/// Weight of outstanding debt amount.
pub const OUTSTANDING_DEBT_WEIGHT: f64 = 0.20;
/// Weight of income level.
pub const INCOME_LEVEL_WEIGHT: f64 = 0.20;
/// Weight of employment (financial) status.
pub const EMPLOYMENT_STATUS_WEIGHT: f64 = 0.15;
/// Weight of credit score.
pub const CREDIT_SCORE_WEIGHT: f64 = 0.15;

/// Upper end of the credit score scale.
pub const CREDIT_SCORE_CEILING: f64 = 850.0;

/// PH_Score for a borrower who never delayed a payment.
pub const PH_ON_TIME: f64 = 30.0 * PAYMENT_HISTORY_WEIGHT;
/// PH_Score for a borrower with a delayed payment.
pub const PH_DELAYED: f64 = 15.0 * PAYMENT_HISTORY_WEIGHT;

pub const IL_HIGH: f64 = 20.0 * INCOME_LEVEL_WEIGHT;
pub const IL_MEDIUM: f64 = 10.0 * INCOME_LEVEL_WEIGHT;

pub const ES_STABLE: f64 = 15.0 * EMPLOYMENT_STATUS_WEIGHT;
pub const ES_SEMI_STABLE: f64 = 7.5 * EMPLOYMENT_STATUS_WEIGHT;

const ODA_POINTS: f64 = 20.0;
const CS_POINTS: f64 = 15.0;

/// Payment History: 9.0 when on time, 4.5 when delayed, 0 otherwise.
pub fn payment_history(delayed: Option<&str>) -> f64 {
    match delayed.and_then(DelayedPayment::parse) {
        Some(DelayedPayment::No) => PH_ON_TIME,
        Some(DelayedPayment::Yes) => PH_DELAYED,
        None => 0.0,
    }
}

/// `Loan Amount / Loan Term`; undefined for a zero or missing term.
pub fn total_amount_to_be_paid(loan_amount: Option<f64>, loan_term: Option<f64>) -> Option<f64> {
    checked_div(loan_amount?, loan_term?)
}

/// Outstanding Debt Amount: `(1 - Loan Amount / TotalAmountToBePaid) x 20 x 0.20`.
///
/// Substituting the total gives `(1 - Loan Term) x 4`, so this scores the
/// loan term rather than the debt. The literal formula is kept; see
/// DESIGN.md. Undefined when the total is missing or zero.
pub fn outstanding_debt(loan_amount: Option<f64>, total_to_pay: Option<f64>) -> Option<f64> {
    let ratio = checked_div(loan_amount?, total_to_pay?)?;
    Some((1.0 - ratio) * ODA_POINTS * OUTSTANDING_DEBT_WEIGHT)
}

/// Income Level: 4.0 for high, 2.0 for medium, 0 otherwise.
pub fn income_level(level: Option<&str>) -> f64 {
    match level.and_then(IncomeLevel::parse) {
        Some(IncomeLevel::High) => IL_HIGH,
        Some(IncomeLevel::Medium) => IL_MEDIUM,
        _ => 0.0,
    }
}

/// Employment Status: 2.25 for stable, 1.125 for semi-stable, 0 otherwise.
pub fn employment_status(status: Option<&str>) -> f64 {
    match status.and_then(FinancialStatus::parse) {
        Some(FinancialStatus::Stable) => ES_STABLE,
        Some(FinancialStatus::SemiStable) => ES_SEMI_STABLE,
        _ => 0.0,
    }
}

/// Credit Score: `(score / 850) x 15 x 0.15`; undefined for a negative or
/// missing score.
pub fn credit_score(score: Option<f64>) -> Option<f64> {
    let score = score.filter(|s| *s >= 0.0)?;
    Some(score / CREDIT_SCORE_CEILING * CS_POINTS * CREDIT_SCORE_WEIGHT)
}

/// Composite score; missing when any component is missing.
pub fn composite(components: [Option<f64>; 5]) -> Option<f64> {
    crate::utils::sum_present(&components)
}

fn checked_div(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator).filter(|v| v.is_finite())
}
