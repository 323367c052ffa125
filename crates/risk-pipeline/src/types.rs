use serde::{Deserialize, Serialize};
use std::fmt;

/// Column names of the borrower table.
pub mod columns {
    pub const EMAIL: &str = "Email Address";
    pub const PHONE: &str = "Phone Number";
    pub const LOAN_AMOUNT: &str = "Loan Amount";
    pub const INTEREST_RATE: &str = "Interest Rate";
    pub const DAYS_LEFT: &str = "Days Left to Pay Current EMI";
    pub const DATE_OF_BIRTH: &str = "Date of Birth";
    pub const DELAYED_PAYMENT: &str = "Delayed Payment";
    pub const CREDIT_SCORE: &str = "Credit Score";
    pub const LOAN_TERM: &str = "Loan Term";

    pub const GENDER: &str = "Gender";
    pub const MARITAL_STATUS: &str = "Marital Status";
    pub const LANGUAGE_PREFERENCE: &str = "Language Preference";
    pub const LOAN_TYPE: &str = "Loan Type";

    // Derived by the transformer
    pub const INCOME_LEVEL: &str = "Income Level";
    pub const FINANCIAL_STATUS: &str = "Financial Status";

    // Derived by the scorer
    pub const TOTAL_AMOUNT_TO_BE_PAID: &str = "TotalAmountToBePaid";
    pub const PH_SCORE: &str = "PH_Score";
    pub const ODA_SCORE: &str = "ODA_Score";
    pub const IL_SCORE: &str = "IL_Score";
    pub const ES_SCORE: &str = "ES_Score";
    pub const CS_SCORE: &str = "CS_Score";
    pub const RISK_SCORE: &str = "CollectionRiskScore";
    pub const RANK: &str = "Rank";

    /// Raw columns coerced to `Float64` by the transformer.
    pub const NUMERIC: [&str; 5] = [LOAN_AMOUNT, INTEREST_RATE, DAYS_LEFT, CREDIT_SCORE, LOAN_TERM];

    /// The five weighted components, in the order they are summed.
    pub const SUB_SCORES: [&str; 5] = [PH_SCORE, ODA_SCORE, IL_SCORE, ES_SCORE, CS_SCORE];

    /// Categorical columns charted by the visualizer.
    pub const CHARTED_CATEGORIES: [&str; 4] = [GENDER, MARITAL_STATUS, LANGUAGE_PREFERENCE, LOAN_TYPE];
}

/// A categorical attribute synthesized by weighted sampling.
///
/// `VARIANTS` and `WEIGHTS` are index-aligned; the order matters because it
/// fixes which category a given uniform draw maps to.
pub trait SampledCategory: Copy + Sized + 'static {
    const VARIANTS: [Self; 3];
    const WEIGHTS: [f64; 3];

    fn as_str(&self) -> &'static str;
}

/// Synthetic income bracket of a borrower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomeLevel {
    Low,
    Medium,
    High,
}

impl SampledCategory for IncomeLevel {
    const VARIANTS: [Self; 3] = [Self::Low, Self::Medium, Self::High];
    const WEIGHTS: [f64; 3] = [0.33, 0.33, 0.34];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl IncomeLevel {
    pub fn parse(value: &str) -> Option<Self> {
        Self::VARIANTS.into_iter().find(|v| v.as_str() == value)
    }
}

/// Synthetic financial (employment) stability of a borrower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinancialStatus {
    Stable,
    SemiStable,
    Unstable,
}

impl SampledCategory for FinancialStatus {
    const VARIANTS: [Self; 3] = [Self::Stable, Self::SemiStable, Self::Unstable];
    const WEIGHTS: [f64; 3] = [0.33, 0.33, 0.34];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::SemiStable => "semi-stable",
            Self::Unstable => "unstable",
        }
    }
}

impl FinancialStatus {
    pub fn parse(value: &str) -> Option<Self> {
        Self::VARIANTS.into_iter().find(|v| v.as_str() == value)
    }
}

impl fmt::Display for IncomeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for FinancialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of the Delayed Payment column.
///
/// Matching is exact: anything other than `Yes` or `No` (including a
/// different case or a null) is not a recognised payment history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DelayedPayment {
    Yes,
    No,
}

impl DelayedPayment {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Yes" => Some(Self::Yes),
            "No" => Some(Self::No),
            _ => None,
        }
    }
}
