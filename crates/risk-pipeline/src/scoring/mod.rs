//! Collection Risk Score computation.
//!
//! The scorer appends `TotalAmountToBePaid`, the five weighted components,
//! `CollectionRiskScore` and a dense `Rank` to the transformed table. Every
//! derived value depends only on its own row, except `Rank`, which depends on
//! the whole score column.

pub mod components;
pub mod ranking;

use crate::error::{PipelineError, Result};
use crate::types::columns;
use crate::utils::{column_f64, column_strings, put_column, require_columns};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

pub use ranking::{dense_rank, top_n_indices};

/// Columns the scorer reads. Income Level and Financial Status come from the
/// transformer; the rest are raw fields coerced by it.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    columns::DELAYED_PAYMENT,
    columns::LOAN_AMOUNT,
    columns::LOAN_TERM,
    columns::INCOME_LEVEL,
    columns::FINANCIAL_STATUS,
    columns::CREDIT_SCORE,
];

/// Aggregate facts about one scoring run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringSummary {
    pub rows: usize,
    /// Missing values per derived numeric column.
    pub missing: BTreeMap<String, usize>,
    /// Number of distinct ranks assigned.
    pub distinct_ranks: u32,
    pub min_score: Option<f64>,
    pub mean_score: Option<f64>,
    pub max_score: Option<f64>,
}

/// Computes weighted sub-scores, the composite and the dense rank.
pub struct RiskScorer;

impl RiskScorer {
    /// Score every row of a transformed table.
    pub fn score(&self, df: DataFrame) -> Result<(DataFrame, ScoringSummary)> {
        require_columns(&df, "Scorer", &REQUIRED_COLUMNS)?;

        let mut df = df;
        let n = df.height();
        info!("Scoring {} borrowers...", n);

        let delayed = column_strings(&df, columns::DELAYED_PAYMENT)?;
        let income = column_strings(&df, columns::INCOME_LEVEL)?;
        let status = column_strings(&df, columns::FINANCIAL_STATUS)?;
        let loan_amount = numeric(&df, columns::LOAN_AMOUNT)?;
        let loan_term = numeric(&df, columns::LOAN_TERM)?;
        let credit = numeric(&df, columns::CREDIT_SCORE)?;

        let mut total = Vec::with_capacity(n);
        let mut ph = Vec::with_capacity(n);
        let mut oda = Vec::with_capacity(n);
        let mut il = Vec::with_capacity(n);
        let mut es = Vec::with_capacity(n);
        let mut cs = Vec::with_capacity(n);
        let mut composite = Vec::with_capacity(n);

        for i in 0..n {
            let row_total = components::total_amount_to_be_paid(loan_amount[i], loan_term[i]);
            let row_ph = Some(components::payment_history(delayed[i].as_deref()));
            let row_oda = components::outstanding_debt(loan_amount[i], row_total);
            let row_il = Some(components::income_level(income[i].as_deref()));
            let row_es = Some(components::employment_status(status[i].as_deref()));
            let row_cs = components::credit_score(credit[i]);

            total.push(row_total);
            ph.push(row_ph);
            oda.push(row_oda);
            il.push(row_il);
            es.push(row_es);
            cs.push(row_cs);
            composite.push(components::composite([row_ph, row_oda, row_il, row_es, row_cs]));
        }

        let ranks = dense_rank(&composite);
        let summary = summarize(
            &[
                (columns::TOTAL_AMOUNT_TO_BE_PAID, &total),
                (columns::PH_SCORE, &ph),
                (columns::ODA_SCORE, &oda),
                (columns::IL_SCORE, &il),
                (columns::ES_SCORE, &es),
                (columns::CS_SCORE, &cs),
                (columns::RISK_SCORE, &composite),
            ],
            &composite,
            &ranks,
        );

        for (name, values) in [
            (columns::TOTAL_AMOUNT_TO_BE_PAID, total),
            (columns::PH_SCORE, ph),
            (columns::ODA_SCORE, oda),
            (columns::IL_SCORE, il),
            (columns::ES_SCORE, es),
            (columns::CS_SCORE, cs),
            (columns::RISK_SCORE, composite),
        ] {
            put_column(&mut df, Series::new(name.into(), values))?;
        }
        put_column(&mut df, Series::new(columns::RANK.into(), ranks))?;

        debug!("Missing values after scoring: {:?}", summary.missing);
        info!(
            "Collection risk scores generated ({} distinct ranks)",
            summary.distinct_ranks
        );

        Ok((df, summary))
    }

    /// The `n` highest-scoring rows of a scored table, best first.
    ///
    /// Ties keep their original row order; rows without a score are left out.
    pub fn top_borrowers(&self, df: &DataFrame, n: usize) -> Result<(DataFrame, Vec<usize>)> {
        let scores = column_f64(df, columns::RISK_SCORE)?;
        let indices = top_n_indices(&scores, n);
        let idx: Vec<IdxSize> = indices
            .iter()
            .map(|&i| {
                IdxSize::try_from(i).map_err(|_| {
                    PipelineError::Internal(format!("row index {} exceeds index size", i))
                })
            })
            .collect::<Result<_>>()?;
        let top = df.take(&IdxCa::from_vec("idx".into(), idx))?;
        Ok((top, indices))
    }
}

fn numeric(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    column_f64(df, name).map_err(|e| match e {
        PipelineError::TransformFailed(reason) => PipelineError::ScoringFailed(reason),
        other => other,
    })
}

fn summarize(
    tracked: &[(&str, &Vec<Option<f64>>)],
    composite: &[Option<f64>],
    ranks: &[u32],
) -> ScoringSummary {
    let missing = tracked
        .iter()
        .map(|(name, values)| {
            (
                name.to_string(),
                values.iter().filter(|v| v.is_none()).count(),
            )
        })
        .collect();

    let present: Vec<f64> = composite.iter().flatten().copied().collect();
    let min_score = present.iter().copied().reduce(f64::min);
    let max_score = present.iter().copied().reduce(f64::max);
    let mean_score = if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    };

    ScoringSummary {
        rows: composite.len(),
        missing,
        distinct_ranks: ranks.iter().copied().max().unwrap_or(0),
        min_score,
        mean_score,
        max_score,
    }
}
