//! Offline validation of pipeline output against human annotations.
//!
//! Given a batch of evaluated records with human labels, this computes
//! Kendall's τ between the pipeline's confidence series and the ordinal
//! encoding of the labels, plus the plain agreement rate on discrete
//! verdicts. No LLM is involved; this is a deterministic statistical
//! step used to decide whether judge prompts can be trusted on a
//! full dataset.

use serde::Serialize;
use thiserror::Error;

use crate::types::Verdict;

/// Default τ threshold for accepting a judge configuration.
pub const DEFAULT_CORRELATION_THRESHOLD: f64 = 0.3;

/// Errors from the validation batch.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("at least two annotated records are required, got {0}")]
    NotEnoughRecords(usize),

    #[error("unknown annotation label: {0:?} (expected pass, review, or fail)")]
    UnknownLabel(String),
}

/// One evaluated record paired with its human label.
#[derive(Debug, Clone)]
pub struct AnnotationPair {
    pub request_id: String,
    pub verdict: Verdict,
    pub confidence: f64,
    pub human_annotation: String,
}

/// Outcome of a validation batch.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValidationReport {
    pub total_records: usize,
    pub agreement_count: usize,
    pub agreement_rate: f64,
    pub kendall_tau: f64,
    pub threshold: f64,
    pub passed: bool,
    pub interpretation: String,
}

/// Correlate pipeline confidence with human labels.
///
/// Labels use the verdict vocabulary and are encoded ordinally
/// (`fail` = 0, `review` = 1, `pass` = 2). `passed` is true when
/// τ reaches `threshold`.
pub fn validate_annotations(
    pairs: &[AnnotationPair],
    threshold: f64,
) -> Result<ValidationReport, ValidationError> {
    if pairs.len() < 2 {
        return Err(ValidationError::NotEnoughRecords(pairs.len()));
    }

    let mut confidences = Vec::with_capacity(pairs.len());
    let mut human_scores = Vec::with_capacity(pairs.len());
    let mut agreement_count = 0;

    for pair in pairs {
        let human = ordinal(&pair.human_annotation)?;
        confidences.push(pair.confidence);
        human_scores.push(human);

        if pair.verdict.as_str() == pair.human_annotation {
            agreement_count += 1;
        }
    }

    let kendall_tau = kendall_tau_b(&confidences, &human_scores);
    let passed = kendall_tau >= threshold;

    Ok(ValidationReport {
        total_records: pairs.len(),
        agreement_count,
        agreement_rate: agreement_count as f64 / pairs.len() as f64,
        kendall_tau,
        threshold,
        passed,
        interpretation: interpret(kendall_tau).to_string(),
    })
}

fn ordinal(label: &str) -> Result<f64, ValidationError> {
    match label {
        "fail" => Ok(0.0),
        "review" => Ok(1.0),
        "pass" => Ok(2.0),
        other => Err(ValidationError::UnknownLabel(other.to_string())),
    }
}

fn interpret(tau: f64) -> &'static str {
    if tau >= 0.7 {
        "strong agreement between judges and human annotations"
    } else if tau >= 0.3 {
        "moderate agreement between judges and human annotations"
    } else if tau >= 0.1 {
        "weak agreement between judges and human annotations"
    } else {
        "no meaningful agreement between judges and human annotations"
    }
}

/// Kendall's τ-b: rank correlation with tie correction.
///
/// Annotation encodings are heavily tied, so the tie-corrected variant
/// is used. Degenerate series (no variance on either side) yield 0.
fn kendall_tau_b(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len();
    let mut concordant: i64 = 0;
    let mut discordant: i64 = 0;
    let mut ties_x: i64 = 0;
    let mut ties_y: i64 = 0;

    for i in 0..n {
        for j in (i + 1)..n {
            let dx = xs[i] - xs[j];
            let dy = ys[i] - ys[j];

            if dx == 0.0 && dy == 0.0 {
                continue;
            }
            if dx == 0.0 {
                ties_x += 1;
            } else if dy == 0.0 {
                ties_y += 1;
            } else if dx * dy > 0.0 {
                concordant += 1;
            } else {
                discordant += 1;
            }
        }
    }

    let comparable = concordant + discordant;
    let denom = (((comparable + ties_x) as f64) * ((comparable + ties_y) as f64)).sqrt();
    if denom == 0.0 {
        return 0.0;
    }

    (concordant - discordant) as f64 / denom
}
