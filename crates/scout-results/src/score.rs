//! Scoring of raw record sets.
//!
//! A scorer turns the records of one entity type from one data API response into scored
//! records. Scores from different responses are compared later by the filter, so a scorer
//! normalizes each set onto a common scale.
//!
//! # Default scoring
//!
//! [`RankScorer`] takes each record's existing numeric `score` as its base relevance. Records
//! without one get positional decay, `1 / (1 + position)`, since the data API returns its best
//! matches first. The set is then divided by its maximum so the best record scores 1.0:
//!
//! ```text
//! position  base   normalized
//!        0  1.00   1.00
//!        1  0.50   0.50
//!        2  0.33   0.33
//! ```
//!
//! Record order is never changed.

use crate::{EntityType, ResultRecord};

/// Maps a raw record set for one entity type to a scored set.
///
/// Implementations must be pure and deterministic, and must not depend on the order in which
/// different entity types or different responses are scored.
pub trait Scorer: Send + Sync {
    /// Attaches a ranking score to every record.
    fn score(&self, entity: EntityType, records: Vec<ResultRecord>) -> Vec<ResultRecord>;
}

impl<F> Scorer for F
where
    F: Fn(EntityType, Vec<ResultRecord>) -> Vec<ResultRecord> + Send + Sync,
{
    fn score(&self, entity: EntityType, records: Vec<ResultRecord>) -> Vec<ResultRecord> {
        self(entity, records)
    }
}

/// Default scorer: existing score or positional decay, normalized to a maximum of 1.0.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankScorer;

impl Scorer for RankScorer {
    fn score(&self, _entity: EntityType, mut records: Vec<ResultRecord>) -> Vec<ResultRecord> {
        let bases: Vec<f64> = records
            .iter()
            .enumerate()
            .map(|(position, record)| {
                record
                    .score()
                    .filter(|s| s.is_finite())
                    .unwrap_or_else(|| positional_decay(position))
            })
            .collect();

        let max = bases.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        // Non-positive maxima would flip or blow up the scale
        let divisor = if max > 0.0 { max } else { 1.0 };

        for (record, base) in records.iter_mut().zip(bases) {
            record.set_score(base / divisor);
        }
        records
    }
}

/// Relevance of the record at `position` when the data API supplies no score.
#[allow(clippy::cast_precision_loss)]
fn positional_decay(position: usize) -> f64 {
    1.0 / (1.0 + position as f64)
}
