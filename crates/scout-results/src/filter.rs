//! Merging of scored batches into one presentable list.
//!
//! Batches of one entity type arrive in completion order, which varies from run to run. The
//! filter must therefore produce the same list for any permutation of its input.

use std::{
    cmp::Ordering,
    collections::{HashMap, HashSet},
};

use crate::{ResultBatch, ResultRecord};

/// Merges the scored batches of one entity type into a single list.
///
/// Implementations must be pure, must not depend on batch order, and must be idempotent:
/// filtering a single selecting batch that holds a previous output returns that output
/// unchanged.
pub trait Filter: Send + Sync {
    /// Merges `batches` into the list to display.
    fn filter(&self, batches: &[ResultBatch]) -> Vec<ResultRecord>;
}

impl<F> Filter for F
where
    F: Fn(&[ResultBatch]) -> Vec<ResultRecord> + Send + Sync,
{
    fn filter(&self, batches: &[ResultBatch]) -> Vec<ResultRecord> {
        self(batches)
    }
}

/// Default filter: union of selecting batches minus everything in excluding batches.
///
/// Records are recognized across batches by [`ResultRecord::identity`]. When the same record is
/// selected more than once, the copy with the highest score is kept. The output is sorted by
/// score, highest first, with identity as the tie-break.
#[derive(Debug, Clone)]
pub struct MergeFilter {
    /// Field identifying a record across batches.
    id_field: String,
}

impl MergeFilter {
    /// Creates a filter that identifies records by `id_field`.
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
        }
    }
}

impl Default for MergeFilter {
    fn default() -> Self {
        Self::new("id")
    }
}

impl Filter for MergeFilter {
    fn filter(&self, batches: &[ResultBatch]) -> Vec<ResultRecord> {
        let excluded: HashSet<String> = batches
            .iter()
            .filter(|batch| !batch.to_include)
            .flat_map(|batch| &batch.results)
            .map(|record| record.identity(&self.id_field))
            .collect();

        let mut merged: HashMap<String, &ResultRecord> = HashMap::new();
        for record in batches
            .iter()
            .filter(|batch| batch.to_include)
            .flat_map(|batch| &batch.results)
        {
            let id = record.identity(&self.id_field);
            if excluded.contains(&id) {
                continue;
            }
            merged
                .entry(id)
                .and_modify(|kept| {
                    if prefer(record, kept) {
                        *kept = record;
                    }
                })
                .or_insert(record);
        }

        let mut ranked: Vec<(String, &ResultRecord)> = merged.into_iter().collect();
        ranked.sort_by(|(a_id, a), (b_id, b)| {
            b.score_or_zero()
                .partial_cmp(&a.score_or_zero())
                .unwrap_or(Ordering::Equal)
                .then_with(|| a_id.cmp(b_id))
        });

        ranked.into_iter().map(|(_, record)| record.clone()).collect()
    }
}

/// Decides whether `candidate` replaces `kept` for the same identity.
///
/// Higher score wins; equal scores fall back to the canonical JSON text so the choice does not
/// depend on which batch arrived first.
fn prefer(candidate: &ResultRecord, kept: &ResultRecord) -> bool {
    match candidate.score_or_zero().partial_cmp(&kept.score_or_zero()) {
        Some(Ordering::Greater) => true,
        Some(Ordering::Less) => false,
        _ => {
            let candidate_text = serde_json::to_string(candidate.fields()).unwrap_or_default();
            let kept_text = serde_json::to_string(kept.fields()).unwrap_or_default();
            candidate_text < kept_text
        }
    }
}
