//! Result records and the merge stage of the scout search pipeline.
//!
//! The data API answers every resolved call with three arrays of records, one per
//! [`EntityType`]. Each array is scored by a [`Scorer`] and wrapped as a [`ResultBatch`]; once
//! every call of a search has settled, a [`Filter`] merges the batches of each entity type into
//! the list that is displayed.
//!
//! [`RankScorer`] and [`MergeFilter`] are the default implementations. Both are deterministic and
//! independent of the order in which batches arrive.

#![warn(missing_docs)]

mod entity;
mod filter;
mod record;
mod score;

pub use entity::{EntityType, ParseEntityTypeError};
pub use filter::{Filter, MergeFilter};
pub use record::{PerEntity, ResultBatch, ResultRecord, SCORE_FIELD};
pub use score::{RankScorer, Scorer};

/// Filtered records for every entity type.
pub type FilteredResultSet = PerEntity<Vec<ResultRecord>>;
