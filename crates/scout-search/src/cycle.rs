//! Cycle identity and the per-cycle result accumulator.

use std::{
    fmt,
    sync::{Mutex, PoisonError},
};

use scout_results::{PerEntity, ResultBatch};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// Identifier of one search cycle. Later cycles have larger ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CycleId(u64);

impl CycleId {
    /// Wraps a raw id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Collects the scored batches of one cycle, per entity type.
///
/// Batches are only accepted while the cycle is live: once its token is cancelled or the
/// accumulator has been sealed, late pushes are refused.
#[derive(Debug)]
pub struct Accumulator {
    /// Cycle that owns these buffers.
    cycle: CycleId,
    /// Cancelled when the cycle is superseded.
    cancel: CancellationToken,
    /// `None` once sealed.
    buffers: Mutex<Option<PerEntity<Vec<ResultBatch>>>>,
}

impl Accumulator {
    /// Creates empty buffers for `cycle`.
    pub fn new(cycle: CycleId, cancel: CancellationToken) -> Self {
        Self {
            cycle,
            cancel,
            buffers: Mutex::new(Some(PerEntity::default())),
        }
    }

    /// Cycle that owns these buffers.
    pub fn cycle(&self) -> CycleId {
        self.cycle
    }

    /// Appends one batch per entity type, all at once.
    ///
    /// Returns `false` and drops the batches if the cycle is cancelled or already sealed.
    pub fn push(&self, batches: PerEntity<ResultBatch>) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        let mut guard = self.buffers.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(buffers) = guard.as_mut() else {
            return false;
        };
        let PerEntity { scene, level, room } = batches;
        buffers.scene.push(scene);
        buffers.level.push(level);
        buffers.room.push(room);
        true
    }

    /// Takes the accumulated batches and refuses further pushes.
    ///
    /// Sealing twice yields empty buffers the second time.
    pub fn seal(&self) -> PerEntity<Vec<ResultBatch>> {
        self.buffers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .unwrap_or_default()
    }
}
