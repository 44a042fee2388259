//! Search state and its transition function.
//!
//! All mutations of [`SearchState`] go through [`transition`], a pure function of the previous
//! state and one [`Event`]. The controller publishes each new state as a whole, so observers
//! always see a consistent snapshot.
//!
//! ```text
//! Idle ──SearchStarted──▶ Resolving ──CallsResolved──▶ Dispatching ──DispatchesIssued──▶ Aggregating
//!                            │  │                                                          │
//!                            │  └──InterpretationFailed──▶ Ready (error)                    │
//!                            └──InterpretationNotFound──▶ NotFound          Ready ◀──Aggregated
//! ```
//!
//! `SearchStarted` is accepted in every phase. Cycle events whose id is not the current cycle,
//! or that arrive in the wrong phase, leave the state unchanged.

use scout_config::FeatureSettings;
use scout_results::{EntityType, FilteredResultSet, PerEntity, ResultRecord};
use serde::Serialize;

use crate::CycleId;

/// Where the current cycle is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No search has run yet.
    #[default]
    Idle,
    /// Waiting for the interpretation service.
    Resolving,
    /// Issuing data API requests.
    Dispatching,
    /// Waiting for every request to settle.
    Aggregating,
    /// Results are final.
    Ready,
    /// The interpretation service could not resolve the query.
    NotFound,
}

/// Why the not-found flag is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotFoundCause {
    /// The interpretation service reported an error marker.
    Interpretation,
    /// Every call completed but no scenes survived filtering.
    EmptyResults,
}

/// Feature toggles shown next to the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Features {
    /// Suggest queries while typing.
    pub autosuggest: bool,
    /// Show the scene viewer.
    pub visualization: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            autosuggest: true,
            visualization: true,
        }
    }
}

impl From<&FeatureSettings> for Features {
    fn from(settings: &FeatureSettings) -> Self {
        Self {
            autosuggest: settings.autosuggest,
            visualization: settings.visualization,
        }
    }
}

/// Everything a front end renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchState {
    /// Current query text.
    pub query: String,
    /// Entity type the front end lists.
    pub return_type: EntityType,
    /// Filtered results of the last completed cycle.
    pub results: FilteredResultSet,
    /// Set when the last cycle found nothing.
    pub not_found: Option<NotFoundCause>,
    /// True while a cycle is running.
    pub loading: bool,
    /// Message of the last interpretation failure.
    pub error: Option<String>,
    /// Feature toggles.
    pub features: Features,
    /// Phase of the current cycle.
    pub phase: Phase,
    /// Current cycle, if any search has started.
    pub cycle: Option<CycleId>,
    /// Data API calls the current cycle resolved to.
    pub calls: usize,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            query: String::new(),
            return_type: EntityType::Scene,
            results: FilteredResultSet::default(),
            not_found: None,
            loading: false,
            error: None,
            features: Features::default(),
            phase: Phase::Idle,
            cycle: None,
            calls: 0,
        }
    }
}

impl SearchState {
    /// True when the not-found flag is set, whatever the cause.
    pub fn is_not_found(&self) -> bool {
        self.not_found.is_some()
    }

    /// Number of results per entity type.
    pub fn counts(&self) -> PerEntity<usize> {
        self.results.counts()
    }

    /// Results of the selected return type.
    pub fn displayed(&self) -> &[ResultRecord] {
        self.results.get(self.return_type)
    }

    /// True when `cycle` is the current cycle and the state is in `phase`.
    fn expects(&self, cycle: CycleId, phase: Phase) -> bool {
        self.cycle == Some(cycle) && self.phase == phase
    }
}

/// Something that happened to the search.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The query text was replaced.
    QueryChanged(String),
    /// A different entity type was selected for display.
    ReturnTypeChanged(EntityType),
    /// The autosuggest toggle was flipped.
    AutosuggestToggled,
    /// The visualization toggle was flipped.
    VisualizationToggled,
    /// A new cycle started and superseded any previous one.
    SearchStarted(CycleId),
    /// The interpretation service reported an error marker.
    InterpretationNotFound(CycleId),
    /// The interpretation service could not be reached or answered garbage.
    InterpretationFailed {
        /// Cycle the failure belongs to.
        cycle: CycleId,
        /// Human-readable cause.
        message: String,
    },
    /// The query resolved into `calls` data API calls.
    CallsResolved {
        /// Cycle the calls belong to.
        cycle: CycleId,
        /// Number of calls, possibly zero.
        calls: usize,
    },
    /// Every call of the cycle has been dispatched.
    DispatchesIssued(CycleId),
    /// The barrier fired and the batches were filtered.
    Aggregated {
        /// Cycle the results belong to.
        cycle: CycleId,
        /// Filtered results per entity type.
        results: FilteredResultSet,
    },
}

/// Applies `event` to `state`.
pub fn transition(mut state: SearchState, event: Event) -> SearchState {
    match event {
        Event::QueryChanged(query) => state.query = query,
        Event::ReturnTypeChanged(entity) => state.return_type = entity,
        Event::AutosuggestToggled => state.features.autosuggest = !state.features.autosuggest,
        Event::VisualizationToggled => {
            state.features.visualization = !state.features.visualization;
        }
        Event::SearchStarted(cycle) => {
            if state.cycle.is_some_and(|current| cycle <= current) {
                return state;
            }
            state.results = FilteredResultSet::default();
            state.not_found = None;
            state.error = None;
            state.loading = true;
            state.calls = 0;
            state.phase = Phase::Resolving;
            state.cycle = Some(cycle);
        }
        Event::InterpretationNotFound(cycle) => {
            if state.expects(cycle, Phase::Resolving) {
                state.results = FilteredResultSet::default();
                state.not_found = Some(NotFoundCause::Interpretation);
                state.loading = false;
                state.phase = Phase::NotFound;
            }
        }
        Event::InterpretationFailed { cycle, message } => {
            if state.expects(cycle, Phase::Resolving) {
                state.error = Some(message);
                state.loading = false;
                state.phase = Phase::Ready;
            }
        }
        Event::CallsResolved { cycle, calls } => {
            if state.expects(cycle, Phase::Resolving) {
                state.calls = calls;
                state.phase = Phase::Dispatching;
            }
        }
        Event::DispatchesIssued(cycle) => {
            if state.expects(cycle, Phase::Dispatching) {
                state.phase = Phase::Aggregating;
            }
        }
        Event::Aggregated { cycle, results } => {
            if state.expects(cycle, Phase::Aggregating) {
                state.not_found = results
                    .scene
                    .is_empty()
                    .then_some(NotFoundCause::EmptyResults);
                state.results = results;
                state.loading = false;
                state.phase = Phase::Ready;
            }
        }
    }
    state
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn run(events: impl IntoIterator<Item = Event>) -> SearchState {
        events
            .into_iter()
            .fold(SearchState::default(), transition)
    }

    fn one_scene() -> FilteredResultSet {
        let mut results = FilteredResultSet::default();
        results
            .scene
            .push(ResultRecord::from_value(json!({"id": "s1", "score": 1.0})).unwrap());
        results
    }

    fn resolved(cycle: u64, calls: usize) -> Vec<Event> {
        let cycle = CycleId::new(cycle);
        vec![
            Event::SearchStarted(cycle),
            Event::CallsResolved { cycle, calls },
            Event::DispatchesIssued(cycle),
        ]
    }

    #[test]
    fn full_cycle_ends_ready() {
        let mut events = resolved(1, 2);
        events.push(Event::Aggregated {
            cycle: CycleId::new(1),
            results: one_scene(),
        });
        let state = run(events);

        assert_eq!(state.phase, Phase::Ready);
        assert!(!state.loading);
        assert!(!state.is_not_found());
        assert_eq!(state.calls, 2);
        assert_eq!(state.displayed().len(), 1);
    }

    #[test]
    fn search_started_resets_previous_results() {
        let mut events = resolved(1, 1);
        events.push(Event::Aggregated {
            cycle: CycleId::new(1),
            results: one_scene(),
        });
        events.push(Event::SearchStarted(CycleId::new(2)));
        let state = run(events);

        assert_eq!(state.phase, Phase::Resolving);
        assert!(state.loading);
        assert!(state.results.is_empty());
        assert_eq!(state.cycle, Some(CycleId::new(2)));
    }

    #[test]
    fn empty_aggregate_sets_not_found() {
        let mut events = resolved(1, 0);
        events.push(Event::Aggregated {
            cycle: CycleId::new(1),
            results: FilteredResultSet::default(),
        });
        let state = run(events);

        assert_eq!(state.phase, Phase::Ready);
        assert_eq!(state.not_found, Some(NotFoundCause::EmptyResults));
    }

    #[test]
    fn interpretation_not_found() {
        let cycle = CycleId::new(1);
        let state = run([Event::SearchStarted(cycle), Event::InterpretationNotFound(cycle)]);

        assert_eq!(state.phase, Phase::NotFound);
        assert_eq!(state.not_found, Some(NotFoundCause::Interpretation));
        assert!(!state.loading);
    }

    #[test]
    fn interpretation_failure_is_an_error_not_not_found() {
        let cycle = CycleId::new(1);
        let state = run([
            Event::SearchStarted(cycle),
            Event::InterpretationFailed {
                cycle,
                message: "connection refused".to_string(),
            },
        ]);

        assert_eq!(state.phase, Phase::Ready);
        assert_eq!(state.error.as_deref(), Some("connection refused"));
        assert!(!state.is_not_found());
        assert!(!state.loading);
    }

    #[test]
    fn stale_cycle_events_are_ignored() {
        let mut events = resolved(1, 1);
        events.push(Event::SearchStarted(CycleId::new(2)));
        events.push(Event::Aggregated {
            cycle: CycleId::new(1),
            results: one_scene(),
        });
        events.push(Event::InterpretationNotFound(CycleId::new(1)));
        let state = run(events);

        assert_eq!(state.phase, Phase::Resolving);
        assert!(state.results.is_empty());
        assert!(state.loading);
        assert!(!state.is_not_found());
    }

    #[test]
    fn older_search_cannot_restart() {
        let state = run([
            Event::SearchStarted(CycleId::new(3)),
            Event::SearchStarted(CycleId::new(2)),
        ]);
        assert_eq!(state.cycle, Some(CycleId::new(3)));
    }

    #[test]
    fn out_of_phase_events_are_ignored() {
        let cycle = CycleId::new(1);
        let state = run([
            Event::SearchStarted(cycle),
            Event::Aggregated {
                cycle,
                results: one_scene(),
            },
        ]);
        assert_eq!(state.phase, Phase::Resolving);
        assert!(state.results.is_empty());
    }

    #[test]
    fn ui_events_leave_results_alone() {
        let mut events = resolved(1, 1);
        events.push(Event::Aggregated {
            cycle: CycleId::new(1),
            results: one_scene(),
        });
        events.extend([
            Event::QueryChanged("two bedrooms".to_string()),
            Event::ReturnTypeChanged(EntityType::Room),
            Event::AutosuggestToggled,
            Event::VisualizationToggled,
        ]);
        let state = run(events);

        assert_eq!(state.query, "two bedrooms");
        assert_eq!(state.counts().scene, 1);
        assert!(state.displayed().is_empty());
        assert_eq!(state.phase, Phase::Ready);
        assert!(!state.features.autosuggest);
        assert!(!state.features.visualization);
    }
}
