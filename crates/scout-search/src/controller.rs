//! The search controller: owns the state and runs cycles.

use std::{
    mem,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use scout_config::Config;
use scout_results::{EntityType, Filter, MergeFilter, RankScorer, Scorer};
use tokio::{sync::watch, task::JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::{
    Accumulator, BarrierOutcome, BarrierReport, CycleId, DataSource, Dispatcher, Event, Features,
    Interpretation, Interpreter, SearchError, SearchState, await_all, transition,
};

/// Tunables of a [`SearchController`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Deadline for a single HTTP request.
    pub request_timeout: Duration,
    /// Deadline for the aggregation barrier of one cycle.
    pub cycle_timeout: Duration,
    /// Entity type displayed initially.
    pub return_type: EntityType,
    /// Field identifying a record across batches.
    pub id_field: String,
    /// Initial feature toggles.
    pub features: Features,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            cycle_timeout: Duration::from_secs(30),
            return_type: EntityType::Scene,
            id_field: "id".to_string(),
            features: Features::default(),
        }
    }
}

impl SearchOptions {
    /// Reads the options from configuration.
    ///
    /// An unknown return type falls back to scenes; `scout check` reports it.
    pub fn from_config(config: &Config) -> Self {
        Self {
            request_timeout: config.search.request_timeout,
            cycle_timeout: config.search.cycle_timeout,
            return_type: config.search.return_type.parse().unwrap_or(EntityType::Scene),
            id_field: config.search.id_field.clone(),
            features: Features::from(&config.features),
        }
    }
}

/// How a call to [`SearchController::search`] ended.
#[derive(Debug)]
pub enum CycleOutcome {
    /// The barrier fired and the filtered results were published.
    Completed {
        /// The cycle.
        cycle: CycleId,
        /// How the dispatches settled.
        report: BarrierReport,
    },
    /// The interpretation service could not resolve the query.
    NotFound {
        /// The cycle.
        cycle: CycleId,
    },
    /// The interpretation service failed.
    Failed {
        /// The cycle.
        cycle: CycleId,
        /// What went wrong.
        error: SearchError,
    },
    /// A newer search started before this one finished. Nothing was published.
    Superseded {
        /// The cycle.
        cycle: CycleId,
    },
}

impl CycleOutcome {
    /// The cycle this outcome belongs to.
    pub fn cycle(&self) -> CycleId {
        match self {
            Self::Completed { cycle, .. }
            | Self::NotFound { cycle }
            | Self::Failed { cycle, .. }
            | Self::Superseded { cycle } => *cycle,
        }
    }
}

/// Bookkeeping for the live cycle.
#[derive(Debug, Default)]
struct ActiveCycle {
    /// Id of the most recently started cycle.
    last: u64,
    /// Token of the most recently started cycle.
    token: Option<CancellationToken>,
}

/// Owns the [`SearchState`] and runs search cycles against an interpreter and a data source.
///
/// Observers follow the state through [`subscribe`](Self::subscribe). `search` takes `&self`, so
/// a new search may start while another is in flight; the older one is cancelled and its late
/// responses never reach the state.
pub struct SearchController<I, D> {
    /// Resolves queries into calls.
    interpreter: I,
    /// Sends calls to the data source.
    dispatcher: Dispatcher<D>,
    /// Merges the batches of each entity type.
    filter: Arc<dyn Filter>,
    /// Deadline for the aggregation barrier.
    cycle_timeout: Duration,
    /// Published state.
    state: watch::Sender<SearchState>,
    /// The live cycle.
    active: Mutex<ActiveCycle>,
}

impl<I: Interpreter, D: DataSource> SearchController<I, D> {
    /// Creates a controller with the default scorer and filter.
    pub fn new(interpreter: I, source: D, options: SearchOptions) -> Self {
        let initial = SearchState {
            return_type: options.return_type,
            features: options.features,
            ..SearchState::default()
        };
        Self {
            interpreter,
            dispatcher: Dispatcher::new(
                Arc::new(source),
                Arc::new(RankScorer),
                options.request_timeout,
            ),
            filter: Arc::new(MergeFilter::new(options.id_field)),
            cycle_timeout: options.cycle_timeout,
            state: watch::Sender::new(initial),
            active: Mutex::new(ActiveCycle::default()),
        }
    }

    /// Replaces the scorer.
    #[must_use]
    pub fn with_scorer(mut self, scorer: impl Scorer + 'static) -> Self {
        self.dispatcher.set_scorer(Arc::new(scorer));
        self
    }

    /// Replaces the filter.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filter = Arc::new(filter);
        self
    }

    /// The interpreter queries are resolved with.
    pub fn interpreter(&self) -> &I {
        &self.interpreter
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Replaces the query text. Does not start a search.
    pub fn set_query(&self, query: impl Into<String>) {
        self.apply(Event::QueryChanged(query.into()));
    }

    /// Selects the entity type to display.
    pub fn set_return_type(&self, entity: EntityType) {
        self.apply(Event::ReturnTypeChanged(entity));
    }

    /// Flips the autosuggest toggle.
    pub fn toggle_autosuggest(&self) {
        self.apply(Event::AutosuggestToggled);
    }

    /// Flips the visualization toggle.
    pub fn toggle_visualization(&self) {
        self.apply(Event::VisualizationToggled);
    }

    /// Sets the query and searches for it.
    pub async fn search_for(&self, query: impl Into<String>) -> CycleOutcome {
        self.set_query(query);
        self.search().await
    }

    /// Runs one cycle for the current query, superseding any cycle in flight.
    pub async fn search(&self) -> CycleOutcome {
        let (cycle, cancel) = self.begin_cycle();
        let query = self.state.borrow().query.clone();
        self.run_cycle(cycle, &cancel, &query).await
    }

    /// Feeds `event` through [`transition`] and publishes the result.
    fn apply(&self, event: Event) {
        self.state.send_modify(|state| {
            let previous = mem::take(state);
            *state = transition(previous, event);
        });
    }

    /// Allocates the next cycle and cancels the previous one.
    fn begin_cycle(&self) -> (CycleId, CancellationToken) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        active.last += 1;
        let cycle = CycleId::new(active.last);
        let token = CancellationToken::new();
        if let Some(previous) = active.token.replace(token.clone()) {
            previous.cancel();
        }
        // Still under the lock, so SearchStarted events reach the state in cycle order
        self.apply(Event::SearchStarted(cycle));
        (cycle, token)
    }

    /// Resolves, dispatches, aggregates and publishes one cycle.
    #[instrument(skip_all, fields(cycle = %cycle, query = %query))]
    async fn run_cycle(
        &self,
        cycle: CycleId,
        cancel: &CancellationToken,
        query: &str,
    ) -> CycleOutcome {
        debug!("cycle started");
        let resolved = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("superseded while resolving");
                return CycleOutcome::Superseded { cycle };
            }
            resolved = self.interpreter.resolve(query) => resolved,
        };

        let calls = match resolved {
            Ok(Interpretation::Resolved(calls)) => calls,
            Ok(Interpretation::NotFound) => {
                info!("interpretation found nothing");
                self.apply(Event::InterpretationNotFound(cycle));
                return CycleOutcome::NotFound { cycle };
            }
            Err(error) => {
                warn!(kind = ?error.kind(), %error, "interpretation failed");
                self.apply(Event::InterpretationFailed {
                    cycle,
                    message: error.to_string(),
                });
                return CycleOutcome::Failed { cycle, error };
            }
        };

        self.apply(Event::CallsResolved {
            cycle,
            calls: calls.len(),
        });
        let accumulator = Arc::new(Accumulator::new(cycle, cancel.clone()));
        let mut dispatches = JoinSet::new();
        for call in calls {
            debug!(endpoint = %call.endpoint, to_include = call.to_include, "dispatching");
            let dispatcher = self.dispatcher.clone();
            let accumulator = Arc::clone(&accumulator);
            dispatches.spawn(async move { dispatcher.dispatch(&call, &accumulator).await });
        }
        self.apply(Event::DispatchesIssued(cycle));

        let report = match await_all(dispatches, cancel, self.cycle_timeout).await {
            BarrierOutcome::Completed(report) => report,
            BarrierOutcome::Cancelled(report) => {
                debug!(aborted = report.aborted, "superseded while aggregating");
                return CycleOutcome::Superseded { cycle };
            }
        };

        let batches = accumulator.seal();
        let results = batches.map(|_, batches| self.filter.filter(&batches));
        let counts = results.counts();
        info!(
            dispatched = report.dispatched,
            delivered = report.delivered,
            vacuous = report.vacuous(),
            scenes = counts.scene,
            levels = counts.level,
            rooms = counts.room,
            "cycle complete"
        );
        self.apply(Event::Aggregated { cycle, results });
        CycleOutcome::Completed { cycle, report }
    }
}
