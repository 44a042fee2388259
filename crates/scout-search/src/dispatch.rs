//! Issues one data API request per resolved call and scores the response.

use std::{sync::Arc, time::Duration};

use scout_results::{ResultBatch, Scorer};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::{Accumulator, DataSource, ResolvedCall, SearchError};

/// How a single dispatch settled.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// The response was scored and added to the cycle's accumulator.
    Delivered,
    /// The response arrived after its cycle ended and was dropped.
    Discarded,
    /// The request failed; the dispatch contributed nothing.
    Failed(SearchError),
}

/// Sends resolved calls to a [`DataSource`] and feeds scored batches into an [`Accumulator`].
pub struct Dispatcher<D> {
    /// Backend the calls are sent to.
    source: Arc<D>,
    /// Scores each entity type's records.
    scorer: Arc<dyn Scorer>,
    /// Deadline for a single request.
    request_timeout: Duration,
}

impl<D> Clone for Dispatcher<D> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            scorer: Arc::clone(&self.scorer),
            request_timeout: self.request_timeout,
        }
    }
}

impl<D: DataSource> Dispatcher<D> {
    /// Creates a dispatcher.
    pub fn new(source: Arc<D>, scorer: Arc<dyn Scorer>, request_timeout: Duration) -> Self {
        Self {
            source,
            scorer,
            request_timeout,
        }
    }

    /// Replaces the scorer.
    pub fn set_scorer(&mut self, scorer: Arc<dyn Scorer>) {
        self.scorer = scorer;
    }

    /// Executes `call` and appends one scored batch per entity type to `accumulator`.
    ///
    /// Never fails: transport, deadline and decode errors are logged and reported as
    /// [`DispatchOutcome::Failed`], so one bad request cannot hold up or fail the cycle.
    pub async fn dispatch(
        &self,
        call: &ResolvedCall,
        accumulator: &Accumulator,
    ) -> DispatchOutcome {
        let cycle = accumulator.cycle();
        let fetched = match timeout(self.request_timeout, self.source.fetch(call)).await {
            Ok(result) => result,
            Err(_) => Err(SearchError::Timeout {
                target: call.endpoint.clone(),
                timeout: self.request_timeout,
            }),
        };

        let records = match fetched {
            Ok(records) => records,
            Err(error) => {
                warn!(
                    %cycle,
                    endpoint = %call.endpoint,
                    kind = ?error.kind(),
                    %error,
                    "dispatch failed, contributing no results"
                );
                return DispatchOutcome::Failed(error);
            }
        };

        let batches = records.map(|entity, raw| {
            ResultBatch::new(self.scorer.score(entity, raw), call.to_include)
        });

        if accumulator.push(batches) {
            debug!(%cycle, endpoint = %call.endpoint, "batch delivered");
            DispatchOutcome::Delivered
        } else {
            debug!(%cycle, endpoint = %call.endpoint, "cycle ended, late batch discarded");
            DispatchOutcome::Discarded
        }
    }
}

#[cfg(test)]
mod tests {
    use scout_results::{EntityType, PerEntity, RankScorer, ResultRecord};
    use serde_json::json;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::CycleId;

    /// Returns one scene per call, or fails for the endpoint `broken`.
    struct OneScene;

    impl DataSource for OneScene {
        async fn fetch(
            &self,
            call: &ResolvedCall,
        ) -> Result<PerEntity<Vec<ResultRecord>>, SearchError> {
            if call.endpoint == "broken" {
                return Err(SearchError::Status {
                    url: call.endpoint.clone(),
                    status: 500,
                });
            }
            if call.endpoint == "slow" {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            let mut records = PerEntity::<Vec<ResultRecord>>::default();
            records
                .scene
                .push(ResultRecord::from_value(json!({"id": call.endpoint})).unwrap());
            Ok(records)
        }
    }

    fn dispatcher() -> Dispatcher<OneScene> {
        Dispatcher::new(
            Arc::new(OneScene),
            Arc::new(RankScorer),
            Duration::from_secs(5),
        )
    }

    fn accumulator() -> Accumulator {
        Accumulator::new(CycleId::new(1), CancellationToken::new())
    }

    #[tokio::test]
    async fn delivers_scored_batches_tagged_with_to_include() {
        let acc = accumulator();
        let outcome = dispatcher()
            .dispatch(&ResolvedCall::new("scenes").excluding(), &acc)
            .await;
        assert!(matches!(outcome, DispatchOutcome::Delivered));

        let sealed = acc.seal();
        let scene = &sealed.get(EntityType::Scene)[0];
        assert!(!scene.to_include);
        assert_eq!(scene.results[0].score(), Some(1.0));
        assert_eq!(sealed.level.len(), 1);
        assert!(sealed.level[0].results.is_empty());
    }

    #[tokio::test]
    async fn failure_contributes_nothing() {
        let acc = accumulator();
        let outcome = dispatcher().dispatch(&ResolvedCall::new("broken"), &acc).await;
        assert!(matches!(
            outcome,
            DispatchOutcome::Failed(SearchError::Status { status: 500, .. })
        ));
        assert!(acc.seal().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn request_deadline_is_a_failure() {
        let acc = accumulator();
        let outcome = dispatcher().dispatch(&ResolvedCall::new("slow"), &acc).await;
        assert!(matches!(
            outcome,
            DispatchOutcome::Failed(SearchError::Timeout { .. })
        ));
    }

    #[tokio::test]
    async fn sealed_cycle_discards_response() {
        let acc = accumulator();
        acc.seal();
        let outcome = dispatcher().dispatch(&ResolvedCall::new("scenes"), &acc).await;
        assert!(matches!(outcome, DispatchOutcome::Discarded));
    }
}
