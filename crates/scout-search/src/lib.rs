//! Search pipeline for scout: interpretation, fan-out dispatch, and aggregation.
//!
//! One search is a *cycle*:
//!
//! 1. The [`Interpreter`] turns the free-text query into a list of [`ResolvedCall`]s, or reports
//!    that nothing matched.
//! 2. The [`Dispatcher`] issues one data API request per call, concurrently. Each response is
//!    scored per entity type and appended to the cycle's [`Accumulator`].
//! 3. The barrier ([`await_all`]) waits until every request has settled. Failed requests
//!    contribute nothing and never block the cycle.
//! 4. The filter merges the accumulated batches of each entity type, and the
//!    [`SearchController`] publishes the new [`SearchState`].
//!
//! Every cycle carries its own id and cancellation token. Starting a new search cancels the
//! previous cycle, and [`transition`] ignores events tagged with any cycle but the current one,
//! so a slow response from an abandoned search can never leak into the displayed results.

#![warn(missing_docs)]

mod barrier;
mod call;
mod controller;
mod cycle;
mod dispatch;
mod error;
mod http;
mod interpret;
mod source;
mod state;

pub use barrier::{BarrierOutcome, BarrierReport, await_all};
pub use call::{Interpretation, ResolvedCall};
pub use controller::{CycleOutcome, SearchController, SearchOptions};
pub use cycle::{Accumulator, CycleId};
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use error::{ErrorKind, SearchError};
pub use http::http_client;
pub use interpret::{HttpInterpreter, Interpreter, interpretation_url};
pub use source::{DataSource, HttpDataSource, data_url, parse_data_response};
pub use state::{Event, Features, NotFoundCause, Phase, SearchState, transition};

/// A controller wired to the HTTP backends named in the configuration.
pub type HttpSearchController = SearchController<HttpInterpreter, HttpDataSource>;

/// Builds a controller that talks to the configured interpretation service and data API.
pub fn http_controller(config: &scout_config::Config) -> Result<HttpSearchController, SearchError> {
    let client = http_client(config.search.request_timeout)?;
    let interpreter = HttpInterpreter::new(client.clone(), config.endpoints.nlp_url.clone());
    let source = HttpDataSource::new(client, config.endpoints.database_url.clone());
    Ok(SearchController::new(
        interpreter,
        source,
        SearchOptions::from_config(config),
    ))
}
