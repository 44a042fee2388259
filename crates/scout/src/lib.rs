//! scout: natural-language search over house scenes.
//!
//! A free-text query is sent to an interpretation service, which resolves it into structured
//! data API calls. scout issues those calls concurrently, scores and merges their results per
//! entity type (scenes, levels, rooms), and prints the merged lists.

#![warn(missing_docs)]

pub mod cli;
