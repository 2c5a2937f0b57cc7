//! Core types for the promread remote-read client.
//!
//! This crate provides the fundamental data structures used throughout promread:
//!
//! - [`Filter`] - Caller-supplied read scope (time range plus one label filter)
//! - [`Matcher`] - A predicate on a single label's value
//! - [`Query`] - Immutable request descriptor built from a [`Filter`]
//! - [`TimeSeries`] - Labels and decoded samples of one streamed series

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/promread/promread/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod filter;
mod matcher;
mod query;
mod series;

pub use error::{QueryError, Result};
pub use filter::Filter;
pub use matcher::{METRIC_NAME, MatchType, Matcher};
pub use query::Query;
pub use series::{Label, Sample, TimeSeries};
