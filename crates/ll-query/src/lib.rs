//! Query-side helpers: time window resolution, natural-language
//! translation, and the sample-query catalog.
//!
//! Everything here produces query text for the remote service; none of it
//! executes or validates anything.

pub mod samples;
pub mod timerange;
pub mod translator;

pub use samples::{sample_categories, sample_query, sample_query_names, SampleCategory};
pub use timerange::TimeRangeSelection;
pub use translator::translate;
