//! Text processing for planner transcripts.
//!
//! - [`normalize`]: strip escape codes, collapse CRLF
//! - [`extract`]: isolate the plan/apply section
//! - [`changes`]: tally resource changes
//! - [`demux`]: split a `run --all` transcript per module
//! - [`dialect`]: the phrase table everything above reads from

pub mod changes;
pub mod demux;
pub mod dialect;
pub mod extract;
pub mod normalize;

pub use changes::{parse_resource_changes, ResourceChanges};
pub use demux::{
    reconcile_module_name, split_output_by_module, DemuxedTranscript, ModuleOutput,
    UNATTRIBUTED_KEY,
};
pub use dialect::{Dialect, PHRASE_TABLE_VERSION};
pub use extract::{extract_plan_output, PlanOutputExtractor, NO_CHANGES_MESSAGE};
pub use normalize::normalize;
