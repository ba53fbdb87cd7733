//! Module: db::executor
//! Responsibility: runtime operators and the contracts they consume.
//! Does not own: plan construction or validation beyond operator init.

pub mod aggregate;
mod context;
mod output;
mod postfilter;
mod progress;
mod remote;
mod vertex_scan;

pub use context::{ExecutionContext, SiteId};
pub use output::OutputTable;
pub use postfilter::CountingPostfilter;
pub use progress::{ProgressMonitorProxy, ProgressReporter};
pub use remote::{ClusterNodeId, LocalAttributeFetcher, ProbeOutcome, RemoteAttributeFetcher};
pub use vertex_scan::{ScanOutcome, ScanReport, VertexScanExecutor};
