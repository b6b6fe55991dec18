//! Background batch recalculation.
//!
//! The cache manager enqueues [`BatchJob`]s on a [`RecalculationQueue`]; the
//! [`BatchWorker`] drains the channel and recomputes the affected characters
//! in independently committed chunks.

mod batch;
mod metrics;
mod queue;

pub use batch::{BatchReport, BatchWorker};
pub use metrics::{BatchMetrics, MetricsSnapshot};
pub use queue::{BatchJob, BatchScope, ChannelQueue, JobId, RecalculationQueue};
