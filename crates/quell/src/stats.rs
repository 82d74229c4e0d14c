//! Echo canceller statistics.

/// Snapshot of the metrics tracked by an
/// [`EchoCanceller`](crate::EchoCanceller).
///
/// `Option` fields are `None` until the first frame has been processed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stats {
    /// Echo Return Loss Enhancement in dB: `ERLE = 10 log10(P_near / P_out)`,
    /// smoothed over roughly the last ten frames.
    pub echo_return_loss_enhancement: Option<f64>,
    /// Mean wall-clock processing time per sample in milliseconds.
    pub latency_ms: Option<f64>,
    /// Samples processed across all filtered channels since creation or reset.
    pub samples_processed: u64,
    /// Successful `process` calls since creation or reset.
    pub frames_processed: u64,
    /// Channels whose double-talk detector currently blocks adaptation.
    pub frozen_channels: usize,
}
