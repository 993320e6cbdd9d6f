//=========================================================================
// Frame Report
//=========================================================================

/// Counters gathered by one [`super::Stage::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameReport {
    /// Update targets whose `update` ran (including failures).
    pub updated: usize,

    /// Updates that returned an error.
    pub failed_updates: usize,

    /// Events dispatched through the registry.
    pub events_dispatched: usize,

    /// Events some target reported as handled.
    pub events_handled: usize,

    /// Draw calls issued (payloads plus `DRAW` behaviors).
    pub drawn: usize,
}

impl FrameReport {
    /// Updates that completed without error.
    pub fn succeeded_updates(&self) -> usize {
        self.updated - self.failed_updates
    }
}
