//! Room timing configuration.

use std::time::Duration;

/// Pacing knobs for a room.
///
/// The delays exist purely for human-facing pacing: they give players time
/// to read announcements between sub-phases. They are overridable (tests
/// shrink them; a hurried lobby may too) but never removed.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Pause after each night sub-phase closes, and after nightfall.
    pub phase_pacing: Duration,

    /// Pause between dealing roles and the first night, so players can
    /// read their private role assignment.
    pub deal_delay: Duration,

    /// Log length that triggers compaction (the front half is dropped).
    pub log_cap: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            phase_pacing: Duration::from_secs(3),
            deal_delay: Duration::from_secs(5),
            log_cap: 50_000,
        }
    }
}
