//! Snapshot consumer port trait.

use crate::domain::market::MarketSnapshot;

/// Receiver of the read-only per-tick snapshot (GUI, telemetry, logs). The
/// consumer must not assume snapshots arrive for every tick; the driver may
/// publish at a coarser cadence.
pub trait SnapshotPort {
    fn publish(&mut self, snapshot: &MarketSnapshot);
}
