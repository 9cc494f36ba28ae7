/// Match lifecycle and per-member availability updates.
pub mod availability;
/// Multicast push delivery and failure bookkeeping.
pub mod dispatch;
/// Read-side projections over stored matches.
pub mod queries;
/// Roster resolution from the member directory.
pub mod roster;
