//! Entitlement policy.
//!
//! Pure decisions over a `UserRecord` and a clock; no I/O. The store is
//! responsible for persisting any normalization this module performs.

use chrono::{DateTime, Utc};

use crate::models::UserRecord;

/// Free-tier transform allowance.
pub const FREE_LIMIT: u32 = 3;

/// Why a transform was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denied {
    FreeLimitReached { limit: u32 },
}

/// Clear expired pro status in place. Returns true if the record changed,
/// so callers know the snapshot needs persisting.
pub fn normalize_expiry(record: &mut UserRecord, now: DateTime<Utc>) -> bool {
    match record.pro_until {
        Some(until) if record.pro && until < now => {
            record.pro = false;
            record.pro_until = None;
            true
        }
        _ => false,
    }
}

/// Decide whether the user may run a transform.
///
/// Expects an expiry-normalized record; pro users pass unconditionally,
/// free users pass while under [`FREE_LIMIT`]. Idempotent for a fixed
/// record and clock.
pub fn authorize(record: &UserRecord) -> Result<(), Denied> {
    if record.pro {
        return Ok(());
    }
    if record.count < FREE_LIMIT {
        return Ok(());
    }
    Err(Denied::FreeLimitReached { limit: FREE_LIMIT })
}
