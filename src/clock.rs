// The clock service (component C): pure functions computing projected timer
// values given a session's stored state plus a server timestamp. Grounded on
// the teacher's `clock.rs`, but traded its `Duration`/`Instant`-measurement
// model for the integer-millisecond-since-epoch model the wire protocol
// (SPEC_FULL.md section 6) requires, since every timestamp that crosses the
// gateway is a plain `nowMs` integer rather than a monotonic `Instant`.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct TimeControl {
    pub base_time_ms: u64,
    pub increment_ms: u64,
}

impl TimeControl {
    pub const fn new(base_time_ms: u64, increment_ms: u64) -> Self {
        Self { base_time_ms, increment_ms }
    }
}

pub const BULLET: TimeControl = TimeControl::new(60_000, 0);
pub const BLITZ: TimeControl = TimeControl::new(180_000, 2_000);
pub const STANDARD: TimeControl = TimeControl::new(600_000, 0);
pub const CRAZYHOUSE: TimeControl = TimeControl::new(180_000, 2_000);
pub const DECAY: TimeControl = TimeControl::new(180_000, 2_000);

pub const DROP_TIMER_MS: u64 = 10_000;
pub const QUEEN_DECAY_BASE_MS: u64 = 25_000;
pub const QUEEN_DECAY_REFRESH_MS: u64 = 2_000;
pub const MAJOR_DECAY_BASE_MS: u64 = 20_000;
pub const MAJOR_DECAY_REFRESH_MS: u64 = 2_000;
pub const SIX_POINTER_PER_MOVE_MS: u64 = 30_000;
pub const COOLDOWN_MS: u64 = 10_000;
pub const MATCHMAKING_IDLE_TIMEOUT_MS: u64 = 5 * 60_000;
pub const SESSION_TTL_SECS: u64 = 5 * 60;

/// Projects a running main clock forward to `now_ms` without committing
/// anything. If the clock is not the active side's, `remaining_ms` is
/// returned unchanged (the teacher's `Clock::time_left` has the identical
/// "only the active side ages" behavior).
pub fn project_clock(remaining_ms: u64, is_active: bool, turn_start_ms: u64, now_ms: u64) -> u64 {
    if is_active {
        remaining_ms.saturating_sub(now_ms.saturating_sub(turn_start_ms))
    } else {
        remaining_ms
    }
}

/// Deducts the elapsed time since `turn_start_ms` from `remaining_ms`,
/// clamped at zero. Used by the common engine preamble (SPEC_FULL.md
/// section 4.E) to charge a completed move against the mover's clock.
pub fn charge_elapsed(remaining_ms: u64, turn_start_ms: u64, now_ms: u64) -> u64 {
    remaining_ms.saturating_sub(now_ms.saturating_sub(turn_start_ms))
}

pub fn apply_increment(remaining_ms: u64, increment_ms: u64, base_time_ms: u64) -> u64 {
    (remaining_ms + increment_ms).min(base_time_ms)
}

/// Projects a decay timer (queen or major-piece) forward to `now_ms`.
/// Returns the clamped remaining time and whether it has expired. Inactive
/// timers are returned unchanged, matching the "only the tracked timer for
/// the color on move ages" semantics in SPEC_FULL.md section 4.E.5.
pub fn project_decay_timer(time_remaining_ms: u64, active: bool, turn_start_ms: u64, now_ms: u64) -> (u64, bool) {
    if !active {
        return (time_remaining_ms, false);
    }
    let elapsed = now_ms.saturating_sub(turn_start_ms);
    let remaining = time_remaining_ms.saturating_sub(elapsed);
    (remaining, remaining == 0)
}

pub fn refresh_decay_timer(time_remaining_ms: u64, refresh_ms: u64, cap_ms: u64) -> u64 {
    (time_remaining_ms + refresh_ms).min(cap_ms)
}

/// Projects a drop timer given its absolute expiration timestamp (only
/// meaningful while the owning color is on move and the timer is unpaused;
/// see `PocketPiece` in `session.rs`).
pub fn project_drop_timer(expiration_ms: u64, now_ms: u64) -> (u64, bool) {
    if now_ms >= expiration_ms {
        (0, true)
    } else {
        (expiration_ms - now_ms, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_ages_only_when_active() {
        assert_eq!(project_clock(10_000, true, 1_000, 4_000), 7_000);
        assert_eq!(project_clock(10_000, false, 1_000, 4_000), 10_000);
    }

    #[test]
    fn clock_clamps_at_zero() {
        assert_eq!(project_clock(1_000, true, 0, 5_000), 0);
    }

    #[test]
    fn increment_clamps_at_base_time() {
        assert_eq!(apply_increment(179_000, 2_000, 180_000), 180_000);
        assert_eq!(apply_increment(100_000, 2_000, 180_000), 102_000);
    }

    #[test]
    fn decay_timer_expires() {
        let (remaining, expired) = project_decay_timer(5_000, true, 0, 5_000);
        assert_eq!(remaining, 0);
        assert!(expired);
    }

    #[test]
    fn decay_timer_refresh_caps() {
        assert_eq!(refresh_decay_timer(24_000, 2_000, 25_000), 25_000);
        assert_eq!(refresh_decay_timer(10_000, 2_000, 25_000), 12_000);
    }
}
