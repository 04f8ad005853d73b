//! Monotonic millisecond arithmetic.
//!
//! Every timestamp in the controller is a `u32` millisecond counter that
//! wraps after ~49.7 days. Elapsed time is always computed with wrapping
//! subtraction so the wrap is invisible to the control logic; timestamps
//! are never compared directly.

/// Milliseconds in one minute.
pub const MS_PER_MINUTE: u32 = 60_000;

/// Milliseconds elapsed from `since` to `now`, tolerating counter wrap.
#[inline]
pub const fn elapsed_ms(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

/// Whether at least `window_ms` has passed since `since`.
#[inline]
pub const fn has_elapsed(now: u32, since: u32, window_ms: u32) -> bool {
    elapsed_ms(now, since) >= window_ms
}

/// Convert a minute-valued parameter to milliseconds.
#[inline]
pub const fn minutes_to_ms(minutes: u8) -> u32 {
    minutes as u32 * MS_PER_MINUTE
}
