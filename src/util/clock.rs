//! Clock-tick frequency of the running kernel.
//!
//! Per-process stat counters are expressed in clock ticks (USER_HZ). The
//! frequency is looked up once and cached.

use std::sync::LazyLock;

/// USER_HZ on virtually every Linux build. Used when `sysconf` reports nothing.
pub const FALLBACK_CLK_TCK: u64 = 100;

/// Cached result of the `sysconf(_SC_CLK_TCK)` lookup.
static CLK_TCK: LazyLock<u64> = LazyLock::new(detect_ticks_per_second);

/// Returns the number of clock ticks per second.
///
/// The result is cached after the first call.
pub fn ticks_per_second() -> u64 {
    *CLK_TCK
}

fn detect_ticks_per_second() -> u64 {
    // SAFETY: sysconf has no preconditions and only reads a constant.
    let ticks = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
    if ticks > 0 {
        ticks as u64
    } else {
        tracing::debug!("sysconf(_SC_CLK_TCK) returned {}, using fallback", ticks);
        FALLBACK_CLK_TCK
    }
}
