//! Timer utilities for the NEC receiver and transmitter.
//!
//! Two clocks drive the protocol:
//!
//! - the **receive timer**, a free-running 16-bit counter ticking every
//!   10 µs, read by the edge interrupt and stored in an
//!   [`EdgeCapture`](crate::capture::EdgeCapture) (`timer-isr` feature:
//!   `critical_section` global and [`record_edge!`](crate::record_edge));
//! - the **symbol timer**, a 56.25 µs tick counted by a [`SymbolTicker`]
//!   incremented from a timer interrupt (`timer-isr` feature:
//!   [`tick_symbol_timer!`](crate::tick_symbol_timer)) or by a
//!   [`DelaySymbolTimer`] built on a blocking delay (`delay-loop` feature).
//!
//! Reload helpers for the hardware timers:
//! - `compute_arr_value`: runtime reload value for a tick period
//! - `const_arr_value`: compile-time reload value for a tick period
//! - `compute_pwm_values`: runtime reload and compare values for the carrier
//!
//! Common values at 16 MHz:
//!
//! | Timer         | PRESCALER | Reload | Compare | Period      |
//! |---------------|-----------|--------|---------|-------------|
//! | receive (PSC) |         1 |    159 |       - | 10 µs       |
//! | symbol        |         1 |    899 |       - | 56.25 µs    |
//! | carrier PWM   |         1 |    420 |     147 | 38 kHz, 35% |

use crate::transmitter::SymbolTimer;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use libm::round;

#[cfg(feature = "delay-loop")]
mod delay;
#[cfg_attr(feature = "delay-loop", allow(unused_imports))]
#[cfg(feature = "delay-loop")]
pub use delay::*;

#[cfg(feature = "timer-isr")]
mod isr;
#[cfg_attr(feature = "timer-isr", allow(unused_imports))]
#[cfg(feature = "timer-isr")]
pub use isr::*;

#[cfg(feature = "timer-isr")]
mod macros;
#[cfg_attr(feature = "timer-isr", allow(unused_imports))]
#[cfg(feature = "timer-isr")]
pub use macros::*;

/// 1,000,000,000 nanoseconds = 1 second
pub const NANOSECONDS_PER_SECOND: u64 = 1_000_000_000;

/// Computes the auto-reload value of a timer counting `tick_us` periods.
///
/// The same value is the prescaler that makes a free-running counter advance
/// once every `tick_us`.
///
/// # Arguments
/// - `f_cpu`: timer clock in Hz
/// - `prescaler`: clock division applied before the counter (1 for none)
/// - `tick_us`: desired period in microseconds (e.g. 56.25)
///
/// # Returns
/// - Reload value (rounded number of counts per period, minus one)
pub fn compute_arr_value(f_cpu: u32, prescaler: u32, tick_us: f32) -> u32 {
    let counts_per_second = f_cpu as f64 / prescaler as f64;
    let counts = round(counts_per_second * tick_us as f64 / 1_000_000.0) as u32;
    counts.saturating_sub(1)
}

/// Compile-time auto-reload value calculator
///
/// # Arguments
/// - `f_cpu`: timer clock in Hz
/// - `prescaler`: clock division applied before the counter (1 for none)
/// - `tick_ns`: desired period in nanoseconds (e.g. 56_250)
///
/// # Returns
/// - Reload value (rounded number of counts per period, minus one)
pub const fn const_arr_value(f_cpu: u32, prescaler: u32, tick_ns: u32) -> u32 {
    let counts_per_second = (f_cpu / prescaler) as u64;
    let counts = (counts_per_second * tick_ns as u64 + NANOSECONDS_PER_SECOND / 2)
        / NANOSECONDS_PER_SECOND;
    (counts as u32).saturating_sub(1)
}

/// Computes the PWM reload and compare values of the IR carrier.
///
/// # Arguments
/// - `f_cpu`: timer clock in Hz
/// - `carrier_hz`: carrier frequency (e.g. 38_000)
/// - `duty_percent`: duty cycle in percent (e.g. 35)
///
/// # Returns
/// - Reload value
/// - Compare value for the requested duty cycle
pub fn compute_pwm_values(f_cpu: u32, carrier_hz: u32, duty_percent: u8) -> (u32, u32) {
    let period = round(f_cpu as f64 / carrier_hz as f64) as u32;
    let compare = round(period as f64 * f64::from(duty_percent) / 100.0) as u32;
    (period.saturating_sub(1), compare)
}

/// Symbol tick counter shared between a timer interrupt and the main loop.
///
/// The interrupt calls [`tick`](SymbolTicker::tick) every 56.25 µs; the count
/// only advances while the ticker is started. Every field has a single writer
/// at a time (the interrupt while running, the main loop while stopped), so
/// plain atomic loads and stores are enough, even on cores without atomic
/// read-modify-write instructions.
#[derive(Debug, Default)]
pub struct SymbolTicker {
    ticks: AtomicU32,
    running: AtomicBool,
}

impl SymbolTicker {
    /// Stopped ticker. `const` so it can back a `static`.
    pub const fn new() -> Self {
        Self {
            ticks: AtomicU32::new(0),
            running: AtomicBool::new(false),
        }
    }

    /// Advances the count by one tick if the ticker is started.
    pub fn tick(&self) {
        if self.running.load(Ordering::Acquire) {
            let ticks = self.ticks.load(Ordering::Relaxed);
            self.ticks.store(ticks.wrapping_add(1), Ordering::Release);
        }
    }

    /// Whether the ticker is counting.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl SymbolTimer for &SymbolTicker {
    fn start(&mut self) {
        self.ticks.store(0, Ordering::Relaxed);
        self.running.store(true, Ordering::Release);
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
    }

    fn ticks(&self) -> u32 {
        self.ticks.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;

    #[test]
    fn test_compute_arr_value() {
        let tick_us = NEC_TX_TIMER_TICK_BASE_NS as f32 / 1_000.0;
        assert_eq!(compute_arr_value(16_000_000, 1, tick_us), 899);
        assert_eq!(compute_arr_value(16_000_000, 1, NEC_RX_TIMER_TICK_BASE_US as f32), 159);
        assert_eq!(compute_arr_value(84_000_000, 84, 10.0), 9);
    }

    #[test]
    fn test_const_arr_value_matches_runtime() {
        const SYMBOL_ARR: u32 = const_arr_value(16_000_000, 1, NEC_TX_TIMER_TICK_BASE_NS);
        assert_eq!(SYMBOL_ARR, 899);
        assert_eq!(const_arr_value(16_000_000, 1, 10_000), 159);
        assert_eq!(
            const_arr_value(72_000_000, 8, 56_250),
            compute_arr_value(72_000_000, 8, 56.25)
        );
    }

    #[test]
    fn test_compute_pwm_values() {
        assert_eq!(
            compute_pwm_values(16_000_000, NEC_PWM_FREQ_HZ, NEC_PWM_DUTY_PERCENT),
            (420, 147)
        );
    }

    #[test]
    fn test_ticker_counts_only_while_started() {
        let ticker = SymbolTicker::new();
        ticker.tick();
        let mut timer = &ticker;
        assert_eq!(timer.ticks(), 0);

        timer.start();
        assert!(ticker.is_running());
        ticker.tick();
        ticker.tick();
        assert_eq!(timer.ticks(), 2);

        timer.stop();
        ticker.tick();
        assert_eq!(timer.ticks(), 2);

        // Restarting resets the count.
        timer.start();
        assert_eq!(timer.ticks(), 0);
    }

    #[test]
    fn test_ticker_wraps() {
        let ticker = SymbolTicker::new();
        let mut timer = &ticker;
        timer.start();
        ticker.ticks.store(u32::MAX, Ordering::Relaxed);
        ticker.tick();
        assert_eq!(timer.ticks(), 0);
    }
}
