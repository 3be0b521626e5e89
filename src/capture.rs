//! Edge timestamp capture for the IR receiver line.
//!
//! An interrupt on both edges of the receiver output calls
//! [`EdgeCapture::record`] with the current value of a free-running timer
//! ticking every [`NEC_RX_TIMER_TICK_BASE_US`](crate::consts::NEC_RX_TIMER_TICK_BASE_US).
//! The buffer index encodes the polarity: even slots hold falling edges (carrier
//! appears), odd slots rising edges (carrier disappears). A message always
//! starts on a falling edge, so an interrupt whose level does not match the
//! next slot is a glitch and is ignored.
//!
//! The receiver only talks to capture hardware through [`EdgeSource`]. With the
//! `timer-isr` feature a `critical_section` protected [`EdgeCapture`] global
//! implements it as well (see [`crate::timer`]).

use crate::consts::NEC_FRAME_EDGES;
use heapless::Vec;

/// Everything the receive session needs from the capture side.
pub trait EdgeSource {
    /// Number of edges captured since the last [`clear`](EdgeSource::clear).
    fn num_edges(&self) -> usize;

    /// Runs `f` over the captured timestamps.
    fn with_edges<R, F: FnOnce(&[u16]) -> R>(&self, f: F) -> R;

    /// Runs `f` over the captured timestamps and clears them in the same step,
    /// so no edge can land between reading and clearing.
    fn take_edges<R, F: FnOnce(&[u16]) -> R>(&mut self, f: F) -> R;

    /// Drops every captured edge.
    fn clear(&mut self);

    /// Enables or disables edge recording.
    fn enable(&mut self, enabled: bool);

    /// Starts the timestamp timer.
    fn start_timer(&mut self);

    /// Stops the timestamp timer.
    fn stop_timer(&mut self);
}

/// Bounded buffer of edge timestamps.
#[derive(Debug, Clone, Default)]
pub struct EdgeCapture {
    edges: Vec<u16, NEC_FRAME_EDGES>,
    enabled: bool,
    timer_running: bool,
}

impl EdgeCapture {
    /// Empty, disabled capture. `const` so it can back a `static`.
    pub const fn new() -> Self {
        Self {
            edges: Vec::new(),
            enabled: false,
            timer_running: false,
        }
    }

    /// Stores one edge.
    ///
    /// # Arguments
    /// - `tick`: timer value when the edge happened
    /// - `level_high`: line level right after the edge
    ///
    /// # Returns
    /// `true` if the edge was stored. Edges are dropped while recording is
    /// disabled or the timer is stopped, when the level does not match the
    /// polarity expected for the next slot, and once the buffer is full.
    pub fn record(&mut self, tick: u16, level_high: bool) -> bool {
        if !self.enabled || !self.timer_running {
            return false;
        }
        let expects_rising = self.edges.len() % 2 == 1;
        if level_high != expects_rising {
            return false;
        }
        self.edges.push(tick).is_ok()
    }

    /// Captured timestamps.
    pub fn edges(&self) -> &[u16] {
        &self.edges
    }

    /// Whether recording is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the timestamp timer is running.
    pub fn is_timer_running(&self) -> bool {
        self.timer_running
    }
}

impl EdgeSource for EdgeCapture {
    fn num_edges(&self) -> usize {
        self.edges.len()
    }

    fn with_edges<R, F: FnOnce(&[u16]) -> R>(&self, f: F) -> R {
        f(&self.edges)
    }

    fn take_edges<R, F: FnOnce(&[u16]) -> R>(&mut self, f: F) -> R {
        let result = f(&self.edges);
        self.edges.clear();
        result
    }

    fn clear(&mut self) {
        self.edges.clear();
    }

    fn enable(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn start_timer(&mut self) {
        self.timer_running = true;
    }

    fn stop_timer(&mut self) {
        self.timer_running = false;
    }
}
