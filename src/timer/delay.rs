use crate::consts::NEC_TX_TIMER_TICK_BASE_NS;
use crate::transmitter::SymbolTimer;
use core::cell::{Cell, RefCell};
use embedded_hal::delay::DelayNs;

/// Symbol timer that paces itself with a blocking delay.
///
/// For environments where interrupts are unavailable or undesired. Every read
/// of the tick count blocks for one symbol tick, so
/// [`wait_ticks`](crate::transmitter::wait_ticks) turns into a chain of
/// `delay_ns` calls.
///
/// # Example
/// ```rust,ignore
/// use nec_retina::timer::DelaySymbolTimer;
/// use nec_retina::transmitter::NecTransmitter;
///
/// let timer = DelaySymbolTimer::new(delay);
/// let mut transmitter = NecTransmitter::new(pwm_channel, timer);
/// ```
///
/// # Notes
/// - Loop overhead adds up over a frame; the receive tolerance windows absorb
///   it for the usual HAL delays.
/// - For more accurate pacing prefer [`SymbolTicker`](super::SymbolTicker)
///   driven by a timer interrupt.
#[derive(Debug)]
pub struct DelaySymbolTimer<D> {
    delay: RefCell<D>,
    ticks: Cell<u32>,
    tick_ns: u32,
}

impl<D: DelayNs> DelaySymbolTimer<D> {
    /// Symbol timer with the NEC tick of 56.25 µs.
    pub fn new(delay: D) -> Self {
        Self::with_tick(delay, NEC_TX_TIMER_TICK_BASE_NS)
    }

    /// Symbol timer with a custom tick, in nanoseconds.
    pub fn with_tick(delay: D, tick_ns: u32) -> Self {
        Self {
            delay: RefCell::new(delay),
            ticks: Cell::new(0),
            tick_ns,
        }
    }

    /// Gives the delay provider back.
    pub fn release(self) -> D {
        self.delay.into_inner()
    }
}

impl<D: DelayNs> SymbolTimer for DelaySymbolTimer<D> {
    fn start(&mut self) {
        self.ticks.set(0);
    }

    fn stop(&mut self) {}

    fn ticks(&self) -> u32 {
        self.delay.borrow_mut().delay_ns(self.tick_ns);
        let ticks = self.ticks.get().wrapping_add(1);
        self.ticks.set(ticks);
        ticks
    }
}
