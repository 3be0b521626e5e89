//! NEC transmitter.
//!
//! A command is sent as a sequence of *bursts*: the carrier is switched on for
//! a number of symbol ticks, then off for another number of symbol ticks.
//!
//! ```text
//! prologue   160 on /   80 off
//! symbol 0    10 on /   10 off
//! symbol 1    10 on /   30 off
//! epilogue    10 on / 3560 off
//! ```
//!
//! Symbols are sent most significant bit first. Pacing is a busy wait on a
//! [`SymbolTimer`], so the call blocks for the whole frame: between about 250
//! and 290 ms depending on the code, 200 ms of which is the epilogue guard time.

use crate::consts::*;
use crate::error::Error;
use crate::fsm::{StateMachine, Transition};
use embedded_hal::pwm::SetDutyCycle;

/// Free-running counter of 56.25 µs symbol ticks.
pub trait SymbolTimer {
    /// Starts counting.
    fn start(&mut self);
    /// Stops counting.
    fn stop(&mut self);
    /// Current tick count. Wraps around.
    fn ticks(&self) -> u32;
}

/// Busy-waits until `ticks` symbol ticks have elapsed.
pub fn wait_ticks<T: SymbolTimer + ?Sized>(timer: &T, ticks: u32) {
    let start = timer.ticks();
    while timer.ticks().wrapping_sub(start) < ticks {
        core::hint::spin_loop();
    }
}

fn send_burst<P, T>(carrier: &mut P, timer: &T, ticks_on: u32, ticks_off: u32) -> Result<(), Error>
where
    P: SetDutyCycle,
    T: SymbolTimer + ?Sized,
{
    carrier
        .set_duty_cycle_percent(NEC_PWM_DUTY_PERCENT)
        .map_err(Error::pwm)?;
    wait_ticks(timer, ticks_on);
    carrier.set_duty_cycle_fully_off().map_err(Error::pwm)?;
    wait_ticks(timer, ticks_off);
    Ok(())
}

fn send_frame<P, T>(carrier: &mut P, timer: &T, code: u32) -> Result<(), Error>
where
    P: SetDutyCycle,
    T: SymbolTimer + ?Sized,
{
    send_burst(carrier, timer, NEC_TX_PROLOGUE_TICKS_ON, NEC_TX_PROLOGUE_TICKS_OFF)?;
    for bit in (0..u32::from(NEC_FRAME_BITS)).rev() {
        if code & (1 << bit) != 0 {
            send_burst(carrier, timer, NEC_TX_SYM_1_TICKS_ON, NEC_TX_SYM_1_TICKS_OFF)?;
        } else {
            send_burst(carrier, timer, NEC_TX_SYM_0_TICKS_ON, NEC_TX_SYM_0_TICKS_OFF)?;
        }
    }
    send_burst(carrier, timer, NEC_TX_EPILOGUE_TICKS_ON, NEC_TX_EPILOGUE_TICKS_OFF)
}

/// Sends one complete NEC frame, blocking until the epilogue guard time ends.
///
/// # Arguments
/// - `carrier`: PWM channel already configured at [`NEC_PWM_FREQ_HZ`]
/// - `timer`: symbol tick source
/// - `code`: 32-bit frame
///
/// # Errors
/// [`Error::Pwm`] if the carrier refuses a duty-cycle change. The carrier is
/// switched off and the timer stopped before returning.
pub fn send_nec_code<P, T>(carrier: &mut P, timer: &mut T, code: u32) -> Result<(), Error>
where
    P: SetDutyCycle,
    T: SymbolTimer,
{
    timer.start();
    let result = send_frame(carrier, timer, code);
    timer.stop();
    if result.is_err() {
        let _ = carrier.set_duty_cycle_fully_off();
    }
    result
}

/// States of the transmitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum TxState {
    /// Waiting for a code to send
    #[default]
    Wait,
}

/// Transmitter owning the carrier and the symbol timer.
#[derive(Debug)]
pub struct NecTransmitter<P, T> {
    carrier: P,
    timer: T,
    state: TxState,
    code: u32,
    active: bool,
}

impl<P, T> NecTransmitter<P, T>
where
    P: SetDutyCycle,
    T: SymbolTimer,
{
    const TRANSITIONS: [Transition<TxState, Self>; 1] = [Transition::new(
        TxState::Wait,
        Self::has_code,
        TxState::Wait,
        Some(Self::send),
    )];

    /// Creates an idle transmitter.
    pub fn new(carrier: P, timer: T) -> Self {
        Self {
            carrier,
            timer,
            state: TxState::Wait,
            code: 0,
            active: false,
        }
    }

    /// Queues a code for the next [`fire`](Self::fire).
    ///
    /// # Errors
    /// - `nb::Error::WouldBlock`: a code is already pending
    /// - [`Error::EmptyCode`]: `code` is the empty sentinel
    pub fn set_code(&mut self, code: u32) -> nb::Result<(), Error> {
        if code == 0 {
            return Err(nb::Error::Other(Error::EmptyCode));
        }
        if self.code != 0 {
            return Err(nb::Error::WouldBlock);
        }
        self.code = code;
        Ok(())
    }

    /// Code waiting to be sent, `0` if none.
    pub fn code(&self) -> u32 {
        self.code
    }

    /// Sends the pending code, if any. Blocks for the whole frame.
    pub fn fire(&mut self) -> Option<TxState> {
        self.fire_with(&Self::TRANSITIONS)
    }

    /// Whether a frame is being sent.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Gives the carrier and timer back.
    pub fn release(self) -> (P, T) {
        (self.carrier, self.timer)
    }

    fn has_code(&self) -> bool {
        self.code != 0
    }

    fn send(&mut self) {
        let code = core::mem::take(&mut self.code);
        self.active = true;
        if let Err(err) = send_nec_code(&mut self.carrier, &mut self.timer, code) {
            warn!("NEC transmission of {:#x} failed: {:?}", code, err);
        } else {
            debug!("NEC frame {:#x} sent", code);
        }
        self.active = false;
    }
}

impl<P, T> StateMachine for NecTransmitter<P, T>
where
    P: SetDutyCycle,
    T: SymbolTimer,
{
    type State = TxState;

    fn state(&self) -> TxState {
        self.state
    }

    fn set_state(&mut self, state: TxState) {
        self.state = state;
    }
}
