//! Error type shared by the hardware-facing parts of the crate.
//!
//! Protocol-level faults (noise, truncated frames, timeouts without data) are
//! never errors: the decoder recovers from them and the receiver reports them
//! through [`NecFrame::is_error`](crate::receiver::NecFrame::is_error). This type
//! only covers what a caller can act upon.

use embedded_hal::digital;
use embedded_hal::pwm;

/// Errors reported by the transmitter and the RGB output.
#[derive(PartialEq, Eq, Clone, Copy, Debug, thiserror::Error)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Error {
    /// `0x00000000` is the empty-command sentinel and cannot be queued.
    #[error("code 0x00000000 is reserved as the empty sentinel")]
    EmptyCode,
    /// A digital output refused a level change.
    #[error("GPIO error: {0:?}")]
    Gpio(digital::ErrorKind),
    /// The carrier PWM channel refused a duty-cycle change.
    #[error("PWM error: {0:?}")]
    Pwm(pwm::ErrorKind),
}

impl Error {
    /// Maps a pin error into [`Error::Gpio`].
    pub fn gpio<E: digital::Error>(err: E) -> Self {
        Error::Gpio(err.kind())
    }

    /// Maps a PWM error into [`Error::Pwm`].
    pub fn pwm<E: pwm::Error>(err: E) -> Self {
        Error::Pwm(err.kind())
    }
}
