//! Debounced push button.
//!
//! The button reports the duration of the last complete press (press then
//! release). Level changes shorter than the debounce time are ignored: after
//! every accepted change the pin is not looked at again until the debounce time
//! has elapsed.
//!
//! | From           | Condition         | To             | Action                    |
//! |----------------|-------------------|----------------|---------------------------|
//! | `Released`     | pressed           | `ReleasedWait` | store press time          |
//! | `ReleasedWait` | debounce elapsed  | `Pressed`      |                           |
//! | `Pressed`      | released          | `PressedWait`  | store duration            |
//! | `PressedWait`  | debounce elapsed  | `Released`     |                           |

use crate::consts::BUTTON_DEBOUNCE_MS;
use crate::fsm::{StateMachine, Transition};
use embedded_hal::digital::InputPin;

/// A source of press durations.
///
/// [`Retina`](crate::retina::Retina) only relies on this trait, so any other
/// debouncer can stand in for [`Button`].
pub trait PressButton {
    /// Samples the button at `now_ms` and advances its state.
    fn poll(&mut self, now_ms: u32);

    /// Duration of the last complete press in milliseconds, `0` if none.
    fn duration(&self) -> u32;

    /// Forgets the last press.
    fn reset_duration(&mut self);

    /// Whether a press is in progress or being debounced.
    fn is_active(&self) -> bool;
}

/// States of the button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum ButtonState {
    /// Not pressed
    #[default]
    Released,
    /// Press seen, debouncing
    ReleasedWait,
    /// Held down
    Pressed,
    /// Release seen, debouncing
    PressedWait,
}

/// Push button on a digital input.
#[derive(Debug)]
pub struct Button<P> {
    pin: P,
    state: ButtonState,
    active_low: bool,
    pressed: bool,
    debounce_ms: u32,
    debounce_start_ms: u32,
    press_ms: u32,
    duration_ms: u32,
    now_ms: u32,
}

impl<P: InputPin> Button<P> {
    #[rustfmt::skip]
    const TRANSITIONS: [Transition<ButtonState, Self>; 4] = [
        Transition::new(ButtonState::Released, Self::is_pressed, ButtonState::ReleasedWait, Some(Self::store_press)),
        Transition::new(ButtonState::ReleasedWait, Self::is_debounced, ButtonState::Pressed, None),
        Transition::new(ButtonState::Pressed, Self::is_released, ButtonState::PressedWait, Some(Self::store_duration)),
        Transition::new(ButtonState::PressedWait, Self::is_debounced, ButtonState::Released, None),
    ];

    /// Active-low button (pull-up, switch to ground) with the default debounce time.
    pub fn new(pin: P) -> Self {
        Self::with_config(pin, true, BUTTON_DEBOUNCE_MS)
    }

    /// # Arguments
    /// - `pin`: button input
    /// - `active_low`: `true` if the pin reads low while pressed
    /// - `debounce_ms`: time the level is ignored after each accepted change
    pub fn with_config(pin: P, active_low: bool, debounce_ms: u32) -> Self {
        Self {
            pin,
            state: ButtonState::Released,
            active_low,
            pressed: false,
            debounce_ms,
            debounce_start_ms: 0,
            press_ms: 0,
            duration_ms: 0,
            now_ms: 0,
        }
    }

    /// Gives the pin back.
    pub fn release(self) -> P {
        self.pin
    }

    fn sample(&mut self) {
        let level = if self.active_low {
            self.pin.is_low()
        } else {
            self.pin.is_high()
        };
        match level {
            Ok(pressed) => self.pressed = pressed,
            Err(_) => warn!("button pin read failed, keeping last level"),
        }
    }

    fn is_pressed(&self) -> bool {
        self.pressed
    }

    fn is_released(&self) -> bool {
        !self.pressed
    }

    fn is_debounced(&self) -> bool {
        self.now_ms.wrapping_sub(self.debounce_start_ms) >= self.debounce_ms
    }

    fn store_press(&mut self) {
        self.press_ms = self.now_ms;
        self.debounce_start_ms = self.now_ms;
    }

    fn store_duration(&mut self) {
        self.duration_ms = self.now_ms.wrapping_sub(self.press_ms);
        self.debounce_start_ms = self.now_ms;
        trace!("button released after {} ms", self.duration_ms);
    }
}

impl<P: InputPin> StateMachine for Button<P> {
    type State = ButtonState;

    fn state(&self) -> ButtonState {
        self.state
    }

    fn set_state(&mut self, state: ButtonState) {
        self.state = state;
    }
}

impl<P: InputPin> PressButton for Button<P> {
    fn poll(&mut self, now_ms: u32) {
        self.now_ms = now_ms;
        self.sample();
        let _ = self.fire_with(&Self::TRANSITIONS);
    }

    fn duration(&self) -> u32 {
        self.duration_ms
    }

    fn reset_duration(&mut self) {
        self.duration_ms = 0;
    }

    fn is_active(&self) -> bool {
        self.state != ButtonState::Released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };

    /// One `get` per poll, active-low levels.
    fn script(levels: &[bool]) -> PinMock {
        let transactions: Vec<PinTransaction> = levels
            .iter()
            .map(|pressed| {
                PinTransaction::get(if *pressed { PinState::Low } else { PinState::High })
            })
            .collect();
        PinMock::new(&transactions)
    }

    #[test]
    fn test_idle_button_stays_released() {
        let mut button = Button::new(script(&[false, false]));
        button.poll(0);
        button.poll(1_000);
        assert_eq!(button.state(), ButtonState::Released);
        assert!(!button.is_active());
        assert_eq!(button.duration(), 0);
        button.release().done();
    }

    #[test]
    fn test_press_and_release_reports_duration() {
        let mut button = Button::new(script(&[true, true, true, false, false, false]));
        button.poll(100);
        assert_eq!(button.state(), ButtonState::ReleasedWait);
        assert!(button.is_active());
        button.poll(249);
        assert_eq!(button.state(), ButtonState::ReleasedWait);
        button.poll(250);
        assert_eq!(button.state(), ButtonState::Pressed);
        button.poll(600);
        assert_eq!(button.state(), ButtonState::PressedWait);
        assert_eq!(button.duration(), 500);
        button.poll(700);
        assert_eq!(button.state(), ButtonState::PressedWait);
        button.poll(750);
        assert_eq!(button.state(), ButtonState::Released);
        assert!(!button.is_active());

        assert_eq!(button.duration(), 500);
        button.reset_duration();
        assert_eq!(button.duration(), 0);
        button.release().done();
    }

    #[test]
    fn test_bounces_are_filtered() {
        // Contact chatter right after the press is never looked at.
        let mut button = Button::new(script(&[true, false, true, false, true, false]));
        button.poll(0);
        button.poll(10);
        button.poll(20);
        button.poll(30);
        assert_eq!(button.state(), ButtonState::ReleasedWait);
        button.poll(150);
        assert_eq!(button.state(), ButtonState::Pressed);
        button.poll(160);
        assert_eq!(button.state(), ButtonState::PressedWait);
        assert_eq!(button.duration(), 160);
        button.release().done();
    }

    #[test]
    fn test_active_high_button() {
        let pin = PinMock::new(&[
            PinTransaction::get(PinState::High),
            PinTransaction::get(PinState::High),
            PinTransaction::get(PinState::Low),
        ]);
        let mut button = Button::with_config(pin, false, 20);
        button.poll(0);
        button.poll(20);
        button.poll(3_020);
        assert_eq!(button.duration(), 3_020);
        button.release().done();
    }
}
