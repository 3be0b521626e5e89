//! Retina: an RGB light that is also its own remote control.
//!
//! The application switches between two modes with a long press of the
//! button:
//!
//! - **Transmit**: every short press sends the next command of a rotation
//!   (red, green, blue by default) through the IR transmitter.
//! - **Receive**: decoded commands from any Liluco remote set the color of
//!   the RGB light; a held remote button re-applies the last color.
//!
//! When nothing is going on (button released, no transmission, no message
//! being received) the application moves to the sleep state of its mode and
//! [`Retina::should_sleep`] tells the main loop it may wait for an interrupt.
//!
//! ```text
//!   TransmitWait ◀── long press ──▶ ReceiveWait
//!     idle │  ▲ activity          idle │  ▲ activity
//!          ▼  │                        ▼  │
//!   SleepTransmit                  SleepReceive
//! ```

use crate::button::PressButton;
use crate::capture::EdgeSource;
use crate::commands::Command;
use crate::consts::{CHANGE_MODE_BUTTON_MS, COMMANDS_MEMORY_SIZE};
use crate::fsm::{StateMachine, Transition};
use crate::receiver::NecReceiver;
use crate::rgb::{RgbColor, RgbOutput};
use crate::transmitter::{NecTransmitter, SymbolTimer};
use embedded_hal::pwm::SetDutyCycle;
use heapless::Vec;

/// Modes of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum RetinaState {
    /// Transmit mode, awake
    #[default]
    TransmitWait,
    /// Receive mode, awake
    ReceiveWait,
    /// Transmit mode, nothing to do
    SleepTransmit,
    /// Receive mode, nothing to do
    SleepReceive,
}

/// Tunables of the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetinaConfig {
    /// Press duration that switches between transmit and receive modes.
    pub long_press_ms: u32,
    /// Commands sent, in order, by successive short presses.
    pub rotation: Vec<Command, COMMANDS_MEMORY_SIZE>,
}

impl Default for RetinaConfig {
    fn default() -> Self {
        Self {
            long_press_ms: CHANGE_MODE_BUTTON_MS,
            rotation: [Command::Red, Command::Green, Command::Blue]
                .into_iter()
                .collect(),
        }
    }
}

/// The application state machine, owning every component.
#[derive(Debug)]
pub struct Retina<BTN, CAR, TMR, EDG, LED> {
    state: RetinaState,
    config: RetinaConfig,
    button: BTN,
    transmitter: NecTransmitter<CAR, TMR>,
    receiver: NecReceiver<EDG>,
    led: LED,
    rotation_index: usize,
    last_code: u32,
}

impl<BTN, CAR, TMR, EDG, LED> Retina<BTN, CAR, TMR, EDG, LED>
where
    BTN: PressButton,
    CAR: SetDutyCycle,
    TMR: SymbolTimer,
    EDG: EdgeSource,
    LED: RgbOutput,
{
    #[rustfmt::skip]
    const TRANSITIONS: [Transition<RetinaState, Self>; 12] = [
        Transition::new(RetinaState::TransmitWait, Self::is_short_press, RetinaState::TransmitWait, Some(Self::send_next_code)),
        Transition::new(RetinaState::TransmitWait, Self::is_long_press, RetinaState::ReceiveWait, Some(Self::enter_receive)),
        Transition::new(RetinaState::TransmitWait, Self::is_idle, RetinaState::SleepTransmit, None),
        Transition::new(RetinaState::SleepTransmit, Self::is_idle, RetinaState::SleepTransmit, None),
        Transition::new(RetinaState::SleepTransmit, Self::is_busy, RetinaState::TransmitWait, None),
        Transition::new(RetinaState::ReceiveWait, Self::has_code, RetinaState::ReceiveWait, Some(Self::execute_code)),
        Transition::new(RetinaState::ReceiveWait, Self::has_repetition, RetinaState::ReceiveWait, Some(Self::execute_repetition)),
        Transition::new(RetinaState::ReceiveWait, Self::has_error, RetinaState::ReceiveWait, Some(Self::discard_frame)),
        Transition::new(RetinaState::ReceiveWait, Self::is_long_press, RetinaState::TransmitWait, Some(Self::enter_transmit)),
        Transition::new(RetinaState::ReceiveWait, Self::is_idle, RetinaState::SleepReceive, None),
        Transition::new(RetinaState::SleepReceive, Self::is_idle, RetinaState::SleepReceive, None),
        Transition::new(RetinaState::SleepReceive, Self::is_busy, RetinaState::ReceiveWait, None),
    ];

    /// Assembles the application, starting in transmit mode.
    ///
    /// The receiver should be disabled; it is switched on when entering
    /// receive mode.
    pub fn new(
        button: BTN,
        transmitter: NecTransmitter<CAR, TMR>,
        receiver: NecReceiver<EDG>,
        led: LED,
        config: RetinaConfig,
    ) -> Self {
        Self {
            state: RetinaState::TransmitWait,
            config,
            button,
            transmitter,
            receiver,
            led,
            rotation_index: 0,
            last_code: 0,
        }
    }

    /// Runs one step of every component, then of the application.
    ///
    /// Call it from the main loop with a millisecond clock. A pending
    /// transmission blocks for the whole frame.
    ///
    /// # Returns
    /// The application state if one of its transitions fired.
    pub fn poll(&mut self, now_ms: u32) -> Option<RetinaState> {
        self.button.poll(now_ms);
        let _ = self.transmitter.fire();
        let _ = self.receiver.poll(now_ms);
        self.fire_with(&Self::TRANSITIONS)
    }

    /// Whether the main loop may enter a low-power wait until the next interrupt.
    pub fn should_sleep(&self) -> bool {
        matches!(
            self.state,
            RetinaState::SleepTransmit | RetinaState::SleepReceive
        )
    }

    /// Last command received and applied, `0` if none.
    pub fn last_code(&self) -> u32 {
        self.last_code
    }

    /// Current configuration.
    pub fn config(&self) -> &RetinaConfig {
        &self.config
    }

    /// The button.
    pub fn button(&self) -> &BTN {
        &self.button
    }

    /// The transmitter.
    pub fn transmitter(&self) -> &NecTransmitter<CAR, TMR> {
        &self.transmitter
    }

    /// The receive session.
    pub fn receiver(&self) -> &NecReceiver<EDG> {
        &self.receiver
    }

    /// The receive session, mutably (e.g. to reach the edge capture).
    pub fn receiver_mut(&mut self) -> &mut NecReceiver<EDG> {
        &mut self.receiver
    }

    /// The light.
    pub fn led(&self) -> &LED {
        &self.led
    }

    fn is_short_press(&self) -> bool {
        let duration = self.button.duration();
        duration > 0 && duration < self.config.long_press_ms
    }

    fn is_long_press(&self) -> bool {
        let duration = self.button.duration();
        duration > 0 && duration >= self.config.long_press_ms
    }

    fn is_busy(&self) -> bool {
        self.button.is_active() || self.transmitter.is_active() || self.receiver.is_active()
    }

    fn is_idle(&self) -> bool {
        !self.is_busy()
    }

    fn has_code(&self) -> bool {
        self.receiver.code() != 0
    }

    fn has_repetition(&self) -> bool {
        self.receiver.is_repetition()
    }

    fn has_error(&self) -> bool {
        self.receiver.is_error()
    }

    fn show(&mut self, color: RgbColor) {
        if let Err(err) = self.led.set_color(color) {
            warn!("RGB output failed: {:?}", err);
        }
    }

    fn apply_code(&mut self, code: u32) {
        match Command::from_code(code) {
            Some(command) => self.show(command.color()),
            None => debug!("no action for code {:#x}", code),
        }
    }

    fn send_next_code(&mut self) {
        if let Some(command) = self.config.rotation.get(self.rotation_index).copied() {
            match self.transmitter.set_code(command.code()) {
                Ok(()) => info!("queued {:?}", command),
                Err(err) => warn!("could not queue {:?}: {:?}", command, err),
            }
            self.rotation_index = (self.rotation_index + 1) % self.config.rotation.len();
        }
        self.button.reset_duration();
    }

    fn enter_receive(&mut self) {
        info!("switching to receive mode");
        self.receiver.set_enabled(true);
        self.apply_code(self.last_code);
        self.button.reset_duration();
    }

    fn enter_transmit(&mut self) {
        info!("switching to transmit mode");
        self.receiver.set_enabled(false);
        self.show(RgbColor::OFF);
        self.button.reset_duration();
    }

    fn execute_code(&mut self) {
        self.last_code = self.receiver.code();
        self.apply_code(self.last_code);
        self.receiver.reset_frame();
    }

    fn execute_repetition(&mut self) {
        self.apply_code(self.last_code);
        self.receiver.reset_frame();
    }

    fn discard_frame(&mut self) {
        debug!("discarding malformed NEC message");
        self.receiver.reset_frame();
    }
}

impl<BTN, CAR, TMR, EDG, LED> StateMachine for Retina<BTN, CAR, TMR, EDG, LED>
where
    BTN: PressButton,
    CAR: SetDutyCycle,
    TMR: SymbolTimer,
    EDG: EdgeSource,
    LED: RgbOutput,
{
    type State = RetinaState;

    fn state(&self) -> RetinaState {
        self.state
    }

    fn set_state(&mut self, state: RetinaState) {
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::EdgeCapture;
    use crate::commands::{LIL_BLUE_BUTTON, LIL_GREEN_BUTTON, LIL_RED_BUTTON};
    use crate::consts::NEC_COMMAND_EDGES;
    use crate::decoder::NecDecoder;
    use crate::decoder::tests::command_edges;
    use crate::error::Error;
    use crate::transmitter::tests::{FakeCarrier, FakeTimer, fakes, to_rx_edges};
    use core::cell::Cell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct FakeButton {
        duration: Rc<Cell<u32>>,
        active: Rc<Cell<bool>>,
    }

    impl PressButton for FakeButton {
        fn poll(&mut self, _now_ms: u32) {}

        fn duration(&self) -> u32 {
            self.duration.get()
        }

        fn reset_duration(&mut self) {
            self.duration.set(0);
        }

        fn is_active(&self) -> bool {
            self.active.get()
        }
    }

    #[derive(Clone, Default)]
    struct FakeLed {
        color: Rc<Cell<RgbColor>>,
    }

    impl RgbOutput for FakeLed {
        fn set_color(&mut self, color: RgbColor) -> Result<(), Error> {
            self.color.set(color);
            Ok(())
        }
    }

    type TestRetina = Retina<FakeButton, FakeCarrier, FakeTimer, EdgeCapture, FakeLed>;

    struct Bench {
        retina: TestRetina,
        button: FakeButton,
        carrier: FakeCarrier,
        led: FakeLed,
    }

    fn bench() -> Bench {
        let button = FakeButton::default();
        let led = FakeLed::default();
        let (carrier, timer) = fakes();
        let retina = Retina::new(
            button.clone(),
            NecTransmitter::new(carrier.clone(), timer),
            NecReceiver::new(EdgeCapture::new()),
            led.clone(),
            RetinaConfig::default(),
        );
        Bench {
            retina,
            button,
            carrier,
            led,
        }
    }

    /// Receive mode with the receiver started and the button held idle.
    fn receiving() -> Bench {
        let mut bench = bench();
        bench.button.duration.set(CHANGE_MODE_BUTTON_MS);
        assert_eq!(bench.retina.poll(0), Some(RetinaState::ReceiveWait));
        bench.button.active.set(true);
        let _ = bench.retina.poll(1);
        assert!(bench.retina.receiver().source().is_enabled());
        bench
    }

    fn receive(bench: &mut Bench, edges: &[u16], now_ms: u32) {
        for (i, tick) in edges.iter().enumerate() {
            assert!(bench.retina.receiver_mut().source_mut().record(*tick, i % 2 == 1));
        }
        let _ = bench.retina.poll(now_ms);
        assert!(bench.retina.receiver().is_active());
        let _ = bench.retina.poll(now_ms + 10);
    }

    #[test]
    fn test_idle_button_does_nothing() {
        let mut bench = bench();
        bench.button.active.set(true);
        assert_eq!(bench.retina.poll(0), None);
        assert_eq!(bench.retina.state(), RetinaState::TransmitWait);
        assert_eq!(bench.retina.transmitter().code(), 0);
        assert!(!bench.retina.should_sleep());
    }

    #[test]
    fn test_press_just_below_long_press_sends() {
        let mut bench = bench();
        bench.button.duration.set(2_999);
        assert_eq!(bench.retina.poll(0), Some(RetinaState::TransmitWait));
        assert_eq!(bench.retina.transmitter().code(), LIL_RED_BUTTON);
        assert_eq!(bench.button.duration.get(), 0);
    }

    #[test]
    fn test_long_press_switches_to_receive() {
        let mut bench = bench();
        bench.button.duration.set(3_000);
        assert_eq!(bench.retina.poll(0), Some(RetinaState::ReceiveWait));
        assert_eq!(bench.retina.transmitter().code(), 0);
        assert_eq!(bench.button.duration.get(), 0);

        bench.button.active.set(true);
        let _ = bench.retina.poll(1);
        assert!(bench.retina.receiver().source().is_timer_running());
    }

    #[test]
    fn test_rotation_wraps_around() {
        let mut bench = bench();
        bench.button.active.set(true);
        let expected = [LIL_RED_BUTTON, LIL_GREEN_BUTTON, LIL_BLUE_BUTTON, LIL_RED_BUTTON];
        for (now, code) in expected.iter().enumerate() {
            bench.button.duration.set(100);
            let _ = bench.retina.poll(now as u32);
            assert_eq!(bench.retina.transmitter().code(), *code);
        }
        // The last queued code goes out on the next step.
        let _ = bench.retina.poll(10);
        assert_eq!(bench.retina.transmitter().code(), 0);

        let events = bench.carrier.events.borrow();
        let frames: std::vec::Vec<u16> = to_rx_edges(&events);
        assert_eq!(frames.len(), expected.len() * NEC_COMMAND_EDGES);
        let mut decoder = NecDecoder::new();
        for (chunk, code) in frames.chunks(NEC_COMMAND_EDGES).zip(expected) {
            assert_eq!(decoder.decode(chunk, chunk.len()).code, code);
        }
    }

    #[test]
    fn test_red_command_sets_red_and_clears_frame() {
        let mut bench = receiving();
        receive(&mut bench, &command_edges(LIL_RED_BUTTON, 0), 10);
        assert_eq!(bench.led.color.get(), RgbColor::RED);
        assert_eq!(bench.retina.last_code(), LIL_RED_BUTTON);
        assert!(bench.retina.receiver().frame().is_empty());
        assert_eq!(bench.retina.state(), RetinaState::ReceiveWait);
    }

    #[test]
    fn test_repetition_reapplies_last_color() {
        let mut bench = receiving();
        receive(&mut bench, &command_edges(LIL_GREEN_BUTTON, 0), 10);
        bench.led.color.set(RgbColor::OFF);

        receive(&mut bench, &[0, 900, 1125, 1181], 100);
        assert_eq!(bench.led.color.get(), RgbColor::GREEN);
        assert!(bench.retina.receiver().frame().is_empty());
    }

    #[test]
    fn test_noise_is_discarded() {
        let mut bench = receiving();
        receive(&mut bench, &command_edges(LIL_BLUE_BUTTON, 0), 10);
        receive(&mut bench, &[0, 13, 31, 77], 100);
        assert_eq!(bench.led.color.get(), RgbColor::BLUE);
        assert_eq!(bench.retina.last_code(), LIL_BLUE_BUTTON);
        assert!(bench.retina.receiver().frame().is_empty());
    }

    #[test]
    fn test_long_press_back_to_transmit() {
        let mut bench = receiving();
        receive(&mut bench, &command_edges(LIL_RED_BUTTON, 0), 10);

        bench.button.duration.set(5_000);
        assert_eq!(bench.retina.poll(100), Some(RetinaState::TransmitWait));
        assert_eq!(bench.led.color.get(), RgbColor::OFF);
        let _ = bench.retina.poll(101);
        assert!(!bench.retina.receiver().source().is_enabled());

        // Coming back restores the last received color.
        bench.button.duration.set(3_000);
        assert_eq!(bench.retina.poll(200), Some(RetinaState::ReceiveWait));
        assert_eq!(bench.led.color.get(), RgbColor::RED);
    }

    #[test]
    fn test_leaving_receive_mid_message_drops_it() {
        let mut bench = receiving();
        receive(&mut bench, &command_edges(LIL_RED_BUTTON, 0), 10);

        for (i, tick) in command_edges(LIL_GREEN_BUTTON, 0).iter().enumerate() {
            assert!(bench.retina.receiver_mut().source_mut().record(*tick, i % 2 == 1));
        }
        let _ = bench.retina.poll(100);
        assert!(bench.retina.receiver().is_active());

        bench.button.duration.set(3_000);
        assert_eq!(bench.retina.poll(101), Some(RetinaState::TransmitWait));
        let _ = bench.retina.poll(200);
        assert!(bench.retina.receiver().frame().is_empty());

        bench.button.duration.set(3_000);
        assert_eq!(bench.retina.poll(300), Some(RetinaState::ReceiveWait));
        let _ = bench.retina.poll(301);
        let _ = bench.retina.poll(400);
        assert_eq!(bench.led.color.get(), RgbColor::RED);
        assert_eq!(bench.retina.last_code(), LIL_RED_BUTTON);
    }

    #[test]
    fn test_sleeps_when_idle() {
        let mut bench = bench();
        assert_eq!(bench.retina.poll(0), Some(RetinaState::SleepTransmit));
        assert!(bench.retina.should_sleep());
        assert_eq!(bench.retina.poll(1), Some(RetinaState::SleepTransmit));

        bench.button.active.set(true);
        assert_eq!(bench.retina.poll(2), Some(RetinaState::TransmitWait));
        assert!(!bench.retina.should_sleep());
    }

    #[test]
    fn test_receive_mode_sleeps_and_wakes_on_edges() {
        let mut bench = receiving();
        bench.button.active.set(false);
        assert_eq!(bench.retina.poll(5), Some(RetinaState::SleepReceive));
        assert!(bench.retina.should_sleep());

        for (i, tick) in command_edges(LIL_RED_BUTTON, 0).iter().enumerate() {
            assert!(bench.retina.receiver_mut().source_mut().record(*tick, i % 2 == 1));
        }
        assert_eq!(bench.retina.poll(10), Some(RetinaState::ReceiveWait));
        assert_eq!(bench.retina.poll(20), Some(RetinaState::ReceiveWait));
        assert_eq!(bench.led.color.get(), RgbColor::RED);
    }

    #[test]
    fn test_default_config() {
        let config = RetinaConfig::default();
        assert_eq!(config.long_press_ms, 3_000);
        assert_eq!(
            config.rotation.as_slice(),
            &[Command::Red, Command::Green, Command::Blue]
        );
    }
}
