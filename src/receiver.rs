//! Receive session: turns a stream of captured edges into decoded frames.
//!
//! The session owns an [`EdgeSource`] and waits for the line to go quiet. A
//! message is considered complete once no new edge has been captured for the
//! message timeout; the buffered edges are then handed to the
//! [`NecDecoder`] and the buffer is cleared for the next message.
//!
//! | From   | Condition                   | To    | Action                            |
//! |--------|-----------------------------|-------|-----------------------------------|
//! | `Off`  | enabled                     | `Idle`| start timer, clear, enable capture|
//! | `Idle` | disabled                    | `Off` | stop timer, disable capture       |
//! | `Idle` | edge count changed          | `Wait`| remember count and time           |
//! | `Wait` | disabled                    | `Off` | stop timer, disable capture       |
//! | `Wait` | quiet for the timeout       | `Idle`| decode, publish frame, clear      |
//! | `Wait` | edge count changed          | `Wait`| refresh count and time            |
//!
//! Switching off drops the message in progress and any pending frame, so a new
//! session always starts empty.
//!
//! Decoded frames are one-shot: they stay available until read with
//! [`NecReceiver::read_frame`] or dropped with [`NecReceiver::reset_frame`].

use core::convert::Infallible;

use crate::capture::EdgeSource;
use crate::consts::NEC_MESSAGE_TIMEOUT_MS;
use crate::decoder::NecDecoder;
use crate::fsm::{StateMachine, Transition};

/// States of the receive session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum RxState {
    /// Capture stopped
    #[default]
    Off,
    /// Capture running, no message in progress
    Idle,
    /// Edges are arriving
    Wait,
}

/// Result of one receive session.
///
/// `code` is meaningful only when neither flag is set. An all-zero frame means
/// nothing has been received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct NecFrame {
    /// Decoded 32-bit command
    pub code: u32,
    /// The message was a repetition code
    pub is_repetition: bool,
    /// The message could not be decoded
    pub is_error: bool,
}

/// Classification of a [`NecFrame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum FrameKind {
    /// Nothing received
    Empty,
    /// A full command
    Command(u32),
    /// The last command is being held
    Repetition,
    /// Noise or a malformed message
    Error,
}

impl NecFrame {
    /// Classifies the frame. Flags take precedence over the code.
    pub fn kind(&self) -> FrameKind {
        if self.is_error {
            FrameKind::Error
        } else if self.is_repetition {
            FrameKind::Repetition
        } else if self.code != 0 {
            FrameKind::Command(self.code)
        } else {
            FrameKind::Empty
        }
    }

    /// Whether the frame carries nothing.
    pub fn is_empty(&self) -> bool {
        self.kind() == FrameKind::Empty
    }
}

/// NEC receive session over an [`EdgeSource`].
#[derive(Debug)]
pub struct NecReceiver<E> {
    source: E,
    state: RxState,
    enabled: bool,
    decoder: Option<NecDecoder>,
    frame: NecFrame,
    num_edges: usize,
    last_activity_ms: u32,
    now_ms: u32,
    message_timeout_ms: u32,
}

impl<E: EdgeSource> NecReceiver<E> {
    #[rustfmt::skip]
    const TRANSITIONS: [Transition<RxState, Self>; 6] = [
        Transition::new(RxState::Off, Self::is_enabled, RxState::Idle, Some(Self::start)),
        Transition::new(RxState::Idle, Self::is_disabled, RxState::Off, Some(Self::stop)),
        Transition::new(RxState::Idle, Self::has_new_edges, RxState::Wait, Some(Self::touch)),
        Transition::new(RxState::Wait, Self::is_disabled, RxState::Off, Some(Self::stop)),
        Transition::new(RxState::Wait, Self::is_timed_out, RxState::Idle, Some(Self::decode)),
        Transition::new(RxState::Wait, Self::has_new_edges, RxState::Wait, Some(Self::touch)),
    ];

    /// Creates a disabled receiver with the default message timeout.
    pub fn new(source: E) -> Self {
        Self::with_timeout(source, NEC_MESSAGE_TIMEOUT_MS)
    }

    /// Creates a disabled receiver.
    ///
    /// # Arguments
    /// - `source`: edge capture backend
    /// - `message_timeout_ms`: quiet time that closes a message
    pub fn with_timeout(source: E, message_timeout_ms: u32) -> Self {
        Self {
            source,
            state: RxState::Off,
            enabled: false,
            decoder: None,
            frame: NecFrame::default(),
            num_edges: 0,
            last_activity_ms: 0,
            now_ms: 0,
            message_timeout_ms,
        }
    }

    /// Records the current time and advances the session.
    ///
    /// # Returns
    /// The new state if a transition fired.
    pub fn poll(&mut self, now_ms: u32) -> Option<RxState> {
        self.now_ms = now_ms;
        self.fire_with(&Self::TRANSITIONS)
    }

    /// Switches reception on or off. Takes effect on the next [`poll`](Self::poll).
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether a message is being received.
    pub fn is_active(&self) -> bool {
        self.state == RxState::Wait
    }

    /// Pending frame, left in place.
    pub fn frame(&self) -> NecFrame {
        self.frame
    }

    /// Code of the pending frame.
    pub fn code(&self) -> u32 {
        self.frame.code
    }

    /// Whether the pending frame is a repetition code.
    pub fn is_repetition(&self) -> bool {
        self.frame.is_repetition
    }

    /// Whether the pending frame could not be decoded.
    pub fn is_error(&self) -> bool {
        self.frame.is_error
    }

    /// Drops the pending frame.
    pub fn reset_frame(&mut self) {
        self.frame = NecFrame::default();
    }

    /// Takes the pending frame.
    ///
    /// # Returns
    /// - `Ok(frame)`: a frame was pending and has been cleared
    /// - `Err(nb::Error::WouldBlock)`: nothing received yet
    pub fn read_frame(&mut self) -> nb::Result<NecFrame, Infallible> {
        if self.frame.is_empty() {
            return Err(nb::Error::WouldBlock);
        }
        let frame = self.frame;
        self.reset_frame();
        Ok(frame)
    }

    /// The edge capture backend.
    pub fn source(&self) -> &E {
        &self.source
    }

    /// The edge capture backend, mutably.
    pub fn source_mut(&mut self) -> &mut E {
        &mut self.source
    }

    /// Gives the capture backend back.
    pub fn release(self) -> E {
        self.source
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn is_disabled(&self) -> bool {
        !self.enabled
    }

    fn has_new_edges(&self) -> bool {
        self.source.num_edges() != self.num_edges
    }

    fn is_timed_out(&self) -> bool {
        self.now_ms.wrapping_sub(self.last_activity_ms) >= self.message_timeout_ms
    }

    fn start(&mut self) {
        self.source.start_timer();
        self.source.clear();
        self.source.enable(true);
        self.num_edges = 0;
        self.decoder = Some(NecDecoder::new());
        self.reset_frame();
        info!("NEC receiver on");
    }

    fn stop(&mut self) {
        self.source.stop_timer();
        self.source.enable(false);
        self.source.clear();
        self.num_edges = 0;
        self.decoder = None;
        self.reset_frame();
        info!("NEC receiver off");
    }

    fn touch(&mut self) {
        self.num_edges = self.source.num_edges();
        self.last_activity_ms = self.now_ms;
    }

    fn decode(&mut self) {
        let decoder = self.decoder.get_or_insert_with(NecDecoder::new);
        let result = self
            .source
            .take_edges(|edges| decoder.decode(edges, edges.len()));
        self.frame = NecFrame {
            code: result.code,
            is_repetition: result.is_repetition,
            is_error: result.is_error(),
        };
        debug!(
            "NEC frame from {} edges: code={:#x} repetition={} error={}",
            self.num_edges,
            self.frame.code,
            self.frame.is_repetition,
            self.frame.is_error
        );
        self.num_edges = 0;
    }
}

impl<E: EdgeSource> StateMachine for NecReceiver<E> {
    type State = RxState;

    fn state(&self) -> RxState {
        self.state
    }

    fn set_state(&mut self, state: RxState) {
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::EdgeCapture;
    use crate::commands::LIL_RED_BUTTON;
    use crate::decoder::tests::command_edges;

    fn feed(receiver: &mut NecReceiver<EdgeCapture>, edges: &[u16]) {
        for (i, tick) in edges.iter().enumerate() {
            assert!(receiver.source_mut().record(*tick, i % 2 == 1));
        }
    }

    fn started() -> NecReceiver<EdgeCapture> {
        let mut receiver = NecReceiver::new(EdgeCapture::new());
        receiver.set_enabled(true);
        assert_eq!(receiver.poll(0), Some(RxState::Idle));
        receiver
    }

    #[test]
    fn test_starts_off() {
        let mut receiver = NecReceiver::new(EdgeCapture::new());
        assert_eq!(receiver.state(), RxState::Off);
        assert_eq!(receiver.poll(100), None);
        assert!(!receiver.source().is_enabled());
        assert!(!receiver.source().is_timer_running());
    }

    #[test]
    fn test_enable_and_disable() {
        let mut receiver = started();
        assert!(receiver.source().is_enabled());
        assert!(receiver.source().is_timer_running());

        receiver.set_enabled(false);
        assert_eq!(receiver.poll(1), Some(RxState::Off));
        assert!(!receiver.source().is_enabled());
        assert!(!receiver.source().is_timer_running());
    }

    #[test]
    fn test_disable_mid_message_drops_it() {
        let mut receiver = started();
        feed(&mut receiver, &command_edges(LIL_RED_BUTTON, 0));
        assert_eq!(receiver.poll(5), Some(RxState::Wait));

        receiver.set_enabled(false);
        assert_eq!(receiver.poll(6), Some(RxState::Off));
        assert_eq!(receiver.poll(50), None);
        assert_eq!(receiver.state(), RxState::Off);
        assert!(receiver.frame().is_empty());
        assert_eq!(receiver.source().num_edges(), 0);

        receiver.set_enabled(true);
        assert_eq!(receiver.poll(60), Some(RxState::Idle));
        assert_eq!(receiver.poll(100), None);
        assert!(receiver.frame().is_empty());
    }

    #[test]
    fn test_restart_drops_unread_frame() {
        let mut receiver = started();
        feed(&mut receiver, &command_edges(LIL_RED_BUTTON, 0));
        let _ = receiver.poll(5);
        assert_eq!(receiver.poll(15), Some(RxState::Idle));
        assert_eq!(receiver.code(), LIL_RED_BUTTON);

        receiver.set_enabled(false);
        assert_eq!(receiver.poll(16), Some(RxState::Off));
        receiver.set_enabled(true);
        assert_eq!(receiver.poll(17), Some(RxState::Idle));
        assert_eq!(receiver.read_frame(), Err(nb::Error::WouldBlock));
    }

    #[test]
    fn test_decodes_exactly_once_after_timeout() {
        let mut receiver = started();
        feed(&mut receiver, &command_edges(LIL_RED_BUTTON, 0));

        assert_eq!(receiver.poll(100), Some(RxState::Wait));
        assert!(receiver.is_active());
        assert_eq!(receiver.poll(109), None);
        assert_eq!(receiver.frame(), NecFrame::default());

        assert_eq!(receiver.poll(110), Some(RxState::Idle));
        assert_eq!(receiver.code(), LIL_RED_BUTTON);
        assert!(!receiver.is_error());
        assert_eq!(receiver.source().num_edges(), 0);

        assert_eq!(receiver.poll(200), None);
        assert_eq!(
            receiver.read_frame(),
            Ok(NecFrame {
                code: LIL_RED_BUTTON,
                is_repetition: false,
                is_error: false
            })
        );
        assert_eq!(receiver.read_frame(), Err(nb::Error::WouldBlock));
    }

    #[test]
    fn test_new_edges_extend_the_wait() {
        let mut receiver = started();
        let edges = command_edges(LIL_RED_BUTTON, 0);
        feed(&mut receiver, &edges[..30]);
        assert_eq!(receiver.poll(10), Some(RxState::Wait));

        for (i, tick) in edges[30..].iter().enumerate() {
            assert!(receiver.source_mut().record(*tick, i % 2 == 1));
        }
        assert_eq!(receiver.poll(19), Some(RxState::Wait));
        assert_eq!(receiver.poll(20), None);
        assert_eq!(receiver.poll(29), Some(RxState::Idle));
        assert_eq!(receiver.frame().kind(), FrameKind::Command(LIL_RED_BUTTON));
    }

    #[test]
    fn test_repetition_frame() {
        let mut receiver = started();
        feed(&mut receiver, &[0, 900, 1125, 1181]);
        let _ = receiver.poll(1);
        let _ = receiver.poll(11);
        assert!(receiver.is_repetition());
        assert_eq!(receiver.frame().kind(), FrameKind::Repetition);
    }

    #[test]
    fn test_noise_is_an_error_frame() {
        let mut receiver = started();
        feed(&mut receiver, &[0, 17, 40, 71]);
        let _ = receiver.poll(1);
        let _ = receiver.poll(11);
        assert!(receiver.is_error());
        assert_eq!(receiver.code(), 0);
        assert_eq!(receiver.read_frame().map(|f| f.kind()), Ok(FrameKind::Error));
    }

    #[test]
    fn test_timeout_across_clock_wrap() {
        let mut receiver = started();
        feed(&mut receiver, &command_edges(LIL_RED_BUTTON, 0));
        assert_eq!(receiver.poll(u32::MAX - 4), Some(RxState::Wait));
        assert_eq!(receiver.poll(4), None);
        assert_eq!(receiver.poll(5), Some(RxState::Idle));
        assert_eq!(receiver.code(), LIL_RED_BUTTON);
    }

    #[test]
    fn test_frame_kinds() {
        assert_eq!(NecFrame::default().kind(), FrameKind::Empty);
        let frame = NecFrame {
            code: 7,
            is_repetition: false,
            is_error: false,
        };
        assert_eq!(frame.kind(), FrameKind::Command(7));
        assert!(!frame.is_empty());
    }
}
