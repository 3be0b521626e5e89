//! NEC frame decoder.
//!
//! This module turns the timestamps of the edges seen on the infrared receiver
//! line into a 32-bit NEC code. The decoder does not sample the line itself: it
//! is handed the whole edge buffer once the receiver considers the frame
//! complete (see [`crate::receiver`]) and walks it interval by interval.
//!
//! ## Edge layout
//!
//! The receiver line idles high, so the first edge is always a falling one:
//! edges at even positions are falling edges and edges at odd positions are
//! rising edges. A full command looks like this (intervals in receive ticks):
//!
//! ```text
//! edge  0      1     2   3   4   5     6        66  67
//!       ↓ 900  ↑ 450 ↓ 56↑ 56↓ 56↑ 169 ↓  ...     ↓ 56↑
//!       prologue     bit 31  bit 30         epilogue
//! ```
//!
//! ## State machine
//!
//! | State          | Interval                        | Next           |
//! |----------------|---------------------------------|----------------|
//! | Idle           | not a prologue silence          | Idle (skip 2)  |
//! | Idle           | prologue silence                | Init           |
//! | Init           | neither prologue nor repetition | Idle           |
//! | Init           | repetition pulse                | SymbolSilence  |
//! | Init           | prologue pulse                  | SymbolSilence  |
//! | SymbolSilence  | (no bits left)                  | Idle (done)    |
//! | SymbolSilence  | not a symbol silence            | Idle           |
//! | SymbolSilence  | symbol silence                  | SymbolPulse    |
//! | SymbolPulse    | `0` pulse                       | SymbolSilence  |
//! | SymbolPulse    | `1` pulse                       | SymbolSilence  |
//! | SymbolPulse    | anything else                   | Idle           |
//!
//! Rows are evaluated top to bottom, the machine fires while at least two edges
//! remain unread, and every interval is checked inclusively against the
//! [`ToleranceWindow`](crate::consts::ToleranceWindow)s in [`crate::consts`].

use crate::consts::{
    NEC_FRAME_BITS, NEC_RX_PROLOGUE_PULSE, NEC_RX_PROLOGUE_SILENCE, NEC_RX_REPETITION_PULSE,
    NEC_RX_SYMBOL_0_PULSE, NEC_RX_SYMBOL_1_PULSE, NEC_RX_SYMBOL_SILENCE,
};
use crate::fsm::{StateMachine, Transition};

/// States of the NEC decoder.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum NecState {
    /// Looking for the prologue silence.
    #[default]
    Idle,
    /// Prologue silence seen; the next interval tells a command from a repetition.
    Init,
    /// Expecting the silence that opens a symbol, or done when no bits are left.
    SymbolSilence,
    /// Expecting the pulse whose width is the value of the symbol.
    SymbolPulse,
}

/// Result of one decode run.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct NecDecode {
    /// The 32 bits of the command, most significant first.
    ///
    /// `0` when nothing valid was found, and always `0` for a repetition.
    pub code: u32,
    /// Whether the frame was a repetition code.
    pub is_repetition: bool,
}

impl NecDecode {
    /// Whether the run produced neither a code nor a repetition.
    pub fn is_error(&self) -> bool {
        self.code == 0 && !self.is_repetition
    }
}

/// Read position of a decode run.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct DecodeCursor {
    /// Index of the edge that opens the interval under inspection.
    pub position: usize,
    /// Edges not yet consumed, the one at `position` included.
    pub edges_remaining: usize,
    /// Bits still expected for the current frame.
    pub bits_remaining: u8,
}

/// Restartable NEC decoder.
///
/// The instance holds no data between two calls to [`decode`](NecDecoder::decode);
/// it only exists so the receiver can own (and drop) it together with its
/// session.
///
/// ## Example
///
/// ```rust
/// use nec_retina::decoder::NecDecoder;
///
/// // Prologue silence followed by a repetition pulse.
/// let edges = [0u16, 900, 1125, 1181];
/// let mut decoder = NecDecoder::new();
/// let result = decoder.decode(&edges, edges.len());
/// assert!(result.is_repetition);
/// assert_eq!(result.code, 0);
/// ```
#[derive(Clone, Copy, Default, Debug)]
pub struct NecDecoder {
    state: NecState,
    cursor: DecodeCursor,
    /// Interval opened by the edge under the cursor, in ticks.
    interval: u16,
    code: u32,
    is_repetition: bool,
}

impl NecDecoder {
    #[rustfmt::skip]
    const TRANSITIONS: [Transition<NecState, Self>; 11] = [
        Transition::new(NecState::Idle, Self::is_init_noise, NecState::Idle, Some(Self::skip_two_edges)),
        Transition::new(NecState::Idle, Self::is_prologue_silence, NecState::Init, Some(Self::reset_and_next_edge)),
        Transition::new(NecState::Init, Self::is_init_pulse_noise, NecState::Idle, Some(Self::next_edge)),
        Transition::new(NecState::Init, Self::is_repetition_pulse, NecState::SymbolSilence, Some(Self::repetition_starts)),
        Transition::new(NecState::Init, Self::is_prologue_pulse, NecState::SymbolSilence, Some(Self::command_starts)),
        Transition::new(NecState::SymbolSilence, Self::is_last_symbol, NecState::Idle, Some(Self::set_end)),
        Transition::new(NecState::SymbolSilence, Self::is_symbol_silence_noise, NecState::Idle, Some(Self::discard_code)),
        Transition::new(NecState::SymbolSilence, Self::is_symbol_silence, NecState::SymbolPulse, Some(Self::next_edge)),
        Transition::new(NecState::SymbolPulse, Self::is_symbol_0_pulse, NecState::SymbolSilence, Some(Self::store_bit_0)),
        Transition::new(NecState::SymbolPulse, Self::is_symbol_1_pulse, NecState::SymbolSilence, Some(Self::store_bit_1)),
        Transition::new(NecState::SymbolPulse, Self::is_symbol_pulse_noise, NecState::Idle, Some(Self::discard_and_next_edge)),
    ];

    /// Creates an idle decoder.
    pub const fn new() -> Self {
        Self {
            state: NecState::Idle,
            cursor: DecodeCursor {
                position: 0,
                edges_remaining: 0,
                bits_remaining: 0,
            },
            interval: 0,
            code: 0,
            is_repetition: false,
        }
    }

    /// Decodes one frame out of an edge buffer.
    ///
    /// # Arguments
    /// - `edge_ticks`: timestamps of the edges, in receive-timer ticks
    /// - `num_edges`: number of valid entries; clamped to `edge_ticks.len()`
    ///
    /// # Returns
    /// The decoded code and repetition flag. Noise, truncated frames and empty
    /// buffers all come back as `code == 0` with `is_repetition == false`.
    ///
    /// # Notes
    /// Timestamps come from a free-running 16-bit timer, so intervals are
    /// computed with wrapping arithmetic and a frame may straddle an overflow.
    pub fn decode(&mut self, edge_ticks: &[u16], num_edges: usize) -> NecDecode {
        let edges = &edge_ticks[..num_edges.min(edge_ticks.len())];
        self.state = NecState::Idle;
        self.code = 0;
        self.is_repetition = false;
        self.cursor = DecodeCursor {
            position: 0,
            edges_remaining: edges.len(),
            bits_remaining: 0,
        };

        while self.cursor.edges_remaining > 1 {
            let position = self.cursor.position;
            self.interval = edges[position + 1].wrapping_sub(edges[position]);
            let _ = self.fire_with(&Self::TRANSITIONS);
        }

        if self.cursor.bits_remaining != 0 {
            trace!(
                "NEC frame truncated, {} bits missing",
                self.cursor.bits_remaining
            );
            self.code = 0;
        }

        NecDecode {
            code: self.code,
            is_repetition: self.is_repetition,
        }
    }

    /// Read position reached by the last run.
    pub fn cursor(&self) -> DecodeCursor {
        self.cursor
    }

    fn is_prologue_silence(&self) -> bool {
        NEC_RX_PROLOGUE_SILENCE.contains(self.interval)
    }

    fn is_init_noise(&self) -> bool {
        !self.is_prologue_silence()
    }

    fn is_prologue_pulse(&self) -> bool {
        NEC_RX_PROLOGUE_PULSE.contains(self.interval)
    }

    fn is_repetition_pulse(&self) -> bool {
        NEC_RX_REPETITION_PULSE.contains(self.interval)
    }

    fn is_init_pulse_noise(&self) -> bool {
        !self.is_prologue_pulse() && !self.is_repetition_pulse()
    }

    fn is_last_symbol(&self) -> bool {
        self.cursor.bits_remaining == 0
    }

    fn is_symbol_silence(&self) -> bool {
        !self.is_last_symbol() && NEC_RX_SYMBOL_SILENCE.contains(self.interval)
    }

    fn is_symbol_silence_noise(&self) -> bool {
        !self.is_last_symbol() && !NEC_RX_SYMBOL_SILENCE.contains(self.interval)
    }

    fn is_symbol_0_pulse(&self) -> bool {
        NEC_RX_SYMBOL_0_PULSE.contains(self.interval)
    }

    fn is_symbol_1_pulse(&self) -> bool {
        NEC_RX_SYMBOL_1_PULSE.contains(self.interval)
    }

    fn is_symbol_pulse_noise(&self) -> bool {
        !self.is_symbol_0_pulse() && !self.is_symbol_1_pulse()
    }

    fn next_edge(&mut self) {
        self.cursor.position += 1;
        self.cursor.edges_remaining -= 1;
    }

    fn skip_two_edges(&mut self) {
        // Drop a whole silence/pulse pair to stay aligned on falling edges.
        let skipped = self.cursor.edges_remaining.min(2);
        self.cursor.position += skipped;
        self.cursor.edges_remaining -= skipped;
    }

    fn reset_and_next_edge(&mut self) {
        self.code = 0;
        self.next_edge();
    }

    fn repetition_starts(&mut self) {
        self.next_edge();
        self.cursor.bits_remaining = 0;
        self.is_repetition = true;
    }

    fn command_starts(&mut self) {
        self.next_edge();
        self.cursor.bits_remaining = NEC_FRAME_BITS;
        self.is_repetition = false;
    }

    fn set_end(&mut self) {
        self.cursor.edges_remaining = 0;
    }

    fn discard_code(&mut self) {
        trace!(
            "NEC noise at edge {}: {} ticks",
            self.cursor.position,
            self.interval
        );
        self.code = 0;
    }

    fn discard_and_next_edge(&mut self) {
        self.discard_code();
        self.next_edge();
    }

    fn store_bit(&mut self, bit: u32) {
        self.code = (self.code << 1) | bit;
        self.cursor.bits_remaining -= 1;
        self.next_edge();
    }

    fn store_bit_0(&mut self) {
        self.store_bit(0);
    }

    fn store_bit_1(&mut self) {
        self.store_bit(1);
    }
}

impl StateMachine for NecDecoder {
    type State = NecState;

    fn state(&self) -> NecState {
        self.state
    }

    fn set_state(&mut self, state: NecState) {
        self.state = state;
    }
}
