//! Constants used across the NEC protocol implementation.
//!
//! This module defines the timing of the NEC infrared protocol as seen from
//! both ends of the link:
//!
//! - **Reception** works on edge timestamps taken with a free-running timer of
//!   [`NEC_RX_TIMER_TICK_BASE_US`] resolution. Every symbol class accepted by the
//!   decoder is a [`ToleranceWindow`] expressed in those ticks.
//! - **Transmission** is paced by a symbol timer of 56.25 µs resolution (see
//!   [`NEC_TX_TIMER_TICK_BASE_NS`]). Every burst is a number of symbol ticks with
//!   the carrier on followed by a number of symbol ticks with the carrier off.
//!
//! ## Naming
//!
//! The receiver module output is active-low: while the 38 kHz carrier is
//! present the line is low. The receive-side constants are named after the line
//! level (a *silence* is the time the line stays low, a *pulse* the time it
//! stays high), the transmit-side constants after the carrier (`ON`/`OFF`).
//!
//! ```text
//! carrier   ████████████████░░░░░░░░██░░██░░░░░░██ ... ██░░░░░░░░
//!           prologue ON      OFF     0     1          epilogue
//! RX line   ▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▁▔▔▔▔▔▔▔▔▁▁▔▔▁▁▔▔▔▔▔▔▁▁ ... ▁▁▔▔▔▔▔▔▔▔
//! ```

/// Number of address bits in a NEC frame (address and inverted address).
pub const NEC_ADDRESS_BITS: u8 = 16;

/// Number of command bits in a NEC frame (command and inverted command).
pub const NEC_COMMAND_BITS: u8 = 16;

/// Total number of bits carried by a NEC frame.
pub const NEC_FRAME_BITS: u8 = NEC_ADDRESS_BITS + NEC_COMMAND_BITS;

/// Number of edges of the prologue of a NEC code.
pub const NEC_PROLOGUE_EDGES: usize = 3;

/// Number of edges of the epilogue of a NEC code.
pub const NEC_EPILOGUE_EDGES: usize = 1;

/// Number of edges of each symbol of a NEC code.
pub const NEC_SYMBOL_EDGES: usize = 2;

/// Number of edges produced by a complete command frame.
///
/// Prologue, 32 symbols and the rising edge that closes the epilogue burst.
pub const NEC_COMMAND_EDGES: usize =
    NEC_PROLOGUE_EDGES + NEC_SYMBOL_EDGES * NEC_FRAME_BITS as usize + NEC_EPILOGUE_EDGES;

/// Capacity of the edge buffer.
///
/// Large enough to store every edge of a NEC frame with plenty of headroom for
/// noise. Edges beyond this capacity are dropped.
pub const NEC_FRAME_EDGES: usize = 256;

/// Resolution of the receive timer in microseconds.
pub const NEC_RX_TIMER_TICK_BASE_US: u32 = 10;

/// Minimum width of the prologue silence at RX in microseconds.
pub const NEC_RX_PROLOGUE_SILENCE_MIN_US: u32 = 8_500;
/// Maximum width of the prologue silence at RX in microseconds.
pub const NEC_RX_PROLOGUE_SILENCE_MAX_US: u32 = 9_500;
/// Minimum width of the prologue pulse at RX in microseconds.
pub const NEC_RX_PROLOGUE_PULSE_MIN_US: u32 = 4_000;
/// Maximum width of the prologue pulse at RX in microseconds.
pub const NEC_RX_PROLOGUE_PULSE_MAX_US: u32 = 5_000;
/// Minimum width of the silence that opens every symbol at RX in microseconds.
pub const NEC_RX_SYMBOL_SILENCE_MIN_US: u32 = 400;
/// Maximum width of the silence that opens every symbol at RX in microseconds.
pub const NEC_RX_SYMBOL_SILENCE_MAX_US: u32 = 800;
/// Minimum width of the pulse of a `0` symbol at RX in microseconds.
pub const NEC_RX_SYMBOL_0_PULSE_MIN_US: u32 = 400;
/// Maximum width of the pulse of a `0` symbol at RX in microseconds.
pub const NEC_RX_SYMBOL_0_PULSE_MAX_US: u32 = 800;
/// Minimum width of the pulse of a `1` symbol at RX in microseconds (1187.5 µs).
pub const NEC_RX_SYMBOL_1_PULSE_MIN_US: u32 = 1_187;
/// Maximum width of the pulse of a `1` symbol at RX in microseconds (2187.5 µs).
pub const NEC_RX_SYMBOL_1_PULSE_MAX_US: u32 = 2_187;
/// Minimum width of the pulse of a repetition code at RX in microseconds.
pub const NEC_RX_REPETITION_PULSE_MIN_US: u32 = 1_700;
/// Maximum width of the pulse of a repetition code at RX in microseconds.
pub const NEC_RX_REPETITION_PULSE_MAX_US: u32 = 2_700;

/// Time without a new edge after which the buffered edges are a complete message.
pub const NEC_MESSAGE_TIMEOUT_US: u32 = 10_000;

/// [`NEC_MESSAGE_TIMEOUT_US`] in milliseconds.
pub const NEC_MESSAGE_TIMEOUT_MS: u32 = NEC_MESSAGE_TIMEOUT_US / 1_000;

/// Inclusive range of receive-timer ticks accepted for one symbol class.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct ToleranceWindow {
    /// Shortest accepted interval, in ticks.
    pub min_ticks: u16,
    /// Longest accepted interval, in ticks.
    pub max_ticks: u16,
}

impl ToleranceWindow {
    /// Builds a window from microsecond bounds using the receive tick base.
    pub const fn from_us(min_us: u32, max_us: u32) -> Self {
        Self {
            min_ticks: (min_us / NEC_RX_TIMER_TICK_BASE_US) as u16,
            max_ticks: (max_us / NEC_RX_TIMER_TICK_BASE_US) as u16,
        }
    }

    /// Whether `ticks` falls inside the window, both ends included.
    pub const fn contains(&self, ticks: u16) -> bool {
        ticks >= self.min_ticks && ticks <= self.max_ticks
    }
}

/// Window of the prologue silence (line low while the long burst is received).
pub const NEC_RX_PROLOGUE_SILENCE: ToleranceWindow =
    ToleranceWindow::from_us(NEC_RX_PROLOGUE_SILENCE_MIN_US, NEC_RX_PROLOGUE_SILENCE_MAX_US);

/// Window of the prologue pulse that announces a command.
pub const NEC_RX_PROLOGUE_PULSE: ToleranceWindow =
    ToleranceWindow::from_us(NEC_RX_PROLOGUE_PULSE_MIN_US, NEC_RX_PROLOGUE_PULSE_MAX_US);

/// Window of the shorter pulse that announces a repetition code.
pub const NEC_RX_REPETITION_PULSE: ToleranceWindow =
    ToleranceWindow::from_us(NEC_RX_REPETITION_PULSE_MIN_US, NEC_RX_REPETITION_PULSE_MAX_US);

/// Window of the silence that opens every symbol.
pub const NEC_RX_SYMBOL_SILENCE: ToleranceWindow =
    ToleranceWindow::from_us(NEC_RX_SYMBOL_SILENCE_MIN_US, NEC_RX_SYMBOL_SILENCE_MAX_US);

/// Window of the pulse closing a `0` symbol.
pub const NEC_RX_SYMBOL_0_PULSE: ToleranceWindow =
    ToleranceWindow::from_us(NEC_RX_SYMBOL_0_PULSE_MIN_US, NEC_RX_SYMBOL_0_PULSE_MAX_US);

/// Window of the pulse closing a `1` symbol.
pub const NEC_RX_SYMBOL_1_PULSE: ToleranceWindow =
    ToleranceWindow::from_us(NEC_RX_SYMBOL_1_PULSE_MIN_US, NEC_RX_SYMBOL_1_PULSE_MAX_US);

/// Resolution of the transmit symbol timer in nanoseconds (56.25 µs).
pub const NEC_TX_TIMER_TICK_BASE_NS: u32 = 56_250;

/// Symbol ticks with the carrier on for the prologue.
pub const NEC_TX_PROLOGUE_TICKS_ON: u32 = 160;
/// Symbol ticks with the carrier off for the prologue.
pub const NEC_TX_PROLOGUE_TICKS_OFF: u32 = 80;
/// Symbol ticks with the carrier on for a `0` symbol.
pub const NEC_TX_SYM_0_TICKS_ON: u32 = 10;
/// Symbol ticks with the carrier off for a `0` symbol.
pub const NEC_TX_SYM_0_TICKS_OFF: u32 = 10;
/// Symbol ticks with the carrier on for a `1` symbol.
pub const NEC_TX_SYM_1_TICKS_ON: u32 = 10;
/// Symbol ticks with the carrier off for a `1` symbol.
pub const NEC_TX_SYM_1_TICKS_OFF: u32 = 30;
/// Symbol ticks with the carrier on for the epilogue.
pub const NEC_TX_EPILOGUE_TICKS_ON: u32 = 10;
/// Symbol ticks with the carrier off for the epilogue (~200 ms of guard time).
pub const NEC_TX_EPILOGUE_TICKS_OFF: u32 = 3_560;

/// Frequency of the IR carrier in Hz.
pub const NEC_PWM_FREQ_HZ: u32 = 38_000;

/// Duty cycle of the IR carrier, in percent.
pub const NEC_PWM_DUTY_PERCENT: u8 = 35;

/// Debounce time of the mode button in milliseconds.
pub const BUTTON_DEBOUNCE_MS: u32 = 150;

/// Press duration from which a button press switches between TX and RX modes.
pub const CHANGE_MODE_BUTTON_MS: u32 = 3_000;

/// Number of commands the application cycles through in transmit mode.
pub const COMMANDS_MEMORY_SIZE: usize = 3;
