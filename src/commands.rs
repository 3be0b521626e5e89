//! Command catalog of the supported IR remotes.
//!
//! Only the Liluco RGB-light remote is known. Its codes are full 32-bit NEC
//! frames (address, inverted address, command, inverted command), as returned
//! by [`NecDecoder::decode`](crate::decoder::NecDecoder::decode).
//!
//! ```text
//!   [ OFF ]
//!   [ RED ][ GREEN ][ BLUE ]
//!   [ YELLOW ][ CYAN ][ MAGENTA ]
//!   [ WHITE ]
//! ```

use crate::rgb::RgbColor;

/// Liluco remote: OFF button.
pub const LIL_OFF_BUTTON: u32 = 0x00F7_40BF;
/// Liluco remote: RED button.
pub const LIL_RED_BUTTON: u32 = 0x00F7_20DF;
/// Liluco remote: GREEN button.
pub const LIL_GREEN_BUTTON: u32 = 0x00F7_A05F;
/// Liluco remote: BLUE button.
pub const LIL_BLUE_BUTTON: u32 = 0x00F7_609F;
/// Liluco remote: YELLOW button.
pub const LIL_YELLOW_BUTTON: u32 = 0x00F7_28D7;
/// Liluco remote: CYAN button.
pub const LIL_CYAN_BUTTON: u32 = 0x00F7_B04F;
/// Liluco remote: MAGENTA button.
pub const LIL_MAGENTA_BUTTON: u32 = 0x00F7_6897;
/// Liluco remote: WHITE button.
pub const LIL_WHITE_BUTTON: u32 = 0x00F7_E01F;

/// A button of the Liluco remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Command {
    /// Light off
    Off,
    /// Red light
    Red,
    /// Green light
    Green,
    /// Blue light
    Blue,
    /// Red and green
    Yellow,
    /// Green and blue
    Cyan,
    /// Red and blue
    Magenta,
    /// All three channels
    White,
}

impl Command {
    /// Every known command, in remote layout order.
    pub const ALL: [Command; 8] = [
        Command::Off,
        Command::Red,
        Command::Green,
        Command::Blue,
        Command::Yellow,
        Command::Cyan,
        Command::Magenta,
        Command::White,
    ];

    /// Maps a decoded NEC code to a command.
    ///
    /// # Returns
    /// `None` for codes that do not belong to the remote, including the empty
    /// sentinel `0`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nec_retina::commands::Command;
    ///
    /// assert_eq!(Command::from_code(0x00F7_20DF), Some(Command::Red));
    /// assert_eq!(Command::from_code(0), None);
    /// ```
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            LIL_OFF_BUTTON => Some(Command::Off),
            LIL_RED_BUTTON => Some(Command::Red),
            LIL_GREEN_BUTTON => Some(Command::Green),
            LIL_BLUE_BUTTON => Some(Command::Blue),
            LIL_YELLOW_BUTTON => Some(Command::Yellow),
            LIL_CYAN_BUTTON => Some(Command::Cyan),
            LIL_MAGENTA_BUTTON => Some(Command::Magenta),
            LIL_WHITE_BUTTON => Some(Command::White),
            _ => None,
        }
    }

    /// The NEC frame sent by this button.
    pub const fn code(self) -> u32 {
        match self {
            Command::Off => LIL_OFF_BUTTON,
            Command::Red => LIL_RED_BUTTON,
            Command::Green => LIL_GREEN_BUTTON,
            Command::Blue => LIL_BLUE_BUTTON,
            Command::Yellow => LIL_YELLOW_BUTTON,
            Command::Cyan => LIL_CYAN_BUTTON,
            Command::Magenta => LIL_MAGENTA_BUTTON,
            Command::White => LIL_WHITE_BUTTON,
        }
    }

    /// Color shown on the RGB light for this button.
    pub const fn color(self) -> RgbColor {
        match self {
            Command::Off => RgbColor::OFF,
            Command::Red => RgbColor::RED,
            Command::Green => RgbColor::GREEN,
            Command::Blue => RgbColor::BLUE,
            Command::Yellow => RgbColor::YELLOW,
            Command::Cyan => RgbColor::CYAN,
            Command::Magenta => RgbColor::MAGENTA,
            Command::White => RgbColor::WHITE,
        }
    }
}
