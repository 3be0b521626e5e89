//! RGB light output.
//!
//! The light is three independent on/off channels, each wired to a digital
//! output. Anything that can show an [`RgbColor`] implements [`RgbOutput`].

use crate::error::Error;
use embedded_hal::digital::{OutputPin, PinState};

/// On/off pattern of the three channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct RgbColor {
    /// Red channel lit
    pub red: bool,
    /// Green channel lit
    pub green: bool,
    /// Blue channel lit
    pub blue: bool,
}

impl RgbColor {
    /// All channels off.
    pub const OFF: Self = Self::new(false, false, false);
    /// Red only.
    pub const RED: Self = Self::new(true, false, false);
    /// Green only.
    pub const GREEN: Self = Self::new(false, true, false);
    /// Blue only.
    pub const BLUE: Self = Self::new(false, false, true);
    /// Red and green.
    pub const YELLOW: Self = Self::new(true, true, false);
    /// Green and blue.
    pub const CYAN: Self = Self::new(false, true, true);
    /// Red and blue.
    pub const MAGENTA: Self = Self::new(true, false, true);
    /// All channels on.
    pub const WHITE: Self = Self::new(true, true, true);

    /// Builds a color from the three channel states.
    pub const fn new(red: bool, green: bool, blue: bool) -> Self {
        Self { red, green, blue }
    }
}

/// A light able to display an [`RgbColor`].
pub trait RgbOutput {
    /// Shows `color`.
    fn set_color(&mut self, color: RgbColor) -> Result<(), Error>;
}

/// RGB light driven by three push-pull outputs, one per channel.
#[derive(Debug)]
pub struct RgbLed<R, G, B> {
    red: R,
    green: G,
    blue: B,
    active_low: bool,
    color: RgbColor,
}

impl<R, G, B> RgbLed<R, G, B>
where
    R: OutputPin,
    G: OutputPin,
    B: OutputPin,
{
    /// Wraps the three channel pins and switches the light off.
    ///
    /// # Arguments
    /// - `red`, `green`, `blue`: channel outputs
    /// - `active_low`: `true` for common-anode lights, lit when the pin is low
    pub fn new(red: R, green: G, blue: B, active_low: bool) -> Result<Self, Error> {
        let mut led = Self {
            red,
            green,
            blue,
            active_low,
            color: RgbColor::OFF,
        };
        led.set_color(RgbColor::OFF)?;
        Ok(led)
    }

    /// Last color successfully written.
    pub fn color(&self) -> RgbColor {
        self.color
    }

    /// Gives the pins back.
    pub fn release(self) -> (R, G, B) {
        (self.red, self.green, self.blue)
    }

    fn level(&self, lit: bool) -> PinState {
        PinState::from(lit != self.active_low)
    }
}

impl<R, G, B> RgbOutput for RgbLed<R, G, B>
where
    R: OutputPin,
    G: OutputPin,
    B: OutputPin,
{
    fn set_color(&mut self, color: RgbColor) -> Result<(), Error> {
        let (red, green, blue) = (
            self.level(color.red),
            self.level(color.green),
            self.level(color.blue),
        );
        self.red.set_state(red).map_err(Error::gpio)?;
        self.green.set_state(green).map_err(Error::gpio)?;
        self.blue.set_state(blue).map_err(Error::gpio)?;
        self.color = color;
        Ok(())
    }
}
