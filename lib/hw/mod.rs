use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::Size;
use embedded_graphics::primitives::Rectangle;

use crate::error::AdcError;
use crate::sampler::{AdcConfig, Axis};

#[cfg(feature = "hw")]
mod adc;
#[cfg(feature = "hw")]
mod helper;
#[cfg(feature = "hw")]
mod lcd;
#[cfg(feature = "hw")]
mod timers;

#[cfg(feature = "hw")]
pub use helper::*;
#[cfg(feature = "hw")]
pub use lcd::IliError;

/// Drawing surface. Implementations clip to the physical panel, so rows
/// outside [0, height] are dropped silently.
pub trait Lcd {
    type Error;
    fn size(&self) -> Size;
    fn clear(&mut self, color: Rgb565) -> Result<(), Self::Error>;
    fn fill_rect(&mut self, rect: Rectangle, color: Rgb565) -> Result<(), Self::Error>;
    fn draw_rect(&mut self, rect: Rectangle, color: Rgb565) -> Result<(), Self::Error>;
    fn draw_hline(&mut self, x0: i32, x1: i32, y: i32, color: Rgb565) -> Result<(), Self::Error>;
}

/// Three-channel sweep converter.
pub trait AdcPeripheral {
    /// Apply the one-time setup. Fails with [AdcError] on a bad channel
    /// set or when the converter is already running.
    fn configure(&mut self, config: &AdcConfig) -> Result<(), AdcError>;
    /// Begin converting sweeps.
    fn start(&mut self);
    /// Clear the pending end-of-sweep notification.
    fn unpend(&mut self);
    /// Latest conversion result of one slot.
    fn result(&self, axis: Axis) -> u16;
}
