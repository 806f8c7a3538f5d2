//! Simulated peripherals, so the sampler and animator run on the host
//! without the real converter or panel.

use core::cell::Cell;
use core::convert::Infallible;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::Size;
use embedded_graphics::primitives::Rectangle;
use heapless::Vec;

use crate::error::AdcError;
use crate::hw::{AdcPeripheral, Lcd};
use crate::sampler::{AdcConfig, Axis};

// Mirrors the stm32g070 input range so configuration errors behave
// like the real part
const MAX_CHANNEL: u8 = 18;

/// Shared result storage of the simulated converter, one cell per slot.
pub type SweepCells = [Cell<u16>; 3];

/// In-memory converter. Created together with a [SimStimulus] handle
/// that the test side uses to load the readings of the next sweep.
#[derive(Debug)]
pub struct SimAdc<'a> {
    raw: &'a SweepCells,
    configured: bool,
    running: bool,
}

/// Test-side handle writing into the same sweep storage the converter
/// reports from.
pub struct SimStimulus<'a> {
    raw: &'a SweepCells,
}

impl<'a> SimAdc<'a> {
    pub fn new(cells: &'a SweepCells) -> (Self, SimStimulus<'a>) {
        (
            SimAdc {
                raw: cells,
                configured: false,
                running: false,
            },
            SimStimulus { raw: cells },
        )
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl SimStimulus<'_> {
    /// Load the readings the next acquisition will report.
    pub fn set(&self, x: u16, y: u16, z: u16) {
        self.raw[Axis::X as usize].set(x);
        self.raw[Axis::Y as usize].set(y);
        self.raw[Axis::Z as usize].set(z);
    }
}

impl AdcPeripheral for SimAdc<'_> {
    fn configure(&mut self, config: &AdcConfig) -> Result<(), AdcError> {
        if self.running {
            return Err(AdcError::Unavailable);
        }
        config.validate(MAX_CHANNEL)?;
        self.configured = true;
        Ok(())
    }

    fn start(&mut self) {
        self.running = true;
    }

    fn unpend(&mut self) {}

    fn result(&self, axis: Axis) -> u16 {
        self.raw[axis as usize].get()
    }
}

/// One recorded draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawOp {
    Clear(Rgb565),
    FillRect { rect: Rectangle, color: Rgb565 },
    DrawRect { rect: Rectangle, color: Rgb565 },
    Hline { x0: i32, x1: i32, y: i32, color: Rgb565 },
}

/// Recording panel. Keeps the first `N` draw calls verbatim for
/// geometry assertions; `op_count` keeps running past capacity so call
/// counting stays exact on long sequences.
pub struct SimLcd<const N: usize> {
    size: Size,
    ops: Vec<DrawOp, N>,
    total: usize,
}

impl<const N: usize> SimLcd<N> {
    pub fn new(width: u32, height: u32) -> Self {
        SimLcd {
            size: Size::new(width, height),
            ops: Vec::new(),
            total: 0,
        }
    }

    /// Recorded draw calls, oldest first.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Number of draw calls issued, including any past capacity.
    pub fn op_count(&self) -> usize {
        self.total
    }

    fn record(&mut self, op: DrawOp) {
        self.total += 1;
        // best effort once full, the counter stays exact
        let _ = self.ops.push(op);
    }
}

impl<const N: usize> Lcd for SimLcd<N> {
    type Error = Infallible;

    fn size(&self) -> Size {
        self.size
    }

    fn clear(&mut self, color: Rgb565) -> Result<(), Self::Error> {
        self.record(DrawOp::Clear(color));
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rectangle, color: Rgb565) -> Result<(), Self::Error> {
        self.record(DrawOp::FillRect { rect, color });
        Ok(())
    }

    fn draw_rect(&mut self, rect: Rectangle, color: Rgb565) -> Result<(), Self::Error> {
        self.record(DrawOp::DrawRect { rect, color });
        Ok(())
    }

    fn draw_hline(&mut self, x0: i32, x1: i32, y: i32, color: Rgb565) -> Result<(), Self::Error> {
        self.record(DrawOp::Hline { x0, x1, y, color });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::Reference;
    use embedded_graphics::pixelcolor::RgbColor;

    #[test]
    fn configure_marks_the_converter_ready() {
        let cells = Default::default();
        let (mut adc, _stimulus) = SimAdc::new(&cells);
        assert!(!adc.is_configured());

        adc.configure(&AdcConfig::new([0, 1, 6], Reference::Vdda, true))
            .unwrap();
        assert!(adc.is_configured());
        assert!(!adc.is_running());

        adc.start();
        assert!(adc.is_running());
    }

    #[test]
    fn op_count_keeps_running_past_capacity() {
        let mut lcd = SimLcd::<2>::new(8, 8);
        for y in 0..4 {
            lcd.draw_hline(0, 8, y, Rgb565::GREEN).unwrap();
        }
        assert_eq!(lcd.ops().len(), 2);
        assert_eq!(lcd.op_count(), 4);
    }
}
