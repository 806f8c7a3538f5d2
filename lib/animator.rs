use embedded_graphics::pixelcolor::{Rgb565, RgbColor};
use embedded_graphics::prelude::Point;
use embedded_graphics::primitives::Rectangle;

use crate::hw::Lcd;
use crate::sampler::SampleSet;

/// Rows within this distance of the previous bar top are ignored, so
/// converter noise does not flicker single pixels.
const DEAD_BAND: i32 = 2;

/// Raw-sample bounds of the tilt mapping. The defaults are empirical
/// values for the reference sensor and mounting; other boards pass
/// their own pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    pub raw_lo: u16,
    pub raw_hi: u16,
}

impl Calibration {
    pub const fn new(raw_lo: u16, raw_hi: u16) -> Self {
        Calibration { raw_lo, raw_hi }
    }

    /// Affine map from a raw sample to the bar's top row: `raw_hi`
    /// lands on row 0, `raw_lo` on the bottom row, rounded to the
    /// nearest row. Deliberately unclamped, samples outside the
    /// calibrated range map off the panel and the driver clips them.
    fn map(&self, raw: u16, height: i32) -> i32 {
        let span = self.raw_hi as i32 - self.raw_lo as i32;
        let numerator = (self.raw_hi as i32 - raw as i32) * height;
        (2 * numerator + span).div_euclid(2 * span)
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Calibration::new(4900, 11440)
    }
}

struct Color;

impl Color {
    const BACKGROUND: Rgb565 = Rgb565::BLUE;
    const BAR: Rgb565 = Rgb565::GREEN;
}

/// Tilt indicator. Each sweep's Z reading becomes a target row and the
/// filled bar is repainted incrementally between the previous top row
/// and the new one.
pub struct Animator<LCD>
where
    LCD: Lcd,
{
    lcd: LCD,
    calibration: Calibration,
    width: i32,
    height: i32,
    // None until the first completed sweep has drawn the full bar
    previous: Option<i32>,
}

impl<LCD> Animator<LCD>
where
    LCD: Lcd,
{
    pub fn new(lcd: LCD, calibration: Calibration) -> Result<Self, LCD::Error> {
        let mut lcd = lcd;
        let size = lcd.size();
        lcd.clear(Color::BACKGROUND)?;
        Ok(Animator {
            lcd,
            calibration,
            width: size.width as i32,
            height: size.height as i32,
            previous: None,
        })
    }

    /// Borrow the underlying driver.
    pub fn lcd(&self) -> &LCD {
        &self.lcd
    }

    /// Top row the bar would take for a raw Z sample.
    pub fn target_row(&self, raw: u16) -> i32 {
        self.calibration.map(raw, self.height)
    }

    /// Run one step of the indicator, called once per end-of-sweep
    /// notification.
    pub fn update(&mut self, samples: &SampleSet) -> Result<(), LCD::Error> {
        let target = self.target_row(samples.z);
        match self.previous {
            None => self.draw_initial(target)?,
            Some(previous) => {
                if (target - previous).abs() <= DEAD_BAND {
                    return Ok(());
                }
                if target > previous {
                    self.shrink(previous, target)?;
                } else {
                    self.grow(previous, target)?;
                }
            }
        }
        self.previous = Some(target);
        Ok(())
    }

    fn draw_initial(&mut self, target: i32) -> Result<(), LCD::Error> {
        let bar = Rectangle::new(
            Point::new(0, target),
            Point::new(self.width, self.height),
        );
        self.lcd.fill_rect(bar, Color::BAR)?;
        self.lcd.draw_rect(bar, Color::BAR)
    }

    // The top moved down the panel. Repaint the exposed strip in the
    // background color, sweeping from the new top row back up to the
    // old one.
    fn shrink(&mut self, previous: i32, target: i32) -> Result<(), LCD::Error> {
        for i in 0..=(target - previous) {
            self.lcd
                .draw_hline(0, self.width, target - i, Color::BACKGROUND)?;
        }
        Ok(())
    }

    // The top moved up the panel. Extend the bar row by row from the
    // new top down to the old one.
    fn grow(&mut self, previous: i32, target: i32) -> Result<(), LCD::Error> {
        for i in 0..=(previous - target) {
            self.lcd.draw_hline(0, self.width, target + i, Color::BAR)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{DrawOp, SimLcd};

    const WIDTH: u32 = 128;
    const HEIGHT: u32 = 128;

    fn animator() -> Animator<SimLcd<4096>> {
        Animator::new(SimLcd::new(WIDTH, HEIGHT), Calibration::default()).unwrap()
    }

    fn sweep(z: u16) -> SampleSet {
        SampleSet {
            x: 8000,
            y: 8000,
            z,
        }
    }

    #[test]
    fn mapping_hits_calibration_endpoints() {
        let animator = animator();
        assert_eq!(animator.target_row(4900), HEIGHT as i32);
        assert_eq!(animator.target_row(11440), 0);
    }

    #[test]
    fn mapping_is_monotonically_decreasing() {
        let animator = animator();
        let mut last = animator.target_row(0);
        for raw in (0..=16383u16).step_by(37) {
            let row = animator.target_row(raw);
            assert!(row <= last, "raw {} mapped above its predecessor", raw);
            last = row;
        }
    }

    #[test]
    fn out_of_range_samples_map_off_panel() {
        let animator = animator();
        assert!(animator.target_row(16383) < 0);
        assert!(animator.target_row(0) > HEIGHT as i32);
    }

    #[test]
    fn first_sweep_fills_and_outlines_the_bar() {
        let mut animator = animator();
        animator.update(&sweep(8000)).unwrap();

        let target = animator.target_row(8000);
        let bar = Rectangle::new(
            Point::new(0, target),
            Point::new(WIDTH as i32, HEIGHT as i32),
        );
        let ops = animator.lcd().ops();
        // clear from init, then exactly one fill and one outline
        assert_eq!(ops.len(), 3);
        assert_eq!(ops[0], DrawOp::Clear(Color::BACKGROUND));
        assert_eq!(
            ops[1],
            DrawOp::FillRect {
                rect: bar,
                color: Color::BAR
            }
        );
        assert_eq!(
            ops[2],
            DrawOp::DrawRect {
                rect: bar,
                color: Color::BAR
            }
        );
        assert_eq!(animator.previous, Some(target));
    }

    #[test]
    fn dead_band_suppresses_small_moves() {
        let mut animator = animator();
        animator.update(&sweep(8000)).unwrap();
        let first = animator.target_row(8000);
        let before = animator.lcd().op_count();

        // +-100 raw counts move the target by at most two rows
        animator.update(&sweep(8100)).unwrap();
        animator.update(&sweep(7900)).unwrap();

        assert_eq!(animator.lcd().op_count(), before);
        assert_eq!(animator.previous, Some(first));
    }

    #[test]
    fn shrink_erases_from_target_up_to_previous() {
        let mut animator = animator();
        // rows 50 and 60 for the default calibration on a 128 px panel
        assert_eq!(animator.target_row(8885), 50);
        assert_eq!(animator.target_row(8374), 60);

        animator.update(&sweep(8885)).unwrap();
        let before = animator.lcd().ops().len();
        animator.update(&sweep(8374)).unwrap();

        let ops = &animator.lcd().ops()[before..];
        assert_eq!(ops.len(), 11);
        for (i, op) in ops.iter().enumerate() {
            assert_eq!(
                *op,
                DrawOp::Hline {
                    x0: 0,
                    x1: WIDTH as i32,
                    y: 60 - i as i32,
                    color: Color::BACKGROUND,
                }
            );
        }
        assert_eq!(animator.previous, Some(60));
    }

    #[test]
    fn grow_fills_from_target_down_to_previous() {
        let mut animator = animator();
        animator.update(&sweep(8374)).unwrap(); // previous = 60
        let before = animator.lcd().ops().len();
        animator.update(&sweep(8885)).unwrap(); // target = 50, bar grows

        let ops = &animator.lcd().ops()[before..];
        assert_eq!(ops.len(), 11);
        for (i, op) in ops.iter().enumerate() {
            assert_eq!(
                *op,
                DrawOp::Hline {
                    x0: 0,
                    x1: WIDTH as i32,
                    y: 50 + i as i32,
                    color: Color::BAR,
                }
            );
        }
        assert_eq!(animator.previous, Some(50));
    }

    #[test]
    fn repeated_identical_samples_draw_once() {
        let mut animator = animator();
        animator.update(&sweep(9000)).unwrap();
        let after_first = animator.lcd().op_count();

        for _ in 0..32 {
            animator.update(&sweep(9000)).unwrap();
        }
        assert_eq!(animator.lcd().op_count(), after_first);
    }

    #[test]
    fn previous_tracks_last_redrawn_target() {
        let mut animator = animator();
        let mut seed = 0x2f6e_2b15u32;
        let mut expected: Option<i32> = None;

        for _ in 0..100 {
            // xorshift32
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            let raw = (seed % 16384) as u16;

            animator.update(&sweep(raw)).unwrap();

            let target = animator.target_row(raw);
            expected = match expected {
                Some(previous) if (target - previous).abs() <= DEAD_BAND => Some(previous),
                _ => Some(target),
            };
            assert_eq!(animator.previous, expected);
        }
    }
}
