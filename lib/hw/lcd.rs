use core::convert::Infallible;
use display_interface_parallel_gpio::WriteOnlyDataCommand;
use embedded_graphics::drawable::Drawable;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::{Point, Primitive, Size};
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::style::PrimitiveStyle;
use embedded_graphics::DrawTarget;
use ili9341::{DisplaySize240x320, Error, Ili9341, Orientation};
use stm32g0xx_hal::hal::blocking::delay::DelayMs;
use stm32g0xx_hal::hal::digital::v2::OutputPin;

use crate::hw::Lcd;

#[derive(Debug)]
pub struct IliError(pub Error<Infallible>);

pub struct IliLcd<I, R> {
    ili: Ili9341<I, R>,
}

impl<I, R> IliLcd<I, R>
where
    I: WriteOnlyDataCommand,
    R: OutputPin<Error = Infallible>,
{
    pub fn new<D>(interface: I, reset: R, delay: &mut D) -> Result<Self, IliError>
    where
        D: DelayMs<u16>,
    {
        let ili = Ili9341::new(
            interface,
            reset,
            delay,
            Orientation::Portrait,
            DisplaySize240x320,
        )
        .map_err(IliError)?;

        Ok(IliLcd { ili })
    }

    fn draw<D: Drawable<Rgb565>>(&mut self, drawable: D) -> Result<(), IliError> {
        drawable.draw(&mut self.ili).map_err(IliError)
    }
}

impl<I, R> Lcd for IliLcd<I, R>
where
    I: WriteOnlyDataCommand,
    R: OutputPin<Error = Infallible>,
{
    type Error = IliError;

    fn size(&self) -> Size {
        Size::new(self.ili.width() as u32, self.ili.height() as u32)
    }

    fn clear(&mut self, color: Rgb565) -> Result<(), Self::Error> {
        self.ili.clear(color).map_err(IliError)
    }

    fn fill_rect(&mut self, rect: Rectangle, color: Rgb565) -> Result<(), Self::Error> {
        self.draw(rect.into_styled(PrimitiveStyle::with_fill(color)))
    }

    fn draw_rect(&mut self, rect: Rectangle, color: Rgb565) -> Result<(), Self::Error> {
        self.draw(rect.into_styled(PrimitiveStyle::with_stroke(color, 1)))
    }

    fn draw_hline(&mut self, x0: i32, x1: i32, y: i32, color: Rgb565) -> Result<(), Self::Error> {
        let line = Rectangle::new(Point::new(x0, y), Point::new(x1, y));
        self.draw(line.into_styled(PrimitiveStyle::with_fill(color)))
    }
}
