use stm32g0xx_hal::hal::PwmPin as PwmPinTrait;
use stm32g0xx_hal::rcc::Rcc;
use stm32g0xx_hal::stm32g0::stm32g070::TIM1;
use stm32g0xx_hal::time::Hertz;
use stm32g0xx_hal::timer::pins::TimerPin;
use stm32g0xx_hal::timer::pwm::{Pwm, PwmExt, PwmPin};
use stm32g0xx_hal::timer::Channel4;

struct UnusedPin;

impl TimerPin<TIM1> for UnusedPin {
    type Channel = Channel4;

    fn setup(&self) {
        // Do nothing
    }

    fn release(self) -> Self {
        self
    }
}

/// Paces the converter: each PWM period fires the external trigger that
/// starts the next sweep.
pub struct SampleTimer {
    _timer: Pwm<TIM1>,
    trig: PwmPin<TIM1, Channel4>,
}

impl SampleTimer {
    pub fn new(pac_timer: TIM1, freq: Hertz, rcc: &mut Rcc) -> Self {
        let timer = pac_timer.pwm(freq, rcc);
        let trig = timer.bind_pin(UnusedPin);
        SampleTimer {
            _timer: timer,
            trig,
        }
    }

    pub fn start(&mut self) {
        self.trig.set_duty(self.trig.get_max_duty() / 2);
        self.trig.enable();
    }
}
