use stm32g0xx_hal::analog::adc::Adc as HalAdc;
use stm32g0xx_hal::dma::{Channel as DmaChannel, Direction, Event, Priority, WordSize};
use stm32g0xx_hal::hal::adc::Channel as AdcChannel;
use stm32g0xx_hal::hal::blocking::delay::DelayUs;
use stm32g0xx_hal::rcc::Rcc;
use stm32g0xx_hal::stm32g0::stm32g070::{ADC, RCC, SYST, TIM1};
use stm32g0xx_hal::time::Hertz;
use stm32g0xx_hal::timer::delay::Delay;

use crate::error::AdcError;
use crate::hw::timers::SampleTimer;
use crate::hw::AdcPeripheral;
use crate::sampler::{AdcConfig, Axis, Reference};
use crate::Buffer;

// Highest input channel id of the stm32g070 converter
const MAX_CHANNEL: u8 = 18;

pub struct Adc<I1, I2, I3, C> {
    adc: InnerAdc<I1, I2, I3>,
    dma: Dma<C>,
    trig: SampleTimer,
    buffer: &'static Buffer,
    auto_repeat: bool,
    running: bool,
}

impl<I1, I2, I3, C> Adc<I1, I2, I3, C>
where
    I1: AdcChannel<HalAdc, ID = u8>,
    I2: AdcChannel<HalAdc, ID = u8>,
    I3: AdcChannel<HalAdc, ID = u8>,
    C: DmaChannel,
{
    pub fn new(
        pac_adc: ADC,
        pac_timer: TIM1,
        buffer: &'static mut Buffer,
        inputs: (I1, I2, I3),
        dma_channel: C,
        frequency: Hertz,
        rcc: &mut Rcc,
        delay: &mut Delay<SYST>,
    ) -> Self {
        let adc = InnerAdc::new(pac_adc, inputs, rcc, delay);
        let memory_addr = buffer.as_ptr() as u32;
        let dma = Dma::new(
            dma_channel,
            InnerAdc::<I1, I2, I3>::get_dma_address(),
            memory_addr,
            buffer.len() as u16,
        );
        let trig = SampleTimer::new(pac_timer, frequency, rcc);
        Adc {
            adc,
            dma,
            trig,
            buffer,
            auto_repeat: false,
            running: false,
        }
    }
}

impl<I1, I2, I3, C> AdcPeripheral for Adc<I1, I2, I3, C>
where
    I1: AdcChannel<HalAdc, ID = u8>,
    I2: AdcChannel<HalAdc, ID = u8>,
    I3: AdcChannel<HalAdc, ID = u8>,
    C: DmaChannel,
{
    fn configure(&mut self, config: &AdcConfig) -> Result<(), AdcError> {
        if self.running {
            return Err(AdcError::Unavailable);
        }
        config.validate(MAX_CHANNEL)?;
        if config.reference == Reference::Internal {
            // the g070 converts against Vdda only
            return Err(AdcError::Unavailable);
        }
        self.auto_repeat = config.auto_repeat;
        self.adc.configure(config);
        Ok(())
    }

    fn start(&mut self) {
        self.adc.start();
        self.dma.start();
        if self.auto_repeat {
            self.trig.start();
        }
        self.running = true;
    }

    fn unpend(&mut self) {
        self.dma.unpend();
    }

    fn result(&self, axis: Axis) -> u16 {
        // DMA keeps writing behind this read; a handler slower than the
        // sweep rate sees the next sweep landing here
        self.buffer[axis as usize]
    }
}

struct Dma<C> {
    channel: C,
}

impl<C> Dma<C>
where
    C: DmaChannel,
{
    pub fn new(channel: C, peripheral_addr: u32, memory_addr: u32, len: u16) -> Self {
        let mut dma = Dma { channel };
        dma.configure(peripheral_addr, memory_addr, len);
        dma
    }

    pub fn start(&mut self) {
        self.channel.clear_event(Event::TransferComplete);
        self.channel.listen(Event::TransferComplete);
        self.channel.enable();
    }

    pub fn unpend(&mut self) {
        self.channel.clear_event(Event::TransferComplete);
    }

    fn configure(&mut self, peripheral_addr: u32, memory_addr: u32, len: u16) {
        self.channel.set_priority_level(Priority::VeryHigh);
        self.channel.set_word_size(WordSize::BITS16);
        self.channel.set_direction(Direction::FromPeripheral);
        self.channel.set_peripheral_address(peripheral_addr, false);
        self.channel.set_memory_address(memory_addr, true);
        self.channel.set_transfer_length(len);
        self.channel.set_circular_mode(true);
    }
}

struct InnerAdc<I1, I2, I3> {
    adc: ADC,
    _inputs: (I1, I2, I3),
}

impl<I1, I2, I3> InnerAdc<I1, I2, I3>
where
    I1: AdcChannel<HalAdc, ID = u8>,
    I2: AdcChannel<HalAdc, ID = u8>,
    I3: AdcChannel<HalAdc, ID = u8>,
{
    pub fn new<D: DelayUs<u8>>(pac_adc: ADC, inputs: (I1, I2, I3), rcc: &mut Rcc, delay: &mut D) -> Self {
        InnerAdc::<I1, I2, I3>::enable_clock_and_reset(rcc);
        let mut adc = InnerAdc {
            adc: pac_adc,
            _inputs: inputs,
        };
        adc.disable();
        adc.enable_vreg(delay);
        adc.calibrate();
        adc.enable();
        adc
    }

    pub fn start(&mut self) {
        self.adc.isr.write(|w| {
            w.eoc().set_bit();
            w.eos().set_bit()
        });
        self.adc.cr.modify(|_, w| w.adstart().set_bit());
    }

    pub fn get_dma_address() -> u32 {
        unsafe { &(*ADC::ptr()).dr as *const _ as u32 }
    }

    fn configure(&mut self, config: &AdcConfig) {
        self.adc.cfgr1.write(|w| unsafe {
            if config.auto_repeat {
                // TIM1 TRGO rising edge retriggers each sweep
                w.exten().bits(0b01);
                w.extsel().bits(0b001);
            }
            // Right alignment
            w.align().clear_bit();
            // 12-bit resolution
            w.res().bits(0b00);
            // Circular DMA
            w.dmacfg().set_bit();
            // Enable DMA requests
            w.dmaen().set_bit()
        });
        // 16x oversampling shifted by 2 accumulates the 12-bit
        // conversions into a 14-bit result, the domain the tilt
        // calibration is expressed in
        self.adc.cfgr2.write(|w| unsafe {
            w.ovse().set_bit();
            w.ovsr().bits(0b011);
            w.ovss().bits(0b0010)
        });
        // 160.5 cycles for the best precision
        self.adc.smpr.write(|w| unsafe { w.smp1().bits(0b111) });
        // Select the three sweep channels; conversion follows ascending
        // channel order, which the config validated
        let mask = config
            .channels
            .iter()
            .fold(0u32, |acc, &channel| acc | 1 << channel);
        self.adc.chselr().write(|w| unsafe { w.chsel().bits(mask) });
    }

    fn enable_clock_and_reset(_: &mut Rcc) {
        let rcc = unsafe { &(*RCC::ptr()) };
        rcc.apbenr2.modify(|_, w| w.adcen().set_bit());
        rcc.apbrstr2.modify(|_, w| w.adcrst().set_bit());
        rcc.apbrstr2.modify(|_, w| w.adcrst().clear_bit());
    }

    fn enable_vreg<D: DelayUs<u8>>(&mut self, delay: &mut D) {
        self.adc.cr.modify(|_, w| w.advregen().set_bit());
        // Max starting time declared by stm32g070 datasheet is 20 us
        delay.delay_us(20);
    }

    fn enable(&mut self) {
        self.adc.isr.write(|w| w.adrdy().set_bit());
        self.adc.cr.modify(|_, w| w.aden().set_bit());
        while self.adc.isr.read().adrdy().bit_is_clear() {}
    }

    fn disable(&mut self) {
        let cr = self.adc.cr.read();
        if cr.aden().bit_is_clear() {
            return;
        }
        if cr.adstart().bit_is_set() {
            self.adc.cr.modify(|_, w| w.adstp().set_bit());
        }
        self.adc.cr.modify(|_, w| w.addis().set_bit());
        while self.adc.cr.read().aden().bit_is_set() {}
        self.adc.isr.write(|w| w.adrdy().set_bit());
    }

    fn calibrate(&mut self) {
        self.adc.cr.modify(|_, w| w.adcal().set_bit());
        while self.adc.isr.read().eocal().bit_is_clear() {}
        self.adc.isr.write(|w| w.eocal().set_bit());
    }
}
