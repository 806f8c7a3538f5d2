#![no_main]
#![no_std]

use lib as _;

use cortex_m::singleton;
use lib::animator::{Animator, Calibration};
use lib::hw::{init_clock, init_lcd, Adc, HwLcd, LcdInterface, ACCEL_CHANNELS};
use lib::sampler::{AdcConfig, Reference, Sampler};
use rtic::app;
use stm32g0xx_hal::delay::DelayExt;
use stm32g0xx_hal::dma::DmaExt;
use stm32g0xx_hal::dmamux::DmaMuxIndex;
use stm32g0xx_hal::gpio::{GpioExt, Speed};
use stm32g0xx_hal::time::U32Ext;

#[app(device = stm32g0xx_hal::stm32, peripherals = true)]
const APP: () = {
    struct Resources {
        sampler: Sampler<Adc>,
        animator: Animator<HwLcd>,
    }

    #[init]
    fn init(cx: init::Context) -> init::LateResources {
        let core: rtic::export::Peripherals = cx.core;
        let device: stm32g0xx_hal::stm32::Peripherals = cx.device;

        // Sweep result storage, written by DMA and read by the handler
        let sweep_buffer: &'static mut [u16; 3] = singleton!(: [u16; 3] = [0; 3]).unwrap();

        // Clock
        let mut rcc = init_clock(device.RCC);
        let mut delay = core.SYST.delay(&mut rcc);

        // GPIO
        let gpioa = device.GPIOA.split(&mut rcc);
        let gpiob = device.GPIOB.split(&mut rcc);

        // LCD
        let interface = LcdInterface::new(
            gpiob.pb0.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb1.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb2.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb3.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb4.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb5.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb6.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb7.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb8.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb9.into_push_pull_output().set_speed(Speed::VeryHigh),
        );
        let lcd = init_lcd(
            interface,
            gpioa.pa4.into_push_pull_output(),
            gpioa.pa5.into_push_pull_output(),
            &mut delay,
        )
        .unwrap();
        let animator = Animator::new(lcd, Calibration::default()).unwrap();

        // ADC
        let dma = device.DMA.split(&mut rcc, device.DMAMUX);
        let mut ch1 = dma.ch1;
        ch1.mux().select_peripheral(DmaMuxIndex::ADC);
        let adc = Adc::new(
            device.ADC,
            device.TIM1,
            sweep_buffer,
            (gpioa.pa0, gpioa.pa1, gpioa.pa6),
            ch1,
            100.hz(),
            &mut rcc,
            &mut delay,
        );
        let sampler = Sampler::new(
            adc,
            AdcConfig::new(ACCEL_CHANNELS, Reference::Vdda, true),
        )
        .unwrap();

        init::LateResources { sampler, animator }
    }

    #[idle(resources = [sampler])]
    fn idle(mut cx: idle::Context) -> ! {
        cx.resources.sampler.lock(|sampler: &mut Sampler<Adc>| {
            sampler.start();
        });
        loop {
            cortex_m::asm::wfi();
        }
    }

    #[task(binds = DMA_CHANNEL1, priority = 2, resources = [sampler, animator])]
    fn sweep(cx: sweep::Context) {
        let sampler: &mut Sampler<Adc> = cx.resources.sampler;
        let animator: &mut Animator<HwLcd> = cx.resources.animator;

        let samples = sampler.acquire();
        animator.update(&samples).unwrap();
    }
};
