#![cfg_attr(not(test), no_std)]

#[cfg(feature = "hw")]
use core::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "hw")]
use defmt_rtt as _; // global logger
#[cfg(feature = "hw")]
use panic_probe as _;

pub mod animator;
pub mod error;
pub mod hw;
pub mod sampler;
pub mod sim;

/// DMA destination for one three-channel sweep, slot order X, Y, Z.
pub type Buffer = [u16; 3];

#[cfg(feature = "hw")]
static COUNT: AtomicUsize = AtomicUsize::new(0);
#[cfg(feature = "hw")]
defmt::timestamp!("{=usize}", {
    let n = COUNT.load(Ordering::Relaxed);
    COUNT.store(n + 1, Ordering::Relaxed);
    n
});

/// Terminates the application and makes `probe-run` exit with exit-code = 0
#[cfg(feature = "hw")]
pub fn exit() -> ! {
    loop {
        cortex_m::asm::bkpt();
    }
}
