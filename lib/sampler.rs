use crate::error::AdcError;
use crate::hw::AdcPeripheral;

/// Result slot of a sweep. Doubles as the index into the conversion
/// buffer, which holds the slots in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

/// Readings of one complete sweep. All three values are mutually
/// consistent: the completion notification fires only after the last
/// channel of the sequence converts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleSet {
    pub x: u16,
    pub y: u16,
    pub z: u16,
}

/// Positive reference selection for the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    /// Analog supply rail.
    Vdda,
    /// Internal bandgap reference, where the part provides one.
    Internal,
}

/// One-time converter setup, fixed for the lifetime of the [Sampler].
pub struct AdcConfig {
    /// Input channel ids in X, Y, Z slot order. Must be strictly
    /// ascending: a sweep converts in ascending channel order and the
    /// result slots follow it.
    pub channels: [u8; 3],
    pub reference: Reference,
    /// Retrigger a new sweep automatically after each completed one.
    pub auto_repeat: bool,
}

impl AdcConfig {
    pub fn new(channels: [u8; 3], reference: Reference, auto_repeat: bool) -> Self {
        AdcConfig {
            channels,
            reference,
            auto_repeat,
        }
    }

    pub fn validate(&self, max_channel: u8) -> Result<(), AdcError> {
        let mut last = None;
        for &channel in &self.channels {
            if channel > max_channel {
                return Err(AdcError::InvalidChannel(channel));
            }
            if last.map_or(false, |previous| channel <= previous) {
                return Err(AdcError::InvalidChannel(channel));
            }
            last = Some(channel);
        }
        Ok(())
    }
}

/// Free-running three-channel digitizer. Applies the fixed configuration
/// once, then hands out one [SampleSet] per end-of-sweep notification.
#[derive(Debug)]
pub struct Sampler<A> {
    adc: A,
}

impl<A> Sampler<A>
where
    A: AdcPeripheral,
{
    pub fn new(adc: A, config: AdcConfig) -> Result<Self, AdcError> {
        let mut adc = adc;
        adc.configure(&config)?;
        Ok(Sampler { adc })
    }

    /// Begin converting. Sweeps run at the hardware-determined rate from
    /// here on; there is no stop path short of reset.
    pub fn start(&mut self) {
        self.adc.start();
    }

    /// Snapshot the current sweep. Call from the end-of-sweep
    /// notification; clears the pending flag first. A slow caller may
    /// see the next sweep landing in the result storage while reading,
    /// there is no backpressure from the converter.
    pub fn acquire(&mut self) -> SampleSet {
        self.adc.unpend();
        SampleSet {
            x: self.adc.result(Axis::X),
            y: self.adc.result(Axis::Y),
            z: self.adc.result(Axis::Z),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimAdc;

    fn config() -> AdcConfig {
        AdcConfig::new([0, 1, 6], Reference::Vdda, true)
    }

    #[test]
    fn configure_rejects_out_of_range_channel() {
        let cells = Default::default();
        let (adc, _stimulus) = SimAdc::new(&cells);
        let err = Sampler::new(adc, AdcConfig::new([0, 1, 19], Reference::Vdda, true)).unwrap_err();
        assert_eq!(err, AdcError::InvalidChannel(19));
    }

    #[test]
    fn configure_rejects_unordered_channels() {
        let cells = Default::default();
        let (adc, _stimulus) = SimAdc::new(&cells);
        let err = Sampler::new(adc, AdcConfig::new([4, 4, 6], Reference::Vdda, true)).unwrap_err();
        assert_eq!(err, AdcError::InvalidChannel(4));
    }

    #[test]
    fn configure_after_start_is_unavailable() {
        let cells = Default::default();
        let (mut adc, _stimulus) = SimAdc::new(&cells);
        adc.configure(&config()).unwrap();
        adc.start();
        assert_eq!(adc.configure(&config()), Err(AdcError::Unavailable));
    }

    #[test]
    fn acquire_snapshots_all_three_slots() {
        let cells = Default::default();
        let (adc, stimulus) = SimAdc::new(&cells);
        let mut sampler = Sampler::new(adc, config()).unwrap();
        sampler.start();

        stimulus.set(100, 200, 300);
        assert_eq!(
            sampler.acquire(),
            SampleSet {
                x: 100,
                y: 200,
                z: 300
            }
        );

        stimulus.set(101, 201, 301);
        assert_eq!(
            sampler.acquire(),
            SampleSet {
                x: 101,
                y: 201,
                z: 301
            }
        );
    }
}
