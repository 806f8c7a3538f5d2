/// Errors surfaced by converter configuration. The running peripheral
/// itself reports nothing; only setup can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcError {
    // Channel id outside the converter's input range, or not strictly
    // ascending within the sweep
    InvalidChannel(u8),
    // The converter is already sweeping, or the requested reference is
    // not present on this part
    Unavailable,
}
