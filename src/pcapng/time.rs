use crate::record::TimeUnit;

/// Map an `if_tsresol` value to a supported time unit
///
/// Only `10^-6` and `10^-9` are supported. Returns `None` for every other value,
/// including the power-of-two resolutions (high bit set).
pub fn time_unit_from_tsresol(ts_resol: u8) -> Option<TimeUnit> {
    match ts_resol {
        6 => Some(TimeUnit::Microseconds),
        9 => Some(TimeUnit::Nanoseconds),
        _ => None,
    }
}

/// Given the timestamp parameters, return the timestamp seconds and fractional part (in `unit`)
pub fn build_ts(ts_high: u32, ts_low: u32, unit: TimeUnit) -> (u32, u32) {
    let resolution = unit.units_per_sec();
    let ts: u64 = ((ts_high as u64) << 32) | (ts_low as u64);
    let ts_sec = (ts / resolution) as u32;
    let ts_fractional = (ts % resolution) as u32;
    (ts_sec, ts_fractional)
}
