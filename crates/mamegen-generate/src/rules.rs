//! Pure per-cell value producers.
//!
//! Everything here draws from the caller's RNG and returns a `CellValue`;
//! the engine owns evaluation order and per-column state.

use chrono::{Duration, NaiveDate, NaiveTime};
use rand::Rng;

use mamegen_core::{CellValue, DateKind, DateSpec, RangeSpec, SeqSpec};

/// Pool used when `length` appears without a `charset`.
pub const DEFAULT_POOL: &str =
    "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Length used when `charset` appears without a `length`.
pub const DEFAULT_LENGTH: usize = 8;

/// Anchor for date draws without explicit bounds; the default window is
/// one year from this date.
pub const BASE_DATE: (i32, u32, u32) = (2024, 1, 1);

/// Advance a sequence counter and format the emitted value.
///
/// `counter` holds the next value to emit, or `None` before the first
/// draw. Past `end` the counter wraps back to `start`.
pub fn next_seq(spec: &SeqSpec, counter: &mut Option<i64>) -> CellValue {
    let current = counter.unwrap_or(spec.start);
    let next = current.saturating_add(spec.step);
    *counter = Some(if next > spec.end { spec.start } else { next });
    match spec.digits {
        Some(width) => CellValue::Text(format!("{current:0width$}", width = width as usize)),
        None => CellValue::Int(current),
    }
}

/// Draw an n-length string uniformly with replacement from `pool`.
pub fn random_string(pool: &str, length: usize, rng: &mut impl Rng) -> CellValue {
    let chars: Vec<char> = pool.chars().collect();
    let mut out = String::with_capacity(length);
    for _ in 0..length {
        out.push(chars[rng.gen_range(0..chars.len())]);
    }
    CellValue::Text(out)
}

/// Inclusive numeric draw; floats are rounded to 6 decimals.
pub fn random_in_range(range: &RangeSpec, rng: &mut impl Rng) -> CellValue {
    match range {
        RangeSpec::Int(lo, hi) => CellValue::Int(rng.gen_range(*lo..=*hi)),
        RangeSpec::Float(lo, hi) => {
            let value = rng.gen_range(*lo..=*hi);
            CellValue::Float((value * 1e6).round() / 1e6)
        }
    }
}

/// Uniform pick from an enum list.
pub fn random_choice(choices: &[CellValue], rng: &mut impl Rng) -> CellValue {
    choices[rng.gen_range(0..choices.len())].clone()
}

/// Inclusive date (or timestamp) draw over the spec's window.
pub fn random_date(spec: &DateSpec, rng: &mut impl Rng) -> CellValue {
    let base = base_date();
    let start = spec.start.unwrap_or(base);
    let end = spec.end.unwrap_or(base + Duration::days(365));
    match spec.kind {
        DateKind::Date => {
            let span = (end - start).num_days().max(0);
            let date = start + Duration::days(rng.gen_range(0..=span));
            let format = dt_format(spec.format.as_deref().unwrap_or("YYYY-MM-DD"));
            CellValue::Text(date.format(&format).to_string())
        }
        DateKind::DateTime => {
            let midnight = NaiveTime::from_hms_opt(0, 0, 0).unwrap_or_default();
            let day_end = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default();
            let lo = start.and_time(midnight);
            let hi = end.and_time(day_end);
            let span = (hi - lo).num_seconds().max(0);
            let moment = lo + Duration::seconds(rng.gen_range(0..=span));
            let format = spec
                .format
                .as_deref()
                .map(dt_format)
                .unwrap_or_else(|| "%Y-%m-%dT%H:%M:%S".to_string());
            CellValue::Text(moment.format(&format).to_string())
        }
    }
}

fn base_date() -> NaiveDate {
    let (year, month, day) = BASE_DATE;
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// Convert placeholder format (`YYYY-MM-DD HH:mm:ss`) to a chrono format
/// string. Replacement order keeps minutes (`mm`) and months (`MM`) apart.
pub fn dt_format(placeholder: &str) -> String {
    placeholder
        .replace("YYYY", "%Y")
        .replace("HH", "%H")
        .replace("mm", "%M")
        .replace("MM", "%m")
        .replace("DD", "%d")
        .replace("ss", "%S")
}
