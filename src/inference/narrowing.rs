//! Type narrowing
//!
//! The narrower turns a value into the candidate set it actually belongs
//! to, by attempting real conversions for every candidate the lexical scan
//! could not vouch for, and folds it into the accumulated set of a
//! declaration. Conversion failures only clear candidates; nothing here
//! returns an error.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;

use super::classifier::classify;
use super::lattice::{Primitive, TypeCandidate};
use super::options::TypeInference;

/// Members whose value space is checked by conversion, narrowest first
const RANGE_CHECKED: [Primitive; 16] = [
    Primitive::Byte,
    Primitive::UnsignedByte,
    Primitive::Short,
    Primitive::UnsignedShort,
    Primitive::Int,
    Primitive::UnsignedInt,
    Primitive::Long,
    Primitive::UnsignedLong,
    Primitive::Decimal,
    Primitive::Float,
    Primitive::Double,
    Primitive::DateTime,
    Primitive::Time,
    Primitive::Date,
    Primitive::GYearMonth,
    Primitive::Integer,
];

/// Candidate set of a single value after value-space checks
pub fn admissible(value: &str) -> TypeCandidate {
    let value = value.trim();
    let classification = classify(value);
    if !classification.needs_range_check {
        return classification.candidates;
    }

    let mut candidates = classification.candidates;
    for primitive in RANGE_CHECKED {
        if candidates.contains(primitive.flag()) && !fits(value, primitive) {
            candidates.remove(primitive.flag());
        }
    }
    candidates | TypeCandidate::STRING
}

/// Narrows declarations one observation at a time
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeNarrower {
    mode: TypeInference,
}

impl TypeNarrower {
    /// Create a narrower for the given type inference mode
    pub fn new(mode: TypeInference) -> Self {
        Self { mode }
    }

    /// Fold `value` into `accumulated` (`None` on the first observation)
    pub fn observe(&self, accumulated: Option<TypeCandidate>, value: &str) -> TypeCandidate {
        if self.mode == TypeInference::Relaxed {
            return TypeCandidate::STRING;
        }
        let observed = admissible(value);
        match accumulated {
            Some(acc) => acc.narrow(observed),
            None => observed,
        }
    }

    /// The type a candidate set stands for under this mode
    pub fn resolve(&self, candidates: TypeCandidate) -> Primitive {
        match self.mode {
            TypeInference::Relaxed => Primitive::String,
            TypeInference::Restricted => candidates.resolve(),
        }
    }

    /// Narrow a whole value history at once
    pub fn infer<'a>(&self, values: impl IntoIterator<Item = &'a str>) -> Primitive {
        let candidates = values
            .into_iter()
            .fold(None, |acc, v| Some(self.observe(acc, v)))
            .unwrap_or(TypeCandidate::STRING);
        self.resolve(candidates)
    }
}

fn fits(value: &str, primitive: Primitive) -> bool {
    match primitive {
        Primitive::Byte => value.parse::<i8>().is_ok(),
        Primitive::UnsignedByte => value.parse::<u8>().is_ok(),
        Primitive::Short => value.parse::<i16>().is_ok(),
        Primitive::UnsignedShort => value.parse::<u16>().is_ok(),
        Primitive::Int => value.parse::<i32>().is_ok(),
        Primitive::UnsignedInt => value.parse::<u32>().is_ok(),
        Primitive::Long => value.parse::<i64>().is_ok(),
        Primitive::UnsignedLong => value.parse::<u64>().is_ok(),
        Primitive::Decimal => value.parse::<Decimal>().is_ok(),
        Primitive::Float => fits_single_precision(value),
        Primitive::Double => value.parse::<f64>().is_ok_and(f64::is_finite),
        Primitive::Date => parse_date(strip_timezone(value)).is_some(),
        Primitive::Time => parse_time(strip_timezone(value)).is_some(),
        Primitive::DateTime => strip_timezone(value)
            .split_once('T')
            .is_some_and(|(d, t)| parse_date(d).is_some() && parse_time(t).is_some()),
        Primitive::GYearMonth => parse_year_month(strip_timezone(value)).is_some(),
        // Unbounded, or fully decided by the lexical scan
        Primitive::Integer
        | Primitive::Boolean
        | Primitive::Duration
        | Primitive::String => true,
    }
}

/// The value survives a round trip through `f32` unchanged
fn fits_single_precision(value: &str) -> bool {
    let (Ok(single), Ok(double)) = (value.parse::<f32>(), value.parse::<f64>()) else {
        return false;
    };
    single.is_finite() && f64::from(single) == double
}

/// Drop a trailing `Z` or `±hh:mm`; an out of range offset leaves it in
/// place so the following parse fails.
fn strip_timezone(value: &str) -> &str {
    if let Some(rest) = value.strip_suffix('Z') {
        return rest;
    }
    let bytes = value.as_bytes();
    let n = bytes.len();
    if n >= 6 && matches!(bytes[n - 6], b'+' | b'-') && bytes[n - 3] == b':' {
        let hours = value[n - 5..n - 3].parse::<u32>().ok();
        let minutes = value[n - 2..].parse::<u32>().ok();
        if let (Some(h), Some(m)) = (hours, minutes) {
            if (h < 14 && m < 60) || (h == 14 && m == 0) {
                return &value[..n - 6];
            }
        }
    }
    value
}

/// `-?YYYY-MM` with year 0 excluded
fn parse_year_month(value: &str) -> Option<(i32, u32)> {
    let (negative, digits) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value),
    };
    let (year, month) = digits.split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    if year == 0 || !(1..=12).contains(&month) {
        return None;
    }
    Some((if negative { -year } else { year }, month))
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let (head, day) = value.rsplit_once('-')?;
    let (year, month) = parse_year_month(head)?;
    NaiveDate::from_ymd_opt(year, month, day.parse().ok()?)
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    let whole = value.split_once('.').map_or(value, |(w, _)| w);
    let mut parts = whole.split(':').map(|p| p.parse::<u32>().ok());
    let (Some(Some(h)), Some(Some(m)), Some(Some(s)), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };
    // 24:00:00 is the end of day in XSD 1.0
    if h == 24 && m == 0 && s == 0 {
        return NaiveTime::from_hms_opt(0, 0, 0);
    }
    NaiveTime::from_hms_opt(h, m, s)
}
