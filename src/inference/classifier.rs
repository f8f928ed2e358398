//! Lexical classification of leaf values
//!
//! [`classify`] looks only at the shape of a value: which lattice members
//! have a lexical space the value belongs to. Whether the value also fits
//! a member's value space (an integer that overflows `byte`, a date like
//! `2024-02-30`) is settled later by the narrower, which is why numeric and
//! temporal forms come back with `needs_range_check` set.
//!
//! The scan is a hand-written cursor over the bytes of the value; every
//! grammar below is ASCII-only, so anything non-ASCII lands in `string`.

use super::lattice::{Primitive, TypeCandidate};

/// Result of classifying one value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Members whose lexical space contains the value (always includes string)
    pub candidates: TypeCandidate,
    /// Value-space conversions must confirm some candidates
    pub needs_range_check: bool,
}

impl Classification {
    fn lexical(candidates: TypeCandidate) -> Self {
        Self {
            candidates: candidates | TypeCandidate::STRING,
            needs_range_check: false,
        }
    }

    fn checked(candidates: TypeCandidate) -> Self {
        Self {
            candidates: candidates | TypeCandidate::STRING,
            needs_range_check: true,
        }
    }

    fn string() -> Self {
        Self::lexical(TypeCandidate::STRING)
    }
}

/// Classify a value by its lexical form. Surrounding whitespace is ignored.
pub fn classify(value: &str) -> Classification {
    let value = value.trim();
    if value.is_empty() {
        return Classification::string();
    }

    match value {
        "true" | "false" => return Classification::lexical(TypeCandidate::BOOLEAN),
        "NaN" | "INF" | "-INF" => return Classification::lexical(TypeCandidate::FLOATING),
        _ => {}
    }

    if let Some(number) = scan_number(value) {
        let candidates = if number.exponent {
            TypeCandidate::FLOATING
        } else if number.fraction {
            TypeCandidate::DECIMAL | TypeCandidate::FLOATING
        } else {
            TypeCandidate::INTEGERS | TypeCandidate::DECIMAL | TypeCandidate::FLOATING
        };
        return Classification::checked(candidates);
    }

    if scan_duration(value) {
        return Classification::lexical(TypeCandidate::DURATION);
    }

    if let Some(temporal) = scan_temporal(value) {
        return Classification::checked(temporal.flag());
    }

    Classification::string()
}

/// Byte cursor over an ASCII grammar
#[derive(Debug, Clone, Copy)]
struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(value: &'a str) -> Self {
        Self {
            bytes: value.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_sign(&mut self) -> bool {
        self.eat(b'-') || self.eat(b'+')
    }

    /// Consume a run of digits, returning its length
    fn digits(&mut self) -> usize {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn exact_digits(&mut self, n: usize) -> bool {
        let save = self.pos;
        if self.digits() == n {
            true
        } else {
            self.pos = save;
            false
        }
    }

    fn at_end(&self) -> bool {
        self.pos == self.bytes.len()
    }

    /// Optional `Z` or `±hh:mm` suffix
    fn timezone(&mut self) -> bool {
        if self.eat(b'Z') {
            return true;
        }
        let save = self.pos;
        if self.eat_sign() && self.exact_digits(2) && self.eat(b':') && self.exact_digits(2) {
            return true;
        }
        self.pos = save;
        false
    }

    /// `hh:mm:ss(.s+)?`
    fn time_of_day(&mut self) -> bool {
        if !(self.exact_digits(2)
            && self.eat(b':')
            && self.exact_digits(2)
            && self.eat(b':')
            && self.exact_digits(2))
        {
            return false;
        }
        if self.eat(b'.') && self.digits() == 0 {
            return false;
        }
        true
    }
}

/// Shape of a numeric literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NumberShape {
    fraction: bool,
    exponent: bool,
}

/// `[+-]? (d+ (. d*)? | . d+) ([eE] [+-]? d+)?`
fn scan_number(value: &str) -> Option<NumberShape> {
    let mut s = Scanner::new(value);
    s.eat_sign();

    let int_digits = s.digits();
    let mut fraction = false;
    let mut frac_digits = 0;
    if s.eat(b'.') {
        fraction = true;
        frac_digits = s.digits();
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    let mut exponent = false;
    if s.eat(b'e') || s.eat(b'E') {
        s.eat_sign();
        if s.digits() == 0 {
            return None;
        }
        exponent = true;
    }

    s.at_end().then_some(NumberShape { fraction, exponent })
}

/// `-?P(nY)?(nM)?(nD)?(T(nH)?(nM)?(n(.n)?S)?)?` with at least one component
fn scan_duration(value: &str) -> bool {
    let mut s = Scanner::new(value);
    s.eat(b'-');
    if !s.eat(b'P') {
        return false;
    }

    let mut components = 0;
    let mut designators: &[u8] = b"YMD";
    while s.digits() > 0 {
        let Some(d) = s.bump() else {
            return false;
        };
        match designators.iter().position(|&x| x == d) {
            Some(i) => designators = &designators[i + 1..],
            None => return false,
        }
        components += 1;
    }

    if s.eat(b'T') {
        let mut time_components = 0;
        let mut designators: &[u8] = b"HMS";
        while s.digits() > 0 {
            if s.eat(b'.') {
                // Only seconds take a fraction
                if s.digits() == 0 || !s.eat(b'S') || !designators.contains(&b'S') {
                    return false;
                }
                designators = &[];
                time_components += 1;
                continue;
            }
            let Some(d) = s.bump() else {
                return false;
            };
            match designators.iter().position(|&x| x == d) {
                Some(i) => designators = &designators[i + 1..],
                None => return false,
            }
            time_components += 1;
        }
        if time_components == 0 {
            return false;
        }
        components += time_components;
    }

    components > 0 && s.at_end()
}

/// Date, time, dateTime and gYearMonth forms
fn scan_temporal(value: &str) -> Option<Primitive> {
    let mut s = Scanner::new(value);

    // time: hh:mm:ss
    if value.as_bytes().get(2) == Some(&b':') {
        return (s.time_of_day() && tail(&mut s)).then_some(Primitive::Time);
    }

    // -?YYYY-MM
    s.eat(b'-');
    if s.digits() < 4 || !s.eat(b'-') || !s.exact_digits(2) {
        return None;
    }

    // -DD would be ambiguous with a -hh:mm offset on a gYearMonth
    let mut date = s;
    if date.eat(b'-') && date.exact_digits(2) {
        if date.eat(b'T') {
            return (date.time_of_day() && tail(&mut date)).then_some(Primitive::DateTime);
        }
        if tail(&mut date) {
            return Some(Primitive::Date);
        }
    }

    tail(&mut s).then_some(Primitive::GYearMonth)
}

/// Optional timezone, then end of input
fn tail(s: &mut Scanner<'_>) -> bool {
    s.timezone();
    s.at_end()
}
