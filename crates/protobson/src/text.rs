//! Canonical text forms for booleans, numbers and durations.

use std::fmt;
use std::num::{IntErrorKind, ParseIntError};
use std::str::FromStr;

use thiserror::Error;

/// Error returned by [`parse_bool`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("parsing {input:?}: invalid boolean syntax")]
pub struct ParseBoolError {
    pub input: String,
}

/// Parses the canonical boolean spellings:
/// `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_bool(s: &str) -> Result<bool, ParseBoolError> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ParseBoolError {
            input: s.to_owned(),
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseNumberErrorKind {
    Syntax,
    Range,
}

impl fmt::Display for ParseNumberErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParseNumberErrorKind::Syntax => "invalid syntax",
            ParseNumberErrorKind::Range => "value out of range",
        })
    }
}

/// Error returned by the numeric parsers of this module.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("parsing {input:?}: {kind}")]
pub struct ParseNumberError {
    pub kind: ParseNumberErrorKind,
    pub input: String,
}

impl ParseNumberError {
    fn new(kind: ParseNumberErrorKind, input: &str) -> Self {
        Self {
            kind,
            input: input.to_owned(),
        }
    }
}

fn is_infinity_literal(s: &str) -> bool {
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

fn parse_float<T: FromStr + Into<f64> + Copy>(s: &str) -> Result<T, ParseNumberError> {
    let v: T = s
        .parse()
        .map_err(|_| ParseNumberError::new(ParseNumberErrorKind::Syntax, s))?;
    if v.into().is_infinite() && !is_infinity_literal(s) {
        return Err(ParseNumberError::new(ParseNumberErrorKind::Range, s));
    }
    Ok(v)
}

/// Parses a decimal float at single precision. Finite text that rounds to
/// infinity is a range error; `inf` and `infinity` spellings are accepted.
pub fn parse_f32(s: &str) -> Result<f32, ParseNumberError> {
    parse_float(s)
}

/// Parses a decimal float at double precision, with the range rules of
/// [`parse_f32`].
pub fn parse_f64(s: &str) -> Result<f64, ParseNumberError> {
    parse_float(s)
}

fn parse_unsigned<T: FromStr<Err = ParseIntError>>(s: &str) -> Result<T, ParseNumberError> {
    if s.starts_with('+') {
        return Err(ParseNumberError::new(ParseNumberErrorKind::Syntax, s));
    }
    s.parse().map_err(|e: ParseIntError| {
        let kind = match e.kind() {
            IntErrorKind::PosOverflow => ParseNumberErrorKind::Range,
            _ => ParseNumberErrorKind::Syntax,
        };
        ParseNumberError::new(kind, s)
    })
}

/// Parses unsigned decimal digits. Signs are rejected.
pub fn parse_u32(s: &str) -> Result<u32, ParseNumberError> {
    parse_unsigned(s)
}

/// Parses unsigned decimal digits. Signs are rejected.
pub fn parse_u64(s: &str) -> Result<u64, ParseNumberError> {
    parse_unsigned(s)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseDurationErrorKind {
    Invalid,
    MissingUnit,
    UnknownUnit,
}

/// Error returned by [`parse_duration`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub struct ParseDurationError {
    pub kind: ParseDurationErrorKind,
    pub input: String,
    pub unit: Option<String>,
}

impl ParseDurationError {
    fn new(kind: ParseDurationErrorKind, input: &str) -> Self {
        Self {
            kind,
            input: input.to_owned(),
            unit: None,
        }
    }
}

impl fmt::Display for ParseDurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, &self.unit) {
            (ParseDurationErrorKind::MissingUnit, _) => {
                write!(f, "missing unit in duration {:?}", self.input)
            }
            (ParseDurationErrorKind::UnknownUnit, Some(unit)) => {
                write!(f, "unknown unit {unit:?} in duration {:?}", self.input)
            }
            _ => write!(f, "invalid duration {:?}", self.input),
        }
    }
}

const NANOSECOND: u64 = 1;
const MICROSECOND: u64 = 1_000 * NANOSECOND;
const MILLISECOND: u64 = 1_000 * MICROSECOND;
const SECOND: u64 = 1_000 * MILLISECOND;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;

/// Magnitude limit: `-i64::MIN` as unsigned.
const LIMIT: u64 = 1 << 63;

fn unit_nanos(unit: &str) -> Option<u64> {
    Some(match unit {
        "ns" => NANOSECOND,
        // U+00B5 micro sign and U+03BC Greek small letter mu
        "us" | "\u{00b5}s" | "\u{03bc}s" => MICROSECOND,
        "ms" => MILLISECOND,
        "s" => SECOND,
        "m" => MINUTE,
        "h" => HOUR,
        _ => return None,
    })
}

/// Consumes leading decimal digits. `None` on overflow past [`LIMIT`].
fn leading_int(s: &str) -> Option<(u64, &str)> {
    let end = s.bytes().take_while(u8::is_ascii_digit).count();
    let mut x: u64 = 0;
    for c in s[..end].bytes() {
        if x > LIMIT / 10 {
            return None;
        }
        x = x * 10 + u64::from(c - b'0');
        if x > LIMIT {
            return None;
        }
    }
    Some((x, &s[end..]))
}

/// Consumes leading fraction digits, returning the digits read as an
/// integer, the power of ten they are scaled by and the rest. Digits past the
/// precision of a u64 are consumed but ignored.
fn leading_fraction(s: &str) -> (u64, f64, &str) {
    let end = s.bytes().take_while(u8::is_ascii_digit).count();
    let mut x: u64 = 0;
    let mut scale = 1.0;
    let mut overflow = false;
    for c in s[..end].bytes() {
        if overflow {
            continue;
        }
        if x > (LIMIT - 1) / 10 {
            overflow = true;
            continue;
        }
        let y = x * 10 + u64::from(c - b'0');
        if y > LIMIT {
            overflow = true;
            continue;
        }
        x = y;
        scale *= 10.0;
    }
    (x, scale, &s[end..])
}

/// Parses a duration string such as `"300ms"`, `"-1.5h"` or `"2h45m"` into
/// nanoseconds.
///
/// A duration is an optionally signed sequence of decimal numbers, each with
/// an optional fraction and a unit suffix. Valid units are `ns`, `us` (or
/// `µs`), `ms`, `s`, `m` and `h`.
pub fn parse_duration(input: &str) -> Result<i64, ParseDurationError> {
    use ParseDurationErrorKind::*;

    let invalid = || ParseDurationError::new(Invalid, input);
    let mut s = input;
    let mut neg = false;
    if let Some(rest) = s.strip_prefix('-') {
        neg = true;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }
    if s == "0" {
        return Ok(0);
    }
    if s.is_empty() {
        return Err(invalid());
    }

    let mut total: u64 = 0;
    while !s.is_empty() {
        let first = s.as_bytes()[0];
        if !(first == b'.' || first.is_ascii_digit()) {
            return Err(invalid());
        }

        let before = s.len();
        let (mut v, rest) = leading_int(s).ok_or_else(invalid)?;
        s = rest;
        let pre = before != s.len();

        let mut frac = 0;
        let mut scale = 1.0;
        let mut post = false;
        if let Some(rest) = s.strip_prefix('.') {
            let before = rest.len();
            let (f, sc, rest) = leading_fraction(rest);
            post = before != rest.len();
            frac = f;
            scale = sc;
            s = rest;
        }
        if !pre && !post {
            return Err(invalid());
        }

        let unit_len = s
            .bytes()
            .take_while(|c| *c != b'.' && !c.is_ascii_digit())
            .count();
        if unit_len == 0 {
            return Err(ParseDurationError::new(MissingUnit, input));
        }
        let (unit, rest) = s.split_at(unit_len);
        s = rest;
        let unit_ns = unit_nanos(unit).ok_or_else(|| ParseDurationError {
            unit: Some(unit.to_owned()),
            ..ParseDurationError::new(UnknownUnit, input)
        })?;

        if v > LIMIT / unit_ns {
            return Err(invalid());
        }
        v *= unit_ns;
        if frac > 0 {
            v += (frac as f64 * (unit_ns as f64 / scale)) as u64;
            if v > LIMIT {
                return Err(invalid());
            }
        }
        total = total.checked_add(v).filter(|t| *t <= LIMIT).ok_or_else(invalid)?;
    }

    if neg {
        return Ok((total as i64).wrapping_neg());
    }
    if total > LIMIT - 1 {
        return Err(invalid());
    }
    Ok(total as i64)
}

/// Formats the fractional part of `v / 10^prec`, without trailing zeros and
/// without the point when the fraction is zero.
fn split_fraction(v: u64, prec: u32) -> (u64, String) {
    let pow = 10u64.pow(prec);
    let (int, rem) = (v / pow, v % pow);
    if rem == 0 {
        return (int, String::new());
    }
    let digits = format!("{:0width$}", rem, width = prec as usize);
    (int, format!(".{}", digits.trim_end_matches('0')))
}

/// Formats nanoseconds in the form accepted by [`parse_duration`], e.g.
/// `"72h3m0.5s"`, `"1.5ms"`, `"0s"`. Leading zero units are omitted and
/// durations under one second use a smaller unit.
pub fn format_duration(nanos: i64) -> String {
    let neg = nanos < 0;
    let u = nanos.unsigned_abs();
    let mut out = String::new();
    if neg {
        out.push('-');
    }
    if u == 0 {
        return "0s".to_owned();
    }
    if u < SECOND {
        let (unit, prec) = if u < MICROSECOND {
            ("ns", 0)
        } else if u < MILLISECOND {
            ("\u{00b5}s", 3)
        } else {
            ("ms", 6)
        };
        let (int, frac) = split_fraction(u, prec);
        out.push_str(&format!("{int}{frac}{unit}"));
        return out;
    }
    let (secs, frac) = split_fraction(u, 9);
    let mins = secs / 60;
    if mins > 0 {
        let hours = mins / 60;
        if hours > 0 {
            out.push_str(&format!("{hours}h"));
        }
        out.push_str(&format!("{}m", mins % 60));
    }
    out.push_str(&format!("{}{frac}s", secs % 60));
    out
}
