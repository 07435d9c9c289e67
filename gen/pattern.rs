//! Bit pattern decomposition.
//!
//! A pattern describes one 16-bit half-word of an encoding, most significant
//! bit first. `0` and `1` are fixed bits and `x` marks a bit that is not
//! constrained by the pattern:
//!
//! ```text
//! 0001xxxx1xxxxx10
//! ^^^^    ^     ^^
//! |       |     bits 1..0 == 0b10
//! |       bit 7 == 1
//! bits 15..12 == 0b0001
//! ```
//!
//! Every maximal run of fixed bits becomes one predicate. Single bit runs are
//! reported as [`Check::Bit`], longer runs as [`Check::Range`].

use std::fmt;

use serde::Serialize;

use crate::error::PatternError;

/// Number of characters in a pattern string.
pub const WIDTH: usize = 16;

/// Don't-care marker.
pub const DONT_CARE: char = 'x';

/// Half-word a predicate applies to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Half {
    Lo,
    Hi,
}

impl fmt::Display for Half {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(match self {
            Self::Lo => "lo",
            Self::Hi => "hi",
        })
    }
}

/// Maximal run of fixed bits, `start` and `end` are string indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitRun {
    pub start: usize,
    pub end: usize,
    pub literal: String,
}

impl BitRun {
    fn new(pattern: &str, start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            literal: pattern[start..=end].to_owned(),
        }
    }

    pub fn width(&self) -> usize {
        self.end - self.start + 1
    }

    /// Bit position of the first character of the run.
    pub fn high(&self) -> u32 {
        (WIDTH - 1 - self.start) as u32
    }

    /// Bit position of the last character of the run.
    pub fn low(&self) -> u32 {
        (WIDTH - 1 - self.end) as u32
    }

    pub fn predicate(&self, half: Half) -> Predicate {
        let check = if self.width() == 1 {
            Check::Bit {
                bit: self.high(),
                value: self.literal == "1",
            }
        } else {
            Check::Range {
                high: self.high(),
                low: self.low(),
                literal: self.literal.clone(),
            }
        };
        Predicate { half, check }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Check {
    /// Single bit equality.
    Bit { bit: u32, value: bool },
    /// Equality of bits `high..=low` with `literal`, most significant first.
    Range {
        high: u32,
        low: u32,
        literal: String,
    },
}

impl Check {
    /// Returns `(mask, value)` for the checked bits.
    pub fn mask(&self) -> (u16, u16) {
        match self {
            Self::Bit { bit, value } => (1 << bit, (*value as u16) << bit),
            Self::Range { high, low, literal } => {
                let len = high - low + 1;
                let mask = (u32::MAX >> (32 - len)) << low;
                let value = u32::from_str_radix(literal, 2).unwrap_or(0) << low;
                (mask as u16, value as u16)
            }
        }
    }

    /// Range checks covering the whole half-word.
    pub fn is_full(&self) -> bool {
        matches!(self, Self::Range { high, low, .. } if *high as usize == WIDTH - 1 && *low == 0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Predicate {
    pub half: Half,
    #[serde(flatten)]
    pub check: Check,
}

impl Predicate {
    pub fn matches(&self, lo: u16, hi: u16) -> bool {
        let raw = match self.half {
            Half::Lo => lo,
            Half::Hi => hi,
        };
        let (mask, value) = self.check.mask();
        raw & mask == value
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match &self.check {
            Check::Bit { bit, value } => {
                write!(fmt, "{}[{bit}] == 0b{}", self.half, *value as u8)
            }
            Check::Range { high, low, literal } => {
                write!(fmt, "{}[{high}:{low}] == 0b{literal}", self.half)
            }
        }
    }
}

pub fn validate(pattern: &str) -> Result<(), PatternError> {
    let len = pattern.chars().count();
    if len != WIDTH {
        return Err(PatternError::Length(len));
    }
    match pattern
        .chars()
        .enumerate()
        .find(|&(_, c)| !matches!(c, '0' | '1' | DONT_CARE))
    {
        Some((i, c)) => Err(PatternError::Char(i, c)),
        None => Ok(()),
    }
}

/// Splits a validated pattern into maximal runs of fixed bits.
pub fn runs(pattern: &str) -> Vec<BitRun> {
    let mut runs = Vec::new();
    let mut start = None;
    for (i, c) in pattern.char_indices() {
        if c == DONT_CARE {
            if let Some(start) = start.take() {
                runs.push(BitRun::new(pattern, start, i - 1));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(start) = start {
        runs.push(BitRun::new(pattern, start, pattern.len() - 1));
    }
    runs
}

/// Validates `pattern` and decomposes it into predicates in scan order.
pub fn analyze(pattern: &str, half: Half) -> Result<Vec<Predicate>, PatternError> {
    validate(pattern)?;
    Ok(runs(pattern).iter().map(|run| run.predicate(half)).collect())
}

/// One or two validated half-word patterns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BitPattern {
    lo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hi: Option<String>,
}

impl BitPattern {
    pub fn new(lo: &str, hi: Option<&str>) -> Result<Self, (String, PatternError)> {
        validate(lo).map_err(|err| (lo.to_owned(), err))?;
        if let Some(hi) = hi {
            validate(hi).map_err(|err| (hi.to_owned(), err))?;
        }
        Ok(Self {
            lo: lo.to_owned(),
            hi: hi.map(str::to_owned),
        })
    }

    pub fn lo(&self) -> &str {
        &self.lo
    }

    pub fn hi(&self) -> Option<&str> {
        self.hi.as_deref()
    }

    /// Patterns with a high half describe 32-bit encodings.
    pub fn is_wide(&self) -> bool {
        self.hi.is_some()
    }

    /// Predicates for both halves, low half first.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut out: Vec<_> = runs(&self.lo)
            .iter()
            .map(|run| run.predicate(Half::Lo))
            .collect();
        if let Some(hi) = &self.hi {
            out.extend(runs(hi).iter().map(|run| run.predicate(Half::Hi)));
        }
        out
    }

    /// Returns `true` if the encoding matches every fixed bit.
    pub fn matches(&self, lo: u16, hi: u16) -> bool {
        fn check(pattern: &str, raw: u16) -> bool {
            pattern.chars().enumerate().all(|(i, c)| {
                let bit = (raw >> (WIDTH - 1 - i)) & 1;
                match c {
                    '0' => bit == 0,
                    '1' => bit == 1,
                    _ => true,
                }
            })
        }
        check(&self.lo, lo) && self.hi.as_deref().map_or(true, |p| check(p, hi))
    }
}
