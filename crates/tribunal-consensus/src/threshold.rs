//! Exact supermajority thresholds.
//!
//! A threshold is the fraction `num/den` of cast votes one side must hold.
//! The vote count a side needs out of `total` is:
//!
//! ```text
//! required(total) = ceil(total × num / den) = (total × num + den - 1) / den
//! ```
//!
//! Integer arithmetic only. `5 × 0.6` in floating point is `3.0000000000000004`,
//! which would round the requirement up to 4.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Maximum number of decimal places accepted by [`Threshold::parse`].
const MAX_DECIMALS: u32 = 6;

/// A supermajority fraction in (1/2, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Threshold {
    num: u32,
    den: u32,
}

impl Threshold {
    /// Three fifths (0.6).
    pub const THREE_FIFTHS: Threshold = Threshold { num: 3, den: 5 };

    /// Build a threshold, reduced to lowest terms.
    ///
    /// Anything at or below one half is rejected: with `t <= 1/2` both sides
    /// of an even split would qualify at once.
    pub fn new(num: u32, den: u32) -> Result<Self> {
        if den == 0 || num > den || u64::from(num) * 2 <= u64::from(den) {
            return Err(Error::InvalidThreshold { num, den });
        }
        let g = gcd(num, den);
        Ok(Self {
            num: num / g,
            den: den / g,
        })
    }

    /// Parse either a fraction (`"3/5"`) or a decimal (`"0.6"`).
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let bad = || Error::ThresholdParse(text.to_string());

        if let Some((num, den)) = text.split_once('/') {
            let num = num.trim().parse::<u32>().map_err(|_| bad())?;
            let den = den.trim().parse::<u32>().map_err(|_| bad())?;
            return Self::new(num, den);
        }

        let (whole, frac) = text.split_once('.').unwrap_or((text, ""));
        if frac.len() as u32 > MAX_DECIMALS || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(bad());
        }
        let whole: u32 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| bad())?
        };
        let den = 10u32.pow(frac.len() as u32);
        let frac: u32 = if frac.is_empty() {
            0
        } else {
            frac.parse().map_err(|_| bad())?
        };
        let num = whole
            .checked_mul(den)
            .and_then(|w| w.checked_add(frac))
            .ok_or_else(bad)?;
        Self::new(num, den)
    }

    /// Numerator in lowest terms.
    pub const fn numerator(&self) -> u32 {
        self.num
    }

    /// Denominator in lowest terms.
    pub const fn denominator(&self) -> u32 {
        self.den
    }

    /// Votes one side needs out of `total` cast.
    ///
    /// # Examples
    ///
    /// ```
    /// use tribunal_consensus::Threshold;
    ///
    /// let t = Threshold::THREE_FIFTHS;
    /// assert_eq!(t.required(3), 2);
    /// assert_eq!(t.required(4), 3);
    /// assert_eq!(t.required(5), 3);
    /// ```
    pub const fn required(&self, total: u32) -> u32 {
        let scaled = total as u64 * self.num as u64 + self.den as u64 - 1;
        (scaled / self.den as u64) as u32
    }

    /// Whether `votes` out of `total` meets the threshold.
    pub const fn is_met(&self, votes: u32, total: u32) -> bool {
        votes >= self.required(total)
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::THREE_FIFTHS
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl FromStr for Threshold {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

const fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}
