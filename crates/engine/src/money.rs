use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg},
    str::FromStr,
};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Fraction digits kept when an amount is emitted.
pub const MONEY_SCALE: u32 = 2;

/// Rounds an accumulated sum to cents, half away from zero.
///
/// This is the only rounding the engine performs. Sums are accumulated
/// exactly and pass through here once, when they are written into a summary
/// field.
///
/// ```rust
/// use receipt_engine::{Decimal, round_money};
///
/// assert_eq!(round_money(Decimal::new(1005, 3)), Decimal::new(101, 2));
/// assert_eq!(round_money(Decimal::new(-1005, 3)), Decimal::new(-101, 2));
/// ```
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}

/// Signed money amount backed by an exact decimal.
///
/// Receipt totals come from OCR extraction and may carry more than two
/// fraction digits (`10.005`), so the value is not truncated on parse. Use
/// [`Money::rounded`] when the amount leaves the engine. Serialized as a
/// JSON number.
///
/// # Examples
///
/// ```rust
/// use receipt_engine::Money;
///
/// let a: Money = "10.005".parse().unwrap();
/// let b: Money = "5.005".parse().unwrap();
/// assert_eq!((a + b).rounded().to_string(), "15.01");
/// ```
///
/// Parsing rejects anything that is not a finite number:
///
/// ```rust
/// use receipt_engine::Money;
///
/// assert!("NaN".parse::<Money>().is_err());
/// assert!("12.50 USD".parse::<Money>().is_err());
/// assert_eq!("1.25e1".parse::<Money>().unwrap().to_string(), "12.50");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Wraps an exact decimal amount.
    #[must_use]
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the exact decimal value.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Returns the amount rounded to cents with [`round_money`].
    #[must_use]
    pub fn rounded(self) -> Money {
        Money(round_money(self.0))
    }

    /// Checked addition (returns `None` when the decimal range is exceeded).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }
}

impl fmt::Display for Money {
    /// Always prints the rounded value with two fraction digits.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rounded = round_money(self.0);
        rounded.rescale(MONEY_SCALE);
        write!(f, "{rounded}")
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses a decimal string.
    ///
    /// Accepts surrounding whitespace, an optional leading `+`/`-`, plain
    /// decimals and scientific notation. Rejects empty input, `NaN`,
    /// infinities and trailing text with [`EngineError::InvalidAmount`].
    ///
    /// Fraction digits beyond the 28 a [`Decimal`] holds are rounded off.
    /// A finite value whose magnitude exceeds [`Decimal::MAX`] is reported as
    /// [`EngineError::AmountOverflow`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidAmount("empty amount".to_string()));
        }

        let (mantissa, exponent) = split_scientific(trimmed)
            .ok_or_else(|| EngineError::InvalidAmount(format!("{s:?} is not a finite number")))?;
        let out_of_range =
            || EngineError::AmountOverflow(format!("{s:?} is outside the decimal range"));

        // Syntax is already checked, so `from_str` can only fail on range.
        let value = Decimal::from_str(&mantissa).map_err(|_| out_of_range())?;
        scale_by_power_of_ten(value, exponent)
            .map(Money)
            .ok_or_else(out_of_range)
    }
}

/// Splits `[+-]digits[.digits][(e|E)[+-]digits]` into a normalized mantissa
/// and its decimal exponent. `None` when the text is not a number.
fn split_scientific(text: &str) -> Option<(String, i64)> {
    let (mantissa, exponent) = match text.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, Some(exponent)),
        None => (text, None),
    };

    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    let negative = mantissa.starts_with('-');
    let unsigned = mantissa.strip_prefix(['+', '-']).unwrap_or(mantissa);
    let (int, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if (int.is_empty() && frac.is_empty()) || !digits(int) || !digits(frac) {
        return None;
    }

    let exponent = match exponent {
        None => 0,
        Some(raw) => {
            let magnitude = raw.strip_prefix(['+', '-']).unwrap_or(raw);
            if magnitude.is_empty() || !digits(magnitude) {
                return None;
            }
            // Exponents too long for i64 are far outside the decimal range anyway.
            let magnitude = magnitude.parse::<i64>().unwrap_or(i64::MAX);
            if raw.starts_with('-') { -magnitude } else { magnitude }
        }
    };

    let sign = if negative { "-" } else { "" };
    let int = if int.is_empty() { "0" } else { int };
    let normalized = if frac.is_empty() {
        format!("{sign}{int}")
    } else {
        format!("{sign}{int}.{frac}")
    };
    Some((normalized, exponent))
}

/// `value * 10^exponent`, `None` on overflow. Tiny results round to zero.
fn scale_by_power_of_ten(mut value: Decimal, exponent: i64) -> Option<Decimal> {
    if exponent >= 0 {
        // A non-zero decimal overflows after at most 57 multiplications.
        for _ in 0..exponent {
            if value.is_zero() {
                break;
            }
            value = value.checked_mul(Decimal::TEN)?;
        }
    } else {
        for _ in 0..exponent.unsigned_abs() {
            if value.is_zero() {
                break;
            }
            value /= Decimal::TEN;
        }
    }
    Some(value)
}
