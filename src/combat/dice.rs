//! Dice rolling system
//!
//! Parses and rolls the dice notation used for attack counts and multiple
//! wounds: "d6", "2d6", "d3+2", "3d3-1", or a plain integer like "4".
//! The game only uses d3 and d6, so any other die size is rejected.

use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// Errors produced while parsing dice notation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("malformed dice expression '{0}' (expected e.g. 4, d6, 2d6+1, d3-1)")]
    Malformed(String),

    #[error("unsupported die d{sides} in '{expr}' (only d3 and d6 are allowed)")]
    UnsupportedDie { expr: String, sides: u32 },

    #[error("dice count must be at least 1 in '{0}'")]
    ZeroDice(String),
}

/// `[count]d<sides>[(+|-)modifier]`, applied after whitespace removal and lowercasing
static DICE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d*)d(\d+)(?:([+-])(\d+))?$").unwrap());

/// Plain non-negative integer
static LITERAL_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());

/// Roll a single die with the given number of sides.
///
/// Returns a uniformly distributed value in `1..=sides`. `sides` must be at least 1.
pub fn roll_die<R: Rng>(rng: &mut R, sides: u32) -> u32 {
    rng.random_range(1..=sides)
}

/// Roll a single d6
pub fn roll_d6<R: Rng>(rng: &mut R) -> u32 {
    roll_die(rng, 6)
}

/// Roll a single d3.
///
/// A d3 is a d6 read as `ceil(d6 / 2)`: 1-2 → 1, 3-4 → 2, 5-6 → 3. This is
/// how the table rolls it, so it is kept intentionally instead of drawing
/// from `1..=3` directly. The distribution is uniform either way.
pub fn roll_d3<R: Rng>(rng: &mut R) -> u32 {
    roll_d6(rng).div_ceil(2)
}

/// The die sizes the game knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Die {
    D3,
    D6,
}

impl Die {
    /// Number of faces
    pub fn sides(&self) -> u32 {
        match self {
            Die::D3 => 3,
            Die::D6 => 6,
        }
    }

    /// Roll one die of this size
    pub fn roll<R: Rng>(&self, rng: &mut R) -> u32 {
        match self {
            Die::D3 => roll_d3(rng),
            Die::D6 => roll_d6(rng),
        }
    }

    fn from_sides(sides: u32) -> Option<Die> {
        match sides {
            3 => Some(Die::D3),
            6 => Some(Die::D6),
            _ => None,
        }
    }
}

/// A parsed dice roll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceRoll {
    /// Number of dice to roll
    pub count: u32,
    /// Die size
    pub die: Die,
    /// Modifier to add/subtract
    pub modifier: i32,
}

impl DiceRoll {
    /// Create a new dice roll
    pub fn new(count: u32, die: Die, modifier: i32) -> Self {
        Self {
            count,
            die,
            modifier,
        }
    }

    /// Roll the dice and return the total.
    ///
    /// The total is not clamped at zero: "d3-5" can produce a negative
    /// number. Parsed rolls always fit in an `i32`; hand-built ones that
    /// don't saturate.
    pub fn roll<R: Rng>(&self, rng: &mut R) -> i32 {
        let sum: i64 = (0..self.count).map(|_| self.die.roll(rng) as i64).sum();
        saturate(sum + self.modifier as i64)
    }

    /// Get the minimum possible result
    pub fn min(&self) -> i32 {
        saturate(self.bounds().0)
    }

    /// Get the maximum possible result
    pub fn max(&self) -> i32 {
        saturate(self.bounds().1)
    }

    /// Exact lowest and highest totals
    fn bounds(&self) -> (i64, i64) {
        let count = self.count as i64;
        let modifier = self.modifier as i64;
        (count + modifier, count * self.die.sides() as i64 + modifier)
    }

    fn fits_i32(&self) -> bool {
        let (low, high) = self.bounds();
        i32::try_from(low).is_ok() && i32::try_from(high).is_ok()
    }

    /// Get the expected value
    pub fn average(&self) -> f64 {
        let avg_per_die = (1.0 + self.die.sides() as f64) / 2.0;
        self.count as f64 * avg_per_die + self.modifier as f64
    }
}

fn saturate(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

impl fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sides = self.die.sides();
        if self.modifier > 0 {
            write!(f, "{}d{}+{}", self.count, sides, self.modifier)
        } else if self.modifier < 0 {
            write!(f, "{}d{}{}", self.count, sides, self.modifier)
        } else {
            write!(f, "{}d{}", self.count, sides)
        }
    }
}

/// A quantity that is either fixed or rolled: attack counts and
/// multiple-wounds values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ExprInput", into = "ExprInput")]
pub enum DiceExpr {
    /// A literal count
    Fixed(u32),
    /// Dice rolled every time the expression is evaluated
    Roll(DiceRoll),
}

impl DiceExpr {
    /// Parse an integer literal or dice notation
    pub fn parse(input: &str) -> Result<Self, DiceError> {
        let notation: String = input
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();

        if LITERAL_REGEX.is_match(&notation) {
            return notation
                .parse::<i32>()
                .map(|n| DiceExpr::Fixed(n as u32))
                .map_err(|_| DiceError::Malformed(input.to_string()));
        }

        let caps = DICE_REGEX
            .captures(&notation)
            .ok_or_else(|| DiceError::Malformed(input.to_string()))?;

        let count: u32 = match caps.get(1).map(|m| m.as_str()) {
            None | Some("") => 1, // "d6" means "1d6"
            Some(s) => s
                .parse()
                .map_err(|_| DiceError::Malformed(input.to_string()))?,
        };
        if count == 0 {
            return Err(DiceError::ZeroDice(input.to_string()));
        }

        let sides: u32 = caps[2]
            .parse()
            .map_err(|_| DiceError::Malformed(input.to_string()))?;
        let die = Die::from_sides(sides).ok_or_else(|| DiceError::UnsupportedDie {
            expr: input.to_string(),
            sides,
        })?;

        let modifier = match (caps.get(3), caps.get(4)) {
            (Some(sign), Some(value)) => {
                let value: i32 = value
                    .as_str()
                    .parse()
                    .map_err(|_| DiceError::Malformed(input.to_string()))?;
                if sign.as_str() == "-" {
                    -value
                } else {
                    value
                }
            }
            _ => 0,
        };

        let roll = DiceRoll::new(count, die, modifier);
        if !roll.fits_i32() {
            return Err(DiceError::Malformed(input.to_string()));
        }

        Ok(DiceExpr::Roll(roll))
    }

    /// Build a fixed expression, rejecting values an `i32` can't hold
    pub fn fixed(n: u32) -> Result<Self, DiceError> {
        i32::try_from(n)
            .map(|_| DiceExpr::Fixed(n))
            .map_err(|_| DiceError::Malformed(n.to_string()))
    }

    /// Produce one value. Fixed expressions always return the same number;
    /// dice expressions roll fresh dice on every call.
    pub fn evaluate<R: Rng>(&self, rng: &mut R) -> i32 {
        match self {
            DiceExpr::Fixed(n) => saturate(*n as i64),
            DiceExpr::Roll(roll) => roll.roll(rng),
        }
    }

    /// Get the minimum possible result
    pub fn min(&self) -> i32 {
        match self {
            DiceExpr::Fixed(n) => saturate(*n as i64),
            DiceExpr::Roll(roll) => roll.min(),
        }
    }

    /// Get the maximum possible result
    pub fn max(&self) -> i32 {
        match self {
            DiceExpr::Fixed(n) => saturate(*n as i64),
            DiceExpr::Roll(roll) => roll.max(),
        }
    }
}

impl From<u32> for DiceExpr {
    fn from(n: u32) -> Self {
        DiceExpr::Fixed(n)
    }
}

impl FromStr for DiceExpr {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiceExpr::parse(s)
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiceExpr::Fixed(n) => write!(f, "{}", n),
            DiceExpr::Roll(roll) => roll.fmt(f),
        }
    }
}

/// Wire form: a bare integer or a notation string
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ExprInput {
    Number(u32),
    Text(String),
}

impl TryFrom<ExprInput> for DiceExpr {
    type Error = DiceError;

    fn try_from(input: ExprInput) -> Result<Self, Self::Error> {
        match input {
            ExprInput::Number(n) => DiceExpr::fixed(n),
            ExprInput::Text(s) => DiceExpr::parse(&s),
        }
    }
}

impl From<DiceExpr> for ExprInput {
    fn from(expr: DiceExpr) -> Self {
        match expr {
            DiceExpr::Fixed(n) => ExprInput::Number(n),
            DiceExpr::Roll(roll) => ExprInput::Text(roll.to_string()),
        }
    }
}

/// Parse and evaluate an expression in one step.
///
/// Usable on its own to check user input: a malformed expression is an
/// error, never a silent default.
pub fn parse_dice_expression<R: Rng>(input: &str, rng: &mut R) -> Result<i32, DiceError> {
    Ok(DiceExpr::parse(input)?.evaluate(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn roll_of(expr: &str) -> DiceRoll {
        match DiceExpr::parse(expr).unwrap() {
            DiceExpr::Roll(roll) => roll,
            other => panic!("expected dice roll, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_basic() {
        let roll = roll_of("2d6");
        assert_eq!(roll.count, 2);
        assert_eq!(roll.die, Die::D6);
        assert_eq!(roll.modifier, 0);
    }

    #[test]
    fn test_parse_with_plus() {
        let roll = roll_of("d3+2");
        assert_eq!(roll.count, 1);
        assert_eq!(roll.die, Die::D3);
        assert_eq!(roll.modifier, 2);
    }

    #[test]
    fn test_parse_with_minus() {
        let roll = roll_of("3d3-1");
        assert_eq!(roll.count, 3);
        assert_eq!(roll.die, Die::D3);
        assert_eq!(roll.modifier, -1);
    }

    #[test]
    fn test_parse_whitespace_and_case() {
        let roll = roll_of("  2 D6 + 3  ");
        assert_eq!(roll, DiceRoll::new(2, Die::D6, 3));
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(DiceExpr::parse("4").unwrap(), DiceExpr::Fixed(4));
        assert_eq!(DiceExpr::parse(" 0 ").unwrap(), DiceExpr::Fixed(0));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(DiceExpr::parse("abc"), Err(DiceError::Malformed(_))));
        assert!(matches!(DiceExpr::parse("2d"), Err(DiceError::Malformed(_))));
        assert!(matches!(DiceExpr::parse(""), Err(DiceError::Malformed(_))));
        assert!(matches!(DiceExpr::parse("-3"), Err(DiceError::Malformed(_))));
        assert!(matches!(DiceExpr::parse("d6+"), Err(DiceError::Malformed(_))));
        assert!(matches!(DiceExpr::parse("2d6*2"), Err(DiceError::Malformed(_))));
        assert!(matches!(DiceExpr::parse("0d6"), Err(DiceError::ZeroDice(_))));
    }

    #[test]
    fn test_parse_unsupported_die() {
        assert_eq!(
            DiceExpr::parse("1d20"),
            Err(DiceError::UnsupportedDie {
                expr: "1d20".to_string(),
                sides: 20
            })
        );
        assert!(matches!(
            DiceExpr::parse("d4"),
            Err(DiceError::UnsupportedDie { sides: 4, .. })
        ));
    }

    #[test]
    fn test_roll_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for expr in ["2d6", "d3+2", "3d3-1", "d6-20"] {
            let roll = roll_of(expr);
            for _ in 0..500 {
                let result = roll.roll(&mut rng);
                assert!(result >= roll.min(), "{} rolled {} below {}", expr, result, roll.min());
                assert!(result <= roll.max(), "{} rolled {} above {}", expr, result, roll.max());
            }
        }
    }

    #[test]
    fn test_negative_result_is_not_clamped() {
        let mut rng = StdRng::seed_from_u64(1);
        let value = parse_dice_expression("d6-20", &mut rng).unwrap();
        assert!((-19..=-14).contains(&value));
    }

    #[test]
    fn test_d3_covers_all_faces() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts = [0u32; 4];
        for _ in 0..6000 {
            counts[roll_d3(&mut rng) as usize] += 1;
        }
        assert_eq!(counts[0], 0);
        for face in 1..=3 {
            assert!(
                (1700..=2300).contains(&counts[face]),
                "face {} seen {} times",
                face,
                counts[face]
            );
        }
    }

    #[test]
    fn test_min_max_average() {
        let roll = DiceRoll::new(2, Die::D6, 3);
        assert_eq!(roll.min(), 5);
        assert_eq!(roll.max(), 15);
        assert_eq!(roll.average(), 10.0);
        assert_eq!(DiceRoll::new(1, Die::D3, 0).average(), 2.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(DiceRoll::new(2, Die::D6, 0).to_string(), "2d6");
        assert_eq!(DiceRoll::new(1, Die::D3, 2).to_string(), "1d3+2");
        assert_eq!(DiceRoll::new(3, Die::D3, -1).to_string(), "3d3-1");
        assert_eq!(DiceExpr::Fixed(5).to_string(), "5");
    }

    #[test]
    fn test_fixed_evaluates_to_itself() {
        let mut rng = StdRng::seed_from_u64(3);
        let expr = DiceExpr::from(7);
        for _ in 0..10 {
            assert_eq!(expr.evaluate(&mut rng), 7);
        }
    }

    #[test]
    fn test_serde_accepts_number_and_string() {
        let fixed: DiceExpr = serde_json::from_str("3").unwrap();
        assert_eq!(fixed, DiceExpr::Fixed(3));

        let rolled: DiceExpr = serde_json::from_str("\"2d6+1\"").unwrap();
        assert_eq!(rolled, DiceExpr::Roll(DiceRoll::new(2, Die::D6, 1)));
        assert_eq!(serde_json::to_string(&rolled).unwrap(), "\"2d6+1\"");

        assert!(serde_json::from_str::<DiceExpr>("\"2d8\"").is_err());
    }

    #[test]
    fn test_literal_must_fit_i32() {
        let mut rng = StdRng::seed_from_u64(5);
        let largest = DiceExpr::parse("2147483647").unwrap();
        assert_eq!(largest.evaluate(&mut rng), i32::MAX);
        assert_eq!(largest.min(), i32::MAX);

        assert!(matches!(DiceExpr::parse("2147483648"), Err(DiceError::Malformed(_))));
        assert!(matches!(DiceExpr::parse("3000000000"), Err(DiceError::Malformed(_))));
        assert!(DiceExpr::fixed(3_000_000_000).is_err());
        assert!(serde_json::from_str::<DiceExpr>("3000000000").is_err());
        assert!(serde_json::from_str::<DiceExpr>("\"3000000000\"").is_err());

        // Built directly, an oversized literal saturates instead of wrapping
        assert_eq!(DiceExpr::Fixed(3_000_000_000).evaluate(&mut rng), i32::MAX);
    }

    #[test]
    fn test_roll_range_must_fit_i32() {
        let mut rng = StdRng::seed_from_u64(6);
        assert!(matches!(
            parse_dice_expression("d6+2147483647", &mut rng),
            Err(DiceError::Malformed(_))
        ));
        assert!(matches!(DiceExpr::parse("400000000d6"), Err(DiceError::Malformed(_))));

        let roll = roll_of("d6+2147483641");
        assert_eq!(roll.max(), i32::MAX);
        for _ in 0..100 {
            assert!(roll.roll(&mut rng) >= 2147483642);
        }
        assert_eq!(roll_of("d3-2147483647").min(), -2147483646);

        let oversized = DiceRoll::new(2, Die::D6, i32::MAX);
        assert_eq!(oversized.roll(&mut rng), i32::MAX);
        assert_eq!(oversized.max(), i32::MAX);
    }
}
