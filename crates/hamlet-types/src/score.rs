//! Clamped [`Decimal`] score helpers shared across the workspace.
//!
//! All bounded scores (emotions, personality traits, importance, utility
//! inputs) live in the unit range; affinity and trust accumulate in wider
//! working ranges. Every write site clamps through these helpers so no
//! score silently drifts out of bounds.

use rust_decimal::Decimal;

/// Upper bound of the unit score range.
pub const UNIT_MAX: Decimal = Decimal::ONE;

/// Lower bound of the unit score range.
pub const UNIT_MIN: Decimal = Decimal::ZERO;

/// Upper working bound for accumulated affinity and trust (1.5).
pub fn pair_score_max() -> Decimal {
    Decimal::new(15, 1)
}

/// Lower working bound for accumulated affinity (-0.5).
pub fn affinity_min() -> Decimal {
    Decimal::new(-5, 1)
}

/// The neutral default (0.5) used when a score is absent.
pub fn neutral() -> Decimal {
    Decimal::new(5, 1)
}

/// Clamp a score to the unit range [0, 1].
pub fn unit(value: Decimal) -> Decimal {
    value.clamp(UNIT_MIN, UNIT_MAX)
}

/// Clamp an accumulated affinity score to [-0.5, 1.5].
pub fn affinity(value: Decimal) -> Decimal {
    value.clamp(affinity_min(), pair_score_max())
}

/// Clamp an accumulated trust score to [0, 1.5].
pub fn trust(value: Decimal) -> Decimal {
    value.clamp(UNIT_MIN, pair_score_max())
}
