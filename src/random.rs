/// Scalar draws shared by every stochastic decision in the game.
///
/// All functions take the RNG as a parameter so a seeded `StdRng` makes a
/// whole session reproducible.
use rand::Rng;
use serde::Deserialize;
use tracing::warn;

/// Shape of the distribution used by [`generate`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationType {
    /// Flat over `[min, max]`.
    #[default]
    Uniform,
    /// Skewed toward `min`: `min + (max - min) * u²`.
    Biased,
}

/// Draw a value in `[min, max]` (inclusive).
///
/// Inverted bounds are a caller bug; they are swapped rather than panicking
/// so a bad tuning value can never stall the tick loop.
pub fn generate(rng: &mut impl Rng, min: f32, max: f32, mode: GenerationType) -> f32 {
    let (lo, hi) = if min > max {
        warn!(min, max, "inverted random range, swapping bounds");
        (max, min)
    } else {
        (min, max)
    };

    if lo == hi {
        return lo;
    }

    let value = match mode {
        GenerationType::Uniform => rng.gen_range(lo..=hi),
        GenerationType::Biased => {
            let u: f32 = rng.gen();
            lo + (hi - lo) * u * u
        }
    };

    // Float rounding must not leak outside the requested range.
    value.clamp(lo, hi)
}

/// Uniformly random `-1.0` or `+1.0`.
pub fn sign(rng: &mut impl Rng) -> f32 {
    if rng.gen_bool(0.5) {
        1.0
    } else {
        -1.0
    }
}
