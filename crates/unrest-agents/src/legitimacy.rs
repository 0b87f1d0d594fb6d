//! Legitimacy sampling and the one-time international aid shock.
//!
//! Every citizen draws its belief in the regime's legitimacy once, at
//! placement, from the configured distribution family. Draws are clipped
//! into `[0, 1]`. The gamma family is an optional extension: a gamma draw is
//! squashed through `x / (x + 1)` before clipping.
//!
//! Sampling takes the run's single RNG so a seed reproduces the whole
//! population. Normal and gamma variates are generated here (Box-Muller and
//! Marsaglia-Tsang) from uniform draws.

use rand::Rng;
use serde::{Deserialize, Serialize};

use unrest_types::{AidDirection, DistributionKind};

use crate::agent::{Agent, clamp_unit};
use crate::error::LegitimacyError;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Parameters for every supported family. Only the selected family's
/// fields are read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegitimacyParams {
    /// Lower bound of the uniform family.
    #[serde(default = "default_uniform_low")]
    pub uniform_low: f64,
    /// Upper bound of the uniform family.
    #[serde(default = "default_uniform_high")]
    pub uniform_high: f64,
    /// Mean of the normal family.
    #[serde(default = "default_normal_mean")]
    pub normal_mean: f64,
    /// Standard deviation of the normal family.
    #[serde(default = "default_normal_stddev")]
    pub normal_stddev: f64,
    /// Shape `k` of the gamma family.
    #[serde(default = "default_gamma_shape")]
    pub gamma_shape: f64,
    /// Scale `theta` of the gamma family.
    #[serde(default = "default_gamma_scale")]
    pub gamma_scale: f64,
}

const fn default_uniform_low() -> f64 {
    0.0
}

const fn default_uniform_high() -> f64 {
    1.0
}

const fn default_normal_mean() -> f64 {
    0.5
}

const fn default_normal_stddev() -> f64 {
    0.1
}

const fn default_gamma_shape() -> f64 {
    2.0
}

const fn default_gamma_scale() -> f64 {
    2.0
}

impl Default for LegitimacyParams {
    fn default() -> Self {
        Self {
            uniform_low: default_uniform_low(),
            uniform_high: default_uniform_high(),
            normal_mean: default_normal_mean(),
            normal_stddev: default_normal_stddev(),
            gamma_shape: default_gamma_shape(),
            gamma_scale: default_gamma_scale(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sampler
// ---------------------------------------------------------------------------

/// A validated legitimacy distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Legitimacy {
    /// Uniform on `[low, high)`.
    Uniform {
        /// Lower bound.
        low: f64,
        /// Upper bound.
        high: f64,
    },
    /// Normal with the given mean and standard deviation.
    Normal {
        /// Mean.
        mean: f64,
        /// Standard deviation, non-negative.
        stddev: f64,
    },
    /// Gamma with shape `k` and scale `theta`, squashed into `[0, 1)`.
    Gamma {
        /// Shape, positive.
        shape: f64,
        /// Scale, positive.
        scale: f64,
    },
}

impl Legitimacy {
    /// Build the sampler for `kind` from `params`, validating the fields
    /// that family reads.
    pub fn new(kind: DistributionKind, params: &LegitimacyParams) -> Result<Self, LegitimacyError> {
        let sampler = match kind {
            DistributionKind::Uniform => Self::Uniform {
                low: params.uniform_low,
                high: params.uniform_high,
            },
            DistributionKind::Normal => Self::Normal {
                mean: params.normal_mean,
                stddev: params.normal_stddev,
            },
            DistributionKind::Gamma => Self::Gamma {
                shape: params.gamma_shape,
                scale: params.gamma_scale,
            },
        };
        sampler.validate()?;
        Ok(sampler)
    }

    /// Check that the parameters are finite and inside their domain.
    pub fn validate(&self) -> Result<(), LegitimacyError> {
        match *self {
            Self::Uniform { low, high } => {
                // The span must be finite too: a range wider than f64::MAX
                // cannot be sampled.
                let span = high - low;
                if !low.is_finite() || !high.is_finite() || low > high || !span.is_finite() {
                    return Err(LegitimacyError::InvalidBounds { low, high });
                }
            }
            Self::Normal { mean, stddev } => {
                require(mean.is_finite(), "normal_mean", "finite", mean)?;
                require(
                    stddev.is_finite() && stddev >= 0.0,
                    "normal_stddev",
                    "non-negative",
                    stddev,
                )?;
            }
            Self::Gamma { shape, scale } => {
                require(
                    shape.is_finite() && shape > 0.0,
                    "gamma_shape",
                    "positive",
                    shape,
                )?;
                require(
                    scale.is_finite() && scale > 0.0,
                    "gamma_scale",
                    "positive",
                    scale,
                )?;
            }
        }
        Ok(())
    }

    /// Draw one legitimacy value in `[0, 1]`.
    pub fn sample(&self, rng: &mut impl Rng) -> f64 {
        let raw = match *self {
            Self::Uniform { low, high } => {
                if high > low {
                    rng.random_range(low..high)
                } else {
                    low
                }
            }
            Self::Normal { mean, stddev } => standard_normal(rng).mul_add(stddev, mean),
            Self::Gamma { shape, scale } => {
                let x = gamma(shape, rng) * scale;
                x / (x + 1.0)
            }
        };
        clamp_unit(raw)
    }
}

fn require(
    ok: bool,
    name: &'static str,
    requirement: &'static str,
    value: f64,
) -> Result<(), LegitimacyError> {
    if ok {
        Ok(())
    } else {
        Err(LegitimacyError::InvalidParameter {
            name,
            requirement,
            value,
        })
    }
}

/// Standard normal variate via the Box-Muller transform.
fn standard_normal(rng: &mut impl Rng) -> f64 {
    // 1 - [0, 1) keeps the log argument strictly positive.
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Gamma(shape, 1) variate via Marsaglia-Tsang, boosted for `shape < 1`.
fn gamma(shape: f64, rng: &mut impl Rng) -> f64 {
    if shape < 1.0 {
        let u = 1.0 - rng.random::<f64>();
        return gamma(shape + 1.0, rng) * u.powf(1.0 / shape);
    }

    let d = shape - 1.0 / 3.0;
    let c = 1.0 / (9.0 * d).sqrt();
    loop {
        let x = standard_normal(rng);
        let t = c.mul_add(x, 1.0);
        if t <= 0.0 {
            continue;
        }
        let v = t * t * t;
        let u = 1.0 - rng.random::<f64>();
        if u.ln() < (0.5 * x).mul_add(x, d * (1.0 - v + v.ln())) {
            return d * v;
        }
    }
}

// ---------------------------------------------------------------------------
// Aid shock
// ---------------------------------------------------------------------------

/// Shift every citizen's legitimacy by `amount` in the direction's sign,
/// clamped to `[0, 1]`. Returns the number of citizens touched.
pub fn apply_shock(agents: &mut [Agent], direction: AidDirection, amount: f64) -> usize {
    let delta = direction.sign() * amount;
    let mut touched: usize = 0;
    for citizen in agents.iter_mut().filter_map(Agent::as_citizen_mut) {
        citizen.regime_legitimacy = clamp_unit(citizen.regime_legitimacy + delta);
        touched = touched.saturating_add(1);
    }
    touched
}

/// The one-time international aid event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AidShock {
    /// Who receives the aid.
    pub direction: AidDirection,
    /// Magnitude added to or subtracted from legitimacy.
    pub amount: f64,
    /// Iteration at which the shock fires.
    pub tick: u64,
    applied: bool,
}

impl AidShock {
    /// Create a pending shock.
    pub const fn new(direction: AidDirection, amount: f64, tick: u64) -> Self {
        Self {
            direction,
            amount,
            tick,
            applied: false,
        }
    }

    /// Whether the shock has already fired.
    pub const fn applied(&self) -> bool {
        self.applied
    }

    /// Whether the shock should fire at this iteration.
    pub fn is_due(&self, iteration: u64) -> bool {
        !self.applied && self.direction != AidDirection::NoAid && iteration >= self.tick
    }

    /// Fire the shock. Returns `false` without touching anyone if it has
    /// already fired or the direction is "No Aid".
    pub fn apply(&mut self, agents: &mut [Agent]) -> bool {
        if self.applied || self.direction == AidDirection::NoAid {
            return false;
        }
        apply_shock(agents, self.direction, self.amount);
        self.applied = true;
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use unrest_types::{AgentId, Position};

    use super::*;
    use crate::agent::{Citizen, CitizenTraits, Cop};

    fn population(legitimacies: &[f64]) -> Vec<Agent> {
        let mut agents: Vec<Agent> = legitimacies
            .iter()
            .zip(0_u64..)
            .map(|(&regime_legitimacy, id)| {
                Agent::Citizen(Citizen::new(
                    AgentId::new(id),
                    Position::new(0, 0),
                    1,
                    CitizenTraits {
                        hardship: 0.5,
                        regime_legitimacy,
                        risk_aversion: 0.5,
                    },
                    0.1,
                ))
            })
            .collect();
        agents.push(Agent::Cop(Cop::new(AgentId::new(99), Position::new(1, 1), 1)));
        agents
    }

    fn legitimacies(agents: &[Agent]) -> Vec<f64> {
        agents
            .iter()
            .filter_map(Agent::as_citizen)
            .map(|c| c.regime_legitimacy)
            .collect()
    }

    #[test]
    fn every_family_samples_inside_unit_interval() {
        let mut rng = SmallRng::seed_from_u64(42);
        let params = LegitimacyParams {
            normal_stddev: 2.0,
            ..LegitimacyParams::default()
        };
        for kind in [
            DistributionKind::Uniform,
            DistributionKind::Normal,
            DistributionKind::Gamma,
        ] {
            let sampler = Legitimacy::new(kind, &params).unwrap();
            for _ in 0..2000 {
                let value = sampler.sample(&mut rng);
                assert!((0.0..=1.0).contains(&value), "{kind:?} drew {value}");
            }
        }
    }

    #[test]
    fn normal_mean_is_close_to_configured_mean() {
        let mut rng = SmallRng::seed_from_u64(7);
        let sampler = Legitimacy::new(DistributionKind::Normal, &LegitimacyParams::default()).unwrap();
        let n = 5000_u32;
        let sum: f64 = (0..n).map(|_| sampler.sample(&mut rng)).sum();
        let mean = sum / f64::from(n);
        assert!((mean - 0.5).abs() < 0.01, "mean was {mean}");
    }

    #[test]
    fn gamma_mean_matches_shape_times_scale() {
        let mut rng = SmallRng::seed_from_u64(11);
        for shape in [0.5, 2.0, 5.0] {
            let n = 20_000_u32;
            let sum: f64 = (0..n).map(|_| gamma(shape, &mut rng)).sum();
            let mean = sum / f64::from(n);
            assert!((mean - shape).abs() < shape * 0.05, "shape {shape} mean {mean}");
        }
    }

    #[test]
    fn degenerate_uniform_returns_bound() {
        let mut rng = SmallRng::seed_from_u64(1);
        let sampler = Legitimacy::Uniform { low: 0.3, high: 0.3 };
        assert!((sampler.sample(&mut rng) - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_parameters_rejected() {
        let reversed = LegitimacyParams {
            uniform_low: 0.9,
            uniform_high: 0.1,
            ..LegitimacyParams::default()
        };
        assert!(matches!(
            Legitimacy::new(DistributionKind::Uniform, &reversed),
            Err(LegitimacyError::InvalidBounds { .. })
        ));

        let negative = LegitimacyParams {
            normal_stddev: -0.1,
            ..LegitimacyParams::default()
        };
        assert!(matches!(
            Legitimacy::new(DistributionKind::Normal, &negative),
            Err(LegitimacyError::InvalidParameter { name: "normal_stddev", .. })
        ));

        let zero_shape = LegitimacyParams {
            gamma_shape: 0.0,
            ..LegitimacyParams::default()
        };
        assert!(Legitimacy::new(DistributionKind::Gamma, &zero_shape).is_err());

        let overflowing = LegitimacyParams {
            uniform_low: -f64::MAX,
            uniform_high: f64::MAX,
            ..LegitimacyParams::default()
        };
        assert!(matches!(
            Legitimacy::new(DistributionKind::Uniform, &overflowing),
            Err(LegitimacyError::InvalidBounds { .. })
        ));

        // Fields of unselected families are not checked.
        assert!(Legitimacy::new(DistributionKind::Uniform, &negative).is_ok());
    }

    #[test]
    fn aid_government_raises_and_clamps() {
        let mut agents = population(&[0.1, 0.5, 0.9]);
        let mut shock = AidShock::new(AidDirection::AidGovernment, 0.2, 0);
        assert!(shock.apply(&mut agents));

        let after = legitimacies(&agents);
        let expected = [0.3, 0.7, 1.0];
        for (got, want) in after.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "got {got}, want {want}");
        }

        assert!(!shock.apply(&mut agents));
        assert_eq!(legitimacies(&agents), after);
    }

    #[test]
    fn aid_rebellion_lowers_and_clamps() {
        let mut agents = population(&[0.05, 0.6]);
        assert_eq!(apply_shock(&mut agents, AidDirection::AidRebellion, 0.1), 2);
        let after = legitimacies(&agents);
        assert!(after.first().is_some_and(|v| v.abs() < f64::EPSILON));
        assert!(after.get(1).is_some_and(|v| (v - 0.5).abs() < 1e-12));
    }

    #[test]
    fn no_aid_never_fires() {
        let mut agents = population(&[0.5]);
        let mut shock = AidShock::new(AidDirection::NoAid, 0.5, 0);
        assert!(!shock.is_due(10));
        assert!(!shock.apply(&mut agents));
        assert!(!shock.applied());
    }

    #[test]
    fn shock_is_due_from_its_tick_until_applied() {
        let mut agents = population(&[0.5]);
        let mut shock = AidShock::new(AidDirection::AidRebellion, 0.1, 3);
        assert!(!shock.is_due(2));
        assert!(shock.is_due(3));
        assert!(shock.apply(&mut agents));
        assert!(!shock.is_due(4));
    }
}
