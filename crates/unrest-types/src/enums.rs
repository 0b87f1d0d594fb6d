//! Enumeration types for the Unrest simulation.
//!
//! Several of these are selected by name in configuration files. Each such
//! enum offers a `from_name` lookup that accepts both the short name and the
//! legacy name used by earlier versions of the model, and returns `None` for
//! anything else so the configuration layer can report the bad value.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

/// The kind of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breed {
    /// An ordinary member of the population who may rebel.
    Citizen,
    /// A law-enforcement agent who arrests active citizens.
    Cop,
}

impl Breed {
    /// Return the lowercase tag used in exports (`"citizen"` or `"cop"`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Citizen => "citizen",
            Self::Cop => "cop",
        }
    }
}

impl core::fmt::Display for Breed {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A citizen's behavioural state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Condition {
    /// Not rebelling.
    #[default]
    Quiescent,
    /// Openly rebelling; visible to cops as an arrest target.
    Active,
    /// Arrested and serving a sentence; off the lattice.
    Jailed,
}

impl core::fmt::Display for Condition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Quiescent => "Quiescent",
            Self::Active => "Active",
            Self::Jailed => "Jailed",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Scheduling
// ---------------------------------------------------------------------------

/// Activation policy deciding agent order and intra-tick visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SchedulerKind {
    /// Reshuffle every tick; later agents see earlier agents' mutations.
    #[default]
    Random,
    /// Decide everything from one pre-tick snapshot, commit at tick end.
    Simultaneous,
    /// Explicit decide pass then apply pass over a pre-tick snapshot.
    Staged,
    /// Fixed insertion order every tick; interleaved like `Random`.
    Sequential,
}

impl SchedulerKind {
    /// Look up a policy by its configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "Random" | "RandomActivation" => Some(Self::Random),
            "Simultaneous" | "SimultaneousActivation" => Some(Self::Simultaneous),
            "Staged" | "StagedActivation" => Some(Self::Staged),
            "Sequential" | "BaseScheduler" => Some(Self::Sequential),
            _ => None,
        }
    }

    /// Whether agents observe same-tick mutations of agents that acted
    /// before them.
    pub const fn is_interleaved(self) -> bool {
        matches!(self, Self::Random | Self::Sequential)
    }
}

impl core::fmt::Display for SchedulerKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Random => "Random",
            Self::Simultaneous => "Simultaneous",
            Self::Staged => "Staged",
            Self::Sequential => "Sequential",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Legitimacy
// ---------------------------------------------------------------------------

/// Family of distributions a citizen's legitimacy belief is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionKind {
    /// Uniform between configured bounds.
    #[default]
    Uniform,
    /// Normal, clipped to `[0, 1]`.
    Normal,
    /// Gamma, squashed through `x / (x + 1)`. Optional extension.
    Gamma,
}

impl DistributionKind {
    /// Look up a distribution by its configuration name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "uniform" => Some(Self::Uniform),
            "normal" => Some(Self::Normal),
            "gamma" => Some(Self::Gamma),
            _ => None,
        }
    }
}

/// Direction of the one-time international aid shock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AidDirection {
    /// No shock is ever applied.
    #[default]
    #[serde(rename = "No Aid")]
    NoAid,
    /// Aid flows to the regime: legitimacy rises.
    #[serde(rename = "Aid Government")]
    AidGovernment,
    /// Aid flows to the opposition: legitimacy falls.
    #[serde(rename = "Aid Rebellion")]
    AidRebellion,
}

impl AidDirection {
    /// Look up an aid direction by its configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "No Aid" | "none" | "None" => Some(Self::NoAid),
            "Aid Government" => Some(Self::AidGovernment),
            "Aid Rebellion" => Some(Self::AidRebellion),
            _ => None,
        }
    }

    /// Sign applied to the shock amount: `+1`, `-1`, or `0`.
    pub const fn sign(self) -> f64 {
        match self {
            Self::NoAid => 0.0,
            Self::AidGovernment => 1.0,
            Self::AidRebellion => -1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduler_accepts_short_and_legacy_names() {
        assert_eq!(SchedulerKind::from_name("Random"), Some(SchedulerKind::Random));
        assert_eq!(
            SchedulerKind::from_name("SimultaneousActivation"),
            Some(SchedulerKind::Simultaneous)
        );
        assert_eq!(SchedulerKind::from_name("StagedActivation"), Some(SchedulerKind::Staged));
        assert_eq!(SchedulerKind::from_name("BaseScheduler"), Some(SchedulerKind::Sequential));
        assert_eq!(SchedulerKind::from_name("Chaotic"), None);
    }

    #[test]
    fn only_random_and_sequential_are_interleaved() {
        assert!(SchedulerKind::Random.is_interleaved());
        assert!(SchedulerKind::Sequential.is_interleaved());
        assert!(!SchedulerKind::Simultaneous.is_interleaved());
        assert!(!SchedulerKind::Staged.is_interleaved());
    }

    #[test]
    fn distribution_names_are_case_insensitive() {
        assert_eq!(DistributionKind::from_name("Normal"), Some(DistributionKind::Normal));
        assert_eq!(DistributionKind::from_name(" gamma "), Some(DistributionKind::Gamma));
        assert_eq!(DistributionKind::from_name("poisson"), None);
    }

    #[test]
    fn aid_direction_names_round_trip_through_serde() {
        let json = serde_json::to_string(&AidDirection::AidRebellion).unwrap_or_default();
        assert_eq!(json, "\"Aid Rebellion\"");
        assert_eq!(AidDirection::from_name("Aid Government"), Some(AidDirection::AidGovernment));
        assert_eq!(AidDirection::from_name("Aid Everyone"), None);
    }

    #[test]
    fn breed_tags_are_lowercase() {
        assert_eq!(Breed::Citizen.to_string(), "citizen");
        let json = serde_json::to_string(&Breed::Cop).unwrap_or_default();
        assert_eq!(json, "\"cop\"");
    }
}
