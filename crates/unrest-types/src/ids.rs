//! Type-safe identifier wrappers around `u64`.
//!
//! Identifiers are assigned sequentially in grid-population order, so the
//! same seed always yields the same IDs. The raw value doubles as the
//! agent's index into the orchestrator's agent collection.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around `u64` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Create an identifier from its raw value.
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Return the inner `u64` value.
            pub const fn into_inner(self) -> u64 {
                self.0
            }

            /// Return the raw value as a collection index, if it fits.
            pub fn index(self) -> Option<usize> {
                usize::try_from(self.0).ok()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for an agent (citizen or cop) in the simulation.
    AgentId
}
