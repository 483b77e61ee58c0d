//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every record the diplomacy core touches has a strongly-typed ID so that a
//! treaty id can never be passed where a war id is expected. All IDs use
//! UUID v7 (time-ordered), which also gives them a total order: the
//! canonical "smaller identifier first" rule for relation pairs is the
//! [`Uuid`] ordering.

use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
        )]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a dynasty (a player- or AI-controlled polity).
    DynastyId
}

define_id! {
    /// Unique identifier for a territory in the territory directory.
    TerritoryId
}

define_id! {
    /// Unique identifier for a treaty between two dynasties.
    TreatyId
}

define_id! {
    /// Unique identifier for a war between an attacker and a defender.
    WarId
}

define_id! {
    /// Unique identifier for a diplomatic event record.
    EventId
}

define_id! {
    /// Unique identifier for a ledger entry (gold transfer record).
    LedgerEntryId
}

// ---------------------------------------------------------------------------
// DynastyPair
// ---------------------------------------------------------------------------

/// An unordered pair of dynasties, stored canonically.
///
/// The smaller identifier is always `first`. The only way to build a pair is
/// through [`DynastyPair::new`], which normalises the order, so `(a, b)` and
/// `(b, a)` produce equal keys. Deserialization goes through the same
/// constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DynastyPair {
    /// The smaller of the two identifiers.
    first: DynastyId,
    /// The larger of the two identifiers.
    second: DynastyId,
}

impl DynastyPair {
    /// Build the canonical pair for two dynasties, in either order.
    pub fn new(a: DynastyId, b: DynastyId) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// The smaller identifier.
    pub const fn first(&self) -> DynastyId {
        self.first
    }

    /// The larger identifier.
    pub const fn second(&self) -> DynastyId {
        self.second
    }

    /// Whether `id` is one of the two members.
    pub fn contains(&self, id: DynastyId) -> bool {
        self.first == id || self.second == id
    }

    /// The member that is not `id`, or `None` if `id` is not a member.
    pub fn other(&self, id: DynastyId) -> Option<DynastyId> {
        if self.first == id {
            Some(self.second)
        } else if self.second == id {
            Some(self.first)
        } else {
            None
        }
    }
}

impl<'de> Deserialize<'de> for DynastyPair {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            first: DynastyId,
            second: DynastyId,
        }

        let raw = Raw::deserialize(deserializer)?;
        Ok(Self::new(raw.first, raw.second))
    }
}

impl core::fmt::Display for DynastyPair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}<->{}", self.first, self.second)
    }
}
