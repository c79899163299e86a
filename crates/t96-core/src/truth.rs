//! The five evidence categories the player is trying to document.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of categories needed for victory.
pub const TRUTH_COUNT: usize = 5;

/// A fixed evidence classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruthCategory {
    /// Physical debris moved between facilities.
    DebrisRelocation,
    /// Living beings captured and held.
    BeingContainment,
    /// Telepathic reconnaissance by the beings.
    TelepathicScouts,
    /// Foreign governments involved in the cover-up.
    InternationalActors,
    /// The 2026 transition window.
    #[serde(rename = "transition_2026")]
    Transition2026,
}

impl TruthCategory {
    /// All categories in canonical order.
    pub const ALL: [TruthCategory; TRUTH_COUNT] = [
        TruthCategory::DebrisRelocation,
        TruthCategory::BeingContainment,
        TruthCategory::TelepathicScouts,
        TruthCategory::InternationalActors,
        TruthCategory::Transition2026,
    ];

    /// Stable identifier used in saves and logs.
    pub fn id(self) -> &'static str {
        match self {
            Self::DebrisRelocation => "debris_relocation",
            Self::BeingContainment => "being_containment",
            Self::TelepathicScouts => "telepathic_scouts",
            Self::InternationalActors => "international_actors",
            Self::Transition2026 => "transition_2026",
        }
    }

    /// Uppercase label shown in evidence banners.
    pub fn label(self) -> &'static str {
        match self {
            Self::DebrisRelocation => "DEBRIS TRANSFER",
            Self::BeingContainment => "BIO CONTAINMENT",
            Self::TelepathicScouts => "TELEPATHIC RECON",
            Self::InternationalActors => "INTERNATIONAL",
            Self::Transition2026 => "TRANSITION 2026",
        }
    }

    /// Parse an identifier.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }
}

impl fmt::Display for TruthCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
