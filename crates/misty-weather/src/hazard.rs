//! Heat index hazard classification.
//!
//! Classification only yields a tier; the texts and colours shown with it
//! live in a separate static table.

use serde::{Deserialize, Serialize};

/// Heat-related risk, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardTier {
    NotHazardous,
    Caution,
    ExtremeCaution,
    Danger,
    ExtremeDanger,
}

/// Display metadata for a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HazardInfo {
    pub title: &'static str,
    pub explanation: &'static str,
    /// Background colour as `#rrggbb`
    pub color: &'static str,
}

/// Lower bound (inclusive) of every tier above `NotHazardous`, in °C
const THRESHOLDS: [(f64, HazardTier); 4] = [
    (52.0, HazardTier::ExtremeDanger),
    (42.0, HazardTier::Danger),
    (33.0, HazardTier::ExtremeCaution),
    (27.0, HazardTier::Caution),
];

const NOT_HAZARDOUS: HazardInfo = HazardInfo {
    title: "Not Hazardous",
    explanation: "The weather is comfortable and safe. No heat-related risks.",
    color: "#e6e6e6",
};

const CAUTION: HazardInfo = HazardInfo {
    title: "Caution",
    explanation: "The heat index is rising. Stay hydrated and take breaks if you are outdoors.",
    color: "#ffff00",
};

const EXTREME_CAUTION: HazardInfo = HazardInfo {
    title: "Extreme Caution",
    explanation: "Heat levels are high. Limit your exposure to the sun and take precautions to stay cool.",
    color: "#ffcc00",
};

const DANGER: HazardInfo = HazardInfo {
    title: "Danger",
    explanation: "Dangerous heat conditions are present. Avoid prolonged outdoor activities, especially in direct sunlight.",
    color: "#ff6600",
};

const EXTREME_DANGER: HazardInfo = HazardInfo {
    title: "Extreme Danger",
    explanation: "Extreme heat warning! Stay indoors and avoid any strenuous activity. This can lead to heat exhaustion or heatstroke.",
    color: "#cc0001",
};

/// Classify a feels-like temperature (°C).
///
/// Total: NaN carries no evidence of heat and maps to `NotHazardous`.
#[must_use]
pub fn classify(feels_like_c: f64) -> HazardTier {
    THRESHOLDS
        .iter()
        .find(|(lower, _)| feels_like_c >= *lower)
        .map(|(_, tier)| *tier)
        .unwrap_or(HazardTier::NotHazardous)
}

impl HazardTier {
    pub const ALL: [HazardTier; 5] = [
        HazardTier::NotHazardous,
        HazardTier::Caution,
        HazardTier::ExtremeCaution,
        HazardTier::Danger,
        HazardTier::ExtremeDanger,
    ];

    #[must_use]
    pub fn info(self) -> &'static HazardInfo {
        match self {
            HazardTier::NotHazardous => &NOT_HAZARDOUS,
            HazardTier::Caution => &CAUTION,
            HazardTier::ExtremeCaution => &EXTREME_CAUTION,
            HazardTier::Danger => &DANGER,
            HazardTier::ExtremeDanger => &EXTREME_DANGER,
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        self.info().title
    }

    #[must_use]
    pub fn explanation(self) -> &'static str {
        self.info().explanation
    }

    #[must_use]
    pub fn color(self) -> &'static str {
        self.info().color
    }
}
