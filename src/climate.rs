use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TilesetError;

/// Temperature band a climate tile stands for, ordered coldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClimateClass {
    Polar,
    Subpolar,
    Boreal,
    CoolTemperate,
    WarmTemperate,
    Subtropical,
    Tropical,
}

impl ClimateClass {
    pub const ALL: [ClimateClass; 7] = [
        ClimateClass::Polar,
        ClimateClass::Subpolar,
        ClimateClass::Boreal,
        ClimateClass::CoolTemperate,
        ClimateClass::WarmTemperate,
        ClimateClass::Subtropical,
        ClimateClass::Tropical,
    ];

    /// Label used for the tile `type` attribute.
    pub fn label(self) -> &'static str {
        match self {
            ClimateClass::Polar => "Polar",
            ClimateClass::Subpolar => "Subpolar",
            ClimateClass::Boreal => "Boreal",
            ClimateClass::CoolTemperate => "CoolTemperate",
            ClimateClass::WarmTemperate => "WarmTemperate",
            ClimateClass::Subtropical => "Subtropical",
            ClimateClass::Tropical => "Tropical",
        }
    }

    /// Position in the coldest-to-warmest ordering.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn colder(self) -> Option<ClimateClass> {
        self.index()
            .checked_sub(1)
            .map(|index| ClimateClass::ALL[index])
    }

    pub fn warmer(self) -> Option<ClimateClass> {
        ClimateClass::ALL.get(self.index() + 1).copied()
    }
}

impl fmt::Display for ClimateClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ClimateClass {
    type Err = TilesetError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ClimateClass::ALL
            .iter()
            .copied()
            .find(|class| class.label() == value.trim())
            .ok_or_else(|| TilesetError::UnknownClimate(value.to_string()))
    }
}
