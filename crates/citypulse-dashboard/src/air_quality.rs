//! Air-quality index to display tier.

use std::fmt;

/// Display tier for the provider's 1-5 air-quality index.
///
/// Values outside 1-5 map to `Unknown` instead of being left unstyled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AqiTier {
    Good,
    Fair,
    Moderate,
    Poor,
    VeryPoor,
    Unknown,
}

/// Foreground and background colours for a tier, as hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierColors {
    pub foreground: &'static str,
    pub background: &'static str,
}

impl AqiTier {
    pub fn from_index(index: u8) -> Self {
        match index {
            1 => Self::Good,
            2 => Self::Fair,
            3 => Self::Moderate,
            4 => Self::Poor,
            5 => Self::VeryPoor,
            _ => Self::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Moderate => "Moderate",
            Self::Poor => "Poor",
            Self::VeryPoor => "Very poor",
            Self::Unknown => "Unknown",
        }
    }

    pub fn colors(&self) -> TierColors {
        let (foreground, background) = match self {
            Self::Good => ("#16a34a", "#dcfce7"),
            Self::Fair => ("#ca8a04", "#fef9c3"),
            Self::Moderate => ("#ea580c", "#ffedd5"),
            Self::Poor => ("#dc2626", "#fee2e2"),
            Self::VeryPoor => ("#9333ea", "#f3e8ff"),
            Self::Unknown => ("#4b5563", "#f3f4f6"),
        };
        TierColors {
            foreground,
            background,
        }
    }
}

impl fmt::Display for AqiTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
