//! Site characterization supplied alongside a diagnostic session.
//!
//! The core never interprets these values; they are forwarded verbatim to
//! the report builders and the assistant.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl ImpactLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ImpactLevel::Low => "low",
            ImpactLevel::Medium => "medium",
            ImpactLevel::High => "high",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LandUse {
    pub protected_area: bool,
    pub forestry: bool,
    pub urban_interface: bool,
    pub agriculture: bool,
}

impl LandUse {
    /// Keys of the enabled flags, in declaration order.
    pub fn active(&self) -> Vec<&'static str> {
        [
            ("protectedArea", self.protected_area),
            ("forestry", self.forestry),
            ("urbanInterface", self.urban_interface),
            ("agriculture", self.agriculture),
        ]
        .into_iter()
        .filter(|(_, on)| *on)
        .map(|(key, _)| key)
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SiteContext {
    pub country: String,
    pub specific_location: String,
    pub region: String,
    pub species: Vec<String>,
    /// 0 = initial arrival, 100 = massive invasion.
    pub invasion_stage: u8,
    pub land_use: LandUse,
    pub impact_level: ImpactLevel,
    pub additional_notes: String,
}

impl Default for SiteContext {
    fn default() -> Self {
        Self {
            country: String::new(),
            specific_location: String::new(),
            region: String::new(),
            species: Vec::new(),
            invasion_stage: 10,
            land_use: LandUse::default(),
            impact_level: ImpactLevel::Low,
            additional_notes: String::new(),
        }
    }
}
