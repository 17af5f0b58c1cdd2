//! Crop descriptor consumed by the planner.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropType {
    Tomato,
    Rice,
    Chili,
    /// Anything the detector or user supplied that we have no rules for.
    #[serde(other)]
    Unknown,
}

impl CropType {
    pub fn as_str(self) -> &'static str {
        match self {
            CropType::Tomato => "tomato",
            CropType::Rice => "rice",
            CropType::Chili => "chili",
            CropType::Unknown => "crop",
        }
    }
}

impl FromStr for CropType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tomato" => Ok(CropType::Tomato),
            "rice" => Ok(CropType::Rice),
            "chili" | "chilli" => Ok(CropType::Chili),
            other => Err(format!("unknown crop: {other}")),
        }
    }
}

impl fmt::Display for CropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthStage {
    Germination,
    Seedling,
    Vegetative,
    Flowering,
    Fruiting,
    Harvest,
}

impl GrowthStage {
    pub fn as_str(self) -> &'static str {
        match self {
            GrowthStage::Germination => "germination",
            GrowthStage::Seedling => "seedling",
            GrowthStage::Vegetative => "vegetative",
            GrowthStage::Flowering => "flowering",
            GrowthStage::Fruiting => "fruiting",
            GrowthStage::Harvest => "harvest",
        }
    }

    /// Three goals to keep in view for a week spent in this stage.
    pub fn weekly_goals(self) -> [&'static str; 3] {
        match self {
            GrowthStage::Germination => [
                "Achieve 90% germination rate",
                "Maintain optimal soil moisture",
                "Prevent fungal diseases",
            ],
            GrowthStage::Seedling => [
                "Ensure strong root development",
                "Prevent leggy growth",
                "Begin light fertilization",
            ],
            GrowthStage::Vegetative => [
                "Promote leaf and stem growth",
                "Apply nitrogen-rich fertilizer",
                "Control weeds and pests",
            ],
            GrowthStage::Flowering => [
                "Ensure proper pollination",
                "Apply phosphorus-rich fertilizer",
                "Monitor for blossom drop",
            ],
            GrowthStage::Fruiting => [
                "Support fruit development",
                "Maintain consistent watering",
                "Prevent pest damage to fruits",
            ],
            GrowthStage::Harvest => [
                "Harvest at optimal ripeness",
                "Proper post-harvest handling",
                "Prepare for next cycle",
            ],
        }
    }
}

impl FromStr for GrowthStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "germination" => Ok(GrowthStage::Germination),
            "seedling" => Ok(GrowthStage::Seedling),
            "vegetative" => Ok(GrowthStage::Vegetative),
            "flowering" => Ok(GrowthStage::Flowering),
            "fruiting" => Ok(GrowthStage::Fruiting),
            "harvest" => Ok(GrowthStage::Harvest),
            other => Err(format!("unknown growth stage: {other}")),
        }
    }
}

impl fmt::Display for GrowthStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropInfo {
    pub crop_type: CropType,
    pub growth_stage: GrowthStage,
    pub days_since_planting: u32,
}

impl CropInfo {
    pub fn new(crop_type: CropType, growth_stage: GrowthStage, days_since_planting: u32) -> Self {
        Self {
            crop_type,
            growth_stage,
            days_since_planting,
        }
    }

    pub fn is_tomato(&self) -> bool {
        self.crop_type == CropType::Tomato
    }
}

impl Default for CropInfo {
    fn default() -> Self {
        Self::new(CropType::Tomato, GrowthStage::Vegetative, 30)
    }
}
