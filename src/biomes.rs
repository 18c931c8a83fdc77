//! Closed biome classification shared by both world variants.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    Ocean,
    DeepOcean,
    CoastalWaters,
    IceCap,
    Tundra,
    Taiga,
    Grassland,
    Savanna,
    Desert,
    Forest,
    Rainforest,
    Mountains,
    Hills,
    Wetlands,
}

impl Biome {
    pub const ALL: [Biome; 14] = [
        Biome::Ocean,
        Biome::DeepOcean,
        Biome::CoastalWaters,
        Biome::IceCap,
        Biome::Tundra,
        Biome::Taiga,
        Biome::Grassland,
        Biome::Savanna,
        Biome::Desert,
        Biome::Forest,
        Biome::Rainforest,
        Biome::Mountains,
        Biome::Hills,
        Biome::Wetlands,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Biome::Ocean => "Ocean",
            Biome::DeepOcean => "Deep Ocean",
            Biome::CoastalWaters => "Coastal Waters",
            Biome::IceCap => "Ice Cap",
            Biome::Tundra => "Tundra",
            Biome::Taiga => "Taiga",
            Biome::Grassland => "Grassland",
            Biome::Savanna => "Savanna",
            Biome::Desert => "Desert",
            Biome::Forest => "Forest",
            Biome::Rainforest => "Rainforest",
            Biome::Mountains => "Mountains",
            Biome::Hills => "Hills",
            Biome::Wetlands => "Wetlands",
        }
    }

    /// Palette color used by the biome view and as the fallback for other views.
    pub fn color(&self) -> [u8; 3] {
        match self {
            Biome::Ocean => [28, 66, 120],
            Biome::DeepOcean => [15, 40, 90],
            Biome::CoastalWaters => [64, 164, 223],
            Biome::IceCap => [240, 248, 255],
            Biome::Tundra => [139, 139, 128],
            Biome::Taiga => [43, 63, 40],
            Biome::Grassland => [154, 205, 50],
            Biome::Savanna => [210, 180, 90],
            Biome::Desert => [253, 225, 171],
            Biome::Forest => [34, 139, 34],
            Biome::Rainforest => [0, 100, 0],
            Biome::Mountains => [139, 137, 137],
            Biome::Hills => [107, 142, 35],
            Biome::Wetlands => [47, 79, 79],
        }
    }

    pub fn is_water(&self) -> bool {
        matches!(self, Biome::Ocean | Biome::DeepOcean | Biome::CoastalWaters)
    }

    /// Palette of the ecology variant, which only tells eight biomes apart.
    /// Water collapses to one ocean color and relief to the nearest land cover.
    pub fn ecology_color(&self) -> [u8; 3] {
        match self {
            Biome::Ocean | Biome::DeepOcean | Biome::CoastalWaters => [28, 66, 84],
            Biome::IceCap => [255, 255, 255],
            Biome::Tundra | Biome::Mountains => [139, 139, 128],
            Biome::Taiga => [43, 63, 40],
            Biome::Grassland | Biome::Savanna | Biome::Hills => [167, 177, 84],
            Biome::Desert => [253, 225, 171],
            Biome::Forest | Biome::Wetlands => [76, 132, 55],
            Biome::Rainforest => [59, 103, 43],
        }
    }

    /// Classify a tile from altitude in [-1, 1], temperature in °C and
    /// rainfall in mm/year.
    pub fn classify(altitude: f32, temperature: f32, rainfall: f32) -> Biome {
        if altitude < -0.35 {
            return Biome::DeepOcean;
        }
        if altitude < -0.08 {
            return Biome::Ocean;
        }
        if altitude < 0.0 {
            return Biome::CoastalWaters;
        }
        if temperature < -15.0 {
            return Biome::IceCap;
        }
        if altitude > 0.7 {
            return Biome::Mountains;
        }
        if altitude > 0.5 {
            return Biome::Hills;
        }
        if temperature < -5.0 {
            return Biome::Tundra;
        }
        if temperature < 3.0 {
            return Biome::Taiga;
        }
        if rainfall < 250.0 {
            return Biome::Desert;
        }
        if rainfall > 2500.0 && temperature > 20.0 {
            return Biome::Rainforest;
        }
        if rainfall > 1800.0 && altitude < 0.1 {
            return Biome::Wetlands;
        }
        if rainfall > 1200.0 {
            return Biome::Forest;
        }
        if temperature > 22.0 {
            return Biome::Savanna;
        }
        Biome::Grassland
    }

    /// Plant carrying capacity used by the ecology variant.
    pub fn max_plant_biomass(&self) -> f32 {
        match self {
            Biome::Ocean | Biome::DeepOcean | Biome::CoastalWaters | Biome::IceCap => 0.0,
            Biome::Tundra => 15.0,
            Biome::Taiga => 30.0,
            Biome::Grassland => 60.0,
            Biome::Savanna => 45.0,
            Biome::Desert => 5.0,
            Biome::Forest => 100.0,
            Biome::Rainforest => 120.0,
            Biome::Mountains => 10.0,
            Biome::Hills => 40.0,
            Biome::Wetlands => 80.0,
        }
    }
}
