pub mod analysis;
pub mod cluster;
pub mod config;
pub mod constants;
pub mod error;
pub mod footprint;
pub mod geometry;
pub mod host;
pub mod hull;
pub mod location;
pub mod occupancy;
pub mod orientation;
pub mod placement;
pub mod ramp;
pub mod terrain;

pub use analysis::{TerrainAnalysis, TerrainAnalysisBuilder};
pub use config::TerrainConfig;
pub use error::{GeometryError, TerrainError};
pub use footprint::FootprintKind;
pub use host::*;
pub use location::*;
pub use orientation::BaseOrientation;
pub use ramp::{Ramp, RampWallPlan, WallPart};
pub use terrain::{GridTerrain, TerrainFlags, TerrainQuery};
