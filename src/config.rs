use crate::cluster::ClusterOptions;
use crate::constants::*;
use serde::{Deserialize, Serialize};

/// Tunables for clustering, wall geometry and placement. Missing fields in a
/// deserialized document fall back to the defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Ramp clusters below this size are discarded; `None` keeps every cluster.
    pub ramp_min_cluster_size: Option<usize>,
    pub ramp_neighbor_distance: u32,
    pub region_neighbor_distance: u32,
    pub cluster_resolution: u32,
    pub depot_radius_sq: f32,
    pub corner_depot_radius_sq: f32,
    pub production_radius_sq: f32,
    pub addon_shift: f32,
    pub enemy_reject_radius: f32,
    pub scan_step: u32,
    pub unit_radius: f32,
    pub seal_check_resolution: u32,
    pub seal_check_margin: i32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        TerrainConfig {
            ramp_min_cluster_size: Some(MIN_RAMP_CLUSTER_SIZE),
            ramp_neighbor_distance: RAMP_NEIGHBOR_DISTANCE,
            region_neighbor_distance: REGION_NEIGHBOR_DISTANCE,
            cluster_resolution: 1,
            depot_radius_sq: DEPOT_RADIUS_SQ,
            corner_depot_radius_sq: CORNER_DEPOT_RADIUS_SQ,
            production_radius_sq: PRODUCTION_RADIUS_SQ,
            addon_shift: ADDON_SHIFT,
            enemy_reject_radius: ENEMY_REJECT_RADIUS,
            scan_step: SCAN_STEP,
            unit_radius: GROUND_UNIT_RADIUS,
            seal_check_resolution: SEAL_CHECK_RESOLUTION,
            seal_check_margin: SEAL_CHECK_MARGIN,
        }
    }
}

impl TerrainConfig {
    pub fn ramp_cluster_options(&self) -> ClusterOptions {
        ClusterOptions {
            max_distance: self.ramp_neighbor_distance,
            min_size: self.ramp_min_cluster_size,
            resolution: self.cluster_resolution.max(1),
        }
    }

    pub fn region_cluster_options(&self) -> ClusterOptions {
        ClusterOptions {
            max_distance: self.region_neighbor_distance,
            min_size: None,
            resolution: self.cluster_resolution.max(1),
        }
    }
}
