//! The per-game terrain analysis session.
//!
//! `TerrainAnalysisBuilder` provides a fluent, append-only API for
//! configuring the analysis. The resulting `TerrainAnalysis` owns every cache
//! the subsystem keeps for the lifetime of a game: the ramp list, the base
//! orientation, the wall plan and the occupancy layers. Ramps are clustered
//! on first use. The wall plan is kept until a structure standing on one of
//! its anchors is destroyed.

use crate::cluster::*;
use crate::config::TerrainConfig;
use crate::error::*;
use crate::footprint::FootprintKind;
use crate::host::*;
use crate::hull::ConvexHull;
use crate::location::*;
use crate::occupancy::*;
use crate::orientation::*;
use crate::placement::PlacementPlanner;
use crate::ramp::*;
use crate::terrain::TerrainQuery;
use fnv::FnvHashSet;
use log::*;

/// Append-only builder for a `TerrainAnalysis`.
pub struct TerrainAnalysisBuilder<T: TerrainQuery> {
    terrain: T,
    home: Point2,
    resources: Vec<Point2>,
    config: TerrainConfig,
}

impl<T: TerrainQuery> TerrainAnalysisBuilder<T> {
    /// Start an analysis of `terrain` for a base at `home`.
    pub fn new(terrain: T, home: Point2) -> Self {
        TerrainAnalysisBuilder {
            terrain,
            home,
            resources: Vec::new(),
            config: TerrainConfig::default(),
        }
    }

    /// Add resource positions of the home base's mineral line.
    pub fn resources<I: IntoIterator<Item = Point2>>(mut self, resources: I) -> Self {
        self.resources.extend(resources);
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: TerrainConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the ramp noise filter (default: 8). `None` keeps every cluster.
    pub fn ramp_min_cluster_size(mut self, size: Option<usize>) -> Self {
        self.config.ramp_min_cluster_size = size;
        self
    }

    /// Set the placement scan step in cells (default: 2).
    pub fn scan_step(mut self, step: u32) -> Self {
        self.config.scan_step = step;
        self
    }

    /// Set the hostile proximity radius for placements (default: 8).
    pub fn enemy_reject_radius(mut self, radius: f32) -> Self {
        self.config.enemy_reject_radius = radius;
        self
    }

    pub fn unit_radius(mut self, radius: f32) -> Self {
        self.config.unit_radius = radius;
        self
    }

    pub fn build(self) -> TerrainAnalysis<T> {
        let orientation = classify_orientation(self.home, &self.terrain.map_bounds());
        let main = region_layer(&self.terrain, &self.config, MAIN_LAYER, self.home);

        let mut hull_points = self.resources.clone();
        hull_points.push(self.home);
        let mineral_hull = match ConvexHull::new(&hull_points) {
            Ok(hull) => Some(hull),
            Err(err) => {
                debug!("Mineral line exclusion disabled: {}", err);
                None
            }
        };

        info!(
            "Terrain analysis: home ({}, {}) {:?}, main region {} cells",
            self.home.x,
            self.home.y,
            orientation,
            main.len()
        );

        TerrainAnalysis {
            terrain: self.terrain,
            config: self.config,
            home: self.home,
            orientation,
            ramps: None,
            wall: None,
            occupancy: OccupancyGrid::new(main),
            mineral_hull,
        }
    }
}

/// Session state for one map instance.
pub struct TerrainAnalysis<T: TerrainQuery> {
    terrain: T,
    config: TerrainConfig,
    home: Point2,
    orientation: BaseOrientation,
    ramps: Option<Vec<Ramp>>,
    wall: Option<CachedWall>,
    occupancy: OccupancyGrid,
    mineral_hull: Option<ConvexHull>,
}

#[derive(Clone, Debug)]
struct CachedWall {
    hint: GridCell,
    ramp: u32,
    plan: RampWallPlan,
}

impl<T: TerrainQuery> TerrainAnalysis<T> {
    pub fn terrain(&self) -> &T {
        &self.terrain
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn home(&self) -> Point2 {
        self.home
    }

    pub fn occupancy(&self) -> &OccupancyGrid {
        &self.occupancy
    }

    pub fn mineral_hull(&self) -> Option<&ConvexHull> {
        self.mineral_hull.as_ref()
    }

    pub fn classify_orientation(&self) -> BaseOrientation {
        self.orientation
    }

    /// Every ramp on the map, clustered on first call.
    pub fn ramps(&mut self) -> &[Ramp] {
        let terrain = &self.terrain;
        let config = &self.config;
        self.ramps.get_or_insert_with(|| find_ramps(terrain, config))
    }

    /// The cached wall plan, if one has been computed and not invalidated.
    pub fn wall_plan(&self) -> Option<&RampWallPlan> {
        self.wall.as_ref().map(|wall| &wall.plan)
    }

    /// Wall plan for the ramp whose top is nearest to `hint`.
    ///
    /// The plan is cached per hint. Geometry failures and walls whose parts
    /// overlap or stand on unbuildable ground are returned without caching
    /// anything, so a later call retries.
    pub fn analyze_ramp(&mut self, hint: Point2) -> Result<RampWallPlan, TerrainError> {
        if let Some(wall) = &self.wall {
            if wall.hint == hint.key() {
                return Ok(wall.plan);
            }
        }

        self.ramps();
        let ramps = self.ramps.as_deref().unwrap_or_default();

        let ramp = ramps
            .iter()
            .min_by(|a, b| {
                a.top_center()
                    .distance_squared(hint)
                    .total_cmp(&b.top_center().distance_squared(hint))
            })
            .ok_or(TerrainError::NoRampFound)?;

        debug!(
            "Ramp {} selected for ({}, {}), {:.1} away",
            ramp.id(),
            hint.x,
            hint.y,
            ramp.top_center().distance(hint)
        );

        let plan = solve_wall(ramp, &self.terrain, &self.config).map_err(|err| {
            warn!("Wall plan for ramp {} abandoned this tick: {}", ramp.id(), err);
            err
        })?;

        if !plan.seals(ramp, &self.terrain, &self.config) {
            warn!("Wall plan for ramp {} leaves a gap", ramp.id());
        }

        info!(
            "Wall plan for ramp {}: depots ({}, {}) ({}, {}), production ({}, {}){}",
            ramp.id(),
            plan.depots[0].x,
            plan.depots[0].y,
            plan.depots[1].x,
            plan.depots[1].y,
            plan.production.x,
            plan.production.y,
            if plan.addon_shifted { ", shifted for addon" } else { "" }
        );

        self.wall = Some(CachedWall {
            hint: hint.key(),
            ramp: ramp.id(),
            plan,
        });

        Ok(plan)
    }

    pub fn is_occupied(&self, pos: Point2) -> bool {
        self.occupancy.is_occupied(pos)
    }

    /// Where the placement scan starts: the wall's production structure once
    /// a plan exists, the home base before that.
    pub fn placement_reference(&self) -> Point2 {
        self.wall_plan().map(|plan| plan.production).unwrap_or(self.home)
    }

    /// Next free spot in the main layer for a structure of `kind`.
    pub fn find_next_build_spot<E: EnemyQuery + ?Sized>(
        &self,
        orientation: BaseOrientation,
        kind: FootprintKind,
        wants_addon: bool,
        enemies: &E,
    ) -> Option<Point2> {
        self.find_spot_in(
            MAIN_LAYER,
            orientation,
            kind,
            wants_addon,
            self.placement_reference(),
            enemies,
            |_| true,
        )
    }

    /// Next free spot in the named layer, scanning from `reference`.
    #[allow(clippy::too_many_arguments)]
    pub fn find_spot_in<E, F>(
        &self,
        layer: &str,
        orientation: BaseOrientation,
        kind: FootprintKind,
        wants_addon: bool,
        reference: Point2,
        enemies: &E,
        accept: F,
    ) -> Option<Point2>
    where
        E: EnemyQuery + ?Sized,
        F: FnMut(Point2) -> bool,
    {
        let layer = self.occupancy.layer(layer)?;
        let reserved: FnvHashSet<GridCell> = self
            .wall_plan()
            .map(|plan| plan.cells().into_iter().collect())
            .unwrap_or_default();

        PlacementPlanner::new(layer, &self.config)
            .exclude_hull(self.mineral_hull.as_ref())
            .reserve(&reserved)
            .find_spot_where(orientation, kind, wants_addon, reference, enemies, accept)
    }

    /// Pick a spot for `structure`, confirm it with the host and issue one
    /// build command. Returns the chosen anchor.
    pub fn issue_next_build<P, E, S>(
        &self,
        structure: StructureType,
        builder: &Unit,
        placement: &P,
        enemies: &E,
        sink: &mut S,
    ) -> Option<Point2>
    where
        P: PlacementQuery + ?Sized,
        E: EnemyQuery + ?Sized,
        S: ActionSink + ?Sized,
    {
        let ability = structure.build_ability();
        let spot = self.find_spot_in(
            MAIN_LAYER,
            self.orientation,
            structure.footprint(),
            structure.takes_addon(),
            self.placement_reference(),
            enemies,
            |anchor| placement.can_place(ability, anchor, Some(builder)),
        )?;

        info!("Build {:?} at ({}, {}) with unit {}", structure, spot.x, spot.y, builder.tag);
        sink.issue_build_command(builder, ability, spot);

        Some(spot)
    }

    /// Issue one build command for a part of the cached wall plan. Nothing is
    /// issued without a plan, when the part is already built, or when the
    /// host rejects the spot.
    ///
    /// The addon is built by the standing production structure, which the
    /// caller passes as `builder`; until it stands the addon is not issued.
    pub fn issue_wall_build<P, S>(
        &self,
        part: WallPart,
        builder: &Unit,
        placement: &P,
        sink: &mut S,
    ) -> Option<Point2>
    where
        P: PlacementQuery + ?Sized,
        S: ActionSink + ?Sized,
    {
        let plan = self.wall_plan()?;
        let anchor = plan.anchor(part);
        let structure = part.structure();

        if self.occupancy.is_occupied(anchor) {
            trace!("Wall {:?} already standing at ({}, {})", part, anchor.x, anchor.y);
            return None;
        }

        if part == WallPart::Addon && !self.occupancy.is_occupied(plan.production) {
            trace!("Wall addon waits for its production structure");
            return None;
        }

        let ability = structure.build_ability();
        if !placement.can_place(ability, anchor, Some(builder)) {
            debug!("Wall {:?} at ({}, {}) rejected by host", part, anchor.x, anchor.y);
            return None;
        }

        info!(
            "Build wall {:?} ({:?}) at ({}, {}) with unit {}",
            part,
            structure,
            anchor.x,
            anchor.y,
            builder.tag
        );
        sink.issue_build_command(builder, ability, anchor);

        Some(anchor)
    }

    /// Mark a finished structure's footprint in every layer.
    pub fn on_structure_complete(&mut self, unit: &Unit) {
        if let Some(structure) = unit.structure {
            self.occupancy.mark_footprint(unit.position, structure.footprint().base(), true);
        } else {
            trace!("Ignoring completion of non-structure {}", unit.tag);
        }
    }

    /// Clear a lost structure's footprint. Losing a wall structure drops the
    /// cached plan so the next `analyze_ramp` recomputes it.
    pub fn on_structure_destroyed(&mut self, unit: &Unit) {
        let structure = match unit.structure {
            Some(structure) => structure,
            None => return,
        };

        self.occupancy.mark_footprint(unit.position, structure.footprint().base(), false);

        let hit = self
            .wall
            .as_ref()
            .and_then(|wall| wall.plan.part_at(unit.position).map(|part| (wall.ramp, part)));
        if let Some((ramp, part)) = hit {
            info!("Wall {:?} of ramp {} destroyed, plan invalidated", part, ramp);
            self.wall = None;
        }
    }

    /// Add the buildable region around `hint` as an occupancy layer named
    /// `name`. Returns the number of cells in the layer.
    pub fn add_region_layer(&mut self, name: &str, hint: Point2) -> usize {
        let layer = region_layer(&self.terrain, &self.config, name, hint);
        let cells = layer.len();
        self.occupancy.add_layer(layer);
        cells
    }
}

fn find_ramps<T: TerrainQuery + ?Sized>(terrain: &T, config: &TerrainConfig) -> Vec<Ramp> {
    let clusters = cluster_cells(
        ramp_candidates(terrain),
        terrain.map_bounds(),
        &config.ramp_cluster_options(),
    );

    let ramps: Vec<Ramp> = clusters
        .iter()
        .filter_map(|cluster| match Ramp::new(cluster, terrain) {
            Ok(ramp) => Some(ramp),
            Err(err) => {
                trace!("Cluster {} is not a ramp: {}", cluster.id(), err);
                None
            }
        })
        .collect();

    debug!("Found {} ramps in {} clusters", ramps.len(), clusters.len());

    ramps
}

/// Layer over the buildable region containing `hint`, or the one nearest to it.
fn region_layer<T: TerrainQuery + ?Sized>(
    terrain: &T,
    config: &TerrainConfig,
    name: &str,
    hint: Point2,
) -> OccupancyLayer {
    let clusters = cluster_cells(
        buildable_candidates(terrain),
        terrain.map_bounds(),
        &config.region_cluster_options(),
    );

    let hint_cell = GridCell::from_point(hint).normalized();
    let nearest_distance = |cluster: &Cluster| {
        cluster
            .cells()
            .iter()
            .map(|cell| cell.center().distance_squared(hint))
            .fold(f32::INFINITY, f32::min)
    };

    let region = clusters
        .iter()
        .find(|cluster| cluster.contains(hint_cell))
        .or_else(|| {
            clusters
                .iter()
                .min_by(|a, b| nearest_distance(a).total_cmp(&nearest_distance(b)))
        });

    match region {
        Some(cluster) => OccupancyLayer::new(name, cluster.cells().iter().copied()),
        None => {
            warn!("No buildable region near ({}, {}) for layer {}", hint.x, hint.y, name);
            OccupancyLayer::new(name, std::iter::empty::<GridCell>())
        }
    }
}
