//! Terrain composition pipeline.
//!
//! Stages run strictly in order, each on the output of the previous one:
//! 1. heights (noise, falloff, curve)
//! 2. hydrology (rivers, lakes, oceans)
//! 3. texture weights, with the shore layer blended in by wetness
//! 4. paths painted over the splatmap
//! 5. vegetation placement

use std::collections::HashSet;
use std::time::Instant;

use glam::Vec2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::config::{RiverSpec, TerrainParams, WaterFeature};
use crate::core::{Cell, Result};
use crate::hydrology::{self, BankProp, Carved};
use crate::math::{steepness_map, Grid};
use crate::path::{self, PaintedPaths, PathPainter, PathSpec, Waypath};
use crate::placement::{self, CellSample, PlacementRule, RandomSource, SeedSequence};
use crate::terrain::{self, falloff, NoiseField};
use crate::texture::Splatmap;

/// Seed phases, one per randomized step.
const PHASE_NOISE_OFFSET: u64 = 0;
const PHASE_COURSE: u64 = 1;
const PHASE_BANK_PROPS: u64 = 2;
const PHASE_VEGETATION_OFFSET: u64 = 3;
const PHASE_VEGETATION: u64 = 4;
const PHASE_PATHS: u64 = 5;

/// Per-instance width and height scale jitter, added to 1.
const WIDTH_SCALE_JITTER: (f32, f32) = (-0.5, 0.25);
const HEIGHT_SCALE_JITTER: (f32, f32) = (-0.25, 0.5);

/// Height band above an ocean level over which shore wetness fades out.
pub const OCEAN_SHORE_BAND: f32 = 0.05;

/// One accepted vegetation instance.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: usize,
    pub y: usize,
    /// Index into [`TerrainParams::vegetation`].
    pub layer: usize,
    /// Cell position plus the rule's jitter.
    pub position: Vec2,
    /// Width (x) and height (y) scale.
    pub scale: Vec2,
}

/// Output of [`TerrainComposer::compose`].
#[derive(Clone, Debug)]
pub struct ComposedTerrain {
    /// Normalized heights in [0, 1].
    pub heights: Grid<f32>,
    pub depth: f32,
    pub texture_weights: Splatmap,
    /// Every painted path, hand-placed first, then generated.
    pub paths: Vec<PathSpec>,
    pub path_mask: Grid<Option<u16>>,
    pub path_cells: HashSet<Cell>,
    pub wetness: Grid<f32>,
    pub water_level: f32,
    pub rivers: Vec<Waypath>,
    pub bank_props: Vec<BankProp>,
    pub placements: Vec<Placement>,
}

impl ComposedTerrain {
    /// Heights scaled to world units.
    pub fn world_heights(&self) -> Grid<f32> {
        terrain::scale_to_depth(&self.heights, self.depth)
    }

    /// Placements belonging to one vegetation layer.
    pub fn placements_for(&self, layer: usize) -> impl Iterator<Item = &Placement> {
        self.placements.iter().filter(move |p| p.layer == layer)
    }
}

/// Runs the full pipeline for one set of [`TerrainParams`].
pub struct TerrainComposer {
    params: TerrainParams,
    seeds: SeedSequence,
}

/// Intermediate hydrology output.
struct Hydrology {
    heights: Grid<f32>,
    wetness: Grid<f32>,
    water_level: f32,
    rivers: Vec<Waypath>,
    bank_props: Vec<BankProp>,
}

impl TerrainComposer {
    /// Validate `params` and build a composer.
    pub fn new(params: TerrainParams) -> Result<Self> {
        params.validate()?;
        let seeds = SeedSequence::new(params.seed);
        Ok(Self { params, seeds })
    }

    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Run every stage and return the composed terrain.
    pub fn compose(&self) -> Result<ComposedTerrain> {
        let p = &self.params;
        let total = Instant::now();
        log::info!("Composing {}x{} terrain (seed {})", p.width, p.height, p.seed);

        let start = Instant::now();
        let heights = self.synthesize_heights()?;
        log::info!("Stage 1/5 heights in {:.1}ms", start.elapsed().as_secs_f64() * 1000.0);

        let start = Instant::now();
        let water = self.carve_water(heights)?;
        log::info!(
            "Stage 2/5 hydrology in {:.1}ms ({} features, {} river paths, water level {:.3})",
            start.elapsed().as_secs_f64() * 1000.0,
            p.water.len(), water.rivers.len(), water.water_level
        );

        let start = Instant::now();
        let steepness = steepness_map(&water.heights, p.depth);
        let mut splat = Splatmap::from_layers(&water.heights, &steepness, &p.textures)?;
        if let Some(shore) = p.shore_layer {
            if !p.water.is_empty() {
                splat.blend_shore(shore, &water.wetness)?;
            }
        }
        log::info!(
            "Stage 3/5 texture weights in {:.1}ms ({} layers)",
            start.elapsed().as_secs_f64() * 1000.0,
            splat.layer_count()
        );

        let start = Instant::now();
        let painter = PathPainter::new(p.path_brush_radius, p.path_smoothness).with_shape(p.path_brush_shape);
        let paths = self.all_paths()?;
        let painted = painter.paint(p.width, p.height, &paths)?;
        painted.apply_to(&mut splat)?;
        log::info!(
            "Stage 4/5 paths in {:.1}ms ({} paths, {} generated, {} cells)",
            start.elapsed().as_secs_f64() * 1000.0,
            paths.len(), p.generated_paths.len(), painted.touched.len()
        );

        let start = Instant::now();
        let mut placements = Vec::new();
        for (layer, rule) in p.vegetation.iter().enumerate() {
            let placed = self.place_layer(layer, rule, &water, &steepness, &painted)?;
            log::debug!("Vegetation layer {} '{}': {} instances", layer, rule.name, placed.len());
            placements.extend(placed);
        }
        log::info!(
            "Stage 5/5 placement in {:.1}ms ({} instances over {} layers)",
            start.elapsed().as_secs_f64() * 1000.0,
            placements.len(), p.vegetation.len()
        );

        log::info!("Terrain composed in {:.2}s", total.elapsed().as_secs_f64());

        let PaintedPaths { layers: path_mask, touched: path_cells } = painted;
        Ok(ComposedTerrain {
            heights: water.heights,
            depth: p.depth,
            texture_weights: splat,
            paths,
            path_mask,
            path_cells,
            wetness: water.wetness,
            water_level: water.water_level,
            rivers: water.rivers,
            bank_props: water.bank_props,
            placements,
        })
    }

    fn synthesize_heights(&self) -> Result<Grid<f32>> {
        let p = &self.params;
        let mut noise = p.noise.clone();
        if p.randomize_offset {
            noise.randomize_offset(&mut self.seeds.stream(PHASE_NOISE_OFFSET));
        }

        let falloff = match &p.falloff {
            Some(fp) => Some(falloff::generate_rect(p.width, p.height, fp)?),
            None => None,
        };
        terrain::synthesize(p.width, p.height, &noise, p.curve, falloff.as_ref())
    }

    fn carve_water(&self, heights: Grid<f32>) -> Result<Hydrology> {
        let mut out = Hydrology {
            wetness: heights.map(|_| 0.0f32),
            heights,
            water_level: 0.0,
            rivers: Vec::new(),
            bank_props: Vec::new(),
        };
        let mut course_rng = self.seeds.stream(PHASE_COURSE);
        let mut props_rng = self.seeds.stream(PHASE_BANK_PROPS);

        for feature in &self.params.water {
            match feature {
                WaterFeature::River(spec) => {
                    for path in self.river_paths(spec, &out.heights, &mut course_rng)? {
                        let carved = hydrology::carve_river(&out.heights, &path, &spec.channel)?;
                        out.absorb(carved);

                        let samples = path.sample(spec.channel.smoothness);
                        out.bank_props.extend(hydrology::bank_props(
                            &samples,
                            spec.channel.width,
                            spec.bank_prop_spacing,
                            &mut props_rng,
                        ));
                        out.rivers.push(path);
                    }
                }
                WaterFeature::Lake(basin) => {
                    let carved = hydrology::carve_basin(&out.heights, basin)?;
                    out.absorb(carved);
                }
                WaterFeature::Ocean { level } => {
                    let wet = hydrology::ocean_wetness(&out.heights, *level, OCEAN_SHORE_BAND);
                    hydrology::merge_wetness(&mut out.wetness, &wet);
                }
            }
            if let Some(level) = feature.water_level() {
                out.water_level = out.water_level.max(level);
            }
        }
        Ok(out)
    }

    /// Hand-placed paths followed by one random curve per generated request.
    fn all_paths(&self) -> Result<Vec<PathSpec>> {
        let p = &self.params;
        let seeds = self.seeds.child(PHASE_PATHS);
        let mut paths = p.paths.clone();
        for (i, request) in p.generated_paths.iter().enumerate() {
            let path = path::random_curved_path(p.width, p.height, request.samples, &mut seeds.stream(i as u64))?;
            paths.push(PathSpec { path, layer: request.layer });
        }
        Ok(paths)
    }

    fn river_paths(&self, spec: &RiverSpec, heights: &Grid<f32>, rng: &mut impl RandomSource) -> Result<Vec<Waypath>> {
        if let Some(path) = &spec.waypoints {
            return Ok(vec![path.clone()]);
        }
        let course = hydrology::generate_course(heights, rng, &spec.course)?;
        Ok(course.paths().cloned().collect())
    }

    /// Place one vegetation layer. Rows are evaluated in parallel, each with
    /// its own RNG stream, so the result does not depend on thread count.
    fn place_layer(
        &self,
        layer: usize,
        rule: &PlacementRule,
        water: &Hydrology,
        steepness: &Grid<f32>,
        painted: &PaintedPaths,
    ) -> Result<Vec<Placement>> {
        let p = &self.params;
        let mut noise = rule.noise.clone();
        if rule.randomize_offset {
            noise.randomize_offset(&mut self.seeds.child(PHASE_VEGETATION_OFFSET).stream(layer as u64));
        }
        let field = NoiseField::generate(p.width, p.height, &noise)?;
        let rows = self.seeds.child(PHASE_VEGETATION).child(layer as u64);

        let heights = &water.heights;
        let per_row: Vec<Vec<Placement>> = (0..p.height)
            .into_par_iter()
            .map(|y| {
                let mut rng = rows.stream(y as u64);
                let mut out = Vec::new();
                for x in 0..p.width {
                    let h = heights[(x, y)];
                    let sample = CellSample {
                        cell: (x, y),
                        height: h * p.depth,
                        steepness_degrees: steepness[(x, y)],
                        noise: field.values[(x, y)],
                    };
                    if !placement::evaluate(&sample, rule, &mut rng) {
                        continue;
                    }
                    if painted.is_touched(x, y) || h < water.water_level || water.wetness[(x, y)] >= 1.0 {
                        continue;
                    }
                    let jitter = Vec2::new(
                        rng.next_range(-rule.jitter, rule.jitter),
                        rng.next_range(-rule.jitter, rule.jitter),
                    );
                    let scale = Vec2::new(
                        1.0 + rng.next_range(WIDTH_SCALE_JITTER.0, WIDTH_SCALE_JITTER.1),
                        1.0 + rng.next_range(HEIGHT_SCALE_JITTER.0, HEIGHT_SCALE_JITTER.1),
                    );
                    out.push(Placement {
                        x,
                        y,
                        layer,
                        position: Vec2::new(x as f32, y as f32) + jitter,
                        scale,
                    });
                }
                out
            })
            .collect();

        let mut placed: Vec<Placement> = per_row.into_iter().flatten().collect();
        if let Some(cap) = rule.max_instances {
            if placed.len() > cap {
                log::debug!("Vegetation layer '{}' capped at {} of {}", rule.name, cap, placed.len());
                placed.truncate(cap);
            }
        }
        Ok(placed)
    }
}

impl Hydrology {
    fn absorb(&mut self, carved: Carved) {
        hydrology::merge_wetness(&mut self.wetness, &carved.wetness);
        self.heights = carved.heights;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::logging;
    use crate::hydrology::{BasinParams, RiverParams};
    use crate::terrain::NoiseParams;

    fn small_params() -> TerrainParams {
        TerrainParams {
            width: 48,
            height: 48,
            seed: 42,
            noise: NoiseParams { scale: 20.0, ..Default::default() },
            ..Default::default()
        }
    }

    fn open_rule() -> PlacementRule {
        PlacementRule {
            name: "everywhere".into(),
            min_height: -1.0,
            max_height: 1000.0,
            max_steepness_degrees: 90.0,
            island_threshold: 2.0,
            density: 1.0,
            ..PlacementRule::grass()
        }
    }

    #[test]
    fn test_compose_defaults() {
        logging::try_init();
        let composed = TerrainComposer::new(small_params()).unwrap().compose().unwrap();
        assert_eq!((composed.heights.width(), composed.heights.height()), (48, 48));
        assert!(composed.heights.as_slice().iter().all(|h| (0.0..=1.0).contains(h)));
        assert_eq!(composed.texture_weights.layer_count(), 3);
        assert!(composed.path_cells.is_empty());
        assert_eq!(composed.water_level, 0.0);

        let world = composed.world_heights();
        assert!((world[(5, 5)] - composed.heights[(5, 5)] * 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_compose_is_deterministic() {
        let mut params = small_params();
        params.randomize_offset = true;
        params.water.push(WaterFeature::River(RiverSpec { bank_prop_spacing: 5, ..Default::default() }));

        let a = TerrainComposer::new(params.clone()).unwrap().compose().unwrap();
        let b = TerrainComposer::new(params).unwrap().compose().unwrap();
        assert_eq!(a.heights, b.heights);
        assert_eq!(a.placements, b.placements);
        assert_eq!(a.rivers, b.rivers);
        assert_eq!(a.bank_props, b.bank_props);
    }

    #[test]
    fn test_seed_changes_offsets() {
        let mut params = small_params();
        params.randomize_offset = true;
        let a = TerrainComposer::new(params.clone()).unwrap().compose().unwrap();
        params.seed = 43;
        let b = TerrainComposer::new(params).unwrap().compose().unwrap();
        assert_ne!(a.heights, b.heights);
    }

    #[test]
    fn test_independent_of_thread_count() {
        let composer = TerrainComposer::new(small_params()).unwrap();
        let single = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()
            .unwrap()
            .install(|| composer.compose())
            .unwrap();
        let multi = composer.compose().unwrap();
        assert_eq!(single.heights, multi.heights);
        assert_eq!(single.placements, multi.placements);
    }

    #[test]
    fn test_placement_excludes_paths_and_water() {
        let mut params = small_params();
        params.water = vec![WaterFeature::Ocean { level: 0.3 }];
        params.paths = vec![PathSpec {
            path: Waypath::open(vec![Vec2::new(0.0, 24.0), Vec2::new(47.0, 24.0)]).unwrap(),
            layer: 0,
        }];
        params.vegetation = vec![open_rule()];

        let composed = TerrainComposer::new(params).unwrap().compose().unwrap();
        assert!(!composed.path_cells.is_empty());
        assert!(!composed.placements.is_empty());
        for p in &composed.placements {
            assert!(!composed.path_cells.contains(&(p.x, p.y)));
            assert!(composed.heights[(p.x, p.y)] >= 0.3);
            assert_eq!(p.position, Vec2::new(p.x as f32, p.y as f32));
        }
        assert_eq!(composed.water_level, 0.3);
        // Path cells are painted winner-take-all
        assert_eq!(composed.texture_weights.weight(0, 10, 24), 1.0);
        assert_eq!(composed.texture_weights.weight(1, 10, 24), 0.0);
    }

    #[test]
    fn test_instance_cap_row_major() {
        let mut params = small_params();
        params.vegetation = vec![PlacementRule { max_instances: Some(5), ..open_rule() }];
        let composed = TerrainComposer::new(params).unwrap().compose().unwrap();

        assert_eq!(composed.placements.len(), 5);
        for w in composed.placements.windows(2) {
            assert!((w[0].y, w[0].x) < (w[1].y, w[1].x));
        }
        assert_eq!(composed.placements_for(0).count(), 5);
    }

    #[test]
    fn test_water_features_lower_terrain() {
        let mut params = small_params();
        params.noise.octaves = 0;
        params.curve = crate::terrain::HeightCurve::Constant;
        params.water = vec![
            WaterFeature::River(RiverSpec {
                waypoints: Some(Waypath::open(vec![Vec2::new(0.0, 10.0), Vec2::new(47.0, 10.0)]).unwrap()),
                channel: RiverParams { width: 4.0, depth: 0.3, ..Default::default() },
                ..Default::default()
            }),
            WaterFeature::Lake(BasinParams {
                center: Vec2::new(30.0, 34.0),
                radius: 6.0,
                depth: 0.4,
                ..Default::default()
            }),
        ];

        let composed = TerrainComposer::new(params).unwrap().compose().unwrap();
        assert!(composed.heights[(20, 10)] < 1.0);
        assert!(composed.heights[(30, 34)] < 1.0);
        assert_eq!(composed.heights[(5, 40)], 1.0);
        assert_eq!(composed.wetness[(20, 10)], 1.0);
        assert_eq!(composed.wetness[(30, 34)], 1.0);
        assert_eq!(composed.rivers.len(), 1);
        // Shore layer picks up wetness
        assert_eq!(composed.texture_weights.weight(2, 30, 34), 1.0);
    }

    #[test]
    fn test_generated_river_course() {
        let mut params = small_params();
        params.water = vec![WaterFeature::River(RiverSpec {
            course: hydrology::CourseParams { allow_split: true, avoid_height: 2.0, ..Default::default() },
            ..Default::default()
        })];
        let composed = TerrainComposer::new(params).unwrap().compose().unwrap();
        assert_eq!(composed.rivers.len(), 2);
        assert!(composed.wetness.as_slice().iter().any(|&w| w == 1.0));
    }

    #[test]
    fn test_generated_paths_are_seeded() {
        let mut params = small_params();
        params.generated_paths = vec![
            crate::path::GeneratedPath { layer: 1, samples: 30 },
            crate::path::GeneratedPath { layer: 2, ..Default::default() },
        ];
        let a = TerrainComposer::new(params.clone()).unwrap().compose().unwrap();
        let b = TerrainComposer::new(params.clone()).unwrap().compose().unwrap();
        assert_eq!(a.paths.len(), 2);
        assert_eq!(a.paths, b.paths);
        assert_eq!(a.path_mask, b.path_mask);
        assert!(!a.path_cells.is_empty());
        assert_ne!(a.paths[0].path, a.paths[1].path);
        assert_eq!(a.paths[0].path.points().len(), 31);

        params.seed = 99;
        let c = TerrainComposer::new(params).unwrap().compose().unwrap();
        assert_ne!(a.paths, c.paths);
    }

    #[test]
    fn test_instance_scale_jitter() {
        let mut params = small_params();
        params.vegetation = vec![open_rule()];
        let composed = TerrainComposer::new(params).unwrap().compose().unwrap();
        assert!(!composed.placements.is_empty());
        for p in &composed.placements {
            assert!((0.5..1.25).contains(&p.scale.x), "width scale {}", p.scale.x);
            assert!((0.75..1.5).contains(&p.scale.y), "height scale {}", p.scale.y);
        }
        assert!(composed.placements.windows(2).any(|w| w[0].scale != w[1].scale));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = TerrainParams { depth: 0.0, ..small_params() };
        assert!(TerrainComposer::new(params).is_err());

        let mut params = small_params();
        params.paths = vec![PathSpec {
            path: Waypath::open(vec![Vec2::new(0.0, 4.0), Vec2::new(20.0, 4.0)]).unwrap(),
            layer: 9,
        }];
        assert!(matches!(
            TerrainComposer::new(params),
            Err(crate::core::Error::PathLayerOutOfRange { layer: 9, layers: 3 })
        ));
    }
}
