use std::f64::consts::TAU;

use glam::DVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::{config::Config, force_buffer::ForceBuffer, phases, point::Point};

/// Decimal scale for snapshot rounding (three decimals).
const SNAPSHOT_SCALE: f64 = 1000.0;

/// One curve point as seen by external collaborators: position rounded
/// for stable textual output, plus the frozen flag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapshotPoint {
    pub x: f64,
    pub y: f64,
    pub frozen: bool,
}

/// The simulation engine.
///
/// Owns the live curve, the static boundary polygon, the configuration
/// and the random stream for the brownian term. Callers drive it with
/// [`Maze::resample`] followed by [`Maze::update`] once per discrete
/// step; resampling first establishes the density the forces then act
/// on.
///
/// Brownian kicks are drawn serially from the single engine-owned
/// stream, one magnitude/direction pair per active point in curve
/// order, so a fixed seed reproduces the run exactly regardless of how
/// the force phase is scheduled.
pub struct Maze {
    points: Vec<Point>,
    boundary: Vec<DVec2>,
    cfg: Config,
    rng: Pcg32,
    buf: ForceBuffer,
}

impl Maze {
    /// Creates an engine with no boundary and a random seed.
    pub fn new(cfg: Config, points: Vec<DVec2>) -> Self {
        Self::with_boundary(cfg, points, Vec::new())
    }

    /// Creates an engine with a fixed boundary polygon and a random
    /// seed.
    pub fn with_boundary(cfg: Config, points: Vec<DVec2>, boundary: Vec<DVec2>) -> Self {
        Self::from_parts(cfg, points, boundary, Pcg32::from_rng(&mut rand::rng()))
    }

    /// Creates a fully deterministic engine from an explicit seed.
    pub fn with_seed(cfg: Config, points: Vec<DVec2>, boundary: Vec<DVec2>, seed: u64) -> Self {
        Self::from_parts(cfg, points, boundary, Pcg32::seed_from_u64(seed))
    }

    fn from_parts(cfg: Config, points: Vec<DVec2>, boundary: Vec<DVec2>, rng: Pcg32) -> Self {
        let points = points.into_iter().map(Point::new).collect::<Vec<_>>();
        let buf = ForceBuffer::with_len(points.len());
        Self {
            points,
            boundary,
            cfg,
            rng,
            buf,
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// The live curve, in cyclic order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn boundary(&self) -> &[DVec2] {
        &self.boundary
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points still subject to displacement.
    pub fn active(&self) -> usize {
        self.points.iter().filter(|p| !p.frozen).count()
    }

    /// Runs one force step: compute all contributions in parallel,
    /// then apply every pending displacement.
    ///
    /// A curve with fewer than two points has no segments or neighbor
    /// pairs and the call is a no-op.
    pub fn update(&mut self) {
        if self.points.len() < 2 {
            return;
        }

        // Serial draws keep the step reproducible under a fixed seed;
        // exactly one pair is consumed per active point.
        let kicks: Vec<DVec2> = self
            .points
            .iter()
            .map(|p| {
                if p.frozen {
                    DVec2::ZERO
                } else {
                    phases::brownian_kick(&mut self.rng, &self.cfg)
                }
            })
            .collect();

        phases::force_phase(&self.points, &self.boundary, &kicks, &self.cfg, &mut self.buf);
        let active = phases::apply_phase(&mut self.points, &self.buf);

        log::debug!("points: {} active: {}", self.points.len(), active);
    }

    /// Restores the curve density to `[d_min, d_max]`: a parallel
    /// decision over every adjacent pair, then one serial rewrite that
    /// drops crowded points and bisects stretched segments.
    ///
    /// No-op for a curve with fewer than two points.
    pub fn resample(&mut self) {
        if self.points.len() < 2 {
            return;
        }

        phases::decision_phase(&mut self.points, &self.cfg);
        self.points = phases::rewrite_phase(&self.points);
    }

    /// Read-only export of the live curve for file writers and
    /// visualizers: positions rounded to three decimals, in cyclic
    /// order.
    pub fn snapshot(&self) -> Vec<SnapshotPoint> {
        self.points
            .iter()
            .map(|p| SnapshotPoint {
                x: (p.pos.x * SNAPSHOT_SCALE).round() / SNAPSHOT_SCALE,
                y: (p.pos.y * SNAPSHOT_SCALE).round() / SNAPSHOT_SCALE,
                frozen: p.frozen,
            })
            .collect()
    }
}

/// A closed curve of `count` points evenly spaced on a circle.
pub fn circle_points(center: DVec2, radius: f64, count: usize) -> Vec<DVec2> {
    (0..count)
        .map(|i| {
            let t = (i as f64) / (count as f64) * TAU;
            center + radius * DVec2::new(t.cos(), t.sin())
        })
        .collect()
}

/// The four corners of an axis-aligned rectangle, in cyclic order.
pub fn rect_points(center: DVec2, half_extents: DVec2) -> Vec<DVec2> {
    [
        DVec2::new(-half_extents.x, -half_extents.y),
        DVec2::new(half_extents.x, -half_extents.y),
        DVec2::new(half_extents.x, half_extents.y),
        DVec2::new(-half_extents.x, half_extents.y),
    ]
    .into_iter()
    .map(|corner| center + corner)
    .collect()
}
