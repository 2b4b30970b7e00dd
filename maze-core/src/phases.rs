//! Barrier-separated simulation phases for the organic labyrinth.
//!
//! One discrete step of the engine runs, in order:
//! 1. [`force_phase`] — per point, accumulate proximity, brownian and
//!    smoothing contributions into a [`ForceBuffer`] slot, clamp the
//!    combined displacement, and decide freezing. Parallel; each task
//!    reads the whole curve and boundary but writes only its own slot.
//! 2. [`apply_phase`] — fold each slot into its point's position.
//! 3. [`decision_phase`] — classify every point's resample action from
//!    the adjacent cyclic distances. Parallel, read-only.
//! 4. [`rewrite_phase`] — serially rebuild the curve from the actions.
//!
//! The curve's length only ever changes inside [`rewrite_phase`], so
//! the parallel phases always see a fixed-size snapshot.

use std::f64::consts::TAU;

use glam::DVec2;
use rand::Rng;
use rand_distr::StandardNormal;
use rayon::prelude::*;

use crate::{
    angle::Angle,
    config::Config,
    force_buffer::{ForceBuffer, ForceSlot},
    point::{Point, ResampleAction, bisect, closest},
};

/// Half-width of the window of adjacent curve indices excluded from a
/// point's own repulsion check.
const SKIP_WINDOW: usize = 1;

/// Draws one brownian displacement: a standard-normal magnitude along
/// a direction uniform in `[0, 2π)`, weighted by the brownian constant.
pub fn brownian_kick(rng: &mut impl Rng, cfg: &Config) -> DVec2 {
    let magnitude: f64 = rng.sample(StandardNormal);
    let direction = Angle::new(rng.random_range(0.0..TAU));
    cfg.brownian * magnitude * direction.unit()
}

/// Shortest cyclic distance between indices `a` and `b` modulo `n`.
fn cyclic_gap(a: usize, b: usize, n: usize) -> usize {
    let d = a.abs_diff(b);
    d.min(n - d)
}

/// Adds the Lennard-Jones-style repulsion of segment `(a, b)` on the
/// point at `p` into `slot`.
///
/// The potential is evaluated on the squared distance, so the square
/// root is only taken once a segment actually contributes. Degenerate
/// separations are skipped entirely rather than letting the division
/// produce NaN or infinities: a zero distance (point exactly on the
/// segment), and a near-zero distance where the twelfth-power term
/// overflows `f64`.
fn segment_repulsion(p: DVec2, a: DVec2, b: DVec2, cfg: &Config, slot: &mut ForceSlot) {
    let c = closest(a, b, p);

    // Coarse Manhattan reject before the exact squared distance.
    if (c.x - p.x).abs() + (c.y - p.y).abs() > cfg.r1 {
        return;
    }

    let dis = c.distance_squared(p);
    if dis >= cfg.r1_sq || dis == 0.0 {
        return;
    }

    let ratio = cfg.r0_sq / dis;
    let force = ratio.powi(6) - ratio.powi(3);
    if !force.is_finite() {
        return;
    }

    slot.add(cfg.repulsion * force * (p - c) / dis.sqrt());
    slot.contacts += 1;
}

/// Accumulates the repulsion of every non-adjacent curve segment and
/// every boundary segment on the point at index `i`.
fn proximity(i: usize, points: &[Point], boundary: &[DVec2], cfg: &Config, slot: &mut ForceSlot) {
    let n = points.len();
    let p = points[i].pos;

    for j in 0..n {
        let k = (j + 1) % n;
        if cyclic_gap(i, j, n) <= SKIP_WINDOW || cyclic_gap(i, k, n) <= SKIP_WINDOW {
            continue;
        }
        segment_repulsion(p, points[j].pos, points[k].pos, cfg, slot);
    }

    let m = boundary.len();
    for j in 0..m {
        segment_repulsion(p, boundary[j], boundary[(j + 1) % m], cfg, slot);
    }
}

/// Accumulates the elastic pull toward the inverse-distance-weighted
/// blend of the two cyclic neighbors of the point at index `i`.
///
/// Coincident neighbors (`d0 + d2 == 0`) contribute nothing; the
/// weighted blend is undefined there.
fn smoothing(i: usize, points: &[Point], cfg: &Config, slot: &mut ForceSlot) {
    let n = points.len();
    let p1 = points[i].pos;
    let p0 = points[(i + n - 1) % n].pos;
    let p2 = points[(i + 1) % n].pos;

    let d0 = p1.distance(p0);
    let d2 = p1.distance(p2);
    if d0 + d2 == 0.0 {
        return;
    }

    let target = (p0 * d2 + p2 * d0) / (d0 + d2);
    slot.add(cfg.smoothing * (target - p1));
}

/// Computes all force contributions for the step into `buf`.
///
/// `kicks` holds one pre-drawn brownian displacement per point (zero
/// for frozen points), so the parallel fan-out never touches the RNG.
/// Per point: proximity decides freezing, then the brownian kick and
/// smoothing still accumulate (a point frozen this step keeps
/// receiving them; the apply phase is what discards its displacement),
/// and finally the combined displacement is clamped.
pub fn force_phase(
    points: &[Point],
    boundary: &[DVec2],
    kicks: &[DVec2],
    cfg: &Config,
    buf: &mut ForceBuffer,
) {
    buf.ensure_len(points.len());

    buf.slots_mut()
        .par_iter_mut()
        .enumerate()
        .for_each(|(i, slot)| {
            if points[i].frozen {
                return;
            }

            proximity(i, points, boundary, cfg, slot);
            slot.freeze = slot.contacts > cfg.freeze_limit;

            slot.add(kicks[i]);
            smoothing(i, points, cfg, slot);

            slot.clamp(cfg.max_step, cfg.max_step_sq);
        });
}

/// Applies every pending displacement and commits freeze decisions.
///
/// Frozen points are excluded: a point that crossed the freeze
/// threshold this step becomes frozen without ever applying the
/// displacement it accumulated. Returns the number of points still
/// active after the phase.
pub fn apply_phase(points: &mut [Point], buf: &ForceBuffer) -> usize {
    points
        .par_iter_mut()
        .zip(buf.slots().par_iter())
        .for_each(|(p, slot)| {
            if p.frozen {
                return;
            }
            if slot.freeze {
                p.frozen = true;
                return;
            }
            p.delta = slot.delta;
            p.apply();
        });

    points.iter().filter(|p| !p.frozen).count()
}

/// Classifies every point's resample action from the cyclic spacing.
///
/// A point is deleted when the distance to its predecessor falls below
/// `d_min`; otherwise it is marked insert-after when the distance to
/// its successor exceeds `d_max`. Both comparisons are strict, so a
/// distance exactly at a threshold keeps the point untouched. With
/// `skip_frozen_pairs` set, a pair whose endpoints are both frozen is
/// never acted on.
pub fn decision_phase(points: &mut [Point], cfg: &Config) {
    let n = points.len();
    let snapshot: &[Point] = points;

    let actions: Vec<ResampleAction> = snapshot
        .par_iter()
        .enumerate()
        .map(|(i, p)| {
            let prev = &snapshot[(i + n - 1) % n];
            let next = &snapshot[(i + 1) % n];

            if prev.pos.distance(p.pos) < cfg.d_min
                && !(cfg.skip_frozen_pairs && prev.frozen && p.frozen)
            {
                return ResampleAction::Delete;
            }
            if p.pos.distance(next.pos) > cfg.d_max
                && !(cfg.skip_frozen_pairs && p.frozen && next.frozen)
            {
                return ResampleAction::InsertAfter;
            }
            ResampleAction::None
        })
        .collect();

    for (p, action) in points.iter_mut().zip(actions) {
        p.action = action;
    }
}

/// Rebuilds the curve from the actions left by [`decision_phase`].
///
/// Serial single pass: kept points are copied with their action reset,
/// deleted points are dropped, and each insert-after point is followed
/// by a fresh unfrozen midpoint between it and its cyclic successor in
/// the old sequence.
pub fn rewrite_phase(points: &[Point]) -> Vec<Point> {
    let n = points.len();
    let mut out = Vec::with_capacity(n + n / 4);

    for (i, p) in points.iter().enumerate() {
        match p.action {
            ResampleAction::Delete => {}
            ResampleAction::None => {
                let mut kept = *p;
                kept.action = ResampleAction::None;
                out.push(kept);
            }
            ResampleAction::InsertAfter => {
                let mut kept = *p;
                kept.action = ResampleAction::None;
                out.push(kept);
                out.push(Point::new(bisect(p.pos, points[(i + 1) % n].pos)));
            }
        }
    }

    out
}
