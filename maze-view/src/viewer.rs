//! Interactive organic labyrinth viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns the simulation state
//! (maze engine, parameters, seed) and implements [`eframe::App`] to
//! render the curve and drive it through an egui UI.

use std::fmt::Write as _;

use eframe::App;
use glam::DVec2;
use maze_core::{
    config::{Config, Params},
    maze::{Maze, circle_points, rect_points},
};

/// Radius of the initial seed circle, in world units.
const SEED_RADIUS: f64 = 3.0;
/// Number of points on the initial seed circle.
const SEED_COUNT: usize = 24;
/// Half extents of the default rectangular boundary.
const BOUNDARY_HALF: f64 = 12.0;

/// Main application state for the interactive viewer.
///
/// [`Viewer`] glues together:
/// - The simulation core: [`Maze`], [`Params`], the seed.
/// - UI configuration (pan/zoom, timing).
/// - eframe/egui callbacks for drawing and user interaction.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input.
/// 2. If `running` is `true` and enough time has passed, call
///    [`Viewer::step_once`].
/// 3. Render the boundary and the curve.
///
/// ### Fields
/// - `maze` - Current simulation engine.
/// - `params` - Editable base parameters; applied on rebuild.
/// - `seed` - RNG seed used when the maze is rebuilt.
/// - `use_boundary` - Whether rebuilds include the rectangular boundary.
/// - `cfg_error` - Validation message from the last rejected rebuild.
///
/// - `running` - Whether the simulation is currently auto-advancing.
/// - `zoom` - Zoom factor for world-to-screen coordinate mapping.
/// - `pan` - Screen-space pan offset in pixels.
/// - `iteration` - Number of steps taken since the last rebuild.
///
/// - `step_interval` - Target time step between automatic steps (seconds).
/// - `last_step_time` - Time stamp of the last step (egui time).
/// - `last_step_dt` - Actual time delta between the last two steps (display only).
pub struct Viewer {
    maze: Maze,
    params: Params,
    seed: u64,
    use_boundary: bool,
    cfg_error: Option<String>,

    running: bool,
    zoom: f32,
    pan: egui::Vec2,
    iteration: usize,

    step_interval: f64,
    last_step_time: f64,
    last_step_dt: f64,
}

impl Viewer {
    /// Creates a new viewer with a circular seed curve inside a
    /// rectangular boundary, using the default parameters.
    pub fn new() -> Self {
        let params = Params::default();
        let seed = 0;
        let maze = build_maze(Config::default(), seed, true);

        Self {
            maze,
            params,
            seed,
            use_boundary: true,
            cfg_error: None,
            running: false,
            zoom: 20.0,
            pan: egui::vec2(0.0, 0.0),
            iteration: 0,
            step_interval: 0.05,
            last_step_time: 0.0,
            last_step_dt: 0.0,
        }
    }

    /// Rebuilds the maze from the current parameters and seed.
    ///
    /// Parameter validation happens here: on rejection the old maze is
    /// kept and the error is shown in the config panel.
    fn rebuild(&mut self) {
        match Config::new(self.params) {
            Ok(cfg) => {
                self.maze = build_maze(cfg, self.seed, self.use_boundary);
                self.cfg_error = None;
                self.iteration = 0;
                self.running = false;
            }
            Err(err) => {
                self.cfg_error = Some(err.to_string());
            }
        }
    }

    /// Advances the simulation by a single step: resample to restore
    /// density, then apply one round of forces.
    fn step_once(&mut self) {
        self.maze.resample();
        self.maze.update();
        self.iteration += 1;
    }

    /// Writes the current snapshot as `x,y,frozen` CSV next to the
    /// working directory, named after the current iteration.
    fn save_snapshot(&self) {
        let mut csv = String::from("x,y,frozen\n");
        for p in self.maze.snapshot() {
            let _ = writeln!(csv, "{},{},{}", p.x, p.y, p.frozen);
        }

        let path = format!("maze_{:05}.csv", self.iteration);
        match std::fs::write(&path, csv) {
            Ok(()) => log::info!("wrote {path}"),
            Err(err) => log::error!("failed to write {path}: {err}"),
        }
    }

    /// Converts a world-space position to screen-space.
    ///
    /// World coordinates are scaled by `zoom`, offset by `pan`, and then
    /// centered inside the given `rect`. The y-axis is flipped so that
    /// positive y goes up in world space.
    fn world_to_screen(&self, p: DVec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        egui::pos2(
            center.x + (p.x as f32) * self.zoom + self.pan.x,
            center.y - (p.y as f32) * self.zoom + self.pan.y,
        )
    }

    /// Converts a screen-space position back to world-space.
    ///
    /// This is the inverse of [`Viewer::world_to_screen`] (up to
    /// floating point rounding).
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> DVec2 {
        let center = rect.center();
        let x = (p.x - center.x - self.pan.x) / self.zoom;
        let y = (center.y - p.y + self.pan.y) / self.zoom;
        DVec2::new(x as f64, y as f64)
    }

    /// Helper to draw a labeled `f64` [`egui::DragValue`].
    fn labeled_drag_f64(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f64,
        range: std::ops::RangeInclusive<f64>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Builds the top panel UI (run controls, stepping, zoom, export).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                ui.add(
                    egui::DragValue::new(&mut self.step_interval)
                        .prefix("dt target = ")
                        .range(0.01..=1.0)
                        .speed(0.01),
                );

                if ui.button("Step").clicked() {
                    let now = ctx.input(|i| i.time);
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = now - self.last_step_time;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                if ui.button("Reset").clicked() {
                    self.rebuild();
                }

                if ui.button("Save CSV").clicked() {
                    self.save_snapshot();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 1.0..=100.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (time step, point counts, iteration).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("dt target = {:.3} s", self.step_interval));
                ui.label(format!("dt last = {:.3} s", self.last_step_dt));
                ui.separator();
                ui.label(format!("iteration = {}", self.iteration));
                ui.label(format!("points = {}", self.maze.len()));
                ui.label(format!("active = {}", self.maze.active()));
            });
        });
    }

    /// Builds the right-hand configuration panel for the base
    /// parameters. Changes take effect on the next rebuild.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Config");

                ui.separator();
                ui.label("Force weights");
                Self::labeled_drag_f64(ui, "brownian:", &mut self.params.brownian, 0.0..=1.0, 0.005);
                Self::labeled_drag_f64(
                    ui,
                    "smoothing:",
                    &mut self.params.smoothing,
                    0.0..=1.0,
                    0.005,
                );
                Self::labeled_drag_f64(
                    ui,
                    "repulsion:",
                    &mut self.params.repulsion,
                    0.0..=0.1,
                    0.001,
                );

                ui.separator();
                ui.label("Repulsion radii");
                Self::labeled_drag_f64(ui, "k0:", &mut self.params.k0, 0.1..=10.0, 0.1);
                Self::labeled_drag_f64(ui, "k1:", &mut self.params.k1, 0.1..=20.0, 0.1);

                ui.separator();
                ui.label("Density bounds");
                Self::labeled_drag_f64(ui, "k_min:", &mut self.params.k_min, 0.01..=2.0, 0.01);
                Self::labeled_drag_f64(ui, "k_max:", &mut self.params.k_max, 0.01..=4.0, 0.01);
                Self::labeled_drag_f64(ui, "spacing:", &mut self.params.spacing, 0.1..=10.0, 0.1);

                ui.separator();
                ui.label("Limits");
                Self::labeled_drag_f64(
                    ui,
                    "max_speed:",
                    &mut self.params.max_speed,
                    0.0..=100.0,
                    0.5,
                );
                ui.horizontal(|ui| {
                    ui.label("freeze_limit:");
                    ui.add(
                        egui::DragValue::new(&mut self.params.freeze_limit)
                            .range(0..=10_000)
                            .speed(10),
                    );
                });
                ui.checkbox(&mut self.params.skip_frozen_pairs, "skip frozen pairs");

                ui.separator();
                ui.label("Run");
                ui.horizontal(|ui| {
                    ui.label("seed:");
                    ui.add(egui::DragValue::new(&mut self.seed).speed(1));
                });
                ui.checkbox(&mut self.use_boundary, "rectangular boundary");

                if ui.button("Apply + rebuild").clicked() {
                    self.rebuild();
                }

                if let Some(err) = &self.cfg_error {
                    ui.colored_label(egui::Color32::LIGHT_RED, err);
                }

                ui.separator();
                if ui.button("Reset params to default").clicked() {
                    self.params = Params::default();
                }
            });
    }

    /// Builds the central panel where the boundary and curve are drawn.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Pan with drag.
            if response.dragged() {
                let delta = response.drag_delta();
                self.pan += delta;
            }

            // Zoom around the mouse cursor.
            if ui.ctx().input(|i| i.raw_scroll_delta.y != 0.0) {
                let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
                if scroll != 0.0 {
                    let pointer_screen = response.hover_pos().unwrap_or(rect.center());

                    let world_before = self.screen_to_world(pointer_screen, rect);

                    let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                    let new_zoom = (self.zoom * factor).clamp(1.0, 100.0);
                    self.zoom = new_zoom;

                    let screen_after = self.world_to_screen(world_before, rect);

                    let delta = pointer_screen - screen_after;
                    self.pan += delta;
                }
            }

            // Draw the boundary polygon.
            let boundary = self.maze.boundary();
            if !boundary.is_empty() {
                let pts: Vec<egui::Pos2> = boundary
                    .iter()
                    .map(|&p| self.world_to_screen(p, rect))
                    .collect();
                painter.add(egui::Shape::closed_line(
                    pts,
                    egui::Stroke::new(1.0, egui::Color32::LIGHT_GREEN),
                ));
            }

            // Draw the curve as a closed polyline.
            let points = self.maze.points();
            let n = points.len();
            for i in 0..n {
                let a = self.world_to_screen(points[i].pos, rect);
                let b = self.world_to_screen(points[(i + 1) % n].pos, rect);
                painter.line_segment([a, b], egui::Stroke::new(1.0, egui::Color32::LIGHT_BLUE));
            }

            // Mark the points, highlighting frozen ones.
            for p in points {
                let pos = self.world_to_screen(p.pos, rect);
                let color = if p.frozen {
                    egui::Color32::LIGHT_RED
                } else {
                    egui::Color32::LIGHT_BLUE
                };
                painter.circle_filled(pos, 2.0, color);
            }

            // Auto-run simulation if requested.
            if self.running {
                let now = ctx.input(|i| i.time);
                let elapsed = now - self.last_step_time;
                if elapsed >= self.step_interval {
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = elapsed;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                ctx.request_repaint();
            }
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    ///
    /// This method:
    /// - Renders the top control bar and status bar.
    /// - Renders the config side panel.
    /// - Draws the central simulation view and handles interactions.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}

/// Builds a maze from an already-validated configuration: a circular
/// seed curve, optionally enclosed by the default rectangular boundary.
fn build_maze(cfg: Config, seed: u64, use_boundary: bool) -> Maze {
    let points = circle_points(DVec2::ZERO, SEED_RADIUS, SEED_COUNT);
    let boundary = if use_boundary {
        rect_points(DVec2::ZERO, DVec2::splat(BOUNDARY_HALF))
    } else {
        Vec::new()
    };

    Maze::with_seed(cfg, points, boundary, seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::Pos2::new(0.0, 0.0), egui::vec2(800.0, 600.0))
    }

    #[test]
    fn world_to_screen_and_back_is_roundtrip() {
        let mut viewer = Viewer::new();
        // Use non-trivial zoom and pan to exercise the math.
        viewer.zoom = 2.0;
        viewer.pan = egui::vec2(15.0, -7.0);
        let rect = test_rect();

        let world_points = [
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, -5.0),
            DVec2::new(-3.5, 8.25),
        ];

        let eps = 1e-4;

        for p in world_points {
            let screen = viewer.world_to_screen(p, rect);
            let back = viewer.screen_to_world(screen, rect);

            assert!(
                (back.x - p.x).abs() < eps && (back.y - p.y).abs() < eps,
                "roundtrip mismatch: p={:?}, back={:?}",
                p,
                back
            );
        }
    }

    #[test]
    fn step_once_advances_iteration() {
        let mut viewer = Viewer::new();
        assert_eq!(viewer.iteration, 0);

        viewer.step_once();
        assert_eq!(viewer.iteration, 1);
        assert!(viewer.maze.len() >= 2);
    }

    #[test]
    fn rebuild_restores_basic_state() {
        let mut viewer = Viewer::new();

        viewer.step_once();
        viewer.running = true;

        viewer.rebuild();

        assert_eq!(viewer.iteration, 0);
        assert_eq!(viewer.maze.len(), SEED_COUNT);
        assert!(!viewer.running);
        assert!(viewer.cfg_error.is_none());
    }

    #[test]
    fn rebuild_rejects_bad_params_and_keeps_maze() {
        let mut viewer = Viewer::new();
        viewer.step_once();
        let len_before = viewer.maze.len();

        viewer.params.k_min = 2.0;
        viewer.params.k_max = 1.0;
        viewer.rebuild();

        assert!(viewer.cfg_error.is_some());
        assert_eq!(viewer.maze.len(), len_before);
        // Iteration count is untouched when the rebuild is rejected.
        assert_eq!(viewer.iteration, 1);
    }

    #[test]
    fn rebuild_without_boundary_clears_it() {
        let mut viewer = Viewer::new();
        assert!(!viewer.maze.boundary().is_empty());

        viewer.use_boundary = false;
        viewer.rebuild();
        assert!(viewer.maze.boundary().is_empty());
    }
}
