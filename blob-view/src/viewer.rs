//! Interactive liquid blob viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which hosts a [`blob_core::engine::Engine`]
//! inside an egui central panel. The panel is the drawing surface, egui's
//! repaint requests are the frame scheduler, and a small CPU renderer turns
//! each frame into a shaded [`egui::Mesh`].

use blob_core::{
    config::EngineConfig,
    engine::Engine,
    error::{EngineError, RenderError},
    scheduler::{FrameScheduler, TickHandle},
    surface::{DrawingSurface, Frame, RenderContext},
    types::{Rgb, SurfaceSize},
};
use eframe::App;
use glam::{Vec2, Vec3};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Direction (towards the light) and intensity of each directional light.
const LIGHTS: [(Vec3, f32); 3] = [
    (Vec3::new(10.0, 10.0, 10.0), 0.8),
    (Vec3::new(-10.0, 8.0, -8.0), 0.4),
    (Vec3::new(0.0, 5.0, -15.0), 0.5),
];
const AMBIENT: f32 = 0.35;
const SPECULAR: f32 = 0.5;
const SHININESS: i32 = 32;

/// Converts a screen position inside `rect` to normalized device
/// coordinates, with y pointing up.
fn screen_to_ndc(p: egui::Pos2, rect: egui::Rect) -> Vec2 {
    let x = (p.x - rect.min.x) / rect.width() * 2.0 - 1.0;
    let y = 1.0 - (p.y - rect.min.y) / rect.height() * 2.0;
    Vec2::new(x, y)
}

/// Inverse of [`screen_to_ndc`] for a viewport of `size` pixels at `origin`.
fn ndc_to_screen(ndc: Vec2, origin: egui::Pos2, size: SurfaceSize) -> egui::Pos2 {
    egui::pos2(
        origin.x + (ndc.x + 1.0) * 0.5 * size.width as f32,
        origin.y + (1.0 - ndc.y) * 0.5 * size.height as f32,
    )
}

/// Painter's algorithm order: farthest triangle first.
fn sort_back_to_front(triangles: &mut [(f32, [u32; 3])]) {
    triangles.sort_unstable_by(|a, b| b.0.total_cmp(&a.0));
}

/// Lambert lighting plus a Blinn-Phong highlight from the key light.
///
/// `normal` and `to_eye` must be unit length; the normal is flipped towards
/// the eye so both sides of the surface are lit.
fn shade(color: Rgb, normal: Vec3, to_eye: Vec3) -> egui::Color32 {
    let normal = if normal.dot(to_eye) < 0.0 { -normal } else { normal };

    let diffuse: f32 = LIGHTS
        .iter()
        .map(|(dir, intensity)| normal.dot(dir.normalize()).max(0.0) * intensity)
        .sum();

    let half = (LIGHTS[0].0.normalize() + to_eye).normalize_or_zero();
    let specular = normal.dot(half).max(0.0).powi(SHININESS) * SPECULAR;

    let lit = color.to_vec3() * (AMBIENT + diffuse) + Vec3::splat(specular);
    let to_u8 = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    egui::Color32::from_rgb(to_u8(lit.x), to_u8(lit.y), to_u8(lit.z))
}

/// Frame scheduler backed by egui repaint requests.
///
/// egui cannot withdraw a repaint, so cancelling is bookkeeping only; the
/// engine ignores ticks it no longer expects.
struct EguiScheduler {
    ctx: egui::Context,
    next: u64,
}

impl FrameScheduler for EguiScheduler {
    fn request_tick(&mut self) -> TickHandle {
        self.ctx.request_repaint();
        self.next += 1;
        TickHandle(self.next)
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        debug!(handle = handle.0, "tick cancelled");
    }
}

/// State shared between the viewer and the surface/context it lends to the
/// engine.
#[derive(Clone, Default)]
struct SharedPanel {
    client: Rc<Cell<SurfaceSize>>,
    window: Rc<Cell<SurfaceSize>>,
    origin: Rc<Cell<egui::Pos2>>,
    mesh: Rc<RefCell<Option<Arc<egui::Mesh>>>>,
}

/// The central panel as a drawing surface.
struct PanelSurface {
    shared: SharedPanel,
}

impl DrawingSurface for PanelSurface {
    fn client_size(&self) -> SurfaceSize {
        self.shared.client.get()
    }

    fn window_size(&self) -> SurfaceSize {
        self.shared.window.get()
    }

    fn create_context(&mut self) -> Option<Box<dyn RenderContext>> {
        Some(Box::new(MeshContext {
            shared: self.shared.clone(),
            viewport: SurfaceSize::default(),
            triangles: Vec::new(),
        }))
    }
}

/// CPU renderer producing one [`egui::Mesh`] per frame.
struct MeshContext {
    shared: SharedPanel,
    viewport: SurfaceSize,
    /// Reused between frames: (depth, vertex indices).
    triangles: Vec<(f32, [u32; 3])>,
}

impl RenderContext for MeshContext {
    fn set_viewport(&mut self, size: SurfaceSize) {
        self.viewport = size;
    }

    fn render(&mut self, frame: &Frame<'_>) -> Result<(), RenderError> {
        if self.viewport.is_empty() {
            return Err(RenderError::Backend("viewport is empty".into()));
        }

        let view_projection = frame.camera.view_projection();
        let world = *frame.structure.world();
        let eye = frame.camera.position();
        let origin = self.shared.origin.get();

        let mut mesh = egui::Mesh::default();
        let mut depths: Vec<Option<f32>> = Vec::with_capacity(frame.structure.vertex_count());
        self.triangles.clear();

        for branch in &frame.structure.branches {
            let base = mesh.vertices.len() as u32;

            for ((p, n), color) in branch
                .positions
                .iter()
                .zip(&branch.normals)
                .zip(&branch.colors)
            {
                let world_p = world.transform_point3(*p);
                let world_n = world.transform_vector3(*n).normalize_or_zero();
                let clip = view_projection * world_p.extend(1.0);

                // Behind the eye; triangles touching it are dropped.
                if clip.w <= 1e-4 {
                    depths.push(None);
                    mesh.colored_vertex(origin, egui::Color32::TRANSPARENT);
                    continue;
                }

                let ndc = clip.truncate() / clip.w;
                let to_eye = (eye - world_p).normalize_or_zero();
                depths.push(Some(ndc.z));
                mesh.colored_vertex(
                    ndc_to_screen(ndc.truncate(), origin, self.viewport),
                    shade(*color, world_n, to_eye),
                );
            }

            for tri in branch.indices.chunks_exact(3) {
                let idx = [base + tri[0], base + tri[1], base + tri[2]];
                let depth = idx
                    .iter()
                    .map(|&i| depths[i as usize])
                    .sum::<Option<f32>>();
                if let Some(depth) = depth {
                    self.triangles.push((depth / 3.0, idx));
                }
            }
        }

        sort_back_to_front(&mut self.triangles);
        for &(_, [a, b, c]) in &self.triangles {
            mesh.add_triangle(a, b, c);
        }

        *self.shared.mesh.borrow_mut() = Some(Arc::new(mesh));
        Ok(())
    }

    fn release(&mut self) {
        self.shared.mesh.borrow_mut().take();
        self.triangles = Vec::new();
    }
}

/// Main application state for the viewer.
///
/// ### Fields
/// - `engine` - The blob engine; initialized lazily once the panel has a size.
/// - `shared` - Panel size, origin and last rendered mesh, shared with the
///   engine's surface.
/// - `elapsed` - Animation time in seconds; only advances while running.
/// - `init_error` - Set when the engine refused to initialize; the viewer
///   keeps running without the effect.
pub struct Viewer {
    engine: Engine,
    shared: SharedPanel,
    elapsed: f32,
    init_error: Option<EngineError>,
}

impl Viewer {
    pub fn new(ctx: egui::Context, config: EngineConfig) -> Self {
        let scheduler = EguiScheduler { ctx, next: 0 };
        Self {
            engine: Engine::new(config, Box::new(scheduler)),
            shared: SharedPanel::default(),
            elapsed: 0.0,
            init_error: None,
        }
    }

    /// Initializes and starts the engine on the central panel.
    fn init_engine(&mut self) {
        let surface = PanelSurface {
            shared: self.shared.clone(),
        };
        match self.engine.init(Box::new(surface)) {
            Ok(()) => {
                self.engine.start();
                info!("viewer attached to blob engine");
            }
            Err(err) => {
                error!(%err, "blob engine failed to initialize");
                self.init_error = Some(err);
            }
        }
    }

    /// Tears the engine down; it is rebuilt on the next frame.
    fn restart(&mut self) {
        self.engine.destroy();
        self.elapsed = 0.0;
        self.init_error = None;
    }

    /// Records the laid-out panel size and origin for the surface.
    ///
    /// ### Returns
    /// `true` if the size changed since the previous frame.
    fn update_panel(&self, rect: egui::Rect, window: Option<egui::Rect>) -> bool {
        let size = SurfaceSize::new(rect.width().round() as u32, rect.height().round() as u32);
        let window = window.map_or(SurfaceSize::default(), |r| {
            SurfaceSize::new(r.width().round() as u32, r.height().round() as u32)
        });

        self.shared.origin.set(rect.min);
        self.shared.window.set(window);
        self.shared.client.replace(size) != size
    }

    /// Builds the top panel UI (run controls).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let running = self.engine.is_running();
                if ui
                    .add_enabled(
                        self.engine.is_initialized(),
                        egui::Button::new(if running { "⏸ Pause" } else { "▶ Run" }),
                    )
                    .clicked()
                {
                    if running {
                        self.engine.stop();
                    } else {
                        self.engine.start();
                    }
                }

                if ui.button("Restart").clicked() {
                    self.restart();
                }
            });
        });
    }

    /// Builds the bottom status bar (time, mesh size, pointer hit).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("t = {:.2} s", self.elapsed));
                ui.separator();
                if let Some(structure) = self.engine.structure() {
                    ui.label(format!("triangles = {}", structure.triangle_count()));
                    ui.label(format!("vertices = {}", structure.vertex_count()));
                }
                ui.separator();
                ui.label(format!(
                    "frames = {} (skipped {})",
                    self.engine.frames_rendered(),
                    self.engine.frames_skipped()
                ));
                if let Some(hit) = self.engine.interaction().and_then(|i| i.hit) {
                    ui.label(format!("hover = branch {hit}"));
                }
            });
        });
    }

    /// Builds the central panel that hosts the engine.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                let response = ui.allocate_response(ui.available_size(), egui::Sense::hover());
                let rect = response.rect;
                let window = ctx.input(|i| i.viewport().inner_rect);
                let resized = self.update_panel(rect, window);

                if !self.engine.is_initialized() {
                    if self.init_error.is_none() {
                        self.init_engine();
                    }
                } else if resized {
                    self.engine.resize();
                }

                if let Some(p) = response.hover_pos() {
                    let ndc = screen_to_ndc(p, rect);
                    self.engine.handle_pointer_move(ndc.x, ndc.y);
                }

                if self.engine.is_running() {
                    self.elapsed += ctx.input(|i| i.stable_dt).min(0.1);
                    self.engine.tick(self.elapsed);
                }

                let painter = ui.painter_at(rect);
                if let Some(err) = &self.init_error {
                    painter.text(
                        rect.center(),
                        egui::Align2::CENTER_CENTER,
                        err.to_string(),
                        egui::FontId::proportional(16.0),
                        egui::Color32::LIGHT_RED,
                    );
                } else if let Some(mesh) = self.shared.mesh.borrow().clone() {
                    painter.add(egui::Shape::mesh(mesh));
                }
            });
    }
}

impl App for Viewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_central_panel(ctx);
    }
}
