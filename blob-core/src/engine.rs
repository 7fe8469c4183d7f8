//! The engine context: owns the scene and runs the per-frame pipeline.
//!
//! A frame at elapsed time `t` runs, in order:
//! 1. deform every branch from its rest shape ([`deform::deform_branch`]),
//! 2. cast the pointer ray against the just-deformed branches, falling back
//!    to a fixed distance along the ray on a miss,
//! 3. recolor every branch by proximity to that interaction point,
//! 4. rotate the whole structure,
//! 5. submit the frame to the render context (on [`Engine::tick`] only).
//!
//! Render failures are logged and the frame is dropped; the loop keeps
//! going on the next tick.

use crate::{
    camera::PerspectiveCamera,
    config::EngineConfig,
    deform::{self, growth_envelope},
    error::EngineError,
    noise::NoiseField,
    scheduler::{FrameScheduler, TickHandle},
    structure::LiquidStructure,
    surface::{DrawingSurface, Frame, RenderContext},
    types::{BranchId, SurfaceSize},
};
use glam::{Vec2, Vec3};
use tracing::{debug, info, trace, warn};

/// Latest pointer position in normalized device coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    pub ndc: Vec2,
}

/// The world-space point the pointer interacts with in a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interaction {
    pub point: Vec3,
    /// Branch under the pointer, or `None` when the fallback point was used.
    pub hit: Option<BranchId>,
}

/// Everything that exists between `init` and `destroy`.
struct Scene {
    noise: NoiseField,
    structure: LiquidStructure,
    camera: PerspectiveCamera,
    surface: Box<dyn DrawingSurface>,
    context: Box<dyn RenderContext>,
    size: SurfaceSize,
}

pub struct Engine {
    config: EngineConfig,
    scheduler: Box<dyn FrameScheduler>,
    scene: Option<Scene>,
    pointer: PointerState,
    interaction: Option<Interaction>,
    running: bool,
    pending_tick: Option<TickHandle>,
    frames_rendered: u64,
    frames_skipped: u64,
}

impl Engine {
    pub fn new(config: EngineConfig, scheduler: Box<dyn FrameScheduler>) -> Self {
        Self {
            config,
            scheduler,
            scene: None,
            pointer: PointerState::default(),
            interaction: None,
            running: false,
            pending_tick: None,
            frames_rendered: 0,
            frames_skipped: 0,
        }
    }

    /// Builds the scene on `surface`.
    ///
    /// The surface size falls back to the window size when the client size
    /// is zero. Topology is built here once and never again.
    ///
    /// ### Errors
    /// - [`EngineError::InvalidSurfaceSize`] if both sizes have a zero
    ///   dimension.
    /// - [`EngineError::ContextUnavailable`] if the surface cannot provide a
    ///   render context.
    /// - [`EngineError::AlreadyInitialized`] if called twice without
    ///   [`Engine::destroy`].
    pub fn init(&mut self, mut surface: Box<dyn DrawingSurface>) -> Result<(), EngineError> {
        if self.scene.is_some() {
            return Err(EngineError::AlreadyInitialized);
        }

        let size = surface.resolved_size();
        if size.is_empty() {
            return Err(EngineError::InvalidSurfaceSize {
                width: size.width,
                height: size.height,
            });
        }

        let mut context = surface
            .create_context()
            .ok_or(EngineError::ContextUnavailable)?;
        context.set_viewport(size);

        let noise = match self.config.noise_seed {
            Some(seed) => NoiseField::from_seed(seed),
            None => NoiseField::new(&mut rand::rng()),
        };
        let structure = LiquidStructure::build(&self.config);
        let camera = PerspectiveCamera::new(&self.config.camera, size.aspect());

        info!(
            width = size.width,
            height = size.height,
            branches = structure.branches.len(),
            vertices = structure.vertex_count(),
            triangles = structure.triangle_count(),
            "blob engine initialized"
        );

        self.scene = Some(Scene {
            noise,
            structure,
            camera,
            surface,
            context,
            size,
        });
        Ok(())
    }

    /// Starts the frame loop by requesting the first tick.
    pub fn start(&mut self) {
        if self.scene.is_none() {
            warn!("start called before init");
            return;
        }
        if self.running {
            debug!("blob engine already running");
            return;
        }
        self.running = true;
        self.pending_tick = Some(self.scheduler.request_tick());
        info!("blob engine started");
    }

    /// Stops the frame loop and withdraws the pending tick.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        if let Some(handle) = self.pending_tick.take() {
            self.scheduler.cancel_tick(handle);
        }
        info!("blob engine stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_initialized(&self) -> bool {
        self.scene.is_some()
    }

    /// Re-reads the surface size and updates the camera and viewport.
    ///
    /// Mesh topology is untouched.
    pub fn resize(&mut self) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };

        let size = scene.surface.resolved_size();
        if size.is_empty() {
            warn!(
                width = size.width,
                height = size.height,
                "ignoring resize to an empty surface"
            );
            return;
        }
        if size == scene.size {
            return;
        }

        debug!(width = size.width, height = size.height, "resizing blob scene");
        scene.size = size;
        scene.camera.set_aspect(size.aspect());
        scene.context.set_viewport(size);
    }

    /// Records the pointer position, in NDC, for the next frame.
    ///
    /// Ignored outside `init`..`destroy`.
    pub fn handle_pointer_move(&mut self, x: f32, y: f32) {
        if self.scene.is_none() {
            return;
        }
        self.pointer.ndc = Vec2::new(x, y);
    }

    /// Tears the engine down: stops the loop, releases the render context
    /// and drops every buffer.
    pub fn destroy(&mut self) {
        self.stop();
        if let Some(mut scene) = self.scene.take() {
            scene.context.release();
            info!("blob engine destroyed");
        }
        self.interaction = None;
        self.pointer = PointerState::default();
    }

    /// Runs the scheduled frame at `elapsed` seconds.
    ///
    /// Does nothing unless the engine is running and a tick is pending, so a
    /// stale host callback after [`Engine::stop`] is harmless.
    pub fn tick(&mut self, elapsed: f32) {
        if !self.running || self.pending_tick.take().is_none() {
            return;
        }

        self.update(elapsed);
        self.render(elapsed);
        self.pending_tick = Some(self.scheduler.request_tick());
    }

    /// Recomputes every branch for `elapsed` seconds without rendering.
    pub fn update(&mut self, elapsed: f32) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        let cfg = &self.config;

        let growth = growth_envelope(elapsed, cfg.growth_duration);
        for branch in &mut scene.structure.branches {
            deform::deform_branch(branch, &scene.noise, elapsed, growth, &cfg.deform);
        }

        let ray = scene.camera.ray_from_ndc(self.pointer.ndc);
        let interaction = match scene.structure.raycast(&ray) {
            Some((point, id)) => Interaction {
                point,
                hit: Some(id),
            },
            None => Interaction {
                point: ray.at(cfg.interaction.fallback_distance),
                hit: None,
            },
        };

        let world = *scene.structure.world();
        for branch in &mut scene.structure.branches {
            deform::recolor_branch(
                branch,
                &world,
                interaction.point,
                cfg.interaction.reaction_radius,
                &cfg.palette,
            );
        }

        if cfg.rotate {
            scene
                .structure
                .set_rotation(LiquidStructure::rotation_at(elapsed));
        }

        trace!(elapsed, growth, hit = ?interaction.hit, "frame updated");
        self.interaction = Some(interaction);
    }

    fn render(&mut self, elapsed: f32) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };

        let frame = Frame {
            structure: &scene.structure,
            camera: &scene.camera,
            elapsed,
        };
        match scene.context.render(&frame) {
            Ok(()) => {
                if self.frames_rendered == 0 {
                    debug!(elapsed, "first frame rendered");
                }
                self.frames_rendered += 1;
            }
            Err(err) => {
                warn!(%err, elapsed, "render failed, skipping frame");
                self.frames_skipped += 1;
            }
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn interaction(&self) -> Option<Interaction> {
        self.interaction
    }

    pub fn structure(&self) -> Option<&LiquidStructure> {
        self.scene.as_ref().map(|s| &s.structure)
    }

    pub fn camera(&self) -> Option<&PerspectiveCamera> {
        self.scene.as_ref().map(|s| &s.camera)
    }

    pub fn surface_size(&self) -> Option<SurfaceSize> {
        self.scene.as_ref().map(|s| s.size)
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn frames_skipped(&self) -> u64 {
        self.frames_skipped
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.destroy();
    }
}
