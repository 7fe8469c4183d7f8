//! Host-provided drawing surface and render context.

use crate::{
    camera::PerspectiveCamera, error::RenderError, structure::LiquidStructure, types::SurfaceSize,
};

/// Everything a render context needs to draw one frame.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    pub structure: &'a LiquidStructure,
    pub camera: &'a PerspectiveCamera,
    pub elapsed: f32,
}

/// The element the effect is drawn into.
pub trait DrawingSurface {
    /// Laid-out size of the surface; may be zero before layout.
    fn client_size(&self) -> SurfaceSize;

    /// Size of the enclosing window, used when the client size is zero.
    fn window_size(&self) -> SurfaceSize;

    /// Creates the render context, or `None` if the backend is unavailable.
    fn create_context(&mut self) -> Option<Box<dyn RenderContext>>;

    /// Client size, falling back to the window size when either client
    /// dimension is zero.
    fn resolved_size(&self) -> SurfaceSize {
        let client = self.client_size();
        if client.is_empty() {
            self.window_size()
        } else {
            client
        }
    }
}

/// Draws frames into a surface.
pub trait RenderContext {
    fn set_viewport(&mut self, size: SurfaceSize);

    fn render(&mut self, frame: &Frame<'_>) -> Result<(), RenderError>;

    /// Frees backend resources; no further calls follow.
    fn release(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSurface {
        client: SurfaceSize,
        window: SurfaceSize,
    }

    impl DrawingSurface for FixedSurface {
        fn client_size(&self) -> SurfaceSize {
            self.client
        }

        fn window_size(&self) -> SurfaceSize {
            self.window
        }

        fn create_context(&mut self) -> Option<Box<dyn RenderContext>> {
            None
        }
    }

    #[test]
    fn resolved_size_prefers_client() {
        let s = FixedSurface {
            client: SurfaceSize::new(800, 600),
            window: SurfaceSize::new(1920, 1080),
        };
        assert_eq!(s.resolved_size(), SurfaceSize::new(800, 600));
    }

    #[test]
    fn resolved_size_falls_back_to_window() {
        let s = FixedSurface {
            client: SurfaceSize::new(800, 0),
            window: SurfaceSize::new(1920, 1080),
        };
        assert_eq!(s.resolved_size(), SurfaceSize::new(1920, 1080));
    }
}
