//! Browser stage: a [`Surface`] over an HTML canvas and its 2D context.
//!
//! Offscreen caches are detached `<canvas>` elements created on demand. Any
//! DOM failure is logged and reported as "no offscreen", which makes the
//! pipeline draw cache contributions straight onto the stage.

use tracing::warn;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::geom::{Point, Size};
use crate::render::Surface;

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Wrap an existing canvas element.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the element has no 2D context.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx })
    }

    fn detached(size: Size) -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas = document.create_element("canvas")?.dyn_into::<HtmlCanvasElement>()?;
        let mut surface = Self::new(canvas)?;
        surface.resize(size);
        Ok(surface)
    }

    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// The 2D context layers draw with.
    #[must_use]
    pub fn context(&self) -> &CanvasRenderingContext2d {
        &self.ctx
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> Size {
        Size::new(f64::from(self.canvas.width()), f64::from(self.canvas.height()))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn resize(&mut self, size: Size) {
        self.canvas.set_width(size.width.max(0.0).round() as u32);
        self.canvas.set_height(size.height.max(0.0).round() as u32);
    }

    fn clear(&mut self) {
        let size = self.size();
        self.ctx.clear_rect(0.0, 0.0, size.width, size.height);
    }

    fn offscreen(&self, size: Size) -> Option<Self> {
        match Self::detached(size) {
            Ok(surface) => Some(surface),
            Err(err) => {
                warn!(?err, "web: offscreen canvas unavailable");
                None
            }
        }
    }

    fn draw_surface(&mut self, src: &Self, at: Point) {
        if let Err(err) = self.ctx.draw_image_with_html_canvas_element(&src.canvas, at.x, at.y) {
            warn!(?err, "web: blit failed");
        }
    }
}
