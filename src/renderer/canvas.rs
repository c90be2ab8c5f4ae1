//! Canvas 2D painter (wasm only)

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::frame::{DrawCmd, Frame, TextAlign, css};

/// Paints frames onto a canvas, scaling play-field units to device pixels
pub struct CanvasPainter {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    /// Play-field size the frame coordinates are expressed in
    view: (f32, f32),
}

impl CanvasPainter {
    pub fn new(canvas: HtmlCanvasElement, view_w: f32, view_h: f32) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        let mut painter = Self {
            canvas,
            ctx,
            view: (view_w, view_h),
        };
        painter.resize();
        Some(painter)
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Match the backing store to the CSS size and device pixel ratio
    pub fn resize(&mut self) {
        let dpr = web_sys::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
        let w = (self.canvas.client_width() as f64 * dpr).max(1.0) as u32;
        let h = (self.canvas.client_height() as f64 * dpr).max(1.0) as u32;
        if self.canvas.width() != w || self.canvas.height() != h {
            self.canvas.set_width(w);
            self.canvas.set_height(h);
            log::info!("Canvas resized to {w}x{h}");
        }
    }

    /// Client (CSS pixel) coordinates to play-field coordinates
    pub fn to_field(&self, client_x: f64, client_y: f64) -> glam::Vec2 {
        let rect = self.canvas.get_bounding_client_rect();
        let sx = self.view.0 as f64 / rect.width().max(1.0);
        let sy = self.view.1 as f64 / rect.height().max(1.0);
        glam::Vec2::new(
            ((client_x - rect.left()) * sx) as f32,
            ((client_y - rect.top()) * sy) as f32,
        )
    }

    pub fn paint(&self, frame: &Frame) {
        let ctx = &self.ctx;
        let sx = self.canvas.width() as f64 / self.view.0 as f64;
        let sy = self.canvas.height() as f64 / self.view.1 as f64;
        let _ = ctx.set_transform(sx, 0.0, 0.0, sy, 0.0, 0.0);

        for cmd in &frame.commands {
            match cmd {
                DrawCmd::Clear { color } => {
                    ctx.set_fill_style_str(&css(*color));
                    ctx.fill_rect(0.0, 0.0, self.view.0 as f64, self.view.1 as f64);
                }
                DrawCmd::Ring {
                    center,
                    radius,
                    width,
                    color,
                } => {
                    ctx.begin_path();
                    let _ = ctx.arc(
                        center.x as f64,
                        center.y as f64,
                        *radius as f64,
                        0.0,
                        std::f64::consts::TAU,
                    );
                    ctx.set_line_width(*width as f64);
                    ctx.set_stroke_style_str(&css(*color));
                    ctx.stroke();
                }
                DrawCmd::Circle {
                    center,
                    radius,
                    color,
                } => {
                    ctx.begin_path();
                    let _ = ctx.arc(
                        center.x as f64,
                        center.y as f64,
                        *radius as f64,
                        0.0,
                        std::f64::consts::TAU,
                    );
                    ctx.set_fill_style_str(&css(*color));
                    ctx.fill();
                }
                DrawCmd::Ellipse {
                    center,
                    radii,
                    rotation,
                    color,
                } => {
                    ctx.begin_path();
                    let _ = ctx.ellipse(
                        center.x as f64,
                        center.y as f64,
                        radii.x as f64,
                        radii.y as f64,
                        *rotation as f64,
                        0.0,
                        std::f64::consts::TAU,
                    );
                    ctx.set_fill_style_str(&css(*color));
                    ctx.fill();
                }
                DrawCmd::Rect {
                    min,
                    size,
                    corner,
                    color,
                } => {
                    ctx.set_fill_style_str(&css(*color));
                    if *corner > 0.0 {
                        ctx.begin_path();
                        rounded_path(ctx, min.x, min.y, size.x, size.y, *corner);
                        ctx.fill();
                    } else {
                        ctx.fill_rect(min.x as f64, min.y as f64, size.x as f64, size.y as f64);
                    }
                }
                DrawCmd::Line {
                    from,
                    to,
                    width,
                    color,
                } => {
                    ctx.begin_path();
                    ctx.move_to(from.x as f64, from.y as f64);
                    ctx.line_to(to.x as f64, to.y as f64);
                    ctx.set_line_width(*width as f64);
                    ctx.set_stroke_style_str(&css(*color));
                    ctx.stroke();
                }
                DrawCmd::Quad {
                    from,
                    ctrl,
                    to,
                    width,
                    color,
                } => {
                    ctx.begin_path();
                    ctx.move_to(from.x as f64, from.y as f64);
                    ctx.quadratic_curve_to(ctrl.x as f64, ctrl.y as f64, to.x as f64, to.y as f64);
                    ctx.set_line_width(*width as f64);
                    ctx.set_stroke_style_str(&css(*color));
                    ctx.stroke();
                }
                DrawCmd::Text {
                    pos,
                    text,
                    size,
                    align,
                    color,
                } => {
                    ctx.set_font(&format!("600 {size}px system-ui, sans-serif"));
                    ctx.set_text_align(match align {
                        TextAlign::Left => "left",
                        TextAlign::Center => "center",
                        TextAlign::Right => "right",
                    });
                    ctx.set_text_baseline("middle");
                    ctx.set_fill_style_str(&css(*color));
                    let _ = ctx.fill_text(text, pos.x as f64, pos.y as f64);
                }
            }
        }
    }
}

fn rounded_path(ctx: &CanvasRenderingContext2d, x: f32, y: f32, w: f32, h: f32, r: f32) {
    let r = r.min(w / 2.0).min(h / 2.0) as f64;
    let (x, y, w, h) = (x as f64, y as f64, w as f64, h as f64);
    ctx.move_to(x + r, y);
    let _ = ctx.arc_to(x + w, y, x + w, y + h, r);
    let _ = ctx.arc_to(x + w, y + h, x, y + h, r);
    let _ = ctx.arc_to(x, y + h, x, y, r);
    let _ = ctx.arc_to(x, y, x + w, y, r);
    ctx.close_path();
}
