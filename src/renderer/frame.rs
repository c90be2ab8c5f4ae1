//! Draw command list for one displayed frame

use glam::Vec2;

/// Straight RGBA, components in 0..1
pub type Color = [f32; 4];

/// Horizontal text anchoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// A single 2D drawing primitive (play-field coordinates, +y down)
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Clear {
        color: Color,
    },
    /// Stroked circle
    Ring {
        center: Vec2,
        radius: f32,
        width: f32,
        color: Color,
    },
    /// Filled circle
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    /// Filled ellipse rotated by `rotation` radians
    Ellipse {
        center: Vec2,
        radii: Vec2,
        rotation: f32,
        color: Color,
    },
    /// Filled rectangle with optional corner radius
    Rect {
        min: Vec2,
        size: Vec2,
        corner: f32,
        color: Color,
    },
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Color,
    },
    /// Quadratic curve (ropes and cables)
    Quad {
        from: Vec2,
        ctrl: Vec2,
        to: Vec2,
        width: f32,
        color: Color,
    },
    Text {
        pos: Vec2,
        text: String,
        size: f32,
        align: TextAlign,
        color: Color,
    },
}

/// Ordered draw commands, painted back to front
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub commands: Vec<DrawCmd>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: DrawCmd) {
        self.commands.push(cmd);
    }

    pub fn extend(&mut self, cmds: impl IntoIterator<Item = DrawCmd>) {
        self.commands.extend(cmds);
    }

    pub fn clear(&mut self, color: Color) {
        self.push(DrawCmd::Clear { color });
    }

    pub fn rect(&mut self, min: Vec2, size: Vec2, color: Color) {
        self.push(DrawCmd::Rect {
            min,
            size,
            corner: 0.0,
            color,
        });
    }

    pub fn rounded_rect(&mut self, min: Vec2, size: Vec2, corner: f32, color: Color) {
        self.push(DrawCmd::Rect {
            min,
            size,
            corner,
            color,
        });
    }

    pub fn circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.push(DrawCmd::Circle {
            center,
            radius,
            color,
        });
    }

    pub fn ring(&mut self, center: Vec2, radius: f32, width: f32, color: Color) {
        self.push(DrawCmd::Ring {
            center,
            radius,
            width,
            color,
        });
    }

    pub fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.push(DrawCmd::Line {
            from,
            to,
            width,
            color,
        });
    }

    pub fn text(&mut self, pos: Vec2, text: impl Into<String>, size: f32, color: Color) {
        self.push(DrawCmd::Text {
            pos,
            text: text.into(),
            size,
            align: TextAlign::Center,
            color,
        });
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Replace the alpha of a color
pub fn with_alpha(color: Color, alpha: f32) -> Color {
    [color[0], color[1], color[2], alpha]
}

/// HSL (hue in degrees, s/l in 0..1) to RGBA
pub fn hsla(hue: f32, s: f32, l: f32, alpha: f32) -> Color {
    let h = hue.rem_euclid(360.0) / 60.0;
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    [r + m, g + m, b + m, alpha]
}

/// CSS `rgba()` string for a canvas fill or stroke style
pub fn css(color: Color) -> String {
    let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "rgba({},{},{},{:.3})",
        byte(color[0]),
        byte(color[1]),
        byte(color[2]),
        color[3].clamp(0.0, 1.0)
    )
}

/// Palette shared by the games
pub mod colors {
    use super::Color;

    pub const BACKGROUND: Color = [0.96, 0.97, 1.0, 1.0];
    pub const INK: Color = [0.12, 0.14, 0.2, 1.0];
    pub const MUTED: Color = [0.45, 0.48, 0.55, 1.0];
    pub const TABLE: Color = [0.62, 0.45, 0.3, 1.0];
    pub const HAIR: Color = [0.35, 0.22, 0.12, 1.0];
    pub const PAPER: Color = [1.0, 1.0, 1.0, 1.0];
    pub const ELECTRON: Color = [0.2, 0.45, 1.0, 1.0];
    pub const SPARK: Color = [1.0, 0.85, 0.2, 1.0];
    pub const ROPE: Color = [0.3, 0.3, 0.35, 1.0];
    pub const POLE_N: Color = [0.85, 0.2, 0.2, 1.0];
    pub const POLE_S: Color = [0.2, 0.4, 0.85, 1.0];
    pub const SLOT: Color = [0.85, 0.87, 0.92, 1.0];
    pub const OK: Color = [0.2, 0.7, 0.35, 1.0];
    pub const BAD: Color = [0.9, 0.25, 0.2, 1.0];
    pub const METAL: Color = [0.55, 0.58, 0.62, 1.0];
    pub const TIRE: Color = [0.15, 0.15, 0.17, 1.0];
    pub const WIRE_PLUS: Color = [0.85, 0.2, 0.2, 1.0];
    pub const WIRE_MINUS: Color = [0.1, 0.1, 0.12, 1.0];
    pub const BULB_OFF: Color = [0.8, 0.8, 0.75, 1.0];
    pub const BULB_ON: Color = [1.0, 0.9, 0.35, 1.0];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsla_primaries() {
        let red = hsla(0.0, 1.0, 0.5, 1.0);
        assert!((red[0] - 1.0).abs() < 1e-5 && red[1].abs() < 1e-5 && red[2].abs() < 1e-5);
        let blue = hsla(240.0, 1.0, 0.5, 0.5);
        assert!((blue[2] - 1.0).abs() < 1e-5 && blue[0].abs() < 1e-5);
        assert_eq!(blue[3], 0.5);
    }

    #[test]
    fn test_css_string() {
        assert_eq!(css([1.0, 0.0, 0.5, 0.38]), "rgba(255,0,128,0.380)");
        assert_eq!(css([2.0, -1.0, 0.0, 1.5]), "rgba(255,0,0,1.000)");
    }

    #[test]
    fn test_frame_builder_keeps_order() {
        let mut f = Frame::new();
        f.clear(colors::BACKGROUND);
        f.circle(Vec2::ZERO, 3.0, colors::INK);
        f.text(Vec2::ZERO, "hola", 14.0, colors::INK);
        assert_eq!(f.len(), 3);
        assert!(matches!(f.commands[0], DrawCmd::Clear { .. }));
        assert!(matches!(f.commands[2], DrawCmd::Text { .. }));
    }
}
