//! Composite shapes built from draw commands

use glam::Vec2;

use super::frame::{Color, DrawCmd, colors, hsla, with_alpha};
use crate::fx::Ring;
use crate::sim::Entity;

/// Balloon body, knot, swaying rope and (when charged) its electron cloud
pub fn balloon(entity: &Entity, rope_len: f32, body: Color) -> Vec<DrawCmd> {
    let mut cmds = Vec::with_capacity(4 + entity.cloud.len());
    let center = entity.center();
    let knot = Vec2::new(center.x, entity.bottom());

    // Rope hangs from the knot; sway bends it sideways
    let end = knot + Vec2::new(entity.rope * 0.6, rope_len);
    let ctrl = knot + Vec2::new(entity.rope, rope_len * 0.5);
    cmds.push(DrawCmd::Quad {
        from: knot,
        ctrl,
        to: end,
        width: 1.5,
        color: colors::ROPE,
    });

    cmds.push(DrawCmd::Ellipse {
        center,
        radii: entity.size / 2.0,
        rotation: entity.rope.to_radians() * 0.3,
        color: body,
    });
    cmds.push(DrawCmd::Circle {
        center: knot,
        radius: 3.0,
        color: body,
    });
    // Highlight
    cmds.push(DrawCmd::Ellipse {
        center: center - entity.size * Vec2::new(0.18, 0.22),
        radii: entity.size * Vec2::new(0.08, 0.12),
        rotation: -0.4,
        color: with_alpha(colors::PAPER, 0.45),
    });

    for e in &entity.cloud {
        cmds.push(DrawCmd::Circle {
            center: entity.pos + e.offset(entity.size),
            radius: e.size / 2.0,
            color: colors::ELECTRON,
        });
    }
    cmds
}

/// Stroke every ripple ring
pub fn ripple_rings(rings: &[Ring], width: f32) -> Vec<DrawCmd> {
    rings
        .iter()
        .map(|r| DrawCmd::Ring {
            center: r.center,
            radius: r.radius,
            width,
            color: hsla(r.hue, 0.9, 0.55, r.alpha),
        })
        .collect()
}

/// Spoked wheel: tyre, rim, hub
pub fn wheel(center: Vec2, radius: f32, spin: f32) -> Vec<DrawCmd> {
    let mut cmds = vec![
        DrawCmd::Ring {
            center,
            radius,
            width: 8.0,
            color: colors::TIRE,
        },
        DrawCmd::Ring {
            center,
            radius: radius - 6.0,
            width: 2.0,
            color: colors::METAL,
        },
    ];
    for k in 0..8 {
        let a = spin + k as f32 * std::f32::consts::TAU / 8.0;
        cmds.push(DrawCmd::Line {
            from: center,
            to: center + Vec2::new(a.cos(), a.sin()) * (radius - 6.0),
            width: 1.0,
            color: colors::METAL,
        });
    }
    cmds.push(DrawCmd::Circle {
        center,
        radius: 5.0,
        color: colors::METAL,
    });
    cmds
}

/// A short-lived spark; `life` runs 1 -> 0
pub fn spark(pos: Vec2, life: f32) -> DrawCmd {
    DrawCmd::Circle {
        center: pos,
        radius: 2.0 + 3.0 * life,
        color: with_alpha(colors::SPARK, life.clamp(0.0, 1.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balloon_draws_cloud_when_charged() {
        use rand::SeedableRng;
        let mut rng = rand_pcg::Pcg32::seed_from_u64(3);
        let mut e = Entity::new(1, Vec2::new(10.0, 10.0), Vec2::new(48.0, 66.0));
        let plain = balloon(&e, 26.0, colors::BAD).len();
        e.set_charged(true, &mut rng);
        let charged = balloon(&e, 26.0, colors::BAD).len();
        assert_eq!(charged, plain + e.cloud.len());
    }

    #[test]
    fn test_ripple_rings_map_one_to_one() {
        let rings = [
            Ring {
                center: Vec2::ZERO,
                radius: 20.0,
                alpha: 0.3,
                hue: 205.0,
            },
            Ring {
                center: Vec2::ZERO,
                radius: 46.0,
                alpha: 0.2,
                hue: 205.0,
            },
        ];
        let cmds = ripple_rings(&rings, 2.0);
        assert_eq!(cmds.len(), 2);
        if let DrawCmd::Ring { color, .. } = &cmds[1] {
            assert!((color[3] - 0.2).abs() < 1e-6);
        } else {
            panic!("expected a ring");
        }
    }
}
