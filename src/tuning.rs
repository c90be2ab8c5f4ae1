//! Data-driven game constants
//!
//! Every hand-tuned number lives here so it can be overridden from JSON
//! without touching game logic. Physics values are per simulation tick.

use serde::{Deserialize, Serialize};

/// Balloon game ("carga eléctrica") constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BalloonTuning {
    pub balloon_w: f32,
    pub balloon_h: f32,
    pub rope_len: f32,

    // === Physics ===
    pub gravity_base: f32,
    pub gravity_charged: f32,
    /// Restitution against floor and ceiling
    pub bounce: f32,
    /// Restitution against side walls
    pub wall_bounce: f32,
    pub air_friction: f32,
    pub k_repel: f32,
    pub max_repel_step: f32,
    /// Added to squared distance so repulsion stays finite at contact
    pub repel_softening: f32,
    pub jitter_x: f32,
    pub jitter_y: f32,
    /// Horizontal damping applied when landing on the table
    pub surface_damping: f32,
    /// Depth below the table top still counted as landing
    pub contact_band: f32,
    /// Vertical gap accepted by the release-on-table test
    pub release_tolerance: f32,
    /// Vertical gap accepted by the per-tick "on the table" test
    pub rest_tolerance: f32,
    /// Bounce speed under which a floor bounce is killed
    pub floor_rest_speed: f32,
    pub rope_limit: f32,
    pub rope_smoothing: f32,

    // === Papers ===
    pub paper_count: usize,
    pub paper_pull_radius: f32,
    pub paper_max_pull: f32,
    pub paper_pull_smooth: f32,
    /// Degrees
    pub paper_max_rot: f32,
    pub paper_max_scale: f32,

    // === Timing (ms) ===
    pub win_confirm_ms: f64,
    pub intro_delay_ms: f64,
    pub spark_count: u32,
    pub spark_interval_ms: f64,
    pub spark_life_ms: f64,
    pub wiggle_ms: f64,
}

impl Default for BalloonTuning {
    fn default() -> Self {
        Self {
            balloon_w: 48.0,
            balloon_h: 66.0,
            rope_len: 26.0,

            gravity_base: 0.55,
            gravity_charged: 0.38,
            bounce: 0.2,
            wall_bounce: 0.25,
            air_friction: 0.995,
            k_repel: 900.0,
            max_repel_step: 0.45,
            repel_softening: 60.0,
            jitter_x: 0.02,
            jitter_y: 0.015,
            surface_damping: 0.82,
            contact_band: 10.0,
            release_tolerance: 8.0,
            rest_tolerance: 2.0,
            floor_rest_speed: 0.7,
            rope_limit: 14.0,
            rope_smoothing: 0.15,

            paper_count: 30,
            paper_pull_radius: 180.0,
            paper_max_pull: 70.0,
            paper_pull_smooth: 0.35,
            paper_max_rot: 18.0,
            paper_max_scale: 1.15,

            win_confirm_ms: 1200.0,
            intro_delay_ms: 50.0,
            spark_count: 8,
            spark_interval_ms: 80.0,
            spark_life_ms: 520.0,
            wiggle_ms: 520.0,
        }
    }
}

/// Bicycle dynamo game ("cicla con dínamo") constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamoTuning {
    /// Release distance under which a wheel, the dynamo or a lead snaps
    pub snap: f32,
    /// Distance under which a lead counts as touching a terminal
    pub connect_tolerance: f32,
    /// Pedal/coast update period
    pub pedal_tick_ms: f64,
    pub cadence_up: f32,
    pub cadence_down: f32,
    pub power_decay: f32,
    pub power_gain: f32,
    /// Power factor while the dynamo is not touching the wheel
    pub idle_factor: f32,
    pub coast_drop: f32,
    /// Minimum power (percent) for the bulb to light
    pub lit_threshold: f32,
    pub win_confirm_ms: f64,
    pub toast_ms: f64,
}

impl Default for DynamoTuning {
    fn default() -> Self {
        Self {
            snap: 16.0,
            connect_tolerance: 14.0,
            pedal_tick_ms: 120.0,
            cadence_up: 0.06,
            cadence_down: 0.08,
            power_decay: 0.85,
            power_gain: 25.0,
            idle_factor: 0.2,
            coast_drop: 4.0,
            lit_threshold: 60.0,
            win_confirm_ms: 1200.0,
            toast_ms: 3500.0,
        }
    }
}

/// Magnet train game ("gauss magnético") constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainTuning {
    pub toast_ms: f64,
    pub invalid_toast_ms: f64,
    pub help_toast_ms: f64,
    /// How long a slot keeps its "bad drop" highlight
    pub bad_flash_ms: f64,
}

impl Default for TrainTuning {
    fn default() -> Self {
        Self {
            toast_ms: 2200.0,
            invalid_toast_ms: 1600.0,
            help_toast_ms: 6500.0,
            bad_flash_ms: 400.0,
        }
    }
}

/// Ripple emitter look
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RippleTuning {
    pub period_ms: f64,
    pub max_radius: f32,
    pub ring_gap: f32,
    pub base_alpha: f32,
    pub rings: u32,
    pub min_radius: f32,
    pub line_width: f32,
}

impl Default for RippleTuning {
    fn default() -> Self {
        Self {
            period_ms: 1600.0,
            max_radius: 180.0,
            ring_gap: 26.0,
            base_alpha: 0.38,
            rings: 8,
            min_radius: 10.0,
            line_width: 2.0,
        }
    }
}

/// All game constants
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub balloons: BalloonTuning,
    pub dynamo: DynamoTuning,
    pub train: TrainTuning,
    pub ripple: RippleTuning,
}

fn positive(name: &str, v: f32) -> Result<(), String> {
    if !v.is_finite() || v <= 0.0 {
        return Err(format!("{name} must be finite and > 0"));
    }
    Ok(())
}

fn unit(name: &str, v: f32) -> Result<(), String> {
    if !v.is_finite() || !(0.0..=1.0).contains(&v) {
        return Err(format!("{name} must be within [0, 1]"));
    }
    Ok(())
}

fn non_negative_ms(name: &str, v: f64) -> Result<(), String> {
    if !v.is_finite() || v < 0.0 {
        return Err(format!("{name} must be finite and >= 0"));
    }
    Ok(())
}

impl Tuning {
    /// Parse overrides from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, String> {
        let tuning: Tuning = serde_json::from_str(json).map_err(|e| e.to_string())?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Apply optional JSON overrides; anything unreadable or invalid falls
    /// back to the defaults
    pub fn load_or_default(source: Option<&str>) -> Self {
        let Some(json) = source.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::default();
        };
        match Self::from_json(json) {
            Ok(tuning) => {
                log::info!("Loaded tuning overrides");
                tuning
            }
            Err(err) => {
                log::warn!("Ignoring tuning overrides: {err}");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let b = &self.balloons;
        positive("balloons.balloon_w", b.balloon_w)?;
        positive("balloons.balloon_h", b.balloon_h)?;
        positive("balloons.repel_softening", b.repel_softening)?;
        positive("balloons.max_repel_step", b.max_repel_step)?;
        positive("balloons.paper_pull_radius", b.paper_pull_radius)?;
        unit("balloons.bounce", b.bounce)?;
        unit("balloons.wall_bounce", b.wall_bounce)?;
        unit("balloons.air_friction", b.air_friction)?;
        unit("balloons.surface_damping", b.surface_damping)?;
        unit("balloons.rope_smoothing", b.rope_smoothing)?;
        if b.gravity_charged > b.gravity_base {
            return Err("balloons.gravity_charged must be <= gravity_base".to_string());
        }
        non_negative_ms("balloons.win_confirm_ms", b.win_confirm_ms)?;

        let d = &self.dynamo;
        positive("dynamo.snap", d.snap)?;
        positive("dynamo.connect_tolerance", d.connect_tolerance)?;
        positive("dynamo.pedal_tick_ms", d.pedal_tick_ms as f32)?;
        unit("dynamo.power_decay", d.power_decay)?;
        if !(0.0..=100.0).contains(&d.lit_threshold) {
            return Err("dynamo.lit_threshold must be within [0, 100]".to_string());
        }
        non_negative_ms("dynamo.win_confirm_ms", d.win_confirm_ms)?;

        non_negative_ms("train.toast_ms", self.train.toast_ms)?;

        let r = &self.ripple;
        positive("ripple.period_ms", r.period_ms as f32)?;
        positive("ripple.max_radius", r.max_radius)?;
        positive("ripple.ring_gap", r.ring_gap)?;
        unit("ripple.base_alpha", r.base_alpha)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let t = Tuning::from_json(r#"{ "balloons": { "win_confirm_ms": 500 } }"#).unwrap();
        assert_eq!(t.balloons.win_confirm_ms, 500.0);
        assert_eq!(t.balloons.k_repel, 900.0);
        assert_eq!(t.dynamo.snap, 16.0);
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut t = Tuning::default();
        t.balloons.air_friction = 1.5;
        assert!(t.validate().is_err());

        let mut t = Tuning::default();
        t.ripple.ring_gap = 0.0;
        assert!(t.validate().is_err());

        assert!(Tuning::from_json("{ not json").is_err());
    }

    #[test]
    fn test_load_or_default() {
        assert_eq!(Tuning::load_or_default(None).dynamo.snap, 16.0);
        assert_eq!(Tuning::load_or_default(Some("  \n")).dynamo.snap, 16.0);

        let t = Tuning::load_or_default(Some(r#"{ "dynamo": { "snap": 20 } }"#));
        assert_eq!(t.dynamo.snap, 20.0);

        // Invalid overrides are dropped as a whole
        let t = Tuning::load_or_default(Some(r#"{ "dynamo": { "snap": 20 }, "ripple": { "ring_gap": 0 } }"#));
        assert_eq!(t.dynamo.snap, 16.0);
        assert_eq!(Tuning::load_or_default(Some("{ not json")).ripple.ring_gap, Tuning::default().ripple.ring_gap);
    }
}
