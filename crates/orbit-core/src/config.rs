//! Scene description loaded from JSON.
//!
//! Every section has defaults, so `{}` is a valid scene: the anchor model with
//! three moons on circular orbits.

use std::f32::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::interaction::InteractionBehavior;
use crate::orbit::OrbitSpec;
use crate::pick::{PerspectiveRig, PickShape};

/// Error type for scene configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid scene JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Satellite '{name}': {reason}")]
    Satellite { name: String, reason: String },
    #[error("Anchor: {0}")]
    Anchor(String),
    #[error("Camera: {0}")]
    Camera(String),
    #[error("Angular step must be within [0, 2π] radians per tick, got {0}")]
    AngularStep(f32),
}

fn default_angular_step() -> f32 {
    0.02
}

fn default_true() -> bool {
    true
}

/// Top-level scene description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub anchor: AnchorConfig,
    /// Radians the shared orbit clock advances per tick.
    #[serde(default = "default_angular_step")]
    pub angular_step: f32,
    #[serde(default = "SceneConfig::default_satellites")]
    pub satellites: Vec<SatelliteConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            anchor: AnchorConfig::default(),
            angular_step: default_angular_step(),
            satellites: Self::default_satellites(),
        }
    }
}

impl SceneConfig {
    /// Parses and validates a scene.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // The clock only runs forward, and more than a turn per tick aliases.
        if !(0.0..=TAU).contains(&self.angular_step) {
            return Err(ConfigError::AngularStep(self.angular_step));
        }
        self.camera.validate()?;
        self.anchor.validate()?;
        for satellite in &self.satellites {
            satellite
                .validate()
                .map_err(|reason| ConfigError::Satellite {
                    name: satellite.name.clone(),
                    reason,
                })?;
        }
        Ok(())
    }

    fn default_satellites() -> Vec<SatelliteConfig> {
        [
            ("red", 2.0, [1.0, 0.0, 0.0]),
            ("green", 3.0, [0.0, 1.0, 0.0]),
            ("blue", 4.0, [0.0, 0.0, 1.0]),
        ]
        .into_iter()
        .map(|(name, distance, color)| SatelliteConfig {
            name: format!("moon-{name}"),
            orbit: OrbitSpec::circular(distance),
            size: 0.5,
            color,
            texture: None,
            behavior: InteractionBehavior::Navigate {
                url: format!("https://example.com/{name}"),
            },
            hit_proxy: None,
        })
        .collect()
    }
}

/// Perspective camera placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 10.0],
            target: [0.0, 0.0, 0.0],
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl CameraConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(ConfigError::Camera(format!(
                "fov must be in (0, 180) degrees, got {}",
                self.fov_degrees
            )));
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(ConfigError::Camera(format!(
                "clip planes must satisfy 0 < near < far, got {}..{}",
                self.near, self.far
            )));
        }
        if self.position == self.target {
            return Err(ConfigError::Camera("position and target coincide".into()));
        }
        Ok(())
    }

    /// Builds a picking rig for a viewport of the given aspect ratio.
    pub fn rig(&self, aspect: f32) -> PerspectiveRig {
        PerspectiveRig {
            position: self.position.into(),
            target: self.target.into(),
            fov_y: self.fov_degrees.to_radians(),
            aspect,
            near: self.near,
            far: self.far,
            ..PerspectiveRig::default()
        }
    }
}

/// The central body the satellites orbit around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    pub name: String,
    /// glTF scene path relative to the asset root. `None` renders a plain cube.
    pub model: Option<String>,
    pub position: [f32; 3],
    pub scale: f32,
    /// Rotation about Y in radians.
    pub rotation_y: f32,
    /// Hit-test volume in model units.
    pub pick: PickShape,
    pub behavior: InteractionBehavior,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            name: "anchor".into(),
            model: Some("models/anchor.glb#Scene0".into()),
            position: [0.0, 0.0, 0.0],
            scale: 10.0,
            rotation_y: PI,
            pick: PickShape::Cuboid {
                half_extents: [0.1, 0.1, 0.1],
            },
            behavior: InteractionBehavior::DragHighlight,
        }
    }
}

impl AnchorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(ConfigError::Anchor(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }
        validate_shape(&self.pick).map_err(ConfigError::Anchor)?;
        validate_behavior(&self.behavior).map_err(ConfigError::Anchor)
    }
}

/// One orbiting body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatelliteConfig {
    pub name: String,
    #[serde(flatten)]
    pub orbit: OrbitSpec,
    /// Sphere radius.
    pub size: f32,
    /// Linear RGB in `[0, 1]`.
    #[serde(default = "SatelliteConfig::default_color")]
    pub color: [f32; 3],
    #[serde(default)]
    pub texture: Option<String>,
    #[serde(default)]
    pub behavior: InteractionBehavior,
    /// Enlarged invisible pick target attached to the body.
    #[serde(default)]
    pub hit_proxy: Option<HitProxyConfig>,
}

impl SatelliteConfig {
    fn default_color() -> [f32; 3] {
        [1.0, 1.0, 1.0]
    }

    fn validate(&self) -> Result<(), String> {
        let OrbitSpec {
            radius_major,
            radius_minor,
            tilt,
            spin_speed,
            phase_offset,
        } = self.orbit;
        for (label, radius) in [("radius_major", radius_major), ("radius_minor", radius_minor)] {
            if !(radius.is_finite() && radius >= 0.0) {
                return Err(format!("{label} must be a finite non-negative number, got {radius}"));
            }
        }
        if ![tilt, spin_speed, phase_offset].iter().all(|v| v.is_finite()) {
            return Err("orbit angles must be finite".into());
        }
        if !(self.size.is_finite() && self.size > 0.0) {
            return Err(format!("size must be positive, got {}", self.size));
        }
        if let Some(proxy) = &self.hit_proxy {
            if !(proxy.scale.is_finite() && proxy.scale > 0.0) {
                return Err(format!("hit proxy scale must be positive, got {}", proxy.scale));
            }
        }
        validate_behavior(&self.behavior)
    }
}

/// Invisible (by default) sphere around a satellite, scaled relative to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitProxyConfig {
    pub scale: f32,
    #[serde(default)]
    pub visible: bool,
}

impl Default for HitProxyConfig {
    fn default() -> Self {
        Self {
            scale: 2.0,
            visible: false,
        }
    }
}

fn validate_shape(shape: &PickShape) -> Result<(), String> {
    let ok = match shape {
        PickShape::Sphere { radius } => radius.is_finite() && *radius > 0.0,
        PickShape::Cuboid { half_extents } => {
            half_extents.iter().all(|h| h.is_finite() && *h >= 0.0)
        }
    };
    if ok {
        Ok(())
    } else {
        Err(format!("invalid pick shape {shape:?}"))
    }
}

fn validate_behavior(behavior: &InteractionBehavior) -> Result<(), String> {
    match behavior {
        InteractionBehavior::Navigate { url } if url.trim().is_empty() => {
            Err("navigate behavior needs a url".into())
        }
        _ => Ok(()),
    }
}
