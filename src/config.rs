//! Layout engine configuration persistence
//!
//! Stores tuning constants in `~/.config/wand-layout/config.yaml`. Every field
//! falls back to its built-in default when missing from the file.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Ring rotation tuning (swipe + stick snap)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Degrees of ring rotation between haptic ticks
    pub feedback_interval: f32,
    /// Degrees per unit of analog scroll
    pub rotation_scalar: f32,
    /// Release velocity per unit of averaged scroll delta
    pub velocity_scalar: f32,
    /// Free-spin velocity decay per second
    pub decay: f32,
    /// Number of recent swipe deltas averaged on release
    pub swipe_window: usize,
    /// Stick deflection that triggers a snap
    pub snap_threshold: f32,
    /// Snap animation progress per second
    pub snap_speed: f32,
    /// Delay after a snap before the next one may start
    pub snap_rest_time: f32,
    /// Fraction of `rotation_scalar` used for stick previews
    pub stick_multiplier: f32,
    pub jiggle_decay: f32,
    pub jiggle_frequency: f32,
    pub jiggle_amplitude: f32,
    /// Haptic pulse length for swipe ticks
    pub haptic_duration: f32,
    /// Reveal spin speed in degrees per second
    pub reveal_spin_speed: f32,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            feedback_interval: 20.0,
            rotation_scalar: 200.0,
            velocity_scalar: 7500.0,
            decay: 10.0,
            swipe_window: 4,
            snap_threshold: 0.7,
            snap_speed: 10.0,
            snap_rest_time: 0.1,
            stick_multiplier: 0.25,
            jiggle_decay: 6.0,
            jiggle_frequency: 60.0,
            jiggle_amplitude: 2.0,
            haptic_duration: 0.05,
            reveal_spin_speed: 720.0,
        }
    }
}

/// Pane geometry and docking thresholds, in wand-local units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaneConfig {
    pub min_y: f32,
    pub max_y: f32,
    pub half_width: f32,
    /// Distance from the wand axis to the pane surface
    pub wand_radius: f32,
    pub admin_radius: f32,
    pub snap_distance: f32,
    /// Hysteresis fraction applied to snap distance, width and step
    pub sticky_percent: f32,
    /// Vertical quantization step (0 disables quantization)
    pub snap_step: f32,
    pub max_facing_angle: f32,
    /// Extra radius while a held panel hovers over a pane
    pub radius_manipulation_adjust: f32,
    pub indicator_radius: f32,
    pub indicator_show_speed: f32,
}

impl Default for PaneConfig {
    fn default() -> Self {
        Self {
            min_y: -0.6,
            max_y: 0.6,
            half_width: 0.2,
            wand_radius: 0.25,
            admin_radius: 0.15,
            snap_distance: 0.3,
            sticky_percent: 0.25,
            snap_step: 0.05,
            max_facing_angle: 70.0,
            radius_manipulation_adjust: 0.05,
            indicator_radius: 0.22,
            indicator_show_speed: 8.0,
        }
    }
}

/// Panel and panel-set animation speeds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Seconds for a fixed/floating transition
    pub duration: f32,
    /// Constant rate (units per second) at which a fixed panel settles
    pub attach_adjust_speed: f32,
    /// Mode and visibility scale change per second
    pub mode_speed: f32,
    /// Accumulated swipe needed to leave an alternate mode
    pub alt_swipe_threshold: f32,
    /// Degrees an alternate panel turns at the swipe threshold
    pub alt_swipe_tease: f32,
    /// Alternate panel distance from the wand axis
    pub alt_radius: f32,
    /// Alternate panel offset along the wand axis
    pub alt_height: f32,
    /// Alternate panel orientation adjustment (Euler degrees, XYZ)
    pub alt_rotation: [f32; 3],
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration: 0.25,
            attach_adjust_speed: 3.0,
            mode_speed: 8.0,
            alt_swipe_threshold: 0.6,
            alt_swipe_tease: 20.0,
            alt_radius: 0.3,
            alt_height: 0.1,
            alt_rotation: [90.0, 0.0, 0.0],
        }
    }
}

/// Floating panel spring model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepenetrationConfig {
    pub scalar: f32,
    pub spring_k: f32,
    pub dampen: f32,
    pub sweet_spot_radius: f32,
    /// Keep floating panels on the sweet-spot sphere
    pub constrain_to_sweet_spot: bool,
}

impl Default for DepenetrationConfig {
    fn default() -> Self {
        Self {
            scalar: 200.0,
            spring_k: 0.5,
            dampen: 0.1,
            sweet_spot_radius: 1.0,
            constrain_to_sweet_spot: false,
        }
    }
}

/// Haptic pulse lengths and delays (seconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub pane_move_haptic: f32,
    pub attach_haptic: f32,
    pub pane_haptic_delay: f32,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            pane_move_haptic: 0.04,
            attach_haptic: 0.1,
            pane_haptic_delay: 0.1,
        }
    }
}

/// Engine configuration that persists across sessions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub rotation: RotationConfig,
    pub panes: PaneConfig,
    pub transitions: TransitionConfig,
    pub depenetration: DepenetrationConfig,
    pub feedback: FeedbackConfig,
}

impl LayoutConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from an explicit path, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Lower and upper pane bounds
    pub fn pane_bounds(&self) -> crate::panel::Bounds {
        crate::panel::Bounds::new(self.panes.min_y, self.panes.max_y)
    }
}
