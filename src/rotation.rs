//! Ring rotation: the origin angle all panes are measured from
//!
//! Two input styles drive the ring. Touchpads swipe it continuously and let it
//! coast on release; thumbsticks snap it a whole pane at a time through a
//! small state machine.

use std::collections::VecDeque;

use glam::Vec3;
use serde::Serialize;

use crate::commands::{AudioCue, Cmd, Controller};
use crate::config::RotationConfig;
use crate::geometry::{normalize_angle, sign, signed_angle_delta};
use crate::panel::PANE_SPACING;

/// Free-spin steps smaller than this stop the spin
const MIN_SPIN_STEP: f32 = 1e-4;

/// Per-frame rotation input
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RotationInput {
    pub scroll_delta: f32,
    pub rotate_held: bool,
    pub analog_is_stick: bool,
    /// Panels are visible and in standard mode
    pub gate_open: bool,
    /// Where audio cues are played
    pub position: Vec3,
}

/// Stick snap sub-state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SnapState {
    Done,
    Snapping,
    Jiggling,
    Resting,
}

#[derive(Debug, Clone)]
pub struct RadialOriginController {
    config: RotationConfig,
    /// Committed origin angle, always in [0, 360)
    origin: f32,
    /// Transient preview offset, recomputed every frame
    offset: f32,
    velocity: f32,
    window: VecDeque<f32>,
    last_feedback: f32,
    snap: SnapState,
    snap_time: f32,
    snap_dir: f32,
    snap_init: f32,
    clock: f32,
}

impl RadialOriginController {
    pub fn new(config: RotationConfig) -> Self {
        Self {
            config,
            origin: 0.0,
            offset: 0.0,
            velocity: 0.0,
            window: VecDeque::with_capacity(config.swipe_window.max(1)),
            last_feedback: 0.0,
            snap: SnapState::Done,
            snap_time: 0.0,
            snap_dir: 1.0,
            snap_init: 0.0,
            clock: 0.0,
        }
    }

    pub fn origin(&self) -> f32 {
        self.origin
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn snap_state(&self) -> SnapState {
        self.snap
    }

    /// Overwrite the origin without haptics (reveal spin completion)
    pub fn set_origin(&mut self, angle: f32) {
        self.origin = normalize_angle(angle);
        self.last_feedback = self.origin;
        self.offset = 0.0;
    }

    pub fn reset(&mut self) {
        self.origin = 0.0;
        self.offset = 0.0;
        self.velocity = 0.0;
        self.last_feedback = 0.0;
        self.window.clear();
        self.snap = SnapState::Done;
        self.snap_time = 0.0;
    }

    /// Consume one frame of analog input
    pub fn update(&mut self, input: &RotationInput, dt: f32) -> Option<Cmd> {
        self.clock += dt;
        if input.analog_is_stick {
            self.update_snap(input, dt)
        } else {
            self.update_swipe(input)
        }
    }

    /// Apply and decay free-spin velocity
    pub fn spin(&mut self, dt: f32, analog_is_stick: bool) -> Option<Cmd> {
        let step = self.velocity * dt;
        if step.abs() > MIN_SPIN_STEP {
            self.velocity *= (1.0 - self.config.decay * dt).max(0.0);
            self.rotate(step, self.offset, analog_is_stick)
        } else {
            self.velocity = 0.0;
            None
        }
    }

    fn update_swipe(&mut self, input: &RotationInput) -> Option<Cmd> {
        self.offset = 0.0;
        if input.rotate_held && input.gate_open {
            if self.window.len() >= self.config.swipe_window.max(1) {
                self.window.pop_front();
            }
            self.window.push_back(input.scroll_delta);
            self.velocity = 0.0;
            self.rotate(
                -input.scroll_delta * self.config.rotation_scalar,
                0.0,
                false,
            )
        } else {
            if !self.window.is_empty() {
                let mean = self.window.iter().sum::<f32>() / self.window.len() as f32;
                self.velocity = -mean * self.config.velocity_scalar;
                self.window.clear();
            }
            None
        }
    }

    fn update_snap(&mut self, input: &RotationInput, dt: f32) -> Option<Cmd> {
        let preview_scale = self.config.rotation_scalar * self.config.stick_multiplier;

        match self.snap {
            SnapState::Done => {
                let crossed = input.scroll_delta.abs() > self.config.snap_threshold;
                if crossed && input.rotate_held && input.gate_open {
                    self.snap = SnapState::Snapping;
                    self.snap_time = 1.0;
                    self.snap_dir = sign(-input.scroll_delta);
                    self.snap_init = (input.scroll_delta * preview_scale)
                        .abs()
                        .min(PANE_SPACING);
                    self.offset = self.snap_dir * self.snap_init;
                    tracing::debug!(direction = self.snap_dir, "ring snap started");
                    return Some(Cmd::audio(AudioCue::PanelFlip, input.position));
                }

                self.offset = if input.gate_open {
                    -input.scroll_delta * preview_scale
                } else {
                    0.0
                };
                None
            }
            SnapState::Snapping => {
                let init = self.snap_init;
                let angle = init + (PANE_SPACING - init) * (1.0 - self.snap_time);
                self.offset = self.snap_dir * angle;
                self.snap_time -= dt * self.config.snap_speed;

                if self.snap_time <= 0.0 {
                    let cmd = self.rotate(self.snap_dir * PANE_SPACING, 0.0, true);
                    self.snap_time = 1.0;
                    self.snap = SnapState::Jiggling;
                    tracing::debug!(origin = self.origin, "ring snap committed");
                    return cmd;
                }
                None
            }
            SnapState::Jiggling => {
                self.offset = (self.clock * self.config.jiggle_frequency).sin()
                    * self.config.jiggle_amplitude
                    * self.snap_time
                    * self.snap_dir;
                self.snap_time -= dt * self.config.jiggle_decay;

                if self.snap_time <= 0.0 {
                    self.offset = 0.0;
                    self.snap_time = self.config.snap_rest_time;
                    self.snap = SnapState::Resting;
                }
                None
            }
            SnapState::Resting => {
                self.offset = 0.0;
                self.snap_time -= dt;
                if self.snap_time <= 0.0 {
                    self.snap = SnapState::Done;
                }
                None
            }
        }
    }

    /// Add `diff` to the origin, set the preview offset, and tick haptics
    fn rotate(&mut self, diff: f32, offset: f32, analog_is_stick: bool) -> Option<Cmd> {
        self.offset = offset;
        self.origin = normalize_angle(self.origin + diff);

        let since_feedback = signed_angle_delta(self.origin, self.last_feedback);
        if since_feedback.abs() > self.config.feedback_interval {
            self.last_feedback = self.origin;
            if !analog_is_stick {
                return Some(Cmd::haptic(
                    Controller::Wand,
                    self.config.haptic_duration,
                ));
            }
        }
        None
    }
}
