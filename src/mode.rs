//! Panel-set modes, visibility and the basic/advanced reveal spin
//!
//! The standard panel set can be swapped for one alternate set at a time
//! (sketchbook, settings, camera, brush lab, memory warning). Each mode owns
//! a scale in [0, 1]; a transition grows one while shrinking the other. The
//! whole set can also be shown or hidden, which scales everything through a
//! master scale.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::geometry::{angle_between, project_on_plane, Pose};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Standard,
    Sketchbook,
    Settings,
    Camera,
    BrushLab,
    MemoryWarning,
}

impl Mode {
    pub const ALL: [Mode; 6] = [
        Mode::Standard,
        Mode::Sketchbook,
        Mode::Settings,
        Mode::Camera,
        Mode::BrushLab,
        Mode::MemoryWarning,
    ];

    fn index(self) -> usize {
        match self {
            Mode::Standard => 0,
            Mode::Sketchbook => 1,
            Mode::Settings => 2,
            Mode::Camera => 3,
            Mode::BrushLab => 4,
            Mode::MemoryWarning => 5,
        }
    }

    /// Modes whose panels take over stick input after entering
    pub fn captures_stick(self) -> bool {
        matches!(
            self,
            Mode::Sketchbook | Mode::Settings | Mode::Camera | Mode::MemoryWarning
        )
    }

    /// Modes that can be left by swiping
    pub fn swipe_exits(self) -> bool {
        matches!(self, Mode::Sketchbook | Mode::Settings | Mode::Camera)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModeState {
    Settled(Mode),
    /// One of `from` / `to` is always `Standard`
    Transition { from: Mode, to: Mode },
}

impl ModeState {
    pub fn is_settled(&self, mode: Mode) -> bool {
        *self == ModeState::Settled(mode)
    }
}

/// Show/hide state of the whole panel set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Visibility {
    Visible,
    Exiting,
    Hidden,
    Entering,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModeError {
    #[error("cannot toggle {requested:?} while in {current:?}")]
    IllegalTransition { requested: Mode, current: ModeState },
}

/// Angle around the wand that faces the head, in ring degrees
pub fn alt_angle_from_head(wand: &Pose, head: Vec3) -> f32 {
    let forward = wand.forward();
    let up = wand.up();
    let projected = project_on_plane((head - wand.position).normalize_or_zero(), forward);
    let angle = angle_between(projected, up);
    if up.cross(projected).dot(forward) < 0.0 {
        -angle
    } else {
        angle
    }
}

#[derive(Debug, Clone)]
pub struct ModeMachine {
    state: ModeState,
    visibility: Visibility,
    scales: [f32; 6],
    master: f32,
    speed: f32,
    eat_stick_input: bool,
    swipe_amount: f32,
    alt_angle: f32,
}

impl ModeMachine {
    /// Visible, in standard mode
    pub fn new(speed: f32) -> Self {
        let mut scales = [0.0; 6];
        scales[Mode::Standard.index()] = 1.0;
        Self {
            state: ModeState::Settled(Mode::Standard),
            visibility: Visibility::Visible,
            scales,
            master: 1.0,
            speed,
            eat_stick_input: false,
            swipe_amount: 0.0,
            alt_angle: 0.0,
        }
    }

    pub fn state(&self) -> ModeState {
        self.state
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn master_scale(&self) -> f32 {
        self.master
    }

    /// Effective scale of `mode`'s panels
    pub fn scale(&self, mode: Mode) -> f32 {
        self.master * self.scales[mode.index()]
    }

    pub fn alt_angle(&self) -> f32 {
        self.alt_angle
    }

    pub fn swipe_amount(&self) -> f32 {
        self.swipe_amount
    }

    /// Standard panels may be rearranged and rotated
    pub fn is_standard(&self) -> bool {
        self.state.is_settled(Mode::Standard)
    }

    pub fn panels_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    /// Settled alt mode that takes over stick input
    pub fn visible_alt_mode(&self) -> Option<Mode> {
        match self.state {
            ModeState::Settled(mode) if self.panels_visible() && mode.captures_stick() => {
                Some(mode)
            }
            _ => None,
        }
    }

    /// Tease rotation applied to alt panels while swiping
    pub fn tease_angle(&self, threshold: f32, tease: f32) -> f32 {
        if threshold > 0.0 {
            self.swipe_amount / threshold * tease
        } else {
            0.0
        }
    }

    fn force_scale(&mut self, mode: Mode) {
        self.scales = [0.0; 6];
        self.scales[mode.index()] = 1.0;
    }

    fn slam(&mut self, mode: Mode) {
        self.force_scale(mode);
        self.state = ModeState::Settled(mode);
        if mode != Mode::Standard {
            self.eat_stick_input = true;
        }
    }

    /// Toggle between standard and `mode`
    ///
    /// `alt_angle` is where alt panels appear when entering.
    pub fn toggle(&mut self, mode: Mode, alt_angle: f32) -> Result<(), ModeError> {
        if mode == Mode::MemoryWarning {
            self.toggle_memory_warning();
            return Ok(());
        }

        let hidden = self.visibility == Visibility::Hidden;
        let entering = match self.state {
            ModeState::Settled(Mode::Standard) if mode != Mode::Standard => true,
            ModeState::Transition {
                from,
                to: Mode::Standard,
            } if from == mode => true,
            ModeState::Settled(current) if current == mode && current != Mode::Standard => false,
            ModeState::Transition {
                from: Mode::Standard,
                to,
            } if to == mode => false,
            current => {
                let err = ModeError::IllegalTransition {
                    requested: mode,
                    current,
                };
                tracing::error!("{err}");
                return Err(err);
            }
        };

        if entering {
            if hidden {
                self.slam(mode);
            } else {
                self.state = ModeState::Transition {
                    from: Mode::Standard,
                    to: mode,
                };
            }
            self.swipe_amount = 0.0;
            self.alt_angle = alt_angle;
        } else if hidden {
            self.slam(Mode::Standard);
        } else {
            self.state = ModeState::Transition {
                from: mode,
                to: Mode::Standard,
            };
        }

        tracing::info!(?mode, state = ?self.state, "panel mode toggled");
        Ok(())
    }

    /// Memory warning can be raised from any state
    pub fn toggle_memory_warning(&mut self) {
        if self.state.is_settled(Mode::MemoryWarning) {
            if self.visibility == Visibility::Hidden {
                self.slam(Mode::Standard);
            } else {
                self.state = ModeState::Transition {
                    from: Mode::MemoryWarning,
                    to: Mode::Standard,
                };
            }
        } else {
            self.slam(Mode::MemoryWarning);
        }
        tracing::info!(state = ?self.state, "memory warning toggled");
    }

    /// Start showing or hiding the whole panel set
    ///
    /// Returns true when the panels start exiting.
    pub fn set_visible(&mut self, visible: bool) -> bool {
        match (visible, self.visibility) {
            (true, Visibility::Exiting | Visibility::Hidden) => {
                self.visibility = Visibility::Entering;
                false
            }
            (false, Visibility::Entering | Visibility::Visible) => {
                self.visibility = Visibility::Exiting;
                true
            }
            _ => false,
        }
    }

    /// Advance mode and visibility animations
    pub fn tick(&mut self, dt: f32) {
        let step = self.speed * dt;

        if let ModeState::Transition { from, to } = self.state {
            let grown = (self.scales[to.index()] + step).min(1.0);
            self.scales[to.index()] = grown;
            self.scales[from.index()] = 1.0 - grown;
            if grown >= 1.0 {
                self.state = ModeState::Settled(to);
                self.eat_stick_input = true;
                tracing::debug!(?to, "panel mode settled");
            }
        }

        match self.visibility {
            Visibility::Entering => {
                self.master = (self.master + step).min(1.0);
                if self.master >= 1.0 {
                    self.visibility = Visibility::Visible;
                }
            }
            Visibility::Exiting => {
                self.master = (self.master - step).max(0.0);
                if self.master <= 0.0 {
                    self.visibility = Visibility::Hidden;
                }
            }
            Visibility::Visible | Visibility::Hidden => {}
        }
    }

    /// Swallow stick rotation after a mode change until the stick is released
    ///
    /// Returns the rotate flag to use this frame.
    pub fn filter_rotate(
        &mut self,
        rotate_held: bool,
        scroll_delta: f32,
        analog_is_stick: bool,
    ) -> bool {
        if analog_is_stick && self.eat_stick_input && self.visible_alt_mode().is_some() {
            self.eat_stick_input = scroll_delta.abs() > 0.0;
            return false;
        }
        rotate_held
    }

    /// Accumulate swipe-to-exit input
    ///
    /// Returns the mode to leave once the swipe passes `threshold`.
    pub fn track_swipe_exit(
        &mut self,
        rotate_held: bool,
        scroll_delta: f32,
        threshold: f32,
    ) -> Option<Mode> {
        let mode = self.visible_alt_mode()?;
        if !rotate_held {
            self.swipe_amount = 0.0;
            return None;
        }
        if !mode.swipe_exits() {
            return None;
        }
        self.swipe_amount += scroll_delta;
        (self.swipe_amount.abs() > threshold).then_some(mode)
    }
}

/// Full turn of the ring played when switching basic/advanced sets
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RevealSpin {
    active: bool,
    value: f32,
    target: f32,
    final_angle: f32,
}

impl RevealSpin {
    /// Spin once from `origin`, plus `extra` degrees to land on a panel
    pub fn start(&mut self, origin: f32, extra: Option<f32>) {
        let extra = extra.unwrap_or(0.0);
        self.active = true;
        self.value = 0.0;
        self.target = 360.0 + extra;
        self.final_angle = origin + extra;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Current spin added to every ring angle
    pub fn angle(&self) -> f32 {
        self.value
    }

    /// Returns the origin to commit on the frame the spin completes
    pub fn tick(&mut self, dt: f32, speed: f32) -> Option<f32> {
        if !self.active {
            return None;
        }
        self.value += speed * dt;
        if self.value >= self.target {
            self.value = 0.0;
            self.active = false;
            return Some(self.final_angle);
        }
        None
    }
}
