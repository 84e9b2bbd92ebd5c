//! Pane indicator: highlights the slot a held panel would dock into

use glam::Quat;
use serde::Serialize;

use crate::geometry::{panel_adjust, ring_pose, Pose};
use crate::panel::PANE_ANGLES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IndicatorState {
    Hidden,
    HiddenToShowing,
    Showing,
    ShowingToHidden,
}

/// Indicator as the host should draw it this frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorOutput {
    pub pane: usize,
    pub position: glam::Vec3,
    pub rotation: Quat,
    /// 0 hidden, 1 fully shown
    pub show: f32,
    /// The held panel fits; false tints the indicator as an error
    pub ok: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaneIndicator {
    state: IndicatorState,
    show: f32,
    pane: Option<usize>,
    offset: f32,
    ok: bool,
}

impl Default for PaneIndicator {
    fn default() -> Self {
        Self {
            state: IndicatorState::Hidden,
            show: 0.0,
            pane: None,
            offset: 0.0,
            ok: true,
        }
    }
}

impl PaneIndicator {
    pub fn state(&self) -> IndicatorState {
        self.state
    }

    pub fn show_fraction(&self) -> f32 {
        self.show
    }

    /// Point at a pane slot, or start hiding with `None`
    pub fn target(&mut self, slot: Option<(usize, f32, bool)>) {
        match slot {
            Some((pane, offset, ok)) => {
                self.pane = Some(pane);
                self.offset = offset;
                self.ok = ok;
                if matches!(
                    self.state,
                    IndicatorState::Hidden | IndicatorState::ShowingToHidden
                ) {
                    self.state = IndicatorState::HiddenToShowing;
                }
            }
            None => {
                if matches!(
                    self.state,
                    IndicatorState::Showing | IndicatorState::HiddenToShowing
                ) {
                    self.state = IndicatorState::ShowingToHidden;
                }
            }
        }
    }

    /// Hide immediately
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn tick(&mut self, dt: f32, speed: f32) {
        let step = speed * dt;
        match self.state {
            IndicatorState::HiddenToShowing => {
                self.show = (self.show + step).min(1.0);
                if self.show >= 1.0 {
                    self.state = IndicatorState::Showing;
                }
            }
            IndicatorState::ShowingToHidden => {
                self.show = (self.show - step).max(0.0);
                if self.show <= 0.0 {
                    self.state = IndicatorState::Hidden;
                    self.pane = None;
                }
            }
            IndicatorState::Hidden | IndicatorState::Showing => {}
        }
    }

    /// World placement on the ring, `ring_angle` being origin plus any
    /// transient rotation
    pub fn output(&self, wand: &Pose, ring_angle: f32, radius: f32) -> Option<IndicatorOutput> {
        if self.state == IndicatorState::Hidden {
            return None;
        }
        let pane = self.pane?;
        let pose = ring_pose(
            wand,
            ring_angle + PANE_ANGLES[pane],
            radius,
            self.offset,
            panel_adjust(),
        );
        Some(IndicatorOutput {
            pane,
            position: pose.position,
            rotation: pose.rotation,
            show: self.show,
            ok: self.ok,
        })
    }
}
