//! Per-frame engine input and output

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::indicator::IndicatorOutput;
use crate::commands::Cmd;
use crate::geometry::Pose;
use crate::panel::{PanelId, PanelKind};

/// Everything the host samples once per frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameInput {
    pub wand: Pose,
    /// Head position
    pub head: Vec3,
    /// World-space gaze direction
    pub gaze: Vec3,
    pub scroll_delta: f32,
    pub rotate_held: bool,
    pub analog_is_stick: bool,
}

impl FrameInput {
    pub fn new(wand: Pose, head: Vec3, gaze: Vec3) -> Self {
        Self {
            wand,
            head,
            gaze,
            ..Self::default()
        }
    }

    pub fn with_scroll(mut self, delta: f32, rotate_held: bool) -> Self {
        self.scroll_delta = delta;
        self.rotate_held = rotate_held;
        self
    }

    pub fn with_stick(mut self, analog_is_stick: bool) -> Self {
        self.analog_is_stick = analog_is_stick;
        self
    }
}

/// World placement of one panel
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PanelTransform {
    pub id: PanelId,
    pub kind: PanelKind,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
    pub visible: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameOutput {
    /// One entry per panel, in id order
    pub transforms: Vec<PanelTransform>,
    pub indicator: Option<IndicatorOutput>,
    pub commands: Vec<Cmd>,
}

impl FrameOutput {
    pub fn transform(&self, id: PanelId) -> Option<&PanelTransform> {
        self.transforms.get(id.index())
    }
}
