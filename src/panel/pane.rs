//! Panes: the three angular docking sectors around the wand

use serde::{Deserialize, Serialize};

use super::{Panel, PanelId};

/// Angular offsets of the three panes, in degrees
pub const PANE_ANGLES: [f32; 3] = [0.0, 120.0, 240.0];

/// Degrees between adjacent panes
pub const PANE_SPACING: f32 = 360.0 / 3.0;

const ANGLE_EPSILON: f32 = 1e-3;

/// Vertical extent of a pane along the wand axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f32,
    pub max: f32,
}

impl Bounds {
    pub fn new(min: f32, max: f32) -> Self {
        debug_assert!(min <= max);
        Self { min, max }
    }

    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    /// Clamp a panel centre so the whole panel stays inside
    pub fn clamp_center(&self, offset: f32, half_height: f32) -> f32 {
        let lo = self.min + half_height;
        let hi = self.max - half_height;
        if lo > hi {
            // Taller than the pane; pin to the top
            hi
        } else {
            offset.clamp(lo, hi)
        }
    }
}

/// One panel's vertical slot within a pane stack
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackSlot {
    pub id: PanelId,
    pub stable: f32,
    pub target: f32,
    pub half: f32,
}

impl StackSlot {
    pub fn top(&self) -> f32 {
        self.target + self.half
    }

    pub fn bottom(&self) -> f32 {
        self.target - self.half
    }
}

/// A docking sector and its ordered panel stack
#[derive(Debug, Clone, PartialEq)]
pub struct Pane {
    pub angle: f32,
    /// Panel ids by descending stable offset
    pub panels: Vec<PanelId>,
}

impl Pane {
    pub fn new(angle: f32) -> Self {
        Self {
            angle,
            panels: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// Snapshot the stack's offsets in pane order
    pub fn stack(&self, panels: &[Panel]) -> Vec<StackSlot> {
        self.panels
            .iter()
            .map(|id| {
                let panel = &panels[id.index()];
                StackSlot {
                    id: *id,
                    stable: panel.offset.stable,
                    target: panel.offset.target,
                    half: panel.half_height,
                }
            })
            .collect()
    }

    /// Write stack targets back onto the panels
    pub fn apply_stack(stack: &[StackSlot], panels: &mut [Panel]) {
        for slot in stack {
            panels[slot.id.index()].offset.target = slot.target;
        }
    }
}

/// The three panes, rebuilt wholesale whenever ordering is needed
#[derive(Debug, Clone, PartialEq)]
pub struct PaneSet {
    pub panes: [Pane; 3],
}

impl Default for PaneSet {
    fn default() -> Self {
        Self {
            panes: PANE_ANGLES.map(Pane::new),
        }
    }
}

impl PaneSet {
    /// Index of the pane at `angle`, if it is one of the pane angles
    pub fn index_for_angle(angle: f32) -> Option<usize> {
        let angle = crate::geometry::normalize_angle(angle);
        PANE_ANGLES
            .iter()
            .position(|a| (a - angle).abs() < ANGLE_EPSILON)
    }

    pub fn pane(&self, index: usize) -> &Pane {
        &self.panes[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pane> {
        self.panes.iter()
    }

    /// Rebuild every pane from the panels that pass `include`
    ///
    /// Panels are assigned by attach angle and sorted by descending stable
    /// offset, ties broken by id.
    pub fn rebuild(&mut self, panels: &[Panel], include: impl Fn(&Panel) -> bool) {
        for pane in &mut self.panes {
            pane.panels.clear();
        }

        for panel in panels.iter().filter(|p| include(p)) {
            if let Some(index) = Self::index_for_angle(panel.attach_angle) {
                self.panes[index].panels.push(panel.id);
            }
        }

        for pane in &mut self.panes {
            pane.panels.sort_by(|a, b| {
                let sa = panels[a.index()].offset.stable;
                let sb = panels[b.index()].offset.stable;
                sb.total_cmp(&sa).then(a.cmp(b))
            });
        }
    }

    /// Pane currently holding `id`
    pub fn find_panel(&self, id: PanelId) -> Option<usize> {
        self.panes.iter().position(|pane| pane.panels.contains(&id))
    }
}
