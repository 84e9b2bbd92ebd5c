//! Per-panel runtime state

use serde::{Deserialize, Serialize};

use super::{Capabilities, PanelKind, PanelSpec};
use crate::depenetration::DepenetrationBody;
use crate::geometry::{normalize_angle, Pose};
use crate::transition::FixedTransition;

/// Handle to a panel owned by the engine
///
/// Ids are dense indices into the engine's panel list and never change once
/// the engine is built.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PanelId(pub u32);

impl PanelId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Vertical attach offsets along the wand axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttachOffset {
    /// Displayed offset, eased toward `target`
    pub current: f32,
    /// Desired offset for this frame or interaction
    pub target: f32,
    /// Last committed offset
    pub stable: f32,
    /// Offset from the panel map
    pub initial: f32,
}

impl AttachOffset {
    pub fn at(offset: f32) -> Self {
        Self {
            current: offset,
            target: offset,
            stable: offset,
            initial: offset,
        }
    }

    /// Move every offset except `initial` to `offset`
    pub fn set_all(&mut self, offset: f32) {
        self.current = offset;
        self.target = offset;
        self.stable = offset;
    }

    pub fn commit(&mut self) {
        self.stable = self.target;
    }
}

/// A movable panel
#[derive(Debug, Clone)]
pub struct Panel {
    pub id: PanelId,
    pub kind: PanelKind,
    /// Member of the advanced set (unique panels are in neither)
    pub advanced: bool,
    pub capabilities: Capabilities,
    pub begin_fixed: bool,
    pub fixed: bool,
    pub attach_angle: f32,
    pub initial_angle: f32,
    pub offset: AttachOffset,
    pub half_height: f32,
    pub radius_adjust: f32,
    /// Held panel has a valid slot with room
    pub primed: bool,
    /// Panel is shown (widget active)
    pub visible: bool,
    /// Re-show this panel when its set comes back
    pub restore: bool,
    pub pose: Pose,
    pub transition: FixedTransition,
    pub body: DepenetrationBody,
}

impl Panel {
    pub fn from_spec(id: PanelId, spec: &PanelSpec, advanced: bool) -> Self {
        let angle = normalize_angle(spec.attach_angle);
        let transition = if spec.begin_fixed {
            FixedTransition::fixed()
        } else {
            FixedTransition::floating()
        };
        let pose = Pose::from_position(spec.spawn);

        Self {
            id,
            kind: spec.kind,
            advanced: advanced && !spec.kind.is_unique(),
            capabilities: spec.capabilities,
            begin_fixed: spec.begin_fixed,
            fixed: spec.begin_fixed,
            attach_angle: angle,
            initial_angle: angle,
            offset: AttachOffset::at(spec.y_offset),
            half_height: spec.half_height,
            radius_adjust: 0.0,
            primed: false,
            visible: false,
            restore: false,
            pose,
            transition,
            body: DepenetrationBody::new(
                id,
                pose,
                spec.bounds,
                spec.sample_radius,
                spec.collision_radius,
            ),
        }
    }

    pub fn is_unique(&self) -> bool {
        self.kind.is_unique()
    }

    /// Whether the panel belongs to the active basic/advanced set
    pub fn available(&self, advanced: bool) -> bool {
        self.is_unique() || self.advanced == advanced
    }

    /// Docked at its panel-map slot
    pub fn in_initial_position(&self) -> bool {
        self.offset.current == self.offset.initial && self.attach_angle == self.initial_angle
    }

    /// Participates in pane ordering
    pub fn in_pane(&self, advanced: bool) -> bool {
        self.fixed
            && !self.kind.is_admin()
            && self.kind.alt_mode().is_none()
            && self.available(advanced)
    }

    /// Return to the panel-map slot, docked
    pub fn reset_to_initial(&mut self) {
        self.offset.set_all(self.offset.initial);
        self.attach_angle = self.initial_angle;
        self.radius_adjust = 0.0;
        if !self.transition.is_fixed() {
            self.fixed = true;
            self.transition = FixedTransition::fixed();
        }
    }

    /// Detach into free space without animation
    pub fn make_floating(&mut self) {
        self.fixed = false;
        self.transition = FixedTransition::floating();
    }

    /// Dock without animation
    pub fn make_fixed(&mut self) {
        self.fixed = true;
        self.transition = FixedTransition::fixed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::{PanelSets, PanelSpec};

    #[test]
    fn test_from_spec_fixed() {
        let spec = PanelSpec::new(PanelKind::Labs, PanelSets::Advanced).fixed_at(-120.0, 0.2);
        let panel = Panel::from_spec(PanelId(4), &spec, true);
        assert!(panel.fixed);
        assert_eq!(panel.attach_angle, 240.0);
        assert_eq!(panel.offset, AttachOffset::at(0.2));
        assert!(panel.transition.is_fixed());
        assert!(panel.in_initial_position());
        assert!(panel.available(true));
        assert!(!panel.available(false));
    }

    #[test]
    fn test_unique_panels_always_available() {
        let spec = PanelSpec::new(PanelKind::Camera, PanelSets::Both);
        let panel = Panel::from_spec(PanelId(0), &spec, true);
        assert!(!panel.advanced);
        assert!(panel.available(true));
        assert!(panel.available(false));
        assert!(!panel.in_pane(true));
    }

    #[test]
    fn test_reset_to_initial_redocks() {
        let spec = PanelSpec::new(PanelKind::Extra, PanelSets::Advanced).fixed_at(0.0, -0.2);
        let mut panel = Panel::from_spec(PanelId(1), &spec, true);
        panel.make_floating();
        panel.attach_angle = 120.0;
        panel.offset.set_all(0.4);

        panel.reset_to_initial();
        assert!(panel.fixed);
        assert!(panel.in_initial_position());
        assert_eq!(panel.offset.stable, -0.2);
    }
}
