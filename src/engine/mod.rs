//! Layout engine - the complete state of the panel system
//!
//! The engine owns every panel for its whole lifetime and is driven two ways:
//! `tick` once per frame with sampled input, and `update::update` with
//! discrete messages (drags, mode changes, open/dismiss). Neither touches a
//! scene graph; placement comes back as `FrameOutput` and side effects as
//! `Cmd`s.

mod indicator;
mod io;
mod tick;

pub use indicator::{IndicatorOutput, IndicatorState, PaneIndicator};
pub use io::{FrameInput, FrameOutput, PanelTransform};

use glam::Vec3;

use crate::commands::Cmd;
use crate::config::LayoutConfig;
use crate::depenetration::{DepenetrationSolver, SweetSpot};
use crate::docking::{DockingResolver, RingView};
use crate::gaps::{self, GapReport};
use crate::geometry::{normalize_angle, Pose};
use crate::layout_store::{self, LayoutRecord};
use crate::mode::{ModeMachine, RevealSpin};
use crate::panel::{default_panel_map, Panel, PanelId, PanelKind, PanelSpec, PaneSet};
use crate::rotation::RadialOriginController;

const OVERLAP_TOLERANCE: f32 = 1e-4;

/// The panel being dragged
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragState {
    pub id: PanelId,
    /// Latest hand pose
    pub hand: Pose,
    pub started_fixed: bool,
    pub started_angle: f32,
}

#[derive(Debug, Clone)]
pub struct LayoutEngine {
    pub config: LayoutConfig,
    /// Indexed by `PanelId`
    pub panels: Vec<Panel>,
    pub panes: PaneSet,
    pub rotation: RadialOriginController,
    pub docking: DockingResolver,
    pub solver: DepenetrationSolver,
    pub modes: ModeMachine,
    pub reveal: RevealSpin,
    pub indicator: PaneIndicator,
    pub drag: Option<DragState>,
    /// Body that pushes others but is never pushed, until the next prime
    pub immovable: Option<PanelId>,
    /// Floating panels are being separated
    pub collision_active: bool,
    /// Advanced panel set is active
    pub advanced: bool,
    /// Advanced set has been shown at least once
    pub advanced_visited: bool,
    /// Layout differs from the panel map defaults
    pub customized: bool,
    pub sweet_spot: SweetSpot,
    pub wand: Pose,
    pub head: Vec3,
    pub gaze: Vec3,
}

impl LayoutEngine {
    /// Engine over the built-in panel map with no saved layout
    pub fn new(config: LayoutConfig, advanced: bool) -> Self {
        Self::with_panel_map(config, &default_panel_map(), advanced, &[])
    }

    /// Engine over the built-in panel map, restoring saved records
    pub fn with_records(config: LayoutConfig, advanced: bool, records: &[LayoutRecord]) -> Self {
        Self::with_panel_map(config, &default_panel_map(), advanced, records)
    }

    pub fn with_panel_map(
        config: LayoutConfig,
        map: &[PanelSpec],
        advanced: bool,
        records: &[LayoutRecord],
    ) -> Self {
        let mut panels = Vec::new();
        for spec in map {
            let sets: &[bool] = if spec.kind.is_unique() {
                &[false]
            } else {
                &[false, true]
            };
            for &set in sets {
                if spec.kind.is_unique() || spec.sets.includes(set) {
                    let id = PanelId(panels.len() as u32);
                    panels.push(Panel::from_spec(id, spec, set));
                }
            }
        }

        let mut engine = Self {
            rotation: RadialOriginController::new(config.rotation),
            solver: DepenetrationSolver::new(config.depenetration),
            modes: ModeMachine::new(config.transitions.mode_speed),
            sweet_spot: SweetSpot {
                center: Vec3::ZERO,
                radius: config.depenetration.sweet_spot_radius,
            },
            config,
            panels,
            panes: PaneSet::default(),
            docking: DockingResolver::default(),
            reveal: RevealSpin::default(),
            indicator: PaneIndicator::default(),
            drag: None,
            immovable: None,
            collision_active: false,
            advanced,
            advanced_visited: advanced,
            customized: false,
            wand: Pose::IDENTITY,
            head: Vec3::ZERO,
            gaze: Vec3::ZERO,
        };

        for record in records {
            engine.apply_record(record);
        }

        for panel in &mut engine.panels {
            if panel.kind.is_admin() {
                panel.visible = true;
            } else if !panel.is_unique() {
                let shown = panel.restore || panel.fixed || panel.kind.is_core();
                if panel.available(advanced) {
                    panel.visible = shown;
                    panel.restore = false;
                } else {
                    panel.restore = shown;
                }
            }
        }

        engine.close_pane_gaps();
        engine.prime_collision(None);
        engine.refresh_customized();
        tracing::info!(
            panels = engine.panels.len(),
            records = records.len(),
            advanced,
            "layout engine ready"
        );
        engine
    }

    /// Re-dock or float the advanced panel named by `record`
    fn apply_record(&mut self, record: &LayoutRecord) {
        let Some(panel) = self
            .panels
            .iter_mut()
            .find(|p| p.advanced && p.kind == record.kind)
        else {
            tracing::warn!(
                kind = %record.kind,
                "layout record for a panel not in the advanced set"
            );
            return;
        };

        if record.fixed {
            let dockable = PaneSet::index_for_angle(record.attach_angle).is_some();
            if !panel.capabilities.can_fix || !dockable {
                tracing::warn!(
                    kind = %record.kind,
                    angle = record.attach_angle,
                    "cannot dock panel from layout record"
                );
                return;
            }
            panel.attach_angle = normalize_angle(record.attach_angle);
            panel.offset.set_all(record.y_offset);
            panel.make_fixed();
        } else {
            if !panel.capabilities.can_detach {
                tracing::warn!(kind = %record.kind, "locked panel saved as floating");
                return;
            }
            panel.make_floating();
            panel.pose = Pose::new(record.position, record.rotation);
            panel.body.set_pose(panel.pose);
            panel.restore = true;
        }
    }

    pub fn panel(&self, id: PanelId) -> Option<&Panel> {
        self.panels.get(id.index())
    }

    pub fn panel_mut(&mut self, id: PanelId) -> Option<&mut Panel> {
        self.panels.get_mut(id.index())
    }

    /// The panel of `kind` in the active set
    pub fn find_kind(&self, kind: PanelKind) -> Option<PanelId> {
        self.panels
            .iter()
            .find(|p| p.kind == kind && p.available(self.advanced))
            .map(|p| p.id)
    }

    pub fn held(&self) -> Option<PanelId> {
        self.drag.map(|d| d.id)
    }

    /// Origin plus every transient rotation
    pub fn ring_angle(&self) -> f32 {
        self.rotation.origin() + self.rotation.offset() + self.reveal.angle()
    }

    pub fn ring_view(&self) -> RingView {
        RingView {
            wand: self.wand,
            origin: self.rotation.origin() + self.reveal.angle(),
            offset: self.rotation.offset(),
            gaze: self.gaze,
        }
    }

    /// Rebuild pane stacks from docked, visible panels of the active set
    ///
    /// A held panel is left out.
    pub fn rebuild_panes(&mut self) {
        let advanced = self.advanced;
        let held = self.held();
        self.panes.rebuild(&self.panels, |p| {
            p.in_pane(advanced) && p.visible && Some(p.id) != held
        });
    }

    pub fn close_pane_gaps(&mut self) -> [GapReport; 3] {
        self.rebuild_panes();
        let bounds = self.config.pane_bounds();
        gaps::close_all(&self.panes, &mut self.panels, bounds)
    }

    /// Persist the layout, only tracked for the advanced set
    pub fn save_layout_cmd(&self) -> Option<Cmd> {
        self.advanced
            .then(|| Cmd::SaveLayout(layout_store::snapshot(&self.panels)))
    }

    /// Anchor every floating panel where it is and restart separation
    pub fn prime_collision(&mut self, immovable: Option<PanelId>) {
        for panel in &mut self.panels {
            if !panel.fixed {
                panel.body.set_pose(panel.pose);
            }
            panel.body.prime();
        }
        self.immovable = immovable;
        self.collision_active = true;
    }

    /// Recompute whether the layout differs from the panel map
    pub fn refresh_customized(&mut self) {
        self.customized = self.panels.iter().filter(|p| !p.is_unique()).any(|p| {
            if p.begin_fixed {
                !p.fixed || !p.in_initial_position()
            } else {
                p.visible
            }
        });
    }

    /// Hide a panel, remembering whether it was shown
    pub(crate) fn hide_panel(&mut self, id: PanelId) {
        let panel = &mut self.panels[id.index()];
        panel.restore = panel.visible;
        panel.visible = false;
        panel.primed = false;
        panel.radius_adjust = 0.0;
        if self.drag.is_some_and(|d| d.id == id) {
            self.drag = None;
            self.docking = DockingResolver::default();
            self.indicator.target(None);
        }
    }

    pub(crate) fn restore_panel(&mut self, id: PanelId) {
        let panel = &mut self.panels[id.index()];
        panel.visible = true;
        panel.restore = false;
    }

    /// Abort the active drag, putting everything back where it was
    ///
    /// Returns false when nothing was held.
    pub fn cancel_drag(&mut self) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };

        for panel in &mut self.panels {
            if panel.fixed && !panel.kind.is_admin() {
                panel.offset.target = panel.offset.stable;
            }
            panel.primed = false;
        }

        let panel = &mut self.panels[drag.id.index()];
        panel.radius_adjust = 0.0;
        if drag.started_fixed {
            panel.attach_angle = drag.started_angle;
            panel.offset.target = panel.offset.stable;
            panel.offset.current = panel.offset.stable;
            panel.fixed = true;
            panel.transition.set_target(drag.hand);
            panel.transition.to_wand(true, drag.hand);
        }

        self.docking = DockingResolver::default();
        self.indicator.target(None);
        self.close_pane_gaps();
        tracing::debug!(panel = ?drag.id, "drag cancelled");
        true
    }

    /// Describe every broken layout invariant
    ///
    /// Only meaningful between drags, once gaps have been closed.
    pub fn check_invariants(&self) -> Vec<String> {
        let mut problems = Vec::new();

        let origin = self.rotation.origin();
        if !(0.0..360.0).contains(&origin) {
            problems.push(format!("origin {origin} outside [0, 360)"));
        }
        for panel in &self.panels {
            if !(0.0..360.0).contains(&panel.attach_angle) {
                problems.push(format!(
                    "{} attach angle {} outside [0, 360)",
                    panel.kind, panel.attach_angle
                ));
            }
        }

        if self.drag.is_some() {
            return problems;
        }

        let advanced = self.advanced;
        let bounds = self.config.pane_bounds();
        let mut panes = PaneSet::default();
        panes.rebuild(&self.panels, |p| p.in_pane(advanced) && p.visible);

        for (index, pane) in panes.iter().enumerate() {
            let stack = pane.stack(&self.panels);
            let height: f32 = stack.iter().map(|s| s.half * 2.0).sum();
            if height > bounds.span() + OVERLAP_TOLERANCE {
                continue;
            }
            for pair in stack.windows(2) {
                let (upper, lower) = (&pair[0], &pair[1]);
                if upper.stable - upper.half < lower.stable + lower.half - OVERLAP_TOLERANCE {
                    problems.push(format!("pane {index}: {:?} overlaps {:?}", upper.id, lower.id));
                }
            }
            for slot in &stack {
                if slot.stable + slot.half > bounds.max + OVERLAP_TOLERANCE
                    || slot.stable - slot.half < bounds.min - OVERLAP_TOLERANCE
                {
                    problems.push(format!("pane {index}: {:?} outside bounds", slot.id));
                }
            }
        }
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_visible(engine: &LayoutEngine) -> Vec<PanelKind> {
        engine
            .panels
            .iter()
            .filter(|p| p.visible && !p.is_unique())
            .map(|p| p.kind)
            .collect()
    }

    #[test]
    fn test_panel_map_instantiation() {
        let engine = LayoutEngine::new(LayoutConfig::default(), false);
        let admins = engine.panels.iter().filter(|p| p.kind.is_admin()).count();
        assert_eq!(admins, 1);
        // Color exists once per set
        let colors = engine
            .panels
            .iter()
            .filter(|p| p.kind == PanelKind::Color)
            .count();
        assert_eq!(colors, 2);
        for (i, panel) in engine.panels.iter().enumerate() {
            assert_eq!(panel.id.index(), i);
        }
    }

    #[test]
    fn test_basic_set_visible_at_start() {
        let engine = LayoutEngine::new(LayoutConfig::default(), false);
        assert_eq!(
            kinds_visible(&engine),
            vec![PanelKind::ToolsBasic, PanelKind::Color, PanelKind::Brush]
        );
        assert!(!engine.customized);
        assert!(engine.check_invariants().is_empty());
    }

    #[test]
    fn test_records_restore_advanced_layout() {
        let records = vec![
            LayoutRecord {
                kind: PanelKind::Labs,
                fixed: true,
                y_offset: 0.4,
                attach_angle: 120.0,
                position: Vec3::ZERO,
                rotation: glam::Quat::IDENTITY,
            },
            LayoutRecord {
                kind: PanelKind::Lights,
                fixed: false,
                y_offset: 0.0,
                attach_angle: 0.0,
                position: Vec3::new(1.0, 1.0, 1.0),
                rotation: glam::Quat::IDENTITY,
            },
        ];
        let engine = LayoutEngine::with_records(LayoutConfig::default(), true, &records);

        let labs = &engine.panels[engine.find_kind(PanelKind::Labs).unwrap().index()];
        assert!(labs.fixed);
        assert_eq!(labs.attach_angle, 120.0);
        assert_eq!(labs.offset.stable, 0.4);

        let lights = &engine.panels[engine.find_kind(PanelKind::Lights).unwrap().index()];
        assert!(!lights.fixed);
        assert!(lights.visible);
        assert_eq!(lights.pose.position, Vec3::new(1.0, 1.0, 1.0));

        assert!(engine.customized);
        assert!(engine.check_invariants().is_empty());
    }

    #[test]
    fn test_record_for_bad_angle_ignored() {
        let records = vec![LayoutRecord {
            kind: PanelKind::Labs,
            fixed: true,
            y_offset: 0.0,
            attach_angle: 45.0,
            position: Vec3::ZERO,
            rotation: glam::Quat::IDENTITY,
        }];
        let engine = LayoutEngine::with_records(LayoutConfig::default(), true, &records);
        let labs = &engine.panels[engine.find_kind(PanelKind::Labs).unwrap().index()];
        assert_eq!(labs.attach_angle, 240.0);
        assert!(!engine.customized);
    }

    #[test]
    fn test_cancel_without_drag() {
        let mut engine = LayoutEngine::new(LayoutConfig::default(), true);
        assert!(!engine.cancel_drag());
    }
}
