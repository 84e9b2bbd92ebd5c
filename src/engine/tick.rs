//! Frame step
//!
//! Order matters: modes and the reveal spin settle first so the ring angle
//! used below is final, rotation runs before docking so the held panel is
//! resolved against this frame's panes, and transforms are written last.

use glam::{EulerRot, Quat};

use super::{FrameInput, FrameOutput, LayoutEngine, PanelTransform};
use crate::commands::Cmd;
use crate::depenetration::{DepenetrationBody, DepenetrationSolver};
use crate::docking::DockingContext;
use crate::geometry::{panel_adjust, ring_pose};
use crate::mode::Mode;
use crate::rotation::RotationInput;
use crate::transition::settle_offset;

impl LayoutEngine {
    /// Advance every animation and simulation by `dt` seconds
    pub fn tick(&mut self, dt: f32, input: &FrameInput) -> FrameOutput {
        self.wand = input.wand;
        self.head = input.head;
        self.gaze = input.gaze;

        let mut commands = Vec::new();
        self.tick_modes(dt);
        self.tick_rotation(dt, input, &mut commands);
        self.tick_docking(&mut commands);
        self.tick_panels(dt);
        self.step_depenetration(dt);

        let transforms = self.write_transforms();
        let indicator =
            self.indicator
                .output(&self.wand, self.ring_angle(), self.config.panes.indicator_radius);

        FrameOutput {
            transforms,
            indicator,
            commands,
        }
    }

    fn tick_modes(&mut self, dt: f32) {
        self.modes.tick(dt);
        if let Some(origin) = self.reveal.tick(dt, self.config.rotation.reveal_spin_speed) {
            self.rotation.set_origin(origin);
            tracing::debug!(origin = self.rotation.origin(), "reveal spin finished");
        }
        self.indicator
            .tick(dt, self.config.panes.indicator_show_speed);
    }

    fn tick_rotation(&mut self, dt: f32, input: &FrameInput, commands: &mut Vec<Cmd>) {
        if self.reveal.is_active() {
            return;
        }

        let rotate_held =
            self.modes
                .filter_rotate(input.rotate_held, input.scroll_delta, input.analog_is_stick);

        let threshold = self.config.transitions.alt_swipe_threshold;
        if let Some(mode) = self
            .modes
            .track_swipe_exit(rotate_held, input.scroll_delta, threshold)
        {
            let alt_angle = self.modes.alt_angle();
            if self.modes.toggle(mode, alt_angle).is_ok() {
                tracing::debug!(?mode, "left mode by swiping");
            }
        }

        let rotation_input = RotationInput {
            scroll_delta: input.scroll_delta,
            rotate_held,
            analog_is_stick: input.analog_is_stick,
            gate_open: self.modes.panels_visible() && self.modes.is_standard(),
            position: input.wand.position,
        };
        commands.extend(self.rotation.update(&rotation_input, dt));
        commands.extend(self.rotation.spin(dt, input.analog_is_stick));
    }

    fn tick_docking(&mut self, commands: &mut Vec<Cmd>) {
        let Some(drag) = self.drag else {
            return;
        };
        if !self.panels[drag.id.index()].capabilities.can_fix || !self.modes.is_standard() {
            self.indicator.target(None);
            return;
        }

        let ctx = DockingContext {
            view: self.ring_view(),
            panes: &self.panes,
            config: &self.config.panes,
            feedback: &self.config.feedback,
        };
        let outcome = self
            .docking
            .resolve(&mut self.panels, drag.id, drag.hand, &ctx, commands);

        if outcome.detached {
            self.close_pane_gaps();
        }

        let target = self.panels[drag.id.index()].offset.target;
        self.indicator
            .target(outcome.pane.map(|pane| (pane, target, outcome.room_available)));
    }

    fn tick_panels(&mut self, dt: f32) {
        let duration = self.config.transitions.duration;
        let speed = self.config.transitions.attach_adjust_speed;
        let held = self.held();

        for panel in &mut self.panels {
            if panel.transition.advance(dt, duration) {
                tracing::debug!(
                    panel = ?panel.id,
                    state = ?panel.transition.state(),
                    "panel transition finished"
                );
                if !panel.transition.is_fixed() {
                    panel.pose = panel.transition.target();
                    panel.body.set_pose(panel.pose);
                    panel.body.prime();
                }
            }

            if panel.transition.is_fixed() && Some(panel.id) != held {
                panel.offset.current =
                    settle_offset(panel.offset.current, panel.offset.target, speed, dt);
                panel.radius_adjust = 0.0;
            }
        }

        if let Some(drag) = self.drag {
            let panel = &mut self.panels[drag.id.index()];
            panel.pose = drag.hand;
            panel.body.set_pose(drag.hand);
        }
    }

    /// Separate visible floating panels of the active set
    fn step_depenetration(&mut self, dt: f32) {
        if self.drag.is_none() && !self.collision_active {
            return;
        }

        let advanced = self.advanced;
        let members: Vec<usize> = self
            .panels
            .iter()
            .filter(|p| {
                !p.is_unique()
                    && p.available(advanced)
                    && p.visible
                    && !p.fixed
                    && !p.transition.is_animating()
            })
            .map(|p| p.id.index())
            .collect();

        let mut bodies: Vec<DepenetrationBody> = members
            .iter()
            .map(|&i| std::mem::take(&mut self.panels[i].body))
            .collect();

        let sweet_spot = self
            .config
            .depenetration
            .constrain_to_sweet_spot
            .then_some(self.sweet_spot);
        self.solver
            .step(&mut bodies, self.immovable, sweet_spot, dt);
        self.collision_active = DepenetrationSolver::is_settling(&bodies, self.immovable);

        let held = self.held();
        for (&i, body) in members.iter().zip(bodies) {
            let panel = &mut self.panels[i];
            if Some(panel.id) != held {
                panel.pose = body.pose();
            }
            panel.body = body;
        }
    }

    fn write_transforms(&mut self) -> Vec<PanelTransform> {
        let wand = self.wand;
        let ring = self.ring_angle();
        let panes = self.config.panes;
        let transitions = self.config.transitions;
        let held = self.held();
        let advanced = self.advanced;
        let modes = &self.modes;

        let standard = modes.scale(Mode::Standard);
        let tease = modes.tease_angle(transitions.alt_swipe_threshold, transitions.alt_swipe_tease);
        let [rx, ry, rz] = transitions.alt_rotation;
        let alt_adjust = Quat::from_euler(
            EulerRot::XYZ,
            rx.to_radians(),
            ry.to_radians(),
            rz.to_radians(),
        );

        self.panels
            .iter_mut()
            .map(|panel| {
                let (pose, scale, visible) = if panel.kind.is_admin() {
                    let pose = ring_pose(
                        &wand,
                        0.0,
                        panes.admin_radius,
                        panel.offset.current,
                        panel_adjust(),
                    );
                    (pose, standard, panel.visible && standard > 0.0)
                } else if let Some(mode) = panel.kind.alt_mode() {
                    let scale = modes.scale(mode);
                    let pose = ring_pose(
                        &wand,
                        modes.alt_angle() - tease,
                        transitions.alt_radius,
                        transitions.alt_height,
                        alt_adjust,
                    );
                    (pose, scale, scale > 0.0)
                } else if Some(panel.id) == held
                    || !(panel.transition.is_fixed() || panel.transition.is_animating())
                {
                    (panel.pose, 1.0, panel.visible)
                } else {
                    let slot = ring_pose(
                        &wand,
                        ring + panel.attach_angle,
                        panes.wand_radius + panel.radius_adjust,
                        panel.offset.current,
                        panel_adjust(),
                    );
                    let pose = panel.transition.blend(&slot);
                    (pose, standard, panel.visible && panel.available(advanced))
                };

                panel.pose = pose;
                PanelTransform {
                    id: panel.id,
                    kind: panel.kind,
                    position: pose.position,
                    rotation: pose.rotation,
                    scale,
                    visible,
                }
            })
            .collect()
    }
}
