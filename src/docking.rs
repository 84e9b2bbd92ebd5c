//! Docking resolution for a held panel
//!
//! Every frame a panel is dragged, the resolver finds the nearest pane facing
//! the viewer, picks a quantized vertical slot on it, and reflows the pane's
//! stack to check whether the panel would fit there. The outcome only touches
//! `target` offsets; `stable` offsets are committed later, when the drag ends.

use glam::Vec3;

use crate::commands::{AudioCue, Cmd, Controller};
use crate::config::{FeedbackConfig, PaneConfig};
use crate::geometry::{angle_between, project_on_plane, ring_rotation, sign, Pose};
use crate::panel::{Bounds, Pane, PaneSet, Panel, PanelId, StackSlot, PANE_ANGLES};

const EPSILON: f32 = 1e-5;

#[inline]
fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// Where the ring is and who is looking at it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingView {
    pub wand: Pose,
    /// Committed origin angle
    pub origin: f32,
    /// Transient preview offset
    pub offset: f32,
    /// World-space gaze direction
    pub gaze: Vec3,
}

impl RingView {
    /// Ring-local direction from the wand axis to the pane at `pane_angle`
    pub fn pane_direction(&self, pane_angle: f32) -> Vec3 {
        ring_rotation(self.origin + self.offset + pane_angle) * Vec3::Y
    }

    /// Whether the pane at `pane_angle` faces the viewer closely enough
    pub fn pane_faces_viewer(&self, pane_angle: f32, max_angle: f32) -> bool {
        let facing = self.wand.rotation * self.pane_direction(pane_angle);
        angle_between(-facing, self.gaze) <= max_angle
    }
}

/// A pane the held panel can dock into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaneHit {
    pub pane: usize,
    /// Candidate centre offset, clamped into the pane
    pub offset: f32,
    pub distance: f32,
}

/// Project a wand-local point onto the pane at `pane_angle`
///
/// Returns the vertical offset, the lateral deviation and the ring-local
/// direction of the pane.
fn project_onto_pane(
    local: Vec3,
    view: &RingView,
    pane_angle: f32,
    radius: f32,
) -> (f32, f32, Vec3) {
    let dir = view.pane_direction(pane_angle);
    let center = dir * radius;
    let projected = project_on_plane(local - center, dir);
    let tangent = Vec3::Z.cross(dir);
    (projected.z, projected.dot(tangent), dir)
}

/// Find the pane a held panel should dock into
///
/// `local` is the panel position in wand space. `sticky` widens every
/// acceptance threshold when the panel was attached last frame.
pub fn find_pane(
    local: Vec3,
    panel: &Panel,
    sticky: bool,
    view: &RingView,
    config: &PaneConfig,
) -> Option<PaneHit> {
    let bounds = Bounds::new(config.min_y, config.max_y);
    let half = panel.half_height;

    if !panel.capabilities.can_detach {
        let pane = PaneSet::index_for_angle(panel.attach_angle)?;
        let (vertical, _, dir) =
            project_onto_pane(local, view, PANE_ANGLES[pane], config.wand_radius);
        let offset = bounds.clamp_center(vertical, half);
        let snapped = dir * config.wand_radius + Vec3::Z * offset;
        return Some(PaneHit {
            pane,
            offset,
            distance: local.distance(snapped),
        });
    }

    let grow = if sticky { 1.0 + config.sticky_percent } else { 1.0 };
    let snap_distance = config.snap_distance * grow;
    let half_width = config.half_width * grow;
    let vertical_margin = half * grow;

    let mut best: Option<PaneHit> = None;
    for (pane, &angle) in PANE_ANGLES.iter().enumerate() {
        if !view.pane_faces_viewer(angle, config.max_facing_angle) {
            continue;
        }

        let (vertical, lateral, dir) = project_onto_pane(local, view, angle, config.wand_radius);
        if vertical <= bounds.min - vertical_margin || vertical >= bounds.max + vertical_margin {
            continue;
        }
        if lateral.abs() >= half_width {
            continue;
        }

        let offset = bounds.clamp_center(vertical, half);
        let snapped = dir * config.wand_radius + dir.cross(Vec3::Z) * -lateral + Vec3::Z * offset;
        let distance = local.distance(snapped);
        let nearest = best.map_or(snap_distance, |b| b.distance);
        if distance < nearest {
            best = Some(PaneHit {
                pane,
                offset,
                distance,
            });
        }
    }
    best
}

/// Quantize a candidate offset to the snap step
///
/// Offsets within the sticky dead zone of `previous` keep `previous`. Returns
/// the quantized offset and its step index (None when quantization is off).
pub fn quantize(raw: f32, previous: f32, step: f32, sticky_percent: f32) -> (f32, Option<i32>) {
    if step <= 0.0 {
        return (raw, None);
    }

    let dead_zone = sticky_percent * step;
    let diff = raw - previous;
    let adjusted = if diff.abs() < dead_zone {
        previous
    } else {
        raw - dead_zone * sign(diff)
    };

    let steps = (adjusted / step).round() as i32;
    (steps as f32 * step, Some(steps))
}

/// Result of fitting a panel into a pane stack
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reflow {
    /// Where the inserted panel ends up after spillover handoff
    pub offset: f32,
    pub room_available: bool,
    pub insert_index: usize,
}

fn reset_targets(stack: &mut [StackSlot]) {
    for slot in stack {
        slot.target = slot.stable;
    }
}

/// First slot (in descending order) the inserted panel goes above
fn insert_index(stack: &[StackSlot], offset: f32, half: f32, bounds: Bounds) -> (usize, bool) {
    let panel_bottom = offset - half;
    let mut pure_overlap = false;

    for (i, slot) in stack.iter().enumerate() {
        // Dropped exactly onto another panel
        pure_overlap = pure_overlap || approx_eq(offset, slot.stable);

        // Both pinned to the bottom bound: treat the new panel as higher
        let pinned_low =
            approx_eq(slot.bottom(), bounds.min) && approx_eq(panel_bottom, bounds.min);

        if !pinned_low && offset > slot.stable {
            return (i, pure_overlap);
        }
    }
    (stack.len(), pure_overlap)
}

/// Push panels above `insert` up until nothing overlaps
///
/// Returns how far the topmost panel had to be pulled back under the top
/// bound (0 when everything fit).
fn move_up(stack: &mut [StackSlot], half: f32, offset: f32, insert: usize, top: f32) -> f32 {
    let mut pusher = offset;
    let mut pusher_half = half;

    for i in (0..insert).rev() {
        let needed = pusher + pusher_half + stack[i].half;
        if needed <= stack[i].stable {
            break;
        }
        stack[i].target = needed;

        if i == 0 && stack[i].top() > top {
            let spill = stack[i].top() - top;
            stack[i].target = top - stack[i].half;
            for slot in &mut stack[1..insert] {
                slot.target -= spill;
            }
            return spill;
        }

        pusher = stack[i].target;
        pusher_half = stack[i].half;
    }
    0.0
}

/// Push panels at and below `insert` down until nothing overlaps
fn move_down(stack: &mut [StackSlot], half: f32, offset: f32, insert: usize, bottom: f32) -> f32 {
    let last = stack.len().saturating_sub(1);
    let mut pusher = offset;
    let mut pusher_half = half;

    for i in insert..stack.len() {
        let needed = pusher - pusher_half - stack[i].half;
        if needed >= stack[i].stable {
            break;
        }
        stack[i].target = needed;

        if i == last && stack[i].bottom() < bottom {
            let spill = bottom - stack[i].bottom();
            stack[i].target = bottom + stack[i].half;
            for slot in &mut stack[insert..i] {
                slot.target += spill;
            }
            return spill;
        }

        pusher = stack[i].target;
        pusher_half = stack[i].half;
    }
    0.0
}

/// Fit a panel of half-height `half` into `stack` at `requested`
///
/// Targets of the stack are rewritten from their stable offsets. Spillover
/// past one bound is handed to the other direction by moving the inserted
/// slot; room is unavailable only when both directions spill.
pub fn reflow(stack: &mut [StackSlot], half: f32, requested: f32, bounds: Bounds) -> Reflow {
    reset_targets(stack);

    let (mut insert, pure_overlap) = insert_index(stack, requested, half, bounds);
    let mut offset = requested;
    let mut room_available = true;

    let mut up_spill = move_up(stack, half, offset, insert, bounds.max);
    if pure_overlap && up_spill > 0.0 && insert > 0 {
        // Ambiguous overlap: push the overlapped panel down instead
        reset_targets(&mut stack[..insert]);
        insert -= 1;
        up_spill = move_up(stack, half, offset, insert, bounds.max);
    }
    offset -= up_spill;

    let down_spill = move_down(stack, half, offset, insert, bounds.min);
    if down_spill > 0.0 {
        if up_spill > 0.0 {
            room_available = false;
        } else {
            offset += down_spill;
            reset_targets(&mut stack[..insert]);
            if move_up(stack, half, offset, insert, bounds.max) > 0.0 {
                room_available = false;
            }
        }
    }

    if offset - half < bounds.min - EPSILON || offset + half > bounds.max + EPSILON {
        room_available = false;
    }

    Reflow {
        offset,
        room_available,
        insert_index: insert,
    }
}

/// Outcome of one frame of docking resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DockOutcome {
    /// Pane the held panel is hovering over
    pub pane: Option<usize>,
    pub room_available: bool,
    /// Panel left its pane this frame
    pub detached: bool,
}

/// Shared inputs for a resolve pass
pub struct DockingContext<'a> {
    pub view: RingView,
    pub panes: &'a PaneSet,
    pub config: &'a PaneConfig,
    pub feedback: &'a FeedbackConfig,
}

/// Per-drag docking state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DockingResolver {
    was_attached: bool,
    previous_step: Option<i32>,
}

impl DockingResolver {
    /// Start a new drag
    pub fn begin(&mut self, started_fixed: bool) {
        self.previous_step = None;
        self.was_attached = started_fixed;
    }

    pub fn was_attached(&self) -> bool {
        self.was_attached
    }

    /// Resolve where the held panel docks this frame
    pub fn resolve(
        &mut self,
        panels: &mut [Panel],
        held: PanelId,
        hand: Pose,
        ctx: &DockingContext<'_>,
        cmds: &mut Vec<Cmd>,
    ) -> DockOutcome {
        // Discard last frame's speculative reflow
        for panel in panels.iter_mut().filter(|p| p.fixed && !p.kind.is_admin()) {
            panel.offset.target = panel.offset.stable;
        }

        let config = ctx.config;
        let bounds = Bounds::new(config.min_y, config.max_y);
        let local = ctx.view.wand.inverse_transform_point(hand.position);
        let hit = find_pane(local, &panels[held.index()], self.was_attached, &ctx.view, config);

        let mut outcome = DockOutcome {
            pane: None,
            room_available: false,
            detached: false,
        };

        match hit {
            Some(hit) => {
                let (half, previous) = {
                    let panel = &panels[held.index()];
                    (panel.half_height, panel.offset.current)
                };

                let (quantized, step) =
                    quantize(hit.offset, previous, config.snap_step, config.sticky_percent);
                let offset = bounds.clamp_center(quantized, half);

                if let Some(step) = step {
                    if self.was_attached && self.previous_step.is_some_and(|s| s != step) {
                        cmds.push(Cmd::audio(AudioCue::PaneMove, hand.position));
                        cmds.push(Cmd::delayed_haptic(
                            Controller::Wand,
                            ctx.feedback.pane_move_haptic,
                            ctx.feedback.pane_haptic_delay,
                        ));
                    }
                    self.previous_step = Some(step);
                }

                let pane = ctx.panes.pane(hit.pane);
                let mut stack = pane.stack(panels);
                let fit = reflow(&mut stack, half, offset, bounds);
                Pane::apply_stack(&stack, panels);

                let panel = &mut panels[held.index()];
                panel.attach_angle = pane.angle;
                panel.offset.current = offset;
                panel.offset.target = fit.offset;
                panel.radius_adjust = config.radius_manipulation_adjust;
                panel.primed = fit.room_available;

                outcome.pane = Some(hit.pane);
                outcome.room_available = fit.room_available;
            }
            None => {
                let panel = &mut panels[held.index()];
                panel.primed = false;
                panel.radius_adjust = 0.0;
            }
        }

        let attached = outcome.pane.is_some();
        if attached != self.was_attached {
            tracing::debug!(panel = ?held, attached, "pane attachment changed");
            cmds.push(Cmd::audio(AudioCue::PaneAttach, hand.position));
            cmds.push(Cmd::delayed_haptic(
                Controller::Wand,
                ctx.feedback.pane_move_haptic,
                ctx.feedback.pane_haptic_delay,
            ));
            cmds.push(Cmd::haptic(Controller::Brush, ctx.feedback.attach_haptic));
        }
        outcome.detached = self.was_attached && !attached;
        self.was_attached = attached;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::{PanelKind, PanelSets, PanelSpec};

    fn bounds() -> Bounds {
        Bounds::new(-0.6, 0.6)
    }

    fn slot(id: u32, stable: f32, half: f32) -> StackSlot {
        StackSlot {
            id: PanelId(id),
            stable,
            target: stable,
            half,
        }
    }

    fn assert_no_overlap(stack: &[StackSlot], inserted: f32, half: f32) {
        let mut intervals: Vec<(f32, f32)> = stack.iter().map(|s| (s.bottom(), s.top())).collect();
        intervals.push((inserted - half, inserted + half));
        intervals.sort_by(|a, b| a.0.total_cmp(&b.0));
        for pair in intervals.windows(2) {
            assert!(pair[0].1 <= pair[1].0 + 1e-4, "overlap: {:?}", pair);
        }
    }

    fn looking_down() -> RingView {
        RingView {
            wand: Pose::IDENTITY,
            origin: 0.0,
            offset: 0.0,
            gaze: -Vec3::Y,
        }
    }

    fn dockable(half: f32) -> Panel {
        let spec = PanelSpec::new(PanelKind::Lights, PanelSets::Advanced).half_height(half);
        Panel::from_spec(PanelId(0), &spec, true)
    }

    #[test]
    fn test_reflow_into_empty_pane() {
        let mut stack: Vec<StackSlot> = vec![];
        let fit = reflow(&mut stack, 0.1, 0.2, bounds());
        assert!(fit.room_available);
        assert_eq!(fit.offset, 0.2);
    }

    #[test]
    fn test_reflow_three_panel_example() {
        // First panel docks at 0.5
        let mut stack = vec![];
        let first = reflow(&mut stack, 0.1, 0.5, bounds());
        assert!(first.room_available);

        // Second requests 0.45: the top panel can't move up, so the new slot
        // slides down by the spill
        let mut stack = vec![slot(0, first.offset, 0.1)];
        let second = reflow(&mut stack, 0.1, 0.45, bounds());
        assert!(second.room_available);
        assert!((stack[0].target - 0.5).abs() < 1e-5);
        assert!((second.offset - 0.3).abs() < 1e-5);
        assert_no_overlap(&stack, second.offset, 0.1);

        let mut stack = vec![slot(0, 0.5, 0.1), slot(1, second.offset, 0.1)];
        let third = reflow(&mut stack, 0.1, 0.0, bounds());
        assert!(third.room_available);
        assert_eq!(third.offset, 0.0);
        assert_eq!(third.insert_index, 2);
        assert_no_overlap(&stack, third.offset, 0.1);
    }

    #[test]
    fn test_reflow_pushes_neighbours_both_ways() {
        let mut stack = vec![slot(0, 0.2, 0.1), slot(1, -0.1, 0.1)];
        let fit = reflow(&mut stack, 0.1, 0.05, bounds());
        assert!(fit.room_available);
        assert_eq!(fit.insert_index, 1);
        assert!((stack[0].target - 0.25).abs() < 1e-5);
        assert!((stack[1].target - -0.15).abs() < 1e-5);
        assert_no_overlap(&stack, fit.offset, 0.1);
    }

    #[test]
    fn test_reflow_bottom_spill_moves_slot_up() {
        let mut stack = vec![slot(0, 0.3, 0.1), slot(1, -0.5, 0.1)];
        let fit = reflow(&mut stack, 0.1, -0.45, bounds());
        assert!(fit.room_available);
        assert!((stack[1].target - -0.5).abs() < 1e-5);
        assert!((fit.offset - -0.3).abs() < 1e-5);
        assert_no_overlap(&stack, fit.offset, 0.1);
    }

    #[test]
    fn test_reflow_pure_overlap_prefers_up() {
        let mut stack = vec![slot(0, 0.0, 0.1)];
        let fit = reflow(&mut stack, 0.1, 0.0, bounds());
        assert!(fit.room_available);
        assert_eq!(fit.insert_index, 1);
        assert!((stack[0].target - 0.2).abs() < 1e-5);
    }

    #[test]
    fn test_reflow_pure_overlap_at_top_pushes_down() {
        let mut stack = vec![slot(0, 0.5, 0.1)];
        let fit = reflow(&mut stack, 0.1, 0.5, bounds());
        assert!(fit.room_available);
        assert_eq!(fit.insert_index, 0);
        assert!((stack[0].target - 0.3).abs() < 1e-5);
        assert!((fit.offset - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_reflow_full_pane_has_no_room() {
        let mut stack = vec![
            slot(0, 0.45, 0.15),
            slot(1, 0.15, 0.15),
            slot(2, -0.15, 0.15),
            slot(3, -0.45, 0.15),
        ];
        let fit = reflow(&mut stack, 0.1, 0.0, bounds());
        assert!(!fit.room_available);
    }

    #[test]
    fn test_quantize_dead_zone() {
        // Inside the dead zone the previous offset is kept
        let (offset, step) = quantize(0.105, 0.1, 0.05, 0.25);
        assert!((offset - 0.1).abs() < 1e-6);
        assert_eq!(step, Some(2));

        // Outside, the dead zone is subtracted before rounding
        let (offset, step) = quantize(0.137, 0.1, 0.05, 0.25);
        assert!((offset - 0.1).abs() < 1e-6);
        assert_eq!(step, Some(2));

        let (offset, _) = quantize(0.14, 0.1, 0.05, 0.25);
        assert!((offset - 0.15).abs() < 1e-6);

        assert_eq!(quantize(0.123, 0.0, 0.0, 0.25), (0.123, None));
    }

    #[test]
    fn test_find_pane_facing_viewer() {
        let panel = dockable(0.1);
        let hit = find_pane(
            Vec3::new(0.0, 0.3, 0.1),
            &panel,
            false,
            &looking_down(),
            &PaneConfig::default(),
        )
        .unwrap();
        assert_eq!(hit.pane, 0);
        assert!((hit.offset - 0.1).abs() < 1e-5);
        assert!((hit.distance - 0.05).abs() < 1e-5);
    }

    #[test]
    fn test_find_pane_rejects_away_facing_and_far() {
        let panel = dockable(0.1);
        let config = PaneConfig::default();
        let view = RingView {
            gaze: Vec3::Y,
            ..looking_down()
        };
        assert!(find_pane(Vec3::new(0.0, 0.3, 0.1), &panel, false, &view, &config).is_none());

        // Too far to the side
        let wide = Vec3::new(0.25, 0.3, 0.1);
        assert!(find_pane(wide, &panel, false, &looking_down(), &config).is_none());

        // Too far out
        let far = Vec3::new(0.0, 0.6, 0.0);
        assert!(find_pane(far, &panel, false, &looking_down(), &config).is_none());
    }

    #[test]
    fn test_find_pane_sticky_widens_snap_radius() {
        let panel = dockable(0.1);
        let config = PaneConfig::default();
        // 0.33 past the pane: outside 0.3, inside 0.375
        let point = Vec3::new(0.0, 0.58, 0.0);
        assert!(find_pane(point, &panel, false, &looking_down(), &config).is_none());
        assert!(find_pane(point, &panel, true, &looking_down(), &config).is_some());
    }

    #[test]
    fn test_locked_panel_resolves_to_own_pane() {
        let spec = PanelSpec::new(PanelKind::Color, PanelSets::Basic)
            .fixed_at(120.0, 0.0)
            .half_height(0.3)
            .capabilities(crate::panel::Capabilities::LOCKED);
        let panel = Panel::from_spec(PanelId(0), &spec, false);
        // Far away and facing the wrong way still resolves
        let hit = find_pane(
            Vec3::new(2.0, 2.0, 0.9),
            &panel,
            false,
            &looking_down(),
            &PaneConfig::default(),
        )
        .unwrap();
        assert_eq!(hit.pane, 1);
        assert!((hit.offset - 0.3).abs() < 1e-5);
    }
}
