//! Panel update handlers
//!
//! Opening, dismissing and restoring panels, layout reset, and explicit
//! moves onto or off the wand.

use crate::commands::{AudioCue, Cmd};
use crate::engine::LayoutEngine;
use crate::geometry::Pose;
use crate::messages::PanelMsg;
use crate::panel::{PanelId, PanelKind, PaneSet};

/// Update function for panel messages
pub fn update_panel(engine: &mut LayoutEngine, msg: PanelMsg) -> Option<Cmd> {
    match msg {
        PanelMsg::Open { kind, spawn } => open_panel(engine, kind, spawn),

        PanelMsg::Dismiss(kind) => dismiss_panel(engine, kind),

        PanelMsg::HideAll => {
            let shown: Vec<PanelId> = engine
                .panels
                .iter()
                .filter(|p| !p.is_unique() && p.visible)
                .map(|p| p.id)
                .collect();
            for id in shown {
                engine.hide_panel(id);
            }
            engine.close_pane_gaps();
            tracing::debug!("all panels hidden");
            None
        }

        PanelMsg::RestoreHidden => {
            let advanced = engine.advanced;
            let hidden: Vec<PanelId> = engine
                .panels
                .iter()
                .filter(|p| p.restore && p.available(advanced))
                .map(|p| p.id)
                .collect();
            for &id in &hidden {
                engine.restore_panel(id);
            }
            engine.close_pane_gaps();
            engine.prime_collision(None);
            tracing::debug!(count = hidden.len(), "hidden panels restored");
            None
        }

        PanelMsg::ResetLayout => {
            engine.cancel_drag();
            let advanced = engine.advanced;
            for panel in &mut engine.panels {
                if panel.is_unique() {
                    continue;
                }
                if panel.begin_fixed {
                    panel.reset_to_initial();
                    panel.visible = panel.available(advanced);
                    panel.restore = !panel.visible;
                } else {
                    panel.make_floating();
                    panel.visible = false;
                    panel.restore = false;
                }
            }
            engine.close_pane_gaps();
            engine.prime_collision(None);
            engine.customized = false;
            tracing::info!("panel layout reset");
            Some(Cmd::ClearLayout)
        }

        PanelMsg::TransitionToWand { id, fixed, target } => {
            transition_to_wand(engine, id, fixed, target)
        }

        PanelMsg::SetSweetSpot(center) => {
            let spot = engine.sweet_spot;
            for panel in engine.panels.iter_mut().filter(|p| !p.fixed && !p.is_unique()) {
                if let Some(pose) = spot.recenter(panel.pose.position, center) {
                    panel.pose = pose;
                    panel.body.set_pose(pose);
                }
            }
            engine.sweet_spot.center = center;
            engine.prime_collision(None);
            None
        }

        PanelMsg::ResetRotation => {
            engine.rotation.reset();
            None
        }
    }
}

fn open_panel(engine: &mut LayoutEngine, kind: PanelKind, spawn: Pose) -> Option<Cmd> {
    if !kind.is_spawnable() {
        tracing::warn!(%kind, "panel kind cannot be opened");
        return None;
    }
    let Some(id) = engine.find_kind(kind) else {
        tracing::warn!(%kind, "no panel of this kind in the active set");
        return None;
    };
    if !engine.panels[id.index()].capabilities.can_detach {
        tracing::warn!(%kind, "locked panel cannot be opened floating");
        return None;
    }
    if engine.held() == Some(id) {
        engine.cancel_drag();
    }

    let panel = &mut engine.panels[id.index()];
    if panel.fixed {
        panel.make_floating();
    }
    panel.visible = true;
    panel.restore = false;
    panel.primed = false;
    panel.radius_adjust = 0.0;
    panel.pose = spawn;

    engine.close_pane_gaps();
    engine.prime_collision(Some(id));
    engine.refresh_customized();
    tracing::info!(%kind, panel = ?id, "panel opened");
    engine.save_layout_cmd()
}

fn dismiss_panel(engine: &mut LayoutEngine, kind: PanelKind) -> Option<Cmd> {
    if kind.is_core() || kind.is_unique() {
        tracing::warn!(%kind, "core panels cannot be dismissed");
        return None;
    }
    let Some(id) = engine.find_kind(kind) else {
        tracing::warn!(%kind, "no panel of this kind in the active set");
        return None;
    };

    let position = engine.panels[id.index()].pose.position;
    engine.hide_panel(id);
    let panel = &mut engine.panels[id.index()];
    panel.make_floating();
    panel.restore = false;

    engine.close_pane_gaps();
    engine.refresh_customized();
    tracing::info!(%kind, panel = ?id, "panel dismissed");
    Some(Cmd::batch(
        std::iter::once(Cmd::audio(AudioCue::PanelDismiss, position))
            .chain(engine.save_layout_cmd())
            .collect(),
    ))
}

fn transition_to_wand(
    engine: &mut LayoutEngine,
    id: PanelId,
    fixed: bool,
    target: Pose,
) -> Option<Cmd> {
    let Some(panel) = engine.panel(id) else {
        tracing::warn!(panel = ?id, "transition for unknown panel");
        return None;
    };
    if fixed
        && (!panel.capabilities.can_fix || PaneSet::index_for_angle(panel.attach_angle).is_none())
    {
        tracing::warn!(panel = ?id, kind = %panel.kind, "panel cannot dock");
        return None;
    }
    if !fixed && !panel.capabilities.can_detach {
        tracing::warn!(panel = ?id, kind = %panel.kind, "panel cannot leave the wand");
        return None;
    }
    if engine.held() == Some(id) {
        engine.cancel_drag();
    }

    let panel = &mut engine.panels[id.index()];
    if fixed {
        panel.transition.set_target(panel.pose);
        panel.visible = true;
    }
    panel.fixed = fixed;
    panel.transition.to_wand(fixed, target);

    engine.close_pane_gaps();
    engine.refresh_customized();
    engine.save_layout_cmd()
}
