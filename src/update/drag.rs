//! Drag update handlers
//!
//! A drag picks a panel off its pane (or out of free space), lets the docking
//! resolver preview it against the panes every tick, and commits on release.

use crate::commands::Cmd;
use crate::docking::DockingResolver;
use crate::engine::{DragState, LayoutEngine};
use crate::messages::DragMsg;
use crate::panel::PanelId;

/// Update function for drag messages
pub fn update_drag(engine: &mut LayoutEngine, msg: DragMsg) -> Option<Cmd> {
    let id = match &msg {
        DragMsg::Begin(id) | DragMsg::End(id) | DragMsg::Cancel(id) => *id,
        DragMsg::Move { id, .. } => *id,
    };
    if engine.panel(id).is_none() {
        tracing::warn!(panel = ?id, ?msg, "drag message for unknown panel");
        return None;
    }

    match msg {
        DragMsg::Begin(id) => begin_drag(engine, id),
        DragMsg::Move { id, pose } => {
            match engine.drag.as_mut() {
                Some(drag) if drag.id == id => drag.hand = pose,
                _ => tracing::debug!(panel = ?id, "move for a panel that is not held"),
            }
            None
        }
        DragMsg::End(id) => {
            if engine.held() == Some(id) {
                end_drag(engine, id)
            } else {
                None
            }
        }
        DragMsg::Cancel(id) => {
            if engine.held() == Some(id) {
                engine.cancel_drag();
            }
            None
        }
    }
}

fn begin_drag(engine: &mut LayoutEngine, id: PanelId) -> Option<Cmd> {
    let panel = &engine.panels[id.index()];
    if panel.is_unique() || !panel.visible || !panel.available(engine.advanced) {
        tracing::debug!(panel = ?id, kind = %panel.kind, "panel cannot be dragged");
        return None;
    }
    if engine.drag.is_some() {
        engine.cancel_drag();
    }

    let panel = &engine.panels[id.index()];
    engine.drag = Some(DragState {
        id,
        hand: panel.pose,
        started_fixed: panel.fixed,
        started_angle: panel.attach_angle,
    });
    engine.docking.begin(panel.fixed);
    engine.rebuild_panes();

    let panel = &mut engine.panels[id.index()];
    panel.primed = false;
    if panel.fixed {
        panel.fixed = false;
        panel.transition.begin_drag();
    }

    engine.prime_collision(Some(id));
    tracing::debug!(panel = ?id, "drag started");
    None
}

fn end_drag(engine: &mut LayoutEngine, id: PanelId) -> Option<Cmd> {
    let drag = engine.drag.take()?;
    engine.docking = DockingResolver::default();
    engine.indicator.target(None);

    let panel = &mut engine.panels[id.index()];
    panel.radius_adjust = 0.0;
    let dock = panel.capabilities.can_fix && (panel.primed || !panel.capabilities.can_detach);

    if dock {
        panel.fixed = true;
        panel.transition.end_drag(true, drag.hand);
        // The previewed reflow becomes the layout
        for docked in engine
            .panels
            .iter_mut()
            .filter(|p| p.fixed && !p.kind.is_admin())
        {
            docked.offset.commit();
        }
    } else {
        panel.transition.end_drag(false, drag.hand);
        for other in engine.panels.iter_mut().filter(|p| p.fixed) {
            other.offset.target = other.offset.stable;
        }
    }

    for panel in &mut engine.panels {
        panel.primed = false;
    }

    let reports = engine.close_pane_gaps();
    engine.prime_collision(Some(id));
    engine.refresh_customized();

    tracing::info!(
        panel = ?id,
        docked = dock,
        angle = engine.panels[id.index()].attach_angle,
        moved = reports.iter().map(|r| r.moved).sum::<usize>(),
        "drag ended"
    );
    engine.save_layout_cmd()
}
