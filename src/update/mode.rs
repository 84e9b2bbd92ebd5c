//! Mode update handlers
//!
//! Alternate modes, panel-set visibility and the basic/advanced swap.

use crate::commands::{AudioCue, Cmd};
use crate::engine::LayoutEngine;
use crate::geometry::normalize_angle;
use crate::messages::ModeMsg;
use crate::mode::{alt_angle_from_head, Mode};
use crate::panel::{PanelId, PanelKind};

/// Update function for mode messages
pub fn update_mode(engine: &mut LayoutEngine, msg: ModeMsg) -> Option<Cmd> {
    match msg {
        ModeMsg::Toggle(mode) => {
            let alt_angle = alt_angle_from_head(&engine.wand, engine.head);
            let was_standard = engine.modes.is_standard();
            if engine.modes.toggle(mode, alt_angle).is_err() {
                return None;
            }
            if was_standard && mode != Mode::Standard {
                engine.cancel_drag();
            }
            engine.close_pane_gaps();
            None
        }

        ModeMsg::ToggleMemoryWarning => {
            engine.modes.toggle_memory_warning();
            engine.cancel_drag();
            None
        }

        ModeMsg::SetVisible(visible) => {
            if engine.modes.set_visible(visible) {
                engine.cancel_drag();
                tracing::debug!("panels hiding");
            }
            None
        }

        ModeMsg::ToggleAdvanced => Some(toggle_advanced(engine)),
    }
}

/// Swap the active panel set and spin the ring once to reveal it
fn toggle_advanced(engine: &mut LayoutEngine) -> Cmd {
    engine.cancel_drag();
    engine.advanced = !engine.advanced;
    let advanced = engine.advanced;

    // First visit spins on to the basic tools panel's angle
    let origin = engine.rotation.origin();
    let extra = if advanced && !engine.advanced_visited {
        engine
            .panels
            .iter()
            .find(|p| p.kind == PanelKind::ToolsBasic)
            .map(|tools| normalize_angle(360.0 - (tools.attach_angle + origin)))
    } else {
        None
    };
    engine.reveal.start(origin, extra);
    if advanced {
        engine.advanced_visited = true;
    }

    let swapped: Vec<(PanelId, bool)> = engine
        .panels
        .iter()
        .filter(|p| !p.is_unique())
        .map(|p| (p.id, p.advanced == advanced))
        .collect();
    for (id, incoming) in swapped {
        if incoming {
            if engine.panels[id.index()].restore {
                engine.restore_panel(id);
            }
        } else if engine.panels[id.index()].visible {
            engine.hide_panel(id);
        }
    }

    engine.close_pane_gaps();
    engine.prime_collision(None);
    engine.refresh_customized();
    tracing::info!(advanced, ?extra, "panel set toggled");

    Cmd::audio(
        AudioCue::AdvancedModeSwitch { advanced },
        engine.wand.position,
    )
}
