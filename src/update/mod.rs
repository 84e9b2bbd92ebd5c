//! Update functions for the Elm-style architecture
//!
//! All discrete state changes flow through these functions.

mod drag;
mod mode;
mod panel;

use crate::commands::Cmd;
use crate::engine::LayoutEngine;
use crate::messages::Msg;

#[cfg(debug_assertions)]
use crate::tracing::PaneSnapshot;
#[cfg(debug_assertions)]
use tracing::{debug, span, warn, Level};

pub use drag::update_drag;
pub use mode::update_mode;
pub use panel::update_panel;

/// Main update function - dispatches to sub-handlers
///
/// In debug builds, this wraps with tracing instrumentation.
/// In release builds, it's a direct dispatch with zero overhead.
#[inline]
pub fn update(engine: &mut LayoutEngine, msg: Msg) -> Option<Cmd> {
    #[cfg(debug_assertions)]
    {
        update_traced(engine, msg)
    }
    #[cfg(not(debug_assertions))]
    {
        update_inner(engine, msg)
    }
}

/// Inner update logic (no tracing)
fn update_inner(engine: &mut LayoutEngine, msg: Msg) -> Option<Cmd> {
    let result = match msg {
        Msg::Drag(m) => drag::update_drag(engine, m),
        Msg::Mode(m) => mode::update_mode(engine, m),
        Msg::Panel(m) => panel::update_panel(engine, m),
    };
    result.filter(|cmd| !cmd.is_none())
}

/// Traced update wrapper (debug builds only)
///
/// Captures pane stacks before and after and logs what moved. Drag moves
/// arrive every frame and are not logged.
#[cfg(debug_assertions)]
fn update_traced(engine: &mut LayoutEngine, msg: Msg) -> Option<Cmd> {
    use crate::messages::DragMsg;

    let is_noisy = matches!(&msg, Msg::Drag(DragMsg::Move { .. }));
    if is_noisy {
        return update_inner(engine, msg);
    }

    let msg_name = msg_type_name(&msg);
    let _span = span!(Level::DEBUG, "update", msg = %msg_name).entered();
    debug!(target: "message", msg = %msg_name, "processing");

    let before = PaneSnapshot::from_engine(engine);
    let result = update_inner(engine, msg);
    let after = PaneSnapshot::from_engine(engine);

    if let Some(diff) = before.diff(&after) {
        debug!(target: "panes", %diff, "layout changed");
    }
    for problem in engine.check_invariants() {
        warn!(target: "panes", msg = %msg_name, %problem, "layout invariant broken");
    }

    result
}

/// Get a display name for a message type
#[cfg(debug_assertions)]
fn msg_type_name(msg: &Msg) -> String {
    match msg {
        Msg::Drag(m) => format!("Drag::{:?}", m),
        Msg::Mode(m) => format!("Mode::{:?}", m),
        Msg::Panel(m) => format!("Panel::{:?}", m),
    }
}
