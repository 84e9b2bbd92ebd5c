//! Panel system - panels docked around the wand
//!
//! Panels are arranged around the wand in three angular sectors ("panes"),
//! each holding a vertical stack of docked panels. Panels that are not docked
//! float freely in the world.
//!
//! ## Architecture
//!
//! - `PanelKind`: tag identifying what a panel is (persistence key)
//! - `Capabilities`: whether a panel may detach from or dock into a pane
//! - `PanelSpec`: static panel map entry the engine instantiates panels from
//! - `Panel`: runtime state (attach angle, offsets, pose, transition)
//! - `Pane` / `PaneSet`: ordered stacks, rebuilt wholesale on demand

mod kind;
mod pane;
mod state;

pub use kind::{default_panel_map, Capabilities, PanelKind, PanelSets, PanelSpec, UnknownKind};
pub use pane::{Bounds, Pane, PaneSet, StackSlot, PANE_ANGLES, PANE_SPACING};
pub use state::{AttachOffset, Panel, PanelId};
