//! Message types for the Elm-style architecture
//!
//! Discrete events the host feeds into `update::update`. Per-frame input
//! goes through `LayoutEngine::tick` instead.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::geometry::Pose;
use crate::mode::Mode;
use crate::panel::{PanelId, PanelKind};

/// Panel grab interactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DragMsg {
    /// Panel was grabbed
    Begin(PanelId),
    /// Grabbing hand moved
    Move { id: PanelId, pose: Pose },
    /// Panel was let go
    End(PanelId),
    /// Interaction aborted; everything goes back to where it was
    Cancel(PanelId),
}

/// Panel-set mode and visibility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModeMsg {
    /// Toggle between standard and an alternate mode
    Toggle(Mode),
    ToggleMemoryWarning,
    /// Show or hide the whole panel set
    SetVisible(bool),
    /// Swap between the basic and advanced panel sets
    ToggleAdvanced,
}

/// Panel lifetime and layout management
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PanelMsg {
    /// Show a panel of the active set floating at `spawn`
    Open { kind: PanelKind, spawn: Pose },
    /// Hide a non-core panel
    Dismiss(PanelKind),
    /// Hide every panel, remembering which were shown
    HideAll,
    /// Re-show panels hidden by `HideAll`
    RestoreHidden,
    /// Back to the panel map defaults
    ResetLayout,
    /// Animate a panel onto (`fixed`) or off the wand
    TransitionToWand {
        id: PanelId,
        fixed: bool,
        target: Pose,
    },
    /// Move the sweet-spot sphere
    SetSweetSpot(Vec3),
    /// Zero the ring origin
    ResetRotation,
}

/// Top-level message type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Msg {
    Drag(DragMsg),
    Mode(ModeMsg),
    Panel(PanelMsg),
}
