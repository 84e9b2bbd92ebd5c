//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use glam::Vec3;
use wand_layout::commands::Cmd;
use wand_layout::geometry::{ring_rotation, Pose};
use wand_layout::messages::{DragMsg, Msg};
use wand_layout::panel::{Panel, PanelId, PanelKind};
use wand_layout::{update, FrameInput, FrameOutput, LayoutConfig, LayoutEngine};

/// 60 Hz frame step
pub const DT: f32 = 1.0 / 60.0;

/// Engine over the built-in panel map with default config
pub fn test_engine(advanced: bool) -> LayoutEngine {
    LayoutEngine::new(LayoutConfig::default(), advanced)
}

/// Wand held level at chest height, identity rotation
pub fn wand() -> Pose {
    Pose::from_position(Vec3::new(0.0, 1.0, 0.0))
}

/// Viewer above the wand looking straight down at it
///
/// Only the pane at ring angle 0 faces the viewer with the origin at 0.
pub fn looking_down() -> FrameInput {
    FrameInput::new(wand(), Vec3::new(0.0, 1.6, 0.0), -Vec3::Y)
}

/// World position of a point on the pane at `pane_angle`
///
/// `lateral` runs across the pane face, `offset` along the wand axis.
pub fn pane_point(engine: &LayoutEngine, pane_angle: f32, lateral: f32, offset: f32) -> Vec3 {
    let dir = ring_rotation(engine.ring_angle() + pane_angle) * Vec3::Y;
    let across = dir.cross(Vec3::Z);
    let local = dir * engine.config.panes.wand_radius + across * lateral + Vec3::Z * offset;
    wand().transform_point(local)
}

/// Tick `frames` times with the same input, returning the last output
pub fn run_frames(engine: &mut LayoutEngine, input: &FrameInput, frames: usize) -> FrameOutput {
    let mut output = FrameOutput::default();
    for _ in 0..frames {
        output = engine.tick(DT, input);
    }
    output
}

/// Tick `frames` times, collecting every command emitted along the way
pub fn run_collecting(engine: &mut LayoutEngine, input: &FrameInput, frames: usize) -> Vec<Cmd> {
    let mut commands = Vec::new();
    for _ in 0..frames {
        commands.extend(engine.tick(DT, input).commands);
    }
    commands
}

pub fn id_of(engine: &LayoutEngine, kind: PanelKind) -> PanelId {
    engine
        .find_kind(kind)
        .unwrap_or_else(|| panic!("{kind} not in the active set"))
}

pub fn panel_of(engine: &LayoutEngine, kind: PanelKind) -> &Panel {
    &engine.panels[id_of(engine, kind).index()]
}

/// Grab `id` and hold it at `position` for a few frames
pub fn hold_at(engine: &mut LayoutEngine, id: PanelId, position: Vec3) {
    update(engine, Msg::Drag(DragMsg::Begin(id)));
    move_to(engine, id, position);
}

/// Move the held panel and let docking resolve
pub fn move_to(engine: &mut LayoutEngine, id: PanelId, position: Vec3) {
    update(
        engine,
        Msg::Drag(DragMsg::Move {
            id,
            pose: Pose::from_position(position),
        }),
    );
    run_frames(engine, &looking_down(), 3);
}

/// Release the held panel, returning whatever command the drop produced
pub fn release(engine: &mut LayoutEngine, id: PanelId) -> Option<Cmd> {
    update(engine, Msg::Drag(DragMsg::End(id)))
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}
