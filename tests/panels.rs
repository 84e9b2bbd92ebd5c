//! Tests for opening, dismissing and rearranging panels

mod common;

use common::*;
use glam::Vec3;
use wand_layout::commands::{AudioCue, Cmd};
use wand_layout::geometry::Pose;
use wand_layout::messages::{Msg, PanelMsg};
use wand_layout::panel::PanelKind;
use wand_layout::transition::FixedTransitionState;
use wand_layout::{update, LayoutEngine};

fn spawn() -> Pose {
    Pose::from_position(Vec3::new(0.0, 1.5, 0.6))
}

fn open(engine: &mut LayoutEngine, kind: PanelKind) -> Option<Cmd> {
    update(
        engine,
        Msg::Panel(PanelMsg::Open {
            kind,
            spawn: spawn(),
        }),
    )
}

// ============================================================================
// Open / Dismiss
// ============================================================================

#[test]
fn test_open_spawns_floating_panel() {
    let mut engine = test_engine(true);
    assert!(!engine.customized);

    let cmd = open(&mut engine, PanelKind::Reference);

    assert!(matches!(cmd, Some(Cmd::SaveLayout(_))));
    let panel = panel_of(&engine, PanelKind::Reference);
    assert!(panel.visible);
    assert!(!panel.fixed);
    assert_eq!(panel.pose, spawn());
    assert!(engine.customized);

    let output = run_frames(&mut engine, &looking_down(), 1);
    let transform = output.transform(panel_of(&engine, PanelKind::Reference).id);
    assert!(transform.is_some_and(|t| t.visible && t.scale == 1.0));
}

#[test]
fn test_open_rejects_wand_only_kinds() {
    let mut engine = test_engine(true);

    assert_eq!(open(&mut engine, PanelKind::Color), None);
    assert_eq!(open(&mut engine, PanelKind::Sketchbook), None);
    assert!(panel_of(&engine, PanelKind::Color).fixed);
}

#[test]
fn test_open_outside_active_set() {
    let mut engine = test_engine(false);

    assert_eq!(open(&mut engine, PanelKind::Lights), None);
    assert!(engine.panels.iter().all(|p| p.kind != PanelKind::Lights || !p.visible));
}

#[test]
fn test_locked_panels_stay_docked_on_open() {
    let mut engine = test_engine(false);

    assert_eq!(open(&mut engine, PanelKind::ToolsBasic), None);
    assert!(panel_of(&engine, PanelKind::ToolsBasic).fixed);
}

#[test]
fn test_open_docked_panel_floats_it() {
    let mut engine = test_engine(true);
    let cmd = open(&mut engine, PanelKind::Labs);

    let Some(Cmd::SaveLayout(records)) = cmd else {
        panic!("expected a layout save, got {cmd:?}");
    };
    assert!(records.iter().all(|r| r.kind != PanelKind::Labs));
    assert!(!panel_of(&engine, PanelKind::Labs).fixed);
}

#[test]
fn test_dismiss_hides_and_saves() {
    let mut engine = test_engine(true);
    open(&mut engine, PanelKind::Lights);

    let cmd = update(&mut engine, Msg::Panel(PanelMsg::Dismiss(PanelKind::Lights)));

    let commands = cmd.map(Cmd::flatten).unwrap_or_default();
    assert!(matches!(
        commands[0],
        Cmd::Audio {
            cue: AudioCue::PanelDismiss,
            ..
        }
    ));
    assert!(matches!(commands[1], Cmd::SaveLayout(_)));

    let panel = panel_of(&engine, PanelKind::Lights);
    assert!(!panel.visible);
    assert!(!panel.restore);
    assert!(!engine.customized);
}

#[test]
fn test_core_panels_cannot_be_dismissed() {
    let mut engine = test_engine(true);

    let cmd = update(
        &mut engine,
        Msg::Panel(PanelMsg::Dismiss(PanelKind::ToolsAdvanced)),
    );

    assert_eq!(cmd, None);
    assert!(panel_of(&engine, PanelKind::ToolsAdvanced).visible);
}

#[test]
fn test_dismissing_held_panel_ends_drag() {
    let mut engine = test_engine(true);
    run_frames(&mut engine, &looking_down(), 1);
    open(&mut engine, PanelKind::Lights);
    let lights = id_of(&engine, PanelKind::Lights);
    let point = pane_point(&engine, 0.0, 0.0, -0.45);
    hold_at(&mut engine, lights, point);

    update(&mut engine, Msg::Panel(PanelMsg::Dismiss(PanelKind::Lights)));

    assert!(engine.held().is_none());
    assert!(!engine.panels[lights.index()].visible);
}

// ============================================================================
// Hide / Restore / Reset
// ============================================================================

#[test]
fn test_hide_all_then_restore() {
    let mut engine = test_engine(true);
    open(&mut engine, PanelKind::Lights);
    let shown: Vec<PanelKind> = engine
        .panels
        .iter()
        .filter(|p| p.visible && !p.is_unique())
        .map(|p| p.kind)
        .collect();

    update(&mut engine, Msg::Panel(PanelMsg::HideAll));
    assert!(engine
        .panels
        .iter()
        .filter(|p| !p.is_unique())
        .all(|p| !p.visible));

    update(&mut engine, Msg::Panel(PanelMsg::RestoreHidden));
    let restored: Vec<PanelKind> = engine
        .panels
        .iter()
        .filter(|p| p.visible && !p.is_unique())
        .map(|p| p.kind)
        .collect();
    assert_eq!(restored, shown);
    assert!(!panel_of(&engine, PanelKind::Environment).visible);
}

#[test]
fn test_reset_layout_restores_panel_map() {
    let mut engine = test_engine(true);
    run_frames(&mut engine, &looking_down(), 1);
    open(&mut engine, PanelKind::Lights);
    let lights = id_of(&engine, PanelKind::Lights);
    let point = pane_point(&engine, 0.0, 0.0, -0.45);
    hold_at(&mut engine, lights, point);
    release(&mut engine, lights);
    assert!(engine.customized);

    let cmd = update(&mut engine, Msg::Panel(PanelMsg::ResetLayout));

    assert_eq!(cmd, Some(Cmd::ClearLayout));
    assert!(!engine.customized);
    let lights = panel_of(&engine, PanelKind::Lights);
    assert!(!lights.visible);
    assert!(!lights.fixed);
    let extra = panel_of(&engine, PanelKind::Extra);
    assert!(extra.fixed);
    assert_eq!(extra.offset.stable, -0.2);
    assert!(engine.check_invariants().is_empty());
}

// ============================================================================
// Transitions
// ============================================================================

#[test]
fn test_transition_off_and_back_onto_wand() {
    let mut engine = test_engine(true);
    run_frames(&mut engine, &looking_down(), 1);
    let tools = id_of(&engine, PanelKind::ToolsAdvanced);
    let target = Pose::from_position(Vec3::new(0.0, 1.5, 1.0));

    update(
        &mut engine,
        Msg::Panel(PanelMsg::TransitionToWand {
            id: tools,
            fixed: false,
            target,
        }),
    );
    assert_eq!(
        engine.panels[tools.index()].transition.state(),
        FixedTransitionState::FixedToFloating
    );

    let output = run_frames(&mut engine, &looking_down(), 30);
    assert_eq!(
        engine.panels[tools.index()].transition.state(),
        FixedTransitionState::Floating
    );
    let transform = output.transform(tools).expect("transform");
    assert!(transform.position.abs_diff_eq(target.position, 1e-4));

    update(
        &mut engine,
        Msg::Panel(PanelMsg::TransitionToWand {
            id: tools,
            fixed: true,
            target,
        }),
    );
    run_frames(&mut engine, &looking_down(), 30);
    let panel = &engine.panels[tools.index()];
    assert!(panel.fixed);
    assert!(panel.transition.is_fixed());
    assert!(!engine.customized);
}

#[test]
fn test_locked_panel_cannot_leave_wand() {
    let mut engine = test_engine(false);
    let tools = id_of(&engine, PanelKind::ToolsBasic);

    update(
        &mut engine,
        Msg::Panel(PanelMsg::TransitionToWand {
            id: tools,
            fixed: false,
            target: spawn(),
        }),
    );

    assert!(engine.panels[tools.index()].transition.is_fixed());
}

// ============================================================================
// Floating panels
// ============================================================================

#[test]
fn test_stacked_floating_panels_push_apart() {
    let mut engine = test_engine(true);
    open(&mut engine, PanelKind::Lights);
    open(&mut engine, PanelKind::Environment);

    run_frames(&mut engine, &looking_down(), 180);

    let lights = panel_of(&engine, PanelKind::Lights).pose.position;
    let environment = panel_of(&engine, PanelKind::Environment).pose.position;
    // The last opened panel stays put
    assert_eq!(environment, spawn().position);
    assert!(lights.distance(environment) > 0.2);
}

#[test]
fn test_sweet_spot_recenter_carries_panels() {
    let mut engine = test_engine(true);
    open(&mut engine, PanelKind::Lights);
    let center = Vec3::new(1.0, 0.0, 0.0);

    update(&mut engine, Msg::Panel(PanelMsg::SetSweetSpot(center)));

    let expected = center + spawn().position.normalize();
    let lights = panel_of(&engine, PanelKind::Lights);
    assert!(lights.pose.position.abs_diff_eq(expected, 1e-5));
    assert_eq!(engine.sweet_spot.center, center);
}
