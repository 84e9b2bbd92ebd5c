//! Scripted scenarios for the headless runner
//!
//! A scenario is a frame count, a fixed time step, a starting input and a
//! list of steps. Each step fires on one frame, optionally replacing the held
//! input and dispatching messages before that frame's tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use wand_layout::geometry::Pose;
use wand_layout::messages::{DragMsg, ModeMsg, Msg, PanelMsg};
use wand_layout::mode::Mode;
use wand_layout::panel::{PanelId, PanelKind};
use wand_layout::{FrameInput, LayoutEngine};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub dt: f32,
    pub frames: u32,
    pub input: FrameInput,
    pub steps: Vec<Step>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            dt: 1.0 / 90.0,
            frames: 90,
            input: FrameInput::default(),
            steps: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub frame: u32,
    #[serde(default)]
    pub input: Option<FrameInput>,
    #[serde(default)]
    pub messages: Vec<Msg>,
}

impl Step {
    fn messages(frame: u32, messages: Vec<Msg>) -> Self {
        Self {
            frame,
            input: None,
            messages,
        }
    }

    fn input(frame: u32, input: FrameInput) -> Self {
        Self {
            frame,
            input: Some(input),
            messages: Vec::new(),
        }
    }
}

impl Scenario {
    /// Open a floating panel, dock it on the wand, spin the ring, then visit
    /// the settings mode and come back
    ///
    /// Panel ids are looked up in `engine`, so the demo matches whichever
    /// panel set is active.
    pub fn demo(engine: &LayoutEngine) -> Self {
        let wand = Pose::from_position(Vec3::new(0.0, 1.0, 0.0));
        let base = FrameInput::new(wand, Vec3::new(0.0, 1.6, 0.0), -Vec3::Y);
        let mut steps = Vec::new();

        let spawn = Pose::from_position(Vec3::new(0.0, 1.5, 0.6));
        let dock_at = wand.transform_point(Vec3::new(0.0, 0.25, -0.45));

        let movable = [PanelKind::Lights, PanelKind::Labs, PanelKind::ToolsBasic]
            .into_iter()
            .find_map(|kind| engine.find_kind(kind).map(|id| (kind, id)));

        if let Some((kind, id)) = movable {
            if kind.is_spawnable() {
                steps.push(Step::messages(
                    5,
                    vec![Msg::Panel(PanelMsg::Open { kind, spawn })],
                ));
            }
            steps.extend(drag_steps(id, spawn.position, dock_at, 20, 40));
        }

        for frame in 70..75 {
            steps.push(Step::input(frame, base.with_scroll(0.05, true)));
        }
        steps.push(Step::input(75, base));

        steps.push(Step::messages(
            100,
            vec![Msg::Mode(ModeMsg::Toggle(Mode::Settings))],
        ));
        steps.push(Step::messages(
            130,
            vec![Msg::Mode(ModeMsg::Toggle(Mode::Settings))],
        ));

        Self {
            dt: 1.0 / 90.0,
            frames: 160,
            input: base,
            steps,
        }
    }
}

/// Grab `id`, carry it from `from` to `to` over `[start, end)`, and release
fn drag_steps(id: PanelId, from: Vec3, to: Vec3, start: u32, end: u32) -> Vec<Step> {
    let mut steps = vec![Step::messages(start, vec![Msg::Drag(DragMsg::Begin(id))])];
    let span = (end - start).max(1) as f32;
    for frame in start..end {
        let t = (frame - start + 1) as f32 / span;
        let pose = Pose::from_position(from.lerp(to, t));
        steps.push(Step::messages(
            frame,
            vec![Msg::Drag(DragMsg::Move { id, pose })],
        ));
    }
    steps.push(Step::messages(end + 2, vec![Msg::Drag(DragMsg::End(id))]));
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use wand_layout::LayoutConfig;

    #[test]
    fn test_demo_scenario_json_round_trip() {
        let engine = LayoutEngine::new(LayoutConfig::default(), true);
        let scenario = Scenario::demo(&engine);
        let json = serde_json::to_string(&scenario).unwrap();
        let back: Scenario = serde_json::from_str(&json).unwrap();
        assert_eq!(back.steps.len(), scenario.steps.len());
        assert_eq!(back.frames, 160);
    }

    #[test]
    fn test_sparse_scenario_uses_defaults() {
        let scenario: Scenario =
            serde_json::from_str(r#"{"frames": 3, "steps": [{"frame": 1}]}"#).unwrap();
        assert_eq!(scenario.frames, 3);
        assert_eq!(scenario.steps[0].messages, vec![]);
        assert!(scenario.steps[0].input.is_none());
    }
}
