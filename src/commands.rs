//! Command types for the Elm-style architecture
//!
//! Commands are fire-and-forget side effects produced by the engine: haptic
//! pulses, audio cues and layout persistence. The host performs them; nothing
//! is fed back.

use glam::Vec3;
use serde::Serialize;

use crate::layout_store::LayoutRecord;

/// Controller that receives a haptic pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Controller {
    Wand,
    Brush,
}

/// Audio cue played at a world position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AudioCue {
    /// Stick snap rotated the ring by one pane
    PanelFlip,
    /// Held panel moved to a different step on its pane
    PaneMove,
    /// Held panel attached to or detached from a pane
    PaneAttach,
    /// Basic/advanced set toggled
    AdvancedModeSwitch { advanced: bool },
    PanelDismiss,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub enum Cmd {
    /// No command - do nothing
    #[default]
    None,
    Haptic {
        controller: Controller,
        /// Pulse length in seconds
        duration: f32,
        /// Seconds to wait before pulsing
        delay: f32,
    },
    Audio {
        cue: AudioCue,
        position: Vec3,
    },
    /// Persist the given layout records
    SaveLayout(Vec<LayoutRecord>),
    /// Forget any persisted layout
    ClearLayout,
    /// Execute multiple commands
    Batch(Vec<Cmd>),
}

impl Cmd {
    /// Create a batch of commands
    pub fn batch(cmds: Vec<Cmd>) -> Self {
        let mut cmds: Vec<Cmd> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        match cmds.len() {
            0 => Cmd::None,
            1 => cmds.remove(0),
            _ => Cmd::Batch(cmds),
        }
    }

    pub fn haptic(controller: Controller, duration: f32) -> Self {
        Cmd::Haptic {
            controller,
            duration,
            delay: 0.0,
        }
    }

    pub fn delayed_haptic(controller: Controller, duration: f32, delay: f32) -> Self {
        Cmd::Haptic {
            controller,
            duration,
            delay,
        }
    }

    pub fn audio(cue: AudioCue, position: Vec3) -> Self {
        Cmd::Audio { cue, position }
    }

    pub fn is_none(&self) -> bool {
        match self {
            Cmd::None => true,
            Cmd::Batch(cmds) => cmds.iter().all(Cmd::is_none),
            _ => false,
        }
    }

    /// Flatten nested batches into a list, dropping `None`
    pub fn flatten(self) -> Vec<Cmd> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(self, out: &mut Vec<Cmd>) {
        match self {
            Cmd::None => {}
            Cmd::Batch(cmds) => {
                for cmd in cmds {
                    cmd.flatten_into(out);
                }
            }
            cmd => out.push(cmd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_collapses() {
        assert_eq!(Cmd::batch(vec![]), Cmd::None);
        assert_eq!(Cmd::batch(vec![Cmd::None, Cmd::ClearLayout]), Cmd::ClearLayout);
        assert!(matches!(
            Cmd::batch(vec![Cmd::ClearLayout, Cmd::haptic(Controller::Wand, 0.05)]),
            Cmd::Batch(ref v) if v.len() == 2
        ));
    }

    #[test]
    fn test_flatten_nested() {
        let cmd = Cmd::Batch(vec![
            Cmd::None,
            Cmd::Batch(vec![Cmd::ClearLayout, Cmd::None]),
            Cmd::haptic(Controller::Brush, 0.1),
        ]);
        assert!(!cmd.is_none());
        assert_eq!(
            cmd.flatten(),
            vec![Cmd::ClearLayout, Cmd::haptic(Controller::Brush, 0.1)]
        );
        assert!(Cmd::Batch(vec![Cmd::None]).is_none());
    }
}
