//! Panel transitions between docked and floating
//!
//! `percent` runs from 0 (on the wand) to 1 (at the floating target). Blends
//! go through `Pose::lerp`, so positions interpolate linearly and rotations
//! spherically.

use serde::Serialize;

use crate::geometry::Pose;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FixedTransitionState {
    Floating,
    FixedToFloating,
    FloatingToFixed,
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedTransition {
    state: FixedTransitionState,
    percent: f32,
    /// Where the panel floats to when leaving the wand
    target: Pose,
}

impl FixedTransition {
    pub fn fixed() -> Self {
        Self {
            state: FixedTransitionState::Fixed,
            percent: 0.0,
            target: Pose::IDENTITY,
        }
    }

    pub fn floating() -> Self {
        Self {
            state: FixedTransitionState::Floating,
            percent: 1.0,
            target: Pose::IDENTITY,
        }
    }

    pub fn state(&self) -> FixedTransitionState {
        self.state
    }

    pub fn percent(&self) -> f32 {
        self.percent
    }

    pub fn target(&self) -> Pose {
        self.target
    }

    pub fn set_target(&mut self, target: Pose) {
        self.target = target;
    }

    pub fn is_fixed(&self) -> bool {
        self.state == FixedTransitionState::Fixed
    }

    pub fn is_animating(&self) -> bool {
        matches!(
            self.state,
            FixedTransitionState::FixedToFloating | FixedTransitionState::FloatingToFixed
        )
    }

    /// Start animating onto (`fixed`) or off the wand
    ///
    /// `target` is only used when leaving the wand. Requests for the state
    /// the panel is already in are ignored.
    pub fn to_wand(&mut self, fixed: bool, target: Pose) {
        if fixed && self.state != FixedTransitionState::Fixed {
            self.state = FixedTransitionState::FloatingToFixed;
        } else if !fixed && self.state != FixedTransitionState::Floating {
            self.target = target;
            self.state = FixedTransitionState::FixedToFloating;
        }
    }

    /// A drag picked the panel up
    pub fn begin_drag(&mut self) {
        if self.state == FixedTransitionState::Fixed {
            self.state = FixedTransitionState::Floating;
            self.percent = 1.0;
        }
    }

    /// A drag let go of the panel at `pose`
    ///
    /// A docking drop animates from `pose` onto the wand slot.
    pub fn end_drag(&mut self, docked: bool, pose: Pose) {
        if docked {
            self.state = FixedTransitionState::FloatingToFixed;
            self.percent = 1.0;
        }
        self.target = pose;
    }

    /// Step an in-flight animation
    ///
    /// Returns true on the frame the animation completes.
    pub fn advance(&mut self, dt: f32, duration: f32) -> bool {
        let step = if duration > 0.0 { dt / duration } else { 1.0 };
        match self.state {
            FixedTransitionState::FixedToFloating => {
                self.percent += step;
                if self.percent >= 1.0 {
                    self.percent = 1.0;
                    self.state = FixedTransitionState::Floating;
                    return true;
                }
            }
            FixedTransitionState::FloatingToFixed => {
                self.percent -= step;
                if self.percent <= 0.0 {
                    self.percent = 0.0;
                    self.state = FixedTransitionState::Fixed;
                    return true;
                }
            }
            FixedTransitionState::Fixed | FixedTransitionState::Floating => {}
        }
        false
    }

    /// Interpolated pose between the wand slot and the floating target
    pub fn blend(&self, wand_slot: &Pose) -> Pose {
        wand_slot.lerp(&self.target, self.percent)
    }
}

/// Move `current` toward `target` at a constant `speed` per second
pub fn settle_offset(current: f32, target: f32, speed: f32, dt: f32) -> f32 {
    let step = speed * dt;
    let to_target = target - current;
    if to_target.abs() < step {
        target
    } else {
        current + step * to_target.signum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_to_wand_round_trip() {
        let mut t = FixedTransition::fixed();
        let away = Pose::from_position(Vec3::new(0.0, 1.0, 2.0));

        t.to_wand(false, away);
        assert_eq!(t.state(), FixedTransitionState::FixedToFloating);
        let mut frames = 0;
        while !t.advance(DT, 0.25) {
            frames += 1;
            assert!(frames < 100);
        }
        assert_eq!(t.state(), FixedTransitionState::Floating);
        assert_eq!(t.percent(), 1.0);
        assert_eq!(t.blend(&Pose::IDENTITY), away);

        t.to_wand(true, Pose::IDENTITY);
        assert_eq!(t.state(), FixedTransitionState::FloatingToFixed);
        // Target is kept when returning
        assert_eq!(t.target(), away);
        while !t.advance(DT, 0.25) {}
        assert!(t.is_fixed());
        assert_eq!(t.blend(&Pose::IDENTITY), Pose::IDENTITY);
    }

    #[test]
    fn test_to_wand_ignores_current_state() {
        let mut t = FixedTransition::floating();
        t.to_wand(false, Pose::from_position(Vec3::X));
        assert_eq!(t.state(), FixedTransitionState::Floating);
        assert_eq!(t.target(), Pose::IDENTITY);
    }

    #[test]
    fn test_blend_midway() {
        let mut t = FixedTransition::fixed();
        t.to_wand(false, Pose::from_position(Vec3::new(2.0, 0.0, 0.0)));
        t.advance(0.125, 0.25);
        let pose = t.blend(&Pose::IDENTITY);
        assert!((pose.position.x - 1.0).abs() < 1e-5);
        assert!(t.is_animating());
    }

    #[test]
    fn test_drag_begin_and_end() {
        let mut t = FixedTransition::fixed();
        t.begin_drag();
        assert_eq!(t.state(), FixedTransitionState::Floating);

        let drop = Pose::from_position(Vec3::Y);
        t.end_drag(false, drop);
        assert_eq!(t.state(), FixedTransitionState::Floating);
        assert_eq!(t.target(), drop);

        t.end_drag(true, drop);
        assert_eq!(t.state(), FixedTransitionState::FloatingToFixed);
        // Starts where the hand let go
        assert_eq!(t.blend(&Pose::IDENTITY), drop);
        while !t.advance(DT, 0.25) {}
        assert!(t.is_fixed());
        assert_eq!(t.percent(), 0.0);
    }

    #[test]
    fn test_settle_offset_constant_rate() {
        assert_eq!(settle_offset(0.0, 1.0, 3.0, 0.1), 0.3);
        assert_eq!(settle_offset(0.9, 1.0, 3.0, 0.1), 1.0);
        assert_eq!(settle_offset(0.0, -1.0, 3.0, 0.1), -0.3);
        assert_eq!(settle_offset(0.5, 0.5, 3.0, 0.1), 0.5);
    }
}
