//! Gap closing: settle a pane stack back inside its bounds
//!
//! Runs after a drop or a detach. Panels keep their order; only overlaps and
//! panels hanging past a bound are corrected. Interior gaps the user left are
//! kept as they are.

use crate::panel::{Bounds, Pane, PaneSet, Panel, StackSlot};

const EPSILON: f32 = 1e-5;

/// What a gap-closing pass did to one pane
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GapReport {
    /// Pane span left over after stacking every panel
    pub slack: f32,
    /// Panels whose target changed
    pub moved: usize,
    /// The stack is taller than the pane
    pub overflow: bool,
}

/// Close gaps in one stack, ordered by descending offset
///
/// Works on `target` offsets.
pub fn close_gaps(stack: &mut [StackSlot], bounds: Bounds) -> GapReport {
    let before: Vec<f32> = stack.iter().map(|s| s.target).collect();
    let total: f32 = stack.iter().map(|s| s.half * 2.0).sum();

    let overflow = total > bounds.span() + EPSILON;
    if overflow {
        // Pack from the top and let the bottom hang out
        let mut top = bounds.max;
        for slot in stack.iter_mut() {
            slot.target = top - slot.half;
            top -= slot.half * 2.0;
        }
    } else {
        separate_overlaps(stack);
        push_up_from_bottom(stack, bounds.min);
        push_down_from_top(stack, bounds.max);
    }

    let moved = stack
        .iter()
        .zip(before)
        .filter(|(slot, old)| (slot.target - old).abs() > EPSILON)
        .count();
    GapReport {
        slack: bounds.span() - total,
        moved,
        overflow,
    }
}

fn separate_overlaps(stack: &mut [StackSlot]) {
    for i in 1..stack.len() {
        let ceiling = stack[i - 1].bottom() - stack[i].half;
        if stack[i].target > ceiling {
            stack[i].target = ceiling;
        }
    }
}

fn push_up_from_bottom(stack: &mut [StackSlot], min: f32) {
    for i in (0..stack.len()).rev() {
        let floor = match stack.get(i + 1) {
            Some(below) => below.top() + stack[i].half,
            None => min + stack[i].half,
        };
        if stack[i].target < floor {
            stack[i].target = floor;
        } else {
            break;
        }
    }
}

fn push_down_from_top(stack: &mut [StackSlot], max: f32) {
    for i in 0..stack.len() {
        let ceiling = match i.checked_sub(1) {
            Some(above) => stack[above].bottom() - stack[i].half,
            None => max - stack[i].half,
        };
        if stack[i].target > ceiling {
            stack[i].target = ceiling;
        } else {
            break;
        }
    }
}

/// Close gaps on every pane and commit the stacked panels' targets as stable
pub fn close_all(panes: &PaneSet, panels: &mut [Panel], bounds: Bounds) -> [GapReport; 3] {
    let mut reports = [GapReport::default(); 3];

    for (index, pane) in panes.iter().enumerate() {
        let mut stack = pane.stack(panels);
        let report = close_gaps(&mut stack, bounds);
        if report.overflow {
            tracing::warn!(
                pane = index,
                panels = stack.len(),
                "pane stack taller than its bounds"
            );
        }
        Pane::apply_stack(&stack, panels);
        for slot in &stack {
            panels[slot.id.index()].offset.commit();
        }
        reports[index] = report;
    }

    let moved: usize = reports.iter().map(|r| r.moved).sum();
    tracing::debug!(moved, "closed pane gaps");
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::PanelId;

    fn bounds() -> Bounds {
        Bounds::new(-0.6, 0.6)
    }

    fn stack(slots: &[(f32, f32)]) -> Vec<StackSlot> {
        slots
            .iter()
            .enumerate()
            .map(|(i, &(offset, half))| StackSlot {
                id: PanelId(i as u32),
                stable: offset,
                target: offset,
                half,
            })
            .collect()
    }

    fn targets(stack: &[StackSlot]) -> Vec<f32> {
        stack.iter().map(|s| (s.target * 1000.0).round() / 1000.0).collect()
    }

    #[test]
    fn test_untouched_when_valid() {
        let mut s = stack(&[(0.4, 0.1), (-0.2, 0.1)]);
        let report = close_gaps(&mut s, bounds());
        assert_eq!(report.moved, 0);
        assert!((report.slack - 0.8).abs() < 1e-5);
        assert_eq!(targets(&s), vec![0.4, -0.2]);
    }

    #[test]
    fn test_pulls_back_past_bottom() {
        let mut s = stack(&[(0.0, 0.1), (-0.55, 0.1)]);
        let report = close_gaps(&mut s, bounds());
        assert_eq!(report.moved, 1);
        assert_eq!(targets(&s), vec![0.0, -0.5]);
    }

    #[test]
    fn test_bottom_push_cascades_upward() {
        let mut s = stack(&[(-0.3, 0.1), (-0.5, 0.1), (-0.65, 0.1)]);
        let report = close_gaps(&mut s, bounds());
        assert_eq!(report.moved, 3);
        assert_eq!(targets(&s), vec![-0.1, -0.3, -0.5]);
    }

    #[test]
    fn test_overlaps_separated_top_down() {
        let mut s = stack(&[(0.5, 0.1), (0.45, 0.1)]);
        close_gaps(&mut s, bounds());
        assert_eq!(targets(&s), vec![0.5, 0.3]);
    }

    #[test]
    fn test_overflow_packs_from_top() {
        let mut s = stack(&[(0.3, 0.3), (0.0, 0.3), (-0.3, 0.3)]);
        let report = close_gaps(&mut s, bounds());
        assert!(report.overflow);
        assert_eq!(targets(&s), vec![0.3, -0.3, -0.9]);
    }
}
