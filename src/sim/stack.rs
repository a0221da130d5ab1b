//! The tower: placed pieces, width bookkeeping, wobble and collapse rules
//!
//! Offsets, golden flags and variants are parallel sequences indexed by
//! placement order. Every mutation touches all of them together so their
//! lengths always agree.

use serde::{Deserialize, Serialize};

use super::piece::VisualVariant;
use crate::tuning::Tuning;

/// Why the tower fell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollapseReason {
    /// Two consecutive pieces drifted too far apart
    Offset,
    /// Total overhang from the foundation exceeded the limit
    WidthOverrun,
}

/// The accumulated tower
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stack {
    offsets: Vec<f32>,
    golden: Vec<bool>,
    variants: Vec<VisualVariant>,
    /// x of the foundation piece; survives truncation
    base_offset: f32,
    ground_y: f32,
    /// Tracked pieces * piece height
    height: f32,
    /// y of the top edge of the topmost piece (ground line when empty)
    top_y: f32,
    /// Cosmetic sway added to the rendered x of every piece
    pub wobble_offset: f32,
    /// Signed per-tick wobble step
    pub wobble_speed: f32,
    unstable: bool,
    collapse_reason: Option<CollapseReason>,
}

impl Stack {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            offsets: Vec::new(),
            golden: Vec::new(),
            variants: Vec::new(),
            base_offset: 0.0,
            ground_y: tuning.ground_y,
            height: 0.0,
            top_y: tuning.ground_y,
            wobble_offset: 0.0,
            wobble_speed: tuning.wobble_speed,
            unstable: false,
            collapse_reason: None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn offsets(&self) -> &[f32] {
        &self.offsets
    }

    pub fn golden_flags(&self) -> &[bool] {
        &self.golden
    }

    pub fn variants(&self) -> &[VisualVariant] {
        &self.variants
    }

    pub fn base_offset(&self) -> f32 {
        self.base_offset
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn top_y(&self) -> f32 {
        self.top_y
    }

    pub fn is_unstable(&self) -> bool {
        self.unstable
    }

    pub fn collapse_reason(&self) -> Option<CollapseReason> {
        self.collapse_reason
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapse_reason.is_some()
    }

    /// x of the most recently placed piece
    ///
    /// Panics on an empty stack: callers must land the foundation first.
    pub fn top_offset(&self) -> f32 {
        *self
            .offsets
            .last()
            .expect("top_offset called on an empty stack")
    }

    /// Rendered x of piece `i` (wobble applied)
    pub fn render_x(&self, i: usize) -> f32 {
        self.offsets[i] + self.wobble_offset
    }

    fn recompute_height(&mut self, tuning: &Tuning) {
        self.height = self.len() as f32 * tuning.piece_height;
        self.top_y = self.ground_y - self.height;
    }

    /// Place a piece on top. The first placement fixes the base offset.
    pub fn build(&mut self, committed_x: f32, golden: bool, variant: VisualVariant, tuning: &Tuning) {
        assert!(!self.is_collapsed(), "build on a collapsed stack");

        if self.is_empty() {
            self.base_offset = committed_x;
        }
        self.offsets.push(committed_x);
        // The foundation has nothing to be golden against
        self.golden.push(golden && self.offsets.len() > 1);
        self.variants.push(variant);
        self.recompute_height(tuning);
    }

    /// Signed tower width: overhang from the foundation plus one piece.
    /// Negative when the tower leans left.
    pub fn width(&self, tuning: &Tuning) -> f32 {
        let Some(&top) = self.offsets.last() else {
            return tuning.piece_width;
        };
        let drift = top - self.base_offset;
        if drift < 0.0 {
            drift - tuning.piece_width
        } else {
            drift + tuning.piece_width
        }
    }

    /// Drift of the newest piece from the one it was placed on
    ///
    /// With exactly two pieces the reference is the base offset; otherwise
    /// the second-to-last entry. `None` below two pieces.
    pub fn top_drift(&self) -> Option<f32> {
        let len = self.len();
        if len < 2 {
            return None;
        }
        let reference = if len == 2 {
            self.base_offset
        } else {
            self.offsets[len - 2]
        };
        Some(self.offsets[len - 1] - reference)
    }

    /// Offset rule, evaluated right after a build. Marks the collapse.
    pub fn check_offset_collapse(&mut self, tuning: &Tuning) -> bool {
        let Some(drift) = self.top_drift() else {
            return false;
        };
        if drift.abs() >= tuning.collapse_offset() {
            self.collapse(CollapseReason::Offset);
            return true;
        }
        false
    }

    /// Width rule, evaluated every tick. Marks the collapse.
    pub fn check_width_overrun(&mut self, tuning: &Tuning) -> bool {
        let width = self.width(tuning);
        if width < -tuning.width_overrun_limit || width > tuning.width_overrun_limit {
            self.collapse(CollapseReason::WidthOverrun);
            return true;
        }
        false
    }

    /// Mark the tower as fallen. The first reason sticks.
    pub fn collapse(&mut self, reason: CollapseReason) {
        if self.collapse_reason.is_none() {
            log::debug!("Stack collapse: {:?} at size {}", reason, self.len());
            self.collapse_reason = Some(reason);
        }
    }

    /// Advance the wobble one tick (triangle wave once unstable)
    pub fn wobble(&mut self, tuning: &Tuning) {
        let width = self.width(tuning).abs();
        let len = self.len();
        if (width > tuning.wobble_width_threshold && len >= tuning.wobble_min_size)
            || len >= tuning.wobble_size_threshold
        {
            self.unstable = true;
        }

        if !self.unstable {
            return;
        }

        self.wobble_offset += self.wobble_speed;
        if self.wobble_offset > tuning.wobble_limit {
            self.wobble_speed = -tuning.wobble_speed;
        } else if self.wobble_offset < -tuning.wobble_limit {
            self.wobble_speed = tuning.wobble_speed;
        }
    }

    /// Keep only the newest `keep` pieces once `milestone` is reached
    ///
    /// Returns how many entries were dropped. Panics below the milestone.
    pub fn truncate(&mut self, milestone: usize, keep: usize, tuning: &Tuning) -> usize {
        assert!(
            self.len() >= milestone,
            "truncate below milestone ({} < {})",
            self.len(),
            milestone
        );
        assert!(keep <= milestone, "truncate keep exceeds milestone");

        let removed = self.len() - keep;
        self.offsets.drain(..removed);
        self.golden.drain(..removed);
        self.variants.drain(..removed);
        self.recompute_height(tuning);
        removed
    }

    /// Pop the newest piece (it falls off during a collapse)
    pub fn remove_top(&mut self, tuning: &Tuning) {
        assert!(!self.is_empty(), "remove_top on an empty stack");
        self.offsets.pop();
        self.golden.pop();
        self.variants.pop();
        self.recompute_height(tuning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn stack_with(offsets: &[f32], tuning: &Tuning) -> Stack {
        let mut stack = Stack::new(tuning);
        for (i, &x) in offsets.iter().enumerate() {
            stack.build(x, false, VisualVariant::for_sequence(i as u32), tuning);
        }
        stack
    }

    fn assert_parallel(stack: &Stack) {
        assert_eq!(stack.offsets().len(), stack.len());
        assert_eq!(stack.golden_flags().len(), stack.len());
        assert_eq!(stack.variants().len(), stack.len());
    }

    #[test]
    fn test_build_fixes_base_and_height() {
        let tuning = Tuning::default();
        let mut stack = Stack::new(&tuning);
        assert_eq!(stack.top_y(), tuning.ground_y);
        assert_eq!(stack.width(&tuning), tuning.piece_width);

        stack.build(120.0, true, VisualVariant::Foundation, &tuning);
        assert_eq!(stack.base_offset(), 120.0);
        assert_eq!(stack.golden_flags(), &[false]);
        assert_eq!(stack.height(), tuning.piece_height);
        assert_eq!(stack.top_y(), tuning.ground_y - tuning.piece_height);

        stack.build(125.0, true, VisualVariant::Middle(0), &tuning);
        assert_eq!(stack.base_offset(), 120.0);
        assert_eq!(stack.golden_flags(), &[false, true]);
        assert_eq!(stack.top_offset(), 125.0);
        assert_parallel(&stack);
    }

    #[test]
    #[should_panic(expected = "empty stack")]
    fn test_top_offset_on_empty_panics() {
        let tuning = Tuning::default();
        Stack::new(&tuning).top_offset();
    }

    #[test]
    fn test_width_sign_follows_drift() {
        let tuning = Tuning::default();
        let right = stack_with(&[100.0, 120.0], &tuning);
        assert!((right.width(&tuning) - (20.0 + 63.0)).abs() < 1e-4);

        let left = stack_with(&[100.0, 80.0], &tuning);
        assert!((left.width(&tuning) + (20.0 + 63.0)).abs() < 1e-4);

        let centered = stack_with(&[100.0, 100.0], &tuning);
        assert_eq!(centered.width(&tuning), tuning.piece_width);
    }

    #[test]
    fn test_offset_rule_uses_base_at_two_pieces() {
        let tuning = Tuning::default();
        let mut stack = stack_with(&[100.0], &tuning);
        stack.build(100.0 + 31.5, false, VisualVariant::Middle(0), &tuning);
        assert_eq!(stack.top_drift(), Some(31.5));
        assert!(stack.check_offset_collapse(&tuning));
        assert_eq!(stack.collapse_reason(), Some(CollapseReason::Offset));
    }

    #[test]
    fn test_offset_rule_uses_previous_piece() {
        let tuning = Tuning::default();
        // Slow drift: each step 20, never collapses by offset
        let mut stack = stack_with(&[100.0, 120.0], &tuning);
        assert!(!stack.check_offset_collapse(&tuning));
        stack.build(140.0, false, VisualVariant::Middle(1), &tuning);
        assert_eq!(stack.top_drift(), Some(20.0));
        assert!(!stack.check_offset_collapse(&tuning));
        assert!(!stack.is_collapsed());

        stack.build(172.0, false, VisualVariant::Middle(2), &tuning);
        assert!(stack.check_offset_collapse(&tuning));
    }

    #[test]
    fn test_offset_rule_needs_two_pieces() {
        let tuning = Tuning::default();
        let mut stack = stack_with(&[500.0], &tuning);
        assert!(!stack.check_offset_collapse(&tuning));
    }

    #[test]
    fn test_width_overrun_both_sides() {
        let tuning = Tuning::default();
        // width = 78 + 63 = 141 > 140
        let mut right = stack_with(&[0.0, 20.0, 40.0, 60.0, 78.0], &tuning);
        assert!(!right.check_offset_collapse(&tuning));
        assert!(right.check_width_overrun(&tuning));
        assert_eq!(right.collapse_reason(), Some(CollapseReason::WidthOverrun));

        let mut left = stack_with(&[0.0, -20.0, -40.0, -60.0, -78.0], &tuning);
        assert!(left.check_width_overrun(&tuning));

        // Exactly at the limit does not collapse (77 + 63 = 140)
        let mut edge = stack_with(&[0.0, 20.0, 40.0, 60.0, 77.0], &tuning);
        assert!(!edge.check_width_overrun(&tuning));
    }

    #[test]
    fn test_first_collapse_reason_sticks() {
        let tuning = Tuning::default();
        let mut stack = stack_with(&[0.0], &tuning);
        stack.collapse(CollapseReason::Offset);
        stack.collapse(CollapseReason::WidthOverrun);
        assert_eq!(stack.collapse_reason(), Some(CollapseReason::Offset));
    }

    #[test]
    #[should_panic(expected = "collapsed")]
    fn test_build_after_collapse_panics() {
        let tuning = Tuning::default();
        let mut stack = stack_with(&[0.0], &tuning);
        stack.collapse(CollapseReason::Offset);
        stack.build(0.0, false, VisualVariant::Middle(0), &tuning);
    }

    #[test]
    fn test_wobble_triangle_wave() {
        let tuning = Tuning::default();
        // 5 pieces, width 80 + 63 > 100
        let mut stack = stack_with(&[0.0, 20.0, 40.0, 60.0, 80.0], &tuning);
        stack.wobble(&tuning);
        assert!(stack.is_unstable());
        assert_eq!(stack.wobble_offset, tuning.wobble_speed);

        let mut max_seen: f32 = 0.0;
        let mut min_seen: f32 = 0.0;
        for _ in 0..200 {
            stack.wobble(&tuning);
            max_seen = max_seen.max(stack.wobble_offset);
            min_seen = min_seen.min(stack.wobble_offset);
        }
        assert!(max_seen <= tuning.wobble_limit + tuning.wobble_speed);
        assert!(min_seen >= -tuning.wobble_limit - tuning.wobble_speed);
        assert!(max_seen > tuning.wobble_limit - 1.0);
        assert!(min_seen < -tuning.wobble_limit + 1.0);

        // Wobble never leaks into placement offsets
        assert_eq!(stack.offsets(), &[0.0, 20.0, 40.0, 60.0, 80.0]);
        assert_eq!(stack.render_x(0), stack.wobble_offset);
    }

    #[test]
    fn test_stable_tower_does_not_wobble() {
        let tuning = Tuning::default();
        let mut stack = stack_with(&[0.0, 0.0, 0.0, 0.0, 0.0], &tuning);
        for _ in 0..10 {
            stack.wobble(&tuning);
        }
        assert!(!stack.is_unstable());
        assert_eq!(stack.wobble_offset, 0.0);
    }

    #[test]
    fn test_instability_is_one_way() {
        let tuning = Tuning::default();
        let mut stack = stack_with(&[0.0, 20.0, 40.0, 60.0, 80.0], &tuning);
        stack.wobble(&tuning);
        assert!(stack.is_unstable());
        stack.remove_top(&tuning);
        stack.remove_top(&tuning);
        stack.wobble(&tuning);
        assert!(stack.is_unstable());
    }

    #[test]
    fn test_truncate_keeps_newest_window() {
        let tuning = Tuning::default();
        let offsets = [10.0, 11.0, 12.0, 13.0, 14.0, 15.0];
        let mut stack = stack_with(&offsets, &tuning);
        let removed = stack.truncate(6, 4, &tuning);

        assert_eq!(removed, 2);
        assert_eq!(stack.len(), 4);
        assert_eq!(stack.offsets(), &offsets[2..]);
        assert_eq!(stack.variants()[0], VisualVariant::for_sequence(2));
        assert_eq!(stack.height(), 4.0 * tuning.piece_height);
        assert_eq!(stack.top_y(), tuning.ground_y - 4.0 * tuning.piece_height);
        assert_eq!(stack.base_offset(), 10.0);
        assert_parallel(&stack);
    }

    #[test]
    #[should_panic(expected = "below milestone")]
    fn test_truncate_below_milestone_panics() {
        let tuning = Tuning::default();
        let mut stack = stack_with(&[0.0, 0.0, 0.0], &tuning);
        stack.truncate(6, 4, &tuning);
    }

    #[test]
    fn test_remove_top() {
        let tuning = Tuning::default();
        let mut stack = stack_with(&[0.0, 5.0, 10.0], &tuning);
        stack.remove_top(&tuning);
        assert_eq!(stack.offsets(), &[0.0, 5.0]);
        assert_eq!(stack.top_y(), tuning.ground_y - 2.0 * tuning.piece_height);
        assert_parallel(&stack);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Build(f32, bool),
        Remove,
        Truncate,
        Wobble,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (-200.0f32..200.0, any::<bool>()).prop_map(|(x, g)| Op::Build(x, g)),
            1 => Just(Op::Remove),
            1 => Just(Op::Truncate),
            2 => Just(Op::Wobble),
        ]
    }

    proptest! {
        #[test]
        fn prop_parallel_sequences_stay_in_sync(ops in prop::collection::vec(op_strategy(), 0..64)) {
            let tuning = Tuning::default();
            let mut stack = Stack::new(&tuning);
            for op in ops {
                match op {
                    Op::Build(x, g) => {
                        let seq = stack.len() as u32;
                        stack.build(x, g, VisualVariant::for_sequence(seq), &tuning);
                    }
                    Op::Remove if !stack.is_empty() => stack.remove_top(&tuning),
                    Op::Truncate if stack.len() >= tuning.truncation_milestone => {
                        stack.truncate(
                            tuning.truncation_milestone,
                            tuning.visible_after_truncation,
                            &tuning,
                        );
                    }
                    Op::Wobble => stack.wobble(&tuning),
                    _ => {}
                }
                prop_assert_eq!(stack.offsets().len(), stack.len());
                prop_assert_eq!(stack.golden_flags().len(), stack.len());
                prop_assert_eq!(stack.variants().len(), stack.len());
                prop_assert!((stack.height() - stack.len() as f32 * tuning.piece_height).abs() < 1e-3);
            }
        }

        #[test]
        fn prop_width_magnitude(offsets in prop::collection::vec(-200.0f32..200.0, 1..12)) {
            let tuning = Tuning::default();
            let stack = stack_with(&offsets, &tuning);
            let drift = stack.top_offset() - stack.base_offset();
            let width = stack.width(&tuning);
            prop_assert!((width.abs() - (drift.abs() + tuning.piece_width)).abs() < 1e-3);
            if drift != 0.0 {
                prop_assert_eq!(width.signum(), drift.signum());
            }
        }
    }
}
