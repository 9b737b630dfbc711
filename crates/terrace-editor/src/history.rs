//! Grouped undo/redo.
//!
//! Actions run as soon as they are pushed and collect in an open group. A
//! commit closes the group onto the undo stack and truncates redo history.

use std::collections::VecDeque;

use terrace_core::constants::DEFAULT_HISTORY_LIMIT;

use crate::action::EditorAction;

/// Actions applied and reverted together.
pub struct ActionGroup<Ctx> {
    actions: Vec<Box<dyn EditorAction<Ctx>>>,
}

impl<Ctx> ActionGroup<Ctx> {
    fn exec(&self, ctx: &mut Ctx) {
        for action in &self.actions {
            action.exec(ctx);
        }
    }

    fn revert(&self, ctx: &mut Ctx) {
        for action in self.actions.iter().rev() {
            action.revert(ctx);
        }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Labels of the grouped actions, in execution order.
    pub fn labels(&self) -> Vec<&'static str> {
        self.actions.iter().map(|a| a.label()).collect()
    }
}

/// Change notifications, drained by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryEvent {
    Committed { actions: usize },
    Undone { actions: usize },
    Redone { actions: usize },
    Discarded { actions: usize },
}

pub struct EditorHistory<Ctx> {
    done: Vec<ActionGroup<Ctx>>,
    todo: VecDeque<ActionGroup<Ctx>>,
    pending: Vec<Box<dyn EditorAction<Ctx>>>,
    limit: usize,
    events: Vec<HistoryEvent>,
}

impl<Ctx> Default for EditorHistory<Ctx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ctx> EditorHistory<Ctx> {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// History keeping at most `limit` undoable groups.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            done: Vec::new(),
            todo: VecDeque::new(),
            pending: Vec::new(),
            limit: limit.max(1),
            events: Vec::new(),
        }
    }

    /// Execute `action` and add it to the open group.
    pub fn push(&mut self, action: Box<dyn EditorAction<Ctx>>, ctx: &mut Ctx) {
        action.exec(ctx);
        self.pending.push(action);
    }

    /// Close the open group, optionally executing one last action into it.
    /// Returns false when there was nothing to commit.
    pub fn commit(&mut self, last: Option<Box<dyn EditorAction<Ctx>>>, ctx: &mut Ctx) -> bool {
        if let Some(action) = last {
            self.push(action, ctx);
        }
        if self.pending.is_empty() {
            return false;
        }
        let group = ActionGroup {
            actions: std::mem::take(&mut self.pending),
        };
        let actions = group.len();
        self.done.push(group);
        if self.done.len() > self.limit {
            let excess = self.done.len() - self.limit;
            self.done.drain(..excess);
        }
        if !self.todo.is_empty() {
            log::debug!("commit drops {} redo groups", self.todo.len());
            self.todo.clear();
        }
        self.events.push(HistoryEvent::Committed { actions });
        true
    }

    /// Revert the most recent committed group.
    pub fn undo(&mut self, ctx: &mut Ctx) -> bool {
        let Some(group) = self.done.pop() else {
            return false;
        };
        group.revert(ctx);
        self.events.push(HistoryEvent::Undone {
            actions: group.len(),
        });
        self.todo.push_front(group);
        true
    }

    /// Re-apply the most recently undone group.
    pub fn redo(&mut self, ctx: &mut Ctx) -> bool {
        let Some(group) = self.todo.pop_front() else {
            return false;
        };
        group.exec(ctx);
        self.events.push(HistoryEvent::Redone {
            actions: group.len(),
        });
        self.done.push(group);
        true
    }

    /// Revert and drop the open group.
    pub fn discard(&mut self, ctx: &mut Ctx) -> bool {
        if self.pending.is_empty() {
            return false;
        }
        let group = ActionGroup {
            actions: std::mem::take(&mut self.pending),
        };
        group.revert(ctx);
        self.events.push(HistoryEvent::Discarded {
            actions: group.len(),
        });
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.done.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.todo.is_empty()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.done.len()
    }

    pub fn redo_len(&self) -> usize {
        self.todo.len()
    }

    /// The group `undo` would revert next.
    pub fn last_committed(&self) -> Option<&ActionGroup<Ctx>> {
        self.done.last()
    }

    /// Forget all history without touching the context. The open group is
    /// dropped as is; its effects stay applied.
    pub fn clear(&mut self) {
        self.done.clear();
        self.todo.clear();
        self.pending.clear();
    }

    pub fn drain_events(&mut self) -> Vec<HistoryEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Adds `delta` to a counter; records every call.
    struct Add {
        delta: i32,
    }

    #[derive(Default)]
    struct Ctx {
        value: i32,
        log: Vec<String>,
    }

    impl EditorAction<Ctx> for Add {
        fn exec(&self, ctx: &mut Ctx) {
            ctx.value += self.delta;
            ctx.log.push(format!("+{}", self.delta));
        }

        fn revert(&self, ctx: &mut Ctx) {
            ctx.value -= self.delta;
            ctx.log.push(format!("-{}", self.delta));
        }
    }

    fn add(delta: i32) -> Box<dyn EditorAction<Ctx>> {
        Box::new(Add { delta })
    }

    #[test]
    fn test_push_executes_immediately() {
        let mut ctx = Ctx::default();
        let mut history = EditorHistory::new();
        history.push(add(2), &mut ctx);
        assert_eq!(ctx.value, 2);
        assert!(history.has_pending());
        assert!(!history.can_undo());
    }

    #[test]
    fn test_commit_empty_is_noop() {
        let mut ctx = Ctx::default();
        let mut history: EditorHistory<Ctx> = EditorHistory::new();
        assert!(!history.commit(None, &mut ctx));
        assert!(history.drain_events().is_empty());
    }

    #[test]
    fn test_commit_with_final_action() {
        let mut ctx = Ctx::default();
        let mut history = EditorHistory::new();
        assert!(history.commit(Some(add(5)), &mut ctx));
        assert_eq!(ctx.value, 5);
        assert_eq!(history.drain_events(), vec![HistoryEvent::Committed { actions: 1 }]);
    }

    #[test]
    fn test_group_reverts_in_reverse_order() {
        let mut ctx = Ctx::default();
        let mut history = EditorHistory::new();
        history.push(add(1), &mut ctx);
        history.push(add(2), &mut ctx);
        history.commit(Some(add(3)), &mut ctx);
        ctx.log.clear();

        assert!(history.undo(&mut ctx));
        assert_eq!(ctx.value, 0);
        assert_eq!(ctx.log, vec!["-3", "-2", "-1"]);

        ctx.log.clear();
        assert!(history.redo(&mut ctx));
        assert_eq!(ctx.value, 6);
        assert_eq!(ctx.log, vec!["+1", "+2", "+3"]);
    }

    #[test]
    fn test_undo_redo_on_empty_are_noops() {
        let mut ctx = Ctx::default();
        let mut history: EditorHistory<Ctx> = EditorHistory::new();
        assert!(!history.undo(&mut ctx));
        assert!(!history.redo(&mut ctx));
        assert_eq!(ctx.value, 0);
    }

    #[test]
    fn test_undo_all_then_redo_all_restores() {
        let mut ctx = Ctx::default();
        let mut history = EditorHistory::new();
        for d in [1, 10, 100] {
            history.commit(Some(add(d)), &mut ctx);
        }
        while history.undo(&mut ctx) {}
        assert_eq!(ctx.value, 0);
        while history.redo(&mut ctx) {}
        assert_eq!(ctx.value, 111);
        assert_eq!(history.undo_len(), 3);
    }

    #[test]
    fn test_redo_front_is_most_recent_undo() {
        let mut ctx = Ctx::default();
        let mut history = EditorHistory::new();
        history.commit(Some(add(1)), &mut ctx);
        history.commit(Some(add(10)), &mut ctx);
        history.undo(&mut ctx);
        history.undo(&mut ctx);
        history.redo(&mut ctx);
        assert_eq!(ctx.value, 1);
    }

    #[test]
    fn test_commit_after_undo_truncates_redo() {
        let mut ctx = Ctx::default();
        let mut history = EditorHistory::new();
        history.commit(Some(add(1)), &mut ctx);
        history.undo(&mut ctx);
        history.push(add(7), &mut ctx);
        history.commit(None, &mut ctx);
        assert!(!history.can_redo());
        assert!(!history.redo(&mut ctx));
        assert_eq!(ctx.value, 7);
    }

    #[test]
    fn test_discard_reverts_pending() {
        let mut ctx = Ctx::default();
        let mut history = EditorHistory::new();
        history.commit(Some(add(1)), &mut ctx);
        history.push(add(4), &mut ctx);
        history.push(add(5), &mut ctx);
        assert!(history.discard(&mut ctx));
        assert_eq!(ctx.value, 1);
        assert!(!history.has_pending());
        assert_eq!(history.undo_len(), 1);
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut ctx = Ctx::default();
        let mut history = EditorHistory::with_limit(2);
        for d in [1, 2, 3] {
            history.commit(Some(add(d)), &mut ctx);
        }
        while history.undo(&mut ctx) {}
        // The first group fell off the stack and stays applied.
        assert_eq!(ctx.value, 1);
    }
}
