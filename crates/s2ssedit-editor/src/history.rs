//! Undo/redo history with merge-on-push.

use crate::commands::{EditCommand, MergeResult};
use crate::error::{EditorError, EditorResult};
use s2ssedit_core::{ObjectFile, ObjectSet};
use std::collections::VecDeque;

/// Undo and redo stacks; the front of each deque is the most recent entry.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo_stack: VecDeque<EditCommand>,
    redo_stack: VecDeque<EditCommand>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `cmd` and applies it to `file`.
    ///
    /// The redo stack is discarded. If the most recent entry absorbs `cmd`
    /// it stays on top; if the two cancel out it is dropped. The command is
    /// applied in every case.
    pub fn do_action(&mut self, file: &mut ObjectFile, cmd: EditCommand) {
        self.redo_stack.clear();
        let result = match self.undo_stack.front_mut() {
            Some(top) => top.merge(&cmd),
            None => MergeResult::NoMerge,
        };
        cmd.apply(file, None);
        match result {
            MergeResult::NoMerge => self.undo_stack.push_front(cmd),
            MergeResult::DeleteSelf => {
                self.undo_stack.pop_front();
            }
            MergeResult::Merged => {}
        }
        tracing::debug!(
            undo = self.undo_stack.len(),
            ?result,
            "recorded command"
        );
    }

    /// Reverts the most recent command, restoring its selection.
    pub fn undo(&mut self, file: &mut ObjectFile, selection: &mut ObjectSet) -> EditorResult<()> {
        let cmd = self.undo_stack.pop_front().ok_or(EditorError::NothingToUndo)?;
        cmd.revert(file, Some(selection));
        self.redo_stack.push_front(cmd);
        Ok(())
    }

    /// Re-applies the most recently undone command.
    pub fn redo(&mut self, file: &mut ObjectFile, selection: &mut ObjectSet) -> EditorResult<()> {
        let cmd = self.redo_stack.pop_front().ok_or(EditorError::NothingToRedo)?;
        cmd.apply(file, Some(selection));
        self.undo_stack.push_front(cmd);
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// The command the next undo would revert.
    pub fn peek_undo(&self) -> Option<&EditCommand> {
        self.undo_stack.front()
    }

    pub fn peek_redo(&self) -> Option<&EditCommand> {
        self.redo_stack.front()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
