use std::collections::VecDeque;

use crate::canvas::PixelBuffer;

/// Default undo depth.
pub const DEFAULT_MAX_HISTORY: usize = 50;

// ============================================================================
// HISTORY ENTRY - full-buffer snapshot
// ============================================================================

/// A deep copy of a buffer's bytes and dimensions at capture time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl HistoryEntry {
    pub fn capture(buffer: &PixelBuffer) -> Self {
        Self {
            pixels: buffer.snapshot(),
            width: buffer.width(),
            height: buffer.height(),
        }
    }

    /// Move this snapshot into `buffer`, replacing its size and contents.
    /// Panics if the stored bytes do not match the stored dimensions.
    pub fn restore_into(self, buffer: &mut PixelBuffer) {
        buffer.replace(self.pixels, self.width, self.height);
    }

    pub fn memory_size(&self) -> usize {
        self.pixels.len()
    }
}

// ============================================================================
// HISTORY MANAGER - bounded linear undo/redo
// ============================================================================

/// Two-stack snapshot history. Callers push *before* mutating the buffer.
#[derive(Debug)]
pub struct HistoryManager {
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: VecDeque<HistoryEntry>,
    max_history_size: usize,
    /// Running byte total across both stacks.
    total_memory: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl HistoryManager {
    /// `max_history_size` is clamped to at least 1.
    pub fn new(max_history_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_history_size: max_history_size.max(1),
            total_memory: 0,
        }
    }

    pub fn max_history_size(&self) -> usize {
        self.max_history_size
    }

    /// Change the cap, evicting the oldest entries if already over it.
    pub fn set_max_history_size(&mut self, max: usize) {
        self.max_history_size = max.max(1);
        self.prune();
    }

    /// Capture `canvas` onto the undo stack and drop any redo states.
    pub fn push_state(&mut self, canvas: &PixelBuffer) {
        for entry in self.redo_stack.drain(..) {
            self.total_memory = self.total_memory.saturating_sub(entry.memory_size());
        }

        let entry = HistoryEntry::capture(canvas);
        self.total_memory += entry.memory_size();
        self.undo_stack.push_back(entry);

        self.prune();
    }

    /// Step back one state. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self, canvas: &mut PixelBuffer) -> bool {
        let Some(entry) = self.undo_stack.pop_back() else {
            return false;
        };
        self.total_memory = self.total_memory.saturating_sub(entry.memory_size());

        let current = HistoryEntry::capture(canvas);
        self.total_memory += current.memory_size();
        self.redo_stack.push_back(current);

        entry.restore_into(canvas);
        true
    }

    /// Re-apply the most recently undone state. Returns `false` when there is
    /// nothing to redo.
    pub fn redo(&mut self, canvas: &mut PixelBuffer) -> bool {
        let Some(entry) = self.redo_stack.pop_back() else {
            return false;
        };
        self.total_memory = self.total_memory.saturating_sub(entry.memory_size());

        let current = HistoryEntry::capture(canvas);
        self.total_memory += current.memory_size();
        self.undo_stack.push_back(current);

        entry.restore_into(canvas);
        true
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

    /// Bytes held by both stacks (O(1) via cached total).
    pub fn memory_usage(&self) -> usize {
        self.total_memory
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.total_memory = 0;
    }

    /// Evict oldest undo entries beyond the cap.
    fn prune(&mut self) {
        while self.undo_stack.len() > self.max_history_size {
            if let Some(removed) = self.undo_stack.pop_front() {
                self.total_memory = self.total_memory.saturating_sub(removed.memory_size());
                crate::log_info!(
                    "History: evicted oldest {}×{} snapshot (cap {})",
                    removed.width,
                    removed.height,
                    self.max_history_size
                );
            }
        }
    }
}
