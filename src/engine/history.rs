// ==========================================
// 课堂座位编排系统 - 布局历史栈 (撤销/重做)
// ==========================================
// 职责: 记录每一次会改变座位表的操作快照, 支持线性撤销/重做
// 规则:
// 1) 单一线性序列 + 一个游标, 不分叉
// 2) push 会丢弃游标之后的全部条目
// 3) 容量上限 100, 超出时淘汰最旧条目并同步回退游标
// 红线: 边界撤销/重做返回错误值, 不 panic
// ==========================================

use crate::domain::history::HistoryEntry;
use crate::domain::types::HistoryEntryType;
use std::collections::VecDeque;
use thiserror::Error;

/// 历史栈容量上限
pub const MAX_HISTORY_ENTRIES: usize = 100;

// ==========================================
// HistoryError - 历史栈边界错误
// ==========================================
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    #[error("没有可撤销的操作")]
    NothingToUndo,

    #[error("没有可重做的操作")]
    NothingToRedo,
}

impl HistoryError {
    /// 本地化提示文本
    pub fn message(&self) -> String {
        match self {
            HistoryError::NothingToUndo => crate::i18n::t("history.nothing_to_undo"),
            HistoryError::NothingToRedo => crate::i18n::t("history.nothing_to_redo"),
        }
    }
}

pub type HistoryResult<T> = Result<T, HistoryError>;

// ==========================================
// LayoutHistory - 布局历史栈
// ==========================================
#[derive(Debug, Clone)]
pub struct LayoutHistory {
    entries: VecDeque<HistoryEntry>,
    cursor: usize,
    capacity: usize,
}

impl LayoutHistory {
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY_ENTRIES)
    }

    /// 指定容量 (最小为 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            cursor: 0,
            capacity,
        }
    }

    /// 压入新快照
    ///
    /// 丢弃游标之后的条目, 追加到末尾并把游标移到新条目;
    /// 超出容量时淘汰最旧条目。
    pub fn push(&mut self, entry: HistoryEntry) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(entry);
        self.cursor = self.entries.len() - 1;

        while self.entries.len() > self.capacity {
            self.entries.pop_front();
            self.cursor = self.cursor.saturating_sub(1);
        }

        tracing::trace!(len = self.entries.len(), cursor = self.cursor, "历史快照入栈");
    }

    /// 撤销: 游标后退一步, 返回游标指向的条目
    pub fn undo(&mut self) -> HistoryResult<&HistoryEntry> {
        if !self.can_undo() {
            return Err(HistoryError::NothingToUndo);
        }
        self.cursor -= 1;
        Ok(&self.entries[self.cursor])
    }

    /// 重做: 游标前进一步, 返回游标指向的条目
    pub fn redo(&mut self) -> HistoryResult<&HistoryEntry> {
        if !self.can_redo() {
            return Err(HistoryError::NothingToRedo);
        }
        self.cursor += 1;
        Ok(&self.entries[self.cursor])
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// 清空历史
    pub fn reset(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 当前游标 (历史为空时为 0)
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.cursor)
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// 游标及之前最近一条指定类型的条目
    ///
    /// # 返回
    /// (条目下标, 条目)
    pub fn latest_of(&self, entry_type: HistoryEntryType) -> Option<(usize, &HistoryEntry)> {
        if self.entries.is_empty() {
            return None;
        }
        (0..=self.cursor)
            .rev()
            .find(|i| self.entries[*i].entry_type == entry_type)
            .map(|i| (i, &self.entries[i]))
    }
}

impl Default for LayoutHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(n: u32) -> HistoryEntry {
        HistoryEntry::new(HistoryEntryType::Layout, json!({ "n": n }))
    }

    fn n_of(entry: &HistoryEntry) -> u64 {
        entry.payload["n"].as_u64().unwrap()
    }

    #[test]
    fn test_empty_history_rejects_undo_redo() {
        let mut history = LayoutHistory::new();
        assert_eq!(history.undo().unwrap_err(), HistoryError::NothingToUndo);
        assert_eq!(history.redo().unwrap_err(), HistoryError::NothingToRedo);
        assert!(history.current().is_none());
    }

    #[test]
    fn test_undo_redo_walks_cursor() {
        let mut history = LayoutHistory::new();
        for n in 0..3 {
            history.push(entry(n));
        }
        assert_eq!(history.cursor(), 2);

        assert_eq!(n_of(history.undo().unwrap()), 1);
        assert_eq!(n_of(history.undo().unwrap()), 0);
        assert!(!history.can_undo());
        assert_eq!(history.undo().unwrap_err(), HistoryError::NothingToUndo);

        assert_eq!(n_of(history.redo().unwrap()), 1);
        assert_eq!(n_of(history.redo().unwrap()), 2);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_push_after_undo_discards_branch() {
        let mut history = LayoutHistory::new();
        for n in 0..5 {
            history.push(entry(n));
        }
        history.undo().unwrap();
        history.undo().unwrap();
        history.push(entry(99));

        assert_eq!(history.len(), 4);
        assert_eq!(history.redo().unwrap_err(), HistoryError::NothingToRedo);
        assert_eq!(n_of(history.current().unwrap()), 99);
    }

    #[test]
    fn test_cap_keeps_most_recent_entries() {
        let mut history = LayoutHistory::new();
        for n in 0..150 {
            history.push(entry(n));
        }

        assert_eq!(history.len(), MAX_HISTORY_ENTRIES);
        assert_eq!(history.cursor(), MAX_HISTORY_ENTRIES - 1);
        let kept: Vec<u64> = history.entries().map(n_of).collect();
        assert_eq!(kept, (50..150).collect::<Vec<u64>>());
    }

    #[test]
    fn test_cap_while_cursor_in_middle() {
        let mut history = LayoutHistory::with_capacity(3);
        for n in 0..3 {
            history.push(entry(n));
        }
        history.undo().unwrap();
        history.push(entry(10));
        history.push(entry(11));

        // [0,1,10,11] 超容量淘汰 0
        let kept: Vec<u64> = history.entries().map(n_of).collect();
        assert_eq!(kept, vec![1, 10, 11]);
        assert_eq!(history.cursor(), 2);
    }

    #[test]
    fn test_latest_of_respects_cursor() {
        let mut history = LayoutHistory::new();
        history.push(entry(0));
        history.push(HistoryEntry::new(HistoryEntryType::Options, json!({ "n": 1 })));
        history.push(entry(2));

        assert_eq!(history.latest_of(HistoryEntryType::Layout).map(|(i, _)| i), Some(2));
        history.undo().unwrap();
        let (idx, latest) = history.latest_of(HistoryEntryType::Layout).unwrap();
        assert_eq!((idx, n_of(latest)), (0, 0));
        assert!(history.latest_of(HistoryEntryType::StudentInput).is_none());
    }

    #[test]
    fn test_reset() {
        let mut history = LayoutHistory::new();
        history.push(entry(1));
        history.push(entry(2));
        history.reset();
        assert!(history.is_empty());
        assert_eq!(history.cursor(), 0);
        assert!(!history.can_undo());
    }
}
