use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A transient, dismissible message for the user
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub id: Uuid,
    pub level: NoticeLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            level,
            message: message.into(),
            created_at: Utc::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }
}

/// Bounded queue of notices; the oldest is dropped when full
#[derive(Debug, Clone)]
pub struct NoticeQueue {
    notices: VecDeque<Notice>,
    capacity: usize,
}

impl NoticeQueue {
    pub const DEFAULT_CAPACITY: usize = 16;

    pub fn new(capacity: usize) -> Self {
        Self {
            notices: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, notice: Notice) -> Uuid {
        if self.notices.len() == self.capacity {
            self.notices.pop_front();
        }
        let id = notice.id;
        self.notices.push_back(notice);
        id
    }

    /// Removes a notice; false when it was already gone
    pub fn dismiss(&mut self, id: Uuid) -> bool {
        match self.notices.iter().position(|notice| notice.id == id) {
            Some(position) => self.notices.remove(position).is_some(),
            None => false,
        }
    }

    pub fn drain(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}

impl Default for NoticeQueue {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oldest_dropped_when_full() {
        let mut queue = NoticeQueue::new(2);
        queue.push(Notice::error("first"));
        queue.push(Notice::error("second"));
        queue.push(Notice::error("third"));

        let messages: Vec<&str> = queue.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["second", "third"]);
    }

    #[test]
    fn test_dismiss() {
        let mut queue = NoticeQueue::default();
        let id = queue.push(Notice::error("Could not move stack"));
        queue.push(Notice::new(NoticeLevel::Info, "Saved"));

        assert!(queue.dismiss(id));
        assert!(!queue.dismiss(id));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_drain_empties_queue() {
        let mut queue = NoticeQueue::default();
        queue.push(Notice::error("a"));
        queue.push(Notice::error("b"));

        assert_eq!(queue.drain().len(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_zero_capacity_still_keeps_latest() {
        let mut queue = NoticeQueue::new(0);
        queue.push(Notice::error("a"));
        queue.push(Notice::error("b"));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.iter().next().unwrap().message, "b");
    }
}
