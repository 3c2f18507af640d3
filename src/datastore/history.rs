//! Bounded action history.
//!
//! A LIFO stack of [`Action`]s with a capacity fixed at construction. Pushing
//! onto a full history and popping an empty one are reported as errors and
//! leave the stack untouched; nothing is ever evicted.

use super::item::{check_len, ItemId};
use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

pub const MAX_STACK_SIZE: usize = 100;

pub const MAX_ACTION_TYPE_LEN: usize = 49;
pub const MAX_ACTION_ITEM_NAME_LEN: usize = 99;

/// Well-known action tags.
pub mod action_type {
    pub const ADD_LOST_ITEM: &str = "ADD_LOST_ITEM";
    pub const ADD_FOUND_ITEM: &str = "ADD_FOUND_ITEM";
    pub const UPDATE_ITEM: &str = "UPDATE_ITEM";
    pub const DELETE_ITEM: &str = "DELETE_ITEM";
    pub const CLAIM_ITEM: &str = "CLAIM_ITEM";
    pub const MATCH_ITEMS: &str = "MATCH_ITEMS";
    pub const CLAIM_INITIATED: &str = "CLAIM_INITIATED";
    pub const CLAIM_APPROVED: &str = "CLAIM_APPROVED";
    pub const CLAIM_REJECTED: &str = "CLAIM_REJECTED";
    pub const ITEM_CLAIMED: &str = "ITEM_CLAIMED";
    pub const SEARCH: &str = "SEARCH";
    pub const VIEW_ITEM: &str = "VIEW_ITEM";
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: String,
    /// Zero when the action is not tied to an item.
    pub item_id: ItemId,
    pub item_name: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u128,
}

impl Action {
    pub fn new(
        kind: impl Into<String>,
        item_id: ItemId,
        item_name: impl Into<String>,
    ) -> Result<Self> {
        Self::with_timestamp(kind, item_id, item_name, now_millis())
    }

    /// Builds an action stamped with a caller-supplied time.
    pub fn with_timestamp(
        kind: impl Into<String>,
        item_id: ItemId,
        item_name: impl Into<String>,
        timestamp: u128,
    ) -> Result<Self> {
        let action = Action {
            kind: kind.into(),
            item_id,
            item_name: item_name.into(),
            timestamp,
        };
        check_len("action type", &action.kind, MAX_ACTION_TYPE_LEN)?;
        check_len("action item name", &action.item_name, MAX_ACTION_ITEM_NAME_LEN)?;
        Ok(action)
    }
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or(0)
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} (ID:{})]", self.kind, self.item_id)
    }
}

#[derive(Debug)]
pub struct ActionHistory {
    items: Vec<Action>,
    capacity: usize,
}

impl ActionHistory {
    /// History holding at most [`MAX_STACK_SIZE`] actions.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            capacity: MAX_STACK_SIZE,
        }
    }

    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(CatalogError::InvalidCapacity);
        }
        Ok(Self {
            items: Vec::new(),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    /// Index of the most recent action, `-1` when empty.
    pub fn top(&self) -> isize {
        self.items.len() as isize - 1
    }

    pub fn push(&mut self, action: Action) -> Result<()> {
        if self.is_full() {
            warn!(kind = %action.kind, capacity = self.capacity, "action history is full");
            return Err(CatalogError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        debug!(
            kind = %action.kind,
            item_id = action.item_id,
            size = self.items.len() + 1,
            "pushed action"
        );
        self.items.push(action);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Action> {
        match self.items.pop() {
            Some(action) => {
                debug!(kind = %action.kind, size = self.items.len(), "popped action");
                Ok(action)
            }
            None => {
                warn!("action history is empty");
                Err(CatalogError::Underflow)
            }
        }
    }

    pub fn peek(&self) -> Option<&Action> {
        self.items.last()
    }

    /// Pops the most recent action so the caller can reverse it.
    pub fn undo(&mut self) -> Result<Action> {
        let action = self.pop()?;
        info!(kind = %action.kind, item_id = action.item_id, "undoing action");
        Ok(action)
    }

    /// Iterates from the most recent action down to the oldest.
    pub fn iter(&self) -> impl Iterator<Item = &Action> + '_ {
        self.items.iter().rev()
    }

    /// Snapshot of every action, oldest first.
    pub fn history(&self) -> Vec<Action> {
        self.items.clone()
    }

    /// The last `n` actions, oldest first.
    pub fn last_n(&self, n: usize) -> &[Action] {
        let start = self.items.len().saturating_sub(n);
        &self.items[start..]
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl Default for ActionHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActionHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "=== Action History is Empty ===");
        }
        writeln!(
            f,
            "=== Action History (Size: {}/{}) ===",
            self.len(),
            self.capacity
        )?;
        write!(f, "Top -> ")?;
        for (position, action) in self.iter().enumerate() {
            if position > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{action}")?;
        }
        write!(f, "\n========================")
    }
}
