use std::cmp::Reverse;

use serde::Deserialize;
use serde::Serialize;

pub type NameHistory = Vec<NameHistoryElement>;


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameHistoryElement {

    pub name: String,

    /// Epoch milliseconds; absent on the first name an account had.
    #[serde(rename = "changedToAt")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed_to_at: Option<i64>,
}

impl NameHistoryElement {

    fn sort_key(&self) -> i64 {
        self.changed_to_at.unwrap_or(0)
    }
}

/// Newest first; entries without a timestamp count as epoch 0.
pub fn sort_newest_first(history: &mut NameHistory) {
    history.sort_by_key(|e| Reverse(e.sort_key()));
}
