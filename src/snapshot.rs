// Persisted snapshot encoding for the task list

use crate::models::Task;
use eyre::{Context, Result};

/// Key the task list snapshot is stored under
pub const TASKS_KEY: &str = "tasks";

/// Serialize the whole list as a JSON array
pub fn encode(tasks: &[Task]) -> Result<String> {
    serde_json::to_string(tasks).context("Failed to serialize task list")
}

/// Parse a stored snapshot back into a task list
pub fn decode(raw: &str) -> Result<Vec<Task>> {
    serde_json::from_str(raw).context("Stored task list is not valid task data")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let tasks = vec![Task::new("Buy milk", "")];
        let raw = encode(&tasks).unwrap();
        assert_eq!(raw, r#"[{"name":"Buy milk","description":"","completed":false}]"#);
    }

    #[test]
    fn test_encode_empty() {
        assert_eq!(encode(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_round_trip_preserves_order_and_duplicates() {
        let tasks = vec![
            Task::new("b", "second"),
            Task::new("a", "first"),
            Task::new("a", "first"),
            Task::new("ünïcode ✓", "line\nbreak \"quoted\""),
        ];
        let decoded = decode(&encode(&tasks).unwrap()).unwrap();
        assert_eq!(decoded, tasks);
    }

    #[test]
    fn test_decode_accepts_completed_true() {
        let decoded = decode(r#"[{"name":"done","description":"x","completed":true}]"#).unwrap();
        assert!(decoded[0].completed);
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let decoded = decode(r#"[{"name":"n","description":"d","completed":false,"extra":1}]"#).unwrap();
        assert_eq!(decoded, vec![Task::new("n", "d")]);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(decode("{malformed json}").is_err());
        assert!(decode(r#"{"name":"not a list"}"#).is_err());
        assert!(decode(r#"[{"name":"missing fields"}]"#).is_err());
    }
}
