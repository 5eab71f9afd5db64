use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of a task, unique within one collection.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(TaskId)
    }
}

// Field names follow the stored `todos` array, which was first written by the
// browser app (`isCompleted`). Older records have no `date` at all, and an
// explicit `null` reads as the empty value.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_completed: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Task {
    pub fn new(id: TaskId, text: String, category: String, date: String) -> Self {
        Self {
            id,
            text,
            category,
            date,
            is_completed: false,
        }
    }

    pub fn toggle(&mut self) {
        self.is_completed = !self.is_completed;
    }
}

/// The `(text, category, date)` triple produced by a creation form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub text: String,
    pub category: String,
    pub date: String,
}

impl TaskDraft {
    pub fn new(text: impl Into<String>, category: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
            date: date.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_is_active() {
        let task = Task::new(TaskId(1), "Buy milk".to_string(), "Shopping".to_string(), String::new());
        assert!(!task.is_completed);
    }

    #[test]
    fn test_serialized_field_names() {
        let task = Task::new(TaskId(7), "Read".to_string(), "Home".to_string(), "2024-01-01".to_string());
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["isCompleted"], false);
        assert_eq!(json["category"], "Home");
    }

    #[test]
    fn test_legacy_record_without_date() {
        let raw = r#"{"id":512,"text":"Estudar","category":"Estudos","isCompleted":true}"#;
        let task: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(task.id, TaskId(512));
        assert_eq!(task.date, "");
        assert!(task.is_completed);
    }

    #[test]
    fn test_null_fields_read_as_empty() {
        let raw = r#"{"id":3,"text":"Pagar conta","category":null,"date":null,"isCompleted":null}"#;
        let task: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(task.category, "");
        assert_eq!(task.date, "");
        assert!(!task.is_completed);
    }

    #[test]
    fn test_parse_task_id() {
        assert_eq!(" 42 ".parse::<TaskId>().unwrap(), TaskId(42));
        assert!("abc".parse::<TaskId>().is_err());
    }
}
