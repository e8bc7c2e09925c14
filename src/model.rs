use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TodoError};
use crate::task_id::TaskId;

/// Owner namespace used by the command line. The store itself accepts any owner.
pub const DEFAULT_OWNER: &str = "SELF";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub done: bool,
    pub due: NaiveDate,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub effort: f64,
}

/// Fields a generic update may replace. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub done: Option<bool>,
    pub due: Option<NaiveDate>,
    pub tags: Option<Vec<String>>,
    pub effort: Option<f64>,
}

impl Task {
    pub fn new(id: TaskId, title: impl Into<String>, due: NaiveDate) -> Self {
        Self {
            id,
            title: title.into(),
            done: false,
            due,
            tags: Vec::new(),
            effort: 0.0,
        }
    }

    /// Reject values no stored task may hold.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(TodoError::InvalidTask("title must not be empty".into()));
        }
        validate_effort(self.effort)
    }

    /// The record with every present patch field applied. The id never changes.
    pub fn merged(&self, patch: &TaskPatch) -> Task {
        let mut task = self.clone();
        if let Some(ref title) = patch.title {
            task.title = title.clone();
        }
        if let Some(done) = patch.done {
            task.done = done;
        }
        if let Some(due) = patch.due {
            task.due = due;
        }
        if let Some(ref tags) = patch.tags {
            task.tags = tags.clone();
        }
        if let Some(effort) = patch.effort {
            task.effort = effort;
        }
        task
    }
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }
}

pub fn validate_effort(effort: f64) -> Result<()> {
    if !effort.is_finite() || effort < 0.0 {
        return Err(TodoError::InvalidTask(format!(
            "effort must be a non-negative number of hours (got {effort})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Task {
        let mut task = Task::new(
            "0192a1b2c3d400000001".parse().unwrap(),
            "Water plants",
            day(2024, 1, 1),
        );
        task.tags = vec!["home".into(), "home".into(), "garden".into()];
        task.effort = 0.5;
        task
    }

    #[test]
    fn merged_applies_only_present_fields() {
        let task = sample();
        let patch = TaskPatch {
            due: Some(day(2024, 2, 1)),
            done: Some(true),
            ..TaskPatch::default()
        };
        let merged = task.merged(&patch);
        assert_eq!(merged.id, task.id);
        assert_eq!(merged.due, day(2024, 2, 1));
        assert!(merged.done);
        assert_eq!(merged.tags, task.tags);
        assert_eq!(merged.effort, task.effort);
        assert_eq!(merged.title, task.title);
    }

    #[test]
    fn validate_rejects_blank_title() {
        let mut task = sample();
        task.title = "   ".into();
        assert!(matches!(task.validate(), Err(TodoError::InvalidTask(_))));
    }

    #[test]
    fn validate_rejects_negative_and_nan_effort() {
        let mut task = sample();
        task.effort = -1.0;
        assert!(task.validate().is_err());
        task.effort = f64::NAN;
        assert!(task.validate().is_err());
        task.effort = 0.0;
        assert!(task.validate().is_ok());
    }

    #[test]
    fn tags_keep_duplicates_and_order() {
        let json = serde_json::to_string(&sample()).unwrap();
        let parsed: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.tags, vec!["home", "home", "garden"]);
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(TaskPatch::default().is_empty());
        let patch = TaskPatch {
            effort: Some(2.0),
            ..TaskPatch::default()
        };
        assert!(!patch.is_empty());
    }
}
