use std::path::Path;

use chrono::NaiveDate;
use log::debug;

use crate::error::Result;
use crate::input;
use crate::model::{DEFAULT_OWNER, Task};
use crate::output::{self, Format};
use crate::store::repo::Repo;
use crate::task_id::TaskId;

pub struct NewTask {
    pub words: Vec<String>,
    pub due: Option<NaiveDate>,
    pub tags: Vec<String>,
    pub effort: Option<f64>,
    pub done: bool,
}

pub fn run(db_path: &Path, new: NewTask, format: Format) -> Result<()> {
    let task = build(new)?;
    let repo = Repo::open(db_path)?;
    repo.tasks().create(DEFAULT_OWNER, &task)?;
    debug!("event=cli_add id={}", task.id);
    output::print_task(&task, format)
}

fn build(new: NewTask) -> Result<Task> {
    let id = TaskId::generate()?;
    let due = new.due.unwrap_or_else(input::today);
    let mut task = Task::new(id, input::title_from_words(&new.words), due);
    task.tags = new.tags.iter().flat_map(|t| input::parse_tags(t)).collect();
    task.done = new.done;
    if let Some(effort) = new.effort {
        task.effort = effort;
    }
    task.validate()?;
    Ok(task)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_defaults_due_to_today_and_capitalizes() {
        let task = build(NewTask {
            words: vec!["water".into(), "plants".into()],
            due: None,
            tags: vec!["#home,#garden".into()],
            effort: None,
            done: false,
        })
        .unwrap();
        assert_eq!(task.title, "Water plants");
        assert_eq!(task.due, input::today());
        assert_eq!(task.tags, vec!["home", "garden"]);
        assert_eq!(task.effort, 0.0);
    }

    #[test]
    fn build_rejects_blank_title() {
        let err = build(NewTask {
            words: vec!["  ".into()],
            due: None,
            tags: vec![],
            effort: None,
            done: false,
        })
        .unwrap_err();
        assert_eq!(err.code(), "invalid_task");
    }
}
