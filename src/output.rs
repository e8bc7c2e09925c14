use std::collections::BTreeMap;

use chrono::NaiveDate;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;

use crate::error::Result;
use crate::model::Task;
use crate::task_id::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Pretty,
}

/// Which scan produced a listing; decides the heading and row layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListView {
    Pending,
    ByDate(NaiveDate),
    All,
}

#[derive(Serialize)]
struct LabelledTask<'a> {
    label: String,
    #[serde(flatten)]
    task: &'a Task,
}

/// Labels `1..=n` for a listing, in display order.
pub fn listing_labels(tasks: &[Task]) -> BTreeMap<String, TaskId> {
    tasks
        .iter()
        .enumerate()
        .map(|(i, task)| ((i + 1).to_string(), task.id.clone()))
        .collect()
}

pub fn print_task(task: &Task, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(task)?),
        Format::Pretty => print!("{}", render_task(task)),
    }
    Ok(())
}

pub fn render_task(task: &Task) -> String {
    format!(
        "\nTask   : {}\nID     : {}\nDue    : {}\nDone   : {}\nEffort : {:.1} hours\nTags   : {}\n\n",
        task.title,
        task.id,
        task.due.format("%-d %b %Y"),
        task.done,
        task.effort,
        task.tags.join(",")
    )
}

pub fn print_listing(view: ListView, tasks: &[Task], format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let rows: Vec<LabelledTask<'_>> = tasks
                .iter()
                .enumerate()
                .map(|(i, task)| LabelledTask {
                    label: (i + 1).to_string(),
                    task,
                })
                .collect();
            println!("{}", serde_json::to_string(&rows)?);
        }
        Format::Pretty => print!("{}", render_listing(view, tasks)),
    }
    Ok(())
}

pub fn render_listing(view: ListView, tasks: &[Task]) -> String {
    let heading = match view {
        ListView::Pending => "Pending".to_string(),
        ListView::ByDate(date) => date.format("%Y-%m-%d").to_string(),
        ListView::All => "All".to_string(),
    };

    let mut out = format!("\n{}\n{}\n", heading.bold(), "-".repeat(heading.len()));
    for (i, task) in tasks.iter().enumerate() {
        out.push_str(&listing_row(view, i + 1, task));
    }
    out.push('\n');

    if let ListView::ByDate(_) = view {
        let completed = tasks.iter().filter(|t| t.done).count();
        let total_effort: f64 = tasks.iter().map(|t| t.effort).sum();
        out.push_str(&format!(
            "{} / {} Todos pending\n{total_effort:.1} hours of total effort\n\n",
            tasks.len() - completed,
            tasks.len()
        ));
    }
    out
}

fn listing_row(view: ListView, label: usize, task: &Task) -> String {
    match view {
        ListView::Pending => format!("{label}. {} - {}\n", task.due.format("%d %b"), task.title),
        ListView::ByDate(_) => format!(
            "{label}. {} ({:.1}) {}\n",
            check_box(task.done),
            task.effort,
            task.title
        ),
        ListView::All => format!(
            "{label}. {} {} - {}\n",
            check_box(task.done),
            task.due.format("%d %b"),
            task.title
        ),
    }
}

fn check_box(done: bool) -> String {
    if done {
        "[X]".green().to_string()
    } else {
        "[ ]".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tasks() -> Vec<Task> {
        let mut a = Task::new("0192a1b2c3d400000001".parse().unwrap(), "Alpha", day(2024, 1, 2));
        a.effort = 1.5;
        let mut b = Task::new("0192a1b2c3d400000002".parse().unwrap(), "Beta", day(2024, 1, 2));
        b.done = true;
        b.effort = 1.0;
        vec![a, b]
    }

    #[test]
    fn labels_count_from_one_in_display_order() {
        let tasks = tasks();
        let labels = listing_labels(&tasks);
        assert_eq!(labels.len(), 2);
        assert_eq!(labels["1"], tasks[0].id);
        assert_eq!(labels["2"], tasks[1].id);
    }

    #[test]
    fn pending_listing_shows_due_and_title() {
        colored::control::set_override(false);
        let text = render_listing(ListView::Pending, &tasks());
        assert!(text.contains("Pending\n-------\n"));
        assert!(text.contains("1. 02 Jan - Alpha"));
        assert!(!text.contains("Todos pending"));
    }

    #[test]
    fn date_listing_has_summary() {
        colored::control::set_override(false);
        let text = render_listing(ListView::ByDate(day(2024, 1, 2)), &tasks());
        assert!(text.contains("2024-01-02\n----------\n"));
        assert!(text.contains("1. [ ] (1.5) Alpha"));
        assert!(text.contains("2. [X] (1.0) Beta"));
        assert!(text.contains("1 / 2 Todos pending"));
        assert!(text.contains("2.5 hours of total effort"));
    }

    #[test]
    fn all_listing_marks_status_and_has_no_summary() {
        colored::control::set_override(false);
        let text = render_listing(ListView::All, &tasks());
        assert!(text.contains("All\n---\n"));
        assert!(text.contains("1. [ ] 02 Jan - Alpha\n"));
        assert!(text.contains("2. [X] 02 Jan - Beta\n"));
        assert!(!text.contains("hours of total effort"));
    }

    #[test]
    fn task_block_lists_fields() {
        let mut task = tasks().remove(0);
        task.tags = vec!["a".into(), "b".into()];
        let text = render_task(&task);
        assert!(text.contains("Task   : Alpha"));
        assert!(text.contains("Due    : 2 Jan 2024"));
        assert!(text.contains("Effort : 1.5 hours"));
        assert!(text.contains("Tags   : a,b"));
    }
}
