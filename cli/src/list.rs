use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};
use tasklist_core::Task;

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Done")]
    done: &'static str,
    #[tabled(rename = "Task")]
    text: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Date")]
    date: String,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        TaskRow {
            id: task.id.to_string(),
            done: if task.is_completed { "x" } else { "" },
            text: task.text.clone(),
            category: or_dash(&task.category),
            date: or_dash(&task.date),
        }
    }
}

fn or_dash(s: &str) -> String {
    if s.is_empty() {
        "-".to_string()
    } else {
        s.to_string()
    }
}

/// Renders tasks in the given (already derived) order.
pub fn render(tasks: &[Task]) -> String {
    let rows: Vec<TaskRow> = tasks.iter().map(TaskRow::from).collect();
    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(0..2)).with(Alignment::center()))
        .to_string()
}
