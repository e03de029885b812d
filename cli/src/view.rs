//! Plain-text rendering of a `TodoList`.

use std::fmt::Write;

use todo_sync::TodoList;

pub fn render(list: &TodoList) -> String {
    let mut out = String::new();
    if list.tasks().is_empty() {
        out.push_str("(no tasks)\n");
    }
    for (index, task) in list.tasks().iter().enumerate() {
        let mark = if task.completed { 'x' } else { ' ' };
        let number = index + 1;
        if list.editing_id() == Some(&task.id) {
            let text = list.editing_text().unwrap_or_default();
            let _ = writeln!(out, "{number:>3}. [{mark}] > {text}  (editing: save | cancel)");
        } else {
            let _ = writeln!(out, "{number:>3}. [{mark}] {}", task.text);
        }
    }
    if !list.draft_text().is_empty() {
        let _ = writeln!(out, "draft: {}", list.draft_text());
    }
    match list.in_flight() {
        0 => {}
        1 => out.push_str("(1 request in flight)\n"),
        n => {
            let _ = writeln!(out, "({n} requests in flight)");
        }
    }
    out
}
