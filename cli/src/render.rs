//! Plain-text rendering of todos and the board.

use std::fmt::Write;

use todo_core::{Filter, Todo, TodoBoard};

pub fn todo_line(index: usize, todo: &Todo) -> String {
    let mark = if todo.is_completed { 'x' } else { ' ' };
    let mut line = format!("{index:>3}. [{mark}] {}", todo.title);
    if let Some(description) = todo.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = write!(line, " - {description}");
    }
    line
}

pub fn todo_detail(todo: &Todo) -> String {
    format!(
        "id:          {}\ntitle:       {}\ndescription: {}\ncompleted:   {}\ncreated:     {}",
        todo.id,
        todo.title,
        todo.description.as_deref().unwrap_or("-"),
        if todo.is_completed { "yes" } else { "no" },
        todo.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

pub fn board(board: &TodoBoard, filter: Filter) -> String {
    let mut out = String::new();
    if let Some(error) = board.error() {
        let _ = writeln!(out, "{error}");
    }
    if board.is_loading() {
        let _ = writeln!(out, "Loading...");
    }
    let visible = board.visible(filter);
    if visible.is_empty() {
        let _ = writeln!(out, "No TODO items found.");
    }
    for (i, todo) in visible.iter().enumerate() {
        let _ = writeln!(out, "{}", todo_line(i + 1, todo));
    }
    let _ = write!(out, "{}", board.summary());
    out
}

pub fn filter_name(filter: Filter) -> &'static str {
    match filter {
        Filter::All => "all",
        Filter::Completed => "completed",
        Filter::Incomplete => "incomplete",
    }
}
