//! Rendering of API results for the terminal.

use serde::Serialize;
use taskdeck_core::models::board::{Board, BoardWithColumns, Column};
use taskdeck_core::models::organization::{Organization, OrganizationMember};
use taskdeck_core::models::project::Project;
use taskdeck_core::models::task::Task;
use taskdeck_core::models::user::User;

use crate::error::CliError;

/// Prints either pretty JSON or one summary line per record.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    pub fn item<T: Serialize>(&self, value: &T, line: fn(&T) -> String) -> Result<(), CliError> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", line(value));
        }
        Ok(())
    }

    pub fn list<T: Serialize>(&self, values: &[T], line: fn(&T) -> String) -> Result<(), CliError> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(values)?);
        } else if values.is_empty() {
            println!("(none)");
        } else {
            for value in values {
                println!("{}", line(value));
            }
        }
        Ok(())
    }

    pub fn message(&self, text: &str) {
        if !self.json {
            println!("{text}");
        }
    }
}

pub fn user_line(user: &User) -> String {
    format!("{:>4}  {} <{}> ({})", user.id, user.display_name(), user.email, user.username)
}

pub fn org_line(org: &Organization) -> String {
    format!("{:>4}  {}", org.id, org.name)
}

pub fn member_line(member: &OrganizationMember) -> String {
    match &member.user {
        Some(user) => format!("{:>4}  {} ({})", member.user_id, user.display_name(), member.role),
        None => format!("{:>4}  ({})", member.user_id, member.role),
    }
}

pub fn project_line(project: &Project) -> String {
    format!(
        "{:>4}  {:<6} {} [{}]",
        project.id, project.key, project.name, project.status
    )
}

pub fn board_line(board: &Board) -> String {
    let default = if board.is_default { " (default)" } else { "" };
    format!("{:>4}  {}{default}", board.id, board.name)
}

fn column_line(column: &Column) -> String {
    match column.wip_limit {
        Some(limit) => format!("      - {} (wip {limit})", column.name),
        None => format!("      - {}", column.name),
    }
}

pub fn board_detail(board: &BoardWithColumns) -> String {
    let mut lines = vec![board_line(&board.board)];
    lines.extend(board.columns.iter().map(column_line));
    lines.join("\n")
}

pub fn task_line(task: &Task) -> String {
    let line = format!(
        "{:>4}  #{:<4} {} [{}, {}]",
        task.id, task.task_number, task.title, task.status, task.priority
    );
    if task.assignees.is_empty() {
        return line;
    }
    let names: Vec<&str> = task.assignees.iter().map(|u| u.display_name()).collect();
    format!("{line} @{}", names.join(", @"))
}
