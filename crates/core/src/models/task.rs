//! Task entity model, DTOs and list filters.

use serde::{Deserialize, Serialize};

use super::decimal;
use super::label::Label;
use super::user::User;
use crate::types::{DbId, Timestamp};

/// Task priority levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

wire_enum!(TaskPriority {
    Low => "low",
    Medium => "medium",
    High => "high",
    Critical => "critical",
});

/// Task workflow status. New tasks start as [`TaskStatus::New`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    New,
    Active,
    OnHold,
    Done,
}

wire_enum!(TaskStatus {
    New => "new",
    Active => "active",
    OnHold => "on_hold",
    Done => "done",
});

/// Kind of work item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    #[default]
    Task,
    Bug,
    Feature,
    Epic,
}

wire_enum!(TaskType {
    Task => "task",
    Bug => "bug",
    Feature => "feature",
    Epic => "epic",
});

/// A task on a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: DbId,
    pub project_id: DbId,
    pub board_id: DbId,
    #[serde(default)]
    pub column_id: Option<DbId>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Per-project sequence number (`WEB-42` has `task_number == 42`).
    pub task_number: i32,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    #[serde(default)]
    pub story_points: Option<i32>,
    #[serde(default, deserialize_with = "decimal::deserialize_option")]
    pub estimated_hours: Option<f64>,
    #[serde(deserialize_with = "decimal::deserialize")]
    pub actual_hours: f64,
    pub position: i32,
    #[serde(default)]
    pub start_date: Option<Timestamp>,
    #[serde(default)]
    pub due_date: Option<Timestamp>,
    #[serde(default)]
    pub completed_at: Option<Timestamp>,
    #[serde(default)]
    pub creator_id: Option<DbId>,
    #[serde(default)]
    pub parent_task_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub creator: Option<User>,
    #[serde(default)]
    pub assignees: Vec<User>,
    #[serde(default)]
    pub labels: Vec<Label>,
}

impl Task {
    /// Whether the user with `user_id` is among the assignees.
    pub fn is_assigned_to(&self, user_id: DbId) -> bool {
        self.assignees.iter().any(|u| u.id == user_id)
    }
}

/// DTO for creating a new task.
///
/// Only `project_id`, `board_id` and `title` are required; the server
/// defaults priority to medium, type to task and status to new.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTask {
    pub project_id: DbId,
    pub board_id: DbId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_id: Option<DbId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_points: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_task_id: Option<DbId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignee_ids: Vec<DbId>,
}

/// DTO for `PATCH /tasks/{id}`. All fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_points: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_id: Option<DbId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
}

/// Body of `PUT /tasks/{id}/move`: place the task in a column at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMove {
    pub column_id: DbId,
    pub position: i32,
}

/// Query filters for `GET /tasks`.
///
/// Every filter is optional and evaluated server-side; only the filters
/// that are set are sent. An empty filter set lists every task visible to
/// the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<DbId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_id: Option<DbId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_id: Option<DbId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<DbId>,
}

impl TaskFilters {
    /// Returns `true` if no filter is set.
    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }

    /// The set filters as `(name, value)` query pairs, in a fixed order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = self.project_id {
            pairs.push(("project_id", id.to_string()));
        }
        if let Some(id) = self.board_id {
            pairs.push(("board_id", id.to_string()));
        }
        if let Some(id) = self.column_id {
            pairs.push(("column_id", id.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(priority) = self.priority {
            pairs.push(("priority", priority.as_str().to_string()));
        }
        if let Some(id) = self.assignee_id {
            pairs.push(("assignee_id", id.to_string()));
        }
        pairs
    }

    /// Whether `task` satisfies every set filter.
    ///
    /// The server is authoritative; this mirrors its semantics for callers
    /// that need to check a task they already hold.
    pub fn matches(&self, task: &Task) -> bool {
        self.project_id.map_or(true, |id| task.project_id == id)
            && self.board_id.map_or(true, |id| task.board_id == id)
            && self.column_id.map_or(true, |id| task.column_id == Some(id))
            && self.status.map_or(true, |s| task.status == s)
            && self.priority.map_or(true, |p| task.priority == p)
            && self.assignee_id.map_or(true, |id| task.is_assigned_to(id))
    }
}
