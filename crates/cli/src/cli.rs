//! Command-line argument parsing using clap derive macros.

use clap::{Args, Parser, Subcommand};
use taskdeck_core::models::organization::OrganizationRole;
use taskdeck_core::models::project::ProjectStatus;
use taskdeck_core::models::task::{TaskPriority, TaskStatus, TaskType};
use taskdeck_core::types::DbId;

/// Terminal client for the taskdeck project-management backend
#[derive(Parser, Debug)]
#[command(name = "taskdeck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Print raw JSON instead of the human-readable summary
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account (does not log in)
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long, env = "TASKDECK_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },

    /// Log in and store the token pair
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "TASKDECK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Log out and forget the stored tokens
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Manage organizations
    Orgs {
        #[command(subcommand)]
        cmd: OrgCommand,
    },

    /// Manage projects
    Projects {
        #[command(subcommand)]
        cmd: ProjectCommand,
    },

    /// Manage boards and their columns
    Boards {
        #[command(subcommand)]
        cmd: BoardCommand,
    },

    /// Manage tasks
    Tasks {
        #[command(subcommand)]
        cmd: TaskCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum OrgCommand {
    /// List organizations
    List,
    /// Create an organization
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete an organization
    Delete { id: DbId },
    /// List the members of an organization
    Members { id: DbId },
    /// Add a user to an organization
    AddMember {
        id: DbId,
        #[arg(long)]
        user: DbId,
        #[arg(long, default_value_t = OrganizationRole::Member)]
        role: OrganizationRole,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// List projects
    List,
    /// Show one project
    Show { id: DbId },
    /// Create a project
    Create {
        #[arg(long = "org")]
        organization_id: DbId,
        #[arg(long)]
        name: String,
        /// Short uppercase key used for task numbers, e.g. WEB
        #[arg(long)]
        key: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        budget: Option<f64>,
    },
    /// Change a project's status
    SetStatus { id: DbId, status: ProjectStatus },
    /// Delete a project
    Delete { id: DbId },
}

#[derive(Subcommand, Debug)]
pub enum BoardCommand {
    /// List the boards of a project
    List {
        #[arg(long)]
        project: DbId,
    },
    /// Show a board with its columns
    Show { id: DbId },
    /// Create a board
    Create {
        #[arg(long)]
        project: DbId,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Add a column to a board
    AddColumn {
        #[arg(long)]
        board: DbId,
        #[arg(long)]
        name: String,
        #[arg(long)]
        position: i32,
        #[arg(long)]
        wip_limit: Option<i32>,
    },
    /// Delete a board
    Delete { id: DbId },
}

/// Server-side filters for `tasks list`.
#[derive(Args, Debug, Default)]
pub struct TaskFilterArgs {
    #[arg(long)]
    pub project: Option<DbId>,
    #[arg(long)]
    pub board: Option<DbId>,
    #[arg(long)]
    pub column: Option<DbId>,
    #[arg(long)]
    pub status: Option<TaskStatus>,
    #[arg(long)]
    pub priority: Option<TaskPriority>,
    #[arg(long)]
    pub assignee: Option<DbId>,
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// List tasks, optionally filtered
    List(TaskFilterArgs),
    /// Show one task
    Show { id: DbId },
    /// Create a task
    Create {
        #[arg(long)]
        project: DbId,
        #[arg(long)]
        board: DbId,
        #[arg(long)]
        title: String,
        #[arg(long)]
        column: Option<DbId>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<TaskPriority>,
        #[arg(long = "type")]
        task_type: Option<TaskType>,
        #[arg(long = "assignee")]
        assignees: Vec<DbId>,
    },
    /// Update fields of a task
    Update {
        id: DbId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<TaskPriority>,
    },
    /// Move a task to a column
    Move {
        id: DbId,
        #[arg(long)]
        column: DbId,
        #[arg(long, default_value_t = 0)]
        position: i32,
    },
    /// Delete a task
    Delete { id: DbId },
}
