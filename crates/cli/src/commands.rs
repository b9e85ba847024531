//! Dispatch of parsed commands onto the client library.

use taskdeck_client::resources::{AuthApi, BoardsApi, OrganizationsApi, ProjectsApi, TasksApi};
use taskdeck_client::{ApiClient, ApiError, FileTokenStorage, SessionStore};
use taskdeck_core::models::board::{Column, CreateBoard, CreateColumn};
use taskdeck_core::models::organization::{CreateOrganization, CreateOrganizationMember};
use taskdeck_core::models::project::{CreateProject, UpdateProject};
use taskdeck_core::models::task::{CreateTask, TaskFilters, TaskMove, UpdateTask};
use taskdeck_core::models::user::{LoginRequest, RegisterRequest};

use crate::cli::{
    BoardCommand, Cli, Command, OrgCommand, ProjectCommand, TaskCommand, TaskFilterArgs,
};
use crate::config::CliConfig;
use crate::error::CliError;
use crate::output::{self, Output};

/// Run one CLI invocation.
///
/// Tokens persisted by a previous `login` are restored from the token file
/// before the command runs.
pub async fn run(cli: Cli, config: &CliConfig) -> Result<(), CliError> {
    let session = SessionStore::new(FileTokenStorage::new(&config.token_file));
    if session.init_auth() {
        tracing::debug!(token_file = %config.token_file.display(), "Restored session");
    }
    let client = ApiClient::new(&config.client, session)?;
    let out = Output { json: cli.json };

    match cli.command {
        Command::Register {
            email,
            username,
            password,
            first_name,
            last_name,
        } => {
            let input = RegisterRequest {
                email,
                username,
                password,
                first_name,
                last_name,
            };
            let user = AuthApi::register(&client, &input).await?;
            out.item(&user, output::user_line)?;
        }

        Command::Login { email, password } => {
            AuthApi::login(&client, &LoginRequest { email, password }).await?;
            let user = AuthApi::load_current_user(&client).await?;
            out.message(&format!("Logged in as {}", user.display_name()));
        }

        Command::Logout => {
            if !client.session().is_authenticated() {
                out.message("Not logged in");
                return Ok(());
            }
            match AuthApi::logout(&client).await {
                // An expired token still ends the local session.
                Ok(()) | Err(ApiError::Unauthorized { .. }) => out.message("Logged out"),
                Err(e) => return Err(e.into()),
            }
        }

        Command::Whoami => {
            require_login(&client)?;
            let user = AuthApi::load_current_user(&client).await?;
            out.item(&user, output::user_line)?;
        }

        Command::Orgs { cmd } => {
            require_login(&client)?;
            orgs(&client, out, cmd).await?;
        }
        Command::Projects { cmd } => {
            require_login(&client)?;
            projects(&client, out, cmd).await?;
        }
        Command::Boards { cmd } => {
            require_login(&client)?;
            boards(&client, out, cmd).await?;
        }
        Command::Tasks { cmd } => {
            require_login(&client)?;
            tasks(&client, out, cmd).await?;
        }
    }

    Ok(())
}

// ---- private helpers ----

fn require_login(client: &ApiClient) -> Result<(), CliError> {
    if client.session().is_authenticated() {
        Ok(())
    } else {
        Err(CliError::NotLoggedIn)
    }
}

async fn orgs(client: &ApiClient, out: Output, cmd: OrgCommand) -> Result<(), CliError> {
    match cmd {
        OrgCommand::List => {
            let orgs = OrganizationsApi::list(client).await?;
            out.list(&orgs, output::org_line)?;
        }
        OrgCommand::Create { name, description } => {
            let org =
                OrganizationsApi::create(client, &CreateOrganization { name, description }).await?;
            out.item(&org, output::org_line)?;
        }
        OrgCommand::Delete { id } => {
            OrganizationsApi::delete(client, id).await?;
            out.message(&format!("Deleted organization {id}"));
        }
        OrgCommand::Members { id } => {
            let members = OrganizationsApi::list_members(client, id).await?;
            out.list(&members, output::member_line)?;
        }
        OrgCommand::AddMember { id, user, role } => {
            let input = CreateOrganizationMember {
                user_id: user,
                role,
            };
            let member = OrganizationsApi::add_member(client, id, &input).await?;
            out.item(&member, output::member_line)?;
        }
    }
    Ok(())
}

async fn projects(client: &ApiClient, out: Output, cmd: ProjectCommand) -> Result<(), CliError> {
    match cmd {
        ProjectCommand::List => {
            let projects = ProjectsApi::list(client).await?;
            out.list(&projects, output::project_line)?;
        }
        ProjectCommand::Show { id } => {
            let project = ProjectsApi::get(client, id).await?;
            out.item(&project, output::project_line)?;
        }
        ProjectCommand::Create {
            organization_id,
            name,
            key,
            description,
            budget,
        } => {
            let input = CreateProject {
                name,
                key,
                organization_id,
                description,
                start_date: None,
                end_date: None,
                budget,
            };
            let project = ProjectsApi::create(client, &input).await?;
            out.item(&project, output::project_line)?;
        }
        ProjectCommand::SetStatus { id, status } => {
            let input = UpdateProject {
                status: Some(status),
                ..Default::default()
            };
            let project = ProjectsApi::update(client, id, &input).await?;
            out.item(&project, output::project_line)?;
        }
        ProjectCommand::Delete { id } => {
            ProjectsApi::delete(client, id).await?;
            out.message(&format!("Deleted project {id}"));
        }
    }
    Ok(())
}

async fn boards(client: &ApiClient, out: Output, cmd: BoardCommand) -> Result<(), CliError> {
    match cmd {
        BoardCommand::List { project } => {
            let boards = BoardsApi::list_for_project(client, project).await?;
            out.list(&boards, output::board_line)?;
        }
        BoardCommand::Show { id } => {
            let board = BoardsApi::get(client, id).await?;
            out.item(&board, output::board_detail)?;
        }
        BoardCommand::Create {
            project,
            name,
            description,
        } => {
            let input = CreateBoard {
                name,
                project_id: project,
                description,
                position: None,
                is_default: None,
            };
            let board = BoardsApi::create(client, &input).await?;
            out.item(&board, output::board_line)?;
        }
        BoardCommand::AddColumn {
            board,
            name,
            position,
            wip_limit,
        } => {
            let input = CreateColumn {
                name,
                position,
                board_id: board,
                wip_limit,
            };
            let column = BoardsApi::create_column(client, &input).await?;
            out.item(&column, |c: &Column| format!("{:>4}  {}", c.id, c.name))?;
        }
        BoardCommand::Delete { id } => {
            BoardsApi::delete(client, id).await?;
            out.message(&format!("Deleted board {id}"));
        }
    }
    Ok(())
}

async fn tasks(client: &ApiClient, out: Output, cmd: TaskCommand) -> Result<(), CliError> {
    match cmd {
        TaskCommand::List(args) => {
            let tasks = TasksApi::list(client, &filters(args)).await?;
            out.list(&tasks, output::task_line)?;
        }
        TaskCommand::Show { id } => {
            let task = TasksApi::get(client, id).await?;
            out.item(&task, output::task_line)?;
        }
        TaskCommand::Create {
            project,
            board,
            title,
            column,
            description,
            priority,
            task_type,
            assignees,
        } => {
            let input = CreateTask {
                project_id: project,
                board_id: board,
                title,
                column_id: column,
                description,
                priority,
                task_type,
                assignee_ids: assignees,
                ..Default::default()
            };
            let task = TasksApi::create(client, &input).await?;
            out.item(&task, output::task_line)?;
        }
        TaskCommand::Update {
            id,
            title,
            status,
            priority,
        } => {
            let input = UpdateTask {
                title,
                status,
                priority,
                ..Default::default()
            };
            let task = TasksApi::update(client, id, &input).await?;
            out.item(&task, output::task_line)?;
        }
        TaskCommand::Move {
            id,
            column,
            position,
        } => {
            let target = TaskMove {
                column_id: column,
                position,
            };
            let task = TasksApi::move_task(client, id, target).await?;
            out.item(&task, output::task_line)?;
        }
        TaskCommand::Delete { id } => {
            TasksApi::delete(client, id).await?;
            out.message(&format!("Deleted task {id}"));
        }
    }
    Ok(())
}

fn filters(args: TaskFilterArgs) -> TaskFilters {
    TaskFilters {
        project_id: args.project,
        board_id: args.board,
        column_id: args.column,
        status: args.status,
        priority: args.priority,
        assignee_id: args.assignee,
    }
}
