//! In-process mock of the taskdeck backend for integration tests.
//!
//! Serves the REST surface under `/api/v1` on an ephemeral port, keeps all
//! records as JSON in memory, and reports failures as `{"detail": ...}`
//! bodies like the real backend. A few `/debug/*` routes exist for
//! transport-level tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use taskdeck_client::resources::{AuthApi, BoardsApi, OrganizationsApi, ProjectsApi};
use taskdeck_client::{ApiClient, ClientConfig, MemoryTokenStorage, SessionStore, TokenStorage};
use taskdeck_core::models::board::{Board, Column, CreateBoard, CreateColumn};
use taskdeck_core::models::organization::{CreateOrganization, Organization};
use taskdeck_core::models::project::{CreateProject, Project};
use taskdeck_core::models::user::{LoginRequest, RegisterRequest, User};

pub const TEST_PASSWORD: &str = "correct-horse-battery";

// ---------------------------------------------------------------------------
// Server state
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockDb {
    next_id: i64,
    pub users: BTreeMap<i64, Value>,
    passwords: HashMap<String, (String, i64)>,
    /// Access token -> user id.
    pub tokens: HashMap<String, i64>,
    pub organizations: BTreeMap<i64, Value>,
    pub members: BTreeMap<i64, Value>,
    pub projects: BTreeMap<i64, Value>,
    pub boards: BTreeMap<i64, Value>,
    pub columns: BTreeMap<i64, Value>,
    pub tasks: BTreeMap<i64, Value>,
    /// `"METHOD path"` of every request that reached a handler.
    pub hits: Vec<String>,
}

impl MockDb {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn hit(&mut self, line: impl Into<String>) {
        self.hits.push(line.into());
    }
}

pub type SharedDb = Arc<Mutex<MockDb>>;

/// A running mock backend.
pub struct TestServer {
    /// API root including the `/api/v1` prefix.
    pub base_url: String,
    pub db: SharedDb,
}

impl TestServer {
    /// Client with in-memory token storage.
    pub fn client(&self) -> ApiClient {
        self.client_with_storage(MemoryTokenStorage::new())
    }

    pub fn client_with_storage(&self, storage: impl TokenStorage + 'static) -> ApiClient {
        let session = SessionStore::new(storage);
        ApiClient::new(&ClientConfig::new(&self.base_url), session).unwrap()
    }

    /// Invalidate every issued access token so the next call gets a 401.
    pub fn revoke_all_tokens(&self) {
        self.db.lock().unwrap().tokens.clear();
    }

    /// How many requests matching `line` (e.g. `"GET /projects"`) were served.
    pub fn hits(&self, line: &str) -> usize {
        self.db
            .lock()
            .unwrap()
            .hits
            .iter()
            .filter(|h| h.as_str() == line)
            .count()
    }
}

/// Start the mock backend on `127.0.0.1:0`.
pub async fn spawn_server() -> TestServer {
    let db: SharedDb = Arc::new(Mutex::new(MockDb::default()));
    let app = Router::new()
        .nest("/api/v1", api_routes())
        .with_state(db.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{addr}/api/v1"),
        db,
    }
}

/// Register `username` and log in through the client under test.
pub async fn register_and_login(client: &ApiClient, username: &str) -> User {
    let user = AuthApi::register(
        client,
        &RegisterRequest {
            email: format!("{username}@example.com"),
            username: username.to_string(),
            password: TEST_PASSWORD.to_string(),
            first_name: None,
            last_name: None,
        },
    )
    .await
    .expect("registration should succeed");

    AuthApi::login(
        client,
        &LoginRequest {
            email: user.email.clone(),
            password: TEST_PASSWORD.to_string(),
        },
    )
    .await
    .expect("login should succeed");

    user
}

/// An organization, a project and a board with "To Do" and "Done" columns.
pub struct Workspace {
    pub organization: Organization,
    pub project: Project,
    pub board: Board,
    pub todo: Column,
    pub done: Column,
}

/// Create a [`Workspace`] through the client under test.
pub async fn seed_workspace(client: &ApiClient, key: &str) -> Workspace {
    let organization = OrganizationsApi::create(
        client,
        &CreateOrganization {
            name: format!("{key} org"),
            description: None,
        },
    )
    .await
    .expect("organization creation should succeed");

    let project = ProjectsApi::create(
        client,
        &CreateProject {
            name: format!("{key} project"),
            key: key.to_string(),
            organization_id: organization.id,
            description: None,
            start_date: None,
            end_date: None,
            budget: None,
        },
    )
    .await
    .expect("project creation should succeed");

    let board = BoardsApi::create(
        client,
        &CreateBoard {
            name: "Main".to_string(),
            project_id: project.id,
            description: None,
            position: None,
            is_default: Some(true),
        },
    )
    .await
    .expect("board creation should succeed");

    let column = |name: &str, position: i32| CreateColumn {
        name: name.to_string(),
        position,
        board_id: board.id,
        wip_limit: None,
    };
    let todo = BoardsApi::create_column(client, &column("To Do", 0))
        .await
        .expect("column creation should succeed");
    let done = BoardsApi::create_column(client, &column("Done", 1))
        .await
        .expect("column creation should succeed");

    Workspace {
        organization,
        project,
        board,
        todo,
        done,
    }
}

/// A base URL on which nothing is listening.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api/v1")
}

/// A raw TCP endpoint that answers one request with `401` headers promising
/// a body, then never sends it.
pub async fn stalled_unauthorized_base_url() -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        let head = "HTTP/1.1 401 Unauthorized\r\n\
                    content-type: application/json\r\n\
                    content-length: 100\r\n\r\n";
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.flush().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
    });
    format!("http://{addr}/api/v1")
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

fn api_routes() -> Router<SharedDb> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/users", get(list_users))
        .route("/users/me", get(get_me).put(update_me))
        .route("/users/{id}", get(get_user))
        .route("/organizations", get(list_organizations).post(create_organization))
        .route(
            "/organizations/{id}",
            get(get_organization)
                .put(update_organization)
                .delete(delete_organization),
        )
        .route(
            "/organizations/{id}/members",
            get(list_members).post(add_member),
        )
        .route("/projects", get(list_projects).post(create_project))
        .route(
            "/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/boards/", post(create_board))
        .route("/boards/project/{project_id}", get(list_project_boards))
        .route("/boards/columns", post(create_column))
        .route(
            "/boards/columns/{id}",
            axum::routing::patch(update_column).delete(delete_column),
        )
        .route(
            "/boards/{id}",
            get(get_board).patch(update_board).delete(delete_board),
        )
        .route("/tasks", get(list_tasks))
        .route("/tasks/", post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).patch(update_task).delete(delete_task),
        )
        .route("/tasks/{id}/move", put(move_task))
        .route("/debug/status/{code}", get(debug_status))
        .route("/debug/slow", get(debug_slow))
        .route("/debug/echo-auth", get(debug_echo_auth))
        .route("/debug/not-json", get(debug_not_json))
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

pub struct Fail(StatusCode, Value);

impl Fail {
    fn detail(status: StatusCode, message: &str) -> Self {
        Fail(status, json!({ "detail": message }))
    }

    fn not_found(entity: &str) -> Self {
        Fail::detail(StatusCode::NOT_FOUND, &format!("{entity} not found"))
    }

    fn missing(fields: &[&str]) -> Self {
        let items: Vec<Value> = fields
            .iter()
            .map(|f| json!({ "loc": ["body", f], "msg": "field required", "type": "missing" }))
            .collect();
        Fail(StatusCode::UNPROCESSABLE_ENTITY, json!({ "detail": items }))
    }
}

impl IntoResponse for Fail {
    fn into_response(self) -> Response {
        (self.0, Json(self.1)).into_response()
    }
}

type Reply = Result<Response, Fail>;

fn ok(body: Value) -> Reply {
    Ok(Json(body).into_response())
}

fn created(body: Value) -> Reply {
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

fn no_content() -> Reply {
    Ok(StatusCode::NO_CONTENT.into_response())
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn authenticate(db: &MockDb, headers: &HeaderMap) -> Result<i64, Fail> {
    bearer(headers)
        .and_then(|token| db.tokens.get(token).copied())
        .ok_or_else(|| Fail::detail(StatusCode::UNAUTHORIZED, "Could not validate credentials"))
}

fn require_fields(body: &Value, fields: &[&str]) -> Result<(), Fail> {
    let missing: Vec<&str> = fields
        .iter()
        .copied()
        .filter(|f| body.get(*f).map_or(true, Value::is_null))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Fail::missing(&missing))
    }
}

/// Copy the listed keys present in `body` onto `record`.
fn merge(record: &mut Value, body: &Value, keys: &[&str]) {
    for key in keys {
        if let Some(value) = body.get(*key) {
            record[*key] = value.clone();
        }
    }
    record["updated_at"] = json!(now());
}

fn decimal(value: Option<&Value>) -> Value {
    match value.and_then(Value::as_f64) {
        Some(n) => json!(format!("{n:.2}")),
        None => Value::Null,
    }
}

// ---------------------------------------------------------------------------
// Auth and users
// ---------------------------------------------------------------------------

async fn register(State(db): State<SharedDb>, Json(body): Json<Value>) -> Reply {
    require_fields(&body, &["email", "username", "password"])?;
    let mut db = db.lock().unwrap();
    db.hit("POST /auth/register");

    let email = body["email"].as_str().unwrap_or_default().to_string();
    if db.passwords.contains_key(&email) {
        return Err(Fail::detail(StatusCode::BAD_REQUEST, "Email already registered"));
    }

    let id = db.next_id();
    let user = json!({
        "id": id,
        "email": email,
        "username": body["username"],
        "first_name": body.get("first_name").cloned().unwrap_or(Value::Null),
        "last_name": body.get("last_name").cloned().unwrap_or(Value::Null),
        "avatar_url": null,
        "is_active": true,
        "is_verified": false,
        "timezone": "UTC",
        "created_at": now(),
        "updated_at": now(),
    });
    let password = body["password"].as_str().unwrap_or_default().to_string();
    db.passwords.insert(email, (password, id));
    db.users.insert(id, user.clone());
    created(user)
}

async fn login(State(db): State<SharedDb>, Json(body): Json<Value>) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit("POST /auth/login");

    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let user_id = match db.passwords.get(email) {
        Some((stored, id)) if stored == password => *id,
        _ => {
            return Err(Fail::detail(
                StatusCode::UNAUTHORIZED,
                "Incorrect email or password",
            ))
        }
    };

    let n = db.next_id();
    let access = format!("access-{user_id}-{n}");
    db.tokens.insert(access.clone(), user_id);
    ok(json!({
        "access_token": access,
        "refresh_token": format!("refresh-{user_id}-{n}"),
        "token_type": "bearer",
    }))
}

async fn logout(State(db): State<SharedDb>, headers: HeaderMap) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit("POST /auth/logout");
    authenticate(&db, &headers)?;
    if let Some(token) = bearer(&headers) {
        db.tokens.remove(token);
    }
    ok(json!({ "message": "Successfully logged out" }))
}

async fn get_me(State(db): State<SharedDb>, headers: HeaderMap) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit("GET /users/me");
    let id = authenticate(&db, &headers)?;
    ok(db.users[&id].clone())
}

async fn update_me(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit("PUT /users/me");
    let id = authenticate(&db, &headers)?;
    let user = db.users.get_mut(&id).ok_or_else(|| Fail::not_found("User"))?;
    merge(user, &body, &["first_name", "last_name", "avatar_url", "timezone"]);
    ok(user.clone())
}

async fn list_users(State(db): State<SharedDb>, headers: HeaderMap) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit("GET /users");
    authenticate(&db, &headers)?;
    ok(Value::Array(db.users.values().cloned().collect()))
}

async fn get_user(State(db): State<SharedDb>, headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit(format!("GET /users/{id}"));
    authenticate(&db, &headers)?;
    db.users
        .get(&id)
        .cloned()
        .ok_or_else(|| Fail::not_found("User"))
        .and_then(ok)
}

// ---------------------------------------------------------------------------
// Organizations
// ---------------------------------------------------------------------------

async fn list_organizations(State(db): State<SharedDb>, headers: HeaderMap) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit("GET /organizations");
    authenticate(&db, &headers)?;
    ok(Value::Array(db.organizations.values().cloned().collect()))
}

async fn create_organization(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit("POST /organizations");
    let owner_id = authenticate(&db, &headers)?;
    require_fields(&body, &["name"])?;

    let id = db.next_id();
    let org = json!({
        "id": id,
        "name": body["name"],
        "description": body.get("description").cloned().unwrap_or(Value::Null),
        "logo_url": null,
        "owner_id": owner_id,
        "created_at": now(),
        "updated_at": now(),
    });
    db.organizations.insert(id, org.clone());
    insert_member(&mut db, id, owner_id, "owner");
    created(org)
}

async fn get_organization(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit(format!("GET /organizations/{id}"));
    authenticate(&db, &headers)?;
    let mut org = db
        .organizations
        .get(&id)
        .cloned()
        .ok_or_else(|| Fail::not_found("Organization"))?;
    org["members"] = Value::Array(members_of(&db, id));
    ok(org)
}

async fn update_organization(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit(format!("PUT /organizations/{id}"));
    authenticate(&db, &headers)?;
    let org = db
        .organizations
        .get_mut(&id)
        .ok_or_else(|| Fail::not_found("Organization"))?;
    merge(org, &body, &["name", "description", "logo_url"]);
    ok(org.clone())
}

async fn delete_organization(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit(format!("DELETE /organizations/{id}"));
    authenticate(&db, &headers)?;
    db.organizations
        .remove(&id)
        .ok_or_else(|| Fail::not_found("Organization"))?;
    no_content()
}

fn members_of(db: &MockDb, organization_id: i64) -> Vec<Value> {
    db.members
        .values()
        .filter(|m| m["organization_id"] == json!(organization_id))
        .cloned()
        .collect()
}

fn insert_member(db: &mut MockDb, organization_id: i64, user_id: i64, role: &str) -> Value {
    let id = db.next_id();
    let member = json!({
        "id": id,
        "organization_id": organization_id,
        "user_id": user_id,
        "role": role,
        "user": db.users.get(&user_id).cloned(),
        "joined_at": now(),
    });
    db.members.insert(id, member.clone());
    member
}

async fn list_members(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit(format!("GET /organizations/{id}/members"));
    authenticate(&db, &headers)?;
    if !db.organizations.contains_key(&id) {
        return Err(Fail::not_found("Organization"));
    }
    ok(Value::Array(members_of(&db, id)))
}

async fn add_member(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit(format!("POST /organizations/{id}/members"));
    authenticate(&db, &headers)?;
    require_fields(&body, &["user_id", "role"])?;
    if !db.organizations.contains_key(&id) {
        return Err(Fail::not_found("Organization"));
    }
    let user_id = body["user_id"].as_i64().unwrap_or_default();
    if !db.users.contains_key(&user_id) {
        return Err(Fail::not_found("User"));
    }
    if members_of(&db, id)
        .iter()
        .any(|m| m["user_id"] == json!(user_id))
    {
        return Err(Fail::detail(
            StatusCode::BAD_REQUEST,
            "User is already a member of this organization",
        ));
    }
    let role = body["role"].as_str().unwrap_or("member").to_string();
    let member = insert_member(&mut db, id, user_id, &role);
    created(member)
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

async fn list_projects(State(db): State<SharedDb>, headers: HeaderMap) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit("GET /projects");
    authenticate(&db, &headers)?;
    ok(Value::Array(db.projects.values().cloned().collect()))
}

async fn create_project(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit("POST /projects");
    let owner_id = authenticate(&db, &headers)?;
    require_fields(&body, &["name", "key", "organization_id"])?;

    let duplicate = db.projects.values().any(|p| {
        p["key"] == body["key"] && p["organization_id"] == body["organization_id"]
    });
    if duplicate {
        return Err(Fail::detail(
            StatusCode::BAD_REQUEST,
            "Project key already exists",
        ));
    }

    let id = db.next_id();
    let project = json!({
        "id": id,
        "organization_id": body["organization_id"],
        "name": body["name"],
        "key": body["key"],
        "description": body.get("description").cloned().unwrap_or(Value::Null),
        "status": "active",
        "start_date": body.get("start_date").cloned().unwrap_or(Value::Null),
        "end_date": body.get("end_date").cloned().unwrap_or(Value::Null),
        "budget": decimal(body.get("budget")),
        "owner_id": owner_id,
        "created_at": now(),
        "updated_at": now(),
    });
    db.projects.insert(id, project.clone());
    created(project)
}

async fn get_project(State(db): State<SharedDb>, headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit(format!("GET /projects/{id}"));
    authenticate(&db, &headers)?;
    db.projects
        .get(&id)
        .cloned()
        .ok_or_else(|| Fail::not_found("Project"))
        .and_then(ok)
}

async fn update_project(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit(format!("PUT /projects/{id}"));
    authenticate(&db, &headers)?;
    let project = db
        .projects
        .get_mut(&id)
        .ok_or_else(|| Fail::not_found("Project"))?;
    merge(
        project,
        &body,
        &["name", "description", "status", "start_date", "end_date"],
    );
    if body.get("budget").is_some() {
        project["budget"] = decimal(body.get("budget"));
    }
    ok(project.clone())
}

async fn delete_project(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit(format!("DELETE /projects/{id}"));
    authenticate(&db, &headers)?;
    db.projects
        .remove(&id)
        .ok_or_else(|| Fail::not_found("Project"))?;
    no_content()
}

// ---------------------------------------------------------------------------
// Boards and columns
// ---------------------------------------------------------------------------

async fn list_project_boards(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(project_id): Path<i64>,
) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit(format!("GET /boards/project/{project_id}"));
    authenticate(&db, &headers)?;
    let boards: Vec<Value> = db
        .boards
        .values()
        .filter(|b| b["project_id"] == json!(project_id))
        .cloned()
        .collect();
    ok(Value::Array(boards))
}

async fn create_board(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit("POST /boards/");
    authenticate(&db, &headers)?;
    require_fields(&body, &["name", "project_id"])?;
    let project_id = body["project_id"].as_i64().unwrap_or_default();
    if !db.projects.contains_key(&project_id) {
        return Err(Fail::not_found("Project"));
    }

    let id = db.next_id();
    let board = json!({
        "id": id,
        "project_id": project_id,
        "name": body["name"],
        "description": body.get("description").cloned().unwrap_or(Value::Null),
        "position": body.get("position").cloned().unwrap_or(json!(0)),
        "is_default": body.get("is_default").cloned().unwrap_or(json!(false)),
        "created_at": now(),
        "updated_at": now(),
    });
    db.boards.insert(id, board.clone());
    created(board)
}

async fn get_board(State(db): State<SharedDb>, headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit(format!("GET /boards/{id}"));
    authenticate(&db, &headers)?;
    let mut board = db
        .boards
        .get(&id)
        .cloned()
        .ok_or_else(|| Fail::not_found("Board"))?;

    let mut columns: Vec<Value> = db
        .columns
        .values()
        .filter(|c| c["board_id"] == json!(id))
        .cloned()
        .collect();
    columns.sort_by_key(|c| c["position"].as_i64().unwrap_or_default());
    board["columns"] = Value::Array(columns);
    ok(board)
}

async fn update_board(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit(format!("PATCH /boards/{id}"));
    authenticate(&db, &headers)?;
    let board = db.boards.get_mut(&id).ok_or_else(|| Fail::not_found("Board"))?;
    merge(board, &body, &["name", "description", "position", "is_default"]);
    ok(board.clone())
}

async fn delete_board(State(db): State<SharedDb>, headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit(format!("DELETE /boards/{id}"));
    authenticate(&db, &headers)?;
    db.boards.remove(&id).ok_or_else(|| Fail::not_found("Board"))?;
    db.columns.retain(|_, c| c["board_id"] != json!(id));
    no_content()
}

async fn create_column(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit("POST /boards/columns");
    authenticate(&db, &headers)?;
    require_fields(&body, &["name", "position", "board_id"])?;
    let board_id = body["board_id"].as_i64().unwrap_or_default();
    if !db.boards.contains_key(&board_id) {
        return Err(Fail::not_found("Board"));
    }

    let id = db.next_id();
    let column = json!({
        "id": id,
        "board_id": board_id,
        "name": body["name"],
        "position": body["position"],
        "wip_limit": body.get("wip_limit").cloned().unwrap_or(Value::Null),
        "created_at": now(),
        "updated_at": now(),
    });
    db.columns.insert(id, column.clone());
    created(column)
}

async fn update_column(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit(format!("PATCH /boards/columns/{id}"));
    authenticate(&db, &headers)?;
    let column = db
        .columns
        .get_mut(&id)
        .ok_or_else(|| Fail::not_found("Column"))?;
    merge(column, &body, &["name", "position", "wip_limit"]);
    ok(column.clone())
}

async fn delete_column(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit(format!("DELETE /boards/columns/{id}"));
    authenticate(&db, &headers)?;
    db.columns
        .remove(&id)
        .ok_or_else(|| Fail::not_found("Column"))?;
    no_content()
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

fn task_matches(task: &Value, filters: &HashMap<String, String>) -> bool {
    filters.iter().all(|(name, wanted)| match name.as_str() {
        "assignee_id" => task["assignees"]
            .as_array()
            .is_some_and(|users| users.iter().any(|u| u["id"].to_string() == *wanted)),
        "project_id" | "board_id" | "column_id" => task[name.as_str()].to_string() == *wanted,
        "status" | "priority" => task[name.as_str()].as_str() == Some(wanted.as_str()),
        _ => true,
    })
}

async fn list_tasks(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Query(filters): Query<HashMap<String, String>>,
) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit("GET /tasks");
    authenticate(&db, &headers)?;
    let tasks: Vec<Value> = db
        .tasks
        .values()
        .filter(|t| task_matches(t, &filters))
        .cloned()
        .collect();
    ok(Value::Array(tasks))
}

async fn create_task(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit("POST /tasks/");
    let creator_id = authenticate(&db, &headers)?;
    require_fields(&body, &["title", "project_id", "board_id"])?;

    let project_id = body["project_id"].as_i64().unwrap_or_default();
    let task_number = db
        .tasks
        .values()
        .filter(|t| t["project_id"] == json!(project_id))
        .count()
        + 1;

    let assignees: Vec<Value> = body["assignee_ids"]
        .as_array()
        .map(|ids| {
            ids.iter()
                .filter_map(|id| id.as_i64().and_then(|id| db.users.get(&id)).cloned())
                .collect()
        })
        .unwrap_or_default();
    let creator = db.users.get(&creator_id).cloned();

    let id = db.next_id();
    let field = |key: &str, default: Value| body.get(key).cloned().unwrap_or(default);
    let task = json!({
        "id": id,
        "project_id": project_id,
        "board_id": body["board_id"],
        "column_id": field("column_id", Value::Null),
        "title": body["title"],
        "description": field("description", Value::Null),
        "task_number": task_number,
        "priority": field("priority", json!("medium")),
        "status": "new",
        "type": field("type", json!("task")),
        "story_points": field("story_points", Value::Null),
        "estimated_hours": decimal(body.get("estimated_hours")),
        "actual_hours": "0.00",
        "position": 0,
        "start_date": field("start_date", Value::Null),
        "due_date": field("due_date", Value::Null),
        "completed_at": null,
        "creator_id": creator_id,
        "parent_task_id": field("parent_task_id", Value::Null),
        "created_at": now(),
        "updated_at": now(),
        "creator": creator,
        "assignees": assignees,
        "labels": [],
    });
    db.tasks.insert(id, task.clone());
    created(task)
}

async fn get_task(State(db): State<SharedDb>, headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit(format!("GET /tasks/{id}"));
    authenticate(&db, &headers)?;
    db.tasks
        .get(&id)
        .cloned()
        .ok_or_else(|| Fail::not_found("Task"))
        .and_then(ok)
}

async fn update_task(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit(format!("PATCH /tasks/{id}"));
    authenticate(&db, &headers)?;
    let task = db.tasks.get_mut(&id).ok_or_else(|| Fail::not_found("Task"))?;
    merge(
        task,
        &body,
        &[
            "title",
            "description",
            "priority",
            "status",
            "type",
            "story_points",
            "start_date",
            "due_date",
            "column_id",
            "position",
        ],
    );
    if body.get("estimated_hours").is_some() {
        task["estimated_hours"] = decimal(body.get("estimated_hours"));
    }
    if body["status"] == json!("done") {
        task["completed_at"] = json!(now());
    }
    ok(task.clone())
}

async fn delete_task(State(db): State<SharedDb>, headers: HeaderMap, Path(id): Path<i64>) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit(format!("DELETE /tasks/{id}"));
    authenticate(&db, &headers)?;
    db.tasks.remove(&id).ok_or_else(|| Fail::not_found("Task"))?;
    no_content()
}

async fn move_task(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Reply {
    let mut db = db.lock().unwrap();
    db.hit(format!("PUT /tasks/{id}/move"));
    authenticate(&db, &headers)?;
    require_fields(&body, &["column_id", "position"])?;
    let task = db.tasks.get_mut(&id).ok_or_else(|| Fail::not_found("Task"))?;
    merge(task, &body, &["column_id", "position"]);
    ok(task.clone())
}

// ---------------------------------------------------------------------------
// Debug routes
// ---------------------------------------------------------------------------

async fn debug_status(Path(code): Path<u16>) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "detail": format!("debug status {code}") }))).into_response()
}

async fn debug_slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!({ "slow": true }))
}

async fn debug_echo_auth(headers: HeaderMap) -> Json<Value> {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    Json(json!({ "authorization": authorization }))
}

async fn debug_not_json() -> &'static str {
    "plain text, not json"
}
