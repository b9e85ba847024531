//! Resource modules: one typed function per REST endpoint.
//!
//! Each module is a thin mapping over [`ApiClient`](crate::ApiClient) with
//! a fixed method and path template per operation. None of them retry,
//! paginate or join client-side; filters are passed through as query
//! parameters and errors propagate unchanged.

pub mod auth;
pub mod boards;
pub mod organizations;
pub mod projects;
pub mod tasks;
pub mod users;

pub use auth::AuthApi;
pub use boards::BoardsApi;
pub use organizations::OrganizationsApi;
pub use projects::ProjectsApi;
pub use tasks::TasksApi;
pub use users::UsersApi;
