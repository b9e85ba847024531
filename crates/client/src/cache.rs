//! Explicit query cache with mutation-driven invalidation.
//!
//! Fetch results are cached under a [`QueryKey`] (resource kind plus
//! parameters). Each entry records when it was fetched and whether it has
//! been marked stale. After a successful mutation the caller passes the
//! matching [`Mutation`] to [`QueryCache::invalidate`], which consults a
//! fixed rule table and marks every affected entry stale. Nothing refetches
//! on its own: the next [`QueryCache::fetch`] for a stale or expired key
//! goes to the network, and the most recently completed fetch wins.

use std::collections::HashMap;
use std::future::Future;

use chrono::{Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use taskdeck_core::models::task::TaskFilters;
use taskdeck_core::types::{DbId, Timestamp};

use crate::error::ApiResult;

/// Default maximum age before a fresh entry is refetched anyway.
pub const DEFAULT_MAX_AGE_SECS: i64 = 60;

/// Resource family a cached query belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    CurrentUser,
    Organizations,
    Organization,
    OrganizationMembers,
    Projects,
    Project,
    ProjectBoards,
    Board,
    Tasks,
    Task,
}

/// Identity of a cached query: kind plus sorted `(name, value)` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    kind: QueryKind,
    params: Vec<(String, String)>,
}

impl QueryKey {
    /// Key with the given parameters; parameter order does not matter.
    pub fn new<K, V, I>(kind: QueryKind, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params: Vec<(String, String)> = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        params.sort();
        Self { kind, params }
    }

    fn bare(kind: QueryKind) -> Self {
        Self {
            kind,
            params: Vec::new(),
        }
    }

    fn by_id(kind: QueryKind, name: &str, id: DbId) -> Self {
        Self::new(kind, [(name, id.to_string())])
    }

    pub fn current_user() -> Self {
        Self::bare(QueryKind::CurrentUser)
    }

    pub fn organizations() -> Self {
        Self::bare(QueryKind::Organizations)
    }

    pub fn organization(id: DbId) -> Self {
        Self::by_id(QueryKind::Organization, "id", id)
    }

    pub fn organization_members(organization_id: DbId) -> Self {
        Self::by_id(QueryKind::OrganizationMembers, "organization_id", organization_id)
    }

    pub fn projects() -> Self {
        Self::bare(QueryKind::Projects)
    }

    pub fn project(id: DbId) -> Self {
        Self::by_id(QueryKind::Project, "id", id)
    }

    pub fn project_boards(project_id: DbId) -> Self {
        Self::by_id(QueryKind::ProjectBoards, "project_id", project_id)
    }

    pub fn board(id: DbId) -> Self {
        Self::by_id(QueryKind::Board, "id", id)
    }

    pub fn tasks(filters: &TaskFilters) -> Self {
        Self::new(QueryKind::Tasks, filters.query_pairs())
    }

    pub fn task(id: DbId) -> Self {
        Self::by_id(QueryKind::Task, "id", id)
    }

    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

/// Matches cache keys by kind and a subset of parameters.
///
/// A key matches when its kind equals the pattern's kind (or the pattern
/// has none) and every pattern parameter appears in the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPattern {
    kind: Option<QueryKind>,
    params: Vec<(String, String)>,
}

impl KeyPattern {
    /// Matches every key.
    pub fn any() -> Self {
        Self {
            kind: None,
            params: Vec::new(),
        }
    }

    /// Matches every key of `kind`, whatever its parameters.
    pub fn kind(kind: QueryKind) -> Self {
        Self {
            kind: Some(kind),
            params: Vec::new(),
        }
    }

    /// Matches keys of `kind` whose parameter `name` equals `id`.
    pub fn with_id(kind: QueryKind, name: &str, id: DbId) -> Self {
        Self {
            kind: Some(kind),
            params: vec![(name.to_string(), id.to_string())],
        }
    }

    pub fn matches(&self, key: &QueryKey) -> bool {
        self.kind.map_or(true, |kind| kind == key.kind)
            && self.params.iter().all(|p| key.params.contains(p))
    }
}

/// A successful write that may make cached reads outdated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    CreateOrganization,
    UpdateOrganization { id: DbId },
    DeleteOrganization { id: DbId },
    AddOrganizationMember { id: DbId },
    CreateProject,
    UpdateProject { id: DbId },
    DeleteProject { id: DbId },
    CreateBoard { project_id: DbId },
    UpdateBoard { id: DbId },
    DeleteBoard { id: DbId },
    CreateColumn { board_id: DbId },
    UpdateColumn { board_id: DbId },
    DeleteColumn { board_id: DbId },
    CreateTask,
    UpdateTask { id: DbId },
    DeleteTask { id: DbId },
    MoveTask { id: DbId },
    UpdateProfile,
    Logout,
}

impl Mutation {
    /// The invalidation rule table: key patterns made stale by this mutation.
    pub fn invalidates(&self) -> Vec<KeyPattern> {
        use QueryKind as K;

        match *self {
            Mutation::CreateOrganization => vec![KeyPattern::kind(K::Organizations)],
            Mutation::UpdateOrganization { id } => vec![
                KeyPattern::kind(K::Organizations),
                KeyPattern::with_id(K::Organization, "id", id),
            ],
            Mutation::DeleteOrganization { id } => vec![
                KeyPattern::kind(K::Organizations),
                KeyPattern::with_id(K::Organization, "id", id),
                KeyPattern::with_id(K::OrganizationMembers, "organization_id", id),
                KeyPattern::kind(K::Projects),
            ],
            Mutation::AddOrganizationMember { id } => vec![
                KeyPattern::with_id(K::Organization, "id", id),
                KeyPattern::with_id(K::OrganizationMembers, "organization_id", id),
            ],
            Mutation::CreateProject => vec![KeyPattern::kind(K::Projects)],
            Mutation::UpdateProject { id } => vec![
                KeyPattern::kind(K::Projects),
                KeyPattern::with_id(K::Project, "id", id),
            ],
            Mutation::DeleteProject { id } => vec![
                KeyPattern::kind(K::Projects),
                KeyPattern::with_id(K::Project, "id", id),
                KeyPattern::with_id(K::ProjectBoards, "project_id", id),
                KeyPattern::with_id(K::Tasks, "project_id", id),
            ],
            Mutation::CreateBoard { project_id } => {
                vec![KeyPattern::with_id(K::ProjectBoards, "project_id", project_id)]
            }
            Mutation::UpdateBoard { id } => vec![
                KeyPattern::with_id(K::Board, "id", id),
                KeyPattern::kind(K::ProjectBoards),
            ],
            Mutation::DeleteBoard { id } => vec![
                KeyPattern::with_id(K::Board, "id", id),
                KeyPattern::kind(K::ProjectBoards),
                KeyPattern::with_id(K::Tasks, "board_id", id),
            ],
            Mutation::CreateColumn { board_id }
            | Mutation::UpdateColumn { board_id }
            | Mutation::DeleteColumn { board_id } => {
                vec![KeyPattern::with_id(K::Board, "id", board_id)]
            }
            Mutation::CreateTask => vec![KeyPattern::kind(K::Tasks)],
            Mutation::UpdateTask { id } | Mutation::DeleteTask { id } | Mutation::MoveTask { id } => {
                vec![
                    KeyPattern::kind(K::Tasks),
                    KeyPattern::with_id(K::Task, "id", id),
                ]
            }
            Mutation::UpdateProfile => vec![KeyPattern::kind(K::CurrentUser)],
            Mutation::Logout => vec![KeyPattern::any()],
        }
    }
}

/// One cached fetch result.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub value: serde_json::Value,
    pub fetched_at: Timestamp,
    pub stale: bool,
}

impl CacheEntry {
    /// Not marked stale and younger than `max_age` at `now`.
    pub fn is_fresh(&self, now: Timestamp, max_age: Duration) -> bool {
        !self.stale && now - self.fetched_at < max_age
    }
}

/// In-memory cache of query results.
#[derive(Debug, Clone)]
pub struct QueryCache {
    entries: HashMap<QueryKey, CacheEntry>,
    max_age: Duration,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_MAX_AGE_SECS))
    }
}

impl QueryCache {
    pub fn new(max_age: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            max_age,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, key: &QueryKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Whether `key` is cached, not stale and within `max_age`.
    pub fn is_fresh(&self, key: &QueryKey) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| entry.is_fresh(Utc::now(), self.max_age))
    }

    /// The cached value for `key` decoded as `T`, fresh or not.
    pub fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let entry = self.entries.get(key)?;
        match serde_json::from_value(entry.value.clone()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(?key, error = %e, "Cached value does not decode, ignoring");
                None
            }
        }
    }

    /// Store a freshly fetched value, replacing any previous entry.
    pub fn store<T: Serialize>(&mut self, key: QueryKey, value: &T) -> ApiResult<()> {
        let value = serde_json::to_value(value)?;
        self.entries.insert(
            key,
            CacheEntry {
                value,
                fetched_at: Utc::now(),
                stale: false,
            },
        );
        Ok(())
    }

    /// Return the cached value when fresh, otherwise run `fetcher`, cache
    /// its result and return it. Errors are returned and not cached; a
    /// stale entry stays in place when the refetch fails.
    pub async fn fetch<T, F, Fut>(&mut self, key: QueryKey, fetcher: F) -> ApiResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        if self.is_fresh(&key) {
            if let Some(value) = self.get(&key) {
                tracing::trace!(?key, "Query cache hit");
                return Ok(value);
            }
        }
        self.refresh(key, fetcher).await
    }

    /// Run `fetcher` unconditionally and cache its result.
    pub async fn refresh<T, F, Fut>(&mut self, key: QueryKey, fetcher: F) -> ApiResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        tracing::debug!(?key, "Query cache fetch");
        let value = fetcher().await?;
        self.store(key, &value)?;
        Ok(value)
    }

    /// Mark every entry matching `pattern` stale. Returns how many matched.
    pub fn mark_stale(&mut self, pattern: &KeyPattern) -> usize {
        let mut marked = 0;
        for (key, entry) in self.entries.iter_mut() {
            if pattern.matches(key) {
                entry.stale = true;
                marked += 1;
            }
        }
        marked
    }

    /// Apply the rule table for `mutation`. Returns the number of entries
    /// marked stale (an entry matched by several rules counts once).
    pub fn invalidate(&mut self, mutation: &Mutation) -> usize {
        let patterns = mutation.invalidates();
        let mut marked = 0;
        for (key, entry) in self.entries.iter_mut() {
            if patterns.iter().any(|p| p.matches(key)) {
                entry.stale = true;
                marked += 1;
            }
        }
        tracing::debug!(?mutation, marked, "Query cache invalidated");
        marked
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
