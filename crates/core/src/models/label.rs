//! Label entity model. Labels belong to a project and are attached to tasks.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// A project-scoped label, e.g. `frontend` in `#3b82f6`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    /// Hex color code, `#rgb` or `#rrggbb`.
    pub color: String,
    pub created_at: Timestamp,
}
