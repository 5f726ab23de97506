//! Designation model.

use serde::{Deserialize, Serialize};

use super::DesignationId;

/// A position in the organisation chart.
///
/// Designations form a tree through `parent_id`; a manager oversees the
/// employees whose designation lies below their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Designation {
    /// Unique identifier for the designation.
    pub id: DesignationId,
    /// Display name (e.g., "Engineering Manager").
    pub name: String,
    /// The designation this one reports to.
    #[serde(default)]
    pub parent_id: Option<DesignationId>,
}
