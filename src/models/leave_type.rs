//! Leave type model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::LeaveTypeId;

/// A named leave category with a yearly grant.
///
/// A sandwich type counts every calendar day of a request, weekoffs and
/// holidays included; other types count working days only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveType {
    /// Unique identifier for the leave type.
    pub id: LeaveTypeId,
    /// Display name (e.g., "Casual Leave").
    pub name: String,
    /// Short code used by configuration lookups (e.g., "casual").
    pub code: String,
    /// Days granted per allocation year.
    pub yearly_grant: Decimal,
    /// Whether weekoffs and holidays inside a request are charged.
    #[serde(default)]
    pub is_sandwich_type: bool,
}
