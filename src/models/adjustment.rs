//! Audit records for changes to allocation record counters.
//!
//! Every counter mutation made by the leave count update service returns one
//! of these, so callers can log or persist what a lifecycle event changed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AllocationRecordId, LeaveAllocationId, LeaveRequestId, LeaveTypeId};

/// How a counter was changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    /// Days were added to `used`.
    Increment,
    /// Days were subtracted from `used`, clamping at zero.
    Decrement,
}

impl std::fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdjustmentKind::Increment => write!(f, "increment"),
            AdjustmentKind::Decrement => write!(f, "decrement"),
        }
    }
}

/// A relative change applied to one allocation record for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountAdjustment {
    /// The adjusted record.
    pub record_id: AllocationRecordId,
    /// The request whose lifecycle event caused the change.
    pub leave_request_id: LeaveRequestId,
    /// Direction of the change.
    pub kind: AdjustmentKind,
    /// Days added or subtracted.
    pub days: Decimal,
    /// The record's `used` value after the change.
    pub used_after: Decimal,
}

/// The result of recomputing one record's `used` from approved requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRecount {
    /// The recomputed record.
    pub record_id: AllocationRecordId,
    /// Its allocation.
    pub leave_allocation_id: LeaveAllocationId,
    /// Its leave type.
    pub leave_type_id: LeaveTypeId,
    /// `used` before the recount.
    pub previous_used: Decimal,
    /// `used` after the recount.
    pub used: Decimal,
    /// Number of approved requests that were summed.
    pub request_count: usize,
}

impl RecordRecount {
    /// Returns true if the recount changed the stored value.
    pub fn changed(&self) -> bool {
        self.previous_used != self.used
    }
}
