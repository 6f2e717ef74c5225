//! Installation and contract metadata returned by the portal.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One metered installation under the account's contracts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installation {
    /// Portal installation id (the contract's `anlage` field).
    pub id: String,
    /// Move-in date; consumption history starts here.
    pub contract_start: NaiveDate,
    /// Move-out date; `None` for active contracts.
    pub contract_end: Option<NaiveDate>,
    /// Street address of the service point, when the portal reports one.
    pub address: Option<String>,
}

impl Installation {
    /// Whether the contract is still active (no move-out date).
    pub fn is_active(&self) -> bool {
        self.contract_end.is_none()
    }
}
