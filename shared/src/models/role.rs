//! Roles and the capability table
//!
//! Permission checks go through `Role::permissions()` once per request; the
//! ledger core itself only ever sees a pre-authorized principal.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Actions a principal may be allowed to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    LedgerRead,
    LedgerWrite,
    MetricsRead,
    MetricsWrite,
    AuditRead,
}

/// Principal roles within a business
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Manager,
    Staff,
    Viewer,
}

impl Role {
    /// The capability table: every permission granted to this role
    pub fn permissions(&self) -> &'static [Permission] {
        use Permission::*;
        match self {
            Role::Owner => &[
                LedgerRead,
                LedgerWrite,
                MetricsRead,
                MetricsWrite,
                AuditRead,
            ],
            Role::Manager => &[
                LedgerRead,
                LedgerWrite,
                MetricsRead,
                MetricsWrite,
                AuditRead,
            ],
            Role::Staff => &[LedgerRead, LedgerWrite, MetricsRead],
            Role::Viewer => &[LedgerRead, MetricsRead],
        }
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Manager => "manager",
            Role::Staff => "staff",
            Role::Viewer => "viewer",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Role::Owner),
            "manager" => Ok(Role::Manager),
            "staff" => Ok(Role::Staff),
            "viewer" => Ok(Role::Viewer),
            other => Err(format!("unknown role: {other}")),
        }
    }
}
