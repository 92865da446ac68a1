//! Staff roles and the capabilities they grant.
//!
//! Capabilities are derived once per request from the acting [`Principal`];
//! callers then ask scoped questions ("may this person book in branch X?")
//! instead of comparing role strings. Slot computation never consults them.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ClinicError, Result};
use crate::ids::{BranchId, ProfileId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Doctor,
    Receptionist,
}

impl FromStr for Role {
    type Err = ClinicError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "doctor" => Ok(Role::Doctor),
            "receptionist" => Ok(Role::Receptionist),
            other => Err(ClinicError::Config(format!(
                "unknown role '{}' (expected admin, doctor or receptionist)",
                other
            ))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Receptionist => "receptionist",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ViewAllBranches,
    ManageBranches,
    ManageStaff,
    ManageSchedules,
    ManageAppointments,
    EditClinicalNotes,
}

/// The signed-in staff member acting on a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: ProfileId,
    pub role: Role,
    /// Home branch; admins usually have none.
    pub branch_id: Option<BranchId>,
}

#[derive(Debug, Clone)]
pub struct Capabilities {
    principal: Principal,
    granted: HashSet<Capability>,
}

impl Capabilities {
    pub fn for_principal(principal: &Principal) -> Self {
        use Capability::*;

        let granted: HashSet<Capability> = match principal.role {
            Role::Admin => [
                ViewAllBranches,
                ManageBranches,
                ManageStaff,
                ManageSchedules,
                ManageAppointments,
                EditClinicalNotes,
            ]
            .into_iter()
            .collect(),
            Role::Doctor => [ManageSchedules, ManageAppointments, EditClinicalNotes]
                .into_iter()
                .collect(),
            Role::Receptionist => [ManageSchedules, ManageAppointments].into_iter().collect(),
        };

        Self {
            principal: principal.clone(),
            granted,
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.granted.contains(&capability)
    }

    fn in_branch(&self, branch: BranchId) -> bool {
        self.has(Capability::ViewAllBranches) || self.principal.branch_id == Some(branch)
    }

    pub fn can_view_branch(&self, branch: BranchId) -> bool {
        self.in_branch(branch)
    }

    pub fn can_manage_appointments_in(&self, branch: BranchId) -> bool {
        self.has(Capability::ManageAppointments) && self.in_branch(branch)
    }

    /// Admins, the doctor themself, or staff of the rule's branch.
    pub fn can_manage_schedule(&self, doctor: ProfileId, branch: BranchId) -> bool {
        self.has(Capability::ManageSchedules)
            && (self.principal.id == doctor || self.in_branch(branch))
    }

    pub fn can_edit_clinical_notes(&self, branch: BranchId) -> bool {
        self.has(Capability::EditClinicalNotes) && self.in_branch(branch)
    }

    /// Turn a failed check into `ClinicError::Forbidden`.
    pub fn require(&self, allowed: bool, action: &str) -> Result<()> {
        if allowed {
            Ok(())
        } else {
            Err(ClinicError::Forbidden(format!(
                "{} ({}) may not {}",
                self.principal.id, self.principal.role, action
            )))
        }
    }
}
