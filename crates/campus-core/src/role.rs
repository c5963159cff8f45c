//! The closed role enumeration and the per-subject role record.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, subject::SubjectId};

/// A subject's authority level within the school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
  Owner,
  Admin,
  Teacher,
  ClassSupervisor,
  Student,
  Parent,
  Accountant,
}

impl Role {
  pub const ALL: [Role; 7] = [
    Role::Owner,
    Role::Admin,
    Role::Teacher,
    Role::ClassSupervisor,
    Role::Student,
    Role::Parent,
    Role::Accountant,
  ];

  /// The string stored in the `role` column.
  /// Must match the `rename_all = "snake_case"` serde tags above.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Owner => "owner",
      Self::Admin => "admin",
      Self::Teacher => "teacher",
      Self::ClassSupervisor => "class_supervisor",
      Self::Student => "student",
      Self::Parent => "parent",
      Self::Accountant => "accountant",
    }
  }

  /// Principal-level authority. New elevated roles must be added here
  /// explicitly.
  pub fn is_elevated(&self) -> bool {
    match self {
      Self::Owner | Self::Admin => true,
      Self::Teacher
      | Self::ClassSupervisor
      | Self::Student
      | Self::Parent
      | Self::Accountant => false,
    }
  }
}

/// Free-function form of [`Role::is_elevated`].
pub fn is_elevated(role: Role) -> bool { role.is_elevated() }

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Role {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Role::ALL
      .into_iter()
      .find(|r| r.as_str() == s)
      .ok_or_else(|| Error::UnknownRole(s.to_owned()))
  }
}

/// The authorization fact for a subject. At most one exists per subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
  pub subject_id: SubjectId,
  pub role:       Role,
}
