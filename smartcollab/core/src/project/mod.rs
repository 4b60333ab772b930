//! Projects, join keys and the users that own or join them.
use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub type ProjectId = u64;
pub type UserId = String;

/// Upper bound (exclusive) of the number in a generated join key.
pub const GENERATED_KEY_RANGE: u32 = 10_000;

/// A collaboration workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub owner_id: UserId,
    pub join_key: JoinKey,
}

impl Project {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }
}

/// A signed-in user as seen by the rest of the application.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ProjectError {
    #[error("Project name is required")]
    NameRequired,
    #[error("Join key is required")]
    EmptyJoinKey,
}

/// Opaque code that lets another user join a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct JoinKey(String);

impl JoinKey {
    /// Parses user input. Surrounding whitespace is ignored, case is kept.
    pub fn parse(raw: &str) -> Result<Self, ProjectError> {
        let key = raw.trim();
        if key.is_empty() {
            return Err(ProjectError::EmptyJoinKey);
        }
        Ok(JoinKey(key.to_string()))
    }

    /// Key handed out to newly created projects, e.g. `NEW-4821`.
    ///
    /// `number` is reduced into `0..GENERATED_KEY_RANGE`.
    pub fn generated(number: u32) -> Self {
        JoinKey(format!("NEW-{}", number % GENERATED_KEY_RANGE))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A project as filled in on the creation form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    name: String,
    description: String,
}

impl ProjectDraft {
    /// The name must not be blank. The description is optional.
    pub fn new(name: &str, description: &str) -> Result<Self, ProjectError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProjectError::NameRequired);
        }
        Ok(ProjectDraft {
            name: name.to_string(),
            description: description.trim().to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Builds the project once the backend has picked an id and key.
    pub fn into_project(
        self,
        id: ProjectId,
        owner_id: UserId,
        join_key: JoinKey,
        created_at: DateTime<Utc>,
    ) -> Project {
        Project {
            id,
            name: self.name,
            description: self.description,
            created_at,
            owner_id,
            join_key,
        }
    }
}
