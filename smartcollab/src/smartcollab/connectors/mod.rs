//! Connectivity to the hosted backend that owns accounts and project data.
//!
//! The application never persists anything itself. It talks to the backend
//! through two traits:
//! - [`AuthProvider`] for sign-up, sign-in and session lookup
//! - [`ProjectStore`] for projects, membership, tasks, links and file listings
//!
//! A concrete implementation keeping everything in one JSON document is
//! provided in the `file_store` submodule.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use smartcollab_core::{
    JoinKey, Link, LinkId, Member, NewLink, NewTask, Project, ProjectDraft, ProjectFile,
    ProjectError, ProjectId, RecordError, Task, TaskId, UserProfile,
};
use thiserror::Error;

pub(crate) mod file_store;

/// Errors reported by the backend.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("An account already exists for {0}")]
    EmailTaken(String),
    #[error("Session has expired, please log in again")]
    UnknownSession,
    #[error("User {0} not found")]
    UserNotFound(String),
    #[error("Project {0} not found")]
    ProjectNotFound(ProjectId),
    #[error("No project uses join key {0}")]
    UnknownJoinKey(JoinKey),
    #[error("You are already a member of project {0}")]
    AlreadyMember(ProjectId),
    #[error("Every generated join key is already in use")]
    JoinKeysExhausted,
    #[error("Task {0} not found")]
    TaskNotFound(TaskId),
    #[error("Link {0} not found")]
    LinkNotFound(LinkId),
    #[error(transparent)]
    InvalidProject(#[from] ProjectError),
    /// A stored record failed validation when it was read back
    #[error("Stored record is invalid: {0}")]
    InvalidRecord(#[from] RecordError),
    #[error("Cannot access data file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Data file is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// An authenticated session handed out by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

/// Account and session management.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AuthProvider {
    /// Creates an account and signs it in.
    async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<Session, Error>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, Error>;
    /// Invalidates the token. Unknown tokens are not an error.
    async fn sign_out(&self, token: &str) -> Result<(), Error>;
    /// Resolves a token back to its user.
    async fn current_user(&self, token: &str) -> Result<UserProfile, Error>;
}

/// Project data owned by the backend.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProjectStore {
    /// Projects the user owns or has joined, newest first.
    async fn list_projects(&self, user_id: &str) -> Result<Vec<Project>, Error>;
    async fn get_project(&self, project_id: ProjectId) -> Result<Project, Error>;
    /// Stores a new project with a fresh join key. The owner becomes its first member.
    async fn create_project(&self, owner_id: &str, draft: ProjectDraft) -> Result<Project, Error>;
    /// Adds the user to the project using `key`.
    async fn join_project(&self, user_id: &str, key: &JoinKey) -> Result<Project, Error>;
    async fn list_members(&self, project_id: ProjectId) -> Result<Vec<Member>, Error>;

    async fn list_tasks(&self, project_id: ProjectId) -> Result<Vec<Task>, Error>;
    async fn insert_task(&self, project_id: ProjectId, task: NewTask) -> Result<Task, Error>;
    async fn set_task_completed(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
        completed: bool,
    ) -> Result<(), Error>;
    async fn delete_task(&self, project_id: ProjectId, task_id: TaskId) -> Result<(), Error>;

    async fn list_links(&self, project_id: ProjectId) -> Result<Vec<Link>, Error>;
    async fn insert_link(&self, project_id: ProjectId, link: NewLink) -> Result<Link, Error>;
    async fn delete_link(&self, project_id: ProjectId, link_id: LinkId) -> Result<(), Error>;

    async fn list_files(&self, project_id: ProjectId) -> Result<Vec<ProjectFile>, Error>;
    /// Records a file listing entry uploaded by `uploaded_by`.
    async fn add_file(
        &self,
        project_id: ProjectId,
        name: &str,
        size_bytes: u64,
        uploaded_by: &str,
    ) -> Result<ProjectFile, Error>;
}
