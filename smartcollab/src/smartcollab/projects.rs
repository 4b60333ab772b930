use crate::smartcollab::connectors::{self, ProjectStore};
use smartcollab_core::{JoinKey, Project, ProjectDraft, ProjectError, UserProfile};
use std::fmt;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Invalid(#[from] ProjectError),
    #[error(transparent)]
    Backend(#[from] connectors::Error),
}

/// How the signed-in user relates to a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Owner,
    Member,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Owner => f.write_str("You are the owner"),
            Role::Member => f.write_str("Member"),
        }
    }
}

/// A project card on the home screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    pub project: Project,
    pub role: Role,
}

pub struct ProjectService<'a, STORE: ProjectStore> {
    store: &'a STORE,
}

impl<'a, STORE: ProjectStore> ProjectService<'a, STORE> {
    pub fn new(store: &'a STORE) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list(&self, user: &UserProfile) -> Result<Vec<ProjectSummary>, Error> {
        let projects = self.store.list_projects(&user.id).await?;
        Ok(projects
            .into_iter()
            .map(|project| {
                let role = if project.is_owned_by(&user.id) {
                    Role::Owner
                } else {
                    Role::Member
                };
                ProjectSummary { project, role }
            })
            .collect())
    }

    #[tracing::instrument(skip(self))]
    pub async fn create(
        &self,
        user: &UserProfile,
        name: &str,
        description: &str,
    ) -> Result<Project, Error> {
        let draft = ProjectDraft::new(name, description)?;
        let project = self.store.create_project(&user.id, draft).await?;
        info!(project_id = project.id, "Created project {}", project.name);
        Ok(project)
    }

    #[tracing::instrument(skip(self))]
    pub async fn join(&self, user: &UserProfile, raw_key: &str) -> Result<Project, Error> {
        let key = JoinKey::parse(raw_key)?;
        Ok(self.store.join_project(&user.id, &key).await?)
    }
}
