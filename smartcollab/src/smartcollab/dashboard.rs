//! The project page: one project's board plus the statistics derived from it.
//!
//! Every change is written to the backend first and only then applied to the
//! local [`Board`], so a failed write leaves the board untouched.
use crate::smartcollab::connectors::{self, ProjectStore};
use smartcollab_core::{
    Board, BoardError, ContributionStat, Link, LinkId, NewLink, NewTask, Progress, Project,
    ProjectFile, ProjectId, Task, TaskId, UserProfile,
};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum Error {
    #[error("You are not a member of project {0}")]
    NotAMember(ProjectId),
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Backend(#[from] connectors::Error),
}

/// Statistics shown next to the task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    pub progress: Progress,
    pub contributions: Vec<ContributionStat>,
    /// Tasks not attributed to anyone on the team
    pub unassigned: usize,
}

pub struct ProjectDashboard<'a, STORE: ProjectStore> {
    store: &'a STORE,
    project: Project,
    board: Board,
}

impl<'a, STORE: ProjectStore> ProjectDashboard<'a, STORE> {
    /// Loads a project for `user`, who must be on its team.
    #[tracing::instrument(skip(store))]
    pub async fn open(
        store: &'a STORE,
        user: &UserProfile,
        project_id: ProjectId,
    ) -> Result<Self, Error> {
        let project = store.get_project(project_id).await?;
        let team = store.list_members(project_id).await?;
        if !team.iter().any(|member| member.id == user.id) {
            return Err(Error::NotAMember(project_id));
        }

        let (tasks, links, files) = tokio::try_join!(
            store.list_tasks(project_id),
            store.list_links(project_id),
            store.list_files(project_id),
        )?;
        debug!(
            tasks = tasks.len(),
            links = links.len(),
            files = files.len(),
            "Loaded board"
        );

        Ok(Self {
            store,
            project,
            board: Board::new(tasks, links, files, team),
        })
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary {
            progress: self.board.progress(),
            contributions: self.board.contributions(),
            unassigned: self.board.unassigned_tasks().len(),
        }
    }

    #[tracing::instrument(skip(self), fields(project_id = self.project.id))]
    pub async fn add_task(
        &mut self,
        title: &str,
        assigned_to: Option<&str>,
    ) -> Result<Task, Error> {
        let draft = NewTask::new(title, assigned_to)?;
        let task = self.store.insert_task(self.project.id, draft).await?;
        self.board.insert_task(task.clone());
        info!(task_id = task.id, "Task added");
        Ok(task)
    }

    /// Flips a task between done and not done, returning the new state.
    #[tracing::instrument(skip(self), fields(project_id = self.project.id))]
    pub async fn toggle_task(&mut self, task_id: TaskId) -> Result<bool, Error> {
        let completed = !self
            .board
            .task(task_id)
            .ok_or(BoardError::TaskNotFound(task_id))?
            .completed;
        self.store
            .set_task_completed(self.project.id, task_id, completed)
            .await?;
        self.board.set_task_completed(task_id, completed)?;
        Ok(completed)
    }

    #[tracing::instrument(skip(self), fields(project_id = self.project.id))]
    pub async fn delete_task(&mut self, task_id: TaskId) -> Result<Task, Error> {
        if self.board.task(task_id).is_none() {
            return Err(BoardError::TaskNotFound(task_id).into());
        }
        self.store.delete_task(self.project.id, task_id).await?;
        Ok(self.board.remove_task(task_id)?)
    }

    #[tracing::instrument(skip(self), fields(project_id = self.project.id))]
    pub async fn add_link(&mut self, title: &str, url: &str) -> Result<Link, Error> {
        let draft = NewLink::new(title, url)?;
        let link = self.store.insert_link(self.project.id, draft).await?;
        self.board.insert_link(link.clone());
        Ok(link)
    }

    #[tracing::instrument(skip(self), fields(project_id = self.project.id))]
    pub async fn remove_link(&mut self, link_id: LinkId) -> Result<Link, Error> {
        if !self.board.links.iter().any(|link| link.id == link_id) {
            return Err(BoardError::LinkNotFound(link_id).into());
        }
        self.store.delete_link(self.project.id, link_id).await?;
        Ok(self.board.remove_link(link_id)?)
    }

    /// Lists a file on the project as uploaded by `uploader`.
    #[tracing::instrument(skip(self), fields(project_id = self.project.id))]
    pub async fn add_file(
        &mut self,
        name: &str,
        size_bytes: u64,
        uploader: &UserProfile,
    ) -> Result<ProjectFile, Error> {
        let file = self
            .store
            .add_file(self.project.id, name, size_bytes, &uploader.name)
            .await?;
        self.board.insert_file(file.clone());
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smartcollab::connectors::MockProjectStore;
    use chrono::{TimeZone, Utc};
    use mockall::predicate::*;
    use smartcollab_core::{JoinKey, Member};

    const PROJECT_ID: ProjectId = 1;

    fn user() -> UserProfile {
        UserProfile {
            id: "user_dan".to_string(),
            name: "Dan".to_string(),
            email: "dan@example.com".to_string(),
        }
    }

    fn task(id: TaskId, assigned_to: Option<&str>, completed: bool) -> Task {
        Task {
            id,
            title: format!("Task {}", id),
            assigned_to: assigned_to.map(str::to_string),
            completed,
        }
    }

    /// A store holding the Dan/Sarah project with two of four tasks done.
    fn setup_store() -> MockProjectStore {
        let mut store = MockProjectStore::new();
        store.expect_get_project().with(eq(PROJECT_ID)).returning(|id| {
            Ok(Project {
                id,
                name: "AI Navigation System".to_string(),
                description: String::new(),
                created_at: Utc.with_ymd_and_hms(2025, 11, 20, 10, 0, 0).unwrap(),
                owner_id: "user_123".to_string(),
                join_key: JoinKey::parse("NAV-8821").unwrap(),
            })
        });
        store.expect_list_members().returning(|_| {
            Ok(vec![
                Member {
                    id: "user_dan".to_string(),
                    name: "Dan".to_string(),
                },
                Member {
                    id: "user_sarah".to_string(),
                    name: "Sarah".to_string(),
                },
            ])
        });
        store.expect_list_tasks().returning(|_| {
            Ok(vec![
                task(1, Some("Dan"), true),
                task(2, Some("Dan"), true),
                task(3, Some("Sarah"), false),
                task(4, Some("Sarah"), false),
            ])
        });
        store.expect_list_links().returning(|_| Ok(vec![]));
        store.expect_list_files().returning(|_| Ok(vec![]));
        store
    }

    #[tokio::test]
    async fn summary_reports_progress_and_ranked_contributions() {
        // Arrange
        let store = setup_store();

        // Act
        let dashboard = ProjectDashboard::open(&store, &user(), PROJECT_ID)
            .await
            .unwrap();
        let summary = dashboard.summary();

        // Assert
        assert_eq!(
            summary.progress,
            Progress {
                completed: 2,
                total: 4,
                percentage: 50
            }
        );
        assert_eq!(summary.contributions[0].name, "Dan");
        assert_eq!(summary.contributions[0].overall_contribution, 50);
        assert_eq!(summary.contributions[1].name, "Sarah");
        assert_eq!(summary.contributions[1].overall_contribution, 0);
        assert_eq!(summary.unassigned, 0);
    }

    #[tokio::test]
    async fn outsiders_cannot_open_the_project() {
        let store = setup_store();
        let outsider = UserProfile {
            id: "user_999".to_string(),
            name: "Ben".to_string(),
            email: "ben@example.com".to_string(),
        };

        let result = ProjectDashboard::open(&store, &outsider, PROJECT_ID).await;

        assert!(matches!(result, Err(Error::NotAMember(PROJECT_ID))));
    }

    #[tokio::test]
    async fn toggle_persists_then_updates_board() {
        let mut store = setup_store();
        store
            .expect_set_task_completed()
            .with(eq(PROJECT_ID), eq(3), eq(true))
            .times(1)
            .returning(|_, _, _| Ok(()));
        let mut dashboard = ProjectDashboard::open(&store, &user(), PROJECT_ID)
            .await
            .unwrap();

        let completed = dashboard.toggle_task(3).await.unwrap();

        assert!(completed);
        let summary = dashboard.summary();
        assert_eq!(summary.progress.percentage, 75);
        assert_eq!(summary.contributions[0].name, "Dan");
        assert_eq!(summary.contributions[1].overall_contribution, 25);
    }

    #[tokio::test]
    async fn failed_write_leaves_board_untouched() {
        let mut store = setup_store();
        store
            .expect_set_task_completed()
            .returning(|_, task_id, _| Err(connectors::Error::TaskNotFound(task_id)));
        let mut dashboard = ProjectDashboard::open(&store, &user(), PROJECT_ID)
            .await
            .unwrap();

        let result = dashboard.toggle_task(1).await;

        assert!(result.is_err());
        assert!(dashboard.board().task(1).unwrap().completed);
    }

    #[tokio::test]
    async fn toggling_unknown_task_never_reaches_store() {
        let store = setup_store();
        let mut dashboard = ProjectDashboard::open(&store, &user(), PROJECT_ID)
            .await
            .unwrap();

        let result = dashboard.toggle_task(42).await;

        assert!(matches!(
            result,
            Err(Error::Board(BoardError::TaskNotFound(42)))
        ));
    }

    #[tokio::test]
    async fn added_task_lowers_progress() {
        let mut store = setup_store();
        store
            .expect_insert_task()
            .withf(|project_id, draft| {
                *project_id == PROJECT_ID
                    && draft.title() == "Write report"
                    && draft.assigned_to().is_none()
            })
            .times(1)
            .returning(|_, draft| Ok(draft.into_task(5)));
        let mut dashboard = ProjectDashboard::open(&store, &user(), PROJECT_ID)
            .await
            .unwrap();

        let task = dashboard.add_task("Write report", None).await.unwrap();

        assert_eq!(task.id, 5);
        let summary = dashboard.summary();
        assert_eq!(summary.progress.percentage, 40);
        assert_eq!(summary.unassigned, 1);
        assert_eq!(summary.contributions[0].overall_contribution, 40);
    }

    #[tokio::test]
    async fn blank_task_title_is_rejected() {
        let store = setup_store();
        let mut dashboard = ProjectDashboard::open(&store, &user(), PROJECT_ID)
            .await
            .unwrap();

        let result = dashboard.add_task("  ", Some("Dan")).await;

        assert!(matches!(result, Err(Error::Board(BoardError::EmptyTaskTitle))));
    }

    #[tokio::test]
    async fn deleted_task_leaves_the_board() {
        let mut store = setup_store();
        store
            .expect_delete_task()
            .with(eq(PROJECT_ID), eq(4))
            .times(1)
            .returning(|_, _| Ok(()));
        let mut dashboard = ProjectDashboard::open(&store, &user(), PROJECT_ID)
            .await
            .unwrap();

        let removed = dashboard.delete_task(4).await.unwrap();

        assert_eq!(removed.id, 4);
        assert_eq!(dashboard.summary().progress.percentage, 67);
    }

    #[tokio::test]
    async fn links_are_validated_before_storing() {
        let store = setup_store();
        let mut dashboard = ProjectDashboard::open(&store, &user(), PROJECT_ID)
            .await
            .unwrap();

        let result = dashboard.add_link("Docs", "docs.example.com").await;

        assert!(matches!(result, Err(Error::Board(BoardError::InvalidLinkUrl))));
    }

    #[tokio::test]
    async fn uploaded_file_is_attributed_to_uploader() {
        let mut store = setup_store();
        store
            .expect_add_file()
            .with(eq(PROJECT_ID), eq("notes.md"), eq(120), eq("Dan"))
            .times(1)
            .returning(|_, name, size_bytes, uploaded_by| {
                Ok(ProjectFile {
                    id: 10,
                    name: name.to_string(),
                    size_bytes,
                    uploaded_by: uploaded_by.to_string(),
                    uploaded_at: Utc.with_ymd_and_hms(2025, 11, 21, 8, 0, 0).unwrap(),
                })
            });
        let mut dashboard = ProjectDashboard::open(&store, &user(), PROJECT_ID)
            .await
            .unwrap();

        let file = dashboard.add_file("notes.md", 120, &user()).await.unwrap();

        assert_eq!(file.uploaded_by, "Dan");
        assert_eq!(dashboard.board().files.len(), 1);
    }
}
