pub(crate) mod analysis;
pub(crate) mod config;
pub(crate) mod connectors;
pub(crate) mod dashboard;
pub(crate) mod projects;
pub(crate) mod report;
pub(crate) mod session;

use self::config::Config;
use self::connectors::{AuthProvider, ProjectStore};
use self::dashboard::ProjectDashboard;
use self::projects::ProjectService;
use self::session::SessionService;
use anyhow::Context;
use smartcollab_core::{LinkId, ProjectId, TaskId, UserProfile};
use std::path::Path;
use tracing::{debug, info};

/// Everything the CLI can do, each operation returning the text to print.
pub struct SmartCollab<'a, AUTH: AuthProvider, STORE: ProjectStore> {
    auth: &'a AUTH,
    store: &'a STORE,
    config: &'a Config,
}

impl<'a, AUTH: AuthProvider, STORE: ProjectStore> SmartCollab<'a, AUTH, STORE> {
    pub fn new(auth: &'a AUTH, store: &'a STORE, config: &'a Config) -> Self {
        Self {
            auth,
            store,
            config,
        }
    }

    fn sessions(&self) -> SessionService<'_, AUTH> {
        SessionService::new(self.auth, &self.config.session_file)
    }

    async fn current_user(&self) -> anyhow::Result<UserProfile> {
        Ok(self.sessions().current().await?.user)
    }

    async fn open_dashboard(
        &self,
        project_id: ProjectId,
    ) -> anyhow::Result<ProjectDashboard<'a, STORE>> {
        let user = self.current_user().await?;
        Ok(ProjectDashboard::open(self.store, &user, project_id).await?)
    }

    pub async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> anyhow::Result<String> {
        let session = self.sessions().sign_up(name, email, password).await?;
        Ok(format!("Welcome, {}! You are now logged in.\n", session.user.name))
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> anyhow::Result<String> {
        let session = self.sessions().sign_in(email, password).await?;
        Ok(format!("Logged in as {}.\n", session.user.name))
    }

    pub async fn sign_out(&self) -> anyhow::Result<String> {
        self.sessions().sign_out().await?;
        Ok("Logged out.\n".to_string())
    }

    pub async fn whoami(&self) -> anyhow::Result<String> {
        let user = self.current_user().await?;
        Ok(format!("{} <{}>\n", user.name, user.email))
    }

    pub async fn projects(&self) -> anyhow::Result<String> {
        let user = self.current_user().await?;
        let projects = ProjectService::new(self.store).list(&user).await?;
        Ok(report::ProjectList(&projects).to_string())
    }

    pub async fn create_project(&self, name: &str, description: &str) -> anyhow::Result<String> {
        let user = self.current_user().await?;
        let project = ProjectService::new(self.store)
            .create(&user, name, description)
            .await?;
        Ok(report::project_created(&project))
    }

    pub async fn join_project(&self, key: &str) -> anyhow::Result<String> {
        let user = self.current_user().await?;
        let project = ProjectService::new(self.store).join(&user, key).await?;
        Ok(format!("Joined project #{} {}\n", project.id, project.name))
    }

    pub async fn show(&self, project_id: ProjectId) -> anyhow::Result<String> {
        let dashboard = self.open_dashboard(project_id).await?;
        Ok(report::DashboardView {
            project: dashboard.project(),
            board: dashboard.board(),
            summary: &dashboard.summary(),
        }
        .to_string())
    }

    pub async fn add_task(
        &self,
        project_id: ProjectId,
        title: &str,
        assignee: Option<&str>,
    ) -> anyhow::Result<String> {
        let mut dashboard = self.open_dashboard(project_id).await?;
        let task = dashboard.add_task(title, assignee).await?;
        Ok(format!("Added {}\n", report::task_line(&task)))
    }

    pub async fn toggle_task(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> anyhow::Result<String> {
        let mut dashboard = self.open_dashboard(project_id).await?;
        let completed = dashboard.toggle_task(task_id).await?;
        let progress = dashboard.summary().progress;
        let state = if completed { "done" } else { "not done" };
        Ok(format!(
            "Task #{} marked {}. Project is {}% complete.\n",
            task_id, state, progress.percentage
        ))
    }

    pub async fn delete_task(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
    ) -> anyhow::Result<String> {
        let mut dashboard = self.open_dashboard(project_id).await?;
        let task = dashboard.delete_task(task_id).await?;
        Ok(format!("Deleted task #{} {}\n", task.id, task.title))
    }

    pub async fn add_link(
        &self,
        project_id: ProjectId,
        title: &str,
        url: &str,
    ) -> anyhow::Result<String> {
        let mut dashboard = self.open_dashboard(project_id).await?;
        let link = dashboard.add_link(title, url).await?;
        Ok(format!("Added link #{} {}\n", link.id, link.title))
    }

    pub async fn delete_link(
        &self,
        project_id: ProjectId,
        link_id: LinkId,
    ) -> anyhow::Result<String> {
        let mut dashboard = self.open_dashboard(project_id).await?;
        let link = dashboard.remove_link(link_id).await?;
        Ok(format!("Deleted link #{} {}\n", link.id, link.title))
    }

    /// Lists a local file on the project. Only its name and size are recorded.
    pub async fn add_file(&self, project_id: ProjectId, path: &Path) -> anyhow::Result<String> {
        let metadata = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("Cannot read {}", path.display()))?;
        anyhow::ensure!(metadata.is_file(), "{} is not a file", path.display());
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .with_context(|| format!("{} has no file name", path.display()))?;

        let user = self.current_user().await?;
        let mut dashboard = ProjectDashboard::open(self.store, &user, project_id).await?;
        let file = dashboard.add_file(&name, metadata.len(), &user).await?;
        Ok(format!("Added file {} ({} bytes)\n", file.name, file.size_bytes))
    }

    /// Runs the mocked analysis. Ctrl-C abandons it.
    pub async fn analyze(&self, project_id: ProjectId) -> anyhow::Result<String> {
        let dashboard = self.open_dashboard(project_id).await?;
        let mut handle = analysis::spawn_analysis(
            dashboard.project().name.clone(),
            dashboard.board().clone(),
            self.config.analysis.delay(),
        );
        info!(project_id, "Analyzing project");

        let findings = tokio::select! {
            result = handle.wait() => result?,
            _ = tokio::signal::ctrl_c() => {
                handle.cancel();
                debug!(state = ?handle.state(), "Analysis abandoned");
                return Err(analysis::AnalysisError::Cancelled.into());
            }
        };
        Ok(report::AnalysisView(&findings).to_string())
    }
}
