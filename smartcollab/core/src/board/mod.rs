//! The in-memory state of one open project: its tasks, shared links, files and team.
use crate::contribution::{self, ContributionStat, Progress};
use chrono::{DateTime, Utc};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub type TaskId = u64;
pub type LinkId = u64;

/// A unit of work with an optional assignee (a member's display name).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub assigned_to: Option<String>,
    pub completed: bool,
}

/// A member of a project's team.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Member {
    pub id: String,
    pub name: String,
}

/// A shared link pinned to a project.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Link {
    pub id: LinkId,
    pub title: String,
    pub url: String,
}

/// A file listed on a project. File contents never pass through here.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProjectFile {
    pub id: u64,
    pub name: String,
    pub size_bytes: u64,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BoardError {
    #[error("Task title is required")]
    EmptyTaskTitle,
    #[error("Link title is required")]
    EmptyLinkTitle,
    #[error("Link URL must start with http:// or https://")]
    InvalidLinkUrl,
    #[error("Task {0} not found")]
    TaskNotFound(TaskId),
    #[error("Link {0} not found")]
    LinkNotFound(LinkId),
}

/// A task as submitted by a user, before the backend assigns it an id.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NewTask {
    title: String,
    assigned_to: Option<String>,
}

impl NewTask {
    /// Trims the title and assignee. A blank assignee means "unassigned".
    pub fn new(title: &str, assigned_to: Option<&str>) -> Result<Self, BoardError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(BoardError::EmptyTaskTitle);
        }
        let assigned_to = assigned_to
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        Ok(Self {
            title: title.to_string(),
            assigned_to,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn assigned_to(&self) -> Option<&str> {
        self.assigned_to.as_deref()
    }

    /// Turns the draft into a stored task once an id is known.
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            title: self.title,
            assigned_to: self.assigned_to,
            completed: false,
        }
    }
}

/// A link as submitted by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NewLink {
    title: String,
    url: String,
}

impl NewLink {
    pub fn new(title: &str, url: &str) -> Result<Self, BoardError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(BoardError::EmptyLinkTitle);
        }
        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(BoardError::InvalidLinkUrl);
        }
        Ok(Self {
            title: title.to_string(),
            url: url.to_string(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn into_link(self, id: LinkId) -> Link {
        Link {
            id,
            title: self.title,
            url: self.url,
        }
    }
}

/// Everything the project view shows, owned by the view layer.
///
/// The board never talks to a backend. Callers persist a change first and then
/// apply it here, so the board always mirrors what was stored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Board {
    pub tasks: Vec<Task>,
    pub links: Vec<Link>,
    pub files: Vec<ProjectFile>,
    pub team: Vec<Member>,
}

impl Board {
    pub fn new(
        tasks: Vec<Task>,
        links: Vec<Link>,
        files: Vec<ProjectFile>,
        team: Vec<Member>,
    ) -> Self {
        Board {
            tasks,
            links,
            files,
            team,
        }
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Appends a task. New tasks go to the end of the list.
    pub fn insert_task(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Flips a task's completion state and returns the new state.
    pub fn toggle_task(&mut self, id: TaskId) -> Result<bool, BoardError> {
        let task = self.task_mut(id)?;
        task.completed = !task.completed;
        Ok(task.completed)
    }

    pub fn set_task_completed(&mut self, id: TaskId, completed: bool) -> Result<(), BoardError> {
        self.task_mut(id)?.completed = completed;
        Ok(())
    }

    /// Removes a task, returning it.
    pub fn remove_task(&mut self, id: TaskId) -> Result<Task, BoardError> {
        let index = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or(BoardError::TaskNotFound(id))?;
        Ok(self.tasks.remove(index))
    }

    pub fn insert_link(&mut self, link: Link) {
        self.links.push(link);
    }

    pub fn remove_link(&mut self, id: LinkId) -> Result<Link, BoardError> {
        let index = self
            .links
            .iter()
            .position(|link| link.id == id)
            .ok_or(BoardError::LinkNotFound(id))?;
        Ok(self.links.remove(index))
    }

    pub fn insert_file(&mut self, file: ProjectFile) {
        self.files.push(file);
    }

    pub fn progress(&self) -> Progress {
        contribution::compute_progress(&self.tasks)
    }

    pub fn contributions(&self) -> Vec<ContributionStat> {
        contribution::compute_contributions(&self.tasks, &self.team)
    }

    /// Tasks whose assignee is missing or does not name a team member.
    pub fn unassigned_tasks(&self) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|task| match task.assigned_to.as_deref() {
                Some(name) => !self.team.iter().any(|member| member.name == name),
                None => true,
            })
            .collect()
    }

    fn task_mut(&mut self, id: TaskId) -> Result<&mut Task, BoardError> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(BoardError::TaskNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_board() -> Board {
        Board::new(
            vec![
                NewTask::new("Write report", Some("Dan")).unwrap().into_task(1),
                NewTask::new("Draw map", Some("Sarah")).unwrap().into_task(2),
                NewTask::new("Book room", None).unwrap().into_task(3),
            ],
            vec![],
            vec![],
            vec![
                Member {
                    id: "u1".to_string(),
                    name: "Dan".to_string(),
                },
                Member {
                    id: "u2".to_string(),
                    name: "Sarah".to_string(),
                },
            ],
        )
    }

    mod draft_tests {
        use super::*;

        #[test]
        fn new_task_trims_title_and_assignee() {
            let draft = NewTask::new("  Write report ", Some(" Dan ")).unwrap();

            assert_eq!(draft.title(), "Write report");
            assert_eq!(draft.assigned_to(), Some("Dan"));
        }

        #[test]
        fn new_task_rejects_blank_title() {
            assert_eq!(NewTask::new("   ", None), Err(BoardError::EmptyTaskTitle));
        }

        #[test]
        fn blank_assignee_means_unassigned() {
            let draft = NewTask::new("Task", Some("  ")).unwrap();

            assert_eq!(draft.assigned_to(), None);
        }

        #[test]
        fn new_task_starts_incomplete() {
            let task = NewTask::new("Task", None).unwrap().into_task(9);

            assert_eq!(task.id, 9);
            assert!(!task.completed);
        }

        #[test]
        fn new_link_requires_http_scheme() {
            assert_eq!(
                NewLink::new("Docs", "ftp://example.com"),
                Err(BoardError::InvalidLinkUrl)
            );
            assert_eq!(
                NewLink::new("", "https://example.com"),
                Err(BoardError::EmptyLinkTitle)
            );
            let link = NewLink::new("Docs", " https://example.com ")
                .unwrap()
                .into_link(4);
            assert_eq!(link.url, "https://example.com");
            assert_eq!(link.id, 4);
        }
    }

    mod board_tests {
        use super::*;

        #[test]
        fn toggle_flips_completion() {
            let mut board = setup_board();

            assert_eq!(board.toggle_task(1), Ok(true));
            assert_eq!(board.progress().completed, 1);
            assert_eq!(board.toggle_task(1), Ok(false));
            assert_eq!(board.progress().completed, 0);
        }

        #[test]
        fn toggle_unknown_task_fails() {
            let mut board = setup_board();

            assert_eq!(board.toggle_task(42), Err(BoardError::TaskNotFound(42)));
        }

        #[test]
        fn remove_task_returns_it() {
            let mut board = setup_board();

            let removed = board.remove_task(2).unwrap();

            assert_eq!(removed.title, "Draw map");
            assert_eq!(board.tasks.len(), 2);
            assert!(board.task(2).is_none());
            assert_eq!(board.remove_task(2), Err(BoardError::TaskNotFound(2)));
        }

        #[test]
        fn contributions_follow_board_changes() {
            let mut board = setup_board();
            board.set_task_completed(2, true).unwrap();

            let stats = board.contributions();

            assert_eq!(stats[0].name, "Sarah");
            assert_eq!(stats[0].overall_contribution, 33);
            assert_eq!(stats[1].name, "Dan");
            assert_eq!(stats[1].overall_contribution, 0);
        }

        #[test]
        fn unassigned_tasks_include_unknown_assignees() {
            let mut board = setup_board();
            board.insert_task(NewTask::new("Mystery", Some("Unknown")).unwrap().into_task(4));

            let titles: Vec<&str> = board
                .unassigned_tasks()
                .iter()
                .map(|task| task.title.as_str())
                .collect();

            assert_eq!(titles, vec!["Book room", "Mystery"]);
        }

        #[test]
        fn links_can_be_added_and_removed() {
            let mut board = setup_board();
            board.insert_link(NewLink::new("Repo", "https://example.com").unwrap().into_link(1));

            assert_eq!(board.links.len(), 1);
            assert_eq!(board.remove_link(1).unwrap().title, "Repo");
            assert_eq!(board.remove_link(1), Err(BoardError::LinkNotFound(1)));
        }
    }
}
