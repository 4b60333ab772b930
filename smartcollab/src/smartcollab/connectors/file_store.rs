//! A backend stand-in that keeps every account and project in one JSON file.
//!
//! The whole document is rewritten after each mutation. Tasks, links and
//! members are kept as loose records and validated when read back, the same
//! way rows coming from the hosted service are.

use super::{AuthProvider, Error, ProjectStore, Session};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use smartcollab_core::project::GENERATED_KEY_RANGE;
use smartcollab_core::{
    JoinKey, Link, LinkId, LinkRecord, Member, MemberRecord, NewLink, NewTask, Project,
    ProjectDraft, ProjectFile, ProjectId, Task, TaskId, TaskRecord, UserProfile,
};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

const DEMO_PASSWORD: &str = "password123";
const RANDOM_KEY_ATTEMPTS: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Account {
    id: String,
    name: String,
    email: String,
    password_digest: String,
}

impl Account {
    fn new(id: &str, name: &str, email: &str, password: &str) -> Self {
        Account {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password_digest: digest_password(email, password),
        }
    }

    fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }

    fn member_record(&self) -> MemberRecord {
        MemberRecord {
            id: Some(self.id.clone()),
            name: Some(self.name.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProjectEntry {
    project: Project,
    #[serde(default)]
    members: Vec<MemberRecord>,
    #[serde(default)]
    tasks: Vec<TaskRecord>,
    #[serde(default)]
    links: Vec<LinkRecord>,
    #[serde(default)]
    files: Vec<ProjectFile>,
}

impl ProjectEntry {
    fn has_member(&self, user_id: &str) -> bool {
        self.members
            .iter()
            .any(|member| member.id.as_deref() == Some(user_id))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    accounts: Vec<Account>,
    /// session token -> user id
    #[serde(default)]
    sessions: HashMap<String, String>,
    #[serde(default)]
    projects: Vec<ProjectEntry>,
    /// Shared id counter for projects, tasks, links and files
    #[serde(default = "first_id")]
    next_id: u64,
}

fn first_id() -> u64 {
    1
}

impl Default for StoreData {
    fn default() -> Self {
        StoreData {
            accounts: Vec::new(),
            sessions: HashMap::new(),
            projects: Vec::new(),
            next_id: first_id(),
        }
    }
}

impl StoreData {
    fn take_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn account(&self, user_id: &str) -> Result<&Account, Error> {
        self.accounts
            .iter()
            .find(|account| account.id == user_id)
            .ok_or_else(|| Error::UserNotFound(user_id.to_string()))
    }

    fn entry(&self, project_id: ProjectId) -> Result<&ProjectEntry, Error> {
        self.projects
            .iter()
            .find(|entry| entry.project.id == project_id)
            .ok_or(Error::ProjectNotFound(project_id))
    }

    fn entry_mut(&mut self, project_id: ProjectId) -> Result<&mut ProjectEntry, Error> {
        self.projects
            .iter_mut()
            .find(|entry| entry.project.id == project_id)
            .ok_or(Error::ProjectNotFound(project_id))
    }

    fn open_session(&mut self, user_id: &str) -> String {
        let token = Uuid::new_v4().to_string();
        self.sessions.insert(token.clone(), user_id.to_string());
        token
    }

    /// Picks a random free `NEW-n` key, scanning in order once random picks keep colliding.
    fn unused_join_key(&self) -> Result<JoinKey, Error> {
        let taken: HashSet<&JoinKey> = self
            .projects
            .iter()
            .map(|entry| &entry.project.join_key)
            .collect();
        let mut rng = rand::rng();
        for _ in 0..RANDOM_KEY_ATTEMPTS {
            let key = JoinKey::generated(rng.random_range(0..GENERATED_KEY_RANGE));
            if !taken.contains(&key) {
                return Ok(key);
            }
        }
        (0..GENERATED_KEY_RANGE)
            .map(JoinKey::generated)
            .find(|key| !taken.contains(key))
            .ok_or(Error::JoinKeysExhausted)
    }

    /// The projects, team and tasks the application ships with for trying it out.
    fn demo() -> Result<Self, Error> {
        let owner = Account::new("user_123", "Test User 1", "test@gmail.com", DEMO_PASSWORD);
        let dan = Account::new("user_dan", "Dan", "dan@example.com", DEMO_PASSWORD);
        let sarah = Account::new("user_sarah", "Sarah", "sarah@example.com", DEMO_PASSWORD);
        let ben = Account::new("user_999", "Ben", "ben@example.com", DEMO_PASSWORD);

        let task = |id: TaskId, title: &str, assigned_to: Option<&str>, completed: bool| {
            TaskRecord::from(Task {
                id,
                title: title.to_string(),
                assigned_to: assigned_to.map(str::to_string),
                completed,
            })
        };

        let navigation = ProjectEntry {
            project: Project {
                id: 1,
                name: "AI Navigation System".to_string(),
                description:
                    "Developing a YOLO-based navigation system for UAVs in GPS-denied environments."
                        .to_string(),
                created_at: demo_date(2025, 11, 20, 10, 0),
                owner_id: owner.id.clone(),
                join_key: JoinKey::parse("NAV-8821")?,
            },
            members: vec![owner.member_record(), dan.member_record(), sarah.member_record()],
            tasks: vec![
                task(4, "Collect flight logs", Some("Dan"), true),
                task(5, "Label training images", Some("Dan"), true),
                task(6, "Train detection model", Some("Sarah"), false),
                task(7, "Field test in hangar", Some("Sarah"), false),
            ],
            links: vec![LinkRecord::from(Link {
                id: 8,
                title: "YOLO documentation".to_string(),
                url: "https://docs.ultralytics.com".to_string(),
            })],
            files: vec![ProjectFile {
                id: 9,
                name: "flight_logs.csv".to_string(),
                size_bytes: 48_213,
                uploaded_by: dan.name.clone(),
                uploaded_at: demo_date(2025, 11, 22, 15, 30),
            }],
        };

        let web_app = ProjectEntry {
            project: Project {
                id: 2,
                name: "Web App".to_string(),
                description: "React frontend with Tailwind CSS and fake JSON backend.".to_string(),
                created_at: demo_date(2025, 11, 25, 14, 30),
                owner_id: owner.id.clone(),
                join_key: JoinKey::parse("REA-9912")?,
            },
            members: vec![owner.member_record()],
            tasks: vec![
                task(10, "Set up Tailwind", Some("Test User 1"), true),
                task(11, "Mock JSON backend", None, false),
            ],
            links: Vec::new(),
            files: Vec::new(),
        };

        let geography = ProjectEntry {
            project: Project {
                id: 3,
                name: "Geography Class Group".to_string(),
                description: "Group project for California Cultural Regions.".to_string(),
                created_at: demo_date(2025, 10, 15, 9, 0),
                owner_id: ben.id.clone(),
                join_key: JoinKey::parse("GEO-1123")?,
            },
            members: vec![ben.member_record(), sarah.member_record()],
            tasks: vec![task(12, "Research the Central Valley", Some("Ben"), false)],
            links: Vec::new(),
            files: Vec::new(),
        };

        Ok(StoreData {
            accounts: vec![owner, dan, sarah, ben],
            sessions: HashMap::new(),
            projects: vec![navigation, web_app, geography],
            next_id: 13,
        })
    }
}

fn demo_date(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

fn digest_password(email: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.to_lowercase().as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Implements both [`AuthProvider`] and [`ProjectStore`] on top of a JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    data: Mutex<StoreData>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file is an empty store.
    #[tracing::instrument]
    pub async fn open(path: &Path) -> Result<Self, Error> {
        let data = match tokio::fs::read_to_string(path).await {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("No data file yet, starting empty");
                StoreData::default()
            }
            Err(err) => return Err(err.into()),
        };
        Ok(JsonFileStore {
            path: path.to_path_buf(),
            data: Mutex::new(data),
        })
    }

    /// Replaces whatever is at `path` with the demo projects and accounts.
    ///
    /// Every demo account uses the password `password123`.
    #[tracing::instrument]
    pub async fn seed_demo(path: &Path) -> Result<Self, Error> {
        let store = JsonFileStore {
            path: path.to_path_buf(),
            data: Mutex::new(StoreData::demo()?),
        };
        {
            let data = store.data.lock().await;
            store.save(&data).await?;
        }
        info!("Seeded demo data");
        Ok(store)
    }

    async fn save(&self, data: &StoreData) -> Result<(), Error> {
        let json = serde_json::to_vec_pretty(data)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Applies `change` to a copy of `data` and keeps it only once it is on disk.
    async fn commit<T, F>(&self, data: &mut StoreData, change: F) -> Result<T, Error>
    where
        F: FnOnce(&mut StoreData) -> Result<T, Error>,
    {
        let mut next = data.clone();
        let output = change(&mut next)?;
        self.save(&next).await?;
        *data = next;
        Ok(output)
    }
}

#[async_trait]
impl AuthProvider for JsonFileStore {
    #[tracing::instrument(skip(self, password))]
    async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<Session, Error> {
        let mut data = self.data.lock().await;
        if data
            .accounts
            .iter()
            .any(|account| account.email.eq_ignore_ascii_case(email))
        {
            return Err(Error::EmailTaken(email.to_string()));
        }

        let account = Account::new(&Uuid::new_v4().to_string(), name, email, password);
        let user = account.profile();
        let token = self
            .commit(&mut data, |next| {
                next.accounts.push(account);
                Ok(next.open_session(&user.id))
            })
            .await?;
        info!(user_id = %user.id, "Account created");
        Ok(Session { token, user })
    }

    #[tracing::instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, Error> {
        let mut data = self.data.lock().await;
        let digest = digest_password(email, password);
        let user = data
            .accounts
            .iter()
            .find(|account| {
                account.email.eq_ignore_ascii_case(email) && account.password_digest == digest
            })
            .map(Account::profile)
            .ok_or(Error::InvalidCredentials)?;
        let token = self
            .commit(&mut data, |next| Ok(next.open_session(&user.id)))
            .await?;
        Ok(Session { token, user })
    }

    #[tracing::instrument(skip(self, token))]
    async fn sign_out(&self, token: &str) -> Result<(), Error> {
        let mut data = self.data.lock().await;
        if data.sessions.contains_key(token) {
            self.commit(&mut data, |next| {
                next.sessions.remove(token);
                Ok(())
            })
            .await?;
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, token))]
    async fn current_user(&self, token: &str) -> Result<UserProfile, Error> {
        let data = self.data.lock().await;
        let user_id = data.sessions.get(token).ok_or(Error::UnknownSession)?;
        Ok(data.account(user_id)?.profile())
    }
}

#[async_trait]
impl ProjectStore for JsonFileStore {
    #[tracing::instrument(skip(self))]
    async fn list_projects(&self, user_id: &str) -> Result<Vec<Project>, Error> {
        let data = self.data.lock().await;
        let mut projects: Vec<Project> = data
            .projects
            .iter()
            .filter(|entry| entry.has_member(user_id))
            .map(|entry| entry.project.clone())
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    #[tracing::instrument(skip(self))]
    async fn get_project(&self, project_id: ProjectId) -> Result<Project, Error> {
        let data = self.data.lock().await;
        Ok(data.entry(project_id)?.project.clone())
    }

    #[tracing::instrument(skip(self))]
    async fn create_project(&self, owner_id: &str, draft: ProjectDraft) -> Result<Project, Error> {
        let mut data = self.data.lock().await;
        let project = self
            .commit(&mut data, |next| {
                let owner = next.account(owner_id)?.member_record();
                let join_key = next.unused_join_key()?;
                let id = next.take_id();
                let project = draft.into_project(id, owner_id.to_string(), join_key, Utc::now());
                next.projects.push(ProjectEntry {
                    project: project.clone(),
                    members: vec![owner],
                    tasks: Vec::new(),
                    links: Vec::new(),
                    files: Vec::new(),
                });
                Ok(project)
            })
            .await?;
        info!(project_id = project.id, "Project created");
        Ok(project)
    }

    #[tracing::instrument(skip(self))]
    async fn join_project(&self, user_id: &str, key: &JoinKey) -> Result<Project, Error> {
        let mut data = self.data.lock().await;
        let project = self
            .commit(&mut data, |next| {
                let member = next.account(user_id)?.member_record();
                let entry = next
                    .projects
                    .iter_mut()
                    .find(|entry| &entry.project.join_key == key)
                    .ok_or_else(|| Error::UnknownJoinKey(key.clone()))?;
                if entry.has_member(user_id) {
                    return Err(Error::AlreadyMember(entry.project.id));
                }
                entry.members.push(member);
                Ok(entry.project.clone())
            })
            .await?;
        info!(project_id = project.id, "Joined project");
        Ok(project)
    }

    #[tracing::instrument(skip(self))]
    async fn list_members(&self, project_id: ProjectId) -> Result<Vec<Member>, Error> {
        let data = self.data.lock().await;
        let members = data
            .entry(project_id)?
            .members
            .iter()
            .cloned()
            .map(Member::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(members)
    }

    #[tracing::instrument(skip(self))]
    async fn list_tasks(&self, project_id: ProjectId) -> Result<Vec<Task>, Error> {
        let data = self.data.lock().await;
        let tasks = data
            .entry(project_id)?
            .tasks
            .iter()
            .cloned()
            .map(Task::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    #[tracing::instrument(skip(self))]
    async fn insert_task(&self, project_id: ProjectId, task: NewTask) -> Result<Task, Error> {
        let mut data = self.data.lock().await;
        self.commit(&mut data, |next| {
            next.entry(project_id)?;
            let task = task.into_task(next.take_id());
            next.entry_mut(project_id)?
                .tasks
                .push(TaskRecord::from(task.clone()));
            Ok(task)
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn set_task_completed(
        &self,
        project_id: ProjectId,
        task_id: TaskId,
        completed: bool,
    ) -> Result<(), Error> {
        let mut data = self.data.lock().await;
        self.commit(&mut data, |next| {
            let record = next
                .entry_mut(project_id)?
                .tasks
                .iter_mut()
                .find(|record| record.id == Some(task_id))
                .ok_or(Error::TaskNotFound(task_id))?;
            record.completed = Some(completed);
            Ok(())
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn delete_task(&self, project_id: ProjectId, task_id: TaskId) -> Result<(), Error> {
        let mut data = self.data.lock().await;
        self.commit(&mut data, |next| {
            let tasks = &mut next.entry_mut(project_id)?.tasks;
            let index = tasks
                .iter()
                .position(|record| record.id == Some(task_id))
                .ok_or(Error::TaskNotFound(task_id))?;
            tasks.remove(index);
            Ok(())
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn list_links(&self, project_id: ProjectId) -> Result<Vec<Link>, Error> {
        let data = self.data.lock().await;
        let links = data
            .entry(project_id)?
            .links
            .iter()
            .cloned()
            .map(Link::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(links)
    }

    #[tracing::instrument(skip(self))]
    async fn insert_link(&self, project_id: ProjectId, link: NewLink) -> Result<Link, Error> {
        let mut data = self.data.lock().await;
        self.commit(&mut data, |next| {
            next.entry(project_id)?;
            let link = link.into_link(next.take_id());
            next.entry_mut(project_id)?
                .links
                .push(LinkRecord::from(link.clone()));
            Ok(link)
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn delete_link(&self, project_id: ProjectId, link_id: LinkId) -> Result<(), Error> {
        let mut data = self.data.lock().await;
        self.commit(&mut data, |next| {
            let links = &mut next.entry_mut(project_id)?.links;
            let index = links
                .iter()
                .position(|record| record.id == Some(link_id))
                .ok_or(Error::LinkNotFound(link_id))?;
            links.remove(index);
            Ok(())
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn list_files(&self, project_id: ProjectId) -> Result<Vec<ProjectFile>, Error> {
        let data = self.data.lock().await;
        Ok(data.entry(project_id)?.files.clone())
    }

    #[tracing::instrument(skip(self))]
    async fn add_file(
        &self,
        project_id: ProjectId,
        name: &str,
        size_bytes: u64,
        uploaded_by: &str,
    ) -> Result<ProjectFile, Error> {
        let mut data = self.data.lock().await;
        self.commit(&mut data, |next| {
            next.entry(project_id)?;
            let file = ProjectFile {
                id: next.take_id(),
                name: name.to_string(),
                size_bytes,
                uploaded_by: uploaded_by.to_string(),
                uploaded_at: Utc::now(),
            };
            next.entry_mut(project_id)?.files.push(file.clone());
            Ok(file)
        })
        .await
    }
}
