//! Loosely-typed records as they arrive from the persistence backend.
//!
//! Every field is optional on the wire; conversion into the domain types
//! checks that the required ones are present before anything else sees them.
use crate::board::{Link, LinkId, Member, Task, TaskId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("record is missing required field `{0}`")]
    MissingField(&'static str),
    #[error("record field `{0}` must not be empty")]
    EmptyField(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: Option<TaskId>,
    pub title: Option<String>,
    #[serde(default, alias = "assignedTo")]
    pub assigned_to: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemberRecord {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinkRecord {
    pub id: Option<LinkId>,
    pub title: Option<String>,
    pub url: Option<String>,
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, RecordError> {
    value.ok_or(RecordError::MissingField(field))
}

fn non_empty(value: Option<String>, field: &'static str) -> Result<String, RecordError> {
    let value = required(value, field)?;
    if value.trim().is_empty() {
        return Err(RecordError::EmptyField(field));
    }
    Ok(value)
}

impl TryFrom<TaskRecord> for Task {
    type Error = RecordError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        Ok(Task {
            id: required(record.id, "id")?,
            title: non_empty(record.title, "title")?,
            assigned_to: record.assigned_to.filter(|name| !name.trim().is_empty()),
            completed: required(record.completed, "completed")?,
        })
    }
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        TaskRecord {
            id: Some(task.id),
            title: Some(task.title),
            assigned_to: task.assigned_to,
            completed: Some(task.completed),
        }
    }
}

impl TryFrom<MemberRecord> for Member {
    type Error = RecordError;

    fn try_from(record: MemberRecord) -> Result<Self, Self::Error> {
        Ok(Member {
            id: non_empty(record.id, "id")?,
            name: non_empty(record.name, "name")?,
        })
    }
}

impl TryFrom<LinkRecord> for Link {
    type Error = RecordError;

    fn try_from(record: LinkRecord) -> Result<Self, Self::Error> {
        Ok(Link {
            id: required(record.id, "id")?,
            title: non_empty(record.title, "title")?,
            url: non_empty(record.url, "url")?,
        })
    }
}

impl From<Link> for LinkRecord {
    fn from(link: Link) -> Self {
        LinkRecord {
            id: Some(link.id),
            title: Some(link.title),
            url: Some(link.url),
        }
    }
}
