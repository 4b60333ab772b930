//! Core domain models and task statistics for Smart Collab.
pub mod board;
pub mod contribution;
pub mod project;
#[cfg(feature = "serde")]
pub mod records;

pub use board::{
    Board, BoardError, Link, LinkId, Member, NewLink, NewTask, ProjectFile, Task, TaskId,
};
pub use contribution::{ContributionStat, Progress, compute_contributions, compute_progress};
pub use project::{JoinKey, Project, ProjectDraft, ProjectError, ProjectId, UserId, UserProfile};
#[cfg(feature = "serde")]
pub use records::{LinkRecord, MemberRecord, RecordError, TaskRecord};
