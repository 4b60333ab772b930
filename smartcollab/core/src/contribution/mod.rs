//! Per-member contribution and overall progress derived from a project's tasks.
//!
//! Both computations are pure: they are re-run from scratch whenever the task
//! or member list changes and never fail. Tasks whose assignee does not name a
//! member are left out of every member's counts but still count toward the
//! project-wide total.
use crate::board::{Member, Task};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One member's share of the project's work.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContributionStat {
    pub name: String,
    /// Completed tasks assigned to this member.
    pub completed: usize,
    /// All tasks assigned to this member.
    pub total: usize,
    /// Percentage of *all* project tasks that this member completed.
    pub overall_contribution: u32,
    pub has_tasks: bool,
}

/// Completion ratio of a task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub percentage: u32,
}

/// Builds one [`ContributionStat`] per member, ordered by descending
/// `overall_contribution`. Members with equal contribution keep their input order.
pub fn compute_contributions(tasks: &[Task], members: &[Member]) -> Vec<ContributionStat> {
    let project_total = tasks.len();

    let mut stats: Vec<ContributionStat> = members
        .iter()
        .map(|member| {
            let (completed, total) = tasks
                .iter()
                .filter(|task| task.assigned_to.as_deref() == Some(member.name.as_str()))
                .fold((0, 0), |(completed, total), task| {
                    (completed + usize::from(task.completed), total + 1)
                });

            ContributionStat {
                name: member.name.clone(),
                completed,
                total,
                overall_contribution: percent(completed, project_total),
                has_tasks: total > 0,
            }
        })
        .collect();

    // `sort_by` is stable
    stats.sort_by(|a, b| b.overall_contribution.cmp(&a.overall_contribution));
    stats
}

/// Counts completed tasks against the whole list.
pub fn compute_progress(tasks: &[Task]) -> Progress {
    let completed = tasks.iter().filter(|task| task.completed).count();
    let total = tasks.len();
    Progress {
        completed,
        total,
        percentage: percent(completed, total),
    }
}

/// `part / whole * 100` rounded half away from zero, `0` when `whole` is zero.
///
/// Integer arithmetic keeps exact `.5` boundaries (e.g. 1/8 -> 13) from being
/// skewed by floating point error.
pub(crate) fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    let part = part as u128;
    let whole = whole as u128;
    ((part * 200 + whole) / (whole * 2)) as u32
}
