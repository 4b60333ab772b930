//! The "AI analysis" panel.
//!
//! There is no model behind it: after a fixed delay it returns a canned report
//! filled in from a snapshot of the board. It runs as its own tokio task so
//! callers can show a pending state and cancel it.
use smartcollab_core::Board;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Analysis was cancelled")]
    Cancelled,
    #[error("Analysis failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisReport {
    pub summary: String,
    pub strengths: Vec<String>,
    pub risks: Vec<String>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisState {
    Pending,
    Finished,
    Cancelled,
}

/// Handle to a running analysis. Dropping it cancels the analysis.
#[derive(Debug)]
pub struct AnalysisHandle {
    task: JoinHandle<AnalysisReport>,
    cancelled: bool,
    /// Set once the task has been awaited; a `JoinHandle` yields its output only once
    outcome: Option<Result<AnalysisReport, AnalysisError>>,
}

impl AnalysisHandle {
    pub fn state(&self) -> AnalysisState {
        if self.cancelled {
            AnalysisState::Cancelled
        } else if self.outcome.is_some() || self.task.is_finished() {
            AnalysisState::Finished
        } else {
            AnalysisState::Pending
        }
    }

    pub fn cancel(&mut self) {
        if self.outcome.is_none() && !self.task.is_finished() {
            self.task.abort();
            self.cancelled = true;
        }
    }

    /// Waits for the report. Later calls return the same outcome again.
    pub async fn wait(&mut self) -> Result<AnalysisReport, AnalysisError> {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }
        let outcome = match (&mut self.task).await {
            Ok(report) => Ok(report),
            Err(err) if err.is_cancelled() => Err(AnalysisError::Cancelled),
            Err(err) => Err(AnalysisError::Failed(err.to_string())),
        };
        self.outcome = Some(outcome.clone());
        outcome
    }
}

impl Drop for AnalysisHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Starts analysing `board` in the background. The report is ready after `delay`.
pub fn spawn_analysis(project_name: String, board: Board, delay: Duration) -> AnalysisHandle {
    let task = tokio::spawn(async move {
        debug!(project = %project_name, ?delay, "Analysis started");
        tokio::time::sleep(delay).await;
        analyse(&project_name, &board)
    });
    AnalysisHandle {
        task,
        cancelled: false,
        outcome: None,
    }
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{} {}", count, word)
    } else {
        format!("{} {}s", count, word)
    }
}

fn analyse(project_name: &str, board: &Board) -> AnalysisReport {
    let progress = board.progress();
    let contributions = board.contributions();
    let unassigned = board.unassigned_tasks().len();

    let summary = format!(
        "{} is {}% complete with {} of {} done.",
        project_name,
        progress.percentage,
        progress.completed,
        plural(progress.total, "task")
    );

    let mut strengths = Vec::new();
    if let Some(top) = contributions.first().filter(|stat| stat.completed > 0) {
        strengths.push(format!(
            "{} has completed {}, {}% of the project.",
            top.name,
            plural(top.completed, "task"),
            top.overall_contribution
        ));
    }
    if progress.total > 0 && progress.percentage >= 50 {
        strengths.push("At least half of the work is already done.".to_string());
    }
    if !board.links.is_empty() || !board.files.is_empty() {
        strengths.push("The team is sharing links and files in one place.".to_string());
    }

    let mut risks = Vec::new();
    if progress.total == 0 {
        risks.push("No tasks have been created yet.".to_string());
    }
    for stat in contributions.iter().filter(|stat| !stat.has_tasks) {
        risks.push(format!("{} has no assigned tasks.", stat.name));
    }
    if unassigned > 0 {
        risks.push(format!(
            "{} not assigned to anyone on the team.",
            if unassigned == 1 {
                "1 task is".to_string()
            } else {
                format!("{} tasks are", unassigned)
            }
        ));
    }

    let mut suggestions = Vec::new();
    if !risks.is_empty() {
        suggestions.push("Assign open tasks to members with lighter workloads.".to_string());
    }
    if progress.total > progress.completed {
        suggestions.push("Break the largest open task into smaller steps.".to_string());
    }
    suggestions.push("Hold a short weekly check-in to review open tasks.".to_string());

    AnalysisReport {
        summary,
        strengths,
        risks,
        suggestions,
    }
}
