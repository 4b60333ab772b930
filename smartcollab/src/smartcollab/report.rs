//! Plain-text rendering of the screens the CLI prints.
use crate::smartcollab::analysis::AnalysisReport;
use crate::smartcollab::dashboard::DashboardSummary;
use crate::smartcollab::projects::ProjectSummary;
use chrono::{DateTime, Utc};
use smartcollab_core::{Board, Progress, Project, Task};
use std::fmt;

const BAR_WIDTH: u32 = 20;

fn short_date(date: &DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

fn long_date(date: &DateTime<Utc>) -> String {
    date.format("%B %-d, %Y").to_string()
}

fn progress_bar(progress: &Progress) -> String {
    let filled = (progress.percentage.min(100) * BAR_WIDTH / 100) as usize;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH as usize - filled)
    )
}

fn human_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

pub fn task_line(task: &Task) -> String {
    let mark = if task.completed { 'x' } else { ' ' };
    match task.assigned_to.as_deref() {
        Some(assignee) => format!("[{}] #{} {} ({})", mark, task.id, task.title, assignee),
        None => format!("[{}] #{} {}", mark, task.id, task.title),
    }
}

/// The home screen: one card per project.
pub struct ProjectList<'a>(pub &'a [ProjectSummary]);

impl fmt::Display for ProjectList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No projects yet. Create one or join with a key.");
        }
        for summary in self.0 {
            let project = &summary.project;
            writeln!(f, "#{} {}", project.id, project.name)?;
            if !project.description.is_empty() {
                writeln!(f, "    {}", project.description)?;
            }
            writeln!(
                f,
                "    Created {} | {} | Key: {}",
                short_date(&project.created_at),
                summary.role,
                project.join_key
            )?;
        }
        Ok(())
    }
}

pub fn project_created(project: &Project) -> String {
    format!(
        "Created project #{} {}\nShare this join key with your team: {}\n",
        project.id, project.name, project.join_key
    )
}

/// The project page.
pub struct DashboardView<'a> {
    pub project: &'a Project,
    pub board: &'a Board,
    pub summary: &'a DashboardSummary,
}

impl DashboardView<'_> {
    fn write_tasks(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tasks")?;
        if self.board.tasks.is_empty() {
            writeln!(f, "  No tasks yet")?;
        }
        for task in &self.board.tasks {
            writeln!(f, "  {}", task_line(task))?;
        }
        if self.summary.unassigned > 0 {
            writeln!(f, "  {} unassigned", self.summary.unassigned)?;
        }
        Ok(())
    }

    fn write_contributions(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Contributions")?;
        for stat in &self.summary.contributions {
            if stat.has_tasks {
                writeln!(
                    f,
                    "  {:<16} {:>3}%  {}/{} done",
                    stat.name, stat.overall_contribution, stat.completed, stat.total
                )?;
            } else {
                writeln!(
                    f,
                    "  {:<16} {:>3}%  no tasks",
                    stat.name, stat.overall_contribution
                )?;
            }
        }
        Ok(())
    }

    fn write_attachments(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.board.links.is_empty() {
            writeln!(f)?;
            writeln!(f, "Links")?;
            for link in &self.board.links {
                writeln!(f, "  #{} {} <{}>", link.id, link.title, link.url)?;
            }
        }
        if !self.board.files.is_empty() {
            writeln!(f)?;
            writeln!(f, "Files")?;
            for file in &self.board.files {
                writeln!(
                    f,
                    "  {} ({}) uploaded by {} on {}",
                    file.name,
                    human_size(file.size_bytes),
                    file.uploaded_by,
                    short_date(&file.uploaded_at)
                )?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for DashboardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let project = self.project;
        writeln!(f, "{} (#{})", project.name, project.id)?;
        if !project.description.is_empty() {
            writeln!(f, "{}", project.description)?;
        }
        writeln!(
            f,
            "Created {} | Join key: {}",
            long_date(&project.created_at),
            project.join_key
        )?;
        writeln!(f)?;

        let progress = &self.summary.progress;
        writeln!(
            f,
            "Progress {} {}% ({}/{} tasks)",
            progress_bar(progress),
            progress.percentage,
            progress.completed,
            progress.total
        )?;
        writeln!(f)?;

        self.write_tasks(f)?;
        writeln!(f)?;
        self.write_contributions(f)?;
        self.write_attachments(f)
    }
}

/// The analysis panel. Empty sections are left out.
pub struct AnalysisView<'a>(pub &'a AnalysisReport);

impl fmt::Display for AnalysisView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        writeln!(f, "{}", report.summary)?;
        for (heading, items) in [
            ("Strengths", &report.strengths),
            ("Risks", &report.risks),
            ("Suggestions", &report.suggestions),
        ] {
            if items.is_empty() {
                continue;
            }
            writeln!(f)?;
            writeln!(f, "{}", heading)?;
            for item in items {
                writeln!(f, "  - {}", item)?;
            }
        }
        Ok(())
    }
}
