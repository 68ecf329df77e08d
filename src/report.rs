use chrono::NaiveDateTime;
use serde::Serialize;

use crate::date_util::round2;
use crate::metrics::types::WeeklyReport;
use crate::model::EmployeeId;

/// A persisted weekly performance snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    /// Assigned by the store on insert.
    pub id: Option<i64>,
    pub employee_id: EmployeeId,
    pub week: u32,
    pub year: i32,
    pub score: f64,
    pub tasks_completed: u64,
    pub tasks_total: u64,
    pub goals_completed: u64,
    pub goals_total: u64,
    pub task_completion_rate: f64,
    pub goal_completion_rate: f64,
    pub on_time_completion_rate: f64,
    pub average_task_completion_time: Option<f64>,
    pub average_priority: Option<f64>,
    pub summary: String,
    pub generated_at: NaiveDateTime,
}

impl PerformanceReport {
    /// Snapshot a weekly report. `average_priority` is the all-time mean
    /// priority level of the employee's completed tasks.
    pub fn from_weekly(
        employee_id: EmployeeId,
        weekly: &WeeklyReport,
        average_priority: Option<f64>,
        generated_at: NaiveDateTime,
    ) -> Self {
        let basic = &weekly.task_metrics.basic_metrics;
        let goals = &weekly.goal_metrics;
        let mut report = Self {
            id: None,
            employee_id,
            week: weekly.week,
            year: weekly.year,
            score: weekly.combined_score,
            tasks_completed: basic.completed_tasks,
            tasks_total: basic.total_tasks_in_period,
            goals_completed: goals.completed_goals,
            goals_total: goals.total_goals,
            task_completion_rate: basic.task_completion_rate,
            goal_completion_rate: goals.completion_rate,
            on_time_completion_rate: basic.on_time_completion_rate,
            average_task_completion_time: weekly
                .task_metrics
                .time_metrics
                .average_completion_time
                .map(round2),
            average_priority: average_priority.map(round2),
            summary: String::new(),
            generated_at,
        };
        report.summary = report.summarize();
        report
    }

    fn summarize(&self) -> String {
        format!(
            "{}-W{:02}: score {:.2}; {}/{} tasks completed ({:.2}% on time); {}/{} goals completed",
            self.year,
            self.week,
            self.score,
            self.tasks_completed,
            self.tasks_total,
            self.on_time_completion_rate,
            self.goals_completed,
            self.goals_total
        )
    }
}
