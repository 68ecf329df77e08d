use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{EmployeeId, Goal, Status, Task, TeamId};
use crate::query::period::PeriodKind;

/// The period a report was computed for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodInfo {
    #[serde(rename = "type")]
    pub kind: PeriodKind,
    pub week: Option<u32>,
    pub year: Option<i32>,
    /// `YYYY-MM-DD`, absent for all-time reports.
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Counts and rates over the tasks that fall in the period.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicMetrics {
    pub total_tasks_in_period: u64,
    pub completed_tasks: u64,
    pub open_tasks: u64,
    /// Percentage of period tasks that are closed, 2 decimals.
    pub task_completion_rate: f64,
    /// Percentage of closed tasks finished by their due date, 2 decimals.
    pub on_time_completion_rate: f64,
    pub tasks_completed_on_time: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeMetrics {
    /// Mean hours from creation to completion.
    pub average_completion_time: Option<f64>,
    /// Mean hours past the due date, late tasks only.
    pub average_delay_hours: Option<f64>,
}

/// One row of the per-priority breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrioritySuccess {
    pub priority: u8,
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub cancelled_tasks: u64,
    pub in_progress_tasks: u64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityStatusCount {
    pub priority: u8,
    pub status: Status,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityMetrics {
    pub success_rate_by_priority: Vec<PrioritySuccess>,
    pub high_priority_success_rate: Option<f64>,
    pub status_by_priority: Vec<PriorityStatusCount>,
    /// Keyed by priority level 1..=3; `None` when no task of that priority
    /// falls in the period.
    pub completion_rate_by_priority: BTreeMap<u8, Option<f64>>,
}

/// Task performance over one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskMetrics {
    pub period: PeriodInfo,
    pub basic_metrics: BasicMetrics,
    pub time_metrics: TimeMetrics,
    pub priority_metrics: PriorityMetrics,
}

/// Goal performance for one week.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalMetrics {
    pub total_goals: u64,
    pub completed_goals: u64,
    pub in_progress_goals: u64,
    pub average_progress: f64,
    pub completion_rate: f64,
}

/// Goal score plus the metrics it was derived from. `score` is not rounded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GoalScore {
    pub score: f64,
    pub metrics: GoalMetrics,
}

/// The four weighted inputs of the overall score, each clamped to [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub completion_rate: f64,
    pub on_time_rate: f64,
    pub high_priority_success: f64,
    pub time_efficiency: f64,
    pub total: f64,
}

/// Combined task and goal performance for one ISO week.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReport {
    pub week: u32,
    pub year: i32,
    pub task_score: f64,
    pub goal_score: f64,
    pub combined_score: f64,
    pub task_metrics: TaskMetrics,
    pub goal_metrics: GoalMetrics,
}

/// All-time task counts for a dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatistics {
    pub total_tasks: u64,
    pub open_tasks: u64,
    pub on_going_tasks: u64,
    pub completed_tasks: u64,
    pub cancelled_tasks: u64,
    pub task_completion_rate: f64,
}

/// A goal with its progress as a percentage of the target.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalEntry {
    #[serde(flatten)]
    pub goal: Goal,
    /// 0 when the target is not positive.
    pub progress_percentage: f64,
}

/// All-time goal counts plus the current week's goals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalStatistics {
    pub total_goals: u64,
    pub open_goals: u64,
    pub in_progress_goals: u64,
    pub completed_goals: u64,
    pub cancelled_goals: u64,
    /// Closed over non-cancelled goals.
    pub completion_rate: f64,
    pub current_week: u32,
    pub current_year: i32,
    pub weekly_goals: Vec<GoalEntry>,
    /// Mean `progress_percentage` of `weekly_goals`, one decimal.
    pub average_weekly_progress: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatistics {
    pub employee_id: EmployeeId,
    pub task_statistics: TaskStatistics,
    pub goal_statistics: GoalStatistics,
    /// Most recently created tasks, newest first.
    pub tasks: Vec<Task>,
    /// Goals of the most recent weeks, newest first.
    pub goals: Vec<GoalEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberScore {
    pub employee_id: EmployeeId,
    pub name: String,
    pub task_score: f64,
    pub goal_score: f64,
    pub combined_score: f64,
}

/// Weekly scores of every team member, best first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamScoreboard {
    pub team_id: TeamId,
    pub team_name: String,
    pub week: u32,
    pub year: i32,
    pub members: Vec<TeamMemberScore>,
}
