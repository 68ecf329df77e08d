use crate::date_util::{round1, round2};
use crate::error::Result;
use crate::metrics::provider::{AggregateQueryProvider, StatusCounts};
use crate::metrics::types::{DashboardStatistics, GoalEntry, GoalStatistics, TaskStatistics};
use crate::model::{EmployeeId, Goal};

/// Dashboard numbers for an employee: all-time counts plus the goals of
/// ISO week `week` of `year`. The recent task and goal listings are left
/// empty for the caller to fill.
pub fn dashboard_statistics(
    provider: &dyn AggregateQueryProvider,
    employee: EmployeeId,
    week: u32,
    year: i32,
    week_goals: Vec<Goal>,
) -> Result<DashboardStatistics> {
    let tasks = provider.task_status_counts(employee)?;
    let goals = provider.goal_status_counts(employee)?;

    let weekly_goals: Vec<GoalEntry> = week_goals.into_iter().map(goal_entry).collect();
    let goal_statistics = GoalStatistics {
        current_week: week,
        current_year: year,
        average_weekly_progress: average_progress(&weekly_goals),
        weekly_goals,
        ..goal_statistics(&goals)
    };

    Ok(DashboardStatistics {
        employee_id: employee,
        task_statistics: task_statistics(&tasks),
        goal_statistics,
        tasks: Vec::new(),
        goals: Vec::new(),
    })
}

pub fn goal_entry(goal: Goal) -> GoalEntry {
    let progress_percentage = if goal.target_value > 0.0 {
        round2(goal.progress / goal.target_value * 100.0)
    } else {
        0.0
    };
    GoalEntry {
        goal,
        progress_percentage,
    }
}

/// Mean progress percentage to one decimal, 0 with no goals.
pub fn average_progress(entries: &[GoalEntry]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    let total: f64 = entries.iter().map(|e| e.progress_percentage).sum();
    round1(total / entries.len() as f64)
}

pub fn task_statistics(counts: &StatusCounts) -> TaskStatistics {
    let rate = if counts.total > 0 {
        round2(counts.closed as f64 / counts.total as f64 * 100.0)
    } else {
        0.0
    };
    TaskStatistics {
        total_tasks: counts.total,
        open_tasks: counts.open,
        on_going_tasks: counts.in_progress,
        completed_tasks: counts.closed,
        cancelled_tasks: counts.cancelled,
        task_completion_rate: rate,
    }
}

/// Cancelled goals are left out of the completion rate denominator.
pub fn goal_statistics(counts: &StatusCounts) -> GoalStatistics {
    let valid = counts.open + counts.in_progress + counts.closed;
    let rate = if valid > 0 {
        round2(counts.closed as f64 / valid as f64 * 100.0)
    } else {
        0.0
    };
    GoalStatistics {
        total_goals: counts.total,
        open_goals: counts.open,
        in_progress_goals: counts.in_progress,
        completed_goals: counts.closed,
        cancelled_goals: counts.cancelled,
        completion_rate: rate,
        ..GoalStatistics::default()
    }
}
