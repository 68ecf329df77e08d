use crate::date_util::round2;
use crate::error::Result;
use crate::metrics::provider::{AggregateQueryProvider, GoalProgress};
use crate::metrics::types::{GoalMetrics, GoalScore};
use crate::model::{EmployeeId, Status};

const PROGRESS_WEIGHT: f64 = 0.7;
const COMPLETION_WEIGHT: f64 = 0.3;

/// Compute the goal score for an employee's goals in one ISO week.
pub fn compute_goal_score(
    provider: &dyn AggregateQueryProvider,
    employee: EmployeeId,
    week: u32,
    year: i32,
) -> Result<GoalScore> {
    let goals = provider.goals_for_week(employee, week, year)?;
    let result = score_goals(&goals);
    log::debug!(
        "goal score for employee {employee} in {year}-W{week:02}: {:.2} over {} goals",
        result.score,
        result.metrics.total_goals
    );
    Ok(result)
}

/// Progress toward target as a percentage, capped at 100. A non-positive
/// target contributes nothing.
pub fn progress_percentage(goal: &GoalProgress) -> f64 {
    if goal.target_value > 0.0 {
        (goal.progress / goal.target_value * 100.0).min(100.0)
    } else {
        0.0
    }
}

/// Score a set of goals: 70% average progress, 30% completion rate.
pub fn score_goals(goals: &[GoalProgress]) -> GoalScore {
    if goals.is_empty() {
        return GoalScore::default();
    }

    let total = goals.len() as u64;
    let mut total_progress = 0.0;
    let mut completed = 0u64;
    let mut in_progress = 0u64;

    for goal in goals {
        total_progress += progress_percentage(goal);
        match goal.status {
            Status::Closed => completed += 1,
            Status::InProgress => in_progress += 1,
            _ => {}
        }
    }

    let average_progress = total_progress / total as f64;
    let completion_rate = completed as f64 / total as f64 * 100.0;

    GoalScore {
        score: average_progress * PROGRESS_WEIGHT + completion_rate * COMPLETION_WEIGHT,
        metrics: GoalMetrics {
            total_goals: total,
            completed_goals: completed,
            in_progress_goals: in_progress,
            average_progress: round2(average_progress),
            completion_rate: round2(completion_rate),
        },
    }
}
