use crate::date_util::{clamp_pct, round2};
use crate::error::Result;
use crate::metrics::goals::compute_goal_score;
use crate::metrics::provider::AggregateQueryProvider;
use crate::metrics::tasks::compute_task_metrics;
use crate::metrics::types::{ScoreBreakdown, TaskMetrics, WeeklyReport};
use crate::metrics::ScoringOptions;
use crate::model::EmployeeId;
use crate::query::period::{PeriodKind, PeriodQuery};

const COMPLETION_RATE_WEIGHT: f64 = 0.30;
const ON_TIME_RATE_WEIGHT: f64 = 0.25;
const HIGH_PRIORITY_WEIGHT: f64 = 0.25;
const TIME_EFFICIENCY_WEIGHT: f64 = 0.20;

/// Each hour of average delay costs this many efficiency points.
const DELAY_PENALTY_PER_HOUR: f64 = 2.0;

const TASK_SHARE: f64 = 0.5;
const GOAL_SHARE: f64 = 0.5;

/// Split already-computed task metrics into the weighted sub-scores.
pub fn score_breakdown(metrics: &TaskMetrics) -> ScoreBreakdown {
    let completion_rate = clamp_pct(metrics.basic_metrics.task_completion_rate);
    let on_time_rate = clamp_pct(metrics.basic_metrics.on_time_completion_rate);
    let high_priority_success =
        clamp_pct(metrics.priority_metrics.high_priority_success_rate.unwrap_or(0.0));
    let time_efficiency = clamp_pct(time_efficiency(metrics.time_metrics.average_delay_hours));

    let total = completion_rate * COMPLETION_RATE_WEIGHT
        + on_time_rate * ON_TIME_RATE_WEIGHT
        + high_priority_success * HIGH_PRIORITY_WEIGHT
        + time_efficiency * TIME_EFFICIENCY_WEIGHT;

    ScoreBreakdown {
        completion_rate,
        on_time_rate,
        high_priority_success,
        time_efficiency,
        total: round2(total),
    }
}

/// 100 with no (or negative) delay, minus the delay penalty otherwise.
pub fn time_efficiency(average_delay_hours: Option<f64>) -> f64 {
    match average_delay_hours {
        Some(delay) if delay > 0.0 => (100.0 - delay * DELAY_PENALTY_PER_HOUR).max(0.0),
        _ => 100.0,
    }
}

/// Weighted overall score in [0, 100] for an employee over a period.
pub fn calculate_overall_score(
    provider: &dyn AggregateQueryProvider,
    employee: EmployeeId,
    query: &PeriodQuery,
    options: &ScoringOptions,
) -> Result<f64> {
    let metrics = compute_task_metrics(provider, employee, query, options)?;
    Ok(score_breakdown(&metrics).total)
}

/// Combined task and goal score for one ISO week. Missing week/year default
/// to the ISO week containing `as_of`.
pub fn weekly_performance_score(
    provider: &dyn AggregateQueryProvider,
    employee: EmployeeId,
    week: Option<u32>,
    year: Option<i32>,
    as_of: chrono::NaiveDateTime,
    options: &ScoringOptions,
) -> Result<WeeklyReport> {
    let query = PeriodQuery::as_of(PeriodKind::Week, as_of)
        .with_week(week)
        .with_year(year);
    let (week, year) = query.week_and_year();

    let task_metrics = compute_task_metrics(provider, employee, &query, options)?;
    let task_score = score_breakdown(&task_metrics).total;
    let goal = compute_goal_score(provider, employee, week, year)?;
    let combined_score = combine(task_score, goal.score);

    log::info!(
        "weekly score for employee {employee} in {year}-W{week:02}: {combined_score:.2} (tasks {task_score:.2}, goals {:.2})",
        goal.score
    );

    Ok(WeeklyReport {
        week,
        year,
        task_score,
        goal_score: goal.score,
        combined_score,
        task_metrics,
        goal_metrics: goal.metrics,
    })
}

/// Blend task and goal scores 50/50, 2 decimals.
pub fn combine(task_score: f64, goal_score: f64) -> f64 {
    round2(task_score * TASK_SHARE + goal_score * GOAL_SHARE)
}
