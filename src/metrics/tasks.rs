use std::collections::BTreeMap;

use crate::date_util::round2;
use crate::error::Result;
use crate::metrics::provider::AggregateQueryProvider;
use crate::metrics::types::{BasicMetrics, PeriodInfo, PriorityMetrics, TaskMetrics, TimeMetrics};
use crate::metrics::ScoringOptions;
use crate::model::{EmployeeId, Priority};
use crate::query::period::{PeriodKind, PeriodQuery, PeriodRange};

/// Compute task performance for an employee over a period.
pub fn compute_task_metrics(
    provider: &dyn AggregateQueryProvider,
    employee: EmployeeId,
    query: &PeriodQuery,
    options: &ScoringOptions,
) -> Result<TaskMetrics> {
    let range = query.resolve()?;

    let on_time = provider.completed_on_time_count(employee, &range)?;
    let completed = provider.completed_count(employee, &range)?;
    let open = provider.open_count(employee, &range)?;
    let basic_metrics = basic_metrics(completed, open, on_time);

    let time_metrics = TimeMetrics {
        average_completion_time: provider.average_completion_hours(employee, &range)?,
        average_delay_hours: provider.average_delay_hours(employee, &range)?,
    };

    let mut completion_rate_by_priority = BTreeMap::new();
    for priority in Priority::ALL {
        let rate = provider.priority_success_rate(employee, priority.level(), &range)?;
        completion_rate_by_priority.insert(priority.level(), rate.map(round2));
    }

    let priority_metrics = PriorityMetrics {
        success_rate_by_priority: provider.success_rate_by_priority(employee, &range)?,
        high_priority_success_rate: provider.priority_success_rate(
            employee,
            options.high_priority,
            &range,
        )?,
        status_by_priority: provider.status_by_priority(employee, &range)?,
        completion_rate_by_priority,
    };

    log::debug!(
        "task metrics for employee {employee} ({}): {} of {} completed, {} on time",
        query.kind,
        basic_metrics.completed_tasks,
        basic_metrics.total_tasks_in_period,
        basic_metrics.tasks_completed_on_time
    );

    Ok(TaskMetrics {
        period: period_info(query, &range),
        basic_metrics,
        time_metrics,
        priority_metrics,
    })
}

/// Derive the basic counts and rates from the three period counts.
pub fn basic_metrics(completed: u64, open: u64, completed_on_time: u64) -> BasicMetrics {
    let total = completed + open;
    BasicMetrics {
        total_tasks_in_period: total,
        completed_tasks: completed,
        open_tasks: open,
        task_completion_rate: percentage(completed, total),
        on_time_completion_rate: percentage(completed_on_time, completed),
        tasks_completed_on_time: completed_on_time,
    }
}

/// `part / whole * 100` to 2 decimals, 0 when `whole` is 0.
fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round2(part as f64 / whole as f64 * 100.0)
}

fn period_info(query: &PeriodQuery, range: &PeriodRange) -> PeriodInfo {
    let (week, year) = match query.kind {
        PeriodKind::Week => {
            let (w, y) = query.week_and_year();
            (Some(w), Some(y))
        }
        _ => (query.week, query.year),
    };
    PeriodInfo {
        kind: query.kind,
        week,
        year,
        start_date: range.start.map(|d| d.format("%Y-%m-%d").to_string()),
        end_date: range.end.map(|d| d.format("%Y-%m-%d").to_string()),
    }
}
