use crate::error::Result;
use crate::metrics::types::{PriorityStatusCount, PrioritySuccess};
use crate::model::{EmployeeId, Status};
use crate::query::period::PeriodRange;

/// Raw goal fields the goal score is computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalProgress {
    pub progress: f64,
    pub target_value: f64,
    pub status: Status,
}

/// All-time task or goal counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: u64,
    pub open: u64,
    pub in_progress: u64,
    pub closed: u64,
    pub cancelled: u64,
}

/// Aggregate queries the scoring engine is computed from.
///
/// Range-filtered methods treat `range` as follows: "completed" queries match
/// on `completed_at`, "open" queries match on `created_at`, and the
/// per-priority queries include a task when it was closed in range or is
/// still active and was created in range. An unbounded range disables the
/// filter entirely.
///
/// Errors are passed through to the caller untouched.
pub trait AggregateQueryProvider {
    /// Closed tasks with `completed_at <= due_date`, completed in range.
    fn completed_on_time_count(&self, employee: EmployeeId, range: &PeriodRange) -> Result<u64>;

    /// Closed tasks completed in range.
    fn completed_count(&self, employee: EmployeeId, range: &PeriodRange) -> Result<u64>;

    /// Open or in-progress tasks created in range.
    fn open_count(&self, employee: EmployeeId, range: &PeriodRange) -> Result<u64>;

    /// Mean hours from creation to completion over tasks completed in range.
    fn average_completion_hours(
        &self,
        employee: EmployeeId,
        range: &PeriodRange,
    ) -> Result<Option<f64>>;

    /// Mean hours past due over tasks completed late in range.
    fn average_delay_hours(&self, employee: EmployeeId, range: &PeriodRange)
        -> Result<Option<f64>>;

    /// Per-priority totals and success rate, ordered by priority.
    fn success_rate_by_priority(
        &self,
        employee: EmployeeId,
        range: &PeriodRange,
    ) -> Result<Vec<PrioritySuccess>>;

    /// `completed / total * 100` for one priority level, `None` with no tasks.
    fn priority_success_rate(
        &self,
        employee: EmployeeId,
        priority: u8,
        range: &PeriodRange,
    ) -> Result<Option<f64>>;

    /// Task counts grouped by (priority, status).
    fn status_by_priority(
        &self,
        employee: EmployeeId,
        range: &PeriodRange,
    ) -> Result<Vec<PriorityStatusCount>>;

    /// Goals recorded for one ISO week.
    fn goals_for_week(&self, employee: EmployeeId, week: u32, year: i32)
        -> Result<Vec<GoalProgress>>;

    /// All-time task counts per status.
    fn task_status_counts(&self, employee: EmployeeId) -> Result<StatusCounts>;

    /// All-time goal counts per status.
    fn goal_status_counts(&self, employee: EmployeeId) -> Result<StatusCounts>;

    /// Mean priority level of completed tasks, all time.
    fn average_completed_priority(&self, employee: EmployeeId) -> Result<Option<f64>>;
}
