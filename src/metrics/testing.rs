//! Canned aggregate results for engine tests.

use std::cell::Cell;

use crate::error::{Error, Result};
use crate::metrics::provider::{AggregateQueryProvider, GoalProgress, StatusCounts};
use crate::metrics::types::{PriorityStatusCount, PrioritySuccess};
use crate::model::EmployeeId;
use crate::query::period::PeriodRange;

#[derive(Default)]
pub struct FixedAggregates {
    pub completed: u64,
    pub open: u64,
    pub on_time: u64,
    pub avg_completion: Option<f64>,
    pub avg_delay: Option<f64>,
    /// Success rate for priority levels 1, 2, 3.
    pub priority_rates: [Option<f64>; 3],
    pub success_rows: Vec<PrioritySuccess>,
    pub status_rows: Vec<PriorityStatusCount>,
    pub goals: Vec<GoalProgress>,
    pub task_counts: StatusCounts,
    pub goal_counts: StatusCounts,
    pub avg_priority: Option<f64>,
    pub fail: bool,
    /// Last range a task query was asked for.
    pub last_range: Cell<Option<PeriodRange>>,
}

impl FixedAggregates {
    fn check(&self, range: Option<&PeriodRange>) -> Result<()> {
        if let Some(range) = range {
            self.last_range.set(Some(*range));
        }
        if self.fail {
            return Err(Error::Database("disk I/O error".into()));
        }
        Ok(())
    }
}

impl AggregateQueryProvider for FixedAggregates {
    fn completed_on_time_count(&self, _: EmployeeId, range: &PeriodRange) -> Result<u64> {
        self.check(Some(range))?;
        Ok(self.on_time)
    }

    fn completed_count(&self, _: EmployeeId, range: &PeriodRange) -> Result<u64> {
        self.check(Some(range))?;
        Ok(self.completed)
    }

    fn open_count(&self, _: EmployeeId, range: &PeriodRange) -> Result<u64> {
        self.check(Some(range))?;
        Ok(self.open)
    }

    fn average_completion_hours(&self, _: EmployeeId, range: &PeriodRange) -> Result<Option<f64>> {
        self.check(Some(range))?;
        Ok(self.avg_completion)
    }

    fn average_delay_hours(&self, _: EmployeeId, range: &PeriodRange) -> Result<Option<f64>> {
        self.check(Some(range))?;
        Ok(self.avg_delay)
    }

    fn success_rate_by_priority(
        &self,
        _: EmployeeId,
        range: &PeriodRange,
    ) -> Result<Vec<PrioritySuccess>> {
        self.check(Some(range))?;
        Ok(self.success_rows.clone())
    }

    fn priority_success_rate(
        &self,
        _: EmployeeId,
        priority: u8,
        range: &PeriodRange,
    ) -> Result<Option<f64>> {
        self.check(Some(range))?;
        Ok(self
            .priority_rates
            .get(usize::from(priority).wrapping_sub(1))
            .copied()
            .flatten())
    }

    fn status_by_priority(
        &self,
        _: EmployeeId,
        range: &PeriodRange,
    ) -> Result<Vec<PriorityStatusCount>> {
        self.check(Some(range))?;
        Ok(self.status_rows.clone())
    }

    fn goals_for_week(&self, _: EmployeeId, _: u32, _: i32) -> Result<Vec<GoalProgress>> {
        self.check(None)?;
        Ok(self.goals.clone())
    }

    fn task_status_counts(&self, _: EmployeeId) -> Result<StatusCounts> {
        self.check(None)?;
        Ok(self.task_counts)
    }

    fn goal_status_counts(&self, _: EmployeeId) -> Result<StatusCounts> {
        self.check(None)?;
        Ok(self.goal_counts)
    }

    fn average_completed_priority(&self, _: EmployeeId) -> Result<Option<f64>> {
        self.check(None)?;
        Ok(self.avg_priority)
    }
}
