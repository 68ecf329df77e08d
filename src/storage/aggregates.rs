use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

use crate::date_util::{format_timestamp, hours_between, parse_timestamp};
use crate::error::Result;
use crate::metrics::provider::{AggregateQueryProvider, GoalProgress, StatusCounts};
use crate::metrics::types::{PriorityStatusCount, PrioritySuccess};
use crate::model::{EmployeeId, Status};
use crate::query::period::PeriodRange;

/// `AggregateQueryProvider` over the SQLite store, bound to one connection
/// for the duration of a `call`.
pub struct SqliteAggregates<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteAggregates<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn count(&self, filter: &TaskFilter) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM tasks{}", filter.where_clause());
        let n: i64 = self
            .conn
            .query_row(&sql, params_from_iter(filter.params.iter()), |row| row.get(0))?;
        Ok(n as u64)
    }

    /// Fetch two timestamp columns for every matching task.
    fn timestamp_pairs(
        &self,
        from: &str,
        to: &str,
        filter: &TaskFilter,
    ) -> Result<Vec<(String, String)>> {
        let sql = format!("SELECT {from}, {to} FROM tasks{}", filter.where_clause());
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(filter.params.iter()), |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        Ok(rows.collect::<std::result::Result<_, _>>()?)
    }

    fn mean_hours(&self, from: &str, to: &str, filter: &TaskFilter) -> Result<Option<f64>> {
        let pairs = self.timestamp_pairs(from, to, filter)?;
        if pairs.is_empty() {
            return Ok(None);
        }
        let mut total = 0.0;
        for (a, b) in &pairs {
            total += hours_between(parse_timestamp(a)?, parse_timestamp(b)?);
        }
        Ok(Some(total / pairs.len() as f64))
    }

    fn status_counts(&self, table: &str, employee: EmployeeId) -> Result<StatusCounts> {
        let column = if table == "goals" { "employee_id" } else { "assignee_id" };
        let sql = format!(
            "SELECT COUNT(*),
                    COALESCE(SUM(status = 'open'), 0),
                    COALESCE(SUM(status = 'in_progress'), 0),
                    COALESCE(SUM(status = 'closed'), 0),
                    COALESCE(SUM(status = 'cancelled'), 0)
             FROM {table} WHERE {column} = ?1"
        );
        let counts = self.conn.query_row(&sql, params![employee], |row| {
            Ok(StatusCounts {
                total: row.get::<_, i64>(0)? as u64,
                open: row.get::<_, i64>(1)? as u64,
                in_progress: row.get::<_, i64>(2)? as u64,
                closed: row.get::<_, i64>(3)? as u64,
                cancelled: row.get::<_, i64>(4)? as u64,
            })
        })?;
        Ok(counts)
    }
}

/// WHERE-clause builder for queries over `tasks`.
#[derive(Debug, Clone, Default)]
struct TaskFilter {
    clauses: Vec<String>,
    params: Vec<Value>,
}

impl TaskFilter {
    fn for_employee(employee: EmployeeId) -> Self {
        Self::default().clause("assignee_id = ?", [Value::Integer(employee)])
    }

    fn clause<const N: usize>(mut self, sql: &str, params: [Value; N]) -> Self {
        self.clauses.push(sql.to_string());
        self.params.extend(params);
        self
    }

    fn status(self, status: Status) -> Self {
        self.clause("status = ?", [Value::Text(status.as_str().into())])
    }

    fn active(mut self) -> Self {
        let active: Vec<Status> = Status::ALL.into_iter().filter(Status::is_active).collect();
        self.clauses
            .push(format!("status IN ({})", vec!["?"; active.len()].join(", ")));
        self.params
            .extend(active.iter().map(|s| Value::Text(s.as_str().into())));
        self
    }

    fn priority(self, priority: u8) -> Self {
        self.clause("priority = ?", [Value::Integer(i64::from(priority))])
    }

    /// Tasks closed and stamped with a completion time.
    fn completed(self) -> Self {
        self.status(Status::Closed)
            .clause("completed_at IS NOT NULL", [])
    }

    /// `column` within the range; a missing bound leaves that side open.
    fn between(self, column: &str, range: &PeriodRange) -> Self {
        let filter = match range.start {
            Some(start) => self.clause(&format!("{column} >= ?"), [ts(start)]),
            None => self,
        };
        match range.end {
            Some(end) => filter.clause(&format!("{column} <= ?"), [ts(end)]),
            None => filter,
        }
    }

    /// Closed in range, or still active and created in range. No filter at
    /// all for an unbounded range.
    fn period_activity(self, range: &PeriodRange) -> Self {
        if range.is_unbounded() {
            return self;
        }
        let (start, end) = range.closed_bounds();
        self.clause(
            "((status = 'closed' AND completed_at BETWEEN ? AND ?)
              OR (status IN ('open', 'in_progress') AND created_at BETWEEN ? AND ?))",
            [ts(start), ts(end), ts(start), ts(end)],
        )
    }

    fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }
}

fn ts(t: chrono::NaiveDateTime) -> Value {
    Value::Text(format_timestamp(t))
}

impl AggregateQueryProvider for SqliteAggregates<'_> {
    fn completed_on_time_count(&self, employee: EmployeeId, range: &PeriodRange) -> Result<u64> {
        let filter = TaskFilter::for_employee(employee)
            .completed()
            .clause("due_date IS NOT NULL AND completed_at <= due_date", [])
            .between("completed_at", range);
        self.count(&filter)
    }

    fn completed_count(&self, employee: EmployeeId, range: &PeriodRange) -> Result<u64> {
        let filter = TaskFilter::for_employee(employee)
            .completed()
            .between("completed_at", range);
        self.count(&filter)
    }

    fn open_count(&self, employee: EmployeeId, range: &PeriodRange) -> Result<u64> {
        let filter = TaskFilter::for_employee(employee)
            .active()
            .between("created_at", range);
        self.count(&filter)
    }

    fn average_completion_hours(
        &self,
        employee: EmployeeId,
        range: &PeriodRange,
    ) -> Result<Option<f64>> {
        let filter = TaskFilter::for_employee(employee)
            .completed()
            .between("completed_at", range);
        self.mean_hours("created_at", "completed_at", &filter)
    }

    fn average_delay_hours(
        &self,
        employee: EmployeeId,
        range: &PeriodRange,
    ) -> Result<Option<f64>> {
        let filter = TaskFilter::for_employee(employee)
            .completed()
            .clause("due_date IS NOT NULL AND completed_at > due_date", [])
            .between("completed_at", range);
        self.mean_hours("due_date", "completed_at", &filter)
    }

    fn success_rate_by_priority(
        &self,
        employee: EmployeeId,
        range: &PeriodRange,
    ) -> Result<Vec<PrioritySuccess>> {
        let filter = TaskFilter::for_employee(employee).period_activity(range);
        let sql = format!(
            "SELECT priority,
                    COUNT(*),
                    SUM(status = 'closed'),
                    SUM(status = 'cancelled'),
                    SUM(status = 'in_progress')
             FROM tasks{}
             GROUP BY priority
             ORDER BY priority",
            filter.where_clause()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(filter.params.iter()), |row| {
            let total = row.get::<_, i64>(1)? as u64;
            let completed = row.get::<_, i64>(2)? as u64;
            Ok(PrioritySuccess {
                priority: row.get(0)?,
                total_tasks: total,
                completed_tasks: completed,
                cancelled_tasks: row.get::<_, i64>(3)? as u64,
                in_progress_tasks: row.get::<_, i64>(4)? as u64,
                success_rate: completed as f64 / total as f64 * 100.0,
            })
        })?;
        Ok(rows.collect::<std::result::Result<_, _>>()?)
    }

    fn priority_success_rate(
        &self,
        employee: EmployeeId,
        priority: u8,
        range: &PeriodRange,
    ) -> Result<Option<f64>> {
        let filter = TaskFilter::for_employee(employee)
            .priority(priority)
            .period_activity(range);
        let sql = format!(
            "SELECT COUNT(*), COALESCE(SUM(status = 'closed'), 0) FROM tasks{}",
            filter.where_clause()
        );
        let (total, completed): (i64, i64) = self.conn.query_row(
            &sql,
            params_from_iter(filter.params.iter()),
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        if total == 0 {
            return Ok(None);
        }
        Ok(Some(completed as f64 / total as f64 * 100.0))
    }

    fn status_by_priority(
        &self,
        employee: EmployeeId,
        range: &PeriodRange,
    ) -> Result<Vec<PriorityStatusCount>> {
        let filter = TaskFilter::for_employee(employee).period_activity(range);
        let sql = format!(
            "SELECT priority, status, COUNT(*) FROM tasks{}
             GROUP BY priority, status
             ORDER BY priority, status",
            filter.where_clause()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(filter.params.iter()), |row| {
                Ok((
                    row.get::<_, u8>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(priority, status, count)| {
                Ok(PriorityStatusCount {
                    priority,
                    status: Status::parse(&status)?,
                    count: count as u64,
                })
            })
            .collect()
    }

    fn goals_for_week(
        &self,
        employee: EmployeeId,
        week: u32,
        year: i32,
    ) -> Result<Vec<GoalProgress>> {
        let mut stmt = self.conn.prepare(
            "SELECT progress, target_value, status FROM goals
             WHERE employee_id = ?1 AND week = ?2 AND year = ?3
             ORDER BY goal_id",
        )?;
        let rows = stmt
            .query_map(params![employee, week, year], |row| {
                Ok((
                    row.get::<_, f64>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(progress, target_value, status)| {
                Ok(GoalProgress {
                    progress,
                    target_value,
                    status: Status::parse(&status)?,
                })
            })
            .collect()
    }

    fn task_status_counts(&self, employee: EmployeeId) -> Result<StatusCounts> {
        self.status_counts("tasks", employee)
    }

    fn goal_status_counts(&self, employee: EmployeeId) -> Result<StatusCounts> {
        self.status_counts("goals", employee)
    }

    fn average_completed_priority(&self, employee: EmployeeId) -> Result<Option<f64>> {
        let avg: Option<f64> = self.conn.query_row(
            "SELECT AVG(priority) FROM tasks WHERE assignee_id = ?1 AND completed_at IS NOT NULL",
            params![employee],
            |row| row.get(0),
        )?;
        Ok(avg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Priority;
    use crate::storage::fixtures::{at, seed_employee, seed_task, seed_week_ten};
    use crate::storage::Database;

    fn week_ten() -> PeriodRange {
        PeriodRange::new(at("2025-03-03 00:00:00"), at("2025-03-09 23:59:59"))
    }

    #[tokio::test]
    async fn test_week_counts() {
        let db = Database::open_memory().await.unwrap();

        let (completed, open, on_time, avg_completion, avg_delay) = db
            .writer()
            .call(|conn| {
                let emp = seed_week_ten(conn)?;
                let p = SqliteAggregates::new(conn);
                let range = week_ten();
                Ok::<_, crate::Error>((
                    p.completed_count(emp, &range)?,
                    p.open_count(emp, &range)?,
                    p.completed_on_time_count(emp, &range)?,
                    p.average_completion_hours(emp, &range)?,
                    p.average_delay_hours(emp, &range)?,
                ))
            })
            .await
            .unwrap();

        assert_eq!(completed, 8);
        assert_eq!(open, 2);
        assert_eq!(on_time, 6);
        // (6 * 24h + 2 * 58h) / 8
        assert_eq!(avg_completion, Some(32.5));
        assert_eq!(avg_delay, Some(10.0));
    }

    #[tokio::test]
    async fn test_priority_rates_follow_period_activity() {
        let db = Database::open_memory().await.unwrap();

        let (week_rates, week_rows, all_rows) = db
            .writer()
            .call(|conn| {
                let emp = seed_week_ten(conn)?;
                let p = SqliteAggregates::new(conn);
                let range = week_ten();
                let rates = [
                    p.priority_success_rate(emp, 1, &range)?,
                    p.priority_success_rate(emp, 2, &range)?,
                    p.priority_success_rate(emp, 3, &range)?,
                ];
                Ok::<_, crate::Error>((
                    rates,
                    p.success_rate_by_priority(emp, &range)?,
                    p.success_rate_by_priority(emp, &PeriodRange::unbounded())?,
                ))
            })
            .await
            .unwrap();

        assert_eq!(week_rates, [Some(50.0), Some(100.0), Some(100.0)]);

        let p3 = week_rows.iter().find(|r| r.priority == 3).unwrap();
        assert_eq!((p3.total_tasks, p3.cancelled_tasks), (2, 0));

        // The cancelled task only shows up with no period filter.
        let p3 = all_rows.iter().find(|r| r.priority == 3).unwrap();
        assert_eq!((p3.total_tasks, p3.completed_tasks, p3.cancelled_tasks), (3, 2, 1));
        let p2 = all_rows.iter().find(|r| r.priority == 2).unwrap();
        assert_eq!(p2.total_tasks, 5);
        assert_eq!(p2.success_rate, 100.0);
    }

    #[tokio::test]
    async fn test_priority_without_tasks_is_none() {
        let db = Database::open_memory().await.unwrap();

        let rate = db
            .writer()
            .call(|conn| {
                let emp = seed_employee(conn, "solo@example.com")?;
                seed_task(
                    conn,
                    emp,
                    Status::Open,
                    Priority::Low,
                    "2025-03-04 10:00:00",
                    None,
                    None,
                )?;
                let p = SqliteAggregates::new(conn);
                Ok::<_, crate::Error>((
                    p.priority_success_rate(emp, 1, &week_ten())?,
                    p.priority_success_rate(emp, 3, &week_ten())?,
                ))
            })
            .await
            .unwrap();

        assert_eq!(rate, (Some(0.0), None));
    }

    #[tokio::test]
    async fn test_status_by_priority() {
        let db = Database::open_memory().await.unwrap();

        let rows = db
            .writer()
            .call(|conn| {
                let emp = seed_week_ten(conn)?;
                SqliteAggregates::new(conn).status_by_priority(emp, &week_ten())
            })
            .await
            .unwrap();

        let p1: Vec<_> = rows
            .iter()
            .filter(|r| r.priority == 1)
            .map(|r| (r.status, r.count))
            .collect();
        assert_eq!(p1, vec![(Status::Closed, 2), (Status::Open, 2)]);
    }

    #[tokio::test]
    async fn test_half_open_range() {
        let db = Database::open_memory().await.unwrap();

        let (completed, activity) = db
            .writer()
            .call(|conn| {
                let emp = seed_week_ten(conn)?;
                let p = SqliteAggregates::new(conn);
                let since = PeriodRange {
                    start: Some(at("2025-03-01 00:00:00")),
                    end: None,
                };
                Ok::<_, crate::Error>((
                    p.completed_count(emp, &since)?,
                    p.priority_success_rate(emp, 2, &since)?,
                ))
            })
            .await
            .unwrap();

        // The February completion is excluded by the lower bound.
        assert_eq!(completed, 8);
        assert_eq!(activity, Some(100.0));
    }

    #[tokio::test]
    async fn test_other_employees_are_excluded() {
        let db = Database::open_memory().await.unwrap();

        let (count, stats) = db
            .writer()
            .call(|conn| {
                seed_week_ten(conn)?;
                let other = seed_employee(conn, "other@example.com")?;
                let p = SqliteAggregates::new(conn);
                Ok::<_, crate::Error>((
                    p.completed_count(other, &PeriodRange::unbounded())?,
                    p.task_status_counts(other)?,
                ))
            })
            .await
            .unwrap();

        assert_eq!(count, 0);
        assert_eq!(stats, StatusCounts::default());
    }

    #[tokio::test]
    async fn test_all_time_counts() {
        let db = Database::open_memory().await.unwrap();

        let (tasks, goals, avg_priority, week_goals) = db
            .writer()
            .call(|conn| {
                let emp = seed_week_ten(conn)?;
                let p = SqliteAggregates::new(conn);
                Ok::<_, crate::Error>((
                    p.task_status_counts(emp)?,
                    p.goal_status_counts(emp)?,
                    p.average_completed_priority(emp)?,
                    p.goals_for_week(emp, 10, 2025)?,
                ))
            })
            .await
            .unwrap();

        assert_eq!(
            tasks,
            StatusCounts {
                total: 12,
                open: 2,
                in_progress: 0,
                closed: 9,
                cancelled: 1,
            }
        );
        assert_eq!((goals.total, goals.open, goals.in_progress), (2, 1, 1));
        // p1 x2, p2 x5, p3 x2 closed
        assert_eq!(avg_priority, Some(18.0 / 9.0));
        assert_eq!(week_goals.len(), 2);
        assert_eq!(week_goals[1].status, Status::InProgress);
    }

    #[tokio::test]
    async fn test_average_priority_counts_any_completed_task() {
        let db = Database::open_memory().await.unwrap();

        let avg = db
            .writer()
            .call(|conn| {
                let emp = seed_week_ten(conn)?;
                // Cancelled after being finished: still has a completion time.
                seed_task(
                    conn,
                    emp,
                    Status::Cancelled,
                    Priority::High,
                    "2025-03-03 09:00:00",
                    None,
                    Some("2025-03-06 09:00:00"),
                )?;
                Ok::<_, crate::Error>(SqliteAggregates::new(conn).average_completed_priority(emp)?)
            })
            .await
            .unwrap();

        assert_eq!(avg, Some(21.0 / 10.0));
    }
}
