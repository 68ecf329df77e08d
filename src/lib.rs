pub mod date_util;
pub mod error;
pub mod metrics;
pub mod model;
pub mod query;
pub mod report;
pub mod storage;

pub use error::{Error, Result};
pub use metrics::{
    AggregateQueryProvider, DashboardStatistics, GoalEntry, GoalMetrics, ScoringOptions,
    TaskMetrics, TeamScoreboard, WeeklyReport,
};
pub use model::{Employee, EmployeeId, Goal, NewGoal, NewTask, Priority, Status, Task, Team};
pub use query::period::{PeriodKind, PeriodQuery, PeriodRange};
pub use report::PerformanceReport;
pub use storage::Database;

use chrono::NaiveDateTime;

use model::{GoalId, TaskId, TeamId};
use storage::{repository, SqliteAggregates};

/// Main entry point: scoring and bookkeeping over a team performance store.
pub struct TeamScore {
    db: Database,
}

impl TeamScore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Access the database (for direct queries in the CLI).
    pub fn db(&self) -> &Database {
        &self.db
    }

    // ── Employees & teams ──────────────────────────────────────────

    pub async fn add_employee(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<EmployeeId> {
        let (first_name, last_name, email) =
            (first_name.to_string(), last_name.to_string(), email.trim().to_string());
        if email.is_empty() {
            return Err(Error::InvalidInput("email must not be empty".into()));
        }
        let id = self
            .db
            .writer()
            .call(move |conn| repository::insert_employee(conn, &first_name, &last_name, &email))
            .await?;
        log::info!("added employee {id}");
        Ok(id)
    }

    pub async fn list_employees(&self) -> Result<Vec<Employee>> {
        Ok(self
            .db
            .reader()
            .call(|conn| repository::list_employees(conn))
            .await?)
    }

    /// Resolve a numeric id or email to an existing employee.
    pub async fn resolve_employee(&self, identifier: &str) -> Result<Employee> {
        let identifier = identifier.to_string();
        self.db
            .reader()
            .call(move |conn| {
                let employee = match repository::resolve_employee_identifier(conn, &identifier)? {
                    Some(id) => repository::get_employee(conn, id)?,
                    None => None,
                };
                employee.ok_or_else(|| Error::NotFound(format!("employee {identifier}")))
            })
            .await
            .map_err(Error::from)
    }

    pub async fn add_team(&self, name: &str, manager: Option<EmployeeId>) -> Result<TeamId> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(Error::InvalidInput("team name must not be empty".into()));
        }
        Ok(self
            .db
            .writer()
            .call(move |conn| repository::insert_team(conn, &name, manager))
            .await?)
    }

    pub async fn add_team_member(&self, team: TeamId, employee: EmployeeId) -> Result<()> {
        Ok(self
            .db
            .writer()
            .call(move |conn| repository::add_team_member(conn, team, employee))
            .await?)
    }

    /// Resolve a numeric id or exact name to an existing team.
    pub async fn resolve_team(&self, identifier: &str) -> Result<Team> {
        let identifier = identifier.to_string();
        self.db
            .reader()
            .call(move |conn| {
                let team = match repository::resolve_team_identifier(conn, &identifier)? {
                    Some(id) => repository::get_team(conn, id)?,
                    None => None,
                };
                team.ok_or_else(|| Error::NotFound(format!("team {identifier}")))
            })
            .await
            .map_err(Error::from)
    }

    pub async fn list_teams(&self) -> Result<Vec<Team>> {
        Ok(self
            .db
            .reader()
            .call(|conn| repository::list_teams(conn))
            .await?)
    }

    // ── Tasks & goals ──────────────────────────────────────────────

    pub async fn add_task(&self, task: NewTask) -> Result<TaskId> {
        if task.status == Status::Closed && task.completed_at.is_none() {
            return Err(Error::InvalidInput(
                "a closed task needs a completion time".into(),
            ));
        }
        Ok(self
            .db
            .writer()
            .call(move |conn| repository::insert_task(conn, &task))
            .await?)
    }

    pub async fn set_task_status(
        &self,
        task: TaskId,
        status: Status,
        at: NaiveDateTime,
    ) -> Result<Task> {
        self.db
            .writer()
            .call(move |conn| {
                if !repository::update_task_status(conn, task, status, at)? {
                    return Err(Error::NotFound(format!("task {task}")));
                }
                repository::get_task(conn, task)?
                    .ok_or_else(|| Error::NotFound(format!("task {task}")))
            })
            .await
            .map_err(Error::from)
    }

    pub async fn add_goal(&self, goal: NewGoal) -> Result<GoalId> {
        if !(1..=53).contains(&goal.week) {
            return Err(Error::InvalidInput(format!(
                "goal week must be 1..=53, got {}",
                goal.week
            )));
        }
        Ok(self
            .db
            .writer()
            .call(move |conn| repository::insert_goal(conn, &goal))
            .await?)
    }

    /// An employee's most recently created tasks, newest first.
    pub async fn list_tasks(&self, employee: EmployeeId, limit: u32) -> Result<Vec<Task>> {
        self.db
            .reader()
            .call(move |conn| repository::list_recent_tasks(conn, employee, limit))
            .await
            .map_err(Error::from)
    }

    /// An employee's goals, newest week first, with progress percentages.
    pub async fn list_goals(&self, employee: EmployeeId, limit: u32) -> Result<Vec<GoalEntry>> {
        let goals = self
            .db
            .reader()
            .call(move |conn| repository::list_recent_goals(conn, employee, limit))
            .await
            .map_err(Error::from)?;
        Ok(goals.into_iter().map(metrics::dashboard::goal_entry).collect())
    }

    pub async fn update_goal_progress(
        &self,
        goal: GoalId,
        progress: f64,
        status: Option<Status>,
    ) -> Result<Goal> {
        self.db
            .writer()
            .call(move |conn| {
                if !repository::update_goal_progress(conn, goal, progress, status)? {
                    return Err(Error::NotFound(format!("goal {goal}")));
                }
                repository::get_goal(conn, goal)?
                    .ok_or_else(|| Error::NotFound(format!("goal {goal}")))
            })
            .await
            .map_err(Error::from)
    }

    // ── Scoring ────────────────────────────────────────────────────

    pub async fn task_metrics(
        &self,
        employee: EmployeeId,
        query: PeriodQuery,
    ) -> Result<TaskMetrics> {
        metrics::compute_employee_task_metrics(&self.db, employee, query).await
    }

    pub async fn overall_score(&self, employee: EmployeeId, query: PeriodQuery) -> Result<f64> {
        metrics::compute_employee_overall_score(&self.db, employee, query).await
    }

    /// Combined weekly report. Missing week/year default to the ISO week
    /// containing `as_of`.
    pub async fn weekly_performance(
        &self,
        employee: EmployeeId,
        week: Option<u32>,
        year: Option<i32>,
        as_of: NaiveDateTime,
    ) -> Result<WeeklyReport> {
        metrics::compute_employee_weekly_report(&self.db, employee, week, year, as_of).await
    }

    /// Dashboard for an employee; the weekly goals are those of the ISO
    /// week containing `as_of`.
    pub async fn dashboard_statistics(
        &self,
        employee: EmployeeId,
        as_of: NaiveDateTime,
    ) -> Result<DashboardStatistics> {
        metrics::compute_employee_dashboard(&self.db, employee, as_of).await
    }

    pub async fn team_weekly_scores(
        &self,
        team: TeamId,
        week: Option<u32>,
        year: Option<i32>,
        as_of: NaiveDateTime,
    ) -> Result<TeamScoreboard> {
        metrics::compute_team_scoreboard(&self.db, team, week, year, as_of).await
    }

    // ── Report snapshots ───────────────────────────────────────────

    /// Compute and persist a weekly performance snapshot.
    pub async fn save_weekly_report(
        &self,
        employee: EmployeeId,
        week: Option<u32>,
        year: Option<i32>,
        as_of: NaiveDateTime,
    ) -> Result<PerformanceReport> {
        let weekly = self.weekly_performance(employee, week, year, as_of).await?;
        let average_priority = self
            .db
            .reader()
            .call(move |conn| SqliteAggregates::new(conn).average_completed_priority(employee))
            .await?;

        let mut report = PerformanceReport::from_weekly(employee, &weekly, average_priority, as_of);
        let id = self
            .db
            .writer()
            .call({
                let report = report.clone();
                move |conn| repository::insert_performance_report(conn, &report)
            })
            .await?;
        report.id = Some(id);

        log::info!("saved report {id}: {}", report.summary);
        Ok(report)
    }

    /// Saved snapshots for an employee, newest first.
    pub async fn list_reports(&self, employee: EmployeeId) -> Result<Vec<PerformanceReport>> {
        self.db
            .reader()
            .call(move |conn| repository::list_performance_reports(conn, employee))
            .await
            .map_err(Error::from)
    }

    // ── Config commands ────────────────────────────────────────────

    pub async fn config_get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        Ok(self
            .db
            .reader()
            .call(move |conn| repository::get_config(conn, &key))
            .await?)
    }

    /// Store a config value. Known keys are validated before they are written.
    pub async fn config_set(&self, key: &str, value: &str) -> Result<()> {
        if key == metrics::HIGH_PRIORITY_KEY {
            let level = value
                .trim()
                .parse::<u8>()
                .map_err(|_| Error::Config(format!("{key} must be 1, 2 or 3")))?;
            Priority::from_level(level).map_err(|e| Error::Config(e.to_string()))?;
        }
        let (key, value) = (key.to_string(), value.trim().to_string());
        Ok(self
            .db
            .writer()
            .call(move |conn| repository::set_config(conn, &key, &value))
            .await?)
    }

    pub async fn config_list(&self) -> Result<Vec<(String, String)>> {
        Ok(self
            .db
            .reader()
            .call(|conn| repository::list_config(conn))
            .await?)
    }
}
