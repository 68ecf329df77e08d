pub mod dashboard;
pub mod goals;
pub mod provider;
pub mod score;
pub mod tasks;
#[cfg(test)]
mod testing;
pub mod types;

pub use provider::AggregateQueryProvider;
pub use types::*;

use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::error::{Error, Result};
use crate::model::{Employee, EmployeeId, Priority, TeamId};
use crate::query::period::{PeriodKind, PeriodQuery};
use crate::storage::repository;
use crate::storage::{Database, SqliteAggregates};

/// Rows in the dashboard's recent task and goal listings.
pub const RECENT_LIMIT: u32 = 50;

/// `app_config` key holding the priority level treated as "high priority".
pub const HIGH_PRIORITY_KEY: &str = "high_priority_level";

/// Tunables read from `app_config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringOptions {
    /// Priority level whose success rate feeds the overall score.
    pub high_priority: u8,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self { high_priority: 1 }
    }
}

impl ScoringOptions {
    pub fn load(conn: &Connection) -> Result<Self> {
        match repository::get_config(conn, HIGH_PRIORITY_KEY)? {
            None => Ok(Self::default()),
            Some(raw) => {
                let level = raw
                    .trim()
                    .parse::<u8>()
                    .ok()
                    .and_then(|l| Priority::from_level(l).ok())
                    .ok_or_else(|| {
                        Error::Config(format!("{HIGH_PRIORITY_KEY} must be 1, 2 or 3, got {raw:?}"))
                    })?;
                Ok(Self {
                    high_priority: level.level(),
                })
            }
        }
    }
}

fn require_employee(conn: &Connection, employee: EmployeeId) -> Result<Employee> {
    repository::get_employee(conn, employee)?
        .ok_or_else(|| Error::NotFound(format!("employee {employee}")))
}

/// Compute task metrics for an employee over a period.
pub async fn compute_employee_task_metrics(
    db: &Database,
    employee: EmployeeId,
    query: PeriodQuery,
) -> Result<TaskMetrics> {
    db.reader()
        .call(move |conn| {
            require_employee(conn, employee)?;
            let options = ScoringOptions::load(conn)?;
            tasks::compute_task_metrics(&SqliteAggregates::new(conn), employee, &query, &options)
        })
        .await
        .map_err(Error::from)
}

/// Compute the weighted overall score for an employee over a period.
pub async fn compute_employee_overall_score(
    db: &Database,
    employee: EmployeeId,
    query: PeriodQuery,
) -> Result<f64> {
    db.reader()
        .call(move |conn| {
            require_employee(conn, employee)?;
            let options = ScoringOptions::load(conn)?;
            score::calculate_overall_score(&SqliteAggregates::new(conn), employee, &query, &options)
        })
        .await
        .map_err(Error::from)
}

/// Compute the combined weekly report for an employee.
pub async fn compute_employee_weekly_report(
    db: &Database,
    employee: EmployeeId,
    week: Option<u32>,
    year: Option<i32>,
    as_of: NaiveDateTime,
) -> Result<WeeklyReport> {
    db.reader()
        .call(move |conn| {
            require_employee(conn, employee)?;
            let options = ScoringOptions::load(conn)?;
            score::weekly_performance_score(
                &SqliteAggregates::new(conn),
                employee,
                week,
                year,
                as_of,
                &options,
            )
        })
        .await
        .map_err(Error::from)
}

/// Dashboard for an employee: all-time counts, the goals of the ISO week
/// containing `as_of`, and the most recent tasks and goals.
pub async fn compute_employee_dashboard(
    db: &Database,
    employee: EmployeeId,
    as_of: NaiveDateTime,
) -> Result<DashboardStatistics> {
    db.reader()
        .call(move |conn| {
            require_employee(conn, employee)?;
            let (week, year) = PeriodQuery::as_of(PeriodKind::Week, as_of).week_and_year();
            let week_goals = repository::list_goals_for_week(conn, employee, week, year)?;

            let mut stats = dashboard::dashboard_statistics(
                &SqliteAggregates::new(conn),
                employee,
                week,
                year,
                week_goals,
            )?;
            stats.tasks = repository::list_recent_tasks(conn, employee, RECENT_LIMIT)?;
            stats.goals = repository::list_recent_goals(conn, employee, RECENT_LIMIT)?
                .into_iter()
                .map(dashboard::goal_entry)
                .collect();
            Ok::<_, Error>(stats)
        })
        .await
        .map_err(Error::from)
}

/// Weekly combined score for every member of a team, best first.
pub async fn compute_team_scoreboard(
    db: &Database,
    team: TeamId,
    week: Option<u32>,
    year: Option<i32>,
    as_of: NaiveDateTime,
) -> Result<TeamScoreboard> {
    db.reader()
        .call(move |conn| {
            let conn: &Connection = conn;
            let team = repository::get_team(conn, team)?
                .ok_or_else(|| Error::NotFound(format!("team {team}")))?;
            let options = ScoringOptions::load(conn)?;
            let provider = SqliteAggregates::new(conn);

            let query = PeriodQuery::as_of(PeriodKind::Week, as_of)
                .with_week(week)
                .with_year(year);
            let (week, year) = query.week_and_year();

            let mut members = Vec::with_capacity(team.member_ids.len());
            for &member in &team.member_ids {
                let employee = require_employee(conn, member)?;
                let report = score::weekly_performance_score(
                    &provider,
                    member,
                    Some(week),
                    Some(year),
                    as_of,
                    &options,
                )?;
                members.push(TeamMemberScore {
                    employee_id: member,
                    name: employee.full_name(),
                    task_score: report.task_score,
                    goal_score: report.goal_score,
                    combined_score: report.combined_score,
                });
            }
            rank_members(&mut members);

            log::debug!(
                "scored {} members of team {} for {year}-W{week:02}",
                members.len(),
                team.name
            );

            Ok::<_, Error>(TeamScoreboard {
                team_id: team.id,
                team_name: team.name,
                week,
                year,
                members,
            })
        })
        .await
        .map_err(Error::from)
}

/// Highest combined score first, ties by employee id.
pub fn rank_members(members: &mut [TeamMemberScore]) {
    members.sort_by(|a, b| {
        b.combined_score
            .total_cmp(&a.combined_score)
            .then(a.employee_id.cmp(&b.employee_id))
    });
}
