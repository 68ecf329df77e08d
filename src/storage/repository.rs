use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use crate::date_util::{format_timestamp, parse_timestamp};
use crate::model::{
    Employee, EmployeeId, Goal, GoalId, NewGoal, NewTask, Priority, Status, Task, TaskId, Team,
    TeamId,
};
use crate::report::PerformanceReport;

// ── Employees ──────────────────────────────────────────────────────

pub fn insert_employee(
    conn: &Connection,
    first_name: &str,
    last_name: &str,
    email: &str,
) -> Result<EmployeeId, rusqlite::Error> {
    conn.execute(
        "INSERT INTO employees (first_name, last_name, email, created_at)
         VALUES (?1, ?2, ?3, datetime('now'))",
        params![first_name, last_name, email],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_employee(conn: &Connection, id: EmployeeId) -> Result<Option<Employee>, rusqlite::Error> {
    conn.query_row(
        "SELECT employee_id, first_name, last_name, email FROM employees WHERE employee_id = ?1",
        params![id],
        employee_from_row,
    )
    .optional()
}

pub fn list_employees(conn: &Connection) -> Result<Vec<Employee>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT employee_id, first_name, last_name, email FROM employees ORDER BY employee_id",
    )?;
    let rows = stmt.query_map([], employee_from_row)?;
    rows.collect()
}

/// Resolve an employee identifier to an id.
/// A numeric identifier is returned as-is; anything else is looked up by email.
/// Returns None if no match is found.
pub fn resolve_employee_identifier(
    conn: &Connection,
    identifier: &str,
) -> Result<Option<EmployeeId>, rusqlite::Error> {
    if let Ok(id) = identifier.parse::<EmployeeId>() {
        return Ok(Some(id));
    }
    conn.query_row(
        "SELECT employee_id FROM employees WHERE email = ?1 COLLATE NOCASE",
        params![identifier.trim()],
        |row| row.get(0),
    )
    .optional()
}

fn employee_from_row(row: &rusqlite::Row<'_>) -> Result<Employee, rusqlite::Error> {
    Ok(Employee {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
    })
}

// ── Teams ──────────────────────────────────────────────────────────

pub fn insert_team(
    conn: &Connection,
    name: &str,
    manager_id: Option<EmployeeId>,
) -> Result<TeamId, rusqlite::Error> {
    conn.execute(
        "INSERT INTO teams (name, manager_id, created_at) VALUES (?1, ?2, datetime('now'))",
        params![name, manager_id],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn add_team_member(
    conn: &Connection,
    team_id: TeamId,
    employee_id: EmployeeId,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR IGNORE INTO team_members (team_id, employee_id) VALUES (?1, ?2)",
        params![team_id, employee_id],
    )?;
    Ok(())
}

/// Resolve a team by numeric id or exact name.
pub fn resolve_team_identifier(
    conn: &Connection,
    identifier: &str,
) -> Result<Option<TeamId>, rusqlite::Error> {
    if let Ok(id) = identifier.parse::<TeamId>() {
        return Ok(Some(id));
    }
    conn.query_row(
        "SELECT team_id FROM teams WHERE name = ?1",
        params![identifier],
        |row| row.get(0),
    )
    .optional()
}

pub fn get_team(conn: &Connection, id: TeamId) -> Result<Option<Team>, rusqlite::Error> {
    let team = conn
        .query_row(
            "SELECT team_id, name, manager_id FROM teams WHERE team_id = ?1",
            params![id],
            |row| {
                Ok(Team {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    manager_id: row.get(2)?,
                    member_ids: Vec::new(),
                })
            },
        )
        .optional()?;
    match team {
        Some(mut team) => {
            team.member_ids = team_member_ids(conn, team.id)?;
            Ok(Some(team))
        }
        None => Ok(None),
    }
}

pub fn list_teams(conn: &Connection) -> Result<Vec<Team>, rusqlite::Error> {
    let mut stmt = conn.prepare("SELECT team_id FROM teams ORDER BY name")?;
    let ids: Vec<TeamId> = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<_, _>>()?;
    let mut teams = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(team) = get_team(conn, id)? {
            teams.push(team);
        }
    }
    Ok(teams)
}

fn team_member_ids(conn: &Connection, team_id: TeamId) -> Result<Vec<EmployeeId>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT employee_id FROM team_members WHERE team_id = ?1 ORDER BY employee_id",
    )?;
    let rows = stmt.query_map(params![team_id], |row| row.get(0))?;
    rows.collect()
}

// ── Tasks ──────────────────────────────────────────────────────────

pub fn insert_task(conn: &Connection, task: &NewTask) -> Result<TaskId, rusqlite::Error> {
    conn.execute(
        "INSERT INTO tasks (
            title, description, status, priority, assignee_id, creator_id,
            created_at, due_date, completed_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, datetime('now'))",
        params![
            task.title,
            task.description,
            task.status.as_str(),
            task.priority.level(),
            task.assignee_id,
            task.creator_id,
            format_timestamp(task.created_at),
            task.due_date.map(format_timestamp),
            task.completed_at.map(format_timestamp),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

type TaskRow = (
    TaskId,
    String,
    Option<String>,
    String,
    u8,
    EmployeeId,
    Option<EmployeeId>,
    String,
    Option<String>,
    Option<String>,
);

const TASK_COLUMNS: &str = "task_id, title, description, status, priority, assignee_id, \
     creator_id, created_at, due_date, completed_at";

fn task_row(row: &rusqlite::Row<'_>) -> Result<TaskRow, rusqlite::Error> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
    ))
}

pub fn get_task(conn: &Connection, id: TaskId) -> crate::Result<Option<Task>> {
    let row: Option<TaskRow> = conn
        .query_row(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE task_id = ?1"),
            params![id],
            task_row,
        )
        .optional()?;
    row.map(task_from_row).transpose()
}

/// An employee's most recently created tasks, newest first.
pub fn list_recent_tasks(
    conn: &Connection,
    assignee_id: EmployeeId,
    limit: u32,
) -> crate::Result<Vec<Task>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks
         WHERE assignee_id = ?1
         ORDER BY created_at DESC, task_id DESC
         LIMIT ?2"
    ))?;
    let rows = stmt
        .query_map(params![assignee_id, limit], task_row)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(task_from_row).collect()
}

fn task_from_row(row: TaskRow) -> crate::Result<Task> {
    let (id, title, description, status, priority, assignee_id, creator_id, created, due, done) =
        row;
    Ok(Task {
        id,
        title,
        description,
        status: Status::parse(&status)?,
        priority: Priority::from_level(priority)?,
        assignee_id,
        creator_id,
        created_at: parse_timestamp(&created)?,
        due_date: due.as_deref().map(parse_timestamp).transpose()?,
        completed_at: done.as_deref().map(parse_timestamp).transpose()?,
    })
}

/// Move a task to `status` at time `at`.
/// Closing stamps `completed_at` (kept if the task was already closed);
/// reopening clears it. Returns false if the task does not exist.
pub fn update_task_status(
    conn: &Connection,
    id: TaskId,
    status: Status,
    at: NaiveDateTime,
) -> Result<bool, rusqlite::Error> {
    let changed = conn.execute(
        "UPDATE tasks SET
            completed_at = CASE
                WHEN ?2 = 'closed' THEN CASE WHEN status = 'closed' THEN completed_at ELSE ?3 END
                WHEN ?2 IN ('open', 'in_progress') THEN NULL
                ELSE completed_at
            END,
            status = ?2,
            updated_at = ?3
         WHERE task_id = ?1",
        params![id, status.as_str(), format_timestamp(at)],
    )?;
    Ok(changed > 0)
}

// ── Goals ──────────────────────────────────────────────────────────

pub fn insert_goal(conn: &Connection, goal: &NewGoal) -> Result<GoalId, rusqlite::Error> {
    conn.execute(
        "INSERT INTO goals (
            employee_id, description, target_value, progress, unit, status,
            week, year, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, datetime('now'), datetime('now'))",
        params![
            goal.employee_id,
            goal.description,
            goal.target_value,
            goal.progress,
            goal.unit,
            goal.status.as_str(),
            goal.week,
            goal.year,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

const GOAL_COLUMNS: &str =
    "goal_id, employee_id, description, target_value, progress, unit, status, week, year";

type GoalRow = (Goal, String);

fn goal_row(row: &rusqlite::Row<'_>) -> Result<GoalRow, rusqlite::Error> {
    Ok((
        Goal {
            id: row.get(0)?,
            employee_id: row.get(1)?,
            description: row.get(2)?,
            target_value: row.get(3)?,
            progress: row.get(4)?,
            unit: row.get(5)?,
            status: Status::Open,
            week: row.get(7)?,
            year: row.get(8)?,
        },
        row.get(6)?,
    ))
}

fn goal_from_row((mut goal, status): GoalRow) -> crate::Result<Goal> {
    goal.status = Status::parse(&status)?;
    Ok(goal)
}

fn query_goals(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> crate::Result<Vec<Goal>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, goal_row)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(goal_from_row).collect()
}

pub fn get_goal(conn: &Connection, id: GoalId) -> crate::Result<Option<Goal>> {
    let row = conn
        .query_row(
            &format!("SELECT {GOAL_COLUMNS} FROM goals WHERE goal_id = ?1"),
            params![id],
            goal_row,
        )
        .optional()?;
    row.map(goal_from_row).transpose()
}

/// Goals recorded for one ISO week, in insertion order.
pub fn list_goals_for_week(
    conn: &Connection,
    employee_id: EmployeeId,
    week: u32,
    year: i32,
) -> crate::Result<Vec<Goal>> {
    query_goals(
        conn,
        &format!(
            "SELECT {GOAL_COLUMNS} FROM goals
             WHERE employee_id = ?1 AND week = ?2 AND year = ?3
             ORDER BY goal_id"
        ),
        params![employee_id, week, year],
    )
}

/// An employee's goals for the most recent weeks, newest week first.
pub fn list_recent_goals(
    conn: &Connection,
    employee_id: EmployeeId,
    limit: u32,
) -> crate::Result<Vec<Goal>> {
    query_goals(
        conn,
        &format!(
            "SELECT {GOAL_COLUMNS} FROM goals
             WHERE employee_id = ?1
             ORDER BY year DESC, week DESC, goal_id DESC
             LIMIT ?2"
        ),
        params![employee_id, limit],
    )
}

/// Record new progress on a goal, optionally moving its status.
/// Returns false if the goal does not exist.
pub fn update_goal_progress(
    conn: &Connection,
    id: GoalId,
    progress: f64,
    status: Option<Status>,
) -> Result<bool, rusqlite::Error> {
    let changed = conn.execute(
        "UPDATE goals SET
            progress = ?2,
            status = COALESCE(?3, status),
            updated_at = datetime('now')
         WHERE goal_id = ?1",
        params![id, progress, status.map(|s| s.as_str())],
    )?;
    Ok(changed > 0)
}

// ── Config ─────────────────────────────────────────────────────────

pub fn get_config(conn: &Connection, key: &str) -> Result<Option<String>, rusqlite::Error> {
    conn.query_row(
        "SELECT value FROM app_config WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
}

pub fn set_config(conn: &Connection, key: &str, value: &str) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR REPLACE INTO app_config (key, value, updated_at)
         VALUES (?1, ?2, datetime('now'))",
        params![key, value],
    )?;
    Ok(())
}

pub fn list_config(conn: &Connection) -> Result<Vec<(String, String)>, rusqlite::Error> {
    let mut stmt = conn.prepare("SELECT key, value FROM app_config ORDER BY key")?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect()
}

// ── Performance Reports ────────────────────────────────────────────

pub fn insert_performance_report(
    conn: &Connection,
    report: &PerformanceReport,
) -> Result<i64, rusqlite::Error> {
    conn.execute(
        "INSERT INTO performance_reports (
            employee_id, week, year, score, tasks_completed, tasks_total,
            goals_completed, goals_total, task_completion_rate, goal_completion_rate,
            on_time_completion_rate, average_task_completion_time, average_priority,
            summary, generated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            report.employee_id,
            report.week,
            report.year,
            report.score,
            report.tasks_completed as i64,
            report.tasks_total as i64,
            report.goals_completed as i64,
            report.goals_total as i64,
            report.task_completion_rate,
            report.goal_completion_rate,
            report.on_time_completion_rate,
            report.average_task_completion_time,
            report.average_priority,
            report.summary,
            format_timestamp(report.generated_at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Snapshots for an employee, newest first.
pub fn list_performance_reports(
    conn: &Connection,
    employee_id: EmployeeId,
) -> crate::Result<Vec<PerformanceReport>> {
    let mut stmt = conn.prepare(
        "SELECT report_id, employee_id, week, year, score, tasks_completed, tasks_total,
                goals_completed, goals_total, task_completion_rate, goal_completion_rate,
                on_time_completion_rate, average_task_completion_time, average_priority,
                summary, generated_at
         FROM performance_reports
         WHERE employee_id = ?1
         ORDER BY year DESC, week DESC, generated_at DESC, report_id DESC",
    )?;
    let rows = stmt.query_map(params![employee_id], |row| {
        let generated_at: String = row.get(15)?;
        Ok((
            PerformanceReport {
                id: Some(row.get(0)?),
                employee_id: row.get(1)?,
                week: row.get(2)?,
                year: row.get(3)?,
                score: row.get(4)?,
                tasks_completed: row.get::<_, i64>(5)? as u64,
                tasks_total: row.get::<_, i64>(6)? as u64,
                goals_completed: row.get::<_, i64>(7)? as u64,
                goals_total: row.get::<_, i64>(8)? as u64,
                task_completion_rate: row.get(9)?,
                goal_completion_rate: row.get(10)?,
                on_time_completion_rate: row.get(11)?,
                average_task_completion_time: row.get(12)?,
                average_priority: row.get(13)?,
                summary: row.get(14)?,
                generated_at: NaiveDateTime::default(),
            },
            generated_at,
        ))
    })?;

    let mut reports = Vec::new();
    for row in rows {
        let (mut report, generated_at) = row?;
        report.generated_at = parse_timestamp(&generated_at)?;
        reports.push(report);
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    fn at(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    fn new_task(assignee_id: EmployeeId, status: Status) -> NewTask {
        NewTask {
            title: "Write report".into(),
            description: None,
            status,
            priority: Priority::Medium,
            assignee_id,
            creator_id: None,
            created_at: at("2025-03-03 09:00:00"),
            due_date: Some(at("2025-03-05 17:00:00")),
            completed_at: None,
        }
    }

    #[tokio::test]
    async fn test_employee_round_trip() {
        let db = Database::open_memory().await.unwrap();

        let (id, by_email, by_id, missing) = db
            .writer()
            .call(|conn| {
                let id = insert_employee(conn, "Ada", "Lovelace", "ada@example.com")?;
                let by_email = resolve_employee_identifier(conn, "ADA@example.com")?;
                let by_id = resolve_employee_identifier(conn, &id.to_string())?;
                let missing = resolve_employee_identifier(conn, "nobody@example.com")?;
                Ok::<_, rusqlite::Error>((id, by_email, by_id, missing))
            })
            .await
            .unwrap();

        assert_eq!(by_email, Some(id));
        assert_eq!(by_id, Some(id));
        assert_eq!(missing, None);

        let employee = db
            .reader()
            .call(move |conn| get_employee(conn, id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(employee.full_name(), "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_team_members() {
        let db = Database::open_memory().await.unwrap();

        let team = db
            .writer()
            .call(|conn| {
                let a = insert_employee(conn, "A", "", "a@example.com")?;
                let b = insert_employee(conn, "B", "", "b@example.com")?;
                let team = insert_team(conn, "Platform", Some(a))?;
                add_team_member(conn, team, b)?;
                add_team_member(conn, team, a)?;
                add_team_member(conn, team, a)?;
                let resolved = resolve_team_identifier(conn, "Platform")?;
                assert_eq!(resolved, Some(team));
                get_team(conn, team)
            })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(team.name, "Platform");
        assert_eq!(team.member_ids, vec![1, 2]);
        assert_eq!(team.manager_id, Some(1));
    }

    #[tokio::test]
    async fn test_task_status_transitions() {
        let db = Database::open_memory().await.unwrap();

        let task = db
            .writer()
            .call(|conn| {
                let emp = insert_employee(conn, "A", "", "a@example.com")?;
                let id = insert_task(conn, &new_task(emp, Status::Open))?;

                update_task_status(conn, id, Status::Closed, at("2025-03-04 10:30:00"))?;
                // Closing again keeps the first completion time.
                update_task_status(conn, id, Status::Closed, at("2025-03-09 10:30:00"))?;
                let closed = get_task(conn, id)?;

                update_task_status(conn, id, Status::InProgress, at("2025-03-10 08:00:00"))?;
                let reopened = get_task(conn, id)?;

                let missing = update_task_status(conn, 999, Status::Closed, at("2025-03-10 08:00:00"))?;
                Ok::<_, crate::Error>((closed, reopened, missing))
            })
            .await
            .unwrap();

        let (closed, reopened, missing) = task;
        let closed = closed.unwrap();
        assert_eq!(closed.status, Status::Closed);
        assert_eq!(closed.completed_at, Some(at("2025-03-04 10:30:00")));

        let reopened = reopened.unwrap();
        assert_eq!(reopened.status, Status::InProgress);
        assert_eq!(reopened.completed_at, None);
        assert!(!missing);
    }

    #[tokio::test]
    async fn test_goal_progress() {
        let db = Database::open_memory().await.unwrap();

        let goal = db
            .writer()
            .call(|conn| {
                let emp = insert_employee(conn, "A", "", "a@example.com")?;
                let id = insert_goal(
                    conn,
                    &NewGoal {
                        employee_id: emp,
                        description: "Ship 10 reviews".into(),
                        target_value: 10.0,
                        progress: 0.0,
                        unit: Some("reviews".into()),
                        status: Status::Open,
                        week: 10,
                        year: 2025,
                    },
                )?;
                update_goal_progress(conn, id, 4.0, None)?;
                update_goal_progress(conn, id, 10.0, Some(Status::Closed))?;
                get_goal(conn, id)
            })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(goal.progress, 10.0);
        assert_eq!(goal.status, Status::Closed);
        assert_eq!((goal.week, goal.year), (10, 2025));
    }

    #[tokio::test]
    async fn test_recent_tasks_newest_first() {
        let db = Database::open_memory().await.unwrap();

        let (recent, limited) = db
            .writer()
            .call(|conn| {
                let emp = insert_employee(conn, "A", "", "a@example.com")?;
                let other = insert_employee(conn, "B", "", "b@example.com")?;
                for created in ["2025-03-04 09:00:00", "2025-03-06 09:00:00", "2025-03-05 09:00:00"] {
                    insert_task(
                        conn,
                        &NewTask {
                            created_at: at(created),
                            ..new_task(emp, Status::Open)
                        },
                    )?;
                }
                insert_task(conn, &new_task(other, Status::Open))?;
                Ok::<_, crate::Error>((
                    list_recent_tasks(conn, emp, 50)?,
                    list_recent_tasks(conn, emp, 2)?,
                ))
            })
            .await
            .unwrap();

        let created: Vec<_> = recent.iter().map(|t| t.created_at).collect();
        assert_eq!(
            created,
            vec![
                at("2025-03-06 09:00:00"),
                at("2025-03-05 09:00:00"),
                at("2025-03-04 09:00:00"),
            ]
        );
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].id, recent[0].id);
    }

    #[tokio::test]
    async fn test_goal_listings() {
        let db = Database::open_memory().await.unwrap();

        let (week_ten, recent) = db
            .writer()
            .call(|conn| {
                let emp = insert_employee(conn, "A", "", "a@example.com")?;
                for (description, week, year) in [
                    ("late 2024", 52, 2024),
                    ("first", 10, 2025),
                    ("earlier", 9, 2025),
                    ("second", 10, 2025),
                ] {
                    insert_goal(
                        conn,
                        &NewGoal {
                            employee_id: emp,
                            description: description.into(),
                            target_value: 5.0,
                            progress: 1.0,
                            unit: None,
                            status: Status::Open,
                            week,
                            year,
                        },
                    )?;
                }
                Ok::<_, crate::Error>((
                    list_goals_for_week(conn, emp, 10, 2025)?,
                    list_recent_goals(conn, emp, 50)?,
                ))
            })
            .await
            .unwrap();

        let names = |goals: &[Goal]| goals.iter().map(|g| g.description.clone()).collect::<Vec<_>>();
        assert_eq!(names(&week_ten), vec!["first", "second"]);
        assert_eq!(names(&recent), vec!["second", "first", "earlier", "late 2024"]);
    }

    #[tokio::test]
    async fn test_config_round_trip() {
        let db = Database::open_memory().await.unwrap();

        db.writer()
            .call(|conn| {
                set_config(conn, "high_priority_level", "1")?;
                set_config(conn, "high_priority_level", "3")?;
                set_config(conn, "default_period", "month")?;
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();

        let (value, all) = db
            .reader()
            .call(|conn| {
                let value = get_config(conn, "high_priority_level")?;
                let all = list_config(conn)?;
                Ok::<_, rusqlite::Error>((value, all))
            })
            .await
            .unwrap();

        assert_eq!(value.as_deref(), Some("3"));
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].0, "default_period");
    }

    #[tokio::test]
    async fn test_reports_newest_first() {
        let db = Database::open_memory().await.unwrap();

        let reports = db
            .writer()
            .call(|conn| {
                let emp = insert_employee(conn, "A", "", "a@example.com")?;
                let base = PerformanceReport {
                    id: None,
                    employee_id: emp,
                    week: 9,
                    year: 2025,
                    score: 50.0,
                    tasks_completed: 1,
                    tasks_total: 2,
                    goals_completed: 0,
                    goals_total: 1,
                    task_completion_rate: 50.0,
                    goal_completion_rate: 0.0,
                    on_time_completion_rate: 100.0,
                    average_task_completion_time: Some(4.5),
                    average_priority: None,
                    summary: "week 9".into(),
                    generated_at: at("2025-03-03 08:00:00"),
                };
                insert_performance_report(conn, &base)?;
                insert_performance_report(
                    conn,
                    &PerformanceReport {
                        week: 10,
                        summary: "week 10".into(),
                        generated_at: at("2025-03-10 08:00:00"),
                        ..base.clone()
                    },
                )?;
                insert_performance_report(
                    conn,
                    &PerformanceReport {
                        week: 52,
                        year: 2024,
                        summary: "last year".into(),
                        ..base
                    },
                )?;
                list_performance_reports(conn, emp)
            })
            .await
            .unwrap();

        let summaries: Vec<_> = reports.iter().map(|r| r.summary.as_str()).collect();
        assert_eq!(summaries, vec!["week 10", "week 9", "last year"]);
        assert!(reports.iter().all(|r| r.id.is_some()));
        assert_eq!(reports[1].average_task_completion_time, Some(4.5));
        assert_eq!(reports[1].generated_at, at("2025-03-03 08:00:00"));
    }
}
