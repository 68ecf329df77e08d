//! Seed data shared by store-backed tests.

use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::date_util::parse_timestamp;
use crate::model::{EmployeeId, NewGoal, NewTask, Priority, Status, TaskId};
use crate::storage::repository;

pub fn at(s: &str) -> NaiveDateTime {
    parse_timestamp(s).unwrap()
}

pub fn seed_employee(conn: &Connection, email: &str) -> Result<EmployeeId, rusqlite::Error> {
    let first = email.split('@').next().unwrap_or(email);
    repository::insert_employee(conn, first, "Tester", email)
}

pub fn seed_task(
    conn: &Connection,
    assignee_id: EmployeeId,
    status: Status,
    priority: Priority,
    created_at: &str,
    due_date: Option<&str>,
    completed_at: Option<&str>,
) -> Result<TaskId, rusqlite::Error> {
    repository::insert_task(
        conn,
        &NewTask {
            title: format!("{} task", priority.label()),
            description: None,
            status,
            priority,
            assignee_id,
            creator_id: None,
            created_at: at(created_at),
            due_date: due_date.map(at),
            completed_at: completed_at.map(at),
        },
    )
}

pub fn seed_goal(
    conn: &Connection,
    employee_id: EmployeeId,
    progress: f64,
    target_value: f64,
    status: Status,
    week: u32,
    year: i32,
) -> Result<(), rusqlite::Error> {
    repository::insert_goal(
        conn,
        &NewGoal {
            employee_id,
            description: format!("reach {target_value}"),
            target_value,
            progress,
            unit: None,
            status,
            week,
            year,
        },
    )?;
    Ok(())
}

/// One employee's 2025-W10 (2025-03-03 .. 2025-03-09):
/// 6 tasks closed on time, 2 closed 10h late, 2 still open, plus a task
/// closed in February, a cancelled task and two goals for the week.
pub fn seed_week_ten(conn: &Connection) -> Result<EmployeeId, rusqlite::Error> {
    let emp = seed_employee(conn, "ada@example.com")?;

    for priority in [
        Priority::Low,
        Priority::Low,
        Priority::Medium,
        Priority::Medium,
        Priority::Medium,
        Priority::Medium,
    ] {
        seed_task(
            conn,
            emp,
            Status::Closed,
            priority,
            "2025-03-03 09:00:00",
            Some("2025-03-07 17:00:00"),
            Some("2025-03-04 09:00:00"),
        )?;
    }
    for _ in 0..2 {
        seed_task(
            conn,
            emp,
            Status::Closed,
            Priority::High,
            "2025-03-03 09:00:00",
            Some("2025-03-05 09:00:00"),
            Some("2025-03-05 19:00:00"),
        )?;
    }
    for _ in 0..2 {
        seed_task(
            conn,
            emp,
            Status::Open,
            Priority::Low,
            "2025-03-04 10:00:00",
            Some("2025-03-12 17:00:00"),
            None,
        )?;
    }

    seed_task(
        conn,
        emp,
        Status::Closed,
        Priority::Medium,
        "2025-02-18 09:00:00",
        None,
        Some("2025-02-20 12:00:00"),
    )?;
    seed_task(
        conn,
        emp,
        Status::Cancelled,
        Priority::High,
        "2025-03-04 11:00:00",
        None,
        None,
    )?;

    seed_goal(conn, emp, 50.0, 100.0, Status::Open, 10, 2025)?;
    seed_goal(conn, emp, 100.0, 50.0, Status::InProgress, 10, 2025)?;

    Ok(emp)
}
