use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub type EmployeeId = i64;
pub type TeamId = i64;
pub type TaskId = i64;
pub type GoalId = i64;

/// Lifecycle status shared by tasks and goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Open,
    InProgress,
    Closed,
    Cancelled,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Open,
        Status::InProgress,
        Status::Closed,
        Status::Cancelled,
    ];

    /// Parse a status, normalizing legacy spellings (`completed`, `active`, ...).
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" | "active" => Ok(Status::Open),
            "in_progress" | "in-progress" | "ongoing" => Ok(Status::InProgress),
            "closed" | "completed" | "done" => Ok(Status::Closed),
            "cancelled" | "canceled" => Ok(Status::Cancelled),
            other => Err(Error::InvalidInput(format!("unknown status: {other}"))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "open",
            Status::InProgress => "in_progress",
            Status::Closed => "closed",
            Status::Cancelled => "cancelled",
        }
    }

    /// Open or in progress.
    pub fn is_active(&self) -> bool {
        matches!(self, Status::Open | Status::InProgress)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority level as stored (1=Low, 2=Medium, 3=High).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn from_level(level: u8) -> Result<Self> {
        match level {
            1 => Ok(Priority::Low),
            2 => Ok(Priority::Medium),
            3 => Ok(Priority::High),
            other => Err(Error::InvalidInput(format!(
                "priority must be 1, 2 or 3, got {other}"
            ))),
        }
    }

    pub fn level(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub manager_id: Option<EmployeeId>,
    pub member_ids: Vec<EmployeeId>,
}

/// A task as recorded in the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub status: Status,
    pub priority: Priority,
    pub assignee_id: EmployeeId,
    pub creator_id: Option<EmployeeId>,
    pub created_at: NaiveDateTime,
    pub due_date: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
}

/// Fields for inserting a task.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: Status,
    pub priority: Priority,
    pub assignee_id: EmployeeId,
    pub creator_id: Option<EmployeeId>,
    pub created_at: NaiveDateTime,
    pub due_date: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
}

/// A weekly goal as recorded in the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: GoalId,
    pub employee_id: EmployeeId,
    pub description: String,
    pub target_value: f64,
    pub progress: f64,
    pub unit: Option<String>,
    pub status: Status,
    pub week: u32,
    pub year: i32,
}

/// Fields for inserting a goal.
#[derive(Debug, Clone)]
pub struct NewGoal {
    pub employee_id: EmployeeId,
    pub description: String,
    pub target_value: f64,
    pub progress: f64,
    pub unit: Option<String>,
    pub status: Status,
    pub week: u32,
    pub year: i32,
}
