use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};

use teamscore::date_util::parse_timestamp;
use teamscore::{
    EmployeeId, NewGoal, NewTask, PeriodQuery, Priority, Status, TeamScore,
};

#[derive(Parser)]
#[command(name = "teamscore", about = "Team performance scoring CLI")]
struct Cli {
    /// Database path (default: ~/.teamscore/teamscore.db)
    #[arg(long)]
    db: Option<String>,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show store status
    Status,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Manage employees
    Employee {
        #[command(subcommand)]
        action: EmployeeAction,
    },
    /// Manage teams
    Team {
        #[command(subcommand)]
        action: TeamAction,
    },
    /// Record tasks
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },
    /// Record weekly goals
    Goal {
        #[command(subcommand)]
        action: GoalAction,
    },
    /// Task performance metrics for an employee over a period
    Metrics {
        /// Employee id or email
        employee: String,
        /// Period: week, month, quarter, year, all, 2025, 2025-W10
        #[arg(long, default_value = "week")]
        period: String,
        /// ISO week (week periods)
        #[arg(long)]
        week: Option<u32>,
        /// Year (week and year periods)
        #[arg(long)]
        year: Option<i32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Performance scores
    Score {
        #[command(subcommand)]
        target: ScoreTarget,
    },
    /// All-time task and goal statistics for an employee
    Stats {
        /// Employee id or email
        employee: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Weekly report snapshots
    Report {
        #[command(subcommand)]
        action: ReportAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a config value
    Get { key: String },
    /// Set a config value (e.g. high_priority_level 3)
    Set { key: String, value: String },
    /// List all config values
    List,
}

#[derive(Subcommand)]
enum EmployeeAction {
    /// Add an employee
    Add {
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
    },
    /// List employees
    List {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum TeamAction {
    /// Create a team
    Add {
        name: String,
        /// Manager id or email
        #[arg(long)]
        manager: Option<String>,
    },
    /// Add an employee to a team
    AddMember {
        /// Team id or name
        team: String,
        /// Employee id or email
        employee: String,
    },
    /// List teams
    List {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum TaskAction {
    /// Record a task
    Add {
        /// Assignee id or email
        assignee: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// 1 (low), 2 (medium) or 3 (high)
        #[arg(long, default_value = "2")]
        priority: u8,
        #[arg(long, default_value = "open")]
        status: String,
        /// Creator id or email
        #[arg(long)]
        creator: Option<String>,
        /// Creation time (default: now)
        #[arg(long)]
        created: Option<String>,
        /// Due date (YYYY-MM-DD or YYYY-MM-DD HH:MM:SS)
        #[arg(long)]
        due: Option<String>,
        /// Completion time, required with --status closed
        #[arg(long)]
        completed: Option<String>,
    },
    /// Change a task's status
    SetStatus {
        task: i64,
        status: String,
        /// Time of the change (default: now)
        #[arg(long)]
        at: Option<String>,
    },
    /// List an employee's most recent tasks, newest first
    List {
        /// Assignee id or email
        assignee: String,
        #[arg(long, default_value = "50")]
        limit: u32,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum GoalAction {
    /// Record a weekly goal
    Add {
        /// Employee id or email
        employee: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        target: f64,
        #[arg(long, default_value = "0")]
        progress: f64,
        #[arg(long)]
        unit: Option<String>,
        /// ISO week (default: current)
        #[arg(long)]
        week: Option<u32>,
        /// ISO year (default: current)
        #[arg(long)]
        year: Option<i32>,
    },
    /// Record progress on a goal
    Progress {
        goal: i64,
        value: f64,
        #[arg(long)]
        status: Option<String>,
    },
    /// List an employee's goals, newest week first
    List {
        /// Employee id or email
        employee: String,
        #[arg(long, default_value = "50")]
        limit: u32,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ScoreTarget {
    /// Weighted overall task score over a period
    Overall {
        /// Employee id or email
        employee: String,
        #[arg(long, default_value = "week")]
        period: String,
        #[arg(long)]
        week: Option<u32>,
        #[arg(long)]
        year: Option<i32>,
    },
    /// Combined task and goal score for one ISO week
    Weekly {
        /// Employee id or email
        employee: String,
        #[arg(long)]
        week: Option<u32>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        json: bool,
    },
    /// Weekly scoreboard for a team
    Team {
        /// Team id or name
        team: String,
        #[arg(long)]
        week: Option<u32>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ReportAction {
    /// Compute and store a weekly snapshot
    Save {
        /// Employee id or email
        employee: String,
        #[arg(long)]
        week: Option<u32>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        json: bool,
    },
    /// List stored snapshots, newest first
    List {
        /// Employee id or email
        employee: String,
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let db = match &cli.db {
        Some(path) => teamscore::Database::open_at(path).await?,
        None => teamscore::Database::open().await?,
    };
    let ts = TeamScore::new(db);

    match cli.command {
        Commands::Status => print_status(&ts).await?,
        Commands::Config { action } => handle_config(&ts, action).await?,
        Commands::Employee { action } => handle_employee(&ts, action).await?,
        Commands::Team { action } => handle_team(&ts, action).await?,
        Commands::Task { action } => handle_task(&ts, action).await?,
        Commands::Goal { action } => handle_goal(&ts, action).await?,
        Commands::Metrics {
            employee,
            period,
            week,
            year,
            json,
        } => {
            let employee = ts.resolve_employee(&employee).await?;
            let query = period_query(&period, week, year)?;
            let m = ts.task_metrics(employee.id, query).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&m)?);
            } else {
                println!(
                    "Task Metrics: {} ({})",
                    employee.full_name(),
                    describe_period(&m.period)
                );
                print_task_metrics(&m);
            }
        }
        Commands::Score { target } => handle_score(&ts, target).await?,
        Commands::Stats { employee, json } => {
            let employee = ts.resolve_employee(&employee).await?;
            let stats = ts.dashboard_statistics(employee.id, now()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                let t = &stats.task_statistics;
                let g = &stats.goal_statistics;
                println!("Statistics: {}", employee.full_name());
                println!("  Tasks:");
                println!("    Total:       {}", t.total_tasks);
                println!("    Open:        {}", t.open_tasks);
                println!("    In progress: {}", t.on_going_tasks);
                println!("    Completed:   {}", t.completed_tasks);
                println!("    Cancelled:   {}", t.cancelled_tasks);
                println!("    Completion:  {:.2}%", t.task_completion_rate);
                println!("  Goals:");
                println!("    Total:       {}", g.total_goals);
                println!("    Open:        {}", g.open_goals);
                println!("    In progress: {}", g.in_progress_goals);
                println!("    Completed:   {}", g.completed_goals);
                println!("    Cancelled:   {}", g.cancelled_goals);
                println!("    Completion:  {:.2}%", g.completion_rate);
                println!(
                    "  This week ({}-W{:02}): {} goals, average progress {:.1}%",
                    g.current_year,
                    g.current_week,
                    g.weekly_goals.len(),
                    g.average_weekly_progress
                );
                print_goal_entries(&g.weekly_goals);
            }
        }
        Commands::Report { action } => handle_report(&ts, action).await?,
    }

    Ok(())
}

fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

fn timestamp_or_now(value: Option<&str>) -> anyhow::Result<NaiveDateTime> {
    Ok(match value {
        Some(s) => parse_timestamp(s)?,
        None => now(),
    })
}

/// Parse a period argument; explicit --week/--year override what it implies.
fn period_query(period: &str, week: Option<u32>, year: Option<i32>) -> anyhow::Result<PeriodQuery> {
    let mut query = PeriodQuery::parse(period, now())?;
    if week.is_some() {
        query.week = week;
    }
    if year.is_some() {
        query.year = year;
    }
    Ok(query)
}

async fn resolve_optional_employee(
    ts: &TeamScore,
    identifier: Option<&str>,
) -> anyhow::Result<Option<EmployeeId>> {
    Ok(match identifier {
        Some(id) => Some(ts.resolve_employee(id).await?.id),
        None => None,
    })
}

async fn print_status(ts: &TeamScore) -> anyhow::Result<()> {
    let stats = ts
        .db()
        .reader()
        .call(|conn| {
            let count = |sql: &str| conn.query_row(sql, [], |row| row.get::<_, i64>(0));
            let employees = count("SELECT COUNT(*) FROM employees")?;
            let teams = count("SELECT COUNT(*) FROM teams")?;
            let tasks = count("SELECT COUNT(*) FROM tasks")?;
            let open = count("SELECT COUNT(*) FROM tasks WHERE status IN ('open', 'in_progress')")?;
            let goals = count("SELECT COUNT(*) FROM goals")?;
            let reports = count("SELECT COUNT(*) FROM performance_reports")?;
            let last_report: Option<String> =
                conn.query_row("SELECT MAX(generated_at) FROM performance_reports", [], |row| {
                    row.get(0)
                })?;
            Ok::<_, rusqlite::Error>((employees, teams, tasks, open, goals, reports, last_report))
        })
        .await?;

    let (employees, teams, tasks, open, goals, reports, last_report) = stats;
    println!("Store Status");
    println!("  Employees: {employees}");
    println!("  Teams:     {teams}");
    println!("  Tasks:     {tasks} ({open} active)");
    println!("  Goals:     {goals}");
    println!("  Reports:   {reports}");
    println!(
        "  Last report: {}",
        last_report.unwrap_or_else(|| "never".to_string())
    );
    Ok(())
}

async fn handle_config(ts: &TeamScore, action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => match ts.config_get(&key).await? {
            Some(v) => println!("{key} = {v}"),
            None => println!("{key} is not set"),
        },
        ConfigAction::Set { key, value } => {
            ts.config_set(&key, &value).await?;
            println!("Config updated.");
        }
        ConfigAction::List => {
            let items = ts.config_list().await?;
            if items.is_empty() {
                println!("No configuration set.");
            } else {
                for (k, v) in items {
                    println!("{k} = {v}");
                }
            }
        }
    }
    Ok(())
}

async fn handle_employee(ts: &TeamScore, action: EmployeeAction) -> anyhow::Result<()> {
    match action {
        EmployeeAction::Add {
            email,
            first_name,
            last_name,
        } => {
            let id = ts.add_employee(&first_name, &last_name, &email).await?;
            println!("Added employee {id} ({email})");
        }
        EmployeeAction::List { json } => {
            let employees = ts.list_employees().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&employees)?);
            } else if employees.is_empty() {
                println!("No employees.");
            } else {
                for e in employees {
                    println!("{:>5}  {:<30} {}", e.id, e.full_name(), e.email);
                }
            }
        }
    }
    Ok(())
}

async fn handle_team(ts: &TeamScore, action: TeamAction) -> anyhow::Result<()> {
    match action {
        TeamAction::Add { name, manager } => {
            let manager = resolve_optional_employee(ts, manager.as_deref()).await?;
            let id = ts.add_team(&name, manager).await?;
            println!("Added team {id} ({name})");
        }
        TeamAction::AddMember { team, employee } => {
            let team = ts.resolve_team(&team).await?;
            let employee = ts.resolve_employee(&employee).await?;
            ts.add_team_member(team.id, employee.id).await?;
            println!("Added {} to {}", employee.full_name(), team.name);
        }
        TeamAction::List { json } => {
            let teams = ts.list_teams().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&teams)?);
            } else if teams.is_empty() {
                println!("No teams.");
            } else {
                for t in teams {
                    println!("{:>5}  {:<30} {} members", t.id, t.name, t.member_ids.len());
                }
            }
        }
    }
    Ok(())
}

async fn handle_task(ts: &TeamScore, action: TaskAction) -> anyhow::Result<()> {
    match action {
        TaskAction::Add {
            assignee,
            title,
            description,
            priority,
            status,
            creator,
            created,
            due,
            completed,
        } => {
            let assignee = ts.resolve_employee(&assignee).await?;
            let creator_id = resolve_optional_employee(ts, creator.as_deref()).await?;
            let task = NewTask {
                title,
                description,
                status: Status::parse(&status)?,
                priority: Priority::from_level(priority)?,
                assignee_id: assignee.id,
                creator_id,
                created_at: timestamp_or_now(created.as_deref())?,
                due_date: due.as_deref().map(parse_timestamp).transpose()?,
                completed_at: completed.as_deref().map(parse_timestamp).transpose()?,
            };
            let id = ts.add_task(task).await?;
            println!("Added task {id} for {}", assignee.full_name());
        }
        TaskAction::SetStatus { task, status, at } => {
            let status = Status::parse(&status)?;
            let at = timestamp_or_now(at.as_deref())?;
            let task = ts.set_task_status(task, status, at).await?;
            println!("Task {} is now {}", task.id, task.status);
        }
        TaskAction::List {
            assignee,
            limit,
            json,
        } => {
            let assignee = ts.resolve_employee(&assignee).await?;
            let tasks = ts.list_tasks(assignee.id, limit).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else if tasks.is_empty() {
                println!("No tasks for {}.", assignee.full_name());
            } else {
                for t in &tasks {
                    let due = t
                        .due_date
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "-".into());
                    println!(
                        "  {:>5}  {:<11} {:<6} due {:<10}  {}",
                        t.id,
                        t.status.as_str(),
                        t.priority.label(),
                        due,
                        t.title
                    );
                }
            }
        }
    }
    Ok(())
}

async fn handle_goal(ts: &TeamScore, action: GoalAction) -> anyhow::Result<()> {
    match action {
        GoalAction::Add {
            employee,
            description,
            target,
            progress,
            unit,
            week,
            year,
        } => {
            let employee = ts.resolve_employee(&employee).await?;
            let (week, year) = PeriodQuery::new(teamscore::PeriodKind::Week)
                .with_week(week)
                .with_year(year)
                .week_and_year();
            let id = ts
                .add_goal(NewGoal {
                    employee_id: employee.id,
                    description,
                    target_value: target,
                    progress,
                    unit,
                    status: Status::Open,
                    week,
                    year,
                })
                .await?;
            println!("Added goal {id} for {} ({year}-W{week:02})", employee.full_name());
        }
        GoalAction::Progress {
            goal,
            value,
            status,
        } => {
            let status = status.as_deref().map(Status::parse).transpose()?;
            let goal = ts.update_goal_progress(goal, value, status).await?;
            println!(
                "Goal {}: {} / {} ({})",
                goal.id, goal.progress, goal.target_value, goal.status
            );
        }
        GoalAction::List {
            employee,
            limit,
            json,
        } => {
            let employee = ts.resolve_employee(&employee).await?;
            let goals = ts.list_goals(employee.id, limit).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&goals)?);
            } else if goals.is_empty() {
                println!("No goals for {}.", employee.full_name());
            } else {
                print_goal_entries(&goals);
            }
        }
    }
    Ok(())
}

async fn handle_score(ts: &TeamScore, target: ScoreTarget) -> anyhow::Result<()> {
    match target {
        ScoreTarget::Overall {
            employee,
            period,
            week,
            year,
        } => {
            let employee = ts.resolve_employee(&employee).await?;
            let query = period_query(&period, week, year)?;
            let score = ts.overall_score(employee.id, query).await?;
            println!("{}: {score:.2}", employee.full_name());
        }
        ScoreTarget::Weekly {
            employee,
            week,
            year,
            json,
        } => {
            let employee = ts.resolve_employee(&employee).await?;
            let report = ts.weekly_performance(employee.id, week, year, now()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "Weekly Score: {} ({}-W{:02})",
                    employee.full_name(),
                    report.year,
                    report.week
                );
                println!("  Combined: {:.2}", report.combined_score);
                println!("  Tasks:    {:.2}", report.task_score);
                println!("  Goals:    {:.2}", report.goal_score);
                print_task_metrics(&report.task_metrics);
                let g = &report.goal_metrics;
                println!("  Goal Progress:");
                println!("    Goals:      {} ({} completed, {} in progress)", g.total_goals, g.completed_goals, g.in_progress_goals);
                println!("    Average:    {:.2}%", g.average_progress);
                println!("    Completion: {:.2}%", g.completion_rate);
            }
        }
        ScoreTarget::Team {
            team,
            week,
            year,
            json,
        } => {
            let team = ts.resolve_team(&team).await?;
            let board = ts.team_weekly_scores(team.id, week, year, now()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&board)?);
            } else {
                println!("Team Scoreboard: {} ({}-W{:02})", board.team_name, board.year, board.week);
                if board.members.is_empty() {
                    println!("  No members.");
                }
                for (rank, m) in board.members.iter().enumerate() {
                    println!(
                        "  {:>2}. {:<30} {:>6.2}  (tasks {:.2}, goals {:.2})",
                        rank + 1,
                        m.name,
                        m.combined_score,
                        m.task_score,
                        m.goal_score
                    );
                }
            }
        }
    }
    Ok(())
}

async fn handle_report(ts: &TeamScore, action: ReportAction) -> anyhow::Result<()> {
    match action {
        ReportAction::Save {
            employee,
            week,
            year,
            json,
        } => {
            let employee = ts.resolve_employee(&employee).await?;
            let report = ts.save_weekly_report(employee.id, week, year, now()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Saved report {}: {}", report.id.unwrap_or_default(), report.summary);
            }
        }
        ReportAction::List { employee, json } => {
            let employee = ts.resolve_employee(&employee).await?;
            let reports = ts.list_reports(employee.id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else if reports.is_empty() {
                println!("No reports for {}.", employee.full_name());
            } else {
                for r in reports {
                    println!("{}  {}", r.generated_at.format("%Y-%m-%d %H:%M"), r.summary);
                }
            }
        }
    }
    Ok(())
}

fn describe_period(p: &teamscore::metrics::PeriodInfo) -> String {
    match (&p.start_date, &p.end_date) {
        (Some(start), Some(end)) => format!("{} {start} to {end}", p.kind),
        _ => p.kind.to_string(),
    }
}

fn print_goal_entries(entries: &[teamscore::GoalEntry]) {
    for e in entries {
        let g = &e.goal;
        println!(
            "  {:>5}  {}-W{:02}  {:<11} {:>7.2}%  {}",
            g.id,
            g.year,
            g.week,
            g.status.as_str(),
            e.progress_percentage,
            g.description
        );
    }
}

fn print_task_metrics(m: &teamscore::TaskMetrics) {
    let b = &m.basic_metrics;
    println!("  Tasks:");
    println!("    In period:  {}", b.total_tasks_in_period);
    println!("    Completed:  {} ({:.2}%)", b.completed_tasks, b.task_completion_rate);
    println!("    Open:       {}", b.open_tasks);
    println!("    On time:    {} ({:.2}%)", b.tasks_completed_on_time, b.on_time_completion_rate);

    let t = &m.time_metrics;
    println!("  Time:");
    match t.average_completion_time {
        Some(h) => println!("    Avg completion: {h:.1} hours"),
        None => println!("    No completed tasks in period"),
    }
    if let Some(d) = t.average_delay_hours {
        println!("    Avg delay:      {d:.1} hours");
    }

    let p = &m.priority_metrics;
    println!("  Priority:");
    match p.high_priority_success_rate {
        Some(rate) => println!("    High priority success: {rate:.2}%"),
        None => println!("    High priority success: n/a"),
    }
    for (level, rate) in &p.completion_rate_by_priority {
        let label = Priority::from_level(*level)
            .map(|p| p.label())
            .unwrap_or("?");
        match rate {
            Some(rate) => println!("    {label:<6} {rate:.2}%"),
            None => println!("    {label:<6} n/a"),
        }
    }
}
