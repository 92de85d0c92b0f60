// tododemo - your to-do list, stored on this device
//
// Entry point. Parses CLI args and drives the task list screen.

use anyhow::{bail, Context};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tododemo_lib::{
    config::default_config_path,
    core::{ContextAction, Navigation, Session, TaskListScreen, ViewSignal},
    db::{NewTask, Priority},
    logging, Config, Database,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "tododemo", version, about = "Your tasks, on this device")]
struct Cli {
    /// Task database to use instead of the configured one
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a user
    Register { first_name: String, last_name: String },
    /// Log in as an existing user
    Login { user_id: i64 },
    /// Forget the logged-in user
    Logout,
    /// Show who is logged in
    Whoami,
    /// List your tasks
    List,
    /// Add a task
    Add {
        title: String,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Change the task at a list position
    Edit {
        position: usize,
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Print every field of the task at a list position
    Show {
        position: usize,
        /// Print the edit parameters as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the time of the task at a list position
    Time { position: usize },
    /// Delete the task at a list position
    Delete { position: usize },
    /// Show store statistics
    Status,
}

#[derive(Args)]
struct TaskFields {
    /// low, medium or high
    #[arg(long)]
    priority: Option<String>,
    #[arg(long)]
    time: Option<String>,
    /// Scheduled date, e.g. 2026-10-16
    #[arg(long)]
    date: Option<String>,
    /// Scheduled time of day, e.g. 18:00
    #[arg(long)]
    at: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    logging::init_tracing(config.log_filter.as_deref(), cli.verbose);
    // The loader runs before any subscriber exists
    match cli.config.clone().or_else(default_config_path) {
        Some(path) => info!(path = %path.display(), exists = path.exists(), "config file"),
        None => info!("no config directory, using defaults"),
    }

    let db_path = match &cli.db {
        Some(path) => path.clone(),
        None => config.database_path()?,
    };
    let db = Arc::new(
        Database::new(&db_path)
            .await
            .with_context(|| format!("failed to open {}", db_path.display()))?,
    );
    let session = Session::new(Arc::clone(&db));

    let result = run(cli.command, Arc::clone(&db), session).await;
    db.close().await;
    result
}

async fn run(command: Command, db: Arc<Database>, session: Session) -> anyhow::Result<()> {
    match command {
        Command::Register {
            first_name,
            last_name,
        } => {
            let id = db.create_user(&first_name, &last_name).await?;
            println!("Registered {} {} as user {}", first_name, last_name, id);
            Ok(())
        }
        Command::Login { user_id } => {
            let Some(profile) = db.get_profile(user_id).await? else {
                bail!("no user with id {}", user_id);
            };
            session.login(user_id).await?;
            println!("Logged in as {}", profile.full_name());
            Ok(())
        }
        Command::Logout => {
            let mut screen = open_screen(db, session).await;
            screen.on_logout().await?;
            screen.close().await;
            println!("Logged out");
            Ok(())
        }
        Command::Whoami => {
            match session.current_user_id().await? {
                Some(id) => match db.get_profile(id).await? {
                    Some(profile) => println!("{} (user {})", profile.full_name(), id),
                    None => println!("user {} (no profile)", id),
                },
                None => println!("Not logged in"),
            }
            Ok(())
        }
        Command::List => {
            let screen = open_screen(db, session).await;
            print_list(&screen);
            screen.close().await;
            Ok(())
        }
        Command::Add { title, fields } => {
            let Some(user_id) = session.current_user_id().await? else {
                bail!("log in first");
            };
            let task = NewTask {
                title,
                priority: parse_priority(fields.priority.as_deref())?.unwrap_or_default(),
                time: fields
                    .time
                    .unwrap_or_else(|| Local::now().format("%H:%M").to_string()),
                schedule_date: fields.date.unwrap_or_default(),
                schedule_time: fields.at.unwrap_or_default(),
            };
            db.create_task(user_id, &task).await?;

            // Back from the create screen: the list reloads
            let screen = open_screen(db, session).await;
            print_list(&screen);
            screen.close().await;
            Ok(())
        }
        Command::Edit {
            position,
            title,
            fields,
        } => {
            let screen = open_screen(Arc::clone(&db), session).await;
            let navigation = screen.on_item_click(index(position)?);
            screen.close().await;

            let Some(Navigation::Edit(request)) = navigation else {
                bail!("no task at position {}", position);
            };

            let priority = match parse_priority(fields.priority.as_deref())? {
                Some(p) => p,
                None => request.priority.parse()?,
            };
            let task = NewTask {
                title: title.unwrap_or(request.title),
                priority,
                time: fields.time.unwrap_or(request.time),
                schedule_date: fields.date.unwrap_or(request.schedule_date),
                schedule_time: fields.at.unwrap_or(request.schedule_time),
            };
            if !db.update_task(request.id, &task).await? {
                bail!("task no longer exists");
            }
            println!("Task updated");
            Ok(())
        }
        Command::Show { position, json } => {
            let screen = open_screen(db, session).await;
            let i = index(position)?;
            let navigation = screen.on_item_click(i);
            let menu = screen.on_item_long_press(i);
            screen.close().await;

            let (Some(Navigation::Edit(request)), Some(menu)) = (navigation, menu) else {
                bail!("no task at position {}", position);
            };
            if json {
                println!("{}", request.to_json()?);
                return Ok(());
            }
            for (key, value) in request.to_params() {
                println!("{:<14}{}", format!("{}:", key), value);
            }
            let labels: Vec<&str> = menu.iter().map(|action| action.label()).collect();
            println!("{:<14}{}", "actions:", labels.join(", "));
            Ok(())
        }
        Command::Time { position } => {
            long_press(db, session, position, ContextAction::ShowTime).await
        }
        Command::Delete { position } => {
            long_press(db, session, position, ContextAction::Delete).await
        }
        Command::Status => {
            let stats = db.stats().await?;
            println!("\ntododemo Status");
            println!("{}", "=".repeat(40));
            println!("  Database:    {}", db.path().display());
            println!("  Users:       {}", stats.total_users);
            println!("  Tasks:       {}", stats.total_tasks);
            println!("  Connections: {} ({} idle)", stats.pool_size, stats.idle_connections);
            match session.current_user_id().await? {
                Some(id) => println!("  Session:     user {}", id),
                None => println!("  Session:     none"),
            }
            println!("{}", "=".repeat(40));
            Ok(())
        }
    }
}

/// Open the list screen and wait for its initial loads
async fn open_screen(db: Arc<Database>, session: Session) -> TaskListScreen {
    let mut screen = TaskListScreen::open(db, session);
    for signal in screen.settle().await {
        if let ViewSignal::Notify(_) = signal {
            render(&signal);
        }
    }
    screen
}

/// Long-press a row and pick `action` from its menu
async fn long_press(
    db: Arc<Database>,
    session: Session,
    position: usize,
    action: ContextAction,
) -> anyhow::Result<()> {
    let mut screen = open_screen(db, session).await;
    let i = index(position)?;

    let offered = screen
        .on_item_long_press(i)
        .is_some_and(|menu| menu.contains(&action));
    if !offered {
        screen.close().await;
        bail!("no task at position {}", position);
    }

    if let Some(signal) = screen.on_context_action(i, action) {
        render(&signal);
    }
    for signal in screen.settle().await {
        render(&signal);
    }
    screen.close().await;
    Ok(())
}

fn print_list(screen: &TaskListScreen) {
    if let Some(name) = screen.profile_name() {
        println!("{}", name);
    }

    if screen.tasks().is_empty() {
        println!("No tasks.");
        return;
    }

    println!("{}", "=".repeat(60));
    for (i, task) in screen.tasks().iter().enumerate() {
        println!(
            "{:3}. [{:<6}] {}  {} {}",
            i + 1,
            task.priority,
            task.title,
            task.schedule_date,
            task.schedule_time
        );
    }
    println!("{}", "=".repeat(60));
}

fn render(signal: &ViewSignal) {
    match signal {
        ViewSignal::Notify(message) => println!("{}", message),
        ViewSignal::ProfileName(name) => println!("{}", name),
        ViewSignal::Refresh | ViewSignal::ItemRemoved(_) => {}
    }
}

fn parse_priority(raw: Option<&str>) -> anyhow::Result<Option<Priority>> {
    Ok(raw.map(str::parse::<Priority>).transpose()?)
}

// Positions on the command line count from 1
fn index(position: usize) -> anyhow::Result<usize> {
    match position.checked_sub(1) {
        Some(i) => Ok(i),
        None => bail!("positions start at 1"),
    }
}
