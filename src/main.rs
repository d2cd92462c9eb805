//! flowtask CLI entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flowtask::core::{
    layout_tree, Convention, MoveDirection, NewTask, Point, SortMode, TaskEdit, ViewFilter, Zoom,
};
use flowtask::ui::TUI;
use flowtask::{storage, App, Settings};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "flowtask")]
#[command(version)]
#[command(about = "Personal task tracker drawn as a flowchart")]
struct Args {
    /// Task file (default: ~/.flowtask/tasks.json)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Settings file (default: ./flowtask.yml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive flowchart view (default)
    Tui,

    /// Create a task and print its id
    Add {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Create as a subtask of this task
        #[arg(long, conflicts_with = "after")]
        under: Option<String>,
        /// Create as a workflow continuation of this task
        #[arg(long)]
        after: Option<String>,
    },

    /// Change a task's title, description or priority
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// Integer priority; anything else clears it
        #[arg(long, allow_hyphen_values = true)]
        priority: Option<String>,
    },

    /// Toggle completion of one task
    Done { id: String },

    /// Toggle stash on a task and everything under it
    Stash { id: String },

    /// Delete a task and everything under it
    Delete { id: String },

    /// Swap priority with the nearest higher-precedence task
    Up { id: String },

    /// Swap priority with the nearest lower-precedence task
    Down { id: String },

    /// Swap the priorities of two root tasks
    Swap { dragged: String, target: String },

    /// Print the visible roots as an outline
    List {
        #[arg(long, value_enum)]
        view: Option<ViewFilter>,
        #[arg(long, value_enum)]
        sort: Option<SortMode>,
    },

    /// Print card positions and connectors as JSON
    Layout {
        /// Lay out this task's tree only
        id: Option<String>,
        #[arg(long)]
        zoom: Option<f64>,
        #[arg(long, value_enum)]
        convention: Option<Convention>,
    },
}

fn main() -> Result<()> {
    // Initialize logger; stdout stays clean for command output
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let settings = Settings::auto_load(args.config.as_deref())?;
    let data_path = settings.data_path(args.data.as_deref())?;
    log::info!("flowtask v{} using {}", env!("CARGO_PKG_VERSION"), data_path.display());

    match args.command.unwrap_or(Command::Tui) {
        Command::Tui => {
            let mut app = App::open(&settings, data_path);
            let mut tui = TUI::new()?;
            tui.run(&mut app)?;
        }
        command => {
            let store = storage::load(&data_path)
                .with_context(|| format!("loading tasks from {}", data_path.display()))?;
            let mut app = App::new(store, &settings, data_path);
            run_command(&mut app, command)?;
            if let Some(warning) = &app.status {
                eprintln!("warning: {warning}");
            }
        }
    }

    Ok(())
}

fn run_command(app: &mut App, command: Command) -> Result<()> {
    match command {
        Command::Tui => {}
        Command::Add {
            title,
            description,
            under,
            after,
        } => {
            let mut new = NewTask::new(title).description(description);
            if let Some(parent) = under {
                new.parent_id = Some(app.resolve(&parent)?);
            }
            if let Some(anchor) = after {
                new.workflow_sibling_of = Some(app.resolve(&anchor)?);
            }
            let id = app.create(new)?;
            println!("{id}");
        }
        Command::Edit {
            id,
            title,
            description,
            priority,
        } => {
            let id = app.resolve(&id)?;
            app.edit(
                &id,
                TaskEdit {
                    title,
                    description,
                    priority,
                },
            )?;
        }
        Command::Done { id } => {
            let id = app.resolve(&id)?;
            let done = app.toggle_done(&id)?;
            println!("{} {}", id.short(), if done { "done" } else { "not done" });
        }
        Command::Stash { id } => {
            let id = app.resolve(&id)?;
            let stashed = app.toggle_stash(&id)?;
            println!("{} {}", id.short(), if stashed { "stashed" } else { "unstashed" });
        }
        Command::Delete { id } => {
            let id = app.resolve(&id)?;
            let removed = app.delete(&id)?;
            println!("Deleted {} task(s)", removed.len());
        }
        Command::Up { id } => move_priority(app, &id, MoveDirection::Up)?,
        Command::Down { id } => move_priority(app, &id, MoveDirection::Down)?,
        Command::Swap { dragged, target } => {
            let dragged = app.resolve(&dragged)?;
            let target = app.resolve(&target)?;
            app.swap(&dragged, &target)?;
        }
        Command::List { view, sort } => {
            if let Some(view) = view {
                app.view = view;
            }
            if let Some(sort) = sort {
                app.sort = sort;
            }
            let blocks = app.outline();
            if blocks.is_empty() {
                println!("{}", app.view.empty_message());
            }
            for (i, block) in blocks.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                for line in block {
                    println!("{}  {}  {}", line.id.short(), line.priority, line.text());
                }
            }
        }
        Command::Layout {
            id,
            zoom,
            convention,
        } => {
            if let Some(zoom) = zoom {
                app.zoom = Zoom::new(zoom);
            }
            if let Some(convention) = convention {
                app.convention = convention;
            }
            let layout = match id {
                Some(id) => {
                    let id = app.resolve(&id)?;
                    layout_tree(
                        &app.store,
                        &id,
                        Point::default(),
                        app.convention,
                        &app.metrics,
                        app.zoom,
                    )
                }
                None => app.layout(),
            };
            println!("{}", serde_json::to_string_pretty(&layout)?);
        }
    }
    Ok(())
}

fn move_priority(app: &mut App, id: &str, direction: MoveDirection) -> Result<()> {
    let id = app.resolve(id)?;
    if app.move_priority(&id, direction)? {
        let priority = app.store.get(&id).map(|t| t.priority).unwrap_or_default();
        println!("{} now {}", id.short(), priority);
    } else {
        println!("{} already at the edge", id.short());
    }
    Ok(())
}
