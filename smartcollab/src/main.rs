mod smartcollab;

use self::smartcollab::SmartCollab;
use self::smartcollab::config::Config;
use self::smartcollab::connectors::file_store::JsonFileStore;
use clap::{Parser, Subcommand};
use smartcollab_core::{LinkId, ProjectId, TaskId};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Plan group projects, split the work and see who is pulling their weight
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Configuration file to use instead of ./smartcollab.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
enum Commands {
    /// Reset the data file to the demo projects and accounts
    Seed,
    #[command(flatten)]
    App(AppCommand),
}

/// Commands that run against an existing data file
#[derive(Debug, Clone, Subcommand)]
enum AppCommand {
    /// Create an account and log in
    Signup {
        name: String,
        email: String,
        password: String,
    },
    Login {
        email: String,
        password: String,
    },
    Logout,
    /// Show who is logged in
    Whoami,
    /// List the projects you own or have joined
    Projects,
    /// Create a project and print its join key
    Create {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Join a project with the key its owner shared
    Join { key: String },
    /// Show a project's tasks, progress and contributions
    Show { project_id: ProjectId },
    #[command(subcommand)]
    Task(TaskCommand),
    #[command(subcommand)]
    Link(LinkCommand),
    #[command(subcommand)]
    File(FileCommand),
    /// Ask for an analysis of the project's workload
    Analyze { project_id: ProjectId },
}

#[derive(Debug, Clone, Subcommand)]
enum TaskCommand {
    Add {
        project_id: ProjectId,
        title: String,
        /// Display name of the member doing the task
        #[arg(long)]
        assignee: Option<String>,
    },
    /// Mark a task done, or not done if it already is
    Toggle {
        project_id: ProjectId,
        task_id: TaskId,
    },
    Delete {
        project_id: ProjectId,
        task_id: TaskId,
    },
}

#[derive(Debug, Clone, Subcommand)]
enum LinkCommand {
    Add {
        project_id: ProjectId,
        title: String,
        url: String,
    },
    Delete {
        project_id: ProjectId,
        link_id: LinkId,
    },
}

#[derive(Debug, Clone, Subcommand)]
enum FileCommand {
    /// List a local file on the project
    Add { project_id: ProjectId, path: PathBuf },
}

async fn seed(config: &Config) -> anyhow::Result<String> {
    JsonFileStore::seed_demo(&config.data_file).await?;
    Ok(format!(
        "Seeded demo data into {}. Log in with test@gmail.com / password123\n",
        config.data_file.display()
    ))
}

async fn run(config: &Config, command: AppCommand) -> anyhow::Result<String> {
    let store = JsonFileStore::open(&config.data_file).await?;
    let app = SmartCollab::new(&store, &store, config);

    match command {
        AppCommand::Signup {
            name,
            email,
            password,
        } => app.sign_up(&name, &email, &password).await,
        AppCommand::Login { email, password } => app.sign_in(&email, &password).await,
        AppCommand::Logout => app.sign_out().await,
        AppCommand::Whoami => app.whoami().await,
        AppCommand::Projects => app.projects().await,
        AppCommand::Create { name, description } => app.create_project(&name, &description).await,
        AppCommand::Join { key } => app.join_project(&key).await,
        AppCommand::Show { project_id } => app.show(project_id).await,
        AppCommand::Task(TaskCommand::Add {
            project_id,
            title,
            assignee,
        }) => app.add_task(project_id, &title, assignee.as_deref()).await,
        AppCommand::Task(TaskCommand::Toggle {
            project_id,
            task_id,
        }) => app.toggle_task(project_id, task_id).await,
        AppCommand::Task(TaskCommand::Delete {
            project_id,
            task_id,
        }) => app.delete_task(project_id, task_id).await,
        AppCommand::Link(LinkCommand::Add {
            project_id,
            title,
            url,
        }) => app.add_link(project_id, &title, &url).await,
        AppCommand::Link(LinkCommand::Delete {
            project_id,
            link_id,
        }) => app.delete_link(project_id, link_id).await,
        AppCommand::File(FileCommand::Add { project_id, path }) => {
            app.add_file(project_id, &path).await
        }
        AppCommand::Analyze { project_id } => app.analyze(project_id).await,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    debug!(?config, "Loaded configuration");

    // Seeding must work even when the existing data file is unreadable
    let output = match cli.command {
        Commands::Seed => seed(&config).await?,
        Commands::App(command) => run(&config, command).await?,
    };
    print!("{}", output);

    Ok(())
}
