use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tayra", about = concat!("tayra v", env!("CARGO_PKG_VERSION"), " - today's tasks, important first"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Task server API root (overrides config and TAYRA_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Triage state file (overrides config)
    #[arg(long, global = true)]
    pub state_file: Option<String>,

    /// Log remote calls and triage transitions to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show today's Important and Extra sections
    Today,
    /// List unscheduled tasks by category
    List(ListArgs),
    /// List tasks that are open, not planned for today, and unblocked
    Available,
    /// Show task details
    Show(ShowArgs),
    /// Create a task
    Add(AddArgs),
    /// Put a task in a section of today's board
    Place(PlaceArgs),
    /// Move a task to another task's position within its section
    Reorder(ReorderArgs),
    /// Take a task off today's board, back into a category
    Unplan(UnplanArgs),
    /// Toggle a task's completed state
    Done(IdArg),
    /// Change a task's title
    Title(TitleArgs),
    /// Edit task fields
    Edit(EditArgs),
    /// Delete a task and its subtasks
    Rm(IdArg),
    /// Subtask management
    Sub(SubCmd),
    /// Category management
    Category(CategoryCmd),
    /// Toggle showing a task's subtasks in `today`
    Expand(IdArg),
    /// Check that the task server is up
    Health,
    /// View or change configuration
    Config(ConfigCmd),
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// Only this category (default: every category)
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Task ID to show
    pub id: String,
}

#[derive(Args)]
pub struct IdArg {
    /// Task ID
    pub id: String,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Category ID (default: the server's default category)
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,
    /// Do date (YYYY-MM-DD); ignored with --section
    #[arg(long = "do")]
    pub do_date: Option<String>,
    /// Discard the task if still open after its do date
    #[arg(long)]
    pub ephemeral: bool,
    #[arg(long)]
    pub notes: Option<String>,
    /// Plan for today and place in this section (important, extra)
    #[arg(long)]
    pub section: Option<String>,
}

#[derive(Args)]
pub struct PlaceArgs {
    /// Task ID
    pub id: String,
    /// Target section (important, extra)
    pub section: String,
}

#[derive(Args)]
pub struct ReorderArgs {
    /// Task ID to move
    pub id: String,
    /// Task whose position it takes
    #[arg(long = "before", value_name = "TARGET_ID")]
    pub target: String,
}

#[derive(Args)]
pub struct UnplanArgs {
    /// Task ID
    pub id: String,
    /// Category to file it under (default: its current category)
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Args)]
pub struct TitleArgs {
    /// Task ID
    pub id: String,
    /// New title
    pub title: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID
    pub id: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    /// Due date (YYYY-MM-DD)
    #[arg(long, conflicts_with = "clear_due")]
    pub due: Option<String>,
    /// Do date (YYYY-MM-DD)
    #[arg(long = "do", conflicts_with = "clear_do")]
    pub do_date: Option<String>,
    /// Remove the due date
    #[arg(long)]
    pub clear_due: bool,
    /// Remove the do date
    #[arg(long)]
    pub clear_do: bool,
    #[arg(long)]
    pub notes: Option<String>,
    /// Mark as ephemeral
    #[arg(long, conflicts_with = "no_ephemeral")]
    pub ephemeral: bool,
    /// Clear the ephemeral flag
    #[arg(long)]
    pub no_ephemeral: bool,
}

// ---------------------------------------------------------------------------
// Subtask args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SubCmd {
    #[command(subcommand)]
    pub action: SubAction,
}

#[derive(Subcommand)]
pub enum SubAction {
    /// Add a subtask
    Add {
        /// Parent task ID
        task_id: String,
        /// Subtask title
        title: String,
    },
    /// Toggle a subtask's completed state
    Done {
        /// Parent task ID
        task_id: String,
        /// Subtask ID
        subtask_id: String,
    },
}

// ---------------------------------------------------------------------------
// Category args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct CategoryCmd {
    #[command(subcommand)]
    pub action: Option<CategoryAction>,
}

#[derive(Subcommand)]
pub enum CategoryAction {
    /// List categories (default)
    List,
    /// Create a category
    Add {
        /// Category name
        name: String,
        /// Hex color, e.g. #3B82F6
        #[arg(long)]
        color: Option<String>,
    },
    /// Rename a category
    Rename {
        /// Category ID
        id: String,
        /// New name
        name: String,
    },
    /// Delete a category (its tasks move to the default category)
    Rm {
        /// Category ID
        id: String,
    },
}

// ---------------------------------------------------------------------------
// Config args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration (default)
    Show,
    /// Set a config value (server.base_url, server.timeout_secs, state.path)
    Set { key: String, value: String },
    /// Print the config file path
    Path,
}
