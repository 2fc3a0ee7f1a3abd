use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pk", about = concat!("[#] plank v", env!("CARGO_PKG_VERSION"), " - the board without the browser"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override the API base URL from config
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the session
    Login(LoginArgs),
    /// Drop the stored session
    Logout,
    /// Show who the stored session belongs to
    Whoami,
    /// Register a new account
    Register(RegisterArgs),
    /// Reset an account password
    ResetPassword(ResetPasswordArgs),
    /// List tasks, with optional filters
    Tasks(TasksArgs),
    /// Create a task
    Add(AddArgs),
    /// Show one task in full
    Show(ShowArgs),
    /// Edit fields of a task
    Edit(EditArgs),
    /// Move a task to another status
    Move(MoveArgs),
    /// Delete a task
    Rm(RmArgs),
    /// Print the board as columns
    Board(BoardArgs),
    /// Manage reference entities (clients, projects, products, ...)
    Ref(RefCmd),
    /// List or manage sticky notes
    Notes(NotesCmd),
}

// ---------------------------------------------------------------------------
// Account commands
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct LoginArgs {
    /// Account email (prompted if omitted)
    pub email: Option<String>,
    /// Read the password from stdin instead of prompting
    #[arg(long)]
    pub password_stdin: bool,
}

#[derive(Args)]
pub struct RegisterArgs {
    /// Display name for the new account
    pub name: String,
    /// Account email
    pub email: String,
    /// Read the password from stdin instead of prompting
    #[arg(long)]
    pub password_stdin: bool,
}

#[derive(Args)]
pub struct ResetPasswordArgs {
    /// Account email
    pub email: String,
    /// Read the new password from stdin instead of prompting
    #[arg(long)]
    pub password_stdin: bool,
}

// ---------------------------------------------------------------------------
// Task commands
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct TasksArgs {
    /// Filter by client name (repeatable; any match passes)
    #[arg(long)]
    pub client: Vec<String>,
    /// Filter by project name (repeatable)
    #[arg(long)]
    pub project: Vec<String>,
    /// Filter by product name (repeatable)
    #[arg(long)]
    pub product: Vec<String>,
    /// Filter by assignee name or user id (repeatable)
    #[arg(long)]
    pub assignee: Vec<String>,
    /// Filter by tag (repeatable)
    #[arg(long)]
    pub tag: Vec<String>,
    /// Filter by priority label (repeatable)
    #[arg(long)]
    pub priority: Vec<String>,
    /// Filter by exact due day (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub due: Option<String>,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Status name or id (default: the first status in the server list)
    #[arg(long)]
    pub status: Option<String>,
    /// Description body
    #[arg(long)]
    pub description: Option<String>,
    /// Priority label
    #[arg(long)]
    pub priority: Option<String>,
    /// Due day (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub due: Option<String>,
    /// Client name (repeatable)
    #[arg(long)]
    pub client: Vec<String>,
    /// Project name (repeatable)
    #[arg(long)]
    pub project: Vec<String>,
    /// Product name (repeatable)
    #[arg(long)]
    pub product: Vec<String>,
    /// Tag (repeatable)
    #[arg(long)]
    pub tag: Vec<String>,
    /// Assignee name or user id (repeatable)
    #[arg(long)]
    pub assignee: Vec<String>,
    /// Subtask title (repeatable)
    #[arg(long)]
    pub subtask: Vec<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Task id
    pub id: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task id
    pub id: String,
    /// New title
    #[arg(long)]
    pub title: Option<String>,
    /// New description
    #[arg(long)]
    pub description: Option<String>,
    /// New status name or id
    #[arg(long)]
    pub status: Option<String>,
    /// New priority label
    #[arg(long)]
    pub priority: Option<String>,
    /// New due day (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub due: Option<String>,
    /// Remove the due date
    #[arg(long, conflicts_with = "due")]
    pub clear_due: bool,
    /// Add a tag (repeatable)
    #[arg(long)]
    pub add_tag: Vec<String>,
    /// Remove a tag (repeatable)
    #[arg(long)]
    pub rm_tag: Vec<String>,
    /// Add an assignee by name or user id (repeatable)
    #[arg(long)]
    pub assign: Vec<String>,
    /// Remove an assignee by name or user id (repeatable)
    #[arg(long)]
    pub unassign: Vec<String>,
    /// Append a subtask (repeatable)
    #[arg(long, value_name = "TITLE")]
    pub add_subtask: Vec<String>,
    /// Mark a subtask done, by title or 1-based position (repeatable)
    #[arg(long, value_name = "SUBTASK")]
    pub check: Vec<String>,
    /// Mark a subtask not done, by title or 1-based position (repeatable)
    #[arg(long, value_name = "SUBTASK")]
    pub uncheck: Vec<String>,
    /// Remove a subtask, by title or 1-based position (repeatable)
    #[arg(long, value_name = "SUBTASK")]
    pub rm_subtask: Vec<String>,
}

#[derive(Args)]
pub struct MoveArgs {
    /// Task id
    pub id: String,
    /// Destination status name or id
    pub status: String,
}

#[derive(Args)]
pub struct RmArgs {
    /// Task id
    pub id: String,
    /// Skip confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct BoardArgs {
    /// Group columns by assignee instead of status
    #[arg(long)]
    pub by_assignee: bool,
}

// ---------------------------------------------------------------------------
// Reference entities
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RefCmd {
    /// Entity kind: client, project, product, tag, status, collaborator, user
    pub kind: String,
    #[command(subcommand)]
    pub action: RefAction,
}

#[derive(Subcommand)]
pub enum RefAction {
    /// List entities of this kind
    List,
    /// Create an entity
    Add(RefAddArgs),
    /// Rename an entity
    Rename(RefRenameArgs),
    /// Delete an entity
    Rm(RefRmArgs),
}

#[derive(Args)]
pub struct RefAddArgs {
    /// Entity name
    pub name: String,
    /// Image file to upload and attach (clients, projects, products)
    #[arg(long, value_name = "PATH")]
    pub image: Option<String>,
}

#[derive(Args)]
pub struct RefRenameArgs {
    /// Current name
    pub name: String,
    /// New name
    pub new_name: String,
}

#[derive(Args)]
pub struct RefRmArgs {
    /// Entity name
    pub name: String,
    /// Skip confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct NotesCmd {
    #[command(subcommand)]
    pub action: Option<NotesAction>,
}

#[derive(Subcommand)]
pub enum NotesAction {
    /// List notes (default)
    List,
    /// Add a note
    Add(NoteAddArgs),
    /// Replace a note's text
    Edit(NoteEditArgs),
    /// Delete a note
    Rm(NoteRmArgs),
}

#[derive(Args)]
pub struct NoteAddArgs {
    /// Note text
    pub text: String,
}

#[derive(Args)]
pub struct NoteEditArgs {
    /// Note id, or 1-based index from `pk notes`
    pub note: String,
    /// New text
    pub text: String,
}

#[derive(Args)]
pub struct NoteRmArgs {
    /// Note id, or 1-based index from `pk notes`
    pub note: String,
    /// Skip confirmation prompt
    #[arg(long)]
    pub yes: bool,
}
