use std::io;
use std::time::Duration;

use chrono::Utc;
use crossterm::event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::api::{ApiClient, ExpiryState};
use crate::io::config::{self, Config};
use crate::io::paths;
use crate::model::refdata::RefKind;
use crate::model::task::Task;
use crate::ops::board::{Board, DragSession, ViewMode, project_columns};
use crate::ops::note_store::NoteStore;
use crate::ops::ref_store::RefStore;
use crate::ops::task_store::TaskStore;

use super::form::{InputField, LoginForm, NoteForm, RefForm, TaskForm};
use super::input;
use super::render;
use super::theme::Theme;

/// Which view is currently displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Email/password prompt; entered whenever there is no usable session
    Login,
    /// The kanban board
    Board,
    /// Sticky notes
    Notes,
    /// Reference-entity management, one tab per kind
    Admin(RefKind),
}

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    EditTask,
    EditRef,
    EditNote,
    Filter,
    Move,
    Confirm,
    Login,
}

/// A pending delete awaiting its confirm keypress. The endpoint is not
/// called until the user answers.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmAction {
    DeleteTask { id: String, title: String },
    DeleteRef { kind: RefKind, id: String, name: String },
    DeleteNote { id: String },
}

/// State of the filter panel: a cursor over (dimension, option) plus the
/// free-text due-date field.
#[derive(Debug, Clone)]
pub struct FilterPanel {
    pub dimension: usize,
    pub row: usize,
    pub due_input: InputField,
}

impl FilterPanel {
    pub const DIMENSIONS: [&'static str; 7] = [
        "clients",
        "projects",
        "products",
        "assignees",
        "tags",
        "priority",
        "due",
    ];

    /// Index of the due-date dimension (a text field, not a toggle list).
    pub const DUE: usize = 6;

    pub fn new(due_day: Option<chrono::NaiveDate>) -> Self {
        FilterPanel {
            dimension: 0,
            row: 0,
            due_input: InputField::new(due_day.map(|d| d.to_string()).unwrap_or_default()),
        }
    }
}

/// Main application state
pub struct App {
    pub config: Config,
    pub theme: Theme,
    pub client: ApiClient,
    pub tasks: TaskStore,
    pub refs: RefStore,
    pub notes: NoteStore,

    pub view: View,
    pub mode: Mode,
    pub should_quit: bool,

    /// Board grouping (columns by status or by assignee)
    pub view_mode: ViewMode,
    /// Card pick-up state while in Move mode
    pub drag: DragSession,
    /// Board cursor
    pub board_column: usize,
    pub board_row: usize,

    /// Cursor in the admin entity list
    pub admin_cursor: usize,
    /// Cursor in the notes list
    pub notes_cursor: usize,

    pub task_form: Option<TaskForm>,
    pub ref_form: Option<RefForm>,
    pub note_form: Option<NoteForm>,
    pub login_form: LoginForm,
    pub filter_panel: Option<FilterPanel>,
    pub confirm: Option<ConfirmAction>,

    /// Transient message for the status row
    pub status_message: Option<String>,
    pub status_is_error: bool,
    /// Help overlay visible
    pub show_help: bool,
}

impl App {
    pub fn new(config: Config, client: ApiClient) -> Self {
        let theme = Theme::from_config(&config.ui);
        let (view, mode) = if client.is_logged_in() {
            (View::Board, Mode::Navigate)
        } else {
            (View::Login, Mode::Login)
        };

        App {
            config,
            theme,
            client,
            tasks: TaskStore::new(),
            refs: RefStore::new(),
            notes: NoteStore::new(),
            view,
            mode,
            should_quit: false,
            view_mode: ViewMode::default(),
            drag: DragSession::default(),
            board_column: 0,
            board_row: 0,
            admin_cursor: 0,
            notes_cursor: 0,
            task_form: None,
            ref_form: None,
            note_form: None,
            login_form: LoginForm::default(),
            filter_panel: None,
            confirm: None,
            status_message: None,
            status_is_error: false,
            show_help: false,
        }
    }

    /// Fetch reference lists, tasks and notes. Failures land in the status
    /// row; a dead session drops to the login view.
    pub fn sync_all(&mut self) {
        if let Err(e) = self.refs.load_all(&mut self.client) {
            self.report_failure(e.to_string());
            return;
        }
        if let Err(e) = self.tasks.refresh(&mut self.client) {
            self.report_failure(e.to_string());
            return;
        }
        if let Err(e) = self.notes.refresh(&mut self.client) {
            self.report_failure(e.to_string());
            return;
        }
        self.clamp_board_cursor();
    }

    /// Project the visible tasks into board columns. The slice and the
    /// board must come from the same call: card indices point into it.
    pub fn board(&self) -> (Vec<&Task>, Board) {
        let visible = self.tasks.filtered();
        let board = project_columns(
            &visible,
            self.view_mode,
            self.refs.statuses(),
            self.refs.users(),
        );
        (visible, board)
    }

    /// Id of the task under the board cursor.
    pub fn selected_task_id(&self) -> Option<String> {
        let (visible, board) = self.board();
        let idx = board.card_at(self.board_column, self.board_row)?;
        visible.get(idx).and_then(|t| t.id.clone())
    }

    /// Keep the board cursor on a real column/card after data changes.
    pub fn clamp_board_cursor(&mut self) {
        let board = self.board().1;
        if board.columns.is_empty() {
            self.board_column = 0;
            self.board_row = 0;
            return;
        }
        if self.board_column >= board.columns.len() {
            self.board_column = board.columns.len() - 1;
        }
        let rows = board.columns[self.board_column].cards.len();
        if self.board_row >= rows {
            self.board_row = rows.saturating_sub(1);
        }
    }

    /// First status id in the live list; new tasks start there.
    pub fn default_status(&self) -> Option<String> {
        self.refs.statuses().iter().find_map(|s| s.id.clone())
    }

    /// `(key, label)` options for a filter-panel dimension. Keys are what
    /// the filter set matches on: names for the name-valued dimensions,
    /// user ids for assignees, raw labels for priority.
    pub fn filter_options(&self, dimension: usize) -> Vec<(String, String)> {
        let names = |kind: RefKind| {
            self.refs
                .list(kind)
                .iter()
                .map(|e| (e.name.clone(), e.name.clone()))
                .collect()
        };
        match dimension {
            0 => names(RefKind::Client),
            1 => names(RefKind::Project),
            2 => names(RefKind::Product),
            3 => self
                .refs
                .users()
                .iter()
                .filter_map(|u| Some((u.id.clone()?, u.name.clone())))
                .collect(),
            4 => names(RefKind::Tag),
            // Priorities are whatever the tasks currently carry
            5 => {
                let mut labels: Vec<String> = self
                    .tasks
                    .tasks()
                    .iter()
                    .filter_map(|t| t.priority.clone())
                    .collect();
                labels.sort();
                labels.dedup();
                labels.into_iter().map(|p| (p.clone(), p)).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Open the task form for the given task.
    pub fn open_task_form(&mut self, task: &Task) {
        self.task_form = Some(TaskForm::from_task(
            task,
            self.refs.statuses(),
            self.refs.users(),
            self.refs.list(RefKind::Client),
            self.refs.list(RefKind::Project),
            self.refs.list(RefKind::Product),
            self.refs.list(RefKind::Tag),
        ));
        self.mode = Mode::EditTask;
    }

    /// Whether the current viewer is an admin (display gate only).
    pub fn viewer_is_admin(&self) -> bool {
        self.client
            .session()
            .map(|s| s.claims.is_admin)
            .unwrap_or(false)
    }

    /// Route an operation failure: if the client lost its session along the
    /// way (failed refresh), fall back to the login view, otherwise show
    /// the message as an error banner.
    pub fn report_failure(&mut self, msg: impl Into<String>) {
        if self.client.is_logged_in() {
            self.status_message = Some(msg.into());
            self.status_is_error = true;
        } else {
            self.to_login("session expired, log in again");
        }
    }

    /// Drop to the login view, clearing any editing state.
    pub fn to_login(&mut self, msg: impl Into<String>) {
        self.view = View::Login;
        self.mode = Mode::Login;
        self.login_form = LoginForm::default();
        self.task_form = None;
        self.ref_form = None;
        self.note_form = None;
        self.filter_panel = None;
        self.confirm = None;
        self.drag.cancel();
        self.status_message = Some(msg.into());
        self.status_is_error = false;
    }
}

/// Restore UI state from state.json
pub fn restore_ui_state(app: &mut App) {
    use crate::io::state::read_ui_state;

    let ui_state = match read_ui_state(&paths::config_dir()) {
        Some(s) => s,
        None => return,
    };

    app.view_mode = ViewMode::from_state(&ui_state.view_mode);
    app.board_column = ui_state.board_column;
    app.board_row = ui_state.board_row;

    // The login view always wins over a restored view
    if app.view == View::Login {
        return;
    }
    match ui_state.view.as_str() {
        "board" => app.view = View::Board,
        "notes" => app.view = View::Notes,
        "admin" => {
            let kind = ui_state.admin_tab.parse().unwrap_or(RefKind::Client);
            app.view = View::Admin(kind);
        }
        _ => {}
    }
}

/// Save UI state to state.json
pub fn save_ui_state(app: &App) {
    use crate::io::state::{UiState, write_ui_state};

    let (view_str, admin_tab) = match app.view {
        // A login screen is not worth coming back to
        View::Login | View::Board => ("board", String::new()),
        View::Notes => ("notes", String::new()),
        View::Admin(kind) => ("admin", kind.singular().to_string()),
    };

    let ui_state = UiState {
        view: view_str.to_string(),
        view_mode: app.view_mode.as_str().to_string(),
        admin_tab,
        board_column: app.board_column,
        board_row: app.board_row,
    };

    let _ = write_ui_state(&paths::config_dir(), &ui_state);
}

/// Run the TUI application
pub fn run(api_url: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_with_override(api_url)?;
    let client = ApiClient::new(config.base_url()).with_session_file(paths::session_path());

    let mut app = App::new(config, client);
    restore_ui_state(&mut app);

    // First sync happens before the terminal switches over, so a slow or
    // dead server shows its error on plain stdout instead of a blank board
    if app.client.is_logged_in() {
        app.sync_all();
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableBracketedPaste);
        original_hook(panic_info);
    }));

    // Run event loop
    let result = run_event_loop(&mut terminal, &mut app);

    // Save UI state before exit
    save_ui_state(&app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut save_counter = 0u32;
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    input::handle_key(app, key);
                    // Debounced state save: every ~5 key presses
                    save_counter += 1;
                    if save_counter >= 5 {
                        save_ui_state(app);
                        save_counter = 0;
                    }
                }
                Event::Paste(text) => input::handle_paste(app, &text),
                _ => {}
            }
        }

        tick_session(app);

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Per-tick session check: a token past its exp drops the app to the
/// login view. The warning countdown needs no tick; the status row
/// recomputes it on every draw.
fn tick_session(app: &mut App) {
    if app.view == View::Login {
        return;
    }
    let expired = app.client.session().is_some_and(|s| {
        matches!(
            s.expiry_state(Utc::now(), app.config.expiry_warning_secs),
            ExpiryState::Expired
        )
    });
    if expired {
        app.client.logout();
        app.to_login("session expired, log in again");
    }
}
