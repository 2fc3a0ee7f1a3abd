use std::path::Path;

use crate::api::{ApiClient, Session};
use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::{config, paths};
use crate::model::{FilterSet, Note, RefEntity, RefKind, Subtask, Task};
use crate::ops::board::{self, ViewMode};
use crate::ops::note_store::NoteStore;
use crate::ops::ref_store::RefStore;
use crate::ops::task_store::TaskStore;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let api_url = cli.api_url.as_deref();

    match cli.command {
        // No subcommand opens the TUI
        None => crate::tui::run(api_url),
        Some(cmd) => match cmd {
            // Account
            Commands::Login(args) => cmd_login(args, api_url),
            Commands::Logout => cmd_logout(),
            Commands::Whoami => cmd_whoami(json, api_url),
            Commands::Register(args) => cmd_register(args, api_url),
            Commands::ResetPassword(args) => cmd_reset_password(args, api_url),

            // Read commands
            Commands::Tasks(args) => cmd_tasks(args, json, api_url),
            Commands::Show(args) => cmd_show(args, json, api_url),
            Commands::Board(args) => cmd_board(args, json, api_url),

            // Write commands
            Commands::Add(args) => cmd_add(args, api_url),
            Commands::Edit(args) => cmd_edit(args, api_url),
            Commands::Move(args) => cmd_move(args, api_url),
            Commands::Rm(args) => cmd_rm(args, api_url),

            // Reference entities and notes
            Commands::Ref(cmd) => cmd_ref(cmd, json, api_url),
            Commands::Notes(cmd) => cmd_notes(cmd, json, api_url),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn connect(api_url: Option<&str>) -> Result<ApiClient, Box<dyn std::error::Error>> {
    let config = config::load_with_override(api_url)?;
    Ok(ApiClient::new(config.base_url()).with_session_file(paths::session_path()))
}

/// Read one line from stdin, prompting on stderr unless the value is being
/// piped in. Plain terminal echo; there is no tty fiddling here.
fn read_line(prompt: &str, piped: bool) -> Result<String, Box<dyn std::error::Error>> {
    if !piped {
        eprint!("{} ", prompt);
    }
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn confirm(prompt: &str) -> Result<bool, Box<dyn std::error::Error>> {
    eprint!("{} [y/n] ", prompt);
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Resolve a name-or-id argument to an entity id. Exact name match wins,
/// then a raw id is accepted as-is.
fn resolve_ref(
    refs: &RefStore,
    kind: RefKind,
    key: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(id) = refs.find_by_name(kind, key).and_then(|e| e.id.clone()) {
        return Ok(id);
    }
    if refs.get(kind, key).is_some() {
        return Ok(key.to_string());
    }
    Err(format!("no {} named '{}'", kind.singular(), key).into())
}

/// Resolve a note argument: id first, then 1-based list index.
fn resolve_note<'a>(store: &'a NoteStore, key: &str) -> Result<&'a Note, Box<dyn std::error::Error>> {
    if let Some(note) = store.get(key) {
        return Ok(note);
    }
    if let Ok(index) = key.parse::<usize>() {
        if let Some(note) = index.checked_sub(1).and_then(|i| store.notes().get(i)) {
            return Ok(note);
        }
    }
    Err(format!("no note '{}'", key).into())
}

/// Resolve a subtask argument to its server id: exact title first, then
/// 1-based position within the task.
fn resolve_subtask(
    store: &TaskStore,
    task_id: &str,
    key: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    let task = store
        .get(task_id)
        .ok_or_else(|| format!("task not found: {}", task_id))?;
    let subtask = task
        .sub_tasks
        .iter()
        .find(|s| s.title == key)
        .or_else(|| {
            key.parse::<usize>()
                .ok()
                .and_then(|i| i.checked_sub(1))
                .and_then(|i| task.sub_tasks.get(i))
        })
        .ok_or_else(|| format!("no subtask '{}'", key))?;
    subtask
        .id
        .clone()
        .ok_or_else(|| format!("subtask '{}' has no id yet", key).into())
}

fn parse_day(s: &str) -> Result<chrono::NaiveDate, Box<dyn std::error::Error>> {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD", s).into())
}

fn whoami_json(session: &Session) -> WhoamiJson {
    WhoamiJson {
        id: session.claims.id.clone(),
        name: session.claims.name.clone(),
        email: session.claims.email.clone(),
        admin: session.claims.is_admin,
        expires_at: session.claims.exp,
    }
}

// ---------------------------------------------------------------------------
// Account handlers
// ---------------------------------------------------------------------------

fn cmd_login(args: LoginArgs, api_url: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_with_override(api_url)?;
    let mut client = ApiClient::new(config.base_url()).with_session_file(paths::session_path());

    let email = match args.email {
        Some(email) => email,
        None => read_line("email:", false)?,
    };
    let password = read_line("password:", args.password_stdin)?;

    let session = client.login(&email, &password)?;

    // First login with --api-url writes the config so later runs don't
    // need the flag.
    if api_url.is_some() && !paths::config_path().exists() {
        config::save(&config)?;
    }

    println!(
        "logged in as {} <{}>",
        session.claims.name, session.claims.email
    );
    Ok(())
}

fn cmd_logout() -> Result<(), Box<dyn std::error::Error>> {
    crate::api::session::clear_session(&paths::session_path());
    println!("logged out");
    Ok(())
}

fn cmd_whoami(json: bool, api_url: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_with_override(api_url)?;
    let client = ApiClient::new(config.base_url()).with_session_file(paths::session_path());

    let session = client.session().ok_or("not logged in")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&whoami_json(session))?);
    } else {
        let admin = if session.claims.is_admin { "  [admin]" } else { "" };
        let expired = match session.expiry_state(chrono::Utc::now(), config.expiry_warning_secs) {
            crate::api::ExpiryState::Expired => "  (token expired; renews on next use)",
            _ => "",
        };
        println!(
            "{} <{}>{}{}",
            session.claims.name, session.claims.email, admin, expired
        );
    }
    Ok(())
}

fn cmd_register(args: RegisterArgs, api_url: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let client = connect(api_url)?;
    let password = read_line("password:", args.password_stdin)?;
    client.register(&args.name, &args.email, &password)?;
    println!("registered {}", args.email);
    Ok(())
}

fn cmd_reset_password(
    args: ResetPasswordArgs,
    api_url: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = connect(api_url)?;
    let password = read_line("new password:", args.password_stdin)?;
    client.reset_password(&args.email, &password)?;
    println!("password reset for {}", args.email);
    Ok(())
}

// ---------------------------------------------------------------------------
// Task handlers
// ---------------------------------------------------------------------------

fn cmd_tasks(args: TasksArgs, json: bool, api_url: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = connect(api_url)?;
    let mut refs = RefStore::new();
    refs.load(&mut client, RefKind::Status)?;
    refs.load(&mut client, RefKind::User)?;

    let mut store = TaskStore::new();
    store.refresh(&mut client)?;
    store.filter = build_filter(&args, &refs)?;
    let visible = store.filtered();

    if json {
        let items: Vec<TaskJson> = visible
            .iter()
            .map(|t| task_to_json(t, refs.statuses(), refs.users()))
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else if visible.is_empty() {
        if store.filter.is_empty() {
            println!("no tasks");
        } else {
            println!("no matching tasks");
        }
    } else {
        for task in &visible {
            println!("{}", format_task_line(task, refs.statuses()));
        }
    }
    Ok(())
}

fn build_filter(args: &TasksArgs, refs: &RefStore) -> Result<FilterSet, Box<dyn std::error::Error>> {
    let mut filter = FilterSet {
        clients: args.client.clone(),
        projects: args.project.clone(),
        products: args.product.clone(),
        assignees: Vec::new(),
        tags: args.tag.clone(),
        priorities: args.priority.clone(),
        due_day: None,
    };
    for assignee in &args.assignee {
        filter
            .assignees
            .push(resolve_ref(refs, RefKind::User, assignee)?);
    }
    if let Some(due) = args.due.as_deref() {
        filter.due_day = Some(parse_day(due)?);
    }
    Ok(filter)
}

fn cmd_add(args: AddArgs, api_url: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = connect(api_url)?;
    let mut refs = RefStore::new();
    refs.load(&mut client, RefKind::Status)?;

    let status = match args.status.as_deref() {
        Some(status) => resolve_ref(&refs, RefKind::Status, status)?,
        None => refs
            .statuses()
            .first()
            .and_then(|s| s.id.clone())
            .ok_or("no statuses on the server; `pk ref status add <name>` first")?,
    };

    let mut task = Task::new(args.title, status);
    task.description = args.description;
    task.priority = args.priority;
    if let Some(due) = args.due.as_deref() {
        task.due_date = Some(parse_day(due)?.format("%Y-%m-%d").to_string());
    }
    task.client = args.client;
    task.project = args.project;
    task.product = args.product;
    task.tags = args.tag;
    if !args.assignee.is_empty() {
        refs.load(&mut client, RefKind::User)?;
        for assignee in &args.assignee {
            task.assigned_to
                .push(resolve_ref(&refs, RefKind::User, assignee)?);
        }
    }
    task.sub_tasks = args.subtask.into_iter().map(Subtask::new).collect();

    let mut store = TaskStore::new();
    let saved = store.submit(&mut client, task)?;
    println!("created {}", saved.id.as_deref().unwrap_or("task"));
    Ok(())
}

fn cmd_show(args: ShowArgs, json: bool, api_url: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = connect(api_url)?;
    let mut refs = RefStore::new();
    refs.load(&mut client, RefKind::Status)?;
    refs.load(&mut client, RefKind::User)?;

    let mut store = TaskStore::new();
    store.refresh(&mut client)?;
    let task = store
        .get(&args.id)
        .ok_or_else(|| format!("task not found: {}", args.id))?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&task_to_json(task, refs.statuses(), refs.users()))?
        );
    } else {
        for line in format_task_detail(task, refs.statuses(), refs.users()) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_edit(args: EditArgs, api_url: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = connect(api_url)?;
    let mut refs = RefStore::new();
    refs.load(&mut client, RefKind::Status)?;

    let mut store = TaskStore::new();
    store.refresh(&mut client)?;
    let mut task = store
        .get(&args.id)
        .cloned()
        .ok_or_else(|| format!("task not found: {}", args.id))?;

    let mut edited = false;
    if let Some(title) = args.title {
        task.title = title;
        edited = true;
    }
    if let Some(description) = args.description {
        task.description = Some(description);
        edited = true;
    }
    if let Some(status) = args.status.as_deref() {
        task.status = resolve_ref(&refs, RefKind::Status, status)?;
        edited = true;
    }
    if let Some(priority) = args.priority {
        task.priority = Some(priority);
        edited = true;
    }
    if let Some(due) = args.due.as_deref() {
        task.due_date = Some(parse_day(due)?.format("%Y-%m-%d").to_string());
        edited = true;
    }
    if args.clear_due {
        task.due_date = None;
        edited = true;
    }
    if !args.add_tag.is_empty() || !args.rm_tag.is_empty() {
        for tag in args.add_tag {
            if !task.tags.contains(&tag) {
                task.tags.push(tag);
            }
        }
        task.tags.retain(|t| !args.rm_tag.contains(t));
        edited = true;
    }
    if !args.assign.is_empty() || !args.unassign.is_empty() {
        refs.load(&mut client, RefKind::User)?;
        for assignee in &args.assign {
            let id = resolve_ref(&refs, RefKind::User, assignee)?;
            if !task.assigned_to.contains(&id) {
                task.assigned_to.push(id);
            }
        }
        for assignee in &args.unassign {
            let id = resolve_ref(&refs, RefKind::User, assignee)?;
            task.assigned_to.retain(|existing| *existing != id);
        }
        edited = true;
    }
    if edited {
        store.submit(&mut client, task)?;
    }

    // Subtask edits ride the nested routes, never a full-task update.
    for title in &args.add_subtask {
        store.add_subtask(&mut client, &args.id, title)?;
    }
    for key in &args.check {
        let subtask_id = resolve_subtask(&store, &args.id, key)?;
        store.set_subtask_done(&mut client, &args.id, &subtask_id, true)?;
    }
    for key in &args.uncheck {
        let subtask_id = resolve_subtask(&store, &args.id, key)?;
        store.set_subtask_done(&mut client, &args.id, &subtask_id, false)?;
    }
    for key in &args.rm_subtask {
        let subtask_id = resolve_subtask(&store, &args.id, key)?;
        store.remove_subtask(&mut client, &args.id, &subtask_id)?;
    }

    println!("updated {}", args.id);
    Ok(())
}

fn cmd_move(args: MoveArgs, api_url: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = connect(api_url)?;
    let mut refs = RefStore::new();
    refs.load(&mut client, RefKind::Status)?;
    let status = resolve_ref(&refs, RefKind::Status, &args.status)?;

    let mut store = TaskStore::new();
    store.refresh(&mut client)?;
    store.set_status(&mut client, &args.id, &status)?;

    let name = status_name(refs.statuses(), &status).unwrap_or(&status);
    println!("moved {} to {}", args.id, name);
    Ok(())
}

fn cmd_rm(args: RmArgs, api_url: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = connect(api_url)?;
    let mut store = TaskStore::new();
    store.refresh(&mut client)?;
    let task = store
        .get(&args.id)
        .ok_or_else(|| format!("task not found: {}", args.id))?;

    if !args.yes && !confirm(&format!("delete task '{}'?", task.title))? {
        println!("cancelled");
        return Ok(());
    }

    store.remove(&mut client, &args.id)?;
    println!("deleted {}", args.id);
    Ok(())
}

fn cmd_board(args: BoardArgs, json: bool, api_url: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = connect(api_url)?;
    let mut refs = RefStore::new();
    refs.load(&mut client, RefKind::Status)?;
    refs.load(&mut client, RefKind::User)?;

    let mut store = TaskStore::new();
    store.refresh(&mut client)?;
    let visible = store.filtered();

    let mode = if args.by_assignee {
        ViewMode::ByAssignee
    } else {
        ViewMode::ByStatus
    };
    let board = board::project_columns(&visible, mode, refs.statuses(), refs.users());

    if json {
        let columns: Vec<ColumnJson> = board
            .columns
            .iter()
            .map(|c| ColumnJson {
                key: c.key.clone(),
                title: c.title.clone(),
                tasks: c
                    .cards
                    .iter()
                    .filter_map(|&i| visible.get(i))
                    .map(|t| task_to_json(t, refs.statuses(), refs.users()))
                    .collect(),
            })
            .collect();
        let out = BoardJson {
            mode: mode.as_str().to_string(),
            columns,
            off_board: board.off_board,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for line in format_board(&board, &visible, refs.statuses()) {
            println!("{}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Reference-entity handlers
// ---------------------------------------------------------------------------

fn cmd_ref(cmd: RefCmd, json: bool, api_url: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let kind: RefKind = cmd.kind.parse()?;
    let mut client = connect(api_url)?;
    let mut refs = RefStore::new();
    refs.load(&mut client, kind)?;

    match cmd.action {
        RefAction::List => {
            if json {
                let items: Vec<RefEntityJson> = refs.list(kind).iter().map(ref_to_json).collect();
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                for entity in refs.list(kind) {
                    println!("{}", format_ref_line(entity));
                }
            }
        }
        RefAction::Add(args) => {
            let image = args.image.as_deref().map(Path::new);
            if image.is_some() && !kind.has_image() {
                return Err(format!("a {} doesn't carry an image", kind.singular()).into());
            }
            let saved = refs.submit(&mut client, kind, RefEntity::named(&args.name), image)?;
            println!("created {} '{}'", kind.singular(), saved.name);
        }
        RefAction::Rename(args) => {
            let id = resolve_ref(&refs, kind, &args.name)?;
            refs.rename(&mut client, kind, &id, &args.new_name)?;
            println!(
                "renamed {} '{}' to '{}'",
                kind.singular(),
                args.name,
                args.new_name
            );
        }
        RefAction::Rm(args) => {
            let id = resolve_ref(&refs, kind, &args.name)?;
            if !args.yes && !confirm(&format!("delete {} '{}'?", kind.singular(), args.name))? {
                println!("cancelled");
                return Ok(());
            }
            refs.remove(&mut client, kind, &id)?;
            println!("deleted {} '{}'", kind.singular(), args.name);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Note handlers
// ---------------------------------------------------------------------------

fn cmd_notes(cmd: NotesCmd, json: bool, api_url: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = connect(api_url)?;
    let mut store = NoteStore::new();
    store.refresh(&mut client)?;

    match cmd.action.unwrap_or(NotesAction::List) {
        NotesAction::List => {
            if json {
                let items: Vec<NoteJson> = store
                    .notes()
                    .iter()
                    .enumerate()
                    .map(|(i, n)| note_to_json(i + 1, n))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                for (i, note) in store.notes().iter().enumerate() {
                    println!("{:>3}  {}", i + 1, note.summary());
                }
            }
        }
        NotesAction::Add(args) => {
            store.submit(&mut client, Note::new(args.text))?;
            println!("added note");
        }
        NotesAction::Edit(args) => {
            let mut note = resolve_note(&store, &args.note)?.clone();
            note.content = args.text;
            store.submit(&mut client, note)?;
            println!("updated note");
        }
        NotesAction::Rm(args) => {
            let note = resolve_note(&store, &args.note)?;
            let id = note.id.clone().ok_or("note has no id")?;
            let summary = note.summary().to_string();
            if !args.yes && !confirm(&format!("delete note '{}'?", summary))? {
                println!("cancelled");
                return Ok(());
            }
            store.remove(&mut client, &id)?;
            println!("deleted note");
        }
    }
    Ok(())
}
