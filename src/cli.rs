use crate::auth;
use crate::config::Config;
use crate::error::StoreError;
use crate::map::Projection;
use crate::model::{parse_duration, SlotDraft, SlotStatus};
use crate::screen::{check_access, Access, Denial, Screen};
use crate::store::{SignInMethod, Store};
use crate::toast::{self, ToastService};
use crate::transcript::Transcript;
use crate::view;
use crate::Args;
use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::cell::RefCell;
use std::time::Instant;
use tracing::{debug, info, warn};

pub struct Context {
    pub args: Args,
    pub config: Config,
    pub session_id: String,
    pub store: RefCell<Store>,
    pub ui: RefCell<view::UiState>,
    pub toasts: RefCell<ToastService>,
    pub transcript: Option<RefCell<Transcript>>,
    pub projection: Projection,
}

type CommandResult = Result<(), StoreError>;

/// Run the `-c` commands in order, then print the final screen
pub fn run_script(ctx: &Context, commands: &[String]) -> Result<()> {
    ctx.store.borrow_mut().navigate(Screen::Onboarding);
    settle(ctx, "", Ok(()));

    for line in commands {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        println!("> {}", line);
        let mark = ctx.toasts.borrow().mark();
        let quit = handle_line(ctx, line);
        print_toasts(ctx, mark);
        if quit {
            break;
        }
    }

    print_screen(ctx);
    finish(ctx);
    Ok(())
}

pub fn run_repl(ctx: Context) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    println!("parkspot - type /help for commands, /exit to quit");
    if ctx.args.no_splash {
        ctx.store.borrow_mut().navigate(Screen::Onboarding);
    } else {
        print_screen(&ctx);
        std::thread::sleep(ctx.config.session.splash_delay());
        ctx.store.borrow_mut().navigate(Screen::Onboarding);
    }
    settle(&ctx, "", Ok(()));
    print_screen(&ctx);

    loop {
        let prompt = format!("{}> ", ctx.store.borrow().screen());
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;

                let mark = ctx.toasts.borrow().mark();
                if handle_line(&ctx, line) {
                    break;
                }
                print_screen(&ctx);
                print_toasts(&ctx, mark);
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {}", e);
                break;
            }
        }
    }

    finish(&ctx);
    Ok(())
}

/// Handle one input line; returns true when the session should end
fn handle_line(ctx: &Context, line: &str) -> bool {
    record(ctx, |t| t.command(line));

    if !line.starts_with('/') {
        // Free text on the map screen is a search
        if ctx.store.borrow().screen() == Screen::Home {
            ctx.ui.borrow_mut().search = line.to_string();
        } else {
            println!("Unknown input. Type /help for commands.");
        }
        return false;
    }

    let parts = match shell_words::split(line) {
        Ok(parts) => parts,
        Err(e) => {
            println!("Invalid input: {}", e);
            return false;
        }
    };
    let (cmd, args) = match parts.split_first() {
        Some((cmd, args)) => (cmd.as_str(), args),
        None => return false,
    };

    let result = match cmd {
        "/exit" | "/quit" => return true,
        "/help" => {
            print_help();
            Ok(())
        }
        "/screen" => Ok(()),
        "/go" => cmd_go(ctx, args),
        "/next" => cmd_next(ctx),
        "/skip" => {
            go(ctx, Screen::Login);
            Ok(())
        }
        "/login" => cmd_login(ctx, args),
        "/signup" => cmd_signup(ctx, args),
        "/google" => sign_in(ctx, auth::PROVIDER_EMAIL, SignInMethod::Google),
        "/logout" => {
            ctx.store.borrow_mut().logout();
            go(ctx, Screen::Login);
            Ok(())
        }
        "/search" => {
            ctx.ui.borrow_mut().search = args.join(" ");
            go(ctx, Screen::Home);
            Ok(())
        }
        "/select" => cmd_select(ctx, args),
        "/book" => cmd_book(ctx),
        "/duration" => cmd_duration(ctx, args),
        "/reserve" => cmd_reserve(ctx, args),
        "/cancel" => cmd_cancel(ctx, args),
        "/theme" => cmd_theme(ctx, args),
        "/status" => cmd_status(ctx, args),
        "/add" => cmd_add(ctx, args),
        "/audit" => cmd_audit(ctx),
        _ => {
            println!("Unknown command: {}", cmd);
            Ok(())
        }
    };

    settle(ctx, line, result);
    false
}

fn print_help() {
    println!("Commands:");
    println!("  /exit                 - quit");
    println!("  /help                 - show commands");
    println!("  /screen               - redraw the current screen");
    println!("  /go <screen>          - home, reservations, admin, profile, slot-details, login");
    println!("  /next, /skip          - onboarding");
    println!("Account:");
    println!("  /login <email> <password>");
    println!("  /signup <email> <password> <confirm>");
    println!("  /google               - continue with Google");
    println!("  /logout");
    println!("  /theme [on|off]       - toggle dark mode");
    println!("Parking:");
    println!("  /search [text]        - filter slots by name or address (plain text on the map works too)");
    println!("  /select <id>|none     - pick a slot on the map");
    println!("  /book                 - open the selected slot, or your reservations");
    println!("  /duration <hours>     - set the reservation length");
    println!("  /reserve [hours]      - reserve the selected slot");
    println!("  /cancel <id>          - cancel a reservation");
    println!("Admin:");
    println!("  /status <id> [status] - set or cycle a slot status");
    println!("  /add <name> <address> [car|bike] [price] [status]");
    println!("  /audit                - list status overrides");
}

/// Navigate to `target` unless an access rule redirects elsewhere
fn go(ctx: &Context, target: Screen) {
    let access = {
        let store = ctx.store.borrow();
        check_access(target, store.user(), store.selected_slot())
    };
    match access {
        Access::Granted(screen) => ctx.store.borrow_mut().navigate(screen),
        Access::Redirect { to, reason } => {
            debug!(requested = %target, to = %to, ?reason, "navigation redirected");
            ctx.toasts.borrow_mut().error(reason.message(), None);
            ctx.store.borrow_mut().navigate(to);
        }
    }
}

fn cmd_go(ctx: &Context, args: &[String]) -> CommandResult {
    let Some(raw) = args.first() else {
        println!("Usage: /go <screen>");
        return Ok(());
    };
    match Screen::parse(raw) {
        Some(screen) => go(ctx, screen),
        None => {
            ctx.toasts
                .borrow_mut()
                .info(format!("Unknown screen '{}'", raw), None);
            ctx.store.borrow_mut().navigate_to(raw);
        }
    }
    Ok(())
}

fn cmd_next(ctx: &Context) -> CommandResult {
    let screen = ctx.store.borrow().screen();
    match screen {
        Screen::Splash => go(ctx, Screen::Onboarding),
        Screen::Onboarding => {
            if !ctx.ui.borrow_mut().next_slide() {
                go(ctx, Screen::Login);
            }
        }
        _ => println!("/next only applies to onboarding"),
    }
    Ok(())
}

fn sign_in(ctx: &Context, email: &str, method: SignInMethod) -> CommandResult {
    ctx.store.borrow_mut().sign_in(email, method)?;
    go(ctx, Screen::Home);
    Ok(())
}

fn cmd_login(ctx: &Context, args: &[String]) -> CommandResult {
    let email = args.first().map(String::as_str).unwrap_or("");
    let password = args.get(1).map(String::as_str).unwrap_or("");
    let email = auth::validate_login(email, password)?;
    sign_in(ctx, &email, SignInMethod::Password)
}

fn cmd_signup(ctx: &Context, args: &[String]) -> CommandResult {
    let field = |i: usize| args.get(i).map(String::as_str).unwrap_or("");
    let email = auth::validate_signup(field(0), field(1), field(2))?;
    sign_in(ctx, &email, SignInMethod::Signup)
}

fn cmd_select(ctx: &Context, args: &[String]) -> CommandResult {
    if !require_user(ctx) {
        return Ok(());
    }
    let Some(id) = args.first() else {
        println!("Usage: /select <id>|none");
        return Ok(());
    };
    let id = (id != "none").then_some(id.as_str());
    ctx.store.borrow_mut().select_slot(id)?;
    ctx.ui.borrow_mut().duration = 1.0;
    Ok(())
}

/// Primary action of the map screen
fn cmd_book(ctx: &Context) -> CommandResult {
    let (active, selected) = {
        let store = ctx.store.borrow();
        (store.has_active_reservation(), store.selected_slot().is_some())
    };
    if active {
        go(ctx, Screen::Reservations);
    } else if selected {
        go(ctx, Screen::SlotDetails);
    } else {
        ctx.toasts
            .borrow_mut()
            .info("Select a parking slot first", None);
    }
    Ok(())
}

fn cmd_duration(ctx: &Context, args: &[String]) -> CommandResult {
    let Some(raw) = args.first() else {
        println!("Usage: /duration <hours>");
        return Ok(());
    };
    ctx.ui.borrow_mut().duration = parse_duration(raw)?;
    Ok(())
}

fn cmd_reserve(ctx: &Context, args: &[String]) -> CommandResult {
    if !require_user(ctx) {
        return Ok(());
    }
    if let Some(raw) = args.first() {
        ctx.ui.borrow_mut().duration = parse_duration(raw)?;
    }
    let duration = ctx.ui.borrow().duration;

    let selected = ctx.store.borrow().selected_slot().map(|s| s.id.clone());
    let Some(slot_id) = selected else {
        ctx.toasts
            .borrow_mut()
            .info("Select a parking slot first", None);
        return Ok(());
    };
    ctx.store.borrow_mut().reserve_slot(&slot_id, duration)?;
    Ok(())
}

fn cmd_cancel(ctx: &Context, args: &[String]) -> CommandResult {
    if !require_user(ctx) {
        return Ok(());
    }
    let Some(id) = args.first() else {
        println!("Usage: /cancel <reservation-id>");
        return Ok(());
    };
    ctx.store.borrow_mut().cancel_reservation(id)?;
    Ok(())
}

fn cmd_theme(ctx: &Context, args: &[String]) -> CommandResult {
    let current = ctx.store.borrow().dark_mode();
    let dark = match args.first().map(String::as_str) {
        None => !current,
        Some("on" | "dark") => true,
        Some("off" | "light") => false,
        Some(other) => {
            return Err(StoreError::validation(
                "theme",
                format!("Unknown theme '{}', use on or off", other),
            ))
        }
    };
    ctx.store.borrow_mut().set_theme(dark);
    Ok(())
}

/// Slot and reservation commands belong to signed-in screens
fn require_user(ctx: &Context) -> bool {
    if ctx.store.borrow().user().is_some() {
        return true;
    }
    debug!("slot command refused without a session");
    ctx.toasts
        .borrow_mut()
        .error(Denial::SignInRequired.message(), None);
    false
}

fn require_admin(ctx: &Context) -> bool {
    if ctx.store.borrow().is_admin() {
        return true;
    }
    warn!("admin command refused for non-admin session");
    ctx.toasts.borrow_mut().error("Admin access required", None);
    false
}

fn cmd_status(ctx: &Context, args: &[String]) -> CommandResult {
    if !require_admin(ctx) {
        return Ok(());
    }
    let Some(slot_id) = args.first() else {
        println!("Usage: /status <id> [available|reserved|occupied]");
        return Ok(());
    };
    let mut store = ctx.store.borrow_mut();
    match args.get(1) {
        Some(raw) => {
            let status = SlotStatus::from_str(raw).ok_or_else(|| {
                StoreError::validation("status", format!("Unknown status '{}'", raw))
            })?;
            store.set_slot_status(slot_id, status)?;
        }
        None => {
            store.cycle_slot_status(slot_id)?;
        }
    }
    Ok(())
}

fn cmd_add(ctx: &Context, args: &[String]) -> CommandResult {
    if !require_admin(ctx) {
        return Ok(());
    }
    let defaults = SlotDraft::default();
    let arg = |i: usize, default: &str| args.get(i).cloned().unwrap_or_else(|| default.to_string());
    let draft = SlotDraft {
        name: arg(0, ""),
        address: arg(1, ""),
        vehicle: arg(2, &defaults.vehicle),
        price: arg(3, &defaults.price),
        status: arg(4, &defaults.status),
    };
    let slot = draft.validate()?;
    let mut store = ctx.store.borrow_mut();
    let added = store.add_slot(slot)?;
    println!("Added slot {} ({})", added.id, added.name);
    Ok(())
}

fn cmd_audit(ctx: &Context) -> CommandResult {
    if !require_admin(ctx) {
        return Ok(());
    }
    let store = ctx.store.borrow();
    if store.overrides().is_empty() {
        println!("No status overrides this session.");
        return Ok(());
    }
    println!("Status overrides:");
    for o in store.overrides() {
        println!(
            "  {}  slot {}: {} -> {} ({} active reservation(s))",
            o.at.format("%H:%M:%S"),
            o.slot_id,
            o.from,
            o.to,
            o.active_reservations
        );
    }
    Ok(())
}

/// Turn the command outcome and queued store events into toasts and
/// transcript entries
fn settle(ctx: &Context, line: &str, result: CommandResult) {
    let events = ctx.store.borrow_mut().drain_events();
    let now = Instant::now();
    for event in &events {
        debug!(?event, "store event");
        record(ctx, |t| t.store_event(event));
        if let Some((kind, title, description)) = toast::for_event(event) {
            ctx.toasts.borrow_mut().push(kind, title, description, now);
        }
    }

    if let Err(err) = result {
        if err.is_benign() {
            debug!(line, error = %err, "command was a no-op");
        } else {
            info!(line, code = err.code(), error = %err, "command rejected");
        }
        record(ctx, |t| t.command_error(line, err.code(), &err.to_string()));
        let (kind, title, description) = toast::for_error(&err);
        ctx.toasts.borrow_mut().push(kind, title, description, now);
    }
}

fn record(ctx: &Context, f: impl FnOnce(&mut Transcript) -> Result<()>) {
    if let Some(transcript) = &ctx.transcript {
        if let Err(e) = f(&mut transcript.borrow_mut()) {
            warn!(error = %e, "failed to write transcript");
        }
    }
}

fn print_screen(ctx: &Context) {
    let store = ctx.store.borrow();
    let ui = ctx.ui.borrow();
    println!("\n{}", view::render(&store, &ui, &ctx.projection));
}

fn print_toasts(ctx: &Context, after: u64) {
    let mut toasts = ctx.toasts.borrow_mut();
    toasts.retain_visible(Instant::now());
    for t in toasts.since(after) {
        println!("{}", t.line());
    }
}

fn finish(ctx: &Context) {
    let reservations = ctx.store.borrow().reservations().len();
    record(ctx, |t| t.session_end(reservations));
    if let Some(transcript) = &ctx.transcript {
        debug!(path = ?transcript.borrow().path, session = %ctx.session_id, "transcript closed");
    }
}
