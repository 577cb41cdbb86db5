use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;

use client_logging::client_info;
use docchat_core::{update, ChatState, Msg};

use super::effects::EffectRunner;
use super::input::{parse_line, InputAction};
use super::logging::{self, LogDestination};
use super::persistence;
use super::render::{self, Renderer};

/// Everything the main loop reacts to: user input and backend results.
pub(crate) enum AppEvent {
    Input(InputAction),
    Core(Msg),
}

pub fn run_app() -> anyhow::Result<()> {
    logging::initialize(LogDestination::File);

    let workdir = std::env::current_dir()?;
    let config = persistence::load_config(&workdir);
    client_info!("Using backend at {}", config.backend_url);

    let (tx, rx) = mpsc::channel::<AppEvent>();
    let runner = EffectRunner::new(&config, tx.clone())?;

    let mut state = ChatState::new();
    let mut renderer = Renderer::new();

    println!("docchat — ask questions about your documents");
    println!("Type a question, or :help for commands.");

    dispatch(&mut state, &runner, &mut renderer, Msg::AppStarted);
    dispatch(&mut state, &runner, &mut renderer, Msg::StartupComplete);

    spawn_input_loop(tx);

    while let Ok(event) = rx.recv() {
        match event {
            AppEvent::Core(msg) => dispatch(&mut state, &runner, &mut renderer, msg),
            AppEvent::Input(action) => {
                if !handle_input(&mut state, &runner, &mut renderer, action) {
                    break;
                }
            }
        }
    }
    Ok(())
}

fn spawn_input_loop(tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if let Some(action) = parse_line(&line) {
                if tx.send(AppEvent::Input(action)).is_err() {
                    break;
                }
            }
        }
    });
}

/// Returns false when the app should exit.
fn handle_input(
    state: &mut ChatState,
    runner: &EffectRunner,
    renderer: &mut Renderer,
    action: InputAction,
) -> bool {
    match action {
        InputAction::Ask(text) => {
            dispatch(state, runner, renderer, Msg::InputChanged(text));
            dispatch(state, runner, renderer, Msg::AskSubmitted);
        }
        InputAction::AddFiles(files) => {
            dispatch(state, runner, renderer, Msg::FilesSelected(files));
        }
        InputAction::RemoveFile(index) => {
            dispatch(state, runner, renderer, Msg::FileRemoved { index });
        }
        InputAction::ProcessFiles => dispatch(state, runner, renderer, Msg::ProcessFilesClicked),
        InputAction::IndexWebsite { url, max_pages } => {
            dispatch(state, runner, renderer, Msg::WebsiteSubmitted { url, max_pages });
        }
        InputAction::NewChat => dispatch(state, runner, renderer, Msg::NewChatClicked),
        InputAction::ShowSessions => {
            for line in render::session_rows(&state.view()) {
                println!("{line}");
            }
        }
        InputAction::OpenSession(position) => match session_id_at(state, position) {
            Some(id) => dispatch(state, runner, renderer, Msg::SessionSelected { id }),
            None => println!("No session #{position}; try :sessions"),
        },
        InputAction::DeleteSession(position) => match session_id_at(state, position) {
            Some(id) => dispatch(state, runner, renderer, Msg::SessionDeleteRequested { id }),
            None => println!("No session #{position}; try :sessions"),
        },
        InputAction::ShowHelp => print_help(),
        InputAction::Quit => return false,
        InputAction::Unknown(command) => println!("Unknown command {command}; try :help"),
    }
    true
}

fn session_id_at(state: &ChatState, position: usize) -> Option<String> {
    state
        .sessions()
        .get(position.checked_sub(1)?)
        .map(|session| session.id.clone())
}

fn dispatch(state: &mut ChatState, runner: &EffectRunner, renderer: &mut Renderer, msg: Msg) {
    let current = std::mem::take(state);
    let (mut next, effects) = update(current, msg);
    runner.enqueue(effects);
    if next.consume_dirty() {
        for line in renderer.render(&next.view()) {
            println!("{line}");
        }
        let _ = io::stdout().flush();
    }
    *state = next;
}

fn print_help() {
    println!("Commands:");
    println!("  <question>            ask about the indexed documents");
    println!("  :files <path>...      stage PDF or TXT files for ingestion");
    println!("  :remove <n>           unstage file n");
    println!("  :process              ingest the staged files now");
    println!("  :index <url> [pages]  crawl a website into the index");
    println!("  :sessions             list recent conversations");
    println!("  :open <n>             resume conversation n");
    println!("  :delete <n>           delete conversation n");
    println!("  :new                  start a new conversation");
    println!("  :quit                 exit");
}
