//! Terminal runtime for the interactive list.
//!
//! All interactive state lives in the engine's [`Model`] and every mutation
//! goes through [`engine::update`]; this module owns the terminal, translates
//! key events, and routes the commands each update step produces. Commands
//! run on the dispatcher thread, except [`Command::OpenEditor`], which needs
//! the terminal and therefore runs here between a suspend and a resume.

use std::io;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::config::Config;
use crate::engine::{self, dispatch, Command, Key, Message, Model};
use crate::error::{Error, Result};
use crate::external;
use crate::store::Store;
use crate::task::TaskId;

use super::view;

const EVENT_POLL_MS: u64 = 120;

pub fn run(store: Store, config: Config) -> Result<()> {
    let (command_tx, command_rx) = mpsc::channel();
    let (message_tx, message_rx) = mpsc::channel();

    let worker = dispatch::spawn(store, command_rx, message_tx);

    let initial = [
        Command::LoadTasks {
            active: true,
            limit: config.capacity,
        },
        Command::LoadTasks {
            active: false,
            limit: config.capacity,
        },
    ];
    for command in initial {
        if command_tx.send(command).is_err() {
            return Err(Error::OperationFailed(
                "failed to start task dispatcher".to_string(),
            ));
        }
    }

    let mut model = Model::new(&config);
    let result = run_terminal(&mut model, &config, message_rx, command_tx);

    // Both channel ends are gone by now, so the worker drains and exits.
    let _ = worker.join();

    result
}

fn run_terminal(
    model: &mut Model,
    config: &Config,
    messages: Receiver<Message>,
    commands: Sender<Command>,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, model, config, messages, commands);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: &mut Model,
    config: &Config,
    messages: Receiver<Message>,
    commands: Sender<Command>,
) -> Result<()> {
    let mut dirty = true;
    loop {
        while let Ok(message) = messages.try_recv() {
            step(terminal, model, config, message, &commands)?;
            dirty = true;
        }

        if model.quit {
            break;
        }

        if dirty {
            terminal.draw(|frame| view::render(frame, model))?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(EVENT_POLL_MS))? {
            match event::read()? {
                Event::Key(key) => {
                    if let Some(key) = translate_key(key) {
                        step(terminal, model, config, Message::Key(key), &commands)?;
                        dirty = true;
                    }
                }
                Event::Resize(_, _) => {
                    dirty = true;
                }
                _ => {}
            }
        }

        if model.quit {
            break;
        }
    }
    Ok(())
}

/// Run one update step, executing the commands it produces.
///
/// Editor commands are intercepted and their outcome fed straight back in as
/// the next message; everything else goes to the dispatcher thread.
fn step(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: &mut Model,
    config: &Config,
    message: Message,
    commands: &Sender<Command>,
) -> Result<()> {
    let mut pending = vec![message];
    while let Some(message) = pending.pop() {
        for command in engine::update(model, message) {
            match command {
                Command::OpenEditor { id, context } => {
                    pending.push(edit_context_external(terminal, config, id, context));
                }
                command => {
                    if commands.send(command).is_err() {
                        return Err(Error::OperationFailed(
                            "task dispatcher is gone".to_string(),
                        ));
                    }
                }
            }
        }
    }
    Ok(())
}

/// Reduce a crossterm event to the key alphabet the engine understands.
fn translate_key(key: KeyEvent) -> Option<Key> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if let KeyCode::Char(ch) = key.code {
            return Some(Key::Ctrl(ch.to_ascii_lowercase()));
        }
    }
    match key.code {
        KeyCode::Char(ch) => Some(Key::Char(ch)),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Esc => Some(Key::Esc),
        KeyCode::Tab => Some(Key::Tab),
        KeyCode::BackTab => Some(Key::BackTab),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        _ => None,
    }
}

fn edit_context_external(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &Config,
    id: TaskId,
    context: Option<String>,
) -> Message {
    match run_editor(terminal, config, context.as_deref()) {
        Ok((content, cleanup_warning)) => Message::EditorClosed {
            id,
            old_context: context,
            outcome: Ok(content),
            cleanup_warning,
        },
        Err(err) => Message::EditorClosed {
            id,
            old_context: context,
            outcome: Err(err),
            cleanup_warning: None,
        },
    }
}

fn run_editor(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &Config,
    context: Option<&str>,
) -> std::result::Result<(String, Option<String>), String> {
    let file = external::context_scratch_file(context)?;
    let path = file.path().to_path_buf();

    suspend_terminal(terminal).map_err(|err| format!("failed to suspend terminal: {err}"))?;
    let editor_result = launch(config, &path);
    let restore_result = resume_terminal(terminal);
    if let Err(err) = restore_result {
        return Err(format!("failed to restore terminal: {err}"));
    }

    let status = editor_result?;
    if !status.success() {
        let detail = status
            .code()
            .map(|code| format!("exit code {code}"))
            .unwrap_or_else(|| "signal".to_string());
        return Err(format!("editor exited with {detail}"));
    }

    let content = std::fs::read_to_string(&path)
        .map_err(|err| format!("failed to read editor buffer: {err}"))?;

    let cleanup_warning = file
        .close()
        .err()
        .map(|err| format!("Couldn't remove the editor temp file: {err}"));
    Ok((content, cleanup_warning))
}

fn launch(config: &Config, path: &Path) -> std::result::Result<std::process::ExitStatus, String> {
    let candidates = external::editor_candidates(config.editor.as_deref());
    external::launch_editor(&candidates, path)
}

fn suspend_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    Ok(())
}

fn resume_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    enable_raw_mode()?;
    terminal.clear()?;
    Ok(())
}
