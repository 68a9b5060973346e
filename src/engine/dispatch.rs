//! Command execution off the event loop.
//!
//! A single worker thread owns the store and drains the command channel in
//! order. Each command runs to completion and reports back as a message;
//! there is no cancellation and no rollback.

use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use chrono::Utc;

use crate::engine::command::Command;
use crate::engine::message::{CreatedTask, Message};
use crate::external;
use crate::store::Store;

/// Run commands on a dedicated thread until the command channel closes.
pub fn spawn(
    mut store: Store,
    commands: Receiver<Command>,
    messages: Sender<Message>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(command) = commands.recv() {
            let Some(message) = execute(&mut store, command) else {
                continue;
            };
            if messages.send(message).is_err() {
                break;
            }
        }
    })
}

/// Execute one command against the store and report its outcome.
///
/// Timestamps are taken here, at execution time. `OpenEditor` never reaches
/// this point; the terminal loop intercepts it to suspend the screen first.
pub fn execute(store: &mut Store, command: Command) -> Option<Message> {
    match command {
        Command::LoadTasks { active, limit } => {
            let result = if active {
                store.fetch_active(limit)
            } else {
                store.fetch_archived(limit)
            };
            Some(Message::TasksLoaded {
                active,
                result: result.map_err(|err| err.to_string()),
            })
        }
        Command::CreateTask { summary, index } => {
            let now = Utc::now();
            let result = store
                .insert_task(&summary, now, now, index == 0)
                .map(|id| CreatedTask {
                    id,
                    summary,
                    created_at: now,
                    updated_at: now,
                })
                .map_err(|err| err.to_string());
            Some(Message::TaskCreated { index, result })
        }
        Command::WriteSequence { ids } => Some(Message::SequenceWritten {
            result: store.write_sequence(&ids).map_err(|err| err.to_string()),
        }),
        Command::UpdateSummary { id, summary } => {
            let now = Utc::now();
            let result = store
                .update_summary(id, &summary, now)
                .map_err(|err| err.to_string());
            Some(Message::SummaryUpdated {
                id,
                summary,
                updated_at: now,
                result,
            })
        }
        Command::UpdateContext { id, context } => {
            let now = Utc::now();
            let result = store
                .update_context(id, context.as_deref(), now)
                .map_err(|err| err.to_string());
            Some(Message::ContextUpdated {
                id,
                context,
                updated_at: now,
                result,
            })
        }
        Command::SetStatus { id, active } => {
            let now = Utc::now();
            let result = store
                .set_active(id, active, now)
                .map_err(|err| err.to_string());
            Some(Message::StatusChanged {
                id,
                active,
                updated_at: now,
                result,
            })
        }
        Command::DeleteTask { id, active } => Some(Message::TaskDeleted {
            id,
            active,
            result: store.delete_task(id).map_err(|err| err.to_string()),
        }),
        Command::OpenEditor { .. } => {
            tracing::warn!("editor command reached the worker; dropping");
            None
        }
        Command::OpenUrl { url } => {
            let result = external::open_url(&url).map_err(|err| err.to_string());
            Some(Message::UrlOpened { url, result })
        }
        Command::OpenUrls { urls } => Some(Message::UrlsOpened {
            result: external::open_urls(&urls).map_err(|err| err.to_string()),
        }),
        Command::CopyToClipboard { text } => Some(Message::ContextCopied {
            result: external::copy_to_clipboard(&text).map_err(|err| err.to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    fn store() -> Store {
        Store::open_in_memory().expect("store")
    }

    #[test]
    fn create_task_extends_sequence() {
        let mut store = store();

        let message = execute(
            &mut store,
            Command::CreateTask {
                summary: "first".to_string(),
                index: 0,
            },
        )
        .expect("message");

        let Message::TaskCreated {
            index: 0,
            result: Ok(created),
        } = message
        else {
            panic!("unexpected message: {message:?}");
        };
        assert_eq!(created.summary, "first");
        assert_eq!(store.read_sequence().expect("sequence"), vec![created.id]);
    }

    #[test]
    fn top_creates_land_at_sequence_front() {
        let mut store = store();

        execute(
            &mut store,
            Command::CreateTask {
                summary: "a".to_string(),
                index: 0,
            },
        );
        execute(
            &mut store,
            Command::CreateTask {
                summary: "b".to_string(),
                index: 0,
            },
        );

        let tasks = store.fetch_active(10).expect("fetch");
        let summaries: Vec<&str> = tasks.iter().map(|t| t.summary.as_str()).collect();
        assert_eq!(summaries, vec!["b", "a"]);
    }

    #[test]
    fn load_tasks_reports_sequence_order() {
        let mut store = store();
        let now = Utc::now();
        store.insert_task("a", now, now, false).expect("insert");
        store.insert_task("b", now, now, true).expect("insert");

        let message = execute(
            &mut store,
            Command::LoadTasks {
                active: true,
                limit: 10,
            },
        )
        .expect("message");

        let Message::TasksLoaded {
            active: true,
            result: Ok(tasks),
        } = message
        else {
            panic!("unexpected message: {message:?}");
        };
        let summaries: Vec<&str> = tasks.iter().map(|t| t.summary.as_str()).collect();
        assert_eq!(summaries, vec!["b", "a"]);
    }

    #[test]
    fn status_change_keeps_sequence_until_rewritten() {
        let mut store = store();
        let now = Utc::now();
        let id = store.insert_task("a", now, now, true).expect("insert");

        let message = execute(&mut store, Command::SetStatus { id, active: false }).expect("msg");
        assert!(matches!(
            message,
            Message::StatusChanged { result: Ok(()), .. }
        ));
        assert_eq!(store.read_sequence().expect("sequence"), vec![id]);

        let message = execute(&mut store, Command::WriteSequence { ids: vec![] }).expect("msg");
        assert!(matches!(
            message,
            Message::SequenceWritten { result: Ok(()) }
        ));
        assert!(store.fetch_active(10).expect("fetch").is_empty());
        assert_eq!(store.fetch_archived(10).expect("fetch").len(), 1);
    }

    #[test]
    fn delete_removes_row() {
        let mut store = store();
        let now = Utc::now();
        let id = store.insert_task("a", now, now, true).expect("insert");

        let message = execute(&mut store, Command::DeleteTask { id, active: true }).expect("msg");

        assert!(matches!(
            message,
            Message::TaskDeleted { result: Ok(()), .. }
        ));
        assert_eq!(store.num_active().expect("count"), 1);
        // The row is gone; the follow-up sequence snapshot is the caller's job.
        let message =
            execute(&mut store, Command::WriteSequence { ids: vec![] }).expect("msg");
        assert!(matches!(
            message,
            Message::SequenceWritten { result: Ok(()) }
        ));
        assert_eq!(store.num_active().expect("count"), 0);
    }

    #[test]
    fn editor_command_never_runs_on_worker() {
        let mut store = store();

        let message = execute(
            &mut store,
            Command::OpenEditor {
                id: 1,
                context: None,
            },
        );

        assert!(message.is_none());
    }

    #[test]
    fn worker_feeds_results_back() {
        let store = store();
        let (command_tx, command_rx) = mpsc::channel();
        let (message_tx, message_rx) = mpsc::channel();
        let worker = spawn(store, command_rx, message_tx);

        command_tx
            .send(Command::CreateTask {
                summary: "queued".to_string(),
                index: 0,
            })
            .expect("send");

        let message = message_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("worker reply");
        assert!(matches!(
            message,
            Message::TaskCreated { result: Ok(_), .. }
        ));

        drop(command_tx);
        worker.join().expect("worker exit");
    }
}
