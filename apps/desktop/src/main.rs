use std::{
    io::{self, BufRead, Write},
    sync::Arc,
};

use anyhow::Result;
use clap::Parser;
use notes_core::{load_config, ConfirmDelete, NotesController, NotesGateway};
use shared::domain::Note;

#[derive(Parser, Debug)]
struct Args {
    /// Backend endpoint url; overrides notes.toml and the environment.
    #[arg(long)]
    endpoint_url: Option<String>,
    /// Backend access key; overrides notes.toml and the environment.
    #[arg(long)]
    access_key: Option<String>,
}

struct StdinConfirm;

impl ConfirmDelete for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        let _ = io::stdout().flush();
        let mut answer = String::new();
        if io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let mut config = load_config();
    if args.endpoint_url.is_some() {
        config.endpoint_url = args.endpoint_url;
    }
    if args.access_key.is_some() {
        config.access_key = args.access_key;
    }

    let gateway = Arc::new(NotesGateway::new(&config));
    let mut controller = NotesController::with_confirm(gateway, Arc::new(StdinConfirm));
    controller.activate().await;

    if let Some(warning) = controller.last_error() {
        println!("{warning}");
    }
    print_notes(controller.notes());
    print_help();

    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        let (command, rest) = match line.split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "" => {}
            "list" => {
                controller.sync_collection();
                print_notes(controller.notes());
            }
            "select" => match find_note(&controller, rest) {
                Some(note) => {
                    controller.select(&note);
                    print_detail(&controller);
                }
                None => println!("no note with id '{rest}'"),
            },
            "new" => {
                controller.start_new();
                println!("composing a new note; set `title` and `content`, then `save`");
            }
            "edit" => {
                controller.start_edit();
                if controller.is_editing() {
                    print_detail(&controller);
                } else {
                    println!("select a note first");
                }
            }
            "title" => controller.set_draft_title(rest),
            "content" => controller.set_draft_content(rest),
            "show" => print_detail(&controller),
            "save" => {
                controller.save().await;
                report(&controller);
                print_notes(controller.notes());
            }
            "delete" => match find_note(&controller, rest) {
                Some(note) => {
                    controller.remove(&note).await;
                    report(&controller);
                    print_notes(controller.notes());
                }
                None => println!("no note with id '{rest}'"),
            },
            "cancel" => controller.cancel(),
            "quit" | "exit" => break,
            other => println!("unknown command '{other}'"),
        }
    }

    Ok(())
}

fn find_note(controller: &NotesController, id: &str) -> Option<Note> {
    let id: i64 = id.parse().ok()?;
    controller.notes().iter().find(|n| n.id.0 == id).cloned()
}

fn print_notes(notes: &[Note]) {
    if notes.is_empty() {
        println!("(no notes)");
        return;
    }
    for note in notes {
        println!(
            "{:>4}  {}  (updated {})",
            note.id.0,
            note.title,
            note.updated_at.format("%Y-%m-%d %H:%M")
        );
    }
}

fn print_detail(controller: &NotesController) {
    if controller.is_editing() {
        println!("editing: title='{}'", controller.draft_title());
        println!("         content='{}'", controller.draft_content());
        return;
    }
    match controller.selected() {
        Some(note) => {
            println!("{} — {}", note.id.0, note.title);
            println!("{}", note.content);
        }
        None => println!("nothing selected"),
    }
}

fn report(controller: &NotesController) {
    match controller.last_error() {
        Some(error) => println!("{error}"),
        None => println!("ok"),
    }
}

fn print_help() {
    println!("commands: list, select <id>, new, edit, title <text>, content <text>,");
    println!("          show, save, cancel, delete <id>, quit");
}
