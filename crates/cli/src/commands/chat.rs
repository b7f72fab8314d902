//! `deskmate chat`: Interactive mode.
//!
//! Reads one line per turn from stdin until an exit word, EOF or Ctrl+C.
//! `menu` opens a numbered shortcut menu for the local tools.

use super::{CommandResult, load_config, start_assistant};
use deskmate_agent::Assistant;
use std::future::Future;
use std::io::{BufRead, Write};
use std::path::Path;
use std::pin::Pin;
use tokio::sync::mpsc;

type LineReceiver = mpsc::Receiver<std::io::Result<String>>;

const EXIT_WORDS: [&str; 3] = ["salir", "exit", "quit"];

fn is_exit(input: &str) -> bool {
    EXIT_WORDS.iter().any(|w| input.eq_ignore_ascii_case(w))
}

/// Shortcuts offered by `menu`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    System,
    Time,
    Memory,
    VectorStats,
    Exit,
}

impl MenuChoice {
    fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::System),
            "2" => Some(Self::Time),
            "3" => Some(Self::Memory),
            "4" => Some(Self::VectorStats),
            "5" => Some(Self::Exit),
            _ => None,
        }
    }

    fn tool_name(&self) -> Option<&'static str> {
        match self {
            Self::System => Some("system_info"),
            Self::Time => Some("get_time"),
            Self::Memory => Some("memory_usage"),
            Self::VectorStats => Some("vector_stats"),
            Self::Exit => None,
        }
    }
}

fn print_menu() {
    println!();
    println!("  1. Información del sistema");
    println!("  2. Hora actual");
    println!("  3. Uso de memoria");
    println!("  4. Estadísticas de memoria vectorial");
    println!("  5. Salir");
}

fn prompt(label: &str) -> std::io::Result<()> {
    print!("\n{label}");
    std::io::stdout().flush()
}

/// Read stdin on a dedicated thread.
///
/// A blocking stdin read cannot be cancelled, so the thread is never joined:
/// it is left parked on its read when the session ends and dies with the
/// process.
fn spawn_stdin_reader() -> LineReceiver {
    let (tx, rx) = mpsc::channel(1);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Drive `work` to completion unless `interrupt` fires first.
async fn unless_interrupted<T, F>(
    work: impl Future<Output = T>,
    interrupt: Pin<&mut F>,
) -> Option<T>
where
    F: Future<Output = std::io::Result<()>>,
{
    tokio::select! {
        out = work => Some(out),
        _ = interrupt => None,
    }
}

/// Next stdin line, or `None` on EOF or Ctrl+C.
async fn read_line<F>(
    lines: &mut LineReceiver,
    interrupt: Pin<&mut F>,
) -> std::io::Result<Option<String>>
where
    F: Future<Output = std::io::Result<()>>,
{
    match unless_interrupted(lines.recv(), interrupt).await {
        Some(Some(line)) => line.map(Some),
        Some(None) => Ok(None),
        None => {
            println!();
            Ok(None)
        }
    }
}

/// Show the menu and run one choice. Returns `false` when the session should end.
async fn run_menu<F>(
    assistant: &Assistant,
    lines: &mut LineReceiver,
    mut interrupt: Pin<&mut F>,
) -> std::io::Result<bool>
where
    F: Future<Output = std::io::Result<()>>,
{
    print_menu();
    prompt("Elige una opción (1-5): ")?;
    let Some(line) = read_line(lines, interrupt.as_mut()).await? else {
        return Ok(false);
    };

    let Some(choice) = MenuChoice::parse(&line) else {
        println!("\nAsistente: Opción no válida.");
        return Ok(true);
    };
    let Some(tool) = choice.tool_name() else {
        return Ok(false);
    };
    match unless_interrupted(assistant.run_tool(tool), interrupt).await {
        Some(outcome) => {
            println!("\nAsistente: {}", outcome.message());
            Ok(true)
        }
        None => {
            println!();
            Ok(false)
        }
    }
}

pub async fn run(config_path: Option<&Path>) -> CommandResult {
    let config = load_config(config_path)?;
    let assistant = start_assistant(config).await?;
    let templates = assistant.config().response_templates.clone();

    println!("\n{}", templates.get("greeting"));
    println!("Escribe 'menu' para ver las opciones rápidas.");

    let mut state = assistant.new_session();
    let mut lines = spawn_stdin_reader();
    // One listener for the whole session, so a Ctrl+C between polls is not lost.
    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);

    loop {
        prompt("Tú: ")?;
        let Some(line) = read_line(&mut lines, interrupt.as_mut()).await? else {
            break;
        };
        let input = line.trim();

        if is_exit(input) {
            break;
        }
        if input.is_empty() {
            println!("\nAsistente: {}", templates.get("empty_input"));
            continue;
        }
        if input.eq_ignore_ascii_case("menu") {
            if run_menu(&assistant, &mut lines, interrupt.as_mut()).await? {
                continue;
            }
            break;
        }

        let turn = assistant.process_turn(&mut state, input);
        let Some(outcome) = unless_interrupted(turn, interrupt.as_mut()).await else {
            println!();
            break;
        };
        println!("\nAsistente: {}", outcome.message());
    }

    println!("\nAsistente: {}", templates.get("farewell"));
    Ok(())
}
