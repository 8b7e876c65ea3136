//! Interactive console for a local agent session.
//!
//! Every line goes through the universal input path. Slash commands
//! (`/mode phantom`, `/crash`, `/journey carbon-audit`, ...) act directly;
//! plain text is classified and may raise a suggestion. `/quit` exits.
//!
//! The first argument, when given, is a YAML config file.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use adaptive_agent_core::interfaces::{open_store, LogNotifier};
use adaptive_agent_core::utilities::printer::{ColoredText, Printer, PrinterColor};
use adaptive_agent_core::{AgentCore, CoreConfig};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = CoreConfig::load(config_path.as_deref())?;
    let store = open_store(&config.storage)?;
    let mut core = AgentCore::open(config, store, Arc::new(LogNotifier));
    let printer = Printer::new();

    print_prompt_header(&printer, &core);
    let mut last_seen = core.logs().entries().last().map(|e| e.id.clone());
    let mut last_tick = Instant::now();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if matches!(line.trim(), "/quit" | "/exit") {
            break;
        }

        let now = Instant::now();
        core.advance(now.duration_since(last_tick));
        last_tick = now;

        let outcome = core.process_universal_input(&line, None);
        last_seen = print_new_entries(&printer, &core, last_seen);

        if let Some(mode) = outcome.suggestion {
            printer.print(
                &format!("Suggestion: switch to {} mode (/confirm or /dismiss)", mode),
                PrinterColor::BoldCyan,
            );
        }
        print_prompt_header(&printer, &core);
    }

    core.settle();
    print_new_entries(&printer, &core, last_seen);
    Ok(())
}

fn print_prompt_header(printer: &Printer, core: &AgentCore) {
    let persona = core.active_persona();
    printer.print_colored(&[
        ColoredText::new(format!("[{}]", persona.name), PrinterColor::for_color_tag(&persona.color_tag)),
        ColoredText::new(format!(" {} · Lv {} ", core.health(), core.agent_level().level), PrinterColor::White),
    ]);
    print!("> ");
    let _ = io::stdout().flush();
}

/// Print entries newer than `last_seen` and return the new high-water mark.
fn print_new_entries(printer: &Printer, core: &AgentCore, last_seen: Option<String>) -> Option<String> {
    let entries = core.logs().entries();
    let start = last_seen
        .as_deref()
        .and_then(|id| entries.iter().position(|e| e.id == id))
        .map_or(0, |i| i + 1);
    for entry in &entries[start..] {
        printer.print_colored(&[
            ColoredText::new(format!("{:<13}", entry.source.as_str()), PrinterColor::Purple),
            ColoredText::new(entry.message.clone(), PrinterColor::for_log_type(entry.log_type)),
        ]);
    }
    entries.last().map(|e| e.id.clone())
}
