#![forbid(unsafe_code)]

//! twindiff - live side-by-side text comparison editor.
//!
//! Two editable panes; differences are classified per line and segment
//! and re-highlighted as you type, debounced so computation never blocks
//! input.

mod app;
mod cli;
mod session;
mod ui;

use std::fs;
use std::io;
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Duration;

use crossterm::event;
use tracing_subscriber::EnvFilter;
use twindiff_runtime::SchedulerConfig;

use crate::app::App;
use crate::cli::Opts;
use crate::session::TerminalSession;

fn main() -> ExitCode {
    let opts = Opts::parse();
    if let Err(err) = run(&opts) {
        eprintln!("twindiff: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run(opts: &Opts) -> io::Result<()> {
    init_tracing(opts)?;

    let left_text = match &opts.left_file {
        Some(path) => fs::read_to_string(path)?,
        None => String::new(),
    };
    let right_text = match &opts.right_file {
        Some(path) => fs::read_to_string(path)?,
        None => String::new(),
    };

    let cfg = SchedulerConfig::default()
        .with_typing_debounce(Duration::from_millis(opts.typing_debounce_ms))
        .with_paste_debounce(Duration::from_millis(opts.paste_debounce_ms))
        .with_large_input_lines(opts.large_input_lines);

    let mut session = TerminalSession::enter()?;
    let mut app = App::new(cfg, &left_text, &right_text);
    let mut stdout = io::stdout();

    loop {
        let (_, height) = crossterm::terminal::size()?;
        app.ensure_caret_visible(usize::from(height.saturating_sub(1)));
        ui::draw(&mut stdout, &app)?;

        if event::poll(Duration::from_millis(33))? {
            let ev = event::read()?;
            app.handle_event(&ev);
        }
        app.drain_results();

        if app.should_quit() {
            break;
        }
    }

    session.leave()
}

/// Route tracing to a file when asked; the terminal belongs to the UI.
fn init_tracing(opts: &Opts) -> io::Result<()> {
    let Some(path) = &opts.log_file else {
        return Ok(());
    };
    let file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    tracing::info!("twindiff started");
    Ok(())
}
