//! Interactive play loop with paced output. Enter skips the current stream.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use colored::Colorize;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{cursor, execute};
use t96_core::{EngineConfig, SaveSnapshot};
use t96_engine::{CommandResult, InstantPacer, Pacer, RandomPacer, Session, SkipSignal, StreamingMode, pause, stream_lines};

use crate::render;

const MAX_DELAY: Duration = Duration::from_secs(4);
const COMMENTARY_GAP: Duration = Duration::from_millis(800);

/// Watches the keyboard for Enter while output streams.
struct EnterWatcher {
    done: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl EnterWatcher {
    fn spawn(skip: SkipSignal) -> Self {
        let done = Arc::new(AtomicBool::new(false));
        let stop = Arc::clone(&done);
        let handle = thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                match event::poll(Duration::from_millis(25)) {
                    Ok(true) => {
                        let enter = matches!(
                            event::read(),
                            Ok(Event::Key(key)) if key.code == KeyCode::Enter && key.kind == KeyEventKind::Press
                        );
                        if enter {
                            skip.trigger();
                        }
                    }
                    Ok(false) => {}
                    Err(_) => return,
                }
            }
        });
        Self { done, handle }
    }

    fn stop(self) {
        self.done.store(true, Ordering::Relaxed);
        self.handle.join().ok();
    }
}

struct Screen {
    pacer: Box<dyn Pacer>,
    instant: bool,
    interactive: bool,
}

impl Screen {
    fn new(config: &EngineConfig, seed: u32, interactive: bool) -> Self {
        let pacer: Box<dyn Pacer> = if config.instant_output {
            Box::new(InstantPacer)
        } else {
            Box::new(RandomPacer::new(seed, config.min_line_delay_ms, config.max_line_delay_ms))
        };
        Self {
            pacer,
            instant: config.instant_output,
            interactive,
        }
    }

    fn show(&mut self, result: &CommandResult) {
        if result.clear_history && self.interactive {
            execute!(io::stdout(), Clear(ClearType::All), cursor::MoveTo(0, 0)).ok();
        }

        let skip = SkipSignal::new();
        let watcher = (self.interactive && !self.instant).then(|| EnterWatcher::spawn(skip.clone()));

        if let Some(ms) = result.delay_ms.filter(|_| !self.instant) {
            pause(Duration::from_millis(ms).min(MAX_DELAY), &skip);
        }
        let mode = result.streaming_mode.unwrap_or(StreamingMode::Normal);
        stream_lines(&result.output, mode, self.pacer.as_mut(), &skip, |line| {
            println!("{}", render::styled(line));
        });
        if let Some(image) = &result.image {
            println!("{}", render::media("IMAGE", image));
        }
        if let Some(video) = &result.video {
            println!("{}", render::media("VIDEO", video));
        }
        if !result.pending_ufo74.is_empty() {
            if !self.instant {
                pause(COMMENTARY_GAP, &skip);
            }
            stream_lines(&result.pending_ufo74, mode, self.pacer.as_mut(), &skip, |line| {
                println!("{}", render::styled(line));
            });
        }

        if let Some(watcher) = watcher {
            watcher.stop();
        }
    }
}

enum Flow {
    Continue,
    Quit,
}

fn meta_command(command: &str, session: &mut Session) -> Flow {
    let mut words = command.split_whitespace();
    let verb = words.next().unwrap_or("");
    let name = words.next();
    match (verb, name) {
        ("q" | "quit", _) => return Flow::Quit,
        ("save", Some(name)) => match session.save_slot(name) {
            Ok(()) => println!("  {} {name}", "saved slot".dimmed()),
            Err(e) => println!("  {}", e.to_string().red()),
        },
        ("load", Some(name)) => match session.load_slot(name) {
            Ok(()) => println!("  {} {name}", "restored slot".dimmed()),
            Err(e) => println!("  {}", e.to_string().red()),
        },
        ("delete", Some(name)) => {
            if let Err(e) = session.delete_slot(name) {
                println!("  {}", e.to_string().red());
            }
        }
        ("slots", _) => {
            let mut any = false;
            for (name, snapshot) in session.slots() {
                any = true;
                println!("  {:<16} {}", name.bold(), snapshot.saved_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed());
            }
            if !any {
                println!("  {}", "no save slots".dimmed());
            }
        }
        _ => {
            println!("  {}", "host commands:".bold());
            println!("    :save <slot>   :load <slot>   :delete <slot>   :slots   :quit");
        }
    }
    Flow::Continue
}

fn write_save(session: &Session, path: Option<&Path>) {
    match path {
        Some(path) => match session.write_save(path) {
            Ok(()) => println!("  {} {}", "session written to".dimmed(), path.display()),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "save_failed");
                println!("  {}", e.to_string().red());
            }
        },
        None => println!("  {}", "no save file configured (start with --save <file>)".dimmed()),
    }
}

fn prompt(session: &Session) -> io::Result<()> {
    let mut out = io::stdout();
    write!(out, "{}> ", session.state().current_path.bold())?;
    out.flush()
}

/// Play until the run ends, input closes or `:quit`.
pub fn run(config: EngineConfig, load: Option<&Path>, save: Option<&Path>) -> Result<(), String> {
    let mut session = match load {
        Some(path) => {
            let snapshot = SaveSnapshot::read_from(path).map_err(|e| format!("{}: {e}", path.display()))?;
            Session::from_snapshot(config.clone(), snapshot)
        }
        None => Session::new(config.clone()),
    };
    let interactive = io::stdin().is_terminal();
    let mut screen = Screen::new(&config, session.state().seed, interactive);
    tracing::info!(seed = session.state().seed, interactive, resumed = load.is_some(), "play_started");

    let boot = session.start();
    screen.show(&boot);
    if let Some(path) = load {
        println!("  {} {}", "resumed from".dimmed(), path.display());
    }

    for line in io::stdin().lock().lines() {
        let line = line.map_err(|e| format!("input error: {e}"))?;
        if let Some(meta) = line.trim().strip_prefix(':') {
            match meta_command(meta, &mut session) {
                Flow::Quit => break,
                Flow::Continue => {
                    prompt(&session).map_err(|e| e.to_string())?;
                    continue;
                }
            }
        }

        let result = if line.ends_with('\t') {
            session.submit_tab(line.trim_end())
        } else {
            session.submit(&line)
        };
        screen.show(&result);

        if session.take_save_request() {
            write_save(&session, save);
        }
        if session.is_over() {
            let reason = session.state().game_over_reason.clone().unwrap_or_default();
            println!();
            println!("  {} {}", "session ended:".red().bold(), reason);
            break;
        }
        prompt(&session).map_err(|e| e.to_string())?;
    }

    let state = session.state();
    tracing::info!(
        commands = state.session_command_count,
        detection = state.detection_level,
        game_over = state.is_game_over,
        "play_finished"
    );
    if let Some(path) = save {
        session.write_save(path).map_err(|e| e.to_string())?;
    }
    Ok(())
}
