mod display;
mod pad;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::{thread_rng, SeedableRng};
use tracing_subscriber::EnvFilter;

use motion_shooter::config::Tunables;
use motion_shooter::game::{Game, GameStatus};

use display::Viewport;
use pad::{Autopilot, KeyLevels, KeyboardPad, Scripted};

const FRAME: Duration = Duration::from_millis(16); // ≈60 FPS
const HEADLESS_DT: f32 = 1.0 / 60.0;

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "motion_shooter")]
#[command(about = "Arcade shooter steered by body-pose signals, played here from the keyboard")]
struct Cli {
    /// JSON file of tunables; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write logs to this file during interactive play
    #[arg(long)]
    log: Option<PathBuf>,
    /// Run this many ticks with the autopilot and print the final HUD as JSON
    #[arg(long)]
    headless: Option<u64>,
    /// RNG seed for headless runs
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn load_tunables(path: Option<&PathBuf>) -> Result<Tunables> {
    let Some(path) = path else {
        return Ok(Tunables::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    Tunables::from_json(&text).with_context(|| format!("loading config {}", path.display()))
}

/// Logs go to stderr in headless mode.  Interactively stderr would tear up
/// the raw-mode screen, so logs only go to a file when `--log` is given.
fn init_tracing(cli: &Cli) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if cli.headless.is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else if let Some(path) = &cli.log {
        let file = File::create(path)
            .with_context(|| format!("creating log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
    Ok(())
}

// ── Headless run ──────────────────────────────────────────────────────────────

fn run_headless(tunables: Tunables, ticks: u64, seed: u64) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut game = Game::new(tunables, Box::new(Scripted))?;
    game.start()?;

    let signals = game.signals();
    let mut pilot = Autopilot::new();
    let mut played = 0;
    for tick in 0..ticks {
        pilot.drive(tick, HEADLESS_DT, &signals);
        game.tick(HEADLESS_DT, &mut rng)?;
        played = tick + 1;
        if game.status() == GameStatus::GameOver {
            break;
        }
    }

    tracing::info!(played, score = game.score(), "headless run finished");
    println!("{}", serde_json::to_string_pretty(&game.hud())?);
    Ok(())
}

// ── Interactive loop ──────────────────────────────────────────────────────────

/// Outcome of the title screen.
enum TitleResult {
    Start,
    Quit,
}

fn title_screen<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    view: &Viewport,
    error: Option<&str>,
) -> Result<TitleResult> {
    display::render_title(out, view, error)?;

    // Block until the user makes a choice
    loop {
        if let Ok(Event::Key(KeyEvent { code, kind, .. })) = rx.recv() {
            if kind != KeyEventKind::Press {
                continue;
            }
            match code {
                KeyCode::Enter | KeyCode::Char(' ') => return Ok(TitleResult::Start),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(TitleResult::Quit);
                }
                _ => {}
            }
        } else {
            return Ok(TitleResult::Quit);
        }
    }
}

/// Input model: `key_frame` records the frame number of the last
/// press/repeat event for every key.  Each frame the still-fresh keys are
/// folded into `KeyLevels` for the pad thread to sample.  One-shot UI keys
/// (quit, restart) are handled here directly.
fn game_loop<W: Write>(
    out: &mut W,
    game: &mut Game,
    rx: &mpsc::Receiver<Event>,
    levels: &Mutex<KeyLevels>,
) -> Result<()> {
    let mut rng = thread_rng();
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;
    let mut last = Instant::now();

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(Event::Key(KeyEvent {
            code,
            kind,
            modifiers,
            ..
        })) = rx.try_recv()
        {
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code, frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(());
                        }
                        KeyCode::Char('r') | KeyCode::Char('R')
                            if game.status() == GameStatus::GameOver =>
                        {
                            game.restart()?;
                            key_frame.clear();
                        }
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        *levels.lock().unwrap_or_else(|p| p.into_inner()) = KeyLevels::from_keys(&key_frame, frame);

        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32();
        last = now;
        game.tick(dt, &mut rng)?;

        let (cols, rows) = terminal::size()?;
        let view = Viewport::new(cols, rows, game.tunables().world);
        display::render(out, &view, &game.snapshot(&mut rng))?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>, tunables: Tunables) -> Result<()> {
    let (pad, levels) = KeyboardPad::new();
    let mut game = Game::new(tunables, Box::new(pad))?;
    let mut error: Option<String> = None;

    loop {
        let (cols, rows) = terminal::size()?;
        let view = Viewport::new(cols, rows, game.tunables().world);
        match title_screen(out, rx, &view, error.as_deref())? {
            TitleResult::Quit => break,
            TitleResult::Start => match game.start() {
                Ok(()) => {
                    game_loop(out, &mut game, rx, &levels)?;
                    break;
                }
                Err(err) => error = Some(err.to_string()),
            },
        }
    }

    game.shutdown();
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;
    let tunables = load_tunables(cli.config.as_ref())?;

    if let Some(ticks) = cli.headless {
        return run_headless(tunables, ticks, cli.seed);
    }

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode().context("enabling raw mode")?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Ghostty / kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = run(&mut out, &rx, tunables);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}
