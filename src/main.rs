mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::thread_rng;
use tracing::{info, warn};

use dungeon_crawler::assets::SpriteSet;
use dungeon_crawler::compute::{InputFrame, MoveKeys};
use dungeon_crawler::config::GameConfig;
use dungeon_crawler::controller::{GameOverChoice, Run, Screen};
use dungeon_crawler::entities::ShootDirection;
use dungeon_crawler::error::GameError;
use dungeon_crawler::logging;
use dungeon_crawler::shop::ShopItem;

const SPRITES_PATH: &str = "assets/sprites.ron";

// ── Held-key tracking ─────────────────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// at 60 FPS, 8 frames (≈133 ms) outlasts the OS key-repeat interval.
const HOLD_WINDOW: u64 = 8;

/// Returns true if any of `keys` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|key| {
        key_frame
            .get(key)
            .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
            .unwrap_or(false)
    })
}

fn held_movement(key_frame: &HashMap<KeyCode, u64>, frame: u64) -> MoveKeys {
    MoveKeys {
        up: is_held(key_frame, &[KeyCode::Char('w'), KeyCode::Char('W')], frame),
        down: is_held(key_frame, &[KeyCode::Char('s'), KeyCode::Char('S')], frame),
        left: is_held(key_frame, &[KeyCode::Char('a'), KeyCode::Char('A')], frame),
        right: is_held(key_frame, &[KeyCode::Char('d'), KeyCode::Char('D')], frame),
    }
}

fn shoot_direction(code: KeyCode) -> Option<ShootDirection> {
    match code {
        KeyCode::Up => Some(ShootDirection::Up),
        KeyCode::Down => Some(ShootDirection::Down),
        KeyCode::Left => Some(ShootDirection::Left),
        KeyCode::Right => Some(ShootDirection::Right),
        _ => None,
    }
}

fn is_quit(code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Esc => true,
        KeyCode::Char('c') => modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

// ── Frame loop ────────────────────────────────────────────────────────────────

/// Drives the run state machine until it reaches `Screen::Quit`.
///
/// Input model: key-down events for arrows, shop and game-over keys are
/// handled as discrete commands for the current screen.  Movement keys are
/// tracked in a `key_frame` map of the last frame each key was seen; a key
/// counts as held while it is fresh, or until a release event arrives on
/// terminals that report them.
fn game_loop<W: Write>(
    out: &mut W,
    run: &mut Run,
    rx: &mpsc::Receiver<Event>,
    sprites: &SpriteSet,
) -> std::io::Result<()> {
    let mut rng = thread_rng();
    let clock = Instant::now();
    let frame_time = Duration::from_millis(run.config.frame_ms);

    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;

    while run.screen != Screen::Quit {
        let frame_start = Instant::now();
        let now = clock.elapsed().as_millis() as u64;
        frame += 1;

        let mut shots = Vec::new();

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code, frame);
                    if is_quit(code, modifiers) {
                        run.quit();
                        break;
                    }
                    match run.screen {
                        Screen::Playing => {
                            if let Some(dir) = shoot_direction(code) {
                                shots.push(dir);
                            } else if matches!(code, KeyCode::Char('q') | KeyCode::Char('Q')) {
                                run.quit();
                            }
                        }
                        Screen::Shop => {
                            let item = match code {
                                KeyCode::Char('1') => Some(ShopItem::Multishot),
                                KeyCode::Char('2') => Some(ShopItem::Homing),
                                KeyCode::Char('3') => Some(ShopItem::Health),
                                KeyCode::Enter => {
                                    run.leave_shop(now, &mut rng);
                                    None
                                }
                                _ => None,
                            };
                            if let Some(item) = item {
                                if let Err(err) = run.buy(item) {
                                    info!(?item, %err, "purchase rejected");
                                }
                            }
                        }
                        Screen::GameOver => match code {
                            KeyCode::Char('r') | KeyCode::Char('R') => {
                                run.game_over(GameOverChoice::Restart, now, &mut rng)
                            }
                            KeyCode::Char('q') | KeyCode::Char('Q') => {
                                run.game_over(GameOverChoice::Quit, now, &mut rng)
                            }
                            _ => {}
                        },
                        Screen::Quit => {}
                    }
                }
                // Repeat: refresh timestamp so key stays "held"
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                // Release: remove key immediately (keyboard-enhancement path)
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        match run.screen {
            Screen::Playing => {
                let input = InputFrame {
                    movement: held_movement(&key_frame, frame),
                    shots,
                };
                run.frame(&input, now, &mut rng);
            }
            Screen::Shop | Screen::GameOver | Screen::Quit => {}
        }

        match run.screen {
            Screen::Playing => display::render_level(out, run, sprites)?,
            Screen::Shop => display::render_shop(out, run)?,
            Screen::GameOver => display::render_game_over(out, run)?,
            Screen::Quit => break,
        }

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            std::thread::sleep(frame_time - elapsed);
        }
    }
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn load_config(arg: Option<PathBuf>) -> Result<GameConfig, GameError> {
    match arg {
        Some(path) => {
            let config = GameConfig::load(&path)?;
            info!(path = %path.display(), "config loaded");
            Ok(config)
        }
        None => Ok(GameConfig::default()),
    }
}

fn main() -> Result<(), GameError> {
    let log_path = logging::default_log_path();
    if let Err(err) = logging::init_file_logging(&log_path) {
        eprintln!("logging disabled: {}: {}", log_path.display(), err);
    }

    // Fail on a bad config before touching the terminal.
    let config = load_config(std::env::args_os().nth(1).map(PathBuf::from))?;
    let sprites = SpriteSet::load(Path::new(SPRITES_PATH));

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();
    if !keyboard_enhanced {
        warn!("terminal does not report key releases, using hold window");
    }

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let mut run = Run::new(config, 0, &mut thread_rng());
    let result = game_loop(&mut out, &mut run, &rx, &sprites);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    info!(level = run.level_reached(), "exiting");
    result.map_err(GameError::from)
}
