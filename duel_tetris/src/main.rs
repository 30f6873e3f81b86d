use anyhow::{Context, Result};
use clap::Parser;
use console::{Key, Term};
use duel_arena::{DuelSession, DuelView, MatchState, SessionCommand, StepResult};
use duel_tetris::config::{DEFAULT_PORT, GameConfig, is_registered_port, parse_port};
use duel_tetris::keymap::controls_help;
use duel_tetris::{
    Action, AnsiTermStyle, DuelScreen, KeyCommand, PlainTermStyle, TermRender, TermStyle,
    TetrisEngine, map_key,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::net::{TcpListener, TcpStream};

/// duel_tetris - two-player falling-block duel over TCP
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Wait for the opponent to connect instead of connecting to them
    #[arg(short, long)]
    listen: bool,

    /// Opponent's address, or the address to listen on
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// TCP port (1024-65535)
    #[arg(short, long, default_value_t = DEFAULT_PORT, value_parser = parse_port)]
    port: u16,

    /// Player name shown to the opponent
    #[arg(short, long)]
    name: Option<String>,

    /// Path to a JSON game config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Draw without colours
    #[arg(long)]
    plain: bool,

    /// Write debug logs to this file instead of warnings to stderr
    #[arg(long)]
    log: Option<PathBuf>,
}

const RENDER_INTERVAL: Duration = Duration::from_millis(50); // 20 FPS

#[tokio::main(flavor = "multi_thread", worker_threads = 1)]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    init_logging(args.log.as_deref())?;

    if is_registered_port(args.port) {
        tracing::warn!("Port {} is in the registered range 1024-49151", args.port);
    }

    let mut config = match &args.config {
        Some(path) => GameConfig::from_file(path)?,
        None => GameConfig::default(),
    };
    if let Some(name) = args.name.clone() {
        config.session.player_name = Some(name);
    }
    config.validate()?;

    let stream = tokio::select! {
        stream = connect(&args) => stream?,
        _ = tokio::signal::ctrl_c() => {
            println!("Interrupted!");
            return Ok(ExitCode::FAILURE);
        }
    };

    let engine = TetrisEngine::new(config.gravity_ticks);
    let mut session = DuelSession::new(config.session.clone(), engine, stream)?;

    // Ctrl-C from the runtime side, also while waiting for the opponent's Hello
    let signal_sender = session.sender();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = signal_sender.send(SessionCommand::Interrupt);
        }
    });

    session
        .handshake()
        .await
        .context("Handshake with opponent failed")?;
    if session.state().is_interrupted() {
        session.shutdown().await;
        println!("{}", session.state());
        return Ok(ExitCode::FAILURE);
    }
    tracing::info!(
        "Playing as '{}' against '{}'",
        session.id(),
        session.peer_name().unwrap_or_default()
    );

    let term = Term::stdout();
    term.clear_screen()?;
    term.hide_cursor()?;

    let finished = Arc::new(AtomicBool::new(false));
    let keyboard = spawn_keyboard(session.sender(), finished.clone());

    let outcome = play(&mut session, &term, args.plain).await;
    finished.store(true, Ordering::Release);
    session.shutdown().await;

    let state = match outcome {
        Ok(state) => state,
        Err(e) => {
            term.show_cursor()?;
            return Err(e);
        }
    };

    tracing::info!("Link stats: {}", session.stats());

    // The keyboard thread leaves after the next key press, restoring the terminal
    if !keyboard.is_finished() {
        term.write_line("")?;
        term.write_line("Press any key to exit")?;
        let _ = tokio::task::spawn_blocking(move || keyboard.join()).await;
    }
    term.show_cursor()?;

    Ok(if state.is_interrupted() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn init_logging(log: Option<&Path>) -> Result<()> {
    match log {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_max_level(tracing::Level::DEBUG)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_max_level(tracing::Level::WARN)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

async fn connect(args: &Args) -> Result<TcpStream> {
    let addr = format!("{}:{}", args.host, args.port);
    let stream = if args.listen {
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to listen on {}", addr))?;
        println!("Waiting for opponent on {} ...", addr);
        let (stream, peer) = listener.accept().await.context("Failed to accept")?;
        tracing::info!("Opponent connected from {}", peer);
        stream
    } else {
        println!("Connecting to {} ...", addr);
        TcpStream::connect(&addr)
            .await
            .with_context(|| format!("Failed to connect to {}", addr))?
    };
    stream.set_nodelay(true)?;
    Ok(stream)
}

/// Read keys on a plain thread; `read_key` blocks and cannot be cancelled
fn spawn_keyboard(
    commands: flume::Sender<SessionCommand<Action>>,
    finished: Arc<AtomicBool>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let term = Term::stdout();
        loop {
            let key = match term.read_key() {
                Ok(key) => key,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => Key::CtrlC,
                Err(e) => {
                    tracing::debug!("Keyboard closed: {}", e);
                    break;
                }
            };
            if finished.load(Ordering::Acquire) {
                break;
            }
            let command = match map_key(&key) {
                Some(KeyCommand::Action(action)) => SessionCommand::Action(action),
                Some(KeyCommand::Interrupt) => SessionCommand::Interrupt,
                None => continue,
            };
            if commands.send(command).is_err() {
                break;
            }
        }
    })
}

/// Run the match to its end, redrawing at most every `RENDER_INTERVAL`
async fn play(
    session: &mut DuelSession<TetrisEngine, TcpStream>,
    term: &Term,
    plain: bool,
) -> Result<MatchState> {
    let mut last_render: Option<Instant> = None;
    loop {
        let result = session.step().await?;
        let due = last_render.is_none_or(|at| at.elapsed() >= RENDER_INTERVAL);
        if due || result != StepResult::Running {
            let view = session.view();
            if plain {
                draw(term, &view, &PlainTermStyle)?;
            } else {
                draw(term, &view, &AnsiTermStyle)?;
            }
            last_render = Some(Instant::now());
        }
        if let StepResult::Finished(state) = result {
            return Ok(state);
        }
    }
}

fn draw(term: &Term, view: &DuelView, style: &impl TermStyle) -> Result<()> {
    let lines = DuelScreen::new(view).render(style);
    term.move_cursor_to(0, 0)?;
    for line in lines {
        term.write_line(&line)?;
    }
    term.write_line("")?;
    for line in controls_help() {
        term.write_line(&line)?;
    }
    term.flush()?;
    Ok(())
}
