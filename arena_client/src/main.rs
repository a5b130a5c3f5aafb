//! Standalone client binary.
//!
//! Usage:
//!   cargo run -p arena_client -- [--url ws://127.0.0.1:8080/ws/] [--name Player]
//!       [--width 800] [--height 600] [--fps 60] [--render-delay 70]
//!       [--settings settings.json] [--config client.json]
//!
//! The client connects to the server, joins the game, and runs a frame loop
//! that draws through a tracing renderer (`RUST_LOG=trace` to see draw calls).
//!
//! Console commands:
//!   +forward/-forward   Hold/release a movement key (also left, back, right, w/a/s/d)
//!   +attack/-attack     Hold/release fire
//!   aim <x> <y>         Move the mouse to screen coordinates
//!   size <w> <h>        Resize the viewport
//!   status              Show client status
//!   quit                Exit client

use std::env;
use std::io::{BufRead, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use arena_client::console::{parse_line, ConsoleCommand};
use arena_client::WsSession;
use arena_shared::config::{ArenaSettings, ClientConfig};
use arena_shared::render::TraceRenderer;
use tokio::sync::mpsc;
use tracing::{info, warn};

fn parse_args() -> anyhow::Result<ClientConfig> {
    let args: Vec<String> = env::args().collect();

    let mut cfg = match args.iter().position(|a| a == "--config") {
        Some(i) if i + 1 < args.len() => ClientConfig::load(Path::new(&args[i + 1]))?,
        _ => ClientConfig::default(),
    };

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match (args[i].as_str(), value) {
            ("--url", Some(v)) => cfg.server_url = v.clone(),
            ("--name", Some(v)) => cfg.username = v.clone(),
            ("--width", Some(v)) => cfg.screen_width = v.parse().context("--width")?,
            ("--height", Some(v)) => cfg.screen_height = v.parse().context("--height")?,
            ("--fps", Some(v)) => cfg.frame_hz = v.parse().context("--fps")?,
            ("--render-delay", Some(v)) => {
                cfg.render_delay_ms = v.parse().context("--render-delay")?;
            }
            ("--settings", Some(v)) => cfg.settings_path = Some(v.clone()),
            ("--config", Some(_)) => {}
            _ => {
                i += 1;
                continue;
            }
        }
        i += 2;
    }
    Ok(cfg)
}

fn load_arena(cfg: &ClientConfig) -> ArenaSettings {
    let Some(path) = cfg.settings_path.as_deref() else {
        return ArenaSettings::default();
    };
    match ArenaSettings::load(Path::new(path)) {
        Ok(settings) => settings,
        Err(e) => {
            warn!(error = %e, "Falling back to default arena settings");
            ArenaSettings::default()
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cfg = parse_args()?;
    let arena = load_arena(&cfg);
    info!(
        url = %cfg.server_url,
        fps = cfg.frame_hz,
        render_delay_ms = cfg.render_delay_ms,
        "Starting client"
    );

    let mut session = WsSession::connect(&cfg, arena).await.context("connect")?;

    // Set up console input channel.
    let (console_tx, mut console_rx) = mpsc::channel::<String>(32);

    // Spawn stdin reader thread.
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        loop {
            print!("] ");
            let _ = stdout.flush();
            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let line = line.trim().to_string();
            if !line.is_empty() && console_tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    println!("Client connected. Type 'status' for info, 'quit' to exit.");
    println!();

    let mut renderer = TraceRenderer;
    let mut ticker =
        tokio::time::interval(Duration::from_secs_f64(1.0 / cfg.frame_hz.max(1) as f64));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                session.frame(&mut renderer);
            }
            open = session.recv() => {
                if !open {
                    println!("Disconnected from server; showing last known state.");
                }
            }
            Some(line) = console_rx.recv() => {
                match parse_line(&line) {
                    Ok(Some(ConsoleCommand::Input(event))) => session.client.handle_input(event),
                    Ok(Some(ConsoleCommand::Resize { width, height })) => {
                        session.client.resize(width, height);
                    }
                    Ok(Some(ConsoleCommand::Status)) => {
                        for line in session.client.status_lines() {
                            println!("{}", line);
                        }
                    }
                    Ok(Some(ConsoleCommand::Quit)) => break,
                    Ok(None) => {}
                    Err(e) => println!("Error: {}", e),
                }
            }
        }
    }

    Ok(())
}
