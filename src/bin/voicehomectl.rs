//! voicehomectl: manual control surface for voicehome-daemon

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::UnixStream;
use tracing_subscriber::EnvFilter;

use voicehome::ipc::{read_message, send_message, DaemonStatus, Request, Response};
use voicehome::Config;

/// Control the voice home daemon
#[derive(Parser)]
#[command(name = "voicehomectl", version, about)]
struct Cli {
    /// Daemon socket path (defaults to the daemon's configured socket)
    #[arg(long, env = "VOICEHOME_SOCKET")]
    socket: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Toggle the light
    Light,
    /// Toggle the music
    Music,
    /// Trigger the emergency countdown
    Emergency,
    /// Show device and emergency status
    Status,
    /// Check that the daemon is reachable
    Ping,
    /// Print engine events as they happen
    Watch,
}

impl Command {
    fn request(&self) -> Request {
        match self {
            Command::Light => Request::ToggleLight,
            Command::Music => Request::ToggleMusic,
            Command::Emergency => Request::TriggerEmergency,
            Command::Status => Request::GetStatus,
            Command::Ping => Request::Ping,
            Command::Watch => Request::Subscribe,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let socket_path = match cli.socket {
        Some(path) => path,
        None => Config::load()?.socket_path,
    };

    let mut stream = UnixStream::connect(&socket_path)
        .await
        .with_context(|| format!("failed to connect to {}", socket_path.display()))?;

    send_message(&mut stream, &cli.command.request()).await?;
    let response: Response = read_message(&mut stream)
        .await?
        .context("daemon closed the connection")?;

    match response {
        Response::Pong => println!("pong"),
        Response::Accepted { command } => println!("accepted: {:?}", command),
        Response::Status(status) => print_status(&status),
        Response::Subscribed => watch(&mut stream).await?,
        Response::Event { event } => println!("{}", event),
        Response::Error { code, message } => bail!("{}: {}", code, message),
    }

    Ok(())
}

async fn watch(stream: &mut UnixStream) -> Result<()> {
    while let Some(response) = read_message::<_, Response>(stream).await? {
        if let Response::Event { event } = response {
            println!("{}", event);
        }
    }
    Ok(())
}

fn print_status(status: &DaemonStatus) {
    let on_off = |on: bool| if on { "ON" } else { "OFF" };

    println!("voicehome-daemon {} (up {}s)", status.version, status.uptime_secs);
    println!("  light:     {}", on_off(status.devices.light));
    println!("  fan:       {}", on_off(status.devices.fan));
    println!("  music:     {}", on_off(status.devices.music));
    println!("  playing:   {}", status.now_playing);
    println!("  emergency: {}", status.emergency);
    println!("  emotion:   {}", status.emotion);
    println!("  voice:     {}", if status.listening { "listening" } else { "off" });
    println!("  display:   {}", status.display);
}
