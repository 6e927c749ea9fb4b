/// Pinlab - GPIO exercises from the command line
use clap::{Parser, Subcommand};
use pinlab_cli::{run_blink, run_voice, shutdown_signal, MicrophonePhrases, TypedPhrases};
use pinlab_core::{Blinker, DriverBackend, LabConfig, LightSwitch, PhraseSource, PinId};
use pinlab_gpio::{describe, open_driver};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pinlab")]
#[command(about = "Raspberry Pi GPIO exercises", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./pinlab.toml when present)
    #[arg(short, long, global = true, env = "PINLAB_CONFIG")]
    config: Option<PathBuf>,

    /// Use the simulated board instead of real GPIO
    #[arg(long, global = true)]
    simulate: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Blink one LED until interrupted
    Blink {
        /// BCM pin number
        #[arg(short, long)]
        pin: Option<u8>,
        /// Time the LED stays on (and off), in milliseconds
        #[arg(short, long)]
        interval_ms: Option<u64>,
        /// Stop after this many on/off cycles
        #[arg(long)]
        cycles: Option<u64>,
    },
    /// Switch an LED with spoken "turn on" / "turn off" commands
    Voice {
        /// BCM pin number
        #[arg(short, long)]
        pin: Option<u8>,
        /// Read commands from stdin instead of the microphone
        #[arg(long)]
        typed: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "pinlab=info,pinlab_cli=info,pinlab_core=info,pinlab_gpio=info,pinlab_audio=info,pinlab_speech=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = LabConfig::load(cli.config.as_deref())?;
    if cli.simulate {
        config.gpio.backend = DriverBackend::Simulated;
    }
    tracing::info!("Pin driver: {}", describe(config.gpio.backend));

    match cli.command {
        Commands::Blink {
            pin,
            interval_ms,
            cycles,
        } => {
            blink(&config, pin, interval_ms, cycles).await?;
        }
        Commands::Voice { pin, typed } => {
            voice(&config, pin, typed).await?;
        }
    }

    Ok(())
}

async fn blink(
    config: &LabConfig,
    pin: Option<u8>,
    interval_ms: Option<u64>,
    cycles: Option<u64>,
) -> anyhow::Result<()> {
    let pin = pin.map_or(config.blink.pin, PinId::new);
    let half_period = interval_ms.map_or_else(|| config.blink.half_period(), Duration::from_millis);

    let driver = open_driver(config.gpio.backend)?;
    let mut blinker = Blinker::new(driver, pin, half_period)?;

    let result = run_blink(&mut blinker, cycles, shutdown_signal()).await;
    let released = blinker.release();

    let completed = result?;
    released?;

    tracing::info!(cycles = completed, "Blink finished, pins released");
    Ok(())
}

async fn voice(config: &LabConfig, pin: Option<u8>, typed: bool) -> anyhow::Result<()> {
    let pin = pin.map_or(config.voice.pin, PinId::new);

    // Open the input side first so a missing microphone or API key fails
    // before any pin is claimed
    let mut source: Box<dyn PhraseSource> = if typed {
        Box::new(TypedPhrases::stdin())
    } else {
        Box::new(MicrophonePhrases::from_config(config)?)
    };

    let driver = open_driver(config.gpio.backend)?;
    let mut switch = LightSwitch::new(driver, pin)?;

    tracing::info!(pin = %pin, "Voice control ready, press Ctrl+C to stop");

    let result = run_voice(
        &mut switch,
        source.as_mut(),
        config.voice.pause_after_command(),
        shutdown_signal(),
    )
    .await;
    let released = switch.release();

    let summary = result?;
    released?;

    tracing::info!(
        phrases = summary.phrases,
        switched = summary.switched,
        "Voice control finished, pins released"
    );
    Ok(())
}
