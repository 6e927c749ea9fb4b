// Prevents additional console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod commands;
mod panel;

use clap::Parser;
use panel::{Panel, PanelKind, PanelState};
use pinlab_core::{DriverBackend, LabConfig};
use pinlab_gpio::{describe, open_driver};
use std::path::PathBuf;
use tauri::{AppHandle, Manager, Runtime};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pinlab-desktop")]
#[command(about = "LED selector and PWM dimmer panels", long_about = None)]
struct Args {
    /// Which panel to show
    #[arg(long, value_enum, default_value_t = PanelKind::Selector)]
    panel: PanelKind,

    /// Configuration file path (defaults to ./pinlab.toml when present)
    #[arg(short, long, env = "PINLAB_CONFIG")]
    config: Option<PathBuf>,

    /// Use the simulated board instead of real GPIO
    #[arg(long)]
    simulate: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "pinlab_desktop=info,pinlab_core=info,pinlab_gpio=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = LabConfig::load(args.config.as_deref())?;
    if args.simulate {
        config.gpio.backend = DriverBackend::Simulated;
    }
    tracing::info!("Pin driver: {}", describe(config.gpio.backend));

    let driver = open_driver(config.gpio.backend)?;
    let panel = Panel::open(args.panel, driver, &config)?;
    let title = args.panel.title();

    let app = tauri::Builder::default()
        .manage(PanelState::new(panel))
        .setup(move |app| {
            if let Some(window) = app.get_webview_window("main") {
                window.set_title(title)?;
            }
            Ok(())
        })
        .on_window_event(|window, event| {
            if let tauri::WindowEvent::CloseRequested { .. } = event {
                release_panel(window.app_handle());
            }
        })
        .invoke_handler(tauri::generate_handler![
            commands::get_panel,
            commands::select_led,
            commands::set_duty,
            commands::exit_app,
        ])
        .build(tauri::generate_context!())?;

    app.run(|app, event| {
        if let tauri::RunEvent::Exit = event {
            release_panel(app);
        }
    });

    Ok(())
}

/// Turn the LEDs off and release the pins; later calls do nothing
fn release_panel<R: Runtime>(app: &AppHandle<R>) {
    let state = app.state::<PanelState>();
    if let Err(e) = state.shutdown() {
        tracing::error!(error = %e, "Failed to release pins on exit");
    }
}
