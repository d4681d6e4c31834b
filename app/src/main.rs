mod dispatch;
mod hotkeys;

use anyhow::Context;
use dispatch::Dispatcher;
use hotkeys::{HotkeyAction, HotkeyMatcher};
use mousemacro_core::{config_path, load_config, SessionController};
use mousemacro_platform::{set_dpi_aware, start_input_hook, EnigoDriver, SystemDisplay};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// How long shutdown waits for the playback thread to finish its current event.
const PLAYBACK_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "mousemacro=info,mousemacro_core=info,mousemacro_platform=info".into()
            }),
        )
        .try_init();
}

fn print_help(hotkeys: &HotkeyMatcher) {
    let describe = |action| {
        hotkeys
            .chords_for(action)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" / ")
    };

    println!("mousemacro: record mouse clicks and scrolls, then replay them in a loop.");
    println!("  {:<16} start/stop recording", describe(HotkeyAction::ToggleRecording));
    println!("  {:<16} start/stop playback", describe(HotkeyAction::TogglePlayback));
    println!("  {:<16} quit", describe(HotkeyAction::Quit));
    println!("Config file: {}", config_path().display());
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let config = load_config();

    // Must run before any geometry query so coordinates are physical pixels.
    set_dpi_aware();

    let hotkeys = HotkeyMatcher::from_config(&config.hotkeys).context("invalid hotkey in config")?;
    print_help(&hotkeys);

    let geometry = Arc::new(SystemDisplay::new(config.display.fallback_rect()));
    let driver = Arc::new(EnigoDriver::new().context("failed to initialize pointer output")?);
    let session = Arc::new(
        SessionController::new(geometry, driver).with_timing(config.playback.timing()),
    );

    let hook = start_input_hook().context("failed to start global input listener")?;
    info!("Input listener started");

    let mut dispatcher = Dispatcher::new(session.clone(), hotkeys);

    let hook_stopper = hook.stopper();
    session.on_quit(move || hook_stopper.stop());
    let dispatch_stopper = dispatcher.stopper();
    session.on_quit(move || dispatch_stopper.stop());

    dispatcher.run(&hook);

    // The loop also ends when the hook disconnects; make sure playback stops then too.
    if !session.is_quit_requested() {
        session.quit();
    }
    if !session.wait_playback_stopped(PLAYBACK_DRAIN_TIMEOUT) {
        warn!("Playback did not stop within {:?}", PLAYBACK_DRAIN_TIMEOUT);
    }

    info!("Exited");
    Ok(())
}
