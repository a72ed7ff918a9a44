use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image_autoclicker::autoclick::{
    ClickEngine, ClickerCommand, ClickerEvent, ClickerState, ClickerStats, create_clicker_channels,
};
use image_autoclicker::capture::{ScreenGrabber, XcapGrabber, primary_monitor};
use image_autoclicker::click::EnigoClicker;
use image_autoclicker::settings::Settings;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    // Defaults
    let mut mode: Option<&str> = None; // None => run the click loop
    let mut settings_path = PathBuf::from("settings.json");

    // Parse all flags (skip program name)
    for arg in args.iter().skip(1) {
        if arg == "--help" || arg == "-h" {
            print_help();
            return;
        } else if arg == "--version" || arg == "-v" {
            println!("Image Autoclicker v{}", env!("APP_VERSION_DISPLAY"));
            return;
        } else if arg == "--list-monitors" || arg == "-m" {
            mode = Some("monitors");
        } else if let Some(rest) = arg.strip_prefix("--settings=") {
            settings_path = PathBuf::from(rest);
        } else {
            println!("❌ Unknown argument: {}", arg);
            print_help();
            return;
        }
    }

    match mode {
        Some("monitors") => list_monitors(),
        None => run_clicker(&settings_path),
        _ => unreachable!(),
    }
}

fn list_monitors() {
    let grabber = XcapGrabber::new();
    match grabber.monitors() {
        Ok(monitors) if !monitors.is_empty() => {
            let primary = primary_monitor(&monitors).copied();
            for m in &monitors {
                let tag = if Some(*m) == primary { " (primary)" } else { "" };
                println!(
                    "🖥️  Monitor {}: {}x{} at ({}, {}){tag}",
                    m.index, m.width, m.height, m.left, m.top
                );
            }
        }
        Ok(_) => println!("❌ No monitors found"),
        Err(e) => println!("❌ {e}"),
    }
}

fn run_clicker(settings_path: &Path) {
    let settings = Settings::load(settings_path);
    if settings.image_paths.is_empty() {
        println!(
            "❌ No template images configured in '{}'",
            settings_path.display()
        );
        println!("   Add image paths to \"image_paths\" and try again.");
        return;
    }

    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(async move {
        let clicker = match EnigoClicker::new() {
            Ok(clicker) => clicker,
            Err(e) => {
                println!("❌ {e}");
                return;
            }
        };

        let (cmd_tx, cmd_rx, event_tx, mut event_rx) = create_clicker_channels();
        let stats = Arc::new(ClickerStats::default());
        let mut engine = ClickEngine::new(
            XcapGrabber::new(),
            clicker,
            cmd_rx,
            event_tx,
            stats.clone(),
        );
        let worker = tokio::spawn(async move { engine.run().await });

        let session = settings.session();
        println!(
            "🚀 Starting click loop with {} image(s)...",
            session.images.len()
        );
        if cmd_tx
            .send(ClickerCommand::Start(Box::new(session)))
            .await
            .is_err()
        {
            println!("❌ Click engine unavailable");
            return;
        }

        let ctrl_c_tx = cmd_tx.clone();
        let ctrl_c_stats = stats.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                println!("🛑 Stop requested...");
                ctrl_c_stats.request_stop();
                let _ = ctrl_c_tx.send(ClickerCommand::Stop).await;
            }
        });

        let mut started = false;
        while let Some(event) = event_rx.recv().await {
            match event {
                ClickerEvent::StateChanged(ClickerState::Running) => {
                    started = true;
                    println!("▶️  Click loop running (Ctrl-C to stop)");
                }
                ClickerEvent::StateChanged(ClickerState::Stopped) => {
                    println!(
                        "⏹️  Click loop stopped, total clicks: {}",
                        stats.total_clicks()
                    );
                    break;
                }
                ClickerEvent::Clicked { x, y, total_clicks } => {
                    println!("🖱️  Click #{total_clicks} at ({x}, {y})");
                }
                ClickerEvent::MaxClicksReached(total) => {
                    println!("🏁 Click limit reached after {total} click(s)");
                }
                ClickerEvent::ScanFinished { found, should_click } => {
                    log::debug!("scan finished: found={found} should_click={should_click}");
                }
                ClickerEvent::Error(message) => {
                    println!("❌ {message}");
                    // A refused start never transitions to Running, so no
                    // StateChanged(Stopped) will follow.
                    if !started {
                        break;
                    }
                }
            }
        }

        let _ = cmd_tx.send(ClickerCommand::Shutdown).await;
        let _ = worker.await;
    });
}

fn print_help() {
    println!("🖱️  Image Autoclicker");
    println!();
    println!("Watches the screen for template images and clicks when the");
    println!("configured condition holds. Configuration lives in a JSON");
    println!("settings file (default: settings.json).");
    println!();
    println!("USAGE:");
    println!("    image-autoclicker [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    (no flags)           Run the click loop with the settings file");
    println!("    --settings=<path>    Use a different settings file");
    println!("    --list-monitors, -m  List the monitor layout and exit");
    println!("    --help, -h           Show this help message");
    println!("    --version, -v        Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    image-autoclicker");
    println!("    image-autoclicker --settings=fishing.json");
    println!("    image-autoclicker --list-monitors");
}
