mod app;

use anyhow::Result;
use eframe::NativeOptions;
use std::path::PathBuf;
use viewer_core::ViewerConfig;

const CONFIG_ENV: &str = "VIEWER_CONFIG";
const DEFAULT_CONFIG: &str = "viewer.toml";

fn main() {
    tracing_subscriber::fmt::init();
    let cfg = match load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Invalid configuration: {e:#}");
            std::process::exit(1);
        }
    };
    let title = format!("Classification Viewer {}", env!("VIEWER_VERSION"));
    let options = NativeOptions::default();
    if let Err(e) = eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            let app = app::UiApp::new(cc, cfg)
                .map_err(Box::<dyn std::error::Error + Send + Sync>::from)?;
            Ok::<Box<dyn eframe::App>, Box<dyn std::error::Error + Send + Sync>>(Box::new(app))
        }),
    ) {
        eprintln!("Application stopped with error: {e}");
    }
}

fn load_config() -> Result<ViewerConfig> {
    let path = config_path(
        std::env::args().nth(1),
        std::env::var(CONFIG_ENV).ok(),
    );
    tracing::info!("loading config from {}", path.display());
    Ok(ViewerConfig::load(path)?)
}

/// CLI argument wins over the environment, which wins over the default file.
fn config_path(arg: Option<String>, env: Option<String>) -> PathBuf {
    arg.or(env)
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG))
}
