//! Interactive structure editor (requires `--features egui`).
//!
//! Usage:
//!   cargo run --features egui --example structure_editor -- [--sample m2] [DOCUMENT...]

#[cfg(feature = "egui")]
use anyhow::Result;
#[cfg(feature = "egui")]
use camino::Utf8PathBuf;
#[cfg(feature = "egui")]
use clap::Parser;
#[cfg(feature = "egui")]
use eframe::egui;
#[cfg(feature = "egui")]
use nodal_editor::app::EditorApp;
#[cfg(feature = "egui")]
use nodal_editor::config::{DEFAULT_CONFIG_FILE, EditorConfig};
#[cfg(feature = "egui")]
use nodal_editor::logging::{self, LogBuffer};

#[cfg(feature = "egui")]
#[derive(Parser, Debug)]
#[command(author, version, about = "Edit NodalHDL structures on a node canvas", long_about = None)]
struct Args {
    /// Structure documents to open on start
    #[arg(value_name = "DOCUMENT")]
    documents: Vec<String>,

    /// Open built-in samples on start (repeatable)
    #[arg(long = "sample", value_name = "NAME")]
    samples: Vec<String>,

    /// Settings file
    #[arg(long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    /// Override the workspace directory from the settings file
    #[arg(short = 'w', long, value_name = "DIR")]
    workspace: Option<String>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[cfg(feature = "egui")]
fn main() -> Result<()> {
    let args = Args::parse();
    let config_path = Utf8PathBuf::from(&args.config);
    let mut config = EditorConfig::load(&config_path)?;
    if let Some(dir) = &args.workspace {
        config.workspace = Utf8PathBuf::from(dir);
    }

    let logs = LogBuffer::new(config.log_capacity);
    // The in-app log window always shows info and above.
    logging::init(args.verbose.max(1), Some(&logs))?;

    let mut app = EditorApp::new(config.clone(), config_path, logs);
    for name in &args.samples {
        app.open_sample(name);
    }
    for doc in &args.documents {
        app.open_path(&Utf8PathBuf::from(doc));
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(config.window_title.clone())
            .with_inner_size(config.window_size),
        ..Default::default()
    };
    eframe::run_native(
        &config.window_title,
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(())
}

#[cfg(not(feature = "egui"))]
fn main() {
    eprintln!("This example requires the 'egui' feature. Try: cargo run --features egui --example structure_editor");
}
