use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, ValueEnum};

use nodal_editor::canvas::RecordingCanvas;
use nodal_editor::editor::StructureEditor;
use nodal_editor::explorer::scan_workspace;
use nodal_editor::logging;
use nodal_editor::samples::{self, SAMPLE_NAMES};
use nodal_editor::structure::source::{ZipSource, load_structure};
use nodal_editor::structure::{
    Structure, StructureDoc, resolve_instance_path, split_instance_path,
};

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Output {
    /// Port/instance/net counts
    Summary,
    /// Canvas calls of one projected frame plus the frame report
    Projection,
    /// The structure document itself
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect NodalHDL structure documents and their canvas projection", long_about = None)]
struct Cli {
    /// Structure document (.json, .nhdl) or zip bundle of JSON documents
    #[arg(value_name = "STRUCTURE_FILE", conflicts_with_all = ["sample", "scan"])]
    file: Option<String>,

    /// Use a built-in sample instead of a file
    #[arg(long, value_name = "NAME", conflicts_with = "scan")]
    sample: Option<String>,

    /// Document path inside a zip bundle
    #[arg(long, value_name = "PATH")]
    entry: Option<String>,

    /// Nested instance to show instead of the root (e.g. "/u1/z")
    #[arg(long, value_name = "INSTANCE_PATH")]
    path: Option<String>,

    #[arg(long, value_enum, default_value_t = Output::Summary)]
    output: Output,

    /// List the structure documents below a directory and exit
    #[arg(long, value_name = "DIR")]
    scan: Option<String>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn load_root(cli: &Cli) -> Result<Structure> {
    if let Some(name) = &cli.sample {
        let built = samples::sample(name).with_context(|| {
            format!("Unknown sample '{}' (available: {})", name, SAMPLE_NAMES.join(", "))
        })?;
        return Ok(built?);
    }
    let Some(file) = &cli.file else {
        anyhow::bail!("Pass a STRUCTURE_FILE, --sample or --scan");
    };
    let path = Utf8PathBuf::from(file);
    if path.extension() == Some("zip") {
        let entry = cli
            .entry
            .as_deref()
            .context("--entry is required for zip bundles")?;
        let f = std::fs::File::open(&path).with_context(|| format!("Open {}", path))?;
        let mut source = ZipSource::new(std::io::BufReader::new(f))?;
        load_structure(&mut source, Utf8Path::new(entry))
    } else {
        Ok(StructureDoc::load(&path)?.structure)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, None)?;

    if let Some(dir) = &cli.scan {
        let entries = scan_workspace(Utf8Path::new(dir))?;
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let root = load_root(&cli)?;
    let structure = match &cli.path {
        Some(p) => resolve_instance_path(&root, &split_instance_path(p))
            .cloned()
            .with_context(|| format!("No instance at {}", p))?,
        None => root,
    };

    let json = match cli.output {
        Output::Summary => serde_json::to_string_pretty(&structure.summary())?,
        Output::Json => StructureDoc::new(structure).to_json()?,
        Output::Projection => {
            let mut editor = StructureEditor::new(Some(structure));
            let mut canvas = RecordingCanvas::new();
            let report = editor.gui(&mut canvas).clone();
            serde_json::to_string_pretty(&serde_json::json!({
                "report": report,
                "ops": canvas.ops(),
            }))?
        }
    };
    println!("{}", json);
    Ok(())
}
