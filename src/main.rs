use carousel_board::export::{ExportError, ExportEvent, ExportReport, ExportService};
use carousel_board::imaging::RustBackend;
use carousel_board::intake::{self, ImageSource, IntakeEvent};
use carousel_board::render::PdfRenderer;
use carousel_board::session::Session;
use carousel_board::state::FileStore;
use carousel_board::{config, output};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "carousel-board")]
#[command(about = "Plan an image carousel and export it as a PDF moodboard")]
#[command(long_about = "\
Plan an image carousel and export it as a PDF moodboard

Collect up to 20 slides, order them, and export:

  moodboard.pdf            Numbered 4:5 thumbnails with filenames, caption and tags
  carousel_metadata.pdf    Caption, tags and the numbered filename list
  carousel_filenames.txt   One filename per line, in slide order

The board is saved in the state directory after every change, so commands
can be run one at a time:

  carousel-board add shoot/             # NNN- prefixed files keep their order
  carousel-board move 5 1
  carousel-board caption \"Golden hour\"
  carousel-board export all --out out/

Positions are 1-based. Run 'carousel-board gen-config' to generate a
documented carousel.toml.")]
#[command(version)]
struct Cli {
    /// Directory holding the saved board
    #[arg(long, default_value = ".carousel", global = true)]
    state_dir: PathBuf,

    /// Board configuration file (missing = defaults)
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add image files, or every image in a directory
    Add {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Show slides, caption, tags and settings
    List,
    /// Remove the slide at a position
    Remove {
        #[arg(value_parser = parse_position)]
        position: usize,
    },
    /// Insert a copy of a slide right after it
    Duplicate {
        #[arg(value_parser = parse_position)]
        position: usize,
    },
    /// Swap a slide's image, keeping its position
    Replace {
        #[arg(value_parser = parse_position)]
        position: usize,
        path: PathBuf,
    },
    /// Move a slide to another position
    Move {
        #[arg(value_parser = parse_position)]
        from: usize,
        #[arg(value_parser = parse_position)]
        to: usize,
    },
    /// Remove every slide
    Clear,
    /// Set the carousel caption ("" clears it)
    Caption { text: String },
    /// Set the carousel tags ("" clears them)
    Tags { text: String },
    /// Turn a board setting on or off
    Set { setting: Setting, state: Toggle },
    /// Write one slide's normalized crop as JPEG
    Crop {
        #[arg(value_parser = parse_position)]
        position: usize,
        #[arg(long)]
        out: PathBuf,
    },
    /// Export documents
    Export {
        what: ExportTarget,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Print a stock carousel.toml with all options documented
    GenConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum Setting {
    DarkMode,
    SafeZone,
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportTarget {
    Moodboard,
    Metadata,
    Filenames,
    All,
}

/// Parse a 1-based position from the command line.
fn parse_position(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("positions start at 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = config::load_config(&cli.config)?;
    init_thread_pool(&config.processing);
    let backend = RustBackend::new();
    let mut session = Session::open(FileStore::new(&cli.state_dir), &config, &backend);

    match cli.command {
        Command::Add { paths } => {
            let sources = intake::expand_paths(&paths)?;
            let (tx, rx) = mpsc::channel::<IntakeEvent>();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_intake_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            session.add_batch(sources, &backend, Some(&tx));
            drop(tx);
            printer.join().map_err(|_| "output thread panicked")?;
        }
        Command::List => {}
        Command::Remove { position } => {
            if session.remove(position - 1).is_none() {
                println!("No slide at position {}", position);
            }
        }
        Command::Duplicate { position } => {
            let index = session.duplicate(position - 1)?;
            println!("Duplicated {} to {}", position, index + 1);
        }
        Command::Replace { position, path } => {
            session.replace(position - 1, &ImageSource::Path(path), &backend)?;
        }
        Command::Move { from, to } => {
            session.reorder(from - 1, to - 1)?;
        }
        Command::Clear => session.clear(),
        Command::Caption { text } => {
            session.set_caption(text, Instant::now());
            session.flush();
        }
        Command::Tags { text } => {
            session.set_tags(text, Instant::now());
            session.flush();
        }
        Command::Set { setting, state } => {
            let on = matches!(state, Toggle::On);
            match setting {
                Setting::DarkMode => session.set_dark_mode(on),
                Setting::SafeZone => session.set_safe_zone(on),
            }
        }
        Command::Crop { position, out } => {
            let jpeg = session.crop_slide(position - 1, &backend, &config.crop_params())?;
            std::fs::write(&out, jpeg)?;
            println!("{:0>3} \u{2192} {}", position, out.display());
            return Ok(());
        }
        Command::Export { what, out } => {
            run_export(&session, config.clone(), what, &out)?;
            return Ok(());
        }
        Command::GenConfig => unreachable!("handled before the session is opened"),
    }

    output::print_listing(
        session.collection(),
        session.metadata(),
        session.dark_mode(),
        session.safe_zone(),
    );
    Ok(())
}

/// Run one or all exports, printing progress as they go.
fn run_export(
    session: &Session<FileStore>,
    config: config::BoardConfig,
    what: ExportTarget,
    out: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let (tx, rx) = mpsc::channel::<ExportEvent>();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_export_event(&event) {
                println!("{}", line);
            }
        }
    });

    let service = ExportService::new(config, RustBackend::new()).with_events(tx);
    let collection = session.collection();
    let metadata = session.metadata();
    let moodboard = || -> Result<ExportReport, ExportError> {
        service.export_moodboard(collection, metadata, &mut PdfRenderer::new(), out)
    };
    let document = || -> Result<ExportReport, ExportError> {
        service.export_metadata(collection, metadata, &mut PdfRenderer::new(), out)
    };
    let names = || service.export_filename_list(collection, out);

    let result = match what {
        ExportTarget::Moodboard => moodboard().map(|_| ()),
        ExportTarget::Metadata => document().map(|_| ()),
        ExportTarget::Filenames => names().map(|_| ()),
        ExportTarget::All => moodboard()
            .and_then(|_| document())
            .and_then(|_| names())
            .map(|_| ()),
    };

    drop(service);
    printer.join().map_err(|_| "output thread panicked")?;
    Ok(result?)
}

/// Log to stderr, filtered by `RUST_LOG` (default: warnings).
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. `max_processes` can only lower it.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
