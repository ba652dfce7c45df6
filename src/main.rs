use clap::{Parser, Subcommand};
use nbshots::types::Section;
use nbshots::{config, index, output, pipeline, scan};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nbshots")]
#[command(about = "Screenshot gallery for Jupyter and Quarto notebooks")]
#[command(long_about = "\
Screenshot gallery for Jupyter and Quarto notebooks

Every .ipynb and .qmd file under the root directory is rendered to static
HTML, captured with headless Chrome, and listed in a markdown index under
one of two section headings.

Directory structure:

  notebooks/
  ├── nbshots.toml                 # Optional config (run 'nbshots gen-config')
  ├── README.md                    # Index; must contain '# Python' and '# R'
  ├── Python/
  │   └── foo_bar.ipynb            # → '## Foo Bar' under '# Python'
  ├── R/
  │   └── analysis.qmd             # → '## Analysis' under '# R'
  └── screenshots/                 # Generated PNGs (foo_bar.png, analysis.png)

Notebooks are rendered from their stored outputs; Quarto documents are
rendered with 'quarto render --no-execute'. Nothing is executed.

Set RUST_LOG (e.g. RUST_LOG=nbshots=debug) for diagnostic logging.")]
#[command(version)]
struct Cli {
    /// Root directory to walk for notebooks
    #[arg(long, default_value = "notebooks", global = true)]
    root: PathBuf,

    /// Directory for temporary HTML files
    #[arg(long, default_value = ".nbshots-temp", global = true)]
    temp_dir: PathBuf,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Render, screenshot, and index every document (default)
    Run,
    /// List discovered documents by section without touching anything
    Scan,
    /// Verify the index file and its section headings
    Check,
    /// Print a stock nbshots.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let run_config = config::load_config(&cli.root)?;
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_pipeline_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = pipeline::run(&cli.root, &run_config, &cli.temp_dir, Some(tx));
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            remove_temp_dir(&cli.temp_dir);
            let summary = result?;
            output::print_summary(&summary);
        }
        Command::Scan => {
            let run_config = config::load_config(&cli.root)?;
            let documents = scan::discover(&cli.root, &run_config)?;
            output::print_scan_output(&documents, &cli.root, &run_config);
        }
        Command::Check => {
            let run_config = config::load_config(&cli.root)?;
            let index_path = run_config.index_path(&cli.root);
            if !index_path.is_file() {
                return Err(index::IndexError::NotFound(index_path).into());
            }
            let content = std::fs::read_to_string(&index_path)?;
            let headings = [
                run_config.sections.heading(Section::Matched),
                run_config.sections.heading(Section::Default),
            ];
            let missing = index::missing_sections(&content, &headings)?;
            for line in output::format_check_output(&index_path, &headings, &missing) {
                println!("{}", line);
            }
            if !missing.is_empty() {
                return Err(format!("index is missing {} section heading(s)", missing.len()).into());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Remove the temp directory if the run left it empty.
fn remove_temp_dir(temp_dir: &Path) {
    // remove_dir fails on non-empty directories.
    if let Err(e) = std::fs::remove_dir(temp_dir)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        tracing::debug!(path = %temp_dir.display(), error = %e, "temp directory not removed");
    }
}
