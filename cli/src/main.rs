//! gridfig CLI - comparison grid figures from rendered images

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use gridfig::{
    build_grid_with, detect_format_from_path, Conversion, DisplayTransform, Document,
    FigureManifest, ImageLoader, Length, LoadOptions, OutputFormat, RenderOptions, RenderResult,
};

#[derive(Parser)]
#[command(name = "gridfig")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Assemble rendered image variants into comparison figures", long_about = None)]
struct Cli {
    /// Figure manifest (JSON)
    #[arg(value_name = "MANIFEST")]
    manifest: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a figure from a JSON manifest
    Build {
        /// Figure manifest (JSON)
        #[arg(value_name = "MANIFEST")]
        manifest: PathBuf,

        /// Output file (overrides the manifest)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format (default: from the output extension)
        #[arg(long, value_enum)]
        format: Option<Format>,

        /// Load images one at a time
        #[arg(long)]
        sequential: bool,
    },

    /// Build a single grid from a list of images (row-major)
    Grid {
        /// Number of rows
        #[arg(long)]
        rows: usize,

        /// Number of columns
        #[arg(long)]
        cols: usize,

        /// Figure width in centimetres
        #[arg(long, default_value = "18.0")]
        width_cm: f64,

        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Output format (default: from the output extension)
        #[arg(long, value_enum)]
        format: Option<Format>,

        /// Lay the figure out horizontally
        #[arg(long)]
        horizontal: bool,

        /// Exposure in stops applied to linear images
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        exposure: f32,

        /// Load images one at a time
        #[arg(long)]
        sequential: bool,

        /// Input images, row-major
        #[arg(value_name = "IMAGES", required = true)]
        images: Vec<PathBuf>,
    },

    /// Show image information
    Info {
        /// Input images
        #[arg(value_name = "IMAGES", required = true)]
        images: Vec<PathBuf>,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
enum Format {
    /// Single-page PDF
    Pdf,
    /// Self-contained HTML
    Html,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Pdf => OutputFormat::Pdf,
            Format::Html => OutputFormat::Html,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Build {
            manifest,
            output,
            format,
            sequential,
        }) => cmd_build(&manifest, output.as_deref(), format, sequential),
        Some(Commands::Grid {
            rows,
            cols,
            width_cm,
            output,
            format,
            horizontal,
            exposure,
            sequential,
            images,
        }) => cmd_grid(GridArgs {
            rows,
            cols,
            width_cm,
            output: &output,
            format,
            horizontal,
            exposure,
            sequential,
            images: &images,
        }),
        Some(Commands::Info { images }) => cmd_info(&images),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: build if a manifest is provided
            if let Some(manifest) = cli.manifest {
                cmd_build(&manifest, None, None, false)
            } else {
                println!("{}", "Usage: gridfig <MANIFEST>".yellow());
                println!("       gridfig --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn progress_bar(steps: u64) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(steps);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn load_options(sequential: bool) -> LoadOptions {
    LoadOptions::new().with_parallel(!sequential)
}

/// Format from the flag, else from the file extension.
fn resolve_format(format: Option<Format>, output: &Path) -> gridfig::Result<OutputFormat> {
    match format {
        Some(f) => Ok(f.into()),
        None => OutputFormat::from_path(output),
    }
}

fn cmd_build(
    manifest_path: &Path,
    output: Option<&Path>,
    format: Option<Format>,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = progress_bar(3)?;

    pb.set_message("Reading manifest...");
    let mut manifest = FigureManifest::from_path(manifest_path)?;
    let base_dir = manifest_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    if let Some(path) = output {
        manifest.format = Some(resolve_format(format, path)?);
    } else if let Some(f) = format {
        manifest.format = Some(f.into());
    }
    log::debug!(
        "manifest {}: {} grids, base dir {}",
        manifest_path.display(),
        manifest.grids.len(),
        base_dir.display()
    );
    pb.inc(1);

    pb.set_message("Loading images...");
    let mut doc = manifest.into_document(&base_dir, &load_options(sequential))?;
    pb.inc(1);

    pb.set_message("Rendering...");
    let result = match output {
        Some(path) => doc.render_to(path)?,
        None => doc.render_to_file()?,
    };
    pb.inc(1);
    pb.finish_with_message("Done!");

    let written = output
        .map(Path::to_path_buf)
        .or_else(|| doc.destination().map(Path::to_path_buf))
        .unwrap_or_default();
    print_summary(&written, &result);
    Ok(())
}

struct GridArgs<'a> {
    rows: usize,
    cols: usize,
    width_cm: f64,
    output: &'a Path,
    format: Option<Format>,
    horizontal: bool,
    exposure: f32,
    sequential: bool,
    images: &'a [PathBuf],
}

fn cmd_grid(args: GridArgs<'_>) -> Result<(), Box<dyn std::error::Error>> {
    // Reject bad shapes and formats before decoding anything.
    if args.images.len() != args.rows * args.cols {
        return Err(gridfig::Error::ShapeMismatch {
            rows: args.rows,
            cols: args.cols,
            images: args.images.len(),
        }
        .into());
    }
    let format = resolve_format(args.format, args.output)?;
    log::debug!(
        "grid {}x{} -> {} ({})",
        args.rows,
        args.cols,
        args.output.display(),
        format
    );

    let pb = progress_bar(3)?;

    pb.set_message(format!("Loading {} images...", args.images.len()));
    let loader = ImageLoader::with_options(load_options(args.sequential));
    let images = loader.load_all(args.images)?;
    pb.inc(1);

    pb.set_message("Assembling grid...");
    let transform = DisplayTransform::new().with_exposure(args.exposure);
    let grid = build_grid_with(
        args.rows,
        args.cols,
        images,
        Conversion::LinearToDisplay(transform),
    )?;
    pb.inc(1);

    pb.set_message("Rendering...");
    let mut options = RenderOptions::new();
    if args.horizontal {
        options = options.horizontal();
    }
    let mut doc = Document::new(Length::cm(args.width_cm), format)?
        .with_destination(args.output)
        .with_options(options);
    doc.add_grid(grid)?;
    let result = doc.render_to_file()?;
    pb.inc(1);
    pb.finish_with_message("Done!");

    print_summary(args.output, &result);
    Ok(())
}

fn print_summary(path: &Path, result: &RenderResult) {
    let stats = &result.stats;
    println!("\n{} {}", "Saved to".green(), path.display());
    println!(
        "  {} {} grids, {} cells, {} labels",
        "├─".dimmed(),
        stats.grid_count,
        stats.cell_count,
        stats.label_count
    );
    println!(
        "  {} {:.1} x {:.1} mm",
        "├─".dimmed(),
        Length::points(stats.width_pt).to_mm(),
        Length::points(stats.height_pt).to_mm()
    );
    println!("  {} {} bytes", "└─".dimmed(), result.content_len());
}

fn cmd_info(paths: &[PathBuf]) -> Result<(), Box<dyn std::error::Error>> {
    let loader = ImageLoader::new();

    for (i, path) in paths.iter().enumerate() {
        if i > 0 {
            println!();
        }
        let format = detect_format_from_path(path)?;
        let image = loader.load(path)?;
        let (min, max) = image.value_range();

        println!("{}", "Image Information".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        println!("{}: {}", "File".bold(), path.display());
        println!("{}: {}", "Format".bold(), format);
        println!("{}: {} x {}", "Size".bold(), image.width, image.height);
        println!(
            "{}: {}{}",
            "Channels".bold(),
            image.channels,
            if image.source_is_grayscale {
                " (expanded from grayscale)"
            } else {
                ""
            }
        );
        println!("{}: {}", "Encoding".bold(), image.encoding);
        println!("{}: {:.4} .. {:.4}", "Values".bold(), min, max);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "gridfig".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Comparison grid figure generator");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/gridfig".dimmed());
    println!("License: MIT");
}
