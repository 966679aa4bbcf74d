use clap::{Parser, Subcommand};
use serde::Serialize;
use std::error::Error;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use thumbwright::config::{self, ThumbwrightConfig};
use thumbwright::imaging::codec;
use thumbwright::imaging::task::resolve_encoder;
use thumbwright::imaging::{
    FileThumbnailTask, Positions, Resampling, StreamThumbnailTask, ThumbnailParameter,
    ThumbnailTask, create_thumbnail,
};
use thumbwright::naming::Rename;
use thumbwright::{batch, output};

/// Thumbnail settings that override the config file.
#[derive(clap::Args, Clone)]
struct ThumbnailArgs {
    /// Target width in pixels
    #[arg(long, short = 'W')]
    width: Option<u32>,

    /// Target height in pixels
    #[arg(long, short = 'H')]
    height: Option<u32>,

    /// Scale factor instead of a target box (e.g. 0.5)
    #[arg(long, conflicts_with_all = ["width", "height"])]
    scale: Option<f64>,

    /// Stretch to exactly WIDTH x HEIGHT instead of fitting inside
    #[arg(long)]
    no_keep_aspect_ratio: bool,

    /// Fill the box and crop at this anchor (e.g. center, top-left)
    #[arg(long)]
    crop: Option<Positions>,

    /// Output format name, or "original" to keep the input's format
    #[arg(long, short = 'f')]
    format: Option<String>,

    /// Lossy quality from 0.0 to 1.0
    #[arg(long, short = 'q')]
    quality: Option<f32>,

    /// Resampling filter: nearest, triangle, catmull-rom, gaussian, lanczos3
    #[arg(long)]
    resampling: Option<Resampling>,

    /// Ignore the EXIF orientation tag
    #[arg(long)]
    no_exif_orientation: bool,
}

fn insert(
    table: &mut toml::Table,
    key: &str,
    value: Option<impl Serialize>,
) -> Result<(), toml::ser::Error> {
    if let Some(value) = value {
        table.insert(key.to_string(), toml::Value::try_from(value)?);
    }
    Ok(())
}

impl ThumbnailArgs {
    /// Express the flags as a config overlay with only the keys that were set.
    fn to_overlay(&self) -> Result<toml::Table, toml::ser::Error> {
        let mut t = toml::Table::new();
        insert(&mut t, "width", self.width)?;
        insert(&mut t, "height", self.height)?;
        insert(&mut t, "scale", self.scale)?;
        insert(&mut t, "keep_aspect_ratio", self.no_keep_aspect_ratio.then_some(false))?;
        insert(&mut t, "crop", self.crop)?;
        insert(&mut t, "output_format", self.format.as_deref())?;
        insert(&mut t, "quality", self.quality)?;
        insert(&mut t, "resampling", self.resampling)?;
        insert(&mut t, "use_exif_orientation", self.no_exif_orientation.then_some(false))?;
        let mut root = toml::Table::new();
        if !t.is_empty() {
            root.insert("thumbnail".into(), toml::Value::Table(t));
        }
        Ok(root)
    }
}

#[derive(Parser)]
#[command(name = "thumbwright")]
#[command(about = "Make thumbnails: resize, watermark, rotate, round corners")]
#[command(long_about = "\
Make thumbnails: resize, watermark, rotate, round corners

Input formats are detected from file content, never from the extension.
The first frame of an animated input becomes the thumbnail.

Settings are layered: stock defaults, then --config FILE, then flags.
Filters (watermark, rotate, rounded-corners) are configured in the file.

Run 'thumbwright gen-config' to generate a documented thumbwright.toml.
Set RUST_LOG=debug to see codec and filter decisions.")]
#[command(version)]
struct Cli {
    /// Config file (TOML)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Make one thumbnail. Use '-' for stdin/stdout
    Make {
        input: PathBuf,
        output: PathBuf,
        #[command(flatten)]
        thumbnail: ThumbnailArgs,
    },
    /// Thumbnail many files and directories in parallel
    Batch {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Directory the thumbnails are written to
        #[arg(long, short = 'o')]
        out_dir: PathBuf,
        /// How output names are derived from input names
        #[arg(long)]
        rename: Option<Rename>,
        /// Maximum parallel workers (default: CPU cores)
        #[arg(long)]
        max_processes: Option<usize>,
        /// Print a JSON report instead of progress lines
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        thumbnail: ThumbnailArgs,
    },
    /// List supported formats and their capabilities
    Formats,
    /// Print a stock thumbwright.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Make {
            input,
            output: destination,
            thumbnail,
        } => {
            let overlay = thumbnail.to_overlay()?;
            let (settings, base_dir) = load_settings(cli.config.as_deref(), overlay)?;
            let param = settings.to_parameter(&base_dir)?;
            let format = make(&input, &destination, param)?;
            if !is_stdio(&destination) {
                println!(
                    "{}",
                    output::format_make_result(
                        &input.display().to_string(),
                        &destination.display().to_string(),
                        format,
                    )
                );
            }
        }
        Command::Batch {
            inputs,
            out_dir,
            rename,
            max_processes,
            json,
            thumbnail,
        } => {
            let mut overlay = thumbnail.to_overlay()?;
            let mut batch_table = toml::Table::new();
            insert(&mut batch_table, "rename", rename)?;
            insert(&mut batch_table, "max_processes", max_processes)?;
            if !batch_table.is_empty() {
                overlay.insert("batch".into(), toml::Value::Table(batch_table));
            }
            let (settings, base_dir) = load_settings(cli.config.as_deref(), overlay)?;
            let param = settings.to_parameter(&base_dir)?;
            init_thread_pool(&settings.batch);

            let files = batch::collect_inputs(&inputs)?;
            std::fs::create_dir_all(&out_dir)?;

            let report = if json {
                let report = batch::run_batch(&files, &out_dir, &param, settings.batch.rename, None);
                println!("{}", serde_json::to_string_pretty(&report)?);
                report
            } else {
                let (tx, rx) = std::sync::mpsc::channel();
                let printer = std::thread::spawn(move || {
                    for event in rx {
                        for line in output::format_batch_event(&event) {
                            println!("{}", line);
                        }
                    }
                });
                let report =
                    batch::run_batch(&files, &out_dir, &param, settings.batch.rename, Some(tx));
                printer.join().map_err(|_| "output thread panicked")?;
                output::print_batch_summary(&report);
                report
            };

            if report.failed() > 0 {
                return Err(format!(
                    "{} of {} files failed",
                    report.failed(),
                    report.files.len()
                )
                .into());
            }
        }
        Command::Formats => {
            output::print_codecs(codec::codecs());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Layer stock defaults, the optional config file, and CLI flags.
///
/// Returns the config and the directory relative overlay paths resolve
/// against: the config file's directory, or the working directory.
fn load_settings(
    path: Option<&Path>,
    flags: toml::Table,
) -> Result<(ThumbwrightConfig, PathBuf), config::ConfigError> {
    let mut layers = Vec::new();
    let base_dir = match path {
        Some(path) => {
            layers.push(config::load_raw_config(path)?);
            path.parent().map(Path::to_path_buf).unwrap_or_default()
        }
        None => PathBuf::new(),
    };
    layers.push(toml::Value::Table(flags));
    let settings = config::resolve_config(config::stock_defaults_value(), layers)?;
    Ok((settings, base_dir))
}

/// Make one thumbnail and return the name of the format it was written in.
///
/// With `-` on either side the stream task is used; its output is buffered
/// so a failed encode never leaves a partial file behind.
fn make(
    input: &Path,
    output: &Path,
    param: ThumbnailParameter,
) -> Result<&'static str, Box<dyn Error>> {
    if !is_stdio(input) && !is_stdio(output) {
        let mut task = FileThumbnailTask::new(param, input, output);
        create_thumbnail(&mut task)?;
        return Ok(format_name(&task));
    }

    let mut reader: Box<dyn Read> = if is_stdio(input) {
        Box::new(io::stdin().lock())
    } else {
        Box::new(File::open(input)?)
    };
    let mut encoded = Vec::new();
    let format = {
        let mut task = StreamThumbnailTask::new(param, &mut reader, &mut encoded);
        create_thumbnail(&mut task)?;
        let input_format = task.input_format();
        resolve_encoder(task.param().output_format(), input_format).map(|c| c.name)
    };

    if is_stdio(output) {
        let mut stdout = io::stdout().lock();
        stdout.write_all(&encoded)?;
        stdout.flush()?;
    } else {
        std::fs::write(output, &encoded)?;
    }
    Ok(format.unwrap_or("unknown"))
}

fn format_name(task: &FileThumbnailTask) -> &'static str {
    resolve_encoder(task.param().output_format(), task.input_format())
        .map(|c| c.name)
        .unwrap_or("unknown")
}

/// Initialize the rayon thread pool based on batch config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(batch: &config::BatchConfig) {
    let threads = config::effective_threads(batch);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
