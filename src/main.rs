use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;

use voxdoc::app::domain::settings::{OutputFormat, PostProcess, Settings};
use voxdoc::app::domain::theme::validate_defaults;
use voxdoc::app::domain::Operation;
use voxdoc::app::infrastructure::fetch::DefaultFetcher;
use voxdoc::app::services::render::Renderer;
use voxdoc::app::services::{assets, codec, storage};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a document to HTML or Markdown
    Render {
        file: PathBuf,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        #[arg(long, value_enum)]
        post: Option<PostArg>,
    },
    /// Parse a document and report errors
    Check { file: PathBuf },
    /// Print a document in canonical form
    Fmt {
        file: PathBuf,

        /// Rewrite the file in place
        #[arg(long, default_value_t = false)]
        write: bool,
    },
    /// Register an image and append it to the document
    AddImage { file: PathBuf, source: String },
    /// Register a custom .ttf/.otf font under a name
    AddFont {
        file: PathBuf,
        name: String,
        source: String,
    },
    /// Show a summary of a document
    Info { file: PathBuf },
    /// Show or update the saved defaults
    Config {
        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        #[arg(long, value_enum)]
        post: Option<PostArg>,

        /// Seconds to wait for external images and fonts
        #[arg(long)]
        fetch_timeout: Option<u64>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Html,
    Markdown,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Html => OutputFormat::Html,
            FormatArg::Markdown => OutputFormat::Markdown,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PostArg {
    None,
    Minify,
    Pretty,
}

impl From<PostArg> for PostProcess {
    fn from(arg: PostArg) -> Self {
        match arg {
            PostArg::None => PostProcess::None,
            PostArg::Minify => PostProcess::Minify,
            PostArg::Pretty => PostProcess::Pretty,
        }
    }
}

fn run(cli: Cli) -> voxdoc::Result<()> {
    validate_defaults()?;
    let mut settings = Settings::load();

    match cli.command {
        Command::Render {
            file,
            output,
            format,
            post,
        } => {
            let doc = storage::load_document(&file)?;
            let format = format.map_or(settings.output_format, OutputFormat::from);
            let post = post.map_or(settings.post_process, PostProcess::from);
            let markup = Renderer::new(format).with_post_process(post).render(&doc)?;
            match output {
                Some(mut path) => {
                    if path.extension().is_none() {
                        path.set_extension(format.extension());
                    }
                    fs::write(&path, &markup)?;
                    log::info!("wrote {}", path.display());
                }
                None => print!("{}", markup),
            }
        }
        Command::Check { file } => {
            storage::load_document(&file)?;
            println!("{}: ok", file.display());
        }
        Command::Fmt { file, write } => {
            let doc = storage::load_document(&file)?;
            if write {
                storage::save_document(&doc, &file)?;
            } else {
                print!("{}", codec::write(&doc));
            }
        }
        Command::AddImage { file, source } => {
            let mut doc = storage::load_document(&file)?;
            let fetcher = DefaultFetcher::new(&settings);
            let id = assets::register_image(&mut doc, &source, &fetcher)?;
            doc.append([Operation::embed("image", json!(id)), Operation::insert("\n")])?;
            storage::save_document(&doc, &file)?;
            println!("image {}", id);
        }
        Command::AddFont { file, name, source } => {
            let mut doc = storage::load_document(&file)?;
            let fetcher = DefaultFetcher::new(&settings);
            assets::register_font_file(&mut doc, &name, &source, &fetcher)?;
            storage::save_document(&doc, &file)?;
            println!("font {:?}", name);
        }
        Command::Info { file } => {
            let doc = storage::load_document(&file)?;
            println!("title:      {}", doc.title.as_deref().unwrap_or("Untitled"));
            println!("operations: {}", doc.operations.ops().len());
            println!("length:     {}", doc.operations.length());
            println!("theme keys: {}", doc.theme.len());
            println!("images:     {}", doc.images.len());
            println!("fonts:      {}", doc.fonts.len());
            println!(
                "history:    {} undo, {} redo",
                doc.history.undo.len(),
                doc.history.redo.len()
            );
            println!("blank:      {}", doc.is_blank());
        }
        Command::Config {
            format,
            post,
            fetch_timeout,
        } => {
            let changed = format.is_some() || post.is_some() || fetch_timeout.is_some();
            if let Some(format) = format {
                settings.output_format = format.into();
            }
            if let Some(post) = post {
                settings.post_process = post.into();
            }
            if let Some(secs) = fetch_timeout {
                settings.fetch_timeout_secs = secs;
            }
            if changed {
                settings.save()?;
            }
            println!("path:          {}", Settings::get_config_path().display());
            println!("format:        {:?}", settings.output_format);
            println!("post process:  {:?}", settings.post_process);
            println!("fetch timeout: {}s", settings.fetch_timeout_secs);
            println!("user agent:    {}", settings.user_agent);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
