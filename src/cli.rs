use crate::{
    config::RenderConfig,
    constants::{exit_codes, verbosity, STDIN_INDICATOR},
    context::{build_context, RenderInput},
    error::{Error, Result},
    hosting::HostingMode,
    locale::FormatProvider,
    renderer::TemplateEngine,
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use log::{debug, info, LevelFilter};
use std::io::Read;
use std::path::{Path, PathBuf};

const HELP_TEMPLATE: &str = r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#;

/// CLI arguments for sandbox-render.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Render a template against sandboxed JSON data", long_about = None)]
pub struct Args {
    /// Template file to render.
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// JSON data file, or `-` to read from stdin.
    #[arg(value_name = "DATA")]
    pub data: String,

    /// Locale tag for number and date formatting (e.g. `de-DE`).
    #[arg(short, long)]
    pub locale: Option<String>,

    /// Render template faults inline instead of failing.
    #[arg(long)]
    pub hosted: bool,

    /// Configuration file (JSON or YAML).
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the sandboxed variables as JSON instead of rendering.
    #[arg(long = "dump-context")]
    pub dump_context: bool,

    /// Increase logging verbosity (`-v`, `-vv`, `-vvv`).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse command line arguments with custom handling for missing required inputs.
pub fn get_args() -> Args {
    Args::try_parse().unwrap_or_else(|e| {
        if e.kind() == ErrorKind::MissingRequiredArgument {
            let mut command = Args::command().help_template(HELP_TEMPLATE);
            if let Err(print_err) = command.print_help() {
                eprintln!("Failed to display help information: {print_err}");
            } else {
                println!();
            }
            std::process::exit(exit_codes::FAILURE);
        } else {
            e.exit();
        }
    })
}

/// Map `-v` counts to the appropriate log level.
pub fn get_log_level_from_verbose(verbose_count: u8) -> LevelFilter {
    match verbose_count {
        verbosity::OFF => LevelFilter::Error,
        verbosity::INFO => LevelFilter::Info,
        verbosity::DEBUG => LevelFilter::Debug,
        verbosity::TRACE.. => LevelFilter::Trace,
    }
}

/// Renders according to `args` and prints the result to stdout.
pub fn run(args: Args) -> Result<()> {
    let output = render_from_args(&args)?;
    print!("{output}");
    Ok(())
}

/// Produces what [`run`] would print.
pub fn render_from_args(args: &Args) -> Result<String> {
    let config = match &args.config {
        Some(path) => RenderConfig::from_file(path)?,
        None => RenderConfig::default(),
    };
    let data = read_data(&args.data)?;

    if args.dump_context {
        let variables = build_context(RenderInput::from(&data))?;
        return Ok(serde_json::to_string_pretty(&variables)?);
    }

    let hosting = if args.hosted { HostingMode::Hosted } else { config.hosting_mode() };
    let format_provider = match &args.locale {
        Some(tag) => FormatProvider::for_tag(tag)?,
        None => config.format_provider()?,
    };

    let source = std::fs::read_to_string(&args.template)?;
    let name = template_name(&args.template)?;
    info!("Rendering '{name}' ({hosting:?}, locale '{}')", format_provider.tag());

    let template = TemplateEngine::from_config(&config).parse(name, &source, &hosting)?;
    template.render(&data, &format_provider)
}

fn template_name(path: &Path) -> Result<&str> {
    path.file_name().and_then(|name| name.to_str()).ok_or_else(|| {
        Error::invalid_argument("template", format!("'{}' has no file name", path.display()))
    })
}

fn read_data(source: &str) -> Result<serde_json::Value> {
    let buf = if source == STDIN_INDICATOR {
        debug!("Reading render data from stdin");
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        debug!("Reading render data from '{source}'");
        std::fs::read_to_string(source)?
    };
    Ok(serde_json::from_str(&buf)?)
}
