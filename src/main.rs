use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use miette::{IntoDiagnostic, Result, WrapErr};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};

use apisurface::baseline::Baseline;
use apisurface::config::Config;
use apisurface::extractor::Extractor;
use apisurface::gate::{ComplianceGate, GateInput};
use apisurface::report::{self, Reporter};
use apisurface::sections::{SectionSplitter, Sections};
use apisurface::signature::SignatureParser;
use apisurface::surface::SymbolSetBuilder;

/// Exit status for malformed input or an unusable environment
const FATAL_EXIT: u8 = 2;

/// apisurface - Fail the build on unreviewed API surface changes
#[derive(Parser, Debug)]
#[command(name = "apisurface")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Workspace root that configured paths resolve against
    #[arg(long, env = "ANDROID_BUILD_TOP", global = true)]
    root: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode - only output results
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare the API surface against the baseline and check annotations
    Check(CheckArgs),

    /// Rewrite the baseline from the current signature file
    UpdateBaseline {
        /// Current signature file
        #[arg(long, value_name = "FILE")]
        signature: PathBuf,

        /// Baseline file to write (default: from config)
        #[arg(long, value_name = "FILE")]
        baseline: Option<PathBuf>,
    },

    /// Print the sorted symbol set of a signature file
    Symbols {
        /// Signature file
        #[arg(long, value_name = "FILE")]
        signature: PathBuf,

        /// Which symbols to print
        #[arg(long, value_enum, default_value = "all")]
        kind: SymbolKind,
    },

    /// Print the sections found in a captured extraction tool output
    Sections {
        /// Captured report stream
        #[arg(long, value_name = "FILE")]
        report: PathBuf,
    },
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Current signature file
    #[arg(long, value_name = "FILE")]
    signature: PathBuf,

    /// Baseline file (default: from config)
    #[arg(long, value_name = "FILE")]
    baseline: Option<PathBuf>,

    /// Captured output of the extraction tool
    #[arg(long, value_name = "FILE", conflicts_with = "extract")]
    report: Option<PathBuf>,

    /// Run the extraction tool instead of reading --report
    #[arg(long)]
    extract: bool,

    /// JDK used to run the extraction tool
    #[arg(long, env = "JAVA_HOME", value_name = "DIR")]
    java_home: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: OutputFormat,

    /// Output file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(clap::ValueEnum, Clone, Debug, Default)]
enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

impl From<OutputFormat> for report::ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => report::ReportFormat::Terminal,
            OutputFormat::Json => report::ReportFormat::Json,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum SymbolKind {
    All,
    Methods,
    Fields,
    Classes,
    Signatures,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.quiet);

    if !console::user_attended() {
        colored::control::set_override(false);
    }

    info!("apisurface v{}", env!("CARGO_PKG_VERSION"));

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(report) => {
            eprintln!("{:?}", report);
            ExitCode::from(FATAL_EXIT)
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let root = cli.root.clone().unwrap_or_else(|| PathBuf::from("."));

    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        // Try to load from default locations
        Config::from_default_locations(&root)?
    };

    // Override with CLI arguments
    if cli.root.is_some() || config.workspace_root.is_none() {
        config.workspace_root = Some(root);
    }

    debug!("Configuration: {:?}", config);
    Ok(config)
}

fn run(cli: &Cli) -> Result<u8> {
    let config = load_config(cli)?;

    match &cli.command {
        Command::Check(args) => run_check(&config, args),
        Command::UpdateBaseline {
            signature,
            baseline,
        } => {
            update_baseline(&config, signature, baseline.as_deref(), cli.quiet)?;
            Ok(0)
        }
        Command::Symbols { signature, kind } => {
            print_symbols(&config, signature, *kind)?;
            Ok(0)
        }
        Command::Sections { report } => {
            let text = read_text(report, "report")?;
            print_sections(&split_report(&config, &text)?);
            Ok(0)
        }
    }
}

fn run_check(config: &Config, args: &CheckArgs) -> Result<u8> {
    let signature = read_text(&args.signature, "signature")?;

    let baseline_path = args
        .baseline
        .clone()
        .unwrap_or_else(|| config.baseline_path());
    info!("Loading baseline from {:?}...", baseline_path);
    let baseline = Baseline::load(&baseline_path)?;

    let report_text = if let Some(path) = &args.report {
        Some(read_text(path, "report")?)
    } else if args.extract {
        let extractor = Extractor::locate(config, args.java_home.as_deref())?;
        Some(extractor.run()?)
    } else {
        None
    };

    let sections = report_text
        .as_deref()
        .map(|text| split_report(config, text))
        .transpose()?;

    let classes_baseline = match (&sections, config.classes_baseline_path()) {
        (Some(_), Some(path)) => Some(Baseline::load(&path)?),
        _ => None,
    };

    let gate = ComplianceGate::from_config(config);
    let verdict = gate
        .evaluate(GateInput {
            signature: &signature,
            baseline: &baseline,
            report: sections.as_ref(),
            classes_baseline: classes_baseline.as_ref(),
        })
        .wrap_err_with(|| format!("Invalid signature file: {}", args.signature.display()))?;

    let reporter = Reporter::new(args.format.clone().into(), args.output.clone());
    reporter.report(&verdict)?;

    Ok(verdict.exit_code())
}

fn update_baseline(
    config: &Config,
    signature: &Path,
    baseline: Option<&Path>,
    quiet: bool,
) -> Result<()> {
    let packages = signature_parser(config).parse_file(signature)?;
    let symbols = SymbolSetBuilder::build(&packages);

    let path = baseline
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.baseline_path());
    let count = symbols.len();
    Baseline::new(&path, symbols).save()?;

    if !quiet {
        println!(
            "{}",
            format!("Baseline updated: {} ({} symbols)", path.display(), count).green()
        );
    }
    Ok(())
}

fn print_symbols(config: &Config, signature: &Path, kind: SymbolKind) -> Result<()> {
    let packages = signature_parser(config).parse_file(signature)?;

    let lines: Vec<String> = match kind {
        SymbolKind::All => to_lines(SymbolSetBuilder::build(&packages)),
        SymbolKind::Methods => to_lines(SymbolSetBuilder::build_by_kind(&packages).0),
        SymbolKind::Fields => to_lines(SymbolSetBuilder::build_by_kind(&packages).1),
        SymbolKind::Classes => to_lines(SymbolSetBuilder::classes(&packages)),
        SymbolKind::Signatures => SymbolSetBuilder::signatures(&packages).into_iter().collect(),
    };

    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

fn signature_parser(config: &Config) -> SignatureParser {
    let parser = SignatureParser::new(config.signature.header.clone());
    debug!("Expecting signature header `{}`", parser.header());
    parser
}

fn to_lines<T: ToString>(items: impl IntoIterator<Item = T>) -> Vec<String> {
    items.into_iter().map(|i| i.to_string()).collect()
}

fn print_sections(sections: &Sections) {
    for section in sections.iter() {
        println!(
            "{}: {} lines",
            section.label.cyan().bold(),
            section.lines.len()
        );
    }
}

fn split_report(config: &Config, text: &str) -> Result<Sections> {
    let splitter = SectionSplitter::new(
        config.signature.marker_prefix.clone(),
        config.signature.sections.clone(),
    );
    Ok(splitter.split_text(text)?)
}

fn read_text(path: &Path, what: &str) -> Result<String> {
    std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read {} file: {}", what, path.display()))
}
