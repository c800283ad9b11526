mod logger;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, error, info, warn};
use pdf_booklet::{
    Backend, BookletContext, BookletError, BookletOptions, ExternalTools, NativeTools, PdfToolkit,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "make-booklet",
    about = "Create a booklet PDF from an input PDF.",
    version
)]
struct Cli {
    /// The input PDF file
    input_pdf: Option<PathBuf>,

    /// The output booklet PDF file. Defaults to input filename suffixed with '-booklet.pdf'
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// The total number of pages (required if --print-pages is used without input_pdf)
    #[arg(short = 'n', long)]
    pages: Option<usize>,

    /// The starting page number [default: 1]
    #[arg(short = 'S', long, value_parser = clap::value_parser!(i64).range(1..))]
    start: Option<i64>,

    /// The separator to use when printing the page numbers [default: " "]
    #[arg(short, long)]
    separator: Option<String>,

    /// Print the page order for booklet printing and exit
    #[arg(long)]
    print_pages: bool,

    /// Show statistics only, don't generate PDF
    #[arg(long, conflicts_with = "print_pages")]
    stats_only: bool,

    /// Preserve the temporary directory
    #[arg(long)]
    keep_temp: bool,

    /// Increase verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Overwrite the output file if it exists
    #[arg(short, long)]
    force: bool,

    /// Which tools perform the PDF manipulation [default: external]
    #[arg(long, value_enum)]
    backend: Option<BackendArg>,

    /// Output paper size [default: a4]
    #[arg(long, value_enum)]
    paper: Option<PaperArg>,

    /// Load options from a JSON file; command-line flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendArg {
    External,
    Native,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PaperArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::External => Self::External,
            BackendArg::Native => Self::Native,
        }
    }
}

impl From<PaperArg> for pdf_booklet::PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A3 => Self::A3,
            PaperArg::A4 => Self::A4,
            PaperArg::A5 => Self::A5,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
            PaperArg::Tabloid => Self::Tabloid,
        }
    }
}

impl Cli {
    /// Merge the command line over the config file (or the defaults)
    async fn options(&self) -> Result<BookletOptions> {
        let mut options = match &self.config {
            Some(path) => BookletOptions::load(path)
                .await
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => BookletOptions::default(),
        };

        if let Some(input) = &self.input_pdf {
            options.input = Some(input.clone());
        }
        if let Some(output) = &self.output {
            options.output = Some(output.clone());
        }
        if let Some(pages) = self.pages {
            options.page_count = Some(pages);
        }
        if let Some(start) = self.start {
            options.start_page = start;
        }
        if let Some(separator) = &self.separator {
            options.separator = separator.clone();
        }
        if let Some(backend) = self.backend {
            options.backend = backend.into();
        }
        if let Some(paper) = self.paper {
            options.paper_size = paper.into();
        }
        options.keep_temp |= self.keep_temp;
        options.force |= self.force;

        Ok(options)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logger::CliLogger::from_verbosity(cli.verbose).init() {
        eprintln!("failed to initialise logging: {}", e);
    }
    debug!("Parsed arguments: {:?}", cli);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let options = cli.options().await?;
    let paper = options.paper_size;

    match options.backend {
        Backend::External => {
            dispatch(cli, options, &ExternalTools::new(paper), shutdown_signal()).await
        }
        Backend::Native => {
            dispatch(cli, options, &NativeTools::new(paper), shutdown_signal()).await
        }
    }
}

/// Run the mode selected on the command line. Booklet generation is abandoned
/// when `shutdown` resolves first.
async fn dispatch<T, S>(cli: &Cli, options: BookletOptions, toolkit: &T, shutdown: S) -> Result<()>
where
    T: PdfToolkit,
    S: Future<Output = &'static str>,
{
    if cli.print_pages {
        let order = pdf_booklet::page_order(&options, toolkit).await?;
        println!(
            "{}",
            pdf_booklet::format_page_order(&order, &options.separator)
        );
        return Ok(());
    }

    if cli.stats_only {
        let stats = pdf_booklet::booklet_statistics(&options, toolkit).await?;
        print_statistics(&stats);
        return Ok(());
    }

    // Dropping the context on any path below removes the working directory
    let ctx = BookletContext::new(options)?;
    info!(
        "Creating booklet '{}' from '{}'",
        ctx.output().display(),
        ctx.input().display()
    );

    tokio::select! {
        result = pdf_booklet::make_booklet(&ctx, toolkit) => {
            let report = result?;
            debug!("Booklet statistics: {:?}", report.statistics);
        }
        signal = shutdown => {
            info!("Signal received, cleaning up temporary files.");
            return Err(BookletError::Interrupted(signal).into());
        }
    }

    Ok(())
}

fn print_statistics(stats: &pdf_booklet::BookletStatistics) {
    println!("Booklet Statistics:");
    println!("  Source pages: {}", stats.source_pages);
    println!("  Booklet pages: {}", stats.booklet_pages);
    println!("  Blank pages added: {}", stats.blank_pages_added);
    println!("  Sheets: {}", stats.sheets);
    println!("  Printed sides: {}", stats.printed_sides);
}

/// Resolve when the process is asked to stop, naming the signal
#[cfg(unix)]
async fn shutdown_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    match (signal(SignalKind::terminate()), signal(SignalKind::quit())) {
        (Ok(mut term), Ok(mut quit)) => tokio::select! {
            _ = ctrl_c() => "SIGINT",
            _ = term.recv() => "SIGTERM",
            _ = quit.recv() => "SIGQUIT",
        },
        _ => {
            warn!("Failed to install SIGTERM/SIGQUIT handlers");
            ctrl_c().await;
            "SIGINT"
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> &'static str {
    ctrl_c().await;
    "Ctrl-C"
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
