//! pageprobe - locate word-list occurrences on printed pages

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pageprobe::io::{read_pages, read_word_list, write_json, write_pages, write_table};
use pageprobe::util::time_seed_nanos;
use pageprobe::{
    ChapterMap, DEFAULT_DELIMITER, DEFAULT_THRESHOLD, DEFAULT_TITLE_STYLE, DocxPackage, Paginator,
    PaginatorConfig, PdftotextExtractor, Pipeline, PipelineConfig, ProbeMapper, RecoveredEntry,
    Report, Result, SofficeRenderer, dedup_entries, render_pages, sort_entries, strip_probes,
};

#[derive(Parser)]
#[command(name = "pageprobe")]
#[command(version, about = "Locate word-list occurrences on printed pages", long_about = None)]
#[command(after_help = "EXAMPLES:
    pageprobe run book.docx words.txt -o index.tsv       Seed, render, and map
    pageprobe run book.docx words.txt --paginate         Use the built-in paginator
    pageprobe map probe.txt clean.txt words.txt          Map from saved page dumps
    pageprobe index probe.txt                            Show the chapter map")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    options: Options,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Args)]
struct Options {
    /// Paragraph style that marks chapter titles
    #[arg(long, global = true, default_value = DEFAULT_TITLE_STYLE)]
    title_style: String,

    /// Character wrapped around each probe
    #[arg(long, global = true, default_value_t = DEFAULT_DELIMITER)]
    delimiter: char,

    /// Minimum match score, exclusive (0-100)
    #[arg(long, global = true, default_value_t = DEFAULT_THRESHOLD,
          value_parser = clap::value_parser!(u8).range(0..=100))]
    threshold: u8,

    /// Use chapter page lists as found instead of filling gaps
    #[arg(long, global = true)]
    no_fill_gaps: bool,
}

impl Options {
    fn config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_title_style(self.title_style.clone())
            .with_delimiter(self.delimiter)
            .with_threshold(self.threshold)
            .with_fill_page_gaps(!self.no_fill_gaps)
    }
}

#[derive(Args)]
struct TableOutput {
    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write JSON instead of a tab-separated table
    #[arg(long)]
    json: bool,

    /// Drop repeated (word, page, chapter) rows
    #[arg(long)]
    dedup: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Seed a DOCX, render it twice, and write the page table
    Run {
        /// Source document
        document: PathBuf,
        /// Word list, one word per line
        words: PathBuf,

        #[command(flatten)]
        table: TableOutput,

        /// Seed for probe placement (default: time-based)
        #[arg(long)]
        seed: Option<u64>,

        /// Also save the probe-bearing document
        #[arg(long, value_name = "DOCX")]
        seeded: Option<PathBuf>,

        /// Also save the clean document
        #[arg(long, value_name = "DOCX")]
        clean: Option<PathBuf>,

        /// Lay pages out in-process instead of calling soffice and pdftotext
        #[arg(long)]
        paginate: bool,

        /// Page capacity for --paginate
        #[arg(long, default_value_t = 1800, requires = "paginate")]
        chars_per_page: usize,

        /// LibreOffice executable
        #[arg(long, default_value = "soffice")]
        soffice: String,

        /// pdftotext executable
        #[arg(long, default_value = "pdftotext")]
        pdftotext: String,
    },

    /// Write the probe-bearing and clean documents without rendering
    Seed {
        document: PathBuf,
        words: PathBuf,
        /// Probe-bearing output
        seeded: PathBuf,
        /// Clean output
        clean: PathBuf,
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the chapter map of a page-text dump, gaps filled unless
    /// --no-fill-gaps is given
    Index {
        /// Page texts separated by form feeds
        pages: PathBuf,
        #[arg(long)]
        json: bool,
    },

    /// Map probes between two saved page-text dumps
    Map {
        /// Pages of the probe-bearing rendering
        probe_pages: PathBuf,
        /// Pages of the clean rendering
        clean_pages: PathBuf,
        words: PathBuf,
        #[command(flatten)]
        table: TableOutput,
    },

    /// Lay a DOCX out with the built-in paginator and dump its pages
    Paginate {
        document: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = 1800)]
        chars_per_page: usize,
        /// Emit a `Chapter <n>` page before each chapter
        #[arg(long)]
        title_pages: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match execute(cli.command, &cli.options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pageprobe={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn execute(command: Command, options: &Options) -> Result<()> {
    let config = options.config();
    match command {
        Command::Run {
            document,
            words,
            table,
            seed,
            seeded,
            clean,
            paginate,
            chars_per_page,
            soffice,
            pdftotext,
        } => {
            let package = DocxPackage::open(&document)?;
            let words = read_word_list(&words)?;
            let mut rng = rng(seed);

            let report = if paginate {
                let paginator = Paginator::new(PaginatorConfig {
                    chars_per_page,
                    title_style: config.title_style.clone(),
                    ..PaginatorConfig::default()
                });
                Pipeline::with_config(paginator.clone(), paginator, config)
                    .run(package.document(), &words, &mut rng)?
            } else {
                let renderer = SofficeRenderer::new(package.clone()).with_program(soffice);
                let extractor = PdftotextExtractor::new().with_program(pdftotext);
                Pipeline::with_config(renderer, extractor, config)
                    .run(package.document(), &words, &mut rng)?
            };

            save_documents(&package, &report, seeded.as_deref(), clean.as_deref())?;
            emit(report.mapping.entries, &table)
        }
        Command::Seed {
            document,
            words,
            seeded,
            clean,
            seed,
        } => {
            let package = DocxPackage::open(&document)?;
            let words = read_word_list(&words)?;
            let mut probed = package.document().clone();
            let probes = config.seeder().seed(&mut probed, &words, &mut rng(seed))?;
            package.save(&probed, &seeded)?;
            package.save(&strip_probes(&probed, config.delimiter), &clean)?;
            info!(
                probes = probes.len(),
                seeded = %seeded.display(),
                clean = %clean.display(),
                "wrote documents"
            );
            Ok(())
        }
        Command::Index { pages, json } => {
            let pages = read_pages(&pages)?;
            print_map(&config.chapter_map(&pages), json)
        }
        Command::Map {
            probe_pages,
            clean_pages,
            words,
            table,
        } => {
            let probe_pages = read_pages(&probe_pages)?;
            let clean_pages = read_pages(&clean_pages)?;
            let words = read_word_list(&words)?;
            let mapping =
                ProbeMapper::with_config(config).map_pages(&probe_pages, &clean_pages, &words);
            emit(mapping.entries, &table)
        }
        Command::Paginate {
            document,
            output,
            chars_per_page,
            title_pages,
        } => {
            let package = DocxPackage::open(&document)?;
            let paginator = Paginator::new(PaginatorConfig {
                chars_per_page,
                title_style: config.title_style,
                title_pages,
                ..PaginatorConfig::default()
            });
            let pages = render_pages(&paginator, &paginator, package.document())?;
            write_pages(&pages, open_output(output.as_deref())?)
        }
    }
}

fn rng(seed: Option<u64>) -> StdRng {
    let seed = seed.unwrap_or_else(time_seed_nanos);
    info!(seed, "probe placement seed");
    StdRng::seed_from_u64(seed)
}

fn save_documents(
    package: &DocxPackage,
    report: &Report,
    seeded: Option<&Path>,
    clean: Option<&Path>,
) -> Result<()> {
    if let Some(path) = seeded {
        package.save(&report.seeded, path)?;
    }
    if let Some(path) = clean {
        package.save(&report.clean, path)?;
    }
    Ok(())
}

fn emit(mut entries: Vec<RecoveredEntry>, table: &TableOutput) -> Result<()> {
    if table.dedup {
        dedup_entries(&mut entries);
    } else {
        sort_entries(&mut entries);
    }

    let writer = open_output(table.output.as_deref())?;
    if table.json {
        write_json(&entries, writer)
    } else {
        write_table(&entries, writer)
    }
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn print_map(map: &ChapterMap, json: bool) -> Result<()> {
    let mut out = BufWriter::new(io::stdout().lock());
    if json {
        serde_json::to_writer_pretty(&mut out, map).map_err(io::Error::from)?;
        writeln!(out)?;
    } else {
        writeln!(out, "Chapter\tPages")?;
        for (chapter, pages) in map.iter() {
            let pages: Vec<String> = pages.iter().map(u32::to_string).collect();
            writeln!(out, "{chapter}\t{}", pages.join(","))?;
        }
    }
    out.flush()?;
    Ok(())
}
