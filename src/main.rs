use anyhow::Result;
use clap::Parser;
use csindex::index::stats::list_roots;
use csindex::index::{ExtensionAllowList, IndexPipeline, TrigramStore};
use csindex::logging;
use csindex::utils::app_data::{ConfigFile, IndexLocator, IndexerConfig};
use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

const USAGE: &str = "\
usage: csindex [-d indexfile|indexdir] path [path...]
usage: csindex [-d indexfile] -list

Without -d the index is ./.csearchindex when building. For -list and a bare
-reset it is the nearest .csearchindex from the current directory upward,
else $CSEARCHINDEX, else $HOME/.csearchindex.
";

/// Flags that may be spelled with a single dash, as in `-list`
const LONG_FLAGS: &[&str] = &["list", "reset", "verbose", "ft"];

#[derive(Parser)]
#[command(name = "csindex")]
#[command(about = "Build or update a trigram index of source files")]
#[command(override_usage = "csindex [-d indexfile|indexdir] [--reset] [--verbose] [--ft=EXTS] [PATH]...\n       csindex [-d indexfile] --list")]
struct Cli {
    /// Index file, or a directory holding .csearchindex
    #[arg(short = 'd', value_name = "INDEXFILE")]
    index: Option<PathBuf>,

    /// List indexed paths and exit
    #[arg(long)]
    list: bool,

    /// Discard the existing index (deletes it when no paths are given)
    #[arg(long)]
    reset: bool,

    /// Print extra information
    #[arg(long)]
    verbose: bool,

    /// File types to index, e.g. c|h|cc
    #[arg(long = "ft", value_name = "EXTS")]
    file_types: Option<ExtensionAllowList>,

    /// Paths to index; defaults to the paths already in the index
    paths: Vec<PathBuf>,
}

/// Rewrite `-list` style flags to `--list` so clap accepts both spellings
fn normalize_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    let mut out = Vec::new();
    let mut passthrough = false;

    for arg in args {
        if passthrough {
            out.push(arg);
            continue;
        }
        let rewritten = arg.to_str().and_then(|s| {
            if s == "--" {
                return None;
            }
            let flag = s.strip_prefix('-').filter(|f| !f.starts_with('-'))?;
            let name = flag.split_once('=').map_or(flag, |(name, _)| name);
            LONG_FLAGS.contains(&name).then(|| OsString::from(format!("-{}", s)))
        });
        passthrough = arg == "--";
        out.push(rewritten.unwrap_or(arg));
    }
    out
}

fn main() -> Result<()> {
    let args: Vec<OsString> = std::env::args_os().collect();
    if args.len() <= 1 {
        eprint!("{}", USAGE);
        std::process::exit(2);
    }

    let cli = Cli::parse_from(normalize_args(args));
    logging::init(cli.verbose)?;

    let locator = IndexLocator::from_env()?;

    if cli.list {
        let index = locator.existing(cli.index.as_deref())?;
        let store = TrigramStore::default();
        return list_roots(&store, &index, &mut std::io::stdout().lock());
    }

    let config = IndexerConfig {
        reset: cli.reset,
        verbose: cli.verbose,
        show_progress: !cli.verbose && std::io::stderr().is_terminal(),
        ..IndexerConfig::from_file(ConfigFile::load()?, cli.file_types)
    };

    let master = if config.reset && cli.paths.is_empty() {
        locator.existing(cli.index.as_deref())?
    } else {
        locator.for_build(cli.index.as_deref())
    };

    let store = TrigramStore::new(config.max_file_size);
    IndexPipeline::new(&store, &config).run(&master, &cli.paths)?;

    Ok(())
}
