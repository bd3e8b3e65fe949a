use std::num::NonZeroU32;
use std::path::PathBuf;

use datone_format::{DatPath, Endianness, Game};
use structopt::clap::AppSettings::*;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;

#[derive(Debug, StructOpt)]
enum Commands {
    #[structopt(name = "list", visible_alias = "l", about = "List the files of an archive")]
    List {
        #[structopt(
            short = "f",
            long = "archive-file",
            parse(from_os_str),
            help = "Path to the .dat archive"
        )]
        path: PathBuf,

        #[structopt(
            short,
            long,
            default_value = "little",
            help = "Byte order of the archive [little, big]"
        )]
        endian: Endianness,

        #[structopt(short = "d", long = "list-dir", help = "Only list this directory")]
        list_dir: Option<DatPath>,
    },

    #[structopt(
        name = "extract",
        visible_alias = "x",
        about = "Extract the files of one or more archives"
    )]
    Extract {
        #[structopt(
            short = "f",
            long = "archive-file",
            parse(from_os_str),
            required = true,
            help = "Paths to the .dat archives"
        )]
        paths: Vec<PathBuf>,

        #[structopt(
            short,
            long,
            default_value = "little",
            help = "Byte order of the archives [little, big]"
        )]
        endian: Endianness,

        #[structopt(
            short,
            long = "output-dir",
            parse(from_os_str),
            default_value = ".",
            help = "Directory to extract into"
        )]
        output_dir: PathBuf,

        #[structopt(short = "c", long, help = "Decompress RNC packed files")]
        decompress: bool,

        #[structopt(
            long,
            parse(from_os_str),
            default_value = "propack",
            help = "ProPack program used to decompress RNC packed files"
        )]
        propack: PathBuf,
    },

    #[structopt(name = "build", visible_alias = "b", about = "Build an archive from a directory")]
    Build {
        #[structopt(
            short = "f",
            long = "archive-file",
            parse(from_os_str),
            help = "Path of the .dat archive to write"
        )]
        path: PathBuf,

        #[structopt(
            short,
            long,
            default_value = "little",
            help = "Byte order of the archive [little, big]"
        )]
        endian: Endianness,

        #[structopt(
            short,
            long,
            default_value = "lsw1",
            help = "Game the archive is for [lsw1, lsw2, tcs]"
        )]
        game: Game,

        #[structopt(
            short,
            long = "data-dir",
            parse(from_os_str),
            help = "Directory whose files are archived"
        )]
        data_dir: PathBuf,

        #[structopt(
            short = "a",
            long = "align",
            default_value = "1",
            help = "Align file data to this many bytes"
        )]
        alignment: NonZeroU32,
    },

    #[structopt(
        name = "modify",
        visible_alias = "m",
        about = "Add or replace files of an existing archive"
    )]
    Modify {
        #[structopt(
            short = "f",
            long = "archive-file",
            parse(from_os_str),
            help = "Path to the .dat archive"
        )]
        path: PathBuf,

        #[structopt(
            short,
            long,
            default_value = "little",
            help = "Byte order of the archive [little, big]"
        )]
        endian: Endianness,

        #[structopt(
            short,
            long,
            default_value = "lsw1",
            help = "Game the archive is for [lsw1, lsw2, tcs]"
        )]
        game: Game,

        #[structopt(
            short,
            long = "patch-dir",
            parse(from_os_str),
            help = "Directory whose files are overlaid onto the archive"
        )]
        patch_dir: PathBuf,

        #[structopt(
            short,
            long = "output-file",
            parse(from_os_str),
            help = "Write the result here instead of over the archive"
        )]
        output_file: Option<PathBuf>,
    },
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "datone",
    about = "List, extract, build and patch TT Games .dat archives.",
    settings = &[SubcommandRequiredElseHelp, DisableHelpSubcommand, VersionlessSubcommands]
)]
struct CliOpts {
    #[structopt(short, long, help = "Show verbose output", global = true)]
    verbose: bool,

    #[structopt(subcommand)]
    cmd: Commands,
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "info" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(opts: CliOpts) -> anyhow::Result<()> {
    let verbose = opts.verbose;

    match opts.cmd {
        Commands::List {
            path,
            endian,
            list_dir,
        } => commands::list(path, endian, list_dir, verbose)?,
        Commands::Extract {
            paths,
            endian,
            output_dir,
            decompress,
            propack,
        } => commands::extract(paths, endian, output_dir, decompress, propack, verbose)?,
        Commands::Build {
            path,
            endian,
            game,
            data_dir,
            alignment,
        } => commands::build(path, endian, game, data_dir, alignment)?,
        Commands::Modify {
            path,
            endian,
            game,
            patch_dir,
            output_file,
        } => commands::modify(path, endian, game, patch_dir, output_file)?,
    }

    Ok(())
}

fn main() {
    let opts = CliOpts::from_iter(wild::args_os());
    init_logging(opts.verbose);
    tracing::debug!(?opts, "parsed arguments");

    if let Err(e) = run(opts) {
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
}
