#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use gbsave::save::{self, PackOptions, SaveError};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

#[derive(Debug, Parser)]
#[command(
    name = "gbsave",
    version,
    about = "Game Baker savefile unpacker",
    after_help = "If the output directory doesn't exist it will be created.\n\
                  If the output savefile exists it will be overwritten."
)]
struct Cli {
    /// More log output (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Unpack a savefile into a directory (also `-unpack`).
    Unpack {
        /// Savefile to read.
        savefile: PathBuf,
        /// Output directory.
        output: PathBuf,
    },

    /// Pack a directory into a savefile (also `-pack`).
    Pack {
        /// Savefile to write.
        savefile: PathBuf,
        /// Directory holding the files to pack.
        input: PathBuf,
        /// Sort entries by file name for reproducible savefiles.
        #[arg(long, default_value_t = false)]
        sort: bool,
    },

    /// List entries in a savefile (also `-list`).
    List {
        savefile: PathBuf,
        /// Print offsets and sizes too.
        #[arg(long, default_value_t = false)]
        long: bool,
    },

    /// Check savefile structure: terminator, padding, alignment (also `-verify`).
    Verify { savefile: PathBuf },
}

/// Rewrites the first single-dash verb (`-pack`, `-unpack`, ...) into its subcommand.
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut rewritten = false;
    args.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 || rewritten {
                return arg;
            }
            match arg.to_str() {
                Some(verb @ ("-pack" | "-unpack" | "-list" | "-verify")) => {
                    rewritten = true;
                    OsString::from(&verb[1..])
                }
                Some("pack" | "unpack" | "list" | "verify") => {
                    rewritten = true;
                    arg
                }
                _ => arg,
            }
        })
        .collect()
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, 2) => Level::DEBUG,
        (false, _) => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cmd: Command) -> save::SaveResult<()> {
    match cmd {
        Command::Unpack { savefile, output } => {
            let n = save::unpack(&savefile, &output)?;
            println!("unpacked {n} files into {}", output.display());
        }
        Command::Pack {
            savefile,
            input,
            sort,
        } => {
            let n = save::pack(&savefile, &input, &PackOptions { sort })?;
            println!("packed {n} files into {}", savefile.display());
        }
        Command::List { savefile, long } => save::list(&savefile, long)?,
        Command::Verify { savefile } => {
            let report = save::verify(&savefile)?;
            println!("ok: {} entries", report.entries);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse_from(normalize_args(std::env::args_os())) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            if !e.use_stderr() {
                // --help / --version
                return ExitCode::SUCCESS;
            }
            let err = SaveError::BadArguments(format!("{:?}", e.kind()));
            return ExitCode::from(err.exit_code());
        }
    };

    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(cli.cmd) {
        eprintln!("error: {e}");
        return ExitCode::from(e.exit_code());
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn legacy_verbs_become_subcommands() {
        let args = normalize_args(os(&["gbsave", "-unpack", "save.dat", "out"]));
        assert_eq!(args, os(&["gbsave", "unpack", "save.dat", "out"]));

        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(cli.cmd, Command::Unpack { .. }));
    }

    #[test]
    fn only_the_verb_is_rewritten() {
        let args = normalize_args(os(&["gbsave", "-pack", "-pack", "dir"]));
        assert_eq!(args, os(&["gbsave", "pack", "-pack", "dir"]));
    }

    #[test]
    fn flags_before_the_verb_are_kept() {
        let args = normalize_args(os(&["gbsave", "-v", "-pack", "out.sav", "dir"]));
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.cmd {
            Command::Pack { savefile, input, sort } => {
                assert_eq!(savefile, PathBuf::from("out.sav"));
                assert_eq!(input, PathBuf::from("dir"));
                assert!(!sort);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn missing_arguments_are_usage_errors() {
        let err = Cli::try_parse_from(normalize_args(os(&["gbsave", "-unpack", "save.dat"])))
            .unwrap_err();
        assert!(err.use_stderr());
    }

    #[test]
    fn unknown_verb_is_a_usage_error() {
        assert!(Cli::try_parse_from(os(&["gbsave", "-explode", "a", "b"])).is_err());
        assert!(Cli::try_parse_from(os(&["gbsave"])).is_err());
    }
}
