//! Command-line definition

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use comfyq_edit::{ModeParams, SeedMode, SeedScope};
use std::path::PathBuf;

use crate::error::DriverError;
use crate::options::{ReframeOptions, ReseedOptions};

/// A parsed invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// `comfyq reframe`
    Reframe(ReframeOptions),
    /// `comfyq reseed`
    Reseed(ReseedOptions),
}

impl Invocation {
    /// Whether the report should be printed as JSON
    #[inline]
    #[must_use]
    pub fn json(&self) -> bool {
        match self {
            Self::Reframe(options) => options.json,
            Self::Reseed(options) => options.json,
        }
    }
}

/// Global flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verbosity {
    /// Number of `-v`
    pub verbose: u8,
    /// `-q` given
    pub quiet: bool,
}

/// Build the `comfyq` command
#[must_use]
pub fn command() -> Command {
    Command::new("comfyq")
        .version(crate::VERSION)
        .about("Batch edits for saved workflow queues")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("More log output (repeatable)"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Only log errors"),
        )
        .subcommand(
            Command::new("reframe")
                .about("Set the video frame count and rename output prefixes")
                .arg(
                    Arg::new("file")
                        .long("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Queue document to edit"),
                )
                .arg(
                    Arg::new("frames")
                        .long("frames")
                        .required(true)
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(i64))
                        .help("New frame count"),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .value_parser(value_parser!(PathBuf))
                        .help("Output path (default: <stem>.frames<N><ext> beside the input)"),
                )
                .arg(dry_run_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("reseed")
                .about("Rewrite sampler seeds")
                .arg(
                    Arg::new("in")
                        .long("in")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Queue document to edit"),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Output path"),
                )
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .required(true)
                        .value_name("MODE")
                        .help("Seed mode: random | increment"),
                )
                .arg(
                    Arg::new("rng-seed")
                        .long("rng-seed")
                        .value_parser(value_parser!(u64))
                        .help("Generator seed for random mode"),
                )
                .arg(
                    Arg::new("start")
                        .long("start")
                        .value_parser(value_parser!(u64))
                        .help("First seed for increment mode (default 0)"),
                )
                .arg(
                    Arg::new("step")
                        .long("step")
                        .value_parser(value_parser!(u64))
                        .help("Increment for increment mode (default 1)"),
                )
                .arg(
                    Arg::new("scope")
                        .long("scope")
                        .value_name("SCOPE")
                        .help("Counter scope for increment mode: global | job (default global)"),
                )
                .arg(
                    Arg::new("sections")
                        .long("sections")
                        .num_args(1..)
                        .action(ArgAction::Append)
                        .help(
                            "Only these sections: queue_running | queue_pending | queue_failed \
                             (default queue_running queue_pending)",
                        ),
                )
                .arg(dry_run_arg())
                .arg(json_arg()),
        )
}

fn dry_run_arg() -> Arg {
    Arg::new("dry-run")
        .long("dry-run")
        .action(ArgAction::SetTrue)
        .help("Report changes without writing")
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print the report as JSON")
}

/// Read the global flags
#[must_use]
pub fn verbosity(matches: &ArgMatches) -> Verbosity {
    Verbosity {
        verbose: matches.get_count("verbose"),
        quiet: matches.get_flag("quiet"),
    }
}

/// Turn parsed arguments into options
///
/// # Errors
/// Returns error for unknown mode or scope names
pub fn invocation(matches: &ArgMatches) -> Result<Invocation, DriverError> {
    match matches.subcommand() {
        Some(("reframe", args)) => Ok(Invocation::Reframe(reframe_options(args)?)),
        Some(("reseed", args)) => Ok(Invocation::Reseed(reseed_options(args)?)),
        Some((other, _)) => Err(DriverError::InvalidArgument(format!("unknown command {other}"))),
        None => Err(DriverError::InvalidArgument("missing command".to_string())),
    }
}

fn required<'a, T>(args: &'a ArgMatches, id: &str) -> Result<&'a T, DriverError>
where
    T: Clone + Send + Sync + 'static,
{
    args.get_one::<T>(id)
        .ok_or_else(|| DriverError::InvalidArgument(format!("--{id} is required")))
}

fn reframe_options(args: &ArgMatches) -> Result<ReframeOptions, DriverError> {
    let mut options = ReframeOptions::new(
        required::<PathBuf>(args, "file")?.clone(),
        *required::<i64>(args, "frames")?,
    )
    .with_dry_run(args.get_flag("dry-run"))
    .with_json(args.get_flag("json"));
    if let Some(out) = args.get_one::<PathBuf>("out") {
        options = options.with_output(out.clone());
    }
    Ok(options)
}

fn reseed_options(args: &ArgMatches) -> Result<ReseedOptions, DriverError> {
    let mode: SeedMode = required::<String>(args, "mode")?.parse()?;
    let scope = args
        .get_one::<String>("scope")
        .map(|s| s.parse::<SeedScope>())
        .transpose()?;
    let sections: Vec<String> = args
        .get_many::<String>("sections")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    let mut options = ReseedOptions::new(
        required::<PathBuf>(args, "in")?.clone(),
        required::<PathBuf>(args, "out")?.clone(),
        mode,
    )
    .with_sections(sections)
    .with_dry_run(args.get_flag("dry-run"))
    .with_json(args.get_flag("json"));
    options.params = ModeParams {
        rng_seed: args.get_one::<u64>("rng-seed").copied(),
        start: args.get_one::<u64>("start").copied(),
        step: args.get_one::<u64>("step").copied(),
        scope,
    };
    Ok(options)
}
