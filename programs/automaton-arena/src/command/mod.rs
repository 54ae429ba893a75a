use clap::{ArgAction, Parser, Subcommand};

use crate::logging::{init_logging, LogFormat};

use self::{check::CheckArg, graph::GraphArg, play::PlayArg, tournament::TournamentArg};

mod check;
mod graph;
mod play;
mod tournament;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value_t = LogFormat::Human,
        env = "ARENA_LOG_FORMAT",
        global = true
    )]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Parse and validate a strategy
    Check(#[clap(flatten)] CheckArg),
    /// Print the state graph of a strategy as JSON
    Graph(#[clap(flatten)] GraphArg),
    /// Play one match between two strategies
    Play(#[clap(flatten)] PlayArg),
    /// Run a round-robin tournament from a JSON document
    Tournament(#[clap(flatten)] TournamentArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_logging(args.log_format, args.verbose);
    match args.mode {
        Mode::Check(arg) => check::run(&arg)?,
        Mode::Graph(arg) => graph::run(&arg)?,
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Tournament(arg) => tournament::run(&arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition_is_valid() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_tournament_with_globals() {
        let args =
            CommandArgs::try_parse_from(["automaton-arena", "-vv", "tournament", "input.json"])
                .unwrap();
        assert_eq!(args.verbose, 2);
        assert!(matches!(args.mode, Mode::Tournament(_)));
    }

    #[test]
    fn test_log_format_reads_environment() {
        let command = CommandArgs::command();
        let log_format = command
            .get_arguments()
            .find(|arg| arg.get_id() == "log_format")
            .unwrap();
        assert_eq!(
            log_format.get_env(),
            Some(std::ffi::OsStr::new("ARENA_LOG_FORMAT"))
        );

        let args = CommandArgs::try_parse_from([
            "automaton-arena",
            "graph",
            "classic:pavlov",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(args.log_format, LogFormat::Json);
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(CommandArgs::try_parse_from(["automaton-arena"]).is_err());
    }
}
