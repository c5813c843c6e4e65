//! Command-line handling for the `node` binary.

use crate::config::{BoardProfile, ConfigError, FrequencyBand};
use std::path::PathBuf;

pub const USAGE: &str =
    "Usage: node [--board <ada-m0|pro-mini>] [--config <file.json>] [--band <433|868|915>]";

/// Options for a bring-up run.
#[derive(Debug, Default, PartialEq)]
pub struct Args {
    pub board: Option<BoardProfile>,
    pub config: Option<PathBuf>,
    pub band: Option<FrequencyBand>,
}

/// Parsed command line.
#[derive(Debug, PartialEq)]
pub enum Command {
    /// Show usage and exit.
    Help,
    /// Run bring-up.
    Run(Args),
}

impl Command {
    /// Parse arguments, program name excluded.
    pub fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut parsed = Args::default();
        while let Some(arg) = args.next() {
            let mut value = |name: &str| {
                args.next()
                    .ok_or_else(|| format!("missing value for {}", name))
            };
            match arg.as_str() {
                "--board" => {
                    let board = value("--board")?;
                    parsed.board = Some(board.parse().map_err(|e: ConfigError| e.to_string())?);
                }
                "--config" => parsed.config = Some(PathBuf::from(value("--config")?)),
                "--band" => {
                    let band = value("--band")?;
                    parsed.band = Some(band.parse().map_err(|e: ConfigError| e.to_string())?);
                }
                "-h" | "--help" => return Ok(Command::Help),
                other => return Err(format!("unknown argument: {}", other)),
            }
        }
        Ok(Command::Run(parsed))
    }
}

/// Pick the board: `--board`, then a non-blank `RFM69_BOARD`, then the
/// config file's board.
pub fn resolve_board(
    flag: Option<BoardProfile>,
    env_value: Option<&str>,
    file_board: BoardProfile,
) -> Result<BoardProfile, ConfigError> {
    if let Some(board) = flag {
        return Ok(board);
    }
    Ok(BoardProfile::from_env_value(env_value)?.unwrap_or(file_board))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, String> {
        Command::parse(args.iter().map(|s| s.to_string()))
    }

    // ==================== Parsing ====================

    #[test]
    fn test_no_args() {
        assert_eq!(parse(&[]), Ok(Command::Run(Args::default())));
    }

    #[test]
    fn test_all_options() {
        let cmd = parse(&["--board", "pro-mini", "--config", "node.json", "--band", "868"]);
        assert_eq!(
            cmd,
            Ok(Command::Run(Args {
                board: Some(BoardProfile::ProMini),
                config: Some(PathBuf::from("node.json")),
                band: Some(FrequencyBand::Mhz868),
            }))
        );
    }

    #[test]
    fn test_help() {
        assert_eq!(parse(&["--help"]), Ok(Command::Help));
        assert_eq!(parse(&["-h"]), Ok(Command::Help));
        assert_eq!(parse(&["--board", "ada-m0", "--help"]), Ok(Command::Help));
    }

    #[test]
    fn test_bad_args() {
        assert_eq!(
            parse(&["--board"]),
            Err("missing value for --board".to_string())
        );
        assert_eq!(
            parse(&["--verbose"]),
            Err("unknown argument: --verbose".to_string())
        );
        assert!(parse(&["--board", "uno"]).is_err());
        assert!(parse(&["--band", "2400"]).is_err());
    }

    // ==================== Board precedence ====================

    #[test]
    fn test_flag_wins() {
        let board = resolve_board(Some(BoardProfile::ProMini), Some("ada-m0"), BoardProfile::AdafruitM0);
        assert_eq!(board, Ok(BoardProfile::ProMini));
    }

    #[test]
    fn test_env_over_file() {
        let board = resolve_board(None, Some("pro-mini"), BoardProfile::AdafruitM0);
        assert_eq!(board, Ok(BoardProfile::ProMini));
    }

    #[test]
    fn test_blank_env_keeps_file_board() {
        assert_eq!(
            resolve_board(None, Some(""), BoardProfile::ProMini),
            Ok(BoardProfile::ProMini)
        );
        assert_eq!(
            resolve_board(None, Some(" "), BoardProfile::ProMini),
            Ok(BoardProfile::ProMini)
        );
        assert_eq!(
            resolve_board(None, None, BoardProfile::ProMini),
            Ok(BoardProfile::ProMini)
        );
    }

    #[test]
    fn test_unknown_env_board() {
        assert!(matches!(
            resolve_board(None, Some("uno"), BoardProfile::AdafruitM0),
            Err(ConfigError::UnknownBoard(_))
        ));
    }
}
