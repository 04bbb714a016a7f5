//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "riverdata", author, version)]
#[command(about = "Read river flow and level readings through a local cache")]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true, env = "RIVERDATA_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Readings for one measure, fetched through the cache
    Readings(ReadingsArgs),
    /// Latest readings for every measure at a station (not cached)
    Station(StationArgs),
    /// Inspect or clear the reading cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Debug, Clone, Args)]
pub struct ReadingsArgs {
    /// Measure id, e.g. 3400TH-flow--i-15_min-m3_s
    pub measure_id: String,

    /// Start of the window in whole days before today (default 7)
    #[arg(long, conflicts_with = "since")]
    pub days: Option<u32>,

    /// Start of the window as an RFC 3339 timestamp
    #[arg(long, value_name = "TIMESTAMP")]
    pub since: Option<String>,

    /// Print the readings as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Ignore the throttle interval and ask the API now
    #[arg(long)]
    pub refresh: bool,
}

#[derive(Debug, Clone, Args)]
pub struct StationArgs {
    /// Station id, e.g. 3400TH
    pub station_id: String,

    /// Only measures of this parameter, e.g. flow or level
    #[arg(long)]
    pub parameter: Option<String>,

    /// Hours of readings to request
    #[arg(long, default_value = "24")]
    pub hours: u32,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CacheCommands {
    /// List cached measure ids
    List,
    /// Print the stored entry for a measure as JSON
    Show {
        measure_id: String,
    },
    /// Remove one cached measure, or all of them
    Clear {
        measure_id: Option<String>,
    },
    /// Summarize what the cache holds
    Stats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_readings() {
        let cli = Cli::try_parse_from([
            "riverdata",
            "readings",
            "3400TH-flow--i-15_min-m3_s",
            "--days",
            "3",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Readings(args) => {
                assert_eq!(args.measure_id, "3400TH-flow--i-15_min-m3_s");
                assert_eq!(args.days, Some(3));
                assert!(args.json);
                assert!(!args.refresh);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_days_conflicts_with_since() {
        let result = Cli::try_parse_from([
            "riverdata",
            "readings",
            "m",
            "--days",
            "3",
            "--since",
            "2023-05-13T00:00:00Z",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_cache_clear_all() {
        let cli = Cli::try_parse_from(["riverdata", "cache", "clear"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Cache {
                command: CacheCommands::Clear { measure_id: None }
            }
        ));
    }

    #[test]
    fn test_station_defaults() {
        let cli = Cli::try_parse_from(["riverdata", "station", "3400TH", "--parameter", "flow"]).unwrap();
        match cli.command {
            Commands::Station(args) => {
                assert_eq!(args.hours, 24);
                assert_eq!(args.parameter.as_deref(), Some("flow"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
