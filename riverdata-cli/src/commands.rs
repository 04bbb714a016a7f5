//! Command execution.
//!
//! Each command renders its output to a string so it can be exercised with
//! an in-memory store and a fake source.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use riverdata_client::FloodMonitoringClient;
use riverdata_core::{
    format_date, format_time, parse_timestamp, start_of_day, DayAlignment, ReadingSource,
    RiverDataError, Series, Timestamp,
};
use riverdata_storage::{Freshness, KeyValueStore, LmdbStore, ReadingCache, ReadingsQuery};

use crate::cli::{CacheCommands, Cli, Commands, ReadingsArgs, StationArgs};
use crate::config::RiverDataConfig;
use crate::error::CliError;
use crate::summary;

/// Days before today covered when neither `--days` nor `--since` is given.
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Run a parsed command against the configured store and API.
pub async fn run(cli: &Cli, config: &RiverDataConfig) -> Result<String, CliError> {
    let client = Arc::new(FloodMonitoringClient::new(&config.client_config())?);

    match &cli.command {
        Commands::Station(args) => station(&client, args, Utc::now()).await,
        Commands::Readings(args) => {
            let cache = open_cache(config, client)?;
            readings(&cache, args, Utc::now()).await
        }
        Commands::Cache { command } => {
            let cache = open_cache(config, client)?;
            cache_command(&cache, command).await
        }
    }
}

fn open_cache(
    config: &RiverDataConfig,
    client: Arc<FloodMonitoringClient>,
) -> Result<ReadingCache<LmdbStore, FloodMonitoringClient>, CliError> {
    let store = Arc::new(LmdbStore::open(&config.store_path, config.store_max_size_mb)?);
    Ok(ReadingCache::new(store, client, config.cache_config()))
}

/// First timestamp of the window asked for by `args`.
pub fn resolve_since(
    args: &ReadingsArgs,
    now: DateTime<Utc>,
    alignment: DayAlignment,
) -> Result<Timestamp, CliError> {
    if let Some(since) = &args.since {
        return Ok(parse_timestamp(since).map_err(RiverDataError::from)?);
    }
    let days = args.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    Ok(start_of_day(now, -i64::from(days), alignment))
}

pub async fn readings<S, R>(
    cache: &ReadingCache<S, R>,
    args: &ReadingsArgs,
    now: DateTime<Utc>,
) -> Result<String, CliError>
where
    S: KeyValueStore + ?Sized,
    R: ReadingSource + ?Sized,
{
    let since = resolve_since(args, now, cache.config().day_alignment)?;
    let freshness = if args.refresh {
        Freshness::Refresh
    } else {
        Freshness::Throttled
    };
    let read = cache
        .read_measure(&args.measure_id, ReadingsQuery::since(since).with_freshness(freshness))
        .await?;

    tracing::debug!(
        measure_id = %args.measure_id,
        cache_hit = read.was_cache_hit(),
        checked_at = %read.checked_at(),
        staleness_secs = read.staleness().as_secs(),
        "Read measure"
    );

    if args.json {
        return Ok(serde_json::to_string_pretty(read.value())?);
    }
    Ok(summary::describe(&args.measure_id, read.value())?)
}

pub async fn station(
    client: &FloodMonitoringClient,
    args: &StationArgs,
    now: DateTime<Utc>,
) -> Result<String, CliError> {
    let since = now.timestamp() - i64::from(args.hours) * 3600;
    let measures = client
        .station_readings(&args.station_id, Some(since), args.parameter.as_deref())
        .await?;
    describe_station(&args.station_id, &measures)
}

/// One latest-reading sentence per measure.
pub fn describe_station(
    station_id: &str,
    measures: &BTreeMap<String, Series>,
) -> Result<String, CliError> {
    if measures.is_empty() {
        return Ok(format!("No readings found for station {station_id}."));
    }
    let lines = measures
        .iter()
        .map(|(measure_id, series)| {
            summary::latest_sentence(&summary::labels_for(measure_id), series)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

pub async fn cache_command<S, R>(
    cache: &ReadingCache<S, R>,
    command: &CacheCommands,
) -> Result<String, CliError>
where
    S: KeyValueStore + ?Sized,
    R: ReadingSource + ?Sized,
{
    match command {
        CacheCommands::List => Ok(cache.cached_measures()?.join("\n")),
        CacheCommands::Show { measure_id } => {
            let entry = cache
                .entry(measure_id)?
                .ok_or_else(|| CliError::NotCached(measure_id.clone()))?;
            Ok(serde_json::to_string_pretty(&entry)?)
        }
        CacheCommands::Clear { measure_id: Some(measure_id) } => {
            if cache.invalidate(measure_id).await? {
                Ok(format!("Removed cached readings for {measure_id}."))
            } else {
                Err(CliError::NotCached(measure_id.clone()))
            }
        }
        CacheCommands::Clear { measure_id: None } => {
            let removed = cache.invalidate_all().await?;
            Ok(format!("Removed {removed} cached measures."))
        }
        CacheCommands::Stats => cache_stats(cache),
    }
}

fn cache_stats<S, R>(cache: &ReadingCache<S, R>) -> Result<String, CliError>
where
    S: KeyValueStore + ?Sized,
    R: ReadingSource + ?Sized,
{
    let measures = cache.cached_measures()?;
    let mut total = 0;
    let mut lines = Vec::with_capacity(measures.len());
    for measure_id in &measures {
        let Some(entry) = cache.entry(measure_id)? else {
            continue;
        };
        total += entry.data.len();
        let mut line = format!("{measure_id}: {} readings", entry.data.len());
        if entry.last_checked_at > 0 {
            let _ = write!(
                line,
                ", last checked {} on {}",
                format_time(entry.last_checked_at).map_err(RiverDataError::from)?,
                format_date(entry.last_checked_at).map_err(RiverDataError::from)?,
            );
        }
        lines.push(line);
    }
    lines.insert(0, format!("{} cached measures, {total} readings", measures.len()));
    Ok(lines.join("\n"))
}
