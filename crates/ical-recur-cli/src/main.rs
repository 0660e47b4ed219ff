//! `recur` CLI — expand RRULEs and work with PERIOD lists from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # First five occurrences of a rule
//! recur expand --rule "FREQ=WEEKLY;BYDAY=MO,WE" --dtstart 20240101T090000Z --limit 5
//!
//! # Occurrences inside a window, in a named zone
//! recur expand --rule "FREQ=DAILY" --dtstart 20240301T090000 --tzid America/New_York \
//!     --from 20240309T000000Z --to 20240312T000000Z
//!
//! # Next occurrence after an instant
//! recur next --rule "FREQ=MONTHLY;BYMONTHDAY=-1" --dtstart 20240131 --after 20240215
//!
//! # Recurrence set of a component within a window
//! recur set --dtstart 20240101T090000Z --duration PT1H --rrule "FREQ=DAILY" \
//!     --exdate 20240102T090000Z --window 20240101T000000Z/P1W
//!
//! # Period list algebra (lists are comma separated, stdin when omitted)
//! recur normalise "20240101T090000Z/PT1H,20240101T093000Z/PT1H"
//! recur subtract "20240101T080000Z/PT8H" --minus "20240101T120000Z/PT1H"
//! recur free --busy "20240101T100000Z/PT1H" --window 20240101T080000Z/20240101T170000Z
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ical_recur::freebusy::{find_first_free_slot, find_free_slots};
use ical_recur::{
    parse_zone, Amount, Period, PeriodList, RDate, Recur, RecurConfig, RecurringComponent,
    Temporal, TemporalComparator,
};
use serde::Serialize;
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "recur",
    version,
    about = "iCalendar recurrence rule expansion and period algebra"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON engine configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Consecutive empty increments before expansion gives up (0 disables)
    #[arg(long, global = true)]
    max_increments: Option<i32>,

    /// Accept minute-precision and trailing data in date-time values
    #[arg(long, global = true)]
    relaxed: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List occurrences of a rule
    Expand {
        /// RRULE value, with or without the `RRULE:` prefix
        #[arg(short, long)]
        rule: String,
        /// First instance of the series
        #[arg(short, long)]
        dtstart: String,
        /// Bind a floating DTSTART to this zone
        #[arg(long)]
        tzid: Option<String>,
        /// Window start (defaults to DTSTART)
        #[arg(long)]
        from: Option<String>,
        /// Window end
        #[arg(long)]
        to: Option<String>,
        /// Stop after this many occurrences
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// First occurrence strictly after an instant
    Next {
        #[arg(short, long)]
        rule: String,
        #[arg(short, long)]
        dtstart: String,
        #[arg(long)]
        tzid: Option<String>,
        #[arg(long)]
        after: String,
    },
    /// Recurrence set of a component within a window
    Set {
        #[arg(short, long)]
        dtstart: String,
        #[arg(long)]
        tzid: Option<String>,
        /// DTEND of the first instance
        #[arg(long, conflicts_with = "duration")]
        end: Option<String>,
        /// DURATION of each instance
        #[arg(long)]
        duration: Option<String>,
        /// RRULE value; repeatable
        #[arg(long)]
        rrule: Vec<String>,
        /// RDATE value (instant or period); repeatable
        #[arg(long)]
        rdate: Vec<String>,
        /// EXDATE value; repeatable
        #[arg(long)]
        exdate: Vec<String>,
        /// EXRULE value; repeatable
        #[arg(long)]
        exrule: Vec<String>,
        /// Window as a PERIOD value
        #[arg(short, long)]
        window: String,
    },
    /// Merge overlapping and adjacent periods
    Normalise {
        /// Comma-separated periods (reads stdin if omitted)
        periods: Option<String>,
    },
    /// Remove periods from a period list
    Subtract {
        /// Comma-separated periods (reads stdin if omitted)
        periods: Option<String>,
        /// Periods to remove
        #[arg(long)]
        minus: String,
    },
    /// Free slots within a window given busy periods
    Free {
        /// Comma-separated busy periods (reads stdin if omitted)
        #[arg(long)]
        busy: Option<String>,
        #[arg(short, long)]
        window: String,
        /// Only report the first slot at least this long
        #[arg(long)]
        min_minutes: Option<i64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let json = cli.json;

    match cli.command {
        Commands::Expand {
            rule,
            dtstart,
            tzid,
            from,
            to,
            limit,
        } => {
            let recur = parse_rule(&rule, &config)?;
            let seed = parse_seed(&dtstart, tzid.as_deref(), &config)?;
            let dates: Vec<Temporal> = match (from, to) {
                (from, Some(to)) => {
                    let from = match from {
                        Some(from) => parse_temporal(&from, &config)?,
                        None => seed.clone(),
                    };
                    let to = parse_temporal(&to, &config)?;
                    recur.dates(&seed, &from, &to, limit)
                }
                (Some(from), None) => {
                    let from = parse_temporal(&from, &config)?;
                    let limit = require_bound(&recur, limit)?;
                    let cmp = TemporalComparator::for_seed(&seed);
                    recur
                        .occurrences(&seed)
                        .filter(|date| !cmp.is_before(date, &from))
                        .take(limit)
                        .collect()
                }
                (None, None) => {
                    let limit = require_bound(&recur, limit)?;
                    recur.occurrences(&seed).take(limit).collect()
                }
            };
            tracing::debug!(count = dates.len(), "expanded rule");
            print_values(&dates, json)?;
        }
        Commands::Next {
            rule,
            dtstart,
            tzid,
            after,
        } => {
            let recur = parse_rule(&rule, &config)?;
            let seed = parse_seed(&dtstart, tzid.as_deref(), &config)?;
            let after = parse_temporal(&after, &config)?;
            match recur.next_date(&seed, &after) {
                Some(next) if json => println!("{}", serde_json::to_string(&next)?),
                Some(next) => println!("{next}"),
                None if json => println!("null"),
                None => anyhow::bail!("No occurrence after {after}"),
            }
        }
        Commands::Set {
            dtstart,
            tzid,
            end,
            duration,
            rrule,
            rdate,
            exdate,
            exrule,
            window,
        } => {
            let mut component =
                RecurringComponent::new(parse_seed(&dtstart, tzid.as_deref(), &config)?);
            if let Some(end) = end {
                component = component.with_end(parse_seed(&end, tzid.as_deref(), &config)?);
            }
            if let Some(duration) = duration {
                let duration = Amount::parse(&duration)
                    .with_context(|| format!("Invalid duration: {duration}"))?;
                component = component.with_duration(duration);
            }
            for rule in rrule {
                component = component.with_rrule(parse_rule(&rule, &config)?);
            }
            for value in rdate {
                component = component.with_rdate(parse_rdate(&value, tzid.as_deref(), &config)?);
            }
            for value in exdate {
                component = component.with_exdate(parse_seed(&value, tzid.as_deref(), &config)?);
            }
            for rule in exrule {
                component = component.with_exrule(parse_rule(&rule, &config)?);
            }
            let window = parse_period(&window)?;
            let set = component
                .calculate_recurrence_set(&window)
                .context("Failed to calculate recurrence set")?;
            print_list(&set, json)?;
        }
        Commands::Normalise { periods } => {
            let list = parse_list(&read_arg(periods)?)?;
            print_list(&list.normalise(), json)?;
        }
        Commands::Subtract { periods, minus } => {
            let list = parse_list(&read_arg(periods)?)?;
            let minus = parse_list(&minus)?;
            print_list(&list.subtract(&minus), json)?;
        }
        Commands::Free {
            busy,
            window,
            min_minutes,
        } => {
            let busy = parse_list(&read_arg(busy)?)?;
            let window = parse_period(&window)?;
            let slots = match min_minutes {
                Some(min) => find_first_free_slot(&busy, &window, min).into_iter().collect(),
                None => find_free_slots(&busy, &window),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&slots)?);
            } else {
                for slot in &slots {
                    println!("{}/{} ({} min)", slot.start, slot.end, slot.duration_minutes);
                }
            }
        }
    }

    Ok(())
}

/// Configuration file first, then command-line overrides.
fn load_config(cli: &Cli) -> Result<RecurConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {path}"))?;
            RecurConfig::from_json(&raw)
                .with_context(|| format!("Invalid config file: {path}"))?
        }
        None => RecurConfig::default(),
    };
    if let Some(limit) = cli.max_increments {
        config.max_increment_count = limit;
    }
    if cli.relaxed {
        config.relaxed_parsing = true;
    }
    Ok(config)
}

/// An unbounded listing needs either COUNT/UNTIL on the rule or `--limit`.
fn require_bound(recur: &Recur, limit: Option<usize>) -> Result<usize> {
    match limit {
        Some(limit) => Ok(limit),
        None if recur.count().is_some() || recur.until().is_some() => Ok(usize::MAX),
        None => anyhow::bail!("Rule has no COUNT or UNTIL; pass --limit or --to"),
    }
}

fn parse_rule(value: &str, config: &RecurConfig) -> Result<Recur> {
    Recur::parse_with(value, config).with_context(|| format!("Invalid rule: {value}"))
}

fn parse_temporal(value: &str, config: &RecurConfig) -> Result<Temporal> {
    Temporal::parse_with(value, config.relaxed_parsing)
        .with_context(|| format!("Invalid date or date-time: {value}"))
}

fn parse_seed(value: &str, tzid: Option<&str>, config: &RecurConfig) -> Result<Temporal> {
    let temporal = parse_temporal(value, config)?;
    match tzid {
        Some(tzid) => {
            let zone = parse_zone(tzid).with_context(|| format!("Unknown time zone: {tzid}"))?;
            Ok(temporal.in_zone(zone))
        }
        None => Ok(temporal),
    }
}

fn parse_rdate(value: &str, tzid: Option<&str>, config: &RecurConfig) -> Result<RDate> {
    if value.contains('/') {
        Ok(RDate::Period(parse_period(value)?))
    } else {
        Ok(RDate::Instant(parse_seed(value, tzid, config)?))
    }
}

fn parse_period(value: &str) -> Result<Period> {
    value
        .parse()
        .with_context(|| format!("Invalid period: {value}"))
}

fn parse_list(value: &str) -> Result<PeriodList> {
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid period list: {}", value.trim()))
}

fn read_arg(value: Option<String>) -> Result<String> {
    match value {
        Some(value) => Ok(value),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn print_values<T: Serialize + std::fmt::Display>(values: &[T], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(values)?);
    } else {
        for value in values {
            println!("{value}");
        }
    }
    Ok(())
}

fn print_list(list: &PeriodList, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(list)?);
    } else {
        for period in list {
            println!("{period}");
        }
    }
    Ok(())
}
