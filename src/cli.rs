use std::{io, sync::Arc, time::Duration};

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;
use tokio::sync::mpsc;

use ics_event::{Attendee, Event, SharedEvent, config::Config};

pub const USAGE: &str = "Usage: ics-event [--summary TEXT] [--description TEXT] [--location TEXT] \
[--status TEXT] [--start YYYY-MM-DDTHH:MM:SS] [--end YYYY-MM-DDTHH:MM:SS] [--imported-id ID] \
[--attendee EMAIL]... [--organizer EMAIL] [--whole-day] [--alarm SECONDS]";

const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Error, PartialEq)]
pub enum CliError {
    #[error("Unknown argument: {0}")]
    UnknownArgument(String),
    #[error("Missing value for {0}")]
    MissingValue(String),
    #[error("Invalid date '{0}'. Use YYYY-MM-DDTHH:MM:SS.")]
    InvalidDate(String),
    #[error("Invalid number of seconds '{0}'")]
    InvalidNumber(String),
}

#[derive(Debug, PartialEq)]
pub enum CliMode {
    Help,
    Describe(EventArgs),
}

#[derive(Debug, Default, PartialEq)]
pub struct EventArgs {
    pub summary: String,
    pub description: String,
    pub location: String,
    pub status: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub imported_id: String,
    pub attendees: Vec<String>,
    pub organizer: Option<String>,
    pub whole_day: bool,
    pub alarm: Option<Duration>,
}

pub fn parse_cli_mode<I>(args: I) -> Result<CliMode, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = EventArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let args = &mut args;
        match arg.as_str() {
            "--summary" => parsed.summary = next_value(args, &arg)?,
            "--description" => parsed.description = next_value(args, &arg)?,
            "--location" => parsed.location = next_value(args, &arg)?,
            "--status" => parsed.status = next_value(args, &arg)?,
            "--imported-id" => parsed.imported_id = next_value(args, &arg)?,
            "--start" => parsed.start = Some(parse_date_time(&next_value(args, &arg)?)?),
            "--end" => parsed.end = Some(parse_date_time(&next_value(args, &arg)?)?),
            "--attendee" => parsed.attendees.push(next_value(args, &arg)?),
            "--organizer" => parsed.organizer = Some(next_value(args, &arg)?),
            "--alarm" => {
                let value = next_value(args, &arg)?;
                let seconds = value
                    .parse::<u64>()
                    .map_err(|_| CliError::InvalidNumber(value.clone()))?;
                parsed.alarm = Some(Duration::from_secs(seconds));
            }
            "--whole-day" => parsed.whole_day = true,
            "--help" => return Ok(CliMode::Help),
            _ => return Err(CliError::UnknownArgument(arg.clone())),
        }
    }

    Ok(CliMode::Describe(parsed))
}

fn next_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, CliError> {
    let missing = || CliError::MissingValue(flag.to_string());
    args.next().ok_or_else(missing)
}

fn parse_date_time(raw: &str) -> Result<DateTime<Utc>, CliError> {
    NaiveDateTime::parse_from_str(raw, DATE_TIME_FORMAT)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| CliError::InvalidDate(raw.to_string()))
}

pub fn build_event(args: &EventArgs) -> Event {
    let now = Utc::now();
    let start = args.start.unwrap_or(now);
    let end = args.end.unwrap_or(start);

    let organizer = args.organizer.as_deref().map(Attendee::new).map(Arc::new);

    let mut event = Event::new();
    event
        .set_summary(args.summary.as_str())
        .set_description(args.description.as_str())
        .set_location(args.location.as_str())
        .set_status(args.status.as_str())
        .set_imported_id(args.imported_id.as_str())
        .set_start(start)
        .set_end(end)
        .set_created(now)
        .set_last_modified(now)
        .set_whole_day_event(args.whole_day)
        .add_attendees(args.attendees.iter().map(Attendee::new))
        .set_organizer(organizer);

    let id = event.generate_event_id();
    event.set_id(id);
    event
}

pub fn format_description(event: &Event, pretty_json: bool) -> Result<String, serde_json::Error> {
    let map = serde_json::Value::Object(event.to_map());
    let json = if pretty_json {
        serde_json::to_string_pretty(&map)?
    } else {
        serde_json::to_string(&map)?
    };

    Ok(format!("{event}\nid: {}\n{json}", event.id()))
}

pub async fn run_describe(args: EventArgs, config: &Config) -> Result<(), io::Error> {
    let event = build_event(&args);
    let text = format_description(&event, config.output.pretty_json)
        .map_err(io::Error::other)?;
    println!("{text}");

    let Some(offset) = args.alarm else {
        return Ok(());
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let shared = SharedEvent::new(event);
    shared.set_alarm(offset, move |fired| {
        let _ = tx.send(fired.read().to_string());
    });
    tracing::info!(?offset, "waiting for alarm");

    if let Some(line) = rx.recv().await {
        println!("Alarm: {line}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn describe(list: &[&str]) -> EventArgs {
        match parse_cli_mode(args(list)).unwrap() {
            CliMode::Describe(parsed) => parsed,
            CliMode::Help => panic!("expected describe mode"),
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, hour, 0, 0).unwrap()
    }

    fn standup_args() -> EventArgs {
        describe(&[
            "--summary",
            "Standup",
            "--status",
            "CONFIRMED",
            "--start",
            "2024-01-10T09:00:00",
            "--end",
            "2024-01-10T10:00:00",
        ])
    }

    #[test]
    fn no_arguments_describe_an_empty_event() {
        assert_eq!(describe(&[]), EventArgs::default());
    }

    #[test]
    fn parses_event_fields() {
        let parsed = describe(&[
            "--summary",
            "Standup",
            "--start",
            "2024-01-10T09:00:00",
            "--end",
            "2024-01-10T10:00:00",
            "--attendee",
            "a@example.com",
            "--attendee",
            "b@example.com",
            "--organizer",
            "boss@example.com",
            "--whole-day",
            "--alarm",
            "5",
        ]);

        assert_eq!(parsed.summary, "Standup");
        assert_eq!(parsed.start, Some(at(9)));
        assert_eq!(parsed.end, Some(at(10)));
        assert_eq!(parsed.attendees, vec!["a@example.com", "b@example.com"]);
        assert_eq!(parsed.organizer.as_deref(), Some("boss@example.com"));
        assert!(parsed.whole_day);
        assert_eq!(parsed.alarm, Some(Duration::from_secs(5)));
    }

    #[test]
    fn help_flag_selects_help_mode() {
        let mode = parse_cli_mode(args(&["--summary", "x", "--help"]));
        assert_eq!(mode, Ok(CliMode::Help));
    }

    #[test]
    fn unknown_argument_is_rejected() {
        assert_eq!(
            parse_cli_mode(args(&["--agenda"])),
            Err(CliError::UnknownArgument("--agenda".to_string()))
        );
    }

    #[test]
    fn flag_without_value_is_rejected() {
        assert_eq!(
            parse_cli_mode(args(&["--summary"])),
            Err(CliError::MissingValue("--summary".to_string()))
        );
    }

    #[test]
    fn invalid_date_is_rejected() {
        assert_eq!(
            parse_cli_mode(args(&["--start", "2024/01/10"])),
            Err(CliError::InvalidDate("2024/01/10".to_string()))
        );
    }

    #[test]
    fn invalid_alarm_is_rejected() {
        assert_eq!(
            parse_cli_mode(args(&["--alarm", "soon"])),
            Err(CliError::InvalidNumber("soon".to_string()))
        );
    }

    #[test]
    fn built_event_carries_generated_id() {
        let parsed = describe(&[
            "--summary",
            "Standup",
            "--start",
            "2024-01-10T09:00:00",
            "--attendee",
            "a@example.com",
        ]);

        let event = build_event(&parsed);

        assert_eq!(event.id(), event.generate_event_id());
        assert_eq!(event.attendees().len(), 1);
        assert!(event.organizer().is_none());
    }

    #[test]
    fn end_defaults_to_start() {
        let parsed = describe(&["--start", "2024-01-10T09:00:00"]);

        let event = build_event(&parsed);

        assert_eq!(event.end(), event.start());
    }

    #[test]
    fn description_has_summary_id_and_json() {
        let event = build_event(&standup_args());

        let text = format_description(&event, false).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "Event(CONFIRMED) from 20240110T090000 to 20240110T100000 about Standup . 0 people are invited to it"
        );
        assert_eq!(lines[1], format!("id: {}", event.id()));
        assert_eq!(lines.len(), 3);
        let json: serde_json::Value = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(json["summary"], "Standup");
    }

    #[test]
    fn pretty_description_spreads_json_over_lines() {
        let event = build_event(&standup_args());

        let text = format_description(&event, true).unwrap();
        let (header, json) = text.split_once("\n{").unwrap();

        assert_eq!(header.lines().count(), 2);
        assert!(json.lines().count() > 15);
        let json: serde_json::Value = serde_json::from_str(&format!("{{{json}")).unwrap();
        assert_eq!(json["id"], event.id());
    }

    #[tokio::test]
    async fn describe_without_alarm_returns() {
        let result = run_describe(standup_args(), &Config::default()).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn describe_waits_for_alarm_then_returns() {
        let mut parsed = standup_args();
        parsed.alarm = Some(Duration::ZERO);
        let config = Config::default();

        let run = run_describe(parsed, &config);
        let result = tokio::time::timeout(Duration::from_secs(5), run).await;

        assert!(matches!(result, Ok(Ok(()))));
    }
}
