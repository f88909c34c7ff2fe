use std::{
    collections::HashMap,
    fs::OpenOptions,
    path::PathBuf,
};
use nu_ansi_term::{Color, Style};
use serde::Deserialize;
use termcolor::ColorChoice;
use tracing::{field::Visit, Level, Metadata};
use tracing_log::NormalizeEvent;
use tracing_subscriber::{
    filter::{FilterFn, LevelFilter},
    fmt::FormatEvent,
    prelude::*,
};

use crate::prelude::*;


#[derive(Debug, confique::Config)]
pub(crate) struct LogConfig {
    /// Specifies what log messages to emit, based on the module path and log level.
    ///
    /// This is a map where the key specifies a module path prefix, and the
    /// value specifies a minimum log level. For each log message, the map
    /// entry with the longest prefix matching the log's module path is chosen.
    /// If no such entry exists, the log is not emitted. Otherwise, that
    /// entry's level is used to check whether the log message should be
    /// emitted.
    ///
    /// Example: only emit ≥"info" messages generally, but ≥"trace" from the
    /// store and ≥"debug" from the HTTP library `hyper`.
    ///
    ///    [log]
    ///    filters.reelay = "info"
    ///    filters."reelay::store" = "trace"
    ///    filters.hyper = "debug"
    #[config(default = { "reelay": "debug" })]
    pub(crate) filters: Filters,

    /// If this is set, log messages are also written to this file.
    /// Example: "/var/log/reelay.log".
    pub(crate) file: Option<PathBuf>,

    /// If this is set to `false`, log messages are not written to stdout.
    #[config(default = true)]
    pub(crate) stdout: bool,

    /// If set to `true`, HTTP header of each incoming request are logged
    /// (with 'trace' level).
    #[config(default = false)]
    pub(crate) log_http_headers: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "HashMap<String, String>")]
pub(crate) struct Filters(HashMap<String, LevelFilter>);

impl TryFrom<HashMap<String, String>> for Filters {
    type Error = String;
    fn try_from(value: HashMap<String, String>) -> Result<Self, Self::Error> {
        value.into_iter()
            .map(|(target_prefix, level)| Ok((target_prefix, parse_level_filter(&level)?)))
            .collect::<Result<_, _>>()
            .map(Self)
    }
}

impl Filters {
    /// Whether an event with the given metadata passes this filter: the entry
    /// with the longest matching target prefix decides.
    fn allows(&self, target: &str, level: &Level) -> bool {
        self.0.iter()
            .filter(|(target_prefix, _)| target.starts_with(target_prefix.as_str()))
            .max_by_key(|(target_prefix, _)| target_prefix.len())
            .is_some_and(|(_, level_filter)| level <= level_filter)
    }

    fn max_level(&self) -> LevelFilter {
        self.0.values().max().copied().unwrap_or(LevelFilter::OFF)
    }
}

fn parse_level_filter(s: &str) -> Result<LevelFilter, String> {
    match s {
        "off" => Ok(LevelFilter::OFF),
        "trace" => Ok(LevelFilter::TRACE),
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warn" => Ok(LevelFilter::WARN),
        "error" => Ok(LevelFilter::ERROR),
        other => Err(format!("invalid log level '{other}'")),
    }
}

/// Installs our own logger globally. Must only be called once!
pub(crate) fn init(config: &LogConfig, color: ColorChoice) -> Result<()> {
    let filter = {
        let filters = config.filters.clone();
        let max_level = filters.max_level();
        FilterFn::new(move |metadata: &Metadata<'_>| {
            filters.allows(metadata.target(), metadata.level())
        }).with_max_level_hint(max_level)
    };

    macro_rules! subscriber {
        ($writer:expr) => {
            tracing_subscriber::fmt::layer()
                .event_format(EventFormatter(color))
                .with_writer($writer)
        };
    }

    let stdout_output = config.stdout.then(|| subscriber!(std::io::stdout));

    let file_output = config.file.as_ref()
        .map(|path| -> Result<std::fs::File> {
            use std::io::Write;

            let mut file = OpenOptions::new()
                .append(true)
                .create(true)
                .open(path)
                .with_context(|| format!("failed to open/create log file '{}'", path.display()))?;

            // Empty line to make process restarts easier to spot.
            file.write_all(b"\n").context("could not write to log file")?;

            Ok(file)
        })
        .transpose()?
        .map(|file| subscriber!(file).with_ansi(color == ColorChoice::Always));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_output)
        .with(stdout_output)
        .init();

    Ok(())
}

type TracingWriter<'a> = tracing_subscriber::fmt::format::Writer<'a>;

#[derive(Clone, Copy)]
struct EventFormatter(ColorChoice);

impl<S, N> FormatEvent<S, N> for EventFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: TracingWriter<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let use_ansi = self.0 == ColorChoice::Always
            || (writer.has_ansi_escapes() && self.0 != ColorChoice::Never);
        macro_rules! wr {
            ($style:expr, $fmt:literal $($args:tt)*) => {{
                with_style(&mut writer, use_ansi, $style, |w| {
                    write!(w, $fmt $($args)*)
                })?;
            }};
        }

        // Events coming from the `log` crate carry their real metadata in fields.
        let normalized_metadata = event.normalized_metadata();
        let metadata = normalized_metadata.as_ref().unwrap_or(event.metadata());

        let dim_style = Style::new().dimmed();
        let (level_style, body_style) = level_styles(metadata.level());

        wr!(dim_style, "{} ", chrono::Local::now().format("%Y-%m-%d %H:%M:%S.%3f"));
        wr!(level_style, "{:5}", metadata.level());
        wr!(dim_style, " {} >  ", metadata.target());

        let mut fields = FieldCollector::default();
        event.record(&mut fields);

        // Continuation lines of multi-line messages are aligned with the first.
        let prefix = {
            let padding = "2021-05-04 19:40:18.270 DEBUG ".len() + 1 + metadata.target().len();
            let (pre, suf) = match use_ansi {
                true => (dim_style.prefix().to_string(), dim_style.suffix().to_string()),
                false => (String::new(), String::new()),
            };
            format!("\n{:padding$}{pre}>{suf}  ", "")
        };

        let mut lines = fields.message.as_deref().unwrap_or("").lines();
        wr!(body_style, "{}", lines.next().unwrap_or(""));
        for line in lines {
            write!(writer, "{prefix}")?;
            wr!(body_style, "{line}");
        }

        if !fields.values.is_empty() {
            if fields.message.is_some() {
                wr!(level_style, " ~~");
            }
            for (name, value) in &fields.values {
                write!(writer, " ")?;
                wr!(body_style.italic(), "{name}");
                wr!(body_style, "={value}");
            }
        }

        writeln!(writer, "{}", if use_ansi { nu_ansi_term::ansi::RESET } else { "" })
    }
}

fn level_styles(level: &Level) -> (Style, Style) {
    match *level {
        Level::ERROR => (Style::new().fg(Color::Red).bold(), Style::new().fg(Color::Red)),
        Level::WARN => (Style::new().fg(Color::Yellow).bold(), Style::new().fg(Color::Yellow)),
        Level::INFO => (Style::new().fg(Color::Green), Style::new()),
        Level::DEBUG => (Style::new().fg(Color::Blue), Style::new().dimmed()),
        Level::TRACE => (Style::new().fg(Color::Magenta), Style::new().fg(Color::DarkGray)),
    }
}

/// Collects the message and all user-specified fields of an event.
#[derive(Debug, Default)]
struct FieldCollector {
    message: Option<String>,
    values: Vec<(&'static str, String)>,
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        match field.name() {
            "message" => self.message = Some(format!("{value:?}")),
            name if name.starts_with("log.") => {}
            name => self.values.push((name, format!("{value:?}"))),
        }
    }
}

fn with_style(
    out: &mut TracingWriter<'_>,
    use_ansi: bool,
    style: Style,
    f: impl FnOnce(&mut TracingWriter<'_>) -> std::fmt::Result,
) -> std::fmt::Result {
    if use_ansi {
        write!(out, "{}", style.prefix())?;
    }
    f(out)?;
    if use_ansi {
        write!(out, "{}", style.suffix())?;
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use tracing::Level;
    use tracing_subscriber::filter::LevelFilter;

    use super::{Filters, parse_level_filter};

    fn filters(entries: &[(&str, &str)]) -> Filters {
        let map = entries.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        Filters::try_from(map).unwrap()
    }

    #[test]
    fn levels() {
        assert_eq!(parse_level_filter("off"), Ok(LevelFilter::OFF));
        assert_eq!(parse_level_filter("warn"), Ok(LevelFilter::WARN));
        assert_eq!(parse_level_filter("trace"), Ok(LevelFilter::TRACE));
        assert!(parse_level_filter("WARN").is_err());
        assert!(parse_level_filter("verbose").is_err());
    }

    #[test]
    fn longest_prefix_wins() {
        let f = filters(&[("reelay", "info"), ("reelay::store", "trace"), ("reelay::http", "off")]);
        assert!(f.allows("reelay::api", &Level::INFO));
        assert!(!f.allows("reelay::api", &Level::DEBUG));
        assert!(f.allows("reelay::store::memory", &Level::TRACE));
        assert!(!f.allows("reelay::http", &Level::ERROR));
        assert!(!f.allows("hyper::proto", &Level::ERROR));
        assert_eq!(f.max_level(), LevelFilter::TRACE);
    }

    #[test]
    fn invalid_filters() {
        let map = HashMap::from([("reelay".to_string(), "loud".to_string())]);
        assert!(Filters::try_from(map).is_err());
        assert_eq!(filters(&[]).max_level(), LevelFilter::OFF);
    }
}
