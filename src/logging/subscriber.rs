//! Console formatter, log file layer and global subscriber setup.
//!
//! Events are classified once into a [`LineKind`] and rendered twice: with
//! colour for the console and with a timestamp and plain tags for the log
//! file.  Per-setting outcomes travel as structured events on
//! [`OUTCOME_TARGET`] carrying `setting`, `action` and `detail` fields.
use std::fmt::Write as _;
use std::fs;
use std::io::Write as _;
use std::sync::Mutex;

use tracing::field::{Field, Visit};

use super::utils::{format_utc_datetime, format_utc_time, log_file_path, strip_ansi};

/// Tracing target for stage headers.
pub(super) const STAGE_TARGET: &str = "devsetup::stage";
/// Tracing target for suppressed writes in dry-run mode.
pub(super) const DRY_RUN_TARGET: &str = "devsetup::dry_run";
/// Tracing target for recorded setting outcomes.
pub(super) const OUTCOME_TARGET: &str = "devsetup::outcome";

/// How an event is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Stage,
    DryRun,
    Outcome,
    Error,
    Warn,
    Info,
    Debug,
}

impl LineKind {
    fn classify(level: tracing::Level, target: &str) -> Self {
        match (level, target) {
            (_, OUTCOME_TARGET) => Self::Outcome,
            (tracing::Level::ERROR, _) => Self::Error,
            (tracing::Level::WARN, _) => Self::Warn,
            (tracing::Level::INFO, STAGE_TARGET) => Self::Stage,
            (tracing::Level::INFO, DRY_RUN_TARGET) => Self::DryRun,
            (tracing::Level::INFO, _) => Self::Info,
            _ => Self::Debug,
        }
    }
}

/// The message plus the outcome fields of an event.
#[derive(Debug, Default)]
struct EventFields {
    message: String,
    setting: Option<String>,
    action: Option<String>,
    detail: Option<String>,
}

impl EventFields {
    fn from_event(event: &tracing::Event<'_>) -> Self {
        let mut fields = Self::default();
        event.record(&mut fields);
        fields
    }

    /// `action setting (detail)` for outcome events, else the message.
    fn text(&self) -> String {
        let (Some(setting), Some(action)) = (&self.setting, &self.action) else {
            return self.message.clone();
        };
        let mut text = format!("{action}: {setting}");
        if let Some(detail) = &self.detail {
            let _ = write!(text, " ({detail})");
        }
        text
    }
}

impl Visit for EventFields {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.record_str(field, &format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        let value = value.to_string();
        match field.name() {
            "message" => self.message = value,
            "setting" => self.setting = Some(value),
            "action" => self.action = Some(value),
            "detail" => self.detail = Some(value),
            _ => {}
        }
    }
}

/// A [`tracing_subscriber::Layer`] that appends every event to the run's
/// log file with a timestamp and ANSI codes stripped.
///
/// Captures `DEBUG` and above regardless of console verbosity, so outcome
/// events always reach the file.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Truncate the log file for `command`, write a run header and open it
    /// for appending.
    ///
    /// Returns `None` if the cache directory or file is unavailable.
    pub(super) fn new(command: &str) -> Option<Self> {
        let path = log_file_path(command)?;
        let rule = "=".repeat(60);
        let header = format!(
            "{rule}\ndevsetup {} {command} started {}\n{rule}\n",
            crate::version(),
            format_utc_datetime(),
        );
        fs::write(&path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(&path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let metadata = event.metadata();
        let kind = LineKind::classify(*metadata.level(), metadata.target());
        let text = strip_ansi(&EventFields::from_event(event).text());
        let ts = format_utc_time();

        let line = match kind {
            LineKind::Stage => format!("[{ts}] ==> {text}"),
            LineKind::DryRun => format!("[{ts}]     [dry run] {text}"),
            LineKind::Outcome => format!("[{ts}]     [outcome] {text}"),
            LineKind::Error => format!("[{ts}]     [error] {text}"),
            LineKind::Warn => format!("[{ts}]     [warn] {text}"),
            LineKind::Debug => format!("[{ts}]     [debug] {text}"),
            LineKind::Info => format!("[{ts}]     {text}"),
        };

        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "{line}").ok();
        }
    }
}

/// Console rendering: bold `==>` stage headers, indented detail lines and
/// coloured warning, error and dry-run prefixes.
struct ConsoleFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let text = EventFields::from_event(event).text();

        match LineKind::classify(*metadata.level(), metadata.target()) {
            LineKind::Error => writeln!(writer, "\x1b[31mERROR\x1b[0m {text}"),
            LineKind::Warn => writeln!(writer, "\x1b[33mWARN\x1b[0m  {text}"),
            LineKind::Stage => writeln!(writer, "\x1b[1;34m==>\x1b[0m \x1b[1m{text}\x1b[0m"),
            LineKind::DryRun => writeln!(writer, "  \x1b[33m[DRY RUN]\x1b[0m {text}"),
            LineKind::Info => writeln!(writer, "  {text}"),
            LineKind::Outcome | LineKind::Debug => writeln!(writer, "  \x1b[2m{text}\x1b[0m"),
        }
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// Console output honours `verbose`.  Warnings and errors go to stderr and
/// the rest to stdout, unless `stdout_reserved` is set, in which case every
/// console line goes to stderr and stdout carries only command output.  The
/// file layer records every event to `$XDG_CACHE_HOME/devsetup/<command>.log`.
/// Must be called once at program startup, before any logging.
pub fn init_subscriber(verbose: bool, stdout_reserved: bool, command: &str) {
    use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt as _};
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let make_writer = if stdout_reserved {
        BoxMakeWriter::new(std::io::stderr)
    } else {
        BoxMakeWriter::new(
            std::io::stderr
                .with_max_level(tracing::Level::WARN)
                .and(std::io::stdout.with_min_level(tracing::Level::INFO)),
        )
    };

    let console_layer = fmt::layer()
        .event_format(ConsoleFormatter)
        .with_writer(make_writer)
        .with_filter(console_level);

    let file_layer = FileLayer::new(command).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
