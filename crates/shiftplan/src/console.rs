//! Colorful console output for planner runs.
//!
//! Provides a `tracing` layer that renders the structured `event = "..."`
//! records of the pipeline stages as one line each.

use std::io::{self, Write};
use std::sync::OnceLock;

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();

/// Initializes console output.
///
/// Safe to call multiple times - only the first call has effect. `RUST_LOG`
/// directives are honored; without them `shiftplan` crates log at INFO.
pub fn init() {
    INIT.get_or_init(|| {
        let mut filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy();
        for target in ["shiftplan", "shiftplan_precompute", "shiftplan_model"] {
            if let Ok(directive) = format!("{target}=info").parse() {
                filter = filter.add_directive(directive);
            }
        }

        // Another subscriber may already be installed by the host application.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(PlannerConsoleLayer)
            .try_init();
    });
}

/// A tracing layer that formats pipeline events with colors.
pub struct PlannerConsoleLayer;

impl<S: Subscriber> Layer<S> for PlannerConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with("shiftplan") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(*metadata.level(), metadata.target(), &visitor);
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    message: Option<String>,
    fields: Vec<(&'static str, FieldValue)>,
}

enum FieldValue {
    Count(u64),
    Signed(i64),
    Real(f64),
    Text(String),
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let text = format!("{:?}", value);
        self.record_text(field, text.trim_matches('"'));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_text(field, value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.push((field.name(), FieldValue::Count(value)));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.push((field.name(), FieldValue::Signed(value)));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.push((field.name(), FieldValue::Real(value)));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields
            .push((field.name(), FieldValue::Text(value.to_string())));
    }
}

impl EventVisitor {
    fn record_text(&mut self, field: &Field, text: &str) {
        match field.name() {
            "event" => self.event = Some(text.to_string()),
            "message" => self.message = Some(text.to_string()),
            name => self.fields.push((name, FieldValue::Text(text.to_string()))),
        }
    }
}

fn format_event(level: Level, target: &str, v: &EventVisitor) -> String {
    let Some(name) = v.event.as_deref().or(v.message.as_deref()) else {
        return String::new();
    };

    let level = match level {
        Level::ERROR => "ERROR".bright_red().bold().to_string(),
        Level::WARN => " WARN".yellow().bold().to_string(),
        Level::INFO => " INFO".bright_green().to_string(),
        _ => "DEBUG".bright_black().to_string(),
    };

    let fields = v
        .fields
        .iter()
        .map(|(key, value)| format!("{} ({})", key.replace('_', " "), format_value(value)))
        .collect::<Vec<_>>()
        .join(", ");

    let mut line = format!(
        "{} {} {} {}",
        timestamp().bright_black(),
        level,
        format!("[{}]", stage(target)).bright_cyan(),
        name.white().bold()
    );
    if !fields.is_empty() {
        line.push_str(": ");
        line.push_str(&fields);
    }
    line
}

fn format_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Count(n) => n.to_formatted_string(&Locale::en).bright_yellow().to_string(),
        FieldValue::Signed(n) => n.to_formatted_string(&Locale::en).bright_yellow().to_string(),
        FieldValue::Real(x) => format!("{x:.3}").bright_magenta().to_string(),
        FieldValue::Text(s) => s.clone(),
    }
}

/// Module name shown in brackets: `shiftplan_precompute::conflict` -> `conflict`.
fn stage(target: &str) -> &str {
    target.rsplit("::").next().unwrap_or(target)
}

fn timestamp() -> String {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| {
            let secs = d.as_secs() % 100000;
            let millis = d.subsec_millis();
            format!("{:5}.{:03}", secs, millis)
        })
        .unwrap_or_else(|_| "    0.000".to_string())
}
