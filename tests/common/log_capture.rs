#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use tracing_subscriber::layer::SubscriberExt;

/// Captures `feedstat` tracing events on the current thread.
///
/// Use with `#[tokio::test]` (current-thread runtime) so spawned work stays
/// on the capturing thread.
pub struct LogCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
    _guard: tracing::subscriber::DefaultGuard,
}

#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: tracing::Level,
    pub target: String,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl CapturedEvent {
    fn rendered(&self) -> String {
        let mut line = self.message.clone();
        for (k, v) in &self.fields {
            line.push_str(&format!(" {k}={v}"));
        }
        line
    }
}

impl LogCapture {
    pub fn start() -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(CaptureLayer {
            events: events.clone(),
        });
        let guard = tracing::subscriber::set_default(subscriber);
        Self {
            events,
            _guard: guard,
        }
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn assert_logged_at(&self, level: tracing::Level, needle: &str) {
        let events = self.events();
        assert!(
            events
                .iter()
                .any(|e| e.level == level && e.message.contains(needle)),
            "expected {level} event containing '{needle}', got: {:#?}",
            events.iter().map(CapturedEvent::rendered).collect::<Vec<_>>()
        );
    }

    pub fn assert_field(&self, name: &str, value: &str) {
        let events = self.events();
        assert!(
            events
                .iter()
                .any(|e| e.fields.iter().any(|(k, v)| k == name && v.contains(value))),
            "expected field {name}={value}, got: {:#?}",
            events.iter().map(CapturedEvent::rendered).collect::<Vec<_>>()
        );
    }

    /// Fails if `secret` appears in any message or field.
    pub fn assert_never_logged(&self, secret: &str) {
        for event in self.events() {
            assert!(
                !event.rendered().contains(secret),
                "secret leaked into logs: {event:?}"
            );
        }
    }
}

struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for CaptureLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let target = event.metadata().target();
        if !target.starts_with("feedstat") {
            return;
        }
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: target.to_string(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.record_str(field, &format!("{value:?}"));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push((field.name().to_string(), value.to_string()));
        }
    }
}
