//! EventLogSink - forwards the Event environment into tracing

use tracing::{debug, error, info, warn};

use contracts::{Environment, MessageEvent, Phase, Severity};

use crate::bus::{Bus, Handler};

/// Sink that mirrors messages into the process's tracing subscriber
pub struct EventLogSink {
    handler: Handler,
}

impl EventLogSink {
    pub fn attach(bus: &Bus) -> Self {
        let handler = Handler::new(emit);
        for phase in Phase::ALL {
            bus.subscribe(Environment::Event, phase, &handler);
        }
        Self { handler }
    }

    pub fn detach(&self, bus: &Bus) {
        for phase in Phase::ALL {
            bus.unsubscribe(Environment::Event, phase, &self.handler);
        }
    }
}

fn emit(environment: Environment, event: &MessageEvent) {
    let text = event.text.as_str();
    match event.severity {
        Severity::Diagnostic => debug!(environment = %environment, "{text}"),
        Severity::Info | Severity::None => info!(environment = %environment, "{text}"),
        Severity::Warning => warn!(environment = %environment, "{text}"),
        Severity::Error => error!(environment = %environment, "{text}"),
    }
}
