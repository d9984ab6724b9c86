//! ConsoleSink - renders messages to standard error

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use contracts::{Environment, MessageEvent, Phase};

use crate::bus::{Bus, Handler};

/// Sink for the Console environment
///
/// Messages are always written as `"<label> <text>"`; the message template
/// only applies to the file.
pub struct ConsoleSink {
    handlers: [(Phase, Handler); 3],
}

impl ConsoleSink {
    /// Subscribe a stderr writer to the Console environment
    pub fn attach(bus: &Bus) -> Self {
        Self::attach_writer(bus, io::stderr())
    }

    /// Subscribe an arbitrary writer to the Console environment
    pub fn attach_writer<W: Write + Send + 'static>(bus: &Bus, writer: W) -> Self {
        let writer = Arc::new(Mutex::new(writer));
        let handlers = Phase::ALL.map(|phase| {
            let writer = Arc::clone(&writer);
            let handler = Handler::new(move |_, event| {
                let line = render_console(phase, event);
                if let Err(e) = writeln!(writer.lock(), "{line}") {
                    debug!(error = %e, "Console write failed");
                }
            });
            bus.subscribe(Environment::Console, phase, &handler);
            (phase, handler)
        });
        Self { handlers }
    }

    /// Remove exactly the handlers this sink registered
    pub fn detach(&self, bus: &Bus) {
        for (phase, handler) in &self.handlers {
            bus.unsubscribe(Environment::Console, *phase, handler);
        }
    }
}

/// Console line for one event of `phase`
pub(crate) fn render_console(phase: Phase, event: &MessageEvent) -> String {
    let label = event.severity.label();
    match phase {
        Phase::OnStart => format!("{label} Log starts"),
        Phase::OnMessage => format!("{label} {}", event.text),
        Phase::OnStop => format!("{label} Log stops."),
    }
}
