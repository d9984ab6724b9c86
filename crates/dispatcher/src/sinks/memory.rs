//! MemorySink - in-memory capture for tests and diagnostics

use std::sync::Arc;

use parking_lot::Mutex;

use contracts::{Environment, MessageEvent, Phase};

use crate::bus::{Bus, Handler};

#[derive(Default)]
struct Captured {
    phases: Vec<Phase>,
    messages: Vec<MessageEvent>,
}

/// Records everything published to one environment
#[derive(Clone)]
pub struct MemorySink {
    environment: Environment,
    captured: Arc<Mutex<Captured>>,
    handlers: Vec<(Phase, Handler)>,
}

impl MemorySink {
    /// Subscribe to all three phases of `environment`
    pub fn attach(bus: &Bus, environment: Environment) -> Self {
        let captured: Arc<Mutex<Captured>> = Arc::default();
        let handlers = Phase::ALL
            .into_iter()
            .map(|phase| {
                let captured = Arc::clone(&captured);
                let handler = Handler::new(move |_, event| {
                    let mut captured = captured.lock();
                    captured.phases.push(phase);
                    if phase == Phase::OnMessage {
                        captured.messages.push(event.clone());
                    }
                });
                bus.subscribe(environment, phase, &handler);
                (phase, handler)
            })
            .collect();

        Self {
            environment,
            captured,
            handlers,
        }
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Message events in arrival order
    pub fn events(&self) -> Vec<MessageEvent> {
        self.captured.lock().messages.clone()
    }

    /// `"<label> <text>"` per message
    pub fn lines(&self) -> Vec<String> {
        self.captured
            .lock()
            .messages
            .iter()
            .map(|e| format!("{} {}", e.severity.label(), e.text))
            .collect()
    }

    /// All lines joined with newlines
    pub fn contents(&self) -> String {
        let mut out = String::new();
        for line in self.lines() {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    /// Phase of every callback received, including start and stop
    pub fn phases(&self) -> Vec<Phase> {
        self.captured.lock().phases.clone()
    }

    pub fn reset(&self) {
        let mut captured = self.captured.lock();
        captured.phases.clear();
        captured.messages.clear();
    }

    pub fn detach(&self, bus: &Bus) {
        for (phase, handler) in &self.handlers {
            bus.unsubscribe(self.environment, *phase, handler);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Severity;

    #[test]
    fn test_memory_sink_captures() {
        let bus = Bus::new();
        let sink = MemorySink::attach(&bus, Environment::Console);

        bus.start(Severity::Info, "begin");
        bus.add_message(Severity::Error, "first");
        bus.add_message(Severity::None, "second");
        bus.stop(Severity::Info, "end");

        assert_eq!(sink.lines(), vec!["Error: first", " second"]);
        assert_eq!(
            sink.phases(),
            vec![Phase::OnStart, Phase::OnMessage, Phase::OnMessage, Phase::OnStop]
        );

        sink.reset();
        assert!(sink.events().is_empty());
        assert!(sink.contents().is_empty());
    }

    #[test]
    fn test_detach() {
        let bus = Bus::new();
        let sink = MemorySink::attach(&bus, Environment::Event);
        sink.detach(&bus);
        for phase in Phase::ALL {
            assert_eq!(bus.subscriber_count(Environment::Event, phase), 0);
        }
    }
}
