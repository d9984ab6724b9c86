//! Bus - subscriber registry and message fan-out
//!
//! Each environment owns three ordered callback lists, one per `Phase`.
//! Registry reads always copy the relevant lists out under a read lock and
//! invoke callbacks with no lock held, so a callback may subscribe or
//! unsubscribe (the file sink unsubscribes itself on stop) without
//! deadlocking or observing a half-mutated list.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, instrument};

use contracts::{Environment, MessageEvent, MessageFormat, Phase, Severity, Verbosity};

use crate::metrics::BusMetrics;

type Callback = dyn Fn(Environment, &MessageEvent) + Send + Sync;

/// Subscriber callback handle
///
/// Clones of a `Handler` are the same callback: registering a clone twice
/// invokes it twice, and `Bus::unsubscribe` with any clone removes one
/// registration.
#[derive(Clone)]
pub struct Handler(Arc<Callback>);

impl Handler {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(Environment, &MessageEvent) + Send + Sync + 'static,
    {
        Self(Arc::new(callback))
    }

    pub fn call(&self, environment: Environment, event: &MessageEvent) {
        (self.0)(environment, event)
    }

    /// Identity comparison (same allocation)
    pub fn same(&self, other: &Handler) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.0) as *const (),
            Arc::as_ptr(&other.0) as *const (),
        )
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler")
            .field(&(Arc::as_ptr(&self.0) as *const ()))
            .finish()
    }
}

type PhaseTable = BTreeMap<Environment, Vec<Handler>>;

#[derive(Default)]
struct Registry {
    on_start: PhaseTable,
    on_message: PhaseTable,
    on_stop: PhaseTable,
}

impl Registry {
    fn table(&self, phase: Phase) -> &PhaseTable {
        match phase {
            Phase::OnStart => &self.on_start,
            Phase::OnMessage => &self.on_message,
            Phase::OnStop => &self.on_stop,
        }
    }

    fn table_mut(&mut self, phase: Phase) -> &mut PhaseTable {
        match phase {
            Phase::OnStart => &mut self.on_start,
            Phase::OnMessage => &mut self.on_message,
            Phase::OnStop => &mut self.on_stop,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Settings {
    verbosity: Verbosity,
    format: MessageFormat,
}

/// Publish/subscribe hub shared by every sink and producer
///
/// A `Bus` is an ordinary value; share it with `Arc<Bus>`. Independent buses
/// never see each other's subscribers.
#[derive(Default)]
pub struct Bus {
    registry: RwLock<Registry>,
    settings: RwLock<Settings>,
    metrics: BusMetrics,
}

impl Bus {
    /// Create a bus with `Normal` verbosity and the default message format
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bus with explicit filter and template
    pub fn with_settings(verbosity: Verbosity, format: MessageFormat) -> Self {
        let bus = Self::new();
        bus.set_verbosity(verbosity);
        bus.set_message_format(format);
        bus
    }

    pub fn verbosity(&self) -> Verbosity {
        self.settings.read().verbosity
    }

    pub fn set_verbosity(&self, verbosity: Verbosity) {
        self.settings.write().verbosity = verbosity;
    }

    /// Default template, read at publish time
    pub fn message_format(&self) -> MessageFormat {
        self.settings.read().format
    }

    pub fn set_message_format(&self, format: MessageFormat) {
        self.settings.write().format = format;
    }

    pub fn metrics(&self) -> &BusMetrics {
        &self.metrics
    }

    /// Append `handler` to the `(environment, phase)` list
    pub fn subscribe(&self, environment: Environment, phase: Phase, handler: &Handler) {
        self.registry
            .write()
            .table_mut(phase)
            .entry(environment)
            .or_default()
            .push(handler.clone());
        debug!(environment = %environment, phase = ?phase, "Subscribed");
    }

    /// Wrap `callback` in a `Handler`, subscribe it, and return the handle
    pub fn subscribe_fn<F>(&self, environment: Environment, phase: Phase, callback: F) -> Handler
    where
        F: Fn(Environment, &MessageEvent) + Send + Sync + 'static,
    {
        let handler = Handler::new(callback);
        self.subscribe(environment, phase, &handler);
        handler
    }

    /// Remove the first registration of `handler`; returns whether one was found
    pub fn unsubscribe(&self, environment: Environment, phase: Phase, handler: &Handler) -> bool {
        let mut registry = self.registry.write();
        let table = registry.table_mut(phase);
        let Some(handlers) = table.get_mut(&environment) else {
            return false;
        };
        let Some(idx) = handlers.iter().position(|h| h.same(handler)) else {
            return false;
        };
        handlers.remove(idx);
        if handlers.is_empty() {
            table.remove(&environment);
        }
        debug!(environment = %environment, phase = ?phase, "Unsubscribed");
        true
    }

    /// Clear all three phase lists of `environment`
    pub fn unsubscribe_all(&self, environment: Environment) {
        let mut registry = self.registry.write();
        for phase in Phase::ALL {
            registry.table_mut(phase).remove(&environment);
        }
        debug!(environment = %environment, "Unsubscribed all");
    }

    pub fn subscriber_count(&self, environment: Environment, phase: Phase) -> usize {
        self.registry
            .read()
            .table(phase)
            .get(&environment)
            .map_or(0, Vec::len)
    }

    /// Invoke every `(environment, phase)` callback in subscription order
    ///
    /// OnMessage publishes are dropped by the verbosity filter first.
    /// No subscribers is a silent no-op.
    pub fn publish(
        &self,
        phase: Phase,
        environment: Environment,
        severity: Severity,
        text: &str,
        format: MessageFormat,
    ) {
        if !self.admits(phase, severity) {
            return;
        }
        let handlers = self.snapshot(phase, environment);
        if handlers.is_empty() {
            return;
        }
        self.metrics.inc_published();
        let event = MessageEvent::new(severity, text, format);
        self.deliver(environment, &handlers, &event);
    }

    /// Broadcast to every environment that currently has a `phase` subscriber
    pub fn publish_all(&self, phase: Phase, severity: Severity, text: &str, format: MessageFormat) {
        if !self.admits(phase, severity) {
            return;
        }
        let tables = self.snapshot_all(phase);
        if tables.is_empty() {
            return;
        }
        self.metrics.inc_published();
        let event = MessageEvent::new(severity, text, format);
        for (environment, handlers) in &tables {
            self.deliver(*environment, handlers, &event);
        }
    }

    /// Log to every environment with a message subscriber
    pub fn add_message(&self, severity: Severity, text: &str) {
        self.publish_all(
            Phase::OnMessage,
            severity,
            text,
            self.effective_format(severity),
        );
    }

    /// Log to one environment
    pub fn add_message_to(&self, environment: Environment, severity: Severity, text: &str) {
        self.publish(
            Phase::OnMessage,
            environment,
            severity,
            text,
            self.effective_format(severity),
        );
    }

    /// Broadcast OnStart to all environments
    #[instrument(name = "bus_start", skip(self, text))]
    pub fn start(&self, severity: Severity, text: &str) {
        self.publish_all(Phase::OnStart, severity, text, self.message_format());
    }

    /// Broadcast OnStop to all environments
    ///
    /// Iterates a copy of the stop lists taken before the first callback runs.
    #[instrument(name = "bus_stop", skip(self, text))]
    pub fn stop(&self, severity: Severity, text: &str) {
        self.publish_all(Phase::OnStop, severity, text, self.message_format());
    }

    fn admits(&self, phase: Phase, severity: Severity) -> bool {
        if phase != Phase::OnMessage || self.verbosity().should_deliver(severity) {
            return true;
        }
        self.metrics.inc_filtered();
        false
    }

    /// Unlabelled messages are always written bare
    fn effective_format(&self, severity: Severity) -> MessageFormat {
        if severity == Severity::None {
            MessageFormat::Plain
        } else {
            self.message_format()
        }
    }

    fn snapshot(&self, phase: Phase, environment: Environment) -> Vec<Handler> {
        self.registry
            .read()
            .table(phase)
            .get(&environment)
            .cloned()
            .unwrap_or_default()
    }

    fn snapshot_all(&self, phase: Phase) -> Vec<(Environment, Vec<Handler>)> {
        self.registry
            .read()
            .table(phase)
            .iter()
            .filter(|(_, handlers)| !handlers.is_empty())
            .map(|(env, handlers)| (*env, handlers.clone()))
            .collect()
    }

    fn deliver(&self, environment: Environment, handlers: &[Handler], event: &MessageEvent) {
        for handler in handlers {
            handler.call(environment, event);
        }
        self.metrics.add_delivered(handlers.len() as u64);
    }
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let settings = *self.settings.read();
        f.debug_struct("Bus")
            .field("verbosity", &settings.verbosity)
            .field("format", &settings.format)
            .field("metrics", &self.metrics.snapshot())
            .finish()
    }
}
