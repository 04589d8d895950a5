use adbridge_rs_protocol::{ListenerError, NativeEvent};
use parking_lot::Mutex;
use std::sync::Arc;

/// Collects every event it is invoked with.
#[derive(Clone, Default)]
pub struct RecordingListener {
    events: Arc<Mutex<Vec<NativeEvent>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callback suitable for registering on a bridge registry.
    pub fn listener(
        &self,
    ) -> Arc<dyn Fn(&NativeEvent) -> Result<(), ListenerError> + Send + Sync> {
        let events = self.events.clone();
        Arc::new(move |event: &NativeEvent| {
            events.lock().push(event.clone());
            Ok(())
        })
    }

    pub fn events(&self) -> Vec<NativeEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.events.lock().len()
    }

    /// Event types seen, in order.
    pub fn kinds(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .map(|event| event.kind().to_string())
            .collect()
    }
}
