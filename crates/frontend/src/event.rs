//! Events published by a debug session.

use tokio::sync::mpsc;

/// What happened after a session command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// Stopped before the first step.
    Entry,
    /// Stopped after a step.
    Step,
    /// Stopped on a breakpoint.
    Breakpoint,
    /// The run failed with the given value.
    Exception(String),
    /// Text for the debug console.
    Output(String),
    /// The run is over.
    End,
}

pub type EventSender = mpsc::UnboundedSender<SessionEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

/// Creates the channel between a session and its only consumer.
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Drains the events published so far.
pub fn drain(receiver: &mut EventReceiver) -> Vec<SessionEvent> {
    let mut events = vec![];
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}
