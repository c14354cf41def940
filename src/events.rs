// Events that flow between input adapters, the session controller and the
// coordinator.
//
// Every interaction and data notification in the client is one variant of a
// closed enum. This keeps payloads strongly typed, lets the coordinator
// match exhaustively, and replaces any stringly-keyed dispatch with an
// explicit subscription table.

use crate::backend::MatchMode;

/// Discriminant used to key bus subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    NewContextAvailable,
    NewMatchingResults,
    WindowResize,
    BrushSelectionChanged,
    ZeroBrushSelectionChanged,
    ThresholdChanged,
    CellWidthChanged,
    PanRequested,
    MatchRequested,
}

/// Main event type that flows through the application
#[derive(Debug, Clone, PartialEq)]
pub enum VisEvent {
    /// A context fetch resolved and the controller installed the new window
    NewContextAvailable,

    /// A match fetch resolved and the controller installed the new rows
    NewMatchingResults,

    /// Terminal was resized
    WindowResize { width: u16, height: u16 },

    /// Positive brush moved or cleared (half-open range, window coordinates)
    BrushSelectionChanged { range: Option<(i64, i64)> },

    /// Baseline brush moved or cleared
    ZeroBrushSelectionChanged { range: Option<(i64, i64)> },

    /// Threshold cutoff changed
    ThresholdChanged { value: f32 },

    /// Zoom step: positive widens token cells, negative narrows them
    CellWidthChanged { delta: i16 },

    /// Shift the context anchor by this many timesteps
    PanRequested { offset: i64 },

    /// Trigger a nearest-neighbor match query
    MatchRequested { mode: MatchMode },
}

impl VisEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            VisEvent::NewContextAvailable => EventKind::NewContextAvailable,
            VisEvent::NewMatchingResults => EventKind::NewMatchingResults,
            VisEvent::WindowResize { .. } => EventKind::WindowResize,
            VisEvent::BrushSelectionChanged { .. } => EventKind::BrushSelectionChanged,
            VisEvent::ZeroBrushSelectionChanged { .. } => EventKind::ZeroBrushSelectionChanged,
            VisEvent::ThresholdChanged { .. } => EventKind::ThresholdChanged,
            VisEvent::CellWidthChanged { .. } => EventKind::CellWidthChanged,
            VisEvent::PanRequested { .. } => EventKind::PanRequested,
            VisEvent::MatchRequested { .. } => EventKind::MatchRequested,
        }
    }
}

type Subscriber = Box<dyn FnMut(&VisEvent)>;

/// Synchronous publish/subscribe channel keyed by event kind.
///
/// Delivery happens on the calling thread, in subscription order. The
/// coordination pipeline itself does not hang off the bus - the coordinator
/// dispatches through an explicit ordered function - so subscribers here are
/// auxiliary listeners (status displays, logging taps, tests).
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<(EventKind, Subscriber)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for one event kind. Callbacks for the same kind
    /// fire in the order they were registered.
    pub fn subscribe<F>(&mut self, kind: EventKind, callback: F)
    where
        F: FnMut(&VisEvent) + 'static,
    {
        self.subscribers.push((kind, Box::new(callback)));
    }

    /// Deliver an event to every subscriber of its kind.
    pub fn publish(&mut self, event: &VisEvent) {
        let kind = event.kind();
        for (subscribed, callback) in self.subscribers.iter_mut() {
            if *subscribed == kind {
                callback(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn delivers_in_subscription_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        for tag in ["first", "second", "third"] {
            let log = Rc::clone(&log);
            bus.subscribe(EventKind::ThresholdChanged, move |_| {
                log.borrow_mut().push(tag);
            });
        }

        bus.publish(&VisEvent::ThresholdChanged { value: 0.5 });
        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn only_matching_kind_is_invoked() {
        let hits = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        {
            let hits = Rc::clone(&hits);
            bus.subscribe(EventKind::NewContextAvailable, move |_| {
                *hits.borrow_mut() += 1;
            });
        }
        {
            let hits = Rc::clone(&hits);
            bus.subscribe(EventKind::PanRequested, move |_| {
                *hits.borrow_mut() += 100;
            });
        }

        bus.publish(&VisEvent::NewContextAvailable);
        bus.publish(&VisEvent::NewContextAvailable);
        assert_eq!(*hits.borrow(), 2);
    }

    #[test]
    fn payload_reaches_subscriber() {
        let seen = Rc::new(RefCell::new(None));
        let mut bus = EventBus::new();
        {
            let seen = Rc::clone(&seen);
            bus.subscribe(EventKind::BrushSelectionChanged, move |event| {
                if let VisEvent::BrushSelectionChanged { range } = event {
                    *seen.borrow_mut() = *range;
                }
            });
        }

        bus.publish(&VisEvent::BrushSelectionChanged {
            range: Some((3, 7)),
        });
        assert_eq!(*seen.borrow(), Some((3, 7)));
    }
}
