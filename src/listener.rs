//! Listener registry for transport events.
//!
//! Three independent append-only lists of callbacks, registered by the
//! owning application for logging and telemetry. Invocation is synchronous
//! on whatever thread raises the event, in registration order within each
//! list; a slow listener blocks that thread. There is no removal and no
//! ordering guarantee across lists.

use crate::error::WireError;
use crate::message::Message;

/// Callback observing messages together with their raw frame text.
pub type MessageListener = Box<dyn Fn(&Message, &str) + Send + Sync>;

/// Callback observing transport errors: a short context string plus the
/// underlying cause.
pub type ErrorListener = Box<dyn Fn(&str, &WireError) + Send + Sync>;

/// Ordered callback lists for error, incoming, and outgoing events.
#[derive(Default)]
pub struct Listeners {
    error: Vec<ErrorListener>,
    incoming: Vec<MessageListener>,
    outgoing: Vec<MessageListener>,
}

impl Listeners {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an error listener.
    pub fn on_error(&mut self, listener: impl Fn(&str, &WireError) + Send + Sync + 'static) {
        self.error.push(Box::new(listener));
    }

    /// Append an incoming-message listener.
    pub fn on_incoming(&mut self, listener: impl Fn(&Message, &str) + Send + Sync + 'static) {
        self.incoming.push(Box::new(listener));
    }

    /// Append an outgoing-message listener.
    pub fn on_outgoing(&mut self, listener: impl Fn(&Message, &str) + Send + Sync + 'static) {
        self.outgoing.push(Box::new(listener));
    }

    /// Notify all error listeners, in registration order.
    pub fn notify_error(&self, context: &str, cause: &WireError) {
        for listener in &self.error {
            listener(context, cause);
        }
    }

    /// Notify all incoming listeners, in registration order.
    pub fn notify_incoming(&self, message: &Message, raw_text: &str) {
        for listener in &self.incoming {
            listener(message, raw_text);
        }
    }

    /// Notify all outgoing listeners, in registration order.
    pub fn notify_outgoing(&self, message: &Message, raw_text: &str) {
        for listener in &self.outgoing {
            listener(message, raw_text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Message, NotificationMessage};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn notification() -> Message {
        Message::Notification(NotificationMessage {
            jsonrpc: Some("2.0".into()),
            method: "ping".into(),
            params: None,
        })
    }

    #[test]
    fn test_listeners_fire_in_registration_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = Listeners::new();

        for tag in ["first", "second", "third"] {
            let order = order.clone();
            listeners.on_incoming(move |_, _| order.lock().unwrap().push(tag));
        }

        listeners.notify_incoming(&notification(), "{}");
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_lists_are_independent() {
        let incoming_hits = Arc::new(AtomicUsize::new(0));
        let outgoing_hits = Arc::new(AtomicUsize::new(0));
        let mut listeners = Listeners::new();

        let hits = incoming_hits.clone();
        listeners.on_incoming(move |_, _| {
            hits.fetch_add(1, Ordering::SeqCst);
        });
        let hits = outgoing_hits.clone();
        listeners.on_outgoing(move |_, _| {
            hits.fetch_add(1, Ordering::SeqCst);
        });

        listeners.notify_incoming(&notification(), "{}");
        assert_eq!(incoming_hits.load(Ordering::SeqCst), 1);
        assert_eq!(outgoing_hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_error_listener_receives_cause() {
        let seen = Arc::new(Mutex::new(None));
        let mut listeners = Listeners::new();

        let seen_clone = seen.clone();
        listeners.on_error(move |context, cause| {
            *seen_clone.lock().unwrap() = Some((context.to_string(), cause.to_string()));
        });

        listeners.notify_error(
            "frame dropped",
            &WireError::UnsupportedCharset("klingon".into()),
        );

        let seen = seen.lock().unwrap();
        let (context, cause) = seen.as_ref().unwrap();
        assert_eq!(context, "frame dropped");
        assert!(cause.contains("klingon"));
    }

    #[test]
    fn test_empty_registry_notification_is_noop() {
        let listeners = Listeners::new();
        listeners.notify_incoming(&notification(), "{}");
        listeners.notify_outgoing(&notification(), "{}");
        listeners.notify_error("x", &WireError::ConnectionClosed);
    }
}
