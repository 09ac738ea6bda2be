//! Incoming message logging for the MQTT drivers.
//!
//! Messages are only logged, never processed or re-published.

use std::borrow::Cow;

use rumqttc::{Publish, QoS};

use tu_protocol::topics;

/// Log level for the decoded payload text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadLevel {
    Info,
    Trace,
}

/// A received publish, detached from the rumqttc packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub topic: String,
    pub qos: QoS,
    pub payload: Vec<u8>,
}

impl ReceivedMessage {
    pub fn from_publish(publish: &Publish) -> Self {
        Self {
            topic: publish.topic.clone(),
            qos: publish.qos,
            payload: publish.payload.to_vec(),
        }
    }

    /// Payload decoded as UTF-8, invalid sequences replaced.
    pub fn payload_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }

    /// Thing name when the topic is under `thing-update/`.
    pub fn thing_name(&self) -> Option<String> {
        topics::parse_topic(&self.topic).map(|t| t.thing_name)
    }

    /// Numeric QoS as it appears on the wire.
    pub fn qos_level(&self) -> u8 {
        match self.qos {
            QoS::AtMostOnce => 0,
            QoS::AtLeastOnce => 1,
            QoS::ExactlyOnce => 2,
        }
    }

    /// Write the topic/QoS line at `info` and the payload at `level`.
    pub fn log(&self, level: PayloadLevel) {
        let thing = self.thing_name();
        tracing::info!(
            topic = %self.topic,
            qos = self.qos_level(),
            thing = thing.as_deref().unwrap_or("-"),
            "message received"
        );

        let payload = self.payload_text();
        match level {
            PayloadLevel::Info => tracing::info!(payload = %payload, "===> payload"),
            PayloadLevel::Trace => tracing::trace!(payload = %payload, "===> payload"),
        }
    }
}

/// Log a raw publish straight from the event loop.
pub fn log_publish(publish: &Publish, level: PayloadLevel) {
    ReceivedMessage::from_publish(publish).log(level);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_publish(topic: &str, payload: &[u8]) -> Publish {
        Publish::new(topic, QoS::AtMostOnce, payload)
    }

    #[test]
    fn message_from_publish() {
        let publish = make_publish("thing-update/sensor-042", br#"{"temp":21.5}"#);
        let msg = ReceivedMessage::from_publish(&publish);
        assert_eq!(msg.topic, "thing-update/sensor-042");
        assert_eq!(msg.qos, QoS::AtMostOnce);
        assert_eq!(msg.qos_level(), 0);
        assert_eq!(msg.payload_text(), r#"{"temp":21.5}"#);
        assert_eq!(msg.thing_name().as_deref(), Some("sensor-042"));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let publish = make_publish("thing-update/x", &[0x68, 0x69, 0xff]);
        let msg = ReceivedMessage::from_publish(&publish);
        assert_eq!(msg.payload_text(), "hi\u{fffd}");
    }

    #[test]
    fn foreign_topic_has_no_thing_name() {
        let publish = make_publish("$aws/things/x/shadow/update", b"{}");
        let msg = ReceivedMessage::from_publish(&publish);
        assert!(msg.thing_name().is_none());
    }

    #[test]
    fn logging_does_not_panic_on_binary_payload() {
        let publish = make_publish("thing-update/x", &[0, 159, 146, 150]);
        log_publish(&publish, PayloadLevel::Info);
        log_publish(&publish, PayloadLevel::Trace);
    }
}
