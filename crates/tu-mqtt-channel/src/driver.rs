//! Event interpretation shared by the classic and modern drivers.
//!
//! Both transports feed every notification from their rumqttc loop into
//! [`Driver::observe`] and act on the returned [`Step`].

use std::sync::Arc;
use std::time::Duration;

use rumqttc::{ConnectionError, Event, Outgoing, Packet};

use crate::error::MqttError;
use crate::events::ConnectionEvents;
use crate::handler::{PayloadLevel, log_publish};
use crate::status::{ConnectionStatus, StatusHandle};

/// Pause before polling again after a dropped connection.
pub(crate) const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// What the loop should do after a notification.
#[derive(Debug)]
pub(crate) enum Step {
    Continue,
    /// First CONNACK: the connect wait is over.
    Ready,
    /// Connecting failed before the first CONNACK.
    Failed(MqttError),
    /// Established connection dropped; pause before polling again.
    Backoff,
    /// Connection closed; stop polling.
    Stop,
}

pub(crate) struct Driver {
    status: StatusHandle,
    level: PayloadLevel,
    events: Option<Arc<dyn ConnectionEvents>>,
    established: bool,
    interrupted: bool,
}

impl Driver {
    pub(crate) fn new(
        status: StatusHandle,
        level: PayloadLevel,
        events: Option<Arc<dyn ConnectionEvents>>,
    ) -> Self {
        Self {
            status,
            level,
            events,
            established: false,
            interrupted: false,
        }
    }

    /// Whether polling may continue after a backoff pause.
    pub(crate) fn should_resume(&self) -> bool {
        self.status.get() != ConnectionStatus::Closed
    }

    pub(crate) fn observe(&mut self, notification: Result<Event, ConnectionError>) -> Step {
        match notification {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                self.status.set(ConnectionStatus::Connected);

                if self.interrupted {
                    self.interrupted = false;
                    match &self.events {
                        Some(events) => events.on_connection_resumed(ack.session_present),
                        None => tracing::info!("connection re-established"),
                    }
                }

                if self.established {
                    Step::Continue
                } else {
                    self.established = true;
                    tracing::debug!(session_present = ack.session_present, "CONNACK received");
                    Step::Ready
                }
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                log_publish(&publish, self.level);
                Step::Continue
            }
            Ok(Event::Incoming(Packet::SubAck(suback))) => {
                tracing::debug!(pkid = suback.pkid, codes = ?suback.return_codes, "SUBACK received");
                Step::Continue
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                self.status.close();
                Step::Stop
            }
            Ok(_) => Step::Continue,
            Err(e) => {
                if self.status.get() == ConnectionStatus::Closed {
                    return Step::Stop;
                }

                self.status.set(ConnectionStatus::Disconnected);

                if !self.established {
                    return Step::Failed(MqttError::Connection(e.to_string()));
                }

                self.interrupted = true;
                match &self.events {
                    Some(events) => events.on_connection_interrupted(&e),
                    None => tracing::warn!(error = %e, "connection lost, reconnecting in 5s"),
                }
                Step::Backoff
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rumqttc::{ConnAck, ConnectReturnCode, Publish, QoS};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingEvents {
        log: Mutex<Vec<String>>,
    }

    impl ConnectionEvents for RecordingEvents {
        fn on_connection_interrupted(&self, _error: &ConnectionError) {
            self.log.lock().unwrap().push("interrupted".into());
        }

        fn on_connection_resumed(&self, session_present: bool) {
            self.log
                .lock()
                .unwrap()
                .push(format!("resumed:{session_present}"));
        }
    }

    fn connack(session_present: bool) -> Result<Event, ConnectionError> {
        Ok(Event::Incoming(Packet::ConnAck(ConnAck::new(
            ConnectReturnCode::Success,
            session_present,
        ))))
    }

    fn io_error() -> Result<Event, ConnectionError> {
        Err(ConnectionError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset by peer",
        )))
    }

    #[test]
    fn first_connack_is_ready() {
        let status = StatusHandle::new(ConnectionStatus::Connecting);
        let mut driver = Driver::new(status.clone(), PayloadLevel::Info, None);

        assert!(matches!(driver.observe(connack(false)), Step::Ready));
        assert_eq!(status.get(), ConnectionStatus::Connected);
    }

    #[test]
    fn error_before_connack_fails_connect() {
        let status = StatusHandle::new(ConnectionStatus::Connecting);
        let mut driver = Driver::new(status.clone(), PayloadLevel::Info, None);

        let step = driver.observe(io_error());
        assert!(matches!(step, Step::Failed(MqttError::Connection(_))));
        assert_eq!(status.get(), ConnectionStatus::Disconnected);
    }

    #[test]
    fn interrupt_then_resume_fires_callbacks() {
        let events = Arc::new(RecordingEvents::default());
        let status = StatusHandle::new(ConnectionStatus::Connecting);
        let mut driver = Driver::new(status.clone(), PayloadLevel::Trace, Some(events.clone()));

        assert!(matches!(driver.observe(connack(false)), Step::Ready));
        assert!(matches!(driver.observe(io_error()), Step::Backoff));
        assert_eq!(status.get(), ConnectionStatus::Disconnected);
        assert!(matches!(driver.observe(connack(true)), Step::Continue));
        assert_eq!(status.get(), ConnectionStatus::Connected);

        assert_eq!(
            *events.log.lock().unwrap(),
            vec!["interrupted".to_string(), "resumed:true".to_string()]
        );
    }

    #[test]
    fn publishes_continue() {
        let status = StatusHandle::new(ConnectionStatus::Connected);
        let mut driver = Driver::new(status, PayloadLevel::Info, None);
        let publish = Publish::new("thing-update/x", QoS::AtMostOnce, "hello");
        let step = driver.observe(Ok(Event::Incoming(Packet::Publish(publish))));
        assert!(matches!(step, Step::Continue));
    }

    #[test]
    fn outgoing_disconnect_stops() {
        let status = StatusHandle::new(ConnectionStatus::Connected);
        let mut driver = Driver::new(status.clone(), PayloadLevel::Info, None);
        assert!(matches!(
            driver.observe(Ok(Event::Outgoing(Outgoing::Disconnect))),
            Step::Stop
        ));
        assert_eq!(status.get(), ConnectionStatus::Closed);
    }

    #[test]
    fn error_after_close_stops_without_callbacks() {
        let events = Arc::new(RecordingEvents::default());
        let status = StatusHandle::new(ConnectionStatus::Connecting);
        let mut driver = Driver::new(status.clone(), PayloadLevel::Trace, Some(events.clone()));

        driver.observe(connack(false));
        status.close();
        assert!(matches!(driver.observe(io_error()), Step::Stop));
        assert!(events.log.lock().unwrap().is_empty());
    }

    #[test]
    fn close_during_backoff_stops_polling() {
        let status = StatusHandle::new(ConnectionStatus::Connecting);
        let mut driver = Driver::new(status.clone(), PayloadLevel::Info, None);

        driver.observe(connack(false));
        assert!(matches!(driver.observe(io_error()), Step::Backoff));
        assert!(driver.should_resume());

        status.close();
        assert!(!driver.should_resume());
    }
}
