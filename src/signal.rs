//! Peer-to-peer "call coach" messages. Payloads cross the signaling
//! channel as JSON with an explicit `type` discriminant and are
//! validated here, at the boundary, before any core logic sees them.

use crate::analysis::ExerciseKind;
use crate::error::Error;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum Message {
    Help { msg: String },
    Greeting { from: String },
}

impl Message {
    pub(crate) fn help(exercise: ExerciseKind) -> Self {
        Message::Help {
            msg: format!("Athlete needs help with {}", exercise),
        }
    }

    pub(crate) fn encode(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(Error::EncodeMessage)
    }

    pub(crate) fn decode(raw: &str) -> Result<Self, Error> {
        serde_json::from_str(raw).map_err(Error::DecodeMessage)
    }
}

/// Transport boundary. Delivery success comes back as a boolean; the
/// core never retries or queues.
pub(crate) trait SignalChannel {
    fn send(&mut self, message: &Message) -> bool;
}

/// Explicit "request help" trigger: hands a HELP message to the
/// channel and reports whether it was delivered.
pub(crate) fn request_help<C: SignalChannel>(channel: &mut C, exercise: ExerciseKind) -> bool {
    channel.send(&Message::help(exercise))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RecordingChannel {
        sent: Vec<Message>,
    }

    impl SignalChannel for RecordingChannel {
        fn send(&mut self, message: &Message) -> bool {
            self.sent.push(message.clone());
            true
        }
    }

    #[test]
    fn help_message_carries_the_exercise_name() {
        let mut channel = RecordingChannel { sent: vec![] };
        assert!(request_help(&mut channel, ExerciseKind::Squat));
        assert_eq!(
            channel.sent,
            vec![Message::Help {
                msg: "Athlete needs help with squat".to_string()
            }]
        );
    }

    struct DeadChannel;

    impl SignalChannel for DeadChannel {
        fn send(&mut self, _message: &Message) -> bool {
            false
        }
    }

    #[test]
    fn transport_failure_surfaces_as_false() {
        assert!(!request_help(&mut DeadChannel, ExerciseKind::Pushup));
    }

    #[test]
    fn encodes_with_an_explicit_discriminant() {
        let encoded = Message::help(ExerciseKind::Pushup).encode().unwrap();
        assert!(encoded.contains(r#""type":"HELP""#), "{}", encoded);
        assert!(encoded.contains("pushup"));
    }

    #[test]
    fn decodes_known_kinds() {
        let decoded = Message::decode(r#"{"type":"GREETING","from":"coach"}"#).unwrap();
        assert_eq!(
            decoded,
            Message::Greeting {
                from: "coach".to_string()
            }
        );
    }

    #[test]
    fn rejects_unknown_kinds_at_the_boundary() {
        assert!(Message::decode(r#"{"type":"EVAL","code":"alert(1)"}"#).is_err());
        assert!(Message::decode("not json").is_err());
    }
}
