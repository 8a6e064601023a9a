//! Session engine: translates user commands into frames and inbound frames
//! into local effects.
//!
//! The engine owns all per-session protocol state (current user, receipt and
//! subscription bookkeeping, the score board). It performs no I/O; the
//! connection layer decides when frames are sent and received.

use log::{debug, warn};

use matchday_types::{Event, EventRecord, GameRecord, ScoreBoard};

use crate::frame::Frame;
use crate::registry::{ReceiptOutcome, Registry};
use crate::report::ReportBody;

/// Notifications produced for the user-facing side of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Server accepted the CONNECT frame.
    LoginSuccessful,
    JoinedChannel(String),
    ExitedChannel(String),
    /// The logout receipt arrived; the session is over.
    LogoutComplete,
    /// Inbound ERROR frame; the server's word is final.
    ProtocolError(String),
    /// Produced by the connection layer when the transport drops.
    ConnectionLost,
}

/// Channel name for a game, derived from the two team names.
pub fn game_channel(team_a: &str, team_b: &str) -> String {
    format!("{}_{}", team_a, team_b)
}

pub struct Engine {
    accept_version: String,
    /// Identity recorded at connect time; stamped into outbound reports.
    user: String,
    registry: Registry,
    board: ScoreBoard,
}

impl Engine {
    pub fn new(accept_version: &str) -> Self {
        Self {
            accept_version: accept_version.to_string(),
            user: String::new(),
            registry: Registry::new(),
            board: ScoreBoard::new(),
        }
    }

    /// Build the connection request and remember the user identity.
    pub fn connect_frame(&mut self, vhost: &str, login: &str, passcode: &str) -> Frame {
        self.user = login.to_string();
        Frame::new("CONNECT")
            .with_header("accept-version", self.accept_version.clone())
            .with_header("host", vhost)
            .with_header("login", login)
            .with_header("passcode", passcode)
    }

    /// Build a SUBSCRIBE frame for the channel, or `None` if it is already
    /// subscribed (re-joining emits nothing).
    pub fn subscribe(&mut self, channel: &str) -> Option<Frame> {
        if self.registry.is_subscribed(channel) {
            debug!("already subscribed to {}, nothing to send", channel);
            return None;
        }
        let subscription = self.registry.open_subscription(channel);
        let receipt = self
            .registry
            .expect_receipt(ReceiptOutcome::JoinedChannel(channel.to_string()));
        Some(
            Frame::new("SUBSCRIBE")
                .with_header("destination", format!("/{}", channel))
                .with_header("id", subscription.to_string())
                .with_header("receipt", receipt.to_string()),
        )
    }

    /// Build an UNSUBSCRIBE frame, or `None` if the channel is unknown.
    /// The subscription is forgotten immediately, before any receipt.
    pub fn unsubscribe(&mut self, channel: &str) -> Option<Frame> {
        let subscription = self.registry.close_subscription(channel)?;
        let receipt = self
            .registry
            .expect_receipt(ReceiptOutcome::ExitedChannel(channel.to_string()));
        Some(
            Frame::new("UNSUBSCRIBE")
                .with_header("id", subscription.to_string())
                .with_header("receipt", receipt.to_string()),
        )
    }

    /// Build one SEND frame carrying a game event report.
    pub fn report_frame(&self, team_a: &str, team_b: &str, event: &Event) -> Frame {
        let body = ReportBody::from_event(&self.user, team_a, team_b, event);
        Frame::new("SEND")
            .with_header("destination", format!("/{}", game_channel(team_a, team_b)))
            .with_body(body.serialize())
    }

    /// Build the DISCONNECT frame whose receipt confirms the logout.
    pub fn disconnect_frame(&mut self) -> Frame {
        let receipt = self.registry.expect_receipt(ReceiptOutcome::LogoutConfirmed);
        Frame::new("DISCONNECT").with_header("receipt", receipt.to_string())
    }

    /// Apply one inbound frame, returning the notifications it produced.
    /// Unrecognized commands and unknown receipts are dropped silently.
    pub fn handle_frame(&mut self, frame: &Frame) -> Vec<SessionEvent> {
        match frame.command.as_str() {
            "CONNECTED" => vec![SessionEvent::LoginSuccessful],
            "RECEIPT" => {
                let receipt_id = frame
                    .header("receipt-id")
                    .and_then(|value| value.parse::<u64>().ok());
                match receipt_id.and_then(|id| self.registry.resolve(id)) {
                    Some(ReceiptOutcome::JoinedChannel(channel)) => {
                        vec![SessionEvent::JoinedChannel(channel)]
                    }
                    Some(ReceiptOutcome::ExitedChannel(channel)) => {
                        vec![SessionEvent::ExitedChannel(channel)]
                    }
                    Some(ReceiptOutcome::LogoutConfirmed) => vec![SessionEvent::LogoutComplete],
                    None => {
                        debug!("receipt without a pending entry: {:?}", receipt_id);
                        Vec::new()
                    }
                }
            }
            "MESSAGE" => {
                self.apply_report(frame);
                Vec::new()
            }
            "ERROR" => {
                let detail = if frame.body.is_empty() {
                    frame.header("message").unwrap_or_default().to_string()
                } else {
                    frame.body.clone()
                };
                vec![SessionEvent::ProtocolError(detail)]
            }
            other => {
                debug!("ignoring unrecognized frame: {}", other);
                Vec::new()
            }
        }
    }

    /// Merge an inbound MESSAGE into the score board. Reports without a
    /// destination or a reporter identity mutate nothing.
    fn apply_report(&mut self, frame: &Frame) {
        let channel = frame
            .header("destination")
            .map(|d| d.trim_start_matches('/'))
            .unwrap_or_default();
        if channel.is_empty() {
            warn!("dropping report without a destination");
            return;
        }

        let body = ReportBody::parse(&frame.body);
        if body.reporter.is_empty() {
            warn!("dropping report on {} without a reporter", channel);
            return;
        }

        let event = EventRecord {
            time: body.time,
            before_halftime: body.before_halftime,
            name: body.event_name,
            description: body.description,
        };
        self.board.upsert(
            channel,
            &body.reporter,
            &body.team_a,
            &body.team_b,
            &body.general_updates,
            &body.team_a_updates,
            &body.team_b_updates,
            event,
        );
    }

    /// Read-only score board lookup for the summary path.
    pub fn record(&self, channel: &str, reporter: &str) -> Option<&GameRecord> {
        self.board.record(channel, reporter)
    }
}
