use rand::{distr::Alphanumeric, Rng};
use rumqttc::{Client, LastWill, MqttOptions, Packet, QoS};
use serde::{Deserialize, Serialize};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::{
    error::PongError,
    session::Role,
    state::{Point, SimState},
};

// ---------------------------------------------------------------------------
// Wire messages
// ---------------------------------------------------------------------------

/// Everything the two peers say to each other once the link is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    /// Client → host: top edge of the client's paddle.
    Paddle { y: f32 },
    /// Host → client: full simulation snapshot, sent every host tick.
    State(Snapshot),
}

impl Message {
    pub fn encode(&self) -> Result<Vec<u8>, PongError> {
        serde_json::to_vec(self).map_err(PongError::Encode)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PongError> {
        serde_json::from_slice(bytes).map_err(PongError::Decode)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub ball_x: f32,
    pub ball_y: f32,
    pub player_score: u32,
    pub ai_score: u32,
    pub player_paddle_y: f32,
    pub ai_paddle_y: f32,
    pub ball_trail: Vec<Point>,
}

impl Snapshot {
    pub fn capture(state: &SimState) -> Self {
        Self {
            ball_x: state.ball.x,
            ball_y: state.ball.y,
            player_score: state.scores.player,
            ai_score: state.scores.ai,
            player_paddle_y: state.player_paddle,
            ai_paddle_y: state.ai_paddle,
            ball_trail: state.trail.to_vec(),
        }
    }

    /// Overwrites the mirror wholesale, including any locally predicted paddle.
    pub fn apply_to(&self, state: &mut SimState) {
        state.ball.x = self.ball_x;
        state.ball.y = self.ball_y;
        state.scores.player = self.player_score;
        state.scores.ai = self.ai_score;
        state.set_player_paddle(self.player_paddle_y);
        state.set_ai_paddle(self.ai_paddle_y);
        state.trail.replace_with(self.ball_trail.iter().copied());
    }
}

// ---------------------------------------------------------------------------
// Peer link
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    /// The other peer is reachable; sends will now go through.
    Opened,
    /// The other peer went away.
    Closed,
    Data(Message),
}

/// Reliable, ordered, fire-and-forget channel to the other peer.
pub trait PeerLink {
    fn is_open(&self) -> bool;

    /// Sends one message. Fails with `PongError::LinkClosed` while the link is
    /// not open; nothing is queued for later.
    fn send(&mut self, message: &Message) -> Result<(), PongError>;

    /// Next pending lifecycle or data event, without blocking.
    fn poll(&mut self) -> Option<LinkEvent>;
}

/// A link that never opens. Used for single-player games.
#[derive(Debug, Default)]
pub struct OfflineLink;

impl PeerLink for OfflineLink {
    fn is_open(&self) -> bool {
        false
    }

    fn send(&mut self, _message: &Message) -> Result<(), PongError> {
        Err(PongError::LinkClosed)
    }

    fn poll(&mut self) -> Option<LinkEvent> {
        None
    }
}

#[cfg(test)]
#[derive(Debug)]
enum Frame {
    Open,
    Close,
    Payload(Vec<u8>),
}

/// In-process link endpoint. Messages still go through the JSON codec so both
/// ends see exactly what a remote peer would.
#[cfg(test)]
#[derive(Debug)]
pub struct MemoryLink {
    tx: mpsc::Sender<Frame>,
    rx: mpsc::Receiver<Frame>,
    open: bool,
}

#[cfg(test)]
impl MemoryLink {
    /// Two connected endpoints. Each reports `Opened` on its first poll.
    pub fn pair() -> (Self, Self) {
        let (a_tx, a_rx) = mpsc::channel();
        let (b_tx, b_rx) = mpsc::channel();
        a_tx.send(Frame::Open).ok();
        b_tx.send(Frame::Open).ok();
        (
            Self {
                tx: b_tx,
                rx: a_rx,
                open: false,
            },
            Self {
                tx: a_tx,
                rx: b_rx,
                open: false,
            },
        )
    }

    /// Hangs up; the other end sees `Closed` on its next poll.
    pub fn close(&mut self) {
        if self.open {
            self.tx.send(Frame::Close).ok();
            self.open = false;
        }
    }
}

#[cfg(test)]
impl PeerLink for MemoryLink {
    fn is_open(&self) -> bool {
        self.open
    }

    fn send(&mut self, message: &Message) -> Result<(), PongError> {
        if !self.open {
            return Err(PongError::LinkClosed);
        }
        let payload = message.encode()?;
        self.tx.send(Frame::Payload(payload)).map_err(|_| {
            self.open = false;
            PongError::LinkClosed
        })
    }

    fn poll(&mut self) -> Option<LinkEvent> {
        loop {
            let frame = match self.rx.try_recv() {
                Ok(frame) => frame,
                Err(mpsc::TryRecvError::Empty) => return None,
                Err(mpsc::TryRecvError::Disconnected) => {
                    if self.open {
                        self.open = false;
                        return Some(LinkEvent::Closed);
                    }
                    return None;
                }
            };

            match frame {
                Frame::Open => {
                    self.open = true;
                    return Some(LinkEvent::Opened);
                }
                Frame::Close => {
                    self.open = false;
                    return Some(LinkEvent::Closed);
                }
                Frame::Payload(bytes) => match Message::decode(&bytes) {
                    Ok(message) => return Some(LinkEvent::Data(message)),
                    Err(e) => tracing::warn!(error = %e, "dropping undecodable payload"),
                },
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Broker-relayed link
// ---------------------------------------------------------------------------

pub struct Topics {
    pub session_id: String,
}

impl Topics {
    pub fn new(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
        }
    }

    /// Data published by `role`.
    pub fn data(&self, role: Role) -> String {
        format!("peerpong/{}/{}", self.session_id, role.as_str())
    }

    pub fn hello(&self) -> String {
        format!("peerpong/{}/hello", self.session_id)
    }

    pub fn welcome(&self) -> String {
        format!("peerpong/{}/welcome", self.session_id)
    }

    /// Published when `role` leaves, either explicitly or as its last will.
    pub fn bye(&self, role: Role) -> String {
        format!("peerpong/{}/{}/bye", self.session_id, role.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub broker_host: String,
    pub broker_port: u16,
    pub session_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Short identifier the host hands out so a client can find it.
pub fn new_session_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect()
}

/// Peer link relayed through an MQTT broker.
///
/// A background thread runs the MQTT event loop and forwards decoded events
/// over a channel, so `poll` never blocks the frame loop.
pub struct MqttLink {
    client: Client,
    role: Role,
    outbound: String,
    bye: String,
    events: mpsc::Receiver<LinkEvent>,
    open: bool,
}

impl MqttLink {
    pub fn connect(config: &NetworkConfig, role: Role) -> Result<Self, PongError> {
        let topics = Topics::new(&config.session_id);
        let client_id = format!(
            "peer-pong-{}-{}",
            role.as_str(),
            new_session_id().to_lowercase()
        );

        let mut options = MqttOptions::new(client_id, &config.broker_host, config.broker_port);
        options.set_keep_alive(Duration::from_secs(5));
        options.set_last_will(LastWill::new(
            topics.bye(role),
            Vec::new(),
            QoS::AtMostOnce,
            false,
        ));
        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            options.set_credentials(user.clone(), pass.clone());
        }

        let (client, mut connection) = Client::new(options, 64);

        let peer = role.peer();
        let inbound = topics.data(peer);
        let peer_bye = topics.bye(peer);
        let handshake = match role {
            Role::Host => topics.hello(),
            Role::Client => topics.welcome(),
        };

        client.subscribe(&inbound, QoS::AtMostOnce)?;
        client.subscribe(&handshake, QoS::AtMostOnce)?;
        client.subscribe(&peer_bye, QoS::AtMostOnce)?;

        let (event_tx, event_rx) = mpsc::channel::<LinkEvent>();
        let loop_client = client.clone();
        let hello = topics.hello();
        let welcome = topics.welcome();

        thread::spawn(move || {
            for notification in connection.iter() {
                let event = match notification {
                    Ok(rumqttc::Event::Incoming(Packet::ConnAck(_))) => {
                        tracing::info!(role = role.as_str(), "connected to broker");
                        if role == Role::Client {
                            loop_client
                                .try_publish(&hello, QoS::AtMostOnce, false, Vec::new())
                                .ok();
                        }
                        None
                    }
                    Ok(rumqttc::Event::Incoming(Packet::Publish(msg))) => {
                        if msg.topic == inbound {
                            match Message::decode(&msg.payload) {
                                Ok(message) => Some(LinkEvent::Data(message)),
                                Err(e) => {
                                    tracing::warn!(error = %e, "dropping undecodable payload");
                                    None
                                }
                            }
                        } else if msg.topic == handshake {
                            if role == Role::Host {
                                loop_client
                                    .try_publish(&welcome, QoS::AtMostOnce, false, Vec::new())
                                    .ok();
                            }
                            Some(LinkEvent::Opened)
                        } else if msg.topic == peer_bye {
                            Some(LinkEvent::Closed)
                        } else {
                            None
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "broker connection lost");
                        event_tx.send(LinkEvent::Closed).ok();
                        break;
                    }
                    _ => None,
                };

                if let Some(event) = event {
                    if event_tx.send(event).is_err() {
                        break;
                    }
                }
            }
        });

        Ok(Self {
            client,
            role,
            outbound: topics.data(role),
            bye: topics.bye(role),
            events: event_rx,
            open: false,
        })
    }
}

impl PeerLink for MqttLink {
    fn is_open(&self) -> bool {
        self.open
    }

    fn send(&mut self, message: &Message) -> Result<(), PongError> {
        if !self.open {
            return Err(PongError::LinkClosed);
        }
        let payload = message.encode()?;
        self.client
            .try_publish(&self.outbound, QoS::AtMostOnce, false, payload)?;
        Ok(())
    }

    fn poll(&mut self) -> Option<LinkEvent> {
        let event = self.events.try_recv().ok()?;
        match event {
            LinkEvent::Opened => self.open = true,
            LinkEvent::Closed => self.open = false,
            LinkEvent::Data(_) => {}
        }
        Some(event)
    }
}

impl Drop for MqttLink {
    fn drop(&mut self) {
        tracing::debug!(role = self.role.as_str(), "leaving session");
        self.client
            .try_publish(&self.bye, QoS::AtMostOnce, false, Vec::new())
            .ok();
        self.client.try_disconnect().ok();
    }
}
