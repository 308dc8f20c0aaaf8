use rand::rngs::StdRng;

use crate::{
    ai::ComputerAI,
    input,
    network::{LinkEvent, Message, PeerLink, Snapshot},
    physics,
    state::{Ball, Goal, Scores, SimState},
};

/// Decided once when a session is created and never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Runs physics and the AI, broadcasts snapshots.
    Host,
    /// Forwards its paddle and mirrors snapshots.
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Host => "host",
            Role::Client => "client",
        }
    }

    pub fn peer(&self) -> Role {
        match self {
            Role::Host => Role::Client,
            Role::Client => Role::Host,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
}

/// Role-specific half of the game loop.
pub trait TickStrategy {
    fn role(&self) -> Role;

    /// Puts a fresh match on the field.
    fn start(&mut self, state: &mut SimState);

    /// One frame of simulation while the session is running.
    fn update(&mut self, state: &mut SimState, link: &mut dyn PeerLink) -> Option<Goal>;

    /// The local pointer asked for the local paddle at `paddle_y`.
    fn pointer(&mut self, state: &mut SimState, paddle_y: f32, link: &mut dyn PeerLink);

    fn receive(&mut self, state: &mut SimState, message: Message);
}

/// Authoritative side: AI, physics, and a snapshot to the peer every tick.
pub struct HostLoop {
    ai: ComputerAI,
    rng: StdRng,
}

impl HostLoop {
    pub fn new(ai: ComputerAI, rng: StdRng) -> Self {
        Self { ai, rng }
    }
}

impl TickStrategy for HostLoop {
    fn role(&self) -> Role {
        Role::Host
    }

    fn start(&mut self, state: &mut SimState) {
        state.scores = Scores::default();
        state.ball = Ball::serve(&mut self.rng);
        state.trail.clear();
    }

    fn update(&mut self, state: &mut SimState, link: &mut dyn PeerLink) -> Option<Goal> {
        // a connected peer owns the right paddle
        if !link.is_open() {
            self.ai.update(state);
        }

        let goal = physics::step(state, &mut self.rng);

        if link.is_open() {
            if let Err(e) = link.send(&Message::State(Snapshot::capture(state))) {
                tracing::debug!(error = %e, "snapshot dropped");
            }
        }

        goal
    }

    fn pointer(&mut self, state: &mut SimState, paddle_y: f32, _link: &mut dyn PeerLink) {
        state.set_player_paddle(paddle_y);
    }

    fn receive(&mut self, state: &mut SimState, message: Message) {
        match message {
            Message::Paddle { y } => state.set_ai_paddle(y),
            Message::State(_) => tracing::warn!("host ignoring snapshot from client"),
        }
    }
}

/// Mirroring side: no physics, no AI. Predicts its own paddle locally until
/// the next snapshot overwrites it.
#[derive(Debug, Default)]
pub struct ClientLoop;

impl TickStrategy for ClientLoop {
    fn role(&self) -> Role {
        Role::Client
    }

    fn start(&mut self, state: &mut SimState) {
        state.scores = Scores::default();
        state.ball = Ball::centered();
        state.trail.clear();
    }

    fn update(&mut self, _state: &mut SimState, _link: &mut dyn PeerLink) -> Option<Goal> {
        None
    }

    fn pointer(&mut self, state: &mut SimState, paddle_y: f32, link: &mut dyn PeerLink) {
        state.set_ai_paddle(paddle_y);
        if link.is_open() {
            if let Err(e) = link.send(&Message::Paddle { y: state.ai_paddle }) {
                tracing::debug!(error = %e, "paddle update dropped");
            }
        }
    }

    fn receive(&mut self, state: &mut SimState, message: Message) {
        match message {
            Message::State(snapshot) => snapshot.apply_to(state),
            Message::Paddle { .. } => tracing::warn!("client ignoring paddle from host"),
        }
    }
}

/// One game from the local player's point of view: the simulation state, the
/// role strategy picked at creation, and the link to the other peer.
pub struct Session {
    state: SimState,
    phase: Phase,
    strategy: Box<dyn TickStrategy>,
    link: Box<dyn PeerLink>,
}

impl Session {
    pub fn new(strategy: Box<dyn TickStrategy>, link: Box<dyn PeerLink>) -> Self {
        Self {
            state: SimState::new(),
            phase: Phase::Idle,
            strategy,
            link,
        }
    }

    pub fn host(ai: ComputerAI, rng: StdRng, link: Box<dyn PeerLink>) -> Self {
        Self::new(Box::new(HostLoop::new(ai, rng)), link)
    }

    pub fn client(link: Box<dyn PeerLink>) -> Self {
        Self::new(Box::new(ClientLoop), link)
    }

    pub fn role(&self) -> Role {
        self.strategy.role()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn peer_connected(&self) -> bool {
        self.link.is_open()
    }

    pub fn score_line(&self) -> String {
        self.state.scores.to_string()
    }

    /// Top edge of the paddle the local pointer drives.
    pub fn local_paddle(&self) -> f32 {
        match self.role() {
            Role::Host => self.state.player_paddle,
            Role::Client => self.state.ai_paddle,
        }
    }

    /// Idle → running. Returns false, and changes nothing, once running.
    pub fn start(&mut self) -> bool {
        if self.phase == Phase::Running {
            return false;
        }
        self.strategy.start(&mut self.state);
        self.phase = Phase::Running;
        tracing::info!(role = self.role().as_str(), "match started");
        true
    }

    /// Applies every event the link has buffered since the last frame.
    pub fn pump_link(&mut self) {
        while let Some(event) = self.link.poll() {
            match event {
                LinkEvent::Opened => {
                    tracing::info!(role = self.role().as_str(), "peer connected");
                    if self.role() == Role::Client {
                        self.start();
                    }
                }
                LinkEvent::Closed => {
                    tracing::info!(role = self.role().as_str(), "peer disconnected");
                }
                LinkEvent::Data(message) => self.strategy.receive(&mut self.state, message),
            }
        }
    }

    /// One frame: the role's update while running. Rendering happens after.
    pub fn tick(&mut self) -> Option<Goal> {
        if self.phase != Phase::Running {
            return None;
        }
        self.strategy.update(&mut self.state, self.link.as_mut())
    }

    pub fn pointer_moved(&mut self, pointer_y: f32) {
        let target = input::paddle_target(pointer_y);
        self.strategy
            .pointer(&mut self.state, target, self.link.as_mut());
    }
}
