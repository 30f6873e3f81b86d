/// Duel session management
use std::cmp::Ordering;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::{Interval, MissedTickBehavior};

use super::config::SessionConfig;
use super::game_engine::DuelEngine;
use super::stats::LinkStats;
use super::types::{DuelView, EndReason, MatchState, PlayerId, SessionCommand, StepResult};
use crate::error::{ArenaError, Result};
use crate::network::control::Control;
use crate::network::frame::{Frame, Hello, PROTOCOL_VERSION};
use crate::network::peer_link::PeerLink;

/// One side of a two-player match over a byte stream
///
/// The session owns the local engine and the stream. Each tick it applies the
/// queued player actions, advances the engine, sends the local field and score,
/// and takes in whatever the peer has sent so far without waiting for it.
pub struct DuelSession<E, S>
where
    E: DuelEngine,
{
    /// Local player
    id: PlayerId,

    /// Session configuration
    config: SessionConfig,

    /// Local game engine
    engine: E,

    /// Framed connection to the peer
    link: PeerLink<S>,

    /// Receiver for commands from the application
    command_rx: flume::Receiver<SessionCommand<E::Action>>,

    /// Sender for commands from the application
    command_tx: flume::Sender<SessionCommand<E::Action>>,

    /// Name announced by the peer
    peer_name: Option<String>,

    /// Last field received from the peer
    peer_field: Option<Vec<u8>>,

    /// Highest score received from the peer
    peer_score: u32,

    /// Ticks run so far; the match clock is derived from it
    ticks: u64,

    /// Ticks in a full match
    match_ticks: u64,

    state: MatchState,

    /// Created on the first `step()`
    interval: Option<Interval>,
}

impl<E, S> DuelSession<E, S>
where
    E: DuelEngine,
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Create a session over an already connected stream
    pub fn new(config: SessionConfig, engine: E, stream: S) -> Result<Self> {
        config.validate()?;
        if config.max_frame_len < engine.field_len() {
            return Err(ArenaError::Config(format!(
                "max_frame_len {} cannot carry a {} byte field",
                config.max_frame_len,
                engine.field_len()
            )));
        }

        let id = match &config.player_name {
            Some(name) => PlayerId::from_name(name.clone())?,
            None => PlayerId::generate(),
        };

        let (command_tx, command_rx) = flume::unbounded();
        let link = PeerLink::new(stream, config.max_frame_len);
        let match_ticks = config.match_ticks();

        tracing::info!(
            "Session '{}' created ({} ms ticks, {} s match)",
            id,
            config.tick_ms,
            config.match_secs
        );

        Ok(Self {
            id,
            config,
            engine,
            link,
            command_rx,
            command_tx,
            peer_name: None,
            peer_field: None,
            peer_score: 0,
            ticks: 0,
            match_ticks,
            state: MatchState::Running,
            interval: None,
        })
    }

    /// Get local player ID
    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    /// Name the peer announced in its Hello
    pub fn peer_name(&self) -> Option<&str> {
        self.peer_name.as_deref()
    }

    /// Get a sender for sending commands to this session
    pub fn sender(&self) -> flume::Sender<SessionCommand<E::Action>> {
        self.command_tx.clone()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    /// Time left on the match clock
    pub fn remaining(&self) -> Duration {
        let elapsed = self.config.tick_interval().saturating_mul(self.ticks.min(u32::MAX as u64) as u32);
        self.config.match_duration().saturating_sub(elapsed)
    }

    /// Traffic counters of the peer link
    pub fn stats(&self) -> &LinkStats {
        self.link.stats()
    }

    /// Exchange Hello frames and check that both sides play the same field
    ///
    /// An `Interrupt` command while waiting tells the peer and ends the
    /// session as `Interrupted(LocalInterrupt)`; the handshake itself still
    /// returns `Ok`, so callers check `state()`.
    pub async fn handshake(&mut self) -> Result<()> {
        let (width, height) = self.engine.field_dims();
        let hello = Hello {
            protocol_version: PROTOCOL_VERSION,
            name: self.id.to_string(),
            width,
            height,
        };
        self.link.send(&Frame::Hello(hello)).await?;

        let timeout = Duration::from_millis(self.config.handshake_timeout_ms);
        let received = tokio::select! {
            received = tokio::time::timeout(timeout, self.link.recv()) => Some(received),
            _ = interrupt_requested(&self.command_rx) => None,
        };
        let Some(received) = received else {
            if let Err(e) = self.link.send(&Frame::Control(Control::Interrupt)).await {
                tracing::debug!("Could not tell peer about the interrupt: {}", e);
            }
            self.finish(MatchState::Interrupted(EndReason::LocalInterrupt));
            return Ok(());
        };
        let frame = received
            .map_err(|_| ArenaError::Timeout(format!("no Hello from peer within {:?}", timeout)))??;

        let peer = match frame {
            Frame::Hello(peer) => peer,
            other => {
                return Err(ArenaError::Handshake(format!(
                    "expected hello, got {}",
                    other.kind()
                )));
            }
        };
        if peer.protocol_version != PROTOCOL_VERSION {
            return Err(ArenaError::Handshake(format!(
                "protocol version {} does not match ours ({})",
                peer.protocol_version, PROTOCOL_VERSION
            )));
        }
        if (peer.width, peer.height) != (width, height) {
            return Err(ArenaError::Handshake(format!(
                "peer field is {}x{}, ours is {}x{}",
                peer.width, peer.height, width, height
            )));
        }

        tracing::info!("Session '{}' matched with '{}'", self.id, peer.name);
        self.peer_name = Some(peer.name);
        Ok(())
    }

    /// Wait for the next tick boundary, then run one tick
    pub async fn step(&mut self) -> Result<StepResult> {
        let period = self.config.tick_interval();
        let interval = self.interval.get_or_insert_with(|| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        interval.tick().await;
        self.tick().await
    }

    /// Run one tick without sleeping
    ///
    /// Once the match is over every call returns the final state.
    pub async fn tick(&mut self) -> Result<StepResult> {
        if !self.state.is_running() {
            return Ok(StepResult::Finished(self.state));
        }

        // Player input
        while let Ok(command) = self.command_rx.try_recv() {
            match command {
                SessionCommand::Action(action) => self.engine.apply_action(action),
                SessionCommand::Interrupt => {
                    if let Err(e) = self.link.send(&Frame::Control(Control::Interrupt)).await {
                        tracing::debug!("Could not tell peer about the interrupt: {}", e);
                    }
                    return Ok(self.finish(MatchState::Interrupted(EndReason::LocalInterrupt)));
                }
            }
        }

        // Gravity
        self.engine.tick();

        // Local state to the peer
        self.link.queue(&Frame::Field(self.engine.field_bytes()))?;
        self.link.queue(&Frame::Score(self.engine.score()))?;
        if let Err(e) = self.link.flush().await {
            tracing::warn!("Session '{}' failed to write to peer: {}", self.id, e);
            return Ok(self.finish(MatchState::Interrupted(EndReason::Disconnected)));
        }

        // Peer state, without waiting
        let inbound = match self.link.poll_frames() {
            Ok(inbound) => inbound,
            Err(e) => return Ok(self.desync(e)),
        };
        for frame in inbound.frames {
            tracing::debug!("Received {} frame", frame.kind());
            match self.absorb(frame) {
                Ok(None) => {}
                Ok(Some(control)) => return Ok(self.on_control(control).await),
                Err(e) => return Ok(self.desync(e)),
            }
        }
        if inbound.closed {
            if inbound.truncated > 0 {
                return Ok(self.desync(ArenaError::Protocol(format!(
                    "stream closed inside a frame ({} bytes pending)",
                    inbound.truncated
                ))));
            }
            tracing::info!("Peer closed the stream");
            return Ok(self.finish(MatchState::Interrupted(EndReason::Disconnected)));
        }

        // Match clock
        self.ticks += 1;
        if self.ticks >= self.match_ticks {
            tracing::info!("Session '{}' ran out of time", self.id);
            let state = self.time_up().await;
            return Ok(self.finish(state));
        }

        if self.engine.is_topped_out() {
            if let Err(e) = self.link.send(&Frame::Control(Control::GameOver)).await {
                tracing::debug!("Could not tell peer about the game over: {}", e);
            }
            return Ok(self.finish(MatchState::Lost(EndReason::ToppedOut)));
        }

        Ok(StepResult::Running)
    }

    /// Snapshot for rendering
    pub fn view(&self) -> DuelView {
        DuelView {
            own_name: self.id.to_string(),
            own_field: self.engine.field_bytes(),
            own_score: self.engine.score(),
            peer_name: self.peer_name.clone(),
            peer_field: self.peer_field.clone(),
            peer_score: self.peer_score,
            remaining: self.remaining(),
            state: self.state,
        }
    }

    /// Close our side of the stream
    pub async fn shutdown(&mut self) {
        if let Err(e) = self.link.shutdown().await {
            tracing::debug!("Shutdown of peer stream failed: {}", e);
        }
    }

    /// Apply a data frame; control frames are handed back to the caller
    fn absorb(&mut self, frame: Frame) -> Result<Option<Control>> {
        match frame {
            Frame::Field(cells) => {
                let expected = self.engine.field_len();
                if cells.len() != expected {
                    return Err(ArenaError::Desync {
                        expected,
                        actual: cells.len(),
                    });
                }
                self.peer_field = Some(cells);
            }
            Frame::Score(score) => {
                if score < self.peer_score {
                    tracing::warn!(
                        "Ignoring peer score {} below last accepted {}",
                        score,
                        self.peer_score
                    );
                } else {
                    self.peer_score = score;
                }
            }
            Frame::Control(control) => return Ok(Some(control)),
            Frame::Hello(_) => {
                return Err(ArenaError::Protocol(
                    "hello received during the match".to_string(),
                ));
            }
        }
        Ok(None)
    }

    async fn on_control(&mut self, control: Control) -> StepResult {
        tracing::info!("Session '{}' received {}", self.id, control);
        let state = match control {
            Control::GameOver => MatchState::Won(EndReason::OpponentToppedOut),
            Control::Interrupt => MatchState::Interrupted(EndReason::PeerInterrupt),
            Control::TimeUp => {
                if let Err(e) = self.link.send(&Frame::Control(Control::TimeUp)).await {
                    tracing::debug!("Could not answer time up: {}", e);
                }
                self.compare_scores()
            }
        };
        self.finish(state)
    }

    /// Announce time up and wait for the answer so both sides compare the same scores
    async fn time_up(&mut self) -> MatchState {
        if let Err(e) = self.link.send(&Frame::Control(Control::TimeUp)).await {
            tracing::warn!("Could not announce time up: {}", e);
            return self.compare_scores();
        }

        let timeout = Duration::from_millis(self.config.handshake_timeout_ms);
        match tokio::time::timeout(timeout, self.await_time_up_answer()).await {
            Ok(Some(state)) => state,
            Ok(None) => self.compare_scores(),
            Err(_) => {
                tracing::warn!("Peer did not answer time up within {:?}", timeout);
                self.compare_scores()
            }
        }
    }

    /// Read until the peer's TIMEUP; Some when the peer ended the match another way
    async fn await_time_up_answer(&mut self) -> Option<MatchState> {
        loop {
            let frame = match self.link.recv().await {
                Ok(frame) => frame,
                Err(ArenaError::Disconnected) => {
                    tracing::warn!("Peer closed the stream before answering time up");
                    return None;
                }
                Err(e) => {
                    tracing::error!("Session '{}' lost sync with peer: {}", self.id, e);
                    return Some(MatchState::Interrupted(EndReason::Desync));
                }
            };
            match self.absorb(frame) {
                Ok(None) => {}
                Ok(Some(Control::TimeUp)) => return None,
                Ok(Some(Control::GameOver)) => {
                    return Some(MatchState::Won(EndReason::OpponentToppedOut));
                }
                Ok(Some(Control::Interrupt)) => {
                    return Some(MatchState::Interrupted(EndReason::PeerInterrupt));
                }
                Err(e) => {
                    tracing::error!("Session '{}' lost sync with peer: {}", self.id, e);
                    return Some(MatchState::Interrupted(EndReason::Desync));
                }
            }
        }
    }

    fn compare_scores(&self) -> MatchState {
        match self.engine.score().cmp(&self.peer_score) {
            Ordering::Greater => MatchState::Won(EndReason::TimeUp),
            Ordering::Less => MatchState::Lost(EndReason::TimeUp),
            Ordering::Equal => MatchState::Draw,
        }
    }

    fn desync(&mut self, e: ArenaError) -> StepResult {
        tracing::error!("Session '{}' lost sync with peer: {}", self.id, e);
        self.finish(MatchState::Interrupted(EndReason::Desync))
    }

    fn finish(&mut self, state: MatchState) -> StepResult {
        tracing::info!(
            "Session '{}' finished after {} ticks: {} ({} - {})",
            self.id,
            self.ticks,
            state,
            self.engine.score(),
            self.peer_score
        );
        self.state = state;
        StepResult::Finished(state)
    }
}

/// Resolves on the first `Interrupt`; actions sent before the match are dropped
async fn interrupt_requested<A>(commands: &flume::Receiver<SessionCommand<A>>) {
    while let Ok(command) = commands.recv_async().await {
        if let SessionCommand::Interrupt = command {
            return;
        }
    }
    std::future::pending::<()>().await
}
