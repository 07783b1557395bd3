//! Driving a session from a decision source

use super::{DecisionRequest, DecisionResponse, Session, SessionEvent, SessionStatus};
use crate::dice::Dice;
use crate::error::EncounterError;
use crate::types::{LocationTransition, PlayerAction, Strategy, TrapChoice};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Consecutive rejected answers before the source is treated as gone
const MAX_CONSECUTIVE_REJECTIONS: u32 = 16;

/// Where decisions come from: a prompt, a network peer, a script
pub trait DecisionSource {
    /// Answer a request. `None` means the source has gone away.
    fn decide(&mut self, request: &DecisionRequest) -> Option<DecisionResponse>;

    /// Called for every event the session emits
    fn observe(&mut self, _event: &SessionEvent) {}

    /// Called when an answer was refused; the same request follows
    fn rejected(&mut self, _request: &DecisionRequest, _error: &EncounterError) {}
}

/// Cancellation flag plus an optional deadline, checked before every request
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Cancel every clone of this token
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst) || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// Answer pending decisions until the session is idle or over
///
/// Cancellation, a vanished source, or a source that keeps giving refused
/// answers all abandon the session.
pub fn drive(
    session: &mut Session<'_>,
    source: &mut impl DecisionSource,
    cancel: &CancelToken,
    dice: &mut impl Dice,
) -> SessionStatus {
    let mut rejections = 0;
    loop {
        if session.is_over() {
            return session.status();
        }
        let Some(request) = session.pending_decision() else {
            return session.status();
        };
        if cancel.is_cancelled() {
            tracing::info!("decision wait cancelled");
            return abandon(session, source);
        }
        let Some(response) = source.decide(&request) else {
            tracing::info!("decision source closed");
            return abandon(session, source);
        };

        match session.respond(response, dice) {
            Ok(events) => {
                rejections = 0;
                events.iter().for_each(|event| source.observe(event));
            }
            Err(err) if err.is_retryable() => {
                rejections += 1;
                tracing::debug!(%err, rejections, "decision rejected");
                source.rejected(&request, &err);
                if rejections >= MAX_CONSECUTIVE_REJECTIONS {
                    tracing::warn!(rejections, "decision source keeps answering out of turn");
                    return abandon(session, source);
                }
            }
            Err(err) => {
                tracing::warn!(%err, "session refused a decision");
                return session.status();
            }
        }
    }
}

fn abandon(session: &mut Session<'_>, source: &mut impl DecisionSource) -> SessionStatus {
    for event in session.abandon() {
        source.observe(&event);
    }
    session.status()
}

/// Walk a route of transitions, driving every decision along the way
///
/// Stops early once the session is over.
pub fn run_route<I>(
    session: &mut Session<'_>,
    route: I,
    source: &mut impl DecisionSource,
    cancel: &CancelToken,
    dice: &mut impl Dice,
) -> Result<SessionStatus, EncounterError>
where
    I: IntoIterator<Item = LocationTransition>,
{
    for transition in route {
        if session.is_over() {
            break;
        }
        if cancel.is_cancelled() {
            return Ok(abandon(session, source));
        }
        for event in session.enter_location(&transition, dice)? {
            source.observe(&event);
        }
        drive(session, source, cancel, dice);
    }
    Ok(session.status())
}

/// Replays queued answers, then falls back to fixed defaults
///
/// Every observed event is recorded.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    actions: VecDeque<PlayerAction>,
    strategies: VecDeque<Strategy>,
    trap_choices: VecDeque<TrapChoice>,
    default_action: PlayerAction,
    default_strategy: Strategy,
    default_trap_choice: TrapChoice,
    /// Stop answering once the queues are empty
    exhaustible: bool,
    events: Vec<SessionEvent>,
}

impl Default for ScriptedSource {
    fn default() -> Self {
        ScriptedSource {
            actions: VecDeque::new(),
            strategies: VecDeque::new(),
            trap_choices: VecDeque::new(),
            default_action: PlayerAction::Attack,
            default_strategy: Strategy::Fight,
            default_trap_choice: TrapChoice::Avoid,
            exhaustible: false,
            events: Vec::new(),
        }
    }
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_actions(mut self, actions: impl IntoIterator<Item = PlayerAction>) -> Self {
        self.actions.extend(actions);
        self
    }

    pub fn with_strategies(mut self, strategies: impl IntoIterator<Item = Strategy>) -> Self {
        self.strategies.extend(strategies);
        self
    }

    pub fn with_trap_choices(mut self, choices: impl IntoIterator<Item = TrapChoice>) -> Self {
        self.trap_choices.extend(choices);
        self
    }

    pub fn with_defaults(mut self, action: PlayerAction, strategy: Strategy, trap_choice: TrapChoice) -> Self {
        self.default_action = action;
        self.default_strategy = strategy;
        self.default_trap_choice = trap_choice;
        self
    }

    /// Return `None` instead of defaults once a queue runs dry
    pub fn exhaustible(mut self) -> Self {
        self.exhaustible = true;
        self
    }

    pub fn events(&self) -> &[SessionEvent] {
        &self.events
    }
}

impl DecisionSource for ScriptedSource {
    fn decide(&mut self, request: &DecisionRequest) -> Option<DecisionResponse> {
        let (queued, fallback) = match request {
            DecisionRequest::ChooseAction { .. } => (
                self.actions.pop_front().map(DecisionResponse::Action),
                DecisionResponse::Action(self.default_action),
            ),
            DecisionRequest::ChooseStrategy { .. } => (
                self.strategies.pop_front().map(DecisionResponse::Strategy),
                DecisionResponse::Strategy(self.default_strategy),
            ),
            DecisionRequest::ChooseTrapResponse { .. } => (
                self.trap_choices.pop_front().map(DecisionResponse::Trap),
                DecisionResponse::Trap(self.default_trap_choice),
            ),
        };
        match queued {
            Some(response) => Some(response),
            None if self.exhaustible => None,
            None => Some(fallback),
        }
    }

    fn observe(&mut self, event: &SessionEvent) {
        self.events.push(event.clone());
    }
}
