//! Session - a pull-based state machine around one player's adventure
//!
//! The session never blocks. After every call, [`Session::pending_decision`]
//! says what it needs next; the caller answers with [`Session::respond`].
//! Moves and item use are only accepted while nothing is pending.
//!
//! Per transition the order is: poison tick, encounter roll, trap roll,
//! then every opponent in turn, then the trap.

mod driver;

pub use driver::{drive, run_route, CancelToken, DecisionSource, ScriptedSource};

use crate::combat::{run_combat_round, CombatState, RoundReport};
use crate::content::ContentProvider;
use crate::dice::Dice;
use crate::encounter::{
    begin_encounter_check, choose_encounter_strategy, conclude_fight, spawn_encounter, Encounter, EncounterOrigin,
    EncounterOutcome, FightPath, Reward, RewardPolicy, StrategyResolution,
};
use crate::error::EncounterError;
use crate::item_use::{use_consumable, ItemUse};
use crate::stat_block::{Consumables, Opponent, StatBlock};
use crate::status::{self, PoisonTick};
use crate::trap::{self, roll_trap, Detection, Trap, TrapEffect, TrapKind, TrapOutcome};
use crate::types::{EndReason, LocationTransition, PlayerAction, Strategy, TrapChoice};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// What the session needs from the player next
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum DecisionRequest {
    ChooseAction {
        opponent: String,
        round: u32,
        player_health: u32,
        opponent_health: u32,
    },
    ChooseStrategy {
        opponent: String,
        /// Opponents still to meet, this one included
        remaining: usize,
    },
    ChooseTrapResponse { trap: TrapKind },
}

impl DecisionRequest {
    /// Human-readable list of valid answers
    pub fn options(&self) -> &'static str {
        match self {
            DecisionRequest::ChooseAction { .. } => PlayerAction::EXPECTED,
            DecisionRequest::ChooseStrategy { .. } => Strategy::EXPECTED,
            DecisionRequest::ChooseTrapResponse { .. } => TrapChoice::EXPECTED,
        }
    }

    /// Parse free-text input as an answer to this request
    pub fn parse(&self, input: &str) -> Result<DecisionResponse, EncounterError> {
        Ok(match self {
            DecisionRequest::ChooseAction { .. } => DecisionResponse::Action(input.parse()?),
            DecisionRequest::ChooseStrategy { .. } => DecisionResponse::Strategy(input.parse()?),
            DecisionRequest::ChooseTrapResponse { .. } => DecisionResponse::Trap(input.parse()?),
        })
    }

    fn accepts(&self, response: &DecisionResponse) -> bool {
        matches!(
            (self, response),
            (DecisionRequest::ChooseAction { .. }, DecisionResponse::Action(_))
                | (DecisionRequest::ChooseStrategy { .. }, DecisionResponse::Strategy(_))
                | (DecisionRequest::ChooseTrapResponse { .. }, DecisionResponse::Trap(_))
        )
    }
}

impl fmt::Display for DecisionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionRequest::ChooseAction {
                opponent,
                round,
                player_health,
                opponent_health,
            } => write!(
                f,
                "Round {} against {} (you {} hp, it {} hp): {}?",
                round,
                opponent,
                player_health,
                opponent_health,
                self.options()
            ),
            DecisionRequest::ChooseStrategy { opponent, .. } => {
                write!(f, "A {} blocks your path: {}?", opponent, self.options())
            }
            DecisionRequest::ChooseTrapResponse { trap } => {
                write!(f, "You spot a {} trap: {}?", trap, self.options())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "response", content = "choice", rename_all = "snake_case")]
pub enum DecisionResponse {
    Action(PlayerAction),
    Strategy(Strategy),
    Trap(TrapChoice),
}

impl fmt::Display for DecisionResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionResponse::Action(action) => write!(f, "{:?}", action),
            DecisionResponse::Strategy(strategy) => write!(f, "{:?}", strategy),
            DecisionResponse::Trap(choice) => write!(f, "{:?}", choice),
        }
    }
}

/// Reported to the caller as the session progresses
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    EncounterStarted {
        origin: EncounterOrigin,
        opponents: Vec<String>,
    },
    TrapSprung {
        trap: TrapKind,
        detection: Detection,
    },
    TrapResolved(TrapOutcome),
    StrategyResolved {
        opponent: String,
        strategy: Strategy,
        resolution: StrategyResolution,
    },
    RoundResolved(RoundReport),
    /// Poison tick outside combat; in-combat ticks are part of the round report
    PoisonTicked(PoisonTick),
    ItemUsed(ItemUse),
    /// The caller owns the inventory and decides what to do with item rewards
    RewardGranted(Reward),
    OpponentResolved {
        opponent: String,
        outcome: EncounterOutcome,
    },
    SessionEnded {
        reason: EndReason,
    },
}

/// Session-over flag plus the reason
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub over: bool,
    pub reason: Option<EndReason>,
}

#[derive(Debug, Clone)]
enum Phase {
    Exploring,
    AwaitingTrap { trap: Trap, detection: Detection },
    AwaitingStrategy,
    InCombat { combat: CombatState, path: FightPath },
    Over,
}

pub struct Session<'c> {
    player: StatBlock,
    content: &'c dyn ContentProvider,
    policy: RewardPolicy,
    phase: Phase,
    /// Opponents of the current encounter not yet met
    opponents: VecDeque<Opponent>,
    /// Trap rolled on the current transition, sprung once the encounter is over
    deferred_trap: Option<Trap>,
    status: SessionStatus,
}

impl<'c> Session<'c> {
    pub fn new(player: StatBlock, content: &'c dyn ContentProvider) -> Self {
        Session {
            player,
            content,
            policy: RewardPolicy::default(),
            phase: Phase::Exploring,
            opponents: VecDeque::new(),
            deferred_trap: None,
            status: SessionStatus::default(),
        }
    }

    pub fn with_reward_policy(mut self, policy: RewardPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn player(&self) -> &StatBlock {
        &self.player
    }

    /// Inventory access for the owning collaborator (picking up item rewards)
    pub fn inventory_mut(&mut self) -> &mut Consumables {
        self.player.consumables_mut()
    }

    pub fn into_player(self) -> StatBlock {
        self.player
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status.over
    }

    /// The decision the session is waiting on, if any
    pub fn pending_decision(&self) -> Option<DecisionRequest> {
        match &self.phase {
            Phase::AwaitingTrap { trap, .. } => Some(DecisionRequest::ChooseTrapResponse { trap: trap.kind }),
            Phase::AwaitingStrategy => self.opponents.front().map(|opponent| DecisionRequest::ChooseStrategy {
                opponent: opponent.name().to_string(),
                remaining: self.opponents.len(),
            }),
            Phase::InCombat { combat, .. } => Some(DecisionRequest::ChooseAction {
                opponent: combat.opponent().name().to_string(),
                round: combat.rounds() + 1,
                player_health: self.player.health(),
                opponent_health: combat.opponent().stats().health(),
            }),
            Phase::Exploring | Phase::Over => None,
        }
    }

    // === Exploration ===

    /// Move between locations: tick poison, roll for an encounter and a trap
    pub fn enter_location(
        &mut self,
        transition: &LocationTransition,
        dice: &mut impl Dice,
    ) -> Result<Vec<SessionEvent>, EncounterError> {
        self.ensure_exploring(|| format!("move to {}", transition.to))?;
        let mut events = Vec::new();

        // Step 1: The move itself is an action
        let tick = status::tick(&mut self.player);
        if tick != PoisonTick::NotPoisoned {
            events.push(SessionEvent::PoisonTicked(tick));
        }
        if tick.defeated() {
            self.end(EndReason::Expired, &mut events);
            return Ok(events);
        }

        // Step 2: Both rolls happen on arrival; the trap waits for the encounter
        let encounter = begin_encounter_check(&self.player, transition, self.content, dice);
        self.deferred_trap = roll_trap(dice);

        match encounter {
            Some(encounter) => self.start_encounter(encounter, &mut events),
            None => self.advance(&mut events, dice),
        }
        Ok(events)
    }

    /// Spring a specific trap, e.g. one placed by the location itself
    pub fn spring_trap(&mut self, trap: Trap, dice: &mut impl Dice) -> Result<Vec<SessionEvent>, EncounterError> {
        self.ensure_exploring(|| format!("spring {} trap", trap.kind))?;
        let mut events = Vec::new();
        self.begin_trap(trap, &mut events, dice);
        Ok(events)
    }

    /// Use a consumable outside combat
    pub fn use_item(&mut self, item: &str, dice: &mut impl Dice) -> Result<Vec<SessionEvent>, EncounterError> {
        self.ensure_exploring(|| format!("use {}", item))?;
        let used = use_consumable(&mut self.player, item, self.content, dice)?;
        let expired = used.poison.defeated();

        let mut events = vec![SessionEvent::ItemUsed(used)];
        if expired {
            self.end(EndReason::Expired, &mut events);
        }
        Ok(events)
    }

    /// Give up; the session ends with `Abandoned`
    pub fn abandon(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if !self.status.over {
            self.end(EndReason::Abandoned, &mut events);
        }
        events
    }

    // === Decisions ===

    /// Parse and apply a free-text answer to the pending request
    pub fn respond_str(&mut self, input: &str, dice: &mut impl Dice) -> Result<Vec<SessionEvent>, EncounterError> {
        if self.status.over {
            return Err(EncounterError::SessionOver);
        }
        let request = self
            .pending_decision()
            .ok_or_else(|| EncounterError::invalid(input, "no decision is pending"))?;
        let response = request.parse(input)?;
        self.respond(response, dice)
    }

    /// Answer the pending request
    ///
    /// A response that does not fit the request is rejected with
    /// `InvalidAction` and changes nothing.
    pub fn respond(
        &mut self,
        response: DecisionResponse,
        dice: &mut impl Dice,
    ) -> Result<Vec<SessionEvent>, EncounterError> {
        if self.status.over {
            return Err(EncounterError::SessionOver);
        }
        match self.pending_decision() {
            Some(request) if request.accepts(&response) => {}
            Some(request) => return Err(EncounterError::invalid(response.to_string(), request.options())),
            None => return Err(EncounterError::invalid(response.to_string(), "no decision is pending")),
        }

        let mut events = Vec::new();
        match (std::mem::replace(&mut self.phase, Phase::Exploring), response) {
            (Phase::AwaitingTrap { trap, detection }, DecisionResponse::Trap(choice)) => {
                self.answer_trap(trap, detection, choice, &mut events, dice);
            }
            (Phase::AwaitingStrategy, DecisionResponse::Strategy(strategy)) => {
                self.answer_strategy(strategy, &mut events, dice);
            }
            (Phase::InCombat { combat, path }, DecisionResponse::Action(action)) => {
                self.answer_action(combat, path, action, &mut events, dice)?;
            }
            (phase, _) => self.phase = phase,
        }
        Ok(events)
    }

    fn answer_trap(
        &mut self,
        trap: Trap,
        detection: Detection,
        choice: TrapChoice,
        events: &mut Vec<SessionEvent>,
        dice: &mut impl Dice,
    ) {
        let resolution = trap::resolve_choice(&mut self.player, &trap, choice, dice);
        let effect = match resolution.severity() {
            Some(severity) => trap::trigger(&mut self.player, &trap, severity, dice),
            None => TrapEffect::default(),
        };
        let outcome = TrapOutcome {
            kind: trap.kind,
            detection,
            resolution,
            effect,
        };
        self.finish_trap(outcome, events, dice);
    }

    fn answer_strategy(&mut self, strategy: Strategy, events: &mut Vec<SessionEvent>, dice: &mut impl Dice) {
        let Some(opponent) = self.opponents.pop_front() else {
            self.advance(events, dice);
            return;
        };
        let resolution = choose_encounter_strategy(&mut self.player, strategy, self.content, dice);
        events.push(SessionEvent::StrategyResolved {
            opponent: opponent.name().to_string(),
            strategy,
            resolution: resolution.clone(),
        });

        let outcome = match resolution {
            StrategyResolution::Fight(path) => {
                self.phase = Phase::InCombat {
                    combat: CombatState::new(opponent),
                    path,
                };
                return;
            }
            StrategyResolution::Evaded => EncounterOutcome::Evaded,
            StrategyResolution::Negotiated { reward } => {
                events.push(SessionEvent::RewardGranted(reward.clone()));
                EncounterOutcome::Negotiated { reward }
            }
        };
        events.push(SessionEvent::OpponentResolved {
            opponent: opponent.name().to_string(),
            outcome,
        });
        self.advance(events, dice);
    }

    fn answer_action(
        &mut self,
        mut combat: CombatState,
        path: FightPath,
        action: PlayerAction,
        events: &mut Vec<SessionEvent>,
        dice: &mut impl Dice,
    ) -> Result<(), EncounterError> {
        let report = match run_combat_round(&mut combat, &mut self.player, action, dice) {
            Ok(report) => report,
            Err(err) => {
                self.phase = Phase::InCombat { combat, path };
                return Err(err);
            }
        };
        let poisoned_to_death = report.poison.defeated();
        events.push(SessionEvent::RoundResolved(report));

        let Some(combat_outcome) = combat.outcome() else {
            self.phase = Phase::InCombat { combat, path };
            return Ok(());
        };
        let outcome = conclude_fight(&mut self.player, combat_outcome, path, &self.policy, self.content, dice);
        if let Some(reward) = outcome.reward() {
            events.push(SessionEvent::RewardGranted(reward.clone()));
        }
        let defeated = outcome == EncounterOutcome::Defeat;
        events.push(SessionEvent::OpponentResolved {
            opponent: combat.opponent().name().to_string(),
            outcome,
        });

        if defeated {
            let reason = if poisoned_to_death {
                EndReason::Expired
            } else {
                EndReason::Defeated
            };
            self.end(reason, events);
        } else {
            self.advance(events, dice);
        }
        Ok(())
    }

    // === Internal flow ===

    fn ensure_exploring(&self, describe: impl FnOnce() -> String) -> Result<(), EncounterError> {
        match (&self.phase, self.pending_decision()) {
            (Phase::Over, _) => Err(EncounterError::SessionOver),
            (_, Some(request)) => Err(EncounterError::invalid(describe(), request.options())),
            _ => Ok(()),
        }
    }

    fn start_encounter(&mut self, encounter: Encounter, events: &mut Vec<SessionEvent>) {
        events.push(SessionEvent::EncounterStarted {
            origin: encounter.origin,
            opponents: encounter.names().into_iter().map(str::to_string).collect(),
        });
        self.opponents.extend(encounter.participants);
        self.phase = Phase::AwaitingStrategy;
    }

    /// Move on to the next opponent, then the deferred trap, then free exploration
    fn advance(&mut self, events: &mut Vec<SessionEvent>, dice: &mut impl Dice) {
        if !self.opponents.is_empty() {
            self.phase = Phase::AwaitingStrategy;
        } else if let Some(trap) = self.deferred_trap.take() {
            self.begin_trap(trap, events, dice);
        } else {
            self.phase = Phase::Exploring;
        }
    }

    fn begin_trap(&mut self, trap: Trap, events: &mut Vec<SessionEvent>, dice: &mut impl Dice) {
        let detection = trap::detect(&mut self.player, dice);
        events.push(SessionEvent::TrapSprung {
            trap: trap.kind,
            detection,
        });
        if detection.is_detected() {
            self.phase = Phase::AwaitingTrap { trap, detection };
            return;
        }

        let resolution = trap::TrapResolution::Triggered {
            severity: trap::Severity::Full,
            tool: trap::ToolUse::NotUsed,
        };
        let effect = trap::trigger(&mut self.player, &trap, trap::Severity::Full, dice);
        let outcome = TrapOutcome {
            kind: trap.kind,
            detection,
            resolution,
            effect,
        };
        self.finish_trap(outcome, events, dice);
    }

    fn finish_trap(&mut self, outcome: TrapOutcome, events: &mut Vec<SessionEvent>, dice: &mut impl Dice) {
        events.push(SessionEvent::TrapResolved(outcome));
        if outcome.expired() {
            self.end(EndReason::Expired, events);
            return;
        }
        if outcome.spawns_encounter() {
            if let Some(encounter) = spawn_encounter(self.content, EncounterOrigin::NetTrap, dice) {
                self.start_encounter(encounter, events);
                return;
            }
        }
        self.advance(events, dice);
    }

    fn end(&mut self, reason: EndReason, events: &mut Vec<SessionEvent>) {
        self.phase = Phase::Over;
        self.opponents.clear();
        self.deferred_trap = None;
        self.status = SessionStatus {
            over: true,
            reason: Some(reason),
        };
        tracing::info!(
            player = self.player.name(),
            %reason,
            health = self.player.health(),
            "session ended"
        );
        events.push(SessionEvent::SessionEnded { reason });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{InMemoryContent, ItemKind};
    use crate::dice::ScriptedDice;
    use crate::types::{ClassTag, HEALTH_POTION};

    fn setup() -> InMemoryContent {
        InMemoryContent::new()
            .with_enemy("Goblin", 30, 0.8)
            .with_item(HEALTH_POTION, ItemKind::Consumable)
    }

    fn transition() -> LocationTransition {
        LocationTransition::new("Village", "Forest")
    }

    #[test]
    fn test_quiet_move() {
        let content = setup();
        let mut session = Session::new(StatBlock::for_class(ClassTag::Warrior), &content);
        let mut dice = ScriptedDice::maxed();

        let events = session.enter_location(&transition(), &mut dice).unwrap();
        assert!(events.is_empty());
        assert!(session.pending_decision().is_none());
        assert!(!session.status().over);
    }

    #[test]
    fn test_encounter_flow_to_victory() {
        // Step 1: Encounter roll hits, no trap
        let content = setup();
        let mut session = Session::new(StatBlock::for_class(ClassTag::Warrior), &content);
        let mut dice = ScriptedDice::maxed().with_chances([0.1, 0.9]);
        let events = session.enter_location(&transition(), &mut dice).unwrap();
        assert!(matches!(events[0], SessionEvent::EncounterStarted { .. }));
        assert!(matches!(
            session.pending_decision(),
            Some(DecisionRequest::ChooseStrategy { remaining: 1, .. })
        ));

        // Step 2: Fight
        session.respond_str("fight", &mut dice).unwrap();
        assert!(matches!(
            session.pending_decision(),
            Some(DecisionRequest::ChooseAction { round: 1, .. })
        ));

        // Step 3: One maxed attack (15 + 15) kills the goblin
        let events = session.respond(DecisionResponse::Action(PlayerAction::Attack), &mut dice).unwrap();
        assert!(events.iter().any(|e| matches!(e, SessionEvent::RewardGranted(_))));
        assert!(events.iter().any(|e| matches!(
            e,
            SessionEvent::OpponentResolved {
                outcome: EncounterOutcome::Victory { reward: Some(_) },
                ..
            }
        )));
        assert!(session.pending_decision().is_none());
        assert!((session.player().damage_modifier() - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_mismatched_response_changes_nothing() {
        let content = setup();
        let mut session = Session::new(StatBlock::for_class(ClassTag::Warrior), &content);
        let mut dice = ScriptedDice::maxed().with_chances([0.1, 0.9]);
        session.enter_location(&transition(), &mut dice).unwrap();
        let before = session.pending_decision();

        let err = session
            .respond(DecisionResponse::Action(PlayerAction::Attack), &mut dice)
            .unwrap_err();
        assert!(err.is_retryable());
        let err = session.respond_str("dance", &mut dice).unwrap_err();
        assert!(matches!(err, EncounterError::InvalidAction { expected, .. } if expected == Strategy::EXPECTED));
        assert_eq!(session.pending_decision(), before);

        // Moving on is refused while a decision is pending
        let err = session.enter_location(&transition(), &mut dice).unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_respond_without_pending_decision() {
        let content = setup();
        let mut session = Session::new(StatBlock::for_class(ClassTag::Mage), &content);
        let mut dice = ScriptedDice::maxed();
        let err = session
            .respond(DecisionResponse::Strategy(Strategy::Fight), &mut dice)
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_undetected_trap_resolves_on_arrival() {
        // No encounter (0.9), trap (0.1), spike (roll 0)
        let content = setup();
        let mut session = Session::new(StatBlock::for_class(ClassTag::Mage), &content);
        let mut dice = ScriptedDice::maxed().with_chances([0.9, 0.1]).with_rolls([0]);

        let events = session.enter_location(&transition(), &mut dice).unwrap();
        assert!(matches!(
            events[0],
            SessionEvent::TrapSprung {
                trap: TrapKind::Spike,
                detection: Detection::Undetected
            }
        ));
        assert_eq!(session.player().health(), 60);
        assert!(session.pending_decision().is_none());
    }

    #[test]
    fn test_rogue_trap_waits_for_choice() {
        let content = setup();
        let mut session = Session::new(StatBlock::for_class(ClassTag::Rogue), &content);
        let mut dice = ScriptedDice::maxed().with_chances([0.9, 0.1]).with_rolls([1]);
        session.enter_location(&transition(), &mut dice).unwrap();
        assert_eq!(
            session.pending_decision(),
            Some(DecisionRequest::ChooseTrapResponse { trap: TrapKind::Pitfall })
        );

        // Avoid roll fails against the maxed fallback
        let events = session.respond_str("avoid", &mut dice).unwrap();
        assert!(matches!(events[0], SessionEvent::TrapResolved(outcome) if outcome.effect.damage_taken == 30));
        assert_eq!(session.player().health(), 70);
    }

    #[test]
    fn test_trap_waits_for_encounter() {
        // Encounter (0.1) and trap (0.1) on the same move
        let content = setup();
        let mut session = Session::new(StatBlock::for_class(ClassTag::Warrior), &content);
        let mut dice = ScriptedDice::maxed().with_chances([0.1, 0.1]).with_rolls([1, 0]);
        let events = session.enter_location(&transition(), &mut dice).unwrap();
        assert_eq!(events.len(), 1);

        session.respond_str("fight", &mut dice).unwrap();
        let events = session.respond_str("attack", &mut dice).unwrap();
        assert!(events.iter().any(|e| matches!(e, SessionEvent::TrapResolved(_))));
    }

    #[test]
    fn test_net_trap_forces_encounter() {
        let content = setup();
        let mut session = Session::new(StatBlock::for_class(ClassTag::Warrior), &content);
        let mut dice = ScriptedDice::maxed();

        let events = session.spring_trap(Trap::new(TrapKind::Net), &mut dice).unwrap();
        assert!(events.iter().any(|e| matches!(
            e,
            SessionEvent::EncounterStarted {
                origin: EncounterOrigin::NetTrap,
                ..
            }
        )));
        assert!(matches!(
            session.pending_decision(),
            Some(DecisionRequest::ChooseStrategy { .. })
        ));
    }

    #[test]
    fn test_lethal_trap_expires_session() {
        let content = setup();
        let player = StatBlock::for_class(ClassTag::Mage).with_health(10);
        let mut session = Session::new(player, &content);
        let mut dice = ScriptedDice::maxed();

        let events = session.spring_trap(Trap::new(TrapKind::Spike), &mut dice).unwrap();
        assert_eq!(
            events.last(),
            Some(&SessionEvent::SessionEnded {
                reason: EndReason::Expired
            })
        );
        assert_eq!(
            session.status(),
            SessionStatus {
                over: true,
                reason: Some(EndReason::Expired)
            }
        );
        assert_eq!(
            session.enter_location(&transition(), &mut dice).unwrap_err(),
            EncounterError::SessionOver
        );
        assert_eq!(session.respond_str("fight", &mut dice).unwrap_err(), EncounterError::SessionOver);
    }

    #[test]
    fn test_poison_tick_on_move_can_kill() {
        let content = setup();
        let mut player = StatBlock::for_class(ClassTag::Warrior).with_health(10);
        let mut dice = ScriptedDice::maxed();
        status::apply_poison(&mut player, 3, &mut dice);
        let mut session = Session::new(player, &content);

        let events = session.enter_location(&transition(), &mut dice).unwrap();
        assert!(matches!(events[0], SessionEvent::PoisonTicked(tick) if tick.defeated()));
        assert_eq!(session.status().reason, Some(EndReason::Expired));
    }

    #[test]
    fn test_poison_death_in_combat_expires_session() {
        let content = setup();
        let mut player = StatBlock::for_class(ClassTag::Warrior).with_health(25);
        status::apply_poison(&mut player, 5, &mut ScriptedDice::maxed());
        let mut session = Session::new(player, &content);

        // Step 1: The move ticks to 15, then the goblin shows up
        let mut dice = ScriptedDice::maxed().with_chances([0.1, 0.9]).with_rolls([1]);
        session.enter_location(&transition(), &mut dice).unwrap();
        assert_eq!(session.player().health(), 15);
        session.respond_str("fight", &mut dice).unwrap();

        // Step 2: The block lets 5 through and the round's tick finishes the job
        let events = session.respond_str("block", &mut dice).unwrap();
        assert!(matches!(
            &events[0],
            SessionEvent::RoundResolved(report) if report.block_damage == 5 && report.poison.defeated()
        ));
        assert!(events.iter().any(|e| matches!(
            e,
            SessionEvent::OpponentResolved {
                outcome: EncounterOutcome::Defeat,
                ..
            }
        )));
        assert_eq!(
            events.last(),
            Some(&SessionEvent::SessionEnded {
                reason: EndReason::Expired
            })
        );
        assert_eq!(session.status().reason, Some(EndReason::Expired));
    }

    #[test]
    fn test_stalemate_moves_on_without_reward() {
        let content = InMemoryContent::new().with_enemy("Statue", 1_000, 0.0);
        let mut session = Session::new(StatBlock::for_class(ClassTag::Warrior), &content);
        let mut dice = ScriptedDice::minimal();

        // Step 1: Encounter and a spike trap on the same move
        session.enter_location(&transition(), &mut dice).unwrap();
        session.respond_str("fight", &mut dice).unwrap();

        // Step 2: Block until the round cap
        let mut events = Vec::new();
        while let Some(DecisionRequest::ChooseAction { .. }) = session.pending_decision() {
            events = session.respond_str("block", &mut dice).unwrap();
        }

        assert!(!events.iter().any(|e| matches!(e, SessionEvent::RewardGranted(_))));
        assert!(events.iter().any(|e| matches!(
            e,
            SessionEvent::OpponentResolved {
                outcome: EncounterOutcome::Stalemate,
                ..
            }
        )));

        // Step 3: The deferred trap follows
        assert!(events.iter().any(|e| matches!(
            e,
            SessionEvent::TrapResolved(outcome) if outcome.kind == TrapKind::Spike
        )));
        assert!(!session.is_over());
        assert!(session.pending_decision().is_none());
        assert_eq!(session.player().health(), 100);
        assert!((session.player().damage_modifier() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_use_item_between_moves() {
        let content = setup();
        let mut session = Session::new(StatBlock::for_class(ClassTag::Warrior).with_health(50), &content);
        session.inventory_mut().insert(HEALTH_POTION, 1);
        let mut dice = ScriptedDice::minimal();

        let events = session.use_item(HEALTH_POTION, &mut dice).unwrap();
        assert!(matches!(events[0], SessionEvent::ItemUsed(_)));
        assert_eq!(session.player().health(), 70);

        let err = session.use_item(HEALTH_POTION, &mut dice).unwrap_err();
        assert!(matches!(err, EncounterError::ItemNotAvailable(_)));
    }

    #[test]
    fn test_abandon() {
        let content = setup();
        let mut session = Session::new(StatBlock::for_class(ClassTag::Warrior), &content);
        let events = session.abandon();
        assert_eq!(events.len(), 1);
        assert_eq!(session.status().reason, Some(EndReason::Abandoned));
        assert!(session.abandon().is_empty());
    }
}
