//! Encounters - spawning opponents and resolving fight/evade/negotiate
//!
//! An encounter is rolled on every location transition. Each opponent is met
//! in order; the player picks a strategy, and anything that is not a clean
//! escape ends up in [`crate::combat`].

mod reward;

pub use reward::{resolve_reward, Reward, RewardPolicy};

use crate::combat::{fight_to_end, CombatOutcome, CombatState, RoundReport};
use crate::config::constants;
use crate::content::ContentProvider;
use crate::dice::Dice;
use crate::stat_block::{Opponent, StatBlock};
use crate::types::{LocationTransition, PlayerAction, Strategy, TerminalState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncounterOrigin {
    /// Rolled on a location transition
    Transition,
    /// Forced by a triggered net trap
    NetTrap,
}

/// Opponents instantiated together, met in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    pub participants: Vec<Opponent>,
    pub origin: EncounterOrigin,
}

impl Encounter {
    pub fn names(&self) -> Vec<&str> {
        self.participants.iter().map(Opponent::name).collect()
    }
}

/// Roll for an encounter on a location transition
///
/// Defeated players never meet anyone.
pub fn begin_encounter_check(
    player: &StatBlock,
    transition: &LocationTransition,
    content: &dyn ContentProvider,
    dice: &mut impl Dice,
) -> Option<Encounter> {
    if player.is_defeated() {
        return None;
    }
    if !dice.succeeds(constants().encounter.encounter_chance) {
        tracing::debug!(from = %transition.from, to = %transition.to, "no encounter");
        return None;
    }
    let encounter = spawn_encounter(content, EncounterOrigin::Transition, dice)?;
    tracing::info!(
        from = %transition.from,
        to = %transition.to,
        opponents = ?encounter.names(),
        "encounter"
    );
    Some(encounter)
}

/// Sample distinct opponents from the enemy pool, no chance roll
///
/// The opponent count is capped by the pool size. Returns `None` only when
/// the pool is empty.
pub fn spawn_encounter(content: &dyn ContentProvider, origin: EncounterOrigin, dice: &mut impl Dice) -> Option<Encounter> {
    let pool = content.enemies();
    if pool.is_empty() {
        tracing::warn!(?origin, "encounter spawned with an empty enemy pool");
        return None;
    }
    let tuning = &constants().encounter;
    let count = dice.roll(tuning.min_opponents, tuning.max_opponents).max(1) as usize;
    let participants = dice
        .sample_distinct(pool.len(), count)
        .into_iter()
        .map(|index| Opponent::from_record(&pool[index]))
        .collect();

    Some(Encounter { participants, origin })
}

/// How a fight came about; decides whether its victory is rewarded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FightPath {
    Chosen,
    AfterFailedEvade,
    AfterFailedNegotiation,
}

/// Result of the pre-combat strategy choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyResolution {
    Evaded,
    Negotiated { reward: Reward },
    Fight(FightPath),
}

/// Resolve a fight/evade/negotiate choice against the current opponent
///
/// A successful negotiation grants its reward immediately.
pub fn choose_encounter_strategy(
    player: &mut StatBlock,
    strategy: Strategy,
    content: &dyn ContentProvider,
    dice: &mut impl Dice,
) -> StrategyResolution {
    let tuning = &constants().encounter;
    let resolution = match strategy {
        Strategy::Fight => StrategyResolution::Fight(FightPath::Chosen),
        Strategy::Evade => {
            if dice.succeeds(tuning.evade_chance) {
                StrategyResolution::Evaded
            } else {
                StrategyResolution::Fight(FightPath::AfterFailedEvade)
            }
        }
        Strategy::Negotiate => {
            if dice.succeeds(tuning.negotiate_chance) {
                StrategyResolution::Negotiated {
                    reward: resolve_reward(player, content, dice),
                }
            } else {
                StrategyResolution::Fight(FightPath::AfterFailedNegotiation)
            }
        }
    };
    tracing::debug!(player = player.name(), ?strategy, ?resolution, "strategy resolved");
    resolution
}

/// Final result of meeting one opponent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EncounterOutcome {
    Victory { reward: Option<Reward> },
    Defeat,
    Evaded,
    Negotiated { reward: Reward },
    /// Round cap reached; no reward
    Stalemate,
}

impl EncounterOutcome {
    pub fn terminal_state(&self) -> TerminalState {
        match self {
            EncounterOutcome::Victory { .. } => TerminalState::Victory,
            EncounterOutcome::Defeat => TerminalState::Defeat,
            EncounterOutcome::Evaded | EncounterOutcome::Negotiated { .. } => TerminalState::Escaped,
            EncounterOutcome::Stalemate => TerminalState::Stalemate,
        }
    }

    pub fn reward(&self) -> Option<&Reward> {
        match self {
            EncounterOutcome::Victory { reward } => reward.as_ref(),
            EncounterOutcome::Negotiated { reward } => Some(reward),
            _ => None,
        }
    }
}

/// Close out a finished fight, granting the reward the policy allows
pub fn conclude_fight(
    player: &mut StatBlock,
    outcome: CombatOutcome,
    path: FightPath,
    policy: &RewardPolicy,
    content: &dyn ContentProvider,
    dice: &mut impl Dice,
) -> EncounterOutcome {
    match outcome {
        CombatOutcome::Victory => {
            let reward = policy
                .rewards_victory(path)
                .then(|| resolve_reward(player, content, dice));
            EncounterOutcome::Victory { reward }
        }
        CombatOutcome::Defeat => EncounterOutcome::Defeat,
        CombatOutcome::Stalemate => EncounterOutcome::Stalemate,
    }
}

/// Everything that happened against one opponent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpponentReport {
    pub opponent: String,
    pub strategy: Strategy,
    pub fight: Option<FightPath>,
    pub rounds: Vec<RoundReport>,
    pub outcome: EncounterOutcome,
}

/// Resolve one opponent synchronously, strategy through reward
pub fn resolve_opponent<A>(
    player: &mut StatBlock,
    opponent: Opponent,
    strategy: Strategy,
    policy: &RewardPolicy,
    content: &dyn ContentProvider,
    dice: &mut impl Dice,
    choose_action: A,
) -> OpponentReport
where
    A: FnMut(&CombatState, &StatBlock) -> PlayerAction,
{
    let name = opponent.name().to_string();
    let (fight, rounds, outcome) = match choose_encounter_strategy(player, strategy, content, dice) {
        StrategyResolution::Evaded => (None, Vec::new(), EncounterOutcome::Evaded),
        StrategyResolution::Negotiated { reward } => (None, Vec::new(), EncounterOutcome::Negotiated { reward }),
        StrategyResolution::Fight(path) => {
            let mut state = CombatState::new(opponent);
            let (combat, rounds) = fight_to_end(&mut state, player, dice, choose_action);
            let outcome = conclude_fight(player, combat, path, policy, content, dice);
            (Some(path), rounds, outcome)
        }
    };

    OpponentReport {
        opponent: name,
        strategy,
        fight,
        rounds,
        outcome,
    }
}

/// Resolve every opponent in order, stopping if the player falls
pub fn resolve_encounter<S, A>(
    player: &mut StatBlock,
    encounter: Encounter,
    policy: &RewardPolicy,
    content: &dyn ContentProvider,
    dice: &mut impl Dice,
    mut choose_strategy: S,
    mut choose_action: A,
) -> Vec<OpponentReport>
where
    S: FnMut(&Opponent, &StatBlock) -> Strategy,
    A: FnMut(&CombatState, &StatBlock) -> PlayerAction,
{
    let mut reports = Vec::with_capacity(encounter.participants.len());
    for opponent in encounter.participants {
        if player.is_defeated() {
            break;
        }
        let strategy = choose_strategy(&opponent, player);
        reports.push(resolve_opponent(
            player,
            opponent,
            strategy,
            policy,
            content,
            dice,
            &mut choose_action,
        ));
    }
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::InMemoryContent;
    use crate::dice::{seeded, ScriptedDice};
    use crate::types::ClassTag;

    fn setup() -> InMemoryContent {
        InMemoryContent::new()
            .with_enemy("Goblin", 30, 0.8)
            .with_enemy("Orc", 60, 1.2)
            .with_enemy("Bat", 10, 0.2)
    }

    fn transition() -> LocationTransition {
        LocationTransition::new("Forest", "Cave")
    }

    #[test]
    fn test_encounter_roll() {
        let content = setup();
        let player = StatBlock::for_class(ClassTag::Warrior);

        let mut dice = ScriptedDice::maxed().with_chances([0.4]);
        assert!(begin_encounter_check(&player, &transition(), &content, &mut dice).is_none());

        let mut dice = ScriptedDice::maxed().with_chances([0.39]);
        let encounter = begin_encounter_check(&player, &transition(), &content, &mut dice).unwrap();
        // Four rolled, capped by a pool of three
        assert_eq!(encounter.participants.len(), 3);
        assert_eq!(encounter.origin, EncounterOrigin::Transition);
    }

    #[test]
    fn test_defeated_player_meets_nobody() {
        let content = setup();
        let player = StatBlock::new("ghost", 10).with_health(0);
        let mut dice = ScriptedDice::minimal();
        assert!(begin_encounter_check(&player, &transition(), &content, &mut dice).is_none());
    }

    #[test]
    fn test_opponents_are_distinct() {
        let content = setup();
        let mut rng = seeded(3);
        for _ in 0..50 {
            if let Some(encounter) = spawn_encounter(&content, EncounterOrigin::NetTrap, &mut rng) {
                let mut names = encounter.names();
                assert!((1..=3).contains(&names.len()));
                names.sort_unstable();
                names.dedup();
                assert_eq!(names.len(), encounter.participants.len());
            }
        }
    }

    #[test]
    fn test_empty_pool_spawns_nothing() {
        let content = InMemoryContent::new();
        let mut dice = ScriptedDice::minimal();
        assert!(spawn_encounter(&content, EncounterOrigin::NetTrap, &mut dice).is_none());
    }

    #[test]
    fn test_strategy_branches() {
        let content = setup();
        let mut player = StatBlock::for_class(ClassTag::Rogue);

        let mut dice = ScriptedDice::maxed().with_chances([0.2]);
        assert_eq!(
            choose_encounter_strategy(&mut player, Strategy::Evade, &content, &mut dice),
            StrategyResolution::Evaded
        );

        let mut dice = ScriptedDice::maxed().with_chances([0.5]);
        assert_eq!(
            choose_encounter_strategy(&mut player, Strategy::Evade, &content, &mut dice),
            StrategyResolution::Fight(FightPath::AfterFailedEvade)
        );

        let mut dice = ScriptedDice::maxed().with_chances([0.6]);
        assert_eq!(
            choose_encounter_strategy(&mut player, Strategy::Negotiate, &content, &mut dice),
            StrategyResolution::Fight(FightPath::AfterFailedNegotiation)
        );
        assert_eq!(player.damage_modifier(), 1.0);
    }

    #[test]
    fn test_successful_negotiation_rewards() {
        let content = setup();
        let mut player = StatBlock::for_class(ClassTag::Mage);
        let mut dice = ScriptedDice::minimal();
        let resolution = choose_encounter_strategy(&mut player, Strategy::Negotiate, &content, &mut dice);
        assert_eq!(resolution, StrategyResolution::Negotiated { reward: Reward::Gold });
        assert!((player.damage_modifier() - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_failed_negotiation_victory_unrewarded_by_default() {
        // Step 1: Negotiation fails, the fight is won in one blow
        let content = setup();
        let mut player = StatBlock::for_class(ClassTag::Warrior);
        let opponent = Opponent::from_record(content.enemy("Bat").unwrap());
        let mut dice = ScriptedDice::maxed();

        let report = resolve_opponent(
            &mut player,
            opponent,
            Strategy::Negotiate,
            &RewardPolicy::default(),
            &content,
            &mut dice,
            |_, _| PlayerAction::Attack,
        );

        // Step 2: Victory, but no reward and no modifier growth
        assert_eq!(report.fight, Some(FightPath::AfterFailedNegotiation));
        assert_eq!(report.outcome, EncounterOutcome::Victory { reward: None });
        assert_eq!(player.damage_modifier(), 1.0);
    }

    #[test]
    fn test_generous_policy_rewards_failed_negotiation() {
        let content = setup();
        let mut player = StatBlock::for_class(ClassTag::Warrior);
        let opponent = Opponent::from_record(content.enemy("Bat").unwrap());
        let mut dice = ScriptedDice::maxed();

        let report = resolve_opponent(
            &mut player,
            opponent,
            Strategy::Negotiate,
            &RewardPolicy::generous(),
            &content,
            &mut dice,
            |_, _| PlayerAction::Attack,
        );
        assert!(report.outcome.reward().is_some());
        assert_eq!(report.outcome.terminal_state(), TerminalState::Victory);
    }

    #[test]
    fn test_resolve_encounter_stops_on_defeat() {
        let content = InMemoryContent::new()
            .with_enemy("Dragon", 1_000, 50.0)
            .with_enemy("Goblin", 30, 0.8);
        let encounter = Encounter {
            participants: content.enemies().iter().map(Opponent::from_record).collect(),
            origin: EncounterOrigin::NetTrap,
        };
        let mut player = StatBlock::for_class(ClassTag::Mage);
        let mut dice = ScriptedDice::maxed();

        let reports = resolve_encounter(
            &mut player,
            encounter,
            &RewardPolicy::default(),
            &content,
            &mut dice,
            |_, _| Strategy::Fight,
            |_, _| PlayerAction::Attack,
        );
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].outcome, EncounterOutcome::Defeat);
        assert!(player.is_defeated());
    }
}
