//! Round resolution - one player action against one opponent

use super::result::{CombatOutcome, RoundOutcome, RoundReport};
use super::CombatState;
use crate::config::constants;
use crate::dice::Dice;
use crate::error::EncounterError;
use crate::stat_block::{Opponent, StatBlock};
use crate::status;
use crate::types::{PlayerAction, HEALTH_POTION};

/// Resolve one combat round
///
/// Draw order is fixed so seeded runs replay exactly:
/// 1. Attack roll (Attack), block roll (Block) or heal roll (Heal with a potion)
/// 2. Exchange roll, if the player attacked and the opponent survived
/// 3. Counter-attack roll, on any non-block round the opponent survived
///
/// Poison ticks once at the end of the round if the player is still standing.
pub fn run_combat_round(
    state: &mut CombatState,
    player: &mut StatBlock,
    action: PlayerAction,
    dice: &mut impl Dice,
) -> Result<RoundReport, EncounterError> {
    if state.is_resolved() {
        return Err(EncounterError::AlreadyResolved);
    }
    Ok(resolve_round(state, player, action, dice))
}

pub(super) fn resolve_round(
    state: &mut CombatState,
    player: &mut StatBlock,
    action: PlayerAction,
    dice: &mut impl Dice,
) -> RoundReport {
    let combat = &constants().combat;
    state.rounds += 1;
    let mut report = RoundReport::new(state.rounds, action);

    // Step 1: The player's action
    match action {
        PlayerAction::Attack => {
            let roll = combat.attack_roll.roll(dice);
            let dealt = attack_damage(roll, player);
            state.opponent.stats_mut().apply_damage(dealt);
            report.damage_dealt = dealt;

            if !state.opponent.stats().is_defeated() {
                let roll = combat.counter_roll.roll(dice);
                report.exchange_damage = exchange_damage(roll, player.armor_rating());
                player.apply_damage(report.exchange_damage);
            }
        }
        PlayerAction::Block => {
            report.block_damage = combat.block_roll.roll(dice);
            player.apply_damage(report.block_damage);
        }
        PlayerAction::Heal => match player.consume(HEALTH_POTION) {
            Ok(()) => {
                let amount = combat.heal_roll.roll(dice);
                report.healed = player.heal(amount);
            }
            Err(err) => {
                tracing::debug!(player = player.name(), %err, "heal rejected");
                report.rejected = Some(err);
            }
        },
    }

    // Step 2: Counter-attack
    if action != PlayerAction::Block && !state.opponent.stats().is_defeated() && !player.is_defeated() {
        let roll = combat.counter_roll.roll(dice);
        report.counter_damage = counter_damage(roll, &state.opponent);
        player.apply_damage(report.counter_damage);
    }

    // Step 3: Poison
    if !player.is_defeated() {
        report.poison = status::tick(player);
    }

    // Step 4: Termination
    let outcome = if player.is_defeated() {
        Some(CombatOutcome::Defeat)
    } else if state.opponent.stats().is_defeated() {
        Some(CombatOutcome::Victory)
    } else if state.rounds >= combat.round_cap {
        Some(CombatOutcome::Stalemate)
    } else {
        None
    };
    state.outcome = outcome;

    report.outcome = outcome.map_or(RoundOutcome::Continue, RoundOutcome::Resolved);
    report.player_health = player.health();
    report.opponent_health = state.opponent.stats().health();

    tracing::debug!(
        round = report.round,
        ?action,
        dealt = report.damage_dealt,
        taken = report.damage_taken(),
        healed = report.healed,
        player_health = report.player_health,
        opponent_health = report.opponent_health,
        "combat round"
    );
    if let Some(outcome) = outcome {
        tracing::info!(
            player = player.name(),
            opponent = state.opponent.name(),
            rounds = state.rounds,
            ?outcome,
            "combat resolved"
        );
    }
    report
}

/// `floor(max(0, roll * damage_modifier + damage_rating))`
fn attack_damage(roll: u32, attacker: &StatBlock) -> u32 {
    let raw = roll as f64 * attacker.damage_modifier() + attacker.damage_rating() as f64;
    raw.max(0.0).floor() as u32
}

/// Percentage mitigation then flat reduction: `floor(max(0, roll * (1 - armor/100) - armor))`
fn exchange_damage(roll: u32, armor: u32) -> u32 {
    let armor = armor as f64;
    let raw = roll as f64 * (1.0 - armor / 100.0) - armor;
    raw.max(0.0).floor() as u32
}

fn counter_damage(roll: u32, opponent: &Opponent) -> u32 {
    (roll as f64 * opponent.damage_factor()).max(0.0).floor() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;
    use crate::stat_block::Consumables;

    fn setup(opponent_health: u32, factor: f64) -> (CombatState, StatBlock) {
        let opponent = Opponent::new(StatBlock::new("Goblin", opponent_health), factor);
        let player = StatBlock::new("hero", 100).with_damage_rating(10);
        (CombatState::new(opponent), player)
    }

    #[test]
    fn test_attack_kills_without_retaliation() {
        let (mut state, mut player) = setup(20, 0.5);
        let mut dice = ScriptedDice::maxed();

        let report = run_combat_round(&mut state, &mut player, PlayerAction::Attack, &mut dice).unwrap();
        assert_eq!(report.damage_dealt, 25);
        assert_eq!(report.damage_taken(), 0);
        assert_eq!(report.outcome, RoundOutcome::Resolved(CombatOutcome::Victory));
        assert_eq!(player.health(), 100);
    }

    #[test]
    fn test_attack_exchange_and_counter() {
        let (mut state, _) = setup(100, 1.0);
        let mut player = StatBlock::new("hero", 100).with_armor_rating(10);
        let mut dice = ScriptedDice::maxed();

        let report = run_combat_round(&mut state, &mut player, PlayerAction::Attack, &mut dice).unwrap();
        // 15 * 0.9 - 10 = 3.5
        assert_eq!(report.exchange_damage, 3);
        assert_eq!(report.counter_damage, 15);
        assert_eq!(player.health(), 82);
        assert_eq!(report.opponent_health, 85);
        assert_eq!(report.outcome, RoundOutcome::Continue);
    }

    #[test]
    fn test_block_replaces_counter() {
        let (mut state, mut player) = setup(100, 2.0);
        let mut dice = ScriptedDice::maxed();

        let report = run_combat_round(&mut state, &mut player, PlayerAction::Block, &mut dice).unwrap();
        assert_eq!(report.block_damage, 5);
        assert_eq!(report.counter_damage, 0);
        assert_eq!(report.damage_dealt, 0);
        assert_eq!(player.health(), 95);
    }

    #[test]
    fn test_heal_without_potion_still_takes_counter() {
        let (mut state, player) = setup(100, 0.5);
        let mut player = player.with_health(60);
        let mut dice = ScriptedDice::maxed();

        let report = run_combat_round(&mut state, &mut player, PlayerAction::Heal, &mut dice).unwrap();
        assert!(matches!(report.rejected, Some(EncounterError::ItemNotAvailable(_))));
        assert_eq!(report.healed, 0);
        assert_eq!(report.counter_damage, 7);
        assert_eq!(player.health(), 53);
    }

    #[test]
    fn test_heal_consumes_potion() {
        let (mut state, _) = setup(100, 0.0);
        let mut player = StatBlock::new("hero", 100)
            .with_health(50)
            .with_consumables([HEALTH_POTION].into_iter().collect::<Consumables>());
        let mut dice = ScriptedDice::maxed();

        let report = run_combat_round(&mut state, &mut player, PlayerAction::Heal, &mut dice).unwrap();
        assert_eq!(report.healed, 20);
        assert_eq!(player.health(), 70);
        assert!(!player.consumables().contains(HEALTH_POTION));
    }

    #[test]
    fn test_defeat() {
        let (mut state, _) = setup(100, 1.0);
        let mut player = StatBlock::new("hero", 100).with_health(5);
        let mut dice = ScriptedDice::maxed();

        let report = run_combat_round(&mut state, &mut player, PlayerAction::Heal, &mut dice).unwrap();
        assert_eq!(report.outcome, RoundOutcome::Resolved(CombatOutcome::Defeat));
        assert!(player.is_defeated());
        assert_eq!(state.outcome(), Some(CombatOutcome::Defeat));
    }

    #[test]
    fn test_round_cap_stalemate() {
        // Step 1: Block forever against an opponent nobody can hurt
        let (mut state, mut player) = setup(100, 1.0);
        let mut dice = ScriptedDice::minimal();
        let cap = constants().combat.round_cap;
        for _ in 0..cap {
            run_combat_round(&mut state, &mut player, PlayerAction::Block, &mut dice).unwrap();
        }

        // Step 2: The cap resolves the fight and further rounds are refused
        assert_eq!(state.outcome(), Some(CombatOutcome::Stalemate));
        assert_eq!(state.rounds(), cap);
        let err = run_combat_round(&mut state, &mut player, PlayerAction::Attack, &mut dice).unwrap_err();
        assert_eq!(err, EncounterError::AlreadyResolved);
    }

    #[test]
    fn test_poison_ticks_each_round() {
        let (mut state, mut player) = setup(100, 1.0);
        let mut dice = ScriptedDice::minimal();
        status::apply_poison(&mut player, 2, &mut dice);

        let report = run_combat_round(&mut state, &mut player, PlayerAction::Block, &mut dice).unwrap();
        assert!(matches!(report.poison, status::PoisonTick::Ticked { damage: 10, .. }));
        assert_eq!(player.health(), 90);
    }
}
