//! Rendering session events for the terminal

use clap::ValueEnum;
use encounter_core::combat::RoundOutcome;
use encounter_core::encounter::{EncounterOrigin, EncounterOutcome, Reward, StrategyResolution};
use encounter_core::item_use::ConsumableEffect;
use encounter_core::status::PoisonTick;
use encounter_core::trap::{Detection, TrapResolution};
use encounter_core::SessionEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One human-readable line per event
    Text,
    /// One JSON object per event
    Json,
}

pub fn print_event(format: OutputFormat, event: &SessionEvent) {
    match format {
        OutputFormat::Text => println!("{}", describe(event)),
        OutputFormat::Json => match serde_json::to_string(event) {
            Ok(line) => println!("{}", line),
            Err(err) => tracing::warn!(%err, "failed to serialize event"),
        },
    }
}

fn describe(event: &SessionEvent) -> String {
    match event {
        SessionEvent::EncounterStarted { origin, opponents } => {
            let cause = match origin {
                EncounterOrigin::Transition => "You are ambushed",
                EncounterOrigin::NetTrap => "Caught in the net, you are set upon",
            };
            format!("{} by {}!", cause, opponents.join(", "))
        }
        SessionEvent::TrapSprung { trap, detection } => match detection {
            Detection::Detected { used_item: true } => format!("Your detector reveals a {} trap.", trap),
            Detection::Detected { used_item: false } => format!("You spot a {} trap.", trap),
            Detection::Undetected => format!("You walk straight into a {} trap.", trap),
        },
        SessionEvent::TrapResolved(outcome) => {
            let mut line = match outcome.resolution {
                TrapResolution::Disarmed { .. } => format!("You disarm the {} trap.", outcome.kind),
                TrapResolution::Avoided => format!("You slip past the {} trap.", outcome.kind),
                TrapResolution::Triggered { .. } => format!("The {} trap goes off.", outcome.kind),
            };
            if outcome.effect.damage_taken > 0 {
                line.push_str(&format!(" You take {} damage.", outcome.effect.damage_taken));
            }
            if let Some(turns) = outcome.effect.poison_turns {
                line.push_str(&format!(" You are poisoned for {} turns.", turns));
            }
            line
        }
        SessionEvent::StrategyResolved {
            opponent, resolution, ..
        } => match resolution {
            StrategyResolution::Evaded => format!("You evade the {}.", opponent),
            StrategyResolution::Negotiated { reward } => {
                format!("The {} accepts your terms and hands over {}.", opponent, describe_reward(reward))
            }
            StrategyResolution::Fight(path) => format!("You fight the {} ({:?}).", opponent, path),
        },
        SessionEvent::RoundResolved(report) => {
            let mut line = format!(
                "Round {}: {:?}, dealt {}, took {}",
                report.round,
                report.action,
                report.damage_dealt,
                report.damage_taken()
            );
            if report.healed > 0 {
                line.push_str(&format!(", healed {}", report.healed));
            }
            if let Some(err) = &report.rejected {
                line.push_str(&format!(" ({})", err));
            }
            line.push_str(&format!(
                " [you {} / them {}]",
                report.player_health, report.opponent_health
            ));
            if let RoundOutcome::Resolved(outcome) = report.outcome {
                line.push_str(&format!(" -> {:?}", outcome));
            }
            line
        }
        SessionEvent::PoisonTicked(tick) => describe_tick(tick),
        SessionEvent::ItemUsed(item_use) => match item_use.effect {
            ConsumableEffect::Healed(amount) => format!("You use {} and recover {} health.", item_use.item, amount),
            ConsumableEffect::Restored(amount) => format!("You use {} and recover {} mana.", item_use.item, amount),
            ConsumableEffect::Spent => format!("You use {}.", item_use.item),
        },
        SessionEvent::RewardGranted(reward) => format!("You receive {}.", describe_reward(reward)),
        SessionEvent::OpponentResolved { opponent, outcome } => match outcome {
            EncounterOutcome::Victory { .. } => format!("The {} is defeated.", opponent),
            EncounterOutcome::Defeat => format!("The {} has slain you.", opponent),
            EncounterOutcome::Evaded => format!("You leave the {} behind.", opponent),
            EncounterOutcome::Negotiated { .. } => format!("You part ways with the {}.", opponent),
            EncounterOutcome::Stalemate => format!("Neither you nor the {} can gain the upper hand.", opponent),
        },
        SessionEvent::SessionEnded { reason } => format!("Session over: {}.", reason),
    }
}

fn describe_reward(reward: &Reward) -> String {
    match reward {
        Reward::Gold => "a pouch of gold".to_string(),
        Reward::Item(item) => format!("a {}", item),
        Reward::Experience => "hard-won experience".to_string(),
    }
}

fn describe_tick(tick: &PoisonTick) -> String {
    match tick {
        PoisonTick::NotPoisoned => "You feel fine.".to_string(),
        PoisonTick::Ticked {
            damage, defeated: true, ..
        } => format!("Poison deals {} damage and you succumb.", damage),
        PoisonTick::Ticked {
            damage,
            turns_remaining: 0,
            ..
        } => format!("Poison deals {} damage, then wears off.", damage),
        PoisonTick::Ticked {
            damage, turns_remaining, ..
        } => format!("Poison deals {} damage ({} turns left).", damage, turns_remaining),
    }
}
