//! Prelude module for convenient imports
//!
//! ```rust
//! use encounter_core::prelude::*;
//! ```

// Core types
pub use crate::error::EncounterError;
pub use crate::stat_block::{Consumables, Opponent, StatBlock};
pub use crate::types::{
    ClassTag, EndReason, ItemId, LocationTransition, PlayerAction, Strategy, TerminalState, TrapChoice,
};

// Resolution
pub use crate::combat::{fight_to_end, run_combat_round, CombatOutcome, CombatState, RoundReport};
pub use crate::encounter::{
    begin_encounter_check, choose_encounter_strategy, resolve_encounter, resolve_opponent, EncounterOutcome,
    Reward, RewardPolicy,
};
pub use crate::item_use::use_consumable;
pub use crate::status::{apply_poison, tick, PoisonTick};
pub use crate::trap::{resolve_trap, roll_trap, Trap, TrapKind, TrapOutcome};

// Sessions
pub use crate::session::{
    drive, run_route, CancelToken, DecisionRequest, DecisionResponse, DecisionSource, ScriptedSource, Session,
    SessionEvent, SessionStatus,
};

// Seams
pub use crate::content::{ContentProvider, EnemyRecord, InMemoryContent, ItemKind, ItemRecord};
pub use crate::dice::{seeded, Dice, ScriptedDice};

// Config
pub use crate::config::{init_constants, init_constants_default};
