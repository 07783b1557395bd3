//! encounter_core - Turn-based encounter resolution for a single-player adventure
//!
//! This library provides:
//! - StatBlock: health, resource, ratings, poison and consumables of a combatant
//! - Poison: per-action status ticks
//! - Traps: detection, disarm/avoid choices and triggered effects
//! - Combat: the attack/block/heal round loop with a stalemate cap
//! - Encounters: spawning opponents, fight/evade/negotiate, rewards
//! - Session: a pull-based state machine that asks for one decision at a time
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use encounter_core::prelude::*;
//!
//! let content = InMemoryContent::new().with_enemy("Goblin", 30, 0.8);
//! let mut session = Session::new(StatBlock::for_class(ClassTag::Rogue), &content);
//! let mut dice = seeded(42);
//!
//! session.enter_location(&LocationTransition::new("Village", "Forest"), &mut dice)?;
//! while let Some(request) = session.pending_decision() {
//!     println!("{}", request);
//!     session.respond_str("fight", &mut dice)?;
//! }
//! ```

pub mod combat;
pub mod config;
pub mod content;
pub mod dice;
pub mod encounter;
pub mod error;
pub mod item_use;
pub mod prelude;
pub mod session;
pub mod stat_block;
pub mod status;
pub mod trap;
pub mod types;

// Core API - what most users need
pub use error::EncounterError;
pub use session::{DecisionRequest, DecisionResponse, Session, SessionEvent, SessionStatus};
pub use stat_block::{Opponent, StatBlock};
pub use types::{ClassTag, EndReason, PlayerAction, Strategy, TerminalState, TrapChoice};

// Configuration
pub use config::{init_constants, init_constants_default};

// Collaborator seams
pub use content::ContentProvider;
pub use dice::Dice;
