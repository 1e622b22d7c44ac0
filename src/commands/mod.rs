//! Slash command surface.
//!
//! Commands hold locks only long enough to mutate state, then release them
//! before replying. Every game mutation goes through the store's commit path
//! so the action log stays the source of truth.

pub mod battle;
pub mod gacha;
pub mod minigames;
pub mod profile;

use std::sync::Arc;

use rand_pcg::Lcg64Xsh32;
use tokio::sync::Mutex;

use crate::battle::Sessions;
use crate::gacha::pool::CharacterPool;
use crate::gacha::sources::SourceChain;
use crate::store::Store;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Shared bot state handed to every command.
pub struct Data {
    pub store: Arc<Mutex<Store>>,
    pub sessions: Arc<Mutex<Sessions>>,
    pub pool: Arc<Mutex<CharacterPool>>,
    pub chain: Arc<SourceChain>,
    /// Session RNG; reseeded via the action log for deterministic replay.
    pub rng: Arc<Mutex<Lcg64Xsh32>>,
}

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// All commands, in registration order.
pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        gacha::drop(),
        gacha::daily(),
        gacha::collection(),
        gacha::card(),
        battle::battle(),
        profile::profile(),
        profile::missions(),
        minigames::fish(),
        minigames::coinflip(),
        minigames::slots(),
    ]
}
