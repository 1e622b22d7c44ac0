//! # Gachapon
//!
//! A Discord bot for an anime-character collectible card game: gacha drops,
//! card leveling, turn-based battles, fishing and casino side-games, and
//! rendered card art.
//!
//! ## Architecture
//!
//! Game state is a document store behind an append-only action log; every
//! mutation commits to the log first, so state replays deterministically.
//! Live battles exist only in the in-process session registry and touch the
//! store once, when they terminate. Commands share state through
//! `Arc<Mutex<T>>` handles carried in the poise user data.

pub mod abilities;
pub mod battle;
pub mod commands;
pub mod gacha;
pub mod minigames;
pub mod progression;
pub mod render;
pub mod store;

use std::sync::Arc;

use poise::serenity_prelude as serenity;
use tokio::sync::Mutex;

pub use commands::{Data, Error};

/// Assemble shared bot state around an opened store.
///
/// The session RNG is seeded fresh and the seed is logged, so the run's
/// rolls can be replayed from the action log.
pub fn build_data(store: store::Store) -> Data {
    let seed: u64 = rand::random();
    store.action_log.append(
        "SetSeed",
        store::documents::ActionPayload::SetSeed { seed },
        None,
    );
    Data {
        store: Arc::new(Mutex::new(store)),
        sessions: Arc::new(Mutex::new(battle::Sessions::new())),
        pool: Arc::new(Mutex::new(gacha::pool::CharacterPool::with_builtin())),
        chain: Arc::new(gacha::sources::SourceChain::standard()),
        rng: Arc::new(Mutex::new(battle::seeded_rng(seed))),
    }
}

/// Build the poise framework with all commands registered and an error
/// handler that surfaces command failures to the user.
pub fn framework_initialize(data: Data) -> poise::Framework<Data, Error> {
    poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::commands(),
            on_error: |error| {
                Box::pin(async move {
                    match error {
                        poise::FrameworkError::Command { error, ctx, .. } => {
                            tracing::warn!("command {} failed: {error}", ctx.command().name);
                            let _ = ctx.say(format!("⚠️ {error}")).await;
                        }
                        other => {
                            if let Err(e) = poise::builtins::on_error(other).await {
                                tracing::error!("error handler failed: {e}");
                            }
                        }
                    }
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                tracing::info!("commands registered");
                // Eagerly load fonts so the first render doesn't block.
                render::init_fonts();
                Ok(data)
            })
        })
        .build()
}

/// Gateway intents the bot needs. Slash commands and components only.
pub fn gateway_intents() -> serenity::GatewayIntents {
    serenity::GatewayIntents::non_privileged()
}
