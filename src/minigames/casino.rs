//! Casino games: coinflip and a three-reel slot machine.
//!
//! Bets are validated against the player's balance before anything is
//! committed; the wager and payout land in the store as one entry.

use rand::RngCore;
use rand_pcg::Lcg64Xsh32;

use crate::store::documents::{ActionPayload, MissionKind};
use crate::store::Store;

/// Largest accepted wager.
pub const MAX_WAGER: i64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinSide {
    Heads,
    Tails,
}

impl CoinSide {
    pub fn label(&self) -> &'static str {
        match self {
            CoinSide::Heads => "Heads",
            CoinSide::Tails => "Tails",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoinflipResult {
    pub landed: CoinSide,
    pub won: bool,
    pub payout: i64,
}

/// Slot machine symbols. Weights sum to 100 per reel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Cherry,
    Bell,
    Star,
    Gem,
    Seven,
}

impl Symbol {
    pub fn emoji(&self) -> &'static str {
        match self {
            Symbol::Cherry => "🍒",
            Symbol::Bell => "🔔",
            Symbol::Star => "⭐",
            Symbol::Gem => "💎",
            Symbol::Seven => "7️⃣",
        }
    }

    fn weight(&self) -> u64 {
        match self {
            Symbol::Cherry => 38,
            Symbol::Bell => 28,
            Symbol::Star => 20,
            Symbol::Gem => 10,
            Symbol::Seven => 4,
        }
    }

    fn all() -> [Symbol; 5] {
        [
            Symbol::Cherry,
            Symbol::Bell,
            Symbol::Star,
            Symbol::Gem,
            Symbol::Seven,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotsResult {
    pub reels: [Symbol; 3],
    pub multiplier: i64,
    pub payout: i64,
}

fn validate_wager(store: &Store, user_id: u64, wager: i64) -> Result<(), String> {
    if wager <= 0 {
        return Err("wager must be positive".to_string());
    }
    if wager > MAX_WAGER {
        return Err(format!("wager is capped at {MAX_WAGER} coins"));
    }
    store.check_coins(user_id, wager)
}

fn commit_game(
    store: &mut Store,
    user_id: u64,
    game: &str,
    wager: i64,
    payout: i64,
) {
    store.commit(
        "CasinoResolved",
        ActionPayload::CasinoResolved {
            user_id,
            game: game.to_string(),
            wager,
            payout,
        },
        Some(user_id),
    );
    store.commit(
        "MissionAdvanced",
        ActionPayload::MissionAdvanced {
            user_id,
            kind: MissionKind::PlayCasino,
            amount: 1,
        },
        Some(user_id),
    );
}

/// Flip a coin for an even-money bet.
pub fn coinflip(
    store: &mut Store,
    rng: &mut Lcg64Xsh32,
    user_id: u64,
    wager: i64,
    call: CoinSide,
) -> Result<CoinflipResult, String> {
    store.player_or_create(user_id);
    validate_wager(store, user_id, wager)?;

    let landed = if rng.next_u64() % 2 == 0 {
        CoinSide::Heads
    } else {
        CoinSide::Tails
    };
    let won = landed == call;
    let payout = if won { wager * 2 } else { 0 };
    commit_game(store, user_id, "coinflip", wager, payout);
    Ok(CoinflipResult {
        landed,
        won,
        payout,
    })
}

fn spin_reel(rng: &mut Lcg64Xsh32) -> Symbol {
    let total: u64 = Symbol::all().iter().map(|s| s.weight()).sum();
    let mut pick = rng.next_u64() % total;
    for symbol in Symbol::all() {
        if pick < symbol.weight() {
            return symbol;
        }
        pick -= symbol.weight();
    }
    Symbol::Cherry
}

/// Payout multiplier for a spin: triple sevens pay best, any triple well,
/// a pair returns double, anything else loses the wager.
pub fn payout_multiplier(reels: &[Symbol; 3]) -> i64 {
    let [a, b, c] = reels;
    if a == b && b == c {
        match a {
            Symbol::Seven => 25,
            Symbol::Gem => 12,
            _ => 6,
        }
    } else if a == b || b == c || a == c {
        2
    } else {
        0
    }
}

/// Spin the slot machine.
pub fn slots(
    store: &mut Store,
    rng: &mut Lcg64Xsh32,
    user_id: u64,
    wager: i64,
) -> Result<SlotsResult, String> {
    store.player_or_create(user_id);
    validate_wager(store, user_id, wager)?;

    let reels = [spin_reel(rng), spin_reel(rng), spin_reel(rng)];
    let multiplier = payout_multiplier(&reels);
    let payout = wager * multiplier;
    commit_game(store, user_id, "slots", wager, payout);
    Ok(SlotsResult {
        reels,
        multiplier,
        payout,
    })
}
