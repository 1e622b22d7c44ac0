//! Fishing: cooldown-gated casts against a weighted catch table.

use rand::RngCore;
use rand_pcg::Lcg64Xsh32;

use crate::gacha::cooldown_remaining_ms;
use crate::store::documents::{ActionPayload, MissionKind};
use crate::store::Store;

/// Cooldown between casts.
pub const FISH_COOLDOWN_MS: u64 = 60 * 1000;

/// One row of the catch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatchRow {
    pub weight: u64,
    /// None means nothing bit.
    pub name: Option<&'static str>,
    pub payout: i64,
}

/// Weighted catch table, junk through legendary.
pub const CATCH_TABLE: &[CatchRow] = &[
    CatchRow {
        weight: 25,
        name: None,
        payout: 0,
    },
    CatchRow {
        weight: 30,
        name: Some("Old Boot"),
        payout: 5,
    },
    CatchRow {
        weight: 24,
        name: Some("Carp"),
        payout: 30,
    },
    CatchRow {
        weight: 13,
        name: Some("Mackerel"),
        payout: 60,
    },
    CatchRow {
        weight: 5,
        name: Some("Golden Koi"),
        payout: 150,
    },
    CatchRow {
        weight: 2,
        name: Some("Moonlit Tuna"),
        payout: 400,
    },
    CatchRow {
        weight: 1,
        name: Some("Ancient Leviathan"),
        payout: 1000,
    },
];

/// Outcome of one cast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastResult {
    pub catch_name: Option<String>,
    pub payout: i64,
}

/// Roll the catch table.
pub fn roll_catch(rng: &mut Lcg64Xsh32) -> CatchRow {
    let total: u64 = CATCH_TABLE.iter().map(|row| row.weight).sum();
    let mut pick = rng.next_u64() % total;
    for row in CATCH_TABLE {
        if pick < row.weight {
            return *row;
        }
        pick -= row.weight;
    }
    CATCH_TABLE[CATCH_TABLE.len() - 1]
}

/// Cast the line: enforce the cooldown, roll, and commit the result.
pub fn cast(
    store: &mut Store,
    rng: &mut Lcg64Xsh32,
    user_id: u64,
    now_ms: u64,
) -> Result<CastResult, String> {
    let player = store.player_or_create(user_id);
    let remaining = cooldown_remaining_ms(player.last_fish_ms, now_ms, FISH_COOLDOWN_MS);
    if remaining > 0 {
        return Err(format!(
            "the fish are wary; try again in {} seconds",
            remaining / 1000 + 1
        ));
    }

    let row = roll_catch(rng);
    let result = CastResult {
        catch_name: row.name.map(str::to_string),
        payout: row.payout,
    };
    store.commit(
        "FishResolved",
        ActionPayload::FishResolved {
            user_id,
            catch_name: result.catch_name.clone(),
            payout: result.payout,
            cast_ms: now_ms,
        },
        Some(user_id),
    );
    if result.catch_name.is_some() {
        store.commit(
            "MissionAdvanced",
            ActionPayload::MissionAdvanced {
                user_id,
                kind: MissionKind::CatchFish,
                amount: 1,
            },
            Some(user_id),
        );
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::seeded_rng;

    #[test]
    fn catch_table_weights_sum_to_100() {
        let total: u64 = CATCH_TABLE.iter().map(|r| r.weight).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn cast_enforces_cooldown_and_pays_out() {
        let mut store = Store::new();
        let mut rng = seeded_rng(21);
        let before = store.player_or_create(7).coins;
        let result = cast(&mut store, &mut rng, 7, 500_000).unwrap();
        let after = store.player(7).unwrap().coins;
        assert_eq!(after, before + result.payout);
        assert_eq!(store.player(7).unwrap().fishing.casts, 1);

        let err = cast(&mut store, &mut rng, 7, 500_000 + 1).unwrap_err();
        assert!(err.contains("try again"));
        assert!(cast(&mut store, &mut rng, 7, 500_000 + FISH_COOLDOWN_MS).is_ok());
    }

    #[test]
    fn best_catch_tracks_highest_payout() {
        let mut store = Store::new();
        let mut rng = seeded_rng(2);
        let mut now = 0u64;
        for _ in 0..30 {
            now += FISH_COOLDOWN_MS;
            let _ = cast(&mut store, &mut rng, 7, now);
        }
        let player = store.player(7).unwrap();
        if let Some(best) = &player.fishing.best_catch {
            let row = CATCH_TABLE
                .iter()
                .find(|r| r.name == Some(best.as_str()))
                .expect("best catch is a table row");
            assert_eq!(row.payout, player.fishing.best_payout);
        }
    }
}
