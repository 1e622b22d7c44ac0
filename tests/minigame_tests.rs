//! Minigame payout bounds and balance conservation.

use gachapon::battle::seeded_rng;
use gachapon::minigames::casino::{self, CoinSide};
use gachapon::minigames::fishing::{self, FISH_COOLDOWN_MS};
use gachapon::store::Store;

#[test]
fn coinflip_is_even_money() {
    let mut store = Store::new();
    let mut rng = seeded_rng(31);
    let start = store.player_or_create(1).coins;
    let mut wins = 0u32;
    let rounds = 200;
    for _ in 0..rounds {
        // Keep the wager coverable regardless of the streak.
        let result = casino::coinflip(&mut store, &mut rng, 1, 1, CoinSide::Heads).unwrap();
        if result.won {
            wins += 1;
            assert_eq!(result.payout, 2);
        } else {
            assert_eq!(result.payout, 0);
        }
    }
    let end = store.player(1).unwrap().coins;
    // Net = wins * +1, losses * -1.
    let losses = rounds - wins;
    assert_eq!(end - start, wins as i64 - losses as i64);
    assert!(wins > 0 && losses > 0, "200 flips should land both ways");
}

#[test]
fn slots_payouts_match_the_multiplier_table() {
    let mut store = Store::new();
    let mut rng = seeded_rng(5);
    store.player_or_create(2);
    for _ in 0..300 {
        if store.player(2).unwrap().coins < 10 {
            break;
        }
        let result = casino::slots(&mut store, &mut rng, 2, 10).unwrap();
        assert_eq!(result.payout, 10 * result.multiplier);
        assert_eq!(result.multiplier, casino::payout_multiplier(&result.reels));
    }
}

#[test]
fn bets_beyond_the_balance_are_rejected_before_commit() {
    let mut store = Store::new();
    let mut rng = seeded_rng(5);
    store.player_or_create(3);
    let before = store.player(3).unwrap().coins;
    let log_len = store.action_log.entries().len();
    assert!(casino::slots(&mut store, &mut rng, 3, before + 1).is_err());
    assert_eq!(store.player(3).unwrap().coins, before, "no partial debit");
    assert_eq!(
        store.action_log.entries().len(),
        log_len,
        "a rejected bet must not reach the log"
    );
}

#[test]
fn fishing_tallies_and_missions_stay_consistent() {
    let mut store = Store::new();
    let mut rng = seeded_rng(17);
    let mut now = 0u64;
    let mut caught = 0u64;
    for _ in 0..50 {
        now += FISH_COOLDOWN_MS;
        let result = fishing::cast(&mut store, &mut rng, 4, now).unwrap();
        if result.catch_name.is_some() {
            caught += 1;
        }
    }
    let player = store.player(4).unwrap();
    assert_eq!(player.fishing.casts, 50);
    assert_eq!(player.fishing.catches, caught);
    assert!(caught > 0, "50 casts should catch something");
    assert!(
        player.fishing.catches <= player.fishing.casts,
        "catches can never exceed casts"
    );
}
