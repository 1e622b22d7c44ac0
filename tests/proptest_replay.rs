//! Property tests: replay fidelity and log sequence monotonicity.

use gachapon::store::documents::ActionPayload;
use gachapon::store::Store;
use proptest::prelude::*;

/// A currency mutation: positive amounts are earns, negative are spends.
fn apply_delta(store: &mut Store, user_id: u64, coins: i64, gems: i64) {
    if coins >= 0 && gems >= 0 {
        store.commit(
            "CurrencyEarned",
            ActionPayload::CurrencyEarned {
                user_id,
                coins,
                gems,
                reason: "prop".to_string(),
            },
            Some(user_id),
        );
    } else {
        store.commit(
            "CurrencySpent",
            ActionPayload::CurrencySpent {
                user_id,
                coins: coins.unsigned_abs() as i64,
                gems: gems.unsigned_abs() as i64,
                reason: "prop".to_string(),
            },
            Some(user_id),
        );
    }
}

proptest! {
    #[test]
    fn replay_preserves_balances(
        seq in prop::collection::vec(
            (1u64..4, -1000i64..1000, -10i64..10),
            0..30
        )
    ) {
        let mut store = Store::new();
        for (user_id, coins, gems) in &seq {
            apply_delta(&mut store, *user_id, *coins, *gems);
        }
        let replayed = Store::replay_from_log(&store.action_log);
        for user_id in 1u64..4 {
            prop_assert_eq!(
                store.player(user_id).map(|p| (p.coins, p.gems)),
                replayed.player(user_id).map(|p| (p.coins, p.gems))
            );
        }
    }

    #[test]
    fn balances_never_go_negative(
        seq in prop::collection::vec((-2000i64..2000, -50i64..50), 0..40)
    ) {
        let mut store = Store::new();
        for (coins, gems) in &seq {
            apply_delta(&mut store, 1, *coins, *gems);
            let player = store.player(1).unwrap();
            prop_assert!(player.coins >= 0);
            prop_assert!(player.gems >= 0);
        }
    }

    #[test]
    fn log_seq_is_strictly_monotonic(
        seq in prop::collection::vec(0i64..500, 1..25)
    ) {
        let mut store = Store::new();
        let mut seqs = Vec::new();
        for coins in &seq {
            let entry = store.commit(
                "CurrencyEarned",
                ActionPayload::CurrencyEarned {
                    user_id: 1,
                    coins: *coins,
                    gems: 0,
                    reason: "prop".to_string(),
                },
                Some(1),
            );
            seqs.push(entry.seq);
        }
        for (i, s) in seqs.iter().enumerate() {
            prop_assert_eq!(*s as usize, i + 1);
        }
    }
}
