//! Battle sessions.
//!
//! The session registry is the only owner of live battle state. Documents
//! are untouched while a battle runs; the outcome is applied to the store in
//! one call when the session terminates.

pub mod auto;
pub mod engine;
pub mod units;

use rand::SeedableRng;
use rand_pcg::Lcg64Xsh32;

use crate::store::documents::CardDoc;
use engine::{BattleState, Side};
use units::BattleUnit;

/// Build the session RNG from a u64 seed, duplicated into the 16-byte state.
pub fn seeded_rng(seed: u64) -> Lcg64Xsh32 {
    let mut seed_bytes = [0u8; 16];
    seed_bytes[0..8].copy_from_slice(&seed.to_le_bytes());
    seed_bytes[8..16].copy_from_slice(&seed.to_le_bytes());
    Lcg64Xsh32::from_seed(seed_bytes)
}

/// One live 1v1 battle between two users.
#[derive(Debug, Clone)]
pub struct BattleSession {
    pub challenger_id: u64,
    pub opponent_id: u64,
    pub seed: u64,
    pub state: BattleState,
    rng: Lcg64Xsh32,
}

impl BattleSession {
    pub fn new(
        challenger_id: u64,
        opponent_id: u64,
        challenger_card: &CardDoc,
        opponent_card: &CardDoc,
        seed: u64,
    ) -> Self {
        let state = BattleState::new(
            BattleUnit::from_card(challenger_card),
            BattleUnit::from_card(opponent_card),
        );
        BattleSession {
            challenger_id,
            opponent_id,
            seed,
            state,
            rng: seeded_rng(seed),
        }
    }

    /// Which side a user plays, if they are in this session.
    pub fn side_of(&self, user_id: u64) -> Option<Side> {
        if user_id == self.challenger_id {
            Some(Side::Challenger)
        } else if user_id == self.opponent_id {
            Some(Side::Opponent)
        } else {
            None
        }
    }

    /// The user whose turn it is.
    pub fn current_user(&self) -> Option<u64> {
        self.state.current_side().map(|side| match side {
            Side::Challenger => self.challenger_id,
            Side::Opponent => self.opponent_id,
        })
    }

    /// Play a turn on behalf of `user_id`.
    pub fn play(&mut self, user_id: u64, ability_id: &str) -> Result<(), String> {
        let side = self
            .side_of(user_id)
            .ok_or("user is not part of this battle")?;
        engine::play_turn(&mut self.state, side, ability_id, &mut self.rng)
    }
}

/// Registry of active sessions. A user is in at most one battle at a time.
#[derive(Debug, Default)]
pub struct Sessions {
    active: Vec<BattleSession>,
}

impl Sessions {
    pub fn new() -> Self {
        Sessions { active: Vec::new() }
    }

    pub fn contains_user(&self, user_id: u64) -> bool {
        self.active.iter().any(|s| s.side_of(user_id).is_some())
    }

    /// Start a session, refusing when either participant is already fighting.
    pub fn start(&mut self, session: BattleSession) -> Result<(), String> {
        for id in [session.challenger_id, session.opponent_id] {
            if self.contains_user(id) {
                return Err(format!("user {id} is already in a battle"));
            }
        }
        self.active.push(session);
        Ok(())
    }

    pub fn get_mut_by_user(&mut self, user_id: u64) -> Option<&mut BattleSession> {
        self.active
            .iter_mut()
            .find(|s| s.side_of(user_id).is_some())
    }

    /// Remove and return the session a user is in.
    pub fn remove_by_user(&mut self, user_id: u64) -> Option<BattleSession> {
        let idx = self
            .active
            .iter()
            .position(|s| s.side_of(user_id).is_some())?;
        Some(self.active.remove(idx))
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::documents::{Character, Rarity, StatBlock};
    use chrono::Utc;

    fn card(id: u64, owner: u64, speed: i64) -> CardDoc {
        CardDoc {
            id,
            owner_id: owner,
            character: Character {
                name: format!("Unit {id}"),
                series: "Test".to_string(),
                image_url: None,
                popularity: 1,
            },
            rarity: Rarity::Common,
            level: 1,
            xp: 0,
            stats: StatBlock {
                hp: 50,
                attack: 10,
                defense: 5,
                speed,
            },
            ability_ids: vec!["strike".to_string()],
            minted_at: Utc::now(),
        }
    }

    #[test]
    fn one_battle_per_user() {
        let mut sessions = Sessions::new();
        let a = card(1, 10, 5);
        let b = card(2, 11, 4);
        let c = card(3, 12, 3);
        sessions
            .start(BattleSession::new(10, 11, &a, &b, 1))
            .unwrap();
        let err = sessions
            .start(BattleSession::new(11, 12, &b, &c, 2))
            .unwrap_err();
        assert!(err.contains("already in a battle"));
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn faster_unit_acts_first() {
        let a = card(1, 10, 3);
        let b = card(2, 11, 9);
        let session = BattleSession::new(10, 11, &a, &b, 7);
        assert_eq!(session.current_user(), Some(11));
    }

    #[test]
    fn out_of_turn_play_is_rejected() {
        let a = card(1, 10, 9);
        let b = card(2, 11, 3);
        let mut session = BattleSession::new(10, 11, &a, &b, 7);
        let err = session.play(11, "strike").unwrap_err();
        assert!(err.contains("turn"));
        session.play(10, "strike").unwrap();
    }
}
