//! Document store: players, cards, battle records.
//!
//! All game state lives in memory and every mutation goes through
//! [`Store::commit`], which appends the action to the log before applying it.
//! Persistence is an atomic snapshot (temp file + rename) plus the
//! append-only log; [`Store::open`] rebuilds state by loading the snapshot
//! and replaying any log entries newer than it.

pub mod action_log;
pub mod documents;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::progression;
use action_log::{ActionLog, FileWriter};
use documents::{ActionEntry, ActionPayload, BattleOutcome, BattleRecord, CardDoc, PlayerDoc};

const SNAPSHOT_FILE: &str = "snapshot.json";
const LOG_FILE: &str = "actions.jsonl";

/// On-disk snapshot shape. `last_seq` marks the log position the snapshot
/// already contains.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Snapshot {
    last_seq: u64,
    next_card_id: u64,
    players: Vec<PlayerDoc>,
    cards: Vec<CardDoc>,
    battles: Vec<BattleRecord>,
}

#[derive(Debug)]
pub struct Store {
    players: HashMap<u64, PlayerDoc>,
    cards: HashMap<u64, CardDoc>,
    battles: Vec<BattleRecord>,
    next_card_id: u64,
    snapshot_seq: u64,
    data_dir: Option<PathBuf>,
    pub action_log: Arc<ActionLog>,
}

impl Store {
    pub fn new() -> Self {
        Store {
            players: HashMap::new(),
            cards: HashMap::new(),
            battles: Vec::new(),
            next_card_id: 1,
            snapshot_seq: 0,
            data_dir: None,
            action_log: Arc::new(ActionLog::new()),
        }
    }

    /// Open a store rooted at `data_dir`: load the snapshot if present,
    /// replay newer log entries, and attach a background log writer.
    pub fn open(data_dir: &Path) -> Result<Self, String> {
        std::fs::create_dir_all(data_dir).map_err(|e| e.to_string())?;
        let mut store = Store::new();
        store.data_dir = Some(data_dir.to_path_buf());

        let snapshot_path = data_dir.join(SNAPSHOT_FILE);
        if snapshot_path.exists() {
            let raw = std::fs::read_to_string(&snapshot_path).map_err(|e| e.to_string())?;
            let snapshot: Snapshot = serde_json::from_str(&raw).map_err(|e| e.to_string())?;
            store.load_snapshot(snapshot);
        }

        let log_path = data_dir.join(LOG_FILE);
        if log_path.exists() {
            let log = ActionLog::load_from_file(&log_path.to_string_lossy())?;
            for entry in log.entries() {
                if entry.seq > store.snapshot_seq {
                    store.apply(&entry.payload);
                }
            }
            store.action_log = Arc::new(log);
        }

        let writer = FileWriter::new(log_path).map_err(|e| e.to_string())?;
        store.action_log.set_writer(Some(writer));
        Ok(store)
    }

    fn load_snapshot(&mut self, snapshot: Snapshot) {
        self.snapshot_seq = snapshot.last_seq;
        self.next_card_id = snapshot.next_card_id;
        self.players = snapshot
            .players
            .into_iter()
            .map(|p| (p.user_id, p))
            .collect();
        self.cards = snapshot.cards.into_iter().map(|c| (c.id, c)).collect();
        self.battles = snapshot.battles;
    }

    /// Write an atomic snapshot of the current state: serialize to a temp
    /// file in the same directory, then rename over the target.
    pub fn save_snapshot(&self) -> Result<(), String> {
        let dir = self
            .data_dir
            .as_ref()
            .ok_or("store has no data directory")?;
        let snapshot = Snapshot {
            last_seq: self.action_log.current_seq(),
            next_card_id: self.next_card_id,
            players: self.players.values().cloned().collect(),
            cards: self.cards.values().cloned().collect(),
            battles: self.battles.clone(),
        };
        let raw = serde_json::to_string_pretty(&snapshot).map_err(|e| e.to_string())?;
        let tmp = dir.join(format!("{SNAPSHOT_FILE}.tmp"));
        std::fs::write(&tmp, raw).map_err(|e| e.to_string())?;
        std::fs::rename(&tmp, dir.join(SNAPSHOT_FILE)).map_err(|e| e.to_string())?;
        Ok(())
    }

    /// Rebuild a store purely from a log, for replay verification.
    pub fn replay_from_log(log: &ActionLog) -> Store {
        let mut store = Store::new();
        for entry in log.entries() {
            store.apply(&entry.payload);
        }
        store
    }

    /// Append to the log, then apply. The single mutation path.
    pub fn commit(
        &mut self,
        action_type: &str,
        payload: ActionPayload,
        actor: Option<u64>,
    ) -> ActionEntry {
        let entry = self.action_log.append(action_type, payload, actor);
        self.apply(&entry.payload);
        entry
    }

    /// Apply a payload to in-memory state. Tolerant of missing targets so a
    /// partial log still replays as far as it can.
    fn apply(&mut self, payload: &ActionPayload) {
        match payload {
            ActionPayload::SetSeed { .. } => {}
            ActionPayload::CardMinted {
                card,
                pity_counter,
                drop_ms,
            } => {
                let player = self.ensure_player(card.owner_id);
                player.card_ids.push(card.id);
                player.pity_counter = *pity_counter;
                player.last_drop_ms = *drop_ms;
                if card.id >= self.next_card_id {
                    self.next_card_id = card.id + 1;
                }
                self.cards.insert(card.id, card.clone());
            }
            ActionPayload::DailyClaimed {
                user_id,
                coins,
                gems,
                claim_ms,
            } => {
                let player = self.ensure_player(*user_id);
                player.coins += coins;
                player.gems += gems;
                player.last_daily_ms = *claim_ms;
            }
            ActionPayload::XpAwarded { card_id, amount } => {
                if let Some(card) = self.cards.get_mut(card_id) {
                    progression::apply_xp(card, *amount);
                }
            }
            ActionPayload::CurrencyEarned {
                user_id,
                coins,
                gems,
                ..
            } => {
                let player = self.ensure_player(*user_id);
                player.coins += coins;
                player.gems += gems;
            }
            ActionPayload::CurrencySpent {
                user_id,
                coins,
                gems,
                ..
            } => {
                let player = self.ensure_player(*user_id);
                player.coins = (player.coins - coins).max(0);
                player.gems = (player.gems - gems).max(0);
            }
            ActionPayload::MissionsAssigned { user_id, missions } => {
                let player = self.ensure_player(*user_id);
                player.missions = missions.clone();
            }
            ActionPayload::MissionAdvanced {
                user_id,
                kind,
                amount,
            } => {
                let player = self.ensure_player(*user_id);
                for mission in player.missions.iter_mut() {
                    if mission.kind == *kind && !mission.completed {
                        mission.progress = (mission.progress + amount).min(mission.goal);
                        if mission.progress >= mission.goal {
                            mission.completed = true;
                        }
                    }
                }
            }
            ActionPayload::BattleRecorded { record } => {
                {
                    let challenger = self.ensure_player(record.challenger_id);
                    match record.outcome {
                        BattleOutcome::ChallengerWon => challenger.battles_won += 1,
                        BattleOutcome::OpponentWon => challenger.battles_lost += 1,
                        BattleOutcome::Draw => {}
                    }
                }
                {
                    let opponent = self.ensure_player(record.opponent_id);
                    match record.outcome {
                        BattleOutcome::ChallengerWon => opponent.battles_lost += 1,
                        BattleOutcome::OpponentWon => opponent.battles_won += 1,
                        BattleOutcome::Draw => {}
                    }
                }
                self.battles.push(record.clone());
            }
            ActionPayload::FishResolved {
                user_id,
                catch_name,
                payout,
                cast_ms,
            } => {
                let player = self.ensure_player(*user_id);
                player.last_fish_ms = *cast_ms;
                player.fishing.casts += 1;
                player.coins += payout;
                if let Some(name) = catch_name {
                    player.fishing.catches += 1;
                    if *payout > player.fishing.best_payout {
                        player.fishing.best_payout = *payout;
                        player.fishing.best_catch = Some(name.clone());
                    }
                }
            }
            ActionPayload::CasinoResolved {
                user_id,
                wager,
                payout,
                ..
            } => {
                let player = self.ensure_player(*user_id);
                player.coins = (player.coins - wager).max(0) + payout;
            }
        }
    }

    fn ensure_player(&mut self, user_id: u64) -> &mut PlayerDoc {
        self.players
            .entry(user_id)
            .or_insert_with(|| PlayerDoc::new(user_id, Utc::now()))
    }

    // ---- read access ----

    pub fn player(&self, user_id: u64) -> Option<&PlayerDoc> {
        self.players.get(&user_id)
    }

    /// Fetch the player document, creating it on first contact.
    pub fn player_or_create(&mut self, user_id: u64) -> &PlayerDoc {
        self.ensure_player(user_id)
    }

    pub fn card(&self, card_id: u64) -> Option<&CardDoc> {
        self.cards.get(&card_id)
    }

    /// All cards owned by a user, in mint order.
    pub fn cards_of(&self, user_id: u64) -> Vec<&CardDoc> {
        let Some(player) = self.players.get(&user_id) else {
            return Vec::new();
        };
        player
            .card_ids
            .iter()
            .filter_map(|id| self.cards.get(id))
            .collect()
    }

    pub fn battles(&self) -> &[BattleRecord] {
        &self.battles
    }

    /// Allocate the next card id.
    pub fn allocate_card_id(&mut self) -> u64 {
        let id = self.next_card_id;
        self.next_card_id += 1;
        id
    }

    /// Verify the player can cover a coin wager.
    pub fn check_coins(&self, user_id: u64, amount: i64) -> Result<(), String> {
        let balance = self.players.get(&user_id).map(|p| p.coins).unwrap_or(0);
        if balance < amount {
            return Err(format!(
                "not enough coins: balance {balance}, needed {amount}"
            ));
        }
        Ok(())
    }

    /// Apply a terminated battle in one store call: the record, both players'
    /// tallies, the winner's coin reward, and the winning card's XP.
    pub fn apply_battle_outcome(
        &mut self,
        record: BattleRecord,
        winner: Option<(u64, u64)>,
        coin_reward: i64,
        xp_reward: i64,
    ) {
        let challenger_id = record.challenger_id;
        self.commit(
            "BattleRecorded",
            ActionPayload::BattleRecorded { record },
            Some(challenger_id),
        );
        if let Some((winner_id, winner_card)) = winner {
            self.commit(
                "CurrencyEarned",
                ActionPayload::CurrencyEarned {
                    user_id: winner_id,
                    coins: coin_reward,
                    gems: 0,
                    reason: "battle victory".to_string(),
                },
                Some(winner_id),
            );
            self.commit(
                "XpAwarded",
                ActionPayload::XpAwarded {
                    card_id: winner_card,
                    amount: xp_reward,
                },
                Some(winner_id),
            );
            self.commit(
                "MissionAdvanced",
                ActionPayload::MissionAdvanced {
                    user_id: winner_id,
                    kind: documents::MissionKind::WinBattles,
                    amount: 1,
                },
                Some(winner_id),
            );
        }
    }

    /// Flush the log writer. Call on shutdown.
    pub fn shutdown(&self) {
        self.action_log.shutdown();
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
