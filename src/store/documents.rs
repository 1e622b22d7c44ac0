use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Card rarity tiers, ordered from most to least common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

impl Rarity {
    pub fn all() -> [Rarity; 5] {
        [
            Rarity::Common,
            Rarity::Rare,
            Rarity::Epic,
            Rarity::Legendary,
            Rarity::Mythic,
        ]
    }

    /// Weight used for the gacha roll. Larger is more common.
    pub fn drop_weight(&self) -> u64 {
        match self {
            Rarity::Common => 600,
            Rarity::Rare => 280,
            Rarity::Epic => 90,
            Rarity::Legendary => 25,
            Rarity::Mythic => 5,
        }
    }

    /// Per-level stat growth in percent of base.
    pub fn growth_percent(&self) -> u32 {
        match self {
            Rarity::Common => 4,
            Rarity::Rare => 5,
            Rarity::Epic => 6,
            Rarity::Legendary => 8,
            Rarity::Mythic => 10,
        }
    }

    /// Embed accent colour for this rarity.
    pub fn colour(&self) -> u32 {
        match self {
            Rarity::Common => 0x95a5a6,
            Rarity::Rare => 0x3498db,
            Rarity::Epic => 0x9b59b6,
            Rarity::Legendary => 0xf1c40f,
            Rarity::Mythic => 0xe74c3c,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
            Rarity::Mythic => "Mythic",
        }
    }
}

/// Combat stats carried by every card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    pub hp: i64,
    pub attack: i64,
    pub defense: i64,
    pub speed: i64,
}

impl StatBlock {
    /// Grow every stat by `percent` of its current value, at least 1 point each.
    pub fn grown(&self, percent: u32) -> StatBlock {
        let grow = |v: i64| v + ((v * percent as i64) / 100).max(1);
        StatBlock {
            hp: grow(self.hp),
            attack: grow(self.attack),
            defense: grow(self.defense),
            speed: grow(self.speed),
        }
    }
}

/// An anime character as returned by a character source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub series: String,
    pub image_url: Option<String>,
    /// Source-reported popularity, used to seed base stats.
    pub popularity: u32,
}

/// A player-owned collectible card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDoc {
    pub id: u64,
    pub owner_id: u64,
    pub character: Character,
    pub rarity: Rarity,
    pub level: u32,
    pub xp: i64,
    pub stats: StatBlock,
    pub ability_ids: Vec<String>,
    pub minted_at: DateTime<Utc>,
}

/// Daily mission goals a player can progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissionKind {
    DropCards,
    WinBattles,
    CatchFish,
    PlayCasino,
}

impl MissionKind {
    pub fn all() -> [MissionKind; 4] {
        [
            MissionKind::DropCards,
            MissionKind::WinBattles,
            MissionKind::CatchFish,
            MissionKind::PlayCasino,
        ]
    }

    pub fn describe(&self, goal: u32) -> String {
        match self {
            MissionKind::DropCards => format!("Drop {goal} cards"),
            MissionKind::WinBattles => format!("Win {goal} battles"),
            MissionKind::CatchFish => format!("Catch {goal} fish"),
            MissionKind::PlayCasino => format!("Play {goal} casino games"),
        }
    }
}

/// One mission slot on a player document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub kind: MissionKind,
    pub goal: u32,
    pub progress: u32,
    pub completed: bool,
}

impl Mission {
    pub fn new(kind: MissionKind, goal: u32) -> Self {
        Mission {
            kind,
            goal,
            progress: 0,
            completed: false,
        }
    }
}

/// Lifetime fishing tallies, shown on the profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FishingStats {
    pub casts: u64,
    pub catches: u64,
    pub best_catch: Option<String>,
    pub best_payout: i64,
}

/// A player document. One per Discord user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDoc {
    pub user_id: u64,
    pub coins: i64,
    pub gems: i64,
    pub card_ids: Vec<u64>,
    pub missions: Vec<Mission>,
    /// Drops since the last Epic-or-better pull; drives pity.
    pub pity_counter: u32,
    pub last_drop_ms: u64,
    pub last_daily_ms: u64,
    pub last_fish_ms: u64,
    pub fishing: FishingStats,
    pub battles_won: u64,
    pub battles_lost: u64,
    pub created_at: DateTime<Utc>,
}

impl PlayerDoc {
    pub fn new(user_id: u64, now: DateTime<Utc>) -> Self {
        PlayerDoc {
            user_id,
            coins: 500,
            gems: 0,
            card_ids: Vec::new(),
            missions: Vec::new(),
            pity_counter: 0,
            last_drop_ms: 0,
            last_daily_ms: 0,
            last_fish_ms: 0,
            fishing: FishingStats::default(),
            battles_won: 0,
            battles_lost: 0,
            created_at: now,
        }
    }
}

/// Outcome of a finished battle, from the challenger's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleOutcome {
    ChallengerWon,
    OpponentWon,
    Draw,
}

/// Record of a terminated battle. Written to the store once, at termination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleRecord {
    pub challenger_id: u64,
    pub opponent_id: u64,
    pub outcome: BattleOutcome,
    pub rounds: u64,
    pub finished_at: DateTime<Utc>,
}

/// Action payloads for the append-only log — player-initiated mutations only.
///
/// Entries record *results* (the minted card, the awarded amounts), so replay
/// is exact application and never re-rolls randomness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ActionPayload {
    SetSeed {
        seed: u64,
    },
    CardMinted {
        card: CardDoc,
        pity_counter: u32,
        drop_ms: u64,
    },
    DailyClaimed {
        user_id: u64,
        coins: i64,
        gems: i64,
        claim_ms: u64,
    },
    XpAwarded {
        card_id: u64,
        amount: i64,
    },
    CurrencyEarned {
        user_id: u64,
        coins: i64,
        gems: i64,
        reason: String,
    },
    CurrencySpent {
        user_id: u64,
        coins: i64,
        gems: i64,
        reason: String,
    },
    MissionsAssigned {
        user_id: u64,
        missions: Vec<Mission>,
    },
    MissionAdvanced {
        user_id: u64,
        kind: MissionKind,
        amount: u32,
    },
    BattleRecorded {
        record: BattleRecord,
    },
    FishResolved {
        user_id: u64,
        catch_name: Option<String>,
        payout: i64,
        cast_ms: u64,
    },
    CasinoResolved {
        user_id: u64,
        game: String,
        wager: i64,
        payout: i64,
    },
}

/// Stored entry in the append-only action log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEntry {
    pub seq: u64,
    pub action_type: String,
    pub payload: ActionPayload,
    /// Milliseconds since the Unix epoch, as a string.
    pub timestamp: String,
    /// Discord user id of the actor, when one exists.
    pub actor: Option<String>,
}
