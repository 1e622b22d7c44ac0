//! Automated team battles: determinism, replacement, termination.

use chrono::Utc;
use gachapon::battle::auto::{choose_ability, run_team_battle, TEAM_SIZE};
use gachapon::battle::units::BattleUnit;
use gachapon::store::documents::{BattleOutcome, CardDoc, Character, Rarity, StatBlock};

fn unit(id: u64, hp: i64, attack: i64, speed: i64, abilities: &[&str]) -> BattleUnit {
    let card = CardDoc {
        id,
        owner_id: id,
        character: Character {
            name: format!("Unit {id}"),
            series: "Test".to_string(),
            image_url: None,
            popularity: 0,
        },
        rarity: Rarity::Common,
        level: 1,
        xp: 0,
        stats: StatBlock {
            hp,
            attack,
            defense: 5,
            speed,
        },
        ability_ids: abilities.iter().map(|s| s.to_string()).collect(),
        minted_at: Utc::now(),
    };
    BattleUnit::from_card(&card)
}

#[test]
fn same_seed_same_teams_same_report() {
    let team_a = || vec![unit(1, 80, 20, 10, &["strike", "heavy_blow"]); 3];
    let team_b = || vec![unit(2, 70, 18, 8, &["strike", "flame_burst"]); 3];
    let a = run_team_battle(team_a(), team_b(), 99).unwrap();
    let b = run_team_battle(team_a(), team_b(), 99).unwrap();
    assert_eq!(a, b);
}

#[test]
fn stronger_team_wins_and_report_is_consistent() {
    let strong = vec![unit(1, 200, 40, 12, &["strike", "heavy_blow"]); 3];
    let weak = vec![unit(2, 40, 8, 6, &["strike"]); 3];
    let report = run_team_battle(strong, weak, 5).unwrap();
    assert_eq!(report.outcome, BattleOutcome::ChallengerWon);
    assert!(report.challenger_survivors >= 1);
    assert_eq!(report.opponent_survivors, 0);
    assert!(report
        .transcript
        .iter()
        .any(|line| line.contains("steps in") || line.contains("wins")));
}

#[test]
fn empty_and_oversized_teams_are_rejected() {
    let team = vec![unit(1, 50, 10, 5, &["strike"])];
    assert!(run_team_battle(Vec::new(), team.clone(), 1).is_err());
    let oversized = vec![unit(2, 50, 10, 5, &["strike"]); TEAM_SIZE + 1];
    assert!(run_team_battle(team, oversized, 1).is_err());
}

#[test]
fn fallen_units_are_replaced() {
    // One heavy hitter against two paper units: the second must step in.
    let strong = vec![unit(1, 300, 60, 12, &["strike"])];
    let paper = vec![unit(2, 10, 5, 5, &["strike"]), unit(3, 10, 5, 5, &["strike"])];
    let report = run_team_battle(strong, paper, 11).unwrap();
    assert_eq!(report.outcome, BattleOutcome::ChallengerWon);
    assert!(
        report.transcript.iter().any(|l| l.contains("steps in")),
        "replacement should be announced"
    );
}

#[test]
fn heuristic_prefers_heal_when_hurt() {
    let mut u = unit(1, 100, 20, 10, &["strike", "heavy_blow", "mend"]);
    // Healthy: picks the hardest hitter.
    assert_eq!(choose_ability(&u).id, "heavy_blow");
    // Hurt below 35%: picks the heal.
    u.current_hp = 30;
    assert_eq!(choose_ability(&u).id, "mend");
    // Heal on cooldown: falls back to damage.
    u.cooldowns.insert("mend".to_string(), 2);
    assert_eq!(choose_ability(&u).id, "heavy_blow");
}
