use poise::serenity_prelude as serenity;

use super::{Context, Error};
use crate::progression;
use crate::store::documents::ActionPayload;

/// Show a player's profile.
#[poise::command(slash_command)]
pub async fn profile(
    ctx: Context<'_>,
    #[description = "Whose profile (defaults to you)"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let target = user.as_ref().unwrap_or_else(|| ctx.author());
    let target_id = target.id.get();
    let data = ctx.data();

    let (player, card_count, best_card) = {
        let mut store = data.store.lock().await;
        let player = store.player_or_create(target_id).clone();
        let cards = store.cards_of(target_id);
        let best = cards
            .iter()
            .max_by_key(|c| (c.level, c.id))
            .map(|c| format!("{} (Lv. {})", c.character.name, c.level));
        (player, cards.len(), best)
    };

    let mut embed = serenity::CreateEmbed::new()
        .title(format!("{}'s profile", target.name))
        .colour(serenity::Colour::new(0x3498db))
        .field(
            "Currencies",
            format!("{} coins · {} gems", player.coins, player.gems),
            true,
        )
        .field("Cards", card_count.to_string(), true)
        .field(
            "Battles",
            format!("{}W / {}L", player.battles_won, player.battles_lost),
            true,
        )
        .field(
            "Pity",
            format!("{} drops since Epic+", player.pity_counter),
            true,
        );
    if let Some(best) = best_card {
        embed = embed.field("Best card", best, true);
    }
    if player.fishing.casts > 0 {
        embed = embed.field(
            "Fishing",
            format!(
                "{} catches in {} casts{}",
                player.fishing.catches,
                player.fishing.casts,
                player
                    .fishing
                    .best_catch
                    .as_ref()
                    .map(|b| format!(" · best: {b}"))
                    .unwrap_or_default()
            ),
            false,
        );
    }
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Show today's missions and collect rewards for completed ones.
#[poise::command(slash_command)]
pub async fn missions(ctx: Context<'_>) -> Result<(), Error> {
    let user_id = ctx.author().id.get();
    let data = ctx.data();

    let (lines, claimed) = {
        let mut store = data.store.lock().await;
        let mut rng = data.rng.lock().await;
        let missions = store.player_or_create(user_id).missions.clone();
        if missions.is_empty() {
            return Err("no missions yet — claim your /daily first".into());
        }

        let mut lines = Vec::new();
        let mut claimed: Vec<String> = Vec::new();
        let mut remaining = Vec::new();
        for mission in &missions {
            if mission.completed {
                let reward = progression::roll_mission_reward(&mut rng, mission.kind);
                store.commit(
                    "CurrencyEarned",
                    ActionPayload::CurrencyEarned {
                        user_id,
                        coins: reward.coins,
                        gems: reward.gems,
                        reason: "mission reward".to_string(),
                    },
                    Some(user_id),
                );
                claimed.push(format!(
                    "{} → +{} coins, +{} gems",
                    mission.kind.describe(mission.goal),
                    reward.coins,
                    reward.gems
                ));
            } else {
                lines.push(format!(
                    "• {} — {}/{}",
                    mission.kind.describe(mission.goal),
                    mission.progress,
                    mission.goal
                ));
                remaining.push(mission.clone());
            }
        }
        if !claimed.is_empty() {
            // Completed missions leave the slate once paid.
            store.commit(
                "MissionsAssigned",
                ActionPayload::MissionsAssigned {
                    user_id,
                    missions: remaining,
                },
                Some(user_id),
            );
        }
        (lines, claimed)
    };

    let mut description = String::new();
    if !claimed.is_empty() {
        description.push_str("**Rewards collected**\n");
        for line in &claimed {
            description.push_str(line);
            description.push('\n');
        }
        description.push('\n');
    }
    if lines.is_empty() {
        description.push_str("All missions complete — see you tomorrow!");
    } else {
        description.push_str("**In progress**\n");
        description.push_str(&lines.join("\n"));
    }

    let embed = serenity::CreateEmbed::new()
        .title("Daily missions")
        .colour(serenity::Colour::new(0x9b59b6))
        .description(description);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
