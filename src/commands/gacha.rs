use poise::serenity_prelude as serenity;
use tracing::warn;

use super::{now_ms, Context, Error};
use crate::gacha;
use crate::progression;
use crate::render;
use crate::store::documents::{ActionPayload, CardDoc};

fn card_embed(card: &CardDoc) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(format!(
            "{} · {}",
            card.character.name,
            card.rarity.label()
        ))
        .colour(serenity::Colour::new(card.rarity.colour()))
        .description(format!(
            "{} — Lv. {}",
            card.character.series, card.level
        ))
        .field(
            "Stats",
            format!(
                "HP {} · ATK {} · DEF {} · SPD {}",
                card.stats.hp, card.stats.attack, card.stats.defense, card.stats.speed
            ),
            false,
        )
        .field("Abilities", card.ability_ids.join(", "), false)
        .footer(serenity::CreateEmbedFooter::new(format!("Card #{}", card.id)))
}

/// Drop a random character card.
#[poise::command(slash_command)]
pub async fn drop(ctx: Context<'_>) -> Result<(), Error> {
    let user_id = ctx.author().id.get();
    let data = ctx.data();

    // Top up the pool first so the draw below never waits on the network
    // while holding the store lock.
    {
        let mut pool = data.pool.lock().await;
        if pool.is_low() {
            if let Err(e) = pool.refill(&data.chain).await {
                warn!("pool refill failed: {e}");
            }
        }
    }

    let card = {
        let mut store = data.store.lock().await;
        let mut rng = data.rng.lock().await;
        let character = {
            let pool = data.pool.lock().await;
            pool.draw(&mut rng)?
        };
        gacha::mint(&mut store, &mut rng, user_id, character, now_ms())?
    };

    let png = render::card::render_card(&card).ok();
    let mut reply = poise::CreateReply::default().embed(card_embed(&card));
    if let Some(bytes) = png {
        reply = reply.attachment(serenity::CreateAttachment::bytes(bytes, "card.png"));
    }
    ctx.send(reply).await?;
    Ok(())
}

/// Claim the daily coin and gem bonus and today's missions.
#[poise::command(slash_command)]
pub async fn daily(ctx: Context<'_>) -> Result<(), Error> {
    let user_id = ctx.author().id.get();
    let data = ctx.data();
    let now = now_ms();

    let missions = {
        let mut store = data.store.lock().await;
        let mut rng = data.rng.lock().await;
        let player = store.player_or_create(user_id);
        let remaining =
            gacha::cooldown_remaining_ms(player.last_daily_ms, now, gacha::DAILY_COOLDOWN_MS);
        if remaining > 0 {
            let hours = remaining / (60 * 60 * 1000);
            let minutes = remaining / (60 * 1000) % 60;
            return Err(format!("daily already claimed; back in {hours}h {minutes}m").into());
        }
        store.commit(
            "DailyClaimed",
            ActionPayload::DailyClaimed {
                user_id,
                coins: progression::DAILY_COINS,
                gems: progression::DAILY_GEMS,
                claim_ms: now,
            },
            Some(user_id),
        );
        let missions = progression::assign_daily_missions(&mut rng);
        store.commit(
            "MissionsAssigned",
            ActionPayload::MissionsAssigned {
                user_id,
                missions: missions.clone(),
            },
            Some(user_id),
        );
        missions
    };

    let mission_lines: Vec<String> = missions
        .iter()
        .map(|m| format!("• {}", m.kind.describe(m.goal)))
        .collect();
    let embed = serenity::CreateEmbed::new()
        .title("Daily bonus claimed")
        .colour(serenity::Colour::new(0x2ecc71))
        .description(format!(
            "+{} coins, +{} gems\n\n**Today's missions**\n{}",
            progression::DAILY_COINS,
            progression::DAILY_GEMS,
            mission_lines.join("\n")
        ));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Show your card collection.
#[poise::command(slash_command)]
pub async fn collection(ctx: Context<'_>) -> Result<(), Error> {
    let user_id = ctx.author().id.get();
    let data = ctx.data();

    let lines: Vec<String> = {
        let store = data.store.lock().await;
        store
            .cards_of(user_id)
            .iter()
            .take(25)
            .map(|c| {
                format!(
                    "`#{}` **{}** · {} · Lv. {}",
                    c.id,
                    c.character.name,
                    c.rarity.label(),
                    c.level
                )
            })
            .collect()
    };

    if lines.is_empty() {
        ctx.say("Your collection is empty. Try `/drop`!").await?;
        return Ok(());
    }

    let embed = serenity::CreateEmbed::new()
        .title(format!("{}'s collection", ctx.author().name))
        .colour(serenity::Colour::new(0x3498db))
        .description(lines.join("\n"));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// View one of your cards with its rendered art.
#[poise::command(slash_command)]
pub async fn card(
    ctx: Context<'_>,
    #[description = "Card id from /collection"] card_id: u64,
) -> Result<(), Error> {
    let user_id = ctx.author().id.get();
    let data = ctx.data();

    let card = {
        let store = data.store.lock().await;
        let card = store
            .card(card_id)
            .cloned()
            .ok_or(format!("no card #{card_id}"))?;
        if card.owner_id != user_id {
            return Err(format!("card #{card_id} is not yours").into());
        }
        card
    };

    let xp_needed = progression::xp_for_next(card.level);
    let embed = card_embed(&card).field(
        "XP",
        format!("{} / {}", card.xp, xp_needed),
        false,
    );
    let mut reply = poise::CreateReply::default().embed(embed);
    match render::card::render_card(&card) {
        Ok(bytes) => {
            reply = reply.attachment(serenity::CreateAttachment::bytes(bytes, "card.png"));
        }
        Err(e) => warn!("card render unavailable: {e}"),
    }
    ctx.send(reply).await?;
    Ok(())
}
