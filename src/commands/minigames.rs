use poise::serenity_prelude as serenity;

use super::{now_ms, Context, Error};
use crate::minigames::{casino, fishing};

/// Which way the coin is called.
#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum FlipCall {
    #[name = "heads"]
    Heads,
    #[name = "tails"]
    Tails,
}

impl From<FlipCall> for casino::CoinSide {
    fn from(call: FlipCall) -> Self {
        match call {
            FlipCall::Heads => casino::CoinSide::Heads,
            FlipCall::Tails => casino::CoinSide::Tails,
        }
    }
}

/// Cast a line and see what bites.
#[poise::command(slash_command)]
pub async fn fish(ctx: Context<'_>) -> Result<(), Error> {
    let user_id = ctx.author().id.get();
    let data = ctx.data();

    let result = {
        let mut store = data.store.lock().await;
        let mut rng = data.rng.lock().await;
        fishing::cast(&mut store, &mut rng, user_id, now_ms())?
    };

    let (title, description, colour) = match &result.catch_name {
        Some(name) => (
            format!("You caught: {name}!"),
            format!("Sold for **{} coins**.", result.payout),
            0x2ecc71,
        ),
        None => (
            "Nothing bites...".to_string(),
            "Better luck next cast.".to_string(),
            0x95a5a6,
        ),
    };
    let embed = serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .colour(serenity::Colour::new(colour));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Bet coins on a coinflip.
#[poise::command(slash_command)]
pub async fn coinflip(
    ctx: Context<'_>,
    #[description = "Coins to wager"] wager: i64,
    #[description = "Your call"] call: FlipCall,
) -> Result<(), Error> {
    let user_id = ctx.author().id.get();
    let data = ctx.data();

    let result = {
        let mut store = data.store.lock().await;
        let mut rng = data.rng.lock().await;
        casino::coinflip(&mut store, &mut rng, user_id, wager, call.into())?
    };

    let embed = if result.won {
        serenity::CreateEmbed::new()
            .title(format!("{} — you win!", result.landed.label()))
            .description(format!("You take **{} coins**.", result.payout))
            .colour(serenity::Colour::new(0x2ecc71))
    } else {
        serenity::CreateEmbed::new()
            .title(format!("{} — you lose", result.landed.label()))
            .description(format!("**{wager} coins** gone."))
            .colour(serenity::Colour::new(0xe74c3c))
    };
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Spin the slot machine.
#[poise::command(slash_command)]
pub async fn slots(
    ctx: Context<'_>,
    #[description = "Coins to wager"] wager: i64,
) -> Result<(), Error> {
    let user_id = ctx.author().id.get();
    let data = ctx.data();

    let result = {
        let mut store = data.store.lock().await;
        let mut rng = data.rng.lock().await;
        casino::slots(&mut store, &mut rng, user_id, wager)?
    };

    let reels = format!(
        "{} {} {}",
        result.reels[0].emoji(),
        result.reels[1].emoji(),
        result.reels[2].emoji()
    );
    let (verdict, colour) = if result.payout > 0 {
        (
            format!("**{}x** — you win {} coins!", result.multiplier, result.payout),
            0x2ecc71,
        )
    } else {
        (format!("No match — {wager} coins gone."), 0xe74c3c)
    };
    let embed = serenity::CreateEmbed::new()
        .title("Slots")
        .description(format!("{reels}\n\n{verdict}"))
        .colour(serenity::Colour::new(colour));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
