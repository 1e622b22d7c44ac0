//! Character sources.
//!
//! One trait, several fetchers, one fallback chain. All outbound HTTP goes
//! through the shared [`reqwest::Client`] built here so timeouts and error
//! mapping live in one place; a source failure is logged and the chain moves
//! on, so the bot keeps working offline via the builtin pool.

use poise::serenity_prelude::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::store::documents::Character;

const ANILIST_URL: &str = "https://graphql.anilist.co";
const JIKAN_URL: &str = "https://api.jikan.moe/v4/top/characters";
const NEKOS_URL: &str = "https://nekos.best/api/v2/neko";

const PAGE_SIZE: u32 = 25;

/// Something that can produce a page of characters.
#[async_trait]
pub trait CharacterSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn fetch_page(&self, page: u32) -> Result<Vec<Character>, String>;
}

fn http_client() -> Result<reqwest::Client, String> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .user_agent("gachapon (card game bot)")
        .build()
        .map_err(|e| e.to_string())
}

// ---------------------------------------------------------------------------
// AniList (GraphQL)
// ---------------------------------------------------------------------------

pub struct AniListSource {
    client: reqwest::Client,
}

impl AniListSource {
    pub fn new() -> Result<Self, String> {
        Ok(AniListSource {
            client: http_client()?,
        })
    }
}

const ANILIST_QUERY: &str = "
query ($page: Int, $perPage: Int) {
  Page(page: $page, perPage: $perPage) {
    characters(sort: FAVOURITES_DESC) {
      name { full }
      image { large }
      favourites
      media(perPage: 1, sort: POPULARITY_DESC) {
        nodes { title { romaji } }
      }
    }
  }
}";

#[async_trait]
impl CharacterSource for AniListSource {
    fn name(&self) -> &'static str {
        "anilist"
    }

    async fn fetch_page(&self, page: u32) -> Result<Vec<Character>, String> {
        let body = serde_json::json!({
            "query": ANILIST_QUERY,
            "variables": { "page": page, "perPage": PAGE_SIZE },
        });
        let response: serde_json::Value = self
            .client
            .post(ANILIST_URL)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("anilist request failed: {e}"))?
            .error_for_status()
            .map_err(|e| format!("anilist returned an error status: {e}"))?
            .json()
            .await
            .map_err(|e| format!("anilist sent invalid JSON: {e}"))?;

        let characters = response
            .pointer("/data/Page/characters")
            .and_then(|v| v.as_array())
            .ok_or("anilist response missing characters page")?;

        let mut out = Vec::with_capacity(characters.len());
        for c in characters {
            let Some(name) = c.pointer("/name/full").and_then(|v| v.as_str()) else {
                continue;
            };
            let series = c
                .pointer("/media/nodes/0/title/romaji")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown")
                .to_string();
            out.push(Character {
                name: name.to_string(),
                series,
                image_url: c
                    .pointer("/image/large")
                    .and_then(|v| v.as_str())
                    .map(str::to_string),
                popularity: c
                    .pointer("/favourites")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0) as u32,
            });
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Jikan (MyAnimeList REST mirror)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct JikanResponse {
    data: Vec<JikanCharacter>,
}

#[derive(Debug, Deserialize)]
struct JikanCharacter {
    name: String,
    favorites: Option<u32>,
    images: Option<JikanImages>,
}

#[derive(Debug, Deserialize)]
struct JikanImages {
    jpg: Option<JikanJpg>,
}

#[derive(Debug, Deserialize)]
struct JikanJpg {
    image_url: Option<String>,
}

pub struct JikanSource {
    client: reqwest::Client,
}

impl JikanSource {
    pub fn new() -> Result<Self, String> {
        Ok(JikanSource {
            client: http_client()?,
        })
    }
}

#[async_trait]
impl CharacterSource for JikanSource {
    fn name(&self) -> &'static str {
        "jikan"
    }

    async fn fetch_page(&self, page: u32) -> Result<Vec<Character>, String> {
        let response: JikanResponse = self
            .client
            .get(JIKAN_URL)
            .query(&[("page", page)])
            .send()
            .await
            .map_err(|e| format!("jikan request failed: {e}"))?
            .error_for_status()
            .map_err(|e| format!("jikan returned an error status: {e}"))?
            .json()
            .await
            .map_err(|e| format!("jikan sent invalid JSON: {e}"))?;

        Ok(response
            .data
            .into_iter()
            .map(|c| Character {
                name: c.name,
                // The top-characters endpoint does not carry a series.
                series: "Unknown".to_string(),
                image_url: c.images.and_then(|i| i.jpg).and_then(|j| j.image_url),
                popularity: c.favorites.unwrap_or(0),
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// nekos.best (image-only art source)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct NekosResponse {
    results: Vec<NekosResult>,
}

#[derive(Debug, Deserialize)]
struct NekosResult {
    url: String,
    artist_name: Option<String>,
}

pub struct NekosBestSource {
    client: reqwest::Client,
}

impl NekosBestSource {
    pub fn new() -> Result<Self, String> {
        Ok(NekosBestSource {
            client: http_client()?,
        })
    }
}

#[async_trait]
impl CharacterSource for NekosBestSource {
    fn name(&self) -> &'static str {
        "nekos.best"
    }

    /// Image-only source: each result becomes a novelty character whose art
    /// is the fetched image.
    async fn fetch_page(&self, _page: u32) -> Result<Vec<Character>, String> {
        let response: NekosResponse = self
            .client
            .get(NEKOS_URL)
            .query(&[("amount", 10u32)])
            .send()
            .await
            .map_err(|e| format!("nekos.best request failed: {e}"))?
            .error_for_status()
            .map_err(|e| format!("nekos.best returned an error status: {e}"))?
            .json()
            .await
            .map_err(|e| format!("nekos.best sent invalid JSON: {e}"))?;

        Ok(response
            .results
            .into_iter()
            .map(|r| Character {
                name: r
                    .artist_name
                    .map(|a| format!("Neko by {a}"))
                    .unwrap_or_else(|| "Mysterious Neko".to_string()),
                series: "nekos.best".to_string(),
                image_url: Some(r.url),
                popularity: 0,
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Builtin offline pool
// ---------------------------------------------------------------------------

/// Static fallback so drops work with no network at all.
pub const BUILTIN_CHARACTERS: &[(&str, &str, u32)] = &[
    ("Lelouch Lamperouge", "Code Geass", 174_000),
    ("Levi Ackerman", "Attack on Titan", 160_000),
    ("Luffy Monkey D.", "One Piece", 130_000),
    ("Zero Two", "Darling in the Franxx", 120_000),
    ("Killua Zoldyck", "Hunter x Hunter", 112_000),
    ("Edward Elric", "Fullmetal Alchemist", 101_000),
    ("Rem", "Re:Zero", 96_000),
    ("Itachi Uchiha", "Naruto", 94_000),
    ("Mikasa Ackerman", "Attack on Titan", 90_000),
    ("Saber", "Fate/stay night", 62_000),
    ("Megumin", "Konosuba", 61_000),
    ("Kurisu Makise", "Steins;Gate", 58_000),
    ("Spike Spiegel", "Cowboy Bebop", 46_000),
    ("Holo", "Spice and Wolf", 39_000),
    ("Gintoki Sakata", "Gintama", 37_000),
    ("Rimuru Tempest", "That Time I Got Reincarnated as a Slime", 35_000),
];

pub struct BuiltinSource;

impl BuiltinSource {
    pub fn characters() -> Vec<Character> {
        BUILTIN_CHARACTERS
            .iter()
            .map(|(name, series, popularity)| Character {
                name: name.to_string(),
                series: series.to_string(),
                image_url: None,
                popularity: *popularity,
            })
            .collect()
    }
}

#[async_trait]
impl CharacterSource for BuiltinSource {
    fn name(&self) -> &'static str {
        "builtin"
    }

    async fn fetch_page(&self, _page: u32) -> Result<Vec<Character>, String> {
        Ok(Self::characters())
    }
}

// ---------------------------------------------------------------------------
// Fallback chain
// ---------------------------------------------------------------------------

/// Tries each source in order; the first success wins. Failures are logged
/// and never fatal because the chain ends in the builtin source.
pub struct SourceChain {
    sources: Vec<Box<dyn CharacterSource>>,
}

impl SourceChain {
    pub fn new(sources: Vec<Box<dyn CharacterSource>>) -> Self {
        SourceChain { sources }
    }

    /// The standard chain: AniList, then Jikan, then nekos.best, then builtin.
    pub fn standard() -> Self {
        let mut sources: Vec<Box<dyn CharacterSource>> = Vec::new();
        match AniListSource::new() {
            Ok(s) => sources.push(Box::new(s)),
            Err(e) => warn!("anilist source unavailable: {e}"),
        }
        match JikanSource::new() {
            Ok(s) => sources.push(Box::new(s)),
            Err(e) => warn!("jikan source unavailable: {e}"),
        }
        match NekosBestSource::new() {
            Ok(s) => sources.push(Box::new(s)),
            Err(e) => warn!("nekos.best source unavailable: {e}"),
        }
        sources.push(Box::new(BuiltinSource));
        SourceChain::new(sources)
    }

    /// Fetch a page from the first source that answers.
    pub async fn fetch_page(&self, page: u32) -> Result<Vec<Character>, String> {
        let mut last_error = "no sources configured".to_string();
        for source in &self.sources {
            match source.fetch_page(page).await {
                Ok(characters) if !characters.is_empty() => {
                    return Ok(characters);
                }
                Ok(_) => {
                    warn!("source {} returned an empty page", source.name());
                    last_error = format!("source {} returned an empty page", source.name());
                }
                Err(e) => {
                    warn!("source {} failed: {e}", source.name());
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_pool_is_nonempty_and_named() {
        let characters = BuiltinSource::characters();
        assert!(characters.len() >= 10);
        assert!(characters.iter().all(|c| !c.name.is_empty()));
    }

    #[tokio::test]
    async fn chain_falls_back_to_builtin() {
        struct Broken;
        #[async_trait]
        impl CharacterSource for Broken {
            fn name(&self) -> &'static str {
                "broken"
            }
            async fn fetch_page(&self, _page: u32) -> Result<Vec<Character>, String> {
                Err("boom".to_string())
            }
        }

        let chain = SourceChain::new(vec![Box::new(Broken), Box::new(BuiltinSource)]);
        let page = chain.fetch_page(1).await.expect("builtin answers");
        assert_eq!(page.len(), BuiltinSource::characters().len());
    }
}
