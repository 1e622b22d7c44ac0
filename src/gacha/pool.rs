use rand::RngCore;
use rand_pcg::Lcg64Xsh32;
use tracing::info;

use super::sources::{BuiltinSource, SourceChain};
use crate::store::documents::Character;

/// Refill when the pool shrinks below this.
const LOW_WATER_MARK: usize = 40;

/// In-memory cache of characters available to drop.
///
/// Seeded with the builtin set so a drop can never fail; refilled from the
/// source chain page by page. Draws are uniform and with replacement — the
/// same character can be minted by many players.
#[derive(Debug)]
pub struct CharacterPool {
    characters: Vec<Character>,
    next_page: u32,
}

impl CharacterPool {
    pub fn with_builtin() -> Self {
        CharacterPool {
            characters: BuiltinSource::characters(),
            next_page: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn is_low(&self) -> bool {
        self.characters.len() < LOW_WATER_MARK
    }

    /// Draw a character uniformly.
    pub fn draw(&self, rng: &mut Lcg64Xsh32) -> Result<Character, String> {
        if self.characters.is_empty() {
            return Err("character pool is empty".to_string());
        }
        let pick = (rng.next_u64() as usize) % self.characters.len();
        Ok(self.characters[pick].clone())
    }

    /// Pull the next page from the chain and merge it, deduplicating by
    /// character name. Returns how many new characters arrived.
    pub async fn refill(&mut self, chain: &SourceChain) -> Result<usize, String> {
        let page = chain.fetch_page(self.next_page).await?;
        self.next_page += 1;
        let before = self.characters.len();
        for character in page {
            if !self.characters.iter().any(|c| c.name == character.name) {
                self.characters.push(character);
            }
        }
        let added = self.characters.len() - before;
        info!(added, total = self.characters.len(), "character pool refilled");
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::seeded_rng;

    #[test]
    fn draw_is_deterministic_per_seed() {
        let pool = CharacterPool::with_builtin();
        let a = pool.draw(&mut seeded_rng(5)).unwrap();
        let b = pool.draw(&mut seeded_rng(5)).unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn refill_deduplicates_by_name() {
        let mut pool = CharacterPool::with_builtin();
        let chain = SourceChain::new(vec![Box::new(BuiltinSource)]);
        let added = pool.refill(&chain).await.unwrap();
        assert_eq!(added, 0, "builtin page duplicates the seed set");
    }
}
