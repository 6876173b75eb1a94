use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Remaining-card counts by `(rank, suit)`, as reported by the game-state collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoeComposition {
    counts: BTreeMap<Card, u32>,
    #[serde(default)]
    negative_input: bool,
}

impl ShoeComposition {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A fresh shoe holding `decks` complete 52-card decks.
    pub fn full(decks: u32) -> Self {
        let counts = Card::all().map(|card| (card, decks)).collect();
        Self {
            counts,
            negative_input: false,
        }
    }

    /// Builds a composition from raw counts. Negative counts are stored as zero and
    /// mark the composition invalid.
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (Card, i64)>,
    {
        let mut shoe = Self::empty();
        for (card, count) in counts {
            if count < 0 {
                shoe.negative_input = true;
            }
            let clamped = count.clamp(0, u32::MAX as i64) as u32;
            let slot = shoe.counts.entry(card).or_insert(0);
            *slot = slot.saturating_add(clamped);
        }
        shoe
    }

    pub fn from_cards<'a, I>(cards: I) -> Self
    where
        I: IntoIterator<Item = &'a Card>,
    {
        let mut shoe = Self::empty();
        for card in cards {
            let slot = shoe.counts.entry(*card).or_insert(0);
            *slot = slot.saturating_add(1);
        }
        shoe
    }

    /// Non-empty, non-zero total, and no negative counts were supplied.
    pub fn is_valid(&self) -> bool {
        !self.negative_input && self.total() > 0
    }

    pub fn had_negative_input(&self) -> bool {
        self.negative_input
    }

    pub fn count(&self, card: Card) -> u32 {
        self.counts.get(&card).copied().unwrap_or(0)
    }

    /// Totals are summed in `u64`; 52 keys of `u32::MAX` cannot overflow.
    pub fn total(&self) -> u64 {
        self.counts.values().map(|count| u64::from(*count)).sum()
    }

    pub fn rank_count(&self, rank: Rank) -> u64 {
        Suit::ALL
            .iter()
            .map(|suit| u64::from(self.count(Card::new(rank, *suit))))
            .sum()
    }

    pub fn suit_count(&self, suit: Suit) -> u64 {
        Rank::ORDERED
            .iter()
            .map(|rank| u64::from(self.count(Card::new(*rank, suit))))
            .sum()
    }

    pub fn high_total(&self) -> u64 {
        self.counts
            .iter()
            .filter(|(card, _)| card.rank.is_high())
            .map(|(_, count)| u64::from(*count))
            .sum()
    }

    pub fn low_total(&self) -> u64 {
        self.total() - self.high_total()
    }

    pub fn high_card_ratio(&self) -> f64 {
        ratio(self.high_total(), self.total())
    }

    /// Fraction of the remaining shoe made up by `card`.
    pub fn share(&self, card: Card) -> f64 {
        ratio(u64::from(self.count(card)), self.total())
    }

    pub fn rank_share(&self, rank: Rank) -> f64 {
        ratio(self.rank_count(rank), self.total())
    }

    /// Removes one copy of `card`, saturating at zero. Returns whether a copy was present.
    pub fn remove(&mut self, card: Card) -> bool {
        match self.counts.get_mut(&card) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Card, u32)> + '_ {
        self.counts.iter().map(|(card, count)| (*card, *count))
    }
}

pub(crate) fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Ordered physical shoe used to simulate dealing and burning. Drawing advances
/// a cursor; `cards()` is always the undealt remainder.
#[derive(Debug, Clone)]
pub struct Shoe {
    cards: Vec<Card>,
    next: usize,
}

impl Shoe {
    pub fn ordered(decks: u32) -> Self {
        let mut cards = Vec::with_capacity(52 * decks as usize);
        for _ in 0..decks {
            cards.extend(Card::all());
        }
        Self { cards, next: 0 }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(decks: u32, rng: &mut R) -> Self {
        let mut shoe = Self::ordered(decks);
        shoe.cards.shuffle(rng);
        shoe
    }

    pub fn shuffled_with_seed(decks: u32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(decks, &mut rng)
    }

    /// Takes the next card off the front of the shoe.
    pub fn draw(&mut self) -> Option<Card> {
        let card = self.cards.get(self.next).copied()?;
        self.next += 1;
        Some(card)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards[self.next..]
    }

    pub fn len(&self) -> usize {
        self.cards.len() - self.next
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn composition(&self) -> ShoeComposition {
        ShoeComposition::from_cards(self.cards().iter())
    }
}
