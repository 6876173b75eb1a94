use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Composite `(rank, suit)` key used for shoe counts and burn estimates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// All 52 keys, suit-major in rank order.
    pub fn all() -> impl Iterator<Item = Card> {
        Suit::ALL.into_iter().flat_map(|suit| {
            Rank::ORDERED
                .into_iter()
                .map(move |rank| Card::new(rank, suit))
        })
    }

    pub const fn points(self) -> u8 {
        self.rank.points()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCardError(String);

impl fmt::Display for ParseCardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid card '{}'", self.0)
    }
}

impl std::error::Error for ParseCardError {}

impl FromStr for Card {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.len() < 2 || !text.is_ascii() {
            return Err(ParseCardError(s.to_string()));
        }
        let (rank_text, suit_text) = text.split_at(text.len() - 1);
        let rank = match rank_text.to_ascii_uppercase().as_str() {
            "A" | "1" => Rank::Ace,
            "J" => Rank::Jack,
            "Q" => Rank::Queen,
            "K" => Rank::King,
            "T" => Rank::Ten,
            digits => digits
                .parse::<u8>()
                .ok()
                .and_then(Rank::from_value)
                .ok_or_else(|| ParseCardError(s.to_string()))?,
        };
        let suit = match suit_text.to_ascii_uppercase().as_str() {
            "C" => Suit::Clubs,
            "D" => Suit::Diamonds,
            "H" => Suit::Hearts,
            "S" => Suit::Spades,
            _ => return Err(ParseCardError(s.to_string())),
        };
        Ok(Card::new(rank, suit))
    }
}

impl TryFrom<String> for Card {
    type Error = ParseCardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        card.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{Card, Rank, Suit};

    #[test]
    fn all_yields_52_unique_keys() {
        let mut cards: Vec<Card> = Card::all().collect();
        assert_eq!(cards.len(), 52);
        cards.sort();
        cards.dedup();
        assert_eq!(cards.len(), 52);
    }

    #[test]
    fn parses_display_form() {
        let card = Card::new(Rank::Ten, Suit::Hearts);
        assert_eq!(card.to_string(), "10H");
        assert_eq!("10H".parse::<Card>(), Ok(card));
        assert_eq!("qs".parse::<Card>(), Ok(Card::new(Rank::Queen, Suit::Spades)));
        assert!("1X".parse::<Card>().is_err());
        assert!("ZZ".parse::<Card>().is_err());
    }

    #[test]
    fn serializes_as_compact_string() {
        let card = Card::new(Rank::Ace, Suit::Clubs);
        let json = serde_json::to_string(&card).unwrap();
        assert_eq!(json, "\"AC\"");
        let back: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(back, card);
    }
}
