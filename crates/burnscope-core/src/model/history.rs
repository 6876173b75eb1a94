use crate::model::card::Card;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Player,
    Banker,
    Tie,
}

/// A completed hand as resolved by the game-rules collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandRecord {
    pub player_cards: Vec<Card>,
    pub banker_cards: Vec<Card>,
    pub outcome: Outcome,
}

impl HandRecord {
    pub fn new(player_cards: Vec<Card>, banker_cards: Vec<Card>, outcome: Outcome) -> Self {
        Self {
            player_cards,
            banker_cards,
            outcome,
        }
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.player_cards.iter().chain(self.banker_cards.iter())
    }
}

/// Outcome tallies over the trailing `window` hands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeTally {
    pub player: u32,
    pub banker: u32,
    pub tie: u32,
}

impl OutcomeTally {
    pub fn recent(history: &[HandRecord], window: usize) -> Self {
        let start = history.len().saturating_sub(window);
        let mut tally = Self::default();
        for hand in &history[start..] {
            match hand.outcome {
                Outcome::Player => tally.player += 1,
                Outcome::Banker => tally.banker += 1,
                Outcome::Tie => tally.tie += 1,
            }
        }
        tally
    }

    pub fn total(&self) -> u32 {
        self.player + self.banker + self.tie
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    fn hand(outcome: Outcome) -> HandRecord {
        HandRecord::new(
            vec![Card::new(Rank::Two, Suit::Clubs)],
            vec![Card::new(Rank::King, Suit::Hearts)],
            outcome,
        )
    }

    #[test]
    fn recent_tally_respects_window() {
        let history = vec![
            hand(Outcome::Player),
            hand(Outcome::Banker),
            hand(Outcome::Banker),
            hand(Outcome::Tie),
        ];
        let tally = OutcomeTally::recent(&history, 3);
        assert_eq!(tally.player, 0);
        assert_eq!(tally.banker, 2);
        assert_eq!(tally.tie, 1);
        assert_eq!(OutcomeTally::recent(&history, 10).total(), 4);
    }

    #[test]
    fn cards_chains_both_sides() {
        assert_eq!(hand(Outcome::Tie).cards().count(), 2);
    }
}
