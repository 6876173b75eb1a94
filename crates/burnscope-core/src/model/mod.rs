pub mod card;
pub mod history;
pub mod rank;
pub mod shoe;
pub mod suit;
