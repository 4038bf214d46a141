pub mod analysis;
pub mod games;
pub mod health;
pub mod openings;
pub mod players;
