pub use shakmaty;

pub mod pgn;
pub mod position;

pub use position::ChessError;
