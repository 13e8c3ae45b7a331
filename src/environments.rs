//! Environment adapters: the games the agent learns on

pub mod connect_four;
pub mod lines;
pub mod shared;
pub mod tictactoe;
pub mod treasure_hunt;
pub mod versus;

pub use connect_four::{Column, ConnectFour, ConnectFourRewards};
pub use lines::{Line, LineAnalyzer, WINNING_LINES};
pub use shared::Shared;
pub use tictactoe::{Placement, TicTacToe, TicTacToeRewards};
pub use treasure_hunt::{Direction, TreasureHunt, TreasureRewards, levels};
pub use versus::Versus;
