pub mod types;
pub mod board;
pub mod rules;
pub mod state;
pub mod store;

pub use types::*;
pub use board::*;
pub use rules::*;
pub use state::*;
pub use store::*;
