pub mod manager;

pub use manager::{GameSession, GameSessionManager};
