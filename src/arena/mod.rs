pub mod diagnosis;
pub mod session;

pub use session::{ArenaInput, ArenaPhase, ArenaSession, SessionKind};
