pub mod executor;
pub mod guards;

pub use executor::{LifecycleEvent, StateMachine};
pub use guards::{current_session, is_game_over, CurrentSessionProvider};
