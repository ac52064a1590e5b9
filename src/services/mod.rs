//! Services

pub mod assistant;
pub mod command;
pub mod conversation;
pub mod goals;
pub mod ledger;
pub mod profile_store;
pub mod user_locks;

pub use assistant::AssistantService;
pub use command::Command;
pub use conversation::{ConversationEngine, Input, StepOutcome};
pub use ledger::{DailyLedger, Progress, WaterLogged, WorkoutLogged};
pub use profile_store::{InMemoryProfileStore, ProfileStore};
pub use user_locks::UserLocks;
