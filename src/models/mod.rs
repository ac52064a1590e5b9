pub mod conversation;
pub mod profile;
pub mod reply;

pub use conversation::*;
pub use profile::*;
pub use reply::*;
