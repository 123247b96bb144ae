pub mod actions;
pub mod config;
pub mod invariants;
pub mod journal;
pub mod query;
pub mod reducer;
pub mod state;

pub use actions::*;
pub use config::*;
pub use invariants::*;
pub use reducer::*;
pub use state::*;

pub use journal::*;
pub use query::*;
