#![deny(warnings)]
pub mod determinize;
pub mod game;
pub mod model;

pub use determinize::{DeterminizeError, Determinizer};
pub use game::{Euchre, EuchreError, EuchreSetup, Game, GameState};
pub use model::card::Card;
pub use model::player::{PlayerPosition, Team};
pub use model::suit::Suit;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "euchre-core"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
