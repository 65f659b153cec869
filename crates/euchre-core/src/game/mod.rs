pub mod contract;
pub mod error;
pub mod state;

pub use contract::{Euchre, EuchreSetup, Game};
pub use error::{EuchreError, MoveError, SetupError};
pub use state::{GameState, HAND_SIZE};
