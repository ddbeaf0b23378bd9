//! Core data models for the club team.

mod availability;
mod game;
mod ids;
mod pair;
mod player;
mod result;

pub use availability::*;
pub use game::*;
pub use ids::*;
pub use pair::*;
pub use player::*;
pub use result::*;
