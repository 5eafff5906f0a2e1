mod combinators;
mod grammar;
mod primitives;
mod state;

pub use combinators::*;
pub use grammar::*;
pub use primitives::*;
pub use state::*;
