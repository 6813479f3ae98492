pub mod analysis;
pub mod bar;
pub mod indicators;
pub mod score;
pub mod signals;

pub use analysis::*;
pub use bar::*;
pub use indicators::*;
pub use score::*;
pub use signals::*;
