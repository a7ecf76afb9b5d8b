pub mod aggregator;
pub mod analyzer;
pub mod frame;
pub mod indicators;
pub mod levels;
pub mod signals;


pub use aggregator::*;
pub use analyzer::*;
pub use frame::*;
pub use indicators::*;
pub use levels::*;
pub use signals::*;
