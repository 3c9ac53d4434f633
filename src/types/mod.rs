pub mod event;
pub mod price;
pub mod signals;

pub use event::*;
pub use price::*;
pub use signals::*;
