pub mod codec;
pub mod location;
pub mod url_state;

pub use location::{FileLocation, Location, MemoryLocation};
pub use url_state::UrlState;
