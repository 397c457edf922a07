mod error;
mod traits;
mod types;

pub use error::{ProfileError, Result};
pub use traits::ProfileRepository;
pub use types::{ProfileUpdate, UserProfile};
