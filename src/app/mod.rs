pub mod context;
pub mod error;

pub use context::{AppContext, OpenSession, PageSource};
pub use error::{Result, ThreadlineError};
