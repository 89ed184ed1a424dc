pub mod comment;
pub mod discussion;
pub mod summary;

pub use comment::{Comment, Thread, ThreadBuilder};
pub use discussion::{DiscussionContent, MainPost};
pub use summary::{SummaryKind, SummaryRecord};
