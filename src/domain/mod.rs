//! Entities shown in comment threads, reaction lists and subscriber lists.

mod comment;
mod reaction;
mod subscriber;

pub use comment::Comment;
pub use reaction::Reaction;
pub use subscriber::Subscriber;
