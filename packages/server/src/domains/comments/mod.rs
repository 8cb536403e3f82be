pub mod actions;

pub use actions::{create_comment, thread, CreateComment};
