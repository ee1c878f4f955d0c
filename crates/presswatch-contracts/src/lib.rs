// Public contracts for the Presswatch API
// This crate defines the DTOs shared by the server and the client:
// users, chat sessions, messages, and the research stream wire types.

pub mod common;
pub mod message;
pub mod research;
pub mod session;
pub mod user;

pub use common::*;
pub use message::*;
pub use research::*;
pub use session::*;
pub use user::*;
