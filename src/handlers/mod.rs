pub mod chat;
pub mod review;

pub use chat::ChatService;
pub use review::ReviewService;
