pub mod ai;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod conversation;
pub mod error;
pub mod gateway;
pub mod state;

// Re-export main types for convenience
pub use ai::GeminiClient;
pub use cart::Cart;
pub use catalog::{LookbookFrame, Product};
pub use config::Config;
pub use conversation::{Conversation, PendingTurn, Rejection, TurnId, TurnState};
pub use error::GatewayError;
pub use gateway::{GenerationRequest, StylistGateway, TextGenerator};
pub use state::{ChatMessage, Sender};
