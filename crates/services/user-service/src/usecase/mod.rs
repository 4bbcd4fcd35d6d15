//! Use case layer.

pub mod dto;
mod user_usecase;

pub use dto::*;
pub use user_usecase::UserUseCase;
