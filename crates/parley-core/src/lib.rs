pub mod chat;
pub mod error;
pub mod translate;
pub mod traits;
pub mod upstream;

pub use error::AppError;
pub use traits::ChatBackend;
