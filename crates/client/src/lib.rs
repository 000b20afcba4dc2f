pub mod api;
pub mod error;
pub mod grid;
pub mod session;
pub mod traits;

pub use api::ApiClient;
pub use error::{ClientError, Result};
pub use session::{ScoreEditSession, WriteFailure};
pub use traits::ScoreApi;
