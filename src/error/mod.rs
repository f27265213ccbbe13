mod app;
mod http;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use http::HttpError;
pub use validation::ValidationError;
