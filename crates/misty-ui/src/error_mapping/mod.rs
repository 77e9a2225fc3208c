//! Maps lookup failures to misty_core::AppError for consistent user-facing messages.

mod lookup;

pub use lookup::{app_error, user_message};
