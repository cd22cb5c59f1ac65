pub mod error;
pub mod providers;
pub mod router;
pub mod transport;
pub mod types;

pub use error::{CompletionError, TransportError, parse_provider_error};
pub use router::Router;
pub use transport::{Auth, HttpRequest, RetryPolicy, Transport};
pub use types::{Completion, CompletionRequest, CompletionResult, Prompt, Usage};
