pub mod auth;
pub mod completion;
pub mod identity;
pub mod submissions;

pub use auth::AuthService;
pub use completion::CompletionAggregator;
pub use identity::IdentityService;
pub use submissions::SubmissionEngine;
