mod errors;
mod traits;
mod types;
mod workos;

pub use errors::ProviderError;
pub use traits::{IdentityProvider, SessionHandle};
pub use types::{
    AUTHKIT_PROVIDER, AuthResult, AuthenticatedSession, AuthorizationUrlRequest, CodeExchange,
    CodeExchangeOptions, FailureReason, RefreshResult, SealedSession, UserIdentity,
};
pub use workos::WorkosClient;
