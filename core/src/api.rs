use std::fmt::Debug;
use std::time::Duration;

use crate::Context;
use crate::Result;

/// Key material a [`SignRequest`] implementation can sign with.
pub trait SigningCredential: Clone + Debug + Send + Sync + Unpin + 'static {
    /// Whether every part needed to produce a signature is present.
    fn is_valid(&self) -> bool;
}

impl<T: SigningCredential> SigningCredential for Option<T> {
    fn is_valid(&self) -> bool {
        self.as_ref().is_some_and(T::is_valid)
    }
}

/// Authenticates outbound requests in place.
///
/// Service crates implement it for their signer so callers holding a bare
/// `http::request::Parts` can sign without going through a client.
#[async_trait::async_trait]
pub trait SignRequest: Debug + Send + Sync + Unpin + 'static {
    /// Credential used by this signer.
    type Credential: Send + Sync + Unpin + 'static;

    /// Sign the request in place.
    ///
    /// ## Credential
    ///
    /// The `credential` parameter is the credential required by the signer to sign the request.
    /// Implementations must fail if it is missing or invalid.
    ///
    /// ## Expires In
    ///
    /// The `expires_in` parameter switches to query signing: the signature is
    /// carried by query parameters valid for the given duration instead of an
    /// authorization header.
    async fn sign_request(
        &self,
        ctx: &Context,
        req: &mut http::request::Parts,
        credential: Option<&Self::Credential>,
        expires_in: Option<Duration>,
    ) -> Result<()>;
}
