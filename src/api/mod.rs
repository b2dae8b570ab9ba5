pub mod client;
pub mod types;

use crate::errors::ClientResult;
use self::types::{
    CalculationRecord, CalculationRequest, CalculationResult, Credentials, Identity, RegisterAck,
};

/// Session intents translated to remote calls. The gateway keeps no
/// session state of its own; it only moves credentials and tokens.
/// Implemented by ApiClient, faked in session tests.
#[allow(async_fn_in_trait)]
pub trait AuthApi {
    async fn login(&self, credentials: &Credentials) -> ClientResult<Identity>;
    async fn register(&self, credentials: &Credentials) -> ClientResult<RegisterAck>;
    async fn current_user(&self) -> ClientResult<Option<Identity>>;
    /// Local only: purges the persisted token. Never a remote call.
    fn logout(&self) -> ClientResult<()>;
}

/// Pricing endpoints consumed by the calculation pipeline and history view.
#[allow(async_fn_in_trait)]
pub trait PricingApi {
    async fn calculate(&self, request: &CalculationRequest) -> ClientResult<CalculationResult>;
    async fn calculations(&self) -> ClientResult<Vec<CalculationRecord>>;
}
