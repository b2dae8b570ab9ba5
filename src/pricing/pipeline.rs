use super::input::CalculationInput;
use crate::api::types::CalculationResult;
use crate::api::PricingApi;
use crate::errors::{ClientError, ClientResult};
use portable_atomic::{AtomicBool, Ordering};

/// View model for a priced option pair; no further transformation.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    pub call_option_price: f64,
    pub put_option_price: f64,
}

impl From<CalculationResult> for PriceQuote {
    fn from(result: CalculationResult) -> Self {
        Self {
            call_option_price: result.call_option_price,
            put_option_price: result.put_option_price,
        }
    }
}

/// Validates, converts and submits the pricing form. At most one
/// submission may be outstanding per pipeline instance.
pub struct CalculationPipeline<P: PricingApi> {
    api: P,
    busy: AtomicBool,
}

impl<P: PricingApi> CalculationPipeline<P> {
    pub fn new(api: P) -> Self {
        Self {
            api,
            busy: AtomicBool::new(false),
        }
    }

    /// Validate first, then submit. A second submission while one is
    /// outstanding is refused locally with Busy before any network work.
    /// The busy slot is released on every exit path, success or failure.
    pub async fn submit(&self, input: &CalculationInput) -> ClientResult<PriceQuote> {
        let request = input.validate()?;

        if self.busy.swap(true, Ordering::SeqCst) {
            return Err(ClientError::Busy);
        }
        let _slot = BusyGuard(&self.busy);

        let request_id = uuid::Uuid::new_v4();
        tracing::info!(
            %request_id,
            stock = request.stock_price,
            strike = request.strike_price,
            "submitting calculation"
        );

        match self.api.calculate(&request).await {
            Ok(result) => {
                tracing::info!(
                    %request_id,
                    call = result.call_option_price,
                    put = result.put_option_price,
                    "calculation priced"
                );
                Ok(PriceQuote::from(result))
            }
            Err(e) => {
                tracing::warn!(%request_id, error = %e, "calculation failed");
                Err(e)
            }
        }
    }
}

struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{CalculationRecord, CalculationRequest};
    use portable_atomic::AtomicU32;
    use std::sync::Arc;
    use tokio::sync::Notify;

    fn valid_input() -> CalculationInput {
        CalculationInput {
            stock_price: "100".into(),
            strike_price: "100".into(),
            time_to_maturity: "1".into(),
            risk_free_rate: "5".into(),
            dividend_yield: "2".into(),
            volatility: "20".into(),
        }
    }

    fn priced() -> CalculationResult {
        CalculationResult {
            id: Some(1),
            call_option_price: 10.4506,
            put_option_price: 5.5735,
            timestamp: None,
        }
    }

    /// Counts calls; each calculate waits until released.
    struct GatedApi {
        calls: AtomicU32,
        release: Notify,
        fail: bool,
    }

    impl GatedApi {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                release: Notify::new(),
                fail,
            })
        }
    }

    impl PricingApi for Arc<GatedApi> {
        async fn calculate(&self, _request: &CalculationRequest) -> ClientResult<CalculationResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            if self.fail {
                Err(ClientError::Network("connection reset".into()))
            } else {
                Ok(priced())
            }
        }

        async fn calculations(&self) -> ClientResult<Vec<CalculationRecord>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_network() {
        let api = GatedApi::new(false);
        let pipeline = CalculationPipeline::new(api.clone());

        let mut input = valid_input();
        input.stock_price = "oops".into();
        let err = pipeline.submit(&input).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn second_submission_is_refused_while_first_outstanding() {
        let api = GatedApi::new(false);
        let pipeline = Arc::new(CalculationPipeline::new(api.clone()));

        let first = {
            let pipeline = pipeline.clone();
            tokio::spawn(async move { pipeline.submit(&valid_input()).await })
        };
        while api.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        let second = pipeline.submit(&valid_input()).await;
        assert!(matches!(second, Err(ClientError::Busy)));
        // Exactly one network call was made
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);

        api.release.notify_one();
        let quote = first.await.unwrap().unwrap();
        assert_eq!(quote.call_option_price, 10.4506);
        assert_eq!(quote.put_option_price, 5.5735);
    }

    #[tokio::test]
    async fn busy_slot_is_released_after_failure() {
        let api = GatedApi::new(true);
        let pipeline = CalculationPipeline::new(api.clone());

        api.release.notify_one();
        let err = pipeline.submit(&valid_input()).await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));

        // Slot is free again: the retry reaches the network
        api.release.notify_one();
        let err = pipeline.submit(&valid_input()).await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
        assert_eq!(api.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn busy_slot_is_released_after_success() {
        let api = GatedApi::new(false);
        let pipeline = CalculationPipeline::new(api.clone());

        api.release.notify_one();
        pipeline.submit(&valid_input()).await.unwrap();
        api.release.notify_one();
        pipeline.submit(&valid_input()).await.unwrap();
        assert_eq!(api.calls.load(Ordering::SeqCst), 2);
    }
}
