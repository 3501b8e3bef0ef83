use serde::de::DeserializeOwned;
use tokio::sync::oneshot;

/// Terminal outcome reported back to the transport for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckNack {
    /// Message handled; consume it.
    Ack,
    /// Message failed unexpectedly; leave it to the transport's retry policy.
    Nack,
}

/// Exactly-once completion handle for an inbound request.
///
/// `ack` and `nack` consume the handle, so a handler physically cannot fire
/// both. A handle dropped without either (a panic or an early return) nacks,
/// so exactly one outcome always reaches the transport.
#[derive(Debug)]
pub struct Completion {
    tx: Option<oneshot::Sender<AckNack>>,
}

impl Completion {
    /// Create a handle and the receiver the transport waits on.
    pub fn new() -> (Self, oneshot::Receiver<AckNack>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// Mark the request successfully handled.
    pub fn ack(mut self) {
        self.finish(AckNack::Ack);
    }

    /// Mark the request failed.
    pub fn nack(mut self) {
        self.finish(AckNack::Nack);
    }

    fn finish(&mut self, outcome: AckNack) {
        if let Some(tx) = self.tx.take() {
            // The transport side may have gone away; nothing left to signal
            let _ = tx.send(outcome);
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        self.finish(AckNack::Nack);
    }
}

/// An extracted request: typed payload plus its completion handle.
#[derive(Debug)]
pub struct Delivery<T> {
    pub data: T,
    pub completion: Completion,
}

impl<T: DeserializeOwned> Delivery<T> {
    /// Deserialize an inbound request body into the expected payload shape.
    ///
    /// On malformed input the completion handle is handed back so the caller
    /// can nack and answer with a safe default.
    pub fn extract(payload: &[u8], completion: Completion) -> Result<Self, Completion> {
        match serde_json::from_slice(payload) {
            Ok(data) => Ok(Self { data, completion }),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to extract request payload");
                Err(completion)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_fires_once() {
        let (completion, mut rx) = Completion::new();
        completion.ack();
        assert_eq!(rx.try_recv().unwrap(), AckNack::Ack);
        // Channel is consumed; nothing further can arrive
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_nack_fires_once() {
        let (completion, mut rx) = Completion::new();
        completion.nack();
        assert_eq!(rx.try_recv().unwrap(), AckNack::Nack);
    }

    #[test]
    fn test_dropped_handle_nacks() {
        let (completion, mut rx) = Completion::new();
        drop(completion);
        assert_eq!(rx.try_recv().unwrap(), AckNack::Nack);
    }

    #[test]
    fn test_extract_valid_payload() {
        let (completion, _rx) = Completion::new();
        let delivery = Delivery::<Vec<u32>>::extract(b"[1,2,3]", completion).unwrap();
        assert_eq!(delivery.data, vec![1, 2, 3]);
    }

    #[test]
    fn test_extract_malformed_payload_returns_handle() {
        let (completion, mut rx) = Completion::new();
        let result = Delivery::<Vec<u32>>::extract(b"not json", completion);
        let completion = match result {
            Err(completion) => completion,
            Ok(_) => panic!("extract accepted malformed payload"),
        };
        completion.nack();
        assert_eq!(rx.try_recv().unwrap(), AckNack::Nack);
    }
}
