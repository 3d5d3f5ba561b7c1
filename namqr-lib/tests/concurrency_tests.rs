//! Concurrency tests for NamqrCodec
//!
//! These tests verify that a single codec can be shared across tasks
//! without locking and that every task sees the same results.

#[cfg(test)]
mod concurrency_tests {
    use namqr_lib::{AccountType, InitiationMethod, NamqrCodec, NamqrError, PaymentIntent};
    use std::sync::Arc;
    use tokio::task::JoinSet;

    fn intent(index: usize) -> PaymentIntent {
        PaymentIntent::builder()
            .initiation_method(InitiationMethod::Dynamic)
            .account_type(AccountType::BuffrWallet)
            .identifier(format!("26481{index:07}@buffr"))
            .amount(format!("{}.50", index + 1))
            .build()
            .unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_decodes_agree() {
        let codec = Arc::new(NamqrCodec::default());
        let payload = codec.encode(&intent(7)).unwrap();
        let expected = codec.decode(&payload).unwrap();
        let mut tasks = JoinSet::new();

        for _ in 0..100 {
            let codec = Arc::clone(&codec);
            let payload = payload.clone();
            tasks.spawn(async move { codec.decode(&payload) });
        }

        let mut decoded = 0;
        while let Some(result) = tasks.join_next().await {
            assert_eq!(result.unwrap().unwrap(), expected);
            decoded += 1;
        }
        assert_eq!(decoded, 100, "All tasks should decode the payload");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_round_trips() {
        let codec = Arc::new(NamqrCodec::default());
        let mut tasks = JoinSet::new();

        // Each task encodes and decodes its own intent
        for index in 0..100 {
            let codec = Arc::clone(&codec);
            tasks.spawn(async move {
                let original = intent(index);
                let payload = codec.encode(&original)?;
                let decoded = codec.decode(&payload)?;
                Ok::<_, NamqrError>((original, decoded))
            });
        }

        while let Some(result) = tasks.join_next().await {
            let (original, decoded) = result.unwrap().unwrap();
            assert_eq!(original, decoded);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_rejections_agree() {
        let codec = Arc::new(NamqrCodec::default());
        let mut tasks = JoinSet::new();

        // Mix of valid and tampered payloads
        let valid = codec.encode(&intent(1)).unwrap();
        let tampered = valid.replace("2.50", "9.50");

        for index in 0..200 {
            let codec = Arc::clone(&codec);
            let payload = if index % 2 == 0 { valid.clone() } else { tampered.clone() };
            tasks.spawn(async move { (index, codec.decode(&payload)) });
        }

        while let Some(result) = tasks.join_next().await {
            let (index, outcome) = result.unwrap();
            if index % 2 == 0 {
                assert!(outcome.is_ok());
            } else {
                assert!(matches!(outcome, Err(NamqrError::ChecksumMismatch { .. })));
            }
        }
    }
}
