//! # Signing Flows
//!
//! Credentials and the slicer used together the way a receiver would:
//! sign a payload, ship it in chunks, reassemble, then check the signature.

#[cfg(test)]
mod tests {
    use super::super::{init_test_logging, TEST_SECRET};
    use jupiter_broker::{join, BrokerError, Credentials, SignatureParts, Slicer, VerifyOptions};
    use jupiter_crypto::sha512_hex;
    use rand::seq::SliceRandom;

    fn credentials() -> Credentials {
        Credentials::new("ak", "tok", Some(TEST_SECRET)).unwrap()
    }

    #[test]
    fn test_sign_slice_shuffle_join_verify() {
        init_test_logging();
        let sender = credentials();
        let receiver = credentials();

        let payload = r#"{"order":42,"note":"größer als ✓","items":[1,2,3,4,5,6,7,8,9]}"#;
        let signature = sender.sign(payload).unwrap();

        let mut slicer = Slicer::new(payload, 7).unwrap();
        let mut chunks = slicer.slice().unwrap().to_vec();
        let digest = slicer.digest().unwrap().to_string();
        chunks.shuffle(&mut rand::thread_rng());

        let joined = join(&chunks, Some(&digest)).unwrap();
        assert_eq!(joined, payload);

        // Different instance, same secret.
        assert_ne!(sender.instance_id(), receiver.instance_id());
        assert!(receiver
            .verify(&joined, &signature, VerifyOptions::default())
            .unwrap());
    }

    #[test]
    fn test_tampered_chunk_never_reaches_verification() {
        let payload = "transfer 100 to alice";
        let mut slicer = Slicer::new(payload, 4).unwrap();
        let mut chunks = slicer.slice().unwrap().to_vec();

        chunks[2].value = "999 ".into();
        chunks[2].hash = sha512_hex("999 ");

        let err = join(&chunks, Some(slicer.digest().unwrap())).unwrap_err();
        assert!(matches!(err, BrokerError::IntegrityViolation { .. }));
    }

    #[test]
    fn test_stale_signature_rejected_after_window() {
        let credentials = credentials();
        let signature = credentials.sign("payload").unwrap();
        let signed_at = SignatureParts::parse(&signature)
            .and_then(|p| p.timestamp_ms())
            .unwrap();

        let at = |now: u64| VerifyOptions {
            timestamp: Some(now),
            timeout: Some(1_000),
        };

        assert!(credentials.verify("payload", &signature, at(signed_at + 1_000)).unwrap());
        assert!(!credentials.verify("payload", &signature, at(signed_at + 1_001)).unwrap());
    }

    #[test]
    fn test_merkle_root_identifies_payload() {
        let mut a = Slicer::new("the same payload", 5).unwrap();
        let mut b = Slicer::new("the same payload", 5).unwrap();
        let mut c = Slicer::new("the same paylaod", 5).unwrap();
        for slicer in [&mut a, &mut b, &mut c] {
            slicer.slice().unwrap();
        }

        assert_eq!(a.merkle_root().unwrap(), b.merkle_root().unwrap());
        assert_ne!(a.merkle_root().unwrap(), c.merkle_root().unwrap());
    }
}
