#![cfg(not(feature = "twilio"))]

use std::collections::HashMap;
use std::sync::Arc;
use twilio_notify::notifier::UNAVAILABLE_REASON;
use twilio_notify::{ConfigSource, CredentialProfile, NotifierAdapter, NotifyError, TwilioSettings};

#[test]
fn test_load_refuses_without_client_library() {
    assert!(!sms_twilio::is_available());

    let source: Arc<dyn ConfigSource> = Arc::new(HashMap::<String, CredentialProfile>::new());

    match NotifierAdapter::load(&TwilioSettings::default(), source) {
        Err(NotifyError::Unavailable(reason)) => assert_eq!(reason, UNAVAILABLE_REASON),
        other => panic!("expected unavailable, got {:?}", other),
    }
}
