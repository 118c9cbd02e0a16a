use tutordesk_api::error::ApiError;

#[test]
fn backend_message_displays_verbatim() {
    let err = ApiError::Backend("Email already exists".into());
    assert_eq!(err.to_string(), "Email already exists");
    assert_eq!(err.user_message(), "Email already exists");
}

#[test]
fn other_variants_are_prefixed() {
    assert_eq!(
        ApiError::AuthFailed("nope".into()).to_string(),
        "authentication failed: nope"
    );
    assert_eq!(
        ApiError::Config("bad url".into()).user_message(),
        "invalid configuration: bad url"
    );
}

#[test]
fn serde_error_converts() {
    let err: ApiError = serde_json::from_str::<u32>("x").unwrap_err().into();
    assert!(matches!(err, ApiError::Serialization(_)));
}
