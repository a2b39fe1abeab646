use promptmock_core::PromptMockError;

#[test]
fn error_display_for_no_mock_response() {
    let err = PromptMockError::NoMockResponse {
        prompt: "Translate: hello".to_string(),
    };
    assert_eq!(
        format!("{err}"),
        "No mock response registered for prompt 'Translate: hello'"
    );
}

#[test]
fn error_display_for_empty_mock() {
    let err = PromptMockError::EmptyMock {
        prompt: "Hi".to_string(),
    };
    assert_eq!(format!("{err}"), "Mock for prompt 'Hi' has no outputs");
}

#[test]
fn error_display_for_invalid_config() {
    let err = PromptMockError::InvalidConfig("max_tokens must be positive".to_string());
    assert_eq!(
        format!("{err}"),
        "Invalid configuration: max_tokens must be positive"
    );
}

#[test]
fn error_display_for_fixture() {
    let err = PromptMockError::Fixture("no prompt.txt".to_string());
    assert_eq!(format!("{err}"), "Fixture loading failed: no prompt.txt");
}

#[test]
fn error_display_for_serde() {
    let parse_error = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
    let err = PromptMockError::Serde(parse_error);
    assert!(format!("{err}").starts_with("Serialization/deserialization error: "));
}

#[test]
fn error_display_for_custom() {
    let err = PromptMockError::Custom("something odd".to_string());
    assert_eq!(format!("{err}"), "something odd");
}
