use super::*;

fn raw(username: &str, message: &str) -> RawMessage {
    RawMessage {
        username: Some(username.to_string()),
        message: Some(message.to_string()),
        ..RawMessage::default()
    }
}

#[test]
fn fills_defaults_and_normalizes_color() {
    let cfg = RenderConfig::default();
    let mut r = raw("A", "Hello world");
    r.color = Some("FF0000".to_string());

    let msgs = validate_messages(&[r, raw("B", "hi")], &cfg).unwrap();
    assert_eq!(msgs[0].color, "#ff0000");
    assert_eq!(msgs[0].rgb, Rgb8::new(255, 0, 0));
    assert_eq!(msgs[0].timestamp, "");
    assert_eq!(msgs[0].avatar_url, None);
    assert_eq!(msgs[1].color, DEFAULT_COLOR);
}

#[test]
fn default_timestamp_comes_from_config() {
    let cfg = RenderConfig {
        default_timestamp: "Today at 12:00".to_string(),
        ..RenderConfig::default()
    };
    let mut with_ts = raw("A", "x");
    with_ts.timestamp = Some("Yesterday".to_string());

    let msgs = validate_messages(&[raw("A", "x"), with_ts], &cfg).unwrap();
    assert_eq!(msgs[0].timestamp, "Today at 12:00");
    assert_eq!(msgs[1].timestamp, "Yesterday");
}

#[test]
fn blank_avatar_url_counts_as_absent() {
    let cfg = RenderConfig::default();
    let mut r = raw("A", "x");
    r.avatar_url = Some("   ".to_string());
    assert_eq!(validate_message(0, &r, &cfg).unwrap().avatar_url, None);

    r.avatar_url = Some(" https://cdn.example/a.png ".to_string());
    assert_eq!(
        validate_message(0, &r, &cfg).unwrap().avatar_url.as_deref(),
        Some("https://cdn.example/a.png")
    );
}

#[test]
fn missing_or_empty_username_names_the_field() {
    let cfg = RenderConfig::default();
    let mut r = raw("A", "x");
    r.username = None;
    let err = validate_messages(&[raw("ok", "x"), r], &cfg).unwrap_err();
    assert!(err.to_string().contains("messages[1].username"));

    let err = validate_messages(&[raw("  ", "x")], &cfg).unwrap_err();
    assert!(err.to_string().contains("messages[0].username: must not be empty"));
}

#[test]
fn missing_body_is_rejected_but_empty_body_is_fine() {
    let cfg = RenderConfig::default();
    let mut r = raw("A", "x");
    r.message = None;
    let err = validate_message(3, &r, &cfg).unwrap_err();
    assert!(err.to_string().contains("messages[3].message: is required"));

    assert_eq!(validate_message(0, &raw("A", ""), &cfg).unwrap().body, "");
}

#[test]
fn body_length_counts_characters() {
    let cfg = RenderConfig {
        max_message_length: 3,
        ..RenderConfig::default()
    };
    assert!(validate_message(0, &raw("A", "ééé"), &cfg).is_ok());
    let err = validate_message(0, &raw("A", "abcd"), &cfg).unwrap_err();
    assert!(err.to_string().contains("exceeds maximum of 3"));
}

#[test]
fn bad_color_is_a_validation_error() {
    let cfg = RenderConfig::default();
    let mut r = raw("A", "x");
    r.color = Some("blurple".to_string());
    let err = validate_message(0, &r, &cfg).unwrap_err();
    assert!(err.is_client_error());
    assert!(err.to_string().contains("messages[0].color"));
}

#[test]
fn count_is_checked_before_records() {
    let cfg = RenderConfig {
        max_messages: 2,
        ..RenderConfig::default()
    };
    // The third record is invalid too, but the count limit wins.
    let msgs = vec![raw("A", "x"), raw("B", "y"), RawMessage::default()];
    let err = validate_messages(&msgs, &cfg).unwrap_err();
    assert!(matches!(
        err,
        ChatsnapError::TooManyMessages { count: 3, max: 2 }
    ));
}

#[test]
fn empty_request_is_rejected() {
    let err = validate_messages(&[], &RenderConfig::default()).unwrap_err();
    assert!(err.is_client_error());
}

#[test]
fn request_envelope_parsing() {
    let req = RenderRequest::from_json(
        br##"{"messages":[{"username":"A","message":"Hello world","color":"#ff0000"}]}"##,
    )
    .unwrap();
    assert_eq!(req.messages.len(), 1);
    assert_eq!(req.messages[0].username.as_deref(), Some("A"));

    let err = RenderRequest::from_json(br#"{"msgs":[]}"#).unwrap_err();
    assert!(err.to_string().contains("invalid request data"));
    assert!(RenderRequest::from_json(b"not json").is_err());
}
