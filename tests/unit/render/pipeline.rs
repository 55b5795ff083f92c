use super::*;
use crate::assets::fetch::AvatarFetchError;
use crate::foundation::error::ChatsnapError;
use crate::model::message::Message;
use crate::text::typeface::BlockFace;

struct NoFetch;

impl AvatarFetcher for NoFetch {
    fn fetch(&self, _url: &str) -> Result<Vec<u8>, AvatarFetchError> {
        Err(AvatarFetchError::Status(404))
    }
}

struct FailingBackend;

impl RenderBackend for FailingBackend {
    fn render(&self, _messages: &[Message], _config: &RenderConfig) -> ChatsnapResult<Vec<u8>> {
        Err(ChatsnapError::render("out of glyph cache"))
    }
}

fn raw(username: &str, message: &str) -> RawMessage {
    RawMessage {
        username: Some(username.to_string()),
        message: Some(message.to_string()),
        ..RawMessage::default()
    }
}

fn block_renderer() -> Renderer {
    Renderer::new(RenderConfig::default(), Arc::new(BlockFace), Arc::new(NoFetch)).unwrap()
}

#[test]
fn renderer_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Renderer>();
}

#[test]
fn invalid_config_is_rejected_on_construction() {
    let cfg = RenderConfig {
        canvas_width: 10,
        ..RenderConfig::default()
    };
    let err = Renderer::new(cfg, Arc::new(BlockFace), Arc::new(NoFetch)).unwrap_err();
    assert!(matches!(err, ChatsnapError::Config(_)));
    assert!(!err.is_client_error());
}

#[test]
fn render_produces_png() {
    let png = block_renderer().render(&[raw("A", "hello")]).unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn validation_error_is_client_error() {
    let err = block_renderer().render(&[raw("", "hello")]).unwrap_err();
    assert!(err.is_client_error());
    assert!(err.to_string().contains("messages[0].username"));
}

#[test]
fn backend_failure_is_hidden_behind_generic_message() {
    let r = Renderer::with_backend(RenderConfig::default(), Box::new(FailingBackend)).unwrap();
    let err = r.render(&[raw("A", "hello")]).unwrap_err();
    assert!(!err.is_client_error());
    assert_eq!(err.public_message(), "failed to generate image");
}

#[test]
fn render_json_rejects_malformed_body() {
    let err = block_renderer().render_json(b"{not json").unwrap_err();
    assert!(err.is_client_error());
}

#[test]
fn render_json_accepts_request_shape() {
    let body = br##"{"messages":[{"username":"A","message":"hi","color":"#00ff00"}]}"##;
    let png = block_renderer().render_json(body).unwrap();
    assert!(!png.is_empty());
}
