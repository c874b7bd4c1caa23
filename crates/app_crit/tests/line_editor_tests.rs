//! Line editor and modal prompt against an in-memory server

use app_crit::{
    ApparatusClient, ClientConfig, ClientError, CsrfToken, Dialogs, EditorState, LineEditor,
    ModalHost, ModalPrompt, RecordingTransport, Response,
};
use doc_model::{DocumentTree, Selection};
use edit_engine::plugins::{FootnotePlugin, PromptKind, PromptRequest};
use edit_engine::EditingEngine;
use std::sync::Mutex;
use std::time::Duration;

struct RecordingDialogs {
    accept: bool,
    alerts: Mutex<Vec<String>>,
    confirms: Mutex<Vec<String>>,
}

impl RecordingDialogs {
    fn answering(accept: bool) -> Self {
        Self {
            accept,
            alerts: Mutex::new(Vec::new()),
            confirms: Mutex::new(Vec::new()),
        }
    }

    fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }
}

impl Dialogs for RecordingDialogs {
    async fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }

    async fn confirm(&self, message: &str) -> bool {
        self.confirms.lock().unwrap().push(message.to_string());
        self.accept
    }
}

fn rendered(html: &str) -> Response {
    Response::ok(serde_json::json!({ "status": 200, "html": html }).to_string())
}

fn client() -> ApparatusClient<RecordingTransport> {
    ApparatusClient::new(
        RecordingTransport::new(),
        ClientConfig::default(),
        CsrfToken::from_page(r#"<input type="hidden" name="csrfmiddlewaretoken" value="s3cret">"#)
            .unwrap(),
    )
}

fn editor(accept: bool) -> LineEditor<RecordingTransport, RecordingDialogs> {
    LineEditor::new(client(), RecordingDialogs::answering(accept), 12, "<div>v0</div>")
}

#[tokio::test]
async fn new_line_submission_replaces_builder() {
    let editor = editor(true);
    editor.client().transport().respond(rendered("<div>v1</div>"));

    assert!(editor.show_new_line_form(3));
    let html = editor.submit_new_line("<i>add.</i> B").await.unwrap();
    assert_eq!(html.as_deref(), Some("<div>v1</div>"));
    assert_eq!(editor.state(), EditorState::Idle);
    assert_eq!(editor.builder_html(), "<div>v1</div>");

    let request = &editor.client().transport().requests()[0];
    assert_eq!(request.header_value("X-CSRFToken"), Some("s3cret"));
    assert_eq!(request.header_value("X-Requested-With"), Some("XMLHttpRequest"));
}

#[tokio::test]
async fn declined_delete_sends_nothing() {
    let editor = editor(false);
    assert_eq!(editor.delete_line(0, 5).await.unwrap(), None);
    assert!(editor.client().transport().requests().is_empty());
    assert_eq!(
        editor.dialogs().confirms.lock().unwrap().as_slice(),
        ["Are you sure you want to delete this line? This cannot be undone."]
    );
}

#[tokio::test]
async fn failed_save_alerts_and_keeps_line_open() {
    let editor = editor(true);
    editor.client().transport().respond(Response::with_status(500, ""));
    editor.begin_edit(4, "orig");

    let err = editor.save("changed").await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 500, .. }));
    assert_eq!(editor.dialogs().alerts(), vec!["Sorry, an error occurred."]);
    assert!(matches!(editor.state(), EditorState::Editing { line_id: 4, .. }));
    assert_eq!(editor.builder_html(), "<div>v0</div>");

    assert_eq!(editor.cancel().as_deref(), Some("orig"));
}

#[tokio::test]
async fn transport_failure_alerts() {
    let editor = editor(true);
    editor.client().transport().fail("connection refused");

    let err = editor.delete_line(1, 8).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
    assert_eq!(editor.dialogs().alerts().len(), 1);
}

#[tokio::test]
async fn superseded_response_is_discarded() {
    let editor = editor(true);
    let transport = editor.client().transport();
    transport.respond_after(rendered("<div>from save</div>"), Duration::from_millis(30));
    transport.respond(rendered("<div>from delete</div>"));
    editor.begin_edit(4, "orig");

    let (saved, deleted) = tokio::join!(editor.save("changed"), editor.delete_line(0, 9));

    assert!(matches!(saved, Err(ClientError::Stale)));
    assert_eq!(deleted.unwrap().as_deref(), Some("<div>from delete</div>"));
    assert_eq!(editor.builder_html(), "<div>from delete</div>");
    // The save went through, so the line is no longer open
    assert_eq!(editor.state(), EditorState::Idle);
    assert!(editor.toggle_visible(5));
    // Stale responses are not failures
    assert!(editor.dialogs().alerts().is_empty());
}

struct TypedHost {
    answer: Option<&'static str>,
    shown: Mutex<Vec<(String, PromptRequest)>>,
}

impl ModalHost for TypedHost {
    async fn show(&self, template: &str, request: &PromptRequest) -> Option<String> {
        self.shown
            .lock()
            .unwrap()
            .push((template.to_string(), request.clone()));
        self.answer.map(str::to_string)
    }
}

#[tokio::test]
async fn modal_prompt_drives_footnote_insertion() {
    let client = client();
    client.transport().respond(Response::ok("<div id=\"modal\"></div>"));
    let host = TypedHost {
        answer: Some("cf. fr. 12"),
        shown: Mutex::new(Vec::new()),
    };
    let plugin = FootnotePlugin::new(ModalPrompt::new(client, host));
    let mut engine = EditingEngine::with_tree(DocumentTree::from_text("lorem ipsum"));
    engine.set_selection(Some(Selection::collapsed(5)));

    let fid = plugin.insert_footnote(&mut engine).await.unwrap();
    assert!(fid.is_some());
    assert_eq!(
        engine.tree().notes_area.as_ref().unwrap().entries()[0].display_text(),
        "1. cf. fr. 12"
    );

    let shown = plugin.prompt().host().shown.lock().unwrap().clone();
    assert_eq!(shown[0].0, "<div id=\"modal\"></div>");
    assert_eq!(shown[0].1.kind, PromptKind::Footnote);
}

#[tokio::test]
async fn modal_fetch_failure_cancels_prompt() {
    let client = client();
    client.transport().respond(Response::with_status(503, ""));
    let host = TypedHost {
        answer: Some("never shown"),
        shown: Mutex::new(Vec::new()),
    };
    let plugin = FootnotePlugin::new(ModalPrompt::new(client, host));
    let mut engine = EditingEngine::with_tree(DocumentTree::from_text("lorem"));
    engine.set_selection(Some(Selection::collapsed(2)));

    assert_eq!(plugin.insert_footnote(&mut engine).await.unwrap(), None);
    assert_eq!(engine.tree().footnote_count(), 0);
    assert!(plugin.prompt().host().shown.lock().unwrap().is_empty());
}
