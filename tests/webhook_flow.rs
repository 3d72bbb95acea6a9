//! End-to-end webhook tests: real router, real clients, mocked upstreams.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use callbridge::{AppState, AssistantKeys, ServerConfig, routes};

const ACCOUNT_SID: &str = "AC00000000000000000000000000000000";

fn test_config(chat_url: &str, twilio_url: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        twilio_account_sid: ACCOUNT_SID.to_string(),
        twilio_auth_token: "auth-token".to_string(),
        twilio_phone_number: "+15550000000".to_string(),
        twilio_api_base_url: twilio_url.to_string(),
        chat_api_base_url: chat_url.to_string(),
        chat_request_timeout: Duration::from_secs(5),
        default_assistant_name: "Xpectrum Assistant".to_string(),
        assistant_keys: AssistantKeys {
            hrms: None,
            hospitality: None,
            default: Some("test-key".to_string()),
        },
    }
}

fn app(state: Arc<AppState>) -> Router {
    routes::create_router().with_state(state)
}

async fn post_form(app: &Router, uri: &str, body: &'static str) -> (StatusCode, String, String) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

/// Decode the `Twiml` form field of a captured live-update request.
fn twiml_of(request: &wiremock::Request) -> String {
    url::form_urlencoded::parse(&request.body)
        .find(|(name, _)| name == "Twiml")
        .map(|(_, value)| value.into_owned())
        .expect("live update carried no Twiml field")
}

/// Wait until the Twilio mock has received `count` requests.
async fn wait_for_requests(server: &MockServer, count: usize) -> Vec<wiremock::Request> {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let received = server.received_requests().await.unwrap_or_default();
        if received.len() >= count {
            return received;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "expected {count} upstream request(s), saw {}",
            received.len()
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn health_endpoint_confirms_service_is_up() {
    let state = AppState::new(test_config("http://127.0.0.1:9", "http://127.0.0.1:9")).unwrap();
    let response = app(state)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(String::from_utf8(body.to_vec()).unwrap(), "callbridge is running");
}

#[tokio::test]
async fn call_start_greets_and_opens_speech_prompt() {
    let state = AppState::new(test_config("http://127.0.0.1:9", "http://127.0.0.1:9")).unwrap();
    let (status, content_type, body) =
        post_form(&app(state), "/twilio-voice", "From=%2B15551234567").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "text/xml");
    assert!(body.contains("Welcome to the Xpectrum Assistant"));
    assert!(body.contains("<Gather input=\"speech\" action=\"/gather\""));
    assert!(body.contains("<Redirect>/twilio-voice</Redirect>"));
}

#[tokio::test]
async fn empty_speech_asks_the_caller_to_repeat_without_scheduling_work() {
    let chat = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat-messages"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&chat)
        .await;

    let state = AppState::new(test_config(&chat.uri(), "http://127.0.0.1:9")).unwrap();
    let (status, _, body) = post_form(
        &app(state),
        "/gather",
        "From=%2B15551234567&SpeechResult=&Confidence=0.0&CallSid=CA123",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Could you please repeat?"));
    assert!(body.contains("<Gather"));

    tokio::time::sleep(Duration::from_millis(100)).await;
    chat.verify().await;
}

#[tokio::test]
async fn missing_call_sid_apologizes_and_hangs_up() {
    let chat = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat-messages"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&chat)
        .await;

    let state = AppState::new(test_config(&chat.uri(), "http://127.0.0.1:9")).unwrap();
    let (status, _, body) = post_form(
        &app(state),
        "/gather",
        "From=%2B15551234567&SpeechResult=check%20my%20balance&Confidence=0.9",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("An internal error occurred"));
    assert!(body.contains("<Hangup/>"));
    assert!(!body.contains("<Gather"));

    tokio::time::sleep(Duration::from_millis(100)).await;
    chat.verify().await;
}

#[tokio::test]
async fn recognized_speech_holds_the_call_then_speaks_the_streamed_answer() {
    let chat = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat-messages"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            concat!(
                "data: {\"conversation_id\":\"conv_9\",\"answer\":\"Your balance \"}\n\n",
                "data: {\"conversation_id\":\"conv_9\",\"answer\":\"is $42.\"}\n\n",
            ),
            "text/event-stream",
        ))
        .expect(1)
        .mount(&chat)
        .await;

    let twilio = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!(
            "/2010-04-01/Accounts/{ACCOUNT_SID}/Calls/CA123.json"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&twilio)
        .await;

    let state = AppState::new(test_config(&chat.uri(), &twilio.uri())).unwrap();
    let (status, content_type, body) = post_form(
        &app(state.clone()),
        "/gather",
        "From=%2B15551234567&SpeechResult=check%20my%20balance&Confidence=0.9&CallSid=CA123",
    )
    .await;

    // The immediate response is the hold script, not the answer.
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "text/xml");
    assert!(body.contains("Okay, let me process that."));
    assert!(body.contains("<Pause length=\"45\"/>"));
    assert!(!body.contains("Your balance"));

    // The answer arrives out-of-band as a live call update.
    let requests = wait_for_requests(&twilio, 1).await;
    let update = &requests[0];
    let auth = update
        .headers
        .get("authorization")
        .expect("live update missing basic auth");
    assert!(auth.to_str().unwrap().starts_with("Basic "));

    let twiml = twiml_of(update);
    assert!(twiml.contains("<Say>Your balance is $42.</Say>"));
    assert!(twiml.contains("<Gather"));
    assert!(twiml.contains("Did you have another question?"));

    // Conversation continuity is recorded for the caller.
    assert_eq!(
        state.conversations.get("+15551234567").as_deref(),
        Some("conv_9")
    );
}

#[tokio::test]
async fn chat_api_failure_recovers_the_call_with_an_apology() {
    let chat = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat-messages"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&chat)
        .await;

    let twilio = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!(
            "/2010-04-01/Accounts/{ACCOUNT_SID}/Calls/CA123.json"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&twilio)
        .await;

    let state = AppState::new(test_config(&chat.uri(), &twilio.uri())).unwrap();
    let (status, _, body) = post_form(
        &app(state.clone()),
        "/gather",
        "From=%2B15551234567&SpeechResult=check%20my%20balance&Confidence=0.9&CallSid=CA123",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Okay, let me process that."));

    let requests = wait_for_requests(&twilio, 1).await;
    let twiml = twiml_of(&requests[0]);
    assert!(twiml.contains("an error occurred while processing"));
    assert!(twiml.contains("<Redirect>/twilio-voice</Redirect>"));

    // The failed exchange leaves no conversation id behind.
    assert_eq!(state.conversations.get("+15551234567"), None);
}

#[tokio::test]
async fn identical_events_are_not_deduplicated() {
    let chat = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat-messages"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "data: {\"conversation_id\":\"conv_1\",\"answer\":\"Again.\"}\n\n",
            "text/event-stream",
        ))
        .expect(2)
        .mount(&chat)
        .await;

    let twilio = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!(
            "/2010-04-01/Accounts/{ACCOUNT_SID}/Calls/CA123.json"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(2)
        .mount(&twilio)
        .await;

    let state = AppState::new(test_config(&chat.uri(), &twilio.uri())).unwrap();
    let router = app(state);
    let form = "From=%2B15551234567&SpeechResult=check%20my%20balance&Confidence=0.9&CallSid=CA123";

    post_form(&router, "/gather", form).await;
    post_form(&router, "/gather", form).await;

    wait_for_requests(&twilio, 2).await;
    chat.verify().await;
    twilio.verify().await;
}
