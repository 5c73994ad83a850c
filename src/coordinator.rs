// Submission coordinator: turns one submission into one request, sends it,
// and folds whatever comes back into the UI state.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::{ApiError, Summarizer, SummaryResult};
use crate::submission::{resolve_request, SubmissionInput, SummaryRequest};

/// How a single submission ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    Success(SummaryResult),
    /// The service answered but reported a failure in its `error` field.
    ServiceError(String),
    /// No usable response: network failure, unreadable or unexpected body.
    TransportFailure(String),
}

impl RequestOutcome {
    /// Message shown to the user; both failure kinds look the same.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            RequestOutcome::Success(_) => None,
            RequestOutcome::ServiceError(msg) | RequestOutcome::TransportFailure(msg) => Some(msg),
        }
    }
}

/// Map the result of one call onto an outcome.
pub fn normalize(response: Result<Value, ApiError>) -> RequestOutcome {
    let body = match response {
        Ok(body) => body,
        Err(e) => return RequestOutcome::TransportFailure(e.to_string()),
    };

    if let Some(message) = service_error(&body) {
        return RequestOutcome::ServiceError(message);
    }

    match serde_json::from_value::<SummaryResult>(body) {
        Ok(result) => RequestOutcome::Success(result),
        Err(e) => RequestOutcome::TransportFailure(format!("Unexpected response from service: {e}")),
    }
}

// Only a truthy error counts: null, false, zero and "" are ignored.
// Other non-string values are reported as their JSON text.
fn service_error(body: &Value) -> Option<String> {
    match body.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Perform exactly one call for `request`. No retries.
pub fn dispatch<S: Summarizer + ?Sized>(service: &S, request: &SummaryRequest) -> RequestOutcome {
    let outcome = normalize(service.summarize(request));
    match &outcome {
        RequestOutcome::Success(result) => {
            info!(kind = request.kind(), keywords = result.keywords.len(), "summary received")
        }
        RequestOutcome::ServiceError(msg) => warn!(kind = request.kind(), %msg, "service error"),
        RequestOutcome::TransportFailure(msg) => {
            warn!(kind = request.kind(), %msg, "transport failure")
        }
    }
    outcome
}

/// Sequence number handed out per dispatched submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// What the display should currently show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiStatus<'a> {
    Idle,
    Loading,
    Success(&'a SummaryResult),
    Error(&'a str),
}

#[derive(Debug, Default)]
pub struct Coordinator {
    issued: u64,
    loading: bool,
    outcome: Option<RequestOutcome>,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn outcome(&self) -> Option<&RequestOutcome> {
        self.outcome.as_ref()
    }

    /// The last successful result, if it is what is on screen.
    pub fn result(&self) -> Option<&SummaryResult> {
        match &self.outcome {
            Some(RequestOutcome::Success(result)) => Some(result),
            _ => None,
        }
    }

    pub fn status(&self) -> UiStatus<'_> {
        if self.loading {
            return UiStatus::Loading;
        }
        match &self.outcome {
            None => UiStatus::Idle,
            Some(RequestOutcome::Success(result)) => UiStatus::Success(result),
            Some(other) => UiStatus::Error(other.error_message().unwrap_or_default()),
        }
    }

    /// Enter Loading for a new submission. Any earlier result is dropped and
    /// any ticket issued before this one becomes stale.
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        self.loading = true;
        self.outcome = None;
        Ticket(self.issued)
    }

    /// Record the outcome for `ticket`. Returns false, leaving the state
    /// untouched, when a newer submission has been started since.
    pub fn finish(&mut self, ticket: Ticket, outcome: RequestOutcome) -> bool {
        if ticket.0 != self.issued {
            debug!(ticket = ticket.0, latest = self.issued, "discarding stale response");
            return false;
        }
        self.loading = false;
        self.outcome = Some(outcome);
        true
    }

    /// Resolve, send and record one submission.
    pub fn submit<S: Summarizer + ?Sized>(
        &mut self,
        service: &S,
        input: &SubmissionInput,
    ) -> UiStatus<'_> {
        let request = resolve_request(input);
        let ticket = self.begin();
        let outcome = dispatch(service, &request);
        self.finish(ticket, outcome);
        self.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::UploadFile;
    use serde_json::json;
    use std::cell::RefCell;

    /// Records every request and answers with a canned reply.
    struct MockService {
        reply: Box<dyn Fn() -> Result<Value, ApiError>>,
        seen: RefCell<Vec<SummaryRequest>>,
    }

    impl MockService {
        fn replying(body: Value) -> Self {
            MockService {
                reply: Box::new(move || Ok(body.clone())),
                seen: RefCell::new(Vec::new()),
            }
        }

        fn failing(raw: &'static str) -> Self {
            MockService {
                reply: Box::new(move || {
                    let source = serde_json::from_str::<Value>(raw).unwrap_err();
                    Err(ApiError::Malformed { status: 502, source })
                }),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl Summarizer for MockService {
        fn summarize(&self, request: &SummaryRequest) -> Result<Value, ApiError> {
            self.seen.borrow_mut().push(request.clone());
            (self.reply)()
        }
    }

    fn hello_result() -> SummaryResult {
        SummaryResult {
            summary: "hi".into(),
            highlighted: "hi".into(),
            keywords: vec!["hello".into()],
            original_length: None,
            summary_length: None,
        }
    }

    #[test]
    fn starts_idle() {
        let coordinator = Coordinator::new();
        assert_eq!(coordinator.status(), UiStatus::Idle);
        assert!(!coordinator.is_loading());
    }

    #[test]
    fn text_submission_succeeds() {
        let service = MockService::replying(json!({
            "summary": "hi",
            "highlighted": "hi",
            "keywords": ["hello"],
        }));
        let input = SubmissionInput {
            text: Some("hello world".into()),
            ..Default::default()
        };

        let mut coordinator = Coordinator::new();
        let status = coordinator.submit(&service, &input);
        let expected = hello_result();
        assert_eq!(status, UiStatus::Success(&expected));
        assert_eq!(coordinator.result().unwrap().keywords, vec!["hello".to_string()]);
        assert!(!coordinator.is_loading());

        let seen = service.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0].json_body(),
            Some(json!({ "text": "hello world" }))
        );
    }

    #[test]
    fn pdf_url_is_sent_alone() {
        let service = MockService::replying(json!({
            "summary": "s",
            "highlighted": "s",
            "keywords": [],
        }));
        let input = SubmissionInput {
            pdf_url: Some("http://x/doc.pdf".into()),
            ..Default::default()
        };
        Coordinator::new().submit(&service, &input);

        let seen = service.seen.borrow();
        assert_eq!(seen[0], SummaryRequest::PdfUrl("http://x/doc.pdf".into()));
        let body = seen[0].json_body().unwrap();
        assert_eq!(body, json!({ "pdfUrl": "http://x/doc.pdf" }));
        assert!(body.get("text").is_none());
    }

    #[test]
    fn file_submission_goes_out_as_upload() {
        let service = MockService::replying(json!({ "error": "unsupported file type" }));
        let file = UploadFile {
            file_name: "notes.docx".into(),
            bytes: vec![1, 2, 3],
        };
        let input = SubmissionInput {
            text: Some("x".into()),
            pdf_url: Some("http://x/doc.pdf".into()),
            file: Some(file.clone()),
        };
        Coordinator::new().submit(&service, &input);
        assert_eq!(service.seen.borrow()[0], SummaryRequest::Upload(file));
    }

    #[test]
    fn service_error_message_is_kept_verbatim() {
        let service = MockService::replying(json!({ "error": "unsupported file type" }));
        let mut coordinator = Coordinator::new();
        let status = coordinator.submit(&service, &SubmissionInput::default());

        assert_eq!(status, UiStatus::Error("unsupported file type"));
        assert_eq!(
            coordinator.outcome(),
            Some(&RequestOutcome::ServiceError("unsupported file type".into()))
        );
        assert!(!coordinator.is_loading());
    }

    #[test]
    fn transport_failure_clears_loading() {
        let service = MockService::failing("<html>bad gateway</html>");
        let mut coordinator = Coordinator::new();
        coordinator.submit(&service, &SubmissionInput::default());

        assert!(!coordinator.is_loading());
        match coordinator.outcome() {
            Some(RequestOutcome::TransportFailure(msg)) => assert!(msg.contains("HTTP 502")),
            other => panic!("expected transport failure, got {other:?}"),
        }
    }

    #[test]
    fn empty_or_null_error_is_not_a_failure() {
        let base = json!({ "summary": "s", "highlighted": "s", "keywords": ["k"] });
        for error in [json!(""), Value::Null, json!(false), json!(0), json!(0.0)] {
            let mut body = base.clone();
            body["error"] = error;
            assert!(matches!(normalize(Ok(body)), RequestOutcome::Success(_)));
        }
    }

    #[test]
    fn non_string_error_is_reported() {
        let outcome = normalize(Ok(json!({ "error": { "code": 7 } })));
        assert_eq!(outcome, RequestOutcome::ServiceError(r#"{"code":7}"#.into()));
        assert_eq!(
            normalize(Ok(json!({ "error": 3 }))),
            RequestOutcome::ServiceError("3".into())
        );
    }

    #[test]
    fn wrong_shape_is_a_transport_failure() {
        let outcome = normalize(Ok(json!({ "summary": 3 })));
        assert!(matches!(outcome, RequestOutcome::TransportFailure(_)));
    }

    #[test]
    fn begin_enters_loading_and_drops_old_result() {
        let mut coordinator = Coordinator::new();
        let first = coordinator.begin();
        coordinator.finish(first, RequestOutcome::Success(hello_result()));
        assert!(coordinator.result().is_some());

        coordinator.begin();
        assert_eq!(coordinator.status(), UiStatus::Loading);
        assert!(coordinator.result().is_none());
    }

    #[test]
    fn stale_responses_are_discarded() {
        let mut coordinator = Coordinator::new();
        let first = coordinator.begin();
        let second = coordinator.begin();
        assert!(first < second);

        assert!(coordinator.finish(second, RequestOutcome::ServiceError("newest".into())));
        assert!(!coordinator.finish(first, RequestOutcome::Success(hello_result())));
        assert_eq!(coordinator.status(), UiStatus::Error("newest"));

        // The older response arriving first must not end the loading state.
        let third = coordinator.begin();
        let fourth = coordinator.begin();
        assert!(!coordinator.finish(third, RequestOutcome::Success(hello_result())));
        assert!(coordinator.is_loading());
        assert!(coordinator.finish(fourth, RequestOutcome::TransportFailure("down".into())));
        assert_eq!(coordinator.status(), UiStatus::Error("down"));
    }
}
