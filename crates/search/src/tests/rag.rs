//! Answer and translation orchestration against a mock generation client.

use crate::config::SearchConfig;
use crate::conversation::{ConversationTurn, ConversationWindow, Role, SessionRegistry};
use crate::corpus::{Citation, Collection, Corpus, Passage, SearchFilter};
use crate::engine::SearchEngine;
use crate::lexicon::Lexicon;
use crate::rag::{ask, translate, AskOptions};
use crate::types::Query;
use sefer_core::{AppError, AppResult};
use sefer_llm::{LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage};
use sefer_prompt::{load_prompt, ANSWER_PROMPT_ID, TRANSLATE_PROMPT_ID};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Records every request and answers with a fixed reply.
struct MockClient {
    reply: String,
    fail: bool,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockClient {
    fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new("")
        }
    }

    fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, request: &LlmRequest) -> AppResult<()> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(AppError::Llm("service unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl LlmClient for MockClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.record(request)?;
        Ok(LlmResponse {
            content: self.reply.clone(),
            model: request.model.clone(),
            usage: LlmUsage::new(100, 20),
            done: true,
        })
    }

    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream> {
        self.record(request)?;
        let (head, tail) = self.reply.split_at(self.reply.len() / 2);
        let chunks = vec![
            Ok(LlmStreamChunk {
                content: head.to_string(),
                model: request.model.clone(),
                done: false,
                usage: None,
            }),
            Ok(LlmStreamChunk {
                content: tail.to_string(),
                model: request.model.clone(),
                done: true,
                usage: Some(LlmUsage::new(100, 20)),
            }),
        ];
        Ok(Box::pin(futures::stream::iter(chunks)))
    }
}

fn engine() -> SearchEngine {
    let passages = vec![
        Passage::new(
            "maamarim.json#1",
            Collection::Discourse,
            format!("ענין ביטול היש {}", "ו".repeat(1500)),
            Citation {
                title: "ספר המאמרים".to_string(),
                author: Some("אדמו״ר הזקן".to_string()),
                subsection: Some("באתי לגני".to_string()),
                ..Default::default()
            },
        ),
        Passage::new(
            "tanya.json#35",
            Collection::Treatise,
            "צמצום והתלבשות",
            Citation {
                title: "תניא".to_string(),
                section: Some("פרק לה".to_string()),
                ..Default::default()
            },
        ),
    ];
    SearchEngine::new(
        Arc::new(Corpus::new(passages).unwrap()),
        Arc::new(Lexicon::builtin()),
        SearchConfig::default(),
    )
}

fn answer_options() -> AskOptions {
    let prompt = load_prompt(Path::new("/nonexistent-workspace"), ANSWER_PROMPT_ID).unwrap();
    AskOptions::new("test-model", prompt)
}

#[tokio::test]
async fn test_ask_renders_sources_and_records_turns() {
    let engine = engine();
    let client = MockClient::new("ביטול היש הוא...");
    let mut window = ConversationWindow::default();

    let response = ask(
        &engine,
        &client,
        &Query::new("what is bittul hayesh?"),
        &mut window,
        &answer_options(),
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(response.answer, "ביטול היש הוא...");
    assert!(response.generated);
    assert_eq!(response.sources.len(), 1);
    assert_eq!(response.sources[0].id, "maamarim.json#1");
    // Returned sources keep the whole passage
    assert!(response.sources[0].text.chars().count() > 1500);
    assert_eq!(response.context_turns, 2);

    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.model, "test-model");
    assert_eq!(request.max_tokens, Some(4000));
    assert!(request.system.as_deref().unwrap_or("").contains("Chabad"));
    assert!(request.prompt.contains("what is bittul hayesh?"));
    assert!(request.prompt.contains("ד״ה באתי לגני"));
    assert!(request.prompt.contains("אדמו״ר הזקן"));
    // Prompt copy is cut to 1000 characters
    assert!(request.prompt.contains("ווו..."));

    let turns = window.snapshot();
    assert_eq!(turns[0], ConversationTurn::user("what is bittul hayesh?"));
    assert_eq!(turns[1].role, Role::Assistant);
}

#[tokio::test]
async fn test_ask_includes_earlier_turns() {
    let engine = engine();
    let client = MockClient::new("answer");
    let mut window = ConversationWindow::default();
    window.append(ConversationTurn::user("מהו צמצום"));
    window.append(ConversationTurn::assistant("צמצום הוא הסתלקות האור"));

    ask(
        &engine,
        &client,
        &Query::new("tzimtzum"),
        &mut window,
        &answer_options(),
        |_| {},
    )
    .await
    .unwrap();

    let prompt = client.requests()[0].prompt.clone();
    assert!(prompt.contains("Conversation so far:"));
    assert!(prompt.contains("User: מהו צמצום"));
    assert!(prompt.contains("Assistant: צמצום הוא הסתלקות האור"));
    assert_eq!(window.len(), 4);
}

#[tokio::test]
async fn test_ask_passes_additional_context() {
    let engine = engine();
    let client = MockClient::new("answer");
    let mut options = answer_options();
    options.context = Some("  focus on the Alter Rebbe's discourses ".to_string());

    ask(
        &engine,
        &client,
        &Query::new("tzimtzum"),
        &mut ConversationWindow::default(),
        &options,
        |_| {},
    )
    .await
    .unwrap();

    let prompt = client.requests()[0].prompt.clone();
    assert!(prompt.contains("Additional context: focus on the Alter Rebbe's discourses\n"));

    // Without context the line is left out
    let plain = MockClient::new("answer");
    ask(
        &engine,
        &plain,
        &Query::new("tzimtzum"),
        &mut ConversationWindow::default(),
        &answer_options(),
        |_| {},
    )
    .await
    .unwrap();
    assert!(!plain.requests()[0].prompt.contains("Additional context"));
}

#[tokio::test]
async fn test_ask_respects_filter() {
    let engine = engine();
    let client = MockClient::new("answer");
    let query = Query::new("ביטול היש").with_filter(SearchFilter {
        collection: Some(Collection::Treatise),
        ..Default::default()
    });

    let response = ask(
        &engine,
        &client,
        &query,
        &mut ConversationWindow::default(),
        &answer_options(),
        |_| {},
    )
    .await
    .unwrap();

    // The only match is a discourse, so nothing is left to answer from
    assert!(!response.generated);
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn test_ask_without_results_skips_generation() {
    let engine = engine();
    let client = MockClient::new("unused");
    let mut window = ConversationWindow::default();

    let response = ask(
        &engine,
        &client,
        &Query::new("Baal Shem Tov"),
        &mut window,
        &answer_options(),
        |_| {},
    )
    .await
    .unwrap();

    assert!(!response.generated);
    assert!(response.sources.is_empty());
    assert!(response.answer.contains("Baal Shem Tov"));
    assert!(client.requests().is_empty());
    assert_eq!(window.len(), 2);
    assert_eq!(window.snapshot()[1].text, response.answer);
}

#[tokio::test]
async fn test_ask_streams_through_callback() {
    let engine = engine();
    let client = MockClient::new("streamed answer");
    let mut window = ConversationWindow::default();
    let mut options = answer_options();
    options.stream = true;
    options.temperature = Some(0.1);

    let mut pieces = Vec::new();
    let response = ask(
        &engine,
        &client,
        &Query::new("צמצום"),
        &mut window,
        &options,
        |text| pieces.push(text.to_string()),
    )
    .await
    .unwrap();

    assert_eq!(pieces.concat(), "streamed answer");
    assert_eq!(response.answer, "streamed answer");
    assert_eq!(response.usage.map(|u| u.total_tokens), Some(120));

    let request = &client.requests()[0];
    assert!(request.stream);
    assert_eq!(request.temperature, Some(0.1));
}

#[tokio::test]
async fn test_ask_failure_keeps_user_turn() {
    let engine = engine();
    let client = MockClient::failing();
    let mut window = ConversationWindow::default();

    let result = ask(
        &engine,
        &client,
        &Query::new("צמצום"),
        &mut window,
        &answer_options(),
        |_| {},
    )
    .await;

    assert!(matches!(result, Err(AppError::Llm(_))));
    assert_eq!(window.snapshot(), vec![ConversationTurn::user("צמצום")]);
}

#[tokio::test]
async fn test_sessions_do_not_share_windows() {
    let engine = Arc::new(engine());
    let client = Arc::new(MockClient::new("answer"));
    let registry = Arc::new(SessionRegistry::default());

    let mut tasks = Vec::new();
    for session in ["alice", "bob"] {
        let (engine, client, registry) = (engine.clone(), client.clone(), registry.clone());
        tasks.push(tokio::spawn(async move {
            let handle = registry.session(session).await;
            let mut window = handle.lock().await;
            ask(
                &engine,
                client.as_ref(),
                &Query::new(format!("צמצום {}", session)),
                &mut window,
                &answer_options(),
                |_| {},
            )
            .await
            .map(|_| ())
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    for session in ["alice", "bob"] {
        let handle = registry.session(session).await;
        let window = handle.lock().await;
        assert_eq!(window.len(), 2);
        assert!(window.snapshot()[0].text.ends_with(session));
    }
}

#[tokio::test]
async fn test_translate_passage() {
    let engine = engine();
    let client = MockClient::new("Contraction and investment");
    let prompt = load_prompt(Path::new("/nonexistent-workspace"), TRANSLATE_PROMPT_ID).unwrap();
    let passage = engine.corpus().get("tanya.json#35").unwrap();

    let response = translate(&client, "test-model", &prompt, passage, "English")
        .await
        .unwrap();

    assert_eq!(response.translation, "Contraction and investment");
    assert_eq!(response.passage_id, "tanya.json#35");

    let request = &client.requests()[0];
    assert!(request.prompt.contains("צמצום והתלבשות"));
    assert!(request.prompt.contains("לEnglish"));
    assert_eq!(request.temperature, Some(0.2));
}
