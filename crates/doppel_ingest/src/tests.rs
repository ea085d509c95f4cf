use crate::ingest::Ingestor;
use crate::linkedin::LinkedinProvider;
use crate::orchestrator::Orchestrator;
use crate::twitter::TwitterProvider;
use doppel_core::{Notifier, PersonaStore, Platform};
use doppel_store::SqliteStore;
use serde_json::json;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Captures toasts and navigations instead of presenting them.
#[derive(Default)]
struct RecordingNotifier {
    successes: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
    chats: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    fn successes(&self) -> Vec<String> {
        self.successes.lock().unwrap().clone()
    }

    fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    fn chats(&self) -> Vec<String> {
        self.chats.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.successes.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn open_chat(&self, persona_id: &str) {
        self.chats.lock().unwrap().push(persona_id.to_string());
    }
}

async fn memory_store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::new(":memory:").await.expect("store"))
}

fn twitter_ingestor(
    server: &MockServer,
    store: Arc<SqliteStore>,
    notifier: Arc<RecordingNotifier>,
    extra_rules: &str,
) -> Ingestor {
    let provider = TwitterProvider::new(&server.uri(), "mock-host", "mock-key").expect("provider");
    Ingestor::new(Arc::new(provider), store, notifier, extra_rules.to_string())
}

fn linkedin_ingestor(
    server: &MockServer,
    store: Arc<SqliteStore>,
    notifier: Arc<RecordingNotifier>,
) -> Ingestor {
    let provider = LinkedinProvider::new(&server.uri(), "mock-host", "mock-key").expect("provider");
    Ingestor::new(Arc::new(provider), store, notifier, String::new())
}

async fn mock_twitter_profile(server: &MockServer, handle: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/screenname.php"))
        .and(query_param("screenname", handle))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mock_twitter_timeline(server: &MockServer, handle: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/timeline.php"))
        .and(query_param("screenname", handle))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn persona_count(store: &SqliteStore) -> usize {
    store.list_page(None, 100).await.expect("list").records.len()
}

// ============================================================================
// Twitter adapter
// ============================================================================

#[tokio::test]
async fn test_twitter_end_to_end() {
    let server = MockServer::start().await;
    mock_twitter_profile(
        &server,
        "elonmusk",
        json!({
            "name": "Elon Musk",
            "desc": "bio",
            "avatar": "http://pbs.twimg.com/profile_images/x_normal.jpg",
            "sub_count": 1000
        }),
    )
    .await;
    mock_twitter_timeline(
        &server,
        "elonmusk",
        json!({
            "timeline": {
                "1": {"text": "hello world"},
                "2": {"text": "RT @nasa cool"},
                "3": {"text": "second tweet"}
            }
        }),
    )
    .await;

    let store = memory_store().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let ingestor = twitter_ingestor(&server, store.clone(), notifier.clone(), "");

    assert!(ingestor.ingest("@elonmusk").await);

    let record = store
        .find_by_username(Some(Platform::Twitter), "elonmusk")
        .await
        .expect("find")
        .expect("record present");
    assert_eq!(record.name, "Elon Musk");
    assert_eq!(record.username, "elonmusk");
    assert_eq!(record.sub_count, 1000);
    assert_eq!(record.avatar, "https://pbs.twimg.com/profile_images/x.jpg");
    assert!(record.desc.contains("hello world"));
    assert!(record.desc.contains("second tweet"));
    assert!(!record.desc.contains("RT @nasa"), "retweets must be dropped");
    assert!(record.chat_prompt.contains("You are Elon Musk AI"));
    assert!(record.chat_prompt.contains(&record.desc));
    assert!(!record.created_at.is_empty());

    assert_eq!(notifier.successes(), vec!["Profile saved successfully!"]);
    assert_eq!(notifier.chats(), vec![record.id]);
}

#[tokio::test]
async fn test_twitter_missing_identity_writes_nothing() {
    let server = MockServer::start().await;
    mock_twitter_profile(&server, "ghost", json!({"sub_count": 3})).await;

    let store = memory_store().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let ingestor = twitter_ingestor(&server, store.clone(), notifier.clone(), "");

    assert!(!ingestor.ingest("ghost").await);
    assert_eq!(persona_count(&store).await, 0);
    assert!(notifier.chats().is_empty());
}

#[tokio::test]
async fn test_twitter_error_status_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/screenname.php"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let store = memory_store().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let ingestor = twitter_ingestor(&server, store.clone(), notifier, "");

    assert!(!ingestor.ingest("ghost").await);
    assert_eq!(persona_count(&store).await, 0);
}

#[tokio::test]
async fn test_timeline_failure_equals_empty_timeline() {
    // Two servers, identical profiles; one timeline endpoint blows up, the
    // other returns no tweets. The stored outcome must be identical.
    let profile = json!({"name": "Ada", "desc": "bio", "avatar": "", "sub_count": 1});

    let failing = MockServer::start().await;
    mock_twitter_profile(&failing, "ada", profile.clone()).await;
    Mock::given(method("GET"))
        .and(path("/timeline.php"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&failing)
        .await;

    let empty = MockServer::start().await;
    mock_twitter_profile(&empty, "ada", profile).await;
    mock_twitter_timeline(&empty, "ada", json!({"timeline": {}})).await;

    let store_a = memory_store().await;
    let store_b = memory_store().await;
    let notifier = Arc::new(RecordingNotifier::default());

    assert!(twitter_ingestor(&failing, store_a.clone(), notifier.clone(), "")
        .ingest("ada")
        .await);
    assert!(twitter_ingestor(&empty, store_b.clone(), notifier, "")
        .ingest("ada")
        .await);

    let a = store_a
        .find_by_username(None, "ada")
        .await
        .expect("find")
        .expect("record");
    let b = store_b
        .find_by_username(None, "ada")
        .await
        .expect("find")
        .expect("record");
    assert_eq!(a.desc, b.desc);
    assert_eq!(a.chat_prompt, b.chat_prompt);
    assert_eq!(a.avatar, "/default-avatar.svg");
}

#[tokio::test]
async fn test_timeline_cap_and_filters() {
    let mut timeline = serde_json::Map::new();
    for i in 0..40 {
        timeline.insert(format!("{:03}", i), json!({"text": format!("tweet {}", i)}));
    }
    timeline.insert("900".to_string(), json!({"text": ""}));
    timeline.insert("901".to_string(), json!({"other": "no text field"}));

    let server = MockServer::start().await;
    mock_twitter_profile(&server, "prolific", json!({"name": "Prolific", "sub_count": 9})).await;
    mock_twitter_timeline(&server, "prolific", json!({ "timeline": timeline })).await;

    let store = memory_store().await;
    let notifier = Arc::new(RecordingNotifier::default());
    assert!(twitter_ingestor(&server, store.clone(), notifier, "")
        .ingest("prolific")
        .await);

    let record = store
        .find_by_username(None, "prolific")
        .await
        .expect("find")
        .expect("record");
    let tweet_lines = record
        .desc
        .lines()
        .filter(|l| l.starts_with("tweet "))
        .count();
    assert_eq!(tweet_lines, 30, "timeline is capped at 30 texts");
    // Missing bio falls back.
    assert!(record.desc.starts_with("No description available"));
}

#[tokio::test]
async fn test_existing_persona_short_circuits() {
    let server = MockServer::start().await;
    mock_twitter_profile(
        &server,
        "elonmusk",
        json!({"name": "Elon Musk", "desc": "bio", "avatar": "", "sub_count": 1000}),
    )
    .await;
    mock_twitter_timeline(&server, "elonmusk", json!({"timeline": {}})).await;

    let store = memory_store().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let ingestor = twitter_ingestor(&server, store.clone(), notifier.clone(), "");

    assert!(ingestor.ingest("@elonmusk").await);
    // Different raw spelling, same normalized handle: no second create.
    assert!(ingestor.ingest("  @ElonMusk ").await);

    assert_eq!(persona_count(&store).await, 1);
    let chats = notifier.chats();
    assert_eq!(chats.len(), 2);
    assert_eq!(chats[0], chats[1], "both navigations target the first-created id");
    assert_eq!(
        notifier.successes(),
        vec![
            "Profile saved successfully!",
            "Profile already exists, redirecting..."
        ]
    );
}

#[tokio::test]
async fn test_empty_handle_is_rejected_without_side_effects() {
    let server = MockServer::start().await;
    let store = memory_store().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let ingestor = twitter_ingestor(&server, store.clone(), notifier.clone(), "");

    assert!(!ingestor.ingest("").await);
    assert!(!ingestor.ingest("   @  ").await);
    assert_eq!(persona_count(&store).await, 0);
    assert!(notifier.successes().is_empty());
    assert!(notifier.errors().is_empty());
}

#[tokio::test]
async fn test_extra_rules_reach_stored_prompt() {
    let server = MockServer::start().await;
    mock_twitter_profile(&server, "ada", json!({"name": "Ada", "sub_count": 1})).await;
    mock_twitter_timeline(&server, "ada", json!({"timeline": {}})).await;

    let store = memory_store().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let rules = "- Always plug the analytical engine";
    assert!(twitter_ingestor(&server, store.clone(), notifier, rules)
        .ingest("ada")
        .await);

    let record = store
        .find_by_username(None, "ada")
        .await
        .expect("find")
        .expect("record");
    assert!(record.chat_prompt.contains(rules));
}

// ============================================================================
// LinkedIn adapter
// ============================================================================

#[tokio::test]
async fn test_linkedin_empty_sections_use_literal_fallbacks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile-data-connection-count-posts"))
        .and(query_param("username", "satya"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "firstName": "Satya",
                "lastName": "Nadella",
                "summary": "Leading things",
                "profilePicture": "",
                "position": [],
                "skills": []
            },
            "posts": [],
            "follower": 500,
            "connection": 300
        })))
        .mount(&server)
        .await;

    let store = memory_store().await;
    let notifier = Arc::new(RecordingNotifier::default());
    assert!(linkedin_ingestor(&server, store.clone(), notifier)
        .ingest("satya")
        .await);

    let record = store
        .find_by_username(Some(Platform::Linkedin), "satya")
        .await
        .expect("find")
        .expect("record");
    assert_eq!(record.name, "Satya Nadella");
    assert_eq!(record.avatar, "/default-avatar.svg");
    assert_eq!(record.sub_count, 500);
    assert_eq!(record.connection_count, Some(300));
    assert!(record.desc.contains("Positions: No positions available"));
    assert!(record.desc.contains("Skills: No skills available"));
    assert!(record.desc.contains("Recent Posts:\nNo recent posts available"));
    assert!(record.chat_prompt.contains("You are Satya Nadella, you must personify"));
}

#[tokio::test]
async fn test_linkedin_full_profile_derivations() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile-data-connection-count-posts"))
        .and(query_param("username", "ada"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "firstName": "Ada",
                "lastName": "Lovelace",
                "summary": "Mathematician",
                "profilePicture": "https://cdn.example.com/ada.jpg",
                "position": [
                    {"title": "Analyst", "companyName": "Babbage & Co",
                     "start": {"year": 1840}, "end": {"year": 1842}},
                    {"companyName": "Royal Society", "start": {}}
                ],
                "skills": [{"name": "Mathematics"}, {"name": ""}, {"name": "Poetry"}]
            },
            "posts": [{"text": "On the engine"}, {"text": ""}, {"text": "Notes, part II"}],
            "follower": 42,
            "connection": 7
        })))
        .mount(&server)
        .await;

    let store = memory_store().await;
    let notifier = Arc::new(RecordingNotifier::default());
    assert!(linkedin_ingestor(&server, store.clone(), notifier)
        .ingest("ada")
        .await);

    let record = store
        .find_by_username(None, "ada")
        .await
        .expect("find")
        .expect("record");
    assert_eq!(record.avatar, "https://cdn.example.com/ada.jpg");
    assert_eq!(record.profile, "Mathematician");
    assert!(record.desc.contains(
        "Positions: Analyst at Babbage & Co (1840 - 1842), \
         Unknown Title at Royal Society (N/A - Present)"
    ));
    assert!(record.desc.contains("Skills: Mathematics, Poetry"));
    assert!(record.desc.contains("Recent Posts:\nOn the engine\nNotes, part II"));
}

#[tokio::test]
async fn test_linkedin_missing_first_name_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile-data-connection-count-posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"lastName": "Ghost"},
            "posts": []
        })))
        .mount(&server)
        .await;

    let store = memory_store().await;
    let notifier = Arc::new(RecordingNotifier::default());
    assert!(!linkedin_ingestor(&server, store.clone(), notifier)
        .ingest("ghost")
        .await);
    assert_eq!(persona_count(&store).await, 0);
}

// ============================================================================
// Orchestrator
// ============================================================================

#[tokio::test]
async fn test_orchestrator_aggregate_failure_fires_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let store = memory_store().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let mut orchestrator = Orchestrator::new(notifier.clone());
    orchestrator.register(twitter_ingestor(&server, store.clone(), notifier.clone(), ""));
    orchestrator.register(linkedin_ingestor(&server, store.clone(), notifier.clone()));

    assert_eq!(orchestrator.create_persona("ghost").await, 0);
    assert_eq!(notifier.errors(), vec!["No profiles found for the given handle."]);
    assert_eq!(persona_count(&store).await, 0);
}

#[tokio::test]
async fn test_orchestrator_partial_success_is_silent() {
    // Twitter resolves, LinkedIn has nothing: the common acceptable case.
    let server = MockServer::start().await;
    mock_twitter_profile(&server, "ada", json!({"name": "Ada", "sub_count": 5})).await;
    mock_twitter_timeline(&server, "ada", json!({"timeline": {}})).await;
    Mock::given(method("GET"))
        .and(path("/profile-data-connection-count-posts"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let store = memory_store().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let mut orchestrator = Orchestrator::new(notifier.clone());
    orchestrator.register(twitter_ingestor(&server, store.clone(), notifier.clone(), ""));
    orchestrator.register(linkedin_ingestor(&server, store.clone(), notifier.clone()));

    assert_eq!(orchestrator.create_persona("@Ada").await, 1);
    assert!(notifier.errors().is_empty(), "partial success emits no aggregate error");
    assert_eq!(persona_count(&store).await, 1);
}

#[tokio::test]
async fn test_orchestrator_existing_persona_counts_as_success() {
    let server = MockServer::start().await;
    mock_twitter_profile(&server, "ada", json!({"name": "Ada", "sub_count": 5})).await;
    mock_twitter_timeline(&server, "ada", json!({"timeline": {}})).await;
    Mock::given(method("GET"))
        .and(path("/profile-data-connection-count-posts"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let store = memory_store().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let mut orchestrator = Orchestrator::new(notifier.clone());
    orchestrator.register(twitter_ingestor(&server, store.clone(), notifier.clone(), ""));
    orchestrator.register(linkedin_ingestor(&server, store.clone(), notifier.clone()));

    assert_eq!(orchestrator.create_persona("ada").await, 1);
    // Second run short-circuits on the existing record. The dedup check is
    // unscoped, so every provider reports the persona as available.
    assert_eq!(orchestrator.create_persona("ada").await, 2);
    assert!(notifier.errors().is_empty());
    assert_eq!(persona_count(&store).await, 1);
}
