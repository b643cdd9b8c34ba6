use anyhow::{anyhow, Result};
use assistleg::{
    agent::AgentFactory,
    errors::AgentError,
    executor::{Grounding, TurnOutcome, APOLOGY_MESSAGE},
    memory::ConversationStore,
    models::{message::Message, role::Role, turn::Turn},
    providers::base::{Provider, Usage},
    retrieval::{HttpRetrieverSource, Retriever, RetrieverSource, SearchParams, TopicCatalog},
};
use async_trait::async_trait;
use indoc::indoc;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOPIC: &str = "codigo_trabajo_vs";

/// Answers from a script and keeps every message sequence it was sent
#[derive(Default)]
struct ScriptedModel {
    replies: Mutex<Vec<Result<String, String>>>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedModel {
    fn replying(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| Ok(r.to_string())).collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedModel {
    async fn complete(&self, messages: &[Message]) -> Result<(Message, Usage)> {
        self.requests.lock().unwrap().push(messages.to_vec());
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Err(anyhow!("model unavailable"));
        }
        match replies.remove(0) {
            Ok(text) => Ok((Message::assistant().with_text(text), Usage::default())),
            Err(e) => Err(anyhow!(e)),
        }
    }
}

struct FixedRetriever(Result<Value, String>);

#[async_trait]
impl Retriever for FixedRetriever {
    async fn retrieve(&self, _query: &str) -> Result<Value> {
        self.0.clone().map_err(|e| anyhow!(e))
    }
}

struct FixedSource(Result<Value, String>);

impl RetrieverSource for FixedSource {
    fn open(
        &self,
        _topic: &str,
        _index_dir: &Path,
    ) -> assistleg::errors::AgentResult<Arc<dyn Retriever>> {
        Ok(Arc::new(FixedRetriever(self.0.clone())))
    }
}

fn topic_root() -> tempfile::TempDir {
    let root = tempfile::tempdir().unwrap();
    std::fs::create_dir(root.path().join(TOPIC)).unwrap();
    root
}

fn factory(root: &Path, model: Arc<ScriptedModel>, source: Arc<dyn RetrieverSource>) -> AgentFactory {
    AgentFactory::new(model, TopicCatalog::new(root, source))
        .unwrap()
        .with_store(Arc::new(ConversationStore::new()))
}

#[tokio::test]
async fn test_triggered_question_is_grounded() {
    let root = topic_root();
    let model = ScriptedModel::replying(&["El empleador debe pagar el salario y dar seguridad."]);
    let source = Arc::new(FixedSource(Ok(json!({
        "documents": [
            {"page_content": "ARTÍCULO 57. OBLIGACIONES ESPECIALES DEL EMPLEADOR."},
            {"page_content": "4. Pagar la remuneración pactada."}
        ]
    }))));
    let agent = factory(root.path(), model.clone(), source).build(TOPIC).unwrap();

    let outcome = agent
        .ask("web_user_1", "¿Cuáles son las obligaciones del empleador?")
        .await;

    assert_eq!(outcome.grounding(), Some(Grounding::Retrieved));
    assert_eq!(
        outcome.text(),
        "El empleador debe pagar el salario y dar seguridad."
    );

    let requests = model.requests();
    assert_eq!(requests.len(), 1);
    let sent = &requests[0];
    assert_eq!(sent.len(), 3, "instructions, context and question");
    assert_eq!(sent[1].role, Role::System);
    assert_eq!(
        sent[1].text(),
        indoc! {"
            ARTÍCULO 57. OBLIGACIONES ESPECIALES DEL EMPLEADOR.
            4. Pagar la remuneración pactada."}
    );
}

#[tokio::test]
async fn test_second_question_sees_first_exchange() {
    let root = topic_root();
    let model = ScriptedModel::replying(&[
        "Debe pagar el salario pactado.",
        "En resumen: pagar el salario.",
    ]);
    let source = Arc::new(FixedSource(Ok(json!("Artículo 57."))));
    let agent = factory(root.path(), model.clone(), source).build(TOPIC).unwrap();

    agent
        .invoke("test123", "¿Cuáles son las obligaciones principales del empleador según la ley?")
        .await;
    let second = agent
        .invoke("test123", "¿Puedes resumir lo que acabas de explicar?")
        .await;

    assert_eq!(second, "En resumen: pagar el salario.");

    let requests = model.requests();
    // The summary question has no trigger word: no context message
    assert_eq!(requests[1].len(), 2);
    let user_turn = requests[1][1].text();
    assert!(user_turn.contains(
        "User: ¿Cuáles son las obligaciones principales del empleador según la ley?"
    ));
    assert!(user_turn.contains("Assistant: Debe pagar el salario pactado."));
    assert!(user_turn.ends_with("Pregunta: ¿Puedes resumir lo que acabas de explicar?"));
}

#[tokio::test]
async fn test_sessions_do_not_leak() {
    let root = topic_root();
    let model = ScriptedModel::replying(&["Respuesta A", "Respuesta B"]);
    let source = Arc::new(FixedSource(Ok(json!(null))));
    let agent = factory(root.path(), model.clone(), source).build(TOPIC).unwrap();

    agent.invoke("ana", "Hola, soy Ana").await;
    agent.invoke("luis", "Hola, soy Luis").await;

    assert!(!model.requests()[1][1].text().contains("Ana"));
    assert_eq!(
        agent.history("luis").await,
        vec![Turn::user("Hola, soy Luis"), Turn::assistant("Respuesta B")]
    );
}

#[tokio::test]
async fn test_agents_share_the_factory_store() {
    let root = topic_root();
    let model = ScriptedModel::replying(&["uno", "dos"]);
    let source: Arc<dyn RetrieverSource> = Arc::new(FixedSource(Ok(json!(""))));
    let factory = factory(root.path(), model.clone(), source);

    factory.build(TOPIC).unwrap().invoke("s", "primera").await;
    let rebuilt = factory.build(TOPIC).unwrap();
    rebuilt.invoke("s", "segunda").await;

    assert_eq!(rebuilt.history("s").await.len(), 4);
}

#[tokio::test]
async fn test_model_failure_is_an_apology() {
    let root = topic_root();
    let model = ScriptedModel::replying(&[]);
    let source = Arc::new(FixedSource(Ok(json!("Artículo 22."))));
    let agent = factory(root.path(), model, source).build(TOPIC).unwrap();

    let outcome = agent.ask("s", "¿Qué es un contrato de trabajo?").await;

    assert_eq!(outcome, TurnOutcome::Failed);
    assert_eq!(outcome.text(), APOLOGY_MESSAGE);
}

#[tokio::test]
async fn test_unreachable_retrieval_service_degrades() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/retrieve"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&mock_server)
        .await;

    let root = topic_root();
    let model = ScriptedModel::replying(&["Un contrato es un acuerdo de voluntades."]);
    let source = Arc::new(HttpRetrieverSource::new(
        mock_server.uri(),
        SearchParams::default(),
    ));
    let agent = factory(root.path(), model.clone(), source).build(TOPIC).unwrap();

    let outcome = agent.ask("s", "¿Qué es un contrato?").await;

    assert_eq!(outcome.grounding(), Some(Grounding::Unavailable));
    assert_eq!(outcome.text(), "Un contrato es un acuerdo de voluntades.");
    assert_eq!(model.requests()[0].len(), 2);
}

#[test]
fn test_missing_topic_is_fatal() {
    let root = tempfile::tempdir().unwrap();
    let model = ScriptedModel::replying(&[]);
    let source = Arc::new(FixedSource(Ok(json!(null))));
    let result = factory(root.path(), model, source).build("reglamentos_vs");

    match result {
        Err(AgentError::TopicNotFound { path, .. }) => {
            assert_eq!(path, root.path().join("reglamentos_vs"));
        }
        _ => panic!("Expected TopicNotFound"),
    }
}
