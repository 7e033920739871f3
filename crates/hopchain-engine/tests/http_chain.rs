//! End-to-end hops over real HTTP.
//!
//! A local axum server plays both roles the engine talks to: upstream
//! functions on `/` (behaviour picked by the query string) and the gateway's
//! async endpoint on `/async-function/{name}`, which records continuations
//! so the test can replay them as the next hop.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::routing::{any, post};
use hopchain_chain::{Chain, DefinitionError, RemoteCall};
use hopchain_engine::{CALLBACK_HEADER, Engine, EngineConfig, ExecutionError, HopOutcome};

const LOCALHOST: &str = "127.0.0.1";

#[derive(Debug, Clone)]
struct Recorded {
  function_name: String,
  headers: HeaderMap,
  body: Vec<u8>,
}

#[derive(Clone, Default)]
struct Gateway {
  continuations: Arc<Mutex<Vec<Recorded>>>,
}

impl Gateway {
  fn take(&self) -> Vec<Recorded> {
    std::mem::take(&mut *self.continuations.lock().unwrap())
  }
}

async fn function(
  method: Method,
  RawQuery(query): RawQuery,
  headers: HeaderMap,
  body: Bytes,
) -> (StatusCode, Vec<u8>) {
  match query.as_deref() {
    Some("op-double") => {
      let text = String::from_utf8_lossy(&body);
      match text.trim().parse::<i64>() {
        Ok(n) => (StatusCode::OK, (n * 2).to_string().into_bytes()),
        Err(_) => (StatusCode::BAD_REQUEST, b"not a number".to_vec()),
      }
    }
    Some("op-fail") => (StatusCode::INTERNAL_SERVER_ERROR, b"boom".to_vec()),
    Some("op-method") => (StatusCode::OK, method.as_str().as_bytes().to_vec()),
    Some("op-token") => {
      let token = headers
        .get("x-token")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("missing");
      (StatusCode::OK, token.as_bytes().to_vec())
    }
    _ => (StatusCode::OK, body.to_vec()),
  }
}

async fn async_function(
  State(gateway): State<Gateway>,
  Path(function_name): Path<String>,
  headers: HeaderMap,
  body: Bytes,
) -> StatusCode {
  gateway.continuations.lock().unwrap().push(Recorded {
    function_name,
    headers,
    body: body.to_vec(),
  });
  StatusCode::ACCEPTED
}

/// Start the server on an ephemeral port and return its port.
async fn start_server(gateway: Gateway) -> u16 {
  let app = Router::new()
    .route("/", any(function))
    .route("/async-function/{name}", post(async_function))
    .with_state(gateway);

  let listener = tokio::net::TcpListener::bind((LOCALHOST, 0)).await.unwrap();
  let port = listener.local_addr().unwrap().port();

  tokio::spawn(async move {
    axum::serve(listener, app).await.unwrap();
  });

  port
}

fn config(port: u16, callback_url: Option<&str>) -> EngineConfig {
  EngineConfig {
    gateway: format!("{}:{}", LOCALHOST, port),
    function_port: port,
    callback_url: callback_url.map(str::to_string),
    request_timeout_ms: Some(5_000),
    ..EngineConfig::new("pipeline")
  }
}

fn local(op: &str) -> RemoteCall {
  RemoteCall::new(LOCALHOST).with_param("op", op)
}

fn double_once(chain: &mut Chain) -> Result<(), DefinitionError> {
  chain.apply(local("double"));
  Ok(())
}

fn double_then_tag_then_double(chain: &mut Chain) -> Result<(), DefinitionError> {
  chain
    .apply(local("double"))
    .then()
    .apply_modifier(|d| {
      let text = String::from_utf8_lossy(d);
      Ok(format!("{}0", text.trim()).into_bytes())
    })
    .then()
    .apply(local("double"));
  Ok(())
}

#[tokio::test]
async fn test_single_phase_returns_result_directly() {
  let gateway = Gateway::default();
  let port = start_server(gateway.clone()).await;
  let engine = Engine::new(config(port, Some("http://callback.example/done"))).unwrap();

  let outcome = engine.handle(&double_once, b"2".to_vec()).await.unwrap();

  assert_eq!(outcome, HopOutcome::Completed(b"4".to_vec()));
  assert!(gateway.take().is_empty());
}

#[tokio::test]
async fn test_three_phase_chain_with_callback() {
  let gateway = Gateway::default();
  let port = start_server(gateway.clone()).await;
  let engine = Engine::new(config(port, Some("http://callback.example/done"))).unwrap();

  // Hop 1: double 3 -> 6, continue to phase 1 without a callback.
  let outcome = engine
    .handle(&double_then_tag_then_double, b"3".to_vec())
    .await
    .unwrap();
  assert_eq!(outcome, HopOutcome::Dispatched { position: 1 });

  let mut recorded = gateway.take();
  assert_eq!(recorded.len(), 1);
  let hop1 = recorded.remove(0);
  assert_eq!(hop1.function_name, "pipeline");
  assert_eq!(hop1.headers["content-type"], "application/json");
  assert!(hop1.headers.get(CALLBACK_HEADER).is_none());
  let id = hopchain_codec::decode(&hop1.body).unwrap().id;

  // Hop 2: "6" -> "60", one phase left so the callback rides along.
  let outcome = engine
    .handle(&double_then_tag_then_double, hop1.body)
    .await
    .unwrap();
  assert_eq!(outcome, HopOutcome::Dispatched { position: 2 });

  let mut recorded = gateway.take();
  assert_eq!(recorded.len(), 1);
  let hop2 = recorded.remove(0);
  assert_eq!(
    hop2.headers[CALLBACK_HEADER],
    "http://callback.example/done"
  );
  let continuation = hopchain_codec::decode(&hop2.body).unwrap();
  assert_eq!(continuation.id, id);
  assert_eq!(continuation.data, b"60");

  // Hop 3: double 60 -> 120 and return it.
  let outcome = engine
    .handle(&double_then_tag_then_double, hop2.body)
    .await
    .unwrap();
  assert_eq!(outcome, HopOutcome::Completed(b"120".to_vec()));
  assert!(gateway.take().is_empty());
}

#[tokio::test]
async fn test_method_and_headers_reach_function() {
  let port = start_server(Gateway::default()).await;

  fn define(chain: &mut Chain) -> Result<(), DefinitionError> {
    chain.apply(local("method").with_header("Method", "PUT"));
    Ok(())
  }
  let engine = Engine::new(config(port, None)).unwrap();
  let outcome = engine.handle(&define, vec![]).await.unwrap();
  assert_eq!(outcome.into_bytes(), b"PUT");

  fn define_token(chain: &mut Chain) -> Result<(), DefinitionError> {
    chain.apply(local("token").with_header("X-Token", "s3cret"));
    Ok(())
  }
  let outcome = engine.handle(&define_token, vec![]).await.unwrap();
  assert_eq!(outcome.into_bytes(), b"s3cret");
}

#[tokio::test]
async fn test_default_method_from_config() {
  let port = start_server(Gateway::default()).await;

  fn define(chain: &mut Chain) -> Result<(), DefinitionError> {
    chain.apply(local("method"));
    Ok(())
  }

  let engine = Engine::new(EngineConfig {
    default_method: Some("PATCH".to_string()),
    ..config(port, None)
  })
  .unwrap();
  assert_eq!(
    engine.handle(&define, vec![]).await.unwrap().into_bytes(),
    b"PATCH"
  );

  let engine = Engine::new(config(port, None)).unwrap();
  assert_eq!(
    engine.handle(&define, vec![]).await.unwrap().into_bytes(),
    b"POST"
  );
}

#[tokio::test]
async fn test_failing_function_aborts_hop() {
  let gateway = Gateway::default();
  let port = start_server(gateway.clone()).await;

  fn define(chain: &mut Chain) -> Result<(), DefinitionError> {
    chain
      .apply(local("double"))
      .apply(local("fail"))
      .then()
      .apply(local("double"));
    Ok(())
  }

  let engine = Engine::new(config(port, None)).unwrap();
  let err = engine.handle(&define, b"1".to_vec()).await.unwrap_err();

  match err {
    ExecutionError::RemoteStatus {
      phase,
      function,
      status,
    } => {
      assert_eq!(phase, 0);
      assert_eq!(function, LOCALHOST);
      assert_eq!(status, 500);
    }
    other => panic!("unexpected error: {other}"),
  }
  assert!(gateway.take().is_empty());
}

#[tokio::test]
async fn test_unreachable_function_is_a_remote_call_error() {
  // Bind then drop a listener so the port is closed.
  let port = {
    let listener = tokio::net::TcpListener::bind((LOCALHOST, 0)).await.unwrap();
    listener.local_addr().unwrap().port()
  };

  let engine = Engine::new(config(port, None)).unwrap();
  let err = engine.handle(&double_once, b"1".to_vec()).await.unwrap_err();

  assert!(matches!(err, ExecutionError::RemoteCall { phase: 0, .. }));
}
