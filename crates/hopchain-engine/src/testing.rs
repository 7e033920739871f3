//! In-memory transport for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::transport::{InboundResponse, OutboundRequest, Transport, TransportError};

type Responder =
  Box<dyn Fn(&OutboundRequest) -> Result<InboundResponse, TransportError> + Send + Sync>;

/// Records every request and answers with a caller-supplied responder.
pub(crate) struct RecordingTransport {
  requests: Mutex<Vec<OutboundRequest>>,
  responder: Responder,
}

impl RecordingTransport {
  pub(crate) fn new<F>(responder: F) -> Self
  where
    F: Fn(&OutboundRequest) -> Result<InboundResponse, TransportError> + Send + Sync + 'static,
  {
    Self {
      requests: Mutex::new(Vec::new()),
      responder: Box::new(responder),
    }
  }

  /// Answer 202 to everything.
  pub(crate) fn accepting() -> Self {
    Self::new(|_| {
      Ok(InboundResponse {
        status: 202,
        body: Vec::new(),
      })
    })
  }

  pub(crate) fn requests(&self) -> Vec<OutboundRequest> {
    self.requests.lock().unwrap().clone()
  }
}

#[async_trait]
impl Transport for RecordingTransport {
  async fn send(&self, request: OutboundRequest) -> Result<InboundResponse, TransportError> {
    let response = (self.responder)(&request);
    self.requests.lock().unwrap().push(request);
    response
  }
}
