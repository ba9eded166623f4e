//! The news feed served by the service function.
//!
//! Items are fixed when the feed is built. `GET /news` lists them and
//! `GET /news/{id}` returns one. Both render HTML when the client accepts
//! `text/html` and JSON otherwise; an unknown id is a 404.
//!
//! [`NewsFeed::handle_event`] speaks the API gateway proxy format, so the
//! same routing serves the deployed function and local requests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, warn};

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_HTML: &str = "text/html";

/// Path segment every route lives under.
pub const NEWS_ROUTE: &str = "news";

/// One item of the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct News {
  pub id: String,
  pub title: String,
}

#[derive(Debug, Error)]
pub enum NewsError {
  #[error("news item '{0}' not found")]
  NotFound(String),

  #[error("no route for {method} {path}")]
  NoRoute { method: String, path: String },

  #[error("method {method} not allowed on {path}")]
  MethodNotAllowed { method: String, path: String },

  #[error("invalid proxy event: {0}")]
  InvalidEvent(#[from] serde_json::Error),
}

impl NewsError {
  /// HTTP status reported for this error.
  pub fn status(&self) -> u16 {
    match self {
      NewsError::NotFound(_) | NewsError::NoRoute { .. } => 404,
      NewsError::MethodNotAllowed { .. } => 405,
      NewsError::InvalidEvent(_) => 400,
    }
  }
}

/// Representation chosen from the request's `Accept` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
  Json,
  Html,
}

impl Format {
  /// HTML when any media range in `accept` is `text/html`, JSON otherwise.
  pub fn negotiate(accept: Option<&str>) -> Self {
    let html = accept.is_some_and(|accept| {
      accept
        .split(',')
        .filter_map(|range| range.split(';').next())
        .any(|media| media.trim().eq_ignore_ascii_case(CONTENT_TYPE_HTML))
    });
    if html { Format::Html } else { Format::Json }
  }

  pub fn content_type(&self) -> &'static str {
    match self {
      Format::Json => CONTENT_TYPE_JSON,
      Format::Html => CONTENT_TYPE_HTML,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
  pub method: String,
  pub path: String,
  pub accept: Option<String>,
}

impl Request {
  pub fn get(path: impl Into<String>) -> Self {
    Self {
      method: "GET".to_string(),
      path: path.into(),
      accept: None,
    }
  }

  pub fn accept(mut self, accept: impl Into<String>) -> Self {
    self.accept = Some(accept.into());
    self
  }
}

/// Incoming API gateway proxy event. Only the fields routing needs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProxyEvent {
  http_method: String,
  path: String,
  #[serde(default)]
  headers: Option<BTreeMap<String, String>>,
}

impl From<ProxyEvent> for Request {
  fn from(event: ProxyEvent) -> Self {
    let accept = event.headers.and_then(|headers| {
      headers
        .into_iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("accept"))
        .map(|(_, value)| value)
    });
    Self {
      method: event.http_method,
      path: event.path,
      accept,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
  pub status: u16,
  pub content_type: &'static str,
  pub body: String,
}

impl Response {
  fn ok(format: Format, body: String) -> Self {
    Self {
      status: 200,
      content_type: format.content_type(),
      body,
    }
  }

  fn error(err: &NewsError) -> Self {
    Self {
      status: err.status(),
      content_type: CONTENT_TYPE_JSON,
      body: json!({ "error": err.to_string() }).to_string(),
    }
  }

  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }

  pub fn to_proxy(&self) -> ProxyResponse {
    ProxyResponse {
      status_code: self.status,
      headers: json!({ "Content-Type": self.content_type }),
      body: self.body.clone(),
    }
  }
}

/// A response in API gateway proxy format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyResponse {
  #[serde(rename = "statusCode")]
  pub status_code: u16,
  pub headers: Value,
  pub body: String,
}

/// A read-only feed of news items keyed by id.
#[derive(Debug, Clone)]
pub struct NewsFeed {
  items: BTreeMap<String, String>,
}

impl Default for NewsFeed {
  fn default() -> Self {
    Self::fixtures()
  }
}

impl NewsFeed {
  pub fn new(items: impl IntoIterator<Item = News>) -> Self {
    Self {
      items: items.into_iter().map(|news| (news.id, news.title)).collect(),
    }
  }

  /// The items the deployed service ships with.
  pub fn fixtures() -> Self {
    let fixtures = [
      ("1", "Lorem ipsum dolor sit amet, consectetur adipiscing elit."),
      ("2", "Sed luctus tortor sit amet eros eleifend cursus."),
      ("3", "Proin volutpat leo eu dui tristique, sit amet aliquet diam molestie."),
      ("4", "In in odio vel velit commodo ultrices."),
      ("5", "Nulla quis neque pulvinar, mollis libero in, varius libero."),
    ];
    Self::new(fixtures.into_iter().map(|(id, title)| News {
      id: id.to_string(),
      title: title.to_string(),
    }))
  }

  /// Every item, ordered by id.
  pub fn list(&self) -> Vec<News> {
    self
      .items
      .iter()
      .map(|(id, title)| News {
        id: id.clone(),
        title: title.clone(),
      })
      .collect()
  }

  pub fn item(&self, id: &str) -> Result<News, NewsError> {
    self
      .items
      .get(id)
      .map(|title| News {
        id: id.to_string(),
        title: title.clone(),
      })
      .ok_or_else(|| NewsError::NotFound(id.to_string()))
  }

  /// Route one request. Failures become error responses.
  pub fn handle(&self, request: &Request) -> Response {
    let format = Format::negotiate(request.accept.as_deref());
    match self.route(request, format) {
      Ok(response) => {
        debug!(method = %request.method, path = %request.path, status = response.status, "served");
        response
      }
      Err(err) => {
        warn!(method = %request.method, path = %request.path, error = %err, "request failed");
        Response::error(&err)
      }
    }
  }

  /// Route an API gateway proxy event and answer in the same format.
  pub fn handle_event(&self, event: Value) -> ProxyResponse {
    match serde_json::from_value::<ProxyEvent>(event) {
      Ok(event) => self.handle(&event.into()).to_proxy(),
      Err(err) => {
        let err = NewsError::from(err);
        warn!(error = %err, "rejected event");
        Response::error(&err).to_proxy()
      }
    }
  }

  fn route(&self, request: &Request, format: Format) -> Result<Response, NewsError> {
    let segments: Vec<&str> = request.path.split('/').filter(|s| !s.is_empty()).collect();
    let id = match segments.as_slice() {
      [NEWS_ROUTE] => None,
      [NEWS_ROUTE, id] => Some(*id),
      _ => {
        return Err(NewsError::NoRoute {
          method: request.method.clone(),
          path: request.path.clone(),
        });
      }
    };

    if !request.method.eq_ignore_ascii_case("GET") {
      return Err(NewsError::MethodNotAllowed {
        method: request.method.clone(),
        path: request.path.clone(),
      });
    }

    let body = match (id, format) {
      (None, Format::Html) => render_list(&self.list()),
      (None, Format::Json) => json!(self.list()).to_string(),
      (Some(id), Format::Html) => render_item(&self.item(id)?),
      (Some(id), Format::Json) => json!(self.item(id)?).to_string(),
    };
    Ok(Response::ok(format, body))
  }
}

fn render_list(items: &[News]) -> String {
  let mut lines = vec!["<ul>".to_string()];
  lines.extend(items.iter().map(|news| format!("<li>{}: {}</li>", news.id, news.title)));
  lines.push("</ul>".to_string());
  lines.join("\n")
}

fn render_item(news: &News) -> String {
  format!("<h1>{}: {}</h1>", news.id, news.title)
}
