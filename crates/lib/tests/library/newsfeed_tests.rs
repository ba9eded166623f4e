//! Behavior of the deployed feed, checked the way a client sees it.

use serde_json::{Value, json};

use purestack_lib::newsfeed::{CONTENT_TYPE_HTML, CONTENT_TYPE_JSON, News, NewsFeed, Request};

fn get(path: &str) -> (u16, String, String) {
  let response = NewsFeed::fixtures().handle(&Request::get(path));
  (response.status, response.content_type.to_string(), response.body)
}

fn get_html(path: &str) -> (u16, String, String) {
  let response = NewsFeed::fixtures().handle(&Request::get(path).accept("text/html"));
  (response.status, response.content_type.to_string(), response.body)
}

#[test]
fn list_is_json_and_contains_item() {
  let (status, content_type, body) = get("/news");
  assert_eq!(status, 200);
  assert_eq!(content_type, CONTENT_TYPE_JSON);

  let list: Vec<News> = serde_json::from_str(&body).unwrap();
  assert!(list.iter().any(|news| news.id == "2"));
}

#[test]
fn list_is_html_on_request() {
  let (status, content_type, body) = get_html("/news");
  assert_eq!(status, 200);
  assert_eq!(content_type, CONTENT_TYPE_HTML);
  assert!(body.starts_with("<ul>\n"));
  assert!(body.contains("<li>2: Sed luctus tortor sit amet eros eleifend cursus.</li>"));
  assert!(body.ends_with("\n</ul>"));
}

#[test]
fn item_is_json() {
  let (status, content_type, body) = get("/news/2");
  assert_eq!(status, 200);
  assert_eq!(content_type, CONTENT_TYPE_JSON);

  let item: Value = serde_json::from_str(&body).unwrap();
  assert_eq!(
    item,
    json!({ "id": "2", "title": "Sed luctus tortor sit amet eros eleifend cursus." })
  );
}

#[test]
fn item_is_html_on_request() {
  let (status, content_type, body) = get_html("/news/2");
  assert_eq!(status, 200);
  assert_eq!(content_type, CONTENT_TYPE_HTML);
  assert_eq!(body, "<h1>2: Sed luctus tortor sit amet eros eleifend cursus.</h1>");
}

#[test]
fn every_listed_item_resolves_to_itself() {
  let (_, _, body) = get("/news");
  let list: Vec<News> = serde_json::from_str(&body).unwrap();
  assert_eq!(list.len(), 5);

  for expected in list {
    let (status, _, body) = get(&format!("/news/{}", expected.id));
    assert_eq!(status, 200);
    let item: News = serde_json::from_str(&body).unwrap();
    assert_eq!(item, expected);
  }
}

#[test]
fn unknown_item_is_404() {
  let (status, content_type, body) = get("/news/6");
  assert_eq!(status, 404);
  assert_eq!(content_type, CONTENT_TYPE_JSON);
  assert!(body.contains("'6' not found"));

  let (status, _, _) = get_html("/news/6");
  assert_eq!(status, 404);
}
