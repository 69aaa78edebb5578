//! In-memory NahCloud fake served through wiremock
//!
//! Implements just enough of the REST surface for lifecycle tests: ids are
//! handed out per collection (`p1`, `i1`, `m1`, `b1`, `o1`, ...), timestamps
//! are set on create and refreshed on every PATCH, and unknown ids answer 404.

#![allow(dead_code)]

use chrono::{SecondsFormat, Utc};
use nahcloud::NahClient;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

#[derive(Default)]
struct State {
    counters: HashMap<&'static str, u64>,
    /// collection key -> id -> record
    records: HashMap<String, BTreeMap<String, Map<String, Value>>>,
}

impl State {
    fn next_id(&mut self, prefix: &'static str) -> String {
        let counter = self.counters.entry(prefix).or_insert(0);
        *counter += 1;
        format!("{}{}", prefix, counter)
    }
}

/// Stateful fake of the NahCloud API
pub struct FakeNah {
    state: Mutex<State>,
    token: Option<String>,
}

impl FakeNah {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            token: None,
        }
    }

    /// Reject requests that do not carry `Authorization: Bearer {token}`
    pub fn requiring_token(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            ..Self::new()
        }
    }

    fn authorized(&self, request: &Request) -> bool {
        let Some(token) = &self.token else {
            return true;
        };
        request
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == format!("Bearer {}", token))
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_string("not found")
}

fn id_prefix(collection: &str) -> &'static str {
    match collection {
        "projects" => "p",
        "instances" => "i",
        "metadata" => "m",
        "buckets" => "b",
        _ => "o",
    }
}

impl Respond for FakeNah {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        if !self.authorized(request) {
            return ResponseTemplate::new(401).set_body_string("missing or invalid token");
        }

        let segments: Vec<String> = request
            .url
            .path_segments()
            .map(|s| s.map(str::to_string).collect())
            .unwrap_or_default();
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();

        // (collection key, owning bucket, entity id)
        let (key, bucket, id) = match segments.as_slice() {
            ["v1", "bucket", bucket, "objects"] => (format!("objects:{}", bucket), Some(*bucket), None),
            ["v1", "bucket", bucket, "objects", id] => {
                (format!("objects:{}", bucket), Some(*bucket), Some(*id))
            }
            ["v1", collection] => (collection.to_string(), None, None),
            ["v1", collection, id] => (collection.to_string(), None, Some(*id)),
            _ => return not_found(),
        };
        let collection = key.split(':').next().unwrap_or_default().to_string();

        let mut state = self.state.lock().unwrap();

        if let Some(bucket) = bucket {
            let bucket_exists = state
                .records
                .get("buckets")
                .is_some_and(|b| b.contains_key(bucket));
            if !bucket_exists {
                return not_found();
            }
        }

        match (request.method.as_str(), id) {
            ("POST", None) => {
                let Ok(Value::Object(mut record)) = serde_json::from_slice::<Value>(&request.body)
                else {
                    return ResponseTemplate::new(400).set_body_string("body must be a JSON object");
                };
                let id = state.next_id(id_prefix(&collection));
                let ts = now();
                record.insert("id".into(), json!(id));
                record.insert("created_at".into(), json!(ts));
                record.insert("updated_at".into(), json!(ts));
                if collection == "instances" {
                    record.entry("status").or_insert_with(|| json!("running"));
                }
                if let Some(bucket) = bucket {
                    record.insert("bucket_id".into(), json!(bucket));
                }
                state
                    .records
                    .entry(key)
                    .or_default()
                    .insert(id, record.clone());
                ResponseTemplate::new(201).set_body_json(Value::Object(record))
            }
            ("GET", Some(id)) => match state.records.get(&key).and_then(|r| r.get(id)) {
                Some(record) => ResponseTemplate::new(200).set_body_json(record),
                None => not_found(),
            },
            ("PATCH", Some(id)) => {
                let Ok(Value::Object(patch)) = serde_json::from_slice::<Value>(&request.body) else {
                    return ResponseTemplate::new(400).set_body_string("body must be a JSON object");
                };
                match state.records.get_mut(&key).and_then(|r| r.get_mut(id)) {
                    Some(record) => {
                        for (field, value) in patch {
                            if !matches!(field.as_str(), "id" | "created_at" | "updated_at") {
                                record.insert(field, value);
                            }
                        }
                        record.insert("updated_at".into(), json!(now()));
                        ResponseTemplate::new(200).set_body_json(&*record)
                    }
                    None => not_found(),
                }
            }
            ("DELETE", Some(id)) => match state.records.get_mut(&key).and_then(|r| r.remove(id)) {
                Some(_) => ResponseTemplate::new(204),
                None => not_found(),
            },
            _ => ResponseTemplate::new(405),
        }
    }
}

/// Start a mock server backed by a fresh [`FakeNah`]
pub async fn start_fake(fake: FakeNah) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(any()).respond_with(fake).mount(&server).await;
    server
}

/// Client pointed at `server` with an optional token
pub fn client_for(server: &MockServer, token: Option<&str>) -> NahClient {
    NahClient::new(&server.uri(), token).expect("client should build")
}
