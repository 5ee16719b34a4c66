//! End-to-end scenarios for the HTTP search surface, driven through the
//! router with a scripted directory backend.

use async_trait::async_trait;
use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use ldap_gateway::api::create_router;
use ldap_gateway::directory::{
    DirectoryError, DirectorySearch, RawAttribute, RawEntry, SearchEvent, SearchFault,
};
use ldap_gateway::query::QueryDescriptor;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc::{self, Receiver};
use tower::ServiceExt;

/// Directory stub replaying a fixed event script for every search.
struct ScriptedDirectory {
    events: Vec<SearchEvent>,
}

impl ScriptedDirectory {
    fn new(events: Vec<SearchEvent>) -> Arc<Self> {
        Arc::new(Self { events })
    }
}

#[async_trait]
impl DirectorySearch for ScriptedDirectory {
    async fn search(
        &self,
        _query: &QueryDescriptor,
    ) -> Result<Receiver<SearchEvent>, DirectoryError> {
        let (tx, rx) = mpsc::channel(64);
        for event in self.events.clone() {
            tx.send(event).await.expect("scripted event");
        }
        Ok(rx)
    }
}

fn person(dn: &str, mails: &[&str]) -> SearchEvent {
    SearchEvent::Entry(RawEntry {
        dn: dn.to_string(),
        attributes: vec![
            RawAttribute {
                name: "objectClass".into(),
                values: vec!["inetOrgPerson".into()],
            },
            RawAttribute {
                name: "mail".into(),
                values: mails.iter().map(|m| m.to_string()).collect(),
            },
        ],
    })
}

async fn get_json(events: Vec<SearchEvent>, uri: &str) -> (StatusCode, Value) {
    let app = create_router(ScriptedDirectory::new(events));
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("router response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&body).expect("json body");
    (status, json)
}

#[tokio::test]
async fn successful_search_returns_flattened_entries_in_arrival_order() {
    let events = vec![
        person("uid=emmy,ou=mathematicians,dc=example,dc=com", &["emmy@x"]),
        person(
            "uid=riemann,ou=mathematicians,dc=example,dc=com",
            &["riemann@x", "bernhard@x"],
        ),
        SearchEvent::End { status: 0 },
    ];
    let (status, json) = get_json(
        events,
        "/dc=com/dc=example/ou=mathematicians?filter=(objectClass=*)&scope=1",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let entries = json.as_array().expect("array body");
    assert_eq!(entries.len(), 2);
    assert_eq!(
        entries[0]["dn"],
        "uid=emmy,ou=mathematicians,dc=example,dc=com"
    );
    assert_eq!(
        entries[1]["dn"],
        "uid=riemann,ou=mathematicians,dc=example,dc=com"
    );
    // Multi-valued attributes keep their delivery order.
    assert_eq!(
        entries[1]["attributes"]["mail"],
        serde_json::json!(["riemann@x", "bernhard@x"])
    );
}

#[tokio::test]
async fn missing_base_maps_to_400_with_the_resolved_location() {
    let events = vec![SearchEvent::Fault(SearchFault::NoSuchObject)];
    let (status, json) = get_json(events, "/dc=com/dc=example/ou=nowhere?filter=(cn=*)").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["message"],
        "not found: ou=nowhere,dc=example,dc=com"
    );
}

#[tokio::test]
async fn nonzero_end_status_maps_to_400_with_the_status_code() {
    let events = vec![SearchEvent::End { status: 50 }];
    let (status, json) = get_json(events, "/dc=com/dc=example?filter=(cn=*)").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "ldap status result was: 50");
}

#[tokio::test]
async fn referral_maps_to_400_and_drops_collected_entries() {
    let events = vec![
        person("uid=emmy,dc=example,dc=com", &["emmy@x"]),
        SearchEvent::Referral(vec!["ldap://other.example.com/dc=example,dc=com".into()]),
        SearchEvent::End { status: 0 },
    ];
    let (status, json) = get_json(events, "/dc=com/dc=example?filter=(cn=*)&scope=2").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "referrals not supported");
    // No entry leaks into the error body.
    assert!(json.get("dn").is_none());
    assert!(json.as_array().is_none());
}

#[tokio::test]
async fn protocol_fault_maps_to_500_with_the_message() {
    let events = vec![SearchEvent::Fault(SearchFault::Protocol(
        "unexpected end of stream".into(),
    ))];
    let (status, json) = get_json(events, "/dc=com?filter=(cn=*)").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["message"], "unexpected end of stream");
}

#[tokio::test]
async fn uri_encoded_filter_is_decoded_before_the_search() {
    struct Recording {
        queries: tokio::sync::Mutex<Vec<QueryDescriptor>>,
    }

    #[async_trait]
    impl DirectorySearch for Recording {
        async fn search(
            &self,
            query: &QueryDescriptor,
        ) -> Result<Receiver<SearchEvent>, DirectoryError> {
            self.queries.lock().await.push(query.clone());
            let (tx, rx) = mpsc::channel(4);
            tx.send(SearchEvent::End { status: 0 }).await.expect("event");
            Ok(rx)
        }
    }

    let service = Arc::new(Recording {
        queries: tokio::sync::Mutex::new(Vec::new()),
    });
    let app = create_router(service.clone());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/dc=com/dc=example?filter=%28uid%3Demmy%29&scope=0")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::OK);

    let queries = service.queries.lock().await;
    assert_eq!(queries[0].filter, "(uid=emmy)");
    assert_eq!(queries[0].base, "dc=example,dc=com");
}
