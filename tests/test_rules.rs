mod common;

use common::FakeTransport;
use filtered_stream::events::{ChannelSink, StreamEvent};
use filtered_stream::{Auth, Error, Method, RuleClient};
use serde_json::json;
use std::sync::mpsc;

const RULES_URL: &str = "http://api.test/rules";

#[test]
fn test_list_rules_returns_raw_body() {
    let listing = r#"{"data":[{"id":"1","value":"cats"}],"meta":{"sent":"now"}}"#;
    let transport = FakeTransport::new().reply(listing);
    let client = RuleClient::new(&transport, RULES_URL, "tok");

    assert_eq!(client.list_rules().unwrap(), listing.as_bytes());

    let req = transport.request(0);
    assert_eq!(req.method, Method::Get);
    assert_eq!(req.url, RULES_URL);
    assert_eq!(req.auth, Auth::Bearer("tok".into()));
}

#[test]
fn test_create_rule_body() {
    let transport = FakeTransport::new().reply(r#"{"meta":{"summary":{"created":1}}}"#);
    let client = RuleClient::new(&transport, RULES_URL, "tok");

    let (tx, rx) = mpsc::channel();
    let body = client.create_rule("foo", &*ChannelSink::new(tx)).unwrap();

    assert_eq!(body, br#"{"meta":{"summary":{"created":1}}}"#);
    assert_eq!(transport.request(0).method, Method::Post);
    assert_eq!(transport.request(0).content_type, "application/json");
    assert_eq!(transport.request_json(0), json!({"add": [{"value": "foo"}]}));
    assert_eq!(
        rx.try_iter().collect::<Vec<_>>(),
        vec![StreamEvent::Log(r#"{"add":[{"value":"foo"}]}"#.into())]
    );
}

#[test]
fn test_create_rule_escapes_quotes() {
    let transport = FakeTransport::new().reply("{}");
    let client = RuleClient::new(&transport, RULES_URL, "tok");

    let (tx, _rx) = mpsc::channel();
    client
        .create_rule(r#""exact phrase" \ lang:en"#, &*ChannelSink::new(tx))
        .unwrap();

    assert_eq!(
        transport.request_json(0),
        json!({"add": [{"value": "\"exact phrase\" \\ lang:en"}]})
    );
}

#[test]
fn test_delete_all_rules_collects_ids() {
    let transport = FakeTransport::new()
        .reply(r#"{"data":[{"id":"120","value":"cats"},{"id":"121","value":"dogs","tag":"pets"}]}"#)
        .reply(r#"{"meta":{"summary":{"deleted":2}}}"#);
    let client = RuleClient::new(&transport, RULES_URL, "tok");

    let body = client.delete_all_rules().unwrap();

    assert_eq!(body, br#"{"meta":{"summary":{"deleted":2}}}"#);
    assert_eq!(transport.requests.borrow().len(), 2);
    assert_eq!(transport.request(0).method, Method::Get);
    assert_eq!(transport.request(1).method, Method::Post);
    assert_eq!(
        transport.request_json(1),
        json!({"delete": {"ids": ["120", "121"]}})
    );
}

#[test]
fn test_delete_all_rules_on_empty_set_still_sends_delete() {
    let transport = FakeTransport::new()
        .reply(r#"{"meta":{"sent":"now","result_count":0}}"#)
        .reply(r#"{"meta":{"summary":{"deleted":0}}}"#);
    let client = RuleClient::new(&transport, RULES_URL, "tok");

    client.delete_all_rules().unwrap();

    assert_eq!(transport.requests.borrow().len(), 2);
    assert_eq!(transport.request_json(1), json!({"delete": {"ids": []}}));
}

#[test]
fn test_delete_all_rules_with_malformed_listing() {
    let transport = FakeTransport::new().reply("<html>Service Unavailable</html>");
    let client = RuleClient::new(&transport, RULES_URL, "tok");

    let err = client.delete_all_rules().unwrap_err();

    assert!(matches!(err, Error::Json { .. }));
    assert!(err.to_string().contains("<html>Service Unavailable</html>"));
    // No delete is attempted.
    assert_eq!(transport.requests.borrow().len(), 1);
}
