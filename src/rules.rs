use crate::error::{Error, Result};
use crate::events::{EventSink, StreamEvent};
use crate::http::{ApiRequest, Transport};
use serde::{Deserialize, Serialize};

/// A server-side filter rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Rule {
    pub id: String,
    pub value: String,
    #[serde(default)]
    pub tag: Option<String>,
}

#[derive(Deserialize)]
struct RuleList {
    #[serde(default)]
    data: Vec<Rule>,
}

#[derive(Serialize)]
struct AddRules<'a> {
    add: Vec<NewRule<'a>>,
}

#[derive(Serialize)]
struct NewRule<'a> {
    value: &'a str,
}

#[derive(Serialize)]
struct DeleteRules<'a> {
    delete: RuleIds<'a>,
}

#[derive(Serialize)]
struct RuleIds<'a> {
    ids: Vec<&'a str>,
}

/// Client for the rules endpoint. All calls return the raw response body.
pub struct RuleClient<'a> {
    transport: &'a dyn Transport,
    rules_url: &'a str,
    token: &'a str,
}

impl<'a> RuleClient<'a> {
    pub fn new(transport: &'a dyn Transport, rules_url: &'a str, token: &'a str) -> Self {
        Self {
            transport,
            rules_url,
            token,
        }
    }

    pub fn list_rules(&self) -> Result<Vec<u8>> {
        self.transport
            .execute(&ApiRequest::get(self.rules_url, self.token))
    }

    /// List the current rules, then delete all of them in one request.
    /// The delete is sent even when there is nothing to delete.
    pub fn delete_all_rules(&self) -> Result<Vec<u8>> {
        let listing = self.list_rules()?;
        let rules = parse_rules(&listing)?;
        let body = DeleteRules {
            delete: RuleIds {
                ids: rules.iter().map(|r| r.id.as_str()).collect(),
            },
        };
        let request = ApiRequest::post_json(self.rules_url, self.token, &body)?;
        self.transport.execute(&request)
    }

    /// Add one rule. The request body is logged to `sink` before it is sent.
    pub fn create_rule(&self, query: &str, sink: &dyn EventSink) -> Result<Vec<u8>> {
        let body = AddRules {
            add: vec![NewRule { value: query }],
        };
        let request = ApiRequest::post_json(self.rules_url, self.token, &body)?;
        sink.send(StreamEvent::Log(request.body_text()));
        self.transport.execute(&request)
    }
}

/// Decode a rules listing. A listing without `data` means no rules.
pub fn parse_rules(body: &[u8]) -> Result<Vec<Rule>> {
    let list: RuleList = serde_json::from_slice(body).map_err(|e| Error::json(body, e))?;
    Ok(list.data)
}
