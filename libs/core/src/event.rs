//! Event API: proactive notifications pushed to users, and the task status check.
//!
//! Only the request shape is produced here (method, URL, headers, body); sending it is left to
//! whatever HTTP client the caller uses.

use std::fmt;
use std::str::FromStr;

use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::config::{EventApiConfig, SkillLimits};
use crate::error::{Result, SkillError};
use crate::render::{Parseable, Renderable, WireObject, render_with_validation};
use crate::telemetry::render_with_span;
use crate::validate::require_text;

const AUTH_SCHEME: &str = "KakaoAK ";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Kind of identifier an [`EventUser`] is addressed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventUserType {
    AppUserId,
    PlusfriendUserKey,
    BotUserKey,
}

impl EventUserType {
    pub const ALL: [EventUserType; 3] = [
        EventUserType::AppUserId,
        EventUserType::PlusfriendUserKey,
        EventUserType::BotUserKey,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventUserType::AppUserId => "appUserId",
            EventUserType::PlusfriendUserKey => "plusfriendUserKey",
            EventUserType::BotUserKey => "botUserKey",
        }
    }
}

impl fmt::Display for EventUserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventUserType {
    type Err = SkillError;

    fn from_str(token: &str) -> Result<Self> {
        let token = token.trim();
        EventUserType::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(token))
            .ok_or_else(|| SkillError::InvalidPayload(format!("unknown user id type `{token}`")))
    }
}

/// Recipient of an event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventUser {
    pub id_type: EventUserType,
    pub id: String,
    pub properties: Option<Map<String, Value>>,
}

impl EventUser {
    pub fn new(id_type: EventUserType, id: impl Into<String>) -> Self {
        Self {
            id_type,
            id: id.into(),
            properties: None,
        }
    }

    pub fn from_fields(
        id_type: &str,
        id: impl Into<String>,
        properties: Option<Map<String, Value>>,
    ) -> Result<Self> {
        Ok(Self {
            id_type: id_type.parse()?,
            id: id.into(),
            properties,
        })
    }

    pub fn properties(mut self, properties: Map<String, Value>) -> Self {
        self.properties = Some(properties);
        self
    }
}

impl Renderable for EventUser {
    fn validate(&self) -> Result<()> {
        require_text("id", &self.id)?;
        Ok(())
    }

    fn to_wire(&self) -> Value {
        WireObject::new()
            .field("type", self.id_type.as_str())
            .field("id", self.id.as_str())
            .optional("properties", self.properties.clone().map(Value::Object))
            .build()
    }
}

/// Fully described HTTP call for the event API.
#[derive(Debug, Clone)]
pub struct EventRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl EventRequest {
    /// Converts into an [`http::Request`] with the JSON body serialized.
    pub fn into_http(self) -> Result<http::Request<Vec<u8>>> {
        let body = match &self.body {
            Some(body) => serde_json::to_vec(body)?,
            None => Vec::new(),
        };
        let mut builder = http::Request::builder().method(self.method).uri(self.url);
        if let Some(headers) = builder.headers_mut() {
            headers.extend(self.headers);
        }
        builder
            .body(body)
            .map_err(|err| SkillError::InvalidPayload(format!("event request: {err}")))
    }
}

fn authorization(api_key: &str) -> String {
    if api_key.starts_with(AUTH_SCHEME) {
        api_key.to_string()
    } else {
        format!("{AUTH_SCHEME}{api_key}")
    }
}

fn json_headers(api_key: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    let value = HeaderValue::from_str(&authorization(api_key))
        .map_err(|err| SkillError::InvalidPayload(format!("api key is not a valid header: {err}")))?;
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

/// Event notification sent to up to `max_users` recipients.
///
/// ```
/// use kskill_core::{EventApi, EventUser, EventUserType};
///
/// let mut event = EventApi::new("bot-1", "secret", "morning_news");
/// event.add_user(EventUser::new(EventUserType::BotUserKey, "user-1"));
/// assert_eq!(event.authorization(), "KakaoAK secret");
/// assert_eq!(event.url(), "https://bot-api.kakao.com/v2/bots/bot-1/talk");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EventApi {
    pub bot_id: String,
    pub api_key: String,
    pub event: String,
    pub users: Vec<EventUser>,
    pub data: Map<String, Value>,
    pub params: Map<String, Value>,
    pub option: Option<Map<String, Value>>,
    pub is_dev_channel: bool,
    pub max_users: usize,
    pub config: EventApiConfig,
}

impl EventApi {
    pub fn new(
        bot_id: impl Into<String>,
        api_key: impl Into<String>,
        event: impl Into<String>,
    ) -> Self {
        Self {
            bot_id: bot_id.into(),
            api_key: api_key.into(),
            event: event.into(),
            users: Vec::new(),
            data: Map::new(),
            params: Map::new(),
            option: None,
            is_dev_channel: false,
            max_users: SkillLimits::default().event_max_users,
            config: EventApiConfig::default(),
        }
    }

    pub fn dev_channel(mut self, is_dev_channel: bool) -> Self {
        self.is_dev_channel = is_dev_channel;
        self
    }

    pub fn max_users(mut self, max_users: usize) -> Self {
        self.max_users = max_users;
        self
    }

    pub fn with_config(mut self, config: EventApiConfig) -> Self {
        self.config = config;
        self
    }

    pub fn data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn option(mut self, option: Map<String, Value>) -> Self {
        self.option = Some(option);
        self
    }

    pub fn add_user(&mut self, user: EventUser) -> &mut Self {
        self.users.push(user);
        self
    }

    /// Builds an [`EventUser`] from raw arguments and appends it.
    pub fn add_user_fields(
        &mut self,
        id_type: &str,
        id: &str,
        properties: Option<Map<String, Value>>,
    ) -> Result<&mut Self> {
        let user = EventUser::from_fields(id_type, id, properties)?;
        Ok(self.add_user(user))
    }

    /// Bot id as it appears in the URL. Dev channel ids lose one trailing `!`.
    pub fn target_bot_id(&self) -> &str {
        if self.is_dev_channel {
            self.bot_id.strip_suffix('!').unwrap_or(&self.bot_id)
        } else {
            &self.bot_id
        }
    }

    pub fn url(&self) -> String {
        let host = if self.is_dev_channel {
            &self.config.dev_host
        } else {
            &self.config.host
        };
        format!("https://{host}/v2/bots/{}/talk", self.target_bot_id())
    }

    /// `Authorization` header value; the `KakaoAK ` scheme is added once.
    pub fn authorization(&self) -> String {
        authorization(&self.api_key)
    }

    pub fn headers(&self) -> Result<HeaderMap> {
        json_headers(&self.api_key)
    }

    /// Validated request body.
    pub fn body(&self) -> Result<Value> {
        self.render()
    }

    pub fn request(&self) -> Result<EventRequest> {
        Ok(EventRequest {
            method: Method::POST,
            url: self.url(),
            headers: self.headers()?,
            body: Some(self.body()?),
        })
    }
}

impl Renderable for EventApi {
    fn validate(&self) -> Result<()> {
        require_text("botId", &self.bot_id)?;
        require_text("apiKey", &self.api_key)?;
        require_text("event", &self.event)?;
        if self.users.is_empty() {
            return Err(SkillError::structural("event needs at least one user"));
        }
        if self.users.len() > self.max_users {
            return Err(SkillError::structural(format!(
                "event reaches at most {} users, got {}",
                self.max_users,
                self.users.len()
            )));
        }
        self.users.iter().try_for_each(Renderable::validate)
    }

    fn to_wire(&self) -> Value {
        let event = WireObject::new()
            .field("name", self.event.as_str())
            .mapping("data", &self.data)
            .build();
        WireObject::new()
            .field("event", event)
            .list("user", &self.users)
            .mapping("params", &self.params)
            .optional("option", self.option.clone().map(Value::Object))
            .build()
    }

    fn render(&self) -> Result<Value> {
        render_with_span("event_api", || {
            tracing::debug!(
                event = %self.event,
                users = self.users.len(),
                dev_channel = self.is_dev_channel,
                "rendering event request"
            );
            render_with_validation(self)
        })
    }
}

/// Task status lookup for a previously sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckEventApi {
    pub task_id: String,
    pub api_key: String,
    pub config: EventApiConfig,
}

impl CheckEventApi {
    pub fn new(task_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            api_key: api_key.into(),
            config: EventApiConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EventApiConfig) -> Self {
        self.config = config;
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_text("taskId", &self.task_id)?;
        require_text("apiKey", &self.api_key)?;
        Ok(())
    }

    pub fn url(&self) -> String {
        format!("https://{}/v2/tasks/{}", self.config.host, self.task_id)
    }

    pub fn authorization(&self) -> String {
        authorization(&self.api_key)
    }

    pub fn headers(&self) -> Result<HeaderMap> {
        self.validate()?;
        json_headers(&self.api_key)
    }

    pub fn request(&self) -> Result<EventRequest> {
        Ok(EventRequest {
            method: Method::GET,
            url: self.url(),
            headers: self.headers()?,
            body: None,
        })
    }
}

fn response_object<'a>(data: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
    data.as_object()
        .ok_or_else(|| SkillError::InvalidPayload(format!("{what} must be a JSON object")))
}

fn lookup<'a>(map: &'a Map<String, Value>, camel: &str, snake: &str) -> Option<&'a Value> {
    map.get(camel).or_else(|| map.get(snake))
}

fn text(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

fn count(value: Option<&Value>) -> u64 {
    value.and_then(Value::as_u64).unwrap_or_default()
}

/// Epoch seconds, or epoch milliseconds when the value has 13 or more digits.
fn timestamp(value: Option<&Value>) -> Option<OffsetDateTime> {
    let raw = match value? {
        Value::Number(number) => number.as_i64()?,
        Value::String(text) => text.trim().parse().ok()?,
        _ => return None,
    };
    if raw.unsigned_abs() >= 1_000_000_000_000 {
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(raw) * 1_000_000).ok()
    } else {
        OffsetDateTime::from_unix_timestamp(raw).ok()
    }
}

/// Reply to an event request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventApiResponse {
    pub task_id: String,
    pub status: String,
    pub message: String,
    pub timestamp: Option<OffsetDateTime>,
}

impl Parseable for EventApiResponse {
    fn from_mapping(data: &Value) -> Result<Self> {
        let map = response_object(data, "event response")?;
        Ok(Self {
            task_id: text(lookup(map, "taskId", "task_id")),
            status: text(map.get("status")),
            message: text(map.get("message")),
            timestamp: timestamp(map.get("timestamp")),
        })
    }
}

/// Failure section of a task status.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFailures {
    pub count: u64,
    pub list: Vec<Value>,
}

/// Reply to a task status check.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckEventApiResponse {
    pub task_id: String,
    pub status: String,
    pub all_request_count: u64,
    pub success_count: u64,
    pub fail: Option<EventFailures>,
}

impl CheckEventApiResponse {
    pub fn fail_count(&self) -> u64 {
        self.fail.as_ref().map(|fail| fail.count).unwrap_or_default()
    }

    pub fn fail_list(&self) -> &[Value] {
        self.fail.as_ref().map(|fail| fail.list.as_slice()).unwrap_or_default()
    }
}

impl Parseable for CheckEventApiResponse {
    fn from_mapping(data: &Value) -> Result<Self> {
        let map = response_object(data, "task status")?;
        let fail = map.get("fail").and_then(Value::as_object).map(|fail| EventFailures {
            count: count(fail.get("count")),
            list: fail
                .get("list")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
        });
        Ok(Self {
            task_id: text(lookup(map, "taskId", "task_id")),
            status: text(map.get("status")),
            all_request_count: count(lookup(map, "allRequestCount", "all_request_count")),
            success_count: count(lookup(map, "successCount", "success_count")),
            fail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event_with_users(n: usize) -> EventApi {
        let mut event = EventApi::new("bot", "key", "notice");
        for i in 0..n {
            event.add_user(EventUser::new(EventUserType::AppUserId, format!("u{i}")));
        }
        event
    }

    #[test]
    fn user_count_must_be_within_bounds() {
        assert!(matches!(
            event_with_users(0).validate(),
            Err(SkillError::StructuralViolation(_))
        ));
        assert!(event_with_users(100).validate().is_ok());
        assert!(event_with_users(101).validate().is_err());
        assert!(event_with_users(3).max_users(2).validate().is_err());
    }

    #[test]
    fn body_omits_empty_sections() {
        let event = event_with_users(1);
        assert_eq!(
            event.body().unwrap(),
            json!({
                "event": {"name": "notice"},
                "user": [{"type": "appUserId", "id": "u0"}]
            })
        );
    }

    #[test]
    fn body_carries_data_params_and_option() {
        let mut data = Map::new();
        data.insert("text".into(), json!("hi"));
        let mut event = EventApi::new("bot", "key", "notice")
            .data(data)
            .param("foo", "bar")
            .option(Map::new());
        event
            .add_user_fields("botUserKey", "u1", Some(Map::from_iter([("k".to_string(), json!("v"))])))
            .unwrap();
        assert_eq!(
            event.body().unwrap(),
            json!({
                "event": {"name": "notice", "data": {"text": "hi"}},
                "user": [{"type": "botUserKey", "id": "u1", "properties": {"k": "v"}}],
                "params": {"foo": "bar"},
                "option": {}
            })
        );
    }

    #[test]
    fn unknown_user_type_is_rejected() {
        let mut event = EventApi::new("bot", "key", "notice");
        assert!(matches!(
            event.add_user_fields("email", "a@b.c", None),
            Err(SkillError::InvalidPayload(_))
        ));
        assert!(EventUser::new(EventUserType::BotUserKey, "").validate().is_err());
    }

    #[test]
    fn authorization_scheme_is_added_once() {
        let event = EventApi::new("bot", "KakaoAK key", "notice");
        assert_eq!(event.authorization(), "KakaoAK key");
        assert_eq!(CheckEventApi::new("t", "key").authorization(), "KakaoAK key");
    }

    #[test]
    fn dev_channel_uses_dev_host_and_strips_marker() {
        let event = EventApi::new("bot!", "key", "notice").dev_channel(true);
        assert_eq!(event.url(), "https://dev-bot-api.kakao.com/v2/bots/bot/talk");
        let prod = EventApi::new("bot!", "key", "notice");
        assert_eq!(prod.url(), "https://bot-api.kakao.com/v2/bots/bot!/talk");
    }

    #[test]
    fn request_has_method_headers_and_body() {
        let request = event_with_users(1).request().unwrap();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.headers[CONTENT_TYPE], "application/json");
        assert_eq!(request.headers[AUTHORIZATION], "KakaoAK key");
        assert!(request.body.is_some());

        let http = request.into_http().unwrap();
        assert_eq!(http.uri(), "https://bot-api.kakao.com/v2/bots/bot/talk");
        let body: Value = serde_json::from_slice(http.body()).unwrap();
        assert_eq!(body["event"]["name"], "notice");
    }

    #[test]
    fn invalid_event_yields_no_request() {
        assert!(event_with_users(0).request().is_err());
    }

    #[test]
    fn check_request_is_a_bodyless_get() {
        let check = CheckEventApi::new("task-1", "key");
        let request = check.request().unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url, "https://bot-api.kakao.com/v2/tasks/task-1");
        assert!(request.body.is_none());
        assert!(CheckEventApi::new("", "key").request().is_err());
    }

    #[test]
    fn event_response_reads_either_key_style() {
        let camel = EventApiResponse::from_mapping(&json!({
            "taskId": "t1", "status": "SUCCESS", "message": "ok", "timestamp": 1_700_000_000
        }))
        .unwrap();
        let snake = EventApiResponse::from_json(
            r#"{"task_id": "t1", "status": "SUCCESS", "message": "ok", "timestamp": 1700000000000}"#,
        )
        .unwrap();
        assert_eq!(camel, snake);
        assert_eq!(
            camel.timestamp.map(OffsetDateTime::unix_timestamp),
            Some(1_700_000_000)
        );
    }

    #[test]
    fn event_response_defaults_missing_keys() {
        let response = EventApiResponse::from_mapping(&json!({})).unwrap();
        assert_eq!(response, EventApiResponse::default());
        assert!(EventApiResponse::from_json("[]").is_err());
    }

    #[test]
    fn check_response_fail_accessors() {
        let without = CheckEventApiResponse::from_mapping(&json!({
            "taskId": "t", "status": "SUCCESS", "allRequestCount": 2, "successCount": 2
        }))
        .unwrap();
        assert_eq!(without.fail_count(), 0);
        assert!(without.fail_list().is_empty());

        let with = CheckEventApiResponse::from_mapping(&json!({
            "task_id": "t",
            "status": "FAIL",
            "all_request_count": 2,
            "success_count": 1,
            "fail": {"count": 1, "list": [{"id": "u1", "reason": "blocked"}]}
        }))
        .unwrap();
        assert_eq!(with.all_request_count, 2);
        assert_eq!(with.fail_count(), 1);
        assert_eq!(with.fail_list()[0]["reason"], "blocked");
    }
}
