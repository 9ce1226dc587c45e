use kskill_core::{
    Context, ParamValue, Parseable, Payload, Renderable, SkillError, SkillResponse,
    ValidationPayload, ValidationResponse, ValidationStatus,
};
use kskill_testutil::load_fixture;
use serde_json::json;

#[test]
fn skill_payload_fixture_parses() {
    let raw = load_fixture!("libs/core/tests/fixtures/skill_payload.json");
    let payload = Payload::from_mapping(&raw).expect("payload parses");

    assert_eq!(payload.user_id(), "user-42");
    assert_eq!(payload.utterance(), "two lattes please");
    assert_eq!(payload.bot.id, "bot-cafe");
    assert_eq!(payload.intent.name, "order");
    assert_eq!(payload.user_request.user.kind, "botUserKey");
    assert_eq!(payload.user_request.user.properties.plusfriend_user_key, "pf-42");
    assert_eq!(payload.user_request.user.properties.is_friend, Some(true));
    assert_eq!(payload.params()["menu"], json!("latte"));
    assert_eq!(
        payload.detail_params()["count"].value,
        ParamValue::Text("2".into())
    );
    assert_eq!(payload.detail_params()["menu"].origin, "lattes");
    assert!(payload.callback_url().is_none());

    let order = payload.context("order").expect("order context");
    assert_eq!(order.lifespan, 4);
    assert_eq!(order.ttl, Some(600));
    assert_eq!(order.get("menu").map(|p| p.resolved_value.as_str()), Some("cafe latte"));
    assert!(payload.context("missing").is_none());
}

#[test]
fn parsed_context_is_sent_back_unchanged() {
    let raw = load_fixture!("libs/core/tests/fixtures/skill_payload.json");
    let payload = Payload::from_mapping(&raw).unwrap();
    let order = payload.context("order").unwrap().clone();

    assert_eq!(
        order.render().unwrap(),
        load_fixture!("libs/core/tests/fixtures/context_outbound.json")
    );

    let mut response = SkillResponse::new();
    response.add_context(order);
    let rendered = response.render().unwrap();
    assert_eq!(rendered["context"]["values"][0]["name"], json!("order"));
}

#[test]
fn outbound_context_parses_back() {
    let outbound = load_fixture!("libs/core/tests/fixtures/context_outbound.json");
    let context = Context::from_mapping(&outbound).unwrap();
    assert_eq!(context.lifespan, 4);
    assert_eq!(context.render().unwrap(), outbound);
}

#[test]
fn malformed_payloads_are_rejected() {
    assert!(matches!(
        Payload::from_json("{not json"),
        Err(SkillError::InvalidPayload(_))
    ));
    assert!(matches!(
        Payload::from_mapping(&json!({"contexts": [{"name": "c", "lifespan": "long"}]})),
        Err(SkillError::InvalidPayload(_))
    ));
    let empty = Payload::from_mapping(&json!({})).unwrap();
    assert_eq!(empty.user_id(), "");
}

#[test]
fn validation_round_trip() {
    let payload = ValidationPayload::from_json(
        r#"{
            "isInSlotFilling": true,
            "utterance": "tomorrow",
            "value": {"origin": "tomorrow", "resolved": "2026-10-20"},
            "user": {"id": "u1", "type": "botUserKey", "properties": {}}
        }"#,
    )
    .unwrap();
    assert!(payload.is_in_slot_filling);
    assert_eq!(payload.origin(), Some("tomorrow"));

    let reply = ValidationResponse::success("2026-10-20").data(json!({"day": "tuesday"}));
    assert_eq!(
        reply.render().unwrap(),
        json!({"status": "SUCCESS", "value": "2026-10-20", "data": {"day": "tuesday"}})
    );
    assert_eq!(
        ValidationResponse::fail("pick a weekday").status,
        ValidationStatus::Fail
    );
}
