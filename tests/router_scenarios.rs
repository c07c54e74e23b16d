//! End-to-end router scenarios driven through the in-memory mock transport
//! (§8 "Concrete scenarios"), exercising translation rules the way a real
//! front-end/device pairing would.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;

use wip_proxy::router::Router;
use wip_proxy::transport::mock::MockTransport;
use wip_proxy::version;

struct Harness {
    router: Arc<Router>,
    frontend_out: UnboundedReceiver<String>,
    device_out: UnboundedReceiver<String>,
}

async fn harness(version_string: &str) -> Harness {
    harness_with_screencast_defaults(version_string, Default::default()).await
}

async fn harness_with_screencast_defaults(version_string: &str, screencast_defaults: wip_proxy::screencast::ScreencastConfig) -> Harness {
    let device_version = version::select(version_string);
    let rule_pack = Arc::new(device_version.build_rule_pack());

    // Inbound channels go unused: frontend-origin frames are fed straight
    // into `receive_from_frontend` and device-origin frames through
    // `device_sends`, bypassing the mock transport's own recv loop (there's
    // no `Session` pump task running in these tests to drive it).
    let (frontend, _frontend_in, frontend_out) = MockTransport::new();
    let (device, _device_in, device_out) = MockTransport::new();

    let router = Router::new(frontend, rule_pack, device_version.selector_list_mode(), screencast_defaults);
    router.attach_device(device).await.unwrap();

    Harness { router, frontend_out, device_out }
}

async fn recv_json(rx: &mut UnboundedReceiver<String>) -> Value {
    let raw = timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for a frame")
        .expect("channel closed");
    serde_json::from_str(&raw).unwrap()
}

/// Hands a device-side frame straight to the router, the way
/// `Session::pump_device` would after reading it off the wire.
async fn device_sends(router: &Arc<Router>, value: Value) {
    router.receive_from_device(value.to_string()).await.unwrap();
}

#[tokio::test]
async fn pure_rename_forwards_with_new_method_and_same_id() {
    let mut h = harness("9.3").await;

    h.router.receive_from_frontend(serde_json::to_string(&json!({ "id": 1, "method": "Log.enable", "params": {} })).unwrap()).await.unwrap();

    let on_device = recv_json(&mut h.device_out).await;
    assert_eq!(on_device["id"], 1);
    assert_eq!(on_device["method"], "Console.enable");
}

#[tokio::test]
async fn immediate_synthetic_reply_never_touches_the_device() {
    let mut h = harness("9.3").await;

    h.router
        .receive_from_frontend(serde_json::to_string(&json!({ "id": 5, "method": "Emulation.canEmulate", "params": {} })).unwrap())
        .await
        .unwrap();

    let reply = recv_json(&mut h.frontend_out).await;
    assert_eq!(reply["id"], 5);
    assert_eq!(reply["result"], json!({ "result": true }));

    // Nothing was ever sent to the device for this method.
    assert!(timeout(Duration::from_millis(100), h.device_out.recv()).await.is_err());
}

#[tokio::test]
async fn inspect_mode_reshapes_params_and_renames_method() {
    let mut h = harness("9.3").await;

    h.router
        .receive_from_frontend(
            serde_json::to_string(&json!({ "id": 2, "method": "DOM.setInspectMode", "params": { "mode": "searchForNode" } })).unwrap(),
        )
        .await
        .unwrap();

    let on_device = recv_json(&mut h.device_out).await;
    assert_eq!(on_device["method"], "DOM.setInspectModeEnabled");
    assert_eq!(on_device["params"]["enabled"], true);
    assert!(on_device["params"].get("mode").is_none());
}

#[tokio::test]
async fn runtime_evaluate_exception_gets_shaped_into_exception_details() {
    let mut h = harness("9.3").await;

    h.router
        .receive_from_frontend(serde_json::to_string(&json!({ "id": 9, "method": "Runtime.evaluate", "params": { "expression": "throw 1" } })).unwrap())
        .await
        .unwrap();
    let on_device = recv_json(&mut h.device_out).await;
    assert_eq!(on_device["id"], 9);

    device_sends(
        &h.router,
        json!({
            "id": 9,
            "result": { "wasThrown": true, "result": { "type": "object", "description": "boom" } }
        }),
    )
    .await;

    let reply = recv_json(&mut h.frontend_out).await;
    assert_eq!(reply["result"]["result"]["subtype"], "error");
    assert_eq!(reply["result"]["exceptionDetails"]["text"], "boom");
}

#[tokio::test]
async fn console_message_added_becomes_log_entry_added() {
    let mut h = harness("9.3").await;

    device_sends(
        &h.router,
        json!({ "method": "Console.messageAdded", "params": { "message": { "source": "javascript", "level": "error", "text": "hi", "line": 3 } } }),
    )
    .await;

    let reply = recv_json(&mut h.frontend_out).await;
    assert_eq!(reply["method"], "Log.entryAdded");
    assert_eq!(reply["params"]["level"], "log");
    assert_eq!(reply["params"]["text"], "hi");
}

#[tokio::test]
async fn ios8_error_filter_turns_device_errors_into_empty_results() {
    let mut h = harness("8.4").await;

    h.router
        .receive_from_frontend(serde_json::to_string(&json!({ "id": 3, "method": "Page.reload", "params": {} })).unwrap())
        .await
        .unwrap();
    recv_json(&mut h.device_out).await;

    device_sends(&h.router, json!({ "id": 3, "error": { "code": -1, "message": "nope" } })).await;

    let reply = recv_json(&mut h.frontend_out).await;
    assert_eq!(reply["result"], json!({}));
    assert!(reply.get("error").is_none());
}

#[tokio::test]
async fn ios12_wraps_requests_once_target_created_and_unwraps_device_replies() {
    let mut h = harness("12.4").await;

    // Device announces its target; this flips on target-based wrapping.
    device_sends(
        &h.router,
        json!({ "method": "Target.targetCreated", "params": { "targetInfo": { "targetId": "target-1" } } }),
    )
    .await;
    // `Target.targetCreated` is forwarded through unchanged.
    let forwarded = recv_json(&mut h.frontend_out).await;
    assert_eq!(forwarded["method"], "Target.targetCreated");

    h.router
        .receive_from_frontend(serde_json::to_string(&json!({ "id": 4, "method": "Log.enable", "params": {} })).unwrap())
        .await
        .unwrap();

    let on_device = recv_json(&mut h.device_out).await;
    assert_eq!(on_device["method"], "Target.sendMessageToTarget");
    assert_eq!(on_device["params"]["targetId"], "target-1");
    let inner: Value = serde_json::from_str(on_device["params"]["message"].as_str().unwrap()).unwrap();
    assert_eq!(inner["method"], "Console.enable");
    assert_eq!(inner["id"], 4);

    // Device replies wrapped in `Target.dispatchMessageFromTarget`.
    let inner_reply = json!({ "id": 4, "result": {} }).to_string();
    device_sends(
        &h.router,
        json!({ "method": "Target.dispatchMessageFromTarget", "params": { "targetId": "target-1", "message": inner_reply } }),
    )
    .await;

    let reply = recv_json(&mut h.frontend_out).await;
    assert_eq!(reply["id"], 4);
}

#[tokio::test]
async fn css_get_matched_styles_maps_rule_ids_into_devtools_shape() {
    let mut h = harness("9.3").await;

    h.router
        .receive_from_frontend(
            serde_json::to_string(&json!({ "id": 11, "method": "CSS.getMatchedStylesForNode", "params": { "nodeId": 42 } })).unwrap(),
        )
        .await
        .unwrap();
    recv_json(&mut h.device_out).await;

    device_sends(
        &h.router,
        json!({
            "id": 11,
            "result": {
                "matchedCSSRules": [{
                    "rule": {
                        "ruleId": { "styleSheetId": "sheet-1", "ordinal": 0 },
                        "selectorList": { "selectors": [{ "text": ".a" }] },
                        "origin": "regular",
                        "style": {
                            "styleId": { "styleSheetId": "sheet-1", "ordinal": 0 },
                            "cssProperties": [{ "name": "color", "value": "red", "status": "active" }],
                            "shorthandEntries": [],
                            "cssText": "color: red;"
                        }
                    },
                    "matchingSelectors": [0]
                }],
                "pseudoElements": [],
                "inherited": []
            }
        }),
    )
    .await;

    let reply = recv_json(&mut h.frontend_out).await;
    let rule = &reply["result"]["matchedCSSRules"][0]["rule"];
    assert_eq!(rule["styleSheetId"], "sheet-1");
    assert!(rule.get("ruleId").is_none());
    let prop = &rule["style"]["cssProperties"][0];
    assert_eq!(prop["disabled"], false);
    assert!(prop.get("status").is_none());
}
