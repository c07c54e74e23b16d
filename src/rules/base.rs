//! Base rule pack shared by every device version (§4.2 categories a-e),
//! grounded on `adapter/Base.go`'s `init`/`on*` handler functions. Installed
//! first; version overlays (`ios8`/`ios9`/`ios12`) layer on top.

use std::sync::Arc;

use futures::future::join_all;
use serde_json::{json, Map, Value};

use crate::envelope::{event, reply, Envelope};
use crate::error::{Error, Result};
use crate::router::Router;
use crate::rules::css_mapping::map_rule;
use crate::rules::{immediate_reply, rename, RulePack, ToolOutcome, WebkitOutcome};
use crate::schema::css::GetMatchedStylesForNodeResult;

pub fn install(pack: &mut RulePack) {
    install_renames(pack);
    install_immediate_replies(pack);
    install_parameter_reshapes(pack);
    install_multi_step(pack);
    install_response_event_reshapes(pack);
}

/// §4.2a.
fn install_renames(pack: &mut RulePack) {
    pack.add_tool_filter("Page.setOverlayMessage", rename("Debugger.setOverlayMessage"));
    pack.add_tool_filter("Page.configureOverlay", rename("Debugger.setOverlayMessage"));
    pack.add_tool_filter("DOM.setInspectedNode", rename("Console.addInspectedNode"));
    pack.add_tool_filter("Emulation.setTouchEmulationEnabled", rename("Page.setTouchEmulationEnabled"));
    pack.add_tool_filter("Emulation.setScriptExecutionDisabled", rename("Page.setScriptExecutionDisabled"));
    pack.add_tool_filter("Emulation.setEmulatedMedia", rename("Page.setEmulatedMedia"));
    pack.add_tool_filter("Rendering.setShowPaintRects", rename("Page.setShowPaintRects"));
    pack.add_tool_filter("Log.clear", rename("Console.clearMessages"));
    pack.add_tool_filter("Log.disable", rename("Console.disable"));
    pack.add_tool_filter("Log.enable", rename("Console.enable"));
    pack.add_tool_filter("Network.getCookies", rename("Page.getCookies"));
    pack.add_tool_filter("Network.deleteCookie", rename("Page.deleteCookie"));
    pack.add_tool_filter("Network.setMonitoringXHREnabled", rename("Console.setMonitoringXHREnabled"));
}

/// §4.2b.
fn install_immediate_replies(pack: &mut RulePack) {
    pack.add_tool_filter("Emulation.canEmulate", immediate_reply(json!({ "result": true })));
    pack.add_tool_filter("CSS.getPlatformFontsForNode", immediate_reply(json!({ "fonts": [] })));
    pack.add_tool_filter("CSS.getBackgroundColors", immediate_reply(json!({ "backgroundColors": [] })));
    pack.add_tool_filter("Debugger.canSetScriptSource", immediate_reply(json!({ "result": false })));
    pack.add_tool_filter("Debugger.setBlackboxPatterns", immediate_reply(json!({})));
    pack.add_tool_filter("Debugger.setAsyncCallStackDepth", immediate_reply(json!({ "result": true })));
    pack.add_tool_filter("DOM.enable", immediate_reply(json!({})));
    pack.add_tool_filter("Network.canEmulateNetworkConditions", immediate_reply(json!({ "result": false })));
}

/// §4.2c.
fn install_parameter_reshapes(pack: &mut RulePack) {
    pack.add_tool_filter(
        "DOM.setInspectMode",
        Arc::new(|_router, mut envelope| {
            Box::pin(async move {
                envelope.set_method("DOM.setInspectModeEnabled");
                if let Some(params) = envelope.params_mut() {
                    let enabled = params.get("mode").and_then(Value::as_str) == Some("searchForNode");
                    params.remove("mode");
                    params.insert("enabled".into(), Value::Bool(enabled));
                }
                Ok(ToolOutcome::Forward(envelope))
            })
        }),
    );

    pack.add_tool_filter(
        "Inspector.inspect",
        Arc::new(|_router, mut envelope| {
            Box::pin(async move {
                envelope.set_method("DOM.inspectNodeRequested");
                if let Some(params) = envelope.params_mut() {
                    let backend_node_id = params
                        .get("object")
                        .and_then(|object| object.get("objectId"))
                        .cloned();
                    params.remove("object");
                    params.remove("hints");
                    if let Some(backend_node_id) = backend_node_id {
                        params.insert("backendNodeId".into(), backend_node_id);
                    }
                }
                Ok(ToolOutcome::Forward(envelope))
            })
        }),
    );

    pack.add_tool_filter(
        "CSS.addRule",
        Arc::new(|router, envelope| {
            Box::pin(async move {
                let Envelope::Request { id, params, .. } = envelope else {
                    return Err(Error::Translation { method: "CSS.addRule".into(), expected: "a request" });
                };
                let router = Arc::clone(&router);
                tokio::spawn(async move {
                    if let Err(err) = handle_add_rule(router, id, params).await {
                        log::warn!("CSS.addRule failed: {err}");
                    }
                });
                Ok(ToolOutcome::Suppressed)
            })
        }),
    );

    pack.add_tool_filter(
        "Debugger.enable",
        Arc::new(|router, envelope| {
            Box::pin(async move {
                let router = Arc::clone(&router);
                tokio::spawn(async move {
                    let _ = router.call_device("Debugger.setBreakpointsActive", json!({ "active": true })).await;
                });
                Ok(ToolOutcome::Forward(envelope))
            })
        }),
    );

    pack.add_tool_filter(
        "DOM.getDocument",
        Arc::new(|router, envelope| {
            Box::pin(async move {
                let router = Arc::clone(&router);
                tokio::spawn(async move {
                    if let Err(err) = enumerate_style_sheets(router).await {
                        log::warn!("enumerateStyleSheets failed: {err}");
                    }
                });
                Ok(ToolOutcome::Forward(envelope))
            })
        }),
    );
}

/// `onAddRule` (Base.go): issues the reshaped `CSS.addRule` device call and
/// replies to the front-end once it resolves, run off the front-end reader
/// task (§5 "All three may enter the router concurrently") so this device
/// round trip never stalls unrelated front-end traffic.
async fn handle_add_rule(router: Arc<Router>, id: i64, params: Map<String, Value>) -> Result<()> {
    let selector = params.get("ruleText").and_then(Value::as_str).unwrap_or_default().trim().replace("{}", "");
    let last_node_id = router.state().last_node_id();
    let add_rule_params = json!({ "contextNodeId": last_node_id, "selector": selector });
    let result = router.call_device("CSS.addRule", add_rule_params).await?;
    let mut add_rule_result: crate::schema::css::AddRuleResult = serde_json::from_value(result)?;
    if let Some(rule) = add_rule_result.rule.as_mut() {
        map_rule(router.state().selector_list_mode(), rule);
    }
    router.send_to_frontend(reply(id, &add_rule_result)?).await
}

/// `enumerateStyleSheets` (Base.go:710): fetches every style sheet header
/// and announces it to the front-end with DevTools-only fields filled in.
async fn enumerate_style_sheets(router: Arc<Router>) -> Result<()> {
    let result = router.call_device("CSS.getAllStyleSheets", json!({})).await?;
    let Some(headers) = result.get("headers").and_then(Value::as_array) else { return Ok(()) };
    for header in headers {
        let mut header = header.clone();
        if let Some(object) = header.as_object_mut() {
            object.insert("isInline".into(), Value::Bool(false));
            object.insert("startLine".into(), Value::from(0));
            object.insert("startColumn".into(), Value::from(0));
        }
        router.send_to_frontend(event("CSS.styleSheetAdded", json!({ "header": header }))?).await?;
    }
    Ok(())
}

/// §4.2d.
fn install_multi_step(pack: &mut RulePack) {
    pack.add_tool_filter(
        "DOMDebugger.getEventListeners",
        Arc::new(|router, envelope| {
            Box::pin(async move {
                let Envelope::Request { id, params, .. } = envelope else {
                    return Err(Error::Translation { method: "DOMDebugger.getEventListeners".into(), expected: "a request" });
                };
                let router = Arc::clone(&router);
                tokio::spawn(async move {
                    if let Err(err) = handle_get_event_listeners(router, id, params).await {
                        log::warn!("DOMDebugger.getEventListeners failed: {err}");
                    }
                });
                Ok(ToolOutcome::Suppressed)
            })
        }),
    );

    pack.add_tool_filter(
        "DOM.getBoxModel",
        Arc::new(|router, envelope| {
            Box::pin(async move {
                let Envelope::Request { params, .. } = envelope else {
                    return Err(Error::Translation { method: "DOM.getBoxModel".into(), expected: "a request" });
                };
                let router = Arc::clone(&router);
                tokio::spawn(async move {
                    if let Err(err) = handle_get_box_model(router, params).await {
                        log::warn!("DOM.getBoxModel failed: {err}");
                    }
                });
                Ok(ToolOutcome::Suppressed)
            })
        }),
    );

    pack.add_tool_filter(
        "DOM.getNodeForLocation",
        Arc::new(|router, envelope| {
            Box::pin(async move {
                let Envelope::Request { id, params, .. } = envelope else {
                    return Err(Error::Translation { method: "DOM.getNodeForLocation".into(), expected: "a request" });
                };
                let router = Arc::clone(&router);
                tokio::spawn(async move {
                    if let Err(err) = handle_get_node_for_location(router, id, params).await {
                        log::warn!("DOM.getNodeForLocation failed: {err}");
                    }
                });
                Ok(ToolOutcome::Suppressed)
            })
        }),
    );

    pack.add_tool_filter(
        "DOM.pushNodesByBackendIdsToFrontend",
        Arc::new(|router, envelope| {
            Box::pin(async move {
                let Envelope::Request { id, params, .. } = envelope else {
                    return Err(Error::Translation { method: "DOM.pushNodesByBackendIdsToFrontend".into(), expected: "a request" });
                };
                let router = Arc::clone(&router);
                tokio::spawn(async move {
                    if let Err(err) = handle_push_nodes_by_backend_ids(router, id, params).await {
                        log::warn!("DOM.pushNodesByBackendIdsToFrontend failed: {err}");
                    }
                });
                Ok(ToolOutcome::Suppressed)
            })
        }),
    );

    pack.add_tool_filter(
        "Page.getNavigationHistory",
        Arc::new(|router, envelope| {
            Box::pin(async move {
                let Envelope::Request { id, .. } = envelope else {
                    return Err(Error::Translation { method: "Page.getNavigationHistory".into(), expected: "a request" });
                };
                let router = Arc::clone(&router);
                tokio::spawn(async move {
                    if let Err(err) = handle_get_navigation_history(router, id).await {
                        log::warn!("Page.getNavigationHistory failed: {err}");
                    }
                });
                Ok(ToolOutcome::Suppressed)
            })
        }),
    );

    pack.add_tool_filter(
        "Input.emulateTouchFromMouseEvent",
        Arc::new(|router, envelope| {
            Box::pin(async move {
                let Envelope::Request { id, params, .. } = envelope else {
                    return Err(Error::Translation { method: "Input.emulateTouchFromMouseEvent".into(), expected: "a request" });
                };
                let router = Arc::clone(&router);
                tokio::spawn(async move {
                    if let Err(err) = handle_emulate_touch_from_mouse_event(router, id, params).await {
                        log::warn!("Input.emulateTouchFromMouseEvent failed: {err}");
                    }
                });
                Ok(ToolOutcome::Suppressed)
            })
        }),
    );

    pack.add_tool_filter(
        "Page.startScreencast",
        Arc::new(|router, envelope| {
            Box::pin(async move {
                let Envelope::Request { id, params, .. } = envelope else {
                    return Err(Error::Translation { method: "Page.startScreencast".into(), expected: "a request" });
                };
                let defaults = router.state().screencast_defaults();
                let config = crate::screencast::ScreencastConfig {
                    format: params.get("format").and_then(Value::as_str).unwrap_or(&defaults.format).to_string(),
                    quality: params.get("quality").and_then(Value::as_i64).unwrap_or(defaults.quality),
                    max_width: params.get("maxWidth").and_then(Value::as_i64).unwrap_or(defaults.max_width),
                    max_height: params.get("maxHeight").and_then(Value::as_i64).unwrap_or(defaults.max_height),
                    frame_interval: defaults.frame_interval,
                };
                let generation = router.replace_screencast(None);
                let session = crate::screencast::ScreencastSession::new(&router, generation, config);
                session.start();
                router.replace_screencast(Some(session));
                router.send_to_frontend(reply(id, json!({}))?).await?;
                Ok(ToolOutcome::Suppressed)
            })
        }),
    );

    pack.add_tool_filter(
        "Page.stopScreencast",
        Arc::new(|router, envelope| {
            Box::pin(async move {
                let Envelope::Request { id, .. } = envelope else {
                    return Err(Error::Translation { method: "Page.stopScreencast".into(), expected: "a request" });
                };
                router.replace_screencast(None);
                router.send_to_frontend(reply(id, json!({}))?).await?;
                Ok(ToolOutcome::Suppressed)
            })
        }),
    );

    pack.add_tool_filter(
        "Page.screencastFrameAck",
        Arc::new(|router, envelope| {
            Box::pin(async move {
                let Envelope::Request { id, params, .. } = envelope else {
                    return Err(Error::Translation { method: "Page.screencastFrameAck".into(), expected: "a request" });
                };
                if let Some(session) = router.screencast() {
                    let session_id = params.get("sessionId").and_then(Value::as_i64).unwrap_or_default();
                    session.ack_frame(session_id);
                }
                router.send_to_frontend(reply(id, json!({}))?).await?;
                Ok(ToolOutcome::Suppressed)
            })
        }),
    );

    pack.add_tool_filter(
        "CSS.getMatchedStylesForNode",
        Arc::new(|router, envelope| {
            Box::pin(async move {
                if let Envelope::Request { params, .. } = &envelope {
                    if let Some(node_id) = params.get("nodeId").and_then(Value::as_i64) {
                        router.state().set_last_node_id(node_id);
                    }
                }
                Ok(ToolOutcome::Forward(envelope))
            })
        }),
    );

    pack.add_tool_filter(
        "CSS.setStyleTexts",
        Arc::new(|router, envelope| {
            Box::pin(async move {
                let Envelope::Request { id, params, .. } = envelope else {
                    return Err(Error::Translation { method: "CSS.setStyleTexts".into(), expected: "a request" });
                };
                let router = Arc::clone(&router);
                tokio::spawn(async move {
                    if let Err(err) = handle_set_style_texts(router, id, params).await {
                        log::warn!("CSS.setStyleTexts failed: {err}");
                    }
                });
                Ok(ToolOutcome::Suppressed)
            })
        }),
    );
}

async fn handle_get_event_listeners(router: Arc<Router>, id: i64, params: Map<String, Value>) -> Result<()> {
    let object_id = params.get("objectId").cloned().unwrap_or(Value::Null);
    let node = router.call_device("DOM.requestNode", json!({ "objectId": object_id })).await?;
    let node_id = node.get("nodeId").cloned().unwrap_or(Value::Null);
    let listeners_result = router
        .call_device("DOM.getEventListenersForNode", json!({ "nodeId": node_id, "objectGroup": "event-listeners-panel" }))
        .await?;
    let parsed: crate::schema::dom::GetEventListenersForNodeResult = serde_json::from_value(listeners_result)?;
    let mapped: Vec<Value> = parsed
        .listeners
        .iter()
        .map(|listener| {
            json!({
                "type": listener.kind,
                "useCapture": listener.use_capture,
                "passive": false,
                "location": listener.location,
                "handler": listener.handler_name,
            })
        })
        .collect();
    router.send_to_frontend(reply(id, json!({ "listeners": mapped }))?).await
}

async fn handle_get_box_model(router: Arc<Router>, params: Map<String, Value>) -> Result<()> {
    let node_id = params.get("nodeId").cloned().unwrap_or(Value::Null);
    let highlight_config = json!({
        "showInfo": true,
        "showRulers": false,
        "showExtensionLines": false,
        "contentColor": { "r": 111, "g": 168, "b": 220, "a": 0.66 },
        "paddingColor": { "r": 147, "g": 196, "b": 125, "a": 0.55 },
        "borderColor": { "r": 255, "g": 229, "b": 153, "a": 0.66 },
        "marginColor": { "r": 246, "g": 178, "b": 107, "a": 0.66 },
        "eventTargetColor": { "r": 255, "g": 196, "b": 196, "a": 0.66 },
        "shapeColor": { "r": 96, "g": 82, "b": 177, "a": 0.8 },
        "shapeMarginColor": { "r": 96, "g": 82, "b": 127, "a": 0.6 },
        "displayAsMaterial": true,
    });
    // No front-end reply is produced (§4.2d).
    let _ = router.call_device("DOM.highlightNode", json!({ "highlightConfig": highlight_config, "nodeId": node_id })).await;
    Ok(())
}

async fn handle_get_node_for_location(router: Arc<Router>, id: i64, params: Map<String, Value>) -> Result<()> {
    let x = params.get("x").and_then(Value::as_i64).unwrap_or_default();
    let y = params.get("y").and_then(Value::as_i64).unwrap_or_default();
    let expr = format!("document.elementFromPoint({x},{y})");
    let evaluated = router.call_device("Runtime.evaluate", json!({ "expression": expr })).await?;
    let object_id = evaluated.get("result").and_then(|r| r.get("objectId")).cloned().unwrap_or(Value::Null);
    let node = router.call_device("DOM.requestNode", json!({ "objectId": object_id })).await?;
    let node_id = node.get("nodeId").cloned().unwrap_or(Value::Null);
    router.send_to_frontend(reply(id, json!({ "nodeId": node_id }))?).await
}

async fn handle_push_nodes_by_backend_ids(router: Arc<Router>, id: i64, params: Map<String, Value>) -> Result<()> {
    let backend_ids = params.get("backendNodeIds").and_then(Value::as_array).cloned().unwrap_or_default();
    let futures = backend_ids.into_iter().map(|backend_node_id| {
        let router = Arc::clone(&router);
        async move {
            router
                .call_device("DOM.pushNodeByBackendIdToFrontend", json!({ "backendNodeId": backend_node_id }))
                .await
                .ok()
                .and_then(|result| result.get("nodeId").cloned())
        }
    });
    let node_ids: Vec<Value> = join_all(futures).await.into_iter().flatten().collect();
    router.send_to_frontend(reply(id, json!({ "nodeIds": node_ids }))?).await
}

async fn handle_get_navigation_history(router: Arc<Router>, id: i64) -> Result<()> {
    let href_result = router.call_device("Runtime.evaluate", json!({ "expression": "window.location.href" })).await?;
    let href = href_result.get("result").and_then(|r| r.get("value")).and_then(Value::as_str).unwrap_or_default();
    let title_result = router.call_device("Runtime.evaluate", json!({ "expression": "window.title" })).await?;
    let title = title_result.get("result").and_then(|r| r.get("value")).and_then(Value::as_str).unwrap_or_default();
    router
        .send_to_frontend(reply(id, json!({ "currentIndex": 0, "entries": [{ "id": 0, "url": href, "title": title }] }))?)
        .await
}

async fn handle_emulate_touch_from_mouse_event(router: Arc<Router>, id: i64, mut params: Map<String, Value>) -> Result<()> {
    let original_type = params.get("type").and_then(Value::as_str).unwrap_or_default().to_string();
    let translated = match original_type.as_str() {
        "mousePressed" => "mousedown",
        "mouseReleased" => "click",
        "mouseMoved" => "mousemove",
        other => {
            log::warn!("unknown emulate mouse event name {other}");
            other
        }
    };
    params.insert("type".into(), Value::String(translated.into()));

    const SIMULATE_FN: &str = r#"function simulate(params) {
                const element = document.elementFromPoint(params.x, params.y);
                const e = new MouseEvent(params.type, {
                    screenX: params.x,
                    screenY: params.y,
                    clientX: 0,
                    clientY: 0,
                    ctrlKey: (params.modifiers & 2) === 2,
                    shiftKey: (params.modifiers & 8) === 8,
                    altKey: (params.modifiers & 1) === 1,
                    metaKey: (params.modifiers & 4) === 4,
                    button: params.button,
                    bubbles: true,
                    cancelable: false
                });
                element.dispatchEvent(e);
                return element;
            }"#;
    let expr = format!("({SIMULATE_FN})({})", Value::Object(params.clone()));
    router.call_device("Runtime.evaluate", json!({ "expression": expr })).await?;

    if translated == "click" {
        params.insert("type".into(), Value::String("mouseup".into()));
        let expr = format!("({SIMULATE_FN})({})", Value::Object(params));
        let _ = router.call_device("Runtime.evaluate", json!({ "expression": expr })).await;
    }

    router.send_to_frontend(reply(id, json!({}))?).await
}

async fn handle_set_style_texts(router: Arc<Router>, id: i64, params: Map<String, Value>) -> Result<()> {
    let edits = params.get("edits").and_then(Value::as_array).cloned().unwrap_or_default();
    let mut styles = Vec::new();
    // §9: halts at the first matched edit, preserved verbatim.
    'edits: for edit in &edits {
        let style_sheet_id = edit.get("styleSheetId").and_then(Value::as_str).unwrap_or_default();
        let sheet = router.call_device("CSS.getStyleSheet", json!({ "styleSheetId": style_sheet_id })).await?;
        let Some(rules) = sheet.get("styleSheet").and_then(|s| s.get("rules")).and_then(Value::as_array) else {
            log::warn!("iOS returned a value we were not expecting for getStyleSheet");
            continue;
        };
        for (index, rule) in rules.iter().enumerate() {
            let range = rule.get("style").and_then(|s| s.get("range"));
            if range != edit.get("range") {
                continue;
            }
            let text = edit.get("text").and_then(Value::as_str).unwrap_or_default();
            let set_result = router
                .call_device(
                    "CSS.setStyleText",
                    json!({ "styleId": { "styleSheetId": style_sheet_id, "ordinal": index }, "text": text }),
                )
                .await?;
            let mut set_style: crate::schema::css::SetStyleTextResult = serde_json::from_value(set_result)?;
            if let Some(style) = set_style.style.as_mut() {
                crate::rules::css_mapping::map_style(style, None);
                styles.push(serde_json::to_value(style)?);
            }
            break 'edits;
        }
    }
    router.send_to_frontend(reply(id, json!({ "styles": styles }))?).await
}

/// §4.2e.
fn install_response_event_reshapes(pack: &mut RulePack) {
    pack.add_webkit_filter(
        "Runtime.executionContextCreated",
        Arc::new(|_router, mut envelope| {
            Box::pin(async move {
                if let Some(params) = envelope.params_mut() {
                    reshape_execution_context(params);
                }
                Ok(WebkitOutcome::Forward(envelope))
            })
        }),
    );

    pack.add_webkit_filter(
        "Runtime.evaluate",
        Arc::new(|router, envelope| {
            Box::pin(async move {
                let Envelope::Response { id, result: Some(mut result), error } = envelope else {
                    return Ok(WebkitOutcome::Forward(envelope));
                };
                reshape_evaluate_result(&mut result, router.state().last_script_eval());
                Ok(WebkitOutcome::Forward(Envelope::Response { id, result: Some(result), error }))
            })
        }),
    );

    pack.add_webkit_filter(
        "Runtime.getProperties",
        Arc::new(|_router, envelope| {
            Box::pin(async move {
                let Envelope::Response { id, result: Some(mut result), error } = envelope else {
                    return Ok(WebkitOutcome::Forward(envelope));
                };
                reshape_get_properties(&mut result);
                Ok(WebkitOutcome::Forward(Envelope::Response { id, result: Some(result), error }))
            })
        }),
    );

    pack.add_webkit_filter(
        "Debugger.scriptParsed",
        Arc::new(|router, envelope| {
            Box::pin(async move {
                if let Some(params) = envelope.params() {
                    if let Some(script_id) = params.get("scriptId").and_then(Value::as_str) {
                        router.state().set_last_script_eval(script_id);
                    }
                }
                Ok(WebkitOutcome::Forward(envelope))
            })
        }),
    );

    pack.add_webkit_filter(
        "Console.messageAdded",
        Arc::new(|_router, envelope| {
            Box::pin(async move {
                let Some(params) = envelope.params() else { return Ok(WebkitOutcome::Forward(envelope)) };
                let message = params.get("message").cloned().unwrap_or(Value::Null);
                // §9 Open Questions: the source's level branch always takes
                // its else arm, so `level` is always "log" regardless of
                // the inbound message's type. Preserved verbatim.
                let level = "log";
                let stack_trace = message.get("stackTrace").map(|frames| json!({ "callFrames": frames }));
                let log_entry = json!({
                    "source": message.get("source"),
                    "level": level,
                    "text": message.get("text"),
                    "lineNumber": message.get("line"),
                    "timestamp": crate::time::now_nanos(),
                    "url": message.get("url"),
                    "networkRequestId": message.get("networkRequestId"),
                    "stackTrace": stack_trace,
                });
                Ok(WebkitOutcome::Forward(event("Log.entryAdded", log_entry)?))
            })
        }),
    );

    pack.add_webkit_filter(
        "CSS.getMatchedStylesForNode",
        Arc::new(|router, envelope| {
            Box::pin(async move {
                let Envelope::Response { id, result: Some(result), error } = envelope else {
                    return Ok(WebkitOutcome::Forward(envelope));
                };
                let mut parsed: GetMatchedStylesForNodeResult = serde_json::from_value(result)?;
                let mode = router.state().selector_list_mode();
                for matched in &mut parsed.matched_css_rules {
                    if let Some(rule) = matched.rule.as_mut() {
                        map_rule(mode, rule);
                    }
                }
                for inherited in &mut parsed.inherited {
                    for matched in &mut inherited.matched_css_rules {
                        if let Some(rule) = matched.rule.as_mut() {
                            map_rule(mode, rule);
                        }
                    }
                }
                let result = serde_json::to_value(&parsed)?;
                Ok(WebkitOutcome::Forward(Envelope::Response { id, result: Some(result), error }))
            })
        }),
    );
}

fn reshape_execution_context(params: &mut Map<String, Value>) {
    let Some(context) = params.get_mut("context") else { return };
    let Some(context) = context.as_object_mut() else { return };
    if context.contains_key("origin") {
        return;
    }
    let name = context.get("name").cloned().unwrap_or(Value::Null);
    context.insert("origin".into(), name);
    if let Some(frame_id) = context.remove("frameId") {
        context.insert("auxData".into(), json!({ "frameId": frame_id, "isDefault": true }));
    }
}

fn reshape_evaluate_result(result: &mut Value, last_script_eval: Option<String>) {
    let was_thrown = result.get("wasThrown").and_then(Value::as_bool).unwrap_or(false);
    if was_thrown {
        let description = result
            .get("result")
            .and_then(|r| r.get("description"))
            .cloned()
            .unwrap_or(Value::Null);
        if let Some(inner) = result.get_mut("result").and_then(Value::as_object_mut) {
            inner.insert("subtype".into(), Value::String("error".into()));
        }
        if let Some(result) = result.as_object_mut() {
            result.insert(
                "exceptionDetails".into(),
                json!({
                    "text": description,
                    "url": "",
                    "scriptId": last_script_eval,
                    "line": 1,
                    "column": 0,
                    "stack": {
                        "callFrames": [{
                            "functionName": "",
                            "scriptId": last_script_eval,
                            "url": "",
                            "lineNumber": 1,
                            "columnNumber": 1,
                        }]
                    },
                }),
            );
        }
    } else if result.get("result").and_then(|r| r.get("preview")).is_some() {
        let description = result.get("result").and_then(|r| r.get("description")).cloned().unwrap_or(Value::Null);
        if let Some(preview) = result
            .get_mut("result")
            .and_then(|r| r.get_mut("preview"))
            .and_then(Value::as_object_mut)
        {
            preview.insert("description".into(), description);
            preview.insert("type".into(), Value::String("object".into()));
        }
    }
}

fn reshape_get_properties(result: &mut Value) {
    let Some(entries) = result.get("result").and_then(Value::as_array).cloned() else { return };
    let retained: Vec<Value> = entries
        .into_iter()
        .filter_map(|mut entry| {
            let keep = entry.get("isOwn").is_some() || entry.get("nativeGetter").is_some();
            if !keep {
                return None;
            }
            if let Some(object) = entry.as_object_mut() {
                object.insert("isOwn".into(), Value::Bool(true));
            }
            Some(entry)
        })
        .collect();
    if let Some(object) = result.as_object_mut() {
        object.insert("result".into(), Value::Array(retained));
    }
}
