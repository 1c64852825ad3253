use std::time::Duration;

use axbridge_common::{PayloadError, ValueExt};
use axbridge_ipc::error_codes;
use axbridge_ipc::{RpcRequest, RpcResponse};
use serde_json::{json, Map, Value};

use super::selector_adapters::selector_from_json;
use crate::domain::{
    ClickInput, CreateSessionInput, CreateSessionOutput, DeleteSessionInput, DeleteSessionOutput,
    ElementSummary, FindElementInput, FindElementOutput, GetAttributeInput, GetAttributeOutput,
    ReleaseElementInput, SendKeysInput, SendKeysOutput, SessionsOutput, SettingsOutput,
    SourceInput, SourceOutput, StatusOutput, UpdateSettingsInput, WaitForIdleInput,
    WaitForIdleOutput,
};
use crate::error::BridgeError;

/// Convert a BridgeError to an RpcResponse.
pub fn domain_error_response(id: u64, err: &BridgeError) -> RpcResponse {
    RpcResponse::domain_error(
        id,
        err.code(),
        &err.to_string(),
        err.category().as_str(),
        Some(err.context()),
        Some(err.suggestion()),
    )
}

fn payload_error_response(id: u64, err: PayloadError) -> RpcResponse {
    RpcResponse::error(id, error_codes::INVALID_PARAMS, &err.to_string())
}

fn params(request: &RpcRequest) -> &Value {
    request.params.as_ref().unwrap_or(&Value::Null)
}

fn session_param(request: &RpcRequest) -> Option<String> {
    request.param_str("sessionId").map(String::from)
}

#[allow(clippy::result_large_err)]
fn millis_param(request: &RpcRequest, key: &str) -> Result<Option<Duration>, RpcResponse> {
    params(request)
        .lenient_u64(key)
        .map(|ms| ms.map(Duration::from_millis))
        .map_err(|e| payload_error_response(request.id, e))
}

#[allow(clippy::result_large_err)]
fn object_param(request: &RpcRequest, key: &str) -> Result<Option<Map<String, Value>>, RpcResponse> {
    match request.param(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map.clone())),
        Some(_) => Err(payload_error_response(
            request.id,
            PayloadError::WrongType {
                field: key.to_string(),
                expected: "an object",
            },
        )),
    }
}

fn element_summary_to_json(element: &ElementSummary) -> Value {
    json!({
        "elementId": element.element_id,
        "className": element.class_name,
        "text": element.text,
        "bounds": element.bounds,
    })
}

pub fn status_output_to_response(id: u64, output: StatusOutput) -> RpcResponse {
    RpcResponse::success(
        id,
        json!({
            "ready": output.ready,
            "message": output.message
        }),
    )
}

/// Parse CreateSessionInput from RpcRequest.
#[allow(clippy::result_large_err)]
pub fn parse_create_session_input(request: &RpcRequest) -> Result<CreateSessionInput, RpcResponse> {
    Ok(CreateSessionInput {
        session_id: session_param(request),
        capabilities: object_param(request, "capabilities")?.unwrap_or_default(),
    })
}

pub fn create_session_output_to_response(id: u64, output: CreateSessionOutput) -> RpcResponse {
    RpcResponse::success(
        id,
        json!({
            "sessionId": output.session_id.as_str(),
            "appliedSettings": output.applied_settings
        }),
    )
}

pub fn parse_delete_session_input(request: &RpcRequest) -> DeleteSessionInput {
    DeleteSessionInput {
        session_id: session_param(request),
    }
}

pub fn delete_session_output_to_response(id: u64, output: DeleteSessionOutput) -> RpcResponse {
    RpcResponse::success(
        id,
        json!({
            "success": true,
            "sessionId": output.session_id,
            "releasedElements": output.released_elements
        }),
    )
}

pub fn sessions_output_to_response(id: u64, output: SessionsOutput) -> RpcResponse {
    let sessions: Vec<Value> = output
        .sessions
        .iter()
        .map(|s| {
            json!({
                "sessionId": s.id.as_str(),
                "createdAt": s.created_at,
                "knownElements": s.known_elements,
                "active": s.active
            })
        })
        .collect();
    RpcResponse::success(
        id,
        json!({
            "sessions": sessions,
            "activeSession": output.active_session.as_ref().map(|s| s.as_str())
        }),
    )
}

/// Parse WaitForIdleInput from RpcRequest. Both timeouts are optional
/// milliseconds, as numbers or numeric strings.
#[allow(clippy::result_large_err)]
pub fn parse_wait_for_idle_input(request: &RpcRequest) -> Result<WaitForIdleInput, RpcResponse> {
    Ok(WaitForIdleInput {
        idle_timeout: millis_param(request, "idleTimeout")?,
        global_timeout: millis_param(request, "globalTimeout")?,
    })
}

pub fn wait_for_idle_output_to_response(id: u64, output: WaitForIdleOutput) -> RpcResponse {
    RpcResponse::success(
        id,
        json!({
            "elapsedMs": output.elapsed_ms,
            "settled": output.settled
        }),
    )
}

/// Parse FindElementInput from RpcRequest.
///
/// `strategy` defaults to `legacy` for a string selector and `fast` for an
/// object.
#[allow(clippy::result_large_err)]
pub fn parse_find_element_input(
    request: &RpcRequest,
    multiple: bool,
) -> Result<FindElementInput, RpcResponse> {
    let raw = request.param("selector").ok_or_else(|| {
        payload_error_response(request.id, PayloadError::Missing("selector".to_string()))
    })?;
    let strategy = match request.param_str("strategy") {
        Some(strategy) => strategy,
        None if raw.is_string() => "legacy",
        None => "fast",
    };
    let selector =
        selector_from_json(strategy, raw).map_err(|e| domain_error_response(request.id, &e))?;

    Ok(FindElementInput {
        session_id: session_param(request),
        selector,
        context_id: request.param_str("contextId").map(String::from),
        multiple,
    })
}

pub fn find_element_output_to_response(id: u64, output: FindElementOutput) -> RpcResponse {
    match output.elements.as_slice() {
        [single] => RpcResponse::success(id, element_summary_to_json(single)),
        elements => RpcResponse::success(
            id,
            json!({ "elements": elements.iter().map(element_summary_to_json).collect::<Vec<_>>() }),
        ),
    }
}

pub fn find_elements_output_to_response(id: u64, output: FindElementOutput) -> RpcResponse {
    RpcResponse::success(
        id,
        json!({
            "elements": output.elements.iter().map(element_summary_to_json).collect::<Vec<_>>()
        }),
    )
}

/// Parse GetAttributeInput from RpcRequest.
#[allow(clippy::result_large_err)]
pub fn parse_get_attribute_input(request: &RpcRequest) -> Result<GetAttributeInput, RpcResponse> {
    Ok(GetAttributeInput {
        session_id: session_param(request),
        element_id: request.require_str("elementId")?.to_string(),
        name: request.require_str("name")?.to_string(),
    })
}

pub fn get_attribute_output_to_response(id: u64, output: GetAttributeOutput) -> RpcResponse {
    RpcResponse::success(id, json!({ "value": output.value }))
}

/// Parse ClickInput from RpcRequest.
#[allow(clippy::result_large_err)]
pub fn parse_click_input(request: &RpcRequest) -> Result<ClickInput, RpcResponse> {
    Ok(ClickInput {
        session_id: session_param(request),
        element_id: request.require_str("elementId")?.to_string(),
    })
}

/// Parse SendKeysInput from RpcRequest.
#[allow(clippy::result_large_err)]
pub fn parse_send_keys_input(request: &RpcRequest) -> Result<SendKeysInput, RpcResponse> {
    let text = request.require_str("text")?.to_string();
    let replace = params(request)
        .lenient_bool("replace")
        .map_err(|e| payload_error_response(request.id, e))?
        .unwrap_or(false);

    Ok(SendKeysInput {
        session_id: session_param(request),
        element_id: request.param_str("elementId").map(String::from),
        text,
        replace,
    })
}

pub fn send_keys_output_to_response(id: u64, output: SendKeysOutput) -> RpcResponse {
    RpcResponse::success(
        id,
        json!({
            "success": true,
            "pressedEnter": output.pressed_enter
        }),
    )
}

/// Parse ReleaseElementInput from RpcRequest.
#[allow(clippy::result_large_err)]
pub fn parse_release_element_input(
    request: &RpcRequest,
) -> Result<ReleaseElementInput, RpcResponse> {
    Ok(ReleaseElementInput {
        session_id: session_param(request),
        element_id: request.require_str("elementId")?.to_string(),
    })
}

/// Parse UpdateSettingsInput from RpcRequest.
#[allow(clippy::result_large_err)]
pub fn parse_update_settings_input(
    request: &RpcRequest,
) -> Result<UpdateSettingsInput, RpcResponse> {
    let settings = object_param(request, "settings")?.ok_or_else(|| {
        payload_error_response(request.id, PayloadError::Missing("settings".to_string()))
    })?;
    Ok(UpdateSettingsInput { settings })
}

pub fn settings_output_to_response(id: u64, output: SettingsOutput) -> RpcResponse {
    RpcResponse::success(id, json!({ "settings": output.settings }))
}

pub fn parse_source_input(request: &RpcRequest) -> SourceInput {
    SourceInput {
        session_id: session_param(request),
    }
}

pub fn source_output_to_response(id: u64, output: SourceOutput) -> RpcResponse {
    RpcResponse::success(
        id,
        json!({
            "hierarchy": output.hierarchy,
            "nodeCount": output.node_count,
            "truncated": output.truncated
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axbridge_core::Rect;

    fn request(method: &str, params: Value) -> RpcRequest {
        RpcRequest::new(7, method, Some(params))
    }

    #[test]
    fn test_domain_error_response_carries_structure() {
        let resp = domain_error_response(
            7,
            &BridgeError::ElementNotFound {
                target: "UiSelector[TEXT=OK]".into(),
            },
        );
        let err = resp.error_info().unwrap();
        assert_eq!(err.code(), error_codes::ELEMENT_NOT_FOUND);
        let data = err.data().unwrap();
        assert_eq!(data.category, "not_found");
        assert_eq!(data.context.as_ref().unwrap()["kind"], "ElementNotFound");
        assert!(data.suggestion.is_some());
    }

    #[test]
    fn test_parse_wait_for_idle_accepts_numbers_and_strings() {
        let input = parse_wait_for_idle_input(&request(
            "waitForIdle",
            json!({ "idleTimeout": 100, "globalTimeout": "500" }),
        ))
        .unwrap();
        assert_eq!(input.idle_timeout, Some(Duration::from_millis(100)));
        assert_eq!(input.global_timeout, Some(Duration::from_millis(500)));

        let input = parse_wait_for_idle_input(&RpcRequest::new(1, "waitForIdle", None)).unwrap();
        assert!(input.idle_timeout.is_none());
        assert!(input.global_timeout.is_none());
    }

    #[test]
    fn test_parse_wait_for_idle_rejects_garbage() {
        let resp = parse_wait_for_idle_input(&request("waitForIdle", json!({ "idleTimeout": "soon" })))
            .unwrap_err();
        assert_eq!(resp.error_info().unwrap().code(), error_codes::INVALID_PARAMS);
    }

    #[test]
    fn test_parse_find_element_infers_strategy() {
        let legacy = parse_find_element_input(
            &request(
                "findElement",
                json!({ "selector": "new UiSelector().text(\"OK\")", "contextId": "e1" }),
            ),
            false,
        )
        .unwrap();
        assert!(legacy.selector.is_legacy());
        assert_eq!(legacy.context_id.as_deref(), Some("e1"));

        let fast = parse_find_element_input(
            &request("findElements", json!({ "selector": { "text": "OK" } })),
            true,
        )
        .unwrap();
        assert!(!fast.selector.is_legacy());
        assert!(fast.multiple);
    }

    #[test]
    fn test_parse_find_element_reports_bad_selector() {
        let resp = parse_find_element_input(
            &request("findElement", json!({ "strategy": "fast", "selector": "text" })),
            false,
        )
        .unwrap_err();
        assert_eq!(resp.error_info().unwrap().code(), error_codes::INVALID_ARGUMENT);

        let resp = parse_find_element_input(&request("findElement", json!({})), false).unwrap_err();
        assert_eq!(resp.error_info().unwrap().code(), error_codes::INVALID_PARAMS);
    }

    #[test]
    fn test_parse_send_keys_defaults() {
        let input =
            parse_send_keys_input(&request("sendKeys", json!({ "text": "hi" }))).unwrap();
        assert!(!input.replace);
        assert!(input.element_id.is_none());

        let input = parse_send_keys_input(&request(
            "sendKeys",
            json!({ "text": "hi", "replace": "true", "elementId": "e1" }),
        ))
        .unwrap();
        assert!(input.replace);
        assert_eq!(input.element_id.as_deref(), Some("e1"));

        assert!(parse_send_keys_input(&request("sendKeys", json!({}))).is_err());
    }

    #[test]
    fn test_parse_update_settings_requires_object() {
        assert!(parse_update_settings_input(&request("updateSettings", json!({}))).is_err());
        assert!(
            parse_update_settings_input(&request("updateSettings", json!({ "settings": 3 })))
                .is_err()
        );
        let input = parse_update_settings_input(&request(
            "updateSettings",
            json!({ "settings": { "useDeviceRealSize": true } }),
        ))
        .unwrap();
        assert_eq!(input.settings.len(), 1);
    }

    #[test]
    fn test_find_output_shapes() {
        let summary = ElementSummary {
            element_id: "e1".into(),
            class_name: "android.widget.Button".into(),
            text: Some("OK".into()),
            bounds: Rect::new(0, 0, 10, 10),
        };
        let single = find_element_output_to_response(
            1,
            FindElementOutput {
                elements: vec![summary.clone()],
            },
        );
        assert_eq!(single.result().unwrap()["elementId"], "e1");
        assert_eq!(single.result().unwrap()["bounds"]["right"], 10);

        let many = find_elements_output_to_response(
            1,
            FindElementOutput {
                elements: vec![summary],
            },
        );
        assert_eq!(many.result().unwrap()["elements"][0]["text"], "OK");
    }
}
