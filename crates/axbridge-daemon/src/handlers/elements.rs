use axbridge_ipc::{RpcRequest, RpcResponse};

use crate::adapters::{
    domain_error_response, find_element_output_to_response, find_elements_output_to_response,
    get_attribute_output_to_response, parse_click_input, parse_find_element_input,
    parse_get_attribute_input, parse_release_element_input, parse_send_keys_input,
    parse_source_input, send_keys_output_to_response, source_output_to_response,
};
use crate::usecases::{
    ClickUseCase, FindElementUseCase, GetAttributeUseCase, ReleaseElementUseCase,
    SendKeysUseCase, SourceUseCase,
};

pub fn handle_find_element_uc<U: FindElementUseCase>(
    usecase: &U,
    request: RpcRequest,
) -> RpcResponse {
    let input = match parse_find_element_input(&request, false) {
        Ok(input) => input,
        Err(resp) => return resp,
    };

    match usecase.execute(input) {
        Ok(output) => find_element_output_to_response(request.id, output),
        Err(e) => domain_error_response(request.id, &e),
    }
}

pub fn handle_find_elements_uc<U: FindElementUseCase>(
    usecase: &U,
    request: RpcRequest,
) -> RpcResponse {
    let input = match parse_find_element_input(&request, true) {
        Ok(input) => input,
        Err(resp) => return resp,
    };

    match usecase.execute(input) {
        Ok(output) => find_elements_output_to_response(request.id, output),
        Err(e) => domain_error_response(request.id, &e),
    }
}

pub fn handle_get_attribute_uc<U: GetAttributeUseCase>(
    usecase: &U,
    request: RpcRequest,
) -> RpcResponse {
    let input = match parse_get_attribute_input(&request) {
        Ok(input) => input,
        Err(resp) => return resp,
    };

    match usecase.execute(input) {
        Ok(output) => get_attribute_output_to_response(request.id, output),
        Err(e) => domain_error_response(request.id, &e),
    }
}

pub fn handle_click_uc<U: ClickUseCase>(usecase: &U, request: RpcRequest) -> RpcResponse {
    let input = match parse_click_input(&request) {
        Ok(input) => input,
        Err(resp) => return resp,
    };

    match usecase.execute(input) {
        Ok(()) => RpcResponse::action_success(request.id),
        Err(e) => domain_error_response(request.id, &e),
    }
}

pub fn handle_send_keys_uc<U: SendKeysUseCase>(usecase: &U, request: RpcRequest) -> RpcResponse {
    let input = match parse_send_keys_input(&request) {
        Ok(input) => input,
        Err(resp) => return resp,
    };

    match usecase.execute(input) {
        Ok(output) => send_keys_output_to_response(request.id, output),
        Err(e) => domain_error_response(request.id, &e),
    }
}

pub fn handle_release_element_uc<U: ReleaseElementUseCase>(
    usecase: &U,
    request: RpcRequest,
) -> RpcResponse {
    let input = match parse_release_element_input(&request) {
        Ok(input) => input,
        Err(resp) => return resp,
    };

    match usecase.execute(input) {
        Ok(()) => RpcResponse::action_success(request.id),
        Err(e) => domain_error_response(request.id, &e),
    }
}

pub fn handle_source_uc<U: SourceUseCase>(usecase: &U, request: RpcRequest) -> RpcResponse {
    let input = parse_source_input(&request);

    match usecase.execute(input) {
        Ok(output) => source_output_to_response(request.id, output),
        Err(e) => domain_error_response(request.id, &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClickInput, SendKeysInput, SendKeysOutput};
    use crate::error::BridgeError;
    use axbridge_ipc::error_codes;
    use serde_json::json;
    use std::sync::Mutex;

    struct RecordingClick {
        seen: Mutex<Vec<String>>,
        result: Result<(), BridgeError>,
    }

    impl ClickUseCase for RecordingClick {
        fn execute(&self, input: ClickInput) -> Result<(), BridgeError> {
            self.seen.lock().unwrap().push(input.element_id);
            self.result.clone()
        }
    }

    struct EchoSendKeys;

    impl SendKeysUseCase for EchoSendKeys {
        fn execute(&self, input: SendKeysInput) -> Result<SendKeysOutput, BridgeError> {
            Ok(SendKeysOutput {
                pressed_enter: input.text.ends_with("\\n"),
            })
        }
    }

    #[test]
    fn test_click_handler_passes_element_id() {
        let usecase = RecordingClick {
            seen: Mutex::new(Vec::new()),
            result: Ok(()),
        };
        let resp = handle_click_uc(
            &usecase,
            RpcRequest::new(3, "click", Some(json!({ "elementId": "e9" }))),
        );
        assert_eq!(resp.result().unwrap()["success"], true);
        assert_eq!(*usecase.seen.lock().unwrap(), vec!["e9"]);
    }

    #[test]
    fn test_click_handler_rejects_missing_id_without_calling_usecase() {
        let usecase = RecordingClick {
            seen: Mutex::new(Vec::new()),
            result: Ok(()),
        };
        let resp = handle_click_uc(&usecase, RpcRequest::new(3, "click", Some(json!({}))));
        assert_eq!(resp.error_info().unwrap().code(), error_codes::INVALID_PARAMS);
        assert!(usecase.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_click_handler_maps_domain_error() {
        let usecase = RecordingClick {
            seen: Mutex::new(Vec::new()),
            result: Err(BridgeError::StaleElement {
                element_id: "e9".into(),
            }),
        };
        let resp = handle_click_uc(
            &usecase,
            RpcRequest::new(3, "click", Some(json!({ "elementId": "e9" }))),
        );
        let err = resp.error_info().unwrap();
        assert_eq!(err.code(), error_codes::STALE_ELEMENT);
        assert_eq!(resp.id(), 3);
    }

    #[test]
    fn test_send_keys_handler_reports_enter() {
        let resp = handle_send_keys_uc(
            &EchoSendKeys,
            RpcRequest::new(4, "sendKeys", Some(json!({ "text": "go\\n" }))),
        );
        assert_eq!(resp.result().unwrap()["pressedEnter"], true);
    }
}
