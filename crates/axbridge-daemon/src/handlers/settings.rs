use axbridge_ipc::{RpcRequest, RpcResponse};

use crate::adapters::{
    domain_error_response, parse_update_settings_input, settings_output_to_response,
};
use crate::usecases::{GetSettingsUseCase, UpdateSettingsUseCase};

pub fn handle_get_settings_uc<U: GetSettingsUseCase>(
    usecase: &U,
    request: RpcRequest,
) -> RpcResponse {
    settings_output_to_response(request.id, usecase.execute())
}

pub fn handle_update_settings_uc<U: UpdateSettingsUseCase>(
    usecase: &U,
    request: RpcRequest,
) -> RpcResponse {
    let input = match parse_update_settings_input(&request) {
        Ok(input) => input,
        Err(resp) => return resp,
    };

    match usecase.execute(input) {
        Ok(output) => settings_output_to_response(request.id, output),
        Err(e) => domain_error_response(request.id, &e),
    }
}
