use axbridge_ipc::{RpcRequest, RpcResponse};
use tracing::info;

use crate::adapters::{
    create_session_output_to_response, delete_session_output_to_response, domain_error_response,
    parse_create_session_input, parse_delete_session_input, parse_wait_for_idle_input,
    sessions_output_to_response, status_output_to_response, wait_for_idle_output_to_response,
};
use crate::usecases::{
    CreateSessionUseCase, DeleteSessionUseCase, SessionsUseCase, StatusUseCase,
    WaitForIdleUseCase,
};

pub fn handle_status_uc<U: StatusUseCase>(usecase: &U, request: RpcRequest) -> RpcResponse {
    status_output_to_response(request.id, usecase.execute())
}

/// Handle createSession requests using the use case pattern.
///
/// This handler is a thin coordinator that:
/// 1. Parses the RPC request into a domain input using adapters
/// 2. Delegates to the use case for business logic
/// 3. Converts the result to an RPC response using adapters
pub fn handle_create_session_uc<U: CreateSessionUseCase>(
    usecase: &U,
    request: RpcRequest,
) -> RpcResponse {
    let input = match parse_create_session_input(&request) {
        Ok(input) => input,
        Err(resp) => return resp,
    };

    match usecase.execute(input) {
        Ok(output) => create_session_output_to_response(request.id, output),
        Err(e) => domain_error_response(request.id, &e),
    }
}

pub fn handle_delete_session_uc<U: DeleteSessionUseCase>(
    usecase: &U,
    request: RpcRequest,
) -> RpcResponse {
    let input = parse_delete_session_input(&request);

    match usecase.execute(input) {
        Ok(output) => {
            info!(session_id = %output.session_id, "Session deleted");
            delete_session_output_to_response(request.id, output)
        }
        Err(e) => domain_error_response(request.id, &e),
    }
}

pub fn handle_sessions_uc<U: SessionsUseCase>(usecase: &U, request: RpcRequest) -> RpcResponse {
    sessions_output_to_response(request.id, usecase.execute())
}

/// Handle waitForIdle requests. A busy UI is not an error; the response
/// carries `settled: false` instead.
pub fn handle_wait_for_idle_uc<U: WaitForIdleUseCase>(
    usecase: &U,
    request: RpcRequest,
) -> RpcResponse {
    match parse_wait_for_idle_input(&request) {
        Ok(input) => wait_for_idle_output_to_response(request.id, usecase.execute(input)),
        Err(resp) => resp,
    }
}
