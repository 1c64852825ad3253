mod elements;
mod session;
mod settings;

pub use elements::{
    handle_click_uc, handle_find_element_uc, handle_find_elements_uc, handle_get_attribute_uc,
    handle_release_element_uc, handle_send_keys_uc, handle_source_uc,
};
pub use session::{
    handle_create_session_uc, handle_delete_session_uc, handle_sessions_uc, handle_status_uc,
    handle_wait_for_idle_uc,
};
pub use settings::{handle_get_settings_uc, handle_update_settings_uc};
