mod rpc;
mod selector_adapters;

pub use rpc::*;
pub use selector_adapters::fast_selector_from_json;
pub use selector_adapters::selector_from_json;
