#![deny(clippy::all)]

mod json_ext;
mod sync;

pub use json_ext::PayloadError;
pub use json_ext::ValueExt;
pub use sync::mutex_lock_or_recover;
pub use sync::mutex_try_lock_for;
pub use sync::poison_recovery_count;
pub use sync::rwlock_read_or_recover;
pub use sync::rwlock_write_or_recover;
