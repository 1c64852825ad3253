mod elements;
mod session;
mod settings;
mod source;
mod wait;

pub use elements::{
    ClickUseCase, ClickUseCaseImpl, FindElementUseCase, FindElementUseCaseImpl,
    GetAttributeUseCase, GetAttributeUseCaseImpl, ReleaseElementUseCase,
    ReleaseElementUseCaseImpl, SendKeysUseCase, SendKeysUseCaseImpl,
};
pub use session::{
    CreateSessionUseCase, CreateSessionUseCaseImpl, DeleteSessionUseCase,
    DeleteSessionUseCaseImpl, SessionsUseCase, SessionsUseCaseImpl, StatusUseCase,
    StatusUseCaseImpl,
};
pub use settings::{
    GetSettingsUseCase, GetSettingsUseCaseImpl, UpdateSettingsUseCase, UpdateSettingsUseCaseImpl,
};
pub use source::{SourceUseCase, SourceUseCaseImpl};
pub use wait::{WaitForIdleUseCase, WaitForIdleUseCaseImpl};
