#[cfg(feature = "browser")]
pub mod chrome;
pub mod login;
pub mod storage;

#[cfg(feature = "browser")]
pub use chrome::ChromeDriver;
pub use storage::LocalStorage;
