pub mod config;
pub mod credentials;
pub mod dispatch;
pub mod event;
pub mod lifecycle;
pub mod mime;
pub mod rewrite;
pub mod router;
pub mod secrets;
pub mod spool;

pub use config::*;
pub use credentials::*;
pub use dispatch::*;
pub use event::*;
pub use lifecycle::*;
pub use mime::*;
pub use rewrite::*;
pub use router::*;
pub use secrets::*;
pub use spool::*;
