//! Anti-abuse layer: sanitization, captcha, rate limiting, file checks
//! and per-session state

pub mod captcha;
pub mod files;
pub mod gate;
pub mod rate_limit;
pub mod sanitize;
pub mod session;

pub use captcha::Captcha;
pub use files::{FileKind, FileRejection, FileValidator};
pub use gate::{SecurityGate, SecurityRejection};
pub use rate_limit::{RateLimited, RateLimiter};
pub use session::{Receipt, SessionContext};
