//! Database models owned by the server.
//!
//! Domain rows shared with the scoring logic (products, criteria, submissions,
//! assignments, evaluation status) live in `showcase_scoring`.

pub mod judge_product;
pub mod notification;
pub mod user_role;

pub use judge_product::JudgeProduct;
pub use notification::{NewNotification, NotificationKind};
pub use user_role::UserRole;
