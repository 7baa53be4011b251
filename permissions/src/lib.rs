pub mod error;
pub mod repository;
pub mod rule;
pub mod types;

pub use error::{PermissionError, Result};
pub use repository::PermissionRepository;
pub use rule::{PermissionRule, SUBJECT_ALL};
pub use types::{Principal, Role, RuleAction};
