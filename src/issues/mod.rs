pub mod create;
pub mod fetch;
pub mod modify;

pub use create::create_issue;
pub use fetch::fetch_issues;
pub use modify::{log_work, modify_issue};
