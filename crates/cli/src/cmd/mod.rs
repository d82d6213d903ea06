mod args;
mod create;
mod info;
mod options;
mod package;
mod plan;
mod validate;

pub use args::{BuildArgs, SelectionArgs};
pub use create::cmd_create;
pub use info::cmd_info;
pub use options::cmd_options;
pub use package::cmd_package;
pub use plan::cmd_plan;
pub use validate::cmd_validate;
