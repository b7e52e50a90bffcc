pub mod create_admins;
pub mod init;
pub mod render;
pub mod serve;

pub use create_admins::{create_admins, CreateAdminsArgs};
pub use init::{init, InitArgs};
pub use render::{render, RenderArgs};
pub use serve::{serve, ServeArgs};
