pub mod login;
pub mod profile;
pub mod session;
pub mod verify;

pub use login::handle_login;
pub use profile::handle_complete_profile;
pub use session::AuthUser;
pub use verify::handle_verify_session;
