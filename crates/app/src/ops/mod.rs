pub mod hello;
pub mod init;
pub mod serve;
pub mod version;

pub use hello::Hello;
pub use init::Init;
pub use serve::Serve;
pub use version::Version;
