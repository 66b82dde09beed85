pub mod archive;
pub mod list;
pub mod new;
pub mod ports;
pub mod rename;
pub mod repo;
pub mod serve;
pub mod session;
pub mod show;
