pub mod common;
pub mod delete;
pub mod export;
pub mod fetch;
pub mod init;
pub mod insert;
pub mod update;
