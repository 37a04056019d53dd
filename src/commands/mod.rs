pub mod delete;
pub mod init;
pub mod list;
pub mod mine;
pub mod report;
pub mod show;
pub mod stats;
pub mod update;
pub mod users;
