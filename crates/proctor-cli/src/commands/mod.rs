pub mod export;
pub mod init;
pub mod take;
pub mod validate;
