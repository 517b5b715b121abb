pub mod aws_account;
pub mod monitored_resource;
pub mod user;
pub mod user_session;
