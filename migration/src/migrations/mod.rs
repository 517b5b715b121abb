pub mod m202508150001_create_users;
pub mod m202508150002_create_user_sessions;
pub mod m202508150003_create_aws_accounts;
pub mod m202508150004_create_monitored_resources;
