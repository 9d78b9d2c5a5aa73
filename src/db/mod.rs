pub mod responses;
pub mod schemas;
pub mod users;
