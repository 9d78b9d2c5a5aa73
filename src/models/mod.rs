pub mod response;
pub mod schema;
pub mod user;

pub use response::FormResponse;
pub use schema::StoredSchema;
pub use user::User;
