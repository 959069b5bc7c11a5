pub mod app_config;
pub mod consumption_queries;
pub mod schema;

pub use schema::init_schema;
