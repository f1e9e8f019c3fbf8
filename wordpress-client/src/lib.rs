pub mod api;


pub use api::{PostPayload, WordPressClient, POST_STATUS_PUBLISH};
