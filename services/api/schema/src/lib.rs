//! sea-orm entities for the tables owned by the API service.

pub mod otp_codes;
pub mod post_likes;
pub mod posts;
pub mod users;
pub mod venues;
