pub mod discover;
pub mod identity;
pub mod otp;
pub mod post;
pub mod token;
pub mod user;
pub mod venue;
