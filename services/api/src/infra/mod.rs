pub mod db;
pub mod identity;
pub mod sms;
