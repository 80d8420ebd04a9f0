pub mod conversation;
pub mod referral;
pub mod report;
