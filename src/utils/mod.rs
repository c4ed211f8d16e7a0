pub mod locale;
pub mod token_blocklist;
