use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Characters that may appear in a phone number as people type it
    /// - Valid: "081234567890", "+62 812-3456-7890", "(0721) 123456"
    /// - Invalid: "call me", "0812abc", "08#12"
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^[0-9+()\-\s]*$").unwrap();
}
