use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for owner identifiers issued by the auth provider.
    /// The owner id becomes the first segment of a storage path, so it must
    /// not contain separators or dots.
    /// - Valid: "u1", "user_2abcXYZ", "investor-42"
    /// - Invalid: "", "../etc", "a/b", "user.name", "user name"
    pub static ref OWNER_ID_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_-]{1,128}$").unwrap();
}
