use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NAME_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9 _.-]*$").unwrap();
}

pub fn validate_name(name: &str) -> Result<String, String> {
    if name.len() > 64 {
        return Err("Name must be 64 characters or less".to_string());
    }
    if !NAME_REGEX.is_match(name) {
        return Err("Name must match pattern: ^[a-zA-Z0-9][a-zA-Z0-9 _.-]*$".to_string());
    }
    Ok(name.to_string())
}
