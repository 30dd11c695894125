use bcrypt::{hash, verify, DEFAULT_COST};
use tracing::error;

const MIN_LENGTH: usize = 8;

/// Names every rule the candidate password violates; an empty list means
/// the password clears the policy.
pub fn check_strength(password: &str) -> Vec<String> {
    let mut failed = Vec::new();
    if password.chars().count() < MIN_LENGTH {
        failed.push(format!("length: at least {MIN_LENGTH} characters required"));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        failed.push("uppercase: at least 1 uppercase letter required".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        failed.push("numbers: at least 1 digit required".to_string());
    }
    if !password
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace())
    {
        failed.push("special: at least 1 special character required".to_string());
    }
    failed
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    hash(plain, DEFAULT_COST).map_err(|e| {
        error!(error = %e, "bcrypt hash error");
        anyhow::anyhow!(e)
    })
}

pub fn verify_password(plain: &str, hashed: &str) -> anyhow::Result<bool> {
    verify(plain, hashed).map_err(|e| {
        error!(error = %e, "bcrypt verify error");
        anyhow::anyhow!(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_password_passes_all_rules() {
        assert!(check_strength("Str0ng!Pass").is_empty());
    }

    #[test]
    fn short_password_names_the_length_rule() {
        let failed = check_strength("S1!a");
        assert!(failed.iter().any(|r| r.starts_with("length:")));
    }

    #[test]
    fn missing_uppercase_is_named() {
        let failed = check_strength("weakpass1!");
        assert_eq!(failed, vec!["uppercase: at least 1 uppercase letter required"]);
    }

    #[test]
    fn missing_digit_is_named() {
        let failed = check_strength("Weakpass!");
        assert_eq!(failed, vec!["numbers: at least 1 digit required"]);
    }

    #[test]
    fn missing_special_is_named() {
        let failed = check_strength("Weakpass1");
        assert_eq!(failed, vec!["special: at least 1 special character required"]);
    }

    #[test]
    fn every_violation_is_reported_at_once() {
        let failed = check_strength("abc");
        assert_eq!(failed.len(), 4);
    }

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hashed = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hashed).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hashed = hash_password("Correct1!").expect("hashing should succeed");
        assert!(!verify_password("Wrong1!pw", &hashed).expect("verify should not error"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        assert!(verify_password("anything", "not-a-valid-hash").is_err());
    }
}
