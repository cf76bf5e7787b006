/// Bcrypt comparison. A malformed or empty stored hash verifies as false,
/// indistinguishable from a wrong password.
pub fn verify_password(candidate: &str, hash: &str) -> bool {
    bcrypt::verify(candidate, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_password_verifies() {
        let hash = bcrypt::hash("hunter2", 4).unwrap();
        assert!(verify_password("hunter2", &hash));
    }

    #[test]
    fn wrong_password_fails() {
        let hash = bcrypt::hash("hunter2", 4).unwrap();
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn malformed_hash_fails_closed() {
        assert!(!verify_password("hunter2", "not-a-bcrypt-hash"));
        assert!(!verify_password("hunter2", ""));
    }
}
