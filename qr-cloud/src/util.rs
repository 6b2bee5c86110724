//! Password hashing

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;
    use argon2::{Argon2, PasswordHasher};
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

static DUMMY_HASH: std::sync::OnceLock<Option<String>> = std::sync::OnceLock::new();

/// Spend one verification on a throwaway hash so unknown accounts take as
/// long to reject as wrong passwords
pub fn verify_password_against_dummy(password: &str) {
    let dummy = DUMMY_HASH.get_or_init(|| hash_password("qr-cloud-dummy-password").ok());
    if let Some(hash) = dummy {
        let _ = verify_password(password, hash);
    }
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("Secret123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Secret123", &hash));
        assert!(!verify_password("secret123", &hash));
    }

    #[test]
    fn dummy_verification_runs_a_real_hash() {
        verify_password_against_dummy("Secret123");
        let dummy = DUMMY_HASH.get().cloned().flatten().unwrap();
        assert!(dummy.starts_with("$argon2"));
        assert!(!verify_password("Secret123", &dummy));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("Secret123", "not-a-hash"));
    }
}
