//! The secret-hashing capability and password rules.

/// Minimum password length, counted in characters after trimming.
pub const MIN_PASSWORD_LEN: usize = 8;

/// One-way digest of credentials. The engine never picks an algorithm; the
/// binary supplies one.
pub trait SecretHasher: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Produce a self-describing digest for `plaintext`.
  fn digest(&self, plaintext: &str) -> Result<String, Self::Error>;

  /// Whether `plaintext` hashes to `digest`. Malformed digests never match.
  fn matches(&self, plaintext: &str, digest: &str) -> bool;
}

/// Trim `raw` and enforce [`MIN_PASSWORD_LEN`].
pub fn validate_password(raw: &str) -> crate::Result<String> {
  let trimmed = raw.trim();
  if trimmed.chars().count() < MIN_PASSWORD_LEN {
    return Err(crate::Error::PasswordTooShort { min: MIN_PASSWORD_LEN });
  }
  Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn length_is_measured_after_trimming() {
    assert!(validate_password("  1234567  ").is_err());
    assert_eq!(validate_password("  12345678 ").unwrap(), "12345678");
  }

  #[test]
  fn length_counts_characters_not_bytes() {
    assert!(validate_password("ééééééé").is_err());
    assert!(validate_password("éééééééé").is_ok());
  }
}
