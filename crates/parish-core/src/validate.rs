//! Field validation helpers shared by the API layer.

/// Minimum accepted password length for account registration.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Shape check for an email address: `local@domain.tld`, no whitespace,
/// exactly one `@`, and at least one dot in the domain part.
pub fn email_format(email: &str) -> bool {
  if email.chars().any(char::is_whitespace) {
    return false;
  }
  let Some((local, domain)) = email.split_once('@') else {
    return false;
  };
  if local.is_empty() || domain.contains('@') {
    return false;
  }
  match domain.rsplit_once('.') {
    Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
    None => false,
  }
}

/// Trim an optional field; empty or whitespace-only input collapses to
/// `None`.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
  value.and_then(|s| {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
  })
}
