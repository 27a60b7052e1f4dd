//! Log masking for personal data

/// Mask an email address for logging
///
/// Keeps the first character of the local part and the full domain:
/// `user@example.com` becomes `u***@example.com`.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let first = local.chars().next().unwrap_or('*');
            format!("{}***@{}", first, domain)
        }
        _ => "***".to_string(),
    }
}
