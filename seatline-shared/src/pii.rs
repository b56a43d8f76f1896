use serde::{Serialize, Serializer};
use std::fmt;

/// A wrapper for sensitive data that masks its value in Debug and Display output.
///
/// Serialization still emits the real value; the wrapper exists so that
/// `tracing::info!("{}", Masked(&email))` never leaks a full address.
#[derive(Clone)]
pub struct Masked<T>(pub T);

impl<T: AsRef<str>> Masked<T> {
    fn masked(&self) -> String {
        let value = self.0.as_ref();
        match value.split_once('@') {
            Some((local, domain)) => {
                let head: String = local.chars().take(1).collect();
                format!("{}***@{}", head, domain)
            }
            None => "********".to_string(),
        }
    }
}

impl<T: AsRef<str>> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

impl<T: AsRef<str>> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_masked_in_logs() {
        let email = Masked("ann@x.com");
        assert_eq!(email.to_string(), "a***@x.com");
        assert_eq!(format!("{:?}", email), "a***@x.com");
    }

    #[test]
    fn test_non_email_is_fully_masked() {
        assert_eq!(Masked("secret").to_string(), "********");
    }

    #[test]
    fn test_serialization_keeps_value() {
        let json = serde_json::to_string(&Masked("ann@x.com")).unwrap();
        assert_eq!(json, "\"ann@x.com\"");
    }
}
