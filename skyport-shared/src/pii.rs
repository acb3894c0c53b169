use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wrapper for credentials and contact details. `Debug` and `Display` print a
/// fixed mask, so request types can be logged with `tracing::debug!("{:?}", ..)`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(pub T);

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // API payloads still carry the real value; only log formatting is masked.
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_never_prints_value() {
        let secret = Masked("hunter22".to_string());
        assert_eq!(format!("{:?}", secret), "********");
        assert_eq!(format!("{}", secret), "********");
        assert_eq!(secret.expose(), "hunter22");
    }

    #[test]
    fn test_deserializes_transparently() {
        #[derive(Deserialize)]
        struct Login {
            password: Masked<String>,
        }

        let login: Login = serde_json::from_str(r#"{"password":"s3cret-pass"}"#).unwrap();
        assert_eq!(login.password.into_inner(), "s3cret-pass");
    }
}
