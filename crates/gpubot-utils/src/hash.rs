use sha1::{Digest, Sha1};

/// Digest a raw password into the form the service expects.
///
/// The service takes a SHA-1 digest rendered as 40 lowercase hex characters;
/// the raw secret is never stored or transmitted anywhere else.
pub fn hash_password(raw: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vector() {
        assert_eq!(
            hash_password("testpass"),
            "206c80413b9a96c1312cc346b7d2517b84463edd"
        );
    }

    #[test]
    fn deterministic_and_fixed_width() {
        let a = hash_password("123456");
        let b = hash_password("123456");
        assert_eq!(a, b);
        assert_eq!(a.len(), 40);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn distinct_inputs_distinct_digests() {
        assert_ne!(hash_password("123456"), hash_password("1234567"));
    }
}
