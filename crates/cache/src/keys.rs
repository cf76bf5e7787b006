// Helper functions for common cache key patterns

pub fn tenant_cache_key(raw_identifier: &str) -> String {
    format!("tenant:{}", raw_identifier)
}

pub fn setting_cache_key(key: &str) -> String {
    format!("setting_{}", key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_key_is_deterministic() {
        assert_eq!(tenant_cache_key("acme.example.com"), "tenant:acme.example.com");
        assert_eq!(setting_cache_key("smtp"), "setting_smtp");
    }
}
