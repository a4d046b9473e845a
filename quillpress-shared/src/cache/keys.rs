/// Cache key derivation

/// Prefix shared by every cached article
pub const ARTICLE_PREFIX: &str = "ARTICLE";

/// Key of the cached snapshot for article `id`
pub fn article_key(id: i64) -> String {
    format!("{}_{}", ARTICLE_PREFIX, id)
}
