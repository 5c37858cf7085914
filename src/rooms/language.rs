/// The closed set of language tags a room may select.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LanguageSet {
    tags: Vec<String>,
    default: String,
}

pub const DEFAULT_LANGUAGES: [&str; 4] = ["javascript", "python", "cpp", "java"];

impl LanguageSet {
    /// Build a set from configured tags. Blank entries are dropped and
    /// duplicates collapse onto their first occurrence.
    pub fn new<I, S>(tags: I, default: &str) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for tag in tags {
            let tag = tag.as_ref().trim();
            if !tag.is_empty() && !unique.iter().any(|t| t == tag) {
                unique.push(tag.to_string());
            }
        }

        if unique.is_empty() {
            return Err("Language set cannot be empty".to_string());
        }

        let default = default.trim();
        if !unique.iter().any(|t| t == default) {
            return Err(format!(
                "Default language '{}' is not one of [{}]",
                default,
                unique.join(", ")
            ));
        }

        Ok(Self {
            tags: unique,
            default: default.to_string(),
        })
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn default_tag(&self) -> &str {
        &self.default
    }
}

impl Default for LanguageSet {
    fn default() -> Self {
        Self {
            tags: DEFAULT_LANGUAGES.iter().map(|t| t.to_string()).collect(),
            default: DEFAULT_LANGUAGES[0].to_string(),
        }
    }
}
