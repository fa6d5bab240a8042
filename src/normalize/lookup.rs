use std::collections::HashMap;

/// A translation table for categorical values.
///
/// Keys are matched upper-cased with all whitespace removed, so `"sor "`,
/// `"SOR"` and `"S O R"` hit the same entry.
#[derive(Debug, Clone, Default)]
pub struct Lookup {
    entries: HashMap<String, String>,
}

impl Lookup {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut lookup = Self::default();
        lookup.extend(pairs);
        lookup
    }

    /// Adds entries; later keys replace earlier ones.
    pub fn extend<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in pairs {
            self.entries.insert(Self::key(key.as_ref()), value.into());
        }
    }

    fn key(raw: &str) -> String {
        raw.chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase()
    }

    pub fn get(&self, raw: &str) -> Option<&str> {
        self.entries.get(&Self::key(raw)).map(String::as_str)
    }

    /// Translated value, or `raw` unchanged when the key is unknown.
    pub fn translate<'a>(&'a self, raw: &'a str) -> &'a str {
        self.get(raw).unwrap_or(raw)
    }
}

/// Character class abbreviations as they show up in game and roster dumps.
pub fn class_names() -> Lookup {
    Lookup::new([
        ("AMA", "Amazon"),
        ("BAR", "Barbarian"),
        ("NEC", "Necromancer"),
        ("PAL", "Paladin"),
        ("PALADIN", "Paladin"),
        ("SOR", "Sorceress"),
        ("SORCERESS", "Sorceress"),
        ("SORSI SOR", "Sorceress"),
        ("DRU", "Druid"),
        ("AS", "Assassin"),
        ("ASS", "Assassin"),
        ("ZGANSASIN", "Assassin"),
    ])
}

/// Difficulty names to the CSS class of a game card.
pub fn difficulty() -> Lookup {
    Lookup::new([
        ("NORMAL", "normal"),
        ("NIGHTMARE", "nightmare"),
        ("HELL", "hell"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case_and_whitespace() {
        let classes = class_names();
        assert_eq!(classes.translate("ama"), "Amazon");
        assert_eq!(classes.translate(" Sor "), "Sorceress");
        assert_eq!(classes.translate("sorsi sor"), "Sorceress");
        assert_eq!(classes.translate("S O R"), "Sorceress");
    }

    #[test]
    fn unknown_keys_pass_through_unchanged() {
        let classes = class_names();
        assert_eq!(classes.translate("Warlock "), "Warlock ");
        assert_eq!(difficulty().get("Inferno"), None);
    }

    #[test]
    fn extend_overrides_defaults() {
        let mut classes = class_names();
        classes.extend([("as", "Assassin (AS)"), ("wiz", "Wizard")]);
        assert_eq!(classes.translate("AS"), "Assassin (AS)");
        assert_eq!(classes.translate("Wiz"), "Wizard");
    }
}
