use super::catalog::{Technology, TECHNOLOGIES};
use regex::Regex;

/// A technology found in a vacancy's text, with how often it appeared.
#[derive(Debug, Clone)]
pub struct TechnologyMention {
    pub technology: &'static Technology,
    pub frequency: usize,
}

/// Whole-word, case-insensitive matcher over the technology catalog.
/// Patterns are compiled once at construction.
pub struct TechnologyExtractor {
    patterns: Vec<(&'static Technology, Regex)>,
    role_patterns: Vec<(&'static str, Vec<Regex>)>,
    domain_patterns: Vec<(&'static str, Vec<Regex>)>,
}

const ROLE_KEYWORDS: &[(&str, &[&str])] = &[
    ("backend", &["backend", "бэкенд", "серверная", "api", "микросервис"]),
    ("frontend", &["frontend", "фронтенд", "ui", "ux", "интерфейс"]),
    ("fullstack", &["fullstack", "фулстек", "полный цикл"]),
    ("data", &["data", "данные", "аналитик", "bi", "etl"]),
    ("devops", &["devops", "деопс", "инфраструктура", "администратор"]),
    ("mobile", &["mobile", "мобильн", "android", "ios", "flutter"]),
    ("qa", &["qa", "тестировщик", "тестирование", "автотест"]),
];

const DOMAIN_KEYWORDS: &[(&str, &[&str])] = &[
    ("fintech", &["банк", "финанс", "платеж", "криптовалют"]),
    ("ecommerce", &["интернет-магазин", "ecommerce", "торговл"]),
    ("gamedev", &["игр", "геймдев", "unity", "unreal"]),
    ("edtech", &["образование", "обучение", "курс"]),
    ("healthtech", &["медицин", "здоровье", "клиник"]),
    ("government", &["государств", "госуслуг", "бюджет"]),
];

impl TechnologyExtractor {
    pub fn new() -> Self {
        let patterns = TECHNOLOGIES
            .iter()
            .map(|tech| (tech, word_pattern(tech.name)))
            .collect();

        let role_patterns = keyword_patterns(ROLE_KEYWORDS);
        let domain_patterns = keyword_patterns(DOMAIN_KEYWORDS);

        Self {
            patterns,
            role_patterns,
            domain_patterns,
        }
    }

    /// Frequency count per catalog technology; technologies that never
    /// appear are omitted.
    pub fn extract(&self, text: &str) -> Vec<TechnologyMention> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        self.patterns
            .iter()
            .filter_map(|(tech, pattern)| {
                let frequency = pattern.find_iter(text).count();
                (frequency > 0).then_some(TechnologyMention {
                    technology: *tech,
                    frequency,
                })
            })
            .collect()
    }

    /// Developer role with the highest keyword score, `general` when
    /// nothing matches.
    pub fn determine_role(&self, text: &str) -> &'static str {
        best_label(&self.role_patterns, text)
    }

    /// Business domain with the highest keyword score, `general` when
    /// nothing matches.
    pub fn determine_domain(&self, text: &str) -> &'static str {
        best_label(&self.domain_patterns, text)
    }
}

impl Default for TechnologyExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn word_pattern(name: &str) -> Regex {
    let pattern = format!(r"(?i)\b{}\b", regex::escape(name));
    Regex::new(&pattern).unwrap_or_else(|err| panic!("bad pattern for {name}: {err}"))
}

/// Keywords are anchored at the start of a word only: Russian stems
/// ("мобильн") still match their inflected forms, while short Latin
/// keywords ("ui", "api") cannot fire inside unrelated words.
fn stem_pattern(keyword: &str) -> Regex {
    let pattern = format!(r"(?i)\b{}", regex::escape(keyword));
    Regex::new(&pattern).unwrap_or_else(|err| panic!("bad pattern for {keyword}: {err}"))
}

fn keyword_patterns(
    table: &[(&'static str, &[&str])],
) -> Vec<(&'static str, Vec<Regex>)> {
    table
        .iter()
        .map(|(label, keywords)| {
            let patterns = keywords.iter().map(|kw| stem_pattern(kw)).collect();
            (*label, patterns)
        })
        .collect()
}

/// Score is the total occurrence count of the label's keywords.
fn best_label(patterns: &[(&'static str, Vec<Regex>)], text: &str) -> &'static str {
    let mut best = ("general", 0usize);
    for (label, keyword_patterns) in patterns {
        let score: usize = keyword_patterns
            .iter()
            .map(|pattern| pattern.find_iter(text).count())
            .sum();
        if score > best.1 {
            best = (label, score);
        }
    }
    best.0
}

/// hh.ru experience buckets mapped to coarse levels.
pub fn map_experience_level(raw: &str) -> &'static str {
    match raw.trim() {
        "Нет опыта" => "junior",
        "От 1 года до 3 лет" => "junior",
        "От 3 до 6 лет" => "middle",
        "Более 6 лет" => "senior",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frequencies(text: &str) -> Vec<(&'static str, usize)> {
        TechnologyExtractor::new()
            .extract(text)
            .into_iter()
            .map(|m| (m.technology.name, m.frequency))
            .collect()
    }

    #[test]
    fn counts_whole_word_occurrences() {
        let found = frequencies("Python, python и снова PYTHON. Docker один раз.");
        assert!(found.contains(&("Python", 3)));
        assert!(found.contains(&("Docker", 1)));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn java_does_not_match_javascript() {
        let found = frequencies("Ищем JavaScript-разработчика");
        assert!(found.iter().any(|(name, _)| *name == "JavaScript"));
        assert!(!found.iter().any(|(name, _)| *name == "Java"));
    }

    #[test]
    fn dotted_names_are_escaped() {
        let found = frequencies("Опыт с Node.js обязателен, Nodexjs не считается");
        assert_eq!(found, vec![("Node.js", 1)]);
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(frequencies("   ").is_empty());
    }

    #[test]
    fn picks_role_with_highest_score() {
        let extractor = TechnologyExtractor::new();
        let role =
            extractor.determine_role("Нужен backend инженер: backend сервисы, api, немного ui");
        assert_eq!(role, "backend");
        assert_eq!(extractor.determine_role("просто текст без ролей"), "general");
    }

    #[test]
    fn short_keywords_do_not_fire_inside_words() {
        let extractor = TechnologyExtractor::new();
        // "ui" must not match inside "suitable" or "guidelines".
        let role = extractor.determine_role("We require suitable equipment and clear guidelines");
        assert_eq!(role, "general");
    }

    #[test]
    fn russian_stems_match_inflected_forms() {
        let extractor = TechnologyExtractor::new();
        assert_eq!(
            extractor.determine_role("Мобильная разработка, мобильные приложения"),
            "mobile"
        );
    }

    #[test]
    fn picks_domain_keywords() {
        let extractor = TechnologyExtractor::new();
        assert_eq!(
            extractor.determine_domain("крупный банк ищет специалиста, финанс сектор"),
            "fintech"
        );
        assert_eq!(extractor.determine_domain("обычная контора"), "general");
    }

    #[test]
    fn maps_experience_buckets() {
        assert_eq!(map_experience_level("Нет опыта"), "junior");
        assert_eq!(map_experience_level("От 3 до 6 лет"), "middle");
        assert_eq!(map_experience_level("Более 6 лет"), "senior");
        assert_eq!(map_experience_level("что-то еще"), "unknown");
    }
}
