//! # Search Query Heuristic
//!
//! Picks up to three web search queries out of a free-text task.
//!
//! 1. Time-sensitive wording plus an "about/on/regarding X" phrase gives
//!    `"X latest news"`.
//! 2. The first two multi-word capitalized phrases are used as-is.
//! 3. With nothing found, a short task is searched verbatim.

use once_cell::sync::Lazy;
use regex::Regex;

/// Upper bound on the number of queries returned
pub const MAX_QUERIES: usize = 3;

/// Tasks at or above this length are never used as a verbatim query
pub const FALLBACK_MAX_CHARS: usize = 100;

const MAX_CAPITALIZED_PHRASES: usize = 2;
const MAX_TOPIC_WORDS: usize = 6;

const STOP_WORDS: [&str; 4] = ["The", "And", "For", "With"];
const ARTICLES: [&str; 3] = ["the", "a", "an"];
const TOPIC_BREAKS: [&str; 4] = ["right", "this", "these", "in"];

static CURRENCY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:current(?:ly)?|recent(?:ly)?|latest|today|now|updates?)\b|\b(?:19|20)\d{2}\b")
        .expect("Invalid currency regex")
});

static TOPIC_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:about|on|regarding)\s+").expect("Invalid topic regex"));

fn is_clause_end(c: char) -> bool {
    matches!(c, '.' | ',' | '!' | '?' | ';' | ':')
}

/// Whether the text asks about something time-sensitive
pub fn mentions_currency(text: &str) -> bool {
    CURRENCY.is_match(text)
}

/// Extract 0 to 3 search queries from `task`, in emission order.
pub fn extract_search_queries(task: &str) -> Vec<String> {
    let mut queries = Vec::new();

    if mentions_currency(task) {
        if let Some(topic) = topic_phrase(task) {
            queries.push(format!("{} latest news", topic));
        }
    }

    queries.extend(
        capitalized_phrases(task)
            .into_iter()
            .take(MAX_CAPITALIZED_PHRASES),
    );

    if queries.is_empty() && task.chars().count() < FALLBACK_MAX_CHARS {
        let stripped: String = task
            .chars()
            .filter(|c| !matches!(c, '.' | '!' | '?'))
            .collect();
        let stripped = stripped.trim();
        if !stripped.is_empty() {
            queries.push(stripped.to_string());
        }
    }

    queries.truncate(MAX_QUERIES);
    queries
}

/// Words following the first "about/on/regarding" that name a topic.
fn topic_phrase(task: &str) -> Option<String> {
    for marker in TOPIC_MARKER.find_iter(task) {
        let clause = task[marker.end()..]
            .split(is_clause_end)
            .next()
            .unwrap_or_default();

        let words: Vec<&str> = clause
            .split_whitespace()
            .skip_while(|w| ARTICLES.contains(&w.to_lowercase().as_str()))
            .take_while(|w| !ends_topic(w))
            .take(MAX_TOPIC_WORDS)
            .collect();

        if !words.is_empty() {
            return Some(words.join(" "));
        }
    }
    None
}

fn ends_topic(word: &str) -> bool {
    let lower = word.to_lowercase();
    mentions_currency(&lower) || TOPIC_BREAKS.contains(&lower.as_str())
}

/// Runs of two or more consecutive capitalized words.
fn capitalized_phrases(task: &str) -> Vec<String> {
    let mut phrases = Vec::new();
    let mut run: Vec<&str> = Vec::new();

    for raw in task.split_whitespace() {
        let word = raw.trim_matches(|c: char| !c.is_alphanumeric());
        let capitalized = word.chars().next().is_some_and(|c| c.is_uppercase());

        if !capitalized {
            flush_run(&mut run, &mut phrases);
            continue;
        }

        run.push(word);
        if raw.ends_with(is_clause_end) {
            flush_run(&mut run, &mut phrases);
        }
    }
    flush_run(&mut run, &mut phrases);

    phrases
}

fn flush_run<'a>(run: &mut Vec<&'a str>, phrases: &mut Vec<String>) {
    let start = run
        .iter()
        .position(|w| !STOP_WORDS.contains(w))
        .unwrap_or(run.len());
    let words = &run[start..];

    if words.len() >= 2 {
        let phrase = words.join(" ");
        if phrase.chars().count() > 3 {
            phrases.push(phrase);
        }
    }
    run.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_with_currency_comes_first() {
        let queries =
            extract_search_queries("What's the latest about Artificial Intelligence right now");
        assert_eq!(
            queries,
            vec![
                "Artificial Intelligence latest news".to_string(),
                "Artificial Intelligence".to_string(),
            ]
        );
    }

    #[test]
    fn test_year_counts_as_currency() {
        let queries = extract_search_queries("give me updates on rust async in 2025");
        assert_eq!(queries, vec!["rust async latest news".to_string()]);
    }

    #[test]
    fn test_topic_needs_currency() {
        let queries = extract_search_queries("Tell me about volcanoes!");
        assert_eq!(queries, vec!["Tell me about volcanoes".to_string()]);
    }

    #[test]
    fn test_short_plain_task_is_searched_verbatim() {
        let queries = extract_search_queries("how do bees make honey?");
        assert_eq!(queries, vec!["how do bees make honey".to_string()]);
    }

    #[test]
    fn test_long_plain_task_yields_nothing() {
        let task = "please write a long and thoughtful essay describing how bees make honey \
                    and why the process matters for the wider ecosystem";
        assert!(task.len() >= FALLBACK_MAX_CHARS);
        assert!(extract_search_queries(task).is_empty());
    }

    #[test]
    fn test_leading_stop_words_are_trimmed() {
        let queries = extract_search_queries("a report on The Great Barrier Reef");
        assert_eq!(queries, vec!["Great Barrier Reef".to_string()]);

        // A single word left after trimming is not a phrase
        let queries = extract_search_queries("cooking With Python");
        assert_eq!(queries, vec!["cooking With Python".to_string()]);
    }

    #[test]
    fn test_punctuation_splits_phrases() {
        let phrases = capitalized_phrases("Compare Mozilla Foundation, Linux Kernel and Apple Silicon");
        assert_eq!(
            phrases,
            vec!["Compare Mozilla Foundation", "Linux Kernel", "Apple Silicon"]
        );
    }

    #[test]
    fn test_never_more_than_three() {
        let queries = extract_search_queries(
            "Latest news about Rust Lang today: Mozilla Foundation, Linux Kernel and Apple Silicon",
        );
        assert_eq!(
            queries,
            vec![
                "Rust Lang latest news".to_string(),
                "Rust Lang".to_string(),
                "Mozilla Foundation".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_task() {
        assert!(extract_search_queries("").is_empty());
        assert!(extract_search_queries("?!.").is_empty());
    }
}
