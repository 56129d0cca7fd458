//! Random request payloads for create/update tests.
//!
//! Values are realistic but arbitrary; tests should only assert that the
//! server echoes what was sent. Use [`Generator::seeded`] for repeatable
//! sequences.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::types::{CreatePost, UpdatePost};

/// User ids present in the placeholder data set
pub const USER_IDS: std::ops::RangeInclusive<u32> = 1..=10;

const WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "labore", "dolore", "magna", "aliqua", "enim", "minim",
    "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi", "aliquip",
    "commodo", "consequat", "aute", "irure", "reprehenderit", "voluptate", "velit", "esse",
    "cillum", "fugiat", "nulla", "pariatur",
];

const FIRST_NAMES: &[&str] = &[
    "ada", "alan", "grace", "linus", "barbara", "ken", "margaret", "dennis", "frances", "edsger",
];

const LAST_NAMES: &[&str] = &[
    "lovelace", "turing", "hopper", "torvalds", "liskov", "thompson", "hamilton", "ritchie",
    "allen", "dijkstra",
];

const DOMAINS: &[&str] = &["example.com", "example.org", "example.net"];

pub struct Generator {
    rng: StdRng,
}

impl Generator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn pick(&mut self, items: &[&'static str]) -> &'static str {
        items.choose(&mut self.rng).copied().unwrap_or_default()
    }

    fn words(&mut self, min: usize, max: usize) -> Vec<&'static str> {
        let count = self.rng.gen_range(min..=max);
        (0..count).map(|_| self.pick(WORDS)).collect()
    }

    /// Capitalized sentence ending with a period.
    pub fn sentence(&mut self) -> String {
        let mut sentence = capitalize(&self.words(4, 10).join(" "));
        sentence.push('.');
        sentence
    }

    /// Capitalized short phrase without punctuation.
    pub fn title(&mut self) -> String {
        capitalize(&self.words(3, 6).join(" "))
    }

    /// `count` paragraphs of 3 to 6 sentences, separated by blank lines.
    pub fn paragraphs(&mut self, count: usize) -> String {
        (0..count)
            .map(|_| {
                let sentences = self.rng.gen_range(3..=6);
                (0..sentences)
                    .map(|_| self.sentence())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn email(&mut self) -> String {
        let first = self.pick(FIRST_NAMES);
        let last = self.pick(LAST_NAMES);
        let number: u16 = self.rng.gen_range(1..1000);
        let domain = self.pick(DOMAINS);
        format!("{first}.{last}{number}@{domain}")
    }

    pub fn user_id(&mut self) -> u32 {
        self.rng.gen_range(USER_IDS)
    }

    pub fn create_post(&mut self) -> CreatePost {
        CreatePost {
            title: self.sentence(),
            body: self.paragraphs(2),
            user_id: self.user_id(),
        }
    }

    pub fn update_post(&mut self) -> UpdatePost {
        UpdatePost {
            title: self.sentence(),
            body: self.paragraphs(2),
            user_id: self.user_id(),
        }
    }

    pub fn create_posts(&mut self, count: usize) -> Vec<CreatePost> {
        (0..count).map(|_| self.create_post()).collect()
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A random `POST /posts` payload
pub fn create_post() -> CreatePost {
    Generator::new().create_post()
}

/// A random `PUT /posts/{id}` payload
pub fn update_post() -> UpdatePost {
    Generator::new().update_post()
}

pub fn create_posts(count: usize) -> Vec<CreatePost> {
    Generator::new().create_posts(count)
}

pub fn email() -> String {
    Generator::new().email()
}

pub fn title() -> String {
    Generator::new().title()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_generators_repeat() {
        let a = Generator::seeded(7).create_posts(3);
        let b = Generator::seeded(7).create_posts(3);
        assert_eq!(a, b);
    }

    #[test]
    fn create_post_fields_are_populated() {
        let mut gen = Generator::seeded(1);
        for post in gen.create_posts(20) {
            assert!(USER_IDS.contains(&post.user_id));
            assert!(post.title.ends_with('.'));
            assert!(post.title.chars().next().unwrap().is_uppercase());
            assert_eq!(post.body.split("\n\n").count(), 2);
        }
    }

    #[test]
    fn emails_look_like_emails() {
        let mut gen = Generator::seeded(2);
        for _ in 0..20 {
            let email = gen.email();
            let (local, domain) = email.split_once('@').unwrap();
            assert!(local.contains('.'));
            assert!(DOMAINS.contains(&domain), "{email}");
        }
    }

    #[test]
    fn title_has_no_trailing_period() {
        let title = Generator::seeded(3).title();
        assert!(!title.is_empty());
        assert!(!title.ends_with('.'));
        assert!((3..=6).contains(&title.split(' ').count()));
    }

    #[test]
    fn unseeded_helpers_produce_values() {
        assert_eq!(create_posts(4).len(), 4);
        assert!(!update_post().title.is_empty());
        assert!(email().contains('@'));
        assert!(!create_post().body.is_empty());
        assert!(!title().is_empty());
    }
}
