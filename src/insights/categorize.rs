// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::CategoryGuess;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::HashMap;

pub const OTHER: &str = "other";

/// Keyword table in tie-break order: on equal match counts the category
/// declared first wins.
pub static CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "marketing",
        &[
            "marketing",
            "ads",
            "advertis",
            "campaign",
            "promotion",
            "seo",
            "social media",
            "facebook",
            "google ads",
            "linkedin",
            "sponsor",
            "influencer",
        ],
    ),
    (
        "software",
        &[
            "software",
            "saas",
            "license",
            "subscription",
            "aws",
            "azure",
            "github",
            "slack",
            "zoom",
            "adobe",
            "microsoft",
            "hosting",
            "domain",
        ],
    ),
    (
        "rent",
        &["rent", "lease", "landlord", "office space", "coworking"],
    ),
    (
        "utilities",
        &[
            "utility",
            "utilities",
            "electric",
            "water bill",
            "gas bill",
            "internet",
            "broadband",
            "phone bill",
        ],
    ),
    (
        "travel",
        &[
            "travel", "flight", "airline", "hotel", "airbnb", "uber", "lyft", "taxi", "train",
            "trip", "mileage",
        ],
    ),
    (
        "office_supplies",
        &[
            "office supplies",
            "supplies",
            "stationery",
            "paper",
            "printer",
            "toner",
            "pens",
            "furniture",
            "desk",
            "chair",
        ],
    ),
    (
        "payroll",
        &[
            "salary",
            "payroll",
            "wage",
            "bonus",
            "contractor",
            "freelance",
            "stipend",
            "commission",
        ],
    ),
    (OTHER, &[]),
];

/// Keyword-scored category guess for an expense. `_amount` does not influence
/// the outcome.
pub fn categorize(title: &str, description: &str, _amount: Decimal) -> CategoryGuess {
    let text = format!("{} {}", title, description).to_lowercase();

    let mut best: Option<(&str, usize)> = None;
    for (category, keywords) in CATEGORY_KEYWORDS {
        if *category == OTHER {
            continue;
        }
        let score = keywords.iter().filter(|k| text.contains(*k)).count();
        match best {
            Some((_, s)) if score <= s => {}
            _ => best = Some((*category, score)),
        }
    }

    match best {
        Some((category, score)) if score > 0 => CategoryGuess {
            category: category.to_string(),
            confidence: (0.7 + 0.1 * score as f64).min(0.98),
        },
        _ => CategoryGuess {
            category: OTHER.to_string(),
            confidence: 0.5,
        },
    }
}

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w]+").expect("static regex"));

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "was", "are", "be", "been", "this", "that", "into",
];

/// Most frequent meaningful words of a free-text description. Words of three
/// characters or fewer and stop words are dropped; ties keep first occurrence.
pub fn extract_keywords(text: &str, top_n: usize) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut order: Vec<&str> = Vec::new();
    let mut freq: HashMap<&str, usize> = HashMap::new();
    for word in NON_WORD.split(&lowered) {
        if word.chars().count() <= 3 || STOP_WORDS.contains(&word) {
            continue;
        }
        let count = freq.entry(word).or_insert(0);
        if *count == 0 {
            order.push(word);
        }
        *count += 1;
    }
    // stable sort keeps first-occurrence order among equal counts
    order.sort_by(|a, b| freq[b].cmp(&freq[a]));
    order
        .into_iter()
        .take(top_n)
        .map(|w| w.to_string())
        .collect()
}
