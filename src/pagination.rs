//! Char-based pagination for LangSmith runs and messages.
//!
//! Stateless: each request fetches all records for the trace (up to a safe
//! bound), builds pages by character budget, and returns the requested page
//! only. No cursor, no offset, no server-side state. Optimized for LLM
//! callers (simple integers).

use serde_json::{Map, Value, json};

/// LangSmith API maximum for runs fetched per trace; do not exceed.
pub const MAX_RUNS_PER_TRACE: usize = 100;

/// Hard cap for trace pagination: pages cannot exceed this character budget.
pub const MAX_CHARS_PER_PAGE: usize = 30_000;

/// Default page budget when the caller does not supply one.
pub const DEFAULT_MAX_CHARS_PER_PAGE: usize = 25_000;

/// Default per-string preview length applied before pagination.
pub const DEFAULT_PREVIEW_CHARS: usize = 150;

/// Ceiling for the truncation-length binary search when the input contains
/// no string long enough to derive a tighter bound from.
const DEFAULT_SEARCH_CEILING: usize = 100_000;

const TRUNCATED_SUFFIX: &str = "\n… (output truncated, exceeded max_chars_per_page)";

/// Headroom reserved when cutting the degenerate preview, so a cut landing
/// mid-escape-sequence cannot push the wrapper past the budget.
const PREVIEW_OVERHEAD: usize = 1_000;

// === Options ===

/// JSON rendering style used both to measure and to deliver a page.
///
/// The budget check is only meaningful if the measured encoding is the one
/// the caller will ultimately receive, so every size computation in this
/// module goes through the same style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    Compact,
    Pretty,
}

impl JsonStyle {
    /// Render a value in this style.
    #[must_use]
    pub fn render(self, value: &Value) -> String {
        match self {
            JsonStyle::Compact => value.to_string(),
            JsonStyle::Pretty => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }

    fn char_count(self, value: &Value) -> usize {
        self.render(value).chars().count()
    }
}

/// Knobs that varied between the runs and messages pagination paths,
/// collapsed into one parameterized driver.
#[derive(Debug, Clone)]
pub struct PaginateOptions {
    /// Key the selected records are returned under ("runs", "result", ...).
    pub items_key: &'static str,
    /// Serialization style the budget is enforced against.
    pub style: JsonStyle,
    /// Upper clamp for the truncation-length search space.
    pub search_ceiling: usize,
}

impl Default for PaginateOptions {
    fn default() -> Self {
        Self {
            items_key: "runs",
            style: JsonStyle::Compact,
            search_ceiling: DEFAULT_SEARCH_CEILING,
        }
    }
}

impl PaginateOptions {
    /// Options for message-history pages ("result" key, compact JSON).
    #[must_use]
    pub fn messages() -> Self {
        Self {
            items_key: "result",
            ..Self::default()
        }
    }
}

// === String Truncator ===

/// Recursively truncate long strings to `max_len` characters, suffixing each
/// cut with `… (+N chars)`. `max_len == 0` disables truncation entirely.
///
/// Never mutates the input; always returns a fresh value.
#[must_use]
pub fn truncate_strings(value: &Value, max_len: usize) -> Value {
    if max_len == 0 {
        return value.clone();
    }
    match value {
        Value::String(s) => {
            let total = s.chars().count();
            if total <= max_len {
                value.clone()
            } else {
                let kept: String = s.chars().take(max_len).collect();
                Value::String(format!("{kept}… (+{} chars)", total - max_len))
            }
        }
        Value::Object(map) => {
            let truncated: Map<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), truncate_strings(v, max_len)))
                .collect();
            Value::Object(truncated)
        }
        Value::Array(items) => {
            Value::Array(items.iter().map(|v| truncate_strings(v, max_len)).collect())
        }
        _ => value.clone(),
    }
}

// === Page Partitioner ===

/// Character count of one compact-serialized record, used for the running
/// page total. Summing individual records undercounts the bracket/comma
/// overhead of the serialized list; that is an intentional approximation,
/// and `enforce_page_budget` is what guarantees the real bound.
#[must_use]
pub fn record_char_count(record: &Value) -> usize {
    JsonStyle::Compact.char_count(record)
}

/// Split records into pages by character budget (compact JSON length).
/// A single record that alone exceeds the budget is placed alone on a page;
/// records are never split. Empty input yields zero pages.
#[must_use]
pub fn build_pages(records: &[Value], max_chars: usize) -> Vec<Vec<Value>> {
    if records.is_empty() {
        return Vec::new();
    }

    let mut pages: Vec<Vec<Value>> = Vec::new();
    let mut current: Vec<Value> = Vec::new();
    let mut current_chars = 0usize;

    for record in records {
        let chars = record_char_count(record);
        if current_chars + chars > max_chars && !current.is_empty() {
            pages.push(std::mem::take(&mut current));
            current_chars = 0;
        }
        current.push(record.clone());
        current_chars += chars;
    }

    if !current.is_empty() {
        pages.push(current);
    }
    pages
}

// === Page-Budget Enforcer ===

fn longest_string_chars(value: &Value) -> usize {
    match value {
        Value::String(s) => s.chars().count(),
        Value::Object(map) => map.values().map(longest_string_chars).max().unwrap_or(0),
        Value::Array(items) => items.iter().map(longest_string_chars).max().unwrap_or(0),
        _ => 0,
    }
}

fn with_items(page: &Map<String, Value>, items_key: &str, items: Vec<Value>) -> Value {
    let mut out = page.clone();
    out.insert(items_key.to_string(), Value::Array(items));
    Value::Object(out)
}

/// Enforce the page character budget on an assembled page object.
///
/// If the serialized page exceeds `max_chars`, binary-search the largest
/// per-string truncation length whose result fits. The relationship between
/// truncation length and serialized size is monotonic but non-linear (JSON
/// escaping, nesting, varying string counts per record), so a search is both
/// simpler and more robust than modelling the escaping overhead exactly.
///
/// If even maximal truncation cannot fit, returns the degenerate truncated
/// page: empty item list, `_truncated: true`, and a budget-bounded preview
/// of the over-budget JSON. The preview itself may be invalid JSON; only the
/// outer wrapper is held within the declared overhead at that point.
#[must_use]
pub fn enforce_page_budget(page: Value, max_chars: usize, opts: &PaginateOptions) -> Value {
    if opts.style.char_count(&page) <= max_chars {
        return page;
    }

    let Value::Object(page_map) = page else {
        return page;
    };
    let items: Vec<Value> = match page_map.get(opts.items_key) {
        Some(Value::Array(items)) if !items.is_empty() => items.clone(),
        _ => return Value::Object(page_map),
    };

    // Search space derived from the longest string present: any larger
    // truncation length is a no-op, so probing beyond it is wasted work.
    let derived_hi = items
        .iter()
        .map(longest_string_chars)
        .max()
        .unwrap_or(0)
        .min(opts.search_ceiling);
    if derived_hi == 0 {
        // No string content to shorten; nothing can bring this page under
        // budget.
        return degenerate_page(&page_map, &items, max_chars, opts);
    }

    let mut low = 1usize;
    let mut high = derived_hi;
    let mut best: Option<Value> = None;

    while low <= high {
        let mid = low + (high - low) / 2;
        let truncated: Vec<Value> = items.iter().map(|it| truncate_strings(it, mid)).collect();
        let candidate = with_items(&page_map, opts.items_key, truncated);
        if opts.style.char_count(&candidate) <= max_chars {
            best = Some(candidate);
            low = mid + 1;
        } else {
            if mid == 1 {
                break;
            }
            high = mid - 1;
        }
    }

    match best {
        Some(candidate) => candidate,
        None => degenerate_page(&page_map, &items, max_chars, opts),
    }
}

/// Last-resort sentinel page: nothing fit, so return an explicit truncated
/// result with a cut preview of what would have been sent.
fn degenerate_page(
    page: &Map<String, Value>,
    items: &[Value],
    max_chars: usize,
    opts: &PaginateOptions,
) -> Value {
    let fully_truncated: Vec<Value> = items.iter().map(|it| truncate_strings(it, 1)).collect();
    let best_effort = with_items(page, opts.items_key, fully_truncated);
    let rendered = opts.style.render(&best_effort);

    let suffix_len = TRUNCATED_SUFFIX.chars().count();
    // Halved to reserve headroom against JSON-escaping expansion when the
    // cut lands mid-escape-sequence.
    let safe_preview_len = max_chars.saturating_sub(suffix_len + PREVIEW_OVERHEAD) / 2;
    let preview_max = safe_preview_len.max(100);
    let preview: String = rendered.chars().take(preview_max).collect();

    let mut out = Map::new();
    for (key, value) in page {
        if key != opts.items_key {
            out.insert(key.clone(), value.clone());
        }
    }
    out.insert(opts.items_key.to_string(), Value::Array(Vec::new()));
    out.insert("max_chars_per_page".to_string(), json!(max_chars));
    out.insert("_truncated".to_string(), Value::Bool(true));
    out.insert(
        "_truncated_message".to_string(),
        Value::String("Page exceeded character budget; content truncated.".to_string()),
    );
    out.insert(
        "_truncated_preview".to_string(),
        Value::String(format!("{preview}{TRUNCATED_SUFFIX}")),
    );
    Value::Object(out)
}

// === Pagination Driver ===

/// Return one page of records (char-based pagination).
///
/// - Applies `preview_chars` truncation to each record if `preview_chars > 0`.
/// - Builds pages by accumulating JSON length up to `max_chars_per_page`.
/// - `page_number` is 1-based. Out-of-range returns an empty item list — not
///   an error.
/// - The returned page JSON never exceeds `max_chars_per_page` unless the
///   result carries `_truncated: true`.
#[must_use]
pub fn paginate(
    records: &[Value],
    page_number: i64,
    max_chars_per_page: usize,
    preview_chars: usize,
    opts: &PaginateOptions,
) -> Value {
    let records: Vec<Value> = if preview_chars > 0 {
        records
            .iter()
            .map(|r| truncate_strings(r, preview_chars))
            .collect()
    } else {
        records.to_vec()
    };

    let pages = build_pages(&records, max_chars_per_page);
    let total_pages = pages.len();

    let selected: Vec<Value> = if page_number < 1 || page_number as usize > total_pages {
        Vec::new()
    } else {
        pages[page_number as usize - 1].clone()
    };

    let page = json!({
        opts.items_key: selected,
        "page_number": page_number,
        "total_pages": total_pages,
        "max_chars_per_page": max_chars_per_page,
        "preview_chars": preview_chars,
    });
    enforce_page_budget(page, max_chars_per_page, opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// A record whose compact JSON is exactly `chars` characters long.
    fn record_of_size(chars: usize, fill: char) -> Value {
        // {"k":"…"} carries 8 chars of structure around the payload.
        assert!(chars > 8);
        let payload: String = std::iter::repeat_n(fill, chars - 8).collect();
        json!({ "k": payload })
    }

    #[test]
    fn record_of_size_is_exact() {
        assert_eq!(record_char_count(&record_of_size(100, 'a')), 100);
    }

    // --- String Truncator ---

    #[test]
    fn truncate_zero_is_identity() {
        let v = json!({"a": "x".repeat(500), "b": [1, 2, 3]});
        assert_eq!(truncate_strings(&v, 0), v);
    }

    #[test]
    fn truncate_short_strings_unchanged() {
        let v = json!({"a": "hello"});
        assert_eq!(truncate_strings(&v, 10), v);
    }

    #[test]
    fn truncate_long_string_appends_elided_count() {
        let v = json!("x".repeat(500));
        let out = truncate_strings(&v, 50);
        let s = out.as_str().unwrap();
        assert_eq!(s, format!("{}… (+450 chars)", "x".repeat(50)));
    }

    #[test]
    fn truncate_recurses_into_maps_and_arrays() {
        let v = json!({
            "outer": {"inner": "y".repeat(20)},
            "list": ["z".repeat(20), 7, true, null],
        });
        let out = truncate_strings(&v, 5);
        assert_eq!(out["outer"]["inner"], json!("yyyyy… (+15 chars)"));
        assert_eq!(out["list"][0], json!("zzzzz… (+15 chars)"));
        assert_eq!(out["list"][1], json!(7));
        assert_eq!(out["list"][2], json!(true));
        assert_eq!(out["list"][3], Value::Null);
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        let v = json!("é".repeat(10));
        let out = truncate_strings(&v, 4);
        assert_eq!(out, json!(format!("{}… (+6 chars)", "é".repeat(4))));
    }

    #[test]
    fn truncate_is_idempotent() {
        let v = json!({"a": "w".repeat(300), "b": {"c": "q".repeat(40)}});
        for len in [1usize, 10, 50, 500] {
            let once = truncate_strings(&v, len);
            let twice = truncate_strings(&once, len);
            assert_eq!(once, twice, "not idempotent at max_len={len}");
        }
    }

    // --- Page Partitioner ---

    #[test]
    fn empty_input_yields_zero_pages() {
        assert!(build_pages(&[], 1000).is_empty());
    }

    #[test]
    fn exact_fit_splits_two_then_one() {
        let records = vec![
            record_of_size(100, 'a'),
            record_of_size(100, 'b'),
            record_of_size(100, 'c'),
        ];
        let pages = build_pages(&records, 250);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0], records[..2].to_vec());
        assert_eq!(pages[1], records[2..].to_vec());
    }

    #[test]
    fn partition_preserves_every_record_in_order() {
        let records: Vec<Value> = (0..23)
            .map(|i| json!({"id": i, "body": "x".repeat(17 * (i % 5) + 1)}))
            .collect();
        let pages = build_pages(&records, 120);
        let rejoined: Vec<Value> = pages.into_iter().flatten().collect();
        assert_eq!(rejoined, records);
    }

    #[test]
    fn partition_pages_respect_budget_sum() {
        let records: Vec<Value> = (0..12).map(|_| record_of_size(60, 'r')).collect();
        for page in build_pages(&records, 200) {
            let total: usize = page.iter().map(record_char_count).sum();
            assert!(total <= 200, "page sum {total} exceeds budget");
        }
    }

    #[test]
    fn oversized_record_sits_alone() {
        let records = vec![
            record_of_size(50, 'a'),
            record_of_size(500, 'b'),
            record_of_size(50, 'c'),
        ];
        let pages = build_pages(&records, 100);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[1].len(), 1);
        assert_eq!(pages[1][0], records[1]);
    }

    // --- Page-Budget Enforcer ---

    #[test]
    fn enforcer_passes_fitting_page_through_unchanged() {
        let page = json!({"runs": [{"a": 1}], "page_number": 1, "total_pages": 1});
        let opts = PaginateOptions::default();
        assert_eq!(
            enforce_page_budget(page.clone(), 10_000, &opts),
            page
        );
    }

    #[test]
    fn enforcer_truncates_strings_to_fit_budget() {
        let runs: Vec<Value> = (0..4).map(|i| json!({"id": i, "text": "t".repeat(2_000)})).collect();
        let page = json!({
            "runs": runs,
            "page_number": 1,
            "total_pages": 1,
            "max_chars_per_page": 1_500,
            "preview_chars": 0,
        });
        let opts = PaginateOptions::default();
        let out = enforce_page_budget(page, 1_500, &opts);
        assert_eq!(out.get("_truncated"), None);
        assert!(opts.style.char_count(&out) <= 1_500);
        // Records are still present, just shortened.
        assert_eq!(out["runs"].as_array().unwrap().len(), 4);
        let text = out["runs"][0]["text"].as_str().unwrap();
        assert!(text.contains("… (+"));
    }

    #[test]
    fn enforcer_falls_back_to_degenerate_page() {
        // Many sibling fields: fixed key overhead alone exceeds the budget,
        // so no amount of string truncation can fit.
        let mut fields = Map::new();
        for i in 0..50 {
            fields.insert(format!("field_{i:02}"), json!("v".repeat(40)));
        }
        let page = json!({
            "runs": [Value::Object(fields)],
            "page_number": 1,
            "total_pages": 1,
            "max_chars_per_page": 200,
            "preview_chars": 0,
        });
        let opts = PaginateOptions::default();
        let out = enforce_page_budget(page, 200, &opts);

        assert_eq!(out["_truncated"], json!(true));
        assert_eq!(out["runs"], json!([]));
        assert_eq!(out["page_number"], json!(1));
        assert_eq!(out["total_pages"], json!(1));
        let preview = out["_truncated_preview"].as_str().unwrap();
        assert!(!preview.is_empty());
        assert!(preview.ends_with(TRUNCATED_SUFFIX));
        // Preview is bounded relative to the budget: at most the 100-char
        // floor plus the fixed suffix here, since the budget is tiny.
        assert!(preview.chars().count() <= 100 + TRUNCATED_SUFFIX.chars().count());
    }

    #[test]
    fn enforcer_budget_guarantee_over_varied_inputs() {
        let opts = PaginateOptions::default();
        for budget in [300usize, 800, 2_000, 10_000] {
            let runs: Vec<Value> = (0..6)
                .map(|i| json!({"id": i, "a": "α".repeat(700), "b": "plain".repeat(90)}))
                .collect();
            let page = json!({
                "runs": runs,
                "page_number": 1,
                "total_pages": 1,
                "max_chars_per_page": budget,
                "preview_chars": 0,
            });
            let out = enforce_page_budget(page, budget, &opts);
            if out.get("_truncated").is_none() {
                assert!(
                    opts.style.char_count(&out) <= budget,
                    "budget {budget} violated without truncation sentinel"
                );
            }
        }
    }

    #[test]
    fn enforcer_measures_in_delivery_style() {
        // A page that fits compact but not pretty must be truncated when the
        // delivery style is pretty.
        let runs: Vec<Value> = (0..10).map(|i| json!({"id": i, "text": "m".repeat(40)})).collect();
        let page = json!({
            "runs": runs,
            "page_number": 1,
            "total_pages": 1,
        });
        let compact_len = JsonStyle::Compact.char_count(&page);
        let pretty_len = JsonStyle::Pretty.char_count(&page);
        assert!(pretty_len > compact_len);

        let budget = compact_len + (pretty_len - compact_len) / 2;
        let pretty_opts = PaginateOptions {
            style: JsonStyle::Pretty,
            ..PaginateOptions::default()
        };
        let out = enforce_page_budget(page.clone(), budget, &pretty_opts);
        if out.get("_truncated").is_none() {
            assert!(JsonStyle::Pretty.char_count(&out) <= budget);
            assert_ne!(out, page, "pretty-measured page should have been shrunk");
        }

        let compact_opts = PaginateOptions::default();
        assert_eq!(enforce_page_budget(page.clone(), budget, &compact_opts), page);
    }

    // --- Pagination Driver ---

    #[test]
    fn empty_records_page_one_yields_empty_items() {
        let out = paginate(&[], 1, 1_000, 0, &PaginateOptions::default());
        assert_eq!(out["runs"], json!([]));
        assert_eq!(out["total_pages"], json!(0));
        assert_eq!(out["page_number"], json!(1));
    }

    #[test]
    fn out_of_range_page_is_empty_not_error() {
        let records = vec![record_of_size(50, 'a'), record_of_size(50, 'b')];
        let opts = PaginateOptions::default();
        for page_number in [0i64, -3, 99] {
            let out = paginate(&records, page_number, 1_000, 0, &opts);
            assert_eq!(out["runs"], json!([]));
            assert_eq!(out["total_pages"], json!(1));
            assert_eq!(out["page_number"], json!(page_number));
        }
    }

    #[test]
    fn preview_truncation_applies_before_partitioning() {
        let records = vec![json!({"content": "s".repeat(500)})];
        let out = paginate(&records, 1, 10_000, 50, &PaginateOptions::default());
        let content = out["runs"][0]["content"].as_str().unwrap();
        assert_eq!(content, format!("{}… (+450 chars)", "s".repeat(50)));
        assert_eq!(out["preview_chars"], json!(50));
    }

    #[test]
    fn messages_driver_uses_result_key() {
        let records = vec![json!({"role": "user", "content": "hi"})];
        let out = paginate(&records, 1, 5_000, 0, &PaginateOptions::messages());
        assert_eq!(out["result"].as_array().unwrap().len(), 1);
        assert!(out.get("runs").is_none());
    }

    #[test]
    fn driver_metadata_is_complete() {
        let records = vec![record_of_size(40, 'a')];
        let out = paginate(&records, 1, 500, 20, &PaginateOptions::default());
        for key in ["runs", "page_number", "total_pages", "max_chars_per_page", "preview_chars"] {
            assert!(out.get(key).is_some(), "missing {key}");
        }
        assert_eq!(out["max_chars_per_page"], json!(500));
    }

    #[test]
    fn driver_never_exceeds_budget_end_to_end() {
        let records: Vec<Value> = (0..30)
            .map(|i| json!({"id": i, "blob": "b".repeat(400 + i * 13)}))
            .collect();
        let opts = PaginateOptions::default();
        let total_pages = build_pages(&records, 900).len();
        for page_number in 1..=total_pages as i64 {
            let out = paginate(&records, page_number, 900, 0, &opts);
            if out.get("_truncated").is_none() {
                let size = opts.style.char_count(&out);
                assert!(size <= 900, "page {page_number} is {size} chars");
            }
        }
    }
}
