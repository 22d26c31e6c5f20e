use std::collections::BTreeMap;

/// Query parameters of a location, keyed by parameter name.
pub type QueryMap = BTreeMap<String, String>;

/// The one external resource the synchronizer reads and writes.
///
/// On the community site this is the browser URL; here it is whatever the
/// host injects. `replace` overwrites the query in place, no history is
/// kept, so stepping through slides never piles up back entries.
pub trait Location {
    fn read(&self) -> QueryMap;
    fn replace(&mut self, query: QueryMap);
}

/// Parse a raw query string (`"slide=black-widow&x=1"`, with or without a
/// leading `?`) into a map. Malformed pairs are skipped rather than rejected.
pub fn parse_query(raw: &str) -> QueryMap {
    let raw = raw.trim_start_matches('?');
    let mut query = QueryMap::new();
    for pair in raw.split('&') {
        if pair.is_empty() {
            continue;
        }
        let mut parts = pair.splitn(2, '=');
        let key = parts.next().unwrap_or("");
        let value = parts.next().unwrap_or("");
        if !key.is_empty() {
            query.insert(key.to_string(), value.to_string());
        }
    }
    query
}

pub fn encode_query(query: &QueryMap) -> String {
    query
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// A shareable link: base address plus query. The rendered form is shown in
/// the GUI and can be copied; slugs are URL-safe by construction so no
/// percent-encoding is needed.
#[derive(Debug, Clone)]
pub struct ShareLink {
    base: String,
    query: QueryMap,
}

impl ShareLink {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.to_string(),
            query: QueryMap::new(),
        }
    }

    /// Build a link carrying an initial query string, e.g. one pasted on
    /// the command line for deep-link restoration.
    pub fn with_query(base: &str, raw_query: &str) -> Self {
        Self {
            base: base.to_string(),
            query: parse_query(raw_query),
        }
    }

    pub fn href(&self) -> String {
        if self.query.is_empty() {
            self.base.clone()
        } else {
            format!("{}?{}", self.base, encode_query(&self.query))
        }
    }
}

impl Location for ShareLink {
    fn read(&self) -> QueryMap {
        self.query.clone()
    }

    fn replace(&mut self, query: QueryMap) {
        self.query = query;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_handles_leading_question_mark() {
        let q = parse_query("?slide=black-widow");
        assert_eq!(q.get("slide").map(String::as_str), Some("black-widow"));
    }

    #[test]
    fn parse_skips_malformed_pairs() {
        let q = parse_query("slide=ok&&=novalue&bare");
        assert_eq!(q.get("slide").map(String::as_str), Some("ok"));
        assert_eq!(q.get("bare").map(String::as_str), Some(""));
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn encode_round_trips() {
        let q = parse_query("a=1&slide=pride-month-2021");
        assert_eq!(parse_query(&encode_query(&q)), q);
    }

    #[test]
    fn replace_overwrites_in_place() {
        let mut link = ShareLink::with_query("https://example.org/gallery", "slide=old");
        let mut q = link.read();
        q.insert("slide".to_string(), "new".to_string());
        link.replace(q);
        assert_eq!(link.href(), "https://example.org/gallery?slide=new");
    }

    #[test]
    fn href_without_query_is_bare_base() {
        let link = ShareLink::new("https://example.org/gallery");
        assert_eq!(link.href(), "https://example.org/gallery");
    }
}
