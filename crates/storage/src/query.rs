use std::cmp::Ordering;

use memlog_protocol::{QueryOptions, SortField, SortOrder};
use serde::Serialize;

use crate::capacity::Usage;
use crate::entry::Entry;

/// Resultado paginado de uma consulta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryResult {
    pub items: Vec<Entry>,
    /// Total após o filtro, antes da paginação.
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    /// Uso do store inteiro no instante do snapshot.
    pub usage: Usage,
}

/// Executa filtro, ordenação e paginação sobre um snapshot em ordem de
/// chegada. Não toca em nenhum lock.
pub fn run(snapshot: &[Entry], usage: Usage, options: &QueryOptions) -> QueryResult {
    let options = options.clone().normalized();

    let mut matches = filter(snapshot, &options);
    sort(&mut matches, options.sort_by, options.sort_order);

    let total = matches.len();
    let start = options.offset();
    let items = if start >= total {
        Vec::new()
    } else {
        let end = start.saturating_add(options.page_size).min(total);
        matches.drain(start..end).collect()
    };

    QueryResult {
        items,
        total,
        page: options.page,
        page_size: options.page_size,
        usage,
    }
}

pub fn matches(entry: &Entry, options: &QueryOptions) -> bool {
    if options.start_time.is_some_and(|start| entry.timestamp < start) {
        return false;
    }
    if options.end_time.is_some_and(|end| entry.timestamp > end) {
        return false;
    }
    match options.text.as_deref() {
        Some(text) => entry.content.contains(text),
        None => true,
    }
}

fn filter(snapshot: &[Entry], options: &QueryOptions) -> Vec<Entry> {
    if options.top_n == 0 {
        return snapshot
            .iter()
            .filter(|e| matches(e, options))
            .cloned()
            .collect();
    }

    // topN: varre do mais novo para o mais antigo e para no N-ésimo match
    let mut newest: Vec<Entry> = snapshot
        .iter()
        .rev()
        .filter(|e| matches(e, options))
        .take(options.top_n)
        .cloned()
        .collect();
    newest.reverse();
    newest
}

fn sort(entries: &mut [Entry], field: SortField, order: SortOrder) {
    entries.sort_by(|a, b| {
        let ord = compare(a, b, field);
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

// Empate no campo é decidido pela ordem de chegada.
fn compare(a: &Entry, b: &Entry, field: SortField) -> Ordering {
    let by_field = match field {
        SortField::Time => a.timestamp.cmp(&b.timestamp),
        SortField::Content => a.content.cmp(&b.content),
    };
    by_field.then(a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    /// Entradas com um segundo de diferença entre si, em ordem de chegada.
    fn entries(contents: &[&str]) -> Vec<Entry> {
        contents
            .iter()
            .enumerate()
            .map(|(i, c)| Entry::new(i as u64, base() + Duration::seconds(i as i64), *c))
            .collect()
    }

    fn contents(result: &QueryResult) -> Vec<&str> {
        result.items.iter().map(|e| &*e.content).collect()
    }

    fn usage(snapshot: &[Entry]) -> Usage {
        Usage::of(snapshot)
    }

    #[test]
    fn default_sort_is_newest_first() {
        let snap = entries(&["a", "b", "c"]);
        let result = run(&snap, usage(&snap), &QueryOptions::default());
        assert_eq!(contents(&result), vec!["c", "b", "a"]);
        assert_eq!(result.total, 3);
        assert_eq!(result.usage.entries, 3);
    }

    #[test]
    fn time_bounds_are_inclusive() {
        let snap = entries(&["a", "b", "c", "d", "e"]);
        let options = QueryOptions {
            start_time: Some(base() + Duration::seconds(1)),
            end_time: Some(base() + Duration::seconds(3)),
            sort_order: SortOrder::Asc,
            ..Default::default()
        };
        let result = run(&snap, usage(&snap), &options);
        assert_eq!(contents(&result), vec!["b", "c", "d"]);
        assert_eq!(result.total, 3);
    }

    #[test]
    fn text_filter_is_case_sensitive() {
        let snap = entries(&["ERROR disk", "error net", "INFO ok", "ERROR cpu"]);
        let options = QueryOptions {
            text: Some("ERROR".into()),
            sort_order: SortOrder::Asc,
            ..Default::default()
        };
        let result = run(&snap, usage(&snap), &options);
        assert_eq!(contents(&result), vec!["ERROR disk", "ERROR cpu"]);
        assert!(result.items.iter().all(|e| matches(e, &options)));
    }

    #[test]
    fn sort_by_content() {
        let snap = entries(&["pear", "apple", "fig"]);
        let asc = QueryOptions {
            sort_by: SortField::Content,
            sort_order: SortOrder::Asc,
            ..Default::default()
        };
        let result = run(&snap, usage(&snap), &asc);
        assert_eq!(contents(&result), vec!["apple", "fig", "pear"]);

        let desc = QueryOptions {
            sort_order: SortOrder::Desc,
            ..asc
        };
        let result = run(&snap, usage(&snap), &desc);
        assert_eq!(contents(&result), vec!["pear", "fig", "apple"]);
    }

    #[test]
    fn equal_keys_follow_arrival_order() {
        let ts = base();
        let snap = vec![
            Entry::new(0, ts, "same"),
            Entry::new(1, ts, "same"),
            Entry::new(2, ts, "same"),
        ];
        let asc = QueryOptions {
            sort_order: SortOrder::Asc,
            ..Default::default()
        };
        let ids: Vec<u64> = run(&snap, usage(&snap), &asc).items.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);

        let ids: Vec<u64> = run(&snap, usage(&snap), &QueryOptions::default())
            .items
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![2, 1, 0]);
    }

    #[test]
    fn top_n_keeps_most_recent_matches_before_sort() {
        let snap = entries(&["x1", "y", "x2", "x3", "y", "x4"]);
        let options = QueryOptions {
            text: Some("x".into()),
            top_n: 2,
            sort_by: SortField::Content,
            sort_order: SortOrder::Asc,
            ..Default::default()
        };
        let result = run(&snap, usage(&snap), &options);
        assert_eq!(contents(&result), vec!["x3", "x4"]);
        assert_eq!(result.total, 2);
    }

    #[test]
    fn top_n_larger_than_matches() {
        let snap = entries(&["a", "b"]);
        let options = QueryOptions {
            top_n: 10,
            ..Default::default()
        };
        assert_eq!(run(&snap, usage(&snap), &options).total, 2);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let snap = entries(&["a", "b", "c"]);
        let options = QueryOptions {
            page: 3,
            page_size: 2,
            ..Default::default()
        };
        let result = run(&snap, usage(&snap), &options);
        assert!(result.items.is_empty());
        assert_eq!(result.total, 3);
        assert_eq!(result.page, 3);
    }

    #[test]
    fn last_page_is_partial() {
        let snap = entries(&["a", "b", "c", "d", "e"]);
        let options = QueryOptions {
            page: 3,
            page_size: 2,
            sort_order: SortOrder::Asc,
            ..Default::default()
        };
        assert_eq!(contents(&run(&snap, usage(&snap), &options)), vec!["e"]);
    }

    #[test]
    fn pages_concatenate_to_full_sequence() {
        let names: Vec<String> = (0..23).map(|i| format!("line {i:02}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let snap = entries(&refs);

        let all = QueryOptions {
            page_size: 1000,
            sort_by: SortField::Content,
            ..Default::default()
        };
        let full: Vec<u64> = run(&snap, usage(&snap), &all).items.iter().map(|e| e.id).collect();

        let mut paged = Vec::new();
        let total = run(&snap, usage(&snap), &all).total;
        let page_size = 5;
        for page in 1..=total.div_ceil(page_size) {
            let options = QueryOptions {
                page,
                page_size,
                ..all.clone()
            };
            paged.extend(run(&snap, usage(&snap), &options).items.iter().map(|e| e.id));
        }
        assert_eq!(paged, full);
        assert_eq!(paged.len(), 23);
    }

    #[test]
    fn invalid_options_are_normalized() {
        let snap = entries(&["a"]);
        let options = QueryOptions {
            page: 0,
            page_size: 0,
            ..Default::default()
        };
        let result = run(&snap, usage(&snap), &options);
        assert_eq!(result.page, 1);
        assert_eq!(result.page_size, 50);
        assert_eq!(result.items.len(), 1);
    }
}
