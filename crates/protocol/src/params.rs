use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::query::{QueryOptions, SortField, SortOrder};

/// Parâmetros de consulta crus, como chegam na query string.
///
/// Cada campo é convertido de forma independente: valor inválido vira o
/// default daquele campo e não invalida os outros.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub start_time: Option<String>,
    pub start_date: Option<String>,
    pub end_time: Option<String>,
    pub end_date: Option<String>,
    pub q: Option<String>,
    pub keyword: Option<String>,
    pub top_n: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Start,
    End,
}

impl QueryParams {
    /// Monta a partir dos pares chave/valor da query string. Chave repetida
    /// fica com o primeiro valor; chaves desconhecidas são ignoradas.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> QueryParams
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = QueryParams::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "page" => &mut params.page,
                "pageSize" => &mut params.page_size,
                "startTime" => &mut params.start_time,
                "startDate" => &mut params.start_date,
                "endTime" => &mut params.end_time,
                "endDate" => &mut params.end_date,
                "q" => &mut params.q,
                "keyword" => &mut params.keyword,
                "topN" => &mut params.top_n,
                "sortBy" => &mut params.sort_by,
                "sortOrder" => &mut params.sort_order,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        params
    }

    pub fn into_options(self) -> QueryOptions {
        let defaults = QueryOptions::default();

        let start_time = first_present(&self.start_time, &self.start_date)
            .and_then(|s| parse_time(s, Bound::Start));
        let end_time = first_present(&self.end_time, &self.end_date)
            .and_then(|s| parse_time(s, Bound::End));

        let text = first_present(&self.q, &self.keyword).map(str::to_string);

        QueryOptions {
            page: parse_number(&self.page).unwrap_or(defaults.page),
            page_size: parse_number(&self.page_size).unwrap_or(defaults.page_size),
            start_time,
            end_time,
            text,
            top_n: parse_number(&self.top_n).unwrap_or(0),
            sort_by: self
                .sort_by
                .as_deref()
                .and_then(SortField::parse)
                .unwrap_or(defaults.sort_by),
            sort_order: self
                .sort_order
                .as_deref()
                .and_then(SortOrder::parse)
                .unwrap_or(defaults.sort_order),
        }
        .normalized()
    }
}

fn first_present<'a>(primary: &'a Option<String>, fallback: &'a Option<String>) -> Option<&'a str> {
    primary
        .as_deref()
        .filter(|s| !s.is_empty())
        .or_else(|| fallback.as_deref().filter(|s| !s.is_empty()))
}

fn parse_number(raw: &Option<String>) -> Option<usize> {
    raw.as_deref()?.trim().parse::<usize>().ok()
}

/// Aceita RFC 3339, data/hora sem fuso (UTC) ou só a data. Uma data pura
/// como limite final cobre o dia inteiro.
fn parse_time(raw: &str, bound: Bound) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }

    for layout in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(raw, layout) {
            return Some(Utc.from_utc_datetime(&t));
        }
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    let time = match bound {
        Bound::Start => NaiveTime::from_hms_opt(0, 0, 0)?,
        Bound::End => NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)?,
    };
    Some(Utc.from_utc_datetime(&date.and_time(time)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        QueryParams::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn empty_params_give_defaults() {
        assert_eq!(QueryParams::default().into_options(), QueryOptions::default());
    }

    #[test]
    fn bad_values_fall_back_per_field() {
        let opts = params(&[
            ("page", "abc"),
            ("pageSize", "20"),
            ("topN", "-3"),
            ("sortBy", "level"),
            ("sortOrder", "asc"),
        ])
        .into_options();
        assert_eq!(opts.page, 1);
        assert_eq!(opts.page_size, 20);
        assert_eq!(opts.top_n, 0);
        assert_eq!(opts.sort_by, SortField::Time);
        assert_eq!(opts.sort_order, SortOrder::Asc);
    }

    #[test]
    fn page_size_out_of_range() {
        let opts = params(&[("pageSize", "0")]).into_options();
        assert_eq!(opts.page_size, DEFAULT_PAGE_SIZE);
        let opts = params(&[("pageSize", "1001")]).into_options();
        assert_eq!(opts.page_size, DEFAULT_PAGE_SIZE);
        let opts = params(&[("pageSize", "1000")]).into_options();
        assert_eq!(opts.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn page_zero_becomes_first() {
        let opts = params(&[("page", "0")]).into_options();
        assert_eq!(opts.page, 1);
    }

    #[test]
    fn date_only_bounds_cover_whole_day() {
        let opts = params(&[("startDate", "2024-03-10"), ("endDate", "2024-03-10")]).into_options();
        let start = opts.start_time.unwrap();
        let end = opts.end_time.unwrap();
        assert_eq!(start.to_rfc3339(), "2024-03-10T00:00:00+00:00");
        assert_eq!(
            end,
            Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 59).unwrap()
                + chrono::Duration::nanoseconds(999_999_999)
        );
    }

    #[test]
    fn rfc3339_bounds_are_exact() {
        let opts = params(&[("startTime", "2024-03-10T12:00:00+02:00")]).into_options();
        assert_eq!(
            opts.start_time,
            Some(Utc.with_ymd_and_hms(2024, 3, 10, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn time_takes_precedence_over_date() {
        let opts = params(&[
            ("startTime", "2024-03-10T12:00:00Z"),
            ("startDate", "2020-01-01"),
        ])
        .into_options();
        assert_eq!(
            opts.start_time,
            Some(Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn invalid_date_is_ignored() {
        let opts = params(&[("startDate", "yesterday"), ("q", "boom")]).into_options();
        assert_eq!(opts.start_time, None);
        assert_eq!(opts.text.as_deref(), Some("boom"));
    }

    #[test]
    fn repeated_key_keeps_first_value() {
        let opts = params(&[
            ("q", "ERROR"),
            ("page", "1"),
            ("page", "2"),
            ("pageSize", "10"),
        ])
        .into_options();
        assert_eq!(opts.page, 1);
        assert_eq!(opts.page_size, 10);
        assert_eq!(opts.text.as_deref(), Some("ERROR"));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let opts = params(&[("level", "WARN"), ("pageSize", "5")]).into_options();
        assert_eq!(opts.page_size, 5);
        assert_eq!(opts.text, None);
    }

    #[test]
    fn keyword_is_alias_of_q() {
        let opts = params(&[("keyword", "ERROR")]).into_options();
        assert_eq!(opts.text.as_deref(), Some("ERROR"));

        let opts = params(&[("q", "WARN"), ("keyword", "ERROR")]).into_options();
        assert_eq!(opts.text.as_deref(), Some("WARN"));
    }
}
