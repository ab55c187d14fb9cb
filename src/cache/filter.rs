use std::borrow::Cow;

use chrono::NaiveDate;

pub trait Searchable {
    fn search_fields(&self, today: NaiveDate) -> Vec<Cow<'_, str>>;
}

pub fn filter_records<'a, T: Searchable>(
    records: &'a [T],
    term: &str,
    today: NaiveDate,
) -> Vec<&'a T> {
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|r| {
            r.search_fields(today)
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    struct Named(u64, &'static str);

    impl Searchable for Named {
        fn search_fields(&self, _today: NaiveDate) -> Vec<Cow<'_, str>> {
            vec![Cow::Borrowed(self.1), Cow::Owned(self.0.to_string())]
        }
    }

    #[test]
    fn empty_term_returns_everything_in_order() {
        let records = vec![Named(2, "Stapler"), Named(1, "Marker"), Named(3, "Tape")];
        let out = filter_records(&records, "", today());
        let ids: Vec<u64> = out.iter().map(|r| r.0).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn match_is_case_insensitive_on_both_sides() {
        let records = vec![Named(1, "Whiteboard Marker"), Named(2, "Tape")];
        let out = filter_records(&records, "MARK", today());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].0, 1);
    }

    #[test]
    fn numeric_id_is_searchable_as_text() {
        let records = vec![Named(12, "Stapler"), Named(3, "Tape")];
        let out = filter_records(&records, "12", today());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].1, "Stapler");
    }

    #[test]
    fn no_match_yields_empty_view() {
        let records = vec![Named(1, "Tape")];
        assert!(filter_records(&records, "projector", today()).is_empty());
    }
}
