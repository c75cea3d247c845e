//! Property tests for the record scanner and attribute filling.

use phenorank_core::errors::IssueLog;
use phenorank_core::models::{Condition, ConditionAttribute};
use phenorank_enrich::scanner::scan_str;
use phenorank_enrich::CATEGORY_RECORDS;
use proptest::prelude::*;

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn document(records: &[(Option<u32>, String)]) -> String {
    let mut xml = String::from("<JDBOR><DisorderList>");
    for (code, group) in records {
        xml.push_str("<Disorder>");
        if let Some(code) = code {
            xml.push_str(&format!("<OrphaCode>{code}</OrphaCode>"));
        }
        xml.push_str(&format!(
            "<DisorderGroup><Name lang=\"en\">{}</Name></DisorderGroup>",
            escape(group)
        ));
        xml.push_str("</Disorder>");
    }
    xml.push_str("</DisorderList></JDBOR>");
    xml
}

proptest! {
    #[test]
    fn every_record_is_either_kept_or_counted(
        records in prop::collection::vec(
            (prop::option::of(0u32..100_000), "[A-Za-z0-9 <>&/-]{0,12}"),
            0..40,
        )
    ) {
        let mut issues = IssueLog::new();
        let outcome = scan_str("product3.xml", &document(&records), &CATEGORY_RECORDS, &mut issues);
        prop_assert!(outcome.error.is_none());
        prop_assert_eq!(outcome.records, records.len());

        let expected: Vec<(String, String)> = records
            .iter()
            .filter_map(|(code, group)| {
                let group = group.trim();
                match code {
                    Some(code) if !group.is_empty() => Some((format!("ORPHA:{code}"), group.to_string())),
                    _ => None,
                }
            })
            .collect();
        prop_assert_eq!(issues.malformed(), records.len() - expected.len());
        prop_assert_eq!(outcome.values, expected);
    }

    #[test]
    fn filling_twice_equals_filling_once(
        existing in prop::option::of("[a-z]{1,8}"),
        first in "[a-z ]{0,8}",
        second in "[a-z ]{0,8}",
    ) {
        let mut condition = Condition::new("ORPHA:1", "x");
        condition.inheritance = existing.clone();
        condition.fill_if_empty(ConditionAttribute::Inheritance, &first);
        let once = condition.clone();
        condition.fill_if_empty(ConditionAttribute::Inheritance, &first);
        prop_assert_eq!(&condition, &once);

        condition.fill_if_empty(ConditionAttribute::Inheritance, &second);
        if existing.is_some() || !first.trim().is_empty() {
            prop_assert_eq!(condition, once);
        }
    }
}
