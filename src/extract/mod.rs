//! Backlog export parsing.
//!
//! Turns the XML of a backlog export (one `item` element per ticket,
//! anywhere in the tree) into an ordered list of [`BacklogRecord`]s. Every
//! text value is sanitized for the renderer on the way out; see
//! [`sanitize`].

pub mod sanitize;

use crate::models::BacklogRecord;
use crate::render::TextValidator;
use crate::{Error, Result};
use roxmltree::{Document, Node, ParsingOptions};
use tracing::{debug, info};

/// Rank used when an item carries no Rank custom field.
pub const DEFAULT_RANK: &str = "0";

/// Name of the custom field holding the rank.
const RANK_FIELD: &str = "Rank";

/// Parse an export and extract its records.
pub fn parse_backlog(xml: &str, validator: &dyn TextValidator) -> Result<Vec<BacklogRecord>> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(xml, options)?;
    extract_records(&doc, validator)
}

/// Extract one record per `item` element, in document order.
pub fn extract_records(
    doc: &Document<'_>,
    validator: &dyn TextValidator,
) -> Result<Vec<BacklogRecord>> {
    let records = doc
        .descendants()
        .filter(|n| n.has_tag_name("item"))
        .enumerate()
        .map(|(index, item)| extract_record(item, index, validator))
        .collect::<Result<Vec<_>>>()?;
    info!(count = records.len(), "extracted backlog records");
    Ok(records)
}

/// Build the record for the `index`-th `item` element.
pub fn extract_record(
    item: Node<'_, '_>,
    index: usize,
    validator: &dyn TextValidator,
) -> Result<BacklogRecord> {
    let clean = |text: &str| sanitize::sanitize(text, validator);

    let raw_key = required_text(item, index, "key")?;
    let (project, key) = split_key(&clean(raw_key), index)?;
    let summary = clean(required_text(item, index, "summary")?);

    let record = BacklogRecord {
        key,
        project,
        summary,
        description: sanitize::clean_description(
            child_text(item, "description").unwrap_or_default(),
            validator,
        ),
        assignee: clean(child_text(item, "assignee").unwrap_or_default()),
        priority: clean(child_text(item, "priority").unwrap_or_default()),
        rank: clean(extract_rank(item)),
        components: item
            .children()
            .filter(|n| n.has_tag_name("component"))
            .filter_map(|n| n.text())
            .map(|t| clean(t.trim()))
            .collect(),
        labels: item
            .children()
            .filter(|n| n.has_tag_name("labels"))
            .flat_map(|labels| labels.children().filter(|n| n.has_tag_name("label")))
            .filter_map(|n| n.text())
            .map(|t| clean(t.trim()))
            .collect(),
    };
    debug!(key = %record.full_key(), assignee = %record.assignee, "extracted record");
    Ok(record)
}

/// Split `PROJ-123` into (`PROJ`, `123`) at the first dash.
pub fn split_key(raw: &str, index: usize) -> Result<(String, String)> {
    let raw = raw.trim();
    raw.split_once('-')
        .map(|(project, key)| (project.to_string(), key.to_string()))
        .ok_or_else(|| Error::MalformedInput {
            item: index,
            field: "key",
            reason: format!("expected PROJECT-NUMBER, got {raw:?}"),
        })
}

/// Value of the Rank custom field; the last value wins.
fn extract_rank<'a>(item: Node<'a, '_>) -> &'a str {
    item.descendants()
        .filter(|n| n.has_tag_name("customfield"))
        .filter(|field| child_text(*field, "customfieldname").map(str::trim) == Some(RANK_FIELD))
        .flat_map(|field| {
            field
                .descendants()
                .filter(|n| n.has_tag_name("customfieldvalue"))
        })
        .filter_map(|value| value.text())
        .last()
        .unwrap_or(DEFAULT_RANK)
}

fn child<'a, 'input>(item: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    item.children().find(|n| n.has_tag_name(name))
}

/// Text of the named direct child; `None` if the element is absent.
///
/// A present but empty element yields `""`.
fn child_text<'a>(item: Node<'a, '_>, name: &str) -> Option<&'a str> {
    child(item, name).map(|n| n.text().unwrap_or_default())
}

fn required_text<'a>(item: Node<'a, '_>, index: usize, field: &'static str) -> Result<&'a str> {
    child_text(item, field).ok_or_else(|| Error::MalformedInput {
        item: index,
        field,
        reason: format!("missing <{field}> element"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RichTextValidator;

    const EXPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="0.92">
  <channel>
    <title>Backlog</title>
    <item>
      <title>[PLAT-42] Login page</title>
      <key id="10042">PLAT-42</key>
      <summary>Login page</summary>
      <description>Users need a &lt;a href="http://x"&gt;login&lt;/a&gt; page</description>
      <priority>Major</priority>
      <assignee username="mmeyer">Meyer, Max</assignee>
      <component>Backend</component>
      <component>Auth</component>
      <labels>
        <label>security</label>
      </labels>
      <customfields>
        <customfield id="customfield_10002" key="com.atlassian.jira:gh-lexo-rank">
          <customfieldname>Rank</customfieldname>
          <customfieldvalues>
            <customfieldvalue>0|hzzzz7:</customfieldvalue>
          </customfieldvalues>
        </customfield>
        <customfield id="customfield_10003">
          <customfieldname>Story Points</customfieldname>
          <customfieldvalues>
            <customfieldvalue>5</customfieldvalue>
          </customfieldvalues>
        </customfield>
      </customfields>
    </item>
    <item>
      <key>PLAT-43</key>
      <summary>Logout</summary>
      <assignee>Unassigned</assignee>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_extracts_records_in_order() {
        let records = parse_backlog(EXPORT, &RichTextValidator).unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.project, "PLAT");
        assert_eq!(first.key, "42");
        assert_eq!(first.summary, "Login page");
        assert_eq!(first.assignee, "Meyer, Max");
        assert_eq!(first.priority, "Major");
        assert_eq!(first.rank, "0|hzzzz7:");
        assert_eq!(first.components, vec!["Backend", "Auth"]);
        assert_eq!(first.labels, vec!["security"]);

        let second = &records[1];
        assert_eq!(second.key, "43");
        assert!(second.is_unassigned());
    }

    #[test]
    fn test_missing_optional_fields_become_empty() {
        let records = parse_backlog(EXPORT, &RichTextValidator).unwrap();
        let second = &records[1];
        assert_eq!(second.description, "");
        assert_eq!(second.priority, "");
        assert_eq!(second.rank, DEFAULT_RANK);
        assert!(second.components.is_empty());
    }

    #[test]
    fn test_description_links_are_stripped() {
        let records = parse_backlog(EXPORT, &RichTextValidator).unwrap();
        assert_eq!(records[0].description, "Users need a  <i>link</i>  page");
    }

    #[test]
    fn test_no_items_yields_empty_list() {
        let records = parse_backlog("<rss><channel/></rss>", &RichTextValidator).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_key_without_dash_is_malformed() {
        let xml = "<rss><item><key>PLAT42</key><summary>x</summary></item></rss>";
        let err = parse_backlog(xml, &RichTextValidator).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedInput {
                item: 0,
                field: "key",
                ..
            }
        ));
    }

    #[test]
    fn test_missing_mandatory_elements() {
        let xml = "<rss><item><key>A-1</key><summary>x</summary></item>\
                   <item><key>A-2</key></item></rss>";
        let err = parse_backlog(xml, &RichTextValidator).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedInput {
                item: 1,
                field: "summary",
                ..
            }
        ));

        let xml = "<rss><item><summary>x</summary></item></rss>";
        assert!(matches!(
            parse_backlog(xml, &RichTextValidator).unwrap_err(),
            Error::MalformedInput { field: "key", .. }
        ));
    }

    #[test]
    fn test_split_key_at_first_dash() {
        assert_eq!(
            split_key("WEB-UI-7", 0).unwrap(),
            ("WEB".to_string(), "UI-7".to_string())
        );
        assert_eq!(
            split_key(" PLAT-1 ", 0).unwrap(),
            ("PLAT".to_string(), "1".to_string())
        );
    }

    #[test]
    fn test_last_rank_value_wins() {
        let xml = "<rss><item><key>A-1</key><summary>x</summary>\
                   <customfield><customfieldname>Rank</customfieldname>\
                   <customfieldvalue>1</customfieldvalue>\
                   <customfieldvalue>774</customfieldvalue></customfield>\
                   </item></rss>";
        let records = parse_backlog(xml, &RichTextValidator).unwrap();
        assert_eq!(records[0].rank, "774");
    }

    #[test]
    fn test_unrenderable_values_are_escaped() {
        let xml = "<rss><item><key>A-1</key>\
                   <summary>&lt;img src=\"x.gif\"&gt; broken</summary></item></rss>";
        let records = parse_backlog(xml, &RichTextValidator).unwrap();
        assert_eq!(records[0].summary, "&lt;img src=&quot;x.gif&quot;&gt; broken");
    }

    #[test]
    fn test_invalid_xml_is_an_error() {
        assert!(matches!(
            parse_backlog("<rss><item>", &RichTextValidator),
            Err(Error::Xml(_))
        ));
    }
}
