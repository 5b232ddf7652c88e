//! arXiv Atom feed parser using quick-xml
//!
//! Streaming parser for the export API response format. Produces raw
//! entries; canonicalization into `PaperRecord` happens in `normalize`.

use anyhow::{Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One page of the feed.
#[derive(Debug, Default)]
pub struct Feed {
    /// Total results reported by the upstream for the whole query.
    pub total_results: usize,
    pub start_index: usize,
    pub entries: Vec<RawEntry>,
}

/// One `<entry>` in the upstream's native shape.
#[derive(Debug, Default, Clone)]
pub struct RawEntry {
    /// Versioned identifier URL, e.g. `http://arxiv.org/abs/2401.12345v2`.
    pub id_url: String,
    pub title: String,
    pub summary: String,
    pub published: String,
    pub updated: String,
    pub authors: Vec<RawAuthor>,
    /// Upstream taxonomy codes in listed order.
    pub categories: Vec<String>,
    pub primary_category: Option<String>,
    pub links: Vec<RawLink>,
    pub comment: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct RawAuthor {
    pub name: String,
    pub affiliation: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct RawLink {
    pub href: String,
    pub rel: Option<String>,
    pub title: Option<String>,
    pub mime_type: Option<String>,
}

/// Parse one feed page. An entry that fails to parse is skipped with a
/// debug log; a malformed document is an error.
pub fn parse_feed(xml: &str) -> Result<Feed> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut feed = Feed::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"opensearch:totalResults" => {
                    feed.total_results = read_text(&mut reader)?.trim().parse().unwrap_or(0);
                }
                b"opensearch:startIndex" => {
                    feed.start_index = read_text(&mut reader)?.trim().parse().unwrap_or(0);
                }
                b"entry" => match parse_entry(&mut reader) {
                    Ok(entry) => feed.entries.push(entry),
                    Err(e) => log::debug!("failed to parse entry: {}", e),
                },
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e).context("XML parse error"),
            _ => {}
        }
        buf.clear();
    }

    Ok(feed)
}

fn parse_entry(reader: &mut Reader<&[u8]>) -> Result<RawEntry> {
    let mut entry = RawEntry::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"id" => entry.id_url = read_text(reader)?,
                b"title" => entry.title = read_text_content(reader, b"title")?,
                b"summary" => entry.summary = read_text_content(reader, b"summary")?,
                b"published" => entry.published = read_text(reader)?,
                b"updated" => entry.updated = read_text(reader)?,
                b"author" => entry.authors.push(parse_author(reader)?),
                b"arxiv:comment" => entry.comment = Some(read_text(reader)?),
                // link/category are usually empty elements but some
                // serializers emit start/end pairs
                b"link" => {
                    entry.links.push(link_from_attrs(&e));
                    skip_element(reader, b"link")?;
                }
                b"category" => {
                    if let Some(term) = attr_value(&e, b"term") {
                        entry.categories.push(term);
                    }
                    skip_element(reader, b"category")?;
                }
                b"arxiv:primary_category" => {
                    entry.primary_category = attr_value(&e, b"term");
                    skip_element(reader, b"arxiv:primary_category")?;
                }
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"link" => entry.links.push(link_from_attrs(&e)),
                b"category" => {
                    if let Some(term) = attr_value(&e, b"term") {
                        entry.categories.push(term);
                    }
                }
                b"arxiv:primary_category" => {
                    entry.primary_category = attr_value(&e, b"term");
                }
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"entry" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(entry)
}

fn parse_author(reader: &mut Reader<&[u8]>) -> Result<RawAuthor> {
    let mut author = RawAuthor::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"name" => author.name = read_text(reader)?,
                b"arxiv:affiliation" => author.affiliation = Some(read_text(reader)?),
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"author" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(author)
}

fn link_from_attrs(e: &BytesStart) -> RawLink {
    RawLink {
        href: attr_value(e, b"href").unwrap_or_default(),
        rel: attr_value(e, b"rel"),
        title: attr_value(e, b"title"),
        mime_type: attr_value(e, b"type"),
    }
}

fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

fn skip_element(reader: &mut Reader<&[u8]>, end_tag: &[u8]) -> Result<()> {
    let mut buf = Vec::new();
    let mut depth = 1;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(_) => depth += 1,
            Event::End(e) => {
                depth -= 1;
                if depth == 0 && e.name().as_ref() == end_tag {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

/// Read text content until the next end tag, flattening nested markup.
fn read_text(reader: &mut Reader<&[u8]>) -> Result<String> {
    let mut buf = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::End(_) => break,
            Event::Start(_) => {
                text.push_str(&read_text(reader)?);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

/// Read text content of a specific element, handling nested tags.
fn read_text_content(reader: &mut Reader<&[u8]>, end_tag: &[u8]) -> Result<String> {
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut depth = 1;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::Start(_) => depth += 1,
            Event::End(e) => {
                depth -= 1;
                if depth == 0 && e.name().as_ref() == end_tag {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom"
      xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/"
      xmlns:arxiv="http://arxiv.org/schemas/atom">
  <link href="http://arxiv.org/api/query?search_query=all:agents" rel="self" type="application/atom+xml"/>
  <title type="html">ArXiv Query: search_query=all:agents</title>
  <id>http://arxiv.org/api/abc123</id>
  <updated>2024-05-01T00:00:00-04:00</updated>
  <opensearch:totalResults>42</opensearch:totalResults>
  <opensearch:startIndex>0</opensearch:startIndex>
  <opensearch:itemsPerPage>2</opensearch:itemsPerPage>
  <entry>
    <id>http://arxiv.org/abs/2401.12345v2</id>
    <updated>2024-02-01T10:00:00Z</updated>
    <published>2024-01-20T18:30:00Z</published>
    <title>Self-Improving
  Agents</title>
    <summary>We study agents that
  improve themselves.</summary>
    <author>
      <name>Ada Lovelace</name>
      <arxiv:affiliation>Analytical Engines Inc</arxiv:affiliation>
    </author>
    <author>
      <name>Charles Babbage</name>
    </author>
    <arxiv:comment>10 pages, 3 figures</arxiv:comment>
    <link href="http://arxiv.org/abs/2401.12345v2" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/2401.12345v2" rel="related" type="application/pdf"/>
    <arxiv:primary_category term="cs.AI" scheme="http://arxiv.org/schemas/atom"/>
    <category term="cs.AI" scheme="http://arxiv.org/schemas/atom"/>
    <category term="cs.LG" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2402.00007v1</id>
    <updated>2024-02-02T09:00:00Z</updated>
    <published>2024-02-02T09:00:00Z</published>
    <title>A Second Paper</title>
    <summary>Short abstract.</summary>
    <author>
      <name>Grace Hopper</name>
    </author>
    <link title="pdf" href="http://arxiv.org/pdf/2402.00007v1" rel="related" type="application/pdf"/>
    <category term="cs.CL" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
</feed>"#;

    #[test]
    fn parse_feed_totals_and_entry_count() {
        let feed = parse_feed(SAMPLE_FEED).unwrap();
        assert_eq!(feed.total_results, 42);
        assert_eq!(feed.start_index, 0);
        assert_eq!(feed.entries.len(), 2);
    }

    #[test]
    fn parse_entry_fields() {
        let feed = parse_feed(SAMPLE_FEED).unwrap();
        let entry = &feed.entries[0];
        assert_eq!(entry.id_url, "http://arxiv.org/abs/2401.12345v2");
        assert_eq!(entry.published, "2024-01-20T18:30:00Z");
        assert_eq!(entry.updated, "2024-02-01T10:00:00Z");
        // raw text keeps the feed's line breaks; normalize collapses them
        assert!(entry.title.contains("Self-Improving"));
        assert!(entry.summary.contains("improve themselves"));
        assert_eq!(entry.comment.as_deref(), Some("10 pages, 3 figures"));
    }

    #[test]
    fn parse_authors_with_and_without_affiliation() {
        let feed = parse_feed(SAMPLE_FEED).unwrap();
        let entry = &feed.entries[0];
        assert_eq!(entry.authors.len(), 2);
        assert_eq!(entry.authors[0].name, "Ada Lovelace");
        assert_eq!(
            entry.authors[0].affiliation.as_deref(),
            Some("Analytical Engines Inc")
        );
        assert_eq!(entry.authors[1].name, "Charles Babbage");
        assert!(entry.authors[1].affiliation.is_none());
    }

    #[test]
    fn parse_categories_and_primary() {
        let feed = parse_feed(SAMPLE_FEED).unwrap();
        let entry = &feed.entries[0];
        assert_eq!(entry.categories, vec!["cs.AI", "cs.LG"]);
        assert_eq!(entry.primary_category.as_deref(), Some("cs.AI"));

        // second entry has no explicit primary
        assert!(feed.entries[1].primary_category.is_none());
        assert_eq!(feed.entries[1].categories, vec!["cs.CL"]);
    }

    #[test]
    fn parse_links_with_attributes() {
        let feed = parse_feed(SAMPLE_FEED).unwrap();
        let entry = &feed.entries[0];
        assert_eq!(entry.links.len(), 2);
        let pdf = entry
            .links
            .iter()
            .find(|l| l.title.as_deref() == Some("pdf"))
            .unwrap();
        assert_eq!(pdf.href, "http://arxiv.org/pdf/2401.12345v2");
        assert_eq!(pdf.mime_type.as_deref(), Some("application/pdf"));
        assert_eq!(pdf.rel.as_deref(), Some("related"));
    }

    #[test]
    fn feed_level_link_is_not_an_entry_link() {
        // the feed's own <link rel="self"> must not leak into entries
        let feed = parse_feed(SAMPLE_FEED).unwrap();
        for entry in &feed.entries {
            assert!(entry.links.iter().all(|l| l.rel.as_deref() != Some("self")));
        }
    }

    #[test]
    fn parse_empty_feed() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom"
      xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">
  <opensearch:totalResults>0</opensearch:totalResults>
  <opensearch:startIndex>0</opensearch:startIndex>
</feed>"#;
        let feed = parse_feed(xml).unwrap();
        assert_eq!(feed.total_results, 0);
        assert!(feed.entries.is_empty());
    }

    #[test]
    fn parse_entry_with_escaped_text() {
        let xml = r#"<?xml version="1.0"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/abs/2401.00001v1</id>
    <title>Q&amp;A over Graphs &lt;at scale&gt;</title>
    <summary>Uses &amp; extends prior work.</summary>
  </entry>
</feed>"#;
        let feed = parse_feed(xml).unwrap();
        assert_eq!(feed.entries[0].title, "Q&A over Graphs <at scale>");
        assert_eq!(feed.entries[0].summary, "Uses & extends prior work.");
    }

    #[test]
    fn parse_truncated_document_is_handled() {
        let xml = r#"<?xml version="1.0"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/abs/2401.00001v1</id>
    <title>Cut off"#;
        // either a graceful error or a partial parse, never a panic
        let result = parse_feed(xml);
        assert!(result.is_ok() || result.is_err());
    }
}
