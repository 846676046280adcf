use crate::types::RawRow;

use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

const TABLE_SELECTOR: &str = "table.wikitable";
const MIN_CELLS: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("No table matching '{0}' found on page")]
    MissingTable(String),
    #[error("Invalid page URL: {0}")]
    InvalidUrl(String),
}

/// Extracts the raw rows of the first `.wikitable` on the page.
///
/// The header row is skipped and rows with fewer than six cells (section captions,
/// footnotes) are dropped. Links are resolved against `page_url` the way a browser would.
pub fn parse_cave_table(html: &str, page_url: &str) -> Result<Vec<RawRow>, ParseError> {
    let page_url = Url::parse(page_url)
        .map_err(|e| ParseError::InvalidUrl(format!("{}: {}", page_url, e)))?;

    let document = Html::parse_document(html);
    let table_selector = Selector::parse(TABLE_SELECTOR).unwrap();
    let row_selector = Selector::parse("tr").unwrap();
    let cell_selector = Selector::parse("td").unwrap();

    let table = document
        .select(&table_selector)
        .next()
        .ok_or_else(|| ParseError::MissingTable(TABLE_SELECTOR.to_string()))?;

    let mut rows = Vec::new();

    for (i, element) in table.select(&row_selector).enumerate().skip(1) {
        let cells: Vec<ElementRef> = element.select(&cell_selector).collect();

        if cells.len() < MIN_CELLS {
            log::debug!(
                "Skipping table row {} with {} cell(s): '{}'",
                i,
                cells.len(),
                cell_text(element)
            );
            continue;
        }

        rows.push(RawRow {
            name: cell_text(cells[1]),
            depth: cell_text(cells[2]),
            length: cell_text(cells[3]),
            location: cell_text(cells[4]),
            coordinates: coordinates_text(cells[5]),
            link: first_link(cells[1], &page_url),
        });
    }

    log::debug!("Extracted {} raw rows", rows.len());
    Ok(rows)
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text a reader would see: `<style>`/`<script>` blocks and `display:none` nodes
/// (sort keys, hidden alternatives) are left out.
fn cell_text(element: ElementRef) -> String {
    let mut text = String::new();
    collect_visible_text(element, &mut text);
    normalize_whitespace(&text)
}

fn collect_visible_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child)
            && !is_hidden(child)
        {
            collect_visible_text(child, out);
        }
    }
}

fn is_hidden(element: ElementRef) -> bool {
    let value = element.value();
    if matches!(value.name(), "style" | "script") {
        return true;
    }
    value.attr("style").is_some_and(|style| {
        style
            .split_whitespace()
            .collect::<String>()
            .to_ascii_lowercase()
            .contains("display:none")
    })
}

fn first_link(element: ElementRef, page_url: &Url) -> Option<String> {
    let a_selector = Selector::parse("a").unwrap();
    let href = element
        .select(&a_selector)
        .next()
        .and_then(|a| a.value().attr("href"))?;

    match page_url.join(href) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            log::debug!("Ignoring unresolvable link '{}': {}", href, e);
            None
        }
    }
}

// Wikipedia renders {{coord}} twice (DMS and decimal) and hides one of them, so only
// the `.geo-default` block reflects what a reader sees.
fn coordinates_text(element: ElementRef) -> String {
    let default_selector = Selector::parse(".geo-default").unwrap();
    let latitude_selector = Selector::parse(".latitude").unwrap();
    let longitude_selector = Selector::parse(".longitude").unwrap();

    let Some(geo) = element.select(&default_selector).next() else {
        return cell_text(element);
    };

    match (
        geo.select(&latitude_selector).next(),
        geo.select(&longitude_selector).next(),
    ) {
        (Some(lat), Some(lon)) => format!("{} {}", cell_text(lat), cell_text(lon)),
        _ => cell_text(geo),
    }
}
