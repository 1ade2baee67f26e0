//! Synthetic listing pages shaped like the live tender listing

#![allow(dead_code)]

/// One tender card on a listing page
#[derive(Debug, Clone)]
pub struct Card {
    pub bid_number: String,
    pub href: Option<String>,
    pub items: String,
    pub quantity: Option<String>,
    pub department: Option<String>,
    pub start_date: String,
    pub end_date: String,
}

impl Card {
    pub fn numbered(n: u32) -> Self {
        Self {
            bid_number: format!("GEM/2025/B/{}", n),
            href: Some(format!("/showbidDocument/{}", n)),
            items: format!("Item {}", n),
            quantity: Some(n.to_string()),
            department: Some(format!("Department {}", n)),
            start_date: format!("{:02}-01-2025 10:00 AM", n % 28 + 1),
            end_date: format!("{:02}-02-2025 06:00 PM", n % 28 + 1),
        }
    }

    pub fn without_department(mut self) -> Self {
        self.department = None;
        self
    }

    pub fn with_href(mut self, href: Option<&str>) -> Self {
        self.href = href.map(str::to_string);
        self
    }

    fn render(&self) -> String {
        let href = self
            .href
            .as_ref()
            .map(|h| format!(r#" href="{}""#, h))
            .unwrap_or_default();
        let quantity = self
            .quantity
            .as_ref()
            .map(|q| format!(r#"<div class="row"><strong>Quantity:</strong> {}</div>"#, q))
            .unwrap_or_default();
        let department = self
            .department
            .as_ref()
            .map(|d| format!(r#"<div class="row">{}</div>"#, d))
            .unwrap_or_default();

        format!(
            r#"<div class="card">
  <div class="block_header"><p class="bid_no pull-left">BID NO: <a class="bid_no_hover"{href}>{bid}</a></p></div>
  <div class="card-body">
    <div class="col-md-4">
      <div class="row"><strong>Items:</strong> <a data-toggle="popover">{items}</a></div>
      {quantity}
    </div>
    <div class="col-md-5">
      <div class="row"><strong>Department Name And Address:</strong></div>
      {department}
    </div>
    <div class="col-md-3">
      <div class="start_block"><label>Start Date:</label> <span class="start_date">{start}</span></div>
      <div class="end_block"><label>End Date:</label> <span class="end_date">{end}</span></div>
    </div>
  </div>
</div>"#,
            href = href,
            bid = self.bid_number,
            items = self.items,
            quantity = quantity,
            department = department,
            start = self.start_date,
            end = self.end_date,
        )
    }
}

/// Which page numbers the pagination bar links to
#[derive(Debug, Clone, Copy)]
pub enum Pagination {
    /// Every page number
    Full,
    /// Only pages within this distance of the current one
    Window(u32),
}

/// A listing page with every page number in the pagination bar
pub fn listing_page(page: u32, total_pages: u32, total_records: u64, cards: &[Card]) -> String {
    listing_page_with(page, total_pages, total_records, cards, Pagination::Full)
}

pub fn listing_page_with(
    page: u32,
    total_pages: u32,
    total_records: u64,
    cards: &[Card],
    pagination: Pagination,
) -> String {
    let cards_html: Vec<String> = cards.iter().map(Card::render).collect();
    let from = if cards.is_empty() { 0 } else { 1 };

    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>All Bids</title></head>
<body>
  <div class="sort-bar">
    <button id="currentSort" type="button">Bid Start Date: Oldest First</button>
    <ul class="dropdown-menu">
      <li><a id="Bid-Start-Date-Latest" href="javascript:void(0)">Bid Start Date: Latest First</a></li>
    </ul>
  </div>
  <div id="bidCard">
{cards}
  </div>
  <div class="pagination-summary"><span class="pos-bottom">Showing {from} to {to} of {total} records</span></div>
{pager}
</body>
</html>"#,
        cards = cards_html.join("\n"),
        from = from,
        to = cards.len(),
        total = total_records,
        pager = pagination_bar(page, total_pages, pagination),
    )
}

fn pagination_bar(page: u32, total_pages: u32, pagination: Pagination) -> String {
    let mut parts = Vec::new();

    if page > 1 {
        parts.push(format!(
            r##"<a href="#page-{}" class="page-link prev">Prev</a>"##,
            page - 1
        ));
    } else {
        parts.push(r#"<span class="current prev">Prev</span>"#.to_string());
    }

    let (low, high) = match pagination {
        Pagination::Full => (1, total_pages),
        Pagination::Window(distance) => (
            page.saturating_sub(distance).max(1),
            (page + distance).min(total_pages),
        ),
    };
    for n in low..=high {
        if n == page {
            parts.push(format!(r#"<span class="current">{}</span>"#, n));
        } else {
            parts.push(format!(r##"<a href="#page-{}" class="page-link">{}</a>"##, n, n));
        }
    }

    if page < total_pages {
        parts.push(format!(
            r##"<a href="#page-{}" class="page-link next">Next</a>"##,
            page + 1
        ));
    } else {
        parts.push(r#"<span class="current next">Next</span>"#.to_string());
    }

    format!(
        r#"<div id="light-pagination" class="pagination">{}</div>"#,
        parts.join("")
    )
}

/// Cards `first..first + count`, numbered consecutively
pub fn cards(first: u32, count: u32) -> Vec<Card> {
    (first..first + count).map(Card::numbered).collect()
}

/// A complete listing of `pages` pages holding `per_page` cards each
pub fn listing(pages: u32, per_page: u32) -> Vec<String> {
    let total_records = u64::from(pages * per_page);
    (1..=pages)
        .map(|page| {
            listing_page(
                page,
                pages,
                total_records,
                &cards((page - 1) * per_page + 1, per_page),
            )
        })
        .collect()
}
