//! Search-results page extraction.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::models::{sentinel, ListingItem};
use crate::utils::collapse_whitespace;
use crate::utils::html::{css, raw_text, select_first};

static ITEM: LazyLock<Selector> = LazyLock::new(|| css("div.job-item"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| css("div.title"));
static COMPANY: LazyLock<Selector> = LazyLock::new(|| css("a.company-name"));
static LINK: LazyLock<Selector> = LazyLock::new(|| css("a.job_link"));
static LOCATION: LazyLock<Selector> = LazyLock::new(|| css("div.location"));
static SALARY: LazyLock<Selector> = LazyLock::new(|| css("div.salary"));
static TIME_ITEM: LazyLock<Selector> = LazyLock::new(|| css("div.time li"));
static TIME: LazyLock<Selector> = LazyLock::new(|| css("time"));
static WELFARE: LazyLock<Selector> = LazyLock::new(|| css("ul.welfare li"));

const UPDATED_MARKER: &str = "Cập nhật";
const DEADLINE_MARKER: &str = "Hạn nộp";

fn trimmed_text(item: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    select_first(item, selector).map(|e| raw_text(&e).trim().to_string())
}

fn clean_title(title: &str) -> String {
    collapse_whitespace(&title.replace(['\n', '\r'], " ").replace("(Mới)", ""))
}

/// Resolve a listing href against the page it was found on.
fn absolute_link(href: &str, page_url: &str) -> String {
    Url::parse(page_url)
        .and_then(|base| base.join(href))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Text of the `<time>` inside the first `div.time` entry mentioning `marker`.
fn time_text(item: &ElementRef<'_>, marker: &str, missing: &str) -> String {
    item.select(&TIME_ITEM)
        .find(|li| raw_text(li).contains(marker))
        .and_then(|li| trimmed_text(&li, &TIME))
        .unwrap_or_else(|| missing.to_string())
}

fn parse_item(item: &ElementRef<'_>, page_url: &str) -> ListingItem {
    let title = trimmed_text(item, &TITLE)
        .map(|t| clean_title(&t))
        .unwrap_or_else(|| sentinel::TITLE_NOT_FOUND.to_string());

    let company = trimmed_text(item, &COMPANY)
        .unwrap_or_else(|| sentinel::COMPANY_NOT_FOUND.to_string());

    let link = select_first(item, &LINK)
        .and_then(|a| a.value().attr("href"))
        .map(|href| absolute_link(href.trim(), page_url))
        .unwrap_or_else(|| sentinel::LINK_NOT_FOUND.to_string());

    let location = trimmed_text(item, &LOCATION)
        .unwrap_or_else(|| sentinel::LOCATION_NOT_FOUND.to_string());

    let salary = select_first(item, &SALARY)
        .map(|e| raw_text(&e).replace("Lương:", "").trim().to_string())
        .unwrap_or_else(|| sentinel::SALARY_NOT_FOUND.to_string());

    let welfare = item
        .select(&WELFARE)
        .map(|li| raw_text(&li).trim().to_string())
        .collect();

    ListingItem {
        title,
        company,
        location,
        salary,
        posted: time_text(item, UPDATED_MARKER, sentinel::UPDATE_TIME_NOT_FOUND),
        expires: time_text(item, DEADLINE_MARKER, sentinel::EXPIRE_DATE_NOT_FOUND),
        link,
        welfare,
    }
}

/// Parse every job entry on a search-results page, in page order.
///
/// Missing fields become sentinel strings; an item is never dropped here.
pub fn extract_listings(html: &str, page_url: &str) -> Vec<ListingItem> {
    let document = Html::parse_document(html);
    document
        .select(&ITEM)
        .map(|item| parse_item(&item, page_url))
        .collect()
}
