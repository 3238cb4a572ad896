//! End-to-end pipeline tests against the scripted fake session.

use leadmap_scraper::testing::{FakeOutcome, FakeSession, PageFixture};
use leadmap_scraper::{scrape_with, DiscoverOptions, ExtractBudgets, ScrapeOptions};
use serde_json::json;
use std::time::Duration;

fn fast_options(target: usize, tabs: usize) -> ScrapeOptions {
    let mut opts = ScrapeOptions::new(target, tabs);
    opts.budgets = ExtractBudgets {
        navigation: Duration::from_millis(50),
        ready: Duration::from_millis(50),
    };
    opts.discovery = DiscoverOptions {
        max_stall_rounds: 5,
        scroll_delay: Duration::from_millis(1),
        feed_budget: Duration::from_millis(50),
        ..DiscoverOptions::default()
    };
    opts
}

fn place(n: &str) -> String {
    format!("https://m/place/{n}")
}

fn fixture(name: &str) -> PageFixture {
    PageFixture::with_lead(json!({
        "name": name,
        "address": "N/A",
        "phone": "N/A",
        "website": "N/A",
    }))
}

#[tokio::test]
async fn test_target_bounds_discovery_even_with_more_results() {
    let session = FakeSession::new()
        .with_link_batches(vec![vec![place("a"), place("b"), place("c"), place("d")]])
        .with_page(&place("a"), fixture("Ace"))
        .with_page(&place("b"), fixture("Best"))
        .with_page(&place("c"), fixture("Casa"))
        .with_page(&place("d"), fixture("Delta"));

    let leads = scrape_with(&session, "repair shops", &fast_options(2, 2))
        .await
        .expect("pipeline run");

    assert_eq!(leads.len(), 2);
}

#[tokio::test]
async fn test_mixed_failures_yield_partial_results() {
    let session = FakeSession::new()
        .with_link_batches(vec![vec![place("a"), place("b"), place("c")]])
        .with_page(&place("a"), fixture("Ace"))
        .with_page(&place("b"), fixture("Best").navigate(FakeOutcome::Hang))
        .with_page(
            &place("c"),
            fixture("Casa").ready(FakeOutcome::Fail("detached".to_string())),
        );

    let leads = scrape_with(&session, "repair shops", &fast_options(3, 2))
        .await
        .expect("pipeline run");

    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].name, "Ace");
    // Failures never leak tabs.
    assert_eq!(session.opened_tabs(), session.closed_tabs());
}

#[tokio::test]
async fn test_teardown_close_failures_never_escape() {
    let session = FakeSession::new()
        .with_link_batches(vec![vec![place("a")]])
        .with_page(&place("a"), fixture("Ace"))
        .with_close(FakeOutcome::Fail("target already closed".to_string()));

    let leads = scrape_with(&session, "repair shops", &fast_options(1, 1))
        .await
        .expect("close failures stay contained");

    assert_eq!(leads.len(), 1);
    // Both the worker tab and the discovery tab were still close-attempted.
    assert_eq!(session.closed_tabs(), 2);
}

#[tokio::test]
async fn test_unreachable_feed_produces_zero_leads_cleanly() {
    let session = FakeSession::new().with_feed(FakeOutcome::Hang);

    let leads = scrape_with(&session, "repair shops", &fast_options(5, 2))
        .await
        .expect("pipeline run");

    assert!(leads.is_empty());
    assert_eq!(session.opened_tabs(), session.closed_tabs());
}
