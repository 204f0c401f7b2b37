//! Terminal rendering of the display board.

use chrono::NaiveDateTime;
use colored::Colorize;
use std::io::{self, Write};
use stockview::display::{BoardRenderer, DisplaySession, SlideState};
use stockview::AggregatedItem;

const DATE_FORMAT: &str = "%d %b %Y";

/// Redraws the whole board on every state change.
pub struct TerminalRenderer {
    clear_screen: bool,
}

impl TerminalRenderer {
    pub fn new(clear_screen: bool) -> Self {
        Self { clear_screen }
    }
}

impl BoardRenderer for TerminalRenderer {
    fn render(&mut self, session: &DisplaySession) {
        let frame = render_frame(session);
        let mut out = io::stdout().lock();
        if self.clear_screen {
            let _ = write!(out, "\x1b[2J\x1b[H");
        }
        let _ = out.write_all(frame.as_bytes());
        let _ = out.flush();
    }
}

pub fn render_frame(session: &DisplaySession) -> String {
    let mut frame = String::new();

    let slide = match session.state() {
        SlideState::Running => "auto-slide on".green(),
        SlideState::Idle => "auto-slide off".yellow(),
    };
    let search = if session.search_term().is_empty() {
        String::from("all items")
    } else {
        format!("search \"{}\"", session.search_term())
    };
    frame.push_str(&format!(
        "{}  {}  {} groups  [{}]{}\n\n",
        "STOCK".bold(),
        search,
        session.total_count(),
        slide,
        if session.is_loading() { "  loading..." } else { "" }
    ));

    if let Some(error) = session.error() {
        frame.push_str(&format!("{}\n\n", error.red()));
    } else if session.items().is_empty() && !session.is_loading() {
        frame.push_str("No stock found\n\n");
    }

    for item in session.items() {
        frame.push_str(&render_card(item));
    }

    if session.shows_pager() {
        frame.push_str(&format!(
            "page {} of {}\n",
            session.current_page(),
            session.page_count()
        ));
    }
    frame.push_str(&"[n]ext [p]rev [number] /search [r]efresh [a]uto-slide [q]uit\n".dimmed().to_string());
    frame
}

fn render_card(item: &AggregatedItem) -> String {
    let group = &item.group;
    let mut card = format!(
        "{}  PO {}  {} {}\n",
        group.item_code.bold(),
        group.po_number.as_deref().unwrap_or("-"),
        format_qty(item.total_qty).cyan(),
        group.uom.as_deref().unwrap_or_default()
    );
    card.push_str(&format!(
        "  buyer {}  supplier {}  inspection {}\n",
        group.buyer_name.as_deref().unwrap_or("-"),
        group.supplier_name.as_deref().unwrap_or("-"),
        group.inspection_status.as_deref().unwrap_or("-")
    ));
    for location in &item.locations {
        card.push_str(&format!(
            "    {:<24} {:<14} {:>10}\n",
            location.full_location,
            location.bar_code.as_deref().unwrap_or("-"),
            format_qty(location.qty)
        ));
    }
    card.push_str(&format!("  received {}\n\n", format_date(item.first_received())));
    card
}

fn format_qty(qty: f64) -> String {
    if qty.fract() == 0.0 {
        format!("{qty:.0}")
    } else {
        format!("{qty:.2}")
    }
}

fn format_date(date: Option<NaiveDateTime>) -> String {
    date.map_or_else(|| "N/A".to_string(), |d| d.format(DATE_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use stockview::model::{LocationRecord, StockGroup};
    use stockview::PageResult;

    #[test]
    fn test_frame_shows_card_and_pager() {
        colored::control::set_override(false);
        let mut session = DisplaySession::new(1, Duration::from_secs(30), false);
        let cmd = session.mount("", std::time::Instant::now());
        let item = AggregatedItem {
            group: StockGroup::new("F100"),
            locations: vec![LocationRecord::new(
                Some("B1".into()),
                Some("R1".into()),
                Some("S1".into()),
                Some("WH".into()),
                Some(7.5),
                None,
                None,
            )],
            total_qty: 7.5,
        };
        session.apply(
            cmd.sequence,
            Ok(PageResult {
                items: vec![item],
                total_count: 2,
                page: 1,
                page_size: 1,
            }),
        );

        let frame = render_frame(&session);
        assert!(frame.contains("F100"), "{frame}");
        assert!(frame.contains("WH-R1-S1"), "{frame}");
        assert!(frame.contains("7.50"), "{frame}");
        assert!(frame.contains("received N/A"), "{frame}");
        assert!(frame.contains("page 1 of 2"), "{frame}");
    }

    #[test]
    fn test_format_qty() {
        assert_eq!(format_qty(5.0), "5");
        assert_eq!(format_qty(2.5), "2.50");
    }
}
