//! Turns domain data into Discord-sized message text.

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::domain::{
    catalog, CatalogEntry, Category, NetWorth, ProfitRecord, ProfitView, StockQuote, TravelStatus,
};
use crate::infra::torn::{TornError, ACCESS_LEVEL_CODE, DAILY_LIMIT_CODE, INCORRECT_KEY_CODE};

/// Discord rejects message content longer than this.
pub const MESSAGE_LIMIT: usize = 2000;

pub const NO_QUALIFYING_RESULTS: &str = "📭 No items currently meet the profit threshold.";

const ACCESS_LEVEL_HINT: &str = "This command needs a key with a higher access level; create a \
Limited or Full access key under Settings → API Keys.";

pub const MISSING_KEY: &str = "🔑 No Torn API key available. Pass one with the `key` option, \
or ask the bot operator to configure `TORN_API_KEY`.";

/// Room kept free for the "and N more" note.
const OVERFLOW_RESERVE: usize = 32;

struct ReportLine {
    text: String,
    /// Headers are not counted in the overflow note.
    is_record: bool,
}

impl ReportLine {
    fn record(text: String) -> Self {
        Self {
            text,
            is_record: true,
        }
    }

    fn header(text: String) -> Self {
        Self {
            text,
            is_record: false,
        }
    }
}

/// Render profit records for a view: truncate to its display limit, then fit the message.
pub fn format_report(records: &[ProfitRecord], view: &ProfitView) -> String {
    if records.is_empty() {
        return NO_QUALIFYING_RESULTS.to_string();
    }

    let shown = match view.display_limit {
        Some(limit) => &records[..records.len().min(limit)],
        None => records,
    };

    if view.is_grouped() {
        let mut lines = Vec::new();
        let mut current_country: Option<&str> = None;
        for record in shown {
            if current_country != Some(record.country) {
                current_country = Some(record.country);
                lines.push(ReportLine::header(format!("__**{}**__", record.country)));
            }
            lines.push(ReportLine::record(format!(
                "`{:>5}` {} | buy {} | sell {} | profit {}",
                record
                    .stock
                    .map(format_thousands)
                    .unwrap_or_else(|| "?".to_string()),
                record.name,
                format_money(record.vendor_buy as i64),
                format_money(record.market_sell as i64),
                format_money(record.profit),
            )));
        }
        let header = format!(
            "**📦 Foreign stock by country** (profit ≥ {})",
            format_money(view.min_profit)
        );
        fit_to_message(&header, lines)
    } else {
        let lines = shown
            .iter()
            .enumerate()
            .map(|(idx, record)| {
                ReportLine::record(format!(
                    "**{}.** {} ({}) | buy {} | sell {} | profit **{}**",
                    idx + 1,
                    record.name,
                    record.country,
                    format_money(record.vendor_buy as i64),
                    format_money(record.market_sell as i64),
                    format_money(record.profit),
                ))
            })
            .collect();
        let header = format!("**✈️ Top {} foreign item profits**", shown.len());
        fit_to_message(&header, lines)
    }
}

/// Join header and lines, dropping whatever does not fit into one message.
fn fit_to_message(header: &str, lines: Vec<ReportLine>) -> String {
    let total_records = lines.iter().filter(|line| line.is_record).count();
    let mut out = header.to_string();
    let mut used = out.chars().count();
    let mut shown_records = 0;
    let mut last_was_header = false;
    let line_count = lines.len();

    for (idx, line) in lines.into_iter().enumerate() {
        let cost = line.text.chars().count() + 1;
        let is_last = idx + 1 == line_count;
        let reserve = if is_last { 0 } else { OVERFLOW_RESERVE };
        if used + cost + reserve > MESSAGE_LIMIT {
            break;
        }
        out.push('\n');
        out.push_str(&line.text);
        used += cost;
        last_was_header = !line.is_record;
        if line.is_record {
            shown_records += 1;
        }
    }

    if last_was_header && shown_records < total_records {
        if let Some(pos) = out.rfind('\n') {
            out.truncate(pos);
        }
    }

    let hidden = total_records - shown_records;
    if hidden > 0 {
        out.push_str(&format!("\n… and {hidden} more"));
    }
    out
}

/// Static lookup: every catalog item of one category, grouped by country.
pub fn render_category(category: Category) -> String {
    let (emoji, label) = (category.emoji(), category.label());
    let mut message = format!("**{emoji} {label} by Country**\n");
    for (country, items) in catalog::group_by_country(catalog::by_category(category)) {
        let names: Vec<String> = items.iter().map(|item| describe_item(item)).collect();
        message.push_str(&format!("\n**{country}:** {}", names.join(", ")));
    }
    message
}

/// Static lookup: items sold in the country named by `input`.
pub fn render_country(input: &str) -> String {
    let Some(country) = catalog::find_country(input) else {
        return format!(
            "❌ Country not found. Try one of: {}",
            catalog::countries().join(", ")
        );
    };

    let lines: Vec<String> = catalog::items_in(country)
        .into_iter()
        .map(|item| format!("{} {}", item.category.emoji(), describe_item(item)))
        .collect();
    format!("**{country} Items:**\n{}", lines.join("\n"))
}

fn describe_item(item: &CatalogEntry) -> String {
    let price = format_money(item.vendor_buy as i64);
    format!("{} ({price})", item.name)
}

pub fn render_stocks(stocks: &[StockQuote], acronym: Option<&str>) -> String {
    if let Some(acronym) = acronym {
        let wanted = acronym.trim();
        return match stocks
            .iter()
            .find(|stock| stock.acronym.eq_ignore_ascii_case(wanted))
        {
            Some(stock) => format!(
                "**📈 {} ({})**\nPrice: {}\nMarket cap: {}\nTotal shares: {}",
                stock.name,
                stock.acronym,
                format_price(stock.current_price),
                format_money(stock.market_cap as i64),
                format_thousands(stock.total_shares),
            ),
            None => format!("❌ No stock with acronym `{}`.", wanted.to_uppercase()),
        };
    }

    if stocks.is_empty() {
        return "📭 The stock exchange returned no stocks.".to_string();
    }

    let lines = stocks
        .iter()
        .map(|stock| {
            ReportLine::record(format!(
                "`{:<4}` {} | {}",
                stock.acronym,
                format_price(stock.current_price),
                stock.name
            ))
        })
        .collect();
    fit_to_message("**📈 Torn Stock Exchange**", lines)
}

pub fn render_net_worth(worth: &NetWorth) -> String {
    let mut message = format!(
        "**💰 Net worth of {} [{}]**\nTotal: **{}**",
        worth.player_name,
        worth.player_id,
        format_money(worth.total.round() as i64)
    );
    for (label, value) in &worth.breakdown {
        let amount = format_money(value.round() as i64);
        message.push_str(&format!("\n{label}: {amount}"));
    }
    message
}

pub fn render_travel(status: &TravelStatus) -> String {
    if status.is_flying() {
        let method = status
            .method
            .as_deref()
            .map(|method| format!(" ({method})"))
            .unwrap_or_default();
        return format!(
            "✈️ {} is flying to {}{method}. Lands at {} TCT, in {}.",
            status.player_name,
            status.destination,
            format_clock(status.arrival),
            format_duration(status.time_left),
        );
    }

    if status.destination.eq_ignore_ascii_case("Torn") {
        format!("🏠 {} is in Torn City.", status.player_name)
    } else {
        format!(
            "📍 {} has landed in {}.",
            status.player_name, status.destination
        )
    }
}

/// User-facing explanation of a pipeline failure.
pub fn render_error(error: &TornError) -> String {
    match error {
        TornError::RateLimited { .. } => {
            "⏳ The Torn API is rate limiting this key. Wait a minute and try again."
                .to_string()
        }
        TornError::ConnectionFailed(detail) => {
            format!("📡 Could not reach the Torn API ({detail}). Try again later.")
        }
        TornError::InvalidResponseFormat(_) => {
            "⚠️ The Torn API sent a response the bot could not read. Tell the bot operator."
                .to_string()
        }
        TornError::Provider { code, message } => match provider_hint(*code) {
            Some((icon, hint)) => format!("{icon} Torn API error {code}: {message}. {hint}"),
            None => format!("❌ Torn API error {code}: {message}"),
        },
    }
}

fn provider_hint(code: u16) -> Option<(&'static str, &'static str)> {
    match code {
        ACCESS_LEVEL_CODE => Some(("🔒", ACCESS_LEVEL_HINT)),
        INCORRECT_KEY_CODE => Some(("🔑", "Check that the key was copied completely.")),
        DAILY_LIMIT_CODE => Some(("🛑", "This key is done for today.")),
        _ => None,
    }
}

/// `1234567` -> `1,234,567`.
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// Whole Torn dollars: `-1500` -> `-$1,500`.
pub fn format_money(value: i64) -> String {
    let formatted = format_thousands(value.unsigned_abs());
    if value < 0 {
        format!("-${formatted}")
    } else {
        format!("${formatted}")
    }
}

/// Share prices keep their cents: `1012.5` -> `$1,012.50`.
pub fn format_price(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{sign}${}.{:02}",
        format_thousands(cents / 100),
        cents % 100
    )
}

fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes:02}m")
    } else if minutes > 0 {
        format!("{minutes}m {:02}s", seconds % 60)
    } else {
        format!("{seconds}s")
    }
}

const CLOCK_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second]");

/// Torn City Time is UTC.
fn format_clock(unix: i64) -> String {
    OffsetDateTime::from_unix_timestamp(unix)
        .ok()
        .and_then(|time| time.format(CLOCK_FORMAT).ok())
        .unwrap_or_else(|| unix.to_string())
}
