//! Plain-text and CSV rendering of the derived views.

use std::io::Write;

use anyhow::Result;
use clap::ValueEnum;
use finorg_core::{Card, DashboardSummary, ScheduleRow, SpendingView, Transaction, find_by_id};
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Breakdown {
    Category,
    Month,
}

pub fn money(amount: Decimal) -> String {
    format!("${:.2}", amount)
}

pub fn dashboard(out: &mut impl Write, summary: &DashboardSummary, cards: &[Card]) -> Result<()> {
    writeln!(out, "Transactions: {}", summary.transaction_count)?;
    writeln!(out, "Cards:        {}", summary.card_count)?;
    writeln!(out, "Total spent:  {}", money(summary.total_spent))?;
    writeln!(out, "Total income: {}", money(summary.total_income))?;
    writeln!(out)?;

    if summary.recent.is_empty() {
        writeln!(out, "No recent transactions")?;
        return Ok(());
    }

    writeln!(out, "Recent activity:")?;
    for t in &summary.recent {
        let card = card_label(cards, t.card_id);
        writeln!(
            out,
            "- {} | {:<8} | {} | {} | {}",
            t.date.wall().format("%Y-%m-%d"),
            t.transaction_type,
            t.merchant_name,
            money(t.amount),
            card
        )?;
    }
    Ok(())
}

pub fn spending(out: &mut impl Write, view: &SpendingView, by: Breakdown) -> Result<()> {
    writeln!(
        out,
        "Purchases since {} (last {}): {}",
        view.cutoff.format("%Y-%m-%d"),
        view.range.as_str(),
        money(view.total)
    )?;

    match by {
        Breakdown::Category if view.by_category.is_empty() => writeln!(out, "No purchases in range")?,
        Breakdown::Month if view.by_month.is_empty() => writeln!(out, "No purchases in range")?,
        Breakdown::Category => {
            for slice in &view.by_category {
                writeln!(
                    out,
                    "- {:<14} {:>12} {:>5}%",
                    slice.name,
                    money(slice.value),
                    share(slice.value, view.total)
                )?;
            }
        }
        Breakdown::Month => {
            for bar in &view.by_month {
                writeln!(out, "- {} {} {:>12}", bar.name, bar.year, money(bar.amount))?;
            }
        }
    }
    Ok(())
}

/// Whole-number percentage of `total`, as the pie labels show it.
fn share(value: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        return Decimal::ZERO;
    }
    (value * Decimal::ONE_HUNDRED / total).round()
}

pub fn spending_csv(out: impl Write, view: &SpendingView, by: Breakdown) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    match by {
        Breakdown::Category => {
            wtr.write_record(["name", "value"])?;
            for slice in &view.by_category {
                wtr.write_record([slice.name.clone(), format!("{:.2}", slice.value)])?;
            }
        }
        Breakdown::Month => {
            wtr.write_record(["year", "month", "name", "amount"])?;
            for bar in &view.by_month {
                wtr.write_record([
                    bar.year.to_string(),
                    bar.month.to_string(),
                    bar.name.clone(),
                    format!("{:.2}", bar.amount),
                ])?;
            }
        }
    }
    wtr.flush()?;
    Ok(())
}

pub fn schedule(out: &mut impl Write, rows: &[ScheduleRow<'_>]) -> Result<()> {
    if rows.is_empty() {
        writeln!(out, "No recurring transactions")?;
        return Ok(());
    }
    for row in rows {
        let r = row.item;
        let mut flags = String::new();
        if !r.is_active {
            flags.push_str(" [paused]");
        }
        if row.ended {
            flags.push_str(" [ended]");
        }
        writeln!(
            out,
            "#{:<4} {:<10} next {} {:<9} {:>10} {} {}{}",
            r.id,
            r.frequency.label(),
            r.next_date,
            row.status.label(),
            money(r.amount),
            r.category,
            r.description.as_deref().unwrap_or("-"),
            flags
        )?;
    }
    Ok(())
}

pub fn cards(out: &mut impl Write, cards: &[Card]) -> Result<()> {
    if cards.is_empty() {
        writeln!(out, "No cards")?;
        return Ok(());
    }
    for c in cards {
        let expiry = if c.expiry_date.is_empty() { "-" } else { c.expiry_date.as_str() };
        let linked = if c.plaid_item_id.is_some() { " [linked]" } else { "" };
        writeln!(out, "#{:<4} {:<22} exp {}{}", c.id, c.masked(), expiry, linked)?;
    }
    Ok(())
}

fn card_label(cards: &[Card], card_id: i64) -> String {
    find_by_id(cards, card_id)
        .map(|c| c.masked())
        .unwrap_or_else(|| format!("card #{card_id}"))
}

/// Newest first.
pub fn transactions(out: &mut impl Write, transactions: &[Transaction], cards: &[Card]) -> Result<()> {
    if transactions.is_empty() {
        writeln!(out, "No transactions")?;
        return Ok(());
    }
    for t in transactions {
        let receipt = if t.has_receipt() { " [receipt]" } else { "" };
        writeln!(
            out,
            "#{:<4} {} {:<8} {:>10} {:<14} {} | {}{}",
            t.id,
            t.date.wall().format("%Y-%m-%d"),
            t.transaction_type,
            money(t.amount),
            t.category.map(|c| c.as_str()).unwrap_or("-"),
            t.merchant_name,
            card_label(cards, t.card_id),
            receipt
        )?;
    }
    Ok(())
}

pub fn transaction_detail(out: &mut impl Write, t: &Transaction, cards: &[Card]) -> Result<()> {
    writeln!(out, "Transaction #{}", t.id)?;
    writeln!(out, "  Date:        {}", t.date.wall().format("%Y-%m-%d %H:%M"))?;
    writeln!(out, "  Type:        {}", t.transaction_type)?;
    writeln!(out, "  Amount:      {}", money(t.amount))?;
    writeln!(out, "  Merchant:    {}", t.merchant_name)?;
    writeln!(out, "  Description: {}", t.description)?;
    writeln!(
        out,
        "  Category:    {}",
        t.category.map(|c| c.as_str()).unwrap_or("uncategorized")
    )?;
    writeln!(out, "  Card:        {}", card_label(cards, t.card_id))?;
    if let Some(path) = &t.receipt_path {
        writeln!(out, "  Receipt:     {path}")?;
    }
    if let Some(ocr) = &t.ocr_data {
        writeln!(out, "  OCR data:")?;
        for (key, value) in ocr {
            match value {
                serde_json::Value::String(s) => writeln!(out, "    {key}: {s}")?,
                other => writeln!(out, "    {key}: {other}")?,
            }
        }
    }
    Ok(())
}
