//! History command handlers.

use super::{Context, cancel_on_interrupt, percent};
use faceverify::MatchResult;
use faceverify::ui::{HistoryScreen, HistoryView, ScreenState, user_message};

/// History command.
pub async fn cmd_history(ctx: &Context, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let aggregator = ctx.history();
    let mut screen = HistoryScreen::new();
    let cancel = cancel_on_interrupt();

    screen.load_cancellable(&aggregator, &cancel).await?;
    if let ScreenState::Failed(message) = screen.state() {
        return Err(message.clone().into());
    }

    if json {
        if let ScreenState::Ready(listing) = screen.state() {
            println!("{}", serde_json::to_string_pretty(listing)?);
        }
        return Ok(());
    }

    match screen.view() {
        Some(HistoryView::Empty) => {
            println!("No verification history yet");
            println!("Start verifying faces to see your history here!");
        },
        Some(HistoryView::Loaded(listing)) => {
            let summary = listing.summary;
            println!("Total Verifications: {}", summary.total);
            println!("Matches:             {}", summary.matches);
            println!("No Matches:          {}", summary.non_matches);
            println!();
            for record in &listing.records {
                let badge = match record.result {
                    MatchResult::Match => "✓ Match",
                    MatchResult::NoMatch => "✗ No Match",
                    MatchResult::Unknown => "? Unknown",
                };
                println!(
                    "{}  {:<10}  {}",
                    record.created_at.format("%Y-%m-%d %H:%M:%S"),
                    badge,
                    percent(record.confidence_score)
                );
            }
        },
        None => return Err("history did not load".into()),
    }
    Ok(())
}

/// Clear-history command.
pub async fn cmd_clear_history(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    ctx.history()
        .clear_history()
        .await
        .map_err(|e| user_message(&e))?;
    println!("Verification history cleared");
    Ok(())
}
