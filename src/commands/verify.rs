//! Verify command handler.

use super::{Context, cancel_on_interrupt, percent};
use faceverify::ui::{ImageSlot, ScreenState, VerificationScreen, user_message};
use faceverify::{ImageFile, VerificationOutcome};
use std::path::Path;

/// Verify command.
pub async fn cmd_verify(
    ctx: &Context,
    image1: &Path,
    image2: &Path,
    public: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = ctx.verification();
    let image1 = ImageFile::from_path(image1).await?;
    let image2 = ImageFile::from_path(image2).await?;

    if public {
        let outcome = client
            .predict(Some(&image1), Some(&image2))
            .await
            .map_err(|e| user_message(&e))?;
        return print_outcome(&outcome, json);
    }

    let mut screen = VerificationScreen::new();
    screen.select_image(ImageSlot::First, image1);
    screen.select_image(ImageSlot::Second, image2);

    let cancel = cancel_on_interrupt();
    screen.submit_cancellable(&client, &cancel).await?;
    match screen.state() {
        ScreenState::Ready(outcome) => print_outcome(outcome, json),
        ScreenState::Failed(message) => Err(message.clone().into()),
        _ => Err("verification did not complete".into()),
    }
}

fn print_outcome(
    outcome: &VerificationOutcome,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }

    let verdict = if outcome.is_match { "MATCH" } else { "NO MATCH" };
    println!("Result:     {verdict}");
    println!("Confidence: {}", percent(outcome.confidence));
    println!("{}", outcome.message);

    if let Some(metrics) = outcome.raw_metrics.filter(|m| !m.is_empty()) {
        println!();
        println!("Metrics:");
        if let Some(score) = metrics.verification_score {
            println!("  Verification score: {score:.4}");
        }
        if let Some(cosine) = metrics.cosine_similarity {
            println!("  Cosine similarity:  {cosine:.4}");
        }
        if let Some(distance) = metrics.euclidean_distance {
            println!("  Euclidean distance: {distance:.4}");
        }
    }
    if let Some(id) = &outcome.verification_id {
        println!("Record:     {id}");
    }
    Ok(())
}
