use std::collections::HashSet;

use anyhow::{Result, anyhow};
use hearth_application::ClientContext;
use hearth_core::chat::{MessageLocation, Page};
use hearth_core::time::to_datetime;
use strum::IntoEnumIterator;

pub fn parse_location(text: &str) -> Result<MessageLocation> {
    MessageLocation::iter()
        .filter(|location| *location != MessageLocation::Private)
        .find(|location| location.as_ref() == text)
        .ok_or_else(|| anyhow!("expected global, household or staffGroup, got '{}'", text))
}

/// Prints messages as polling brings them in. Ends on Ctrl-C, after
/// `updates` published states, or when the watch stops.
pub async fn tail(ctx: &ClientContext, location: MessageLocation, updates: Option<usize>) -> Result<()> {
    let page = Page::new(ctx.config().page_size, 0);
    let mut watch = ctx.chat(location)?.watch(page).await;
    let mut seen = HashSet::new();
    let mut remaining = updates;

    loop {
        if remaining == Some(0) {
            break;
        }
        let state = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            state = watch.changed() => match state {
                Some(state) => state,
                None => break,
            },
        };
        remaining = remaining.map(|n| n.saturating_sub(1));

        if let Some(error) = &state.error {
            return Err(anyhow!(hearth_core::error::translate_error(error).text));
        }
        let Some(messages) = state.value() else {
            continue;
        };
        for message in messages.iter().filter(|m| seen.insert(m.id.clone())) {
            println!(
                "[{}] {}: {}",
                to_datetime(message.timestamp).format("%H:%M:%S"),
                message.sender_username,
                message.content
            );
        }
    }
    Ok(())
}

pub async fn send(ctx: &ClientContext, location: MessageLocation, content: &str) -> Result<()> {
    ctx.chat(location)?.send(content, None).await?;
    Ok(())
}
