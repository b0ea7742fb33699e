use anyhow::Result;
use hearth_application::ClientContext;

pub async fn list(ctx: &ClientContext) -> Result<()> {
    let invites = ctx.household().pending_invites().await.into_result()?;
    if invites.is_empty() {
        println!("No pending invites.");
    }
    for pending in invites.iter() {
        println!("{}  from {}", pending.id, pending.invite.inviter_username);
    }
    Ok(())
}

pub async fn send(ctx: &ClientContext, username: &str) -> Result<()> {
    let id = ctx.household().invite(username).await?;
    println!("{}", id);
    Ok(())
}

pub async fn accept(ctx: &ClientContext, id: &str) -> Result<()> {
    let household = ctx.household().accept(id).await?;
    println!("Joined {}", household);
    Ok(())
}

pub async fn decline(ctx: &ClientContext, id: &str) -> Result<()> {
    ctx.household().decline(id).await?;
    Ok(())
}
