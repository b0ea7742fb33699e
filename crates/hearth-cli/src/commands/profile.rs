use anyhow::Result;
use hearth_application::ClientContext;

pub async fn show(ctx: &ClientContext) -> Result<()> {
    let profile = ctx.profile().caller_profile().await.into_result()?;
    let Some(profile) = &*profile else {
        println!("No profile yet. Create one to get started.");
        return Ok(());
    };

    println!("Username:  {}", profile.public_profile.username);
    if let Some(avatar) = &profile.public_profile.avatar {
        println!("Avatar:    {}", avatar.direct_url());
    }
    if let Some(details) = &profile.private_details {
        println!("Full name: {}", details.full_name);
        println!(
            "Born:      {:04}-{:02}-{:02}",
            details.dob.year, details.dob.month, details.dob.day
        );
        println!("Adult:     {}", details.is_adult);
    }
    Ok(())
}

pub async fn role(ctx: &ClientContext) -> Result<()> {
    let role = ctx.profile().caller_role().await.into_result()?;
    println!("{}", role);
    Ok(())
}
